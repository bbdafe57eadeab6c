//! 取放状态机
//!
//! 单线程、完全同步：每一步都以 `wait = true` 调用执行机构，返回后再发布状态。
//! 循环中任何执行机构错误都在步骤边界被捕获，记录到 `CycleReport`，
//! 然后无条件执行回零（关节回零 + 打开夹爪）。

use crate::config::ExecutorConfig;
use crate::error::ExecutorError;
use crate::state::ExecutorState;
use crate::status::StatusSink;
use pnp_actuator::{Actuator, ActuatorError, PositionCommand};
use pnp_types::{GraspOutcome, GripperKind, GripperState, PickPlaceRequest, Pose, Position, RobotStatus};
use tracing::{debug, error, info, warn};

// ==================== 步骤记录 ====================

/// 夹爪动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GripperAction {
    /// 平行夹爪张开
    Open,
    /// 平行夹爪闭合
    Close,
    VacuumOn,
    VacuumOff,
}

impl GripperAction {
    /// 是否为夹紧/吸附动作
    pub fn is_engage(self) -> bool {
        matches!(self, GripperAction::Close | GripperAction::VacuumOn)
    }
}

/// 单步动作
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepAction {
    /// 笛卡尔移动（命令位姿）
    Move(Pose),
    /// 关节移动
    Servo([f64; 6]),
    Gripper(GripperAction),
    /// 读取吸附传感器
    Sense { grasped: bool },
}

/// 单步结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub state: ExecutorState,
    pub action: StepAction,
}

/// 循环结果
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// 全部步骤完成
    Completed,
    /// 在某一步失败，已执行回零
    Aborted {
        state: ExecutorState,
        error: ActuatorError,
    },
}

/// 一次取放循环的报告
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub request: PickPlaceRequest,
    /// 按执行顺序记录的步骤（包括回零）
    pub steps: Vec<StepOutcome>,
    pub outcome: CycleOutcome,
    /// 抓取结果（未执行到抓取时为 `None`）
    pub grasp: Option<GraspOutcome>,
}

impl CycleReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == CycleOutcome::Completed
    }

    /// 夹紧/吸附次数
    pub fn engage_attempts(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| {
                s.state == ExecutorState::Grasping
                    && matches!(s.action, StepAction::Gripper(a) if a.is_engage())
            })
            .count()
    }

    /// 所有笛卡尔移动的命令位姿
    pub fn moves(&self) -> impl Iterator<Item = (ExecutorState, Pose)> + '_ {
        self.steps.iter().filter_map(|s| match s.action {
            StepAction::Move(pose) => Some((s.state, pose)),
            _ => None,
        })
    }
}

// ==================== 执行器 ====================

/// 取放执行器
pub struct MotionExecutor<A, S> {
    config: ExecutorConfig,
    actuator: A,
    sink: S,
    state: ExecutorState,
    gripper: GripperState,
    last_grasp: Option<GraspOutcome>,
    journal: Vec<StepOutcome>,
}

impl<A: Actuator, S: StatusSink> MotionExecutor<A, S> {
    pub fn new(config: ExecutorConfig, actuator: A, sink: S) -> Self {
        let gripper = GripperState::new(config.gripper.kind);
        Self {
            config,
            actuator,
            sink,
            state: ExecutorState::Idle,
            gripper,
            last_grasp: None,
            journal: Vec::new(),
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    pub fn is_faulted(&self) -> bool {
        self.state == ExecutorState::Error
    }

    pub fn gripper_state(&self) -> GripperState {
        self.gripper
    }

    /// 最近一次循环的抓取结果
    pub fn last_grasp(&self) -> Option<GraspOutcome> {
        self.last_grasp
    }

    /// 启动：连接、使能、打开夹爪、关节回零
    ///
    /// 连接或使能失败时发布 `ERROR` 并返回 `ExecutorError::Startup`。
    pub fn startup(&mut self) -> Result<(), ExecutorError> {
        info!(
            "Starting executor for {} ({} gripper, controller {})",
            self.config.robot_address,
            self.config.gripper.kind,
            self.actuator.version()
        );

        if let Err(e) = self.bring_up() {
            error!("Startup failed: {}", e);
            self.enter(ExecutorState::Error);
            self.publish(RobotStatus::error(None));
            return Err(ExecutorError::Startup(e));
        }

        self.enter(ExecutorState::Idle);
        self.publish(RobotStatus::ok(self.home_position()));
        info!("Executor ready at {}", self.config.home_pose);
        Ok(())
    }

    fn bring_up(&mut self) -> Result<(), ActuatorError> {
        if !self.actuator.is_connected() {
            self.actuator.connect()?;
        }
        self.actuator.enable_motion(true)?;

        self.publish(RobotStatus::busy(self.home_position()));
        match self.gripper.kind {
            GripperKind::Parallel => {
                self.actuator.set_gripper_enable(true)?;
                self.actuator.set_gripper_position(self.config.gripper.open_position, true)?;
            },
            GripperKind::Vacuum => self.actuator.set_vacuum_gripper(false, true)?,
        }
        self.gripper.engaged = false;
        self.actuator.set_servo_angle(&self.config.home_joints, None, true)
    }

    /// 执行一次取放循环
    ///
    /// 执行机构错误不会从这里返回；只有回零失败（进入 `Error`）
    /// 或执行器已处于 `Error` 时才返回错误。
    pub fn run_cycle(&mut self, request: &PickPlaceRequest) -> Result<CycleReport, ExecutorError> {
        if self.is_faulted() {
            warn!("Cycle refused: executor is faulted");
            return Err(ExecutorError::Faulted);
        }

        info!("Pick-and-place cycle: pick {} / place {}", request.pick, request.place);
        self.journal.clear();
        self.last_grasp = None;

        let outcome = match self.pick_and_place(request) {
            Ok(()) => CycleOutcome::Completed,
            Err(error) => {
                warn!("Cycle aborted in {}: {}", self.state, error);
                CycleOutcome::Aborted {
                    state: self.state,
                    error,
                }
            },
        };

        if let Err(source) = self.return_home() {
            error!("Return to home failed: {}", source);
            self.enter(ExecutorState::Error);
            self.publish(RobotStatus::error(Some(self.actuator.position().position())));
            return Err(ExecutorError::Cleanup {
                state: ExecutorState::Returning,
                source,
            });
        }

        self.enter(ExecutorState::Idle);
        let report = CycleReport {
            request: *request,
            steps: std::mem::take(&mut self.journal),
            outcome,
            grasp: self.last_grasp,
        };
        info!(
            "Cycle finished: {} ({} steps, grasp {:?})",
            if report.is_completed() { "completed" } else { "aborted" },
            report.steps.len(),
            report.grasp
        );
        Ok(report)
    }

    /// 从错误状态恢复：清除错误、重新使能、关节回零
    pub fn reset(&mut self) -> Result<(), ExecutorError> {
        info!("Resetting executor");
        self.journal.clear();

        let result = self.actuator.clear_error().and_then(|()| {
            if !self.actuator.is_connected() {
                self.actuator.connect()?;
            }
            self.actuator.enable_motion(true)
        });

        match result.and_then(|()| self.return_home()) {
            Ok(()) => {
                self.enter(ExecutorState::Idle);
                info!("Executor reset complete");
                Ok(())
            },
            Err(source) => {
                error!("Reset failed: {}", source);
                self.enter(ExecutorState::Error);
                self.publish(RobotStatus::error(Some(self.actuator.position().position())));
                Err(ExecutorError::Cleanup {
                    state: ExecutorState::Returning,
                    source,
                })
            },
        }
    }

    /// 断开执行机构
    pub fn shutdown(&mut self) -> Result<(), ActuatorError> {
        info!("Shutting down executor");
        self.actuator.disconnect()
    }

    // ==================== 循环步骤 ====================

    fn pick_and_place(&mut self, request: &PickPlaceRequest) -> Result<(), ActuatorError> {
        let approach_height = self.config.approach_height;
        let pick = request.pick;
        let place = request.place;

        self.enter(ExecutorState::Homing);
        self.release()?;
        let mut pose = self.config.transit_home;
        self.move_to(pose)?;

        self.enter(ExecutorState::Approaching);
        pose = pose.with_z(approach_height);
        self.move_to(pose)?;

        self.enter(ExecutorState::Orienting);
        pose = pose.with_orientation_of(&pick);
        self.move_to(pose)?;

        self.enter(ExecutorState::Descending);
        pose = pose.with_xy(pick.x, pick.y);
        self.move_to(pose)?;
        pose = pose.with_z(pick.z);
        self.move_to(pose)?;

        self.enter(ExecutorState::Grasping);
        let grasp = self.grasp(&mut pose)?;
        self.last_grasp = Some(grasp);

        self.enter(ExecutorState::Retreating);
        pose = pose.with_z(approach_height);
        self.move_to(pose)?;

        self.enter(ExecutorState::Placing);
        pose = pose.with_orientation_of(&place);
        self.move_to(pose)?;
        pose = pose.with_xy(place.x, place.y);
        self.move_to(pose)?;
        pose = pose.with_z(place.z);
        self.move_to(pose)?;
        self.release()?;
        pose = pose.with_z(approach_height);
        self.move_to(pose)
    }

    /// 夹紧；吸盘按重试策略校验
    ///
    /// 吸附失败时：关闭吸盘，下探 `z_step`，重新吸附并读取传感器，
    /// 最多 `max_retries` 次，下探不超出工作空间。重试耗尽后继续执行（`Unverified`）。
    fn grasp(&mut self, pose: &mut Pose) -> Result<GraspOutcome, ActuatorError> {
        self.engage()?;
        if self.gripper.kind == GripperKind::Parallel {
            return Ok(GraspOutcome::NotSensed);
        }

        let max_retries = self.config.grasp.max_retries;
        let mut grasped = self.sense()?;
        let mut retries = 0;
        while !grasped && retries < max_retries {
            let lowered = pose.with_z(pose.z - self.config.grasp.z_step);
            if let Err(violation) = self.config.workspace.check(&lowered) {
                warn!("Grasp retry stopped at workspace boundary: {}", violation);
                break;
            }

            retries += 1;
            warn!("Grasp not detected, retry {}/{}", retries, max_retries);
            self.release()?;
            *pose = lowered;
            self.move_to(*pose)?;
            self.engage()?;
            grasped = self.sense()?;
        }

        if grasped {
            info!("Grasp verified after {} retries", retries);
            Ok(GraspOutcome::Verified)
        } else {
            warn!("Grasp not verified after {} retries, continuing", retries);
            Ok(GraspOutcome::Unverified)
        }
    }

    /// 关节回零、打开夹爪、发布 `OK`
    fn return_home(&mut self) -> Result<(), ActuatorError> {
        self.enter(ExecutorState::Returning);
        let joints = self.config.home_joints;
        self.actuator.set_servo_angle(&joints, None, true)?;
        self.record(StepAction::Servo(joints));
        self.release()?;
        self.publish(RobotStatus::ok(self.home_position()).with_grasp(self.last_grasp));
        Ok(())
    }

    // ==================== 单步操作 ====================

    fn move_to(&mut self, pose: Pose) -> Result<(), ActuatorError> {
        // 真实后端未必做限位检查，这里先拒绝
        self.config.workspace.check(&pose)?;

        debug!("[{}] move to {}", self.state, pose);
        let command = PositionCommand::absolute(pose)
            .speed(self.config.motion.command_speed())
            .acceleration(self.config.motion.command_acceleration())
            .wait(true);
        self.actuator.set_position(&command)?;

        self.record(StepAction::Move(pose));
        self.publish(RobotStatus::busy(pose.position()));
        Ok(())
    }

    fn engage(&mut self) -> Result<(), ActuatorError> {
        let action = match self.gripper.kind {
            GripperKind::Parallel => {
                self.actuator.set_gripper_position(self.config.gripper.close_position, true)?;
                GripperAction::Close
            },
            GripperKind::Vacuum => {
                self.actuator.set_vacuum_gripper(true, true)?;
                GripperAction::VacuumOn
            },
        };
        self.gripper.engaged = true;
        self.record(StepAction::Gripper(action));
        Ok(())
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        let action = match self.gripper.kind {
            GripperKind::Parallel => {
                self.actuator.set_gripper_position(self.config.gripper.open_position, true)?;
                GripperAction::Open
            },
            GripperKind::Vacuum => {
                self.actuator.set_vacuum_gripper(false, true)?;
                GripperAction::VacuumOff
            },
        };
        self.gripper.engaged = false;
        self.record(StepAction::Gripper(action));
        Ok(())
    }

    fn sense(&mut self) -> Result<bool, ActuatorError> {
        let grasped = self.actuator.vacuum_grasped()?;
        self.record(StepAction::Sense { grasped });
        Ok(grasped)
    }

    // ==================== 内部工具 ====================

    fn enter(&mut self, state: ExecutorState) {
        if self.state != state {
            debug!("Executor state: {} -> {}", self.state, state);
            self.state = state;
        }
    }

    fn record(&mut self, action: StepAction) {
        self.journal.push(StepOutcome {
            state: self.state,
            action,
        });
    }

    fn home_position(&self) -> Position {
        self.config.home_pose.position()
    }

    fn publish(&self, status: RobotStatus) {
        if let Err(e) = self.sink.publish(&status) {
            warn!("Failed to publish status {}: {}", status, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusHistory;
    use pnp_actuator::{SimulatedActuator, VacuumSensor};
    use pnp_types::RobotState;

    fn fast_config(kind: GripperKind) -> ExecutorConfig {
        let mut config = ExecutorConfig::default();
        config.gripper.kind = kind;
        config.motion.speed = 5_000.0;
        config.simulator.max_speed = 100_000.0;
        config.simulator.io_delay_ms = 0;
        config.simulator.settle_jitter = 0.0;
        config
    }

    fn executor(config: ExecutorConfig) -> (MotionExecutor<SimulatedActuator, StatusHistory>, StatusHistory) {
        let history = StatusHistory::new();
        let actuator = config.build_simulator();
        (MotionExecutor::new(config, actuator, history.clone()), history)
    }

    fn request() -> PickPlaceRequest {
        PickPlaceRequest::new(
            Pose::new(300.0, 50.0, 20.0, 180.0, 0.0, 15.0),
            Pose::new(-200.0, 100.0, 10.0, 180.0, 0.0, 0.0),
        )
    }

    #[test]
    fn test_startup_publishes_busy_then_ok() {
        let (mut executor, history) = executor(fast_config(GripperKind::Parallel));
        executor.startup().unwrap();

        let states: Vec<_> = history.snapshot().iter().map(|s| s.state).collect();
        assert_eq!(states, vec![RobotState::Busy, RobotState::Ok]);
        assert!(executor.actuator().gripper_enabled());
        assert_eq!(executor.actuator().gripper_position(), 850.0);
        assert_eq!(executor.state(), ExecutorState::Idle);
    }

    #[test]
    fn test_parallel_gripper_closes_to_close_position() {
        let (mut executor, _) = executor(fast_config(GripperKind::Parallel));
        executor.startup().unwrap();
        let report = executor.run_cycle(&request()).unwrap();

        let grasp_steps: Vec<_> = report
            .steps
            .iter()
            .filter(|s| s.state == ExecutorState::Grasping)
            .map(|s| s.action)
            .collect();
        assert_eq!(grasp_steps, vec![StepAction::Gripper(GripperAction::Close)]);
        assert_eq!(report.grasp, Some(GraspOutcome::NotSensed));
        // 回零后夹爪张开
        assert_eq!(executor.actuator().gripper_position(), 850.0);
        assert!(!executor.gripper_state().engaged);
    }

    #[test]
    fn test_retry_lowers_z_each_attempt() {
        let (mut executor, _) = executor(fast_config(GripperKind::Vacuum));
        executor
            .actuator()
            .set_vacuum_sensor(VacuumSensor::scripted([false, false, true], false));
        executor.startup().unwrap();

        let report = executor.run_cycle(&request()).unwrap();
        let grasp_zs: Vec<f64> = report
            .moves()
            .filter(|(state, _)| *state == ExecutorState::Grasping)
            .map(|(_, pose)| pose.z)
            .collect();
        assert_eq!(grasp_zs, vec![15.0, 10.0]);
    }

    #[test]
    fn test_exhausted_retries_proceed_unverified() {
        let (mut executor, history) = executor(fast_config(GripperKind::Vacuum));
        executor.actuator().set_vacuum_sensor(VacuumSensor::Fixed(false));
        executor.startup().unwrap();

        let report = executor.run_cycle(&request()).unwrap();
        assert!(report.is_completed());
        assert_eq!(report.engage_attempts(), 4);
        assert_eq!(report.grasp, Some(GraspOutcome::Unverified));

        let last = history.last().unwrap();
        assert_eq!(last.state, RobotState::Ok);
        assert_eq!(last.last_grasp, Some(GraspOutcome::Unverified));
    }

    #[test]
    fn test_faulted_executor_refuses_cycles() {
        let (mut executor, _) = executor(fast_config(GripperKind::Parallel));
        executor.startup().unwrap();
        executor.actuator().enable_motion(false).unwrap();

        assert!(matches!(
            executor.run_cycle(&request()),
            Err(ExecutorError::Cleanup { .. })
        ));
        assert!(executor.is_faulted());
        assert!(matches!(executor.run_cycle(&request()), Err(ExecutorError::Faulted)));
    }
}
