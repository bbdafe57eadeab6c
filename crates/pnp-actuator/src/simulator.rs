//! 仿真执行机构
//!
//! 在没有真实控制器时代替硬件，行为足以验证上层控制逻辑：
//! - 位置命令在后台线程中线性插值（约 50 步/秒，至少 10 步）
//! - 新命令取代旧命令（last-writer-wins），旧线程先退出再启动新线程
//! - 工作空间限位：超限直接拒绝，当前位置不变
//! - 夹爪/吸盘为简单的状态读写，吸附传感器返回固定或预设序列
//! - 没有运动学：关节命令只有在 `teach()` 过的关节配置上才会移动笛卡尔位置
//!
//! # 示例
//!
//! ```rust,no_run
//! use pnp_actuator::{Actuator, PositionCommand, SimulatedActuator, SimulatorConfig};
//! use pnp_types::Pose;
//!
//! # fn main() -> Result<(), pnp_actuator::ActuatorError> {
//! let arm = SimulatedActuator::new(SimulatorConfig::default());
//! arm.connect()?;
//! arm.enable_motion(true)?;
//! arm.set_position(
//!     &PositionCommand::absolute(Pose::new(300.0, 50.0, 250.0, 180.0, 0.0, 0.0))
//!         .speed(900.0)
//!         .wait(true),
//! )?;
//! println!("{}", arm.position());
//! arm.disconnect()?;
//! # Ok(())
//! # }
//! ```

use crate::adapter::Actuator;
use crate::command::PositionCommand;
use crate::error::ActuatorError;
use crate::motion::{MotionOutcome, MotionProfile, MotionShared, MotionStatistics, MotionTask};
use crate::state::MotionState;
use parking_lot::Mutex;
use pnp_types::{Pose, WorkspaceLimits};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 关节配置比较容差（度）
const JOINT_TOLERANCE_DEG: f64 = 1e-6;

/// 可接受的最低速度（mm/s）
pub const MIN_SPEED: f64 = 0.1;

/// 仿真版本号
const SIMULATOR_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"), "-simulator");

/// 吸附传感器模型
#[derive(Debug, Clone, PartialEq)]
pub enum VacuumSensor {
    /// 固定读数
    Fixed(bool),
    /// 预设读数序列，耗尽后返回 `fallback`
    Scripted {
        readings: VecDeque<bool>,
        fallback: bool,
    },
}

impl VacuumSensor {
    /// 预设读数序列
    pub fn scripted(readings: impl IntoIterator<Item = bool>, fallback: bool) -> Self {
        VacuumSensor::Scripted {
            readings: readings.into_iter().collect(),
            fallback,
        }
    }

    fn read(&mut self) -> bool {
        match self {
            VacuumSensor::Fixed(value) => *value,
            VacuumSensor::Scripted { readings, fallback } => readings.pop_front().unwrap_or(*fallback),
        }
    }
}

impl Default for VacuumSensor {
    fn default() -> Self {
        VacuumSensor::Fixed(true)
    }
}

/// 仿真配置
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// 初始位姿
    pub initial_pose: Pose,
    /// 工作空间限位
    pub workspace_limits: WorkspaceLimits,
    /// 默认速度（mm/s）
    pub default_speed: f64,
    /// 最大速度（mm/s），命令速度会被截断到此值
    pub max_speed: f64,
    /// 插值采样频率（步/秒）
    pub step_rate_hz: f64,
    /// 单次运动最少步数
    pub min_steps: usize,
    /// 到位抖动上限（mm，仅 x/y/z）
    pub settle_jitter: f64,
    /// 夹爪/吸盘/关节命令的同步等待时长
    pub io_delay: Duration,
    /// 吸附传感器
    pub vacuum_sensor: VacuumSensor,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            initial_pose: Pose::new(200.0, 0.0, 200.0, 180.0, 0.0, 0.0),
            workspace_limits: WorkspaceLimits::default(),
            default_speed: 100.0,
            max_speed: 1000.0,
            step_rate_hz: 50.0,
            min_steps: 10,
            settle_jitter: 0.5,
            io_delay: Duration::from_millis(500),
            vacuum_sensor: VacuumSensor::default(),
        }
    }
}

/// 命令侧状态（只由调用方线程访问）
#[derive(Debug)]
struct ControlState {
    speed: f64,
    acceleration: Option<f64>,
    target: Pose,
    servo_angles: [f64; 6],
    gripper_enabled: bool,
    gripper_position: f64,
    vacuum_on: bool,
    vacuum_activations: u64,
    vacuum_sensor: VacuumSensor,
    taught_poses: Vec<([f64; 6], Pose)>,
}

/// 仿真执行机构
///
/// 所有方法为 `&self`，可放入 `Arc` 在多个线程间共享。
/// Drop 时取消并 join 正在运行的插值线程。
pub struct SimulatedActuator {
    config: SimulatorConfig,
    /// 与插值线程共享的状态
    shared: Arc<MotionShared>,
    /// 当前插值任务（持锁完成 取消 → join → 启动）
    task: Mutex<Option<MotionTask>>,
    control: Mutex<ControlState>,
    connected: AtomicBool,
    motion_enabled: AtomicBool,
}

impl SimulatedActuator {
    /// 创建仿真执行机构（初始为未连接、未使能）
    pub fn new(config: SimulatorConfig) -> Self {
        let control = ControlState {
            speed: config.default_speed.min(config.max_speed).max(MIN_SPEED),
            acceleration: None,
            target: config.initial_pose,
            servo_angles: [0.0; 6],
            gripper_enabled: false,
            gripper_position: 0.0,
            vacuum_on: false,
            vacuum_activations: 0,
            vacuum_sensor: config.vacuum_sensor.clone(),
            taught_poses: Vec::new(),
        };

        info!("Simulated actuator created at {}", config.initial_pose);

        Self {
            shared: Arc::new(MotionShared::new(config.initial_pose)),
            task: Mutex::new(None),
            control: Mutex::new(control),
            connected: AtomicBool::new(false),
            motion_enabled: AtomicBool::new(false),
            config,
        }
    }

    /// 示教：把关节配置映射到笛卡尔位姿
    ///
    /// 仿真没有运动学，`set_servo_angle(joints)` 只有命中示教点时才会移动。
    pub fn with_taught_pose(self, joints: [f64; 6], pose: Pose) -> Self {
        self.teach(joints, pose);
        self
    }

    /// 示教（可在运行中调用）
    pub fn teach(&self, joints: [f64; 6], pose: Pose) {
        let mut control = self.control.lock();
        control.taught_poses.retain(|(j, _)| !joints_match(j, &joints));
        control.taught_poses.push((joints, pose));
    }

    /// 替换吸附传感器模型
    pub fn set_vacuum_sensor(&self, sensor: VacuumSensor) {
        self.control.lock().vacuum_sensor = sensor;
    }

    /// 配置
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// 当前速度（mm/s）
    pub fn speed(&self) -> f64 {
        self.control.lock().speed
    }

    /// 最近一次命令的目标位姿
    pub fn target_position(&self) -> Pose {
        self.control.lock().target
    }

    /// 最近一次关节命令
    pub fn servo_angles(&self) -> [f64; 6] {
        self.control.lock().servo_angles
    }

    /// 平行夹爪位置
    pub fn gripper_position(&self) -> f64 {
        self.control.lock().gripper_position
    }

    /// 平行夹爪是否使能
    pub fn gripper_enabled(&self) -> bool {
        self.control.lock().gripper_enabled
    }

    /// 吸盘是否打开
    pub fn vacuum_on(&self) -> bool {
        self.control.lock().vacuum_on
    }

    /// 吸盘打开命令的累计次数
    pub fn vacuum_activations(&self) -> u64 {
        self.control.lock().vacuum_activations
    }

    /// 运动是否使能
    pub fn is_motion_enabled(&self) -> bool {
        self.motion_enabled.load(Ordering::Acquire)
    }

    /// 是否有插值线程仍在运行
    pub fn has_active_motion(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|t| !t.is_finished())
    }

    /// 累计运动统计
    pub fn statistics(&self) -> MotionStatistics {
        *self.shared.statistics.lock()
    }

    /// 清零运动统计
    pub fn reset_statistics(&self) {
        *self.shared.statistics.lock() = MotionStatistics::default();
        info!("Simulated actuator statistics reset");
    }

    fn ensure_connected(&self) -> Result<(), ActuatorError> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(ActuatorError::NotConnected)
        }
    }

    fn ensure_motion_allowed(&self) -> Result<(), ActuatorError> {
        self.ensure_connected()?;
        if !self.motion_enabled.load(Ordering::Acquire) {
            warn!("Motion command rejected: motors are disabled");
            return Err(ActuatorError::MotionDisabled);
        }
        if self.shared.motion_state.get().is_error() {
            return Err(ActuatorError::Faulted);
        }
        Ok(())
    }

    fn profile(&self, speed: f64) -> MotionProfile {
        MotionProfile {
            speed,
            step_rate_hz: self.config.step_rate_hz,
            min_steps: self.config.min_steps,
            settle_jitter: self.config.settle_jitter,
        }
    }

    fn io_wait(&self, wait: bool) {
        if wait && !self.config.io_delay.is_zero() {
            std::thread::sleep(self.config.io_delay);
        }
    }

    /// 取消当前运动并等待线程退出
    ///
    /// 返回是否取消了一个任务。调用时必须持有 `task` 锁。
    fn cancel_locked(&self, slot: &mut Option<MotionTask>) -> bool {
        match slot.take() {
            Some(task) => {
                self.shared.stop.store(true, Ordering::Release);
                task.join();
                true
            },
            None => false,
        }
    }

    /// 启动一次插值运动
    fn start_motion(&self, target: Pose, speed: f64, wait: bool) -> Result<(), ActuatorError> {
        let completion = {
            let mut slot = self.task.lock();
            if self.cancel_locked(&mut slot) {
                debug!("Previous movement superseded");
            }
            self.shared.stop.store(false, Ordering::Release);
            self.shared.motion_state.set(MotionState::Moving);

            let task = match MotionTask::spawn(self.shared.clone(), target, self.profile(speed)) {
                Ok(task) => task,
                Err(e) => {
                    self.shared.motion_state.set(MotionState::Ready);
                    return Err(ActuatorError::Backend(format!("failed to start motion thread: {}", e)));
                },
            };
            let completion = task.completion();
            *slot = Some(task);
            completion
        };

        if wait {
            // 线程退出时必然发送结果或断开通道
            match completion.recv() {
                Ok(MotionOutcome::Failed) => {
                    return Err(ActuatorError::Backend(format!(
                        "motion to {} could not be interpolated at {} mm/s",
                        target, speed
                    )));
                },
                Ok(outcome) => debug!("Movement finished: {:?}", outcome),
                Err(_) => {
                    self.shared.motion_state.transition(MotionState::Moving, MotionState::Ready);
                    return Err(ActuatorError::Backend(
                        "motion thread exited without reporting".to_string(),
                    ));
                },
            }
        }

        Ok(())
    }
}

fn joints_match(a: &[f64; 6], b: &[f64; 6]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= JOINT_TOLERANCE_DEG)
}

impl Actuator for SimulatedActuator {
    fn connect(&self) -> Result<(), ActuatorError> {
        self.connected.store(true, Ordering::Release);
        info!("Simulated actuator connected");
        Ok(())
    }

    fn disconnect(&self) -> Result<(), ActuatorError> {
        {
            let mut slot = self.task.lock();
            if self.cancel_locked(&mut slot) {
                self.shared.motion_state.transition(MotionState::Moving, MotionState::Ready);
                info!("In-flight movement cancelled on disconnect");
            }
        }
        self.connected.store(false, Ordering::Release);
        info!("Simulated actuator connection closed");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn enable_motion(&self, enable: bool) -> Result<(), ActuatorError> {
        self.ensure_connected()?;
        self.motion_enabled.store(enable, Ordering::Release);
        info!("Motors {}", if enable { "enabled" } else { "disabled" });
        Ok(())
    }

    fn set_position(&self, command: &PositionCommand) -> Result<(), ActuatorError> {
        self.ensure_motion_allowed()?;

        let current = self.position();
        let target = command.resolve(&current);
        if !target.is_finite() {
            return Err(ActuatorError::InvalidCommand(format!(
                "non-finite target {:?}",
                target
            )));
        }

        if let Err(violation) = self.config.workspace_limits.check(&target) {
            warn!("Move to {} rejected: {}", target, violation);
            return Err(violation.into());
        }

        if let Some(speed) = command.speed.filter(|s| *s > 0.0 && *s < MIN_SPEED) {
            return Err(ActuatorError::InvalidCommand(format!(
                "speed {} mm/s below minimum {} mm/s",
                speed, MIN_SPEED
            )));
        }

        let speed = {
            let mut control = self.control.lock();
            if let Some(speed) = command.speed {
                if speed.is_finite() && speed > 0.0 {
                    control.speed = speed.min(self.config.max_speed);
                } else {
                    warn!("Ignoring invalid speed {}", speed);
                }
            }
            if command.acceleration.is_some() {
                control.acceleration = command.acceleration;
            }
            control.target = target;
            control.speed
        };

        info!(
            "Move to {} (distance {:.1} mm, speed {:.0} mm/s)",
            target,
            current.translation_distance(&target),
            speed
        );

        self.start_motion(target, speed, command.wait)
    }

    fn position(&self) -> Pose {
        *self.shared.position.lock()
    }

    fn motion_state(&self) -> MotionState {
        self.shared.motion_state.get()
    }

    fn set_servo_angle(
        &self,
        joints: &[f64; 6],
        _speed: Option<f64>,
        wait: bool,
    ) -> Result<(), ActuatorError> {
        self.ensure_motion_allowed()?;
        if joints.iter().any(|j| !j.is_finite()) {
            return Err(ActuatorError::InvalidCommand(format!(
                "non-finite joint target {:?}",
                joints
            )));
        }

        // 关节速度不参与仿真插值，笛卡尔插值沿用当前速度
        let (taught, speed) = {
            let mut control = self.control.lock();
            let taught = control
                .taught_poses
                .iter()
                .find(|(j, _)| joints_match(j, joints))
                .map(|(_, pose)| *pose);
            if let Some(pose) = taught {
                self.config.workspace_limits.check(&pose)?;
                control.target = pose;
            }
            control.servo_angles = *joints;
            (taught, control.speed)
        };

        info!("Set servo angles {:?}", joints);

        match taught {
            Some(pose) => self.start_motion(pose, speed, wait),
            None => {
                self.io_wait(wait);
                Ok(())
            },
        }
    }

    fn set_gripper_enable(&self, enable: bool) -> Result<(), ActuatorError> {
        self.ensure_connected()?;
        self.control.lock().gripper_enabled = enable;
        info!("Gripper {}", if enable { "enabled" } else { "disabled" });
        Ok(())
    }

    fn set_gripper_position(&self, position: f64, wait: bool) -> Result<(), ActuatorError> {
        self.ensure_connected()?;
        if !position.is_finite() {
            return Err(ActuatorError::InvalidCommand(format!(
                "non-finite gripper position {}",
                position
            )));
        }
        self.control.lock().gripper_position = position;
        info!("Set gripper position {}", position);
        self.io_wait(wait);
        Ok(())
    }

    fn set_vacuum_gripper(&self, on: bool, wait: bool) -> Result<(), ActuatorError> {
        self.ensure_connected()?;
        {
            let mut control = self.control.lock();
            control.vacuum_on = on;
            if on {
                control.vacuum_activations += 1;
            }
        }
        info!("Set vacuum gripper {}", if on { "on" } else { "off" });
        self.io_wait(wait);
        Ok(())
    }

    fn vacuum_grasped(&self) -> Result<bool, ActuatorError> {
        self.ensure_connected()?;
        let grasped = self.control.lock().vacuum_sensor.read();
        self.io_wait(true);
        debug!("Vacuum sensor reads {}", grasped);
        Ok(grasped)
    }

    fn emergency_stop(&self) -> Result<(), ActuatorError> {
        {
            let mut slot = self.task.lock();
            self.cancel_locked(&mut slot);
            self.shared.motion_state.set(MotionState::Error);
        }
        warn!("Emergency stop");
        Ok(())
    }

    fn clear_error(&self) -> Result<(), ActuatorError> {
        self.shared.motion_state.transition(MotionState::Error, MotionState::Ready);
        info!("Errors cleared");
        Ok(())
    }

    fn version(&self) -> String {
        SIMULATOR_VERSION.to_string()
    }
}

impl Drop for SimulatedActuator {
    fn drop(&mut self) {
        let mut slot = self.task.lock();
        self.cancel_locked(&mut slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnp_types::PoseAxis;

    fn fast_config() -> SimulatorConfig {
        SimulatorConfig {
            max_speed: 100_000.0,
            settle_jitter: 0.0,
            io_delay: Duration::ZERO,
            ..SimulatorConfig::default()
        }
    }

    fn ready_arm(config: SimulatorConfig) -> SimulatedActuator {
        let arm = SimulatedActuator::new(config);
        arm.connect().unwrap();
        arm.enable_motion(true).unwrap();
        arm
    }

    #[test]
    fn test_commands_require_connection() {
        let arm = SimulatedActuator::new(fast_config());
        let cmd = PositionCommand::absolute(Pose::default().with_z(100.0));
        assert_eq!(arm.set_position(&cmd), Err(ActuatorError::NotConnected));
        assert_eq!(arm.enable_motion(true), Err(ActuatorError::NotConnected));
    }

    #[test]
    fn test_disabled_motion_is_rejected() {
        let arm = SimulatedActuator::new(fast_config());
        arm.connect().unwrap();
        let cmd = PositionCommand::absolute(Pose::default().with_z(100.0)).wait(true);
        assert_eq!(arm.set_position(&cmd), Err(ActuatorError::MotionDisabled));
        assert_eq!(arm.set_servo_angle(&[0.0; 6], None, true), Err(ActuatorError::MotionDisabled));
        assert_eq!(arm.position(), fast_config().initial_pose);
    }

    #[test]
    fn test_speed_is_clamped_and_remembered() {
        let arm = ready_arm(SimulatorConfig {
            max_speed: 1000.0,
            settle_jitter: 0.0,
            io_delay: Duration::ZERO,
            ..SimulatorConfig::default()
        });
        let start = arm.position();
        arm.set_position(&PositionCommand::absolute(start.with_z(start.z + 1.0)).speed(9000.0).wait(true))
            .unwrap();
        assert_eq!(arm.speed(), 1000.0);

        // 非法速度被忽略
        arm.set_position(&PositionCommand::relative().z(-1.0).speed(-5.0).wait(true)).unwrap();
        assert_eq!(arm.speed(), 1000.0);
    }

    #[test]
    fn test_relative_move() {
        let arm = ready_arm(fast_config());
        let start = arm.position();
        arm.set_position(&PositionCommand::relative().z(-5.0).wait(true)).unwrap();
        assert_eq!(arm.position(), start.with_z(start.z - 5.0));
        assert_eq!(arm.target_position(), start.with_z(start.z - 5.0));
    }

    #[test]
    fn test_non_finite_target_rejected() {
        let arm = ready_arm(fast_config());
        let err = arm.set_position(&PositionCommand::default().axis(PoseAxis::Yaw, f64::NAN)).unwrap_err();
        assert!(matches!(err, ActuatorError::InvalidCommand(_)));
    }

    #[test]
    fn test_emergency_stop_latches_until_cleared() {
        let arm = ready_arm(fast_config());
        arm.emergency_stop().unwrap();
        assert_eq!(arm.motion_state(), MotionState::Error);

        let cmd = PositionCommand::relative().z(1.0).wait(true);
        assert_eq!(arm.set_position(&cmd), Err(ActuatorError::Faulted));

        arm.clear_error().unwrap();
        assert_eq!(arm.motion_state(), MotionState::Ready);
        assert!(arm.set_position(&cmd).is_ok());
    }

    #[test]
    fn test_emergency_stop_ignores_enable_gate() {
        let arm = SimulatedActuator::new(fast_config());
        arm.connect().unwrap();
        assert!(arm.emergency_stop().is_ok());
        assert!(arm.motion_state().is_error());
    }

    #[test]
    fn test_taught_servo_pose_moves_arm() {
        let home = Pose::new(250.0, 0.0, 300.0, 180.0, 0.0, 0.0);
        let joints = [0.0, -45.0, 0.0, 0.0, 45.0, 0.0];
        let arm = ready_arm(fast_config()).with_taught_pose(joints, home);

        arm.set_servo_angle(&joints, None, true).unwrap();
        assert_eq!(arm.position(), home);
        assert_eq!(arm.servo_angles(), joints);
    }

    #[test]
    fn test_rejected_servo_pose_keeps_target() {
        let arm = ready_arm(fast_config());
        let joints = [0.0, 10.0, 0.0, 0.0, 0.0, 0.0];
        arm.teach(joints, Pose::new(2000.0, 0.0, 200.0, 180.0, 0.0, 0.0));
        let before = arm.position();
        let target_before = arm.target_position();

        let err = arm.set_servo_angle(&joints, None, true).unwrap_err();
        assert!(matches!(err, ActuatorError::LimitExceeded(_)));
        assert_eq!(arm.target_position(), target_before);
        assert_eq!(arm.servo_angles(), [0.0; 6]);
        assert_eq!(arm.position(), before);
    }

    #[test]
    fn test_tiny_speed_is_rejected() {
        let arm = ready_arm(fast_config());
        let before = arm.position();
        let speed_before = arm.speed();

        let cmd = PositionCommand::absolute(Pose::new(300.0, 0.0, 200.0, 180.0, 0.0, 0.0))
            .speed(1e-300)
            .wait(true);
        assert!(matches!(arm.set_position(&cmd), Err(ActuatorError::InvalidCommand(_))));
        assert_eq!(arm.position(), before);
        assert_eq!(arm.speed(), speed_before);
        assert_eq!(arm.motion_state(), MotionState::Ready);
        assert!(!arm.has_active_motion());
    }

    #[test]
    fn test_untaught_servo_pose_keeps_position() {
        let arm = ready_arm(fast_config());
        let before = arm.position();
        arm.set_servo_angle(&[10.0, 0.0, 0.0, 0.0, 0.0, 0.0], None, true).unwrap();
        assert_eq!(arm.position(), before);
    }

    #[test]
    fn test_vacuum_sensor_script() {
        let arm = ready_arm(SimulatorConfig {
            vacuum_sensor: VacuumSensor::scripted([false, true], false),
            ..fast_config()
        });
        assert!(!arm.vacuum_grasped().unwrap());
        assert!(arm.vacuum_grasped().unwrap());
        // 序列耗尽后返回 fallback
        assert!(!arm.vacuum_grasped().unwrap());
    }

    #[test]
    fn test_vacuum_and_gripper_state() {
        let arm = ready_arm(fast_config());
        arm.set_vacuum_gripper(true, true).unwrap();
        arm.set_vacuum_gripper(false, true).unwrap();
        arm.set_vacuum_gripper(true, false).unwrap();
        assert!(arm.vacuum_on());
        assert_eq!(arm.vacuum_activations(), 2);

        arm.set_gripper_enable(true).unwrap();
        arm.set_gripper_position(850.0, true).unwrap();
        assert!(arm.gripper_enabled());
        assert_eq!(arm.gripper_position(), 850.0);
    }

    #[test]
    fn test_statistics_reset() {
        let arm = ready_arm(fast_config());
        arm.set_position(&PositionCommand::relative().x(10.0).wait(true)).unwrap();
        assert_eq!(arm.statistics().total_movements, 1);

        arm.reset_statistics();
        assert_eq!(arm.statistics(), MotionStatistics::default());
    }

    #[test]
    fn test_version_string() {
        let arm = SimulatedActuator::new(fast_config());
        assert!(arm.version().ends_with("-simulator"));
    }
}
