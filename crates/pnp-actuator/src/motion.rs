//! 插值线程
//!
//! 每条运动命令对应一个后台线程：从起点到终点对六个坐标做线性插值，
//! 每步持锁写入完整位姿；完成后对 x/y/z 施加到位抖动，模拟真实执行机构的定位误差。

use crate::state::{AtomicMotionState, MotionState};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use pnp_types::Pose;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{Builder, JoinHandle};
use std::time::Duration;
use tracing::{debug, error};

/// 平移距离低于此值（mm）时不插值，直接一次写入目标
pub(crate) const MIN_TRAVEL_MM: f64 = 0.1;

/// 运动结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionOutcome {
    /// 正常到位
    Completed,
    /// 被新命令、急停或断开取消
    Cancelled,
    /// 插值参数无效，未移动
    Failed,
}

/// 插值参数
#[derive(Debug, Clone, Copy)]
pub(crate) struct MotionProfile {
    /// 速度（mm/s）
    pub speed: f64,
    /// 采样频率（步/秒）
    pub step_rate_hz: f64,
    /// 最少步数
    pub min_steps: usize,
    /// 到位抖动上限（mm）
    pub settle_jitter: f64,
}

/// 运动累计统计
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionStatistics {
    /// 累计平移距离（mm）
    pub total_distance: f64,
    /// 完成的运动次数
    pub total_movements: u64,
}

/// 插值线程与调用方共享的状态
#[derive(Debug)]
pub(crate) struct MotionShared {
    /// 当前位姿（每步写入都持锁）
    pub position: Mutex<Pose>,
    /// 取消标志（全局唯一）
    pub stop: AtomicBool,
    /// 运动状态
    pub motion_state: AtomicMotionState,
    /// 累计统计
    pub statistics: Mutex<MotionStatistics>,
}

impl MotionShared {
    pub fn new(initial: Pose) -> Self {
        Self {
            position: Mutex::new(initial),
            stop: AtomicBool::new(false),
            motion_state: AtomicMotionState::new(MotionState::Ready),
            statistics: Mutex::new(MotionStatistics::default()),
        }
    }
}

/// 正在运行的插值任务
pub(crate) struct MotionTask {
    handle: JoinHandle<()>,
    done_rx: Receiver<MotionOutcome>,
}

impl MotionTask {
    /// 启动插值线程
    ///
    /// 调用方必须保证此前的任务已经 join（同一时刻只有一个写者）。
    pub fn spawn(
        shared: Arc<MotionShared>,
        target: Pose,
        profile: MotionProfile,
    ) -> std::io::Result<Self> {
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let handle = Builder::new()
            .name("pnp-motion".to_string())
            .spawn(move || run_motion(&shared, target, profile, done_tx))?;
        Ok(Self { handle, done_rx })
    }

    /// 完成通知接收端（线程退出时必然可读或断开）
    pub fn completion(&self) -> Receiver<MotionOutcome> {
        self.done_rx.clone()
    }

    /// 线程是否已退出
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// 等待线程退出
    pub fn join(self) {
        if self.handle.join().is_err() {
            error!("Motion thread panicked");
        }
    }
}

/// 插值主循环
fn run_motion(
    shared: &MotionShared,
    target: Pose,
    profile: MotionProfile,
    done_tx: Sender<MotionOutcome>,
) {
    let outcome = interpolate(shared, target, profile);
    // 接收端可能已被丢弃（无人等待）
    let _ = done_tx.send(outcome);
}

fn interpolate(shared: &MotionShared, target: Pose, profile: MotionProfile) -> MotionOutcome {
    let start = *shared.position.lock();
    let distance = start.translation_distance(&target);

    if distance < MIN_TRAVEL_MM {
        // 原地运动（包括纯姿态调整）：一次写入
        *shared.position.lock() = target;
        shared.motion_state.transition(MotionState::Moving, MotionState::Ready);
        return MotionOutcome::Completed;
    }

    let move_time = distance / profile.speed;
    let steps = ((move_time * profile.step_rate_hz) as usize).max(profile.min_steps);
    let delay = match Duration::try_from_secs_f64(move_time / steps as f64) {
        Ok(delay) => delay,
        Err(e) => {
            error!("Invalid step delay for speed {}: {}", profile.speed, e);
            shared.motion_state.transition(MotionState::Moving, MotionState::Ready);
            return MotionOutcome::Failed;
        },
    };

    for step in 0..=steps {
        if shared.stop.load(Ordering::Acquire) {
            debug!("Movement stopped at step {}/{}", step, steps);
            return MotionOutcome::Cancelled;
        }

        let t = step as f64 / steps as f64;
        *shared.position.lock() = start.lerp(&target, t);

        if step < steps {
            spin_sleep::sleep(delay);
        }
    }

    let jitter = profile.settle_jitter.abs();
    {
        let mut rng = rand::thread_rng();
        let mut position = shared.position.lock();
        let settled = position
            .with_xy(
                position.x + rng.gen_range(-jitter..=jitter),
                position.y + rng.gen_range(-jitter..=jitter),
            )
            .with_z(position.z + rng.gen_range(-jitter..=jitter));
        *position = settled;
    }

    {
        let mut stats = shared.statistics.lock();
        stats.total_distance += distance;
        stats.total_movements += 1;
    }

    shared.motion_state.transition(MotionState::Moving, MotionState::Ready);
    debug!("Position reached {}", *shared.position.lock());
    MotionOutcome::Completed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_profile() -> MotionProfile {
        MotionProfile {
            speed: 100_000.0,
            step_rate_hz: 50.0,
            min_steps: 10,
            settle_jitter: 0.0,
        }
    }

    #[test]
    fn test_interpolation_reaches_target_without_jitter() {
        let shared = Arc::new(MotionShared::new(Pose::default()));
        shared.motion_state.set(MotionState::Moving);
        let target = Pose::new(100.0, 50.0, 20.0, 10.0, 20.0, 30.0);

        let task = MotionTask::spawn(shared.clone(), target, fast_profile()).unwrap();
        let done = task.completion();
        task.join();

        assert_eq!(done.recv().unwrap(), MotionOutcome::Completed);
        assert_eq!(*shared.position.lock(), target);
        assert_eq!(shared.motion_state.get(), MotionState::Ready);

        let stats = *shared.statistics.lock();
        assert_eq!(stats.total_movements, 1);
        assert!((stats.total_distance - Pose::default().translation_distance(&target)).abs() < 1e-9);
    }

    #[test]
    fn test_orientation_only_move_is_applied_at_once() {
        let start = Pose::new(200.0, 0.0, 200.0, 180.0, 0.0, 0.0);
        let shared = Arc::new(MotionShared::new(start));
        shared.motion_state.set(MotionState::Moving);
        let target = start.with_orientation_of(&Pose::new(0.0, 0.0, 0.0, 0.0, 180.0, 15.0));

        let task = MotionTask::spawn(shared.clone(), target, fast_profile()).unwrap();
        task.join();

        assert_eq!(*shared.position.lock(), target);
        // 原地运动不计入统计
        assert_eq!(shared.statistics.lock().total_movements, 0);
    }

    #[test]
    fn test_stop_flag_cancels_before_first_step() {
        let shared = Arc::new(MotionShared::new(Pose::default()));
        shared.motion_state.set(MotionState::Moving);
        shared.stop.store(true, Ordering::Release);

        let task =
            MotionTask::spawn(shared.clone(), Pose::new(500.0, 0.0, 0.0, 0.0, 0.0, 0.0), fast_profile())
                .unwrap();
        let done = task.completion();
        task.join();

        assert_eq!(done.recv().unwrap(), MotionOutcome::Cancelled);
        assert_eq!(*shared.position.lock(), Pose::default());
        // 取消不修改运动状态
        assert_eq!(shared.motion_state.get(), MotionState::Moving);
    }

    #[test]
    fn test_unrepresentable_step_delay_fails_without_moving() {
        let shared = Arc::new(MotionShared::new(Pose::default()));
        shared.motion_state.set(MotionState::Moving);
        let profile = MotionProfile {
            speed: 1e-300,
            ..fast_profile()
        };

        let task =
            MotionTask::spawn(shared.clone(), Pose::new(300.0, 0.0, 200.0, 0.0, 0.0, 0.0), profile).unwrap();
        let done = task.completion();
        task.join();

        assert_eq!(done.recv().unwrap(), MotionOutcome::Failed);
        assert_eq!(*shared.position.lock(), Pose::default());
        assert_eq!(shared.motion_state.get(), MotionState::Ready);
    }

    #[test]
    fn test_no_delay_after_final_step() {
        let shared = Arc::new(MotionShared::new(Pose::default()));
        shared.motion_state.set(MotionState::Moving);
        // 100 mm / 500 mm/s = 0.2 s，单步
        let profile = MotionProfile {
            speed: 500.0,
            step_rate_hz: 1.0,
            min_steps: 1,
            settle_jitter: 0.0,
        };
        let target = Pose::new(100.0, 0.0, 0.0, 0.0, 0.0, 0.0);

        let started = std::time::Instant::now();
        let task = MotionTask::spawn(shared.clone(), target, profile).unwrap();
        task.join();
        let elapsed = started.elapsed();

        assert_eq!(*shared.position.lock(), target);
        assert!(elapsed >= Duration::from_millis(190), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(350), "elapsed {:?}", elapsed);
    }
}
