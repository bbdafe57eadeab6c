//! 运动状态定义
//!
//! 运动状态由插值线程写入、由调用方线程读取，使用原子操作共享。

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::sync::atomic::{AtomicU8, Ordering};

/// 执行机构运动状态
///
/// 数值与控制器状态码保持一致（0=就绪，1=运动中，3=暂停，4=错误）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum MotionState {
    /// 就绪（默认）
    #[default]
    Ready = 0,

    /// 运动中
    Moving = 1,

    /// 暂停（仿真不会主动进入，保留给真实后端）
    Paused = 3,

    /// 错误（急停后锁存）
    Error = 4,
}

impl MotionState {
    /// 是否为错误状态
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    /// 是否正在运动
    pub fn is_moving(self) -> bool {
        self == Self::Moving
    }
}

/// 运动状态（原子版本，用于线程间共享）
///
/// # 使用场景
///
/// - 插值线程在运动完成时写入 `Ready`
/// - 急停路径写入 `Error`
/// - 执行器线程随时读取
#[derive(Debug)]
pub struct AtomicMotionState {
    inner: AtomicU8,
}

impl AtomicMotionState {
    /// 创建新的原子状态
    pub fn new(state: MotionState) -> Self {
        Self {
            inner: AtomicU8::new(state.into()),
        }
    }

    /// 获取当前状态
    ///
    /// 非法数值按 `Error` 处理。
    pub fn get(&self) -> MotionState {
        MotionState::try_from(self.inner.load(Ordering::Acquire)).unwrap_or(MotionState::Error)
    }

    /// 设置状态
    pub fn set(&self, state: MotionState) {
        self.inner.store(state.into(), Ordering::Release);
    }

    /// 比较并交换（Compare-and-Swap）
    ///
    /// 仅当当前状态为 `current` 时写入 `new`，返回是否写入成功。
    /// 插值线程用它避免覆盖急停写入的 `Error`。
    pub fn transition(&self, current: MotionState, new: MotionState) -> bool {
        self.inner
            .compare_exchange(current.into(), new.into(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for AtomicMotionState {
    fn default() -> Self {
        Self::new(MotionState::Ready)
    }
}
