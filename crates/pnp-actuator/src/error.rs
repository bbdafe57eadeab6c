//! 执行机构错误类型定义

use pnp_types::LimitViolation;
use thiserror::Error;

/// 执行机构错误类型
///
/// 所有错误均以返回值形式上报，由执行器在步骤边界处理。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActuatorError {
    /// 运动未使能
    #[error("Motion is disabled")]
    MotionDisabled,

    /// 目标超出工作空间
    #[error("Workspace limit exceeded: {0}")]
    LimitExceeded(#[from] LimitViolation),

    /// 未连接
    #[error("Actuator is not connected")]
    NotConnected,

    /// 急停后处于错误状态（需先 `clear_error()`）
    #[error("Actuator is faulted, clear the error first")]
    Faulted,

    /// 无效命令（如 NaN 坐标）
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// 后端内部错误（如运动线程无法启动）
    #[error("Backend failure: {0}")]
    Backend(String),
}
