//! 执行器错误类型定义

use crate::config::ConfigError;
use crate::state::ExecutorState;
use pnp_actuator::ActuatorError;
use pnp_mailbox::MailboxError;
use thiserror::Error;

/// 执行器错误类型
///
/// 循环内部的执行机构错误不会出现在这里：它们在步骤边界被记录到
/// `CycleReport` 并进入回零流程。这里只包含无法继续服务的情况。
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// 启动失败（无法连接或使能）
    #[error("Startup failed: {0}")]
    Startup(#[source] ActuatorError),

    /// 回零失败，执行器进入错误状态
    #[error("Cleanup failed in {state}: {source}")]
    Cleanup {
        state: ExecutorState,
        #[source]
        source: ActuatorError,
    },

    /// 执行器处于错误状态，需先 `reset()`
    #[error("Executor is faulted, reset required")]
    Faulted,

    /// 邮箱错误
    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
