//! 邮箱错误类型定义

use std::path::PathBuf;
use thiserror::Error;

/// 邮箱错误类型
#[derive(Error, Debug)]
pub enum MailboxError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 请求槽已被占用（上一个请求尚未被取走）
    #[error("Request slot is occupied")]
    SlotOccupied,

    /// 邮箱目录不存在
    #[error("Mailbox directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// 执行器锁已被其他进程持有
    #[error("Executor lock {} is held by another process", .path.display())]
    AlreadyLocked { path: PathBuf },
}
