//! 任务邮箱
//!
//! 感知进程与执行器进程之间唯一的共享资源是一个目录：
//! - 请求槽 `pick_and_place.json`：感知侧写入 `PickPlaceRequest`，执行器原子取走
//! - 状态槽 `robot_status.json`：执行器原子发布 `RobotStatus`，感知侧轮询读取
//! - `executor.lock`：保证同一目录只有一个执行器
//!
//! # 示例
//!
//! ```rust,no_run
//! use pnp_mailbox::{ClaimOutcome, Mailbox};
//!
//! # fn main() -> Result<(), pnp_mailbox::MailboxError> {
//! let mailbox = Mailbox::in_dir("/tmp/pnp");
//! if let ClaimOutcome::Claimed(request) = mailbox.try_claim()? {
//!     println!("pick at {}", request.pick);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod lock;
mod mailbox;

pub use error::MailboxError;
pub use lock::ExecutorLock;
pub use mailbox::{
    ClaimOutcome, DEFAULT_REQUEST_FILE, DEFAULT_STATUS_FILE, LOCK_FILE, Mailbox, MailboxConfig,
    SubmitOutcome,
};
