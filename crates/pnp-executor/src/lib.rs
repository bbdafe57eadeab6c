//! 取放执行器
//!
//! 从邮箱取走 `PickPlaceRequest`，驱动执行机构完成固定的取放序列，
//! 每一步之后发布 `RobotStatus`：
//!
//! ```text
//! Idle → Homing → Approaching → Orienting → Descending → Grasping
//!      → Retreating → Placing → Returning → Idle
//! ```
//!
//! 循环中的执行机构错误不会终止进程：它们被记录到 `CycleReport`，
//! 随后无条件回零，最终状态为回零位姿处的 `OK`。
//! 只有回零本身失败时执行器才进入 `Error`。
//!
//! # 示例
//!
//! ```rust,no_run
//! use pnp_executor::{ExecutorConfig, ExecutorService, MotionExecutor};
//! use pnp_mailbox::Mailbox;
//!
//! # fn main() -> Result<(), pnp_executor::ExecutorError> {
//! let config = ExecutorConfig::default();
//! let mailbox = Mailbox::new(config.mailbox.mailbox_config());
//! let actuator = config.build_simulator();
//! let poll_interval = config.mailbox.poll_interval();
//!
//! let mut executor = MotionExecutor::new(config, actuator, mailbox.clone());
//! executor.startup()?;
//!
//! let (_stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
//! ExecutorService::new(executor, mailbox, poll_interval).run(&stop_rx);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod machine;
mod service;
mod state;
mod status;

pub use config::{
    ConfigError, ExecutorConfig, GraspConfig, GripperConfig, MailboxSettings, MotionConfig,
    SimulatorSettings,
};
pub use error::ExecutorError;
pub use machine::{CycleOutcome, CycleReport, GripperAction, MotionExecutor, StepAction, StepOutcome};
pub use service::ExecutorService;
pub use state::ExecutorState;
pub use status::{StatusHistory, StatusSink};
