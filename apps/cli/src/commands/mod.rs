//! 命令定义和实现

pub mod config;
pub mod run;
pub mod status;
pub mod submit;

pub use config::ConfigCommand;
pub use run::RunCommand;
pub use status::StatusCommand;
pub use submit::SubmitCommand;
