//! 执行机构模块
//!
//! 本模块提供机械臂执行机构的抽象与仿真实现，包括：
//! - `Actuator` trait（真实硬件后端与仿真后端的统一接口）
//! - 位置命令（绝对/相对、逐轴可选）
//! - 运动状态（原子读写）
//! - `SimulatedActuator`：后台线程线性插值、可取消、工作空间限位
//!
//! # 并发模型
//!
//! 每条位置命令启动一个插值线程；新命令先请求取消并 join 旧线程，
//! 再启动新线程，因此任意时刻最多只有一个线程在写当前位置。
//! 当前位置由一把锁保护，读者总是拿到完整的六轴快照。

mod adapter;
pub mod command;
mod error;
mod motion;
pub mod simulator;
pub mod state;

pub use adapter::Actuator;
pub use command::{PoseTarget, PositionCommand};
pub use error::ActuatorError;
pub use motion::{MotionOutcome, MotionStatistics};
pub use simulator::{MIN_SPEED, SimulatedActuator, SimulatorConfig, VacuumSensor};
pub use state::{AtomicMotionState, MotionState};
