//! # PnP Types - 共享数据结构
//!
//! **依赖原则**: 纯数据结构，不依赖执行器、邮箱或执行机构实现。
//!
//! ## 包含模块
//!
//! - `pose` - 六自由度位姿（x/y/z + roll/pitch/yaw）
//! - `limits` - 工作空间限位
//! - `request` - 抓取放置请求（感知进程 → 执行器进程）
//! - `status` - 机器人状态（执行器进程 → 任意观察者）
//! - `gripper` - 夹爪类型与状态
//!
//! ## 线上格式
//!
//! 请求与状态文件均为 JSON，字段名与感知侧保持一致：
//!
//! ```json
//! {"pick_pose": {"x": 300.0, "y": 50.0, "z": 20.0,
//!                "roll_degrees": 0.0, "pitch_degrees": 180.0, "yaw_degrees": 15.0},
//!  "place_pose": {"x": -200.0, "y": 100.0, "z": 10.0,
//!                 "roll_degrees": 0.0, "pitch_degrees": 180.0, "yaw_degrees": 0.0}}
//! ```

pub mod gripper;
pub mod limits;
pub mod pose;
pub mod request;
pub mod status;

// 重新导出常用类型
pub use gripper::{GripperKind, GripperState};
pub use limits::{AxisRange, LimitViolation, WorkspaceLimits};
pub use pose::{Pose, PoseAxis, Position};
pub use request::PickPlaceRequest;
pub use status::{GraspOutcome, RobotState, RobotStatus};
