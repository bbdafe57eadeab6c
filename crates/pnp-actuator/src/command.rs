//! 位置命令定义
//!
//! 每个轴可选：未给出的轴保持当前值。相对模式下给出的值是增量。
//!
//! # 示例
//!
//! ```rust
//! use pnp_actuator::PositionCommand;
//! use pnp_types::Pose;
//!
//! // 绝对运动，阻塞等待完成
//! let cmd = PositionCommand::absolute(Pose::new(300.0, 50.0, 250.0, 0.0, 180.0, 15.0))
//!     .speed(900.0)
//!     .wait(true);
//!
//! // 相对运动：Z 下降 5mm
//! let lower = PositionCommand::relative().z(-5.0).wait(true);
//! # let _ = (cmd, lower);
//! ```

use pnp_types::{Pose, PoseAxis};

/// 逐轴可选的目标位姿
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseTarget {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub roll: Option<f64>,
    pub pitch: Option<f64>,
    pub yaw: Option<f64>,
}

impl PoseTarget {
    /// 六轴全部给出
    pub fn full(pose: Pose) -> Self {
        Self {
            x: Some(pose.x),
            y: Some(pose.y),
            z: Some(pose.z),
            roll: Some(pose.roll),
            pitch: Some(pose.pitch),
            yaw: Some(pose.yaw),
        }
    }

    fn get(&self, axis: PoseAxis) -> Option<f64> {
        match axis {
            PoseAxis::X => self.x,
            PoseAxis::Y => self.y,
            PoseAxis::Z => self.z,
            PoseAxis::Roll => self.roll,
            PoseAxis::Pitch => self.pitch,
            PoseAxis::Yaw => self.yaw,
        }
    }

    fn slot(&mut self, axis: PoseAxis) -> &mut Option<f64> {
        match axis {
            PoseAxis::X => &mut self.x,
            PoseAxis::Y => &mut self.y,
            PoseAxis::Z => &mut self.z,
            PoseAxis::Roll => &mut self.roll,
            PoseAxis::Pitch => &mut self.pitch,
            PoseAxis::Yaw => &mut self.yaw,
        }
    }

    /// 基于当前位姿解析出完整目标
    pub fn resolve(&self, current: &Pose, relative: bool) -> Pose {
        PoseAxis::ALL.iter().fold(*current, |pose, &axis| match self.get(axis) {
            Some(value) if relative => pose.with_axis(axis, current.axis(axis) + value),
            Some(value) => pose.with_axis(axis, value),
            None => pose,
        })
    }
}

/// 笛卡尔位置命令
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionCommand {
    /// 目标（逐轴可选）
    pub target: PoseTarget,
    /// 速度（mm/s），`None` 沿用上一次速度
    pub speed: Option<f64>,
    /// 加速度（mm/s²），仿真后端只记录不使用
    pub acceleration: Option<f64>,
    /// 相对运动
    pub relative: bool,
    /// 阻塞直到运动完成（或被新命令取代）
    pub wait: bool,
}

impl PositionCommand {
    /// 绝对运动到完整位姿
    pub fn absolute(pose: Pose) -> Self {
        Self {
            target: PoseTarget::full(pose),
            ..Self::default()
        }
    }

    /// 相对运动（默认所有轴增量为空）
    pub fn relative() -> Self {
        Self {
            relative: true,
            ..Self::default()
        }
    }

    /// 设置单轴目标（或增量）
    pub fn axis(mut self, axis: PoseAxis, value: f64) -> Self {
        *self.target.slot(axis) = Some(value);
        self
    }

    pub fn x(self, value: f64) -> Self {
        self.axis(PoseAxis::X, value)
    }

    pub fn y(self, value: f64) -> Self {
        self.axis(PoseAxis::Y, value)
    }

    pub fn z(self, value: f64) -> Self {
        self.axis(PoseAxis::Z, value)
    }

    pub fn roll(self, value: f64) -> Self {
        self.axis(PoseAxis::Roll, value)
    }

    pub fn pitch(self, value: f64) -> Self {
        self.axis(PoseAxis::Pitch, value)
    }

    pub fn yaw(self, value: f64) -> Self {
        self.axis(PoseAxis::Yaw, value)
    }

    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn acceleration(mut self, acceleration: f64) -> Self {
        self.acceleration = Some(acceleration);
        self
    }

    pub fn wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    /// 基于当前位姿解析出完整目标
    pub fn resolve(&self, current: &Pose) -> Pose {
        self.target.resolve(current, self.relative)
    }
}
