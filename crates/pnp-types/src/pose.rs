//! # 位姿定义
//!
//! 机械臂末端在全局坐标系下的六自由度位姿。
//!
//! - 平移：x / y / z（mm，与工作空间限位同单位）
//! - 姿态：roll / pitch / yaw（度）

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 位姿轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoseAxis {
    X,
    Y,
    Z,
    Roll,
    Pitch,
    Yaw,
}

impl PoseAxis {
    /// 全部六个轴（与 `Pose` 字段顺序一致）
    pub const ALL: [PoseAxis; 6] = [
        PoseAxis::X,
        PoseAxis::Y,
        PoseAxis::Z,
        PoseAxis::Roll,
        PoseAxis::Pitch,
        PoseAxis::Yaw,
    ];

    /// 轴名称
    pub fn name(self) -> &'static str {
        match self {
            PoseAxis::X => "x",
            PoseAxis::Y => "y",
            PoseAxis::Z => "z",
            PoseAxis::Roll => "roll",
            PoseAxis::Pitch => "pitch",
            PoseAxis::Yaw => "yaw",
        }
    }
}

impl fmt::Display for PoseAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 六自由度位姿
///
/// 值类型（`Copy`），构造后不可变；六个字段总是同时存在。
/// 序列化字段名沿用请求文件格式（`roll_degrees` 等）。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// X（mm）
    pub x: f64,
    /// Y（mm）
    pub y: f64,
    /// Z（mm）
    pub z: f64,
    /// 横滚角（度）
    #[serde(rename = "roll_degrees")]
    pub roll: f64,
    /// 俯仰角（度）
    #[serde(rename = "pitch_degrees")]
    pub pitch: f64,
    /// 偏航角（度）
    #[serde(rename = "yaw_degrees")]
    pub yaw: f64,
}

impl Pose {
    /// 创建位姿
    pub const fn new(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            x,
            y,
            z,
            roll,
            pitch,
            yaw,
        }
    }

    /// 从数组创建（顺序：x, y, z, roll, pitch, yaw）
    pub const fn from_array(values: [f64; 6]) -> Self {
        Self::new(values[0], values[1], values[2], values[3], values[4], values[5])
    }

    /// 转换为数组（顺序：x, y, z, roll, pitch, yaw）
    pub const fn to_array(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.roll, self.pitch, self.yaw]
    }

    /// 读取指定轴的值
    pub fn axis(&self, axis: PoseAxis) -> f64 {
        match axis {
            PoseAxis::X => self.x,
            PoseAxis::Y => self.y,
            PoseAxis::Z => self.z,
            PoseAxis::Roll => self.roll,
            PoseAxis::Pitch => self.pitch,
            PoseAxis::Yaw => self.yaw,
        }
    }

    /// 返回替换了指定轴的新位姿
    pub fn with_axis(mut self, axis: PoseAxis, value: f64) -> Self {
        match axis {
            PoseAxis::X => self.x = value,
            PoseAxis::Y => self.y = value,
            PoseAxis::Z => self.z = value,
            PoseAxis::Roll => self.roll = value,
            PoseAxis::Pitch => self.pitch = value,
            PoseAxis::Yaw => self.yaw = value,
        }
        self
    }

    /// 平移部分
    pub fn position(&self) -> Position {
        Position {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }

    /// 返回替换了 X/Y 的新位姿（保持 Z 与姿态）
    pub fn with_xy(self, x: f64, y: f64) -> Self {
        Self { x, y, ..self }
    }

    /// 返回替换了 Z 的新位姿
    pub fn with_z(self, z: f64) -> Self {
        Self { z, ..self }
    }

    /// 返回替换了姿态的新位姿（保持平移）
    pub fn with_orientation_of(self, other: &Pose) -> Self {
        Self {
            roll: other.roll,
            pitch: other.pitch,
            yaw: other.yaw,
            ..self
        }
    }

    /// 平移向量
    pub fn translation(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// 平移距离（仅 x/y/z 欧氏距离，姿态不计入）
    pub fn translation_distance(&self, other: &Pose) -> f64 {
        (other.translation() - self.translation()).norm()
    }

    /// 线性插值
    ///
    /// 六个坐标各自独立插值，`t` ∈ [0, 1]。
    pub fn lerp(&self, target: &Pose, t: f64) -> Pose {
        let a = self.to_array();
        let b = target.to_array();
        let mut out = [0.0; 6];
        for i in 0..6 {
            out[i] = a[i] + (b[i] - a[i]) * t;
        }
        Pose::from_array(out)
    }

    /// 所有坐标都是有限值
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X:{:.1} Y:{:.1} Z:{:.1} R:{:.1} P:{:.1} Y:{:.1}",
            self.x, self.y, self.z, self.roll, self.pitch, self.yaw
        )
    }
}

/// 位置（位姿的平移部分）
///
/// 状态文件的 `pos` 字段只携带 x/y/z。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// X/Y 是否与给定位姿一致（容差内）
    pub fn matches_xy(&self, pose: &Pose, tolerance: f64) -> bool {
        (self.x - pose.x).abs() <= tolerance && (self.y - pose.y).abs() <= tolerance
    }
}

impl From<Pose> for Position {
    fn from(pose: Pose) -> Self {
        pose.position()
    }
}
