//! # 夹爪
//!
//! 夹爪状态只由执行器修改，感知侧不直接操作。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 夹爪类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GripperKind {
    /// 平行夹爪（位置控制，无抓取传感器）
    #[default]
    Parallel,
    /// 真空吸盘（带负压传感器）
    Vacuum,
}

impl fmt::Display for GripperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GripperKind::Parallel => f.write_str("parallel"),
            GripperKind::Vacuum => f.write_str("vacuum"),
        }
    }
}

/// 夹爪状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GripperState {
    /// 夹爪类型
    pub kind: GripperKind,
    /// 是否处于夹紧/吸附状态
    pub engaged: bool,
}

impl GripperState {
    pub fn new(kind: GripperKind) -> Self {
        Self {
            kind,
            engaged: false,
        }
    }
}
