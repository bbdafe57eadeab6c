//! 执行器状态

use std::fmt;

/// 执行器状态
///
/// 一次取放循环依次经过 `Homing` 到 `Returning`，结束后回到 `Idle`。
/// `Error` 为吸收态：回零失败后进入，只有 `reset()` 成功才能离开。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutorState {
    #[default]
    Idle,
    /// 打开夹爪，移动到过渡位姿
    Homing,
    /// 下降到安全高度
    Approaching,
    /// 旋转到抓取姿态
    Orienting,
    /// 平移到抓取 XY，下降到抓取 Z
    Descending,
    /// 夹紧/吸附（含重试）
    Grasping,
    /// 回到安全高度
    Retreating,
    /// 旋转、平移、下降到放置位姿，释放，回到安全高度
    Placing,
    /// 关节回零，打开夹爪
    Returning,
    Error,
}

impl ExecutorState {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutorState::Idle => "idle",
            ExecutorState::Homing => "homing",
            ExecutorState::Approaching => "approaching",
            ExecutorState::Orienting => "orienting",
            ExecutorState::Descending => "descending",
            ExecutorState::Grasping => "grasping",
            ExecutorState::Retreating => "retreating",
            ExecutorState::Placing => "placing",
            ExecutorState::Returning => "returning",
            ExecutorState::Error => "error",
        }
    }

    /// 是否处于取放循环中（`Homing` 到 `Returning`）
    pub fn is_cycle_step(self) -> bool {
        !matches!(self, ExecutorState::Idle | ExecutorState::Error)
    }
}

impl fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
