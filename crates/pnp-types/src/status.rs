//! # 机器人状态
//!
//! 执行器在每次状态转换后发布，其他进程只读。

use crate::pose::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 机器人整体状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RobotState {
    /// 未知（状态文件不存在）
    #[default]
    Unknown,
    /// 空闲，可以接收新请求
    Ok,
    /// 正在执行抓取放置
    Busy,
    /// 错误（状态文件损坏，或执行器故障）
    Error,
}

impl RobotState {
    pub fn as_str(self) -> &'static str {
        match self {
            RobotState::Unknown => "UNKNOWN",
            RobotState::Ok => "OK",
            RobotState::Busy => "BUSY",
            RobotState::Error => "ERROR",
        }
    }
}

impl fmt::Display for RobotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 最近一次抓取的验证结果
///
/// 抓取放置周期结束时状态总是 `OK`（尽力而为策略），
/// 观察者需要通过此字段区分抓取是否确认成功。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraspOutcome {
    /// 传感器确认已吸附
    Verified,
    /// 重试耗尽仍未确认（仍继续执行）
    Unverified,
    /// 无传感器（平行夹爪）
    NotSensed,
}

impl fmt::Display for GraspOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GraspOutcome::Verified => "verified",
            GraspOutcome::Unverified => "unverified",
            GraspOutcome::NotSensed => "not_sensed",
        };
        f.write_str(s)
    }
}

/// 机器人状态快照
///
/// 线上格式：`{"status": "OK", "pos": {"x": .., "y": .., "z": ..} | null}`，
/// 可选附带 `"last_grasp"`。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotStatus {
    /// 状态
    #[serde(rename = "status")]
    pub state: RobotState,
    /// 最近一次命令的位置
    #[serde(rename = "pos")]
    pub position: Option<Position>,
    /// 最近一次抓取结果
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_grasp: Option<GraspOutcome>,
}

impl RobotStatus {
    pub fn new(state: RobotState, position: Option<Position>) -> Self {
        Self {
            state,
            position,
            last_grasp: None,
        }
    }

    pub fn ok(position: Position) -> Self {
        Self::new(RobotState::Ok, Some(position))
    }

    pub fn busy(position: Position) -> Self {
        Self::new(RobotState::Busy, Some(position))
    }

    pub fn error(position: Option<Position>) -> Self {
        Self::new(RobotState::Error, position)
    }

    pub fn unknown() -> Self {
        Self::new(RobotState::Unknown, None)
    }

    /// 附带抓取结果
    pub fn with_grasp(mut self, outcome: Option<GraspOutcome>) -> Self {
        self.last_grasp = outcome;
        self
    }

    /// 机器人空闲且就绪（只有此时才允许提交新请求）
    pub fn is_ready(&self) -> bool {
        self.state == RobotState::Ok
    }
}

impl fmt::Display for RobotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(p) => write!(f, "{} @ ({:.1}, {:.1}, {:.1})", self.state, p.x, p.y, p.z)?,
            None => write!(f, "{}", self.state)?,
        }
        if let Some(grasp) = self.last_grasp {
            write!(f, " [grasp: {}]", grasp)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let status = RobotStatus::busy(Position::new(300.0, 50.0, 250.0));
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json["status"], "BUSY");
        assert_eq!(json["pos"]["x"], 300.0);
        assert!(json.get("last_grasp").is_none());
    }

    #[test]
    fn test_null_position_round_trips() {
        let parsed: RobotStatus = serde_json::from_str(r#"{"status": "UNKNOWN", "pos": null}"#).unwrap();
        assert_eq!(parsed, RobotStatus::unknown());
    }

    #[test]
    fn test_last_grasp_serialized_when_present() {
        let status = RobotStatus::ok(Position::new(0.0, 0.0, 0.0)).with_grasp(Some(GraspOutcome::Unverified));
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains(r#""last_grasp":"unverified""#));
    }

    #[test]
    fn test_unknown_state_string_is_rejected() {
        assert!(serde_json::from_str::<RobotStatus>(r#"{"status": "IDLE", "pos": null}"#).is_err());
    }

    #[test]
    fn test_only_ok_is_ready() {
        assert!(RobotStatus::ok(Position::default()).is_ready());
        assert!(!RobotStatus::busy(Position::default()).is_ready());
        assert!(!RobotStatus::unknown().is_ready());
        assert!(!RobotStatus::error(None).is_ready());
    }

    #[test]
    fn test_display() {
        let status = RobotStatus::ok(Position::new(1.0, 2.0, 3.0)).with_grasp(Some(GraspOutcome::Verified));
        assert_eq!(status.to_string(), "OK @ (1.0, 2.0, 3.0) [grasp: verified]");
    }
}
