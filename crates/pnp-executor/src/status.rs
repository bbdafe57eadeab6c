//! 状态发布
//!
//! 执行器每完成一步就发布一次 `RobotStatus`。发布失败只记录日志，不会中断循环。

use parking_lot::Mutex;
use pnp_mailbox::{Mailbox, MailboxError};
use pnp_types::{RobotState, RobotStatus};
use std::sync::Arc;

/// 状态发布目标
pub trait StatusSink {
    fn publish(&self, status: &RobotStatus) -> Result<(), MailboxError>;
}

impl StatusSink for Mailbox {
    fn publish(&self, status: &RobotStatus) -> Result<(), MailboxError> {
        self.publish_status(status)
    }
}

impl<T: StatusSink + ?Sized> StatusSink for Arc<T> {
    fn publish(&self, status: &RobotStatus) -> Result<(), MailboxError> {
        (**self).publish(status)
    }
}

/// 内存状态历史
///
/// 克隆后共享同一份记录，用于观察完整的状态序列。
#[derive(Debug, Clone, Default)]
pub struct StatusHistory {
    entries: Arc<Mutex<Vec<RobotStatus>>>,
}

impl StatusHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全部记录的快照
    pub fn snapshot(&self) -> Vec<RobotStatus> {
        self.entries.lock().clone()
    }

    /// 最近一次发布的状态
    pub fn last(&self) -> Option<RobotStatus> {
        self.entries.lock().last().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// 指定状态的记录
    pub fn with_state(&self, state: RobotState) -> Vec<RobotStatus> {
        self.entries.lock().iter().filter(|s| s.state == state).copied().collect()
    }
}

impl StatusSink for StatusHistory {
    fn publish(&self, status: &RobotStatus) -> Result<(), MailboxError> {
        self.entries.lock().push(*status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnp_types::Position;

    #[test]
    fn test_history_is_shared_between_clones() {
        let history = StatusHistory::new();
        let sink = history.clone();

        sink.publish(&RobotStatus::busy(Position::new(1.0, 2.0, 3.0))).unwrap();
        sink.publish(&RobotStatus::ok(Position::new(0.0, 0.0, 0.0))).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.with_state(RobotState::Busy).len(), 1);
        assert_eq!(history.last().map(|s| s.state), Some(RobotState::Ok));

        history.clear();
        assert!(sink.is_empty());
    }
}
