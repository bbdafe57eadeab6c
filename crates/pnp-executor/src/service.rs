//! 邮箱轮询服务
//!
//! 每个轮询周期检查一次请求槽；取到请求就执行一次完整循环。
//! 关闭信号通过 crossbeam channel 传递（发送或断开都会触发退出）。

use crate::error::ExecutorError;
use crate::machine::{CycleReport, MotionExecutor};
use crate::status::StatusSink;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use pnp_actuator::Actuator;
use pnp_mailbox::{ClaimOutcome, Mailbox};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 执行器服务
pub struct ExecutorService<A, S> {
    executor: MotionExecutor<A, S>,
    mailbox: Mailbox,
    poll_interval: Duration,
    cycles: u64,
}

impl<A: Actuator, S: StatusSink> ExecutorService<A, S> {
    pub fn new(executor: MotionExecutor<A, S>, mailbox: Mailbox, poll_interval: Duration) -> Self {
        Self {
            executor,
            mailbox,
            poll_interval,
            cycles: 0,
        }
    }

    pub fn executor(&self) -> &MotionExecutor<A, S> {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut MotionExecutor<A, S> {
        &mut self.executor
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// 已完成的循环数
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// 单次轮询
    ///
    /// 执行器处于错误状态时不取件（请求留在槽中），先尝试 `reset()`。
    pub fn run_once(&mut self) -> Result<Option<CycleReport>, ExecutorError> {
        if self.executor.is_faulted() {
            self.executor.reset()?;
        }

        match self.mailbox.try_claim()? {
            ClaimOutcome::Claimed(request) => {
                let report = self.executor.run_cycle(&request)?;
                self.cycles += 1;
                Ok(Some(report))
            },
            ClaimOutcome::Empty => Ok(None),
            ClaimOutcome::Conflict => {
                debug!("Request taken by another consumer");
                Ok(None)
            },
            ClaimOutcome::Discarded(reason) => {
                warn!("Ignoring unreadable request: {}", reason);
                Ok(None)
            },
        }
    }

    /// 轮询直到收到关闭信号，退出时断开执行机构
    ///
    /// 单次轮询的错误只记录日志，不会终止服务。
    pub fn run(&mut self, shutdown: &Receiver<()>) {
        info!(
            "Polling {} every {:?}",
            self.mailbox.request_path().display(),
            self.poll_interval
        );

        loop {
            if let Err(e) = self.run_once() {
                error!("Poll failed: {}", e);
            }

            match shutdown.recv_timeout(self.poll_interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {},
            }
        }

        info!("Executor service stopping after {} cycles", self.cycles);
        if let Err(e) = self.executor.shutdown() {
            warn!("Failed to disconnect actuator: {}", e);
        }
    }
}
