//! status 命令
//!
//! 读取（或持续轮询）机器人状态文件

use anyhow::{Context, Result};
use clap::Args;
use crossbeam_channel::RecvTimeoutError;
use pnp_mailbox::Mailbox;
use pnp_types::{RobotState, RobotStatus};
use std::path::PathBuf;
use std::time::Duration;

use super::config::load_config;

/// 状态查询参数
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// 邮箱目录（覆盖配置）
    #[arg(short, long)]
    pub mailbox: Option<PathBuf>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 持续轮询，状态变化时输出
    #[arg(short, long)]
    pub watch: bool,

    /// 轮询间隔（毫秒）
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,
}

impl StatusCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let mut mailbox_config = config.mailbox.mailbox_config();
        if let Some(dir) = &self.mailbox {
            mailbox_config.dir = dir.clone();
        }
        let mailbox = Mailbox::new(mailbox_config);

        if !self.watch {
            println!("{}", format_status(&mailbox.read_status()));
            return Ok(());
        }

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        ctrlc::set_handler(move || {
            let _ = stop_tx.try_send(());
        })
        .context("设置 Ctrl-C 处理失败")?;

        let interval = Duration::from_millis(self.interval_ms.max(1));
        let mut last: Option<RobotStatus> = None;
        loop {
            let status = mailbox.read_status();
            if last != Some(status) {
                println!("{}", format_status(&status));
                last = Some(status);
            }

            match stop_rx.recv_timeout(interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {},
            }
        }
        Ok(())
    }
}

/// 单行状态输出
fn format_status(status: &RobotStatus) -> String {
    let icon = match status.state {
        RobotState::Ok => "✅",
        RobotState::Busy => "⏳",
        RobotState::Error => "❌",
        RobotState::Unknown => "❔",
    };
    format!("{} {}", icon, status)
}
