//! submit 命令
//!
//! 感知侧：向邮箱提交一次取放请求

use anyhow::Result;
use clap::Args;
use pnp_mailbox::{Mailbox, SubmitOutcome};
use pnp_types::PickPlaceRequest;
use std::path::PathBuf;

use super::config::load_config;
use crate::validation::{parse_pose, validate_in_workspace};

/// 提交请求参数
#[derive(Args, Debug)]
pub struct SubmitCommand {
    /// 抓取位姿 x,y,z,roll,pitch,yaw
    #[arg(long, allow_hyphen_values = true)]
    pub pick: String,

    /// 放置位姿 x,y,z,roll,pitch,yaw
    #[arg(long, allow_hyphen_values = true)]
    pub place: String,

    /// 邮箱目录（覆盖配置）
    #[arg(short, long)]
    pub mailbox: Option<PathBuf>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 不检查机器人状态，直接提交
    #[arg(long)]
    pub force: bool,
}

impl SubmitCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let request = PickPlaceRequest::new(parse_pose(&self.pick)?, parse_pose(&self.place)?);
        validate_in_workspace("pick", &request.pick, &config.workspace)?;
        validate_in_workspace("place", &request.place, &config.workspace)?;

        let mut mailbox_config = config.mailbox.mailbox_config();
        if let Some(dir) = &self.mailbox {
            mailbox_config.dir = dir.clone();
        }
        let mailbox = Mailbox::new(mailbox_config);
        mailbox.ensure_dir()?;

        let outcome = if self.force {
            mailbox.submit(&request)?;
            SubmitOutcome::Submitted
        } else {
            mailbox.submit_if_ready(&request)?
        };

        match outcome {
            SubmitOutcome::Submitted => {
                println!("✅ 已提交: pick {} / place {}", request.pick, request.place);
                Ok(())
            },
            SubmitOutcome::SlotOccupied => anyhow::bail!("上一个请求尚未被取走"),
            SubmitOutcome::RobotUnavailable(state) => {
                anyhow::bail!("机器人状态为 {}，未提交（使用 --force 跳过检查）", state)
            },
        }
    }
}
