//! run 命令
//!
//! 以守护进程方式运行执行器：持有邮箱锁，轮询请求，直到 Ctrl-C

use anyhow::{Context, Result};
use clap::Args;
use pnp_executor::{ExecutorService, MotionExecutor};
use pnp_mailbox::{ExecutorLock, Mailbox};
use std::path::PathBuf;
use tracing::info;

use super::config::load_config;

/// 执行器运行参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 邮箱目录（覆盖配置）
    #[arg(short, long)]
    pub mailbox: Option<PathBuf>,
}

impl RunCommand {
    pub fn execute(&self) -> Result<()> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(dir) = &self.mailbox {
            config.mailbox.dir = dir.clone();
        }

        let mailbox = Mailbox::new(config.mailbox.mailbox_config());
        mailbox.ensure_dir()?;
        let _lock = ExecutorLock::acquire(mailbox.lock_path()).context("邮箱已被另一个执行器占用")?;

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        ctrlc::set_handler(move || {
            let _ = stop_tx.try_send(());
        })
        .context("设置 Ctrl-C 处理失败")?;

        println!("🤖 执行器启动");
        println!("  控制器: {} (simulated)", config.robot_address);
        println!("  夹爪: {}", config.gripper.kind);
        println!("  邮箱: {}", mailbox.dir().display());

        let poll_interval = config.mailbox.poll_interval();
        let actuator = config.build_simulator();
        let mut executor = MotionExecutor::new(config, actuator, mailbox.clone());
        executor.startup().context("执行器启动失败")?;

        println!("✅ 已就绪，等待请求（Ctrl-C 退出）");
        let mut service = ExecutorService::new(executor, mailbox, poll_interval);
        service.run(&stop_rx);

        info!("Executor stopped");
        println!("👋 已停止，共完成 {} 个循环", service.cycles());
        Ok(())
    }
}
