//! # PnP CLI
//!
//! 取放系统的命令行前端。
//!
//! ```bash
//! # 生成默认配置
//! pnp-cli config init
//!
//! # 执行器（守护进程）
//! pnp-cli run --mailbox /tmp/pnp
//!
//! # 感知侧：提交请求（仅当机器人状态为 OK）
//! pnp-cli submit --mailbox /tmp/pnp --pick 300,50,20,180,0,15 --place -200,100,10,180,0,0
//!
//! # 查看状态
//! pnp-cli status --mailbox /tmp/pnp --watch
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod validation;

use commands::{ConfigCommand, RunCommand, StatusCommand, SubmitCommand};

/// PnP CLI - 取放执行器命令行工具
#[derive(Parser, Debug)]
#[command(name = "pnp-cli")]
#[command(about = "Command-line front end for the pick-and-place executor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 运行执行器
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 提交取放请求
    Submit {
        #[command(flatten)]
        args: SubmitCommand,
    },

    /// 查看机器人状态
    Status {
        #[command(flatten)]
        args: StatusCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pnp_cli=info".parse()?)
                .add_directive("pnp_executor=info".parse()?)
                .add_directive("pnp_mailbox=info".parse()?)
                .add_directive("pnp_actuator=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { args } => args.execute(),
        Commands::Submit { args } => args.execute(),
        Commands::Status { args } => args.execute(),
        Commands::Config(cmd) => cmd.execute(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit_with_negative_pose() {
        let cli = Cli::try_parse_from([
            "pnp-cli",
            "submit",
            "--pick",
            "300,50,20,180,0,15",
            "--place",
            "-200,100,10,180,0,0",
            "--force",
        ])
        .unwrap();

        match cli.command {
            Commands::Submit { args } => {
                assert_eq!(args.place, "-200,100,10,180,0,0");
                assert!(args.force);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::try_parse_from(["pnp-cli", "config", "init", "--path", "/tmp/x.toml"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommand::Init { .. })));
    }
}
