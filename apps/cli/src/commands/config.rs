//! 配置管理命令
//!
//! 执行器配置文件（TOML）的生成与查看

use anyhow::{Context, Result};
use clap::Subcommand;
use pnp_executor::ExecutorConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径：`<config_dir>/pnp/executor.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("pnp");
    path.push("executor.toml");
    Ok(path)
}

/// 加载配置
///
/// 显式路径必须存在；否则依次尝试默认路径、内置默认值。
pub fn load_config(explicit: Option<&Path>) -> Result<ExecutorConfig> {
    if let Some(path) = explicit {
        return ExecutorConfig::load(path).with_context(|| format!("加载配置失败: {}", path.display()));
    }

    match default_config_path() {
        Ok(path) if path.exists() => {
            ExecutorConfig::load(&path).with_context(|| format!("加载配置失败: {}", path.display()))
        },
        _ => Ok(ExecutorConfig::default()),
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 写入默认配置文件
    Init {
        /// 配置文件路径（默认 ~/.config/pnp/executor.toml）
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },

    /// 显示生效的配置
    Show {
        /// 配置文件路径
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Init { path, force } => Self::init(path, force),
            ConfigCommand::Show { path } => Self::show(path),
        }
    }

    fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
        let path = match path {
            Some(path) => path,
            None => default_config_path()?,
        };

        if path.exists() && !force {
            anyhow::bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("创建配置目录失败")?;
        }

        let content = ExecutorConfig::default().to_toml_string()?;
        fs::write(&path, content).with_context(|| format!("写入配置文件失败: {}", path.display()))?;

        println!("✅ 已写入默认配置: {}", path.display());
        Ok(())
    }

    fn show(path: Option<PathBuf>) -> Result<()> {
        let config = load_config(path.as_deref())?;
        print!("{}", config.to_toml_string()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("executor.toml");

        ConfigCommand::Init {
            path: Some(path.clone()),
            force: false,
        }
        .execute()
        .unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded, ExecutorConfig::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("executor.toml");
        fs::write(&path, "approach_height = 200.0\n").unwrap();

        let result = ConfigCommand::Init {
            path: Some(path.clone()),
            force: false,
        }
        .execute();
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "approach_height = 200.0\n");

        ConfigCommand::Init {
            path: Some(path.clone()),
            force: true,
        }
        .execute()
        .unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().approach_height, 250.0);
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
