//! 执行器单例锁
//!
//! 一个邮箱目录同一时刻只允许一个执行器进程服务。
//! 进程崩溃时操作系统会自动释放文件锁，不会留下死锁。

use crate::error::MailboxError;
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 执行器单例锁（Drop 时释放）
#[derive(Debug)]
pub struct ExecutorLock {
    file: File,
    path: PathBuf,
}

impl ExecutorLock {
    /// 尝试获取锁（非阻塞）
    ///
    /// 成功后锁文件内容为当前进程 PID。
    pub fn acquire(lock_path: impl AsRef<Path>) -> Result<Self, MailboxError> {
        let path = lock_path.as_ref();

        // 拿到锁之前不能截断，文件里可能是持锁进程的 PID
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .read(true)
            .open(path)?;

        if !file.try_lock_exclusive()? {
            return Err(MailboxError::AlreadyLocked {
                path: path.to_path_buf(),
            });
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(&file, "{}", std::process::id())?;
        file.sync_all()?;

        info!("Executor lock acquired: {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// 锁文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ExecutorLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!("Executor lock released: {}", self.path.display());
    }
}
