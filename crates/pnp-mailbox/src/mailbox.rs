//! 文件邮箱
//!
//! 两个一次性文件槽：
//! - 请求槽（感知侧写入，执行器取走）：写入前槽必须为空；
//!   取走通过原子 rename 完成，多个取件者中只有一个能拿到内容
//! - 状态槽（执行器写入，感知侧读取）：写临时文件后原子 rename 覆盖，
//!   读者永远不会看到半写的文件

use crate::error::MailboxError;
use pnp_types::{PickPlaceRequest, RobotState, RobotStatus};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::NamedTempFile;
use tracing::{debug, info, trace, warn};

/// 默认请求文件名
pub const DEFAULT_REQUEST_FILE: &str = "pick_and_place.json";
/// 默认状态文件名
pub const DEFAULT_STATUS_FILE: &str = "robot_status.json";
/// 执行器锁文件名
pub const LOCK_FILE: &str = "executor.lock";

/// 取件文件名序号（进程内唯一）
static CLAIM_SEQ: AtomicU64 = AtomicU64::new(0);

/// 邮箱配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxConfig {
    /// 邮箱目录（请求与状态文件必须在同一目录，rename 才是原子的）
    pub dir: PathBuf,
    pub request_file: String,
    pub status_file: String,
}

impl MailboxConfig {
    /// 使用默认文件名
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            request_file: DEFAULT_REQUEST_FILE.to_string(),
            status_file: DEFAULT_STATUS_FILE.to_string(),
        }
    }
}

/// 取件结果
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// 槽为空
    Empty,
    /// 被其他取件者抢先（等同于没有请求）
    Conflict,
    /// 成功取走
    Claimed(PickPlaceRequest),
    /// 已取走但内容无法解析，丢弃
    Discarded(String),
}

/// 条件提交结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 已写入请求槽
    Submitted,
    /// 请求槽已被占用
    SlotOccupied,
    /// 机器人状态不是 OK
    RobotUnavailable(RobotState),
}

/// 文件邮箱
#[derive(Debug, Clone)]
pub struct Mailbox {
    config: MailboxConfig,
}

impl Mailbox {
    pub fn new(config: MailboxConfig) -> Self {
        Self { config }
    }

    /// 使用默认文件名打开目录
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(MailboxConfig::in_dir(dir))
    }

    pub fn config(&self) -> &MailboxConfig {
        &self.config
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    pub fn request_path(&self) -> PathBuf {
        self.config.dir.join(&self.config.request_file)
    }

    pub fn status_path(&self) -> PathBuf {
        self.config.dir.join(&self.config.status_file)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.config.dir.join(LOCK_FILE)
    }

    /// 确认邮箱目录存在
    pub fn ensure_dir(&self) -> Result<(), MailboxError> {
        if self.config.dir.is_dir() {
            Ok(())
        } else {
            Err(MailboxError::MissingDirectory(self.config.dir.clone()))
        }
    }

    // ==================== 请求槽 ====================

    /// 是否有待处理请求
    pub fn has_pending_request(&self) -> bool {
        self.request_path().exists()
    }

    /// 写入请求（槽必须为空）
    ///
    /// 先写同目录临时文件，再以不覆盖方式原子发布；
    /// 两个提交者竞争时只有一个成功，另一个得到 `SlotOccupied`。
    pub fn submit(&self, request: &PickPlaceRequest) -> Result<(), MailboxError> {
        let request_path = self.request_path();
        if request_path.exists() {
            return Err(MailboxError::SlotOccupied);
        }

        let temp = self.write_temp(request)?;
        match temp.persist_noclobber(&request_path) {
            Ok(_) => {
                info!("Request submitted: pick {} / place {}", request.pick, request.place);
                Ok(())
            },
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Err(MailboxError::SlotOccupied),
            Err(e) => Err(MailboxError::Io(e.error)),
        }
    }

    /// 仅当机器人状态为 OK 时提交
    pub fn submit_if_ready(&self, request: &PickPlaceRequest) -> Result<SubmitOutcome, MailboxError> {
        let status = self.read_status();
        if !status.is_ready() {
            debug!("Robot not ready ({}), request held back", status.state);
            return Ok(SubmitOutcome::RobotUnavailable(status.state));
        }

        match self.submit(request) {
            Ok(()) => Ok(SubmitOutcome::Submitted),
            Err(MailboxError::SlotOccupied) => Ok(SubmitOutcome::SlotOccupied),
            Err(e) => Err(e),
        }
    }

    /// 取走请求
    ///
    /// rename 即移除：只有 rename 成功的取件者会读取内容，
    /// 移除失败的请求永远不会被处理。
    pub fn try_claim(&self) -> Result<ClaimOutcome, MailboxError> {
        let request_path = self.request_path();
        if !request_path.exists() {
            return Ok(ClaimOutcome::Empty);
        }

        let claim_path = self.claim_path();
        if let Err(e) = fs::rename(&request_path, &claim_path) {
            return match e.kind() {
                io::ErrorKind::NotFound => {
                    debug!("Request claimed by another consumer");
                    Ok(ClaimOutcome::Conflict)
                },
                _ => Err(e.into()),
            };
        }

        let content = fs::read_to_string(&claim_path);
        if let Err(e) = fs::remove_file(&claim_path) {
            warn!("Failed to remove claim file {}: {}", claim_path.display(), e);
        }

        let content = match content {
            Ok(content) => content,
            Err(e) => {
                warn!("Claimed request unreadable, discarded: {}", e);
                return Ok(ClaimOutcome::Discarded(e.to_string()));
            },
        };

        match serde_json::from_str::<PickPlaceRequest>(&content) {
            Ok(request) if request.is_finite() => {
                info!("Request claimed: pick {} / place {}", request.pick, request.place);
                Ok(ClaimOutcome::Claimed(request))
            },
            Ok(_) => {
                warn!("Claimed request contains non-finite coordinates, discarded");
                Ok(ClaimOutcome::Discarded("non-finite coordinates".to_string()))
            },
            Err(e) => {
                warn!("Claimed request is malformed, discarded: {}", e);
                Ok(ClaimOutcome::Discarded(e.to_string()))
            },
        }
    }

    fn claim_path(&self) -> PathBuf {
        let seq = CLAIM_SEQ.fetch_add(1, Ordering::Relaxed);
        self.config.dir.join(format!(
            ".{}.claim-{}-{}",
            self.config.request_file,
            std::process::id(),
            seq
        ))
    }

    // ==================== 状态槽 ====================

    /// 发布状态（原子替换）
    pub fn publish_status(&self, status: &RobotStatus) -> Result<(), MailboxError> {
        let temp = self.write_temp(status)?;
        temp.persist(self.status_path()).map_err(|e| MailboxError::Io(e.error))?;
        trace!("Status published: {}", status);
        Ok(())
    }

    /// 读取状态（不会失败）
    ///
    /// 文件不存在视为 `UNKNOWN`，无法读取或解析视为 `ERROR`。
    pub fn read_status(&self) -> RobotStatus {
        let status_path = self.status_path();
        match fs::read_to_string(&status_path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Status file {} is malformed: {}", status_path.display(), e);
                RobotStatus::error(None)
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => RobotStatus::unknown(),
            Err(e) => {
                warn!("Status file {} is unreadable: {}", status_path.display(), e);
                RobotStatus::error(None)
            },
        }
    }

    /// 序列化到同目录临时文件
    fn write_temp<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<NamedTempFile, MailboxError> {
        let mut temp = NamedTempFile::new_in(&self.config.dir)?;
        serde_json::to_writer_pretty(temp.as_file_mut(), value)?;
        temp.as_file_mut().flush()?;
        temp.as_file().sync_all()?;
        Ok(temp)
    }
}
