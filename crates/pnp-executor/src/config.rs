//! 执行器配置
//!
//! TOML 格式，每个段都带 `#[serde(default)]`，只写需要覆盖的字段即可：
//!
//! ```toml
//! approach_height = 200.0
//!
//! [gripper]
//! kind = "vacuum"
//!
//! [mailbox]
//! dir = "/var/lib/pnp"
//! ```

use pnp_actuator::{SimulatedActuator, SimulatorConfig};
use pnp_mailbox::{DEFAULT_REQUEST_FILE, DEFAULT_STATUS_FILE, MailboxConfig};
use pnp_types::{GripperKind, Pose, WorkspaceLimits};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("Invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 配置值非法
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 夹爪配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GripperConfig {
    pub kind: GripperKind,
    /// 平行夹爪张开位置
    pub open_position: f64,
    /// 平行夹爪闭合位置
    pub close_position: f64,
}

impl Default for GripperConfig {
    fn default() -> Self {
        Self {
            kind: GripperKind::Parallel,
            open_position: 850.0,
            close_position: 0.0,
        }
    }
}

/// 运动参数
///
/// 实际命令速度为 `speed * speed_multiplier`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// 基础速度（mm/s）
    pub speed: f64,
    /// 基础加速度（mm/s²）
    pub acceleration: f64,
    pub speed_multiplier: f64,
    pub acceleration_multiplier: f64,
}

impl MotionConfig {
    /// 命令速度
    pub fn command_speed(&self) -> f64 {
        self.speed * self.speed_multiplier
    }

    /// 命令加速度
    pub fn command_acceleration(&self) -> f64 {
        self.acceleration * self.acceleration_multiplier
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 100.0,
            acceleration: 100.0,
            speed_multiplier: 9.0,
            acceleration_multiplier: 5.0,
        }
    }
}

/// 吸盘抓取重试策略
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraspConfig {
    /// 最大重试次数（不含首次吸附）
    pub max_retries: u32,
    /// 每次重试下探的距离（mm）
    pub z_step: f64,
}

impl Default for GraspConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            z_step: 5.0,
        }
    }
}

/// 邮箱目录与轮询参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxSettings {
    pub dir: PathBuf,
    pub request_file: String,
    pub status_file: String,
    pub poll_interval_ms: u64,
}

impl MailboxSettings {
    pub fn mailbox_config(&self) -> MailboxConfig {
        MailboxConfig {
            dir: self.dir.clone(),
            request_file: self.request_file.clone(),
            status_file: self.status_file.clone(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for MailboxSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            request_file: DEFAULT_REQUEST_FILE.to_string(),
            status_file: DEFAULT_STATUS_FILE.to_string(),
            poll_interval_ms: 1000,
        }
    }
}

/// 仿真执行机构参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    /// 最大速度（mm/s）
    pub max_speed: f64,
    /// 到位抖动上限（mm）
    pub settle_jitter: f64,
    /// 夹爪/关节命令同步等待（ms）
    pub io_delay_ms: u64,
    pub initial_pose: Pose,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            max_speed: 1000.0,
            settle_jitter: 0.5,
            io_delay_ms: 500,
            initial_pose: Pose::new(200.0, 0.0, 200.0, 180.0, 0.0, 0.0),
        }
    }
}

/// 执行器配置
///
/// 标量字段放在前面，TOML 要求它们出现在所有表之前。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// 控制器地址（仿真时仅用于日志）
    pub robot_address: String,
    /// 安全高度（mm）
    pub approach_height: f64,
    /// 回零关节角（度）
    pub home_joints: [f64; 6],
    /// 取放前的过渡位姿（固定 XY，安全 Z）
    pub transit_home: Pose,
    /// 回零关节角对应的笛卡尔位姿（状态中上报）
    pub home_pose: Pose,
    pub gripper: GripperConfig,
    pub motion: MotionConfig,
    pub grasp: GraspConfig,
    pub workspace: WorkspaceLimits,
    pub mailbox: MailboxSettings,
    pub simulator: SimulatorSettings,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            robot_address: "127.0.0.1".to_string(),
            approach_height: 250.0,
            home_joints: [0.0, -45.0, 0.0, 0.0, 45.0, 0.0],
            transit_home: Pose::new(204.6, 0.0, 346.1, 179.9, 0.0, 0.0),
            home_pose: Pose::new(200.0, 0.0, 200.0, 180.0, 0.0, 0.0),
            gripper: GripperConfig::default(),
            motion: MotionConfig::default(),
            grasp: GraspConfig::default(),
            workspace: WorkspaceLimits::default(),
            mailbox: MailboxSettings::default(),
            simulator: SimulatorSettings::default(),
        }
    }
}

impl ExecutorConfig {
    /// 从文件加载并校验
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.workspace.is_well_formed() {
            return Err(ConfigError::Invalid("workspace limits must be finite with min <= max".into()));
        }

        if !self.approach_height.is_finite() || !self.workspace.z.contains(self.approach_height) {
            return Err(ConfigError::Invalid(format!(
                "approach_height {} outside workspace z range",
                self.approach_height
            )));
        }

        for (name, pose) in [
            ("transit_home", &self.transit_home),
            ("home_pose", &self.home_pose),
            ("simulator.initial_pose", &self.simulator.initial_pose),
        ] {
            self.workspace
                .check(pose)
                .map_err(|violation| ConfigError::Invalid(format!("{}: {}", name, violation)))?;
        }

        if self.home_joints.iter().any(|j| !j.is_finite()) {
            return Err(ConfigError::Invalid("home_joints must be finite".into()));
        }

        for (name, value) in [
            ("motion.speed", self.motion.speed),
            ("motion.acceleration", self.motion.acceleration),
            ("motion.speed_multiplier", self.motion.speed_multiplier),
            ("motion.acceleration_multiplier", self.motion.acceleration_multiplier),
            ("simulator.max_speed", self.simulator.max_speed),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)));
            }
        }

        if !(self.grasp.z_step.is_finite() && self.grasp.z_step >= 0.0) {
            return Err(ConfigError::Invalid("grasp.z_step must be non-negative".into()));
        }
        if !(self.simulator.settle_jitter.is_finite() && self.simulator.settle_jitter >= 0.0) {
            return Err(ConfigError::Invalid("simulator.settle_jitter must be non-negative".into()));
        }
        if !self.gripper.open_position.is_finite() || !self.gripper.close_position.is_finite() {
            return Err(ConfigError::Invalid("gripper positions must be finite".into()));
        }
        if self.mailbox.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("mailbox.poll_interval_ms must be positive".into()));
        }

        Ok(())
    }

    /// 仿真执行机构配置
    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            initial_pose: self.simulator.initial_pose,
            workspace_limits: self.workspace,
            default_speed: self.motion.speed,
            max_speed: self.simulator.max_speed,
            settle_jitter: self.simulator.settle_jitter,
            io_delay: Duration::from_millis(self.simulator.io_delay_ms),
            ..SimulatorConfig::default()
        }
    }

    /// 构造仿真执行机构，并示教回零关节角对应的位姿
    pub fn build_simulator(&self) -> SimulatedActuator {
        SimulatedActuator::new(self.simulator_config()).with_taught_pose(self.home_joints, self.home_pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExecutorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.motion.command_speed(), 900.0);
        assert_eq!(config.motion.command_acceleration(), 500.0);
        assert_eq!(config.mailbox.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExecutorConfig::from_toml_str(
            r#"
            approach_height = 180.0

            [gripper]
            kind = "vacuum"

            [grasp]
            max_retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.approach_height, 180.0);
        assert_eq!(config.gripper.kind, GripperKind::Vacuum);
        assert_eq!(config.gripper.open_position, 850.0);
        assert_eq!(config.grasp.max_retries, 5);
        assert_eq!(config.grasp.z_step, 5.0);
        assert_eq!(config.mailbox.request_file, "pick_and_place.json");
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = ExecutorConfig::default();
        config.gripper.kind = GripperKind::Vacuum;
        config.mailbox.dir = PathBuf::from("/tmp/pnp");

        let text = config.to_toml_string().unwrap();
        assert_eq!(ExecutorConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_approach_height_outside_workspace_rejected() {
        let err = ExecutorConfig::from_toml_str("approach_height = 900.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("approach_height")));
    }

    #[test]
    fn test_home_pose_outside_workspace_rejected() {
        let mut config = ExecutorConfig::default();
        config.home_pose = config.home_pose.with_z(-10.0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("home_pose"));
    }

    #[test]
    fn test_non_positive_speed_rejected() {
        let mut config = ExecutorConfig::default();
        config.motion.speed_multiplier = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_gripper_kind_is_parse_error() {
        let err = ExecutorConfig::from_toml_str("[gripper]\nkind = \"magnetic\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ExecutorConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_build_simulator_teaches_home() {
        let mut config = ExecutorConfig::default();
        config.simulator.io_delay_ms = 0;
        let sim = config.build_simulator();
        assert_eq!(sim.config().io_delay, Duration::ZERO);
        assert_eq!(sim.config().workspace_limits, config.workspace);
    }
}
