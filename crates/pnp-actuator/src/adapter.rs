//! 执行机构抽象
//!
//! 执行器只依赖此 trait，真实控制器与仿真器在此处对接。

use crate::command::PositionCommand;
use crate::error::ActuatorError;
use crate::state::MotionState;
use pnp_types::Pose;

/// 机械臂执行机构
///
/// 所有方法都通过返回值上报错误，不允许 panic 穿过调用边界。
/// 方法均为 `&self`：实现内部自行处理同步，便于在多线程间共享。
pub trait Actuator: Send + Sync {
    /// 建立连接
    fn connect(&self) -> Result<(), ActuatorError>;

    /// 断开连接
    ///
    /// 必须取消正在进行的运动，并在后台任务退出后才返回。
    fn disconnect(&self) -> Result<(), ActuatorError>;

    /// 是否已连接
    fn is_connected(&self) -> bool;

    /// 运动使能开关
    fn enable_motion(&self, enable: bool) -> Result<(), ActuatorError>;

    /// 笛卡尔位置命令
    fn set_position(&self, command: &PositionCommand) -> Result<(), ActuatorError>;

    /// 当前位姿快照
    fn position(&self) -> Pose;

    /// 当前运动状态
    fn motion_state(&self) -> MotionState;

    /// 关节空间命令（度）
    fn set_servo_angle(
        &self,
        joints: &[f64; 6],
        speed: Option<f64>,
        wait: bool,
    ) -> Result<(), ActuatorError>;

    /// 平行夹爪使能
    fn set_gripper_enable(&self, enable: bool) -> Result<(), ActuatorError>;

    /// 平行夹爪开合位置
    fn set_gripper_position(&self, position: f64, wait: bool) -> Result<(), ActuatorError>;

    /// 真空吸盘开关
    fn set_vacuum_gripper(&self, on: bool, wait: bool) -> Result<(), ActuatorError>;

    /// 读取吸附传感器（`true` 表示已吸住物体）
    fn vacuum_grasped(&self) -> Result<bool, ActuatorError>;

    /// 急停：取消运动并锁存错误状态（不受使能开关影响）
    fn emergency_stop(&self) -> Result<(), ActuatorError>;

    /// 清除错误状态
    fn clear_error(&self) -> Result<(), ActuatorError>;

    /// 控制器版本
    fn version(&self) -> String;
}
