//! # 工作空间限位
//!
//! 每个位姿轴一个闭区间。超限的位姿直接拒绝，不做截断。

use crate::pose::{Pose, PoseAxis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 单轴闭区间 `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// 值是否在区间内（NaN 永远不在区间内）
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// 限位违规详情
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{axis} = {value:.3} outside workspace range [{min:.3}, {max:.3}]", min = .range.min, max = .range.max)]
pub struct LimitViolation {
    /// 违规轴
    pub axis: PoseAxis,
    /// 违规值
    pub value: f64,
    /// 允许区间
    pub range: AxisRange,
}

/// 工作空间限位
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceLimits {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
    pub roll: AxisRange,
    pub pitch: AxisRange,
    pub yaw: AxisRange,
}

impl Default for WorkspaceLimits {
    fn default() -> Self {
        Self {
            x: AxisRange::new(-700.0, 700.0),
            y: AxisRange::new(-700.0, 700.0),
            z: AxisRange::new(0.0, 700.0),
            roll: AxisRange::new(-360.0, 360.0),
            pitch: AxisRange::new(-360.0, 360.0),
            yaw: AxisRange::new(-360.0, 360.0),
        }
    }
}

impl WorkspaceLimits {
    /// 指定轴的区间
    pub fn range(&self, axis: PoseAxis) -> AxisRange {
        match axis {
            PoseAxis::X => self.x,
            PoseAxis::Y => self.y,
            PoseAxis::Z => self.z,
            PoseAxis::Roll => self.roll,
            PoseAxis::Pitch => self.pitch,
            PoseAxis::Yaw => self.yaw,
        }
    }

    /// 检查位姿
    ///
    /// 按 x, y, z, roll, pitch, yaw 顺序返回第一个违规轴。
    pub fn check(&self, pose: &Pose) -> Result<(), LimitViolation> {
        for axis in PoseAxis::ALL {
            let range = self.range(axis);
            let value = pose.axis(axis);
            if !range.contains(value) {
                return Err(LimitViolation { axis, value, range });
            }
        }
        Ok(())
    }

    /// 位姿是否在工作空间内
    pub fn contains(&self, pose: &Pose) -> bool {
        self.check(pose).is_ok()
    }

    /// 区间本身是否合法（有限且 min ≤ max）
    pub fn is_well_formed(&self) -> bool {
        PoseAxis::ALL.iter().all(|&axis| {
            let r = self.range(axis);
            r.min.is_finite() && r.max.is_finite() && r.min <= r.max
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_limits_accept_home() {
        let limits = WorkspaceLimits::default();
        assert!(limits.contains(&Pose::new(200.0, 0.0, 200.0, 180.0, 0.0, 0.0)));
        assert!(limits.is_well_formed());
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let limits = WorkspaceLimits::default();
        assert!(limits.contains(&Pose::new(700.0, -700.0, 0.0, 360.0, -360.0, 0.0)));
    }

    #[test]
    fn test_reports_first_violating_axis() {
        let limits = WorkspaceLimits::default();
        let err = limits.check(&Pose::new(0.0, 0.0, -1.0, 400.0, 0.0, 0.0)).unwrap_err();
        assert_eq!(err.axis, PoseAxis::Z);
        assert_eq!(err.value, -1.0);
        assert!(err.to_string().contains("z = -1.000"));
    }

    #[test]
    fn test_nan_is_rejected() {
        let limits = WorkspaceLimits::default();
        let err = limits.check(&Pose::default().with_axis(PoseAxis::Pitch, f64::NAN)).unwrap_err();
        assert_eq!(err.axis, PoseAxis::Pitch);
    }

    proptest! {
        #[test]
        fn prop_out_of_range_x_always_rejected(x in 700.001f64..1.0e6) {
            let limits = WorkspaceLimits::default();
            let pose = Pose::new(x, 0.0, 100.0, 0.0, 0.0, 0.0);
            prop_assert_eq!(limits.check(&pose).unwrap_err().axis, PoseAxis::X);
        }

        #[test]
        fn prop_in_range_pose_accepted(
            x in -700.0f64..=700.0,
            y in -700.0f64..=700.0,
            z in 0.0f64..=700.0,
            yaw in -360.0f64..=360.0,
        ) {
            let limits = WorkspaceLimits::default();
            prop_assert!(limits.contains(&Pose::new(x, y, z, 0.0, 0.0, yaw)));
        }
    }
}
