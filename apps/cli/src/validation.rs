//! 输入验证模块
//!
//! 解析并校验命令行中的位姿参数

use anyhow::{Context, Result};
use pnp_types::{Pose, PoseAxis, WorkspaceLimits};

/// 解析位姿参数
///
/// 格式：`x,y,z,roll,pitch,yaw`（mm 与度），六个有限数值。
pub fn parse_pose(input: &str) -> Result<Pose> {
    let values: Vec<f64> = input
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("解析位姿失败: {:?}", input))?;

    if values.len() != 6 {
        anyhow::bail!("位姿需要 6 个数值 (x,y,z,roll,pitch,yaw)，得到 {} 个", values.len());
    }

    for (axis, value) in PoseAxis::ALL.iter().zip(&values) {
        if !value.is_finite() {
            anyhow::bail!("位姿 {} 无效: {}", axis, value);
        }
    }

    Ok(Pose::new(values[0], values[1], values[2], values[3], values[4], values[5]))
}

/// 校验位姿在工作空间内
pub fn validate_in_workspace(name: &str, pose: &Pose, limits: &WorkspaceLimits) -> Result<()> {
    limits
        .check(pose)
        .with_context(|| format!("{} 位姿超出工作空间: {}", name, pose))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pose_valid() {
        let pose = parse_pose("300, 50, 20, 180, 0, 15").unwrap();
        assert_eq!(pose, Pose::new(300.0, 50.0, 20.0, 180.0, 0.0, 15.0));
    }

    #[test]
    fn test_parse_pose_negative_values() {
        let pose = parse_pose("-200,100,10,-180,0,-90").unwrap();
        assert_eq!(pose.x, -200.0);
        assert_eq!(pose.yaw, -90.0);
    }

    #[test]
    fn test_parse_pose_wrong_count() {
        assert!(parse_pose("1,2,3").is_err());
        assert!(parse_pose("1,2,3,4,5,6,7").is_err());
    }

    #[test]
    fn test_parse_pose_not_a_number() {
        assert!(parse_pose("1,2,three,4,5,6").is_err());
        assert!(parse_pose("").is_err());
    }

    #[test]
    fn test_parse_pose_non_finite() {
        let err = parse_pose("1,2,3,NaN,5,6").unwrap_err();
        assert!(err.to_string().contains("roll"));
        assert!(parse_pose("inf,2,3,4,5,6").is_err());
    }

    #[test]
    fn test_validate_in_workspace() {
        let limits = WorkspaceLimits::default();
        assert!(validate_in_workspace("pick", &Pose::new(300.0, 50.0, 20.0, 180.0, 0.0, 15.0), &limits).is_ok());

        let err = validate_in_workspace("pick", &Pose::new(900.0, 0.0, 20.0, 180.0, 0.0, 0.0), &limits)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("x = 900.000"));
    }
}
