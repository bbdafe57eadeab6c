//! # 抓取放置请求
//!
//! 感知进程每检测到一个目标物体创建一次，执行器进程恰好消费一次。

use crate::pose::Pose;
use serde::{Deserialize, Serialize};

/// 抓取放置请求
///
/// 线上格式：`{"pick_pose": {...}, "place_pose": {...}}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickPlaceRequest {
    /// 抓取位姿（全局坐标系）
    #[serde(rename = "pick_pose")]
    pub pick: Pose,
    /// 放置位姿（全局坐标系）
    #[serde(rename = "place_pose")]
    pub place: Pose,
}

impl PickPlaceRequest {
    pub fn new(pick: Pose, place: Pose) -> Self {
        Self { pick, place }
    }

    /// 两个位姿的所有坐标都是有限值
    pub fn is_finite(&self) -> bool {
        self.pick.is_finite() && self.place.is_finite()
    }
}
