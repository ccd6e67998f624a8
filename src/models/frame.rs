use serde::{Deserialize, Serialize};

use crate::models::image::EncodedImage;

/// 参考图槽位数量，也是拍摄步数
pub const TOTAL_FRAMES: usize = 4;

/// 流程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppState {
    /// 上传参考图
    Setup,
    /// 等待艺人识别
    Processing,
    /// 逐步拍摄
    Capture,
    /// 展示对比结果
    Result,
}

impl AppState {
    /// 获取状态名称
    pub fn name(self) -> &'static str {
        match self {
            AppState::Setup => "SETUP",
            AppState::Processing => "PROCESSING",
            AppState::Capture => "CAPTURE",
            AppState::Result => "RESULT",
        }
    }
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 一格对比照：参考图 + 用户照片
///
/// 由 `Session::frames()` 按需计算，不单独保存。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFrame {
    pub id: usize,
    pub idol_image: Option<EncodedImage>,
    pub user_image: Option<EncodedImage>,
}

impl PhotoFrame {
    /// 两张图是否都已就绪
    pub fn is_complete(&self) -> bool {
        self.idol_image.is_some() && self.user_image.is_some()
    }
}
