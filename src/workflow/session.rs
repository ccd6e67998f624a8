//! 拍摄会话 - 流程层
//!
//! 一次"上传参考图 → 识别 → 拍摄 → 结果"的完整状态。
//!
//! 状态转换：
//!
//! ```text
//! SETUP ──(4 张参考图齐全)──▶ PROCESSING ──(识别结束，无论成败)──▶ CAPTURE
//!   ▲                                                        │ 每拍一张 step + 1
//!   └──────────────(reset)────────── RESULT ◀──(第 4 张)─────┘
//! ```
//!
//! 这里的所有方法都是同步的，唯一的等待点（识别）由 `BoothFlow` 负责。

use crate::error::WorkflowError;
use crate::models::{AppState, EncodedImage, IdolInfo, PhotoFrame, TOTAL_FRAMES};

/// 一次拍摄的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// 进入下一步，附带新的 step（从 0 开始）
    NextStep(usize),
    /// 第 4 张拍完，进入结果页
    Completed,
}

/// 拍摄会话
#[derive(Debug, Clone)]
pub struct Session {
    state: AppState,
    idol_images: [Option<EncodedImage>; TOTAL_FRAMES],
    user_images: Vec<EncodedImage>,
    idol_info: Option<IdolInfo>,
    current_step: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// 创建空白会话
    pub fn new() -> Self {
        Self {
            state: AppState::Setup,
            idol_images: Default::default(),
            user_images: Vec::with_capacity(TOTAL_FRAMES),
            idol_info: None,
            current_step: 0,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn idol_info(&self) -> Option<&IdolInfo> {
        self.idol_info.as_ref()
    }

    pub fn idol_images(&self) -> &[Option<EncodedImage>; TOTAL_FRAMES] {
        &self.idol_images
    }

    pub fn user_images(&self) -> &[EncodedImage] {
        &self.user_images
    }

    /// 上传（或替换）某个槽位的参考图
    pub fn upload_reference(
        &mut self,
        index: usize,
        image: EncodedImage,
    ) -> Result<(), WorkflowError> {
        self.expect_state("upload_reference", AppState::Setup)?;

        let slot = self
            .idol_images
            .get_mut(index)
            .ok_or(WorkflowError::SlotOutOfRange {
                index,
                max_index: TOTAL_FRAMES - 1,
            })?;
        *slot = Some(image);

        Ok(())
    }

    /// 空槽位数量
    pub fn missing_references(&self) -> usize {
        self.idol_images.iter().filter(|img| img.is_none()).count()
    }

    /// 是否可以开始拍摄（4 个槽位都已填满）
    pub fn can_start(&self) -> bool {
        self.state == AppState::Setup && self.missing_references() == 0
    }

    /// SETUP → PROCESSING
    ///
    /// 返回用于识别的第一张参考图。前置条件不满足时会话保持不变。
    pub fn begin_processing(&mut self) -> Result<EncodedImage, WorkflowError> {
        self.expect_state("start", AppState::Setup)?;

        let missing = self.missing_references();
        if missing > 0 {
            return Err(WorkflowError::MissingReferences { missing });
        }

        let first = self.idol_images[0]
            .clone()
            .ok_or(WorkflowError::MissingReferences { missing: 1 })?;

        self.state = AppState::Processing;
        Ok(first)
    }

    /// PROCESSING → CAPTURE
    ///
    /// `idol_info` 为 `None` 表示识别失败，流程照常继续。
    pub fn finish_processing(&mut self, idol_info: Option<IdolInfo>) -> Result<(), WorkflowError> {
        self.expect_state("finish_processing", AppState::Processing)?;

        self.idol_info = idol_info;
        self.current_step = 0;
        self.state = AppState::Capture;
        Ok(())
    }

    /// 当前步骤需要模仿的参考图
    pub fn current_reference(&self) -> Option<&EncodedImage> {
        if self.state != AppState::Capture {
            return None;
        }
        self.idol_images
            .get(self.current_step)
            .and_then(|img| img.as_ref())
    }

    /// 记录一张用户照片
    ///
    /// step < 3 时前进一步；step == 3 时进入 RESULT，不再递增。
    pub fn record_capture(&mut self, image: EncodedImage) -> Result<CaptureOutcome, WorkflowError> {
        self.expect_state("record_capture", AppState::Capture)?;

        self.user_images.push(image);

        if self.current_step < TOTAL_FRAMES - 1 {
            self.current_step += 1;
            Ok(CaptureOutcome::NextStep(self.current_step))
        } else {
            self.state = AppState::Result;
            Ok(CaptureOutcome::Completed)
        }
    }

    /// 回到初始状态，任何状态下都可以调用
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// 组合出 4 格对比照
    pub fn frames(&self) -> Vec<PhotoFrame> {
        self.idol_images
            .iter()
            .enumerate()
            .map(|(idx, img)| PhotoFrame {
                id: idx,
                idol_image: img.clone(),
                user_image: self.user_images.get(idx).cloned(),
            })
            .collect()
    }

    fn expect_state(
        &self,
        operation: &'static str,
        expected: AppState,
    ) -> Result<(), WorkflowError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidState {
                operation,
                expected: expected.name(),
                actual: self.state.name(),
            })
        }
    }
}
