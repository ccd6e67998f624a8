//! 拍摄流程控制器 - 流程层
//!
//! 核心职责：驱动 `Session` 完成一次完整的拍摄流程
//!
//! 流程顺序：
//! 1. upload_reference × 4
//! 2. start → 识别第 1 张参考图（失败只记日志）
//! 3. record_capture × 4
//! 4. reset 回到初始状态

use tracing::{debug, error, info, warn};

use crate::error::AppResult;
use crate::models::{AppState, EncodedImage, IdolInfo, PhotoFrame, TOTAL_FRAMES};
use crate::services::IdolIdentifier;
use crate::workflow::session::{CaptureOutcome, Session};
use crate::workflow::session_ctx::SessionCtx;

/// 拍摄流程控制器
///
/// - 独占 `Session`，所有修改都经过这里
/// - 识别服务和相机只通过参数交换数据，从不直接接触 `Session`
/// - `start` 在等待识别期间持有 `&mut self`，不会有其他操作插入
pub struct BoothFlow {
    session: Session,
    ctx: SessionCtx,
}

impl BoothFlow {
    pub fn new(ctx: SessionCtx) -> Self {
        Self {
            session: Session::new(),
            ctx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> AppState {
        self.session.state()
    }

    pub fn ctx(&self) -> SessionCtx {
        self.ctx
    }

    pub fn can_start(&self) -> bool {
        self.session.can_start()
    }

    pub fn current_step(&self) -> usize {
        self.session.current_step()
    }

    pub fn current_reference(&self) -> Option<&EncodedImage> {
        self.session.current_reference()
    }

    pub fn idol_info(&self) -> Option<&IdolInfo> {
        self.session.idol_info()
    }

    pub fn frames(&self) -> Vec<PhotoFrame> {
        self.session.frames()
    }

    /// 上传参考图到指定槽位（覆盖旧图）
    pub fn upload_reference(&mut self, index: usize, image: EncodedImage) -> AppResult<()> {
        self.session.upload_reference(index, image)?;

        info!(
            "{} ✓ 参考图 {}/{} 已就绪 ({} 个槽位待上传)",
            self.ctx,
            index + 1,
            TOTAL_FRAMES,
            self.session.missing_references()
        );

        if self.session.can_start() {
            info!("{} 🎬 参考图已全部上传，可以开始拍摄", self.ctx);
        }

        Ok(())
    }

    /// 开始拍摄：SETUP → PROCESSING → CAPTURE
    ///
    /// 识别失败不会阻塞流程，只是没有艺人信息。
    pub async fn start<I: IdolIdentifier>(&mut self, identifier: &I) -> AppResult<()> {
        let first_image = self.session.begin_processing()?;

        info!("{} ✨ 正在分析明星气场...", self.ctx);

        let idol_info = match identifier.identify(&first_image).await {
            Ok(info) => {
                info!("{} ✓ 识别成功: {}", self.ctx, info);
                Some(info)
            }
            Err(e) => {
                error!("{} ❌ 艺人识别失败，继续拍摄: {}", self.ctx, e);
                None
            }
        };

        self.session.finish_processing(idol_info)?;

        info!(
            "{} 📷 进入拍摄环节，共 {} 步",
            self.ctx, TOTAL_FRAMES
        );

        Ok(())
    }

    /// 记录一张用户照片
    pub fn record_capture(&mut self, image: EncodedImage) -> AppResult<CaptureOutcome> {
        let step = self.session.current_step();
        debug!("{} 记录第 {} 张照片 {}", self.ctx, step + 1, image);

        let outcome = self.session.record_capture(image)?;

        match outcome {
            CaptureOutcome::NextStep(next) => {
                info!(
                    "{} ✓ 第 {}/{} 张完成，下一个姿势: {}",
                    self.ctx,
                    step + 1,
                    TOTAL_FRAMES,
                    next + 1
                );
            }
            CaptureOutcome::Completed => {
                info!("{} 🎉 {} 张照片全部完成", self.ctx, TOTAL_FRAMES);
            }
        }

        Ok(outcome)
    }

    /// 回到初始状态
    pub fn reset(&mut self) {
        if self.session.state() != AppState::Result {
            warn!(
                "{} 在 {} 状态下重置，未完成的照片将被丢弃",
                self.ctx,
                self.session.state()
            );
        }
        self.session.reset();
        info!("{} 🔄 已重置", self.ctx);
    }

    /// 进入下一轮拍摄：重置会话并更新上下文
    pub fn next_session(&mut self) {
        self.reset();
        self.ctx = SessionCtx::new(self.ctx.session_index + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, LlmError, WorkflowError};
    use crate::models::image::tests::png_bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    fn image(seed: u8) -> EncodedImage {
        EncodedImage::from_bytes(&png_bytes(seed), "test.png").unwrap()
    }

    /// 记录调用次数和收到的图片
    struct FakeIdentifier {
        result: Option<IdolInfo>,
        calls: AtomicUsize,
        seen: std::sync::Mutex<Vec<EncodedImage>>,
    }

    impl FakeIdentifier {
        fn ok(info: IdolInfo) -> Self {
            Self {
                result: Some(info),
                calls: AtomicUsize::new(0),
                seen: Default::default(),
            }
        }

        fn failing() -> Self {
            Self {
                result: None,
                calls: AtomicUsize::new(0),
                seen: Default::default(),
            }
        }
    }

    impl IdolIdentifier for FakeIdentifier {
        async fn identify(&self, image: &EncodedImage) -> AppResult<IdolInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(image.clone());
            self.result.clone().ok_or_else(|| {
                AppError::Llm(LlmError::EmptyContent {
                    model: "fake".to_string(),
                })
            })
        }
    }

    fn ready_flow() -> BoothFlow {
        let mut flow = BoothFlow::new(SessionCtx::new(1));
        for i in 0..TOTAL_FRAMES {
            assert_ok!(flow.upload_reference(i, image(i as u8)));
        }
        flow
    }

    #[tokio::test]
    async fn test_start_identifies_first_reference_only() {
        let mut flow = ready_flow();
        let identifier = FakeIdentifier::ok(IdolInfo::new("Test Idol", "desc"));

        assert_ok!(flow.start(&identifier).await);

        assert_eq!(identifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(identifier.seen.lock().unwrap()[0], image(0));
        assert_eq!(flow.state(), AppState::Capture);
        assert_eq!(flow.current_step(), 0);
        assert_eq!(flow.idol_info().map(|i| i.name.as_str()), Some("Test Idol"));
    }

    #[tokio::test]
    async fn test_identification_failure_does_not_block() {
        let mut flow = ready_flow();
        let identifier = FakeIdentifier::failing();

        assert_ok!(flow.start(&identifier).await);

        assert_eq!(identifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(flow.state(), AppState::Capture);
        assert_eq!(flow.current_step(), 0);
        assert!(flow.idol_info().is_none());
    }

    #[tokio::test]
    async fn test_start_with_missing_references_is_rejected() {
        let mut flow = BoothFlow::new(SessionCtx::new(1));
        assert_ok!(flow.upload_reference(0, image(0)));
        let identifier = FakeIdentifier::ok(IdolInfo::new("Test Idol", "desc"));

        let err = assert_err!(flow.start(&identifier).await);
        assert!(matches!(
            err,
            AppError::Workflow(WorkflowError::MissingReferences { missing: 3 })
        ));
        assert_eq!(identifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(flow.state(), AppState::Setup);
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let mut flow = ready_flow();
        let identifier = FakeIdentifier::failing();
        assert_ok!(flow.start(&identifier).await);

        assert_err!(flow.start(&identifier).await);
        assert_eq!(identifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(flow.state(), AppState::Capture);
    }

    #[tokio::test]
    async fn test_next_session_resets_and_advances_ctx() {
        let mut flow = ready_flow();
        assert_ok!(flow.start(&FakeIdentifier::failing()).await);
        for i in 0..TOTAL_FRAMES {
            assert_ok!(flow.record_capture(image(50 + i as u8)));
        }
        assert_eq!(flow.state(), AppState::Result);

        flow.next_session();
        assert_eq!(flow.ctx(), SessionCtx::new(2));
        assert_eq!(flow.state(), AppState::Setup);
        assert!(!flow.can_start());
        assert!(flow.frames().iter().all(|f| f.idol_image.is_none() && f.user_image.is_none()));
    }
}
