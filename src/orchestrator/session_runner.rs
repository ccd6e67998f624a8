//! 单轮拍摄处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责跑完一轮完整的拍摄，是会话级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **导入参考图**：并发读取 4 个来源，成功的放入对应槽位
//! 2. **开始拍摄**：调用 `BoothFlow::start`（内部完成识别）
//! 3. **逐步拍摄**：按参考图顺序向相机要照片，失败时重试
//! 4. **统计输出**：返回本轮是否走到结果页

use anyhow::Result;
use tracing::{info, warn};

use crate::error::CaptureError;
use crate::infrastructure::{Camera, CapturePrompt};
use crate::models::loaders::{load_reference_images, ImageSource};
use crate::models::{AppState, TOTAL_FRAMES};
use crate::services::IdolIdentifier;
use crate::workflow::{BoothFlow, CaptureOutcome};

/// 单轮拍摄结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// 4 张照片全部完成，处于 RESULT 状态
    Completed,
    /// 参考图不全，没有开始拍摄
    NotStarted { missing: usize },
}

/// 把参考图导入会话
///
/// 导入失败的槽位保持为空，只记录日志。
///
/// # 返回
/// 返回成功导入的数量
pub async fn upload_references(flow: &mut BoothFlow, sources: &[ImageSource]) -> Result<usize> {
    let ctx = flow.ctx();

    if sources.len() > TOTAL_FRAMES {
        warn!(
            "{} ⚠️ 提供了 {} 张参考图，只使用前 {} 张",
            ctx,
            sources.len(),
            TOTAL_FRAMES
        );
    }
    let sources = &sources[..sources.len().min(TOTAL_FRAMES)];

    info!("{} 📁 正在导入 {} 张参考图...", ctx, sources.len());

    let mut uploaded = 0;
    for (index, (source, result)) in sources
        .iter()
        .zip(load_reference_images(sources).await)
        .enumerate()
    {
        match result {
            Ok(image) => {
                flow.upload_reference(index, image)?;
                uploaded += 1;
            }
            Err(e) => {
                warn!("{} ⚠️ 参考图 {} 导入失败 ({}): {}", ctx, index + 1, source, e);
            }
        }
    }

    Ok(uploaded)
}

/// 跑完一轮拍摄
///
/// # 参数
/// - `flow`: 处于 SETUP 状态的流程控制器
/// - `identifier`: 识别服务
/// - `camera`: 相机
/// - `sources`: 参考图来源
/// - `max_capture_attempts`: 每一步最多尝试次数
pub async fn run_session<I, C>(
    flow: &mut BoothFlow,
    identifier: &I,
    camera: &mut C,
    sources: &[ImageSource],
    max_capture_attempts: usize,
) -> Result<SessionOutcome>
where
    I: IdolIdentifier,
    C: Camera,
{
    let ctx = flow.ctx();

    upload_references(flow, sources).await?;

    if !flow.can_start() {
        let missing = flow.session().missing_references();
        warn!("{} ⚠️ 还有 {} 张参考图未上传，无法开始", ctx, missing);
        return Ok(SessionOutcome::NotStarted { missing });
    }

    flow.start(identifier).await?;

    while flow.state() == AppState::Capture {
        let image = capture_step(flow, camera, max_capture_attempts).await?;
        if flow.record_capture(image)? == CaptureOutcome::Completed {
            break;
        }
    }

    Ok(SessionOutcome::Completed)
}

/// 为当前步骤拍一张照片
async fn capture_step<C: Camera>(
    flow: &BoothFlow,
    camera: &mut C,
    max_capture_attempts: usize,
) -> Result<crate::models::EncodedImage> {
    let ctx = flow.ctx();
    let step = flow.current_step();
    let reference = flow
        .current_reference()
        .ok_or_else(|| anyhow::anyhow!("{} 第 {} 步没有参考图", ctx, step + 1))?;

    let prompt = CapturePrompt {
        reference,
        step: step + 1,
        total_steps: TOTAL_FRAMES,
    };

    for attempt in 1..=max_capture_attempts {
        if let Some(image) = camera.capture(&prompt).await {
            return Ok(image);
        }
        warn!(
            "{} ⚠️ 第 {} 步第 {}/{} 次拍摄没有得到照片",
            ctx,
            step + 1,
            attempt,
            max_capture_attempts
        );
    }

    Err(CaptureError::GaveUp {
        step: step + 1,
        attempts: max_capture_attempts,
    }
    .into())
}
