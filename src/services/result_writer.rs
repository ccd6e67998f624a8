//! 结果写入服务 - 业务能力层
//!
//! 只负责"把 4 格对比照落盘"能力，不关心流程

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{EncodedImage, IdolInfo, PhotoFrame};

/// 写入 result.toml 的报告
#[derive(Debug, Serialize)]
struct ResultReport<'a> {
    created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    idol: Option<&'a IdolInfo>,
    frames: Vec<FrameRecord>,
}

/// 报告中的一格
#[derive(Debug, Serialize)]
struct FrameRecord {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    idol_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_file: Option<String>,
}

/// 结果写入服务
///
/// 职责：
/// - 把每格的参考图和用户照片解码成图片文件
/// - 写 result.toml 记录艺人信息和文件对应关系
/// - 每次写入一个以时间戳命名的新目录
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 写入一次拍摄结果
    ///
    /// # 参数
    /// - `label`: 目录名后缀（例如会话编号）
    /// - `frames`: 4 格对比照
    /// - `idol_info`: 识别结果（可能没有）
    ///
    /// # 返回
    /// 返回本次结果所在目录
    pub async fn write(
        &self,
        label: &str,
        frames: &[PhotoFrame],
        idol_info: Option<&IdolInfo>,
    ) -> AppResult<PathBuf> {
        let now = chrono::Local::now();
        let dir = self
            .output_dir
            .join(format!("{}_{}", now.format("%Y%m%d_%H%M%S"), label));

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::file_write_failed(dir.display().to_string(), e))?;

        let mut records = Vec::with_capacity(frames.len());
        for frame in frames {
            let idol_file =
                write_image(&dir, frame.id, "idol", frame.idol_image.as_ref()).await?;
            let user_file =
                write_image(&dir, frame.id, "user", frame.user_image.as_ref()).await?;

            records.push(FrameRecord {
                index: frame.id + 1,
                idol_file,
                user_file,
            });
        }

        let report = ResultReport {
            created_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            idol: idol_info,
            frames: records,
        };

        let report_path = dir.join("result.toml");
        let content = toml::to_string_pretty(&report)?;
        fs::write(&report_path, content)
            .await
            .map_err(|e| AppError::file_write_failed(report_path.display().to_string(), e))?;

        info!("💾 结果已保存至: {}", dir.display());

        Ok(dir)
    }
}

async fn write_image(
    dir: &Path,
    frame_id: usize,
    kind: &str,
    image: Option<&EncodedImage>,
) -> AppResult<Option<String>> {
    let Some(image) = image else {
        return Ok(None);
    };

    let file_name = format!("frame_{}_{}.{}", frame_id + 1, kind, image.format().extension());
    let path = dir.join(&file_name);
    let bytes = image.decode()?;

    debug!("写入 {} ({} 字节)", path.display(), bytes.len());

    fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    Ok(Some(file_name))
}
