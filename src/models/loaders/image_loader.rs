//! 参考图导入
//!
//! 负责把本地文件 / 远程 URL / Data URL 读成 [`EncodedImage`]。
//! 导入失败只返回错误，由调用方记录日志，对应槽位保持为空。

use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, FileError};
use crate::models::image::EncodedImage;

/// 可识别的图片扩展名
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "avif"];

/// 参考图来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// 本地文件
    Path(PathBuf),
    /// http(s) 远程图片
    Url(String),
    /// 已编码的 Data URL
    DataUrl(String),
}

impl ImageSource {
    /// 从配置字符串解析来源
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("data:") {
            ImageSource::DataUrl(raw.to_string())
        } else if raw.starts_with("http://") || raw.starts_with("https://") {
            ImageSource::Url(raw.to_string())
        } else {
            ImageSource::Path(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::Path(path) => write!(f, "{}", path.display()),
            ImageSource::Url(url) => write!(f, "{}", url),
            ImageSource::DataUrl(data) => {
                write!(f, "{}", crate::utils::logging::truncate_text(data, 32))
            }
        }
    }
}

/// 导入单张参考图
pub async fn load_reference_image(source: &ImageSource) -> AppResult<EncodedImage> {
    match source {
        ImageSource::Path(path) => load_from_path(path).await,
        ImageSource::Url(url) => load_from_url(url).await,
        ImageSource::DataUrl(data) => EncodedImage::parse(data),
    }
}

/// 并发导入多张参考图，结果顺序与输入一致
pub async fn load_reference_images(sources: &[ImageSource]) -> Vec<AppResult<EncodedImage>> {
    join_all(sources.iter().map(load_reference_image)).await
}

async fn load_from_path(path: &Path) -> AppResult<EncodedImage> {
    let path_str = path.display().to_string();
    if !path.exists() {
        return Err(FileError::NotFound { path: path_str }.into());
    }

    let bytes = fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    debug!("读取参考图 {} ({} 字节)", path_str, bytes.len());

    EncodedImage::from_bytes(&bytes, &path_str)
}

async fn load_from_url(url: &str) -> AppResult<EncodedImage> {
    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::download_failed(url, e))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::download_failed(url, e))?;

    debug!("下载参考图 {} ({} 字节)", url, bytes.len());

    EncodedImage::from_bytes(&bytes, url)
}

/// 列出文件夹中的图片文件（按文件名排序）
pub async fn list_image_files(folder_path: &str) -> Result<Vec<PathBuf>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut image_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_image = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);

        if is_image {
            image_files.push(path);
        }
    }

    image_files.sort();

    info!("在 {} 中找到 {} 张图片", folder_path, image_files.len());

    Ok(image_files)
}
