//! 相机 - 基础设施层
//!
//! 持有唯一的取景资源，只暴露"按一次快门，得到一张照片"的能力

use anyhow::Result;
use std::future::Future;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crate::models::loaders::{list_image_files, load_reference_image, ImageSource};
use crate::models::EncodedImage;

/// 一次拍摄的提示信息
#[derive(Debug, Clone, Copy)]
pub struct CapturePrompt<'a> {
    /// 取景框里叠加显示的参考图
    pub reference: &'a EncodedImage,
    /// 当前步骤（从 1 开始）
    pub step: usize,
    /// 总步数
    pub total_steps: usize,
}

/// 拍摄能力
///
/// 每次调用对应一次快门：返回 `Some` 表示拍到一张照片，
/// 返回 `None` 表示这次没有拍摄（设备错误等由实现自行处理和记录）。
pub trait Camera {
    fn capture(
        &mut self,
        prompt: &CapturePrompt<'_>,
    ) -> impl Future<Output = Option<EncodedImage>> + Send;
}

/// 文件夹相机
///
/// 职责：
/// - 把文件夹里的图片按文件名顺序当作依次拍下的照片
/// - 交互模式下每次按回车才"按下快门"，输入 `s` 跳过这次拍摄
/// - 不认识 Session，不处理流程
pub struct FolderCamera {
    shots: Vec<PathBuf>,
    cursor: usize,
    shutter: Option<Lines<BufReader<Stdin>>>,
}

impl FolderCamera {
    /// 打开拍摄文件夹
    pub async fn open(folder_path: &str, interactive: bool) -> Result<Self> {
        let shots = list_image_files(folder_path).await?;
        let shutter = interactive.then(|| BufReader::new(tokio::io::stdin()).lines());
        Ok(Self::with_shots(shots, shutter))
    }

    /// 使用给定的照片列表（非交互）
    pub fn from_shots(shots: Vec<PathBuf>) -> Self {
        Self::with_shots(shots, None)
    }

    fn with_shots(shots: Vec<PathBuf>, shutter: Option<Lines<BufReader<Stdin>>>) -> Self {
        Self {
            shots,
            cursor: 0,
            shutter,
        }
    }

    /// 剩余可用照片数量
    pub fn remaining(&self) -> usize {
        self.shots.len().saturating_sub(self.cursor)
    }

    /// 等待用户按下快门，返回 false 表示跳过
    async fn wait_for_shutter(&mut self, prompt: &CapturePrompt<'_>) -> bool {
        let Some(lines) = self.shutter.as_mut() else {
            return true;
        };

        println!(
            "📸 [{}/{}] 请模仿参考图 {} 的姿势，按回车拍摄（输入 s 跳过）",
            prompt.step, prompt.total_steps, prompt.reference
        );

        match lines.next_line().await {
            Ok(Some(line)) => !line.trim().eq_ignore_ascii_case("s"),
            Ok(None) => {
                warn!("标准输入已关闭，快门不可用");
                false
            }
            Err(e) => {
                warn!("读取快门输入失败: {}", e);
                false
            }
        }
    }
}

impl Camera for FolderCamera {
    async fn capture(&mut self, prompt: &CapturePrompt<'_>) -> Option<EncodedImage> {
        if !self.wait_for_shutter(prompt).await {
            info!("[{}/{}] 跳过本次拍摄", prompt.step, prompt.total_steps);
            return None;
        }

        let Some(path) = self.shots.get(self.cursor).cloned() else {
            warn!(
                "[{}/{}] ⚠️ 拍摄文件夹中没有更多照片",
                prompt.step, prompt.total_steps
            );
            return None;
        };
        self.cursor += 1;

        match load_reference_image(&ImageSource::Path(path.clone())).await {
            Ok(image) => {
                info!(
                    "[{}/{}] ✓ 已拍摄: {}",
                    prompt.step,
                    prompt.total_steps,
                    path.display()
                );
                Some(image)
            }
            Err(e) => {
                warn!(
                    "[{}/{}] ⚠️ 照片无法使用 {}: {}",
                    prompt.step,
                    prompt.total_steps,
                    path.display(),
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::image::tests::png_bytes;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "idol_photobooth_camera_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_folder_camera_yields_shots_in_order() {
        let dir = temp_dir("order");
        std::fs::write(dir.join("02.png"), png_bytes(2)).unwrap();
        std::fs::write(dir.join("01.png"), png_bytes(1)).unwrap();

        let reference = EncodedImage::from_bytes(&png_bytes(0), "ref.png").unwrap();
        let prompt = CapturePrompt {
            reference: &reference,
            step: 1,
            total_steps: 4,
        };

        let mut camera = FolderCamera::open(dir.to_str().unwrap(), false)
            .await
            .unwrap();
        assert_eq!(camera.remaining(), 2);

        let first = camera.capture(&prompt).await.unwrap();
        let second = camera.capture(&prompt).await.unwrap();
        assert_eq!(first.decode().unwrap(), png_bytes(1));
        assert_eq!(second.decode().unwrap(), png_bytes(2));

        // 照片用完后不再产出
        assert!(camera.capture(&prompt).await.is_none());
        assert_eq!(camera.remaining(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_shot_is_skipped() {
        let dir = temp_dir("broken");
        let broken = dir.join("broken.png");
        let good = dir.join("good.png");
        std::fs::write(&broken, b"not an image").unwrap();
        std::fs::write(&good, png_bytes(4)).unwrap();

        let reference = EncodedImage::from_bytes(&png_bytes(0), "ref.png").unwrap();
        let prompt = CapturePrompt {
            reference: &reference,
            step: 2,
            total_steps: 4,
        };

        let mut camera = FolderCamera::from_shots(vec![broken, good]);
        assert!(camera.capture(&prompt).await.is_none());
        assert_eq!(
            camera.capture(&prompt).await.unwrap().decode().unwrap(),
            png_bytes(4)
        );
    }
}
