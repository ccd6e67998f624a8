//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use anyhow::Result;
use std::fs;
use tracing::info;

use crate::models::{IdolInfo, PhotoFrame};

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n拍摄日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 追加一行到日志文件
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    use std::io::Write;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%H:%M:%S"),
        line
    )?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `sessions`: 计划拍摄轮数
/// - `model`: 识别模型
pub fn log_startup(sessions: usize, model: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 偶像四格拍照模式");
    info!("📊 计划拍摄: {} 轮", sessions);
    info!("🤖 识别模型: {}", model);
    info!("{}", "=".repeat(60));
}

/// 记录单轮开始信息
pub fn log_session_start(session_index: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始第 {}/{} 轮拍摄", session_index, total);
    info!("{}", "=".repeat(60));
}

/// 打印 4 格对比结果
///
/// # 参数
/// - `frames`: 4 格对比照
/// - `idol_info`: 识别结果
pub fn log_result_grid(frames: &[PhotoFrame], idol_info: Option<&IdolInfo>) {
    info!("\n{}", "─".repeat(60));
    match idol_info {
        Some(info) => {
            info!("🌟 {}", info.display_name());
            info!("   {}", truncate_text(&info.description, 80));
            if let Some(url) = &info.source_url {
                info!("   🔗 {}", url);
            }
        }
        None => info!("🌟 未识别出艺人"),
    }
    for frame in frames {
        let mark = |present: bool| if present { "✓" } else { "✗" };
        info!(
            "  第 {} 格  偶像 {}  |  我 {}",
            frame.id + 1,
            mark(frame.idol_image.is_some()),
            mark(frame.user_image.is_some())
        );
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `completed`: 完成轮数
/// - `total`: 计划轮数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(completed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部拍摄完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 完成: {}/{}", completed, total);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("偶像四格拍照", 2), "偶像...");
    }
}
