//! 应用外壳 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责多轮拍摄的调度和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、创建识别服务和结果写入服务
//! 2. **参考图来源**：显式列表优先，否则扫描参考图文件夹
//! 3. **多轮拍摄**：每轮结束后写结果、重置会话
//! 4. **全局统计**：汇总完成轮数

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::FolderCamera;
use crate::models::loaders::{list_image_files, ImageSource};
use crate::models::TOTAL_FRAMES;
use crate::orchestrator::session_runner::{run_session, SessionOutcome};
use crate::services::{LlmIdentifier, ResultWriter};
use crate::utils::logging::{
    append_log_line, init_log_file, log_result_grid, log_session_start, log_startup,
    print_final_stats,
};
use crate::workflow::{BoothFlow, SessionCtx};

/// 应用主结构
pub struct App {
    config: Config,
    identifier: LlmIdentifier,
    result_writer: ResultWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        log_startup(config.sessions, &config.llm_model_name);

        if config.llm_api_key.is_empty() {
            warn!("⚠️ 未设置 LLM_API_KEY，艺人识别大概率会失败（不影响拍摄）");
        }

        let identifier = LlmIdentifier::new(&config);
        let result_writer = ResultWriter::new(&config.output_dir);

        Ok(Self {
            config,
            identifier,
            result_writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let sources = self.resolve_reference_sources().await?;

        if sources.is_empty() {
            warn!("⚠️ 没有找到参考图，程序结束");
            return Ok(());
        }

        let mut camera =
            FolderCamera::open(&self.config.capture_folder, self.config.interactive_capture)
                .await
                .with_context(|| format!("无法打开拍摄文件夹: {}", self.config.capture_folder))?;

        let total = self.config.sessions;
        let mut completed = 0;
        let mut flow = BoothFlow::new(SessionCtx::new(1));

        for session_index in 1..=total {
            log_session_start(session_index, total);

            let outcome = run_session(
                &mut flow,
                &self.identifier,
                &mut camera,
                &sources,
                self.config.max_capture_attempts,
            )
            .await;

            match outcome {
                Ok(SessionOutcome::Completed) => {
                    log_result_grid(&flow.frames(), flow.idol_info());
                    self.save_result(&flow, session_index).await;
                    completed += 1;
                }
                Ok(SessionOutcome::NotStarted { missing }) => {
                    self.log_to_file(&format!("{} 参考图缺少 {} 张，未开始", flow.ctx(), missing));
                    break;
                }
                Err(e) => {
                    error!("{} ❌ 拍摄中断: {:#}", flow.ctx(), e);
                    self.log_to_file(&format!("{} 中断: {:#}", flow.ctx(), e));
                    break;
                }
            }

            if session_index < total {
                flow.next_session();
            }
        }

        print_final_stats(completed, total, &self.config.output_log_file);

        Ok(())
    }

    /// 确定参考图来源
    async fn resolve_reference_sources(&self) -> Result<Vec<ImageSource>> {
        if !self.config.reference_images.is_empty() {
            return Ok(self
                .config
                .reference_images
                .iter()
                .map(|raw| ImageSource::parse(raw))
                .collect());
        }

        info!("\n📁 正在扫描参考图文件夹...");
        let files = list_image_files(&self.config.reference_folder).await?;
        Ok(files
            .into_iter()
            .take(TOTAL_FRAMES)
            .map(ImageSource::Path)
            .collect())
    }

    /// 保存一轮结果，失败只记录日志，不影响后续轮次
    async fn save_result(&self, flow: &BoothFlow, session_index: usize) -> Option<PathBuf> {
        let label = format!("session_{}", session_index);
        match self
            .result_writer
            .write(&label, &flow.frames(), flow.idol_info())
            .await
        {
            Ok(dir) => {
                self.log_to_file(&format!("{} 完成 -> {}", flow.ctx(), dir.display()));
                Some(dir)
            }
            Err(e) => {
                error!("{} ❌ 结果保存失败: {}", flow.ctx(), e);
                self.log_to_file(&format!("{} 结果保存失败: {}", flow.ctx(), e));
                None
            }
        }
    }

    fn log_to_file(&self, line: &str) {
        if let Err(e) = append_log_line(&self.config.output_log_file, line) {
            warn!("写入日志文件失败: {}", e);
        }
    }
}
