//! # Idol Photobooth
//!
//! 一个"偶像四格"拍照应用：上传 4 张偶像照片，识别偶像身份，
//! 再按参考姿势依次拍下 4 张自己的照片，最后生成对比结果。
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（相机），只暴露能力
//! - `Camera` / `FolderCamera` - 按一次快门，得到一张照片
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `LlmIdentifier` - 识别参考图中的艺人
//! - `ResultWriter` - 把对比结果写到磁盘
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义一次拍摄的状态机
//! - `Session` - SETUP → PROCESSING → CAPTURE → RESULT
//! - `BoothFlow` - 唯一持有 Session 的控制器
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/booth_app` - 应用外壳，多轮拍摄
//! - `orchestrator/session_runner` - 单轮拍摄
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{Camera, CapturePrompt, FolderCamera};
pub use models::{AppState, EncodedImage, IdolInfo, PhotoFrame, TOTAL_FRAMES};
pub use orchestrator::{run_session, App, SessionOutcome};
pub use services::{IdolIdentifier, LlmIdentifier, ResultWriter};
pub use workflow::{BoothFlow, CaptureOutcome, Session, SessionCtx};
