//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责多轮拍摄和资源调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `booth_app` - 应用外壳
//! - 管理应用生命周期（初始化、运行）
//! - 持有相机、识别服务、结果写入服务
//! - 决定拍几轮，每轮结束后重置会话
//! - 输出全局统计信息
//!
//! ### `session_runner` - 单轮拍摄处理器
//! - 导入 4 张参考图
//! - 开始流程并逐步拍摄
//! - 拍摄失败时重试
//!
//! ## 层次关系
//!
//! ```text
//! booth_app (多轮)
//!     ↓
//! session_runner (单轮)
//!     ↓
//! workflow::BoothFlow (状态机)
//!     ↓
//! services (能力层：identify / result)
//!     ↓
//! infrastructure (基础设施：Camera)
//! ```

pub mod booth_app;
pub mod session_runner;

// 重新导出主要类型
pub use booth_app::App;
pub use session_runner::{run_session, upload_references, SessionOutcome};
