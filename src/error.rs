use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 参考图导入错误
    #[error("导入错误: {0}")]
    Ingest(#[from] IngestError),
    /// LLM 识别错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 拍摄错误
    #[error("拍摄错误: {0}")]
    Capture(#[from] CaptureError),
    /// 流程状态错误
    #[error("流程错误: {0}")]
    Workflow(#[from] WorkflowError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 参考图导入错误
#[derive(Debug, Error)]
pub enum IngestError {
    /// 不是浏览器支持的图片格式
    #[error("不支持的图片格式 ({source_name})")]
    UnsupportedFormat { source_name: String },
    /// 图片内容为空
    #[error("图片内容为空 ({source_name})")]
    EmptyImage { source_name: String },
    /// 下载远程图片失败
    #[error("下载图片失败 ({url}): {source}")]
    DownloadFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 声明的 MIME 类型与文件头不一致
    #[error("图片格式不一致 (声明: {declared}, 实际: {detected})")]
    FormatMismatch {
        declared: crate::models::ImageFormat,
        detected: crate::models::ImageFormat,
    },
    /// Data URL 格式不正确
    #[error("Data URL 格式错误: {preview}")]
    MalformedDataUrl { preview: String },
    /// Base64 解码失败
    #[error("Base64 解码失败: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 返回内容无法解析为艺人信息
    #[error("无法解析LLM返回的艺人信息 (响应: {response}): {source}")]
    InvalidResponse {
        response: String,
        source: serde_json::Error,
    },
    /// 必填字段缺失
    #[error("LLM返回的艺人信息缺少字段: {field}")]
    MissingField { field: &'static str },
}

/// 拍摄错误
#[derive(Debug, Error)]
pub enum CaptureError {
    /// 多次尝试后仍未拍到照片
    #[error("第 {step} 步拍摄失败 (已尝试 {attempts} 次)")]
    GaveUp { step: usize, attempts: usize },
}

/// 流程状态错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// 参考图槽位超出范围
    #[error("参考图槽位 {index} 超出范围 [0, {max_index}]")]
    SlotOutOfRange { index: usize, max_index: usize },
    /// 当前状态不允许此操作
    #[error("当前状态 {actual} 不允许执行 {operation} (需要 {expected})")]
    InvalidState {
        operation: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
    /// 还有参考图槽位为空
    #[error("还有 {missing} 个参考图槽位为空")]
    MissingReferences { missing: usize },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 序列化失败
    #[error("TOML序列化失败: {0}")]
    TomlSerializeFailed(#[from] toml::ser::Error),
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::File(FileError::TomlSerializeFailed(err))
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(err: base64::DecodeError) -> Self {
        AppError::Ingest(IngestError::Base64(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建图片下载错误
    pub fn download_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Ingest(IngestError::DownloadFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
