/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 参考图文件夹（按文件名顺序取前 4 张）
    pub reference_folder: String,
    /// 显式指定的参考图（路径 / URL / Data URL），非空时忽略文件夹
    pub reference_images: Vec<String>,
    /// 拍摄照片所在文件夹
    pub capture_folder: String,
    /// 是否需要按回车才拍摄
    pub interactive_capture: bool,
    /// 每一步最多尝试拍摄的次数
    pub max_capture_attempts: usize,
    /// 结果输出目录
    pub output_dir: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 连续拍摄几轮
    pub sessions: usize,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_folder: "reference_images".to_string(),
            reference_images: Vec::new(),
            capture_folder: "captures".to_string(),
            interactive_capture: false,
            max_capture_attempts: 3,
            output_dir: "output".to_string(),
            output_log_file: "photobooth_log.txt".to_string(),
            verbose_logging: false,
            sessions: 1,
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai"
                .to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            reference_folder: std::env::var("REFERENCE_FOLDER").unwrap_or(default.reference_folder),
            reference_images: std::env::var("REFERENCE_IMAGES").ok().map(|v| parse_list(&v)).unwrap_or(default.reference_images),
            capture_folder: std::env::var("CAPTURE_FOLDER").unwrap_or(default.capture_folder),
            interactive_capture: std::env::var("INTERACTIVE_CAPTURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.interactive_capture),
            max_capture_attempts: std::env::var("MAX_CAPTURE_ATTEMPTS").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.max_capture_attempts),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            sessions: std::env::var("SESSIONS").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.sessions),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }
}

/// 解析逗号分隔的列表，忽略空项
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
