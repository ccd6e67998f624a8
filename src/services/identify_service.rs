//! 艺人识别服务 - 业务能力层
//!
//! 只负责"看一张图，说出这是谁"，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 参考图以 Data URL 形式作为 Vision 输入
//! - 兼容 OpenAI API 的服务（如 Gemini 的 OpenAI 兼容端点）

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use regex::Regex;
use serde::Deserialize;
use std::future::Future;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::{EncodedImage, IdolInfo};

/// 识别能力
///
/// 给一张参考图，返回艺人信息或失败。调用方把它当作可有可无的补充信息，
/// 没有重试，也没有额外的超时。
pub trait IdolIdentifier {
    fn identify(&self, image: &EncodedImage) -> impl Future<Output = AppResult<IdolInfo>> + Send;
}

const SYSTEM_MESSAGE: &str = "你是一个熟悉韩国、日本、中国及欧美娱乐圈的艺人识别助手。\
                              你只根据图片中人物的外貌、服装和场景判断身份，\
                              并且只输出 JSON，不输出任何解释。";

const USER_MESSAGE: &str = r#"请识别这张照片中的艺人。

返回一个 JSON 对象，字段如下：
- "name": 艺人的名字（必填）
- "group": 所属组合（没有则省略或为 null）
- "description": 一句话介绍这位艺人（必填）
- "sourceUrl": 可以查到该艺人信息的网址（不确定则省略或为 null）

如果无法确定身份，"name" 填 "Unknown Star"，"description" 描述照片中人物的风格。
只返回 JSON，不要返回任何其他内容。"#;

/// 基于 LLM Vision API 的识别服务
///
/// 职责：
/// - 调用 LLM API 识别参考图中的艺人
/// - 解析并校验 LLM 返回的 JSON
/// - 不持有会话，不关心流程顺序
pub struct LlmIdentifier {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmIdentifier {
    /// 创建新的识别服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 带一张图片调用 LLM
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息
    /// - `image_url`: 图片（URL 或 Data URL），追加在用户消息之后
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: &str,
        image_url: &str,
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let messages = build_vision_messages(user_message, system_message, image_url)
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.2)
            .max_tokens(512u32)
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

impl IdolIdentifier for LlmIdentifier {
    async fn identify(&self, image: &EncodedImage) -> AppResult<IdolInfo> {
        debug!("开始识别艺人，参考图 {}", image);

        let response = self
            .send_to_llm(USER_MESSAGE, SYSTEM_MESSAGE, image.as_data_url())
            .await?;

        parse_identify_response(&response)
    }
}

/// 组装 Vision 请求消息：系统消息 + （文本 + 图片）用户消息
fn build_vision_messages(
    user_message: &str,
    system_message: &str,
    image_url: &str,
) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
    let system_msg = ChatCompletionRequestSystemMessageArgs::default()
        .content(system_message)
        .build()?;

    let content_parts = vec![
        ChatCompletionRequestUserMessageContentPart::Text(
            ChatCompletionRequestMessageContentPartText {
                text: user_message.to_string(),
            },
        ),
        ChatCompletionRequestUserMessageContentPart::ImageUrl(
            ChatCompletionRequestMessageContentPartImage {
                image_url: ImageUrl {
                    url: image_url.to_string(),
                    detail: Some(ImageDetail::Auto),
                },
            },
        ),
    ];

    let user_msg = ChatCompletionRequestUserMessageArgs::default()
        .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
        .build()?;

    Ok(vec![
        ChatCompletionRequestMessage::System(system_msg),
        ChatCompletionRequestMessage::User(user_msg),
    ])
}

/// LLM 返回的原始结构，所有字段都可能缺失
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIdolInfo {
    name: Option<String>,
    group: Option<String>,
    description: Option<String>,
    #[serde(alias = "source_url", alias = "url")]
    source_url: Option<String>,
}

fn code_fence_regex() -> &'static Regex {
    static CODE_FENCE: OnceLock<Regex> = OnceLock::new();
    CODE_FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("code fence regex is valid")
    })
}

/// 解析识别结果
///
/// 兼容 LLM 把 JSON 包在 Markdown 代码块里的情况；
/// 空字符串的可选字段视为缺失。
pub(crate) fn parse_identify_response(response: &str) -> AppResult<IdolInfo> {
    let response = response.trim();
    let json = code_fence_regex()
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(response);

    let raw: RawIdolInfo =
        serde_json::from_str(json).map_err(|source| LlmError::InvalidResponse {
            response: crate::utils::logging::truncate_text(response, 200),
            source,
        })?;

    let non_empty = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
    };

    let name = non_empty(raw.name).ok_or(LlmError::MissingField { field: "name" })?;
    let description =
        non_empty(raw.description).ok_or(LlmError::MissingField { field: "description" })?;

    Ok(IdolInfo {
        name,
        group: non_empty(raw.group),
        description,
        source_url: non_empty(raw.source_url),
    })
}
