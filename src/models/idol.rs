use serde::{Deserialize, Serialize};

/// 艺人识别结果
///
/// 由识别服务产出后不再修改，只归 `Session` 所有。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdolInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl IdolInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: None,
            description: description.into(),
            source_url: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_source_url(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = Some(source_url.into());
        self
    }

    /// 展示用名称，例如 `Karina (aespa)`
    pub fn display_name(&self) -> String {
        match &self.group {
            Some(group) => format!("{} ({})", self.name, group),
            None => self.name.clone(),
        }
    }
}

impl std::fmt::Display for IdolInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description = crate::utils::logging::truncate_text(&self.description, 60);
        write!(f, "{} - {}", self.display_name(), description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"name":"Test Idol","description":"desc","sourceUrl":"https://example.com"}"#;
        let info: IdolInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.name, "Test Idol");
        assert_eq!(info.group, None);
        assert_eq!(info.source_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_display_name_with_group() {
        let info = IdolInfo::new("Karina", "leader").with_group("aespa");
        assert_eq!(info.display_name(), "Karina (aespa)");
        assert_eq!(IdolInfo::new("IU", "solo").display_name(), "IU");
    }

    #[test]
    fn test_serialize_skips_missing_optionals() {
        let info = IdolInfo::new("IU", "solo");
        assert_eq!(
            serde_json::to_string(&info).unwrap(),
            r#"{"name":"IU","description":"solo"}"#
        );

        let info = info.with_source_url("https://example.com/iu");
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains(r#""sourceUrl":"https://example.com/iu""#));
    }
}
