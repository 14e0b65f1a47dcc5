use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIConfig {
    pub base_url: String,
    pub api_key: String,
    pub model_name: String,
    pub max_tokens: u32,
    /// 研报生成用发散一些的采样（0.7）
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            // Gemini 的 OpenAI 兼容端点
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key: String::new(),
            model_name: "gemini-2.5-flash".to_string(),
            max_tokens: 2048,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

impl AIConfig {
    /// API Key 从环境变量加载，不落盘也不硬编码
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.api_key = key;
        }
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: Option<u32>,
    pub message: Option<ChatChoiceMessage>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoiceMessage {
    pub role: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_skips_none() {
        let req = ChatCompletionRequest {
            model: "gemini-2.5-flash".to_string(),
            messages: vec![ChatMessage::user("你好")],
            max_tokens: None,
            temperature: Some(0.7),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"temperature\":0.7"));
        assert!(!json.contains("max_tokens"));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_response_parse_minimal() {
        let body = r###"{"choices":[{"message":{"role":"assistant","content":"## 报告"}}]}"###;
        let resp: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let content = resp
            .choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone());
        assert_eq!(content.as_deref(), Some("## 报告"));
    }

    #[test]
    fn test_config_default_temperature() {
        let config = AIConfig::default();
        assert_eq!(config.temperature, 0.7);
        assert!(config.api_key.is_empty());
    }
}
