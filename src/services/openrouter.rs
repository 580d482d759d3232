use anyhow::Result;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

use crate::models::ImageUpload;
use crate::services::ai_service::VisionModel;

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type")]
        content_type: String,
        text: String
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: String,
        image_url: ImageData
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

pub struct OpenRouterService {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenRouterService {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn build_request(&self, instruction: &str, image: &ImageUpload, prompt: &str) -> ChatRequest {
        let base64_image = general_purpose::STANDARD.encode(&image.bytes);
        let data_url = format!("data:{};base64,{}", image.mime_type, base64_image);

        log::debug!("📊 Image size: {} bytes ({} base64)", image.bytes.len(), base64_image.len());

        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: vec![
                ContentPart::Text {
                    content_type: "text".to_string(),
                    text: instruction.to_string(),
                },
                ContentPart::ImageUrl {
                    content_type: "image_url".to_string(),
                    image_url: ImageData { url: data_url },
                },
                ContentPart::Text {
                    content_type: "text".to_string(),
                    text: prompt.to_string(),
                },
            ],
        }];

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: 1000,
        }
    }
}

#[async_trait::async_trait]
impl VisionModel for OpenRouterService {
    async fn generate(&self, instruction: &str, image: &ImageUpload, prompt: &str) -> Result<String> {
        let request = self.build_request(instruction, image, prompt);

        log::info!("🤖 Sending '{}' request to OpenRouter with model: {}", instruction, self.model);

        let response = self
            .client
            .post(OPENROUTER_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "PCOS Meal Coach")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 OpenRouter response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ OpenRouter API error ({}): {}", status, error_text);
            anyhow::bail!("OpenRouter API error ({}): {}", status, error_text);
        }

        let chat_response: ChatResponse = response.json().await?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("OpenRouter returned no choices"))?;

        log::info!("💬 OpenRouter reply received ({} chars)", content.len());
        log::debug!("💬 OpenRouter reply: {}", content);

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_image_as_data_url() {
        let service = OpenRouterService::new("test_key".to_string(), "test_model".to_string());
        let image = ImageUpload::new(vec![1, 2, 3], "image/png").unwrap();

        let request = service.build_request("Food Detection", &image, "List the food");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "test_model");
        let content = &json["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "Food Detection");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,AQID");
        assert_eq!(content[2]["text"], "List the food");
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{"id":"gen-1","choices":[{"message":{"role":"assistant","content":"Protein: 40%"}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "Protein: 40%");
    }
}
