use anyhow::Result;

use crate::models::ImageUpload;

/// A hosted multimodal model: instruction, image and prompt in, reply text out
#[async_trait::async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(&self, instruction: &str, image: &ImageUpload, prompt: &str) -> Result<String>;
}

/// Replays a fixed reply; stands in for the hosted model in tests
#[cfg(test)]
pub struct MockVisionModel {
    pub reply: String,
}

#[cfg(test)]
#[async_trait::async_trait]
impl VisionModel for MockVisionModel {
    async fn generate(&self, instruction: &str, image: &ImageUpload, _prompt: &str) -> Result<String> {
        log::info!("🤖 Mock model call '{}' with {} byte image", instruction, image.bytes.len());
        Ok(self.reply.clone())
    }
}

/// A model that always fails, for exercising upstream error paths
#[cfg(test)]
pub struct FailingVisionModel;

#[cfg(test)]
#[async_trait::async_trait]
impl VisionModel for FailingVisionModel {
    async fn generate(&self, _instruction: &str, _image: &ImageUpload, _prompt: &str) -> Result<String> {
        anyhow::bail!("model unavailable")
    }
}
