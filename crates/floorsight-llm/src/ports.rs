//! LLM port definitions

use async_trait::async_trait;
use floorsight_core::error::Result;
use floorsight_core::models::Stage;
use std::sync::Arc;

/// Sampling parameters sent with every generation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.9,
            top_k: 40,
        }
    }
}

/// Shape the model is asked to answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Free-form text
    Text,
    /// A single JSON document
    Json,
}

impl ResponseFormat {
    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            ResponseFormat::Text => None,
            ResponseFormat::Json => Some("application/json"),
        }
    }
}

/// An encoded image attached to a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InlineImage {
    pub fn jpeg(data: Vec<u8>) -> Self {
        Self {
            mime_type: floorsight_core::imaging::JPEG_MIME.to_string(),
            data,
        }
    }
}

/// One text + image generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Which analysis stage issues the call; used to label failures
    pub stage: Stage,
    pub prompt: String,
    pub image: Option<InlineImage>,
    pub format: ResponseFormat,
    pub sampling: SamplingParams,
}

impl GenerationRequest {
    pub fn new(stage: Stage, prompt: impl Into<String>) -> Self {
        Self {
            stage,
            prompt: prompt.into(),
            image: None,
            format: ResponseFormat::Text,
            sampling: SamplingParams::default(),
        }
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }
}

/// Port for multimodal text generation
#[async_trait]
pub trait MultimodalModel: Send + Sync {
    /// Generate text for a prompt and its attached image
    ///
    /// # Returns
    /// The model's text answer. Transport failures, rejected prompts, and empty
    /// answers are errors.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Get the name/identifier of the model
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: MultimodalModel + ?Sized> MultimodalModel for Arc<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        (**self).generate(request).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sampling() {
        let sampling = SamplingParams::default();
        assert_eq!(sampling.temperature, 0.2);
        assert_eq!(sampling.top_p, 0.9);
        assert_eq!(sampling.top_k, 40);
    }

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new(Stage::StageOne, "describe")
            .with_image(InlineImage::jpeg(vec![0xFF, 0xD8]))
            .with_format(ResponseFormat::Json);

        assert_eq!(request.prompt, "describe");
        assert_eq!(request.format.mime_type(), Some("application/json"));
        assert_eq!(request.image.unwrap().mime_type, "image/jpeg");
        assert_eq!(ResponseFormat::Text.mime_type(), None);
    }

    struct Echo;

    #[async_trait]
    impl MultimodalModel for Echo {
        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            Ok(request.prompt.clone())
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_arc_forwards_to_inner_model() {
        let model: Arc<dyn MultimodalModel> = Arc::new(Echo);
        let request = GenerationRequest::new(Stage::StageTwo, "hello");

        assert_eq!(model.generate(&request).await.unwrap(), "hello");
        assert_eq!(model.model_name(), "echo");
    }
}
