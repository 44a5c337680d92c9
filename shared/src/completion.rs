//! Bedrock completion client for freeform replies.

use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message, SystemContentBlock,
};
use aws_sdk_bedrockruntime::Client as BedrockClient;

use crate::{Error, Result};

/// Client for the hosted text-completion model.
///
/// One blocking round-trip per call; callers must not hold a pooled
/// database connection across it.
pub struct CompletionClient {
    client: BedrockClient,
    model_id: String,
}

impl CompletionClient {
    /// Create a new completion client.
    pub fn new(client: BedrockClient, model_id: String) -> Self {
        Self { client, model_id }
    }

    /// Generate a reply for the given system context and user prompt.
    pub async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(prompt.to_string()))
            .build()
            .map_err(|e| Error::Completion(format!("Failed to build message: {}", e)))?;

        let inference = InferenceConfiguration::builder()
            .temperature(1.0)
            .top_p(0.95)
            .max_tokens(8192)
            .build();

        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(system.to_string()))
            .messages(message)
            .inference_config(inference)
            .send()
            .await
            .map_err(|e| Error::Completion(format!("Completion call failed: {}", e)))?;

        let output = response
            .output()
            .ok_or_else(|| Error::Completion("No output from completion".to_string()))?;

        let message = output
            .as_message()
            .map_err(|_| Error::Completion("Completion output was not a message".to_string()))?;

        let text = message
            .content()
            .iter()
            .filter_map(|block| block.as_text().ok())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(Error::Completion(
                "Completion returned no text".to_string(),
            ));
        }

        Ok(text)
    }
}
