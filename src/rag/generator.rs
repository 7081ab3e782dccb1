//! Answer generation: prompt assembly plus one completion call

use std::sync::Arc;

use tracing::debug;

use super::prompts;
use super::ContextAssembler;
use super::GenerationMode;
use super::RetrievedContext;
use crate::config::LlmConfig;
use crate::errors::Result;
use crate::llm::ChatMessage;
use crate::llm::CompletionRequest;
use crate::llm::CompletionService;
use crate::models::FarmerProfile;
use crate::models::Language;

/// Everything that shapes one generated answer
#[derive(Debug, Clone)]
pub struct GenerationInput<'a> {
    pub question: &'a str,
    pub language: Language,
    pub profile: &'a FarmerProfile,
    /// Retrieved documents; ignored in fast mode
    pub contexts: &'a [RetrievedContext],
    pub history: Vec<ChatMessage>,
    pub mode: GenerationMode,
}

pub struct AnswerGenerator {
    completion: Arc<dyn CompletionService>,
    llm: LlmConfig,
    assembler: ContextAssembler,
}

impl AnswerGenerator {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        llm: LlmConfig,
        assembler: ContextAssembler,
    ) -> Self {
        Self {
            completion,
            llm,
            assembler,
        }
    }

    /// Build the completion request for `input` without sending it
    pub fn build_request(&self, input: &GenerationInput<'_>) -> CompletionRequest {
        let (system_prompt, user_prompt) = match input.mode {
            GenerationMode::Grounded => (
                prompts::grounded_system_prompt(input.language),
                prompts::grounded_user_prompt(
                    &self.assembler.profile_section(input.profile),
                    &self.assembler.context_section(input.contexts),
                    input.question,
                    input.language,
                ),
            ),
            GenerationMode::Fast => (
                prompts::fast_system_prompt(input.language),
                prompts::fast_user_prompt(
                    &self.assembler.profile_summary(input.profile),
                    input.question,
                ),
            ),
        };

        let params = self.llm.params(input.mode);
        CompletionRequest {
            system_prompt,
            user_prompt,
            history: input.history.clone(),
            model: params.model.clone(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }

    pub async fn generate(&self, input: &GenerationInput<'_>) -> Result<String> {
        let request = self.build_request(input);
        debug!(
            "Generating {:?} answer with {} ({} history messages)",
            input.mode,
            request.model,
            request.history.len()
        );
        self.completion.complete(&request).await
    }
}
