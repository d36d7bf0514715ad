//! Assistant Tools
//!
//! Prompt-template wrappers over a `TextGenerator`. Each tool assembles one
//! prompt, makes one call, and echoes its inputs back next to the generated
//! text. Failures become error results; nothing is propagated to the caller.

use crate::{outcome::ToolResult, text_gen::TextGenerator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Answer {
    pub question: String,
    pub context_provided: bool,
    pub answer: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeneratedCode {
    pub description: String,
    pub language: String,
    pub code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Ideas {
    pub topic: String,
    pub requested_ideas: u32,
    pub ideas: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Explanation {
    pub concept: String,
    pub level: String,
    pub explanation: String,
}

/// Builds the prompt for a plain question, prefixing any context.
pub fn question_prompt(question: &str, context: &str) -> String {
    if context.trim().is_empty() {
        question.to_string()
    } else {
        format!("Context: {}\n\nQuestion: {}", context, question)
    }
}

pub fn code_prompt(description: &str, language: &str) -> String {
    format!(
        "Write {language} code for the following requirement:\n{description}\n\n\
         Return only the code, with brief comments on the key parts."
    )
}

pub fn ideas_prompt(topic: &str, count: u32) -> String {
    format!(
        "Brainstorm {count} creative ideas about: {topic}\n\n\
         Present them as a numbered list with a one-sentence description each."
    )
}

pub fn explanation_prompt(concept: &str, level: &str) -> String {
    format!(
        "Explain the concept of '{concept}' for a {level} audience. \
         Use clear language and include one concrete example."
    )
}

/// Text-generation tools backed by a shared `TextGenerator`.
#[derive(Clone)]
pub struct Assistant {
    generator: Arc<dyn TextGenerator>,
}

impl Assistant {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Answers `question`, using `context` when it is non-empty.
    pub async fn ask(&self, question: &str, context: &str) -> ToolResult<Answer> {
        let context_provided = !context.trim().is_empty();
        self.run("ask", question_prompt(question, context), |answer| Answer {
            question: question.to_string(),
            context_provided,
            answer,
        })
        .await
    }

    pub async fn generate_code(&self, description: &str, language: &str) -> ToolResult<GeneratedCode> {
        self.run("generate_code", code_prompt(description, language), |code| {
            GeneratedCode {
                description: description.to_string(),
                language: language.to_string(),
                code,
            }
        })
        .await
    }

    pub async fn brainstorm_ideas(&self, topic: &str, count: u32) -> ToolResult<Ideas> {
        self.run("brainstorm_ideas", ideas_prompt(topic, count), |ideas| Ideas {
            topic: topic.to_string(),
            requested_ideas: count,
            ideas,
        })
        .await
    }

    pub async fn explain_concept(&self, concept: &str, level: &str) -> ToolResult<Explanation> {
        self.run("explain_concept", explanation_prompt(concept, level), |explanation| {
            Explanation {
                concept: concept.to_string(),
                level: level.to_string(),
                explanation,
            }
        })
        .await
    }

    async fn run<T>(
        &self,
        tool: &'static str,
        prompt: String,
        shape: impl FnOnce(String) -> T,
    ) -> ToolResult<T> {
        match self.generator.generate(&prompt).await {
            Ok(text) => {
                info!(tool, answer_len = text.len(), "Text generation succeeded.");
                ToolResult::Success(shape(text))
            }
            Err(e) => {
                error!(tool, error = ?e, "Text generation failed.");
                ToolResult::error(format!("Text generation failed: {:#}", e))
            }
        }
    }
}
