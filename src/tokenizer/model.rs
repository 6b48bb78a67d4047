//! Target models and their input token limits

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumProperty};

/// Token limit used when no model or explicit limit is given
pub const DEFAULT_TOKEN_LIMIT: usize = 400_000;

/// Models a snapshot can be sized for
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    Display,
    ValueEnum,
    Serialize,
    Deserialize,
    EnumProperty,
)]
pub enum Model {
    #[value(name = "gpt-5.2")]
    #[strum(props(label = "GPT-5.2", token_limit = "400000", family = "openai"))]
    Gpt52,

    #[value(name = "gemini-3-flash")]
    #[strum(props(label = "Gemini 3 Flash", token_limit = "1000000", family = "google"))]
    Gemini3Flash,

    #[value(name = "gemini-3-pro")]
    #[strum(props(label = "Gemini 3 Pro", token_limit = "65536", family = "google"))]
    Gemini3Pro,

    #[value(name = "claude-opus-4.5")]
    #[strum(props(label = "Claude Opus 4.5", token_limit = "200000", family = "anthropic"))]
    ClaudeOpus45,

    #[value(name = "grok-4")]
    #[strum(props(label = "Grok 4", token_limit = "200000", family = "xai"))]
    Grok4,

    #[value(name = "llama-4")]
    #[strum(props(label = "LLaMA 4", token_limit = "128000", family = "meta"))]
    Llama4,

    #[value(name = "qwen-max")]
    #[strum(props(label = "Qwen Max", token_limit = "1000000", family = "alibaba"))]
    QwenMax,

    #[value(name = "qwen-standard")]
    #[strum(props(label = "Qwen Standard", token_limit = "128000", family = "alibaba"))]
    QwenStandard,
}

impl Model {
    /// Maximum input tokens
    pub fn token_limit(&self) -> usize {
        self.get_str("token_limit")
            .and_then(|limit| limit.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_LIMIT)
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        self.get_str("label").unwrap_or("unknown")
    }

    /// Claude models read XML-structured context best
    pub fn is_claude(&self) -> bool {
        self.get_str("family") == Some("anthropic")
    }
}
