//! Token estimation for snapshot sizing
//!
//! Counts are a character heuristic (four characters per token), not a real
//! tokenizer, so they are cheap and identical for every model.

mod model;

pub use model::{Model, DEFAULT_TOKEN_LIMIT};

/// Characters assumed per token
pub const CHARS_PER_TOKEN: usize = 4;

/// Result of a token estimate against a limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEstimate {
    /// Estimated tokens, `ceil(characters / 4)`
    pub tokens: usize,
    /// Characters in the text
    pub characters: usize,
    /// Whether `tokens <= limit`
    pub within_limit: bool,
    /// Limit compared against
    pub limit: usize,
}

/// Estimate the tokens of `text` and compare them to `limit`
pub fn estimate_tokens(text: &str, limit: usize) -> TokenEstimate {
    let characters = text.chars().count();
    let tokens = characters.div_ceil(CHARS_PER_TOKEN);

    TokenEstimate {
        tokens,
        characters,
        within_limit: tokens <= limit,
        limit,
    }
}
