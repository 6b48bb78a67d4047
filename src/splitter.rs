/*!
 * Line-preserving split of an oversized snapshot into numbered parts
 */

use crate::tokenizer::CHARS_PER_TOKEN;

/// Separator placed between joined parts
pub const PART_SEPARATOR: &str = "\n\n---\n\n";

/// One part of a split snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based position
    pub index: usize,
    /// Whole lines, each terminated by `\n`
    pub content: String,
}

/// Split `text` into chunks of at most `max_tokens * 4` characters
///
/// Lines are never broken: a line that is longer than the budget by itself
/// ends up alone in an over-budget chunk. The newline closing a chunk's last
/// line is not counted, so a chunk may hold one character over the budget. A whitespace-only remainder is
/// dropped.
pub fn split_snapshot(text: &str, max_tokens: usize) -> Vec<Chunk> {
    let max_chars = max_tokens.saturating_mul(CHARS_PER_TOKEN);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for line in text.split('\n') {
        let line_chars = line.chars().count();

        if current_chars + line_chars > max_chars && !current.is_empty() {
            chunks.push(Chunk {
                index: chunks.len() + 1,
                content: std::mem::take(&mut current),
            });
            current_chars = 0;
        }

        current.push_str(line);
        current.push('\n');
        current_chars += line_chars + 1;
    }

    if !current.trim().is_empty() {
        chunks.push(Chunk {
            index: chunks.len() + 1,
            content: current,
        });
    }

    log::debug!("Split {} characters into {} parts", text.chars().count(), chunks.len());
    chunks
}

/// Join chunks as `# Part N` sections for a single clipboard payload
pub fn join_parts(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|chunk| format!("# Part {}\n\n{}", chunk.index, chunk.content))
        .collect::<Vec<_>>()
        .join(PART_SEPARATOR)
}
