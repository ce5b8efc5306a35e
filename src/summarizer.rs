//! Summarization pipeline: truncate the input, run the model, then cut the
//! generated text down to at most four sentences.

use tracing::info;

use crate::error::Result;
use crate::llm::{GenerationParams, TextGenerator};

/// Longest input, in characters, handed to the model.
pub const MAX_INPUT_CHARS: usize = 1024;

const SENTENCE_BREAK: &str = ". ";

/// Hard cut at [`MAX_INPUT_CHARS`]; words may be split.
pub fn truncate_input(text: &str) -> &str {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Trims raw model output to three or four `". "`-separated sentences and
/// makes sure it ends with a period.
///
/// With more than four fragments, the fourth is kept only if it has no
/// period of its own. With exactly four, the fourth is dropped unless it
/// already ends in a period.
pub fn normalize_summary(raw: &str) -> String {
    let sentences: Vec<&str> = raw.split(SENTENCE_BREAK).collect();

    let mut summary = if sentences.len() > 4 {
        let keep = if sentences[3].contains('.') { 3 } else { 4 };
        format!("{}.", sentences[..keep].join(SENTENCE_BREAK))
    } else if sentences.len() == 4 && !sentences[3].ends_with('.') {
        format!("{}.", sentences[..3].join(SENTENCE_BREAK))
    } else {
        raw.to_string()
    };

    if !summary.ends_with('.') {
        summary.push('.');
    }
    summary
}

pub async fn summarize(
    model: &dyn TextGenerator,
    text: &str,
    params: &GenerationParams,
) -> Result<String> {
    info!(text = %text, "Received text");
    info!(?params, model = model.name(), "Received params");

    let input = truncate_input(text);
    let raw = model.generate(input, params).await?;
    info!(summary = %raw, "Initial summary result");

    let summary = normalize_summary(&raw);
    info!(summary = %summary, "Final summary result");

    Ok(summary)
}
