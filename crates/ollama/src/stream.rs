//! Newline-delimited JSON stream decoding.
//!
//! The generate endpoint answers with one JSON object per line, each carrying
//! the next `response` fragment. The final object has `done: true`.

use deck_core::{Error, Result};
use serde::Deserialize;
use std::io::{BufRead, Write};

/// One line of the streamed reply.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateChunk {
    /// Next piece of generated text.
    #[serde(default)]
    pub response: String,

    /// Set on the last chunk.
    #[serde(default)]
    pub done: bool,

    /// Server-side error reported mid-stream.
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub prompt_eval_count: Option<u64>,

    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Read every chunk from `reader`, echoing each fragment to `out` as it
/// arrives, and return the concatenated text.
///
/// Blank lines are skipped. A line that is not valid JSON ends the read with
/// [`Error::Stream`].
pub fn read_stream<R: BufRead, W: Write>(reader: R, out: &mut W) -> Result<String> {
    let mut buffer = String::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::Http(format!("Failed to read response stream: {}", e)))?;
        if line.trim().is_empty() {
            continue;
        }

        let chunk: GenerateChunk = serde_json::from_str(&line)
            .map_err(|e| Error::Stream(format!("line {}: {}", idx + 1, e)))?;

        if let Some(message) = &chunk.error {
            log::warn!("Model server reported an error: {}", message);
        }

        if !chunk.response.is_empty() {
            out.write_all(chunk.response.as_bytes())?;
            out.flush()?;
            buffer.push_str(&chunk.response);
        }

        if chunk.done {
            log::debug!(
                "Stream done (prompt tokens: {:?}, generated tokens: {:?})",
                chunk.prompt_eval_count,
                chunk.eval_count
            );
        }
    }

    Ok(buffer)
}
