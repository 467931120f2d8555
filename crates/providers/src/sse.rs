//! Server-sent-event frame extraction for the completion stream.
//!
//! The decoder consumes raw byte chunks in arrival order and yields the
//! incremental content fragments carried in `data: {...}` frames
//! (`choices[0].delta.content`). Chunk boundaries carry no meaning: a
//! frame split across two network reads is reassembled by deferring the
//! unparseable remainder until more bytes arrive.

use serde::Deserialize;

/// The end-of-stream sentinel payload.
const DONE_SENTINEL: &str = "[DONE]";

/// Incremental SSE line decoder.
///
/// Single consumer, no internal concurrency: the caller feeds each
/// network chunk through [`push`](Self::push) and applies the returned
/// fragments in order.
pub struct SseLineDecoder {
    buffer: String,
    done: bool,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            done: false,
        }
    }

    /// Whether the `[DONE]` sentinel has been seen.
    ///
    /// The stream does not have to end with the sentinel (reader
    /// end-of-stream terminates just as well), but once seen, the
    /// decoder ignores further input.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one chunk, returning every content fragment completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.done {
            return Vec::new();
        }

        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut fragments = Vec::new();

        while let Some(newline_idx) = self.buffer.find('\n') {
            let mut line = self.buffer[..newline_idx].to_string();
            self.buffer = self.buffer[newline_idx + 1..].to_string();

            if line.ends_with('\r') {
                line.pop();
            }

            // Blank lines and comments separate events; nothing to extract.
            if line.trim().is_empty() || line.starts_with(':') {
                continue;
            }

            let Some(payload) = line.strip_prefix("data: ") else {
                continue;
            };
            let payload = payload.trim();

            if payload == DONE_SENTINEL {
                self.done = true;
                break;
            }

            match serde_json::from_str::<StreamResponse>(payload) {
                Ok(parsed) => {
                    if let Some(content) = parsed
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.delta.content)
                        && !content.is_empty()
                    {
                        fragments.push(content);
                    }
                }
                Err(_) => {
                    // Not a complete frame yet. Defer the whole
                    // remainder until the next chunk arrives.
                    self.buffer = format!("{line}\n{}", self.buffer);
                    break;
                }
            }
        }

        fragments
    }
}

impl Default for SseLineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// --- Streaming SSE types ---

/// A single SSE `data: {...}` frame from a streaming response.
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}
