use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use bytes::BytesMut;
use diplom_logging::diplom_warn;
use encoding_rs::{Encoding, UTF_8};
use futures_util::stream::{self, Stream, StreamExt};

use crate::StreamRecord;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed record on line {line}: {message}")]
    MalformedRecord { line: usize, message: String },
    #[error("stream aborted: {0}")]
    Transport(String),
}

/// Incremental newline-delimited JSON decoder.
///
/// Lines are split on raw bytes, so chunk boundaries may fall anywhere,
/// including inside a multi-byte character. A record is only produced once
/// its terminating newline has arrived.
#[derive(Debug)]
pub struct RecordDecoder {
    buffer: BytesMut,
    /// Bytes at the front of `buffer` already known to hold no newline.
    scanned: usize,
    encoding: &'static Encoding,
    line: usize,
    failed: bool,
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self::with_encoding(UTF_8)
    }

    /// Encodings that do not keep `\n` as a single byte fall back to UTF-8.
    pub fn with_encoding(encoding: &'static Encoding) -> Self {
        let encoding = if encoding.is_ascii_compatible() {
            encoding
        } else {
            UTF_8
        };
        Self {
            buffer: BytesMut::new(),
            scanned: 0,
            encoding,
            line: 0,
            failed: false,
        }
    }

    /// Picks the text encoding from a `Content-Type` charset, defaulting to UTF-8.
    pub fn for_content_type(content_type: Option<&str>) -> Self {
        let encoding = content_type
            .and_then(extract_charset)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        Self::with_encoding(encoding)
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Feeds one chunk and returns every record completed by it, in order.
    ///
    /// Decoding stops at the first malformed line; the error is the last
    /// element and later input is ignored.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<StreamRecord, DecodeError>> {
        if self.failed {
            return Vec::new();
        }
        self.buffer.extend_from_slice(chunk);

        let mut out = Vec::new();
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            let end = self.scanned + offset;
            let line = self.buffer.split_to(end + 1);
            self.scanned = 0;
            self.line += 1;
            match self.parse_line(&line[..end]) {
                Ok(Some(record)) => out.push(Ok(record)),
                Ok(None) => {}
                Err(err) => {
                    self.failed = true;
                    self.buffer.clear();
                    out.push(Err(err));
                    return out;
                }
            }
        }
        self.scanned = self.buffer.len();
        out
    }

    /// Ends the stream. Unterminated trailing content is dropped; returns its length.
    pub fn finish(&mut self) -> usize {
        let pending = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        let (text, _) = self.encoding.decode_without_bom_handling(&pending);
        if text.trim().is_empty() {
            0
        } else {
            pending.len()
        }
    }

    fn parse_line(&self, raw: &[u8]) -> Result<Option<StreamRecord>, DecodeError> {
        let (text, had_errors) = self.encoding.decode_without_bom_handling(raw);
        if had_errors {
            return Err(DecodeError::MalformedRecord {
                line: self.line,
                message: format!("invalid {} text", self.encoding.name()),
            });
        }
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(text)
            .map(Some)
            .map_err(|err| DecodeError::MalformedRecord {
                line: self.line,
                message: err.to_string(),
            })
    }
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches(&[' ', '"', '\''][..]).to_string())
        })
        .next()
}

struct DecodeState<S> {
    source: Pin<Box<S>>,
    decoder: RecordDecoder,
    ready: VecDeque<Result<StreamRecord, DecodeError>>,
    done: bool,
}

/// Turns a byte-chunk stream into a lazy stream of records, in arrival order.
///
/// The stream ends with the source, or right after the first error.
pub fn decode_records<S, B, E>(
    source: S,
    decoder: RecordDecoder,
) -> impl Stream<Item = Result<StreamRecord, DecodeError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let state = DecodeState {
        source: Box::pin(source),
        decoder,
        ready: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.ready.pop_front() {
                if item.is_err() {
                    state.ready.clear();
                    state.done = true;
                }
                return Some((item, state));
            }
            if state.done {
                return None;
            }
            match state.source.next().await {
                Some(Ok(chunk)) => {
                    let decoded = state.decoder.push(chunk.as_ref());
                    state.ready.extend(decoded);
                }
                Some(Err(err)) => {
                    state.done = true;
                    return Some((Err(DecodeError::Transport(err.to_string())), state));
                }
                None => {
                    let dropped = state.decoder.finish();
                    if dropped > 0 {
                        diplom_warn!("discarding {} bytes of unterminated trailing record", dropped);
                    }
                    state.done = true;
                }
            }
        }
    })
}
