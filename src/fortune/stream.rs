use serde::Deserialize;

use super::error::FortuneError;
use super::reading::{parse_fortune, Fortune};

#[derive(Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Incremental decoder for the proxy's server-sent-event stream.
///
/// Chunks may split lines (and UTF-8 sequences) anywhere; incomplete input is
/// held until the rest arrives. Only `text_delta` content is collected.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    text: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns the text deltas completed by this chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut deltas = Vec::new();
        while let Some(newline) = self.pending.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            if let Some(delta) = decode_line(&line) {
                self.text.push_str(&delta);
                deltas.push(delta);
            }
        }
        deltas
    }

    /// Text collected so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Flush any trailing unterminated line and return the full text.
    pub fn finish(mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        if let Some(delta) = decode_line(&rest) {
            self.text.push_str(&delta);
        }
        self.text
    }

    /// Finish the stream and parse the collected text as a [`Fortune`].
    pub fn into_fortune(self) -> Result<Fortune, FortuneError> {
        let text = self.finish();
        if text.trim().is_empty() {
            return Err(FortuneError::EmptyResponse);
        }
        parse_fortune(&text)
    }
}

fn decode_line(raw: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(raw);
    let data = line.trim_end_matches(['\r', '\n']).strip_prefix("data: ")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    // malformed lines are skipped
    let event: StreamEvent = serde_json::from_str(data).ok()?;
    match event.delta {
        Some(delta) if event.kind == "content_block_delta" && delta.kind == "text_delta" => {
            Some(delta.text)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta_line(text: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({
                "type": "content_block_delta",
                "index": 0,
                "delta": {"type": "text_delta", "text": text}
            })
        )
    }

    #[test]
    fn collects_text_deltas_only() {
        let mut decoder = SseDecoder::new();
        let stream = format!(
            "event: message_start\ndata: {{\"type\":\"message_start\"}}\n\n{}{}data: [DONE]\n",
            delta_line("Hello, "),
            delta_line("horse")
        );

        let deltas = decoder.feed(stream.as_bytes());
        assert_eq!(deltas, vec!["Hello, ", "horse"]);
        assert_eq!(decoder.finish(), "Hello, horse");
    }

    #[test]
    fn handles_lines_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let stream = format!("{}{}", delta_line("丙午 "), delta_line("year"));
        let bytes = stream.as_bytes();

        // split inside a multi-byte glyph as well as mid-line
        let mut collected = Vec::new();
        for chunk in bytes.chunks(7) {
            collected.extend(decoder.feed(chunk));
        }
        assert_eq!(collected.concat(), "丙午 year");
        assert_eq!(decoder.text(), "丙午 year");
    }

    #[test]
    fn skips_malformed_lines() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b"data: {not json\n");
        decoder.feed(b"data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"input_json_delta\"}}\n");
        decoder.feed(delta_line("ok").as_bytes());
        assert_eq!(decoder.finish(), "ok");
    }

    #[test]
    fn trailing_line_without_newline_is_flushed() {
        let mut decoder = SseDecoder::new();
        let line = delta_line("tail");
        decoder.feed(line.trim_end().as_bytes());
        assert_eq!(decoder.text(), "");
        assert_eq!(decoder.finish(), "tail");
    }

    #[test]
    fn streamed_fortune_parses() {
        let body = r#"```json
{"zodiac_animal":"Rat","zodiac_element":"Water","personality":"p","wealth":"w",
"relationships":"r","overall":"o","lucky_numbers":[1]}
```"#;
        let mut decoder = SseDecoder::new();
        for piece in body.split_inclusive(',') {
            decoder.feed(delta_line(piece).as_bytes());
        }
        let fortune = decoder.into_fortune().unwrap();
        assert_eq!(fortune.zodiac_animal, "Rat");
        assert_eq!(fortune.lucky_numbers, vec![1]);
    }

    #[test]
    fn empty_stream_is_reported() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b"data: [DONE]\n");
        assert!(matches!(
            decoder.into_fortune(),
            Err(FortuneError::EmptyResponse)
        ));
    }
}
