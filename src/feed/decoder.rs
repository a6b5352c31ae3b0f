//! Incremental `text/event-stream` decoder.
//!
//! Bytes arrive in arbitrary chunks; complete events are returned once their
//! terminating blank line has been seen. Comment lines (leading `:`), which
//! the server uses for keep-alives, are ignored. A leading UTF-8 byte order
//! mark is skipped, and an event that grows past the size limit is dropped
//! whole instead of being buffered without bound.

/// Default limit on a pending line or event, in bytes.
pub const MAX_EVENT_LEN: usize = 1024 * 1024;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub id: Option<String>,
    pub data: String,
}

impl SseEvent {
    /// True for events without a type or with the default `message` type.
    pub fn is_message(&self) -> bool {
        matches!(self.event.as_deref(), None | Some("message"))
    }
}

#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
    data_len: usize,
    event: Option<String>,
    id: Option<String>,
    max_len: usize,
    // Set while skipping the rest of an oversized event.
    discarding: bool,
    bom_checked: bool,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_len(MAX_EVENT_LEN)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buffer: Vec::new(),
            data: Vec::new(),
            data_len: 0,
            event: None,
            id: None,
            max_len,
            discarding: false,
            bom_checked: false,
        }
    }

    /// Feed a chunk and collect every event it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        if !self.bom_checked {
            // The mark may be split across chunks.
            if self.buffer.len() < BOM.len() && BOM.starts_with(&self.buffer) {
                return events;
            }
            if self.buffer.starts_with(BOM) {
                self.buffer.drain(..BOM.len());
            }
            self.bom_checked = true;
        }

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if self.discarding {
                self.discarding = !line.is_empty();
                continue;
            }
            if line.len() > self.max_len {
                self.start_discarding(line.len());
                continue;
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        if self.buffer.len() > self.max_len {
            let pending = self.buffer.len();
            self.buffer.clear();
            if !self.discarding {
                self.start_discarding(pending);
            }
        }

        events
    }

    fn start_discarding(&mut self, len: usize) {
        tracing::warn!(len, limit = self.max_len, "dropping oversized event-stream event");
        self.discarding = true;
        self.data.clear();
        self.data_len = 0;
        self.event = None;
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
            None => (line, ""),
        };

        match field {
            "data" => {
                self.data_len += value.len();
                if self.data_len > self.max_len {
                    self.start_discarding(self.data_len);
                } else {
                    self.data.push(value.to_string());
                }
            }
            "event" => self.event = Some(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            // retry and unknown fields carry nothing we act on
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        self.data_len = 0;
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event,
            id: self.id.clone(),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: [1,2]\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "[1,2]");
        assert!(events[0].is_message());
    }

    #[test]
    fn joins_multiline_data() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: a\ndata: b\n\n");
        assert_eq!(events[0].data, "a\nb");
    }

    #[test]
    fn reassembles_split_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"da").is_empty());
        assert!(decoder.feed(b"ta: hel").is_empty());
        assert!(decoder.feed(b"lo\r\n").is_empty());
        let events = decoder.feed(b"\r\n");
        assert_eq!(events[0].data, "hello");
    }

    #[test]
    fn ignores_keep_alive_comments() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b": keep-alive-text\n\n").is_empty());
    }

    #[test]
    fn keeps_event_type_and_id() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"id: 7\nevent: ping\ndata:x\n\n");
        assert_eq!(events[0].id.as_deref(), Some("7"));
        assert_eq!(events[0].event.as_deref(), Some("ping"));
        assert_eq!(events[0].data, "x");
        assert!(!events[0].is_message());
    }

    #[test]
    fn skips_leading_byte_order_mark() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"\xEF\xBB\xBFdata: first\n\n");
        assert_eq!(events[0].data, "first");

        // Only at the very start of the stream.
        let events = decoder.feed(b"\xEF\xBB\xBFdata: second\n\n");
        assert!(events.is_empty());
        let events = decoder.feed(b"data: third\n\n");
        assert_eq!(events[0].data, "third");
    }

    #[test]
    fn skips_byte_order_mark_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"\xEF").is_empty());
        assert!(decoder.feed(b"\xBB").is_empty());
        let events = decoder.feed(b"\xBFdata: x\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "x");
    }

    #[test]
    fn drops_unterminated_oversized_line_and_recovers() {
        let mut decoder = SseDecoder::with_max_len(16);
        assert!(decoder.feed(b"data: ").is_empty());
        assert!(decoder.feed(&[b'a'; 64]).is_empty());
        assert!(decoder.buffer.len() <= 16);
        assert!(decoder.feed(&[b'a'; 64]).is_empty());
        assert!(decoder.buffer.len() <= 16);
        // The rest of the oversized event is skipped up to its blank line.
        assert!(decoder.feed(b"aaa\n\n").is_empty());

        let events = decoder.feed(b"data: ok\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "ok");
    }

    #[test]
    fn drops_event_whose_data_lines_exceed_limit() {
        // Each line fits; together they do not.
        let mut decoder = SseDecoder::with_max_len(10);
        let events = decoder.feed(b"data: 1234\ndata: 5678\ndata: 9abc\n\ndata: ok\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "ok");
    }
}
