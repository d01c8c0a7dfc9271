//! Notification stream events and text/event-stream framing
//!
//! The push channel itself (connecting, reconnecting) belongs to the host.
//! This module only defines the events the host feeds the coordinator and a
//! parser for the `text/event-stream` wire format, used to replay captured
//! streams.

/// Event delivered by the notification channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection (re)opened
    Open,
    /// A message payload arrived
    Message(String),
    /// The connection failed; the host is reconnecting
    Error,
}

/// A dispatched event-stream event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    /// Event type, `message` unless an `event:` field set it
    pub event: String,
    pub data: String,
}

impl StreamEvent {
    /// Only unnamed `message` events reach the notification handler
    pub fn into_transport(self) -> Option<TransportEvent> {
        (self.event == "message").then_some(TransportEvent::Message(self.data))
    }
}

/// Incremental `text/event-stream` parser
///
/// Feed it arbitrary chunks; complete events come out as soon as their
/// terminating blank line has been seen.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: String,
    event_type: String,
    data: String,
    has_data: bool,
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &str) -> Vec<StreamEvent> {
        self.buffer.push_str(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.find(|c: char| c == '\r' || c == '\n') {
            let bytes = self.buffer.as_bytes();
            let skip = if bytes[pos] == b'\r' {
                // A trailing CR may be the first half of a CRLF
                if pos + 1 == bytes.len() {
                    break;
                }
                if bytes[pos + 1] == b'\n' { 2 } else { 1 }
            } else {
                1
            };

            let line = self.buffer[..pos].to_string();
            self.buffer.drain(..pos + skip);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        events
    }

    /// Flush at end of input
    ///
    /// Captured streams often lack the final blank line, so a pending event
    /// is dispatched rather than dropped.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let rest = std::mem::take(&mut self.buffer);
        let rest = rest.strip_suffix('\r').unwrap_or(&rest);
        let mut events = Vec::new();
        if !rest.is_empty() {
            if let Some(event) = self.process_line(rest) {
                events.push(event);
            }
        }
        events.extend(self.dispatch());
        events
    }

    fn process_line(&mut self, line: &str) -> Option<StreamEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
                self.has_data = true;
            }
            "event" => self.event_type = value.to_string(),
            // id and retry only matter to the reconnecting host
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<StreamEvent> {
        let event_type = std::mem::take(&mut self.event_type);
        if !std::mem::take(&mut self.has_data) {
            return None;
        }

        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }
        Some(StreamEvent {
            event: if event_type.is_empty() { "message".to_string() } else { event_type },
            data,
        })
    }
}

/// Parse a complete captured stream into transport events
pub fn parse_event_stream(text: &str) -> Vec<TransportEvent> {
    let mut parser = EventStreamParser::new();
    let mut events = parser.feed(text);
    events.extend(parser.finish());
    events
        .into_iter()
        .filter_map(StreamEvent::into_transport)
        .collect()
}
