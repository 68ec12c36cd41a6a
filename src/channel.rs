//! Outbound transport to the host
//!
//! Delivery is fire-and-forget: a failed write is logged and dropped.

use crate::messages::OutboundMessage;
use std::io::Write;

pub trait MessageChannel {
    fn post_message(&mut self, message: OutboundMessage);
}

/// Records posted messages in order
impl MessageChannel for Vec<OutboundMessage> {
    fn post_message(&mut self, message: OutboundMessage) {
        self.push(message);
    }
}

/// Writes each message as one line of JSON
pub struct JsonLinesChannel<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesChannel<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MessageChannel for JsonLinesChannel<W> {
    fn post_message(&mut self, message: OutboundMessage) {
        let line = match serde_json::to_string(&message) {
            Ok(line) => line,
            Err(err) => {
                log::error!("failed to encode {:?}: {}", message, err);
                return;
            }
        };
        if let Err(err) = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush()) {
            log::warn!("dropped outbound message: {}", err);
        }
    }
}
