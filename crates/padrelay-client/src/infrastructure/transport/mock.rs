//! Recording frame sink for tests.
//!
//! [`RecordingSink`] keeps every frame it is given.  The paired
//! [`SinkRecord`] stays with the test after the sink has been moved into a
//! session, so assertions can inspect what was "sent".

use std::cell::RefCell;
use std::rc::Rc;

use padrelay_core::protocol::codec::decode_outbound;
use padrelay_core::OutboundMessage;

use super::{FrameSink, TransportError};

#[derive(Debug, Default)]
struct Record {
    frames: Vec<String>,
    closed: bool,
    failing: bool,
}

/// A [`FrameSink`] that stores frames in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    record: Rc<RefCell<Record>>,
}

/// Test-side view of a [`RecordingSink`].
#[derive(Debug, Clone)]
pub struct SinkRecord {
    record: Rc<RefCell<Record>>,
}

impl RecordingSink {
    pub fn new() -> (Self, SinkRecord) {
        let sink = Self::default();
        let record = SinkRecord {
            record: Rc::clone(&sink.record),
        };
        (sink, record)
    }
}

impl SinkRecord {
    /// Every frame accepted so far, oldest first.
    pub fn frames(&self) -> Vec<String> {
        self.record.borrow().frames.clone()
    }

    /// Every accepted frame, decoded.  Frames that do not decode are skipped.
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.record
            .borrow()
            .frames
            .iter()
            .filter_map(|f| decode_outbound(f).ok())
            .collect()
    }

    pub fn frame_count(&self) -> usize {
        self.record.borrow().frames.len()
    }

    pub fn is_closed(&self) -> bool {
        self.record.borrow().closed
    }

    /// Makes every later `send_text` fail with [`TransportError::Write`].
    pub fn fail_writes(&self, failing: bool) {
        self.record.borrow_mut().failing = failing;
    }
}

impl FrameSink for RecordingSink {
    fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        let mut record = self.record.borrow_mut();
        if record.closed {
            return Err(TransportError::Closed);
        }
        if record.failing {
            return Err(TransportError::Write("simulated write failure".to_string()));
        }
        record.frames.push(text);
        Ok(())
    }

    fn close(&mut self) {
        self.record.borrow_mut().closed = true;
    }
}
