// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, each prefixed by a one-byte
//! tag. [`decode`] reads them back as an iterator of [`RecordedEvent`].

use clusterbridge_core::ChildId;
use clusterbridge_core::trace::{
    ChildChange, ChildOp, FlushBeginEvent, FlushEndEvent, LifecycleEvent, TraceSink, Transition,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FLUSH_BEGIN: u8 = 1;
const TAG_FLUSH_END: u8 = 2;
const TAG_LIFECYCLE: u8 = 3;
const TAG_CHILD_CHANGE: u8 = 4;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_count(&mut self, v: usize) {
        self.write_u64(u64::try_from(v).unwrap_or(u64::MAX));
    }

    fn write_op(&mut self, op: ChildOp) {
        self.write_u8(match op {
            ChildOp::Create => 0,
            ChildOp::Update => 1,
            ChildOp::Replace => 2,
            ChildOp::Remove => 3,
            ChildOp::Skip => 4,
            ChildOp::Fail => 5,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_flush_begin(&mut self, e: &FlushBeginEvent) {
        self.write_u8(TAG_FLUSH_BEGIN);
        self.write_u64(e.pass);
        self.write_count(e.pending);
    }

    fn on_flush_end(&mut self, e: &FlushEndEvent) {
        self.write_u8(TAG_FLUSH_END);
        self.write_u64(e.pass);
        self.write_count(e.created);
        self.write_count(e.updated);
        self.write_count(e.removed);
        self.write_count(e.failed);
        self.write_count(e.portals);
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        self.write_u8(TAG_LIFECYCLE);
        self.write_u8(match e.transition {
            Transition::Constructed => 0,
            Transition::TornDown => 1,
        });
        self.write_count(e.requeued);
    }

    fn on_child_change(&mut self, e: &ChildChange) {
        self.write_u8(TAG_CHILD_CHANGE);
        self.write_u64(e.pass);
        self.write_u64(e.id.0);
        self.write_op(e.op);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`FlushBeginEvent`].
    FlushBegin(FlushBeginEvent),
    /// A [`FlushEndEvent`].
    FlushEnd(FlushEndEvent),
    /// A [`LifecycleEvent`].
    Lifecycle(LifecycleEvent),
    /// A [`ChildChange`].
    ChildChange(ChildChange),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        let v = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_count(&mut self) -> Option<usize> {
        Some(usize::try_from(self.read_u64()?).unwrap_or(usize::MAX))
    }

    fn read_op(&mut self) -> Option<ChildOp> {
        Some(match self.read_u8()? {
            0 => ChildOp::Create,
            1 => ChildOp::Update,
            2 => ChildOp::Replace,
            3 => ChildOp::Remove,
            4 => ChildOp::Skip,
            5 => ChildOp::Fail,
            _ => return None,
        })
    }

    fn decode_flush_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FlushBegin(FlushBeginEvent {
            pass: self.read_u64()?,
            pending: self.read_count()?,
        }))
    }

    fn decode_flush_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FlushEnd(FlushEndEvent {
            pass: self.read_u64()?,
            created: self.read_count()?,
            updated: self.read_count()?,
            removed: self.read_count()?,
            failed: self.read_count()?,
            portals: self.read_count()?,
        }))
    }

    fn decode_lifecycle(&mut self) -> Option<RecordedEvent> {
        let transition = match self.read_u8()? {
            0 => Transition::Constructed,
            1 => Transition::TornDown,
            _ => return None,
        };
        Some(RecordedEvent::Lifecycle(LifecycleEvent {
            transition,
            requeued: self.read_count()?,
        }))
    }

    fn decode_child_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ChildChange(ChildChange {
            pass: self.read_u64()?,
            id: ChildId(self.read_u64()?),
            op: self.read_op()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FLUSH_BEGIN => self.decode_flush_begin(),
            TAG_FLUSH_END => self.decode_flush_end(),
            TAG_LIFECYCLE => self.decode_lifecycle(),
            TAG_CHILD_CHANGE => self.decode_child_change(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
