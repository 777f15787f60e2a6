// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use clusterbridge_core::trace::{
    ChildChange, ChildOp, FlushBeginEvent, FlushEndEvent, LifecycleEvent, TraceSink, Transition,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn op_name(op: ChildOp) -> &'static str {
    match op {
        ChildOp::Create => "create",
        ChildOp::Update => "update",
        ChildOp::Replace => "replace",
        ChildOp::Remove => "remove",
        ChildOp::Skip => "skip",
        ChildOp::Fail => "FAIL",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_flush_begin(&mut self, e: &FlushBeginEvent) {
        let FlushBeginEvent { pass, pending, .. } = *e;
        let _ = writeln!(self.writer, "[flush] pass={pass} pending={pending}");
    }

    fn on_flush_end(&mut self, e: &FlushEndEvent) {
        let _ = writeln!(
            self.writer,
            "[flushed] pass={} created={} updated={} removed={} failed={} portals={}",
            e.pass, e.created, e.updated, e.removed, e.failed, e.portals,
        );
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        let _ = match e.transition {
            Transition::Constructed => writeln!(self.writer, "[engine] constructed"),
            Transition::TornDown => {
                writeln!(self.writer, "[engine] torn down requeued={}", e.requeued)
            }
        };
    }

    fn on_child_change(&mut self, e: &ChildChange) {
        let _ = writeln!(
            self.writer,
            "[child] pass={} id={} op={}",
            e.pass,
            e.id,
            op_name(e.op),
        );
    }
}
