// Copyright 2026 the Clusterbridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON exporter.
//!
//! [`export`] reads recorded bytes from a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes them as a JSON
//! array, one object per event, each carrying an `"event"` name and the
//! event's fields.

use std::io::{self, Write};

use serde_json::{Value, json};

use clusterbridge_core::trace::{ChildOp, Transition};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a pretty-printed JSON array.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(to_value).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_value(recorded: RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::FlushBegin(e) => json!({
            "event": "FlushBegin",
            "pass": e.pass,
            "pending": e.pending,
        }),
        RecordedEvent::FlushEnd(e) => json!({
            "event": "FlushEnd",
            "pass": e.pass,
            "created": e.created,
            "updated": e.updated,
            "removed": e.removed,
            "failed": e.failed,
            "portals": e.portals,
        }),
        RecordedEvent::Lifecycle(e) => json!({
            "event": "Lifecycle",
            "transition": match e.transition {
                Transition::Constructed => "constructed",
                Transition::TornDown => "torn_down",
            },
            "requeued": e.requeued,
        }),
        RecordedEvent::ChildChange(e) => json!({
            "event": "ChildChange",
            "pass": e.pass,
            "id": e.id.0,
            "op": op_label(e.op),
        }),
    }
}

fn op_label(op: ChildOp) -> &'static str {
    match op {
        ChildOp::Create => "create",
        ChildOp::Update => "update",
        ChildOp::Replace => "replace",
        ChildOp::Remove => "remove",
        ChildOp::Skip => "skip",
        ChildOp::Fail => "fail",
    }
}
