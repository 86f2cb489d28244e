//! Picks the draw call worth exporting out of everything a trace recorded.

use std::collections::HashMap;

use tracing::debug;

use crate::trace::{BufferDescriptor, DrawCall, Trace};

/// The chosen draw call plus a buffer id lookup for the trace it came from.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub draw_call: &'a DrawCall,
    pub context_index: usize,
    pub call_index: usize,
    pub buffers: HashMap<u32, &'a BufferDescriptor>,
}

impl<'a> Selection<'a> {
    pub fn buffer(&self, id: Option<u32>) -> Option<&'a BufferDescriptor> {
        id.and_then(|id| self.buffers.get(&id).copied())
    }
}

/// A draw call is eligible when it is an indexed triangle draw with a finite
/// count, at least one attribute and a non-zero index buffer id.
pub fn is_eligible(call: &DrawCall) -> bool {
    call.is_indexed_triangles()
        && call.count.is_some_and(f64::is_finite)
        && !call.attributes.is_empty()
        && call.index_buffer_id.is_some_and(|id| id != 0)
}

/// Select the eligible draw call with the greatest count.
///
/// Ties keep the first call in trace order. Returns `None` when nothing is
/// eligible; the caller decides how to surface that.
pub fn select_draw_call(trace: &Trace) -> Option<Selection<'_>> {
    let mut best: Option<(usize, usize, &DrawCall, f64)> = None;
    for (ctx_idx, call_idx, call) in trace.draw_calls() {
        if !is_eligible(call) {
            continue;
        }
        let count = call.count.unwrap_or_default();
        if best.is_none_or(|(_, _, _, best_count)| count > best_count) {
            best = Some((ctx_idx, call_idx, call, count));
        }
    }

    let (context_index, call_index, draw_call, count) = best?;
    debug!(context_index, call_index, count, "selected draw call");

    let mut buffers = HashMap::with_capacity(trace.buffers.len());
    for desc in &trace.buffers {
        buffers.entry(desc.id).or_insert(desc);
    }

    Some(Selection {
        draw_call,
        context_index,
        call_index,
        buffers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognized::Recognized;
    use crate::test_support::TraceBuilder;

    #[test]
    fn picks_greatest_count() {
        let trace = TraceBuilder::new()
            .draw(3.0)
            .draw(12.0)
            .draw(6.0)
            .build();
        let sel = select_draw_call(&trace).unwrap();
        assert_eq!(sel.call_index, 1);
        assert_eq!(sel.draw_call.count, Some(12.0));
    }

    #[test]
    fn ties_keep_first_in_trace_order() {
        let trace = TraceBuilder::new()
            .draw(6.0)
            .next_context()
            .draw(9.0)
            .next_context()
            .draw(9.0)
            .build();
        let sel = select_draw_call(&trace).unwrap();
        assert_eq!((sel.context_index, sel.call_index), (1, 0));
    }

    #[test]
    fn selection_is_idempotent() {
        let trace = TraceBuilder::new().draw(6.0).draw(6.0).draw(3.0).build();
        let first = select_draw_call(&trace).unwrap();
        let second = select_draw_call(&trace).unwrap();
        assert!(std::ptr::eq(first.draw_call, second.draw_call));
    }

    #[test]
    fn ineligible_calls_are_skipped() {
        let mut trace = TraceBuilder::new()
            .draw(30.0)
            .draw(30.0)
            .draw(30.0)
            .draw(30.0)
            .draw(3.0)
            .build();
        let calls = &mut trace.contexts[0].draw_calls;
        calls[0].mode = Some(Recognized::from_raw(serde_json::json!("TRIANGLE_STRIP")));
        calls[1].index_buffer_id = Some(0);
        calls[2].attributes.clear();
        calls[3].count = None;
        let sel = select_draw_call(&trace).unwrap();
        assert_eq!(sel.call_index, 4);
    }

    #[test]
    fn nothing_eligible_is_none() {
        let mut trace = TraceBuilder::new().draw(6.0).build();
        trace.contexts[0].draw_calls[0].kind = Some(Recognized::from_raw("drawArrays".to_string()));
        assert!(select_draw_call(&trace).is_none());
        assert!(select_draw_call(&Trace::default()).is_none());
    }

    #[test]
    fn missing_kind_or_mode_is_ineligible() {
        let mut trace = TraceBuilder::new().draw(9.0).draw(9.0).draw(3.0).build();
        let calls = &mut trace.contexts[0].draw_calls;
        calls[0].kind = None;
        calls[1].mode = None;
        let sel = select_draw_call(&trace).unwrap();
        assert_eq!(sel.call_index, 2);
    }

    #[test]
    fn only_non_indexed_draws_select_nothing() {
        let trace = Trace::from_json_str(
            r#"{
                "buffers": [{ "id": 1, "byteLength": 48 }],
                "contexts": [{ "drawCalls": [
                    { "kind": "drawArrays", "mode": "TRIANGLES", "count": 4,
                      "attributes": [{ "index": 0, "size": 3, "type": 5126, "bufferId": 1 }] }
                ] }]
            }"#,
        )
        .unwrap();
        assert!(select_draw_call(&trace).is_none());
    }

    #[test]
    fn buffer_lookup_first_id_wins() {
        let mut trace = TraceBuilder::new().draw(3.0).build();
        let dup = trace.buffers[0].clone();
        trace.buffers.push(BufferDescriptor {
            byte_length: dup.byte_length + 100,
            ..dup
        });
        let sel = select_draw_call(&trace).unwrap();
        assert_eq!(sel.buffer(Some(dup.id)), Some(&trace.buffers[0]));
        assert_eq!(sel.buffer(None), None);
    }
}
