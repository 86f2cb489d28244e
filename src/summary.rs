//! Diagnostic record of a selection, built from trace metadata only.

use rootcause::Report;
use serde::Serialize;
use serde_json::Value;

use crate::classifier;
use crate::error::{TranscodeError, TranscodeResult};
use crate::recognized::Recognized;
use crate::scalar::ComponentType;
use crate::selector::Selection;
use crate::trace::{BufferDescriptor, DrawKind, PrimitiveMode};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub context_index: usize,
    pub call_index: usize,
    pub draw_call: DrawCallSummary,
    pub attribute_slots: AttributeSlots,
    pub position_buffer: Option<PositionBufferSummary>,
    pub index_buffer: Option<BufferDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawCallSummary {
    pub kind: Option<Recognized<DrawKind, String>>,
    pub mode: Option<Recognized<PrimitiveMode, Value>>,
    pub count: Option<f64>,
    pub index_type: Option<Recognized<ComponentType, u32>>,
    pub index_offset: usize,
    pub index_buffer_id: Option<u32>,
    pub attribute_count: usize,
}

/// Slot indices the classifier picked, or `None` where nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttributeSlots {
    pub position: Option<u32>,
    pub normal: Option<u32>,
    pub uv: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionBufferSummary {
    #[serde(flatten)]
    pub buffer: BufferDescriptor,
    /// Stride as recorded; zero means tightly packed.
    pub stride: usize,
    /// Stride the decoder walks.
    pub effective_stride: usize,
    pub offset: usize,
    #[serde(rename = "type")]
    pub component_type: Recognized<ComponentType, u32>,
    pub normalized: bool,
}

impl Summary {
    pub fn to_json_pretty(&self) -> TranscodeResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Report::new(TranscodeError::Serialize(e.to_string())))
    }
}

pub fn summarize_selection(selection: &Selection<'_>) -> Summary {
    let call = selection.draw_call;
    let roles = classifier::classify(&call.attributes);

    let position_buffer = roles.position.and_then(|attr| {
        selection
            .buffer(attr.buffer_id)
            .map(|desc| PositionBufferSummary {
                buffer: desc.clone(),
                stride: attr.stride,
                effective_stride: attr
                    .component_type
                    .known()
                    .map_or(attr.stride, |&ty| attr.effective_stride(ty)),
                offset: attr.offset,
                component_type: attr.component_type.clone(),
                normalized: attr.normalized,
            })
    });

    Summary {
        context_index: selection.context_index,
        call_index: selection.call_index,
        draw_call: DrawCallSummary {
            kind: call.kind.clone(),
            mode: call.mode.clone(),
            count: call.count,
            index_type: call.index_type.clone(),
            index_offset: call.index_offset,
            index_buffer_id: call.index_buffer_id,
            attribute_count: call.attributes.len(),
        },
        attribute_slots: AttributeSlots {
            position: roles.position.map(|a| a.index),
            normal: roles.normal.map(|a| a.index),
            uv: roles.tex_coord.map(|a| a.index),
        },
        position_buffer,
        index_buffer: selection.buffer(call.index_buffer_id).cloned(),
    }
}
