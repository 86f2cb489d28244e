//! Serde model of a captured graphics API trace.
//!
//! Only the fields needed to locate and decode one draw call are modeled;
//! anything else a capture tool records is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TranscodeResult, malformed};
use crate::recognized::Recognized;
use crate::scalar::ComponentType;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub buffers: Vec<BufferDescriptor>,
    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl Trace {
    pub fn from_json_slice(bytes: &[u8]) -> TranscodeResult<Trace> {
        serde_json::from_slice(bytes).map_err(|e| malformed(format!("trace JSON: {e}")))
    }

    pub fn from_json_str(text: &str) -> TranscodeResult<Trace> {
        serde_json::from_str(text).map_err(|e| malformed(format!("trace JSON: {e}")))
    }

    /// Iterate every draw call as `(context index, call index, call)`.
    pub fn draw_calls(&self) -> impl Iterator<Item = (usize, usize, &DrawCall)> {
        self.contexts.iter().enumerate().flat_map(|(ctx_idx, ctx)| {
            ctx.draw_calls
                .iter()
                .enumerate()
                .map(move |(call_idx, call)| (ctx_idx, call_idx, call))
        })
    }
}

/// A byte range of the raw capture blob holding one API buffer's contents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferDescriptor {
    pub id: u32,
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(default)]
    pub draw_calls: Vec<DrawCall>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    DrawArrays,
    DrawElements,
    DrawArraysInstanced,
    DrawElementsInstanced,
}

impl DrawKind {
    pub fn name(self) -> &'static str {
        match self {
            DrawKind::DrawArrays => "drawArrays",
            DrawKind::DrawElements => "drawElements",
            DrawKind::DrawArraysInstanced => "drawArraysInstanced",
            DrawKind::DrawElementsInstanced => "drawElementsInstanced",
        }
    }
}

impl TryFrom<&String> for DrawKind {
    type Error = ();

    fn try_from(name: &String) -> Result<Self, ()> {
        Ok(match name.as_str() {
            "drawArrays" => DrawKind::DrawArrays,
            "drawElements" => DrawKind::DrawElements,
            "drawArraysInstanced" => DrawKind::DrawArraysInstanced,
            "drawElementsInstanced" => DrawKind::DrawElementsInstanced,
            _ => return Err(()),
        })
    }
}

impl From<DrawKind> for String {
    fn from(kind: DrawKind) -> String {
        kind.name().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// Ordered by numeric API code.
const PRIMITIVE_MODES: [(PrimitiveMode, &str); 7] = [
    (PrimitiveMode::Points, "POINTS"),
    (PrimitiveMode::Lines, "LINES"),
    (PrimitiveMode::LineLoop, "LINE_LOOP"),
    (PrimitiveMode::LineStrip, "LINE_STRIP"),
    (PrimitiveMode::Triangles, "TRIANGLES"),
    (PrimitiveMode::TriangleStrip, "TRIANGLE_STRIP"),
    (PrimitiveMode::TriangleFan, "TRIANGLE_FAN"),
];

/// Modes appear either by name or by their numeric API code, depending on the
/// capture tool.
impl TryFrom<&Value> for PrimitiveMode {
    type Error = ();

    fn try_from(value: &Value) -> Result<Self, ()> {
        match value {
            Value::String(name) => PRIMITIVE_MODES
                .iter()
                .find(|(_, n)| n.eq_ignore_ascii_case(name))
                .map(|(mode, _)| *mode)
                .ok_or(()),
            Value::Number(code) => {
                let code = code.as_u64().ok_or(())?;
                PRIMITIVE_MODES
                    .iter()
                    .enumerate()
                    .find(|(i, _)| *i as u64 == code)
                    .map(|(_, (mode, _))| *mode)
                    .ok_or(())
            }
            _ => Err(()),
        }
    }
}

impl From<PrimitiveMode> for Value {
    fn from(mode: PrimitiveMode) -> Value {
        Value::String(PRIMITIVE_MODES[mode as usize].1.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawCall {
    #[serde(default)]
    pub kind: Option<Recognized<DrawKind, String>>,
    #[serde(default)]
    pub mode: Option<Recognized<PrimitiveMode, Value>>,
    /// Number of indices to draw. JSON cannot carry NaN or infinities, so a
    /// missing or null count is the only non-finite case.
    #[serde(default)]
    pub count: Option<f64>,
    /// Absent on non-indexed draws.
    #[serde(default)]
    pub index_type: Option<Recognized<ComponentType, u32>>,
    #[serde(default)]
    pub index_offset: usize,
    #[serde(default)]
    pub index_buffer_id: Option<u32>,
    #[serde(default)]
    pub attributes: Vec<VertexAttribute>,
}

impl DrawCall {
    pub fn is_indexed_triangles(&self) -> bool {
        self.kind.as_ref().and_then(Recognized::known) == Some(&DrawKind::DrawElements)
            && self.mode.as_ref().and_then(Recognized::known) == Some(&PrimitiveMode::Triangles)
    }

    /// Index count as a usize. Negative counts draw nothing.
    pub fn index_count(&self) -> usize {
        match self.count {
            Some(count) if count.is_finite() && count > 0.0 => count as usize,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexAttribute {
    /// Attribute slot the data was bound to.
    pub index: u32,
    /// Components per vertex, 1 to 4.
    pub size: u32,
    #[serde(rename = "type")]
    pub component_type: Recognized<ComponentType, u32>,
    #[serde(default)]
    pub normalized: bool,
    /// Zero means tightly packed.
    #[serde(default)]
    pub stride: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub buffer_id: Option<u32>,
}

impl VertexAttribute {
    /// Stride with the tightly-packed case resolved.
    pub fn effective_stride(&self, ty: ComponentType) -> usize {
        if self.stride == 0 {
            self.size as usize * ty.byte_width()
        } else {
            self.stride
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranscodeError;

    const TRACE: &str = r#"{
        "buffers": [{ "id": 1, "byteOffset": 16, "byteLength": 48, "usage": "STATIC_DRAW" }],
        "contexts": [{
            "canvas": "main",
            "drawCalls": [{
                "kind": "drawElements",
                "mode": "TRIANGLES",
                "count": 6,
                "indexType": 5123,
                "indexOffset": 4,
                "indexBufferId": 2,
                "attributes": [
                    { "index": 0, "size": 3, "type": 5126, "bufferId": 1 }
                ]
            }]
        }]
    }"#;

    #[test]
    fn parses_trace_shape() {
        let trace = Trace::from_json_str(TRACE).unwrap();
        assert_eq!(trace.buffers[0].byte_offset, 16);
        let (_, _, call) = trace.draw_calls().next().unwrap();
        assert!(call.is_indexed_triangles());
        assert_eq!(call.index_count(), 6);
        assert_eq!(
            call.index_type.as_ref().and_then(Recognized::known),
            Some(&ComponentType::U16)
        );
        assert_eq!(call.index_offset, 4);
        let attr = &call.attributes[0];
        assert!(!attr.normalized);
        assert_eq!(attr.effective_stride(ComponentType::F32), 12);
    }

    #[test]
    fn mode_accepts_numeric_code() {
        let mode: Recognized<PrimitiveMode, Value> = serde_json::from_str("4").unwrap();
        assert_eq!(mode.known(), Some(&PrimitiveMode::Triangles));
        let mode: Recognized<PrimitiveMode, Value> = serde_json::from_str("\"triangles\"").unwrap();
        assert_eq!(mode.known(), Some(&PrimitiveMode::Triangles));
        let mode: Recognized<PrimitiveMode, Value> = serde_json::from_str("\"QUADS\"").unwrap();
        assert_eq!(mode, Recognized::Unknown(Value::from("QUADS")));
    }

    #[test]
    fn non_numeric_count_is_malformed() {
        let text = TRACE.replace("\"count\": 6", "\"count\": \"six\"");
        let err = Trace::from_json_str(&text).unwrap_err();
        assert!(matches!(
            err.current_context(),
            TranscodeError::MalformedInput(_)
        ));
    }

    #[test]
    fn unknown_component_type_is_kept() {
        let text = TRACE.replace("\"type\": 5126", "\"type\": 5131");
        let trace = Trace::from_json_str(&text).unwrap();
        let (_, _, call) = trace.draw_calls().next().unwrap();
        assert_eq!(call.attributes[0].component_type, Recognized::Unknown(5131));
    }

    #[test]
    fn non_indexed_calls_parse_alongside_indexed_ones() {
        let text = r#"{
            "buffers": [{ "id": 1, "byteOffset": 0, "byteLength": 48 }],
            "contexts": [{
                "drawCalls": [
                    { "kind": "drawArrays", "mode": "TRIANGLE_STRIP", "count": 4,
                      "attributes": [{ "index": 0, "size": 3, "type": 5126, "bufferId": 1 }] },
                    { "kind": "clear" },
                    { "kind": "drawElements", "mode": "TRIANGLES", "count": 3,
                      "indexType": 5123, "indexBufferId": 2,
                      "attributes": [{ "index": 0, "size": 3, "type": 5126, "bufferId": 1 }] }
                ]
            }]
        }"#;
        let trace = Trace::from_json_str(text).unwrap();
        let calls: Vec<_> = trace.draw_calls().map(|(_, _, call)| call).collect();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].index_type.is_none());
        assert!(!calls[0].is_indexed_triangles());
        assert!(calls[1].mode.is_none());
        assert!(!calls[1].is_indexed_triangles());
        assert!(calls[2].is_indexed_triangles());
    }
}
