//! Synthetic traces and capture blobs shared by the unit tests.

use serde_json::json;

use crate::recognized::Recognized;
use crate::scalar::ComponentType;
use crate::trace::{BufferDescriptor, Context, DrawCall, Trace, VertexAttribute};

pub const QUAD_POSITIONS: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 2.0],
    [1.0, 1.0, -3.0],
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

pub fn attribute(
    index: u32,
    size: u32,
    ty: ComponentType,
    normalized: bool,
    buffer_id: u32,
) -> VertexAttribute {
    VertexAttribute {
        index,
        size,
        component_type: Recognized::Known(ty),
        normalized,
        stride: 0,
        offset: 0,
        buffer_id: Some(buffer_id),
    }
}

pub fn float_position_attribute(buffer_id: u32) -> VertexAttribute {
    attribute(0, 3, ComponentType::F32, false, buffer_id)
}

pub fn draw_call(
    count: f64,
    index_type: ComponentType,
    index_buffer_id: u32,
    attributes: Vec<VertexAttribute>,
) -> DrawCall {
    DrawCall {
        kind: Some(Recognized::from_raw("drawElements".to_string())),
        mode: Some(Recognized::from_raw(json!("TRIANGLES"))),
        count: Some(count),
        index_type: Some(Recognized::Known(index_type)),
        index_offset: 0,
        index_buffer_id: Some(index_buffer_id),
        attributes,
    }
}

/// Builds traces whose draw calls all share one index and one vertex buffer.
/// Only useful where the raw bytes are never read.
pub struct TraceBuilder {
    trace: Trace,
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self {
            trace: Trace {
                buffers: vec![
                    BufferDescriptor {
                        id: 1,
                        byte_offset: 0,
                        byte_length: 64,
                    },
                    BufferDescriptor {
                        id: 2,
                        byte_offset: 64,
                        byte_length: 48,
                    },
                ],
                contexts: vec![Context::default()],
            },
        }
    }

    pub fn draw(mut self, count: f64) -> Self {
        let call = draw_call(count, ComponentType::U16, 1, vec![float_position_attribute(2)]);
        if let Some(ctx) = self.trace.contexts.last_mut() {
            ctx.draw_calls.push(call);
        }
        self
    }

    pub fn next_context(mut self) -> Self {
        self.trace.contexts.push(Context::default());
        self
    }

    pub fn build(self) -> Trace {
        self.trace
    }
}

/// Accumulates buffer contents into one raw blob, handing out descriptor ids.
pub struct CaptureBuilder {
    raw: Vec<u8>,
    buffers: Vec<BufferDescriptor>,
}

impl CaptureBuilder {
    pub fn new() -> Self {
        // Leading junk keeps every buffer at a non-zero base offset.
        Self {
            raw: vec![0xAB; 8],
            buffers: Vec::new(),
        }
    }

    pub fn buffer(&mut self, bytes: &[u8]) -> u32 {
        let id = self.buffers.len() as u32 + 1;
        self.buffers.push(BufferDescriptor {
            id,
            byte_offset: self.raw.len(),
            byte_length: bytes.len(),
        });
        self.raw.extend_from_slice(bytes);
        id
    }

    pub fn finish(self, calls: Vec<DrawCall>) -> (Vec<u8>, Trace) {
        let trace = Trace {
            buffers: self.buffers,
            contexts: vec![Context { draw_calls: calls }],
        };
        (self.raw, trace)
    }
}

pub fn u16_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn f32_bytes(values: &[[f32; 3]]) -> Vec<u8> {
    values.iter().flatten().flat_map(|v| v.to_le_bytes()).collect()
}

/// Position-only quad: 4 float vertices, 6 u16 indices.
pub fn quad_capture() -> (Vec<u8>, Trace) {
    let mut cap = CaptureBuilder::new();
    let idx = cap.buffer(&u16_bytes(&QUAD_INDICES));
    let pos = cap.buffer(&f32_bytes(&QUAD_POSITIONS));
    cap.finish(vec![draw_call(
        6.0,
        ComponentType::U16,
        idx,
        vec![float_position_attribute(pos)],
    )])
}

/// Quad with interleaved-style extra channels: i8 normalized normals and u16
/// normalized UVs, each in its own buffer.
pub fn textured_quad_capture() -> (Vec<u8>, Trace) {
    let mut cap = CaptureBuilder::new();
    let idx = cap.buffer(&u16_bytes(&QUAD_INDICES));
    let pos = cap.buffer(&f32_bytes(&QUAD_POSITIONS));
    // xyz + one padding byte per vertex, stride 4
    let normals: Vec<u8> = [[0i8, 0, 127], [0, 0, 127], [0, -128, 0], [127, 0, 0]]
        .iter()
        .flat_map(|n| [n[0] as u8, n[1] as u8, n[2] as u8, 0])
        .collect();
    let nrm = cap.buffer(&normals);
    let uv = cap.buffer(&u16_bytes(&[0, 0, 65535, 0, 0, 65535, 65535, 65535]));

    let mut normal_attr = attribute(1, 3, ComponentType::I8, true, nrm);
    normal_attr.stride = 4;
    cap.finish(vec![draw_call(
        6.0,
        ComponentType::U16,
        idx,
        vec![
            attribute(2, 2, ComponentType::U16, true, uv),
            normal_attr,
            float_position_attribute(pos),
        ],
    )])
}
