//! Vertex decoding: walks the raw capture blob using the selected draw call's
//! attribute layouts and produces flat index/position/normal/UV arrays.

use rootcause::Report;
use tracing::{debug, warn};

use crate::classifier::{self, Classification};
use crate::error::{BufferRole, TranscodeError, TranscodeResult};
use crate::options::DecodeOptions;
use crate::scalar::{self, ComponentType};
use crate::selector::Selection;
use crate::trace::{BufferDescriptor, VertexAttribute};

/// Running per-axis min/max.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<const N: usize> {
    pub min: [f32; N],
    pub max: [f32; N],
}

impl<const N: usize> Bounds<N> {
    pub fn empty() -> Self {
        Self {
            min: [f32::INFINITY; N],
            max: [f32::NEG_INFINITY; N],
        }
    }

    /// Widen the bounds to cover `v`. Non-finite components are not tracked.
    pub fn include(&mut self, v: &[f32; N]) {
        for (i, &c) in v.iter().enumerate() {
            if c.is_finite() {
                self.min[i] = self.min[i].min(c);
                self.max[i] = self.max[i].max(c);
            }
        }
    }

    /// Bounds with untracked axes collapsed to zero, for formats that cannot
    /// carry infinities.
    pub fn finite(&self) -> ([f32; N], [f32; N]) {
        let (mut min, mut max) = (self.min, self.max);
        for i in 0..N {
            if min[i] > max[i] {
                min[i] = 0.0;
                max[i] = 0.0;
            }
        }
        (min, max)
    }
}

/// Everything decoded for one draw call. Owned entirely by the caller.
#[derive(Debug, Clone)]
pub struct DecodedGeometry {
    pub indices: Vec<u32>,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub uvs: Option<Vec<[f32; 2]>>,
    pub position_bounds: Bounds<3>,
    pub uv_bounds: Option<Bounds<2>>,
}

impl DecodedGeometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn max_index(&self) -> u32 {
        self.indices.iter().copied().max().unwrap_or(0)
    }
}

/// One strided run of scalars in the raw blob: element `i`, component `c`
/// lives at `base + i * stride + c * width`.
#[derive(Debug, Clone, Copy)]
struct StridedChannel<'r> {
    raw: &'r [u8],
    base: usize,
    stride: usize,
    ty: ComponentType,
    normalized: bool,
}

impl<'r> StridedChannel<'r> {
    /// Channel for a vertex attribute, along with how many whole vertices fit
    /// in its buffer.
    fn for_attribute(
        raw: &'r [u8],
        desc: &BufferDescriptor,
        attr: &VertexAttribute,
    ) -> TranscodeResult<(Self, usize)> {
        let ty = ComponentType::resolve(&attr.component_type)?;
        let stride = attr.effective_stride(ty);
        let count = desc
            .byte_length
            .saturating_sub(attr.offset)
            .checked_div(stride)
            .unwrap_or(0);
        let channel = Self {
            raw,
            base: desc.byte_offset.saturating_add(attr.offset),
            stride,
            ty,
            normalized: attr.normalized,
        };
        Ok((channel, count))
    }

    fn element<const N: usize>(&self, i: usize) -> TranscodeResult<[f64; N]> {
        // Saturate so absurd descriptors fail the bounds check instead of wrapping.
        let start = self.base.saturating_add(i.saturating_mul(self.stride));
        let width = self.ty.byte_width();
        let mut out = [0.0; N];
        for (c, slot) in out.iter_mut().enumerate() {
            let v = scalar::read_scalar(self.raw, start.saturating_add(c * width), self.ty)?;
            *slot = if self.normalized {
                scalar::normalize(v, self.ty)
            } else {
                v
            };
        }
        Ok(out)
    }

    fn read<const N: usize>(
        self,
        count: usize,
    ) -> impl Iterator<Item = TranscodeResult<[f64; N]>> + 'r {
        (0..count).map(move |i| self.element::<N>(i))
    }
}

fn to_f32<const N: usize>(v: [f64; N]) -> [f32; N] {
    v.map(|c| c as f32)
}

fn decode_indices(raw: &[u8], selection: &Selection<'_>) -> TranscodeResult<Vec<u32>> {
    let call = selection.draw_call;
    let desc = selection.buffer(call.index_buffer_id).ok_or_else(|| {
        Report::new(TranscodeError::MissingBufferDescriptor {
            role: BufferRole::Index,
            id: call.index_buffer_id,
        })
    })?;
    // A call with no recorded index type reports code 0.
    let ty = call
        .index_type
        .as_ref()
        .ok_or_else(|| Report::new(TranscodeError::UnsupportedComponentType(0)))
        .and_then(ComponentType::resolve)?;
    let channel = StridedChannel {
        raw,
        base: desc.byte_offset.saturating_add(call.index_offset),
        stride: ty.byte_width(),
        ty,
        normalized: false,
    };
    // Negative values from signed index types wrap the way a u32 store would.
    channel
        .read::<1>(call.index_count())
        .map(|v| v.map(|[i]| i as i64 as u32))
        .collect()
}

/// Decode an optional channel. A missing buffer descriptor disables the
/// channel instead of failing the decode.
fn decode_optional<const N: usize>(
    raw: &[u8],
    selection: &Selection<'_>,
    attr: Option<&VertexAttribute>,
    vertex_count: usize,
    name: &str,
) -> TranscodeResult<Option<Vec<[f32; N]>>> {
    let Some(attr) = attr else {
        return Ok(None);
    };
    let Some(desc) = selection.buffer(attr.buffer_id) else {
        warn!(
            slot = attr.index,
            buffer_id = ?attr.buffer_id,
            "{name} buffer descriptor missing; exporting without {name}s"
        );
        return Ok(None);
    };
    let (channel, available) = StridedChannel::for_attribute(raw, desc, attr)?;
    let count = available.min(vertex_count);
    channel
        .read::<N>(count)
        .map(|v| v.map(to_f32))
        .collect::<TranscodeResult<Vec<_>>>()
        .map(Some)
}

/// Decode the selected draw call's geometry out of `raw`.
pub fn decode(
    raw: &[u8],
    selection: &Selection<'_>,
    options: &DecodeOptions,
) -> TranscodeResult<DecodedGeometry> {
    let call = selection.draw_call;
    let Classification {
        position,
        normal,
        tex_coord,
    } = classifier::classify(&call.attributes);
    let position = position.ok_or_else(|| Report::new(TranscodeError::MissingPositionAttribute))?;
    debug!(
        position = position.index,
        normal = ?normal.map(|a| a.index),
        uv = ?tex_coord.map(|a| a.index),
        "classified attributes"
    );

    let indices = decode_indices(raw, selection)?;

    let pos_desc = selection.buffer(position.buffer_id).ok_or_else(|| {
        Report::new(TranscodeError::MissingBufferDescriptor {
            role: BufferRole::Position,
            id: position.buffer_id,
        })
    })?;
    let (channel, vertex_count) = StridedChannel::for_attribute(raw, pos_desc, position)?;
    let mut positions = Vec::with_capacity(vertex_count.min(raw.len()));
    let mut position_bounds = Bounds::empty();
    for p in channel.read::<3>(vertex_count) {
        let p = to_f32(options.apply(p?));
        position_bounds.include(&p);
        positions.push(p);
    }

    let normals = decode_optional::<3>(raw, selection, normal, vertex_count, "normal")?;
    let uvs = decode_optional::<2>(raw, selection, tex_coord, vertex_count, "uv")?;
    let uv_bounds = uvs.as_ref().map(|uvs| {
        let mut bounds = Bounds::empty();
        uvs.iter().for_each(|uv| bounds.include(uv));
        bounds
    });

    debug!(
        indices = indices.len(),
        vertices = positions.len(),
        normals = normals.as_ref().map_or(0, Vec::len),
        uvs = uvs.as_ref().map_or(0, Vec::len),
        "decoded draw call"
    );

    Ok(DecodedGeometry {
        indices,
        positions,
        normals,
        uvs,
        position_bounds,
        uv_bounds,
    })
}
