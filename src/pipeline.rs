//! End-to-end entry points: trace + raw blob in, artifacts out.
//!
//! Every call re-runs selection and decoding from its arguments; nothing is
//! cached between calls, so they are safe to run from any thread.

use rootcause::Report;
use tracing::info;

use crate::decode::{DecodedGeometry, decode};
use crate::error::{TranscodeError, TranscodeResult};
use crate::export::{
    FileStamp, GlbAsset, GltfAsset, ObjAsset, encode_gltf, encode_obj, pack_glb,
};
use crate::options::DecodeOptions;
use crate::selector::{Selection, select_draw_call};
use crate::summary::{Summary, summarize_selection};
use crate::trace::Trace;

/// A built artifact plus the summary of the draw call it came from.
#[derive(Debug, Clone)]
pub struct Built<A> {
    pub asset: A,
    pub summary: Summary,
}

/// Like [`select_draw_call`], but treats "nothing eligible" as an error.
pub fn select(trace: &Trace) -> TranscodeResult<Selection<'_>> {
    select_draw_call(trace).ok_or_else(|| Report::new(TranscodeError::NoEligibleDrawCall))
}

/// Describe the dominant draw call without touching any buffer contents.
pub fn summarize(trace: &Trace) -> TranscodeResult<Summary> {
    select(trace).map(|sel| summarize_selection(&sel))
}

pub fn decode_trace(
    raw: &[u8],
    trace: &Trace,
    options: &DecodeOptions,
) -> TranscodeResult<Built<DecodedGeometry>> {
    let selection = select(trace)?;
    let geometry = decode(raw, &selection, options)?;
    Ok(Built {
        asset: geometry,
        summary: summarize_selection(&selection),
    })
}

pub fn build_gltf(
    raw: &[u8],
    trace: &Trace,
    options: &DecodeOptions,
) -> TranscodeResult<Built<GltfAsset>> {
    let Built { asset, summary } = decode_trace(raw, trace, options)?;
    let gltf = encode_gltf(&asset, FileStamp::now());
    info!(
        file = %gltf.stamp.gltf_name(),
        bin_bytes = gltf.bin.len(),
        "built glTF"
    );
    Ok(Built {
        asset: gltf,
        summary,
    })
}

pub fn build_glb(
    raw: &[u8],
    trace: &Trace,
    options: &DecodeOptions,
) -> TranscodeResult<Built<GlbAsset>> {
    let Built { asset, summary } = build_gltf(raw, trace, options)?;
    let glb = pack_glb(&asset)?;
    info!(file = %glb.file_name(), bytes = glb.bytes.len(), "packed GLB");
    Ok(Built {
        asset: glb,
        summary,
    })
}

/// Build OBJ text. Runs its own decode, independent of any glTF build.
pub fn build_obj(
    raw: &[u8],
    trace: &Trace,
    options: &DecodeOptions,
) -> TranscodeResult<Built<ObjAsset>> {
    let Built { asset, summary } = decode_trace(raw, trace, options)?;
    let obj = encode_obj(&asset, FileStamp::now())?;
    info!(file = %obj.file_name(), triangles = asset.triangle_count(), "built OBJ");
    Ok(Built {
        asset: obj,
        summary,
    })
}
