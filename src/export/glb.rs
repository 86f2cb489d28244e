//! Pack a glTF document and its binary payload into a single GLB container.
//!
//! Layout (all integers little-endian u32):
//!
//! ```text
//! header: magic "glTF" | version 2 | total length
//! chunk:  length | "JSON" | JSON text padded with spaces
//! chunk:  length | "BIN\0" | payload padded with zeros
//! ```

use std::borrow::Cow;

use gltf_json as json;
use json::validation::USize64;
use rootcause::Report;

use crate::error::{TranscodeError, TranscodeResult};
use crate::export::gltf_export::GltfAsset;
use crate::export::naming::FileStamp;
use crate::export::pad_to_4;

pub const GLB_MAGIC: u32 = 0x4654_6C67;
pub const GLB_VERSION: u32 = 2;
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
pub const CHUNK_BIN: u32 = 0x004E_4942;

#[derive(Debug, Clone)]
pub struct GlbAsset {
    pub bytes: Vec<u8>,
    pub stamp: FileStamp,
}

impl GlbAsset {
    pub fn file_name(&self) -> String {
        self.stamp.glb_name()
    }
}

/// Pack `asset` into GLB bytes. The source document is left untouched; the
/// embedded copy drops the external `.bin` reference.
pub fn pack_glb(asset: &GltfAsset) -> TranscodeResult<GlbAsset> {
    let mut root = asset.root.clone();
    for buffer in root.buffers.iter_mut() {
        buffer.uri = None;
        buffer.byte_length = USize64::from(asset.bin.len());
    }

    let mut json_bytes = json::serialize::to_string(&root)
        .map_err(|e| Report::new(TranscodeError::Serialize(e.to_string())))?
        .into_bytes();
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }
    let mut bin = asset.bin.clone();
    pad_to_4(&mut bin);

    let glb = gltf::binary::Glb {
        header: gltf::binary::Header {
            magic: *b"glTF",
            version: GLB_VERSION,
            length: 0, // to_writer computes this
        },
        json: Cow::Owned(json_bytes),
        bin: Some(Cow::Owned(bin)),
    };

    let mut bytes = Vec::new();
    glb.to_writer(&mut bytes)
        .map_err(|e| Report::new(TranscodeError::Io(e.to_string())))?;

    Ok(GlbAsset {
        bytes,
        stamp: asset.stamp.clone(),
    })
}
