//! Encoders turning decoded geometry into files other tools can open.

pub mod glb;
pub mod gltf_export;
pub mod naming;
pub mod obj;

pub use glb::{GlbAsset, pack_glb};
pub use gltf_export::{GltfAsset, encode_gltf};
pub use naming::FileStamp;
pub use obj::{ObjAsset, encode_obj};

fn pad_to_4(data: &mut Vec<u8>) {
    while data.len() % 4 != 0 {
        data.push(0);
    }
}
