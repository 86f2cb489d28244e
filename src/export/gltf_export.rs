//! Encode decoded geometry as a glTF 2.0 document plus an external `.bin`.

use std::collections::BTreeMap;

use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use rootcause::Report;

use crate::decode::DecodedGeometry;
use crate::error::{TranscodeError, TranscodeResult};
use crate::export::naming::FileStamp;
use crate::export::pad_to_4;

/// glTF document and the binary payload its single buffer points at.
#[derive(Debug, Clone)]
pub struct GltfAsset {
    pub root: json::Root,
    pub bin: Vec<u8>,
    pub stamp: FileStamp,
}

impl GltfAsset {
    pub fn to_json_string(&self) -> TranscodeResult<String> {
        json::serialize::to_string_pretty(&self.root)
            .map_err(|e| Report::new(TranscodeError::Serialize(e.to_string())))
    }
}

/// Append one section to `bin`, 4-byte aligned, and create its buffer view.
fn push_section(
    root: &mut json::Root,
    bin: &mut Vec<u8>,
    bytes: impl Iterator<Item = [u8; 4]>,
    target: json::buffer::Target,
) -> json::Index<json::buffer::View> {
    pad_to_4(bin);
    let byte_offset = bin.len();
    bytes.for_each(|b| bin.extend_from_slice(&b));
    let byte_length = bin.len() - byte_offset;

    root.push(json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64::from(byte_length),
        byte_offset: Some(USize64::from(byte_offset)),
        byte_stride: None,
        target: Some(Valid(target)),
        name: None,
        extensions: Default::default(),
        extras: Default::default(),
    })
}

fn push_accessor(
    root: &mut json::Root,
    view: json::Index<json::buffer::View>,
    count: usize,
    component_type: json::accessor::ComponentType,
    type_: json::accessor::Type,
    bounds: Option<(json::Value, json::Value)>,
) -> json::Index<json::Accessor> {
    let (min, max) = bounds.unzip();
    root.push(json::Accessor {
        buffer_view: Some(view),
        byte_offset: Some(USize64(0)),
        count: USize64::from(count),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        type_: Valid(type_),
        min,
        max,
        name: None,
        normalized: false,
        sparse: None,
        extensions: Default::default(),
        extras: Default::default(),
    })
}

fn f32_bytes<const N: usize>(items: &[[f32; N]]) -> impl Iterator<Item = [u8; 4]> + '_ {
    items.iter().flatten().map(|c| c.to_le_bytes())
}

fn bounds_value<const N: usize>(min: [f32; N], max: [f32; N]) -> (json::Value, json::Value) {
    (
        json::Value::from(min.to_vec()),
        json::Value::from(max.to_vec()),
    )
}

/// Build the glTF document for one decoded draw call.
///
/// Sections are packed in the order indices, positions, normals, UVs, each
/// with its own buffer view and accessor.
pub fn encode_gltf(geometry: &DecodedGeometry, stamp: FileStamp) -> GltfAsset {
    use json::accessor::{ComponentType, Type};
    use json::buffer::Target;

    let mut root = json::Root::default();
    root.asset = json::Asset {
        version: "2.0".to_string(),
        generator: Some("capmesh".to_string()),
        ..Default::default()
    };

    let mut bin: Vec<u8> = Vec::new();
    let mut attributes = BTreeMap::new();

    // --- Indices ---
    let view = push_section(
        &mut root,
        &mut bin,
        geometry.indices.iter().map(|i| i.to_le_bytes()),
        Target::ElementArrayBuffer,
    );
    let indices = push_accessor(
        &mut root,
        view,
        geometry.indices.len(),
        ComponentType::U32,
        Type::Scalar,
        Some((
            json::Value::from(vec![0u32]),
            json::Value::from(vec![geometry.max_index()]),
        )),
    );

    // --- Positions ---
    let view = push_section(
        &mut root,
        &mut bin,
        f32_bytes(&geometry.positions),
        Target::ArrayBuffer,
    );
    let (min, max) = geometry.position_bounds.finite();
    let positions = push_accessor(
        &mut root,
        view,
        geometry.positions.len(),
        ComponentType::F32,
        Type::Vec3,
        Some(bounds_value(min, max)),
    );
    attributes.insert(Valid(json::mesh::Semantic::Positions), positions);

    // --- Normals ---
    if let Some(normals) = &geometry.normals {
        let view = push_section(&mut root, &mut bin, f32_bytes(normals), Target::ArrayBuffer);
        let accessor = push_accessor(
            &mut root,
            view,
            normals.len(),
            ComponentType::F32,
            Type::Vec3,
            Some(bounds_value([-1.0f32; 3], [1.0f32; 3])),
        );
        attributes.insert(Valid(json::mesh::Semantic::Normals), accessor);
    }

    // --- UVs ---
    if let Some(uvs) = &geometry.uvs {
        let view = push_section(&mut root, &mut bin, f32_bytes(uvs), Target::ArrayBuffer);
        let (min, max) = geometry
            .uv_bounds
            .map(|b| b.finite())
            .unwrap_or(([0.0; 2], [0.0; 2]));
        let accessor = push_accessor(
            &mut root,
            view,
            uvs.len(),
            ComponentType::F32,
            Type::Vec2,
            Some(bounds_value(min, max)),
        );
        attributes.insert(Valid(json::mesh::Semantic::TexCoords(0)), accessor);
    }

    pad_to_4(&mut bin);
    root.push(json::Buffer {
        byte_length: USize64::from(bin.len()),
        uri: Some(stamp.bin_name()),
        name: None,
        extensions: Default::default(),
        extras: Default::default(),
    });

    let mesh = root.push(json::Mesh {
        primitives: vec![json::mesh::Primitive {
            attributes,
            indices: Some(indices),
            material: None,
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
            extensions: Default::default(),
            extras: Default::default(),
        }],
        weights: None,
        name: None,
        extensions: Default::default(),
        extras: Default::default(),
    });

    let node = root.push(json::Node {
        mesh: Some(mesh),
        ..Default::default()
    });

    let scene = root.push(json::Scene {
        nodes: vec![node],
        name: None,
        extensions: Default::default(),
        extras: Default::default(),
    });
    root.scene = Some(scene);

    GltfAsset { root, bin, stamp }
}
