//! Wavefront OBJ text output.

use std::fmt::Write;

use rootcause::Report;
use tracing::warn;

use crate::decode::DecodedGeometry;
use crate::error::{TranscodeError, TranscodeResult};
use crate::export::naming::FileStamp;

#[derive(Debug, Clone)]
pub struct ObjAsset {
    pub text: String,
    pub stamp: FileStamp,
}

impl ObjAsset {
    pub fn file_name(&self) -> String {
        self.stamp.obj_name()
    }
}

/// Face token layout, fixed for the whole file by which channels exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaceFormat {
    Position,
    PositionUv,
    PositionNormal,
    PositionUvNormal,
}

impl FaceFormat {
    fn for_geometry(geometry: &DecodedGeometry) -> Self {
        match (geometry.uvs.is_some(), geometry.normals.is_some()) {
            (false, false) => FaceFormat::Position,
            (true, false) => FaceFormat::PositionUv,
            (false, true) => FaceFormat::PositionNormal,
            (true, true) => FaceFormat::PositionUvNormal,
        }
    }

    fn write_token(self, out: &mut String, i: u64) -> std::fmt::Result {
        match self {
            FaceFormat::Position => write!(out, "{i}"),
            FaceFormat::PositionUv => write!(out, "{i}/{i}"),
            FaceFormat::PositionNormal => write!(out, "{i}//{i}"),
            FaceFormat::PositionUvNormal => write!(out, "{i}/{i}/{i}"),
        }
    }
}

fn write_obj(out: &mut String, geometry: &DecodedGeometry) -> std::fmt::Result {
    let vertex_count = geometry.vertex_count() as u64;
    writeln!(out, "# capmesh export")?;
    writeln!(out, "# vertices: {vertex_count}")?;
    writeln!(out, "# indices: {}", geometry.indices.len())?;
    writeln!(out, "# triangles: {}", geometry.triangle_count())?;

    for [x, y, z] in &geometry.positions {
        writeln!(out, "v {x:.6} {y:.6} {z:.6}")?;
    }
    for [u, v] in geometry.uvs.iter().flatten() {
        writeln!(out, "vt {u:.6} {v:.6}")?;
    }
    for [x, y, z] in geometry.normals.iter().flatten() {
        writeln!(out, "vn {x:.6} {y:.6} {z:.6}")?;
    }
    writeln!(out)?;

    if vertex_count == 0 {
        return Ok(());
    }

    let format = FaceFormat::for_geometry(geometry);
    let mut clamped = 0usize;
    for tri in geometry.indices.chunks_exact(3) {
        out.push('f');
        for &index in tri {
            let one_based = index as u64 + 1;
            if one_based > vertex_count {
                clamped += 1;
            }
            out.push(' ');
            format.write_token(out, one_based.min(vertex_count))?;
        }
        out.push('\n');
    }

    if clamped > 0 {
        warn!(clamped, vertex_count, "clamped out-of-range face indices");
    }
    Ok(())
}

/// Render decoded geometry as OBJ text.
pub fn encode_obj(geometry: &DecodedGeometry, stamp: FileStamp) -> TranscodeResult<ObjAsset> {
    let mut text = String::new();
    write_obj(&mut text, geometry)
        .map_err(|e| Report::new(TranscodeError::Serialize(format!("OBJ text: {e}"))))?;
    Ok(ObjAsset { text, stamp })
}
