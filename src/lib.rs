/// Classify vertex attributes into position / normal / texcoord roles
pub mod classifier;
/// Vertex and index decoding from the raw capture blob
pub mod decode;
/// Error definitions
pub mod error;
/// glTF, GLB and OBJ encoders
pub mod export;
/// Post-decode position transform
pub mod options;
/// One-call entry points from trace + blob to finished artifacts
pub mod pipeline;
/// Generic wrapper for values that may or may not match a known variant.
pub mod recognized;
/// Graphics API component types and little-endian scalar reads
pub mod scalar;
/// Picks the dominant indexed-triangle draw call out of a trace
pub mod selector;
/// Metadata-only description of the selected draw call
pub mod summary;
/// Serde model of the captured trace document
pub mod trace;

#[cfg(test)]
mod test_support;

pub use decode::{DecodedGeometry, decode};
pub use error::{TranscodeError, TranscodeResult};
pub use options::DecodeOptions;
pub use pipeline::{Built, build_glb, build_gltf, build_obj, summarize};
pub use summary::Summary;
pub use trace::Trace;
