use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamp-derived file stem shared by every artifact of one build, e.g.
/// `mesh_2024-05-01T12-30-00-123Z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    stem: String,
}

impl FileStamp {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(time: DateTime<Utc>) -> Self {
        let iso = time.to_rfc3339_opts(SecondsFormat::Millis, true);
        Self {
            stem: format!("mesh_{}", iso.replace([':', '.'], "-")),
        }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.stem)
    }

    pub fn gltf_name(&self) -> String {
        self.file_name("gltf")
    }

    pub fn bin_name(&self) -> String {
        self.file_name("bin")
    }

    pub fn glb_name(&self) -> String {
        self.file_name("glb")
    }

    pub fn obj_name(&self) -> String {
        self.file_name("obj")
    }
}
