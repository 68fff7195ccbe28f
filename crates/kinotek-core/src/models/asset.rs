use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

/// What a stored file is used for. Each kind gets its own base directory and
/// URL segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Video,
    Thumbnail,
}

impl AssetKind {
    /// URL segment under which assets of this kind are served.
    pub fn segment(self) -> &'static str {
        match self {
            AssetKind::Video => "videos",
            AssetKind::Thumbnail => "thumbnails",
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.segment())
    }
}

/// Descriptor for one stored file.
///
/// Immutable once written; removed only when the owning record is deleted,
/// and even then best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    /// Collision-free name the file is stored under (UUID plus the original
    /// extension).
    pub generated_name: String,
    pub original_name: String,
    pub content_type: String,
    pub byte_size: u64,
    /// Filesystem location. Internal; clients only ever see
    /// [`public_path`](MediaAsset::public_path).
    pub storage_path: PathBuf,
    pub kind: AssetKind,
}

impl MediaAsset {
    /// Public-facing path clients use to fetch the bytes.
    pub fn public_path(&self) -> String {
        format!("/{}/{}", self.kind.segment(), self.generated_name)
    }
}
