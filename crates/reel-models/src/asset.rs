//! Locally managed media assets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A media file registered in managed storage.
///
/// Minted at most once per completed remote job, when its output is ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestedAsset {
    /// Asset identifier
    pub id: String,
    /// File name inside managed storage
    pub filename: String,
    /// Absolute path of the stored file
    pub storage_path: String,
    /// File size in bytes
    pub size: u64,
    /// MIME type derived from the file extension
    pub media_type: String,
    /// Duration in seconds
    pub duration: f64,
    /// Resolution as `"<width>x<height>"`
    pub resolution: String,
    /// Video codec name
    pub codec: String,
    /// When the asset was registered
    pub uploaded_at: DateTime<Utc>,
}

/// Map a file extension to a MIME type.
pub fn media_type_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}
