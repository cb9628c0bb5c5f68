//! Export project and clip descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Color filter burned into a clip while it is cut.
///
/// `None` means the clip can be stream-copied without re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClipFilter {
    /// No pixel transform (stream copy)
    #[default]
    None,
    /// Desaturate to grayscale
    Grayscale,
    /// Warm brown sepia tone
    Sepia,
    /// Invert all color channels
    Invert,
}

impl ClipFilter {
    /// Get string representation of the filter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipFilter::None => "none",
            ClipFilter::Grayscale => "grayscale",
            ClipFilter::Sepia => "sepia",
            ClipFilter::Invert => "invert",
        }
    }

    /// Whether applying this filter forces a re-encode.
    pub fn requires_reencode(&self) -> bool {
        !matches!(self, ClipFilter::None)
    }
}

impl fmt::Display for ClipFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One trimmed, optionally filtered segment of a source video.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClipDescriptor {
    /// Clip identifier, unique within the project
    #[validate(length(min = 1, message = "clip id must not be empty"))]
    pub id: String,

    /// Path to the source video on local disk
    #[validate(length(min = 1, message = "sourcePath must not be empty"))]
    pub source_path: String,

    /// Start of the trimmed range in seconds
    #[serde(default, alias = "startTime")]
    #[validate(range(min = 0.0, message = "trimStart must be >= 0"))]
    pub trim_start: f64,

    /// End of the trimmed range in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_end: Option<f64>,

    /// Legacy name for the end of the range, used when `trim_end` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,

    /// Color filter to burn in
    #[serde(default)]
    pub filter: ClipFilter,
}

impl ClipDescriptor {
    /// End of the trimmed range (`trim_end`, falling back to `end_time`).
    pub fn end(&self) -> Option<f64> {
        self.trim_end.or(self.end_time)
    }

    /// Length of the trimmed range in seconds.
    ///
    /// May be zero or negative for malformed clips; callers reject those.
    pub fn duration(&self) -> Option<f64> {
        self.end().map(|end| end - self.trim_start)
    }
}

/// An ordered list of clips to export as one deliverable.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    /// Clips in playback order
    #[validate(length(min = 1, message = "project has no clips"), nested)]
    pub clips: Vec<ClipDescriptor>,
}

impl ProjectDescriptor {
    /// Total duration of all clips that have a well-formed range.
    pub fn total_duration(&self) -> f64 {
        self.clips
            .iter()
            .filter_map(|c| c.duration())
            .filter(|d| *d > 0.0)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(json: serde_json::Value) -> ClipDescriptor {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_clip_deserialize_camel_case() {
        let c = clip(serde_json::json!({
            "id": "a",
            "sourcePath": "/videos/a.mp4",
            "trimStart": 2.0,
            "trimEnd": 4.5,
            "filter": "grayscale"
        }));
        assert_eq!(c.filter, ClipFilter::Grayscale);
        assert!((c.duration().unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_clip_end_time_fallback() {
        let c = clip(serde_json::json!({
            "id": "a",
            "sourcePath": "/videos/a.mp4",
            "trimStart": 1.0,
            "endTime": 3.0
        }));
        assert_eq!(c.end(), Some(3.0));
        assert_eq!(c.filter, ClipFilter::None);
        assert!(!c.filter.requires_reencode());
    }

    #[test]
    fn test_trim_end_wins_over_end_time() {
        let c = clip(serde_json::json!({
            "id": "a",
            "sourcePath": "/videos/a.mp4",
            "trimEnd": 5.0,
            "endTime": 9.0
        }));
        assert_eq!(c.duration(), Some(5.0));
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let result: Result<ClipDescriptor, _> = serde_json::from_value(serde_json::json!({
            "id": "a",
            "sourcePath": "/videos/a.mp4",
            "filter": "vignette"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_project_validation() {
        let empty = ProjectDescriptor { clips: vec![] };
        assert!(empty.validate().is_err());

        let negative = ProjectDescriptor {
            clips: vec![clip(serde_json::json!({
                "id": "a",
                "sourcePath": "/videos/a.mp4",
                "trimStart": -1.0,
                "trimEnd": 2.0
            }))],
        };
        assert!(negative.validate().is_err());

        let ok = ProjectDescriptor {
            clips: vec![clip(serde_json::json!({
                "id": "a",
                "sourcePath": "/videos/a.mp4",
                "trimEnd": 2.0
            }))],
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_total_duration_skips_malformed() {
        let project = ProjectDescriptor {
            clips: vec![
                clip(serde_json::json!({"id": "a", "sourcePath": "x", "trimStart": 0.0, "trimEnd": 5.0})),
                clip(serde_json::json!({"id": "b", "sourcePath": "x", "trimStart": 2.0, "trimEnd": 4.0})),
                clip(serde_json::json!({"id": "c", "sourcePath": "x", "trimStart": 4.0, "trimEnd": 4.0})),
            ],
        };
        assert!((project.total_duration() - 7.0).abs() < 1e-9);
    }
}
