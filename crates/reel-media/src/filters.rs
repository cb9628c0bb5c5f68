//! FFmpeg video filter definitions.

use reel_models::ClipFilter;

/// Grayscale: drop saturation.
pub const FILTER_GRAYSCALE: &str = "hue=s=0";

/// Sepia: standard sepia color matrix.
pub const FILTER_SEPIA: &str =
    "colorchannelmixer=.393:.769:.189:0:.349:.686:.168:0:.272:.534:.131";

/// Invert: negate every channel.
pub const FILTER_INVERT: &str = "negate";

/// Build the video filter for a clip filter.
///
/// Returns `None` when the clip needs no pixel transform.
pub fn build_video_filter(filter: ClipFilter) -> Option<&'static str> {
    match filter {
        ClipFilter::None => None,
        ClipFilter::Grayscale => Some(FILTER_GRAYSCALE),
        ClipFilter::Sepia => Some(FILTER_SEPIA),
        ClipFilter::Invert => Some(FILTER_INVERT),
    }
}

/// Build filter for thumbnail generation.
pub fn filter_thumbnail(width: u32) -> String {
    format!("scale={}:-2", width)
}

/// Build filter for a waveform image.
pub fn filter_waveform(size: &str) -> String {
    format!("showwavespic=s={}:split_channels=0", size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_video_filter() {
        assert!(build_video_filter(ClipFilter::None).is_none());
        assert_eq!(build_video_filter(ClipFilter::Grayscale), Some("hue=s=0"));
        assert!(build_video_filter(ClipFilter::Sepia)
            .unwrap()
            .starts_with("colorchannelmixer"));
        assert_eq!(build_video_filter(ClipFilter::Invert), Some("negate"));
    }

    #[test]
    fn test_thumbnail_filter() {
        assert_eq!(filter_thumbnail(320), "scale=320:-2");
    }

    #[test]
    fn test_waveform_filter() {
        assert!(filter_waveform("1200x120").contains("s=1200x120"));
    }
}
