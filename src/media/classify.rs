use std::path::Path;

pub const VIDEO_EXTS: &[&str] = &["mp4", "mov", "mxf", "m4v", "avi", "mkv", "mpg", "mpeg"];
pub const AUDIO_EXTS: &[&str] = &["wav", "mp3", "aif", "aiff", "aac", "m4a", "flac"];
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif"];

// Sidecar databases written next to the media carry this marker in their name.
const INTERNAL_NAME_MARKER: &str = "sqlite";

/// What a media file contributes to the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaCategory {
    Video,
    Audio,
    Image,
}

impl MediaCategory {
    /// Classify by extension. The audio set wins over the image set; anything
    /// else that passed the media filter is treated as video.
    pub fn from_path(path: &Path) -> Self {
        match ext_lower(path) {
            Some(ext) if AUDIO_EXTS.contains(&ext.as_str()) => Self::Audio,
            Some(ext) if IMAGE_EXTS.contains(&ext.as_str()) => Self::Image,
            _ => Self::Video,
        }
    }

    pub fn has_video_track(self) -> bool {
        matches!(self, Self::Video | Self::Image)
    }

    pub fn has_audio_track(self) -> bool {
        matches!(self, Self::Video | Self::Audio)
    }
}

/// True iff the file is one of the accepted media kinds and is not an internal
/// bookkeeping file.
pub fn is_media_file(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    if name.to_string_lossy().to_lowercase().contains(INTERNAL_NAME_MARKER) {
        return false;
    }
    match ext_lower(path) {
        Some(ext) => {
            VIDEO_EXTS.contains(&ext.as_str())
                || AUDIO_EXTS.contains(&ext.as_str())
                || IMAGE_EXTS.contains(&ext.as_str())
        }
        None => false,
    }
}

fn ext_lower(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}
