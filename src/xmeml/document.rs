//! Typed node graph for the emitted dialect. The builder fills these structs;
//! the writer serializes them. Nothing here touches the filesystem.

use kurbo::Point;

pub const XMEML_VERSION: &str = "4";

/// Empty, locked tracks the editor expects above the content tracks.
pub const RESERVED_VIDEO_TRACKS: usize = 3;
pub const RESERVED_AUDIO_TRACKS: usize = 1;

/// 1-based track index clip items land on, below the reserved tracks.
pub const VIDEO_CLIP_TRACK_INDEX: u32 = RESERVED_VIDEO_TRACKS as u32 + 1;
pub const AUDIO_CLIP_TRACK_INDEX: u32 = RESERVED_AUDIO_TRACKS as u32 + 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkMedia {
    Video,
    Audio,
}

impl LinkMedia {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// One half of the bidirectional linkage between a clip pair, or a clip's
/// reference to itself on its own track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipLink {
    pub clipref: String,
    pub media: LinkMedia,
    pub track_index: u32,
    /// Ordinal among clip items of the same media type, 1-based.
    pub clip_index: u64,
    pub group_index: Option<u32>,
}

/// Full file definition, emitted on the first reference to a file id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDef {
    pub id: String,
    pub name: String,
    pub pathurl: String,
    pub duration_frames: u64,
    pub include_video: bool,
    pub include_audio: bool,
    /// Source pixel dimensions when resolvable; the writer substitutes the
    /// editor's assumed 1920x1080 otherwise.
    pub dimensions: Option<(u32, u32)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileSource {
    Definition(FileDef),
    /// Bare `<file id=..>` back-reference to an already-defined file.
    Reference(String),
}

/// Basic Motion parameters with the center already encoded into the dialect's
/// normalized coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionFilter {
    pub scale: f64,
    pub center: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaType {
    None,
    Straight,
}

impl AlphaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Straight => "straight",
        }
    }
}

/// One placed occurrence of a media file on a track.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipItem {
    pub id: String,
    pub masterclip_id: String,
    pub name: String,
    pub duration_frames: u64,
    pub start: u64,
    pub end: u64,
    /// Video items carry an alpha type (and the square pixel-aspect block);
    /// audio items carry none.
    pub alpha: Option<AlphaType>,
    /// Audio items are tagged as stereo channel pairs.
    pub stereo: bool,
    pub file: FileSource,
    pub motion: Option<MotionFilter>,
    /// Audio items name their source track.
    pub audio_source_track: bool,
    /// A clip's link to its own position, emitted before the label block.
    pub self_link: Option<ClipLink>,
    /// The link to the other half of the pair, emitted after the label block.
    pub cross_link: Option<ClipLink>,
}

/// Sequence-level marker spanning one group's intro window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceMarker {
    pub name: String,
    pub frame_in: u64,
    pub frame_out: u64,
}

/// The complete document model handed to the writer.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceDoc {
    pub name: String,
    pub duration_frames: u64,
    pub timebase: String,
    pub label: String,
    pub marker_color: String,
    pub video_clips: Vec<ClipItem>,
    pub audio_clips: Vec<ClipItem>,
    pub markers: Vec<SequenceMarker>,
}
