//! Foldercut assembles a folder tree of media files into an `xmeml` timeline
//! document that a non-linear editor opens without manual repair.
//!
//! # Pipeline overview
//!
//! 1. **Scan**: walk the collection root into ordered [`MediaGroup`]s, the root
//!    itself plus every direct, non-excluded subfolder (`scan`)
//! 2. **Probe**: resolve durations and pixel dimensions through the system
//!    `ffprobe` binary with deterministic fallbacks (`media`)
//! 3. **Build**: advance a single frame cursor across groups and clips, pick a
//!    Basic Motion transform per visual clip from the dimension-keyed policy
//!    (`timeline`, `motion`)
//! 4. **Emit**: serialize the cross-referenced sequence graph (tracks, linked
//!    clip pairs, markers) behind the literal dialect preamble (`xmeml`)
//!
//! The key design constraints:
//!
//! - **Deterministic layout**: item order is (mtime ascending, name ascending)
//!   within a group, group order is (mtime descending, name descending) across
//!   groups. The same tree always yields the same timeline.
//! - **Degrade, never abort**: a failed probe substitutes a fallback value and a
//!   missing reference document falls back to defaults. Only a missing root or
//!   an empty collection is fatal.
//! - **Build fully, then write**: the whole document model is constructed in
//!   memory before a single output byte hits disk.
#![forbid(unsafe_code)]

pub mod foundation;
pub mod media;
pub mod motion;
pub mod pipeline;
pub mod reference;
pub mod scan;
pub mod timeline;
pub mod xmeml;

pub use foundation::core::Fps;
pub use foundation::error::{FoldercutError, FoldercutResult};
pub use media::classify::{MediaCategory, is_media_file};
pub use media::probe::{DimensionCache, MediaProber};
pub use motion::policy::{
    DEFAULT_CENTER, IMAGE_LEFT_X, MotionPolicy, MotionRule, MotionTemplate, ResolvedMotion,
    SEQUENCE_HEIGHT, SEQUENCE_WIDTH, WidthOverride, encode_center, image_left_center_x,
};
pub use pipeline::{ExportOptions, export_collection};
pub use reference::{DEFAULT_LABEL, DEFAULT_MARKER_COLOR, detect_label, detect_marker_color};
pub use scan::walker::{MediaGroup, MediaItem, ScanConfig, scan_collection};
pub use timeline::builder::{BuildConfig, TimelineBuilder};
pub use timeline::ids::IdGenerator;
pub use xmeml::document::{
    AUDIO_CLIP_TRACK_INDEX, AlphaType, ClipItem, ClipLink, FileDef, FileSource, LinkMedia,
    MotionFilter, RESERVED_AUDIO_TRACKS, RESERVED_VIDEO_TRACKS, SequenceDoc, SequenceMarker,
    VIDEO_CLIP_TRACK_INDEX,
};
pub use xmeml::writer::{XMEML_PREAMBLE, format_number, serialize_document};
