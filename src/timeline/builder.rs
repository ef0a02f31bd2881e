use std::path::Path;

use tracing::{debug, info};
use url::Url;

use crate::{
    foundation::{
        core::Fps,
        error::{FoldercutError, FoldercutResult},
    },
    media::{classify::MediaCategory, probe::MediaProber},
    motion::policy::{MotionPolicy, encode_center},
    reference::{DEFAULT_LABEL, DEFAULT_MARKER_COLOR},
    scan::walker::MediaGroup,
    timeline::ids::IdGenerator,
    xmeml::document::{
        AUDIO_CLIP_TRACK_INDEX, AlphaType, ClipItem, ClipLink, FileDef, FileSource, LinkMedia,
        MotionFilter, SequenceDoc, SequenceMarker, VIDEO_CLIP_TRACK_INDEX,
    },
};

#[derive(Clone, Debug)]
pub struct BuildConfig {
    pub fps: Fps,
    /// Clip duration substituted when the duration probe fails.
    pub fallback_clip_secs: f64,
    /// Stills never run shorter than this, even when a probe reports less.
    pub image_min_secs: f64,
    /// Window each group marker spans before the group's clips begin.
    pub group_marker_secs: f64,
    pub label: String,
    pub marker_color: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            fps: Fps { num: 50, den: 1 },
            fallback_clip_secs: 10.0,
            image_min_secs: 5.0,
            group_marker_secs: 10.0,
            label: DEFAULT_LABEL.to_string(),
            marker_color: DEFAULT_MARKER_COLOR.to_string(),
        }
    }
}

/// Assembles the document model by advancing one monotonic frame cursor across
/// groups and clips. Owns the id generator; borrows the prober so the caller
/// controls the dimension cache's lifetime.
pub struct TimelineBuilder<'a> {
    config: &'a BuildConfig,
    policy: &'a MotionPolicy,
    prober: &'a mut MediaProber,
    ids: IdGenerator,
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(
        config: &'a BuildConfig,
        policy: &'a MotionPolicy,
        prober: &'a mut MediaProber,
    ) -> Self {
        Self {
            config,
            policy,
            prober,
            ids: IdGenerator::new(),
        }
    }

    pub fn build(mut self, sequence_name: &str, groups: &[MediaGroup]) -> FoldercutResult<SequenceDoc> {
        let fps = self.config.fps;
        let marker_frames = fps.secs_to_frames(self.config.group_marker_secs);

        let mut cursor: u64 = 0;
        let mut video_clips = Vec::new();
        let mut audio_clips = Vec::new();
        let mut markers = Vec::new();
        let mut video_ordinal: u64 = 1;
        let mut audio_ordinal: u64 = 1;

        for group in groups {
            markers.push(SequenceMarker {
                name: group.name.clone(),
                frame_in: cursor,
                frame_out: cursor + marker_frames,
            });
            cursor += marker_frames;
            info!(group = %group.name, files = group.items.len(), "placing group");

            for item in &group.items {
                let category = item.category;
                let mut secs = self
                    .prober
                    .duration_secs(&item.path, self.config.fallback_clip_secs);
                if category == MediaCategory::Image {
                    secs = secs.max(self.config.image_min_secs);
                }
                let frames = fps.secs_to_frames(secs).max(1);
                let start = cursor;
                let end = start + frames;

                let masterclip_id = self.ids.next_masterclip();
                let file_id = self.ids.next_file();
                let clip_name = file_display_name(&item.path);
                let pathurl = file_url(&item.path)?;

                let mut video_half: Option<(ClipItem, u64)> = None;
                if category.has_video_track() {
                    let clip_id = self.ids.next_clipitem();
                    let dims = self.prober.dimensions(&item.path, category);
                    let motion = self.policy.resolve(dims, category);
                    let ordinal = video_ordinal;
                    video_ordinal += 1;
                    video_half = Some((
                        ClipItem {
                            id: clip_id.clone(),
                            masterclip_id: masterclip_id.clone(),
                            name: clip_name.clone(),
                            duration_frames: frames,
                            start,
                            end,
                            alpha: Some(if category == MediaCategory::Image {
                                AlphaType::Straight
                            } else {
                                AlphaType::None
                            }),
                            stereo: false,
                            file: FileSource::Definition(FileDef {
                                id: file_id.clone(),
                                name: clip_name.clone(),
                                pathurl: pathurl.clone(),
                                duration_frames: frames,
                                include_video: true,
                                include_audio: category.has_audio_track(),
                                dimensions: dims,
                            }),
                            motion: Some(MotionFilter {
                                scale: motion.scale,
                                center: encode_center(motion.center_px),
                            }),
                            audio_source_track: false,
                            self_link: Some(ClipLink {
                                clipref: clip_id,
                                media: LinkMedia::Video,
                                track_index: VIDEO_CLIP_TRACK_INDEX,
                                clip_index: ordinal,
                                group_index: None,
                            }),
                            cross_link: None,
                        },
                        ordinal,
                    ));
                }

                let mut audio_half: Option<(ClipItem, u64)> = None;
                if category.has_audio_track() {
                    let clip_id = self.ids.next_clipitem();
                    let file = if video_half.is_some() {
                        FileSource::Reference(file_id.clone())
                    } else {
                        FileSource::Definition(FileDef {
                            id: file_id.clone(),
                            name: clip_name.clone(),
                            pathurl: pathurl.clone(),
                            duration_frames: frames,
                            include_video: false,
                            include_audio: true,
                            dimensions: None,
                        })
                    };
                    let ordinal = audio_ordinal;
                    audio_ordinal += 1;
                    audio_half = Some((
                        ClipItem {
                            id: clip_id,
                            masterclip_id: masterclip_id.clone(),
                            name: clip_name.clone(),
                            duration_frames: frames,
                            start,
                            end,
                            alpha: None,
                            stereo: true,
                            file,
                            motion: None,
                            audio_source_track: true,
                            self_link: None,
                            cross_link: None,
                        },
                        ordinal,
                    ));
                }

                if let (Some((video, v_ord)), Some((audio, a_ord))) =
                    (video_half.as_mut(), audio_half.as_mut())
                {
                    video.cross_link = Some(ClipLink {
                        clipref: audio.id.clone(),
                        media: LinkMedia::Audio,
                        track_index: AUDIO_CLIP_TRACK_INDEX,
                        clip_index: *a_ord,
                        group_index: Some(1),
                    });
                    audio.cross_link = Some(ClipLink {
                        clipref: video.id.clone(),
                        media: LinkMedia::Video,
                        track_index: VIDEO_CLIP_TRACK_INDEX,
                        clip_index: *v_ord,
                        group_index: Some(1),
                    });
                }

                if let Some((video, _)) = video_half {
                    video_clips.push(video);
                }
                if let Some((audio, _)) = audio_half {
                    audio_clips.push(audio);
                }

                debug!(file = %clip_name, secs, frames, start, end, "placed clip");
                cursor = end;
            }
        }

        Ok(SequenceDoc {
            name: sequence_name.to_string(),
            duration_frames: cursor,
            timebase: fps.timebase(),
            label: self.config.label.clone(),
            marker_color: self.config.marker_color.clone(),
            video_clips,
            audio_clips,
            markers,
        })
    }
}

fn file_display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_url(path: &Path) -> FoldercutResult<String> {
    let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    Url::from_file_path(&absolute)
        .map(|url| url.to_string())
        .map_err(|()| {
            FoldercutError::timeline(format!("cannot form a file url for '{}'", path.display()))
        })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::scan::walker::MediaItem;

    use super::*;

    fn group(dir: &Path, name: &str, files: &[&str]) -> MediaGroup {
        let items = files
            .iter()
            .map(|f| {
                let path = dir.join(f);
                fs::write(&path, b"junk").unwrap();
                MediaItem::from_path(path)
            })
            .collect();
        MediaGroup {
            name: name.to_string(),
            folder: dir.to_path_buf(),
            items,
        }
    }

    #[test]
    fn cursor_advances_through_markers_and_clips() {
        let dir = tempfile::tempdir().unwrap();
        let groups = vec![group(dir.path(), "g1", &["a.mp4", "b.mp4"])];

        let config = BuildConfig::default();
        let policy = MotionPolicy::default();
        let mut prober = MediaProber::new();
        let doc = TimelineBuilder::new(&config, &policy, &mut prober)
            .build("seq", &groups)
            .unwrap();

        // Marker window 500 frames, then two 500-frame fallback clips.
        assert_eq!(doc.markers.len(), 1);
        assert_eq!(doc.markers[0].frame_in, 0);
        assert_eq!(doc.markers[0].frame_out, 500);
        assert_eq!(doc.video_clips[0].start, 500);
        assert_eq!(doc.video_clips[0].end, 1000);
        assert_eq!(doc.video_clips[1].start, 1000);
        assert_eq!(doc.video_clips[1].end, 1500);
        assert_eq!(doc.duration_frames, 1500);

        for clip in doc.video_clips.iter().chain(doc.audio_clips.iter()) {
            assert_eq!(clip.duration_frames, clip.end - clip.start);
        }
    }

    #[test]
    fn ids_links_and_ordinals_cover_mixed_categories() {
        let dir = tempfile::tempdir().unwrap();
        let groups = vec![group(dir.path(), "g1", &["v.mp4", "s.png", "t.wav"])];

        let config = BuildConfig::default();
        let policy = MotionPolicy::default();
        let mut prober = MediaProber::new();
        let doc = TimelineBuilder::new(&config, &policy, &mut prober)
            .build("seq", &groups)
            .unwrap();

        // v.mp4 -> video+audio pair, s.png -> video only, t.wav -> audio only.
        assert_eq!(doc.video_clips.len(), 2);
        assert_eq!(doc.audio_clips.len(), 2);

        let v = &doc.video_clips[0];
        let va = &doc.audio_clips[0];
        assert_eq!(v.id, "clipitem-1");
        assert_eq!(va.id, "clipitem-2");
        assert_eq!(v.masterclip_id, "masterclip-1");
        assert_eq!(va.masterclip_id, "masterclip-1");
        assert!(matches!(&v.file, FileSource::Definition(def) if def.id == "file-1"));
        assert!(matches!(&va.file, FileSource::Reference(id) if id == "file-1"));

        let v_cross = v.cross_link.as_ref().unwrap();
        assert_eq!(v_cross.clipref, "clipitem-2");
        assert_eq!(v_cross.track_index, AUDIO_CLIP_TRACK_INDEX);
        assert_eq!(v_cross.clip_index, 1);
        assert_eq!(v_cross.group_index, Some(1));
        let va_cross = va.cross_link.as_ref().unwrap();
        assert_eq!(va_cross.clipref, "clipitem-1");
        assert_eq!(va_cross.track_index, VIDEO_CLIP_TRACK_INDEX);
        assert_eq!(va_cross.clip_index, 1);

        let s = &doc.video_clips[1];
        assert_eq!(s.id, "clipitem-3");
        assert_eq!(s.alpha, Some(AlphaType::Straight));
        assert!(s.cross_link.is_none());
        assert_eq!(s.self_link.as_ref().unwrap().clip_index, 2);
        assert!(matches!(&s.file, FileSource::Definition(def) if !def.include_audio));

        let t = &doc.audio_clips[1];
        assert_eq!(t.id, "clipitem-4");
        assert!(t.self_link.is_none());
        assert!(t.cross_link.is_none());
        assert!(t.stereo);
        assert!(matches!(&t.file, FileSource::Definition(def) if !def.include_video));
    }

    #[test]
    fn image_duration_floor_beats_a_short_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let groups = vec![group(dir.path(), "g1", &["v.mp4", "s.png"])];

        let config = BuildConfig {
            fallback_clip_secs: 2.0,
            ..BuildConfig::default()
        };
        let policy = MotionPolicy::default();
        let mut prober = MediaProber::new();
        let doc = TimelineBuilder::new(&config, &policy, &mut prober)
            .build("seq", &groups)
            .unwrap();

        // Video keeps the 2 s fallback; the still is floored to 5 s.
        assert_eq!(doc.video_clips[0].duration_frames, 100);
        assert_eq!(doc.video_clips[1].duration_frames, 250);
    }

    #[test]
    fn empty_groups_still_mark_the_timeline() {
        let dir = tempfile::tempdir().unwrap();
        let empty = MediaGroup {
            name: "empty".to_string(),
            folder: dir.path().to_path_buf(),
            items: vec![],
        };
        let groups = vec![empty, group(dir.path(), "g2", &["a.mp4"])];

        let config = BuildConfig::default();
        let policy = MotionPolicy::default();
        let mut prober = MediaProber::new();
        let doc = TimelineBuilder::new(&config, &policy, &mut prober)
            .build("seq", &groups)
            .unwrap();

        assert_eq!(doc.markers.len(), 2);
        assert_eq!(doc.markers[1].frame_in, 500);
        assert_eq!(doc.video_clips[0].start, 1000);
        assert_eq!(doc.duration_frames, 1500);
    }
}
