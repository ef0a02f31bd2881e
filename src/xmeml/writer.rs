//! Serialization of the document model. The two-line preamble is written as
//! literal bytes ahead of the event stream; everything after it goes through
//! quick-xml so names, text, and attributes are escaped consistently.

use std::io::Write;

use kurbo::Point;
use quick_xml::{Writer, events::BytesText};

use crate::{
    foundation::error::FoldercutResult,
    motion::policy::{SEQUENCE_HEIGHT, SEQUENCE_WIDTH},
    xmeml::document::{
        AUDIO_CLIP_TRACK_INDEX, ClipItem, ClipLink, FileDef, FileSource, MotionFilter,
        RESERVED_AUDIO_TRACKS, RESERVED_VIDEO_TRACKS, SequenceDoc, SequenceMarker, XMEML_VERSION,
    },
};

/// The dialect requires exactly these two lines before the document element.
pub const XMEML_PREAMBLE: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE xmeml>\n";

type XmlResult = Result<(), quick_xml::Error>;

/// Serialize the whole document into one UTF-8 buffer, preamble included.
pub fn serialize_document(doc: &SequenceDoc) -> FoldercutResult<Vec<u8>> {
    let mut out = Vec::with_capacity(64 * 1024);
    out.extend_from_slice(XMEML_PREAMBLE);
    let mut writer = Writer::new(&mut out);
    write_sequence(&mut writer, doc)?;
    Ok(out)
}

/// Dialect number formatting: integral values print without a fractional part,
/// everything else keeps at most four decimals with trailing zeros trimmed.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let s = format!("{value:.4}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn write_sequence<W: Write>(w: &mut Writer<W>, doc: &SequenceDoc) -> XmlResult {
    w.create_element("xmeml")
        .with_attribute(("version", XMEML_VERSION))
        .write_inner_content(|w| -> XmlResult {
            w.create_element("sequence")
                .with_attribute(("id", "sequence-1"))
                .write_inner_content(|w| -> XmlResult {
                    text_el(w, "uuid", "00000000-0000-0000-0000-000000000000")?;
                    text_el(w, "duration", &doc.duration_frames.to_string())?;
                    rate_el(w, &doc.timebase)?;
                    text_el(w, "name", &doc.name)?;
                    write_media(w, doc)?;
                    timecode_el(w, &doc.timebase)?;
                    for marker in &doc.markers {
                        write_marker(w, marker, &doc.marker_color)?;
                    }
                    labels_and_logging(w, &doc.label)
                })?;
            Ok(())
        })?;
    Ok(())
}

fn write_media<W: Write>(w: &mut Writer<W>, doc: &SequenceDoc) -> XmlResult {
    w.create_element("media").write_inner_content(|w| -> XmlResult {
        w.create_element("video").write_inner_content(|w| -> XmlResult {
            w.create_element("format").write_inner_content(|w| -> XmlResult {
                w.create_element("samplecharacteristics")
                    .write_inner_content(|w| -> XmlResult {
                        rate_el(w, &doc.timebase)?;
                        text_el(w, "width", &(SEQUENCE_WIDTH as u32).to_string())?;
                        text_el(w, "height", &(SEQUENCE_HEIGHT as u32).to_string())?;
                        text_el(w, "anamorphic", "FALSE")?;
                        text_el(w, "pixelaspectratio", "square")?;
                        text_el(w, "fielddominance", "none")?;
                        text_el(w, "colordepth", "24")
                    })?;
                Ok(())
            })?;
            for _ in 0..RESERVED_VIDEO_TRACKS {
                w.create_element("track").write_inner_content(|w| -> XmlResult {
                    text_el(w, "enabled", "TRUE")?;
                    text_el(w, "locked", "TRUE")
                })?;
            }
            w.create_element("track").write_inner_content(|w| -> XmlResult {
                text_el(w, "enabled", "TRUE")?;
                text_el(w, "locked", "FALSE")?;
                for clip in &doc.video_clips {
                    write_clipitem(w, clip, &doc.label, &doc.timebase)?;
                }
                Ok(())
            })?;
            Ok(())
        })?;

        w.create_element("audio").write_inner_content(|w| -> XmlResult {
            text_el(w, "numOutputChannels", "2")?;
            w.create_element("format").write_inner_content(|w| -> XmlResult {
                w.create_element("samplecharacteristics")
                    .write_inner_content(|w| -> XmlResult {
                        text_el(w, "depth", "16")?;
                        text_el(w, "samplerate", "48000")
                    })?;
                Ok(())
            })?;
            w.create_element("outputs").write_inner_content(|w| -> XmlResult {
                for group_idx in 1..=2u32 {
                    w.create_element("group").write_inner_content(|w| -> XmlResult {
                        text_el(w, "index", &group_idx.to_string())?;
                        text_el(w, "numchannels", "1")?;
                        text_el(w, "downmix", "0")?;
                        w.create_element("channel").write_inner_content(|w| -> XmlResult {
                            text_el(w, "index", &group_idx.to_string())
                        })?;
                        Ok(())
                    })?;
                }
                Ok(())
            })?;
            for idx in 0..RESERVED_AUDIO_TRACKS {
                w.create_element("track").write_inner_content(|w| -> XmlResult {
                    text_el(w, "enabled", "TRUE")?;
                    text_el(w, "locked", "TRUE")?;
                    text_el(w, "outputchannelindex", &(idx + 1).to_string())
                })?;
            }
            w.create_element("track").write_inner_content(|w| -> XmlResult {
                text_el(w, "enabled", "TRUE")?;
                text_el(w, "locked", "FALSE")?;
                text_el(w, "outputchannelindex", &AUDIO_CLIP_TRACK_INDEX.to_string())?;
                for clip in &doc.audio_clips {
                    write_clipitem(w, clip, &doc.label, &doc.timebase)?;
                }
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    })?;
    Ok(())
}

fn write_clipitem<W: Write>(
    w: &mut Writer<W>,
    clip: &ClipItem,
    label: &str,
    timebase: &str,
) -> XmlResult {
    let el = w.create_element("clipitem").with_attribute(("id", clip.id.as_str()));
    let el = if clip.stereo {
        el.with_attribute(("premiereChannelType", "stereo"))
    } else {
        el
    };
    el.write_inner_content(|w| -> XmlResult {
        text_el(w, "masterclipid", &clip.masterclip_id)?;
        text_el(w, "name", &clip.name)?;
        text_el(w, "enabled", "TRUE")?;
        text_el(w, "duration", &clip.duration_frames.to_string())?;
        rate_el(w, timebase)?;
        text_el(w, "start", &clip.start.to_string())?;
        text_el(w, "end", &clip.end.to_string())?;
        text_el(w, "in", "0")?;
        text_el(w, "out", &clip.duration_frames.to_string())?;
        if let Some(alpha) = clip.alpha {
            text_el(w, "alphatype", alpha.as_str())?;
            text_el(w, "pixelaspectratio", "square")?;
            text_el(w, "anamorphic", "FALSE")?;
        }
        match &clip.file {
            FileSource::Definition(def) => write_file_def(w, def, timebase)?,
            FileSource::Reference(id) => {
                w.create_element("file")
                    .with_attribute(("id", id.as_str()))
                    .write_empty()?;
            }
        }
        if let Some(motion) = &clip.motion {
            write_motion_filter(w, motion)?;
        }
        if clip.audio_source_track {
            w.create_element("sourcetrack").write_inner_content(|w| -> XmlResult {
                text_el(w, "mediatype", "audio")?;
                text_el(w, "trackindex", &AUDIO_CLIP_TRACK_INDEX.to_string())
            })?;
        }
        if let Some(link) = &clip.self_link {
            write_link(w, link)?;
        }
        labels_and_logging(w, label)?;
        if let Some(link) = &clip.cross_link {
            write_link(w, link)?;
        }
        Ok(())
    })?;
    Ok(())
}

fn write_file_def<W: Write>(w: &mut Writer<W>, def: &FileDef, timebase: &str) -> XmlResult {
    w.create_element("file")
        .with_attribute(("id", def.id.as_str()))
        .write_inner_content(|w| -> XmlResult {
            text_el(w, "name", &def.name)?;
            text_el(w, "pathurl", &def.pathurl)?;
            rate_el(w, timebase)?;
            text_el(w, "duration", &def.duration_frames.to_string())?;
            timecode_el(w, timebase)?;
            w.create_element("media").write_inner_content(|w| -> XmlResult {
                if def.include_video {
                    let (width, height) = def.dimensions.unwrap_or((1920, 1080));
                    w.create_element("video").write_inner_content(|w| -> XmlResult {
                        w.create_element("samplecharacteristics")
                            .write_inner_content(|w| -> XmlResult {
                                rate_el(w, timebase)?;
                                text_el(w, "width", &width.to_string())?;
                                text_el(w, "height", &height.to_string())?;
                                text_el(w, "anamorphic", "FALSE")?;
                                text_el(w, "pixelaspectratio", "square")?;
                                text_el(w, "fielddominance", "none")
                            })?;
                        Ok(())
                    })?;
                }
                if def.include_audio {
                    w.create_element("audio").write_inner_content(|w| -> XmlResult {
                        w.create_element("samplecharacteristics")
                            .write_inner_content(|w| -> XmlResult {
                                text_el(w, "depth", "16")?;
                                text_el(w, "samplerate", "48000")
                            })?;
                        text_el(w, "channelcount", "2")
                    })?;
                }
                Ok(())
            })?;
            Ok(())
        })?;
    Ok(())
}

fn write_motion_filter<W: Write>(w: &mut Writer<W>, motion: &MotionFilter) -> XmlResult {
    w.create_element("filter").write_inner_content(|w| -> XmlResult {
        w.create_element("effect").write_inner_content(|w| -> XmlResult {
            text_el(w, "name", "Basic Motion")?;
            text_el(w, "effectid", "basic")?;
            text_el(w, "effectcategory", "motion")?;
            text_el(w, "effecttype", "motion")?;
            text_el(w, "mediatype", "video")?;
            text_el(w, "pproBypass", "false")?;
            scalar_parameter(w, "scale", "Scale", &format_number(motion.scale), Some(("0", "1000")))?;
            scalar_parameter(w, "rotation", "Rotation", "0", Some(("-8640", "8640")))?;
            point_parameter(w, "center", "Center", motion.center)?;
            point_parameter(w, "centerOffset", "Anchor Point", Point::ZERO)?;
            scalar_parameter(w, "antiflicker", "Anti-flicker Filter", "0", Some(("0.0", "1.0")))
        })?;
        Ok(())
    })?;
    Ok(())
}

fn scalar_parameter<W: Write>(
    w: &mut Writer<W>,
    id: &str,
    name: &str,
    value: &str,
    bounds: Option<(&str, &str)>,
) -> XmlResult {
    w.create_element("parameter")
        .with_attribute(("authoringApp", "PremierePro"))
        .write_inner_content(|w| -> XmlResult {
            text_el(w, "parameterid", id)?;
            text_el(w, "name", name)?;
            if let Some((min, max)) = bounds {
                text_el(w, "valuemin", min)?;
                text_el(w, "valuemax", max)?;
            }
            text_el(w, "value", value)
        })?;
    Ok(())
}

fn point_parameter<W: Write>(w: &mut Writer<W>, id: &str, name: &str, value: Point) -> XmlResult {
    w.create_element("parameter")
        .with_attribute(("authoringApp", "PremierePro"))
        .write_inner_content(|w| -> XmlResult {
            text_el(w, "parameterid", id)?;
            text_el(w, "name", name)?;
            w.create_element("value").write_inner_content(|w| -> XmlResult {
                text_el(w, "horiz", &format_number(value.x))?;
                text_el(w, "vert", &format_number(value.y))
            })?;
            Ok(())
        })?;
    Ok(())
}

fn write_link<W: Write>(w: &mut Writer<W>, link: &ClipLink) -> XmlResult {
    w.create_element("link").write_inner_content(|w| -> XmlResult {
        text_el(w, "linkclipref", &link.clipref)?;
        text_el(w, "mediatype", link.media.as_str())?;
        text_el(w, "trackindex", &link.track_index.to_string())?;
        text_el(w, "clipindex", &link.clip_index.to_string())?;
        if let Some(group) = link.group_index {
            text_el(w, "groupindex", &group.to_string())?;
        }
        Ok(())
    })?;
    Ok(())
}

fn write_marker<W: Write>(w: &mut Writer<W>, marker: &SequenceMarker, color: &str) -> XmlResult {
    w.create_element("marker").write_inner_content(|w| -> XmlResult {
        empty_el(w, "comment")?;
        text_el(w, "name", &marker.name)?;
        text_el(w, "in", &marker.frame_in.to_string())?;
        text_el(w, "out", &marker.frame_out.to_string())?;
        text_el(w, "pproColor", color)
    })?;
    Ok(())
}

fn labels_and_logging<W: Write>(w: &mut Writer<W>, label: &str) -> XmlResult {
    w.create_element("labels").write_inner_content(|w| -> XmlResult {
        text_el(w, "label2", label)
    })?;
    w.create_element("logginginfo").write_inner_content(|w| -> XmlResult {
        for tag in [
            "description",
            "scene",
            "shottake",
            "lognote",
            "good",
            "originalvideofilename",
            "originalaudiofilename",
        ] {
            empty_el(w, tag)?;
        }
        Ok(())
    })?;
    Ok(())
}

fn rate_el<W: Write>(w: &mut Writer<W>, timebase: &str) -> XmlResult {
    w.create_element("rate").write_inner_content(|w| -> XmlResult {
        text_el(w, "timebase", timebase)?;
        text_el(w, "ntsc", "FALSE")
    })?;
    Ok(())
}

fn timecode_el<W: Write>(w: &mut Writer<W>, timebase: &str) -> XmlResult {
    w.create_element("timecode").write_inner_content(|w| -> XmlResult {
        rate_el(w, timebase)?;
        text_el(w, "string", "00:00:00:00")?;
        text_el(w, "frame", "0")?;
        text_el(w, "displayformat", "NDF")
    })?;
    Ok(())
}

fn text_el<W: Write>(w: &mut Writer<W>, name: &str, value: &str) -> XmlResult {
    w.create_element(name).write_text_content(BytesText::new(value))?;
    Ok(())
}

fn empty_el<W: Write>(w: &mut Writer<W>, name: &str) -> XmlResult {
    w.create_element(name).write_empty()?;
    Ok(())
}
