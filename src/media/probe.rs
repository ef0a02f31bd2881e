use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process::Command,
};

use tracing::debug;

use crate::media::classify::MediaCategory;

/// Resolved pixel dimensions keyed by path, scoped to one builder run.
#[derive(Debug, Default)]
pub struct DimensionCache {
    entries: HashMap<PathBuf, (u32, u32)>,
}

impl DimensionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<(u32, u32)> {
        self.entries.get(path).copied()
    }

    pub fn insert(&mut self, path: &Path, dims: (u32, u32)) {
        self.entries.insert(path.to_path_buf(), dims);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Blocking metadata resolution through the system `ffprobe` binary.
///
/// Every probe is attempted exactly once; any failure degrades to the caller's
/// fallback value instead of surfacing an error.
#[derive(Debug, Default)]
pub struct MediaProber {
    cache: DimensionCache,
}

impl MediaProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Container duration in seconds, or `fallback` when the probe fails in any
    /// way (tool missing, non-zero exit, empty or unparsable output, value <= 0).
    pub fn duration_secs(&self, path: &Path, fallback: f64) -> f64 {
        match probe_duration(path) {
            Some(secs) => secs,
            None => {
                debug!(path = %path.display(), fallback, "duration probe failed, using fallback");
                fallback
            }
        }
    }

    /// Pixel dimensions of the first video stream, falling back to decoding the
    /// image header for stills. Successful results are cached for the lifetime
    /// of this prober.
    pub fn dimensions(&mut self, path: &Path, category: MediaCategory) -> Option<(u32, u32)> {
        if let Some(dims) = self.cache.get(path) {
            return Some(dims);
        }
        let mut dims = probe_dimensions(path);
        if dims.is_none() && category == MediaCategory::Image {
            dims = decode_image_dimensions(path);
        }
        match dims {
            Some(d) => self.cache.insert(path, d),
            None => debug!(path = %path.display(), "no dimensions resolvable"),
        }
        dims
    }

    pub fn cache(&self) -> &DimensionCache {
        &self.cache
    }
}

fn probe_duration(path: &Path) -> Option<f64> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&out.stdout);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let secs = trimmed.parse::<f64>().ok()?;
    (secs > 0.0).then_some(secs)
}

fn probe_dimensions(path: &Path) -> Option<(u32, u32)> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .ok()?;
    if !out.status.success() || out.stdout.is_empty() {
        return None;
    }
    let parsed: ProbeOut = serde_json::from_slice(&out.stdout).ok()?;
    let stream = parsed.streams.first()?;
    Some((stream.width?, stream.height?))
}

fn decode_image_dimensions(path: &Path) -> Option<(u32, u32)> {
    match image::image_dimensions(path) {
        Ok(dims) => Some(dims),
        Err(err) => {
            debug!(path = %path.display(), %err, "image dimension decode failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn duration_falls_back_on_missing_file() {
        let prober = MediaProber::new();
        let secs = prober.duration_secs(Path::new("definitely/not/here.mp4"), 10.0);
        assert_eq!(secs, 10.0);
    }

    #[test]
    fn image_dimensions_resolve_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");

        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([9, 9, 9, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        std::fs::write(&path, buf).unwrap();

        let mut prober = MediaProber::new();
        assert_eq!(prober.dimensions(&path, MediaCategory::Image), Some((3, 2)));
        assert_eq!(prober.cache().len(), 1);

        // Second resolve is served from the cache.
        assert_eq!(prober.dimensions(&path, MediaCategory::Image), Some((3, 2)));
        assert_eq!(prober.cache().len(), 1);
    }

    #[test]
    fn unresolvable_dimensions_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.png");
        std::fs::write(&path, b"not an image").unwrap();

        let mut prober = MediaProber::new();
        assert_eq!(prober.dimensions(&path, MediaCategory::Image), None);
        assert!(prober.cache().is_empty());
    }
}
