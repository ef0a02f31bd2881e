//! End-to-end export: resolve the collection root, recover label and marker
//! color, scan, build, and only then write the document to disk.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::info;

use crate::{
    foundation::error::{FoldercutError, FoldercutResult},
    media::probe::MediaProber,
    motion::policy::MotionPolicy,
    reference,
    scan::walker::{self, ScanConfig},
    timeline::builder::{BuildConfig, TimelineBuilder},
    xmeml::writer::serialize_document,
};

#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    pub scan: ScanConfig,
    pub build: BuildConfig,
    pub policy: MotionPolicy,
    /// Skip reference-document detection and use this label.
    pub label_override: Option<String>,
    /// Skip reference-document detection and use this marker color.
    pub marker_color_override: Option<String>,
}

/// Export one collection to `<root>/<root-basename>_<DDMMYY>.xml` and return
/// the written path. Fails before any output exists when the root is not a
/// directory or the collection holds no media at all.
#[tracing::instrument(skip_all, fields(root = %root.display()))]
pub fn export_collection(root: &Path, options: &ExportOptions) -> FoldercutResult<PathBuf> {
    if !root.is_dir() {
        return Err(FoldercutError::config(format!(
            "not a folder: {}",
            root.display()
        )));
    }
    let root = std::fs::canonicalize(root)
        .with_context(|| format!("resolve root '{}'", root.display()))?;

    let mut build = options.build.clone();
    build.label = options
        .label_override
        .clone()
        .unwrap_or_else(|| reference::detect_label(&root, &build.label));
    build.marker_color = options
        .marker_color_override
        .clone()
        .unwrap_or_else(|| reference::detect_marker_color(&root, &build.marker_color));
    info!(label = %build.label, marker_color = %build.marker_color, "resolved clip label and marker color");

    let groups = walker::scan_collection(&root, &options.scan)?;
    let total = walker::total_items(&groups);
    if total == 0 {
        return Err(FoldercutError::scan(format!(
            "no media files found under '{}' (root or subfolders)",
            root.display()
        )));
    }
    info!(groups = groups.len(), files = total, "collection scanned");

    let sequence_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sequence".to_string());

    let mut prober = MediaProber::new();
    let doc = TimelineBuilder::new(&build, &options.policy, &mut prober)
        .build(&sequence_name, &groups)?;
    let bytes = serialize_document(&doc)?;

    let out_path = output_path(&root, &sequence_name);
    std::fs::write(&out_path, bytes)
        .with_context(|| format!("write timeline '{}'", out_path.display()))?;
    info!(path = %out_path.display(), frames = doc.duration_frames, "timeline written");
    Ok(out_path)
}

fn output_path(root: &Path, base: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%d%m%y");
    root.join(format!("{base}_{stamp}.xml"))
}
