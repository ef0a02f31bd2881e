use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::Context as _;
use tracing::debug;

use crate::{
    foundation::error::FoldercutResult,
    media::classify::{self, MediaCategory},
};

#[derive(Clone, Debug)]
pub struct ScanConfig {
    /// Name given to the root folder's own group of files.
    pub collection_name: String,
    /// Direct subfolder excluded from the walk.
    pub excluded_folder: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            collection_name: "UTCache".to_string(),
            excluded_folder: "UNSORTED".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MediaItem {
    pub path: PathBuf,
    pub category: MediaCategory,
}

impl MediaItem {
    pub fn from_path(path: PathBuf) -> Self {
        let category = MediaCategory::from_path(&path);
        Self { path, category }
    }
}

/// One run of clips on the timeline: the root folder or a direct subfolder.
/// Item order is placement order.
#[derive(Clone, Debug)]
pub struct MediaGroup {
    pub name: String,
    pub folder: PathBuf,
    pub items: Vec<MediaItem>,
}

/// Media directly inside `root` (no recursion), ordered oldest-modified first.
pub fn collect_root_media(root: &Path) -> FoldercutResult<Vec<MediaItem>> {
    let mut files = Vec::new();
    let entries =
        fs::read_dir(root).with_context(|| format!("read directory '{}'", root.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && classify::is_media_file(&path) {
            files.push(path);
        }
    }
    sort_files(&mut files);
    Ok(files.into_iter().map(MediaItem::from_path).collect())
}

/// Every direct subfolder of `root` except the excluded one, enumerated in name
/// order, each carrying all media found anywhere beneath it. A subfolder with no
/// media still yields an (empty) group, since it still marks the timeline.
pub fn collect_subfolder_groups(
    root: &Path,
    config: &ScanConfig,
) -> FoldercutResult<Vec<MediaGroup>> {
    let mut folders = Vec::new();
    let entries =
        fs::read_dir(root).with_context(|| format!("read directory '{}'", root.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if file_name_string(&path) == config.excluded_folder {
            debug!(folder = %path.display(), "skipping excluded folder");
            continue;
        }
        folders.push(path);
    }
    folders.sort_by_key(|p| file_name_string(p));

    let mut groups = Vec::with_capacity(folders.len());
    for folder in folders {
        let mut files = Vec::new();
        walk_into(&folder, &mut files)?;
        sort_files(&mut files);
        groups.push(MediaGroup {
            name: file_name_string(&folder),
            folder,
            items: files.into_iter().map(MediaItem::from_path).collect(),
        });
    }
    Ok(groups)
}

/// The full group list handed to the timeline builder: the root group first,
/// then subfolder groups, re-sorted so the most recently modified folder plays
/// first. Note the inversion against item order: items run oldest-first within
/// a group, groups run newest-first across the timeline.
pub fn scan_collection(root: &Path, config: &ScanConfig) -> FoldercutResult<Vec<MediaGroup>> {
    let mut groups = vec![MediaGroup {
        name: config.collection_name.clone(),
        folder: root.to_path_buf(),
        items: collect_root_media(root)?,
    }];
    groups.extend(collect_subfolder_groups(root, config)?);
    groups.sort_by_cached_key(|g| std::cmp::Reverse((modified_time(&g.folder), g.name.clone())));
    Ok(groups)
}

pub fn total_items(groups: &[MediaGroup]) -> usize {
    groups.iter().map(|g| g.items.len()).sum()
}

fn walk_into(dir: &Path, out: &mut Vec<PathBuf>) -> FoldercutResult<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("read directory '{}'", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            walk_into(&path, out)?;
        } else if path.is_file() && classify::is_media_file(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn sort_files(files: &mut [PathBuf]) {
    files.sort_by_cached_key(|p| (modified_time(p), file_name_string(p)));
}

fn modified_time(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::{
        fs::File,
        time::{Duration, SystemTime},
    };

    use super::*;

    fn write_file(path: &Path, secs_ago: u64) {
        fs::write(path, b"x").unwrap();
        set_mtime(path, secs_ago);
    }

    fn set_mtime(path: &Path, secs_ago: u64) {
        // Anchor to a fixed base so equal `secs_ago` yields exactly-equal mtimes;
        // using SystemTime::now() per call would make them differ by microseconds.
        let anchor = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let when = anchor - Duration::from_secs(secs_ago);
        File::open(path).unwrap().set_modified(when).unwrap();
    }

    #[test]
    fn root_media_is_filtered_and_ordered_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("new.mp4"), 10);
        write_file(&dir.path().join("old.mp4"), 300);
        write_file(&dir.path().join("notes.txt"), 5);
        write_file(&dir.path().join("index.sqlite"), 5);
        fs::create_dir(dir.path().join("sub")).unwrap();
        write_file(&dir.path().join("sub").join("nested.mp4"), 5);

        let items = collect_root_media(dir.path()).unwrap();
        let names: Vec<_> = items
            .iter()
            .map(|i| i.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["old.mp4", "new.mp4"]);
    }

    #[test]
    fn equal_mtimes_fall_back_to_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("b.wav"), 50);
        write_file(&dir.path().join("a.wav"), 50);

        let items = collect_root_media(dir.path()).unwrap();
        let names: Vec<_> = items
            .iter()
            .map(|i| i.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.wav", "b.wav"]);
    }

    #[test]
    fn subfolders_recurse_and_skip_the_excluded_name() {
        let dir = tempfile::tempdir().unwrap();
        let keep = dir.path().join("keep");
        let skip = dir.path().join("UNSORTED");
        fs::create_dir_all(keep.join("deep")).unwrap();
        fs::create_dir(&skip).unwrap();
        write_file(&keep.join("deep").join("c.png"), 20);
        write_file(&keep.join("b.mp4"), 10);
        write_file(&skip.join("ignored.mp4"), 5);

        let groups = collect_subfolder_groups(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "keep");
        let names: Vec<_> = groups[0]
            .items
            .iter()
            .map(|i| i.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["c.png", "b.mp4"]);
    }

    #[test]
    fn empty_subfolders_still_form_groups() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        let groups = collect_subfolder_groups(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].items.is_empty());
    }

    #[test]
    fn collection_orders_groups_newest_folder_first() {
        let dir = tempfile::tempdir().unwrap();
        let older = dir.path().join("older");
        let newer = dir.path().join("newer");
        fs::create_dir(&older).unwrap();
        fs::create_dir(&newer).unwrap();
        write_file(&older.join("o.mp4"), 500);
        write_file(&newer.join("n.mp4"), 400);
        write_file(&dir.path().join("root.mp4"), 600);
        set_mtime(&older, 300);
        set_mtime(&newer, 100);
        set_mtime(dir.path(), 200);

        let groups = scan_collection(dir.path(), &ScanConfig::default()).unwrap();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["newer", "UTCache", "older"]);
        assert_eq!(total_items(&groups), 3);
    }
}
