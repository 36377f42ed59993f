use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::BatchError;

/// Image files under `dir` whose extension is in `extensions`, sorted by path.
///
/// Only the top level is scanned unless `recursive` is set.
pub fn discover_images(
    dir: &Path,
    extensions: &[String],
    recursive: bool,
) -> Result<Vec<PathBuf>, BatchError> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name();

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry
            .map_err(|e| BatchError::io(format!("failed to scan {}", dir.display()), e.into()))?;
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::discover_images;

    fn exts() -> Vec<String> {
        vec!["jpg".into(), "jpeg".into(), "png".into()]
    }

    #[test]
    fn filters_by_extension_and_sorts() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in ["b.PNG", "a.jpg", "notes.txt", "c.jpeg", "archive.png.bak"] {
            fs::write(dir.path().join(name), b"x").expect("write");
        }
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        fs::write(dir.path().join("nested/d.png"), b"x").expect("write");

        let flat = discover_images(dir.path(), &exts(), false).expect("scan");
        let names: Vec<_> = flat
            .iter()
            .map(|p| p.file_name().and_then(|n| n.to_str()).unwrap_or_default())
            .collect();
        assert_eq!(names, ["a.jpg", "b.PNG", "c.jpeg"]);

        let deep = discover_images(dir.path(), &exts(), true).expect("scan");
        assert_eq!(deep.len(), 4);
        assert!(deep.iter().any(|p| p.ends_with("nested/d.png")));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = discover_images(&dir.path().join("nope"), &exts(), false);
        assert!(matches!(err, Err(crate::BatchError::Io { .. })));
    }
}
