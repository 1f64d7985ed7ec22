use super::identifier::IMAGE_EXTENSIONS;
use super::LoadedList;
use crate::error::{ReconcileError, Result};
use std::path::Path;
use walkdir::WalkDir;

/// 画像フォルダ直下のファイル名（拡張子なし）を画像IDとして集める
pub fn scan_image_folder(folder: &Path) -> Result<LoadedList> {
    if !folder.is_dir() {
        return Err(ReconcileError::MissingFile(folder.display().to_string()));
    }

    let mut names = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1) // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || !is_image_extension(path) {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        names.push((file_name, stem));
    }

    // ファイル名でソート
    names.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(LoadedList {
        values: names.into_iter().map(|(_, stem)| stem).collect(),
        skipped: Vec::new(),
    })
}

fn is_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension(Path::new("a.jpg")));
        assert!(is_image_extension(Path::new("a.JPG")));
        assert!(is_image_extension(Path::new("a.webp")));
        assert!(!is_image_extension(Path::new("a.txt")));
        assert!(!is_image_extension(Path::new("a")));
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_image_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(ReconcileError::MissingFile(_))));
    }

    #[test]
    fn test_scan_folder_with_images() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("c-3.png")).unwrap();
        File::create(dir.path().join("AB-12.jpg")).unwrap();
        File::create(dir.path().join("83102-19.JPEG")).unwrap();
        File::create(dir.path().join("readme.txt")).unwrap();
        fs::create_dir(dir.path().join("sub.jpg")).unwrap();

        let result = scan_image_folder(dir.path()).unwrap();
        assert_eq!(result.values, vec!["83102-19", "AB-12", "c-3"]);
    }
}
