use crate::error::{GuardError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub path: PathBuf,
    pub file_name: String,
}

/// フォルダ直下のファイルを列挙（拡張子では絞らない。判定はガード側）
pub fn scan_folder(folder: &Path) -> Result<Vec<UploadCandidate>> {
    if !folder.is_dir() {
        return Err(GuardError::FolderNotFound(folder.display().to_string()));
    }

    let mut files: Vec<UploadCandidate> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| UploadCandidate {
            file_name: e.file_name().to_string_lossy().to_string(),
            path: e.into_path(),
        })
        // Office の一時ファイル (~$xxx.xlsx) は対象外
        .filter(|c| !c.file_name.starts_with("~$"))
        .collect();

    // ファイル名でソート
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(GuardError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_sorted_and_flat() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("b_KCP1.xlsx")).unwrap();
        File::create(dir.path().join("a.csv")).unwrap();
        File::create(dir.path().join("~$b_KCP1.xlsx")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        File::create(dir.path().join("nested").join("c_KCP1.xlsx")).unwrap();

        let files = scan_folder(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.csv", "b_KCP1.xlsx"]);
    }
}
