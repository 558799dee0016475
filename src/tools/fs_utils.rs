//! 檔案系統輔助工具

use anyhow::{Result, bail};
use log::{debug, warn};
use std::path::Path;

/// 片段暫存目錄的名稱前綴
pub const SEGMENT_TEMP_PREFIX: &str = "seg_";

pub fn validate_video_file(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("影片不存在: {}", path.display());
    }
    if !path.is_file() {
        bail!("路徑不是檔案: {}", path.display());
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// 盡力刪除目錄，失敗時僅記錄警告
///
/// 暫存目錄清理失敗不應中斷挑選流程。
pub fn remove_dir_best_effort(path: &Path) {
    if !path.exists() {
        return;
    }
    if let Err(e) = std::fs::remove_dir_all(path) {
        warn!("無法刪除暫存目錄 {}: {}", path.display(), e);
    }
}

/// 清掃輸出目錄中殘留的片段暫存目錄
///
/// 前一次執行若被中斷，可能留下 `seg_` 開頭的目錄，
/// 收尾時一併刪除。回傳實際刪除的數量。
pub fn sweep_segment_temp_dirs(output_dir: &Path) -> usize {
    let entries = match std::fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("無法讀取輸出目錄 {}: {}", output_dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let is_temp = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(SEGMENT_TEMP_PREFIX));
        if !is_temp {
            continue;
        }

        debug!("清除殘留暫存目錄: {}", path.display());
        if let Err(e) = std::fs::remove_dir_all(&path) {
            warn!("無法刪除暫存目錄 {}: {}", path.display(), e);
        } else {
            removed += 1;
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_video_file_missing() {
        let result = validate_video_file(Path::new("/nonexistent/video.mp4"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_video_file_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = validate_video_file(temp_dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_ensure_directory_exists_creates_nested() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        ensure_directory_exists(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_remove_dir_best_effort_missing_path_is_noop() {
        remove_dir_best_effort(Path::new("/nonexistent/seg_xyz"));
    }

    #[test]
    fn test_sweep_removes_only_segment_temp_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let leftover = temp_dir.path().join("seg_0123abcd");
        let keep_dir = temp_dir.path().join("frames");
        let keep_file = temp_dir.path().join("seg_not_a_dir.txt");
        std::fs::create_dir(&leftover).unwrap();
        std::fs::create_dir(&keep_dir).unwrap();
        std::fs::write(&keep_file, b"x").unwrap();

        let removed = sweep_segment_temp_dirs(temp_dir.path());

        assert_eq!(removed, 1);
        assert!(!leftover.exists());
        assert!(keep_dir.exists());
        assert!(keep_file.exists());
    }
}
