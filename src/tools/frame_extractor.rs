//! 以 ffmpeg 擷取片段視窗內的畫格

use anyhow::{Context, Result, bail};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;
use uuid::Uuid;
use walkdir::WalkDir;

use super::fs_utils::{SEGMENT_TEMP_PREFIX, remove_dir_best_effort};

/// 擷取出的單一畫格
#[derive(Debug, Clone)]
pub struct ExtractedFrame {
    /// 畫格在整部影片中的時間點（秒）
    pub timestamp: f64,
    /// PNG 檔案路徑（位於暫存目錄內）
    pub path: PathBuf,
}

/// 單一視窗的擷取結果
#[derive(Debug)]
pub struct WindowExtraction {
    /// 本視窗專用的暫存目錄，呼叫端負責清理
    pub temp_dir: PathBuf,
    /// 依檔名排序的畫格清單
    pub frames: Vec<ExtractedFrame>,
}

/// 擷取 [t0, t1) 視窗內的畫格
///
/// 在輸出目錄下建立隨機命名的暫存目錄，以固定取樣率輸出 PNG。
/// ffmpeg 失敗時會先刪除暫存目錄再回傳錯誤，呼叫端只需跳過該視窗。
pub fn extract_window_frames(
    video_path: &Path,
    t0: f64,
    t1: f64,
    fps: f64,
    output_dir: &Path,
) -> Result<WindowExtraction> {
    let temp_dir = output_dir.join(format!("{}{}", SEGMENT_TEMP_PREFIX, Uuid::new_v4().simple()));
    std::fs::create_dir_all(&temp_dir)
        .with_context(|| format!("無法建立暫存目錄: {}", temp_dir.display()))?;

    let output_pattern = temp_dir.join("frame_%06d.png");
    let args = vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format!("{t0:.3}"),
        "-to".to_string(),
        format!("{t1:.3}"),
        "-i".to_string(),
        video_path.to_string_lossy().to_string(),
        "-vf".to_string(),
        format!("fps={fps}"),
        "-q:v".to_string(),
        "2".to_string(),
        output_pattern.to_string_lossy().to_string(),
    ];

    debug!("執行畫格擷取: ffmpeg {}", args.join(" "));

    let output = match Command::new("ffmpeg").args(&args).output() {
        Ok(output) => output,
        Err(e) => {
            remove_dir_best_effort(&temp_dir);
            return Err(e).with_context(|| "無法執行 ffmpeg");
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        remove_dir_best_effort(&temp_dir);
        bail!("ffmpeg 擷取失敗 [{t0:.3}s-{t1:.3}s]: {}", stderr.trim());
    }

    let frames = list_extracted_frames(&temp_dir, t0, fps)?;
    Ok(WindowExtraction { temp_dir, frames })
}

/// 列出暫存目錄中的畫格並推算時間點
///
/// 第 i 張畫格（以檔名排序，從 0 起算）的時間點為 t0 + i / fps。
fn list_extracted_frames(temp_dir: &Path, t0: f64, fps: f64) -> Result<Vec<ExtractedFrame>> {
    let frames = WalkDir::new(temp_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("frame_") && name.ends_with(".png"))
        })
        .enumerate()
        .map(|(i, path)| ExtractedFrame {
            timestamp: t0 + i as f64 / fps,
            path,
        })
        .collect();

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_extracted_frames_sorted_with_timestamps() {
        let temp_dir = TempDir::new().unwrap();
        // 故意以亂序建立，驗證依檔名排序
        for name in ["frame_000003.png", "frame_000001.png", "frame_000002.png"] {
            std::fs::write(temp_dir.path().join(name), b"png").unwrap();
        }

        let frames = list_extracted_frames(temp_dir.path(), 10.0, 2.0).unwrap();

        assert_eq!(frames.len(), 3);
        assert!((frames[0].timestamp - 10.0).abs() < 1e-9);
        assert!((frames[1].timestamp - 10.5).abs() < 1e-9);
        assert!((frames[2].timestamp - 11.0).abs() < 1e-9);
        assert!(frames[0].path.ends_with("frame_000001.png"));
        assert!(frames[2].path.ends_with("frame_000003.png"));
    }

    #[test]
    fn test_list_extracted_frames_ignores_other_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("frame_000001.png"), b"png").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(temp_dir.path().join("frame_000002.jpg"), b"x").unwrap();

        let frames = list_extracted_frames(temp_dir.path(), 0.0, 1.0).unwrap();

        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_list_extracted_frames_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let frames = list_extracted_frames(temp_dir.path(), 5.0, 2.0).unwrap();
        assert!(frames.is_empty());
    }
}
