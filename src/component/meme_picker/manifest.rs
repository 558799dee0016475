//! 挑選清單的序列化與增量寫出
//!
//! 清單在每個區塊完成後整份重寫，程式中途被終止時，
//! 檔案裡仍是前面所有已完成區塊的完整結果。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::score_fusion::CandidateFrame;

/// 清單檔名（固定位於輸出目錄內）
pub const MANIFEST_FILE_NAME: &str = "meme_frames_manifest.json";

/// 單張入選畫格的四項分數
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameScores {
    pub total: f64,
    pub clip_reaction: f64,
    pub face: f64,
    pub sharpness: f64,
}

/// 清單中的一筆入選紀錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// 全域名次，從 1 起算且只增不減
    pub rank: usize,
    /// 時間點（秒，四捨五入到小數 2 位）
    pub timestamp_sec: f64,
    /// 輸出圖檔路徑
    pub image: String,
    /// 來源區塊編號（從 1 起算）
    pub chunk: usize,
    /// 各項分數（四捨五入到小數 4 位）
    pub scores: FrameScores,
}

/// 入選畫格的輸出檔名
#[must_use]
pub fn picked_file_name(rank: usize, timestamp: f64, total: f64) -> String {
    format!("meme_{rank:02}_t{timestamp:.2}s_score{total:.3}.png")
}

/// 由候選畫格建立清單紀錄
#[must_use]
pub fn manifest_entry(
    candidate: &CandidateFrame,
    rank: usize,
    chunk_index: usize,
    image_path: &Path,
) -> ManifestEntry {
    ManifestEntry {
        rank,
        timestamp_sec: round_to(candidate.timestamp, 2),
        image: image_path.to_string_lossy().to_string(),
        chunk: chunk_index,
        scores: FrameScores {
            total: round_to(candidate.total, 4),
            clip_reaction: round_to(candidate.clip_reaction, 4),
            face: round_to(candidate.face, 4),
            sharpness: round_to(candidate.sharpness, 4),
        },
    }
}

/// 整份重寫清單檔
pub fn write_manifest(path: &Path, entries: &[ManifestEntry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries).with_context(|| "無法序列化挑選清單")?;
    std::fs::write(path, json).with_context(|| format!("無法寫入挑選清單: {}", path.display()))?;
    Ok(())
}

pub(crate) fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}
