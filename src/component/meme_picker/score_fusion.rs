//! 分數正規化與融合
//!
//! 四個訊號的融合公式：
//! total = (0.55 × 語意 + 0.30 × 人臉 + 0.15 × 清晰度) × (1 + OCR 加成)

use std::path::PathBuf;

/// 語意（CLIP 反應）分數的權重
pub const CLIP_WEIGHT: f64 = 0.55;
/// 人臉分數的權重
pub const FACE_WEIGHT: f64 = 0.30;
/// 清晰度分數的權重
pub const SHARPNESS_WEIGHT: f64 = 0.15;

/// 完成評分的候選畫格
#[derive(Debug, Clone)]
pub struct CandidateFrame {
    /// 在整部影片中的時間點（秒）
    pub timestamp: f64,
    /// 暫存目錄中的來源 PNG 路徑
    pub image_path: PathBuf,
    /// 所屬片段在區塊內的編號
    pub segment_index: usize,
    pub clip_reaction: f64,
    pub face: f64,
    pub sharpness: f64,
    pub ocr_bonus_applied: bool,
    /// 融合後的總分
    pub total: f64,
}

/// 線性正規化到 [0, 1]
///
/// hi <= lo 或輸入非有限值時回傳 0，確保總分永遠是有限值。
#[must_use]
pub fn normalize01(value: f64, lo: f64, hi: f64) -> f64 {
    if hi <= lo || !value.is_finite() {
        return 0.0;
    }
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// 融合三個基礎分數並套用 OCR 加成
///
/// `ocr_bonus` 是實際套用的加成值，未命中時傳 0。
#[must_use]
pub fn fuse_total(clip_reaction: f64, face: f64, sharpness: f64, ocr_bonus: f64) -> f64 {
    let base = CLIP_WEIGHT * clip_reaction + FACE_WEIGHT * face + SHARPNESS_WEIGHT * sharpness;
    base * (1.0 + ocr_bonus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize01_clamps_to_unit_range() {
        assert!((normalize01(275.0, 50.0, 500.0) - 0.5).abs() < 1e-9);
        assert!((normalize01(10.0, 50.0, 500.0) - 0.0).abs() < f64::EPSILON);
        assert!((normalize01(9999.0, 50.0, 500.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize01_degenerate_range_is_zero() {
        assert!(normalize01(0.5, 1.0, 1.0).abs() < f64::EPSILON);
        assert!(normalize01(0.5, 2.0, 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize01_non_finite_input_is_zero() {
        assert!(normalize01(f64::NAN, 0.0, 1.0).abs() < f64::EPSILON);
        assert!(normalize01(f64::INFINITY, 0.0, 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fuse_total_without_bonus() {
        // 0.55*0.8 + 0.30*0.5 + 0.15*0.2 = 0.61
        let total = fuse_total(0.8, 0.5, 0.2, 0.0);
        assert!((total - 0.61).abs() < 1e-9);
    }

    #[test]
    fn test_fuse_total_with_ocr_bonus() {
        // 0.61 * 1.25 = 0.7625
        let total = fuse_total(0.8, 0.5, 0.2, 0.25);
        assert!((total - 0.7625).abs() < 1e-9);
    }

    #[test]
    fn test_fuse_total_stays_within_bound() {
        let total = fuse_total(1.0, 1.0, 1.0, 0.25);
        assert!(total <= 1.25 + 1e-9);
        assert!(total.is_finite());
    }
}
