use anyhow::{Result, bail};
use std::path::PathBuf;

/// 挑選流程的全部設定，由命令列參數組成
#[derive(Debug, Clone)]
pub struct PickerConfig {
    /// 來源影片
    pub video: PathBuf,
    /// 輸出目錄（圖檔、清單與暫存目錄都放這裡）
    pub output_dir: PathBuf,
    /// 每個區塊切分的片段數
    pub segments: usize,
    /// 每秒取樣畫格數
    pub fps: f64,
    /// 入選畫格之間的最小時間間隔（秒）
    pub min_gap: f64,
    /// 每個區塊最多挑選的張數
    pub topk: usize,
    /// 語意評分的批次大小
    pub batch_size: usize,
    /// 是否啟用 OCR 文字加成
    pub enable_ocr: bool,
    /// OCR 命中時的總分加成倍率
    pub ocr_bonus: f64,
    /// OCR 只掃描畫面底部的高度比例
    pub ocr_roi_height: f64,
    /// 區塊長度（秒）
    pub chunk_duration: f64,
    /// 人臉偵測命令
    pub face_cmd: String,
    /// CLIP 嵌入服務命令
    pub clip_cmd: String,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            video: PathBuf::new(),
            output_dir: PathBuf::from("meme_frames"),
            segments: 10,
            fps: 2.0,
            min_gap: 2.0,
            topk: 5,
            batch_size: 32,
            enable_ocr: false,
            ocr_bonus: 0.25,
            ocr_roi_height: 0.40,
            chunk_duration: 30.0,
            face_cmd: "facedetect".to_string(),
            clip_cmd: "clip-embed".to_string(),
        }
    }
}

impl PickerConfig {
    /// 檢查參數的合理範圍，執行流程前呼叫一次
    pub fn validate(&self) -> Result<()> {
        if self.segments == 0 {
            bail!("片段數必須至少為 1");
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            bail!("取樣率必須為正數");
        }
        if !self.chunk_duration.is_finite() || self.chunk_duration <= 0.0 {
            bail!("區塊長度必須為正數");
        }
        if self.batch_size == 0 {
            bail!("批次大小必須至少為 1");
        }
        if !self.min_gap.is_finite() || self.min_gap < 0.0 {
            bail!("最小時間間隔不可為負數");
        }
        if !self.ocr_bonus.is_finite() || self.ocr_bonus < 0.0 {
            bail!("OCR 加成不可為負數");
        }
        if !self.ocr_roi_height.is_finite()
            || self.ocr_roi_height <= 0.0
            || self.ocr_roi_height > 1.0
        {
            bail!("OCR 掃描區域的高度比例必須落在 (0, 1] 之間");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PickerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_segments() {
        let config = PickerConfig {
            segments: 0,
            ..PickerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_fps() {
        let config = PickerConfig {
            fps: 0.0,
            ..PickerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PickerConfig {
            fps: -1.0,
            ..PickerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_chunk_duration() {
        let config = PickerConfig {
            chunk_duration: 0.0,
            ..PickerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let config = PickerConfig {
            batch_size: 0,
            ..PickerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_min_gap() {
        let config = PickerConfig {
            min_gap: -0.5,
            ..PickerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_roi_height_out_of_range() {
        let config = PickerConfig {
            ocr_roi_height: 0.0,
            ..PickerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PickerConfig {
            ocr_roi_height: 1.5,
            ..PickerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_full_roi_height() {
        let config = PickerConfig {
            ocr_roi_height: 1.0,
            ..PickerConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
