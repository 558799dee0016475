//! 命令列介面

use clap::Parser;
use std::path::PathBuf;

use crate::config::PickerConfig;

/// 從影片中挑選適合做成迷因的靜態畫格
#[derive(Parser, Debug)]
#[command(name = "meme_frame_picker", version, about = "從影片中挑選適合做成迷因的靜態畫格")]
pub struct Cli {
    /// 來源影片路徑
    #[arg(long)]
    pub video: PathBuf,

    /// 輸出目錄
    #[arg(long, default_value = "meme_frames")]
    pub outdir: PathBuf,

    /// 每個區塊切分的片段數
    #[arg(long, default_value_t = 10)]
    pub segments: usize,

    /// 每秒取樣畫格數
    #[arg(long, default_value_t = 2.0)]
    pub fps: f64,

    /// 入選畫格之間的最小時間間隔（秒）
    #[arg(long = "min_gap", default_value_t = 2.0)]
    pub min_gap: f64,

    /// 每個區塊最多挑選的張數
    #[arg(long, default_value_t = 5)]
    pub topk: usize,

    /// 語意評分的批次大小
    #[arg(long = "batch_size", default_value_t = 32)]
    pub batch_size: usize,

    /// 啟用字幕 OCR 加成
    #[arg(long = "enable_ocr")]
    pub enable_ocr: bool,

    /// OCR 命中時的總分加成倍率
    #[arg(long = "ocr_bonus", default_value_t = 0.25)]
    pub ocr_bonus: f64,

    /// OCR 只掃描畫面底部的高度比例
    #[arg(long = "ocr_roi_height", default_value_t = 0.40)]
    pub ocr_roi_height: f64,

    /// 區塊長度（秒）
    #[arg(long = "chunk_duration", default_value_t = 30.0)]
    pub chunk_duration: f64,

    /// 人臉偵測命令
    #[arg(long = "face_cmd", default_value = "facedetect")]
    pub face_cmd: String,

    /// CLIP 嵌入服務命令
    #[arg(long = "clip_cmd", default_value = "clip-embed")]
    pub clip_cmd: String,
}

impl Cli {
    #[must_use]
    pub fn into_config(self) -> PickerConfig {
        PickerConfig {
            video: self.video,
            output_dir: self.outdir,
            segments: self.segments,
            fps: self.fps,
            min_gap: self.min_gap,
            topk: self.topk,
            batch_size: self.batch_size,
            enable_ocr: self.enable_ocr,
            ocr_bonus: self.ocr_bonus,
            ocr_roi_height: self.ocr_roi_height,
            chunk_duration: self.chunk_duration,
            face_cmd: self.face_cmd,
            clip_cmd: self.clip_cmd,
        }
    }
}
