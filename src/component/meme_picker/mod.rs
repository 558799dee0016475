//! 迷因畫格挑選元件
//!
//! 逐區塊流程：
//! A. 影片時間軸切成固定長度區塊
//! B. 區塊內等分片段視窗並以 ffmpeg 擷取畫格
//! C. 四訊號評分（語意、人臉、清晰度、OCR 加成）
//! D. 每片段取最佳畫格，再做時間軸 NMS
//! E. 輸出圖檔與增量清單

mod chunk_planner;
mod main;
mod manifest;
mod metric_computer;
mod score_fusion;
mod segment_sampler;
mod selection_engine;

pub use chunk_planner::{Chunk, plan_chunks};
pub use main::{ChunkTiming, MemeFramePicker, RunSummary};
pub use manifest::{
    FrameScores, MANIFEST_FILE_NAME, ManifestEntry, manifest_entry, picked_file_name,
    write_manifest,
};
pub use metric_computer::{MetricComputer, REACTION_PROMPTS, SegmentFrame};
pub use score_fusion::{
    CLIP_WEIGHT, CandidateFrame, FACE_WEIGHT, SHARPNESS_WEIGHT, fuse_total, normalize01,
};
pub use segment_sampler::{Segment, split_into_segments};
pub use selection_engine::{best_per_segment, pick_chunk_frames, select_top_frames};
