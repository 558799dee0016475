//! 候選畫格的四訊號評分
//!
//! 單張畫格的評分來源：
//! - 清晰度：拉普拉斯變異數（本地計算）
//! - 人臉：外部偵測命令的方框，加權後正規化
//! - 語意：CLIP 嵌入對反應提示語的最佳相似度
//! - OCR 加成：底部字幕區域辨識出足夠長的文字時套用

use console::style;
use image::{GrayImage, imageops};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, warn};
use std::path::{Path, PathBuf};

use super::score_fusion::{CandidateFrame, fuse_total, normalize01};
use crate::config::PickerConfig;
use crate::tools::{
    ClipEmbedder, FaceDetector, TextRecognizer, adaptive_threshold, best_prompt_similarity,
    binarize, equalize_histogram, invert, laplacian_variance, otsu_level, weighted_face_presence,
};

/// 清晰度校準下限（拉普拉斯變異數）
const SHARPNESS_LO: f64 = 50.0;
/// 清晰度校準上限
const SHARPNESS_HI: f64 = 500.0;
/// 加權人臉占比的正規化上限
const FACE_PRESENCE_HI: f64 = 0.2;
/// OCR 文字需超過這個字元數才算命中
const OCR_MIN_TEXT_CHARS: usize = 3;
/// 自適應二值化的視窗邊長
const OCR_ADAPTIVE_BLOCK: u32 = 11;
/// 自適應二值化的門檻偏移
const OCR_ADAPTIVE_C: f64 = 2.0;

/// CLIP 反應提示語
///
/// 每張畫格的語意分數取其與所有提示語相似度的最大值，
/// 只要命中任何一種反應表情就能得到高分。
pub const REACTION_PROMPTS: [&str; 30] = [
    "reaction face, shocked expression, wide eyes",
    "deadpan stare, unimpressed reaction",
    "facepalm reaction, cringe moment",
    "laughing reaction, mouth open, joyful",
    "confused reaction, tilted head, squinting",
    "smirk reaction, sarcastic smile",
    "excited reaction, celebratory gesture",
    "disappointed reaction, sighing look",
    "pointing at screen reaction",
    "sarcastic eyebrow raise, skeptical reaction",
    "cringe wince, awkward reaction",
    "jaw drop, surprised gasp reaction",
    "internal screaming, silent panic reaction",
    "plotting evil grin, mischievous reaction",
    "victory fist pump, triumphant reaction",
    "slow blink disbelief reaction",
    "utter disbelief, hands on head reaction",
    "proud nod, approving reaction",
    "disgusted reaction, scrunched nose",
    "side eye reaction, judging look",
    "mind blown reaction, exploding brain concept",
    "dawning realization, sudden understanding reaction",
    "suppressed laugh, trying not to laugh reaction",
    "overjoyed reaction, ecstatic expression",
    "camera stare reaction, breaking the fourth wall",
    "smug satisfaction reaction",
    "dramatic gasp, theatrical reaction",
    "eye roll reaction, annoyed expression",
    "double take reaction, shocked second look",
    "nervous smile, uncomfortable reaction",
];

/// 待評分的畫格（已標注所屬片段）
#[derive(Debug, Clone)]
pub struct SegmentFrame {
    pub timestamp: f64,
    pub path: PathBuf,
    pub segment_index: usize,
}

/// 第一遍評分的中間結果
struct ScoredParts {
    frame: SegmentFrame,
    sharpness: f64,
    face: f64,
    ocr_bonus_applied: bool,
}

/// 指標計算器
///
/// 人臉、語意與文字辨識皆透過介面注入，測試時可以替換。
pub struct MetricComputer {
    config: PickerConfig,
    face_detector: Box<dyn FaceDetector>,
    clip_embedder: Box<dyn ClipEmbedder>,
    text_recognizer: Box<dyn TextRecognizer>,
}

impl MetricComputer {
    pub fn new(
        config: PickerConfig,
        face_detector: Box<dyn FaceDetector>,
        clip_embedder: Box<dyn ClipEmbedder>,
        text_recognizer: Box<dyn TextRecognizer>,
    ) -> Self {
        Self {
            config,
            face_detector,
            clip_embedder,
            text_recognizer,
        }
    }

    /// 評分整個區塊的畫格
    ///
    /// 兩遍處理：第一遍逐張讀圖計算清晰度、人臉與 OCR 命中，
    /// 第二遍以批次取得語意分數後融合。讀不進來的畫格直接略過。
    pub fn score_chunk(&self, chunk_index: usize, frames: &[SegmentFrame]) -> Vec<CandidateFrame> {
        if frames.is_empty() {
            return Vec::new();
        }

        let progress_bar = ProgressBar::new(frames.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        progress_bar.set_message(format!("區塊 {chunk_index} 指標計算中..."));

        let mut parts: Vec<ScoredParts> = Vec::with_capacity(frames.len());
        for frame in frames {
            let image = match image::open(&frame.path) {
                Ok(image) => image,
                Err(e) => {
                    debug!("無法讀取畫格 {}，略過: {e}", frame.path.display());
                    progress_bar.inc(1);
                    continue;
                }
            };
            let luma = image.to_luma8();
            let (width, height) = luma.dimensions();

            let sharpness = normalize01(laplacian_variance(&luma), SHARPNESS_LO, SHARPNESS_HI);
            let face = self.face_score(&frame.path, width, height);
            let ocr_bonus_applied = self.text_recognizer.is_active() && self.caption_hit(&luma);

            parts.push(ScoredParts {
                frame: frame.clone(),
                sharpness,
                face,
                ocr_bonus_applied,
            });
            progress_bar.inc(1);
        }
        progress_bar.finish_with_message("完成");

        if parts.is_empty() {
            return Vec::new();
        }

        println!(
            "{}",
            style(format!("對 {} 張畫格執行語意評分...", parts.len())).dim()
        );
        let paths: Vec<PathBuf> = parts.iter().map(|p| p.frame.path.clone()).collect();
        let clip_scores = self.clip_scores(chunk_index, &paths);

        parts
            .into_iter()
            .zip(clip_scores)
            .map(|(part, clip_reaction)| {
                let bonus = if part.ocr_bonus_applied {
                    self.config.ocr_bonus
                } else {
                    0.0
                };
                CandidateFrame {
                    timestamp: part.frame.timestamp,
                    image_path: part.frame.path,
                    segment_index: part.frame.segment_index,
                    clip_reaction,
                    face: part.face,
                    sharpness: part.sharpness,
                    ocr_bonus_applied: part.ocr_bonus_applied,
                    total: fuse_total(clip_reaction, part.face, part.sharpness, bonus),
                }
            })
            .collect()
    }

    /// 人臉分數，偵測失敗時以 0 計並保留畫格
    fn face_score(&self, path: &Path, width: u32, height: u32) -> f64 {
        match self.face_detector.detect(path) {
            Ok(faces) => normalize01(
                weighted_face_presence(&faces, width, height),
                0.0,
                FACE_PRESENCE_HI,
            ),
            Err(e) => {
                warn!("人臉偵測失敗 {}，人臉分數以 0 計: {e}", path.display());
                0.0
            }
        }
    }

    /// 依批次取得整個區塊的語意分數
    ///
    /// 任一批次失敗時整個區塊的語意分數歸零，讓各區塊結果互相獨立。
    fn clip_scores(&self, chunk_index: usize, paths: &[PathBuf]) -> Vec<f64> {
        let mut scores = Vec::with_capacity(paths.len());
        for batch in paths.chunks(self.config.batch_size) {
            match self.clip_embedder.embed(batch, &REACTION_PROMPTS) {
                Ok(batch_result) => {
                    for image_embedding in &batch_result.image_embeddings {
                        scores.push(best_prompt_similarity(
                            image_embedding,
                            &batch_result.text_embeddings,
                        ));
                    }
                }
                Err(e) => {
                    error!("區塊 {chunk_index} 語意嵌入失敗，區塊內所有畫格的語意分數歸零: {e}");
                    return vec![0.0; paths.len()];
                }
            }
        }
        scores
    }

    /// 底部字幕區域是否辨識出足夠長的文字
    fn caption_hit(&self, luma: &GrayImage) -> bool {
        let text = self.read_caption_text(luma);
        text.chars().count() > OCR_MIN_TEXT_CHARS
    }

    /// 擷取畫面底部字幕區域，以三種二值化版本辨識後取最長結果
    fn read_caption_text(&self, luma: &GrayImage) -> String {
        let (width, height) = luma.dimensions();
        let roi_height = ((f64::from(height) * self.config.ocr_roi_height) as u32).max(1);
        let crop = imageops::crop_imm(luma, 0, height - roi_height, width, roi_height).to_image();

        let equalized = equalize_histogram(&crop);
        let adaptive = adaptive_threshold(&equalized, OCR_ADAPTIVE_BLOCK, OCR_ADAPTIVE_C);
        let inverted = invert(&adaptive);
        let otsu = binarize(&crop, otsu_level(&crop));

        let mut best = String::new();
        let mut best_chars = 0usize;
        for variant in [&adaptive, &inverted, &otsu] {
            let text = match self.text_recognizer.recognize(variant) {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    warn!("OCR 辨識失敗: {e}");
                    String::new()
                }
            };
            let text_chars = text.chars().count();
            // 長度相同時保留先辨識出的版本
            if text_chars > best_chars {
                best = text;
                best_chars = text_chars;
            }
        }
        best.to_lowercase()
    }
}
