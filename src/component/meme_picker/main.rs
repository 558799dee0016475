use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use super::chunk_planner::{Chunk, plan_chunks};
use super::manifest::{
    MANIFEST_FILE_NAME, ManifestEntry, manifest_entry, picked_file_name, round_to, write_manifest,
};
use super::metric_computer::{MetricComputer, SegmentFrame};
use super::segment_sampler::split_into_segments;
use super::selection_engine::pick_chunk_frames;
use crate::config::PickerConfig;
use crate::tools::{
    ensure_directory_exists, extract_window_frames, probe_duration, remove_dir_best_effort,
    sweep_segment_temp_dirs, validate_video_file,
};

/// 單一區塊的處理耗時
#[derive(Debug, Clone)]
pub struct ChunkTiming {
    pub chunk_index: usize,
    pub elapsed_seconds: f64,
}

/// 執行結果摘要，以 JSON 印到標準輸出供下游程式讀取
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub video: String,
    pub duration_sec: f64,
    pub picked: Vec<ManifestEntry>,
    pub manifest: String,
    pub elapsed_sec: f64,
}

/// 迷因畫格挑選器
///
/// 逐區塊流程：
/// A. 區塊切成等寬片段視窗，逐一以 ffmpeg 擷取畫格
/// B. 對所有畫格計算四訊號分數
/// C. 每片段取最佳，再以時間軸 NMS 挑出前幾名
/// D. 輸出圖檔、重寫清單，最後清理暫存目錄
pub struct MemeFramePicker {
    config: PickerConfig,
    metrics: MetricComputer,
    shutdown_signal: Arc<AtomicBool>,
}

impl MemeFramePicker {
    pub fn new(
        config: PickerConfig,
        metrics: MetricComputer,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            metrics,
            shutdown_signal,
        }
    }

    pub fn run(&self) -> Result<RunSummary> {
        let run_started = Instant::now();

        println!("{}", style("=== 迷因畫格挑選 ===").cyan().bold());

        validate_video_file(&self.config.video)?;
        ensure_directory_exists(&self.config.output_dir)?;

        let duration = probe_duration(&self.config.video)?;
        let chunks = plan_chunks(duration, self.config.chunk_duration);

        println!(
            "{}",
            style(format!(
                "影片長度 {:.2}s，分成 {} 個約 {}s 的區塊處理",
                duration,
                chunks.len(),
                self.config.chunk_duration
            ))
            .green()
        );

        let manifest_path = self.config.output_dir.join(MANIFEST_FILE_NAME);
        let mut manifest_entries: Vec<ManifestEntry> = Vec::new();
        let mut chunk_timings: Vec<ChunkTiming> = Vec::new();
        let mut global_rank: usize = 1;

        for chunk in &chunks {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷訊號，停止處理後續區塊");
                break;
            }

            let chunk_started = Instant::now();
            println!(
                "\n{} [{}/{}] {:.1}s - {:.1}s",
                style("處理區塊").cyan(),
                chunk.index,
                chunks.len(),
                chunk.start_time,
                chunk.end_time
            );

            let (frames, temp_dirs) = self.extract_chunk_frames(chunk);

            if frames.is_empty() {
                warn!("區塊 {} 沒有擷取到任何畫格", chunk.index);
                cleanup_temp_dirs(&temp_dirs);
                chunk_timings.push(ChunkTiming {
                    chunk_index: chunk.index,
                    elapsed_seconds: 0.0,
                });
                continue;
            }

            let candidates = self.metrics.score_chunk(chunk.index, &frames);
            if candidates.is_empty() {
                warn!("區塊 {} 沒有可評分的畫格", chunk.index);
                cleanup_temp_dirs(&temp_dirs);
                chunk_timings.push(ChunkTiming {
                    chunk_index: chunk.index,
                    elapsed_seconds: 0.0,
                });
                continue;
            }

            let picked = pick_chunk_frames(candidates, self.config.min_gap, self.config.topk);

            for candidate in &picked {
                let file_name = picked_file_name(global_rank, candidate.timestamp, candidate.total);
                let dest = self.config.output_dir.join(&file_name);
                if let Err(e) = fs::copy(&candidate.image_path, &dest) {
                    warn!(
                        "無法輸出畫格 {}，跳過: {e}",
                        candidate.image_path.display()
                    );
                    continue;
                }
                manifest_entries.push(manifest_entry(candidate, global_rank, chunk.index, &dest));
                global_rank += 1;
            }

            // 先落盤清單再刪暫存目錄，中斷時清單不會缺這個區塊
            write_manifest(&manifest_path, &manifest_entries)?;
            cleanup_temp_dirs(&temp_dirs);

            let elapsed = chunk_started.elapsed().as_secs_f64();
            println!(
                "{}",
                style(format!("區塊 {} 完成，耗時 {elapsed:.2}s", chunk.index)).green()
            );
            chunk_timings.push(ChunkTiming {
                chunk_index: chunk.index,
                elapsed_seconds: elapsed,
            });
        }

        println!("\n{}", style("清理殘留暫存目錄...").dim());
        let removed = sweep_segment_temp_dirs(&self.config.output_dir);
        if removed > 0 {
            info!("清除了 {removed} 個殘留暫存目錄");
        }

        let elapsed_total = run_started.elapsed().as_secs_f64();
        let summary = RunSummary {
            video: self.config.video.to_string_lossy().to_string(),
            duration_sec: round_to(duration, 2),
            picked: manifest_entries,
            manifest: manifest_path.to_string_lossy().to_string(),
            elapsed_sec: round_to(elapsed_total, 2),
        };

        println!(
            "{}",
            serde_json::to_string_pretty(&summary).with_context(|| "無法序列化執行摘要")?
        );

        info!(
            "挑選完成: 共 {} 張入選，清單位於 {}",
            summary.picked.len(),
            summary.manifest
        );
        print_timing_report(elapsed_total, &chunk_timings);

        Ok(summary)
    }

    /// 擷取區塊內所有片段視窗的畫格
    ///
    /// 個別視窗擷取失敗只跳過該視窗，不影響區塊其餘部分。
    /// 回傳畫格清單與本區塊建立的暫存目錄。
    fn extract_chunk_frames(&self, chunk: &Chunk) -> (Vec<SegmentFrame>, Vec<PathBuf>) {
        let segments = split_into_segments(chunk, self.config.segments);

        let progress_bar = ProgressBar::new(segments.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        progress_bar.set_message(format!("區塊 {} 擷取中...", chunk.index));

        let mut frames = Vec::new();
        let mut temp_dirs = Vec::new();
        for segment in &segments {
            match extract_window_frames(
                &self.config.video,
                segment.start_time,
                segment.end_time,
                self.config.fps,
                &self.config.output_dir,
            ) {
                Ok(extraction) => {
                    temp_dirs.push(extraction.temp_dir);
                    frames.extend(extraction.frames.into_iter().map(|frame| SegmentFrame {
                        timestamp: frame.timestamp,
                        path: frame.path,
                        segment_index: segment.index,
                    }));
                }
                Err(e) => {
                    warn!("區塊 {} 片段 {} 擷取失敗，跳過: {e}", chunk.index, segment.index);
                }
            }
            progress_bar.inc(1);
        }
        progress_bar.finish_with_message("完成");

        (frames, temp_dirs)
    }
}

fn cleanup_temp_dirs(temp_dirs: &[PathBuf]) {
    for dir in temp_dirs {
        remove_dir_best_effort(dir);
    }
}

fn print_timing_report(elapsed_total: f64, chunk_timings: &[ChunkTiming]) {
    println!();
    println!("{}", style(format!("總耗時: {elapsed_total:.2}s")).bold());
    println!("{}", style("各區塊耗時:").bold());
    for timing in chunk_timings {
        println!("  區塊 {}: {:.1}s", timing.chunk_index, timing.elapsed_seconds);
    }
}
