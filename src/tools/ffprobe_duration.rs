//! 使用 ffprobe 偵測影片長度

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    duration: Option<String>,
}

/// 使用 ffprobe 取得影片總長度（秒）
///
/// 長度無效（缺漏、非正數）時回傳錯誤，呼叫端應視為致命錯誤，
/// 因為後續的區塊切分完全依賴這個值。
pub fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗: {stderr}");
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_duration(&stdout).with_context(|| format!("無法取得影片長度: {}", path.display()))
}

/// 解析 ffprobe 的 JSON 輸出（優先從 format，其次從視訊串流）
fn parse_duration(probe_json: &str) -> Result<f64> {
    let probe: FfprobeOutput =
        serde_json::from_str(probe_json).with_context(|| "無法解析 ffprobe 輸出")?;

    let stream_duration = probe.streams.as_ref().and_then(|streams| {
        streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .and_then(|s| s.duration.as_ref())
    });

    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or(stream_duration)
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| anyhow::anyhow!("輸出中沒有影片長度欄位"))?;

    if !duration.is_finite() || duration <= 0.0 {
        bail!("影片長度無效: {duration}");
    }

    Ok(duration)
}
