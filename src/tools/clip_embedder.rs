//! CLIP 嵌入服務介面
//!
//! 語意訊號需要 CLIP 模型推論，由外部 sidecar 程式負責。
//! 本程式透過標準輸入輸出與 sidecar 交換一次性的 JSON 請求，
//! 餘弦相似度則在本地計算。

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// 單一批次的嵌入結果
#[derive(Debug)]
pub struct EmbeddingBatch {
    pub image_embeddings: Vec<Vec<f32>>,
    pub text_embeddings: Vec<Vec<f32>>,
}

/// CLIP 嵌入介面
pub trait ClipEmbedder {
    /// 一次取得整批影像與全部提示語的嵌入向量
    fn embed(&self, image_paths: &[PathBuf], texts: &[&str]) -> Result<EmbeddingBatch>;
}

#[derive(Serialize)]
struct EmbedRequest {
    images: Vec<String>,
    texts: Vec<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    image_embeddings: Vec<Vec<f32>>,
    text_embeddings: Vec<Vec<f32>>,
}

/// 透過外部 sidecar 程式取得 CLIP 嵌入
///
/// 協定：把 `{"images": [...], "texts": [...]}` 寫入 sidecar 的
/// 標準輸入，從標準輸出讀回
/// `{"image_embeddings": [[...]], "text_embeddings": [[...]]}`。
pub struct SidecarClipEmbedder {
    command: String,
}

impl SidecarClipEmbedder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl ClipEmbedder for SidecarClipEmbedder {
    fn embed(&self, image_paths: &[PathBuf], texts: &[&str]) -> Result<EmbeddingBatch> {
        let request = EmbedRequest {
            images: image_paths
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect(),
            texts: texts.iter().map(|t| (*t).to_string()).collect(),
        };
        let payload = serde_json::to_vec(&request).with_context(|| "無法序列化嵌入請求")?;

        let mut child = Command::new(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("無法啟動嵌入服務: {}", self.command))?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow::anyhow!("無法取得嵌入服務的標準輸入"))?;
            stdin
                .write_all(&payload)
                .with_context(|| "無法寫入嵌入請求")?;
        }

        let output = child
            .wait_with_output()
            .with_context(|| "等待嵌入服務結束時失敗")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("嵌入服務執行失敗: {}", stderr.trim());
        }

        let response: EmbedResponse =
            serde_json::from_slice(&output.stdout).with_context(|| "無法解析嵌入服務輸出")?;

        if response.image_embeddings.len() != image_paths.len() {
            bail!(
                "影像嵌入數量不符: 要求 {} 張，收到 {} 筆",
                image_paths.len(),
                response.image_embeddings.len()
            );
        }
        if response.text_embeddings.len() != texts.len() {
            bail!(
                "文字嵌入數量不符: 要求 {} 筆，收到 {} 筆",
                texts.len(),
                response.text_embeddings.len()
            );
        }

        Ok(EmbeddingBatch {
            image_embeddings: response.image_embeddings,
            text_embeddings: response.text_embeddings,
        })
    }
}

/// 餘弦相似度，任一向量為零向量時回傳 0
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += f64::from(x) * f64::from(y);
        norm_a += f64::from(x) * f64::from(x);
        norm_b += f64::from(y) * f64::from(y);
    }
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// 影像嵌入對所有提示語嵌入的最佳相似度
///
/// 餘弦值從 [-1, 1] 線性轉換到 [0, 1] 後取最大值。
/// 沒有提示語嵌入時回傳 0。
#[must_use]
pub fn best_prompt_similarity(image_embedding: &[f32], text_embeddings: &[Vec<f32>]) -> f64 {
    text_embeddings
        .iter()
        .map(|text_embedding| (cosine_similarity(image_embedding, text_embedding) + 1.0) / 2.0)
        .fold(0.0f64, f64::max)
}
