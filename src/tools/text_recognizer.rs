//! 文字辨識介面與 tesseract 實作
//!
//! OCR 加成是可選功能。啟用時先探測一次 tesseract 是否可用，
//! 不可用就降級成什麼都不辨識的空實作，流程其餘部分不受影響。

use anyhow::{Context, Result, bail};
use image::{GrayImage, ImageFormat};
use log::{debug, info, warn};
use std::io::{Cursor, Write};
use std::process::{Command, Stdio};

const TESSERACT_COMMAND: &str = "tesseract";

/// 文字辨識介面
pub trait TextRecognizer {
    /// 是否實際執行辨識（停用或降級時為 false）
    fn is_active(&self) -> bool;

    /// 辨識灰階影像中的文字，回傳原始輸出（未修剪）
    fn recognize(&self, image: &GrayImage) -> Result<String>;
}

/// 透過 tesseract 命令辨識文字
///
/// 影像以 PNG 編碼後從標準輸入送入，
/// 使用 `--psm 6`（假設單一文字區塊）與 `--oem 3`（預設引擎）。
pub struct TesseractRecognizer {
    command: String,
}

impl TesseractRecognizer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn is_active(&self) -> bool {
        true
    }

    fn recognize(&self, image: &GrayImage) -> Result<String> {
        let mut png_bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut png_bytes, ImageFormat::Png)
            .with_context(|| "無法編碼 OCR 影像")?;

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "--psm", "6", "--oem", "3"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("無法啟動 {}", self.command))?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow::anyhow!("無法取得 {} 的標準輸入", self.command))?;
            stdin
                .write_all(png_bytes.get_ref())
                .with_context(|| "無法寫入 OCR 影像")?;
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("等待 {} 結束時失敗", self.command))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} 辨識失敗: {}", self.command, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// 停用 OCR 時的空實作
pub struct NullTextRecognizer;

impl TextRecognizer for NullTextRecognizer {
    fn is_active(&self) -> bool {
        false
    }

    fn recognize(&self, _image: &GrayImage) -> Result<String> {
        Ok(String::new())
    }
}

/// 探測 tesseract 是否可執行
fn probe_tesseract(command: &str) -> bool {
    Command::new(command)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// 依設定與環境決定使用哪個文字辨識器
pub fn resolve_text_recognizer(enable_ocr: bool) -> Box<dyn TextRecognizer> {
    if !enable_ocr {
        debug!("未啟用 OCR 文字加成");
        return Box::new(NullTextRecognizer);
    }

    if !probe_tesseract(TESSERACT_COMMAND) {
        warn!("找不到可用的 tesseract，停用 OCR 文字加成");
        return Box::new(NullTextRecognizer);
    }

    info!("OCR 文字加成已啟用 (tesseract)");
    Box::new(TesseractRecognizer::new(TESSERACT_COMMAND))
}
