//! 人臉偵測介面與 facedetect 命令列實作

use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;
use std::process::Command;

/// facedetect 以結束碼 2 表示沒有偵測到任何人臉
const NO_FACE_EXIT_CODE: i32 = 2;

/// 偵測到的人臉方框（像素座標）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceBox {
    /// 方框中心點
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }
}

/// 人臉偵測器介面
///
/// 以 trait 抽象是為了讓挑選流程可以在測試中替換假偵測器。
pub trait FaceDetector {
    fn detect(&self, image_path: &Path) -> Result<Vec<FaceBox>>;
}

/// 透過外部 facedetect 命令偵測人臉
///
/// facedetect 對每張人臉輸出一行 `x y w h`。
pub struct CommandFaceDetector {
    command: String,
}

impl CommandFaceDetector {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl FaceDetector for CommandFaceDetector {
    fn detect(&self, image_path: &Path) -> Result<Vec<FaceBox>> {
        let output = Command::new(&self.command)
            .arg(image_path)
            .output()
            .with_context(|| format!("無法執行 {}", self.command))?;

        let no_faces = output.status.code() == Some(NO_FACE_EXIT_CODE);
        if !output.status.success() && !no_faces {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} 執行失敗: {}", self.command, stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_face_boxes(&stdout))
    }
}

/// 解析 facedetect 的輸出
///
/// 無法解析成四個整數的行（警告訊息等雜訊）直接略過。
fn parse_face_boxes(output: &str) -> Vec<FaceBox> {
    let mut boxes = Vec::new();
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }
        let parsed: Option<Vec<u32>> = fields[..4].iter().map(|f| f.parse().ok()).collect();
        match parsed {
            Some(values) => boxes.push(FaceBox {
                x: values[0],
                y: values[1],
                width: values[2],
                height: values[3],
            }),
            None => debug!("略過無法解析的人臉輸出行: {line}"),
        }
    }
    boxes
}

/// 計算畫面的加權人臉占比
///
/// 每張人臉貢獻（面積占比 × 中心權重），中心權重隨人臉中心
/// 偏離畫面中心的正規化距離線性衰減，超過半個畫面即為 0。
/// 沒有人臉時回傳 0。
#[must_use]
pub fn weighted_face_presence(faces: &[FaceBox], frame_width: u32, frame_height: u32) -> f64 {
    if frame_width == 0 || frame_height == 0 {
        return 0.0;
    }
    let frame_w = f64::from(frame_width);
    let frame_h = f64::from(frame_height);
    let frame_area = frame_w * frame_h;

    faces
        .iter()
        .map(|face| {
            let area_ratio = f64::from(face.width) * f64::from(face.height) / frame_area;
            let (fx, fy) = face.center();
            let distance = f64::hypot((fx - frame_w / 2.0) / frame_w, (fy - frame_h / 2.0) / frame_h);
            let center_weight = 1.0 - (2.0 * distance).min(1.0);
            area_ratio * center_weight
        })
        .sum()
}
