//! 最佳畫格挑選
//!
//! 兩階段：先取每個片段的最高分畫格，再以貪婪的時間軸
//! 非極大值抑制（NMS）壓掉彼此太接近的入選者。

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::score_fusion::CandidateFrame;

/// 取每個片段的最高分畫格
///
/// 同分時保留先出現的畫格，結果依片段編號遞增排列。
#[must_use]
pub fn best_per_segment(candidates: Vec<CandidateFrame>) -> Vec<CandidateFrame> {
    let mut best: BTreeMap<usize, CandidateFrame> = BTreeMap::new();
    for candidate in candidates {
        match best.get(&candidate.segment_index) {
            Some(current) if candidate.total <= current.total => {}
            _ => {
                best.insert(candidate.segment_index, candidate);
            }
        }
    }
    best.into_values().collect()
}

/// 依總分由高到低做貪婪時間軸 NMS
///
/// 依序考慮每張畫格，只要與所有已入選者的時間距離都達到
/// min_gap（含等於）就收下，收滿 top_k 張為止。
/// 排序為穩定排序，同分時維持輸入順序。
#[must_use]
pub fn select_top_frames(
    mut candidates: Vec<CandidateFrame>,
    min_gap: f64,
    top_k: usize,
) -> Vec<CandidateFrame> {
    candidates.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));

    let mut kept: Vec<CandidateFrame> = Vec::new();
    for candidate in candidates {
        if kept.len() >= top_k {
            break;
        }
        let far_enough = kept
            .iter()
            .all(|picked| (candidate.timestamp - picked.timestamp).abs() >= min_gap);
        if far_enough {
            kept.push(candidate);
        }
    }
    kept
}

/// 對單一區塊的全部候選畫格執行完整挑選
#[must_use]
pub fn pick_chunk_frames(
    candidates: Vec<CandidateFrame>,
    min_gap: f64,
    top_k: usize,
) -> Vec<CandidateFrame> {
    select_top_frames(best_per_segment(candidates), min_gap, top_k)
}
