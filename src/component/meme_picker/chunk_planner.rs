//! 時間軸區塊切分
//!
//! 長影片切成固定長度的連續區塊逐一處理，
//! 每處理完一個區塊就輸出一次結果，中斷時已完成的部分不會遺失。

/// 單一處理區塊（編號從 1 起算）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunk {
    pub index: usize,
    pub start_time: f64,
    pub end_time: f64,
}

impl Chunk {
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// 將影片時間軸切成固定長度的連續區塊
///
/// 區塊數為 ceil(duration / chunk_duration)，前面的區塊皆為完整長度，
/// 最後一塊涵蓋到影片結尾，可能比較短。
#[must_use]
pub fn plan_chunks(duration: f64, chunk_duration: f64) -> Vec<Chunk> {
    let count = ((duration / chunk_duration).ceil() as usize).max(1);

    (1..=count)
        .map(|index| {
            let start_time = (index - 1) as f64 * chunk_duration;
            let end_time = (start_time + chunk_duration).min(duration);
            Chunk {
                index,
                start_time,
                end_time,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_chunks_with_partial_tail() {
        // 65 秒影片、30 秒區塊：前兩塊完整，尾塊只有 5 秒
        let chunks = plan_chunks(65.0, 30.0);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].index, 1);
        assert!((chunks[0].start_time - 0.0).abs() < 1e-9);
        assert!((chunks[0].end_time - 30.0).abs() < 1e-9);
        assert!((chunks[1].start_time - 30.0).abs() < 1e-9);
        assert!((chunks[1].end_time - 60.0).abs() < 1e-9);
        assert!((chunks[2].start_time - 60.0).abs() < 1e-9);
        assert!((chunks[2].end_time - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_chunks_exact_multiple_has_no_empty_tail() {
        let chunks = plan_chunks(60.0, 30.0);

        assert_eq!(chunks.len(), 2);
        assert!((chunks[1].end_time - 60.0).abs() < 1e-9);
        assert!(chunks[1].duration() > 0.0);
    }

    #[test]
    fn test_plan_chunks_short_video_single_chunk() {
        let chunks = plan_chunks(7.5, 30.0);

        assert_eq!(chunks.len(), 1);
        assert!((chunks[0].end_time - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_plan_chunks_are_contiguous_and_cover_duration() {
        let chunks = plan_chunks(100.0, 30.0);

        for pair in chunks.windows(2) {
            assert!((pair[0].end_time - pair[1].start_time).abs() < 1e-9);
        }
        assert!((chunks.last().unwrap().end_time - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_chunks_indices_start_at_one() {
        let chunks = plan_chunks(90.0, 30.0);
        let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }
}
