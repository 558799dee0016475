//! 區塊內的片段視窗切分

use super::chunk_planner::Chunk;

/// 區塊內的單一片段視窗（區塊內編號從 0 起算）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub start_time: f64,
    pub end_time: f64,
}

/// 將區塊等分成指定數量的片段視窗
///
/// 每個視窗的結尾都夾在區塊結尾以內，避免浮點累加超出範圍。
/// 每個片段最後只會貢獻一張最佳畫格，確保入選結果在時間上分散。
#[must_use]
pub fn split_into_segments(chunk: &Chunk, count: usize) -> Vec<Segment> {
    let segment_length = chunk.duration() / count as f64;

    (0..count)
        .map(|index| {
            let start_time = chunk.start_time + index as f64 * segment_length;
            let end_time = (start_time + segment_length).min(chunk.end_time);
            Segment {
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

    fn chunk(index: usize, start_time: f64, end_time: f64) -> Chunk {
        Chunk {
            index,
            start_time,
            end_time,
        }
    }

    #[test]
    fn test_split_full_chunk_into_equal_windows() {
        // 30 秒區塊分 10 份，每份 3 秒
        let segments = split_into_segments(&chunk(1, 0.0, 30.0), 10);

        assert_eq!(segments.len(), 10);
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.index, i);
            assert!((segment.end_time - segment.start_time - 3.0).abs() < 1e-9);
        }
        assert!((segments[9].end_time - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_partial_tail_chunk() {
        // 5 秒的尾區塊分 10 份，每份 0.5 秒
        let segments = split_into_segments(&chunk(3, 60.0, 65.0), 10);

        assert_eq!(segments.len(), 10);
        assert!((segments[0].start_time - 60.0).abs() < 1e-9);
        assert!((segments[0].end_time - 60.5).abs() < 1e-9);
        assert!((segments[9].end_time - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_windows_are_contiguous() {
        let segments = split_into_segments(&chunk(2, 30.0, 60.0), 7);

        for pair in segments.windows(2) {
            assert!((pair[0].end_time - pair[1].start_time).abs() < 1e-9);
        }
    }

    #[test]
    fn test_split_single_segment_covers_chunk() {
        let segments = split_into_segments(&chunk(1, 10.0, 40.0), 1);

        assert_eq!(segments.len(), 1);
        assert!((segments[0].start_time - 10.0).abs() < 1e-9);
        assert!((segments[0].end_time - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_never_exceeds_chunk_end() {
        let segments = split_into_segments(&chunk(1, 0.0, 10.0), 3);
        for segment in &segments {
            assert!(segment.end_time <= 10.0 + 1e-9);
        }
    }
}
