mod clip_embedder;
mod face_detector;
mod ffprobe_duration;
mod frame_extractor;
mod fs_utils;
mod image_ops;
mod text_recognizer;

pub use clip_embedder::{
    ClipEmbedder, EmbeddingBatch, SidecarClipEmbedder, best_prompt_similarity, cosine_similarity,
};
pub use face_detector::{CommandFaceDetector, FaceBox, FaceDetector, weighted_face_presence};
pub use ffprobe_duration::probe_duration;
pub use frame_extractor::{ExtractedFrame, WindowExtraction, extract_window_frames};
pub use fs_utils::{
    SEGMENT_TEMP_PREFIX, ensure_directory_exists, remove_dir_best_effort, sweep_segment_temp_dirs,
    validate_video_file,
};
pub use image_ops::{
    adaptive_threshold, binarize, equalize_histogram, invert, laplacian_variance, otsu_level,
};
pub use text_recognizer::{
    NullTextRecognizer, TesseractRecognizer, TextRecognizer, resolve_text_recognizer,
};
