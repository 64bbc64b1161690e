// Audio module
//
// decode.rs: ffmpeg-based decoding of uploads to the 16 kHz mono f32
// format both model backends expect

pub mod decode;

pub use decode::{decode_audio_file, find_ffmpeg, TARGET_SAMPLE_RATE};
