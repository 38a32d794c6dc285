mod service;
mod types;

pub use service::{
    build_transcription_request, AudioService, AudioServiceImpl, TRANSCRIPTIONS_PATH,
};
pub use types::{AudioResponseFormat, TranscriptionOutput};
