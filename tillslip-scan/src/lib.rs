//! Receipt assembly: turning recognized text or AI payloads into receipts.

pub mod builder;
pub mod id;
pub mod pipeline;
pub mod progress;

pub use builder::{ReceiptBuilder, ScanInput};
pub use id::IdGenerator;
pub use pipeline::{scan_image, transcribe_and_build, TextRecognizer, TranscribeRequest, Transcriber};
pub use progress::{ProgressTracker, RecognitionEvent, RECOGNIZING_TEXT};
