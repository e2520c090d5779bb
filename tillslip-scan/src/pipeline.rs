//! Collaborator seams and the recognize -> build pipeline.
//!
//! Recognizers and transcribers live outside this crate (the CLI wires in a
//! Tesseract process and HTTP completion clients). Their failures surface as
//! `Error::Upstream`; a transcript that carries no usable JSON surfaces as
//! `Error::MalformedResponse`.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use tillslip_core::{Error, Receipt, Result};

use crate::builder::{ReceiptBuilder, ScanInput};
use crate::progress::RecognitionEvent;

/// Turns an image into raw text, reporting progress as it goes.
pub trait TextRecognizer {
    fn recognize(
        &self,
        image: &[u8],
        on_event: &mut dyn FnMut(&RecognitionEvent),
    ) -> Result<String>;
}

/// What a transcriber is asked to turn into a structured receipt
#[derive(Debug, Clone, PartialEq)]
pub enum TranscribeRequest {
    Image { bytes: Vec<u8>, media_type: String },
    Text(String),
}

/// Produces a completion response expected to contain a JSON receipt.
pub trait Transcriber {
    fn transcribe(&self, request: &TranscribeRequest) -> Result<String>;
}

/// Recognize an image and build a receipt from the text.
///
/// `image_ref` is the caller's opaque reference stored on the receipt.
pub fn scan_image(
    recognizer: &dyn TextRecognizer,
    builder: &ReceiptBuilder,
    image: &[u8],
    image_ref: Option<String>,
    on_event: &mut dyn FnMut(&RecognitionEvent),
    now: DateTime<Utc>,
) -> Result<Receipt> {
    let text = recognizer
        .recognize(image, on_event)
        .map_err(into_upstream)?;
    debug!(chars = text.len(), "recognition finished");

    let receipt = builder.build_at(ScanInput::RawText { text, image: image_ref }, now)?;
    info!(id = %receipt.id, merchant = %receipt.merchant, total = receipt.total, "receipt scanned");
    Ok(receipt)
}

/// Ask a transcriber for structured fields and build a receipt from them.
pub fn transcribe_and_build(
    transcriber: &dyn Transcriber,
    builder: &ReceiptBuilder,
    request: &TranscribeRequest,
    image_ref: Option<String>,
    now: DateTime<Utc>,
) -> Result<Receipt> {
    let response = transcriber.transcribe(request).map_err(into_upstream)?;
    debug!(chars = response.len(), "transcription finished");

    let receipt = builder.build_at(
        ScanInput::StructuredPayload {
            response,
            image: image_ref,
        },
        now,
    )?;
    info!(id = %receipt.id, merchant = %receipt.merchant, total = receipt.total, "receipt transcribed");
    Ok(receipt)
}

fn into_upstream(err: Error) -> Error {
    match err {
        Error::Upstream(_) => err,
        other => Error::Upstream(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FixedText(&'static str);

    impl TextRecognizer for FixedText {
        fn recognize(
            &self,
            _image: &[u8],
            on_event: &mut dyn FnMut(&RecognitionEvent),
        ) -> Result<String> {
            on_event(&RecognitionEvent::new("loading language traineddata", 1.0));
            on_event(&RecognitionEvent::recognizing(0.5));
            on_event(&RecognitionEvent::recognizing(1.0));
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl TextRecognizer for Broken {
        fn recognize(&self, _: &[u8], _: &mut dyn FnMut(&RecognitionEvent)) -> Result<String> {
            Err(Error::InvalidConfig("tesseract missing".into()))
        }
    }

    impl Transcriber for Broken {
        fn transcribe(&self, _: &TranscribeRequest) -> Result<String> {
            Err(Error::Upstream("HTTP 529".into()))
        }
    }

    struct Canned(&'static str);

    impl Transcriber for Canned {
        fn transcribe(&self, _: &TranscribeRequest) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 20, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_scan_image_reports_progress() {
        let builder = ReceiptBuilder::default();
        let mut seen = Vec::new();
        let receipt = scan_image(
            &FixedText("UBER TRIP\nTOTAL 18.20"),
            &builder,
            b"png",
            Some("receipt.png".into()),
            &mut |e| seen.extend(e.percent()),
            now(),
        )
        .unwrap();
        assert_eq!(seen, vec![50, 100]);
        assert_eq!(receipt.category, "Transport");
        assert_eq!(receipt.image.as_deref(), Some("receipt.png"));
    }

    #[test]
    fn test_recognizer_failure_is_upstream() {
        let builder = ReceiptBuilder::default();
        let err = scan_image(&Broken, &builder, b"", None, &mut |_| {}, now()).unwrap_err();
        assert!(matches!(err, Error::Upstream(msg) if msg.contains("tesseract")));
    }

    #[test]
    fn test_transcriber_failure_is_upstream() {
        let builder = ReceiptBuilder::default();
        let request = TranscribeRequest::Text("TOTAL 1.00".into());
        let err = transcribe_and_build(&Broken, &builder, &request, None, now()).unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[test]
    fn test_unusable_transcript_is_malformed() {
        let builder = ReceiptBuilder::default();
        let request = TranscribeRequest::Text("TOTAL 1.00".into());
        let err = transcribe_and_build(&Canned("I could not read that."), &builder, &request, None, now())
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
