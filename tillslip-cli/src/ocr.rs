use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use tillslip_core::{Error, Result};
use tillslip_scan::{RecognitionEvent, TextRecognizer};

/// Runs the `tesseract` binary, feeding the image on stdin.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    pub command: String,
    pub language: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            language: "eng".to_string(),
        }
    }
}

impl TextRecognizer for TesseractCli {
    fn recognize(
        &self,
        image: &[u8],
        on_event: &mut dyn FnMut(&RecognitionEvent),
    ) -> Result<String> {
        on_event(&RecognitionEvent::new("initializing tesseract", 0.0));

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Upstream(format!("spawn {}: {e} (is tesseract installed?)", self.command)))?;

        on_event(&RecognitionEvent::recognizing(0.0));
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(image) {
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Upstream(format!("write image to {}: {e}", self.command)));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::Upstream(format!("wait for {}: {e}", self.command)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Upstream(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }
        on_event(&RecognitionEvent::recognizing(1.0));

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "tesseract finished");
        Ok(text)
    }
}
