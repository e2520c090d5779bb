//! Recognition progress reported by the OCR collaborator.
//!
//! Only "recognizing text" events count; loading and initialization phases
//! are ignored. The reported percent never goes backwards.

/// Status the recognizer uses while it is reading characters
pub const RECOGNIZING_TEXT: &str = "recognizing text";

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionEvent {
    pub status: String,
    /// Fraction complete in `[0, 1]`
    pub progress: f64,
}

impl RecognitionEvent {
    pub fn new(status: impl Into<String>, progress: f64) -> Self {
        Self {
            status: status.into(),
            progress,
        }
    }

    pub fn recognizing(progress: f64) -> Self {
        Self::new(RECOGNIZING_TEXT, progress)
    }

    /// Integer percent for display, or `None` for other phases.
    pub fn percent(&self) -> Option<u8> {
        if self.status != RECOGNIZING_TEXT || !self.progress.is_finite() {
            return None;
        }
        Some((self.progress * 100.0).round().clamp(0.0, 100.0) as u8)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    last: Option<u8>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed an event; returns the percent to display when it moved forward.
    pub fn observe(&mut self, event: &RecognitionEvent) -> Option<u8> {
        let percent = event.percent()?;
        match self.last {
            Some(last) if percent <= last => None,
            _ => {
                self.last = Some(percent);
                Some(percent)
            }
        }
    }

    pub fn current(&self) -> u8 {
        self.last.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_mapping() {
        assert_eq!(RecognitionEvent::recognizing(0.456).percent(), Some(46));
        assert_eq!(RecognitionEvent::recognizing(1.3).percent(), Some(100));
        assert_eq!(RecognitionEvent::recognizing(-0.2).percent(), Some(0));
        assert_eq!(RecognitionEvent::new("loading language traineddata", 0.5).percent(), None);
        assert_eq!(RecognitionEvent::recognizing(f64::NAN).percent(), None);
    }

    #[test]
    fn test_tracker_is_monotonic() {
        let mut tracker = ProgressTracker::new();
        let reported: Vec<u8> = [0.0, 0.25, 0.2, 0.25, 0.9, 1.0]
            .iter()
            .filter_map(|p| tracker.observe(&RecognitionEvent::recognizing(*p)))
            .collect();
        assert_eq!(reported, vec![0, 25, 90, 100]);
        assert_eq!(tracker.current(), 100);
    }

    #[test]
    fn test_tracker_ignores_other_phases() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.observe(&RecognitionEvent::new("initializing api", 1.0)), None);
        assert_eq!(tracker.current(), 0);
    }
}
