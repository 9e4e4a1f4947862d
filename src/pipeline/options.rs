//! Extraction options and configuration.

use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Default minimum confidence for an OCR detection to be kept.
pub const DEFAULT_MIN_OCR_CONFIDENCE: f32 = 0.7;

/// Options for extracting a document outline.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Run the OCR path when the native path fails or finds nothing
    pub ocr_fallback: bool,

    /// Detections at or below this confidence are discarded
    pub min_ocr_confidence: f32,

    /// Wall-clock budget per document, checked between pages
    pub deadline: Option<Duration>,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the OCR fallback.
    pub fn with_ocr_fallback(mut self, enabled: bool) -> Self {
        self.ocr_fallback = enabled;
        self
    }

    /// Native extraction only.
    pub fn native_only(mut self) -> Self {
        self.ocr_fallback = false;
        self
    }

    /// Set the OCR confidence threshold.
    pub fn with_min_ocr_confidence(mut self, confidence: f32) -> Self {
        self.min_ocr_confidence = confidence;
        self
    }

    /// Set the per-document deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            ocr_fallback: true,
            min_ocr_confidence: DEFAULT_MIN_OCR_CONFIDENCE,
            deadline: None,
        }
    }
}

/// A running per-document deadline.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// Start the clock now.
    pub fn start(budget: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    /// Error once the budget is spent.
    pub fn check(&self) -> Result<()> {
        match self.budget {
            Some(budget) if self.started.elapsed() >= budget => {
                Err(Error::DeadlineExceeded(budget))
            }
            _ => Ok(()),
        }
    }

    /// Time since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::default();
        assert!(options.ocr_fallback);
        assert_eq!(options.min_ocr_confidence, 0.7);
        assert!(options.deadline.is_none());
    }

    #[test]
    fn test_builder() {
        let options = ExtractOptions::new()
            .native_only()
            .with_min_ocr_confidence(0.5)
            .with_deadline(Duration::from_secs(10));
        assert!(!options.ocr_fallback);
        assert_eq!(options.min_ocr_confidence, 0.5);
        assert_eq!(options.deadline, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_deadline() {
        assert!(Deadline::start(None).check().is_ok());
        assert!(Deadline::start(Some(Duration::from_secs(3600))).check().is_ok());
        let expired = Deadline::start(Some(Duration::ZERO));
        assert!(matches!(expired.check(), Err(Error::DeadlineExceeded(_))));
    }
}
