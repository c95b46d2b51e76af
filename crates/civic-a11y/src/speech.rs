//! Speech Output Service
//!
//! Seam over a text-to-speech engine. The coordinator never depends on speech
//! succeeding: the live region is the durable channel.

/// Speech engine error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpeechError {
    #[error("speech synthesis is not available")]
    Unavailable,

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}

/// Text-to-speech engine
pub trait SpeechOutput {
    /// Stop anything currently being spoken
    fn cancel(&mut self) -> Result<(), SpeechError>;

    /// Speak `text`, optionally at a given rate
    fn speak(&mut self, text: &str, rate: Option<f32>) -> Result<(), SpeechError>;

    fn is_available(&self) -> bool {
        true
    }
}

/// No speech engine
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSpeech;

impl SpeechOutput for NullSpeech {
    fn cancel(&mut self) -> Result<(), SpeechError> {
        Ok(())
    }

    fn speak(&mut self, _text: &str, _rate: Option<f32>) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Event seen by a `RecordingSpeech`
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Cancel,
    Speak { text: String, rate: Option<f32> },
}

/// Speech engine that records calls instead of speaking
#[derive(Debug, Default)]
pub struct RecordingSpeech {
    events: Vec<SpeechEvent>,
    failure: Option<String>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose every call fails with a synthesis error
    pub fn failing(reason: impl Into<String>) -> Self {
        Self { events: Vec::new(), failure: Some(reason.into()) }
    }

    pub fn events(&self) -> &[SpeechEvent] {
        &self.events
    }

    /// Texts spoken, oldest first
    pub fn spoken(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SpeechEvent::Speak { text, .. } => Some(text.as_str()),
                SpeechEvent::Cancel => None,
            })
            .collect()
    }

    pub fn cancel_count(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, SpeechEvent::Cancel)).count()
    }
}

impl SpeechOutput for RecordingSpeech {
    fn cancel(&mut self) -> Result<(), SpeechError> {
        if let Some(reason) = &self.failure {
            return Err(SpeechError::Synthesis(reason.clone()));
        }
        self.events.push(SpeechEvent::Cancel);
        Ok(())
    }

    fn speak(&mut self, text: &str, rate: Option<f32>) -> Result<(), SpeechError> {
        if let Some(reason) = &self.failure {
            return Err(SpeechError::Synthesis(reason.clone()));
        }
        self.events.push(SpeechEvent::Speak { text: text.to_string(), rate });
        Ok(())
    }
}

/// Speech engine that logs utterances through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSpeech;

impl SpeechOutput for TracingSpeech {
    fn cancel(&mut self) -> Result<(), SpeechError> {
        tracing::debug!(target: "civic_a11y::speech", "cancel");
        Ok(())
    }

    fn speak(&mut self, text: &str, rate: Option<f32>) -> Result<(), SpeechError> {
        tracing::info!(target: "civic_a11y::speech", ?rate, "speak: {text}");
        Ok(())
    }
}
