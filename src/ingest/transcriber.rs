//! Speech-to-text collaborators.
//!
//! The pipeline only needs a finalized transcript. Sources report failure
//! explicitly through [`AcquisitionError`] so callers can decide between
//! retrying, alerting the user, or substituting a placeholder.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;

use crate::domain::{Language, TranscriptionResult};

/// Why no transcript could be produced
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Speech recognition is unavailable: {0}")]
    Unavailable(String),

    #[error("No speech detected")]
    NoSpeech,

    #[error("Speech capture failed: {0}")]
    Capture(String),
}

/// A finalized transcript as delivered by a speech source
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedSpeech {
    pub text: String,

    /// Language reported by the recognizer, if it reports one
    pub language_hint: Option<Language>,

    /// Recording length in seconds (0 when unknown)
    pub duration_seconds: f64,
}

impl CapturedSpeech {
    /// Recognizer confidence heuristic: longer transcripts score higher,
    /// capped at 0.95.
    pub fn confidence(&self) -> f64 {
        (0.7 + self.text.chars().count() as f64 / 200.0).min(0.95)
    }

    /// Collapse into a transcription result, detecting the language from the
    /// script when the recognizer gave no usable hint.
    pub fn into_transcription(self) -> TranscriptionResult {
        let confidence = self.confidence();
        let language = self
            .language_hint
            .unwrap_or_else(|| crate::nlu::detect_language(&self.text));

        TranscriptionResult {
            text: self.text,
            language,
            confidence,
        }
    }
}

/// Something that yields a finalized transcript
#[async_trait]
pub trait SpeechSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Acquire one transcript
    async fn acquire(&self) -> Result<CapturedSpeech, AcquisitionError>;
}

/// Transcript supplied directly as text (typed input, upstream recognizer)
#[derive(Debug, Clone)]
pub struct TextSource {
    text: String,
    language: Option<Language>,
}

impl TextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
        }
    }

    /// Declare the language instead of detecting it from script
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }
}

#[async_trait]
impl SpeechSource for TextSource {
    fn name(&self) -> &str {
        "text"
    }

    async fn acquire(&self) -> Result<CapturedSpeech, AcquisitionError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(AcquisitionError::NoSpeech);
        }

        Ok(CapturedSpeech {
            text: text.to_string(),
            language_hint: self.language,
            duration_seconds: 0.0,
        })
    }
}

/// Whisper output JSON structure
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    text: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    #[serde(default)]
    end: f64,
}

/// Transcribes a recorded audio file with a local Whisper binary
#[derive(Debug, Clone)]
pub struct WhisperSource {
    audio_path: PathBuf,
    binary: String,
    model: String,
}

impl WhisperSource {
    pub fn new(audio_path: impl Into<PathBuf>, model: impl Into<String>) -> Self {
        let binary = std::env::var("WHISPER_PATH").unwrap_or_else(|_| "whisper".to_string());
        Self {
            audio_path: audio_path.into(),
            binary,
            model: model.into(),
        }
    }

    /// Override the Whisper executable
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn audio_path(&self) -> &Path {
        &self.audio_path
    }
}

#[async_trait]
impl SpeechSource for WhisperSource {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn acquire(&self) -> Result<CapturedSpeech, AcquisitionError> {
        let temp_dir = tempfile::tempdir()
            .map_err(|e| AcquisitionError::Capture(format!("Failed to create temp dir: {}", e)))?;

        // No --language flag: Whisper detects it and we keep it as a hint
        let output = Command::new(&self.binary)
            .arg(&self.audio_path)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_dir")
            .arg(temp_dir.path())
            .arg("--output_format")
            .arg("json")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    AcquisitionError::Unavailable(format!("{} not found", self.binary))
                }
                _ => AcquisitionError::Capture(format!("Failed to run whisper: {}", e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AcquisitionError::Capture(format!("Whisper failed: {}", stderr.trim())));
        }

        let stem = self.audio_path.file_stem().unwrap_or_default().to_string_lossy();
        let json_path = temp_dir.path().join(format!("{}.json", stem));

        let json_content = tokio::fs::read_to_string(&json_path)
            .await
            .map_err(|e| AcquisitionError::Capture(format!("Failed to read whisper output: {}", e)))?;

        parse_whisper_output(&json_content)
    }
}

fn parse_whisper_output(json: &str) -> Result<CapturedSpeech, AcquisitionError> {
    let whisper: WhisperOutput = serde_json::from_str(json)
        .map_err(|e| AcquisitionError::Capture(format!("Failed to parse whisper JSON: {}", e)))?;

    let text = whisper.text.trim().to_string();
    if text.is_empty() {
        return Err(AcquisitionError::NoSpeech);
    }

    Ok(CapturedSpeech {
        text,
        language_hint: Language::from_code(&whisper.language),
        duration_seconds: whisper.segments.last().map(|s| s.end).unwrap_or(0.0),
    })
}
