//! Core data model shared by the server, the composer clients and the CLI.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mood of the requested composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emotion {
    Love,
    Devotion,
    Celebration,
    Sadness,
    Calm,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Love => "Love",
            Emotion::Devotion => "Devotion",
            Emotion::Celebration => "Celebration",
            Emotion::Sadness => "Sadness",
            Emotion::Calm => "Calm",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Emotion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "love" => Ok(Emotion::Love),
            "devotion" => Ok(Emotion::Devotion),
            "celebration" => Ok(Emotion::Celebration),
            "sadness" => Ok(Emotion::Sadness),
            "calm" => Ok(Emotion::Calm),
            other => Err(ValidationError::UnknownEmotion(other.to_string())),
        }
    }
}

/// Musical style of the requested composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Genre {
    Carnatic,
    Hindustani,
    Sufi,
    #[serde(rename = "Bollywood Fusion")]
    BollywoodFusion,
}

impl Genre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Carnatic => "Carnatic",
            Genre::Hindustani => "Hindustani",
            Genre::Sufi => "Sufi",
            Genre::BollywoodFusion => "Bollywood Fusion",
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Genre {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', " ").as_str() {
            "carnatic" => Ok(Genre::Carnatic),
            "hindustani" => Ok(Genre::Hindustani),
            "sufi" => Ok(Genre::Sufi),
            "bollywood fusion" => Ok(Genre::BollywoodFusion),
            other => Err(ValidationError::UnknownGenre(other.to_string())),
        }
    }
}

pub const TEMPO_MIN: u32 = 60;
pub const TEMPO_MAX: u32 = 180;
pub const MAX_LYRICS_WORDS: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("lyrics must not be empty")]
    EmptyLyrics,

    #[error("lyrics must be at most 200 words (got {0})")]
    TooManyWords(usize),

    #[error("tempo must be between 60 and 180 bpm (got {0})")]
    TempoOutOfRange(u32),

    #[error("unknown emotion: {0}")]
    UnknownEmotion(String),

    #[error("unknown genre: {0}")]
    UnknownGenre(String),

    #[error("rating must be between 1 and 5 (got {0})")]
    RatingOutOfRange(u8),
}

/// A fully typed composition request as built by the client.
///
/// Serializes to the same wire shape the backend accepts, with the
/// emotion and genre spelled out as their display names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositionRequest {
    pub lyrics: String,
    pub emotion: Emotion,
    pub genre: Genre,
    pub tempo: u32,
}

impl CompositionRequest {
    /// Client-side submission policy: non-empty lyrics of at most 200
    /// words, tempo within the 60-180 bpm range the form allows.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.lyrics.trim().is_empty() {
            return Err(ValidationError::EmptyLyrics);
        }
        let words = self.lyrics.split_whitespace().count();
        if words > MAX_LYRICS_WORDS {
            return Err(ValidationError::TooManyWords(words));
        }
        if !(TEMPO_MIN..=TEMPO_MAX).contains(&self.tempo) {
            return Err(ValidationError::TempoOutOfRange(self.tempo));
        }
        Ok(())
    }
}

/// The untyped request body the backend relays onward. The server does not
/// second-guess the client's vocabulary; unknown genres still slug into
/// usable destination keys.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComposeRequest {
    pub lyrics: String,
    pub emotion: String,
    pub genre: String,
    pub tempo: u32,
}

/// Artifact locations produced by a composer. All three are required;
/// a response missing any of them fails deserialization and thereby the
/// whole call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComposerResult {
    pub audio: String,
    pub midi: String,
    pub pdf: String,
}

/// User feedback attached to a finished composition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub rating: u8,
    pub comment: String,
}

impl Feedback {
    pub fn new(rating: u8, comment: impl Into<String>) -> Result<Self, ValidationError> {
        if !(1..=5).contains(&rating) {
            return Err(ValidationError::RatingOutOfRange(rating));
        }
        Ok(Self {
            rating,
            comment: comment.into(),
        })
    }
}

/// A finished composition as persisted in the client history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Composition {
    #[serde(flatten)]
    pub request: CompositionRequest,
    #[serde(flatten)]
    pub result: ComposerResult,
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub favorite: bool,
    pub feedback: Option<Feedback>,
}

impl Composition {
    pub fn new(request: CompositionRequest, result: ComposerResult) -> Self {
        Self {
            request,
            result,
            id: new_composition_id(),
            created_at: Utc::now(),
            favorite: false,
            feedback: None,
        }
    }
}

/// Millisecond timestamp plus a short random suffix, unique enough for a
/// single user's history.
fn new_composition_id() -> String {
    let suffix: u32 = rand::rng().random_range(0..10_000);
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}
