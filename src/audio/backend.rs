//! Audio backend trait definition
//!
//! Playback is a capability injected into the dispatcher, so the core
//! never touches a platform audio API directly and headless environments
//! run the same code with a no-op backend.

use std::fmt;

use async_trait::async_trait;

use super::tones::RenderedClip;

/// Result type alias for backend operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Errors from an audio backend.
#[derive(Debug)]
pub enum AudioError {
    /// No usable audio device/output for this session
    Unavailable(String),

    /// Playback of a clip failed
    Playback(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Unavailable(msg) => write!(f, "audio backend unavailable: {msg}"),
            AudioError::Playback(msg) => write!(f, "audio playback failed: {msg}"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Plays rendered clips.
///
/// `play` must not return before playback has finished; the dispatcher
/// relies on that to keep alert cues from overlapping. An error marks the
/// backend unusable for the rest of the session.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    async fn play(&self, clip: &RenderedClip) -> AudioResult<()>;
}

/// No-op backend for headless or audio-less environments. Completes
/// immediately and never fails.
#[derive(Debug, Default)]
pub struct NullBackend;

#[async_trait]
impl AudioBackend for NullBackend {
    async fn play(&self, _clip: &RenderedClip) -> AudioResult<()> {
        Ok(())
    }
}
