//! AlertDispatcher - plays sound cues for fired threshold rules
//!
//! The dispatcher is an actor consuming play requests from an mpsc queue
//! and awaiting each backend playback to completion before dequeuing the
//! next, so cues never overlap. The global mute flag is checked when a
//! request is dequeued: toggling mute stops future cues but not one
//! already playing.
//!
//! A backend failure downgrades the dispatcher to a no-op for the rest of
//! the session; a wallboard without sound beats a crashed wallboard.

pub mod backend;
pub mod tones;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, trace, warn};

pub use backend::{AudioBackend, AudioError, NullBackend};
pub use tones::{RenderedClip, render};

use crate::storage::{KeyValueStore, MUTED_KEY};
use crate::thresholds::SoundCategory;

/// Commands understood by the dispatcher actor.
#[derive(Debug)]
pub enum AudioCommand {
    /// Queue one cue for a category
    Play(SoundCategory),

    /// Set and persist the global mute flag
    SetMuted(bool),

    /// Read the current mute flag
    GetMuted { respond_to: oneshot::Sender<bool> },

    /// Stop the actor; queued cues are dropped
    Shutdown,
}

struct AudioDispatcher {
    backend: Box<dyn AudioBackend>,
    store: Arc<dyn KeyValueStore>,
    command_rx: mpsc::Receiver<AudioCommand>,
    muted: bool,
    /// Set after the first backend failure; playback is skipped for the
    /// rest of the session.
    disabled: bool,
}

impl AudioDispatcher {
    async fn run(mut self) {
        debug!("starting audio dispatcher");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                AudioCommand::Play(category) => self.play(category).await,

                AudioCommand::SetMuted(muted) => {
                    debug!("setting mute flag to {muted}");
                    self.muted = muted;
                    self.store
                        .set(MUTED_KEY, if muted { "true" } else { "false" });
                }

                AudioCommand::GetMuted { respond_to } => {
                    let _ = respond_to.send(self.muted);
                }

                AudioCommand::Shutdown => {
                    debug!("received shutdown command");
                    break;
                }
            }
        }

        debug!("audio dispatcher stopped");
    }

    async fn play(&mut self, category: SoundCategory) {
        if self.muted {
            trace!("muted, dropping {category:?} cue");
            return;
        }

        if self.disabled {
            trace!("audio disabled, dropping {category:?} cue");
            return;
        }

        let clip = render(category);
        trace!(
            "playing {category:?} ({:.2}s)",
            clip.duration_secs()
        );

        if let Err(e) = self.backend.play(&clip).await {
            error!("audio backend failed, disabling sound for this session: {e}");
            self.disabled = true;
        }
    }
}

/// Handle for the dispatcher actor. Cloneable; all user-facing sound
/// controls (alerts, previews, the mute toggle) go through it.
#[derive(Clone)]
pub struct AudioHandle {
    sender: mpsc::Sender<AudioCommand>,
}

impl AudioHandle {
    /// Spawn the dispatcher. The initial mute flag is loaded from the
    /// `sound_muted` storage key.
    pub fn spawn(backend: Box<dyn AudioBackend>, store: Arc<dyn KeyValueStore>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let muted = store.get(MUTED_KEY).as_deref() == Some("true");
        if muted {
            debug!("starting muted (persisted flag)");
        }

        let actor = AudioDispatcher {
            backend,
            store,
            command_rx: cmd_rx,
            muted,
            disabled: false,
        };

        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Queue a cue for a category. Used for fired alerts and previews.
    pub async fn play(&self, category: SoundCategory) {
        if self.sender.send(AudioCommand::Play(category)).await.is_err() {
            warn!("audio dispatcher gone, dropping cue");
        }
    }

    /// Set and persist the global mute flag.
    pub async fn set_muted(&self, muted: bool) {
        let _ = self.sender.send(AudioCommand::SetMuted(muted)).await;
    }

    /// Current mute flag; `None` if the dispatcher is gone.
    pub async fn muted(&self) -> Option<bool> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(AudioCommand::GetMuted { respond_to: tx })
            .await
            .ok()?;
        rx.await.ok()
    }

    /// Shut the dispatcher down.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(AudioCommand::Shutdown).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use backend::AudioResult;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::storage::MemoryStore;

    struct RecordingBackend {
        played: Arc<Mutex<Vec<f32>>>,
    }

    #[async_trait]
    impl AudioBackend for RecordingBackend {
        async fn play(&self, clip: &RenderedClip) -> AudioResult<()> {
            self.played.lock().unwrap().push(clip.duration_secs());
            Ok(())
        }
    }

    struct FailingBackend {
        attempts: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AudioBackend for FailingBackend {
        async fn play(&self, _clip: &RenderedClip) -> AudioResult<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(AudioError::Unavailable("no output device".into()))
        }
    }

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_play_reaches_backend() {
        let played = Arc::new(Mutex::new(vec![]));
        let backend = RecordingBackend {
            played: played.clone(),
        };
        let handle = AudioHandle::spawn(Box::new(backend), store());

        handle.play(SoundCategory::Warning).await;
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;

        assert_eq!(played.lock().unwrap().len(), 1);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_mute_suppresses_playback_without_error() {
        let played = Arc::new(Mutex::new(vec![]));
        let backend = RecordingBackend {
            played: played.clone(),
        };
        let handle = AudioHandle::spawn(Box::new(backend), store());

        handle.set_muted(true).await;
        handle.play(SoundCategory::Warning).await;
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;

        assert!(played.lock().unwrap().is_empty());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_mute_flag_is_persisted_and_reloaded() {
        let kv = store();
        let handle = AudioHandle::spawn(Box::new(NullBackend), kv.clone());

        handle.set_muted(true).await;
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        assert_eq!(kv.get(MUTED_KEY).as_deref(), Some("true"));
        handle.shutdown().await;

        // a fresh dispatcher on the same store starts muted
        let handle = AudioHandle::spawn(Box::new(NullBackend), kv);
        assert_eq!(handle.muted().await, Some(true));
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_backend_failure_disables_further_attempts() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let backend = FailingBackend {
            attempts: attempts.clone(),
        };
        let handle = AudioHandle::spawn(Box::new(backend), store());

        handle.play(SoundCategory::Warning).await;
        handle.play(SoundCategory::Celebration).await;
        handle.play(SoundCategory::Subtle).await;
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_unmute_restores_playback() {
        let played = Arc::new(Mutex::new(vec![]));
        let backend = RecordingBackend {
            played: played.clone(),
        };
        let handle = AudioHandle::spawn(Box::new(backend), store());

        handle.set_muted(true).await;
        handle.play(SoundCategory::Subtle).await;
        handle.set_muted(false).await;
        handle.play(SoundCategory::Subtle).await;
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;

        assert_eq!(played.lock().unwrap().len(), 1);
        handle.shutdown().await;
    }
}
