//! Actor-based poll pipeline
//!
//! The wallboard core runs as independent async tasks communicating via
//! Tokio channels:
//!
//! ```text
//! Timer tick → Fetch snapshot → Compute changes → Evaluate rules ─┐
//!     ↑                                                           │
//!     └── Commands (PollNow, UpdateRule, ResetRules, Shutdown)    │
//!                                                                 ▼
//!         CycleEvent broadcast ◄── persist prev_metrics ◄── queue cues
//!                                                     (AudioDispatcher)
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: each actor has an mpsc command channel for control
//! 2. **Events**: completed cycles are published to a broadcast channel
//! 3. **Request/Response**: oneshot channels for synchronous queries
//!
//! All mutable state (rule set, previous values, mute flag) has exactly
//! one owning task, so no locks are involved anywhere in the pipeline.

pub mod messages;
pub mod poller;
