//! PollerActor - runs the fetch → compute → evaluate → dispatch cycle
//!
//! One actor owns the whole pipeline: the source fetcher, the rule and
//! previous-value stores, and the audio handle. A cycle runs to
//! completion inside a single select arm, so two cycles can never
//! interleave their state mutations; ticks that fire while a slow fetch
//! is still in flight are skipped, not queued. A failed fetch skips the
//! cycle entirely - previous values stay untouched and nothing alerts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, instrument, trace, warn};

use crate::audio::AudioHandle;
use crate::change;
use crate::fetch::{FetchResult, MetricsFetcher};
use crate::storage::{KeyValueStore, PreviousValueStore, ThresholdRuleStore};
use crate::thresholds::{self, RulePatch, ThresholdRule};
use crate::MetricId;

use super::messages::{CycleEvent, MetricChange, PollerCommand};

/// Actor that polls the metrics source and drives alerting.
pub struct PollerActor {
    fetcher: MetricsFetcher,
    rule_store: ThresholdRuleStore,
    prev_store: PreviousValueStore,

    /// Current committed rule set; evaluation reads this, edits replace it.
    rules: HashMap<MetricId, ThresholdRule>,

    /// Fixed iteration order of the metric ids on the board. Dispatch
    /// order within a cycle follows it.
    order: Vec<MetricId>,

    audio: AudioHandle,
    command_rx: mpsc::Receiver<PollerCommand>,
    cycle_tx: broadcast::Sender<CycleEvent>,
    interval_duration: Duration,
}

impl PollerActor {
    /// Run the actor's main loop until a Shutdown command arrives or the
    /// command channel closes.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!("starting poller actor");

        let mut ticker = interval(self.interval_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                // Timer tick - run one poll cycle
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        error!("poll cycle skipped: {e}");
                    }
                }

                // Handle commands
                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        PollerCommand::PollNow { respond_to } => {
                            debug!("received PollNow command");
                            let result = self.run_cycle().await.map_err(Into::into);
                            let _ = respond_to.send(result);
                        }

                        PollerCommand::UpdateRule { id, patch } => {
                            debug!("updating rule for {id}");
                            self.rules = self.rule_store.update(&id, patch);
                        }

                        PollerCommand::ResetRules => {
                            debug!("resetting rules to defaults");
                            self.rules = self.rule_store.reset_to_defaults();
                        }

                        PollerCommand::GetRules { respond_to } => {
                            let _ = respond_to.send(self.rules.clone());
                        }

                        PollerCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                // Command channel closed - exit
                else => {
                    warn!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("poller actor stopped");
    }

    /// One fetch → compute → evaluate → dispatch → persist cycle.
    ///
    /// The previous-value snapshot is only replaced after every metric
    /// has been computed and every cue queued, in one write.
    async fn run_cycle(&mut self) -> FetchResult<()> {
        let snapshot = self.fetcher.fetch_snapshot().await?;
        let previous = self.prev_store.load();

        let mut changes = Vec::with_capacity(self.order.len());
        for id in &self.order {
            let current = snapshot.value(id);
            let prev = previous.get(id).copied();
            let direction = snapshot
                .direction(id)
                .unwrap_or_else(|| change::infer_direction(id));

            let record = change::compute(current, prev, direction);

            let fired = match (record.delta, self.rules.get(id)) {
                (Some(delta), Some(rule)) if delta != 0.0 => {
                    if thresholds::fires(rule, delta, record.percent) {
                        rule.on_cross
                    } else {
                        None
                    }
                }
                _ => None,
            };

            changes.push(MetricChange {
                id: id.clone(),
                unit: snapshot.unit(id).to_string(),
                direction,
                record,
                fired,
            });
        }

        // one cue per firing metric, in board order
        for change in &changes {
            if let Some(category) = change.fired {
                debug!(
                    "{}: {:+.2} crossed threshold, queuing {category:?} cue",
                    change.id,
                    change.record.delta.unwrap_or_default()
                );
                self.audio.play(category).await;
            }
        }

        self.prev_store.replace_all(snapshot.value_map());

        let event = CycleEvent {
            timestamp: snapshot.timestamp,
            tenant: snapshot.tenant.clone(),
            changes,
        };

        // It's OK if there are no subscribers; cycles are continuously
        // produced and slow subscribers may lag.
        match self.cycle_tx.send(event) {
            Ok(receivers) => trace!("published cycle event to {receivers} receivers"),
            Err(_) => trace!("no receivers for cycle event"),
        }

        Ok(())
    }
}

/// Handle for controlling a PollerActor.
#[derive(Clone)]
pub struct PollerHandle {
    sender: mpsc::Sender<PollerCommand>,
}

impl PollerHandle {
    /// Spawn the poller. Rules are loaded from storage once here; edits
    /// afterwards go through [`PollerHandle::update_rule`] and friends so
    /// the actor stays the single owner of the committed rule set.
    pub fn spawn(
        fetcher: MetricsFetcher,
        store: Arc<dyn KeyValueStore>,
        order: Vec<MetricId>,
        interval_secs: u64,
        audio: AudioHandle,
        cycle_tx: broadcast::Sender<CycleEvent>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let rule_store = ThresholdRuleStore::new(store.clone());
        let rules = rule_store.load();

        let actor = PollerActor {
            fetcher,
            rule_store,
            prev_store: PreviousValueStore::new(store),
            rules,
            order,
            audio,
            command_rx: cmd_rx,
            cycle_tx,
            interval_duration: Duration::from_secs(interval_secs),
        };

        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Run a full cycle immediately, bypassing the interval timer.
    pub async fn poll_now(&self) -> anyhow::Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(PollerCommand::PollNow { respond_to: tx })
            .await
            .context("failed to send PollNow command")?;

        rx.await.context("failed to receive response")??;
        Ok(())
    }

    /// Merge a partial edit into one metric's rule; applies from the next
    /// evaluation on.
    pub async fn update_rule(&self, id: impl Into<MetricId>, patch: RulePatch) {
        let _ = self
            .sender
            .send(PollerCommand::UpdateRule {
                id: id.into(),
                patch,
            })
            .await;
    }

    /// Replace all rules with the built-in defaults.
    pub async fn reset_rules(&self) {
        let _ = self.sender.send(PollerCommand::ResetRules).await;
    }

    /// Current committed rule set; `None` if the poller is gone.
    pub async fn rules(&self) -> Option<HashMap<MetricId, ThresholdRule>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(PollerCommand::GetRules { respond_to: tx })
            .await
            .ok()?;
        rx.await.ok()
    }

    /// Gracefully shut down the poller.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(PollerCommand::Shutdown).await;
    }
}
