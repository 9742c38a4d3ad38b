use crate::{
    commands::{self, Command},
    transport::{ChatKind, Inbound, Transport},
};
use chrono::Utc;
use futures::FutureExt;
use std::{panic::AssertUnwindSafe, time::Duration};
use suitwatch_execution::{
    engine::announcement_text, DailySchedule, Effect, Engine as Core, EngineConfig, Ingest,
    ResetScope, StatusSnapshot,
};
use suitwatch_types::PredictionStatus;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

/// Configuration for the [Engine].
#[derive(Clone, Debug)]
pub struct Config {
    pub core: EngineConfig,
    /// Feed whose finalized messages drive the engine.
    pub source_channel: i64,
    /// Destination of announcements.
    pub prediction_channel: i64,
    /// Operator allowed to run restricted commands; `None` allows everyone.
    pub operator: Option<i64>,
    pub hourly_interval: Duration,
    pub hourly_scope: ResetScope,
    pub daily: DailySchedule,
}

/// Single owner of the prediction state.
///
/// Inbound updates, operator commands and both reset timers are multiplexed on one task, so
/// the core is never shared. Every await on the transport is a point where the core may be
/// reset before the call returns; results are re-validated against the core afterwards.
pub struct Engine<T: Transport> {
    config: Config,
    transport: T,
    core: Core,
    status: watch::Sender<StatusSnapshot>,
}

impl<T: Transport> Engine<T> {
    pub fn new(config: Config, transport: T) -> (Self, watch::Receiver<StatusSnapshot>) {
        let core = Core::new(config.core);
        let (status, receiver) = watch::channel(core.status());
        (
            Self {
                config,
                transport,
                core,
                status,
            },
            receiver,
        )
    }

    /// Start the event loop. It stops once `inbound` is closed.
    pub fn start(self, inbound: mpsc::Receiver<Inbound>) -> JoinHandle<()> {
        tokio::spawn(self.run(inbound))
    }

    async fn run(mut self, mut inbound: mpsc::Receiver<Inbound>) {
        let period = self.config.hourly_interval;
        let mut hourly = interval_at(Instant::now() + period, period);
        hourly.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let daily = sleep(self.until_daily());
        tokio::pin!(daily);

        info!(
            source_channel = self.config.source_channel,
            prediction_channel = self.config.prediction_channel,
            daily = %self.config.daily,
            hourly_scope = %self.config.hourly_scope,
            "engine started"
        );
        loop {
            tokio::select! {
                update = inbound.recv() => {
                    let Some(update) = update else {
                        info!("inbound closed, stopping engine");
                        return;
                    };
                    self.handle_guarded(update).await;
                }
                _ = hourly.tick() => {
                    self.core.reset(self.config.hourly_scope);
                    info!(scope = %self.config.hourly_scope, "hourly reset");
                }
                _ = &mut daily => {
                    self.core.reset(ResetScope::Full);
                    let next = self.until_daily();
                    info!(next_in_secs = next.as_secs(), "daily reset");
                    daily.as_mut().reset(Instant::now() + next);
                }
            }
            self.status.send_replace(self.core.status());
        }
    }

    fn until_daily(&self) -> Duration {
        let now = Utc::now();
        (self.config.daily.next_after(now) - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Handle one update without letting a panic escape the loop.
    async fn handle_guarded(&mut self, update: Inbound) {
        let update_id = update.update_id;
        if AssertUnwindSafe(self.handle(update))
            .catch_unwind()
            .await
            .is_err()
        {
            error!(update_id, "panic while handling update");
        }
        if let Err(err) = self.core.check_invariants() {
            error!(?err, update_id, "store invariant violated, clearing predictions");
            self.core.reset(ResetScope::SafetyNet);
        }
    }

    async fn handle(&mut self, update: Inbound) {
        if update.chat_id == self.config.source_channel {
            match self.core.ingest(&update.text, now_ms()) {
                Ingest::Processed { game, effects } => {
                    info!(game, edited = update.edited, effects = effects.len(), "finalized game");
                    self.execute(effects).await;
                }
                Ingest::Skipped(reason) => {
                    debug!(reason = reason.as_str(), edited = update.edited, "feed message skipped");
                }
            }
            return;
        }

        // Commands are only answered in direct chats.
        if update.chat_kind != ChatKind::Private {
            return;
        }
        let Some(command) = Command::parse(&update.text) else {
            return;
        };
        let reply = commands::reply(command, update.sender_id, &self.config, &self.core.status());
        if let Err(err) = self.transport.send(update.chat_id, &reply).await {
            warn!(?err, ?command, "command reply failed");
        }
    }

    /// Deliver effects in order. Failures are logged; the core has already committed.
    async fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Announce { target_game, suit } => {
                    let text = announcement_text(target_game, suit, PredictionStatus::Pending);
                    match self
                        .transport
                        .send(self.config.prediction_channel, &text)
                        .await
                    {
                        Ok(handle) => {
                            if self.core.attach_handle(target_game, handle) {
                                info!(target_game, %suit, handle = handle.0, "prediction announced");
                            } else {
                                warn!(target_game, "prediction no longer active after announcement");
                            }
                        }
                        Err(err) => error!(?err, target_game, "announcement failed"),
                    }
                }
                Effect::Update {
                    target_game,
                    suit,
                    handle,
                    status,
                } => {
                    if !handle.is_set() {
                        warn!(target_game, status = status.glyph(), "no announcement to update");
                        continue;
                    }
                    let text = announcement_text(target_game, suit, status);
                    if let Err(err) = self
                        .transport
                        .edit(self.config.prediction_channel, handle, &text)
                        .await
                    {
                        error!(?err, target_game, "announcement update failed");
                    }
                }
                Effect::Forward { text } => {
                    let Some(operator) = self.config.operator else {
                        continue;
                    };
                    let text = format!("📨 Message finalisé du canal source:\n\n{text}");
                    if let Err(err) = self.transport.send(operator, &text).await {
                        warn!(?err, "forward to operator failed");
                    }
                }
            }
        }
    }
}

fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}
