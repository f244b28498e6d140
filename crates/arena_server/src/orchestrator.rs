//! Async round orchestration.
//!
//! Each session runs in its own tokio task that exclusively owns the
//! [`Session`]. The task suspends only while recruiting and during the
//! pacing delay between rounds; both waits race the cancellation channel,
//! so a stop request interrupts them immediately. Rounds themselves are
//! synchronous and always run to completion.

use std::sync::Arc;

use arena_core::data::ArenaTables;
use arena_core::outcome::summarize;
use arena_core::session::{ArenaId, Session, SessionStatus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::handle::{ControlCommand, SessionChannels, SessionHandle};
use crate::providers::{Providers, RecruitmentProvider};
use crate::registry::SessionRegistry;

/// Launches session tasks and registers them.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: SessionRegistry,
    tables: Arc<ArenaTables>,
    config: ServerConfig,
    providers: Providers,
}

impl Orchestrator {
    /// Create an orchestrator sharing `registry`.
    pub fn new(
        registry: SessionRegistry,
        tables: Arc<ArenaTables>,
        config: ServerConfig,
        providers: Providers,
    ) -> Self {
        Self {
            registry,
            tables,
            config,
            providers,
        }
    }

    /// Registry this orchestrator registers sessions in.
    pub const fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Start a session in `arena` whose roster comes from `recruiter`.
    ///
    /// The handle is registered before the task is spawned, so a lookup
    /// right after this returns always finds it.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ArenaBusy`] if the arena already has a live session.
    pub fn launch(
        &self,
        arena: ArenaId,
        recruiter: Arc<dyn RecruitmentProvider>,
    ) -> Result<(SessionHandle, JoinHandle<SessionStatus>), ServerError> {
        let serial = self.registry.next_serial();
        let (handle, channels) = SessionHandle::new(arena, serial);
        self.registry.register(handle.clone())?;

        let seed = self.config.seed.unwrap_or_else(rand::random);
        let task = SessionTask {
            session: Session::new(arena, Arc::clone(&self.tables), seed),
            serial,
            channels,
            recruiter,
            providers: self.providers.clone(),
            config: self.config.clone(),
            registry: self.registry.clone(),
        };
        info!(%arena, serial, seed, "Launching session");
        Ok((handle, tokio::spawn(task.run())))
    }
}

/// Resolves when cancellation is requested; never resolves if every handle
/// (and with it the sender) is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

struct SessionTask {
    session: Session,
    serial: u64,
    channels: SessionChannels,
    recruiter: Arc<dyn RecruitmentProvider>,
    providers: Providers,
    config: ServerConfig,
    registry: SessionRegistry,
}

impl SessionTask {
    async fn run(mut self) -> SessionStatus {
        let arena = self.session.arena();

        if self.recruit().await {
            self.play().await;
        }

        let status = self.session.status();
        self.channels.status.send_replace(status);
        match status {
            SessionStatus::Finished => self.report_finished().await,
            _ => self.report_cancelled().await,
        }

        self.registry.deregister(arena, self.serial);
        info!(%arena, ?status, rounds = self.session.round(), "Session task exited");
        status
    }

    fn cancel_requested(&self) -> bool {
        *self.channels.cancel.borrow()
    }

    fn cancel(&mut self, reason: &str) {
        if let Err(e) = self.session.cancel(reason) {
            debug!(error = %e, "Cancel on terminal session ignored");
        }
    }

    /// Admit the roster and start. Returns whether the session is `Active`.
    async fn recruit(&mut self) -> bool {
        let arena = self.session.arena();
        let recruiter = Arc::clone(&self.recruiter);
        let recruits = tokio::select! {
            result = recruiter.recruit(arena) => result,
            () = cancelled(&mut self.channels.cancel) => {
                self.cancel("cancelled during recruitment");
                return false;
            }
        };

        let recruits = match recruits {
            Ok(recruits) => recruits,
            Err(e) => {
                warn!(%arena, error = %e, "Recruitment failed");
                self.cancel(&format!("recruitment failed: {e}"));
                return false;
            }
        };

        for recruit in recruits {
            if let Err(e) = self.session.admit_participant(recruit.id, &recruit.display_name) {
                warn!(%arena, participant = %recruit.id, error = %e, "Recruit not admitted");
            }
        }

        if self.cancel_requested() {
            self.cancel("cancelled during recruitment");
            return false;
        }
        if let Err(e) = self.session.start() {
            warn!(%arena, error = %e, "Session could not start");
            return false;
        }
        self.channels.status.send_replace(SessionStatus::Active);
        true
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.channels.commands.try_recv() {
            let result = match command.clone() {
                ControlCommand::ForceCondition(id) => self.session.force_condition(id),
                ControlCommand::ForceCategory(category) => {
                    self.session.force_next_category(category)
                }
            };
            match result {
                Ok(()) => debug!(?command, "Control command applied"),
                Err(e) => warn!(?command, error = %e, "Control command rejected"),
            }
        }
    }

    async fn play(&mut self) {
        let arena = self.session.arena();
        loop {
            if self.cancel_requested() {
                self.cancel("cancelled by admin");
                return;
            }
            self.apply_commands();

            let report = match self.session.play_round() {
                Ok(report) => report,
                Err(e) => {
                    error!(%arena, round = self.session.round(), error = %e, "Round failed");
                    self.cancel(&e.to_string());
                    return;
                }
            };

            for message in &report.messages {
                if let Err(e) = self.providers.output.narrate(arena, message).await {
                    warn!(%arena, error = %e, "Output sink rejected narration");
                }
            }
            if let Err(e) = self.providers.output.status(&report.snapshot).await {
                warn!(%arena, error = %e, "Output sink rejected status");
            }

            if report.status != SessionStatus::Active {
                return;
            }

            let delay = self.config.scale_pacing(report.pacing);
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = cancelled(&mut self.channels.cancel) => {}
            }
        }
    }

    async fn report_finished(&mut self) {
        let arena = self.session.arena();
        let outcome = match summarize(&self.session, self.config.base_reward) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(%arena, error = %e, "Could not summarize finished session");
                return;
            }
        };

        if let Err(e) = self.providers.stats.record_outcome(&outcome).await {
            warn!(%arena, error = %e, "Stats provider rejected outcome");
        }
        if let Some(winner) = outcome.winner {
            if let Err(e) = self
                .providers
                .rewards
                .issue(arena, winner, outcome.reward)
                .await
            {
                warn!(%arena, %winner, amount = outcome.reward, error = %e, "Reward issuance failed");
            }
        }
    }

    async fn report_cancelled(&mut self) {
        let arena = self.session.arena();
        let reason = self
            .session
            .cancel_reason()
            .unwrap_or("cancelled")
            .to_string();
        let snapshot = self.session.snapshot();

        let notice = format!("The games have been called off: {reason}.");
        if let Err(e) = self.providers.output.narrate(arena, &notice).await {
            warn!(%arena, error = %e, "Output sink rejected cancellation notice");
        }
        if let Err(e) = self.providers.output.status(&snapshot).await {
            warn!(%arena, error = %e, "Output sink rejected status");
        }
        if let Err(e) = self
            .providers
            .stats
            .record_cancellation(&snapshot, &reason)
            .await
        {
            warn!(%arena, error = %e, "Stats provider rejected cancellation");
        }
    }
}
