//! Session store: owns every live match and serializes access to each one.

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::crypto::{Commitment, Nonce};
use crate::error::{GameError, Result};
use crate::games::Move;
use crate::protocol::{GameEvent, GameId, Outcome, ParticipantId, SessionEvent, SessionState};
use crate::session::GameSession;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info};

/// Maps game IDs to independently locked sessions.
///
/// Operations on different games never contend on anything but the brief
/// index lookup. Operations on the same game run one at a time.
pub struct SessionStore {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    sessions: RwLock<HashMap<GameId, Arc<Mutex<GameSession>>>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// Create a store on the wall clock
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a store reading time from `clock`
    pub fn with_clock(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            config,
            clock,
            sessions: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Receive every event published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Open a session between `creator` (seat A) and `opponent` (seat B).
    pub async fn create(&self, creator: ParticipantId, opponent: ParticipantId) -> Result<GameId> {
        let session = GameSession::new(creator, opponent, &self.config)?;
        let event = session.started_event();
        let game_id = GameId::new();

        self.sessions
            .write()
            .await
            .insert(game_id, Arc::new(Mutex::new(session)));
        info!(%game_id, participant_a = %creator, participant_b = %opponent, "game started");
        self.publish(game_id, event);
        Ok(game_id)
    }

    /// Submit `participant`'s commitment to `game_id`.
    pub async fn submit_commitment(
        &self,
        game_id: GameId,
        participant: ParticipantId,
        commitment: Commitment,
    ) -> Result<Option<GameEvent>> {
        let session = self.session(game_id).await?;
        let mut session = session.lock().await;
        let result = session.submit_commitment(participant, commitment, self.clock.now());
        self.finish(game_id, participant, "commit", result)
    }

    /// Reveal `participant`'s move in `game_id`.
    pub async fn submit_reveal(
        &self,
        game_id: GameId,
        participant: ParticipantId,
        mv: Move,
        nonce: &Nonce,
    ) -> Result<Option<GameEvent>> {
        let session = self.session(game_id).await?;
        let mut session = session.lock().await;
        let result = session.submit_reveal(participant, mv, nonce);
        self.finish(game_id, participant, "reveal", result)
    }

    /// Abandon `game_id`, or claim a forfeit once the reveal deadline passed.
    pub async fn force_withdraw(
        &self,
        game_id: GameId,
        participant: ParticipantId,
    ) -> Result<GameEvent> {
        let session = self.session(game_id).await?;
        let mut session = session.lock().await;
        match session.force_withdraw(participant, self.clock.now()) {
            Ok(event) => {
                self.announce(game_id, &event);
                Ok(event)
            }
            Err(err) => {
                self.rejected(game_id, participant, "withdraw", &err);
                Err(err)
            }
        }
    }

    /// Outcome of a resolved game
    pub async fn outcome(&self, game_id: GameId) -> Result<Outcome> {
        let session = self.session(game_id).await?;
        let session = session.lock().await;
        session.outcome()
    }

    pub async fn state(&self, game_id: GameId) -> Result<SessionState> {
        let session = self.session(game_id).await?;
        let state = session.lock().await.state();
        Ok(state)
    }

    /// Copy of the full session record
    pub async fn snapshot(&self, game_id: GameId) -> Result<GameSession> {
        let session = self.session(game_id).await?;
        let snapshot = session.lock().await.clone();
        Ok(snapshot)
    }

    /// Number of sessions held, live or finished
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop every resolved or abandoned session. Returns how many went.
    ///
    /// Session locks are taken without holding the index lock, so a game that
    /// is mid-operation delays only this call.
    pub async fn prune_finished(&self) -> usize {
        let candidates: Vec<_> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(game_id, session)| (*game_id, Arc::clone(session)))
            .collect();

        let mut finished = Vec::new();
        for (game_id, session) in candidates {
            if session.lock().await.state().is_terminal() {
                finished.push(game_id);
            }
        }
        if finished.is_empty() {
            return 0;
        }

        // Terminal states are permanent, so the check above cannot go stale
        let mut sessions = self.sessions.write().await;
        for game_id in &finished {
            sessions.remove(game_id);
        }
        info!(count = finished.len(), "pruned finished games");
        finished.len()
    }

    async fn session(&self, game_id: GameId) -> Result<Arc<Mutex<GameSession>>> {
        self.sessions
            .read()
            .await
            .get(&game_id)
            .cloned()
            .ok_or(GameError::NotFound(game_id))
    }

    /// Log the result of a commit or reveal and publish its event, if any.
    fn finish(
        &self,
        game_id: GameId,
        participant: ParticipantId,
        operation: &'static str,
        result: Result<Option<GameEvent>>,
    ) -> Result<Option<GameEvent>> {
        match &result {
            Ok(Some(event)) => self.announce(game_id, event),
            Ok(None) => debug!(%game_id, %participant, operation, "accepted"),
            Err(err) => self.rejected(game_id, participant, operation, err),
        }
        result
    }

    fn announce(&self, game_id: GameId, event: &GameEvent) {
        match event {
            GameEvent::CommitmentsReceived { reveal_deadline } => {
                info!(%game_id, %reveal_deadline, "commitments received")
            }
            GameEvent::Resolved(outcome) => info!(
                %game_id,
                move_a = %outcome.move_a,
                move_b = %outcome.move_b,
                winner = ?outcome.winner,
                "game resolved"
            ),
            GameEvent::Withdrawn { by } => info!(%game_id, %by, "game abandoned"),
            GameEvent::GameStarted { .. } => {}
        }
        self.publish(game_id, event.clone());
    }

    fn rejected(
        &self,
        game_id: GameId,
        participant: ParticipantId,
        operation: &'static str,
        err: &GameError,
    ) {
        debug!(%game_id, %participant, operation, error = %err, "rejected");
    }

    fn publish(&self, game_id: GameId, event: GameEvent) {
        // No subscribers is fine
        let _ = self.events.send(SessionEvent { game_id, event });
    }
}
