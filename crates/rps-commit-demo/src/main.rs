//! RPS Commit Demo
//!
//! Plays four scripted matches against an in-process session store:
//!
//! - `paper-beats-rock`: both reveal, the creator wins
//! - `draw`: both reveal Paper
//! - `abandoned`: the opponent withdraws before committing
//! - `forfeit`: the opponent never reveals and forfeits after the grace window
//!
//! Time runs on a manual clock, so the forfeit scenario finishes instantly.
//! Set `RPS_REVEAL_GRACE_SECS` to change the grace window and `RUST_LOG` to
//! change log verbosity.

use rps_commit_core::{
    GameError, GameId, ManualClock, Move, Outcome, ParticipantId, SealedMove, SessionConfig,
    SessionEvent, SessionStore,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct Demo {
    store: SessionStore,
    clock: ManualClock,
}

impl Demo {
    async fn open(&self) -> rps_commit_core::Result<(GameId, ParticipantId, ParticipantId)> {
        let alice = ParticipantId::new();
        let bob = ParticipantId::new();
        let game_id = self.store.create(alice, bob).await?;
        Ok((game_id, alice, bob))
    }

    async fn commit(
        &self,
        game_id: GameId,
        who: ParticipantId,
        mv: Move,
    ) -> rps_commit_core::Result<SealedMove> {
        let sealed = SealedMove::new(mv);
        self.store
            .submit_commitment(game_id, who, sealed.commitment(&who))
            .await?;
        Ok(sealed)
    }

    async fn reveal(
        &self,
        game_id: GameId,
        who: ParticipantId,
        sealed: &SealedMove,
    ) -> rps_commit_core::Result<()> {
        self.store
            .submit_reveal(game_id, who, sealed.mv(), sealed.nonce())
            .await?;
        Ok(())
    }

    async fn played(&self, a: Move, b: Move) -> rps_commit_core::Result<Option<Outcome>> {
        let (game_id, alice, bob) = self.open().await?;
        let sealed_a = self.commit(game_id, alice, a).await?;
        let sealed_b = self.commit(game_id, bob, b).await?;
        self.reveal(game_id, alice, &sealed_a).await?;
        self.reveal(game_id, bob, &sealed_b).await?;
        self.store.outcome(game_id).await.map(Some)
    }

    async fn abandoned(&self) -> rps_commit_core::Result<Option<Outcome>> {
        let (game_id, alice, bob) = self.open().await?;
        self.commit(game_id, alice, Move::Paper).await?;
        self.store.force_withdraw(game_id, bob).await?;

        match self.store.outcome(game_id).await {
            Err(GameError::WrongState(state)) => {
                info!(%game_id, %state, "no outcome for an abandoned game");
                Ok(None)
            }
            other => other.map(Some),
        }
    }

    async fn forfeit(&self) -> rps_commit_core::Result<Option<Outcome>> {
        let (game_id, alice, bob) = self.open().await?;
        let sealed_a = self.commit(game_id, alice, Move::Rock).await?;
        self.commit(game_id, bob, Move::Scissors).await?;
        self.reveal(game_id, alice, &sealed_a).await?;

        if let Err(err) = self.store.force_withdraw(game_id, alice).await {
            warn!(%game_id, error = %err, "forfeit refused");
        }

        let grace = i64::from(self.store.config().reveal_grace_secs);
        self.clock.advance_secs(grace + 1);
        self.store.force_withdraw(game_id, alice).await?;
        self.store.outcome(game_id).await.map(Some)
    }
}

/// Log every event until the store is dropped. Returns how many were logged.
async fn log_events(mut events: broadcast::Receiver<SessionEvent>) -> usize {
    let mut logged = 0;
    loop {
        match events.recv().await {
            Ok(event) => {
                debug!(game_id = %event.game_id, event = ?event.event, "event");
                logged += 1;
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event log fell behind"),
            Err(RecvError::Closed) => return logged,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SessionConfig::from_env();
    info!(reveal_grace_secs = config.reveal_grace_secs, "starting demo");

    let clock = ManualClock::default();
    let demo = Demo {
        store: SessionStore::with_clock(config, Arc::new(clock.clone())),
        clock,
    };

    let printer = tokio::spawn(log_events(demo.store.subscribe()));

    let scenarios = [
        ("paper-beats-rock", demo.played(Move::Paper, Move::Rock).await?),
        ("draw", demo.played(Move::Paper, Move::Paper).await?),
        ("abandoned", demo.abandoned().await?),
        ("forfeit", demo.forfeit().await?),
    ];

    for (name, outcome) in &scenarios {
        let line = json!({ "scenario": name, "outcome": outcome });
        println!("{}", serde_json::to_string(&line)?);
    }

    let pruned = demo.store.prune_finished().await;
    drop(demo);
    let logged = printer.await?;
    info!(pruned, logged, "demo finished");
    Ok(())
}
