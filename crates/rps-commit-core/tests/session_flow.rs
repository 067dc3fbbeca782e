//! Integration tests for complete matches through the session store.
//!
//! Time is driven by a `ManualClock`, so forfeit windows are exercised
//! without sleeping.

use rps_commit_core::{
    Clock, GameError, GameEvent, GameId, ManualClock, Move, Outcome, ParticipantId, SealedMove,
    SessionConfig, SessionEvent, SessionState, SessionStore,
};
use std::sync::Arc;
use tokio::sync::broadcast;

struct Table {
    store: Arc<SessionStore>,
    clock: ManualClock,
    alice: ParticipantId,
    bob: ParticipantId,
    game_id: GameId,
}

async fn open_table() -> Table {
    let clock = ManualClock::default();
    let store = Arc::new(SessionStore::with_clock(
        SessionConfig::default(),
        Arc::new(clock.clone()),
    ));
    let alice = ParticipantId::new();
    let bob = ParticipantId::new();
    let game_id = store.create(alice, bob).await.unwrap();

    Table {
        store,
        clock,
        alice,
        bob,
        game_id,
    }
}

impl Table {
    async fn commit(&self, who: ParticipantId, mv: Move) -> SealedMove {
        let sealed = SealedMove::new(mv);
        self.store
            .submit_commitment(self.game_id, who, sealed.commitment(&who))
            .await
            .unwrap();
        sealed
    }

    async fn reveal(&self, who: ParticipantId, sealed: &SealedMove) -> Option<GameEvent> {
        self.store
            .submit_reveal(self.game_id, who, sealed.mv(), sealed.nonce())
            .await
            .unwrap()
    }
}

fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while let Ok(SessionEvent { event, .. }) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Paper beats Rock: the creator wins
#[tokio::test]
async fn test_paper_beats_rock() {
    let table = open_table().await;

    let sealed_a = table.commit(table.alice, Move::Paper).await;
    let sealed_b = table.commit(table.bob, Move::Rock).await;
    assert_eq!(
        table.store.state(table.game_id).await.unwrap(),
        SessionState::AwaitingReveals
    );

    assert_eq!(table.reveal(table.alice, &sealed_a).await, None);
    let resolved = table.reveal(table.bob, &sealed_b).await;

    let expected = Outcome {
        move_a: Move::Paper,
        move_b: Move::Rock,
        winner: Some(table.alice),
    };
    assert_eq!(resolved, Some(GameEvent::Resolved(expected)));
    assert_eq!(table.store.outcome(table.game_id).await.unwrap(), expected);
}

/// Equal moves: resolved with no winner
#[tokio::test]
async fn test_paper_against_paper_draws() {
    let table = open_table().await;

    let sealed_a = table.commit(table.alice, Move::Paper).await;
    let sealed_b = table.commit(table.bob, Move::Paper).await;
    table.reveal(table.alice, &sealed_a).await;
    table.reveal(table.bob, &sealed_b).await;

    let outcome = table.store.outcome(table.game_id).await.unwrap();
    assert_eq!(outcome.move_a, Move::Paper);
    assert_eq!(outcome.move_b, Move::Paper);
    assert_eq!(outcome.winner, None);
    assert!(outcome.is_draw());
    assert!(!outcome.is_forfeit());
}

/// Withdrawing before both commitments abandons the game
#[tokio::test]
async fn test_withdraw_before_commitments_complete() {
    let table = open_table().await;

    table.commit(table.alice, Move::Paper).await;
    let event = table
        .store
        .force_withdraw(table.game_id, table.bob)
        .await
        .unwrap();

    assert_eq!(event, GameEvent::Withdrawn { by: table.bob });
    assert_eq!(
        table.store.state(table.game_id).await.unwrap(),
        SessionState::Abandoned
    );
    assert_eq!(
        table.store.outcome(table.game_id).await.unwrap_err(),
        GameError::WrongState(SessionState::Abandoned)
    );

    // Late commitments are refused too
    let err = table
        .store
        .submit_commitment(
            table.game_id,
            table.bob,
            SealedMove::new(Move::Rock).commitment(&table.bob),
        )
        .await
        .unwrap_err();
    assert_eq!(err, GameError::WrongState(SessionState::Abandoned));
}

/// A silent opponent forfeits once the grace window has elapsed
#[tokio::test]
async fn test_forfeit_after_grace_window() {
    let table = open_table().await;

    let sealed_a = table.commit(table.alice, Move::Rock).await;
    table.commit(table.bob, Move::Paper).await;
    table.reveal(table.alice, &sealed_a).await;

    let err = table
        .store
        .force_withdraw(table.game_id, table.alice)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::TooEarly { .. }));
    assert_eq!(
        table.store.state(table.game_id).await.unwrap(),
        SessionState::AwaitingReveals
    );

    table.clock.advance_secs(301);
    let event = table
        .store
        .force_withdraw(table.game_id, table.alice)
        .await
        .unwrap();

    let expected = Outcome {
        move_a: Move::Rock,
        move_b: Move::NoMove,
        winner: Some(table.alice),
    };
    assert_eq!(event, GameEvent::Resolved(expected));
    assert_eq!(table.store.outcome(table.game_id).await.unwrap(), expected);

    // Bob's reveal after the forfeit is too late
    let err = table
        .store
        .submit_reveal(table.game_id, table.bob, Move::Paper, &rps_commit_core::Nonce::random())
        .await
        .unwrap_err();
    assert_eq!(err, GameError::WrongState(SessionState::Resolved));
}

/// Forfeit is refused strictly before the deadline and allowed from it on
#[tokio::test]
async fn test_forfeit_threshold() {
    let grace = SessionConfig::default().reveal_grace_secs as i64;

    for elapsed in [0, 1, grace / 2, grace - 1, grace, grace + 1, grace * 10] {
        let table = open_table().await;
        let sealed_a = table.commit(table.alice, Move::Scissors).await;
        table.commit(table.bob, Move::Rock).await;
        table.reveal(table.alice, &sealed_a).await;

        table.clock.advance_secs(elapsed);
        let result = table.store.force_withdraw(table.game_id, table.alice).await;

        if elapsed < grace {
            assert!(
                matches!(result, Err(GameError::TooEarly { .. })),
                "elapsed {elapsed}: {result:?}"
            );
        } else {
            assert!(result.is_ok(), "elapsed {elapsed}: {result:?}");
            assert_eq!(
                table.store.outcome(table.game_id).await.unwrap().winner,
                Some(table.alice)
            );
        }
    }
}

/// Withdrawal without having revealed cannot claim a forfeit
#[tokio::test]
async fn test_non_revealer_cannot_claim_forfeit() {
    let table = open_table().await;

    table.commit(table.alice, Move::Rock).await;
    table.commit(table.bob, Move::Paper).await;
    table.clock.advance_secs(1_000);

    let err = table
        .store
        .force_withdraw(table.game_id, table.bob)
        .await
        .unwrap_err();
    assert_eq!(err, GameError::RevealRequired(table.bob));
}

/// Notifications fire only on the second submission of each pair
#[tokio::test]
async fn test_event_stream() {
    let clock = ManualClock::default();
    let store = SessionStore::with_clock(SessionConfig::default(), Arc::new(clock.clone()));
    let mut rx = store.subscribe();
    let alice = ParticipantId::new();
    let bob = ParticipantId::new();

    let game_id = store.create(alice, bob).await.unwrap();
    assert_eq!(
        drain(&mut rx),
        vec![GameEvent::GameStarted {
            participant_a: alice,
            participant_b: bob,
        }]
    );

    let sealed_b = SealedMove::new(Move::Rock);
    let sealed_a = SealedMove::new(Move::Scissors);
    store
        .submit_commitment(game_id, bob, sealed_b.commitment(&bob))
        .await
        .unwrap();
    assert!(drain(&mut rx).is_empty());

    store
        .submit_commitment(game_id, alice, sealed_a.commitment(&alice))
        .await
        .unwrap();
    assert_eq!(
        drain(&mut rx),
        vec![GameEvent::CommitmentsReceived {
            reveal_deadline: clock.now() + chrono::Duration::seconds(300),
        }]
    );

    store
        .submit_reveal(game_id, bob, sealed_b.mv(), sealed_b.nonce())
        .await
        .unwrap();
    assert!(drain(&mut rx).is_empty());

    // A rejected call publishes nothing
    store
        .submit_reveal(game_id, alice, Move::Paper, sealed_a.nonce())
        .await
        .unwrap_err();
    assert!(drain(&mut rx).is_empty());

    store
        .submit_reveal(game_id, alice, sealed_a.mv(), sealed_a.nonce())
        .await
        .unwrap();
    assert_eq!(
        drain(&mut rx),
        vec![GameEvent::Resolved(Outcome {
            move_a: Move::Scissors,
            move_b: Move::Rock,
            winner: Some(bob),
        })]
    );
}

/// Rejected calls leave the stored record untouched
#[tokio::test]
async fn test_rejections_do_not_mutate() {
    let table = open_table().await;
    let mallory = ParticipantId::new();

    let sealed_a = table.commit(table.alice, Move::Rock).await;
    let before = table.store.snapshot(table.game_id).await.unwrap();

    let stranger = table
        .store
        .submit_commitment(
            table.game_id,
            mallory,
            SealedMove::new(Move::Rock).commitment(&mallory),
        )
        .await;
    assert_eq!(stranger.unwrap_err(), GameError::Unauthorized(mallory));

    let again = table
        .store
        .submit_commitment(table.game_id, table.alice, sealed_a.commitment(&table.alice))
        .await;
    assert_eq!(again.unwrap_err(), GameError::AlreadyCommitted(table.alice));

    let early_reveal = table
        .store
        .submit_reveal(table.game_id, table.alice, sealed_a.mv(), sealed_a.nonce())
        .await;
    assert_eq!(
        early_reveal.unwrap_err(),
        GameError::WrongState(SessionState::AwaitingCommitments)
    );

    assert_eq!(table.store.snapshot(table.game_id).await.unwrap(), before);
}

/// Both participants committing and revealing concurrently still resolves once
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_participants() {
    let table = open_table().await;
    let sealed_a = SealedMove::new(Move::Rock);
    let sealed_b = SealedMove::new(Move::Scissors);

    let commits = [(table.alice, &sealed_a), (table.bob, &sealed_b)].map(|(who, sealed)| {
        let store = Arc::clone(&table.store);
        let game_id = table.game_id;
        let commitment = sealed.commitment(&who);
        tokio::spawn(async move { store.submit_commitment(game_id, who, commitment).await })
    });
    let mut transitions = 0;
    for handle in commits {
        if handle.await.unwrap().unwrap().is_some() {
            transitions += 1;
        }
    }
    assert_eq!(transitions, 1);

    let reveals = [(table.alice, sealed_a), (table.bob, sealed_b)].map(|(who, sealed)| {
        let store = Arc::clone(&table.store);
        let game_id = table.game_id;
        tokio::spawn(async move {
            store
                .submit_reveal(game_id, who, sealed.mv(), sealed.nonce())
                .await
        })
    });
    let mut resolutions = 0;
    for handle in reveals {
        if handle.await.unwrap().unwrap().is_some() {
            resolutions += 1;
        }
    }
    assert_eq!(resolutions, 1);

    let outcome = table.store.outcome(table.game_id).await.unwrap();
    assert_eq!(outcome.winner, Some(table.alice));
}

/// Sessions in one store do not interfere with each other
#[tokio::test]
async fn test_independent_sessions() {
    let first = open_table().await;
    let carol = ParticipantId::new();
    let second = first.store.create(carol, first.alice).await.unwrap();

    first.commit(first.alice, Move::Rock).await;
    first
        .store
        .force_withdraw(second, carol)
        .await
        .unwrap();

    assert_eq!(
        first.store.state(first.game_id).await.unwrap(),
        SessionState::AwaitingCommitments
    );
    assert_eq!(
        first.store.state(second).await.unwrap(),
        SessionState::Abandoned
    );
}
