//! The per-match commit-reveal state machine.
//!
//! A [`GameSession`] is driven entirely by its two participants. Every
//! operation checks all of its preconditions before touching any field, so a
//! rejected call never leaves a half-applied change behind.

use crate::config::SessionConfig;
use crate::crypto::{Commitment, Nonce};
use crate::error::{GameError, Result};
use crate::games::{judge, Move};
use crate::protocol::{GameEvent, Outcome, ParticipantId, Player, SessionState};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One match between two registered participants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    participant_a: ParticipantId,
    participant_b: ParticipantId,
    state: SessionState,
    commitment_a: Option<Commitment>,
    commitment_b: Option<Commitment>,
    move_a: Move,
    move_b: Move,
    reveal_grace_secs: u32,
    reveal_deadline: Option<DateTime<Utc>>,
    winner: Option<ParticipantId>,
}

impl GameSession {
    /// Open a session. `creator` takes seat A.
    pub fn new(
        creator: ParticipantId,
        opponent: ParticipantId,
        config: &SessionConfig,
    ) -> Result<Self> {
        if creator == opponent {
            return Err(GameError::DuplicateParticipant(creator));
        }

        Ok(Self {
            participant_a: creator,
            participant_b: opponent,
            state: SessionState::AwaitingCommitments,
            commitment_a: None,
            commitment_b: None,
            move_a: Move::NoMove,
            move_b: Move::NoMove,
            reveal_grace_secs: config.reveal_grace_secs,
            reveal_deadline: None,
            winner: None,
        })
    }

    /// The notification announcing this session
    pub fn started_event(&self) -> GameEvent {
        GameEvent::GameStarted {
            participant_a: self.participant_a,
            participant_b: self.participant_b,
        }
    }

    pub fn participant_a(&self) -> ParticipantId {
        self.participant_a
    }

    pub fn participant_b(&self) -> ParticipantId {
        self.participant_b
    }

    pub fn participant(&self, seat: Player) -> ParticipantId {
        match seat {
            Player::A => self.participant_a,
            Player::B => self.participant_b,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Seat held by `participant`, if registered
    pub fn seat_of(&self, participant: &ParticipantId) -> Option<Player> {
        if *participant == self.participant_a {
            Some(Player::A)
        } else if *participant == self.participant_b {
            Some(Player::B)
        } else {
            None
        }
    }

    pub fn commitment(&self, seat: Player) -> Option<&Commitment> {
        match seat {
            Player::A => self.commitment_a.as_ref(),
            Player::B => self.commitment_b.as_ref(),
        }
    }

    /// Revealed move for a seat; `Move::NoMove` until revealed
    pub fn revealed_move(&self, seat: Player) -> Move {
        match seat {
            Player::A => self.move_a,
            Player::B => self.move_b,
        }
    }

    pub fn has_revealed(&self, seat: Player) -> bool {
        !self.revealed_move(seat).is_none()
    }

    /// Instant from which a revealed participant may claim a forfeit
    pub fn reveal_deadline(&self) -> Option<DateTime<Utc>> {
        self.reveal_deadline
    }

    pub fn winner(&self) -> Option<ParticipantId> {
        self.winner
    }

    /// Record `caller`'s commitment.
    ///
    /// The second commitment moves the session to `AwaitingReveals` and
    /// stamps the reveal deadline from `now`.
    pub fn submit_commitment(
        &mut self,
        caller: ParticipantId,
        commitment: Commitment,
        now: DateTime<Utc>,
    ) -> Result<Option<GameEvent>> {
        self.require_state(SessionState::AwaitingCommitments)?;
        let seat = self.require_seat(&caller)?;
        if self.commitment(seat).is_some() {
            return Err(GameError::AlreadyCommitted(caller));
        }

        match seat {
            Player::A => self.commitment_a = Some(commitment),
            Player::B => self.commitment_b = Some(commitment),
        }

        if self.commitment(seat.opponent()).is_none() {
            return Ok(None);
        }

        let reveal_deadline = now + Duration::seconds(i64::from(self.reveal_grace_secs));
        self.reveal_deadline = Some(reveal_deadline);
        self.transition_to(SessionState::AwaitingReveals);
        Ok(Some(GameEvent::CommitmentsReceived { reveal_deadline }))
    }

    /// Open `caller`'s commitment with `mv` and `nonce`.
    ///
    /// The second reveal resolves the session.
    pub fn submit_reveal(
        &mut self,
        caller: ParticipantId,
        mv: Move,
        nonce: &Nonce,
    ) -> Result<Option<GameEvent>> {
        self.require_state(SessionState::AwaitingReveals)?;
        let seat = self.require_seat(&caller)?;
        if self.has_revealed(seat) {
            return Err(GameError::AlreadyRevealed(caller));
        }
        if mv.is_none() {
            return Err(GameError::InvalidMove(mv.code()));
        }

        let opens = self
            .commitment(seat)
            .is_some_and(|commitment| commitment.verify(mv, nonce, &caller));
        if !opens {
            return Err(GameError::RevealMismatch(caller));
        }

        match seat {
            Player::A => self.move_a = mv,
            Player::B => self.move_b = mv,
        }

        if !self.has_revealed(seat.opponent()) {
            return Ok(None);
        }

        Ok(Some(GameEvent::Resolved(self.resolve())))
    }

    /// Leave the session early or claim a forfeit.
    ///
    /// Before both commitments are in, either participant may abandon the
    /// session. Once reveals are open, only a participant who has revealed
    /// may call this, and only from the reveal deadline on; the silent
    /// opponent then forfeits.
    pub fn force_withdraw(
        &mut self,
        caller: ParticipantId,
        now: DateTime<Utc>,
    ) -> Result<GameEvent> {
        match self.state {
            SessionState::AwaitingCommitments => {
                self.require_seat(&caller)?;
                self.transition_to(SessionState::Abandoned);
                Ok(GameEvent::Withdrawn { by: caller })
            }
            SessionState::AwaitingReveals => {
                let seat = self.require_seat(&caller)?;
                if !self.has_revealed(seat) {
                    return Err(GameError::RevealRequired(caller));
                }
                // Stamped together with the AwaitingReveals transition
                let Some(deadline) = self.reveal_deadline else {
                    return Err(GameError::WrongState(self.state));
                };
                if now < deadline {
                    return Err(GameError::TooEarly { deadline });
                }

                // The opponent's move is still NoMove, which judge treats as a forfeit
                Ok(GameEvent::Resolved(self.resolve()))
            }
            state => Err(GameError::WrongState(state)),
        }
    }

    /// Both moves and the winner; only available once resolved
    pub fn outcome(&self) -> Result<Outcome> {
        self.require_state(SessionState::Resolved)?;
        Ok(self.current_outcome())
    }

    fn resolve(&mut self) -> Outcome {
        let result = judge(self.move_a, self.move_b);
        self.winner = result.winner().map(|seat| self.participant(seat));
        self.transition_to(SessionState::Resolved);
        self.current_outcome()
    }

    fn transition_to(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
    }

    fn current_outcome(&self) -> Outcome {
        Outcome {
            move_a: self.move_a,
            move_b: self.move_b,
            winner: self.winner,
        }
    }

    fn require_state(&self, expected: SessionState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GameError::WrongState(self.state))
        }
    }

    fn require_seat(&self, caller: &ParticipantId) -> Result<Player> {
        self.seat_of(caller)
            .ok_or(GameError::Unauthorized(*caller))
    }
}
