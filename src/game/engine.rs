use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::expr;
use crate::ledger::LedgerRepository;
use crate::settings::GameSettings;
use crate::shared::{AppError, ParticipantId, RoleId};

use super::models::{Submission, SubmissionOutcome};
use super::policy;
use super::state::{GameState, GameStateStore};

/// The single writer over [`GameState`].
///
/// Every submission runs start to finish under one lock — validate, mutate a
/// working copy, persist, commit — so two submissions are never judged
/// against the same stale count. The working copy is only committed to the
/// in-memory state after both the ledger write and the state save succeed;
/// a persistence failure fails the whole call and leaves memory at the last
/// durably written state.
pub struct CountingEngine {
    state: Mutex<GameState>,
    state_store: Arc<dyn GameStateStore>,
    ledger: Arc<dyn LedgerRepository>,
}

impl CountingEngine {
    /// Restore the engine from the last saved state, writing defaults on
    /// first run.
    pub async fn restore(
        state_store: Arc<dyn GameStateStore>,
        ledger: Arc<dyn LedgerRepository>,
    ) -> Result<Self, AppError> {
        let state = match state_store.load().await? {
            Some(state) => {
                info!(
                    count = state.current_count,
                    high_score = state.high_score,
                    "Restored game state"
                );
                state
            }
            None => {
                let state = GameState::default();
                state_store.save(&state).await?;
                info!("Started with a fresh game state");
                state
            }
        };

        Ok(Self {
            state: Mutex::new(state),
            state_store,
            ledger,
        })
    }

    /// Current state, cloned under the submission lock.
    pub async fn snapshot(&self) -> GameState {
        self.state.lock().await.clone()
    }

    /// Judge one candidate submission and apply its consequences.
    #[instrument(skip(self, settings, text, member_roles))]
    pub async fn submit(
        &self,
        settings: &GameSettings,
        participant: ParticipantId,
        text: &str,
        member_roles: &[RoleId],
    ) -> Result<Submission, AppError> {
        let Some(value) = expr::evaluate(text) else {
            return Ok(Submission::ignored());
        };

        let mut state = self.state.lock().await;
        let record = self.ledger.ensure(participant).await?;
        let expected = state.next_expected();

        // Wrong number
        if value != i64::from(expected) {
            let mut next = state.clone();
            let directives = policy::apply_failure(settings, &mut next, participant);
            self.ledger.record_wrong(participant).await?;
            self.state_store.save(&next).await?;
            *state = next;

            info!(participant, value, expected, "Count broken: wrong number");
            return Ok(Submission {
                outcome: SubmissionOutcome::WrongNumber { expected },
                directives,
            });
        }

        // Wrong contributor: no counting twice in a row
        if state.current_count > 0 && state.current_contributor == Some(participant) {
            let mut next = state.clone();
            let directives = policy::apply_failure(settings, &mut next, participant);
            self.ledger.record_wrong(participant).await?;
            self.state_store.save(&next).await?;
            *state = next;

            info!(participant, "Count broken: counted twice in a row");
            return Ok(Submission {
                outcome: SubmissionOutcome::WrongContributor,
                directives,
            });
        }

        // Accept
        let mut next = state.clone();
        let emoji = next.record_accepted(participant);

        let mut directives = Vec::new();
        if let Some(directive) =
            policy::apply_redemption(settings, &mut next, participant, member_roles)
        {
            directives.push(directive);
        }
        let updated_score = record.score + 1;
        if let Some(directive) =
            policy::reliable_directive(settings, participant, updated_score, member_roles)
        {
            directives.push(directive);
        }

        self.ledger
            .record_correct(participant, next.current_count)
            .await?;
        self.state_store.save(&next).await?;
        *state = next;

        debug!(participant, count = state.current_count, emoji, "Count advanced");
        Ok(Submission {
            outcome: SubmissionOutcome::Accepted {
                count: state.current_count,
                emoji: emoji.to_string(),
            },
            directives,
        })
    }
}
