use std::sync::Arc;

use countup::game::{CountingEngine, GameState, InMemoryGameStateStore, SubmissionOutcome};
use countup::ledger::{InMemoryLedgerRepository, LedgerRepository, ParticipantRecord};
use countup::GameEvent;

mod utils;

use utils::*;

const U1: u64 = 11;
const U2: u64 = 22;
const U3: u64 = 33;

#[tokio::test]
async fn alternating_participants_count_to_five() {
    let setup = TestSetupBuilder::new().build().await;

    for n in 1..=5u32 {
        let participant = if n % 2 == 0 { U2 } else { U1 };
        let submission = setup.send(participant, &n.to_string()).await.unwrap();
        assert!(matches!(
            submission.outcome,
            SubmissionOutcome::Accepted { count, .. } if count == n
        ));
    }

    let state = setup.engine.snapshot().await;
    assert_eq!(state.current_count, 5);
    assert_eq!(state.high_score, 5);
    assert_eq!(state.current_contributor, Some(U1));
    assert_eq!(setup.notifier.reactions().len(), 5);
}

#[tokio::test]
async fn counting_twice_in_a_row_breaks_the_count() {
    let setup = TestSetupBuilder::new().build().await;

    setup.send(U1, "1").await.unwrap();
    let submission = setup.send(U1, "2").await.unwrap();

    assert_eq!(submission.outcome, SubmissionOutcome::WrongContributor);

    let state = setup.engine.snapshot().await;
    assert_eq!(state.current_count, 0);
    assert_eq!(state.current_contributor, None);

    let messages = setup.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains("cannot count two numbers in a row"));

    let record = setup.ledger.get(U1).await.unwrap().unwrap();
    assert_eq!(record.score, 0);
    assert_eq!(record.correct, 1);
    assert_eq!(record.wrong, 1);
}

#[tokio::test]
async fn wrong_number_resets_and_penalizes_once() {
    let setup = TestSetupBuilder::new()
        .with_state(GameState {
            current_count: 5,
            current_contributor: Some(U1),
            high_score: 20,
            ..GameState::default()
        })
        .build()
        .await;

    let submission = setup.send(U3, "7").await.unwrap();

    assert_eq!(
        submission.outcome,
        SubmissionOutcome::WrongNumber { expected: 6 }
    );

    let record = setup.ledger.get(U3).await.unwrap().unwrap();
    assert_eq!(record.score, -1);
    assert_eq!(record.wrong, 1);

    let messages = setup.notifier.messages();
    assert!(messages[0].1.contains("The correct number was 6"));
    assert!(messages[0].1.contains("high score of **20**"));
}

#[tokio::test]
async fn non_submission_text_is_silently_ignored() {
    let setup = TestSetupBuilder::new().build().await;

    let submission = setup.send(U1, "good morning everyone").await.unwrap();

    assert_eq!(submission.outcome, SubmissionOutcome::NotAnAttempt);
    assert_eq!(setup.engine.snapshot().await, GameState::default());
    assert!(setup.notifier.reactions().is_empty());
    assert!(setup.ledger.get(U1).await.unwrap().is_none());
}

#[tokio::test]
async fn arithmetic_expressions_continue_the_count() {
    let setup = TestSetupBuilder::new()
        .with_state(GameState {
            current_count: 3,
            current_contributor: Some(U1),
            high_score: 9,
            ..GameState::default()
        })
        .build()
        .await;

    let submission = setup.send(U2, "2+2").await.unwrap();

    assert!(matches!(
        submission.outcome,
        SubmissionOutcome::Accepted { count: 4, .. }
    ));
}

#[tokio::test]
async fn messages_outside_the_game_channel_are_not_processed() {
    let setup = TestSetupBuilder::new().build().await;

    assert!(setup.send_off_channel(U1, "1").await.is_none());
    assert_eq!(setup.engine.snapshot().await.current_count, 0);
    assert!(setup.notifier.reactions().is_empty());
}

#[tokio::test]
async fn breaking_the_count_moves_the_failed_role() {
    let setup = TestSetupBuilder::new().with_failed_role().build().await;

    // U1 breaks first
    setup.send(U1, "5").await.unwrap();
    assert_eq!(
        setup.notifier.role_changes(),
        vec![RoleChange::Granted(U1, FAILED_ROLE)]
    );

    // then U2 takes over the failed role
    setup.send(U2, "1").await.unwrap();
    setup.send(U2, "99").await.unwrap();
    assert_eq!(
        setup.notifier.role_changes(),
        vec![
            RoleChange::Granted(U1, FAILED_ROLE),
            RoleChange::Revoked(U1, FAILED_ROLE),
            RoleChange::Granted(U2, FAILED_ROLE),
        ]
    );
    assert_eq!(setup.engine.snapshot().await.failed_participant, Some(U2));
}

#[tokio::test]
async fn thirty_correct_submissions_redeem_the_failed_participant() {
    let setup = TestSetupBuilder::new().with_failed_role().build().await;

    for n in 1..=60u32 {
        if n % 2 == 1 {
            setup
                .send_with_roles(U1, &n.to_string(), &[FAILED_ROLE])
                .await
                .unwrap();
        } else {
            setup.send(U2, &n.to_string()).await.unwrap();
        }
    }

    assert_eq!(
        setup.notifier.role_changes(),
        vec![RoleChange::Revoked(U1, FAILED_ROLE)]
    );
    let state = setup.engine.snapshot().await;
    assert_eq!(state.failed_participant, None);
    assert_eq!(state.redemption_progress, 0);
}

#[tokio::test]
async fn a_failure_at_twenty_nine_restarts_redemption() {
    let setup = TestSetupBuilder::new()
        .with_failed_role()
        .with_state(GameState {
            current_count: 10,
            current_contributor: Some(U2),
            high_score: 10,
            failed_participant: Some(U1),
            redemption_progress: 29,
            ..GameState::default()
        })
        .build()
        .await;

    setup
        .send_with_roles(U1, "99", &[FAILED_ROLE])
        .await
        .unwrap();

    // no revoke, only the re-grant for the repeat offender
    assert_eq!(
        setup.notifier.role_changes(),
        vec![RoleChange::Granted(U1, FAILED_ROLE)]
    );
    assert_eq!(setup.engine.snapshot().await.redemption_progress, 0);
}

#[tokio::test]
async fn reliable_role_granted_when_score_reaches_one_hundred() {
    let setup = TestSetupBuilder::new()
        .with_reliable_role()
        .with_record(ParticipantRecord {
            participant_id: U1,
            score: 99,
            correct: 110,
            wrong: 11,
            best_count: 57,
        })
        .build()
        .await;

    setup.send(U1, "1").await.unwrap();

    assert_eq!(
        setup.notifier.role_changes(),
        vec![RoleChange::Granted(U1, RELIABLE_ROLE)]
    );
}

#[tokio::test]
async fn reliable_role_revoked_when_score_stays_short() {
    let setup = TestSetupBuilder::new()
        .with_reliable_role()
        .with_record(ParticipantRecord {
            participant_id: U1,
            score: 98,
            correct: 100,
            wrong: 2,
            best_count: 31,
        })
        .build()
        .await;

    setup
        .send_with_roles(U1, "1", &[RELIABLE_ROLE])
        .await
        .unwrap();

    assert_eq!(
        setup.notifier.role_changes(),
        vec![RoleChange::Revoked(U1, RELIABLE_ROLE)]
    );
}

#[tokio::test]
async fn count_events_reach_bus_subscribers() {
    let setup = TestSetupBuilder::new().build().await;
    let mut receiver = setup.event_bus.subscribe();

    setup.send(U1, "1").await.unwrap();
    setup.send(U2, "5").await.unwrap();

    let first = receiver.recv().await.unwrap();
    assert!(matches!(
        first,
        GameEvent::CountAdvanced {
            participant_id: U1,
            count: 1,
            ..
        }
    ));

    let second = receiver.recv().await.unwrap();
    assert!(matches!(
        second,
        GameEvent::CountBroken {
            participant_id: U2,
            ..
        }
    ));
}

#[tokio::test]
async fn deleting_a_submission_posts_a_notice() {
    let setup = TestSetupBuilder::new()
        .with_state(GameState {
            current_count: 7,
            current_contributor: Some(U1),
            high_score: 7,
            ..GameState::default()
        })
        .build()
        .await;

    let event = setup.chat_event(U1, "7", &[], GAME_CHANNEL);
    let posted = setup.service.handle_message_deleted(&event).await.unwrap();

    assert!(posted);
    let messages = setup.notifier.messages();
    assert!(messages[0].1.contains("deleted their number"));
    assert!(messages[0].1.contains("**8**"));
}

#[tokio::test]
async fn editing_a_non_submission_is_ignored() {
    let setup = TestSetupBuilder::new().build().await;

    let event = setup.chat_event(U1, "brb", &[], GAME_CHANNEL);
    let posted = setup.service.handle_message_edited(&event).await.unwrap();

    assert!(!posted);
    assert!(setup.notifier.messages().is_empty());
}

#[tokio::test]
async fn game_survives_a_restart() {
    let store = Arc::new(InMemoryGameStateStore::new());
    let ledger = Arc::new(InMemoryLedgerRepository::new());

    {
        let engine = CountingEngine::restore(store.clone(), ledger.clone())
            .await
            .unwrap();
        let settings = countup::GameSettings {
            channel_id: Some(GAME_CHANNEL),
            ..countup::GameSettings::default()
        };
        engine.submit(&settings, U1, "1", &[]).await.unwrap();
        engine.submit(&settings, U2, "2", &[]).await.unwrap();
    }

    let engine = CountingEngine::restore(store, ledger).await.unwrap();
    let state = engine.snapshot().await;
    assert_eq!(state.current_count, 2);
    assert_eq!(state.current_contributor, Some(U2));
    assert_eq!(state.high_score, 2);
}

#[tokio::test]
async fn high_score_survives_resets_and_keeps_growing() {
    let setup = TestSetupBuilder::new().build().await;

    setup.send(U1, "1").await.unwrap();
    setup.send(U2, "2").await.unwrap();
    setup.send(U1, "3").await.unwrap();
    setup.send(U2, "9").await.unwrap(); // break at 3

    assert_eq!(setup.engine.snapshot().await.high_score, 3);

    setup.send(U1, "1").await.unwrap();
    setup.send(U2, "2").await.unwrap();

    let state = setup.engine.snapshot().await;
    assert_eq!(state.current_count, 2);
    assert_eq!(state.high_score, 3);
}
