//! End-to-end session tests against a real SQLite store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sqlx::SqlitePool;

use geowolf_core::error::GameError;
use geowolf_core::geo::Position;
use geowolf_core::model::{MeetingTrigger, Mission, Role, VoteAction};
use geowolf_core::rng::GameRng;
use geowolf_game::config::GameConfig;
use geowolf_game::{AssignReason, GameSession};
use geowolf_store::SessionStore;
use geowolf_test_support::{FixedClock, MockRng, SequenceRng};

fn catalog(count: i64) -> Vec<Mission> {
    (1..=count)
        .map(|id| Mission {
            id,
            name: format!("mission {id}"),
            place: format!("place {id}"),
            position: Position {
                lat: 0.001 * id as f64,
                lng: 0.0,
            },
        })
        .collect()
}

fn session_with(
    pool: SqlitePool,
    missions: Vec<Mission>,
    rng: Box<dyn GameRng>,
) -> Arc<GameSession> {
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()));
    GameSession::new(
        SessionStore::new(pool),
        missions,
        clock,
        rng,
        GameConfig::default(),
    )
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_registration_assigns_three_distinct_missions(pool: SqlitePool) {
    let session = session_with(pool, catalog(5), Box::new(MockRng));

    let (player_id, task_ids) = session
        .register_player("dev-a", "Alice", "#ff0000")
        .await
        .unwrap();
    assert_eq!(task_ids.len(), 3);

    let tasks = session.tasks_for("dev-a").await.unwrap();
    assert_eq!(tasks.len(), 3);
    let mut mission_ids: Vec<i64> = tasks.iter().map(|t| t.mission_id).collect();
    mission_ids.sort_unstable();
    mission_ids.dedup();
    assert_eq!(mission_ids.len(), 3, "missions must be distinct");
    assert!(tasks.iter().all(|t| t.player_id == player_id));

    // Deadlines come from the injected clock plus the configured window.
    let expected = Utc.with_ymd_and_hms(2025, 6, 1, 13, 30, 0).unwrap();
    assert!(tasks.iter().all(|t| t.deadline == expected));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_reregistration_is_idempotent(pool: SqlitePool) {
    let session = session_with(pool, catalog(5), Box::new(MockRng));

    let (first_id, first_tasks) = session
        .register_player("dev-a", "Alice", "#ff0000")
        .await
        .unwrap();
    let (second_id, second_tasks) = session
        .register_player("dev-a", "Alice again", "#00ff00")
        .await
        .unwrap();

    assert_eq!(first_id, second_id);
    assert_eq!(first_tasks.len(), 3);
    assert!(second_tasks.is_empty(), "no new batch on re-register");
    assert_eq!(session.tasks_for("dev-a").await.unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_registration_rejects_blank_fields(pool: SqlitePool) {
    let session = session_with(pool, catalog(5), Box::new(MockRng));
    let err = session.register_player("dev-a", "  ", "#fff").await.unwrap_err();
    assert!(matches!(err, GameError::Validation(_)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_roster_promotes_exactly_one_saboteur(pool: SqlitePool) {
    let session = session_with(pool, Vec::new(), Box::new(MockRng));
    session.register_player("dev-a", "Alice", "#f00").await.unwrap();
    session.register_player("dev-b", "Bob", "#0f0").await.unwrap();
    session.register_player("dev-c", "Carol", "#00f").await.unwrap();

    let roster = session.roster().await.unwrap();
    let saboteurs: Vec<_> = roster.iter().filter(|p| p.role == Role::Saboteur).collect();
    assert_eq!(saboteurs.len(), 1);

    // A second read keeps the assignment stable.
    let roster = session.roster().await.unwrap();
    assert_eq!(
        roster.iter().filter(|p| p.role == Role::Saboteur).count(),
        1
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_kill_validation_order(pool: SqlitePool) {
    let session = session_with(pool, Vec::new(), Box::new(MockRng));
    session.register_player("killer", "Mallory", "#000").await.unwrap();
    session.register_player("victim", "Alice", "#fff").await.unwrap();
    session.register_player("accomplice", "Eve", "#333").await.unwrap();

    // Villagers cannot kill at all.
    let err = session.attempt_kill("killer", "victim").await.unwrap_err();
    assert!(matches!(err, GameError::Forbidden(_)));

    session.store().set_role("killer", Role::Saboteur).await.unwrap();
    session.store().set_role("accomplice", Role::Saboteur).await.unwrap();

    let err = session.attempt_kill("killer", "ghost").await.unwrap_err();
    assert!(matches!(err, GameError::NotFound(_)));

    let err = session.attempt_kill("killer", "killer").await.unwrap_err();
    assert!(matches!(err, GameError::Validation(_)));

    // Saboteurs cannot kill each other.
    let err = session.attempt_kill("killer", "accomplice").await.unwrap_err();
    assert!(matches!(err, GameError::Forbidden(_)));

    let name = session.attempt_kill("killer", "victim").await.unwrap();
    assert_eq!(name, "Alice");

    let victim = session.player("victim").await.unwrap();
    assert!(!victim.alive);

    // The body names the killer.
    let bodies = session.store().all_bodies().await.unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].victim_name, "Alice");
    assert_eq!(bodies[0].killer_name.as_deref(), Some("Mallory"));

    // Repeat kill on a dead target is rejected and records nothing.
    let err = session.attempt_kill("killer", "victim").await.unwrap_err();
    assert!(matches!(err, GameError::Conflict(_)));
    assert_eq!(session.store().all_bodies().await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_kill_rejected_during_meeting(pool: SqlitePool) {
    let session = session_with(pool, Vec::new(), Box::new(MockRng));
    session.register_player("killer", "Mallory", "#000").await.unwrap();
    session.register_player("victim", "Alice", "#fff").await.unwrap();
    session.store().set_role("killer", Role::Saboteur).await.unwrap();

    session.start_meeting(60, MeetingTrigger::Manual).await.unwrap();

    let err = session.attempt_kill("killer", "victim").await.unwrap_err();
    assert!(matches!(err, GameError::Conflict(_)));
    assert!(session.player("victim").await.unwrap().alive);

    session.end_meeting().await.unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_meeting_start_is_idempotent(pool: SqlitePool) {
    let session = session_with(pool, Vec::new(), Box::new(MockRng));

    assert!(session.start_meeting(300, MeetingTrigger::Manual).await.unwrap());
    assert!(!session.start_meeting(60, MeetingTrigger::Auto).await.unwrap());

    // The running meeting keeps its original parameters.
    let state = session.meeting_status().await.unwrap();
    assert!(state.active);
    assert_eq!(state.duration_secs, 300);
    assert_eq!(state.trigger, Some(MeetingTrigger::Manual));

    session.end_meeting().await.unwrap();
    assert!(!session.meeting_status().await.unwrap().active);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_end_without_active_meeting_is_none(pool: SqlitePool) {
    let session = session_with(pool, Vec::new(), Box::new(MockRng));
    assert!(session.end_meeting().await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_vote_tally_and_tie_break_execution(pool: SqlitePool) {
    // The only scripted draw is the tie-break between the two leaders.
    let session = session_with(pool, Vec::new(), Box::new(SequenceRng::new(vec![1])));
    session.register_player("dev-a", "Alice", "#f00").await.unwrap();
    session.register_player("dev-b", "Bob", "#0f0").await.unwrap();

    session.start_meeting(300, MeetingTrigger::Manual).await.unwrap();

    assert_eq!(
        session.cast_vote("dev-a", "dev-b").await.unwrap(),
        VoteAction::Created
    );
    assert_eq!(
        session.cast_vote("dev-b", "dev-a").await.unwrap(),
        VoteAction::Created
    );

    // Re-voting the same target is a conflict; switching targets updates.
    let err = session.cast_vote("dev-a", "dev-b").await.unwrap_err();
    assert!(matches!(err, GameError::Conflict(_)));

    let outcome = session.end_meeting().await.unwrap().unwrap();
    let executed = outcome.executed.unwrap();
    // Leaders tie at one vote each, ordered Alice then Bob; index 1 picks Bob.
    assert_eq!(executed.name, "Bob");
    assert!(!session.player("dev-b").await.unwrap().alive);
    assert!(session.player("dev-a").await.unwrap().alive);

    // Votes are cleared and the meeting row is idle.
    assert!(session.store().vote_counts().await.unwrap().is_empty());
    assert!(!session.meeting_status().await.unwrap().active);
    // Execution produced a body with no killer.
    let bodies = session.store().all_bodies().await.unwrap();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].killer_name.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_dead_vote_leader_is_not_reported_executed(pool: SqlitePool) {
    let session = session_with(pool, Vec::new(), Box::new(MockRng));
    session.register_player("dev-a", "Alice", "#f00").await.unwrap();
    session.register_player("dev-b", "Bob", "#0f0").await.unwrap();
    session.register_player("dev-c", "Carol", "#00f").await.unwrap();

    session.start_meeting(300, MeetingTrigger::Manual).await.unwrap();
    session.cast_vote("dev-a", "dev-b").await.unwrap();
    session.cast_vote("dev-c", "dev-b").await.unwrap();

    // The leader dies mid-meeting; resolution must not re-execute the
    // corpse or report an execution.
    session.set_alive("dev-b", false).await.unwrap();

    let outcome = session.end_meeting().await.unwrap().unwrap();
    assert!(outcome.executed.is_none());
    // Only the mid-meeting death left a body.
    assert_eq!(session.store().all_bodies().await.unwrap().len(), 1);
    assert!(session.store().vote_counts().await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_vote_switch_updates(pool: SqlitePool) {
    let session = session_with(pool, Vec::new(), Box::new(MockRng));
    session.register_player("dev-a", "Alice", "#f00").await.unwrap();
    session.register_player("dev-b", "Bob", "#0f0").await.unwrap();
    session.register_player("dev-c", "Carol", "#00f").await.unwrap();

    assert_eq!(
        session.cast_vote("dev-a", "dev-b").await.unwrap(),
        VoteAction::Created
    );
    assert_eq!(
        session.cast_vote("dev-a", "dev-c").await.unwrap(),
        VoteAction::Updated
    );

    let counts = session.store().vote_counts().await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].name, "Carol");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_report_opens_meeting(pool: SqlitePool) {
    let session = session_with(pool, Vec::new(), Box::new(MockRng));
    session.register_player("dev-a", "Alice", "#f00").await.unwrap();
    session.register_player("dev-b", "Bob", "#0f0").await.unwrap();

    session.submit_report("dev-a", Some("dev-b")).await.unwrap();

    let state = session.meeting_status().await.unwrap();
    assert!(state.active);
    assert_eq!(state.trigger, Some(MeetingTrigger::Report));
    assert_eq!(state.duration_secs, 300);

    let reports = session.store().all_reports().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].reporter_name, "Alice");
    assert_eq!(reports[0].reported_name.as_deref(), Some("Bob"));

    session.end_meeting().await.unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_chat_recipients_are_proximity_gated(pool: SqlitePool) {
    let session = session_with(pool, Vec::new(), Box::new(MockRng));
    session.register_player("sender", "Alice", "#f00").await.unwrap();
    session.register_player("near", "Bob", "#0f0").await.unwrap();
    session.register_player("far", "Carol", "#00f").await.unwrap();

    // ~11 m north of the sender: inside the 30 m default radius.
    session
        .update_position("near", Position { lat: 0.0001, lng: 0.0 })
        .await
        .unwrap();
    // ~1.1 km north: well outside.
    session
        .update_position("far", Position { lat: 0.01, lng: 0.0 })
        .await
        .unwrap();

    session.send_chat("sender", "anyone here?", None).await.unwrap();

    assert_eq!(session.messages_for("near").await.unwrap().len(), 1);
    assert!(session.messages_for("far").await.unwrap().is_empty());

    // The recipient set is frozen at send time: moving closer afterwards
    // does not backfill history.
    session
        .update_position("far", Position { lat: 0.0, lng: 0.0 })
        .await
        .unwrap();
    assert!(session.messages_for("far").await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_meeting_chat_is_unbounded(pool: SqlitePool) {
    let session = session_with(pool, Vec::new(), Box::new(MockRng));
    session.register_player("sender", "Alice", "#f00").await.unwrap();
    session.register_player("far", "Carol", "#00f").await.unwrap();
    session
        .update_position("far", Position { lat: 0.01, lng: 0.0 })
        .await
        .unwrap();

    session.start_meeting(300, MeetingTrigger::Manual).await.unwrap();
    session.send_chat("sender", "it was Carol", None).await.unwrap();
    session.end_meeting().await.unwrap();

    assert_eq!(session.messages_for("far").await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_task_completion_requires_matching_code(pool: SqlitePool) {
    let session = session_with(pool, catalog(5), Box::new(MockRng));
    session.register_player("dev-a", "Alice", "#f00").await.unwrap();
    let task = session.tasks_for("dev-a").await.unwrap().remove(0);

    let err = session.complete_task(task.id, true, None).await.unwrap_err();
    assert!(matches!(err, GameError::Validation(_)));

    let err = session
        .complete_task(task.id, true, Some("999"))
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::Validation(_)));

    let code = task.mission_id.to_string();
    let done = session
        .complete_task(task.id, true, Some(&code))
        .await
        .unwrap();
    assert!(done.done);

    // Completing an already-done task is a no-op success, even without a code.
    let again = session.complete_task(task.id, true, None).await.unwrap();
    assert!(again.done);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_expired_task_is_replaced_with_one(pool: SqlitePool) {
    let session = session_with(pool.clone(), catalog(5), Box::new(MockRng));
    session.register_player("dev-a", "Alice", "#f00").await.unwrap();
    let before = session.tasks_for("dev-a").await.unwrap();
    assert_eq!(before.len(), 3);

    // Pull one deadline into the past.
    sqlx::query("UPDATE tasks SET deadline = '2020-01-01 00:00:00+00:00' WHERE id = ?")
        .bind(before[0].id)
        .execute(&pool)
        .await
        .unwrap();

    let expired = session.expire_due_tasks().await.unwrap();
    assert_eq!(expired, 1);

    let after = session.tasks_for("dev-a").await.unwrap();
    assert_eq!(after.len(), 3);
    assert!(after.iter().all(|t| t.id != before[0].id));
    // The replacement draws from missions the player does not already hold.
    let mut mission_ids: Vec<i64> = after.iter().map(|t| t.mission_id).collect();
    mission_ids.sort_unstable();
    mission_ids.dedup();
    assert_eq!(mission_ids.len(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_set_alive_death_records_single_body(pool: SqlitePool) {
    let session = session_with(pool, Vec::new(), Box::new(MockRng));
    session.register_player("dev-a", "Alice", "#f00").await.unwrap();

    session.set_alive("dev-a", false).await.unwrap();
    session.set_alive("dev-a", false).await.unwrap();

    assert!(!session.player("dev-a").await.unwrap().alive);
    assert_eq!(session.store().all_bodies().await.unwrap().len(), 1);

    session.set_alive("dev-a", true).await.unwrap();
    assert!(session.player("dev-a").await.unwrap().alive);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_replacement_batch_uses_time_expired_count(pool: SqlitePool) {
    let session = session_with(pool, catalog(5), Box::new(MockRng));
    session.register_player("dev-a", "Alice", "#f00").await.unwrap();

    let ids = session
        .assign_tasks("dev-a", AssignReason::TimeExpired)
        .await
        .unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(session.tasks_for("dev-a").await.unwrap().len(), 4);
}
