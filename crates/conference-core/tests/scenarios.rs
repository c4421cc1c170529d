//! Join/leave scenarios against a single conference

mod common;

use std::sync::Arc;

use common::{ids, Harness, MediaCall};
use pretty_assertions::assert_eq;
use rvoip_conference_core::{
    ConferenceConfig, ConferenceError, ConferenceEvent, ConferenceNotification, ConferenceStateId,
    DemotionPolicy, Membership, Participant, ParticipantId, Prompt, UserProfile,
};

#[tokio::test]
async fn test_first_unmarked_join_goes_single() {
    let h = Harness::new();
    let mut p1 = Participant::with_id("p1", UserProfile::unmarked());

    let outcome = h.conference.join(&mut p1).await.unwrap();

    assert_eq!(outcome.previous_state, ConferenceStateId::Empty);
    assert_eq!(outcome.state, ConferenceStateId::Single);
    let snapshot = h.conference.snapshot().await;
    assert_eq!(snapshot.active, ids(&["p1"]));
    assert!(snapshot.waiting.is_empty());
    assert_eq!(snapshot.marked_count, 0);

    assert_eq!(
        h.media.calls(),
        vec![
            MediaCall::Admit(ParticipantId::from("p1")),
            MediaCall::Prompt(ParticipantId::from("p1"), Prompt::OnlyPerson),
        ]
    );
    assert_eq!(h.sink.state_changes(), vec![(ConferenceStateId::Empty, ConferenceStateId::Single)]);
    assert!(h.sink.notifications().contains(&ConferenceNotification::ConferenceStarted {
        conference: "test-conf".to_string()
    }));
}

#[tokio::test]
async fn test_marked_join_into_single_goes_multi_marked() {
    let h = Harness::new();
    let mut p1 = Participant::with_id("p1", UserProfile::unmarked());
    let mut p2 = Participant::with_id("p2", UserProfile::marked());
    h.conference.join(&mut p1).await.unwrap();

    let outcome = h.conference.join(&mut p2).await.unwrap();

    assert_eq!(outcome.state, ConferenceStateId::MultiMarked);
    let snapshot = h.conference.snapshot().await;
    assert_eq!(snapshot.marked_count, 1);
    assert_eq!(snapshot.active, ids(&["p1", "p2"]));
    assert_eq!(snapshot.state, ConferenceStateId::for_counts(1, 2, 0));
}

#[tokio::test]
async fn test_second_live_participant_ends_solo_treatment() {
    let h = Harness::new();
    let mut m = Participant::with_id("m", UserProfile::marked());
    let mut u1 = Participant::with_id("u1", UserProfile::unmarked());
    let mut u2 = Participant::with_id("u2", UserProfile::unmarked());
    h.conference.join(&mut m).await.unwrap();
    h.reset_recordings();

    h.conference.join(&mut u1).await.unwrap();
    assert_eq!(
        h.media.take(),
        vec![MediaCall::Admit(ParticipantId::from("u1")), MediaCall::SecondActive(ParticipantId::from("m"))]
    );

    // A third live participant changes nothing for the others
    h.conference.join(&mut u2).await.unwrap();
    assert_eq!(h.media.take(), vec![MediaCall::Admit(ParticipantId::from("u2"))]);
}

#[tokio::test]
async fn test_waiting_join_does_not_end_solo_treatment() {
    let h = Harness::new();
    let mut u1 = Participant::with_id("u1", UserProfile::unmarked());
    let mut w1 = Participant::with_id("w1", UserProfile::wait_marked());
    h.conference.join(&mut u1).await.unwrap();
    h.reset_recordings();

    h.conference.join(&mut w1).await.unwrap();
    assert!(!h.media.calls().iter().any(|call| matches!(call, MediaCall::SecondActive(_))));
}

async fn multi_marked_with(h: &Harness, profile: UserProfile) -> (Participant, Participant, Participant) {
    let mut m = Participant::with_id("m", UserProfile::marked());
    let mut u1 = Participant::with_id("u1", profile);
    let mut u2 = Participant::with_id("u2", profile);
    h.conference.join(&mut m).await.unwrap();
    h.conference.join(&mut u1).await.unwrap();
    h.conference.join(&mut u2).await.unwrap();
    assert_eq!(h.conference.state(), ConferenceStateId::MultiMarked);
    h.reset_recordings();
    (m, u1, u2)
}

#[tokio::test]
async fn test_marked_leave_keeps_unmarked_live() {
    let h = Harness::new();
    let (mut m, _u1, _u2) = multi_marked_with(&h, UserProfile::unmarked()).await;

    let outcome = h.conference.leave(&mut m).await.unwrap();

    assert_eq!(outcome.state, ConferenceStateId::Multi);
    let snapshot = h.conference.snapshot().await;
    assert_eq!(snapshot.marked_count, 0);
    assert_eq!(snapshot.active, ids(&["u1", "u2"]));
    assert!(h.media.waits().is_empty());
    assert!(h.media.calls().contains(&MediaCall::Announce(Prompt::LeaderHasLeft)));
}

#[tokio::test]
async fn test_marked_leave_parks_wait_marked() {
    let h = Harness::new();
    let (mut m, u1, u2) = multi_marked_with(&h, UserProfile::wait_marked()).await;

    let outcome = h.conference.leave(&mut m).await.unwrap();

    assert_eq!(outcome.state, ConferenceStateId::Inactive);
    let snapshot = h.conference.snapshot().await;
    assert_eq!(snapshot.marked_count, 0);
    assert!(snapshot.active.is_empty());
    assert_eq!(snapshot.waiting, ids(&["u1", "u2"]));
    // Each parked participant gets waiting treatment exactly once
    assert_eq!(h.media.waits(), ids(&["u1", "u2"]));
    assert_eq!(h.conference.membership_of(u1.id()).await, Some(Membership::Waiting));
    assert_eq!(h.conference.membership_of(u2.id()).await, Some(Membership::Waiting));
}

#[tokio::test]
async fn test_keep_active_policy_only_gates_new_joins() {
    let h = Harness::with_config(ConferenceConfig::default().with_demotion_policy(DemotionPolicy::KeepActive));
    let (mut m, _u1, _u2) = multi_marked_with(&h, UserProfile::wait_marked()).await;

    let outcome = h.conference.leave(&mut m).await.unwrap();
    assert_eq!(outcome.state, ConferenceStateId::Multi);
    assert!(h.media.waits().is_empty());

    let mut w3 = Participant::with_id("w3", UserProfile::wait_marked());
    let outcome = h.conference.join(&mut w3).await.unwrap();
    assert_eq!(outcome.membership, Membership::Waiting);
    assert_eq!(outcome.state, ConferenceStateId::Multi);
    assert_eq!(h.media.waits(), ids(&["w3"]));
}

#[tokio::test]
async fn test_leave_of_unattached_participant() {
    let h = Harness::new();
    let mut p1 = Participant::with_id("p1", UserProfile::unmarked());
    h.conference.join(&mut p1).await.unwrap();
    let before = h.conference.snapshot().await;

    let mut ghost = Participant::with_id("ghost", UserProfile::unmarked());
    let err = h.conference.leave(&mut ghost).await.unwrap_err();

    assert_eq!(
        err,
        ConferenceError::NotAttached {
            conference: "test-conf".to_string(),
            participant: ParticipantId::from("ghost"),
        }
    );
    assert!(err.is_recoverable());
    assert_eq!(h.conference.snapshot().await, before);
    assert!(ghost.pending_actions().is_empty());
    assert_eq!(ghost.membership(), Membership::Attaching);
}

#[tokio::test]
async fn test_leave_of_unattached_participant_in_state_without_leave_handler() {
    let h = Harness::new();
    let mut m1 = Participant::with_id("m1", UserProfile::marked());
    h.conference.join(&mut m1).await.unwrap();
    assert_eq!(h.conference.state(), ConferenceStateId::SingleMarked);
    let before = h.conference.snapshot().await;

    // SINGLE_MARKED only handles the marked leave, so a plain leave never
    // reaches the registry
    let mut ghost = Participant::with_id("ghost", UserProfile::unmarked());
    let err = h.conference.leave(&mut ghost).await.unwrap_err();
    assert_eq!(
        err,
        ConferenceError::InvalidEvent {
            conference: "test-conf".to_string(),
            participant: ParticipantId::from("ghost"),
            event: ConferenceEvent::Leave,
            state: ConferenceStateId::SingleMarked,
        }
    );
    assert_eq!(h.sink.invalid_events(), 1);

    // A handled leave from someone not attached is NotAttached
    let mut marked_ghost = Participant::with_id("marked-ghost", UserProfile::marked());
    let err = h.conference.leave(&mut marked_ghost).await.unwrap_err();
    assert!(matches!(err, ConferenceError::NotAttached { .. }));

    assert_eq!(h.conference.snapshot().await, before);
    assert!(ghost.pending_actions().is_empty());
    assert!(marked_ghost.pending_actions().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_on_empty_conference() {
    for round in 0..50 {
        let h = Harness::new();
        let profiles = if round % 2 == 0 {
            [UserProfile::unmarked(), UserProfile::unmarked()]
        } else {
            [UserProfile::unmarked(), UserProfile::marked()]
        };

        let mut handles = Vec::new();
        for (i, profile) in profiles.into_iter().enumerate() {
            let conference = Arc::clone(&h.conference);
            handles.push(tokio::spawn(async move {
                let mut p = Participant::with_id(format!("p{}", i), profile);
                conference.join(&mut p).await.unwrap()
            }));
        }

        let mut outcomes = Vec::new();
        for handle in futures::future::join_all(handles).await {
            outcomes.push(handle.unwrap());
        }
        outcomes.sort_by_key(|o| o.sequence);

        assert_eq!(outcomes[0].sequence, 1);
        assert_eq!(outcomes[1].sequence, 2);
        assert_eq!(outcomes[0].previous_state, ConferenceStateId::Empty);
        assert_eq!(outcomes[1].previous_state, outcomes[0].state);

        let snapshot = h.conference.snapshot().await;
        assert_eq!(snapshot.state, snapshot.expected_state());
        if round % 2 == 0 {
            assert_eq!(outcomes[0].state, ConferenceStateId::Single);
            assert_eq!(outcomes[1].state, ConferenceStateId::Multi);
        } else {
            assert!(outcomes[0].state == ConferenceStateId::Single || outcomes[0].state == ConferenceStateId::SingleMarked);
            assert_eq!(outcomes[1].state, ConferenceStateId::MultiMarked);
        }
    }
}

#[tokio::test]
async fn test_last_leave_ends_conference() {
    let h = Harness::new();
    let mut p1 = Participant::with_id("p1", UserProfile::unmarked());
    let mut p2 = Participant::with_id("p2", UserProfile::unmarked());
    h.conference.join(&mut p1).await.unwrap();
    h.conference.join(&mut p2).await.unwrap();

    assert_eq!(h.conference.leave(&mut p1).await.unwrap().state, ConferenceStateId::Single);
    assert_eq!(h.conference.leave(&mut p2).await.unwrap().state, ConferenceStateId::Empty);
    assert!(h.conference.is_empty());
    assert_eq!(
        h.sink.state_changes(),
        vec![
            (ConferenceStateId::Empty, ConferenceStateId::Single),
            (ConferenceStateId::Single, ConferenceStateId::Multi),
            (ConferenceStateId::Multi, ConferenceStateId::Single),
            (ConferenceStateId::Single, ConferenceStateId::Empty),
        ]
    );
    assert!(h.sink.notifications().contains(&ConferenceNotification::ConferenceEnded {
        conference: "test-conf".to_string()
    }));
}

#[tokio::test]
async fn test_wait_marked_waits_for_leader() {
    let h = Harness::new();
    let mut w1 = Participant::with_id("w1", UserProfile::wait_marked());
    let mut w2 = Participant::with_id("w2", UserProfile::wait_marked().with_quiet());
    let mut leader = Participant::with_id("leader", UserProfile::marked());

    let outcome = h.conference.join(&mut w1).await.unwrap();
    assert_eq!(outcome.state, ConferenceStateId::Inactive);
    assert_eq!(w1.membership(), Membership::Waiting);
    h.conference.join(&mut w2).await.unwrap();

    assert_eq!(
        h.media.take(),
        vec![
            MediaCall::Wait(ParticipantId::from("w1")),
            MediaCall::Prompt(ParticipantId::from("w1"), Prompt::WaitForLeader),
            // quiet: no prompt
            MediaCall::Wait(ParticipantId::from("w2")),
        ]
    );

    let outcome = h.conference.join(&mut leader).await.unwrap();
    assert_eq!(outcome.previous_state, ConferenceStateId::Inactive);
    assert_eq!(outcome.state, ConferenceStateId::MultiMarked);
    assert_eq!(
        h.media.take(),
        vec![
            MediaCall::Admit(ParticipantId::from("leader")),
            MediaCall::ReleaseAll(ids(&["w1", "w2"])),
            MediaCall::Prompt(ParticipantId::from("leader"), Prompt::PlacedIntoConference),
        ]
    );
    let snapshot = h.conference.snapshot().await;
    assert_eq!(snapshot.active, ids(&["leader", "w1", "w2"]));
    assert!(snapshot.waiting.is_empty());
    assert_eq!(h.conference.membership_of(w1.id()).await, Some(Membership::Active));
}

#[tokio::test]
async fn test_end_marked_participants_are_kicked() {
    let h = Harness::new();
    let mut leader = Participant::with_id("leader", UserProfile::marked());
    let mut e1 = Participant::with_id("e1", UserProfile::unmarked().with_end_marked());
    let mut u1 = Participant::with_id("u1", UserProfile::unmarked());
    h.conference.join(&mut leader).await.unwrap();
    h.conference.join(&mut e1).await.unwrap();
    h.conference.join(&mut u1).await.unwrap();
    h.reset_recordings();

    h.conference.leave(&mut leader).await.unwrap();
    let calls = h.media.take();
    assert_eq!(
        calls,
        vec![MediaCall::Kick(ParticipantId::from("e1")), MediaCall::Announce(Prompt::LeaderHasLeft)]
    );

    // The kicked participant's own worker then leaves
    let outcome = h.conference.leave(&mut e1).await.unwrap();
    assert_eq!(outcome.state, ConferenceStateId::Single);
    assert_eq!(h.conference.snapshot().await.active, ids(&["u1"]));
}

#[tokio::test]
async fn test_media_failure_does_not_undo_transition() {
    let h = Harness::new();
    h.media.fail_admits(true);
    let mut p1 = Participant::with_id("p1", UserProfile::unmarked());

    let outcome = h.conference.join(&mut p1).await.unwrap();

    assert_eq!(outcome.state, ConferenceStateId::Single);
    assert_eq!(outcome.actions_failed, 1);
    assert!(outcome.actions_executed > 0);
    assert_eq!(h.conference.snapshot().await.active, ids(&["p1"]));
    assert!(p1.pending_actions().is_empty());
}

#[tokio::test]
async fn test_mismatched_role_event_is_invalid() {
    let h = Harness::new();
    let mut p1 = Participant::with_id("p1", UserProfile::unmarked());

    let err = h.conference.apply_event(&mut p1, ConferenceEvent::JoinMarked).await.unwrap_err();

    assert!(matches!(err, ConferenceError::InvalidEvent { state: ConferenceStateId::Empty, .. }));
    assert_eq!(h.sink.invalid_events(), 1);
    assert!(h.conference.is_empty());
}
