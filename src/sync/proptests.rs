//! Property-based tests for the sync core
//!
//! These tests verify the mirror's invariants hold across arbitrary
//! delivery patterns.

use super::fixtures::*;
use super::*;
use crate::model::{ConversationId, WAITING_FOR_CONFIRMATION};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// Split `0..total` into consecutive windows, each optionally re-sending a
/// few messages the client already has (as after a reconnect).
fn arb_windows(total: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    proptest::collection::vec((1usize..=10, 0usize..4), 1..40).prop_map(move |steps| {
        let mut windows = Vec::new();
        let mut end = 0;
        for (len, rewind) in steps {
            if end >= total {
                break;
            }
            let start = end.saturating_sub(rewind);
            let stop = (end + len).min(total);
            windows.push((start, stop));
            end = stop;
        }
        if end < total {
            windows.push((end, total));
        }
        windows
    })
}

#[derive(Debug, Clone)]
enum ConfirmTrigger {
    /// Header re-delivered with the current version
    Redeliver,
    /// User presses submit
    Manual,
    /// Auto-confirm toggled on (again)
    ToggleOn,
}

fn arb_trigger() -> impl Strategy<Value = ConfirmTrigger> {
    prop_oneof![
        Just(ConfirmTrigger::Redeliver),
        Just(ConfirmTrigger::Manual),
        Just(ConfirmTrigger::ToggleOn),
    ]
}

fn confirm_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::Confirm { .. }))
        .count()
}

fn apply_windows(
    state: &mut ClientSyncState,
    id: ConversationId,
    windows: &[(usize, usize)],
    total: usize,
) {
    for &(start, stop) in windows {
        state.apply(Event::Update(update(id, start, msgs(start..stop), total)));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Final history does not depend on how deltas were chunked
    #[test]
    fn prop_append_is_chunking_independent(
        (total, windows) in (1usize..60).prop_flat_map(|total| (Just(total), arb_windows(total)))
    ) {
        let mut chunked = ClientSyncState::default();
        apply_windows(&mut chunked, 1, &windows, total);

        let mut single = ClientSyncState::default();
        single.apply(Event::Update(update(1, 0, msgs(0..total), total)));

        let chunked_messages = chunked.store().get(1).unwrap().messages();
        prop_assert_eq!(chunked_messages, single.store().get(1).unwrap().messages());
        let expected = msgs(0..total);
        prop_assert_eq!(chunked_messages, expected.as_slice());
    }

    // Unchanged session key never loses a stored message
    #[test]
    fn prop_same_session_never_drops_messages(
        deliveries in proptest::collection::vec((0usize..20, 0usize..10), 1..30)
    ) {
        let mut state = ClientSyncState::default();
        let mut high_water = 0;
        for (first, len) in deliveries {
            let stop = first + len;
            state.apply(Event::Update(update(1, first, msgs(first..stop), stop)));
            let count = state.store().message_count(1);
            prop_assert!(count >= high_water, "dropped from {} to {}", high_water, count);
            let expected = msgs(0..count);
            prop_assert_eq!(state.store().get(1).unwrap().messages(), expected.as_slice());
            high_water = count;
        }
    }

    // A changed key clears everything and rebuilds from that point on
    #[test]
    fn prop_session_change_rebuilds_from_scratch(
        ids in proptest::collection::btree_set(0u64..20, 1..8),
        kept in 0usize..5,
    ) {
        let mut state = ClientSyncState::default();
        for &id in &ids {
            state.apply(Event::Update(update(id, 0, msgs(0..3), 3)));
        }

        let mut fresh = update(100, 0, msgs(0..kept), kept);
        fresh.session_key = "session-b".to_string();
        state.apply(Event::Update(fresh));

        prop_assert_eq!(state.store().all_ids(), vec![100]);
        prop_assert_eq!(state.store().message_count(100), kept);
        prop_assert_eq!(state.store().shown(), Some(100));
    }

    // Exactly one confirm per server version, whatever fires it
    #[test]
    fn prop_confirmation_exactly_once_per_version(
        auto_on in any::<bool>(),
        triggers in proptest::collection::vec(arb_trigger(), 0..20),
    ) {
        let mut state = ClientSyncState::new(auto_on);
        let mut sent = confirm_count(
            &state.apply(Event::Update(state_update(1, WAITING_FOR_CONFIRMATION, 100))),
        );

        let expect_one = auto_on
            || triggers
                .iter()
                .any(|t| matches!(t, ConfirmTrigger::Manual | ConfirmTrigger::ToggleOn));

        for trigger in triggers {
            let event = match trigger {
                ConfirmTrigger::Redeliver => {
                    Event::Update(state_update(1, WAITING_FOR_CONFIRMATION, 100))
                }
                ConfirmTrigger::Manual => Event::Confirm {
                    conversation_id: 1,
                    text: "y".to_string(),
                },
                ConfirmTrigger::ToggleOn => Event::SetAutoConfirm { enabled: true },
            };
            sent += confirm_count(&state.apply(event));
            prop_assert!(sent <= 1, "confirmed {} times", sent);
        }
        prop_assert_eq!(sent, usize::from(expect_one));

        // Next version is answered exactly once more (forcing the manual path)
        let mut next_sent = confirm_count(
            &state.apply(Event::Update(state_update(1, WAITING_FOR_CONFIRMATION, 150))),
        );
        next_sent += confirm_count(
            &state.apply(Event::Confirm { conversation_id: 1, text: String::new() }),
        );
        prop_assert_eq!(next_sent, 1);
        prop_assert!(!state.store().get(1).unwrap().is_confirmation_outstanding());
    }

    // Directory pagination terminates once every id up to the server max is seen
    #[test]
    fn prop_list_pagination_terminates(
        server_ids in proptest::collection::btree_set(0u64..50, 1..20),
        page_size in 1usize..6,
    ) {
        let server_max = server_ids.iter().next_back().copied();
        let mut state = ClientSyncState::default();
        let mut pending = ClientSyncState::start();
        let mut rounds = 0;

        while let Some(effect) = pending.pop() {
            let Effect::ListConversations { start_id } = effect else { continue };
            rounds += 1;
            prop_assert!(rounds <= 60, "pagination did not terminate");

            let page = server_ids
                .iter()
                .filter(|&&id| id >= start_id.unwrap_or(0))
                .take(page_size)
                .map(|&id| listed(id, 0))
                .collect();
            pending.extend(state.apply(Event::ListConversations(list_page(page, server_max))));
        }

        prop_assert_eq!(state.store().max_id().ok(), server_max);
        prop_assert_eq!(
            state.store().all_ids(),
            server_ids.into_iter().collect::<Vec<_>>()
        );
    }
}
