use endorse_core::domain::RoundPhase;
use endorse_core::foundation::{EndorseError, ErrorCode};

const ALL: [RoundPhase; 5] = [RoundPhase::Draft, RoundPhase::Discovering, RoundPhase::AwaitingEndorsements, RoundPhase::Quorate, RoundPhase::Failed];

#[test]
fn test_transition_when_happy_path_then_reaches_quorate() {
    let phase = RoundPhase::default()
        .transition(RoundPhase::Discovering)
        .and_then(|phase| phase.transition(RoundPhase::AwaitingEndorsements))
        .and_then(|phase| phase.transition(RoundPhase::Quorate))
        .expect("happy path");
    assert_eq!(phase, RoundPhase::Quorate);
    assert!(phase.is_terminal());
}

#[test]
fn test_transition_when_discovery_fails_then_failed_allowed() {
    assert!(RoundPhase::Discovering.can_transition_to(RoundPhase::Failed));
    assert!(RoundPhase::AwaitingEndorsements.can_transition_to(RoundPhase::Failed));
    assert!(!RoundPhase::Draft.can_transition_to(RoundPhase::Failed));
}

#[test]
fn test_transition_when_terminal_then_no_exit() {
    for terminal in [RoundPhase::Quorate, RoundPhase::Failed] {
        assert!(terminal.is_terminal());
        for target in ALL {
            assert!(!terminal.can_transition_to(target), "{terminal} -> {target} must be refused");
        }
    }
}

#[test]
fn test_transition_when_skipping_phase_then_invalid_state_transition() {
    let err = RoundPhase::Draft.transition(RoundPhase::Quorate).expect_err("skip");
    assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    match err {
        EndorseError::InvalidStateTransition { from, to } => {
            assert_eq!(from, "draft");
            assert_eq!(to, "quorate");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_transition_when_backwards_then_refused() {
    assert!(!RoundPhase::AwaitingEndorsements.can_transition_to(RoundPhase::Discovering));
    assert!(!RoundPhase::Discovering.can_transition_to(RoundPhase::Draft));
    assert!(ALL.iter().all(|phase| !phase.can_transition_to(*phase)));
}
