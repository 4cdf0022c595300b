use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    assert_eq!(ErrorCode::E4001.as_str(), "E4001");
}

#[test]
fn test_from_str_roundtrip() {
    for code in ErrorCode::ALL {
        assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(*code));
    }
    assert_eq!("e2004".parse::<ErrorCode>(), Ok(ErrorCode::E2004));
    assert_eq!("E9999".parse::<ErrorCode>(), Err(()));
}

#[test]
fn test_every_kind_is_reachable() {
    let kinds = [
        ErrorKind::InvalidInput,
        ErrorKind::ConflictingAnnotations,
        ErrorKind::UnresolvedReference,
        ErrorKind::CyclicInheritance,
        ErrorKind::AmbiguousVersionShape,
        ErrorKind::IdentityValidationFailed,
    ];
    for kind in kinds {
        assert!(
            ErrorCode::ALL.iter().any(|code| code.kind() == kind),
            "no code reports {kind}"
        );
    }
}

#[test]
fn test_stage_predicates() {
    assert!(ErrorCode::E0003.is_input_error());
    assert!(!ErrorCode::E0003.is_graph_error());
    assert!(ErrorCode::E1005.is_graph_error());
    assert_eq!(ErrorCode::E1005.kind(), ErrorKind::CyclicInheritance);
    assert!(!ErrorCode::E2001.is_graph_error());
    assert!(!ErrorCode::E4001.is_input_error());
}

#[test]
fn test_all_is_sorted_and_unique() {
    assert!(ErrorCode::ALL.windows(2).all(|w| w[0] < w[1]));
}
