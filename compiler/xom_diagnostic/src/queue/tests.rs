use pretty_assertions::assert_eq;

use super::*;
use crate::ErrorCode;

fn error(code: ErrorCode, decl: &str, message: &str) -> Diagnostic {
    Diagnostic::error(code)
        .with_message(message)
        .with_label(decl, "here")
}

#[test]
fn test_flush_orders_by_declaration_then_code() {
    let mut queue = DiagnosticQueue::new();
    queue.extend([
        error(ErrorCode::E2001, "N.B", "second"),
        error(ErrorCode::E1001, "N.B", "first"),
        error(ErrorCode::E4001, "N.A", "zeroth"),
    ]);

    let messages: Vec<_> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["zeroth", "first", "second"]);
}

#[test]
fn test_exact_duplicates_are_dropped() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(error(ErrorCode::E1001, "N.A", "same")));
    assert!(!queue.add(error(ErrorCode::E1001, "N.A", "same")));
    assert!(queue.add(error(ErrorCode::E1001, "N.A", "different")));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn test_duplicates_kept_when_dedup_disabled() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 0,
        deduplicate: false,
    });
    queue.add(error(ErrorCode::E1001, "N.A", "same"));
    queue.add(error(ErrorCode::E1001, "N.A", "same"));
    assert_eq!(queue.flush().len(), 2);
}

#[test]
fn test_error_limit_applies_after_sorting() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: true,
    });
    queue.extend([
        error(ErrorCode::E1001, "N.D", "d"),
        error(ErrorCode::E1001, "N.C", "c"),
        error(ErrorCode::E1001, "N.B", "b"),
        error(ErrorCode::E1001, "N.A", "a"),
    ]);
    assert!(queue.has_errors().is_some());

    let messages: Vec<_> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["a", "b"]);
    assert_eq!(queue.truncated(), 2);
    assert!(queue.has_errors().is_none());
}

#[test]
fn test_warnings_do_not_count_as_errors() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 1,
        deduplicate: true,
    });
    queue.add(
        Diagnostic::warning(ErrorCode::E2006)
            .with_message("w")
            .with_label("N.A.B", "here"),
    );
    assert!(!queue.is_empty());
    assert_eq!((queue.error_count(), queue.warning_count()), (0, 1));
    assert!(queue.has_errors().is_none());

    queue.extend([
        error(ErrorCode::E4001, "N.A", "e1"),
        error(ErrorCode::E4001, "N.C", "e2"),
    ]);
    assert!(queue.has_errors().is_some());

    let flushed = queue.flush();
    let codes: Vec<_> = flushed.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E4001, ErrorCode::E2006]);
    assert_eq!(queue.truncated(), 1);
    assert!(queue.is_empty());
    assert_eq!(queue.warning_count(), 0);
}
