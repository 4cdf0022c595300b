use super::*;

#[test]
fn test_get_existing_doc() {
    let Some(doc) = ErrorDocs::get(ErrorCode::E1005) else {
        panic!("E1005 should be documented");
    };
    assert!(doc.starts_with("# E1005: Cyclic Inheritance"));
}

#[test]
fn test_every_code_is_documented() {
    for code in ErrorCode::ALL {
        assert!(ErrorDocs::has_docs(*code), "{code} has no documentation");
        let doc = ErrorDocs::get(*code).unwrap_or_default();
        assert!(doc.starts_with(&format!("# {code}: ")), "{code} doc has a wrong title");
    }
    assert_eq!(ErrorDocs::all_codes().count(), ErrorCode::ALL.len());
}
