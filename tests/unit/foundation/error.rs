use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        NovellaError::not_found("x")
            .to_string()
            .contains("not found:")
    );
    assert!(
        NovellaError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        NovellaError::navigation("x")
            .to_string()
            .contains("navigation error:")
    );
    assert!(
        NovellaError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = NovellaError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
