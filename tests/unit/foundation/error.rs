use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LuminaError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        LuminaError::composition("x", false)
            .to_string()
            .contains("composition error:")
    );
    assert!(
        LuminaError::clarification("x")
            .to_string()
            .contains("clarification error:")
    );
    assert!(
        LuminaError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LuminaError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn recommend_manual_only_on_flagged_composition_errors() {
    assert!(LuminaError::composition("all layers empty", true).recommends_manual());
    assert!(!LuminaError::composition("no layers", false).recommends_manual());
    assert!(!LuminaError::validation("bad").recommends_manual());
}

#[test]
fn serde_json_errors_convert() {
    let err: LuminaError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, LuminaError::Serde(_)));
}
