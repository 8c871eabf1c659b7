use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReelError::encoder_init("x")
            .to_string()
            .contains("encoder init failure:")
    );
    assert!(
        ReelError::encoder_submit("x")
            .to_string()
            .contains("encoder submit failure:")
    );
    assert!(
        ReelError::image_decode(3, "bad png")
            .to_string()
            .contains("image 3")
    );
}

#[test]
fn insufficient_images_reports_counts() {
    let err = ReelError::InsufficientImages { count: 1, min: 2 };
    assert_eq!(
        err.to_string(),
        "insufficient images: got 1, need at least 2"
    );
}

#[test]
fn encoder_init_is_classified() {
    assert!(ReelError::encoder_init("no codec").is_encoder_init());
    assert!(!ReelError::encoder_submit("pipe closed").is_encoder_init());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
