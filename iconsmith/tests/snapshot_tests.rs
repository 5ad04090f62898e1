//! Snapshots of parsed icon documents.

#[test]
fn icon_document() {
    let document = iconsmith::Document::parse(
        &std::fs::read_to_string("tests/fixtures/icon.svg").expect("failed to read icon SVG file"),
    )
    .expect("failed to parse icon SVG data");

    insta::assert_debug_snapshot!("icon_document", &document);
}
