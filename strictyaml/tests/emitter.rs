use strictyaml::{parse, Document, NodeKind, YamlEmitter};

/// Parse, emit, parse the emission and emit again.
///
/// Asserts the round-trip guarantee: the two emissions are byte-identical and the two trees have
/// the same structural form. Returns the first emission so callers can check its formatting.
fn roundtrip(input: &str) -> String {
    let doc = parse(input).unwrap();
    let first = doc.as_yaml();
    let reparsed = parse(&first).unwrap_or_else(|e| panic!("reparsing {first:?}: {e}"));
    let second = reparsed.as_yaml();
    assert_eq!(first, second, "emission is not idempotent for {input:?}");
    assert_eq!(
        doc.as_structural(false),
        reparsed.as_structural(false),
        "structure changed across the round trip for {input:?}"
    );
    first
}

#[test]
fn simple_map_roundtrip() {
    assert_eq!(roundtrip("foo: 1\nbar: John Doe\n"), "foo: 1\nbar: John Doe");
}

#[test]
fn nested_roundtrip_is_byte_identical() {
    let input = "1234:\n  - a\n  - 5678: abc\n    9101112: def";
    assert_eq!(roundtrip(input), input);
}

#[test]
fn sticky_comment_is_reproduced_verbatim() {
    let doc = parse("foo: 1 # hello\n").unwrap();
    assert_eq!(doc.as_structural(false), r#"{'foo' : "1"}"#);
    assert_eq!(roundtrip("foo: 1 # hello\n"), "foo: 1 # hello");
}

#[test]
fn standalone_comments_stay_on_their_own_line() {
    assert_eq!(roundtrip("# top\nfoo: 1\n"), "# top\nfoo: 1");
    assert_eq!(
        roundtrip("foo: 1\n# middle\nbar: 2\n"),
        "foo: 1\n# middle\nbar: 2"
    );
}

#[test]
fn indented_comment_follows_its_key() {
    assert_eq!(
        roundtrip("foo:\n  # inner\n  bar: 2\n"),
        "foo:\n  # inner\n  bar: 2"
    );
}

#[test]
fn sequence_roundtrips() {
    assert_eq!(roundtrip("- a\n- b\n"), "- a\n- b");
    assert_eq!(roundtrip("- a: 1\n  b: 2\n- c: 3\n"), "- a: 1\n  b: 2\n- c: 3");
    // A nested sequence reaches its fixpoint with the inner entries on their own lines.
    assert_eq!(roundtrip("- - a\n  - b\n- c\n"), "- \n  - a\n  - b\n- c");
}

#[test]
fn scalar_styles() {
    // A value with a key-like colon needs quotes.
    assert_eq!(roundtrip("a: 'x: y'\n"), "a: 'x: y'");
    // An apostrophe alone does not force quoting.
    assert_eq!(roundtrip("a: don't\n"), "a: don't");
    // Multi-line content falls back to double quotes.
    assert_eq!(roundtrip("a: \"line1\\nline2\"\n"), "a: \"line1\\nline2\"");
    // A comment-like ` #` needs quotes.
    assert_eq!(roundtrip("a: 'b # not a comment'\n"), "a: 'b # not a comment'");
}

#[test]
fn block_scalars_reemit_double_quoted_by_default() {
    assert_eq!(roundtrip("a: |\n  x\n  y\n"), "a: \"x\\ny\\n\"");
}

#[test]
fn risky_programmatic_values_are_quoted() {
    let mut doc = Document::new();
    doc.root_mut().set_kind(NodeKind::Map).unwrap();
    doc.root_mut().insert_key("colon", "end:").unwrap();
    doc.root_mut().insert_key("dash", "- b").unwrap();
    doc.root_mut().insert_key("hash", "# x").unwrap();
    doc.root_mut().insert_key("spaces", " padded ").unwrap();
    let emitted = doc.as_yaml();
    assert_eq!(
        emitted,
        "colon: 'end:'\ndash: '- b'\nhash: '# x'\nspaces: ' padded '"
    );

    let reparsed = parse(&emitted).unwrap();
    assert_eq!(reparsed.as_structural(false), doc.as_structural(false));
}

#[test]
fn literal_blocks_are_opt_in() {
    let doc = parse("a: |\n  x\n  y\n").unwrap();

    let mut emitter = YamlEmitter::new();
    emitter.literal_blocks(true);
    let first = emitter.dump(&doc);
    assert_eq!(first, "a: |2+\n  x\n  y");

    let reparsed = parse(&first).unwrap();
    assert_eq!(reparsed.root().get("a").unwrap().as_str().unwrap(), "x\ny\n");
    assert_eq!(emitter.dump(&reparsed), first);
}

#[test]
fn literal_blocks_without_trailing_newline_use_strip() {
    let mut doc = Document::new();
    doc.root_mut().set_kind(NodeKind::Map).unwrap();
    doc.root_mut().insert_key("a", "x\ny").unwrap();

    let mut emitter = YamlEmitter::new();
    emitter.literal_blocks(true);
    let emitted = emitter.dump(&doc);
    assert_eq!(emitted, "a: |2-\n  x\n  y");
    let reparsed = parse(&emitted).unwrap();
    assert_eq!(reparsed.root().get("a").unwrap().as_str().unwrap(), "x\ny");
}

#[test]
fn key_without_value_roundtrips() {
    assert_eq!(roundtrip("a:\nb: 1\n"), "a:\nb: 1");
}

#[test]
fn empty_sequence_entries_roundtrip() {
    assert_eq!(roundtrip("- a\n-\n- b\n"), "- a\n- \n- b");
}

#[test]
fn unicode_content_roundtrips() {
    assert_eq!(roundtrip("name: 你好\n"), "name: 你好");
    assert_eq!(roundtrip("- émoji 🦀\n"), "- émoji 🦀");
}
