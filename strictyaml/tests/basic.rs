use strictyaml::parse;

#[test]
fn simple_map() {
    let doc = parse("foo: 1\nbar: John Doe\n").unwrap();
    let root = doc.root();
    assert!(root.is_map());
    assert_eq!(root.size().unwrap(), 2);
    assert_eq!(root.get("foo").unwrap().as_str().unwrap(), "1");
    assert_eq!(root.get("foo").unwrap().decode::<i64>().unwrap(), 1);
    assert_eq!(root.get("bar").unwrap().as_str().unwrap(), "John Doe");
    assert_eq!(
        doc.as_structural(false),
        r#"{'foo' : "1", 'bar' : "John Doe"}"#
    );
}

#[test]
fn indented_structural_form() {
    let doc = parse("foo: 1\nbar: John Doe\n").unwrap();
    assert_eq!(
        doc.as_structural(true),
        "{\n  'foo' : \"1\",\n  'bar' : \"John Doe\"\n}"
    );
}

#[test]
fn nested_sequence_and_map() {
    let doc = parse("1234:\n  - a\n  - 5678: abc\n    9101112: def\n").unwrap();
    let root = doc.root();
    assert!(root.is_map());
    let seq = root.get("1234").unwrap();
    assert!(seq.is_sequence());
    assert_eq!(seq.size().unwrap(), 2);
    assert_eq!(seq.at(0).unwrap().as_str().unwrap(), "a");
    let inner = seq.at(1).unwrap();
    assert!(inner.is_map());
    assert_eq!(inner.size().unwrap(), 2);
    assert_eq!(inner.get("5678").unwrap().as_str().unwrap(), "abc");
    assert_eq!(inner.get("9101112").unwrap().as_str().unwrap(), "def");
    assert_eq!(
        doc.as_structural(false),
        r#"{'1234' : ["a", {'5678' : "abc", '9101112' : "def"}]}"#
    );
}

#[test]
fn map_iteration_preserves_order() {
    let doc = parse("one: 1\ntwo: 2\nthree: 3\n").unwrap();
    let names: Vec<_> = doc
        .root()
        .iter()
        .unwrap()
        .map(|entry| entry.key_name().unwrap().to_owned())
        .collect();
    assert_eq!(names, ["one", "two", "three"]);

    let values: Vec<_> = doc
        .root()
        .iter()
        .unwrap()
        .map(|entry| entry.value().as_str().unwrap().to_owned())
        .collect();
    assert_eq!(values, ["1", "2", "3"]);
}

#[test]
fn sequence_iteration() {
    let doc = parse("- a\n- b\n- c\n").unwrap();
    let items: Vec<_> = doc
        .root()
        .iter()
        .unwrap()
        .map(|item| item.as_str().unwrap().to_owned())
        .collect();
    assert_eq!(items, ["a", "b", "c"]);
}

#[test]
fn empty_document() {
    let doc = parse("").unwrap();
    assert_eq!(doc.as_structural(false), "None");
    assert_eq!(doc.as_yaml(), "");

    let doc = parse("\n\n").unwrap();
    assert_eq!(doc.as_structural(false), "None");
}

#[test]
fn bare_scalar_document() {
    let doc = parse("hello\n").unwrap();
    assert!(doc.root().is_value());
    assert_eq!(doc.root().as_str().unwrap(), "hello");
    assert_eq!(doc.as_structural(false), "\"hello\"");
    assert_eq!(doc.as_yaml(), "hello");
}

#[test]
fn key_without_value_reads_as_absent() {
    let doc = parse("a:\nb: 1\n").unwrap();
    let a = doc.root().get("a").unwrap();
    assert!(a.is_present());
    assert_eq!(a.as_str().unwrap(), "");
    assert_eq!(doc.as_structural(false), r#"{'a' : None, 'b' : "1"}"#);
}

#[test]
fn caret_directly_below_key() {
    let doc = parse("a:\n- b\n- c\n").unwrap();
    assert_eq!(doc.as_structural(false), r#"{'a' : ["b", "c"]}"#);
}

#[test]
fn dash_key_idiom_inserts_implicit_map() {
    let doc = parse("- a: 1\n  b: 2\n- c: 3\n").unwrap();
    assert_eq!(
        doc.as_structural(false),
        r#"[{'a' : "1", 'b' : "2"}, {'c' : "3"}]"#
    );
}

#[test]
fn deeply_nested_document_does_not_overflow() {
    // One key per indentation level; recursion-free parsing and emission must both cope.
    let mut input = String::new();
    for depth in 0..2_000 {
        for _ in 0..depth {
            input.push(' ');
        }
        input.push_str("k:\n");
    }
    let doc = parse(&input).unwrap();
    let structural = doc.as_structural(false);
    assert!(structural.starts_with(r"{'k' : {'k' : "));
    let yaml = doc.as_yaml();
    assert!(yaml.starts_with("k:\n"));
}
