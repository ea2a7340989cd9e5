use strictyaml::{parse, AccessError, ConvertError, DecodeScalar, Document, EncodeScalar, NodeKind};

#[test]
fn map_insert_remove_reinsert() {
    let mut doc = Document::new();
    doc.root_mut().set_kind(NodeKind::Map).unwrap();

    let keys: Vec<String> = (0..16).map(|i| format!("{i:08}")).collect();
    for key in &keys {
        doc.root_mut().insert_key(key, key.as_str()).unwrap();
    }
    for (i, key) in keys.iter().enumerate() {
        if i % 3 == 0 {
            assert!(doc.root_mut().remove_key(key).unwrap());
        }
    }
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(doc.root().has_key(key).unwrap(), i % 3 != 0, "key {key}");
    }
    for (i, key) in keys.iter().enumerate() {
        if i % 3 == 0 {
            doc.root_mut().insert_key(key, key.as_str()).unwrap();
        }
    }
    for key in &keys {
        assert_eq!(doc.root().get(key).unwrap().as_str().unwrap(), key);
    }
}

#[test]
fn removing_a_missing_key_returns_false() {
    let mut doc = parse("a: 1\n").unwrap();
    assert!(!doc.root_mut().remove_key("b").unwrap());
    assert!(doc.root_mut().remove_key("a").unwrap());
    assert_eq!(doc.root().size().unwrap(), 0);
}

#[test]
fn pending_key_reads_as_absent() {
    let doc = parse("foo: 1\n").unwrap();
    let root = doc.root();

    let missing = root.get("nope").unwrap();
    assert!(!missing.is_present());
    assert!(matches!(
        missing.decode::<String>(),
        Err(AccessError::PendingKey(key)) if key == "nope"
    ));
    assert_eq!(missing.decode_or(String::from("fallback")).unwrap(), "fallback");

    let present = root.get("foo").unwrap();
    assert!(present.is_present());
    assert_eq!(present.decode_or(0_i64).unwrap(), 1);
}

#[test]
fn assigning_a_pending_key_materializes_it() {
    let mut doc = parse("foo: 1\n").unwrap();
    doc.root_mut().get_mut("answer").unwrap().set(42_i64).unwrap();
    assert_eq!(doc.root().get("answer").unwrap().decode::<i64>().unwrap(), 42);
    assert_eq!(doc.as_yaml(), "foo: 1\nanswer: 42");
}

#[test]
fn overwriting_a_value_in_place() {
    let mut doc = parse("foo: 1\n").unwrap();
    doc.root_mut().get_mut("foo").unwrap().set("two").unwrap();
    assert_eq!(doc.as_yaml(), "foo: two");
}

#[test]
fn reshaping_a_value_into_a_sequence() {
    let mut doc = parse("foo: 1\n").unwrap();
    {
        let mut node = doc.root_mut().get_mut("foo").unwrap();
        node.set_kind(NodeKind::Sequence).unwrap();
        node.push("x").unwrap();
        node.push("y").unwrap();
    }
    assert_eq!(doc.as_yaml(), "foo:\n  - x\n  - y");
}

#[test]
fn only_structural_kinds_can_be_created() {
    let mut doc = parse("foo: 1\n").unwrap();
    let err = doc
        .root_mut()
        .get_mut("foo")
        .unwrap()
        .set_kind(NodeKind::Value)
        .unwrap_err();
    assert!(matches!(err, AccessError::NotStructural(NodeKind::Value)));
}

#[test]
fn sequence_operations() {
    let mut doc = Document::new();
    doc.root_mut().set_kind(NodeKind::Sequence).unwrap();
    doc.root_mut().push("a").unwrap();
    doc.root_mut().push(2_u8).unwrap();
    doc.root_mut().insert(1, "between").unwrap();
    assert_eq!(
        doc.as_structural(false),
        r#"["a", "between", "2"]"#
    );

    doc.root_mut().remove(0).unwrap();
    assert_eq!(doc.as_structural(false), r#"["between", "2"]"#);
    doc.root_mut().pop().unwrap();
    assert_eq!(doc.as_structural(false), r#"["between"]"#);

    assert!(matches!(
        doc.root_mut().insert(5, "x"),
        Err(AccessError::OutOfBounds { index: 5, len: 1 })
    ));
    assert!(matches!(
        doc.root().at(3),
        Err(AccessError::OutOfBounds { index: 3, len: 1 })
    ));

    doc.root_mut().pop().unwrap();
    assert!(matches!(doc.root_mut().pop(), Err(AccessError::EmptySequence)));
}

#[test]
fn nested_containers_built_programmatically() {
    let mut doc = Document::new();
    doc.root_mut().set_kind(NodeKind::Map).unwrap();
    doc.root_mut().insert_key_kind("list", NodeKind::Sequence).unwrap();
    {
        let mut list = doc.root_mut().get_mut("list").unwrap();
        list.push(1_u32).unwrap();
        list.push_kind(NodeKind::Map).unwrap();
        let mut inner = list.at_mut(1).unwrap();
        inner.get_mut("x").unwrap().set("y").unwrap();
    }
    assert_eq!(
        doc.as_structural(false),
        r#"{'list' : ["1", {'x' : "y"}]}"#
    );
    assert_eq!(doc.as_yaml(), "list:\n  - 1\n  - x: y");
}

#[test]
fn duplicate_insert_is_rejected() {
    let mut doc = parse("foo: 1\n").unwrap();
    let err = doc.root_mut().insert_key("foo", "again").unwrap_err();
    assert!(matches!(err, AccessError::DuplicateKey(key) if key == "foo"));
}

#[test]
fn empty_keys_are_rejected() {
    let doc = parse("foo: 1\n").unwrap();
    assert!(matches!(doc.root().has_key(""), Err(AccessError::EmptyKey)));
    assert!(matches!(doc.root().get(""), Err(AccessError::EmptyKey)));
}

#[test]
fn wrong_kind_operations_are_rejected() {
    let doc = parse("foo: 1\n").unwrap();
    let root = doc.root();
    assert!(matches!(root.at(0), Err(AccessError::WrongKind { .. })));
    let value = root.get("foo").unwrap();
    assert!(matches!(value.size(), Err(AccessError::WrongKind { .. })));
    assert!(matches!(value.get("x"), Err(AccessError::WrongKind { .. })));
    assert!(matches!(value.iter(), Err(AccessError::WrongKind { .. })));
    let err = value.key_name().unwrap_err();
    assert!(err.to_string().starts_with("Access error: "), "{err}");
}

#[test]
fn access_errors_leave_the_document_usable() {
    let mut doc = parse("foo: 1\n").unwrap();
    assert!(doc.root_mut().push("x").is_err());
    assert!(doc.root_mut().insert_key("foo", "dup").is_err());
    // The failed calls must not have touched the tree.
    assert_eq!(doc.as_structural(false), r#"{'foo' : "1"}"#);
    assert_eq!(doc.root().get("foo").unwrap().as_str().unwrap(), "1");
}

#[test]
fn decode_failures_carry_node_context() {
    let doc = parse("bar: John Doe\n").unwrap();
    let err = doc.root().get("bar").unwrap().decode::<i64>().unwrap_err();
    let text = err.to_string();
    assert!(text.contains("unable to convert the string into a signed integer"), "{text}");
    assert!(text.contains("John Doe"), "{text}");
}

#[test]
fn integer_codecs_understand_base_prefixes() {
    let doc = parse("hex: 0x1F\noct: 0o17\nbin: 0b101\nneg: -12\n").unwrap();
    let root = doc.root();
    assert_eq!(root.get("hex").unwrap().decode::<u32>().unwrap(), 31);
    assert_eq!(root.get("oct").unwrap().decode::<u32>().unwrap(), 15);
    assert_eq!(root.get("bin").unwrap().decode::<u32>().unwrap(), 5);
    assert_eq!(root.get("neg").unwrap().decode::<i32>().unwrap(), -12);
    assert!(matches!(
        root.get("hex").unwrap().decode::<f64>(),
        Err(AccessError::Convert { .. })
    ));
}

/// A user-defined point with its own scalar codec.
#[derive(Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

impl EncodeScalar for Point {
    fn encode(&self) -> Result<String, ConvertError> {
        Ok(format!("{},{}", self.x, self.y))
    }
}

impl DecodeScalar for Point {
    fn decode(text: &str) -> Result<Self, ConvertError> {
        let (x, y) = text
            .split_once(',')
            .ok_or_else(|| ConvertError::new(format!("not a point: '{text}'")))?;
        Ok(Point {
            x: i32::decode(x)?,
            y: i32::decode(y)?,
        })
    }
}

#[test]
fn user_defined_codec() {
    let mut doc = Document::new();
    doc.root_mut().set_kind(NodeKind::Map).unwrap();
    doc.root_mut().insert_key("p", Point { x: 3, y: -4 }).unwrap();
    assert_eq!(doc.as_yaml(), "p: 3,-4");
    assert_eq!(
        doc.root().get("p").unwrap().decode::<Point>().unwrap(),
        Point { x: 3, y: -4 }
    );

    let bad = parse("p: nope\n").unwrap();
    assert!(bad.root().get("p").unwrap().decode::<Point>().is_err());
}

#[test]
fn scalar_assignment_to_the_root_of_an_empty_document() {
    let mut doc = Document::new();
    doc.root_mut().set("hello").unwrap();
    assert_eq!(doc.root().as_str().unwrap(), "hello");
    assert_eq!(doc.as_yaml(), "hello");
}

#[test]
fn element_handles_survive_map_removal() {
    // Nodes obtained before a swap-on-remove keep pointing at the same logical node.
    let mut doc = parse("a: 1\nb: 2\nc: 3\n").unwrap();
    doc.root_mut().remove_key("a").unwrap();
    // "c" was swapped into "a"'s position; both survivors are intact.
    assert_eq!(doc.root().get("b").unwrap().as_str().unwrap(), "2");
    assert_eq!(doc.root().get("c").unwrap().as_str().unwrap(), "3");
    assert_eq!(doc.as_structural(false), r#"{'c' : "3", 'b' : "2"}"#);
}
