#[macro_use]
extern crate quickcheck;

use quickcheck::TestResult;

use strictyaml::{parse, Document, NodeKind};

quickcheck! {
    /// Any sequence of arbitrary strings survives emit -> parse with its structure intact, and
    /// the second emission is byte-identical to the first.
    fn sequence_of_arbitrary_strings_roundtrips(values: Vec<String>) -> TestResult {
        if values.is_empty() {
            // An empty sequence has no YAML rendition in this subset.
            return TestResult::discard();
        }
        let mut doc = Document::new();
        doc.root_mut().set_kind(NodeKind::Sequence).unwrap();
        for value in &values {
            doc.root_mut().push(value.as_str()).unwrap();
        }
        let emitted = doc.as_yaml();
        match parse(&emitted) {
            Ok(reparsed) => TestResult::from_bool(
                reparsed.as_structural(false) == doc.as_structural(false)
                    && reparsed.as_yaml() == emitted,
            ),
            Err(e) => TestResult::error(format!("reparsing {emitted:?}: {e}")),
        }
    }

    /// Any map of arbitrary string values survives emit -> parse with its structure intact.
    fn map_of_arbitrary_values_roundtrips(values: Vec<String>) -> TestResult {
        if values.is_empty() {
            return TestResult::discard();
        }
        let mut doc = Document::new();
        doc.root_mut().set_kind(NodeKind::Map).unwrap();
        for (i, value) in values.iter().enumerate() {
            doc.root_mut().insert_key(&format!("key{i}"), value.as_str()).unwrap();
        }
        let emitted = doc.as_yaml();
        match parse(&emitted) {
            Ok(reparsed) => TestResult::from_bool(
                reparsed.as_structural(false) == doc.as_structural(false)
                    && reparsed.as_yaml() == emitted,
            ),
            Err(e) => TestResult::error(format!("reparsing {emitted:?}: {e}")),
        }
    }

    /// The map child index stays consistent with the child lists across interleaved insertions
    /// and removals: `find` answers exactly for the live keys, with the right values.
    fn map_index_stays_consistent(ids: Vec<u16>) -> TestResult {
        let mut unique = ids;
        unique.sort_unstable();
        unique.dedup();
        if unique.is_empty() {
            return TestResult::discard();
        }

        let mut doc = Document::new();
        doc.root_mut().set_kind(NodeKind::Map).unwrap();
        for id in &unique {
            doc.root_mut()
                .insert_key(&format!("key{id:05}"), u64::from(*id))
                .unwrap();
        }
        for (i, id) in unique.iter().enumerate() {
            if i % 2 == 0 && !doc.root_mut().remove_key(&format!("key{id:05}")).unwrap() {
                return TestResult::failed();
            }
        }
        for (i, id) in unique.iter().enumerate() {
            let key = format!("key{id:05}");
            let removed = i % 2 == 0;
            if doc.root().has_key(&key).unwrap() == removed {
                return TestResult::failed();
            }
            if !removed
                && doc.root().get(&key).unwrap().decode::<u64>().unwrap() != u64::from(*id)
            {
                return TestResult::failed();
            }
        }
        // Even positions were removed: exactly half (rounded down) remain.
        if doc.root().size().unwrap() != unique.len() / 2 {
            return TestResult::failed();
        }
        TestResult::passed()
    }
}
