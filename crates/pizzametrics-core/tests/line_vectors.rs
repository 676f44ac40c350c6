//! Line-protocol vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use vector_loader::TestVector;

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn line_vectors() {
    let files = [
        "http_method_tagged.json",
        "gauge_negative.json",
        "revenue_fraction.json",
        "escaped_identifiers.json",
        "multi_field.json",
        "empty_tag_value.json",
        "no_fields.json",
        "newline_in_tag.json",
        "trailing_backslash.json",
    ];

    for f in files {
        let v = load(f);
        let res = v.measurement.build().encode();

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.kind().as_str(), err.kind, "vector={}", v.description);
            continue;
        }

        let line = res.expect("expected encoded line");
        let expected = v.expect_line.expect("missing expect_line");
        assert_eq!(line, expected, "vector={}", v.description);
        assert!(!line.contains('\n'), "vector={}", v.description);
    }
}
