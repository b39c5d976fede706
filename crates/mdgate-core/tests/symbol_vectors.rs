//! Batch ticker list vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use mdgate_core::model::parse_symbol_list;

use vector_loader::SymbolListVector;

#[test]
fn symbol_list_vectors() {
    let vectors: Vec<SymbolListVector> = vector_loader::load("symbol_lists.json");
    assert!(!vectors.is_empty());

    for v in vectors {
        let res = parse_symbol_list(&v.input);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.client_code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let list = res.expect("expected ok list");
        let ex = v.expect.expect("missing expect block");
        assert_eq!(list, ex, "vector={}", v.description);
    }
}
