use cicode::{Parser, language, new_parser, verify_language_loads};
use cicode_grammar::{grammar_artifact, load_language};

#[test]
fn test_can_load_grammar() {
    let mut parser = Parser::new();
    parser
        .set_language(&language())
        .expect("Error loading Cicode grammar");
    assert!(parser.language().is_some());
}

#[test]
fn test_verify_language_loads() {
    let language = verify_language_loads().expect("Error loading Cicode grammar");
    assert_eq!(language.name(), Some("cicode"));
    assert_eq!(language.abi_version(), 15);
    assert!(language.node_kind_count() > 0);
    assert!(language.field_count() > 0);
}

#[test]
fn test_loading_is_idempotent() {
    let first = load_language(grammar_artifact()).unwrap();
    let second = load_language(grammar_artifact()).unwrap();
    assert_eq!(first, second);

    let mut parser = Parser::new();
    parser.set_language(&first).unwrap();
    parser.set_language(&second).unwrap();
    assert!(parser.parse("FUNCTION Main()\nEND\n", None).is_some());
}

#[test]
fn test_loading_from_threads() {
    let handles: Vec<_> = (0..4)
        .map(|_| {
            std::thread::spawn(|| {
                let mut parser = new_parser()?;
                let tree = parser.parse("FUNCTION Main()\nEND\n", None);
                let clean = tree.is_some_and(|tree| !tree.root_node().has_error());
                Ok::<_, cicode::GrammarLoadError>(clean)
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(true));
    }
}
