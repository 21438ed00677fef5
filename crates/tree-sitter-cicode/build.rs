use std::path::PathBuf;

fn main() {
    // src/parser.c is generated from grammar.js and checked in.
    println!("cargo:rerun-if-changed=grammar.js");
    println!("cargo:rerun-if-changed=src/parser.c");
    println!("cargo:rerun-if-changed=src/scanner.c");
    println!("cargo:rerun-if-changed=build.rs");

    let dir: PathBuf = ["src"].iter().collect();

    let mut build = cc::Build::new();
    build
        .std("c11")
        .include(&dir)
        .flag_if_supported("-Wno-unused-parameter")
        .flag_if_supported("-Wno-unused-but-set-variable");
    build.file(dir.join("parser.c"));

    // Doc comment bodies come from the external scanner.
    let scanner_path = dir.join("scanner.c");
    if scanner_path.exists() {
        build.file(&scanner_path);
    }

    build.compile("tree-sitter-cicode");
}
