//! Tests for writing QASM programs to disk.

use forge_emit::{EmitError, Qasm3Emitter, save_qasm_file};
use forge_ir::library::{self, AdderSpec};

#[test]
fn test_save_creates_directory_and_names_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("qasm").join("adders");

    let spec = AdderSpec::new(8);
    let mut circuit = library::adder(&spec).unwrap();
    let frozen = circuit.freeze().unwrap();
    let program = Qasm3Emitter::new().emit_program(&frozen).unwrap();

    let path = save_qasm_file(&program, &target, "adder", frozen.num_qubits()).unwrap();
    assert_eq!(path, target.join("adder_n19.qasm"));

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, program.source);
    assert!(written.starts_with("OPENQASM 3.0;\n"));
}

#[test]
fn test_save_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let emitter = Qasm3Emitter::new();

    let bell = emitter
        .emit_program(&library::bell().unwrap().freeze().unwrap())
        .unwrap();
    let ghz = emitter
        .emit_program(&library::ghz(2).unwrap().freeze().unwrap())
        .unwrap();

    save_qasm_file(&bell, dir.path(), "state", 2).unwrap();
    let path = save_qasm_file(&ghz, dir.path(), "state", 2).unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), ghz.source);
}

#[test]
fn test_save_into_file_path_fails_with_io() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let program = Qasm3Emitter::new()
        .emit_program(&library::bell().unwrap().freeze().unwrap())
        .unwrap();
    let result = save_qasm_file(&program, &blocker, "bell", 2);
    assert!(matches!(result, Err(EmitError::Io(_))));
}
