//! Structural validation of circuit data.
//!
//! [`validate`] runs every check and accumulates the findings; it is what
//! [`Circuit::freeze`](crate::Circuit::freeze) uses. The per-operation
//! checks are shared with [`Circuit::add_operation`](crate::Circuit::add_operation),
//! which reports the first finding immediately.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::{Arity, GateCatalog, GateDefinition};
use crate::circuit::CircuitData;
use crate::error::{IrError, OperandKind};
use crate::operation::Operation;
use crate::register::{BitRef, Register, RegisterKind, is_valid_identifier};

/// A single structural violation.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// Two registers share a name.
    #[error("register '{name}' is declared more than once")]
    DuplicateRegister {
        /// Register name.
        name: String,
    },

    /// Register declared with size 0.
    #[error("register '{name}' has invalid size {size}")]
    InvalidSize {
        /// Register name.
        name: String,
        /// Declared size.
        size: u32,
    },

    /// Register name is not an identifier.
    #[error("register name '{name}' is not a valid identifier")]
    InvalidRegisterName {
        /// Register name.
        name: String,
    },

    /// Gate name does not resolve in the catalog.
    #[error("operation {operation}: unknown gate '{gate}'")]
    UnknownGate {
        /// Operation position.
        operation: usize,
        /// Gate name.
        gate: String,
    },

    /// Reference to an undeclared register.
    #[error("operation {operation} ({gate}): register #{register} is not declared")]
    UnknownRegister {
        /// Operation position.
        operation: usize,
        /// Gate name.
        gate: String,
        /// Register id from the reference.
        register: u32,
    },

    /// Operand slot and register kind disagree.
    #[error("operation {operation} ({gate}): register '{register}' is {found}, expected {expected}")]
    RegisterKindMismatch {
        /// Operation position.
        operation: usize,
        /// Gate name.
        gate: String,
        /// Register name.
        register: String,
        /// Kind the slot requires.
        expected: RegisterKind,
        /// Kind of the register.
        found: RegisterKind,
    },

    /// Index past the end of the register.
    #[error("operation {operation} ({gate}): index {index} out of range for '{register}' of size {size}")]
    OutOfRange {
        /// Operation position.
        operation: usize,
        /// Gate name.
        gate: String,
        /// Register name.
        register: String,
        /// Offending index.
        index: u32,
        /// Register size.
        size: u32,
    },

    /// Operand or parameter count differs from the definition.
    #[error("operation {operation} ({gate}): expected {expected} {kind}, got {got}")]
    ArityMismatch {
        /// Operation position.
        operation: usize,
        /// Gate name.
        gate: String,
        /// Which count is wrong.
        kind: OperandKind,
        /// Expected count.
        expected: String,
        /// Actual count.
        got: usize,
    },

    /// The same qubit appears twice in one operation.
    #[error("operation {operation} ({gate}): qubit {register}[{index}] used more than once")]
    DuplicateOperand {
        /// Operation position.
        operation: usize,
        /// Gate name.
        gate: String,
        /// Register name.
        register: String,
        /// Index within the register.
        index: u32,
    },

    /// Parameter is NaN or infinite.
    #[error("operation {operation} ({gate}): parameter {position} is not finite")]
    NonFiniteParameter {
        /// Operation position.
        operation: usize,
        /// Gate name.
        gate: String,
        /// Parameter position.
        position: usize,
    },
}

impl From<ValidationIssue> for IrError {
    fn from(issue: ValidationIssue) -> Self {
        match issue {
            ValidationIssue::DuplicateRegister { name } => IrError::DuplicateRegister(name),
            ValidationIssue::InvalidSize { name, size } => IrError::InvalidSize { name, size },
            ValidationIssue::InvalidRegisterName { name } => IrError::InvalidRegisterName(name),
            ValidationIssue::UnknownGate { gate, .. } => IrError::UnknownGate(gate),
            ValidationIssue::UnknownRegister { gate, register, .. } => IrError::UnknownRegister {
                register,
                gate_name: Some(gate),
            },
            ValidationIssue::RegisterKindMismatch {
                gate,
                register,
                expected,
                found,
                ..
            } => IrError::RegisterKindMismatch {
                register,
                expected,
                found,
                gate_name: Some(gate),
            },
            ValidationIssue::OutOfRange {
                gate,
                register,
                index,
                size,
                ..
            } => IrError::OutOfRange {
                register,
                index,
                size,
                gate_name: Some(gate),
            },
            ValidationIssue::ArityMismatch {
                gate,
                kind,
                expected,
                got,
                ..
            } => IrError::ArityMismatch {
                gate_name: gate,
                kind,
                expected,
                got,
            },
            ValidationIssue::DuplicateOperand {
                gate,
                register,
                index,
                ..
            } => IrError::DuplicateOperand {
                register,
                index,
                gate_name: Some(gate),
            },
            ValidationIssue::NonFiniteParameter { gate, position, .. } => {
                IrError::NonFiniteParameter {
                    gate_name: gate,
                    position,
                }
            }
        }
    }
}

/// Check circuit data against a catalog.
///
/// Checks run in a fixed order and every finding is kept: register
/// declarations, gate resolution, operand references, operand and
/// parameter counts, duplicate qubits, then parameter values. An empty
/// result means the data is valid.
pub fn validate(data: &CircuitData, catalog: &GateCatalog) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_registers(&data.registers, &mut issues);

    let definitions: Vec<Option<Arc<GateDefinition>>> = data
        .operations
        .iter()
        .enumerate()
        .map(|(i, op)| check_gate(i, op, catalog, &mut issues))
        .collect();

    for (i, op) in data.operations.iter().enumerate() {
        check_references(i, op, &data.registers, &mut issues);
    }

    for (i, (op, def)) in data.operations.iter().zip(&definitions).enumerate() {
        if let Some(def) = def {
            check_arity(i, op, def, &mut issues);
        }
    }

    for (i, op) in data.operations.iter().enumerate() {
        check_duplicates(i, op, &data.registers, &mut issues);
    }

    for (i, op) in data.operations.iter().enumerate() {
        check_params(i, op, &mut issues);
    }

    issues
}

/// Check a single register declaration against those already declared.
pub(crate) fn register_issue(existing: &[Register], candidate: &Register) -> Option<ValidationIssue> {
    if !is_valid_identifier(&candidate.name) {
        return Some(ValidationIssue::InvalidRegisterName {
            name: candidate.name.clone(),
        });
    }
    if candidate.size == 0 {
        return Some(ValidationIssue::InvalidSize {
            name: candidate.name.clone(),
            size: candidate.size,
        });
    }
    if existing.iter().any(|r| r.name == candidate.name) {
        return Some(ValidationIssue::DuplicateRegister {
            name: candidate.name.clone(),
        });
    }
    None
}

/// Run the per-operation checks for an operation about to be appended at
/// position `index`, in validator order.
pub(crate) fn operation_issues(
    index: usize,
    op: &Operation,
    registers: &[Register],
    catalog: &GateCatalog,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let def = check_gate(index, op, catalog, &mut issues);
    check_references(index, op, registers, &mut issues);
    if let Some(def) = def {
        check_arity(index, op, &def, &mut issues);
    }
    check_duplicates(index, op, registers, &mut issues);
    check_params(index, op, &mut issues);
    issues
}

fn check_registers(registers: &[Register], issues: &mut Vec<ValidationIssue>) {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for register in registers {
        if !seen.insert(register.name.as_str()) {
            issues.push(ValidationIssue::DuplicateRegister {
                name: register.name.clone(),
            });
        }
        if register.size == 0 {
            issues.push(ValidationIssue::InvalidSize {
                name: register.name.clone(),
                size: register.size,
            });
        }
        if !is_valid_identifier(&register.name) {
            issues.push(ValidationIssue::InvalidRegisterName {
                name: register.name.clone(),
            });
        }
    }
}

fn check_gate(
    index: usize,
    op: &Operation,
    catalog: &GateCatalog,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Arc<GateDefinition>> {
    match catalog.lookup(&op.gate) {
        Ok(def) => Some(def),
        Err(_) => {
            issues.push(ValidationIssue::UnknownGate {
                operation: index,
                gate: op.gate.clone(),
            });
            None
        }
    }
}

fn check_references(
    index: usize,
    op: &Operation,
    registers: &[Register],
    issues: &mut Vec<ValidationIssue>,
) {
    let slots = op
        .qubits
        .iter()
        .map(|b| (b, RegisterKind::Quantum))
        .chain(op.clbits.iter().map(|b| (b, RegisterKind::Classical)));

    for (bit, expected) in slots {
        let Some(register) = registers.get(bit.register.0 as usize) else {
            issues.push(ValidationIssue::UnknownRegister {
                operation: index,
                gate: op.gate.clone(),
                register: bit.register.0,
            });
            continue;
        };
        if register.kind != expected {
            issues.push(ValidationIssue::RegisterKindMismatch {
                operation: index,
                gate: op.gate.clone(),
                register: register.name.clone(),
                expected,
                found: register.kind,
            });
        } else if bit.index >= register.size {
            issues.push(ValidationIssue::OutOfRange {
                operation: index,
                gate: op.gate.clone(),
                register: register.name.clone(),
                index: bit.index,
                size: register.size,
            });
        }
    }
}

fn check_arity(
    index: usize,
    op: &Operation,
    def: &GateDefinition,
    issues: &mut Vec<ValidationIssue>,
) {
    let counts = [
        (OperandKind::Qubits, def.num_qubits(), op.qubits.len()),
        (
            OperandKind::Clbits,
            Arity::Exactly(def.num_clbits()),
            op.clbits.len(),
        ),
        (
            OperandKind::Params,
            Arity::Exactly(def.num_params()),
            op.params.len(),
        ),
    ];
    for (kind, expected, got) in counts {
        if !expected.accepts(got) {
            issues.push(ValidationIssue::ArityMismatch {
                operation: index,
                gate: op.gate.clone(),
                kind,
                expected: expected.to_string(),
                got,
            });
        }
    }
}

fn check_duplicates(
    index: usize,
    op: &Operation,
    registers: &[Register],
    issues: &mut Vec<ValidationIssue>,
) {
    let mut seen: FxHashSet<BitRef> = FxHashSet::default();
    for bit in &op.qubits {
        if !seen.insert(*bit) {
            let register = registers
                .get(bit.register.0 as usize)
                .map_or_else(|| bit.register.to_string(), |r| r.name.clone());
            issues.push(ValidationIssue::DuplicateOperand {
                operation: index,
                gate: op.gate.clone(),
                register,
                index: bit.index,
            });
        }
    }
}

fn check_params(index: usize, op: &Operation, issues: &mut Vec<ValidationIssue>) {
    for (position, value) in op.params.iter().enumerate() {
        if !value.is_finite() {
            issues.push(ValidationIssue::NonFiniteParameter {
                operation: index,
                gate: op.gate.clone(),
                position,
            });
        }
    }
}
