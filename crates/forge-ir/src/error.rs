//! Error types for the IR crate.

use std::fmt;

use thiserror::Error;

use crate::register::RegisterKind;
use crate::validate::ValidationIssue;

/// Which operand count of an operation disagrees with its gate definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandKind {
    /// Quantum operands.
    Qubits,
    /// Classical operands.
    Clbits,
    /// Numeric parameters.
    Params,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandKind::Qubits => write!(f, "qubits"),
            OperandKind::Clbits => write!(f, "classical bits"),
            OperandKind::Params => write!(f, "parameters"),
        }
    }
}

/// Errors that can occur in IR operations.
///
/// Construction errors are raised by the call that violates the contract;
/// structural problems found while freezing are aggregated in
/// [`IrError::Validation`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A gate with this name is already in the catalog.
    #[error("Gate '{0}' is already registered")]
    DuplicateGate(String),

    /// A definition's arity disagrees with its canonical gate.
    #[error("Gate '{gate_name}' declares {declared} {kind}, but {canonical} takes {required}")]
    IncompatibleDefinition {
        /// Name of the definition.
        gate_name: String,
        /// Canonical gate it claims to be.
        canonical: String,
        /// Which count disagrees.
        kind: OperandKind,
        /// Count the definition declares.
        declared: String,
        /// Count the canonical gate takes.
        required: String,
    },

    /// Gate name does not resolve in the catalog.
    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    /// A register with this name is already declared.
    #[error("Register '{0}' is already declared")]
    DuplicateRegister(String),

    /// Register size must be positive.
    #[error("Register '{name}' has invalid size {size}")]
    InvalidSize {
        /// Register name.
        name: String,
        /// Requested size.
        size: u32,
    },

    /// Register name is not a valid identifier.
    #[error("Invalid register name '{0}'")]
    InvalidRegisterName(String),

    /// Reference to a register the circuit does not declare.
    #[error("Register #{register} is not declared in this circuit{}", format_gate_context(.gate_name))]
    UnknownRegister {
        /// Register id from the reference.
        register: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// A qubit reference points at a classical register or vice versa.
    #[error("Register '{register}' is {found}, expected {expected}{}", format_gate_context(.gate_name))]
    RegisterKindMismatch {
        /// Register name.
        register: String,
        /// Kind the operand slot requires.
        expected: RegisterKind,
        /// Kind of the referenced register.
        found: RegisterKind,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Operand or parameter count does not match the gate definition.
    #[error("Gate '{gate_name}' requires {expected} {kind}, got {got}")]
    ArityMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Which count is wrong.
        kind: OperandKind,
        /// Expected count (rendered, e.g. `2` or `at least 1`).
        expected: String,
        /// Actual count.
        got: usize,
    },

    /// Index exceeds the register size.
    #[error("Index {index} out of range for register '{register}' of size {size}{}", format_gate_context(.gate_name))]
    OutOfRange {
        /// Register name.
        register: String,
        /// Offending index.
        index: u32,
        /// Register size.
        size: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {register}[{index}] in operation{}", format_gate_context(.gate_name))]
    DuplicateOperand {
        /// Register name.
        register: String,
        /// Index within the register.
        index: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Parameter is NaN or infinite.
    #[error("Parameter {position} of gate '{gate_name}' is not a finite number")]
    NonFiniteParameter {
        /// Name of the gate.
        gate_name: String,
        /// Zero-based parameter position.
        position: usize,
    },

    /// The circuit has been frozen and can no longer be mutated.
    #[error("Circuit '{0}' is frozen")]
    CircuitFrozen(String),

    /// Library generator called with an unsupported width.
    #[error("Invalid width for {circuit}: {reason}")]
    InvalidWidth {
        /// Generator name.
        circuit: &'static str,
        /// Explanation.
        reason: String,
    },

    /// Freezing found structural violations.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// All structural violations found while freezing a circuit.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ValidationError {
    /// Every issue the validator reported, in check order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    /// Wrap a non-empty issue list.
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// Number of issues found.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether no issue was recorded.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circuit validation failed with {} issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
