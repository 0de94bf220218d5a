//! Quantum and classical registers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a register holds qubits or classical bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterKind {
    /// Quantum register.
    Quantum,
    /// Classical register.
    Classical,
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterKind::Quantum => write!(f, "quantum"),
            RegisterKind::Classical => write!(f, "classical"),
        }
    }
}

/// Identifier of a register within one circuit (its declaration position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegisterId(pub u32);

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for RegisterId {
    fn from(id: usize) -> Self {
        RegisterId(u32::try_from(id).unwrap_or(u32::MAX))
    }
}

/// A named, fixed-size register declared by a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Register {
    /// Register name, unique within the circuit.
    pub name: String,
    /// Quantum or classical.
    pub kind: RegisterKind,
    /// Number of bits.
    pub size: u32,
}

impl Register {
    /// Create a register description.
    pub fn new(name: impl Into<String>, kind: RegisterKind, size: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
        }
    }

    /// Create a quantum register description.
    pub fn quantum(name: impl Into<String>, size: u32) -> Self {
        Self::new(name, RegisterKind::Quantum, size)
    }

    /// Create a classical register description.
    pub fn classical(name: impl Into<String>, size: u32) -> Self {
        Self::new(name, RegisterKind::Classical, size)
    }

    /// Whether this is a quantum register.
    #[inline]
    pub fn is_quantum(&self) -> bool {
        self.kind == RegisterKind::Quantum
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}[{}]", self.kind, self.name, self.size)
    }
}

/// OpenQASM 3 keywords and builtins that cannot name a register.
const RESERVED_WORDS: &[&str] = &[
    "OPENQASM", "U", "angle", "array", "barrier", "bit", "bool", "box", "break", "cal", "case",
    "complex", "const", "continue", "creg", "ctrl", "def", "defcal", "defcalgrammar", "default",
    "delay", "duration", "durationof", "else", "end", "euler", "extern", "false", "float", "for",
    "gate", "gphase", "if", "im", "in", "include", "input", "int", "inv", "let", "measure",
    "mutable", "negctrl", "output", "pi", "pow", "qreg", "qubit", "readonly", "reset", "return",
    "sizeof", "stretch", "switch", "tau", "true", "uint", "void", "while",
];

/// Whether `name` is usable as a register identifier in every target format.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !RESERVED_WORDS.contains(&name)
}

/// A reference to one bit of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BitRef {
    /// The register the bit belongs to.
    pub register: RegisterId,
    /// Index within the register.
    pub index: u32,
}

impl BitRef {
    /// Create a bit reference.
    pub fn new(register: RegisterId, index: u32) -> Self {
        Self { register, index }
    }
}

/// Handle returned when a register is declared.
///
/// Handles are cheap to copy and only produce references; bounds are
/// checked when an operation using them is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterHandle {
    id: RegisterId,
    kind: RegisterKind,
    size: u32,
}

impl RegisterHandle {
    pub(crate) fn new(id: RegisterId, kind: RegisterKind, size: u32) -> Self {
        Self { id, kind, size }
    }

    /// The register id.
    pub fn id(&self) -> RegisterId {
        self.id
    }

    /// The register kind.
    pub fn kind(&self) -> RegisterKind {
        self.kind
    }

    /// The register size.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Reference bit `index` of this register.
    #[inline]
    pub fn bit(&self, index: u32) -> BitRef {
        BitRef::new(self.id, index)
    }

    /// References to every bit, in index order.
    pub fn bits(&self) -> impl Iterator<Item = BitRef> + '_ {
        (0..self.size).map(|i| self.bit(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_display() {
        let q = Register::quantum("q", 3);
        assert_eq!(format!("{q}"), "quantum q[3]");

        let c = Register::classical("meas", 2);
        assert_eq!(format!("{c}"), "classical meas[2]");
        assert!(!c.is_quantum());
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_valid_identifier("q"));
        assert!(is_valid_identifier("_anc2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2q"));
        assert!(!is_valid_identifier("q[0]"));
        assert!(!is_valid_identifier("a-b"));
    }

    #[test]
    fn test_reserved_words_rejected() {
        for name in ["measure", "qubit", "bit", "gate", "reset", "pi", "include"] {
            assert!(!is_valid_identifier(name), "{name}");
        }
        assert!(is_valid_identifier("included"));
        assert!(is_valid_identifier("measured"));
    }

    #[test]
    fn test_handle_bits() {
        let handle = RegisterHandle::new(RegisterId(1), RegisterKind::Quantum, 3);
        let bits: Vec<_> = handle.bits().collect();
        assert_eq!(bits.len(), 3);
        assert_eq!(bits[2], BitRef::new(RegisterId(1), 2));
    }
}
