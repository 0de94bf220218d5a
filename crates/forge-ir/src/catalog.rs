//! Gate catalog: the set of operations a circuit may use.
//!
//! Every gate name used in a circuit resolves through a [`GateCatalog`] to
//! a [`GateDefinition`]. Definitions carry a [`CanonicalGate`] id so that
//! differently named but equivalent gates (`cx` and `cnot`) lower to the
//! same construct in every target.
//!
//! Catalogs are populated once through [`GateCatalogBuilder`] and then
//! shared read-only behind an [`Arc`].

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};
use std::fmt;
use std::sync::Arc;

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IrError, IrResult, OperandKind};

/// Backend-independent identity of a gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx,
    /// Rotation around Y axis.
    Ry,
    /// Rotation around Z axis.
    Rz,
    /// Phase gate.
    P,
    /// Universal single-qubit gate U(θ, φ, λ).
    U,
    /// Phased RX gate: PRX(θ, φ) = RZ(φ) · RX(θ) · RZ(-φ).
    PRX,

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// iSWAP gate.
    ISwap,
    /// Controlled rotation around X.
    CRx,
    /// Controlled rotation around Y.
    CRy,
    /// Controlled rotation around Z.
    CRz,
    /// Controlled phase gate.
    CP,
    /// XX rotation gate.
    RXX,
    /// YY rotation gate.
    RYY,
    /// ZZ rotation gate.
    RZZ,

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,

    // Non-unitary operations
    /// Measurement of one qubit into one classical bit.
    Measure,
    /// Reset qubit to |0⟩.
    Reset,
    /// Barrier (synchronization point) over any number of qubits.
    Barrier,

    /// A user-registered operation with no standard identity.
    Opaque(String),
}

impl CanonicalGate {
    /// Every standard (non-opaque) canonical id, in a fixed order.
    pub fn standard_set() -> Vec<CanonicalGate> {
        use CanonicalGate::*;
        vec![
            I, X, Y, Z, H, S, Sdg, T, Tdg, SX, SXdg, Rx, Ry, Rz, P, U, PRX, CX, CY, CZ, CH, Swap,
            ISwap, CRx, CRy, CRz, CP, RXX, RYY, RZZ, CCX, CSwap, Measure, Reset, Barrier,
        ]
    }

    /// Stable textual id.
    pub fn id(&self) -> &str {
        match self {
            CanonicalGate::I => "id",
            CanonicalGate::X => "x",
            CanonicalGate::Y => "y",
            CanonicalGate::Z => "z",
            CanonicalGate::H => "h",
            CanonicalGate::S => "s",
            CanonicalGate::Sdg => "sdg",
            CanonicalGate::T => "t",
            CanonicalGate::Tdg => "tdg",
            CanonicalGate::SX => "sx",
            CanonicalGate::SXdg => "sxdg",
            CanonicalGate::Rx => "rx",
            CanonicalGate::Ry => "ry",
            CanonicalGate::Rz => "rz",
            CanonicalGate::P => "p",
            CanonicalGate::U => "u",
            CanonicalGate::PRX => "prx",
            CanonicalGate::CX => "cx",
            CanonicalGate::CY => "cy",
            CanonicalGate::CZ => "cz",
            CanonicalGate::CH => "ch",
            CanonicalGate::Swap => "swap",
            CanonicalGate::ISwap => "iswap",
            CanonicalGate::CRx => "crx",
            CanonicalGate::CRy => "cry",
            CanonicalGate::CRz => "crz",
            CanonicalGate::CP => "cp",
            CanonicalGate::RXX => "rxx",
            CanonicalGate::RYY => "ryy",
            CanonicalGate::RZZ => "rzz",
            CanonicalGate::CCX => "ccx",
            CanonicalGate::CSwap => "cswap",
            CanonicalGate::Measure => "measure",
            CanonicalGate::Reset => "reset",
            CanonicalGate::Barrier => "barrier",
            CanonicalGate::Opaque(name) => name,
        }
    }

    /// Number of qubits this operation acts on.
    ///
    /// Opaque gates report `AtLeast(0)`; their arity lives on the definition.
    pub fn num_qubits(&self) -> Arity {
        match self {
            CanonicalGate::I
            | CanonicalGate::X
            | CanonicalGate::Y
            | CanonicalGate::Z
            | CanonicalGate::H
            | CanonicalGate::S
            | CanonicalGate::Sdg
            | CanonicalGate::T
            | CanonicalGate::Tdg
            | CanonicalGate::SX
            | CanonicalGate::SXdg
            | CanonicalGate::Rx
            | CanonicalGate::Ry
            | CanonicalGate::Rz
            | CanonicalGate::P
            | CanonicalGate::U
            | CanonicalGate::PRX
            | CanonicalGate::Measure
            | CanonicalGate::Reset => Arity::Exactly(1),

            CanonicalGate::CX
            | CanonicalGate::CY
            | CanonicalGate::CZ
            | CanonicalGate::CH
            | CanonicalGate::Swap
            | CanonicalGate::ISwap
            | CanonicalGate::CRx
            | CanonicalGate::CRy
            | CanonicalGate::CRz
            | CanonicalGate::CP
            | CanonicalGate::RXX
            | CanonicalGate::RYY
            | CanonicalGate::RZZ => Arity::Exactly(2),

            CanonicalGate::CCX | CanonicalGate::CSwap => Arity::Exactly(3),

            CanonicalGate::Barrier => Arity::AtLeast(1),
            CanonicalGate::Opaque(_) => Arity::AtLeast(0),
        }
    }

    /// Number of classical bits this operation writes.
    pub fn num_clbits(&self) -> u32 {
        match self {
            CanonicalGate::Measure => 1,
            _ => 0,
        }
    }

    /// Number of numeric parameters.
    pub fn num_params(&self) -> u32 {
        match self {
            CanonicalGate::Rx
            | CanonicalGate::Ry
            | CanonicalGate::Rz
            | CanonicalGate::P
            | CanonicalGate::CRx
            | CanonicalGate::CRy
            | CanonicalGate::CRz
            | CanonicalGate::CP
            | CanonicalGate::RXX
            | CanonicalGate::RYY
            | CanonicalGate::RZZ => 1,
            CanonicalGate::PRX => 2,
            CanonicalGate::U => 3,
            _ => 0,
        }
    }

    /// Whether this is a unitary gate (as opposed to measure/reset/barrier).
    pub fn is_unitary(&self) -> bool {
        !matches!(
            self,
            CanonicalGate::Measure
                | CanonicalGate::Reset
                | CanonicalGate::Barrier
                | CanonicalGate::Opaque(_)
        )
    }

    /// Row-major unitary for this gate with the given parameters.
    ///
    /// Operands are ordered most significant first, so for controlled gates
    /// the controls come first. Returns `None` for non-unitary or opaque
    /// operations and when the parameter count is wrong.
    pub fn matrix(&self, params: &[f64]) -> Option<Vec<Complex64>> {
        if params.len() != self.num_params() as usize || !self.is_unitary() {
            return None;
        }
        let m = match self {
            CanonicalGate::I => vec![one(), zero(), zero(), one()],
            CanonicalGate::X => pauli_x(),
            CanonicalGate::Y => pauli_y(),
            CanonicalGate::Z => pauli_z(),
            CanonicalGate::H => hadamard(),
            CanonicalGate::S => phase(std::f64::consts::FRAC_PI_2),
            CanonicalGate::Sdg => phase(-std::f64::consts::FRAC_PI_2),
            CanonicalGate::T => phase(FRAC_PI_4),
            CanonicalGate::Tdg => phase(-FRAC_PI_4),
            CanonicalGate::SX => vec![
                Complex64::new(0.5, 0.5),
                Complex64::new(0.5, -0.5),
                Complex64::new(0.5, -0.5),
                Complex64::new(0.5, 0.5),
            ],
            CanonicalGate::SXdg => vec![
                Complex64::new(0.5, -0.5),
                Complex64::new(0.5, 0.5),
                Complex64::new(0.5, 0.5),
                Complex64::new(0.5, -0.5),
            ],
            CanonicalGate::Rx => rx(params[0]),
            CanonicalGate::Ry => ry(params[0]),
            CanonicalGate::Rz => rz(params[0]),
            CanonicalGate::P => phase(params[0]),
            CanonicalGate::U => u3(params[0], params[1], params[2]),
            CanonicalGate::PRX => prx(params[0], params[1]),
            CanonicalGate::CX => controlled(&pauli_x(), 1),
            CanonicalGate::CY => controlled(&pauli_y(), 1),
            CanonicalGate::CZ => controlled(&pauli_z(), 1),
            CanonicalGate::CH => controlled(&hadamard(), 1),
            CanonicalGate::CRx => controlled(&rx(params[0]), 1),
            CanonicalGate::CRy => controlled(&ry(params[0]), 1),
            CanonicalGate::CRz => controlled(&rz(params[0]), 1),
            CanonicalGate::CP => controlled(&phase(params[0]), 1),
            CanonicalGate::Swap => swap(),
            CanonicalGate::ISwap => {
                let mut m = swap();
                m[6] = Complex64::i();
                m[9] = Complex64::i();
                m
            }
            CanonicalGate::RXX => {
                let (c, s) = half_angle(params[0]);
                let ms = Complex64::new(0.0, -s);
                let c = Complex64::new(c, 0.0);
                vec![
                    c, zero(), zero(), ms, //
                    zero(), c, ms, zero(), //
                    zero(), ms, c, zero(), //
                    ms, zero(), zero(), c,
                ]
            }
            CanonicalGate::RYY => {
                let (c, s) = half_angle(params[0]);
                let ps = Complex64::new(0.0, s);
                let ms = Complex64::new(0.0, -s);
                let c = Complex64::new(c, 0.0);
                vec![
                    c, zero(), zero(), ps, //
                    zero(), c, ms, zero(), //
                    zero(), ms, c, zero(), //
                    ps, zero(), zero(), c,
                ]
            }
            CanonicalGate::RZZ => {
                let neg = Complex64::from_polar(1.0, -params[0] / 2.0);
                let pos = Complex64::from_polar(1.0, params[0] / 2.0);
                diagonal(&[neg, pos, pos, neg])
            }
            CanonicalGate::CCX => controlled(&pauli_x(), 2),
            CanonicalGate::CSwap => controlled(&swap(), 1),
            CanonicalGate::Measure
            | CanonicalGate::Reset
            | CanonicalGate::Barrier
            | CanonicalGate::Opaque(_) => return None,
        };
        Some(m)
    }
}

impl fmt::Display for CanonicalGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Number of operands a gate accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// Exactly `n` operands.
    Exactly(u32),
    /// `n` or more operands (variadic operations such as barriers).
    AtLeast(u32),
}

impl Arity {
    /// Whether `count` operands satisfy this arity.
    #[inline]
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n as usize,
            Arity::AtLeast(n) => count >= n as usize,
        }
    }
}

impl Arity {
    /// Whether every operand count this arity accepts is also accepted by `outer`.
    pub fn is_within(&self, outer: Arity) -> bool {
        match (*self, outer) {
            (Arity::Exactly(n), Arity::Exactly(m)) => n == m,
            (Arity::Exactly(n) | Arity::AtLeast(n), Arity::AtLeast(m)) => n >= m,
            (Arity::AtLeast(_), Arity::Exactly(_)) => false,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Definition of one catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDefinition {
    name: String,
    canonical: CanonicalGate,
    num_qubits: Arity,
    num_clbits: u32,
    num_params: u32,
}

impl GateDefinition {
    /// Create a definition with explicit arities.
    pub fn new(
        name: impl Into<String>,
        canonical: CanonicalGate,
        num_qubits: Arity,
        num_clbits: u32,
        num_params: u32,
    ) -> Self {
        Self {
            name: name.into(),
            canonical,
            num_qubits,
            num_clbits,
            num_params,
        }
    }

    /// Create a definition whose arities follow the canonical gate.
    pub fn standard(name: impl Into<String>, canonical: CanonicalGate) -> Self {
        let num_qubits = canonical.num_qubits();
        let num_clbits = canonical.num_clbits();
        let num_params = canonical.num_params();
        Self::new(name, canonical, num_qubits, num_clbits, num_params)
    }

    /// Create an opaque definition: a named operation with no standard identity.
    pub fn opaque(name: impl Into<String>, num_qubits: u32, num_params: u32) -> Self {
        let name = name.into();
        let canonical = CanonicalGate::Opaque(name.clone());
        Self::new(name, canonical, Arity::Exactly(num_qubits), 0, num_params)
    }

    /// The catalog name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical id.
    pub fn canonical(&self) -> &CanonicalGate {
        &self.canonical
    }

    /// Qubit arity.
    pub fn num_qubits(&self) -> Arity {
        self.num_qubits
    }

    /// Classical-bit arity.
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Parameter arity.
    pub fn num_params(&self) -> u32 {
        self.num_params
    }

    /// Check the declared arities against the canonical gate.
    ///
    /// Opaque definitions carry their own arity and always pass.
    pub fn check_arity(&self) -> IrResult<()> {
        if let CanonicalGate::Opaque(_) = self.canonical {
            return Ok(());
        }
        let incompatible =
            |kind, declared: String, required: String| IrError::IncompatibleDefinition {
                gate_name: self.name.clone(),
                canonical: self.canonical.id().to_string(),
                kind,
                declared,
                required,
            };
        let qubits = self.canonical.num_qubits();
        if !self.num_qubits.is_within(qubits) {
            return Err(incompatible(
                OperandKind::Qubits,
                self.num_qubits.to_string(),
                qubits.to_string(),
            ));
        }
        if self.num_clbits != self.canonical.num_clbits() {
            return Err(incompatible(
                OperandKind::Clbits,
                self.num_clbits.to_string(),
                self.canonical.num_clbits().to_string(),
            ));
        }
        if self.num_params != self.canonical.num_params() {
            return Err(incompatible(
                OperandKind::Params,
                self.num_params.to_string(),
                self.canonical.num_params().to_string(),
            ));
        }
        Ok(())
    }

    /// Semantic definition as a unitary matrix, if the gate has one.
    pub fn matrix(&self, params: &[f64]) -> Option<Vec<Complex64>> {
        if params.len() != self.num_params as usize {
            return None;
        }
        self.canonical.matrix(params)
    }
}

/// Immutable registry of gate definitions keyed by name.
#[derive(Debug, Clone, Default)]
pub struct GateCatalog {
    gates: FxHashMap<String, Arc<GateDefinition>>,
    order: Vec<String>,
}

/// Standard names and aliases, in registration order.
fn standard_names() -> Vec<(&'static str, CanonicalGate)> {
    vec![
        ("id", CanonicalGate::I),
        ("x", CanonicalGate::X),
        ("y", CanonicalGate::Y),
        ("z", CanonicalGate::Z),
        ("h", CanonicalGate::H),
        ("s", CanonicalGate::S),
        ("sdg", CanonicalGate::Sdg),
        ("t", CanonicalGate::T),
        ("tdg", CanonicalGate::Tdg),
        ("sx", CanonicalGate::SX),
        ("sxdg", CanonicalGate::SXdg),
        ("rx", CanonicalGate::Rx),
        ("ry", CanonicalGate::Ry),
        ("rz", CanonicalGate::Rz),
        ("p", CanonicalGate::P),
        ("u", CanonicalGate::U),
        ("prx", CanonicalGate::PRX),
        ("cx", CanonicalGate::CX),
        ("cy", CanonicalGate::CY),
        ("cz", CanonicalGate::CZ),
        ("ch", CanonicalGate::CH),
        ("swap", CanonicalGate::Swap),
        ("iswap", CanonicalGate::ISwap),
        ("crx", CanonicalGate::CRx),
        ("cry", CanonicalGate::CRy),
        ("crz", CanonicalGate::CRz),
        ("cp", CanonicalGate::CP),
        ("rxx", CanonicalGate::RXX),
        ("ryy", CanonicalGate::RYY),
        ("rzz", CanonicalGate::RZZ),
        ("ccx", CanonicalGate::CCX),
        ("cswap", CanonicalGate::CSwap),
        ("measure", CanonicalGate::Measure),
        ("reset", CanonicalGate::Reset),
        ("barrier", CanonicalGate::Barrier),
        // Aliases
        ("cnot", CanonicalGate::CX),
        ("toffoli", CanonicalGate::CCX),
        ("fredkin", CanonicalGate::CSwap),
        ("u3", CanonicalGate::U),
        ("phase", CanonicalGate::P),
        ("cphase", CanonicalGate::CP),
        ("r", CanonicalGate::PRX),
    ]
}

impl GateCatalog {
    /// Start populating a new, empty catalog.
    pub fn builder() -> GateCatalogBuilder {
        GateCatalogBuilder::new()
    }

    /// The standard catalog: every canonical gate under its id plus common aliases.
    pub fn standard() -> Arc<Self> {
        GateCatalogBuilder::standard().build()
    }

    /// Look up a definition by name.
    pub fn lookup(&self, name: &str) -> IrResult<Arc<GateDefinition>> {
        self.gates
            .get(name)
            .cloned()
            .ok_or_else(|| IrError::UnknownGate(name.to_string()))
    }

    /// Borrow a definition by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&GateDefinition> {
        self.gates.get(name).map(AsRef::as_ref)
    }

    /// Canonical id of the gate registered under `name`.
    pub fn canonical_form(&self, name: &str) -> IrResult<CanonicalGate> {
        self.get(name)
            .map(|def| def.canonical().clone())
            .ok_or_else(|| IrError::UnknownGate(name.to_string()))
    }

    /// First registered name whose canonical id is `canonical`.
    pub fn primary_name(&self, canonical: &CanonicalGate) -> Option<&str> {
        self.order
            .iter()
            .find(|name| {
                self.gates
                    .get(name.as_str())
                    .is_some_and(|def| def.canonical() == canonical)
            })
            .map(String::as_str)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.gates.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Derive a catalog holding only `names`, keeping this catalog's order.
    pub fn restrict<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> IrResult<Arc<Self>> {
        let wanted: Vec<&str> = names.into_iter().collect();
        for name in &wanted {
            if !self.contains(name) {
                return Err(IrError::UnknownGate((*name).to_string()));
            }
        }
        let mut builder = GateCatalogBuilder::new();
        for name in &self.order {
            if wanted.contains(&name.as_str()) {
                if let Some(def) = self.gates.get(name) {
                    builder.insert(Arc::clone(def));
                }
            }
        }
        Ok(builder.build())
    }
}

/// Startup-time population of a [`GateCatalog`].
#[derive(Debug, Default)]
pub struct GateCatalogBuilder {
    catalog: GateCatalog,
}

impl GateCatalogBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder pre-populated with the standard gates and aliases.
    pub fn standard() -> Self {
        let mut builder = Self::new();
        for (name, canonical) in standard_names() {
            builder.insert(Arc::new(GateDefinition::standard(name, canonical)));
        }
        builder
    }

    /// Register a definition.
    ///
    /// Fails if the name is already taken, or if a standard definition's
    /// arity disagrees with its canonical gate.
    pub fn register(&mut self, definition: GateDefinition) -> IrResult<&mut Self> {
        if self.catalog.contains(definition.name()) {
            return Err(IrError::DuplicateGate(definition.name().to_string()));
        }
        definition.check_arity()?;
        debug!(
            "Registering gate '{}' as {}",
            definition.name(),
            definition.canonical()
        );
        self.insert(Arc::new(definition));
        Ok(self)
    }

    fn insert(&mut self, definition: Arc<GateDefinition>) {
        let name = definition.name().to_string();
        if self.catalog.gates.insert(name.clone(), definition).is_none() {
            self.catalog.order.push(name);
        }
    }

    /// Finish population.
    pub fn build(self) -> Arc<GateCatalog> {
        Arc::new(self.catalog)
    }
}

// =========================================================================
// Matrix helpers
// =========================================================================

fn zero() -> Complex64 {
    Complex64::new(0.0, 0.0)
}

fn one() -> Complex64 {
    Complex64::new(1.0, 0.0)
}

fn half_angle(theta: f64) -> (f64, f64) {
    ((theta / 2.0).cos(), (theta / 2.0).sin())
}

fn pauli_x() -> Vec<Complex64> {
    vec![zero(), one(), one(), zero()]
}

fn pauli_y() -> Vec<Complex64> {
    vec![zero(), -Complex64::i(), Complex64::i(), zero()]
}

fn pauli_z() -> Vec<Complex64> {
    vec![one(), zero(), zero(), -one()]
}

fn hadamard() -> Vec<Complex64> {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    vec![h, h, h, -h]
}

fn phase(theta: f64) -> Vec<Complex64> {
    vec![one(), zero(), zero(), Complex64::from_polar(1.0, theta)]
}

fn rx(theta: f64) -> Vec<Complex64> {
    let (c, s) = half_angle(theta);
    vec![
        Complex64::new(c, 0.0),
        Complex64::new(0.0, -s),
        Complex64::new(0.0, -s),
        Complex64::new(c, 0.0),
    ]
}

fn ry(theta: f64) -> Vec<Complex64> {
    let (c, s) = half_angle(theta);
    vec![
        Complex64::new(c, 0.0),
        Complex64::new(-s, 0.0),
        Complex64::new(s, 0.0),
        Complex64::new(c, 0.0),
    ]
}

fn rz(theta: f64) -> Vec<Complex64> {
    vec![
        Complex64::from_polar(1.0, -theta / 2.0),
        zero(),
        zero(),
        Complex64::from_polar(1.0, theta / 2.0),
    ]
}

fn u3(theta: f64, phi: f64, lambda: f64) -> Vec<Complex64> {
    let (c, s) = half_angle(theta);
    vec![
        Complex64::new(c, 0.0),
        -Complex64::from_polar(s, lambda),
        Complex64::from_polar(s, phi),
        Complex64::from_polar(c, phi + lambda),
    ]
}

fn prx(theta: f64, phi: f64) -> Vec<Complex64> {
    let (c, s) = half_angle(theta);
    let mi = -Complex64::i();
    vec![
        Complex64::new(c, 0.0),
        mi * Complex64::from_polar(s, -phi),
        mi * Complex64::from_polar(s, phi),
        Complex64::new(c, 0.0),
    ]
}

fn swap() -> Vec<Complex64> {
    let mut m = vec![zero(); 16];
    m[0] = one();
    m[6] = one();
    m[9] = one();
    m[15] = one();
    m
}

fn diagonal(entries: &[Complex64]) -> Vec<Complex64> {
    let dim = entries.len();
    let mut m = vec![zero(); dim * dim];
    for (i, &value) in entries.iter().enumerate() {
        m[i * dim + i] = value;
    }
    m
}

/// Identity everywhere except the block where all `num_controls` leading
/// qubits are set, which holds `target`.
fn controlled(target: &[Complex64], num_controls: u32) -> Vec<Complex64> {
    let target_dim = (target.len() as f64).sqrt() as usize;
    let dim = target_dim << num_controls;
    let offset = dim - target_dim;
    let mut m = vec![zero(); dim * dim];
    for i in 0..offset {
        m[i * dim + i] = one();
    }
    for r in 0..target_dim {
        for c in 0..target_dim {
            m[(offset + r) * dim + offset + c] = target[r * target_dim + c];
        }
    }
    m
}
