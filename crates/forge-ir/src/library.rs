//! Pre-built benchmark circuits.
//!
//! Small textbook states (Bell, GHZ, QFT) plus the two arithmetic
//! workloads used for transpiler comparisons: a ripple-carry adder built
//! from majority gates and a shift-and-add multiplier.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::register::{BitRef, RegisterHandle};

/// Seed used by the multiplier benchmark for its operands.
pub const DEFAULT_OPERAND_SEED: u64 = 555;

// =========================================================================
// Textbook states
// =========================================================================

/// Bell state circuit with measurements.
pub fn bell() -> IrResult<Circuit> {
    let mut circuit = Circuit::with_size("bell", 2, 2)?;
    let q = register(&circuit, "q")?;
    let c = register(&circuit, "c")?;
    circuit
        .h(q.bit(0))?
        .cx(q.bit(0), q.bit(1))?
        .measure(q.bit(0), c.bit(0))?
        .measure(q.bit(1), c.bit(1))?;
    Ok(circuit)
}

/// `n`-qubit GHZ state circuit with measurements.
pub fn ghz(n: u32) -> IrResult<Circuit> {
    if n == 0 {
        return Err(invalid("ghz", "needs at least one qubit"));
    }
    let mut circuit = Circuit::with_size("ghz", n, n)?;
    let q = register(&circuit, "q")?;
    let c = register(&circuit, "c")?;

    circuit.h(q.bit(0))?;
    for i in 0..n - 1 {
        circuit.cx(q.bit(i), q.bit(i + 1))?;
    }
    for i in 0..n {
        circuit.measure(q.bit(i), c.bit(i))?;
    }
    Ok(circuit)
}

/// `n`-qubit quantum Fourier transform (without measurements).
pub fn qft(n: u32) -> IrResult<Circuit> {
    if n == 0 {
        return Err(invalid("qft", "needs at least one qubit"));
    }
    if n > 32 {
        return Err(invalid("qft", "rotation angles underflow past 32 qubits"));
    }
    let mut circuit = Circuit::with_size("qft", n, 0)?;
    let q = register(&circuit, "q")?;

    for i in 0..n {
        circuit.h(q.bit(i))?;
        for j in (i + 1)..n {
            let angle = PI / f64::from(1u32 << (j - i).min(31));
            circuit.cp(angle, q.bit(j), q.bit(i))?;
        }
    }
    // Bit reversal
    for i in 0..n / 2 {
        circuit.swap(q.bit(i), q.bit(n - 1 - i))?;
    }
    Ok(circuit)
}

// =========================================================================
// Ripple-carry adder (majority / unmajority)
// =========================================================================

/// Majority gate: leaves MAJ(a, b, c) on `c`.
pub fn majority(circuit: &mut Circuit, a: BitRef, b: BitRef, c: BitRef) -> IrResult<()> {
    circuit.cx(c, b)?.cx(c, a)?.ccx(a, b, c)?;
    Ok(())
}

/// Inverse of [`majority`], leaving the sum bit on `b`.
pub fn unmajority(circuit: &mut Circuit, a: BitRef, b: BitRef, c: BitRef) -> IrResult<()> {
    circuit.ccx(a, b, c)?.cx(c, a)?.cx(a, b)?;
    Ok(())
}

/// Add two 4-bit operands in place with carry in and carry out.
pub fn add_four_bits(
    circuit: &mut Circuit,
    a: [BitRef; 4],
    b: [BitRef; 4],
    carry_in: BitRef,
    carry_out: BitRef,
) -> IrResult<()> {
    majority(circuit, carry_in, b[0], a[0])?;
    majority(circuit, a[0], b[1], a[1])?;
    majority(circuit, a[1], b[2], a[2])?;
    majority(circuit, a[2], b[3], a[3])?;
    circuit.cx(a[3], carry_out)?;
    unmajority(circuit, a[2], b[3], a[3])?;
    unmajority(circuit, a[1], b[2], a[2])?;
    unmajority(circuit, a[0], b[1], a[1])?;
    unmajority(circuit, carry_in, b[0], a[0])?;
    Ok(())
}

/// Parameters of the adder benchmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdderSpec {
    /// Operand width; a positive multiple of 4.
    pub bits: u32,
    /// Bit pattern loaded into operand `a`, most significant qubit last.
    pub a_pattern: String,
    /// Bit pattern loaded into operand `b`.
    pub b_pattern: String,
    /// Whether the first carry qubit starts at |1⟩.
    pub initial_carry: bool,
}

impl AdderSpec {
    /// The benchmark configuration for a given width.
    pub fn new(bits: u32) -> Self {
        Self {
            bits,
            a_pattern: "1110".to_string(),
            b_pattern: "0001".to_string(),
            initial_carry: true,
        }
    }

    /// Total qubits: both operands plus one carry per 4-bit block and a
    /// final carry out.
    pub fn num_qubits(&self) -> IrResult<u32> {
        if self.bits == 0 || self.bits % 4 != 0 {
            return Err(invalid(
                "adder",
                format!("bit width {} is not a positive multiple of 4", self.bits),
            ));
        }
        self.bits
            .checked_mul(2)
            .and_then(|n| n.checked_add(self.bits / 4 + 1))
            .ok_or_else(|| invalid("adder", format!("bit width {} is too large", self.bits)))
    }
}

impl Default for AdderSpec {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Build the adder benchmark.
///
/// Qubits `0..b` hold operand `a`, `b..2b` operand `b`, and the rest the
/// carry chain. Every qubit is measured into register `meas` at the end.
pub fn adder(spec: &AdderSpec) -> IrResult<Circuit> {
    let n_qubits = spec.num_qubits()?;
    let bits = spec.bits;
    let mut circuit = Circuit::with_size("adder", n_qubits, n_qubits)?;
    let q = register(&circuit, "q")?;

    let a_pattern = fit_pattern(&spec.a_pattern, bits);
    let b_pattern = fit_pattern(&spec.b_pattern, bits);
    for (i, bit) in (0u32..).zip(a_pattern.bytes()) {
        if bit == b'1' {
            circuit.x(q.bit(i))?;
        }
    }
    for (i, bit) in (0u32..).zip(b_pattern.bytes()) {
        if bit == b'1' {
            circuit.x(q.bit(bits + i))?;
        }
    }
    if spec.initial_carry {
        circuit.x(q.bit(2 * bits))?;
    }

    for block in (0..bits).step_by(4) {
        let a = [0, 1, 2, 3].map(|k| q.bit(block + k));
        let b = [0, 1, 2, 3].map(|k| q.bit(bits + block + k));
        let carry_in = q.bit(2 * bits + block / 4);
        let carry_out = q.bit(2 * bits + block / 4 + 1);
        add_four_bits(&mut circuit, a, b, carry_in, carry_out)?;
    }

    circuit.measure_all()?;
    Ok(circuit)
}

/// Right-pad with `0` to `width`, then keep the last `width` characters.
fn fit_pattern(pattern: &str, width: u32) -> String {
    let width = width as usize;
    let mut padded: String = pattern.chars().collect();
    while padded.chars().count() < width {
        padded.push('0');
    }
    let skip = padded.chars().count() - width;
    padded.chars().skip(skip).collect()
}

// =========================================================================
// Shift-and-add multiplier
// =========================================================================

/// Carry step: `c1 ^= MAJ(c0, a, b)` with `b ^= a`.
pub fn carry(circuit: &mut Circuit, c0: BitRef, a: BitRef, b: BitRef, c1: BitRef) -> IrResult<()> {
    circuit.ccx(a, b, c1)?.cx(a, b)?.ccx(c0, b, c1)?;
    Ok(())
}

/// Inverse of [`carry`].
pub fn uncarry(
    circuit: &mut Circuit,
    c0: BitRef,
    a: BitRef,
    b: BitRef,
    c1: BitRef,
) -> IrResult<()> {
    circuit.ccx(c0, b, c1)?.cx(a, b)?.ccx(a, b, c1)?;
    Ok(())
}

/// Sum bit: `b ^= a ^ c0`.
pub fn carry_sum(circuit: &mut Circuit, c0: BitRef, a: BitRef, b: BitRef) -> IrResult<()> {
    circuit.cx(a, b)?.cx(c0, b)?;
    Ok(())
}

/// Ripple-carry adder over triplets `[c0, a0, b0, c1, a1, b1, ...]`.
///
/// The sum is left on the `b` qubits.
pub fn ripple_adder(circuit: &mut Circuit, qubits: &[BitRef]) -> IrResult<()> {
    if qubits.is_empty() || qubits.len() % 3 != 0 {
        return Err(invalid(
            "ripple_adder",
            format!("{} qubits do not form carry/a/b triplets", qubits.len()),
        ));
    }
    let n = qubits.len() / 3;
    let c: Vec<BitRef> = qubits.iter().step_by(3).copied().collect();
    let a: Vec<BitRef> = qubits.iter().skip(1).step_by(3).copied().collect();
    let b: Vec<BitRef> = qubits.iter().skip(2).step_by(3).copied().collect();

    for i in 0..n - 1 {
        carry(circuit, c[i], a[i], b[i], c[i + 1])?;
    }
    carry_sum(circuit, c[n - 1], a[n - 1], b[n - 1])?;
    for i in (0..n - 1).rev() {
        uncarry(circuit, c[i], a[i], b[i], c[i + 1])?;
        carry_sum(circuit, c[i], a[i], b[i])?;
    }
    Ok(())
}

/// Shift-and-add multiplication over `5n` qubits laid out as `3n` adder
/// triplets, then the `n` qubits of `y`, then the `n` qubits of `x`.
pub fn shift_and_add(circuit: &mut Circuit, qubits: &[BitRef]) -> IrResult<()> {
    if qubits.is_empty() || qubits.len() % 5 != 0 {
        return Err(invalid(
            "multiplier",
            format!("{} qubits are not a positive multiple of 5", qubits.len()),
        ));
    }
    let n = qubits.len() / 5;
    let a: Vec<BitRef> = qubits[1..3 * n].iter().step_by(3).copied().collect();
    let y = &qubits[3 * n..4 * n];
    let x = &qubits[4 * n..];

    for (i, &x_i) in x.iter().enumerate() {
        for (&a_q, &y_q) in a[i..].iter().zip(&y[..n - i]) {
            circuit.ccx(x_i, y_q, a_q)?;
        }
        ripple_adder(circuit, &qubits[..3 * n])?;
        for (&a_q, &y_q) in a[i..].iter().zip(&y[..n - i]) {
            circuit.ccx(x_i, y_q, a_q)?;
        }
    }
    Ok(())
}

/// Pick reproducible operands in `1..=floor(sqrt(2^bits))`.
pub fn random_operands(bits: u32, seed: u64) -> IrResult<(u64, u64)> {
    if bits == 0 || bits > 63 {
        return Err(invalid(
            "multiplier",
            format!("operand width {bits} must be between 1 and 63"),
        ));
    }
    let max = ((1u64 << bits) as f64).sqrt().floor() as u64;
    let mut rng = StdRng::seed_from_u64(seed);
    let x = rng.gen_range(1..=max);
    let y = rng.gen_range(1..=max);
    Ok((x, y))
}

/// Build the multiplier benchmark computing `x * y` on `bits`-wide operands.
///
/// The low `bits` bits of each operand are loaded; the result bits are
/// measured into classical register `c`.
pub fn multiplier(bits: u32, x: u64, y: u64) -> IrResult<Circuit> {
    if bits == 0 || bits > 63 {
        return Err(invalid(
            "multiplier",
            format!("operand width {bits} must be between 1 and 63"),
        ));
    }
    let n = bits as usize;
    let mut circuit = Circuit::with_size("multiplier", 5 * bits, bits)?;
    let q = register(&circuit, "q")?;
    let c = register(&circuit, "c")?;
    let qubits: Vec<BitRef> = q.bits().collect();

    load_value(&mut circuit, x, &qubits[4 * n..])?;
    load_value(&mut circuit, y, &qubits[3 * n..4 * n])?;

    shift_and_add(&mut circuit, &qubits)?;

    let results = qubits[2..3 * n].iter().step_by(3);
    for (clbit, &qubit) in c.bits().zip(results) {
        circuit.measure(qubit, clbit)?;
    }
    Ok(circuit)
}

/// Flip qubit `k` when bit `k` of `value` is set.
fn load_value(circuit: &mut Circuit, value: u64, qubits: &[BitRef]) -> IrResult<()> {
    for (k, &qubit) in qubits.iter().enumerate().take(64) {
        if (value >> k) & 1 == 1 {
            circuit.x(qubit)?;
        }
    }
    Ok(())
}

fn register(circuit: &Circuit, name: &str) -> IrResult<RegisterHandle> {
    circuit
        .register_by_name(name)
        .ok_or_else(|| invalid("library", format!("register '{name}' missing")))
}

fn invalid(circuit: &'static str, reason: impl Into<String>) -> IrError {
    IrError::InvalidWidth {
        circuit,
        reason: reason.into(),
    }
}
