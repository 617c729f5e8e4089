//! Fixed-point amount conversion.
//!
//! Monero amounts cross the daemon boundary as piconero, the atomic unit
//! of 10^-12 XMR. Only the atomic form is ever sent upstream; callers see
//! plain XMR floats.

/// Atomic units (piconero) per XMR.
pub const PICONERO_PER_XMR: u64 = 1_000_000_000_000;

/// Converts XMR to piconero, truncating toward zero.
///
/// Truncation (not rounding) matches the daemon-facing integer conversion
/// the rest of the ecosystem expects; callers lose at most one piconero.
pub fn to_atomic(xmr: f64) -> u64 {
    (xmr * PICONERO_PER_XMR as f64) as u64
}

/// Converts piconero to XMR.
pub fn to_xmr(atomic: u64) -> f64 {
    atomic as f64 / PICONERO_PER_XMR as f64
}
