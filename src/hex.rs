//! Scanner and assembler for hexadecimal float literals.
//!
//! Hex digits are already base-2^4, so assembly needs no power-of-five
//! scaling: collect the significand, derive the binary exponent from the
//! digit positions and the `p` suffix, and reuse the shared rounding and
//! packing machinery for subnormals, overflow and ties.

use crate::digit::{to_digit, to_hex_digit};
use crate::float::ExtendedFloat;
use crate::num::Float;
use crate::rounding::{nearest_tie_even, round};

/// Largest number of hex digits the 64-bit significand can hold.
const MAX_HEX_DIGITS: usize = 16;

/// Summary of one scanned hexadecimal literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScannedHex {
    /// The significant hex digits, at most 16 of them.
    pub mantissa: u64,
    /// Binary exponent of the mantissa's least significant bit.
    pub exponent: i64,
    /// The literal carried a leading minus sign.
    pub negative: bool,
    /// Non-zero digits were discarded beyond the 16-digit window.
    pub truncated: bool,
    /// Bytes consumed from the input.
    pub len: usize,
}

/// Scan `[sign]0[xX]hexdigits[.hexdigits][pP[sign]decdigits]` at the
/// start of `s`.
///
/// At least one hex digit must be present; otherwise nothing is consumed.
/// A malformed `p` suffix rewinds to just before the `p`, like the
/// decimal scanner's exponent recovery.
pub(crate) fn scan_hex(s: &[u8]) -> Option<ScannedHex> {
    let mut i = 0;
    let negative = match s.first() {
        Some(b'-') => {
            i = 1;
            true
        }
        Some(b'+') => {
            i = 1;
            false
        }
        _ => false,
    };

    // Mandatory 0x prefix.
    if s.get(i) != Some(&b'0') || !matches!(s.get(i + 1), Some(b'x') | Some(b'X')) {
        return None;
    }
    i += 2;

    let mut mantissa = 0u64;
    let mut digits = 0usize;
    let mut seen_digits = false;
    let mut truncated = false;
    // Whole-part digits that no longer fit shift the value up; skipped
    // fraction zeros and consumed fraction digits shift it down. All in
    // units of one hex digit.
    let mut shift_up = 0i64;
    let mut shift_down = 0i64;

    while let Some(d) = s.get(i).copied().and_then(to_hex_digit) {
        seen_digits = true;
        if mantissa == 0 && d == 0 {
            // Leading zero, not significant.
        } else if digits < MAX_HEX_DIGITS {
            mantissa = (mantissa << 4) | d;
            digits += 1;
        } else {
            truncated |= d != 0;
            shift_up += 1;
        }
        i += 1;
    }

    if s.get(i) == Some(&b'.') {
        i += 1;
        while let Some(d) = s.get(i).copied().and_then(to_hex_digit) {
            seen_digits = true;
            if mantissa == 0 && d == 0 {
                shift_down += 1;
            } else if digits < MAX_HEX_DIGITS {
                mantissa = (mantissa << 4) | d;
                digits += 1;
                shift_down += 1;
            } else {
                truncated |= d != 0;
            }
            i += 1;
        }
    }

    if !seen_digits {
        return None;
    }

    // Binary exponent suffix, with rewind on a malformed one.
    let mut explicit_exponent = 0i64;
    if matches!(s.get(i), Some(b'p') | Some(b'P')) {
        let rewind = i;
        i += 1;
        let exp_negative = match s.get(i) {
            Some(b'-') => {
                i += 1;
                true
            }
            Some(b'+') => {
                i += 1;
                false
            }
            _ => false,
        };
        if s.get(i).copied().and_then(to_digit).is_some() {
            while let Some(d) = s.get(i).copied().and_then(to_digit) {
                explicit_exponent = explicit_exponent.saturating_mul(10).saturating_add(d as i64);
                i += 1;
            }
            if exp_negative {
                explicit_exponent = -explicit_exponent;
            }
        } else {
            i = rewind;
        }
    }

    let exponent = explicit_exponent.saturating_add(4 * (shift_up - shift_down));

    Some(ScannedHex {
        mantissa,
        exponent,
        negative,
        truncated,
        len: i,
    })
}

/// Assemble the scanned hex literal into a packed extended float.
#[inline]
pub(crate) fn hex_to_float<F: Float>(num: &ScannedHex) -> ExtendedFloat {
    // Anything outside this band is already a guaranteed overflow or
    // underflow; clamping keeps the exponent in i32 range.
    let exponent = num.exponent.clamp(-0x1000, 0x1000) as i32;
    let mut fp = ExtendedFloat {
        mant: num.mantissa,
        exp: exponent,
    };
    round::<F, _>(&mut fp, nearest_tie_even(num.truncated));
    fp
}

// TESTS
// -----
