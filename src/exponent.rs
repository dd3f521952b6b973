//! Utilities to calculate exponents.

/// Convert i64 into i32 without overflow.
///
/// This is needed to ensure when adjusting the exponent relative to
/// the mantissa we do not overflow for comically-long exponents.
#[inline]
pub(crate) fn into_i32(value: i64) -> i32 {
    if value > i32::MAX as i64 {
        i32::MAX
    } else if value < i32::MIN as i64 {
        i32::MIN
    } else {
        value as i32
    }
}

// EXPONENT CALCULATION

// Calculate the scientific notation exponent from a mantissa proxy.
//
// For example, 0.1 would be -1, and 10 would be 1 in base 10. The
// mantissa/exponent pair describes `mantissa * 10^exponent`, so the
// scientific exponent is the adjusted exponent plus the number of
// mantissa digits minus one, computed here by power reduction.
#[inline]
pub(crate) fn scientific_exponent(mantissa: u64, exponent: i64) -> i32 {
    let mut mantissa = mantissa;
    let mut exponent = exponent;
    while mantissa >= 10000 {
        mantissa /= 10000;
        exponent = exponent.saturating_add(4);
    }
    while mantissa >= 10 {
        mantissa /= 10;
        exponent = exponent.saturating_add(1);
    }
    into_i32(exponent)
}

// TESTS
// -----
