//! Scanner turning a decimal literal into a compact digit summary.

use crate::digit::{is_8digits, parse_8digits, read_u64, to_digit};
use crate::num::Float;
use crate::powers::POW10_64;

/// Largest number of decimal digits the 64-bit mantissa proxy can hold.
const MAX_MANTISSA_DIGITS: usize = 19;

/// Summary of one scanned decimal literal.
///
/// `mantissa` is built from at most the 19 most significant digits; if the
/// literal carried more, `many_digits` is set, the mantissa/exponent pair
/// is a truncation-tagged proxy, and the retained digit spans allow the
/// fallback to re-derive the exact value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScannedDecimal<'a> {
    /// The significant digits, at most 19 of them.
    pub mantissa: u64,
    /// Power of ten scaling the mantissa: value = mantissa * 10^exponent.
    pub exponent: i64,
    /// The literal carried a leading minus sign.
    pub negative: bool,
    /// More than 19 significant digits were present.
    pub many_digits: bool,
    /// Digits of the whole part, including leading zeros.
    pub integer: &'a [u8],
    /// Digits of the fractional part, including trailing zeros.
    pub fraction: &'a [u8],
    /// Bytes consumed from the input.
    pub len: usize,
}

impl ScannedDecimal<'_> {
    /// Detect if the value can be exactly reconstructed with native
    /// float arithmetic alone.
    #[inline]
    pub(crate) fn is_fast_path<F: Float>(&self) -> bool {
        F::MIN_EXPONENT_FAST_PATH <= self.exponent
            && self.exponent <= F::MAX_EXPONENT_DISGUISED_FAST_PATH
            && self.mantissa <= F::MAX_MANTISSA_FAST_PATH
            && !self.many_digits
    }

    /// The shortcut for trivially exact literals: both the mantissa and
    /// the power of ten are exactly representable, so one multiply or
    /// divide is correctly rounded by the hardware. The disguised variant
    /// first shifts surplus powers of ten into the mantissa.
    pub(crate) fn try_fast_path<F: Float>(&self) -> Option<F> {
        if !self.is_fast_path::<F>() {
            return None;
        }

        let value = if self.exponent <= F::MAX_EXPONENT_FAST_PATH {
            let value = F::from_u64(self.mantissa);
            if self.exponent < 0 {
                value / F::pow10_fast_path((-self.exponent) as usize)
            } else {
                value * F::pow10_fast_path(self.exponent as usize)
            }
        } else {
            // Disguised fast path.
            let shift = self.exponent - F::MAX_EXPONENT_FAST_PATH;
            let int_power = POW10_64[shift as usize];
            let mantissa = self.mantissa.checked_mul(int_power)?;
            if mantissa > F::MAX_MANTISSA_FAST_PATH {
                return None;
            }
            F::from_u64(mantissa) * F::pow10_fast_path(F::MAX_EXPONENT_FAST_PATH as usize)
        };
        Some(value)
    }
}

// SCAN
// ----

/// Accumulate digits at position `i`, eight at a time where possible.
///
/// Returns the position one past the last digit. The accumulation wraps
/// on overflow; the caller re-reads when more than 19 digits were seen.
#[inline]
fn scan_digits(s: &[u8], mut i: usize, mantissa: &mut u64) -> usize {
    while i + 8 <= s.len() {
        let v = read_u64(&s[i..]);
        if !is_8digits(v) {
            break;
        }
        *mantissa = mantissa
            .wrapping_mul(100_000_000)
            .wrapping_add(parse_8digits(v));
        i += 8;
    }
    while let Some(d) = s.get(i).copied().and_then(to_digit) {
        *mantissa = mantissa.wrapping_mul(10).wrapping_add(d);
        i += 1;
    }
    i
}

/// Scan an optionally signed decimal literal at the start of `s`.
///
/// Grammar: optional `+`/`-`, digits, optional `.` and more digits (at
/// least one digit somewhere), optional `e`/`E` exponent with optional
/// sign and digits. A malformed exponent suffix is recovered from by
/// rewinding to just before the `e`, leaving it unconsumed. Returns
/// `None`, with nothing consumed, when no digits are found.
pub(crate) fn scan(s: &[u8]) -> Option<ScannedDecimal<'_>> {
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

    let mut mantissa = 0u64;

    // Whole part.
    let int_start = i;
    i = scan_digits(s, i, &mut mantissa);
    let integer = &s[int_start..i];

    // Fractional part.
    let mut fraction: &[u8] = &s[i..i];
    if s.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let frac_end = scan_digits(s, frac_start, &mut mantissa);
        fraction = &s[frac_start..frac_end];
        // A lone trailing dot is still part of the literal.
        i = frac_end;
    }

    let n_digits = integer.len() + fraction.len();
    if n_digits == 0 {
        return None;
    }

    // Explicit exponent, with rewind on a malformed suffix.
    let mut explicit_exponent = 0i64;
    if matches!(s.get(i), Some(b'e') | Some(b'E')) {
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
                // Saturate instead of looping forever on absurd inputs.
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

    let mut exponent = explicit_exponent.saturating_sub(fraction.len() as i64);
    let mut many_digits = false;

    if n_digits > MAX_MANTISSA_DIGITS {
        // The literal may still have at most 19 significant digits once
        // leading zeros are stripped; re-read to find out.
        let mut int_digits = integer;
        while int_digits.first() == Some(&b'0') {
            int_digits = &int_digits[1..];
        }
        let mut frac_digits = fraction;
        if int_digits.is_empty() {
            while frac_digits.first() == Some(&b'0') {
                frac_digits = &frac_digits[1..];
            }
        }

        if int_digits.len() + frac_digits.len() > MAX_MANTISSA_DIGITS {
            many_digits = true;
            mantissa = 0;
            let mut taken = 0;
            for &c in int_digits.iter().chain(frac_digits.iter()) {
                if taken == MAX_MANTISSA_DIGITS {
                    break;
                }
                mantissa = mantissa * 10 + (c - b'0') as u64;
                taken += 1;
            }

            let int_taken = int_digits.len().min(MAX_MANTISSA_DIGITS);
            let frac_taken = taken - int_taken;
            // Skipped fraction zeros still scale the value down.
            let frac_skipped = fraction.len() - frac_digits.len();
            exponent = explicit_exponent
                .saturating_add((int_digits.len() - int_taken) as i64)
                .saturating_sub((frac_skipped + frac_taken) as i64);

            // Keep tie-vs-not-tie information from the truncated tail in
            // a single digit: a non-zero remainder turns a trailing zero
            // into a synthetic trailing one.
            let truncated_nonzero = int_digits[int_taken..]
                .iter()
                .chain(frac_digits[frac_taken..].iter())
                .any(|&c| c != b'0');
            if truncated_nonzero && mantissa % 10 == 0 {
                mantissa += 1;
            }
        }
    }

    Some(ScannedDecimal {
        mantissa,
        exponent,
        negative,
        many_digits,
        integer,
        fraction,
        len: i,
    })
}

// TESTS
// -----

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_ok(s: &str) -> ScannedDecimal<'_> {
        scan(s.as_bytes()).unwrap()
    }

    #[test]
    fn scan_simple_test() {
        let num = scan_ok("12.5");
        assert_eq!(num.mantissa, 125);
        assert_eq!(num.exponent, -1);
        assert_eq!(num.len, 4);
        assert!(!num.negative);
        assert!(!num.many_digits);
        assert_eq!(num.integer, b"12");
        assert_eq!(num.fraction, b"5");

        let num = scan_ok("-0.04628372940652459");
        assert_eq!(num.mantissa, 4628372940652459);
        assert_eq!(num.exponent, -17);
        assert!(num.negative);

        let num = scan_ok("+1e3");
        assert_eq!(num.mantissa, 1);
        assert_eq!(num.exponent, 3);
        assert_eq!(num.len, 4);
    }

    #[test]
    fn scan_partial_test() {
        let num = scan_ok("12.5abc");
        assert_eq!(num.len, 4);

        let num = scan_ok("1e5x");
        assert_eq!(num.exponent, 5);
        assert_eq!(num.len, 3);

        // A dot with no fraction digits still belongs to the literal.
        let num = scan_ok("5.");
        assert_eq!(num.mantissa, 5);
        assert_eq!(num.len, 2);

        let num = scan_ok(".5");
        assert_eq!(num.mantissa, 5);
        assert_eq!(num.exponent, -1);
        assert_eq!(num.len, 2);
    }

    #[test]
    fn scan_invalid_test() {
        assert_eq!(scan(b""), None);
        assert_eq!(scan(b"."), None);
        assert_eq!(scan(b"+"), None);
        assert_eq!(scan(b"-"), None);
        assert_eq!(scan(b".e0"), None);
        assert_eq!(scan(b"e5"), None);
        assert_eq!(scan(b"abc"), None);
    }

    #[test]
    fn scan_exponent_rewind_test() {
        // Malformed exponent suffixes end the literal before the `e`.
        let num = scan_ok("1e");
        assert_eq!(num.len, 1);
        assert_eq!(num.exponent, 0);

        let num = scan_ok("1e+");
        assert_eq!(num.len, 1);

        let num = scan_ok("12.5e-x");
        assert_eq!(num.len, 4);
        assert_eq!(num.mantissa, 125);
    }

    #[test]
    fn scan_eight_digit_chunks_test() {
        let num = scan_ok("123456789012345678");
        assert_eq!(num.mantissa, 123456789012345678);
        assert!(!num.many_digits);

        let num = scan_ok("12345678.90123456");
        assert_eq!(num.mantissa, 1234567890123456);
        assert_eq!(num.exponent, -8);
    }

    #[test]
    fn scan_many_digits_test() {
        // 20 significant digits: the proxy keeps 19 and marks truncation.
        let num = scan_ok("12345678901234567890");
        assert!(num.many_digits);
        assert_eq!(num.mantissa, 1234567890123456789);
        assert_eq!(num.exponent, 1);

        // Leading zeros do not count as significant digits.
        let num = scan_ok("0.00000000000000000001234567890123456789");
        assert!(!num.many_digits);
        assert_eq!(num.mantissa, 1234567890123456789);
        assert_eq!(num.exponent, -38);

        // Truncated non-zero remainder behind a trailing zero becomes a
        // synthetic trailing one.
        let num = scan_ok("10000000000000000000000000000000000000001");
        assert!(num.many_digits);
        assert_eq!(num.mantissa, 1000000000000000001);
        assert_eq!(num.exponent, 22);

        // All-zero remainder leaves the proxy untouched.
        let num = scan_ok("10000000000000000000000000000000000000000");
        assert!(num.many_digits);
        assert_eq!(num.mantissa, 1000000000000000000);
        assert_eq!(num.exponent, 22);
    }

    #[test]
    fn scan_exponent_saturation_test() {
        let num = scan_ok("1e99999999999999999999999999");
        assert!(num.exponent > 0x10000);
        let num = scan_ok("1e-99999999999999999999999999");
        assert!(num.exponent < -0x10000);
    }

    #[test]
    fn fast_path_test() {
        assert_eq!(scan_ok("1.23e2").try_fast_path::<f64>(), Some(123.0));
        assert_eq!(scan_ok("4628372940652459e-17").try_fast_path::<f64>(), Some(0.04628372940652459));
        // Disguised: two digits move from the exponent into the mantissa.
        assert_eq!(scan_ok("123e24").try_fast_path::<f64>(), Some(1.23e26));
        // Exponent too small for the exact shortcut.
        assert_eq!(scan_ok("1e-23").try_fast_path::<f64>(), None);
        // Mantissa too wide to be exact.
        assert_eq!(scan_ok("9007199254740995").try_fast_path::<f64>(), None);
        // Truncated digits disqualify the shortcut.
        assert!(scan_ok("12345678901234567890e-5").try_fast_path::<f64>().is_none());
    }
}
