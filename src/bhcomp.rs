//! Terminal fallback comparing the exact digits against the halfway
//! representation `b+h`.
//!
//! Invoked only when the estimator cannot prove its rounding correct.
//! The retained digit spans are re-read into a big integer; a positive
//! scaled exponent resolves by taking the top 64 bits of the exact
//! product, a negative one by scaling the digits and the halfway point
//! to a common integer domain and comparing. Multiply, shift and compare
//! only; there is no division in this path.

use crate::bignum::{add_digits, Bigint};
use crate::exponent::scientific_exponent;
use crate::float::{b_extended, bh_extended, ExtendedFloat};
use crate::lib::cmp;
use crate::num::Float;
use crate::rounding::{nearest_tie_even, round, round_down, round_nearest_tie_even};
use crate::scan::ScannedDecimal;

// MANTISSA

/// Parse up to `F::MAX_DIGITS` significant digits into a big integer.
///
/// Digits are accumulated in 19-digit batches. When non-zero digits
/// remain past the cap, one synthetic trailing `1` is appended: it keeps
/// the value strictly between "all truncated digits zero" and the next
/// representable digit string, which is exactly the information the
/// halfway comparison needs from the unbounded tail.
fn parse_mantissa<'a, F, Iter>(mut digits: Iter) -> (Bigint, usize)
where
    F: Float,
    Iter: Iterator<Item = &'a u8>,
{
    const STEP: usize = 19;
    let mut result = Bigint::new();
    let mut value: u64 = 0;
    let mut counter = 0;
    let mut count = 0;

    for &digit in digits.by_ref() {
        value = value * 10 + (digit - b'0') as u64;
        counter += 1;
        count += 1;
        if counter == STEP {
            add_digits(&mut result, value, counter);
            counter = 0;
            value = 0;
        }
        if count == F::MAX_DIGITS {
            break;
        }
    }
    if counter != 0 {
        add_digits(&mut result, value, counter);
    }

    if digits.any(|&digit| digit != b'0') {
        result.imul_small(10);
        result.iadd_small(1);
        count += 1;
    }

    (result, count)
}

// BHCOMP

/// Calculate the exact mantissa for a non-negative scaled exponent.
fn large_atof<F>(mut bigmant: Bigint, exponent: i32) -> ExtendedFloat
where
    F: Float,
{
    // Multiply out the power of ten; the result is the exact integer
    // value, so its top 64 bits and bit length round directly.
    bigmant.imul_pow10(exponent as u32);

    let (mant, truncated) = bigmant.hi64();
    let exp = bigmant.bit_length() - 64;
    let mut fp = ExtendedFloat { mant, exp };
    round::<F, _>(&mut fp, nearest_tie_even(truncated));
    fp
}

/// Calculate the exact mantissa for a negative scaled exponent.
///
/// This invokes the comparison with `b+h`.
fn small_atof<F>(bigmant: Bigint, fp: ExtendedFloat, exponent: i32) -> ExtendedFloat
where
    F: Float,
{
    // The estimate arrives unrounded with its significant digits not yet
    // shifted into place.
    debug_assert!(fp.mant & (1u64 << 63) != 0);
    debug_assert!(exponent < 0);

    // Round the estimate down to get `b`, then recover its unrounded
    // value and form the halfway point `b+h` to the next float up.
    let mut b = fp;
    round::<F, _>(&mut b, round_down);
    if b.exp == F::INFINITE_POWER {
        // Past the overflow boundary by more than the estimate's error;
        // the comparison cannot change the outcome.
        return b;
    }
    let theor = bh_extended(b_extended::<F>(b));

    let mut theor_digits = Bigint::from_u64(theor.mant);
    let mut real_digits = bigmant;

    // The real value is `real_digits * 10^exponent` and the halfway value
    // `theor_digits * 2^theor.exp`; factor 10^exponent into 5s and 2s and
    // move every power onto whichever side keeps both integral.
    let halfradix_exp = -exponent;
    let binary_exp = theor.exp + halfradix_exp;
    theor_digits.imul_pow5(halfradix_exp as u32);
    if binary_exp > 0 {
        theor_digits.imul_pow2(binary_exp as u32);
    } else if binary_exp < 0 {
        real_digits.imul_pow2((-binary_exp) as u32);
    }

    let order = real_digits.compare(&theor_digits);
    let mut fp = fp;
    round::<F, _>(&mut fp, |f, shift| {
        round_nearest_tie_even(f, shift, |is_odd, _, _| {
            // The discarded estimate bits are superseded by the exact
            // comparison: above the halfway point rounds up, below
            // rounds down, and a dead tie goes to even.
            match order {
                cmp::Ordering::Greater => true,
                cmp::Ordering::Less => false,
                cmp::Ordering::Equal => is_odd,
            }
        });
    });
    fp
}

/// Calculate the exact value of the scanned literal.
///
/// `fp` is the estimator's unrounded output. The result is always in
/// packed form; this path never defers further.
pub(crate) fn bhcomp<F: Float>(num: &ScannedDecimal<'_>, fp: ExtendedFloat) -> ExtendedFloat {
    // Strip the zeros that do not contribute significant digits: leading
    // integer zeros, and leading fraction zeros when the whole part is
    // empty of them.
    let mut integer = num.integer;
    while integer.first() == Some(&b'0') {
        integer = &integer[1..];
    }
    let mut fraction = num.fraction;
    if integer.is_empty() {
        while fraction.first() == Some(&b'0') {
            fraction = &fraction[1..];
        }
    }

    let sci_exp = scientific_exponent(num.mantissa, num.exponent);
    let digits = integer.iter().chain(fraction.iter());
    let (bigmant, count) = parse_mantissa::<F, _>(digits);
    let scaled_exponent = sci_exp.saturating_add(1).saturating_sub(count as i32);

    if scaled_exponent >= 0 {
        large_atof::<F>(bigmant, scaled_exponent)
    } else {
        small_atof::<F>(bigmant, fp, scaled_exponent)
    }
}

// TESTS
// -----
