//! Eisel-Lemire estimator: one or two 64x64 multiplications against a
//! precomputed 128-bit power of five give a provisional significand with
//! three guard bits, together with enough information to prove the
//! rounding correct for almost every input.

use crate::float::{ExtendedFloat, INVALID_FP};
use crate::num::Float;
use crate::powers::{LARGEST_POWER_OF_FIVE, POWER_OF_FIVE_128, SMALLEST_POWER_OF_FIVE};
use crate::scan::ScannedDecimal;

/// Estimate the binary value of `mantissa * 10^exponent`.
///
/// The result is in packed form when correct rounding could be proven,
/// and an `INVALID_FP`-marked, unrounded estimate otherwise, in which
/// case the caller must run the big-integer fallback. A truncated
/// mantissa (`many_digits`) sits within one unit of the exact digits on
/// either side, whichever way the synthetic trailing digit landed, so it
/// is accepted only when the whole `mantissa - 1 ..= mantissa + 1`
/// bracket rounds to one float.
pub(crate) fn moderate_path<F: Float>(num: &ScannedDecimal<'_>) -> ExtendedFloat {
    let mut fp = compute_float::<F>(num.exponent, num.mantissa);
    if num.many_digits
        && fp.exp >= 0
        && (fp != compute_float::<F>(num.exponent, num.mantissa - 1)
            || fp != compute_float::<F>(num.exponent, num.mantissa + 1))
    {
        // The truncated digits straddle a rounding boundary; keep the
        // unrounded estimate for the fallback instead.
        fp = compute_error::<F>(num.exponent, num.mantissa);
    }
    fp
}

/// Convert a mantissa/power-of-ten pair to the nearest binary float.
pub(crate) fn compute_float<F: Float>(q: i64, mut w: u64) -> ExtendedFloat {
    let fp_zero = ExtendedFloat { mant: 0, exp: 0 };
    let fp_inf = ExtendedFloat {
        mant: 0,
        exp: F::INFINITE_POWER,
    };

    // Short-circuit if the value can only be a literal zero or infinity.
    if w == 0 || q < F::SMALLEST_POWER_OF_TEN as i64 {
        return fp_zero;
    } else if q > F::LARGEST_POWER_OF_TEN as i64 {
        return fp_inf;
    }

    // Normalize our significant digits, so the most-significant bit is set.
    let lz = w.leading_zeros();
    w <<= lz;

    // The product approximation keeps MANTISSA_SIZE + 3 bits: the full
    // significand with its hidden bit, one rounding bit, and one bit to
    // absorb a possible leading zero of the product.
    let (lo, hi) = compute_product_approx(q, w, (F::MANTISSA_SIZE + 3) as usize);
    if lo == 0xFFFF_FFFF_FFFF_FFFF {
        // An all-ones low word means the truncated table entry may hide a
        // carry into the significant bits. This can only matter for
        // q in [-27, 55]: outside that window either the product is exact
        // (5^|q| fits in 64 bits) or the halfway case cannot occur, so
        // the approximation is still safe. Inside it, give up and let the
        // fallback decide.
        let inside_safe_exponent = (-27..=55).contains(&q);
        if !inside_safe_exponent {
            return compute_error_scaled::<F>(q, hi, lz as i32);
        }
    }

    let upperbit = (hi >> 63) as i32;
    let mut mantissa = hi >> (upperbit + 64 - F::MANTISSA_SIZE - 3);
    let mut power2 = power(q as i32) + upperbit - lz as i32 - F::MINIMUM_EXPONENT;
    if power2 <= 0 {
        if -power2 + 1 >= 64 {
            // Have more than 64 bits below the minimum exponent, must be 0.
            return fp_zero;
        }
        // Have a subnormal value: shift the guard bits out at the
        // subnormal boundary, round, and re-check whether the carry
        // restored the normal range.
        mantissa >>= -power2 + 1;
        mantissa += mantissa & 1;
        mantissa >>= 1;
        power2 = (mantissa >= (1u64 << F::MANTISSA_SIZE)) as i32;
        return ExtendedFloat {
            mant: mantissa & !(1u64 << F::MANTISSA_SIZE),
            exp: power2,
        };
    }

    // Need to handle rounding ties. Normally, we round up when exactly
    // halfway, which is wrong when the product is exact and the kept
    // mantissa is even: detect the case where only the deciding bit was
    // cut from an exact product and zero it so the tie goes to even.
    if lo <= 1
        && q >= F::MIN_EXPONENT_ROUND_TO_EVEN as i64
        && q <= F::MAX_EXPONENT_ROUND_TO_EVEN as i64
        && mantissa & 3 == 1
        && (mantissa << (upperbit + 64 - F::MANTISSA_SIZE - 3)) == hi
    {
        mantissa &= !1u64;
    }

    // Round up at halfway or above, then shift the guard bit out.
    mantissa += mantissa & 1;
    mantissa >>= 1;
    if mantissa >= (2u64 << F::MANTISSA_SIZE) {
        // Rounding up overflowed past the hidden bit; shift back and
        // bump the exponent.
        mantissa = 1u64 << F::MANTISSA_SIZE;
        power2 += 1;
    }

    mantissa &= !(1u64 << F::MANTISSA_SIZE);
    if power2 >= F::INFINITE_POWER {
        return fp_inf;
    }
    ExtendedFloat {
        mant: mantissa,
        exp: power2,
    }
}

/// Compute the unrounded estimate for a value the estimator could not
/// prove correctly rounded, marked with the invalid-exponent bias.
pub(crate) fn compute_error<F: Float>(q: i64, mut w: u64) -> ExtendedFloat {
    let lz = w.leading_zeros();
    w <<= lz;
    let hi = compute_product_approx(q, w, (F::MANTISSA_SIZE + 3) as usize).1;
    compute_error_scaled::<F>(q, hi, lz as i32)
}

/// Scale the truncated product into an unrounded extended float whose
/// mantissa keeps all 64 approximated bits, marked invalid.
pub(crate) fn compute_error_scaled<F: Float>(q: i64, mut w: u64, lz: i32) -> ExtendedFloat {
    // Normalize the product itself; it may have a leading zero bit.
    let hilz = (w >> 63) as i32 ^ 1;
    w <<= hilz;
    ExtendedFloat {
        mant: w,
        exp: power(q as i32) - lz - hilz - 62 + INVALID_FP,
    }
}

/// Approximation of `log2(5^q)`, exact for every exponent in the table.
#[inline]
fn power(q: i32) -> i32 {
    (q.wrapping_mul(152_170 + 65536) >> 16) + 63
}

#[inline]
fn full_multiplication(a: u64, b: u64) -> (u64, u64) {
    let r = (a as u128) * (b as u128);
    (r as u64, (r >> 64) as u64)
}

/// Approximate `w * 5^q` as a 192-bit product and return its top two
/// 64-bit words `(lo, hi)`.
///
/// One multiplication against the table entry's high word suffices unless
/// the result's bits below the requested precision are all ones, in which
/// case a second multiplication against the low word resolves whether a
/// carry reaches them. For q in (-28, 56) the refined product is exact.
fn compute_product_approx(q: i64, w: u64, precision: usize) -> (u64, u64) {
    debug_assert!(q >= SMALLEST_POWER_OF_FIVE as i64);
    debug_assert!(q <= LARGEST_POWER_OF_FIVE as i64);
    debug_assert!(precision <= 64);

    let mask = if precision < 64 {
        0xFFFF_FFFF_FFFF_FFFF_u64 >> precision
    } else {
        0xFFFF_FFFF_FFFF_FFFF_u64
    };

    let index = (q - SMALLEST_POWER_OF_FIVE as i64) as usize;
    let (hi5, lo5) = POWER_OF_FIVE_128[index];
    let (mut first_lo, mut first_hi) = full_multiplication(w, hi5);
    if first_hi & mask == mask {
        let (_, second_hi) = full_multiplication(w, lo5);
        first_lo = first_lo.wrapping_add(second_hi);
        if second_hi > first_lo {
            // The addition wrapped; carry into the high word.
            first_hi += 1;
        }
    }
    (first_lo, first_hi)
}

// TESTS
// -----

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float::pack;

    fn compute_f64(q: i64, w: u64) -> f64 {
        let fp = compute_float::<f64>(q, w);
        assert!(fp.exp >= 0, "estimator gave up on ({}, {})", w, q);
        f64::from_bits(pack::<f64>(fp, false))
    }

    #[test]
    fn power_test() {
        assert_eq!(power(0), 63);
        assert_eq!(power(1), 66);
        assert_eq!(power(-1), 59);
        assert_eq!(power(308), 1086);
        assert_eq!(power(-342), -1074);
    }

    #[test]
    fn compute_float_test() {
        assert_eq!(compute_f64(0, 1), 1.0);
        assert_eq!(compute_f64(0, 3), 3.0);
        assert_eq!(compute_f64(-1, 5), 0.5);
        assert_eq!(compute_f64(2, 625), 62500.0);
        assert_eq!(compute_f64(23, 1), 1e23);
        assert_eq!(compute_f64(-22, 780), 7.8e-20);
        assert_eq!(compute_f64(300, 3), 3e300);
    }

    #[test]
    fn compute_float_edges_test() {
        // Zero mantissa and out-of-table exponents short-circuit.
        assert_eq!(compute_float::<f64>(100, 0), ExtendedFloat { mant: 0, exp: 0 });
        assert_eq!(compute_float::<f64>(-400, 1), ExtendedFloat { mant: 0, exp: 0 });
        assert_eq!(
            compute_float::<f64>(400, 1),
            ExtendedFloat { mant: 0, exp: 0x7FF }
        );

        // Largest finite and first infinite decade.
        assert_eq!(compute_f64(292, 17976931348623157), f64::MAX);
        assert_eq!(compute_f64(309, 1), f64::INFINITY);

        // Smallest subnormal, as scanned from 4.9406564584124654e-324.
        assert_eq!(compute_f64(-340, 49406564584124654), 5e-324);
        assert_eq!(compute_f64(-325, 49), 5e-324);

        // Below half the smallest subnormal.
        assert_eq!(compute_f64(-400, 1), 0.0);
    }

    #[test]
    fn compute_float_ties_test() {
        // 9007199254740993 = 2^53 + 1 is exactly halfway between two
        // representable values; ties go to the even mantissa, 2^53.
        assert_eq!(compute_f64(0, 9007199254740993), 9007199254740992.0);
        assert_eq!(compute_f64(0, 9007199254740995), 9007199254740996.0);
    }

    #[test]
    fn compute_error_test() {
        // The scaled error estimate keeps the full 64-bit product; its
        // truncation must round down to the same float the exact result
        // rounds to from below.
        let fp = compute_error::<f64>(0, 1);
        assert!(fp.exp < 0);
        let unbiased = ExtendedFloat {
            mant: fp.mant,
            exp: fp.exp - INVALID_FP,
        };
        // 1.0 normalized at bit 63 with lsb weight 2^-63.
        assert_eq!(unbiased.mant, 1u64 << 63);
        assert_eq!(unbiased.exp, -63);
    }

    #[test]
    fn moderate_path_truncated_test() {
        use crate::scan::scan;

        // 20 digits, truncated proxy, but both estimates agree.
        let num = scan(b"12345678901234567890").unwrap();
        let fp = moderate_path::<f64>(&num);
        assert!(fp.exp >= 0);
        assert_eq!(
            f64::from_bits(pack::<f64>(fp, false)),
            12345678901234567890.0
        );
    }
}
