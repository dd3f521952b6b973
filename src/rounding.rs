//! Rounding an extended-precision value into a native float.
//!
//! One routine handles every producer: the estimator's error path, the
//! big-integer fallback, and the hexadecimal assembler all feed the same
//! shift-parameterized rounding, so subnormals, overflow to infinity and
//! ties-to-even behave identically everywhere.

use crate::float::ExtendedFloat;
use crate::num::Float;

// MASKS

/// Generate a bitwise mask for the lower `n` bits.
#[inline]
pub(crate) fn lower_n_mask(n: i32) -> u64 {
    debug_assert!(n >= 0 && n <= 64, "lower_n_mask() overflow in shl.");

    if n == 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// Calculate the halfway point for the lower `n` bits.
#[inline]
pub(crate) fn lower_n_halfway(n: i32) -> u64 {
    debug_assert!(n >= 0 && n <= 64, "lower_n_halfway() overflow in shl.");

    if n == 0 {
        0
    } else {
        1u64 << (n - 1)
    }
}

// ROUNDING SCHEMES

/// Shift right `shift` bits and round to the nearest, with the tie
/// decision delegated to `cb(is_odd, is_halfway, is_above)`.
#[inline]
pub(crate) fn round_nearest_tie_even<Cb>(fp: &mut ExtendedFloat, shift: i32, cb: Cb)
where
    Cb: FnOnce(bool, bool, bool) -> bool,
{
    // Extract the truncated bits and compare them against the exact
    // halfway pattern: for 4 discarded bits the mask is 0b1111 and the
    // halfway point 0b1000.
    let mask = lower_n_mask(shift);
    let halfway = lower_n_halfway(shift);
    let truncated_bits = fp.mant & mask;
    let is_above = truncated_bits > halfway;
    let is_halfway = truncated_bits == halfway;

    // Shift the mantissa into place, accepting a full-width shift.
    fp.mant = if shift == 64 { 0 } else { fp.mant >> shift };
    fp.exp += shift;

    let is_odd = fp.mant & 1 == 1;
    if cb(is_odd, is_halfway, is_above) {
        fp.mant += 1;
    }
}

/// Shift right `shift` bits and truncate.
#[inline]
pub(crate) fn round_down(fp: &mut ExtendedFloat, shift: i32) {
    fp.mant = if shift == 64 { 0 } else { fp.mant >> shift };
    fp.exp += shift;
}

// ROUND TO NATIVE

/// Round an unrounded extended float to the native format.
///
/// On entry `fp` is in pre-rounding form (`mant * 2^exp`). On return it is
/// in packed form: the mantissa fits the format with the hidden bit
/// cleared, and the exponent is the biased field value, 0 for zero and
/// subnormals and `INFINITE_POWER` for overflow. The rounding decision
/// itself is made by `cb`, which receives the number of bits to discard.
pub(crate) fn round<F, Cb>(fp: &mut ExtendedFloat, cb: Cb)
where
    F: Float,
    Cb: FnOnce(&mut ExtendedFloat, i32),
{
    if fp.mant == 0 {
        fp.exp = 0;
        return;
    }

    // Normalize so the most significant bit is set; right-shifts below
    // rely on it.
    let zeros = fp.mant.leading_zeros() as i32;
    fp.mant <<= zeros;
    fp.exp -= zeros;

    // Biased exponent field the value would get as a normal float. The
    // mantissa's most significant bit now has weight 2^(exp + 63).
    let biased = fp.exp + 63 - F::MINIMUM_EXPONENT;
    let mantissa_shift = 64 - F::MANTISSA_SIZE - 1;

    if biased <= 0 {
        // Subnormal range: discard `1 - biased` extra bits, then re-check
        // whether rounding carried the value back up to the normal range.
        let shift = mantissa_shift + 1 - biased;
        if shift > 64 {
            // Everything is below half the smallest subnormal.
            fp.mant = 0;
            fp.exp = 0;
            return;
        }

        cb(fp, shift);

        if fp.mant & (1u64 << F::MANTISSA_SIZE) != 0 {
            // The carry reached the hidden bit: smallest normal value.
            fp.mant &= !(1u64 << F::MANTISSA_SIZE);
            fp.exp = 1;
        } else {
            fp.exp = 0;
        }
        return;
    }

    cb(fp, mantissa_shift);

    let mut biased = biased;
    if fp.mant & (2u64 << F::MANTISSA_SIZE) != 0 {
        // Rounding up overflowed past the hidden bit.
        fp.mant >>= 1;
        biased += 1;
    }

    if biased >= F::INFINITE_POWER {
        fp.mant = 0;
        fp.exp = F::INFINITE_POWER;
        return;
    }

    fp.mant &= !(1u64 << F::MANTISSA_SIZE);
    fp.exp = biased;
}

/// The default nearest, ties-to-even decision. `truncated` records that
/// non-zero digits were discarded before rounding, which breaks a
/// halfway pattern upward.
#[inline]
pub(crate) fn nearest_tie_even(truncated: bool) -> impl FnOnce(&mut ExtendedFloat, i32) {
    move |fp, shift| {
        round_nearest_tie_even(fp, shift, |is_odd, is_halfway, is_above| {
            is_above || (is_halfway && truncated) || (is_odd && is_halfway)
        });
    }
}

// TESTS
// -----

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_n_mask_test() {
        assert_eq!(lower_n_mask(0), 0b0);
        assert_eq!(lower_n_mask(1), 0b1);
        assert_eq!(lower_n_mask(2), 0b11);
        assert_eq!(lower_n_mask(10), 0b1111111111);
        assert_eq!(lower_n_mask(64), u64::MAX);
    }

    #[test]
    fn lower_n_halfway_test() {
        assert_eq!(lower_n_halfway(0), 0b0);
        assert_eq!(lower_n_halfway(1), 0b1);
        assert_eq!(lower_n_halfway(2), 0b10);
        assert_eq!(lower_n_halfway(10), 0b1000000000);
    }

    #[test]
    fn round_nearest_tie_even_test() {
        let even = |is_odd: bool, is_halfway: bool, is_above: bool| {
            is_above || (is_odd && is_halfway)
        };

        // Check round-up, halfway: 0b1100000 discarding 6 bits.
        let mut fp = ExtendedFloat { mant: 0x60, exp: 0 };
        round_nearest_tie_even(&mut fp, 6, even);
        assert_eq!(fp.mant, 2);

        // Check round-down, halfway: 0b0100000.
        let mut fp = ExtendedFloat { mant: 0x20, exp: 0 };
        round_nearest_tie_even(&mut fp, 6, even);
        assert_eq!(fp.mant, 0);

        // Check round-up, above halfway.
        let mut fp = ExtendedFloat { mant: 0x61, exp: 0 };
        round_nearest_tie_even(&mut fp, 6, even);
        assert_eq!(fp.mant, 2);

        // Check round-down, below halfway.
        let mut fp = ExtendedFloat { mant: 0x5F, exp: 0 };
        round_nearest_tie_even(&mut fp, 6, even);
        assert_eq!(fp.mant, 1);
    }

    #[test]
    fn round_to_native_test() {
        // Exact power of two: 1.0.
        let mut fp = ExtendedFloat { mant: 1, exp: 0 };
        round::<f64, _>(&mut fp, nearest_tie_even(false));
        assert_eq!(fp, ExtendedFloat { mant: 0, exp: 1023 });

        // Halfway, round-down: 1 + 2^-53 exactly between 1.0 and the
        // next float up, with an even mantissa below.
        let mut fp = ExtendedFloat { mant: (1u64 << 53) + 1, exp: -53 };
        round::<f64, _>(&mut fp, nearest_tie_even(false));
        assert_eq!(fp, ExtendedFloat { mant: 0, exp: 1023 });

        // Same halfway pattern with truncated digits below: round up.
        let mut fp = ExtendedFloat { mant: (1u64 << 53) + 1, exp: -53 };
        round::<f64, _>(&mut fp, nearest_tie_even(true));
        assert_eq!(fp, ExtendedFloat { mant: 1, exp: 1023 });

        // Halfway, round-up to odd neighbor's even successor:
        // 1 + 3 * 2^-53 rounds up to 1 + 2^-51.
        let mut fp = ExtendedFloat { mant: (1u64 << 53) + 3, exp: -53 };
        round::<f64, _>(&mut fp, nearest_tie_even(false));
        assert_eq!(fp, ExtendedFloat { mant: 2, exp: 1023 });

        // Carry out of an all-ones mantissa bumps the exponent.
        let mut fp = ExtendedFloat { mant: u64::MAX, exp: -64 };
        round::<f64, _>(&mut fp, nearest_tie_even(false));
        assert_eq!(fp, ExtendedFloat { mant: 0, exp: 1023 });

        // Overflow to infinity.
        let mut fp = ExtendedFloat { mant: u64::MAX, exp: 960 };
        round::<f64, _>(&mut fp, nearest_tie_even(false));
        assert_eq!(fp, ExtendedFloat { mant: 0, exp: 0x7FF });

        // Largest finite value: (2^53 - 1) * 2^971.
        let mut fp = ExtendedFloat { mant: (1u64 << 53) - 1, exp: 971 };
        round::<f64, _>(&mut fp, nearest_tie_even(false));
        assert_eq!(fp, ExtendedFloat { mant: (1u64 << 52) - 1, exp: 2046 });
        assert_eq!(f64::from_bits(crate::float::pack::<f64>(fp, false)), f64::MAX);

        // Smallest subnormal: 2^-1074.
        let mut fp = ExtendedFloat { mant: 1, exp: -1074 };
        round::<f64, _>(&mut fp, nearest_tie_even(false));
        assert_eq!(fp, ExtendedFloat { mant: 1, exp: 0 });

        // Half the smallest subnormal ties down to zero.
        let mut fp = ExtendedFloat { mant: 1, exp: -1075 };
        round::<f64, _>(&mut fp, nearest_tie_even(false));
        assert_eq!(fp, ExtendedFloat { mant: 0, exp: 0 });

        // Just above half the smallest subnormal rounds up.
        let mut fp = ExtendedFloat { mant: 3, exp: -1076 };
        round::<f64, _>(&mut fp, nearest_tie_even(false));
        assert_eq!(fp, ExtendedFloat { mant: 1, exp: 0 });

        // Below half the smallest subnormal: zero.
        let mut fp = ExtendedFloat { mant: 1, exp: -1076 };
        round::<f64, _>(&mut fp, nearest_tie_even(false));
        assert_eq!(fp, ExtendedFloat { mant: 0, exp: 0 });

        // The largest subnormal region: rounds to 2^-1023.
        let mut fp = ExtendedFloat { mant: u64::MAX, exp: -1087 };
        round::<f64, _>(&mut fp, nearest_tie_even(false));
        assert_eq!(fp, ExtendedFloat { mant: 1u64 << 51, exp: 0 });

        // A subnormal that rounds up into the normal range.
        let mut fp = ExtendedFloat { mant: u64::MAX, exp: -1086 };
        round::<f64, _>(&mut fp, nearest_tie_even(false));
        assert_eq!(fp, ExtendedFloat { mant: 0, exp: 1 });
    }

    #[test]
    fn round_down_test() {
        let mut fp = ExtendedFloat { mant: (1u64 << 53) + 1, exp: -53 };
        round::<f64, _>(&mut fp, round_down);
        assert_eq!(fp, ExtendedFloat { mant: 0, exp: 1023 });

        let mut fp = ExtendedFloat { mant: u64::MAX, exp: -64 };
        round::<f64, _>(&mut fp, round_down);
        assert_eq!(fp, ExtendedFloat { mant: (1u64 << 52) - 1, exp: 1022 });
    }
}
