//! Public entry points: scan, estimate, fall back, pack.

use crate::bhcomp::bhcomp;
use crate::float::{pack, ExtendedFloat, INVALID_FP};
use crate::hex::{hex_to_float, scan_hex};
use crate::lemire::moderate_path;
use crate::lib::ffi::CStr;
use crate::lib::fmt::{self, Display};
use crate::num::Float;
use crate::scan::{scan, ScannedDecimal};

// OUTCOMES
// --------

/// Why a conversion did not produce an in-range value.
///
/// These accompany the result as data; the parsing functions never panic
/// on any input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// No digits were found; nothing was consumed and the value is
    /// meaningless.
    NoOrInvalidInput,
    /// The literal's magnitude exceeds the format; the value was clamped
    /// to infinity of the literal's sign.
    OutOfRange,
    /// A non-zero literal rounded down to zero of the literal's sign.
    RoundedDownToZero,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NoOrInvalidInput => f.write_str("no or invalid floating-point input"),
            Error::OutOfRange => f.write_str("floating-point literal out of range"),
            Error::RoundedDownToZero => f.write_str("floating-point literal rounded down to zero"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Outcome of parsing the leading float in a byte string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parsed<F> {
    /// The converted value; zero when nothing valid was found, clamped
    /// when out of range.
    pub value: F,
    /// Bytes consumed from the input.
    pub len: usize,
    /// What went wrong, if anything.
    pub error: Option<Error>,
}

impl<F: Float> Parsed<F> {
    #[inline]
    fn invalid() -> Self {
        Parsed {
            value: F::ZERO,
            len: 0,
            error: Some(Error::NoOrInvalidInput),
        }
    }
}

// CONVERSION
// ----------

/// Classify the packed result against what was scanned.
#[inline]
fn classify<F: Float>(fp: ExtendedFloat, nonzero_literal: bool) -> Option<Error> {
    if fp.exp == F::INFINITE_POWER {
        Some(Error::OutOfRange)
    } else if nonzero_literal && fp.exp == 0 && fp.mant == 0 {
        Some(Error::RoundedDownToZero)
    } else {
        None
    }
}

/// Convert scanned digits to positive float bits plus an error class.
fn convert<F: Float>(num: &ScannedDecimal<'_>) -> (u64, Option<Error>) {
    // Trivially exact literals never leave the representable range.
    if let Some(value) = num.try_fast_path::<F>() {
        return (value.to_bits64(), None);
    }

    let mut fp = moderate_path::<F>(num);
    if fp.exp < 0 {
        // The estimator could not prove correct rounding; undo the
        // invalid-exponent bias and re-derive exactly.
        fp.exp -= INVALID_FP;
        fp = bhcomp::<F>(num, fp);
    }

    (pack::<F>(fp, false), classify::<F>(fp, num.mantissa != 0))
}

// ENTRY POINTS
// ------------

/// Parse the longest valid decimal literal at the start of `input`.
///
/// Grammar: optional `+`/`-`, digits, optional `.` and more digits (at
/// least one digit somewhere), optional `e`/`E` exponent. The caller must
/// trim any leading whitespace beforehand. A malformed exponent suffix
/// ends the literal just before the `e` rather than failing.
///
/// ```
/// let parsed = floatscan::parse_first::<f64>(b"1.5e3 rest");
/// assert_eq!((parsed.value, parsed.len), (1500.0, 5));
/// ```
pub fn parse_first<F: Float>(input: &[u8]) -> Parsed<F> {
    let num = match scan(input) {
        Some(num) => num,
        None => return Parsed::invalid(),
    };
    let (word, error) = convert::<F>(&num);
    let word = if num.negative {
        word | (1u64 << F::SIGN_INDEX)
    } else {
        word
    };
    Parsed {
        value: F::from_bits64(word),
        len: num.len,
        error,
    }
}

/// Like [`parse_first`], for NUL-terminated input.
#[inline]
pub fn parse_first_c_str<F: Float>(input: &CStr) -> Parsed<F> {
    parse_first(input.to_bytes())
}

/// Parse `input` as exactly one decimal literal.
///
/// Returns `None` unless the whole span is consumed by one valid
/// literal. Out-of-range literals are still complete parses and yield
/// the clamped value.
pub fn parse_complete<F: Float>(input: &[u8]) -> Option<F> {
    let parsed = parse_first::<F>(input);
    if parsed.error == Some(Error::NoOrInvalidInput) || parsed.len != input.len() {
        None
    } else {
        Some(parsed.value)
    }
}

/// Parse the longest valid hexadecimal float literal at the start of
/// `input`.
///
/// Grammar: optional `+`/`-`, `0x` or `0X`, hex digits, optional `.` and
/// more hex digits (at least one digit somewhere), optional `p`/`P`
/// binary exponent in decimal.
///
/// ```
/// let parsed = floatscan::parse_first_hex::<f64>(b"0x1.8p1");
/// assert_eq!(parsed.value, 3.0);
/// ```
pub fn parse_first_hex<F: Float>(input: &[u8]) -> Parsed<F> {
    let num = match scan_hex(input) {
        Some(num) => num,
        None => return Parsed::invalid(),
    };
    let fp = hex_to_float::<F>(&num);
    Parsed {
        value: F::from_bits64(pack::<F>(fp, num.negative)),
        len: num.len,
        error: classify::<F>(fp, num.mantissa != 0),
    }
}

/// Like [`parse_first_hex`], for NUL-terminated input.
#[inline]
pub fn parse_first_hex_c_str<F: Float>(input: &CStr) -> Parsed<F> {
    parse_first_hex(input.to_bytes())
}

// TESTS
// -----
