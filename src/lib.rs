//! Correctly rounded conversion of decimal and hexadecimal numeric
//! literals to IEEE-754 floating-point bit patterns.
//!
//! For every input string the produced `f32` or `f64` is the representable
//! value nearest the literal's exact mathematical value, with ties broken
//! to the even mantissa. The conversion uses only fixed-width integer
//! arithmetic: an Eisel-Lemire estimator backed by a precomputed table of
//! 128-bit powers of five handles almost all inputs with one or two
//! multiplications, and a fixed-capacity big-integer comparison re-derives
//! the exact result for the rare literals the estimator cannot prove
//! correctly rounded. No heap allocation is performed anywhere.
//!
//! ```
//! let parsed = floatscan::parse_first::<f64>(b"12.5abc");
//! assert_eq!(parsed.value, 12.5);
//! assert_eq!(parsed.len, 4);
//! assert_eq!(parsed.error, None);
//!
//! assert_eq!(floatscan::parse_complete::<f64>(b"1e3"), Some(1000.0));
//! assert_eq!(floatscan::parse_complete::<f64>(b"12.5abc"), None);
//!
//! assert_eq!(floatscan::parse_first_hex::<f64>(b"0x1.8p1").value, 3.0);
//! ```

// FEATURES

#![cfg_attr(not(feature = "std"), no_std)]

/// Facade around the core features for name mangling.
pub(crate) mod lib {
    #[cfg(feature = "std")]
    pub(crate) use std::*;

    #[cfg(not(feature = "std"))]
    pub(crate) use core::*;
}

// MODULES
mod bhcomp;
mod bignum;
mod digit;
mod exponent;
mod float;
mod hex;
mod lemire;
mod num;
mod parse;
mod powers;
mod rounding;
mod scan;

// API
pub use self::num::Float;
pub use self::parse::{
    parse_complete, parse_first, parse_first_c_str, parse_first_hex, parse_first_hex_c_str,
    Error, Parsed,
};
