//! Decimal parsing against the standard library's correctly rounded
//! parser, plus the documented boundary and error semantics.

use std::ffi::CStr;

use floatscan::{parse_complete, parse_first, parse_first_c_str, Error};

/// Check agreement with the standard library for both formats.
#[track_caller]
fn check(s: &str) {
    let expected: f64 = s.parse().unwrap();
    let parsed = parse_first::<f64>(s.as_bytes());
    assert_eq!(parsed.len, s.len(), "consumed length for {s}");
    assert_eq!(
        parsed.value.to_bits(),
        expected.to_bits(),
        "f64 value for {s}: got {:e}, want {expected:e}",
        parsed.value,
    );

    let expected: f32 = s.parse().unwrap();
    let parsed = parse_first::<f32>(s.as_bytes());
    assert_eq!(
        parsed.value.to_bits(),
        expected.to_bits(),
        "f32 value for {s}: got {:e}, want {expected:e}",
        parsed.value,
    );
}

#[test]
fn ordinary() {
    check("1.0");
    check("3e-5");
    check("0.1");
    check("12345.");
    check("0.9999999");
    check("2.2250738585072014e-308");
    check("1.448997445238699");
    check("+8.5");
    check("-356.310");
}

#[test]
fn large() {
    check("1e300");
    check("123456789.34567e250");
    check("943794359898089732078308743689303290943794359843568973207830874368930329.");
}

#[test]
fn subnormals() {
    check("5e-324");
    check("91e-324");
    check("1e-322");
    check("13245643e-320");
    check("2.22507385851e-308");
    check("2.1e-308");
    check("4.9406564584124654e-324");
    check("4.9e-324");
}

#[test]
fn infinity_boundary() {
    let parsed = parse_first::<f64>(b"1e400");
    assert_eq!(parsed.value, f64::INFINITY);
    assert_eq!(parsed.error, Some(Error::OutOfRange));

    let parsed = parse_first::<f64>(b"-1e400");
    assert_eq!(parsed.value, f64::NEG_INFINITY);
    assert_eq!(parsed.error, Some(Error::OutOfRange));

    let parsed = parse_first::<f64>(b"1e309");
    assert_eq!(parsed.value, f64::INFINITY);
    assert_eq!(parsed.error, Some(Error::OutOfRange));

    // The largest finite double is still in range.
    let parsed = parse_first::<f64>(b"1.7976931348623157e308");
    assert_eq!(parsed.value, f64::MAX);
    assert_eq!(parsed.error, None);

    // f32 overflows much earlier.
    let parsed = parse_first::<f32>(b"1e39");
    assert_eq!(parsed.value, f32::INFINITY);
    assert_eq!(parsed.error, Some(Error::OutOfRange));
    let parsed = parse_first::<f32>(b"3.4028235e38");
    assert_eq!(parsed.value, f32::MAX);
    assert_eq!(parsed.error, None);
}

#[test]
fn underflow_boundary() {
    let parsed = parse_first::<f64>(b"1e-400");
    assert_eq!(parsed.value.to_bits(), 0);
    assert_eq!(parsed.error, Some(Error::RoundedDownToZero));

    let parsed = parse_first::<f64>(b"-1e-400");
    assert_eq!(parsed.value.to_bits(), (-0.0f64).to_bits());
    assert_eq!(parsed.error, Some(Error::RoundedDownToZero));

    // Half the smallest subnormal ties down to zero.
    let parsed = parse_first::<f64>(b"2.4703282292062327e-324");
    assert_eq!(parsed.value, 0.0);
    assert_eq!(parsed.error, Some(Error::RoundedDownToZero));

    // The smallest subnormal itself is in range.
    let parsed = parse_first::<f64>(b"4.9e-324");
    assert_eq!(parsed.value, 5e-324);
    assert_eq!(parsed.error, None);

    // An exact zero is not an underflow, whatever its exponent.
    let parsed = parse_first::<f64>(b"0");
    assert_eq!(parsed.value, 0.0);
    assert_eq!(parsed.error, None);
    let parsed = parse_first::<f64>(b"0e-400");
    assert_eq!(parsed.error, None);
    let parsed = parse_first::<f32>(b"1e-46");
    assert_eq!(parsed.value, 0.0);
    assert_eq!(parsed.error, Some(Error::RoundedDownToZero));
}

#[test]
fn ties_to_even() {
    check("9007199254740993");
    check("9007199254740995");
    check("36893488147419103229.0");
    // f32 tie: 2^24 + 1.
    check("16777217");
    // Ties broken by digits far beyond the 19-digit window.
    check("9007199254740992.5000000000000000000000000000000001");
    check("9007199254740992.5");
}

#[test]
fn hard_cases() {
    // Literals known to sit close to rounding boundaries.
    check("2.2250738585072011e-308");
    check("2.2250738585072012e-308");
    check("0.500000000000000166533453693773481063544750213623046875");
    check("1.50000000000000011102230246251565404236316680908203125");
    check("3.518437208883201171875e13");
    check("62.5364939768271845828");
    check("8.10109172351e-10");
    check("9007199254740991.4999999999999999999999999999999995");
    check("30078505129381147446200");
    check("1777820000000000000001");
    check("0.3932922657273");
    check("1e23");
    check("2075e23");
    check("8713e-23");
    check("101e-33");
}

#[test]
fn long_mantissas() {
    // Force the big-integer fallback with digit counts past the window.
    check("1234567890123456789012345678901234567890e-20");
    check("0.00000000000000000000000000000000000000001");

    // 770 digits, the last of which decides the rounding.
    let mut s = String::from("9007199254740992.");
    s.push_str(&"0".repeat(750));
    s.push('1');
    check(&s);

    // All-nines mantissa longer than any window.
    let s = "9".repeat(400);
    check(&s);

    // Long tail of zeros must not disturb an exact value.
    let mut s = String::from("1.");
    s.push_str(&"0".repeat(800));
    check(&s);

    let mut s = String::from("0.");
    s.push_str(&"0".repeat(769));
    s.push('1');
    check(&s);
}

#[test]
fn partial_parse() {
    let parsed = parse_first::<f64>(b"12.5abc");
    assert_eq!(parsed.value, 12.5);
    assert_eq!(parsed.len, 4);
    assert_eq!(parsed.error, None);
    assert_eq!(parse_complete::<f64>(b"12.5abc"), None);
    assert_eq!(parse_complete::<f64>(b"12.5"), Some(12.5));

    // The decimal parser stops at a hex prefix after the leading zero.
    let parsed = parse_first::<f64>(b"0x1p2");
    assert_eq!(parsed.value, 0.0);
    assert_eq!(parsed.len, 1);

    // Malformed exponent suffixes are left unconsumed.
    let parsed = parse_first::<f64>(b"1e");
    assert_eq!(parsed.value, 1.0);
    assert_eq!(parsed.len, 1);
    let parsed = parse_first::<f64>(b"3.5e+x");
    assert_eq!(parsed.value, 3.5);
    assert_eq!(parsed.len, 3);
}

#[test]
fn invalid_input() {
    for case in [
        &b""[..], b".", b"+", b"-", b".e0", b"e5", b"+e5", b"abc", b" 1.0", b"\t2", b"inf",
        b"NaN", b"nan", b"Infinity", b"_1",
    ] {
        let parsed = parse_first::<f64>(case);
        assert_eq!(parsed.len, 0, "consumed bytes of {:?}", case);
        assert_eq!(parsed.error, Some(Error::NoOrInvalidInput));
        assert_eq!(parse_complete::<f64>(case), None);
    }

    // Trailing whitespace is not consumed either.
    let parsed = parse_first::<f64>(b"1.0 ");
    assert_eq!(parsed.len, 3);
    assert_eq!(parse_complete::<f64>(b"1.0 "), None);
}

#[test]
fn massive_exponents() {
    let parsed = parse_first::<f64>(format!("1e{}000", i64::MAX).as_bytes());
    assert_eq!(parsed.value, f64::INFINITY);
    assert_eq!(parsed.error, Some(Error::OutOfRange));

    let parsed = parse_first::<f64>(format!("1e-{}000", i64::MAX).as_bytes());
    assert_eq!(parsed.value, 0.0);
    assert_eq!(parsed.error, Some(Error::RoundedDownToZero));
}

#[test]
fn nul_terminated() {
    let input = CStr::from_bytes_with_nul(b"42.5abc\0").unwrap();
    let parsed = parse_first_c_str::<f64>(input);
    assert_eq!(parsed.value, 42.5);
    assert_eq!(parsed.len, 4);

    let input = CStr::from_bytes_with_nul(b"\0").unwrap();
    let parsed = parse_first_c_str::<f64>(input);
    assert_eq!(parsed.error, Some(Error::NoOrInvalidInput));
}

#[test]
fn exactness_shortcut() {
    // Every mantissa/exponent pair in the exact range must match the
    // multiply/divide by a power of ten it abbreviates.
    for exp in -22..=22i32 {
        let m = 9007199254740991u64; // 2^53 - 1
        let s = format!("{m}e{exp}");
        check(&s);
    }
    for m in [1u64, 2, 10, 12345, 4503599627370496, 9007199254740992] {
        for exp in [-22, -10, -1, 0, 1, 10, 22] {
            let s = format!("{m}e{exp}");
            check(&s);
        }
    }
}
