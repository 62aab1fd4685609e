//! Hexadecimal floating-point literals.
//!
//! Accepted form: `[+-]? (0x)? H* (. H*)? (p [+-]? D+)?` where at least one
//! hex digit is present, plus `inf`, `infinity` and `nan` (any case).
//! The exponent is a power of two. Examples: `0x1.8p+1` (3.0), `-0x.4p0`
//! (-0.25), `0x0p+0` (0.0).

/// Digits beyond this many significant bits are folded into a sticky bit.
const MANTISSA_LIMIT: u64 = 1 << 60;

/// Exponents are clamped to this magnitude while parsing; anything larger
/// overflows or underflows regardless.
const EXPONENT_CLAMP: i64 = 1 << 20;

/// Parse a hexadecimal float literal. Returns `None` for malformed text or
/// for a finite literal too large to represent.
pub fn parse_hex_float(text: &str) -> Option<f64> {
    let text = text.trim();
    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let magnitude = match body.to_ascii_lowercase().as_str() {
        "inf" | "infinity" => f64::INFINITY,
        "nan" => f64::NAN,
        _ => parse_finite(body)?,
    };

    Some(if negative { -magnitude } else { magnitude })
}

fn parse_finite(body: &str) -> Option<f64> {
    let body = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
        .unwrap_or(body);

    let (mantissa, exponent) = match body.find(['p', 'P']) {
        Some(pos) => (&body[..pos], parse_exponent(&body[pos + 1..])?),
        None => (body, 0),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut bits: u64 = 0;
    let mut scale = exponent;
    let mut sticky = false;

    for c in int_part.chars() {
        let digit = u64::from(c.to_digit(16)?);
        if bits < MANTISSA_LIMIT {
            bits = (bits << 4) | digit;
        } else {
            scale += 4;
            sticky |= digit != 0;
        }
    }
    for c in frac_part.chars() {
        let digit = u64::from(c.to_digit(16)?);
        if bits < MANTISSA_LIMIT {
            bits = (bits << 4) | digit;
            scale -= 4;
        } else {
            sticky |= digit != 0;
        }
    }
    if sticky {
        bits |= 1;
    }

    let value = scale_by_power_of_two(bits as f64, scale);
    value.is_finite().then_some(value)
}

fn parse_exponent(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() {
        return None;
    }

    let mut exp: i64 = 0;
    for c in digits.chars() {
        let digit = i64::from(c.to_digit(10)?);
        exp = (exp * 10 + digit).min(EXPONENT_CLAMP);
    }
    Some(if negative { -exp } else { exp })
}

/// `value * 2^exp`, stepping so intermediate powers stay normal.
fn scale_by_power_of_two(mut value: f64, mut exp: i64) -> f64 {
    const STEP: i64 = 1000;
    if value == 0.0 {
        return value;
    }
    while exp > STEP && value.is_finite() {
        value *= 2f64.powi(STEP as i32);
        exp -= STEP;
    }
    while exp < -STEP && value != 0.0 {
        value *= 2f64.powi(-STEP as i32);
        exp += STEP;
    }
    value * 2f64.powi(exp as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_forms() {
        assert_eq!(parse_hex_float("0x1.8p+1"), Some(3.0));
        assert_eq!(parse_hex_float("0x1p-2"), Some(0.25));
        assert_eq!(parse_hex_float("0x0p+0"), Some(0.0));
        assert_eq!(parse_hex_float("0x1.0000000000000p+0"), Some(1.0));
        assert_eq!(parse_hex_float("-0x1.4p+3"), Some(-10.0));
    }

    #[test]
    fn relaxed_forms() {
        assert_eq!(parse_hex_float("1"), Some(1.0));
        assert_eq!(parse_hex_float("a"), Some(10.0));
        assert_eq!(parse_hex_float("0x.8"), Some(0.5));
        assert_eq!(parse_hex_float("0X10P0"), Some(16.0));
        assert_eq!(parse_hex_float("  0x2p1  "), Some(4.0));
        assert_eq!(parse_hex_float("1."), Some(1.0));
    }

    #[test]
    fn special_values() {
        assert_eq!(parse_hex_float("inf"), Some(f64::INFINITY));
        assert_eq!(parse_hex_float("-Infinity"), Some(f64::NEG_INFINITY));
        assert!(parse_hex_float("nan").unwrap().is_nan());
    }

    #[test]
    fn malformed() {
        assert_eq!(parse_hex_float(""), None);
        assert_eq!(parse_hex_float("0x"), None);
        assert_eq!(parse_hex_float("."), None);
        assert_eq!(parse_hex_float("0x1p"), None);
        assert_eq!(parse_hex_float("0x1g"), None);
        assert_eq!(parse_hex_float("1.5.2"), None);
        assert_eq!(parse_hex_float("0x1p+1.5"), None);
    }

    #[test]
    fn extremes() {
        assert_eq!(parse_hex_float("0x1.fffffffffffffp+1023"), Some(f64::MAX));
        assert_eq!(parse_hex_float("0x1p+1024"), None);
        assert_eq!(parse_hex_float("0x1p-1074"), Some(f64::from_bits(1)));
        assert_eq!(parse_hex_float("0x1p-5000"), Some(0.0));
    }

    #[test]
    fn long_mantissa_is_rounded() {
        // 1 + 2^-56 rounds to 1.0; the trailing 1 lands in the sticky bit.
        assert_eq!(parse_hex_float("0x1.00000000000001p0"), Some(1.0));
        assert_eq!(
            parse_hex_float("0x123456789abcdef0123p0"),
            Some(0x123456789abcdef0123u128 as f64)
        );
    }
}
