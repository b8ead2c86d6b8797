//! Result formatting for the calculator display.
//!
//! Integers are grouped in thousands with a single space, real values get
//! six fractional digits with trailing zeros trimmed.

/// Fractional digits kept for real (non-integer) results.
pub const FRACTION_DIGITS: usize = 6;

const GROUP_SEPARATOR: char = ' ';

/// Format an evaluation result for display.
///
/// `exact_integer` selects the integer branch, which never shows a decimal
/// point. Any finite input produces a string; callers are expected to have
/// rejected NaN and infinities already.
pub fn format_result(value: f64, exact_integer: bool) -> String {
    if exact_integer {
        let rounded = value.round();
        let digits = format!("{:.0}", rounded.abs());
        return with_sign(rounded < 0.0, group_digits(&digits));
    }

    let formatted = format!("{:.*}", FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = group_digits(int_part);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    with_sign(value < 0.0, out)
}

/// Format an exact integer given as a decimal digit string, optionally signed.
///
/// Used when the backend has the exact digits, which may exceed what an `f64`
/// represents.
pub fn format_integer(text: &str) -> String {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return "0".to_string();
    }
    with_sign(negative, group_digits(digits))
}

/// Insert a separator between every group of three digits, counted from the right.
fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(GROUP_SEPARATOR);
        }
        result.push(c);
    }
    result
}

// A value that rounds to zero is shown as "0", never "-0".
fn with_sign(negative: bool, magnitude: String) -> String {
    if negative && magnitude != "0" {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_grouping() {
        assert_eq!(format_result(0.0, true), "0");
        assert_eq!(format_result(20.0, true), "20");
        assert_eq!(format_result(999.0, true), "999");
        assert_eq!(format_result(1000.0, true), "1 000");
        assert_eq!(format_result(1_000_000.0, true), "1 000 000");
        assert_eq!(format_result(-1_234_567.0, true), "-1 234 567");
    }

    #[test]
    fn test_format_integer_digits() {
        assert_eq!(format_integer("0"), "0");
        assert_eq!(format_integer("-0"), "0");
        assert_eq!(format_integer("1000"), "1 000");
        assert_eq!(format_integer("-1234567"), "-1 234 567");
        assert_eq!(
            format_integer("12157665459056928801"),
            "12 157 665 459 056 928 801"
        );
    }

    #[test]
    fn test_large_exact_integer() {
        assert_eq!(
            format_result(2f64.powi(60), true),
            "1 152 921 504 606 846 976"
        );
    }

    #[test]
    fn test_real_trims_trailing_zeros() {
        assert_eq!(format_result(2.5, false), "2.5");
        assert_eq!(format_result(1.0 / 3.0, false), "0.333333");
        assert_eq!(format_result(2.0 / 3.0, false), "0.666667");
        assert_eq!(format_result(1234.125, false), "1 234.125");
        assert_eq!(format_result(-1_234_567.125, false), "-1 234 567.125");
    }

    #[test]
    fn test_real_drops_bare_decimal_point() {
        assert_eq!(format_result(2.0, false), "2");
        assert_eq!(format_result(999.9999999, false), "1 000");
    }

    #[test]
    fn test_negative_zero_is_plain_zero() {
        assert_eq!(format_result(-0.0, true), "0");
        assert_eq!(format_result(-0.0000001, false), "0");
        assert_eq!(format_result(-0.4, true), "0");
    }

    #[test]
    fn test_reparse_within_precision() {
        let samples = [
            0.0,
            1.5,
            -2.75,
            1.0 / 7.0,
            12_345.678_901_2,
            -98_765_432.1,
            std::f64::consts::PI,
            1e-7,
        ];
        for value in samples {
            let shown = format_result(value, false);
            let reparsed: f64 = shown.replace(GROUP_SEPARATOR, "").parse().unwrap();
            assert!(
                (reparsed - value).abs() <= 0.5e-6 + f64::EPSILON * value.abs(),
                "{value} formatted as {shown}"
            );
            assert_eq!(format_result(reparsed, false), shown);
        }
    }
}
