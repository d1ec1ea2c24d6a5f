//! Conversion of user-typed text into numbers.
//!
//! Every numeric input site goes through [`parse_or_zero`]. Text that is not
//! a number becomes zero instead of an error so a form stays usable while
//! the user is still typing.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

/// `1,234,567.89` style: commas only between groups of three digits.
static GROUPED_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?\d{1,3}(?:,\d{3})+(?:\.\d*)?)(?:[eE]([+-]?\d+))?").unwrap()
});

static PLAIN_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?(?:\d+(?:\.\d*)?|\.\d+))(?:[eE]([+-]?\d+))?").unwrap()
});

/// A number found at the start of the input.
struct LeadingNumber<'a> {
    mantissa: String,
    exponent: Option<&'a str>,
    len: usize,
}

fn leading_number(s: &str) -> Option<LeadingNumber<'_>> {
    // A grouped match followed by more digits or commas ("1,2345") is not a
    // thousands separator after all.
    let grouped = GROUPED_NUMBER.captures(s).filter(|caps| {
        let end = caps.get(0).map_or(0, |m| m.end());
        !s[end..].starts_with(|c: char| c.is_ascii_digit() || c == ',')
    });
    let caps = grouped.or_else(|| PLAIN_NUMBER.captures(s))?;

    let raw = caps.get(1)?.as_str().replace(',', "");
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.trim_start_matches('+')),
    };
    let digits = digits.trim_end_matches('.');
    let zero = if digits.starts_with('.') { "0" } else { "" };

    Some(LeadingNumber {
        mantissa: format!("{sign}{zero}{digits}"),
        exponent: caps.get(2).map(|m| m.as_str().trim_start_matches('+')),
        len: caps.get(0).map_or(0, |m| m.len()),
    })
}

/// Parses the longest number at the start of `s`, falling back to zero.
///
/// Whatever follows the number is ignored, so `"3 m2"` reads as 3 and
/// `"12abc"` as 12. A comma counts as a thousands separator only between
/// groups of three digits (`"1,234.56"`); anywhere else it ends the number,
/// so `"1,5"` reads as 1. Input that does not start with a number, and
/// numbers too large for a [`Decimal`], yield `0`.
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use estimate_core::input::parse_or_zero;
///
/// assert_eq!(parse_or_zero("1,234.56"), dec!(1234.56));
/// assert_eq!(parse_or_zero("3 m2"), dec!(3));
/// assert_eq!(parse_or_zero("twelve"), Decimal::ZERO);
/// ```
pub fn parse_or_zero(s: &str) -> Decimal {
    let trimmed = s.trim();
    let Some(number) = leading_number(trimmed) else {
        if !trimmed.is_empty() {
            tracing::debug!(input = %s, "not a number, using 0");
        }
        return Decimal::ZERO;
    };
    if number.len < trimmed.len() {
        tracing::debug!(input = %s, ignored = &trimmed[number.len..], "ignoring text after number");
    }

    let parsed = match number.exponent {
        None => number.mantissa.parse::<Decimal>(),
        Some(exp) => Decimal::from_scientific(&format!("{}e{exp}", number.mantissa)),
    };
    parsed.unwrap_or_else(|e| {
        tracing::debug!(input = %s, "number out of range, using 0: {}", e);
        Decimal::ZERO
    })
}

/// Formats an optional [`Decimal`] for display, using "—" when `None`.
pub fn opt_decimal_display(d: &Option<Decimal>) -> String {
    d.as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "—".to_string())
}
