use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

/// "Rs", "Rs." or "INR", at most one whitespace, then digits with up to two
/// decimals. No sign and no thousands separators. `\d` is Unicode aware, so
/// Devanagari and other native digits count as digits too.
const AMOUNT_PATTERN: &str = r"(?i)(?:Rs\.?|INR)\s?(\d+(?:\.\d{1,2})?)";

fn amount_regex() -> &'static Regex {
    static AMOUNT_REGEX: OnceLock<Regex> = OnceLock::new();
    AMOUNT_REGEX.get_or_init(|| Regex::new(AMOUNT_PATTERN).expect("amount pattern is valid"))
}

fn digit_regex() -> &'static Regex {
    static DIGIT_REGEX: OnceLock<Regex> = OnceLock::new();
    DIGIT_REGEX.get_or_init(|| Regex::new(r"^\d$").expect("digit pattern is valid"))
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    digit_regex().is_match(c.encode_utf8(&mut buf))
}

/// Numeric value of a Unicode decimal digit.
///
/// Decimal digits are encoded in contiguous runs of complete 0..=9 blocks,
/// so the offset from the start of the run gives the value.
fn digit_value(c: char) -> Option<u32> {
    if let Some(value) = c.to_digit(10) {
        return Some(value);
    }
    if !is_decimal_digit(c) {
        return None;
    }

    let mut start = c as u32;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start -= 1;
    }
    Some((c as u32 - start) % 10)
}

/// Rewrites a matched amount with ASCII digits so `Decimal` can parse it.
fn to_ascii_amount(digits: &str) -> Option<String> {
    digits
        .chars()
        .map(|c| match c {
            '.' => Some('.'),
            _ => digit_value(c).and_then(|value| char::from_digit(value, 10)),
        })
        .collect()
}

/// Returns the first currency amount in `text`, if any.
pub fn extract_amount(text: Option<&str>) -> Option<Decimal> {
    let text = text.filter(|t| !t.is_empty())?;
    let caps = amount_regex().captures(text)?;
    let digits = to_ascii_amount(caps.get(1)?.as_str())?;

    match Decimal::from_str(&digits) {
        Ok(amount) => Some(amount),
        Err(e) => {
            // Only reachable for digit runs beyond Decimal's 96-bit range.
            tracing::warn!("Amount {} could not be represented: {}", digits, e);
            None
        }
    }
}
