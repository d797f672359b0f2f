//! Lenient deserialisers for form-backed numeric fields.
//!
//! The estimate screens post whatever the user has typed so far.  A
//! numeric field may therefore arrive as a JSON number, as a string
//! (possibly empty or half typed), or not at all.  The helpers in this
//! module turn every one of those shapes into an `Option`, where
//! `None` means "nothing usable has been entered yet".  They never
//! fail, so a partially filled form always deserialises.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Number(f64),
    Text(String),
    // Booleans, arrays and objects carry no usable number.
    Other(serde::de::IgnoredAny),
}

/// Deserialise a non-negative whole number the way a form would read
/// it: numbers are truncated, strings are read up to the first
/// non-digit (`"12abc"` is 12) and anything else is absent.
pub fn whole<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawField>::deserialize(deserializer)?.and_then(|raw| match raw {
        RawField::Number(n) => whole_from_f64(n),
        RawField::Text(text) => parse_whole(&text),
        RawField::Other(_) => None,
    }))
}

/// Deserialise a decimal quantity (dimension or rate).  Strings are
/// read up to the end of their leading number (`"8.5in"` is 8.5);
/// negative values are kept since rejecting them is the job of the
/// geometry layer.
pub fn decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawField>::deserialize(deserializer)?.and_then(|raw| match raw {
        RawField::Number(n) => Some(n).filter(|n| n.is_finite()),
        RawField::Text(text) => parse_decimal(&text),
        RawField::Other(_) => None,
    }))
}

/// Parse the leading digits of `text` as a whole number.
pub fn parse_whole(text: &str) -> Option<u32> {
    let trimmed = text.trim_start();
    let digits = trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or("");
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parse the longest leading decimal number of `text`, with an optional
/// sign, fraction and exponent.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let digits_from = |mut at: usize| {
        while bytes.get(at).is_some_and(u8::is_ascii_digit) {
            at += 1;
        }
        at
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }
    // An exponent only counts when it carries at least one digit.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut at = end + 1;
        if matches!(bytes.get(at), Some(b'+' | b'-')) {
            at += 1;
        }
        let exp_end = digits_from(at);
        if exp_end > at {
            end = exp_end;
        }
    }
    trimmed[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

fn whole_from_f64(n: f64) -> Option<u32> {
    if n.is_finite() && n >= 0.0 && n <= u32::MAX as f64 {
        Some(n.trunc() as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Field {
        #[serde(default, deserialize_with = "whole")]
        pages: Option<u32>,
        #[serde(default, deserialize_with = "decimal")]
        length: Option<f64>,
    }

    fn read(value: serde_json::Value) -> Field {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_whole_accepts_numbers_and_strings() {
        assert_eq!(read(json!({"pages": 120})).pages, Some(120));
        assert_eq!(read(json!({"pages": "120"})).pages, Some(120));
        assert_eq!(read(json!({"pages": 12.7})).pages, Some(12));
        assert_eq!(read(json!({"pages": " 48 pages"})).pages, Some(48));
    }

    #[test]
    fn test_whole_treats_unusable_input_as_absent() {
        assert_eq!(read(json!({"pages": ""})).pages, None);
        assert_eq!(read(json!({"pages": "abc"})).pages, None);
        assert_eq!(read(json!({"pages": -4})).pages, None);
        assert_eq!(read(json!({"pages": null})).pages, None);
        assert_eq!(read(json!({"pages": true})).pages, None);
        assert_eq!(read(json!({})).pages, None);
    }

    #[test]
    fn test_decimal_reads_the_leading_number() {
        assert_eq!(read(json!({"length": "8.5"})).length, Some(8.5));
        assert_eq!(read(json!({"length": 11})).length, Some(11.0));
        assert_eq!(read(json!({"length": "8.5in"})).length, Some(8.5));
        assert_eq!(read(json!({"length": " .5"})).length, Some(0.5));
        assert_eq!(read(json!({"length": "7."})).length, Some(7.0));
        assert_eq!(read(json!({"length": "-2.5cm"})).length, Some(-2.5));
        assert_eq!(read(json!({"length": "1e2x"})).length, Some(100.0));
        assert_eq!(read(json!({"length": "3e"})).length, Some(3.0));
    }

    #[test]
    fn test_decimal_without_leading_number_is_absent() {
        assert_eq!(read(json!({"length": ""})).length, None);
        assert_eq!(read(json!({"length": "in"})).length, None);
        assert_eq!(read(json!({"length": "."})).length, None);
        assert_eq!(read(json!({"length": "-"})).length, None);
        assert_eq!(read(json!({"length": "1e999"})).length, None);
        assert_eq!(read(json!({"length": false})).length, None);
    }
}
