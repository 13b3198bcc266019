//! Kubernetes resource quantity parsing
//!
//! `k8s-openapi` models a quantity as an opaque string, so the numeric
//! views needed for drift computation are derived here. Both views round
//! up (away from zero) the same way the API server's canonical
//! `Value()`/`MilliValue()` accessors do, e.g. `"1n"` CPU is 1 millicore.
//!
//! Supported forms: `500m`, `1.5`, `2Gi`, `128974848`, `1e3`, `100M`.

use thiserror::Error;

pub const MEBIBYTE: i64 = 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,

    #[error("malformed quantity {0:?}")]
    Malformed(String),

    #[error("quantity {0:?} is out of range")]
    OutOfRange(String),
}

/// A quantity decomposed as `sign * mantissa * 10^exp10 * 2^shift`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Decomposed {
    negative: bool,
    mantissa: i128,
    exp10: i32,
    shift: u32,
}

fn decompose(raw: &str) -> Result<Decomposed, QuantityError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(QuantityError::Empty);
    }
    let malformed = || QuantityError::Malformed(raw.to_string());
    let out_of_range = || QuantityError::OutOfRange(raw.to_string());

    let (negative, body) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let number_len = body
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(body.len());
    let (number, suffix) = body.split_at(number_len);

    let mut mantissa: i128 = 0;
    let mut exp10: i32 = 0;
    let mut digits = 0usize;
    let mut seen_point = false;
    for c in number.chars() {
        if c == '.' {
            if seen_point {
                return Err(malformed());
            }
            seen_point = true;
            continue;
        }
        let d = i128::from(c as u8 - b'0');
        mantissa = mantissa
            .checked_mul(10)
            .and_then(|m| m.checked_add(d))
            .ok_or_else(out_of_range)?;
        digits += 1;
        if seen_point {
            exp10 -= 1;
        }
    }
    if digits == 0 {
        return Err(malformed());
    }

    let mut shift = 0u32;
    match suffix {
        "" => {}
        "Ki" => shift = 10,
        "Mi" => shift = 20,
        "Gi" => shift = 30,
        "Ti" => shift = 40,
        "Pi" => shift = 50,
        "Ei" => shift = 60,
        "n" => exp10 -= 9,
        "u" => exp10 -= 6,
        "m" => exp10 -= 3,
        "k" => exp10 += 3,
        "M" => exp10 += 6,
        "G" => exp10 += 9,
        "T" => exp10 += 12,
        "P" => exp10 += 15,
        "E" => exp10 += 18,
        other if other.starts_with(['e', 'E']) => {
            let exponent: i32 = other[1..].parse().map_err(|_| malformed())?;
            exp10 = exp10.checked_add(exponent).ok_or_else(out_of_range)?;
        }
        _ => return Err(malformed()),
    }

    Ok(Decomposed {
        negative,
        mantissa,
        exp10,
        shift,
    })
}

/// Returns `quantity * 10^scale`, rounded away from zero.
fn scaled(raw: &str, scale: i32) -> Result<i64, QuantityError> {
    let q = decompose(raw)?;
    let out_of_range = || QuantityError::OutOfRange(raw.to_string());

    let numerator = q
        .mantissa
        .checked_mul(1i128.checked_shl(q.shift).ok_or_else(out_of_range)?)
        .ok_or_else(out_of_range)?;
    let exp = q.exp10.checked_add(scale).ok_or_else(out_of_range)?;

    let magnitude = if exp >= 0 {
        let factor = 10i128
            .checked_pow(exp as u32)
            .ok_or_else(out_of_range)?;
        numerator.checked_mul(factor).ok_or_else(out_of_range)?
    } else {
        match 10i128.checked_pow(exp.unsigned_abs()) {
            Some(divisor) => numerator / divisor + i128::from(numerator % divisor != 0),
            // divisor exceeds any representable numerator
            None => i128::from(numerator != 0),
        }
    };

    let signed = if q.negative { -magnitude } else { magnitude };
    i64::try_from(signed).map_err(|_| out_of_range())
}

/// Value in thousandths of a unit (millicores for CPU).
pub fn milli_value(raw: &str) -> Result<i64, QuantityError> {
    scaled(raw, 3)
}

/// Integer value in base units (bytes for memory).
pub fn value(raw: &str) -> Result<i64, QuantityError> {
    scaled(raw, 0)
}

/// Whole mebibytes, truncating: `2147483648` -> `"2048Mi"`.
pub fn format_mebibytes(bytes: i64) -> String {
    format!("{}Mi", bytes / MEBIBYTE)
}

pub fn format_millicores(milli: i64) -> String {
    format!("{}m", milli)
}
