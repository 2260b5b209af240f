//! Human-readable resource quantities
//!
//! Node listings report memory as strings such as `16342384Ki` or `8GB`
//! and pod requests and quota status use Kubernetes quantities (`250m`,
//! `128Mi`, `1288490188800m`). Everything
//! is normalized here: memory to bytes, CPU to fractional cores.

use crate::error::{EvaluatorError, Result};

/// Bytes per megabyte used by the resource sliders
pub const BYTES_PER_MEGABYTE: u64 = 1_000_000;

const KIB: u64 = 1024;

/// Parse a memory size string into bytes.
///
/// Units follow Kubernetes quantity syntax and are case-sensitive:
/// binary suffixes (`Ki`, `Mi`, `Gi`, `Ti`, `Pi`, `Ei`) are powers of
/// 1024, decimal suffixes (`k`/`K`, `M`, `G`, `T`, `P`, `E`) powers of
/// 1000, `m` is milli and `e<N>` is a decimal exponent. A trailing `B` is
/// accepted after any multiplier suffix. Fractional bytes are floored and a
/// bare number is a byte count.
///
/// Node listings that come from file-size style APIs may mean `8G` as
/// 8 GiB; here it is always 8 * 10^9 bytes.
pub fn parse_memory(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EvaluatorError::quantity(value, "empty value"));
    }

    let (number, unit) = split_number(trimmed);
    if number.is_empty() {
        return Err(EvaluatorError::quantity(value, "missing numeric part"));
    }

    let unit = unit.trim();
    let scale = memory_scale(unit)
        .ok_or_else(|| EvaluatorError::quantity(value, format!("unknown unit {:?}", unit)))?;

    // Integers stay exact; fractional values go through f64
    if let Ok(whole) = number.parse::<u64>() {
        return scale
            .apply(whole)
            .ok_or_else(|| EvaluatorError::quantity(value, "value overflows"));
    }

    let parsed: f64 = number
        .parse()
        .map_err(|_| EvaluatorError::quantity(value, "not a number"))?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(EvaluatorError::quantity(value, "must be a non-negative number"));
    }

    let bytes = parsed * scale.factor();
    if !bytes.is_finite() || bytes > u64::MAX as f64 {
        return Err(EvaluatorError::quantity(value, "value overflows"));
    }
    Ok(bytes.floor() as u64)
}

/// Parse a CPU quantity into cores (`"2"`, `"0.5"`, `"250m"`, `"100000n"`)
pub fn parse_cpu(value: &str) -> Result<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EvaluatorError::quantity(value, "empty value"));
    }

    let (number, divisor) = if let Some(n) = trimmed.strip_suffix('m') {
        (n, 1_000.0)
    } else if let Some(n) = trimmed.strip_suffix('u') {
        (n, 1_000_000.0)
    } else if let Some(n) = trimmed.strip_suffix('n') {
        (n, 1_000_000_000.0)
    } else {
        (trimmed, 1.0)
    };

    let parsed: f64 = number
        .trim()
        .parse()
        .map_err(|_| EvaluatorError::quantity(value, "not a number"))?;
    if !is_valid_cpu(parsed) {
        return Err(EvaluatorError::quantity(value, "must be a non-negative number"));
    }

    Ok(parsed / divisor)
}

/// Check that a CPU core count is usable
pub(crate) fn is_valid_cpu(cores: f64) -> bool {
    cores.is_finite() && cores >= 0.0
}

/// Convert bytes to whole megabytes (floor)
pub fn megabytes(bytes: u64) -> u64 {
    bytes / BYTES_PER_MEGABYTE
}

/// Convert whole megabytes back to bytes
pub fn bytes_from_megabytes(mb: u64) -> u64 {
    mb.saturating_mul(BYTES_PER_MEGABYTE)
}

/// Round a CPU value to two decimals
pub fn round_cpu(cores: f64) -> f64 {
    (cores * 100.0).round() / 100.0
}

fn split_number(value: &str) -> (&str, &str) {
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    value.split_at(end)
}

/// Multiplier carried by a memory unit suffix
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scale {
    Factor(u64),
    Milli,
    Exponent(i32),
}

impl Scale {
    /// Exact integer scaling, flooring when the scale shrinks the value
    fn apply(self, whole: u64) -> Option<u64> {
        match self {
            Scale::Factor(factor) => whole.checked_mul(factor),
            Scale::Milli => Some(whole / 1_000),
            Scale::Exponent(exp) => {
                let power = 10u64.checked_pow(exp.unsigned_abs());
                if exp >= 0 {
                    power.and_then(|p| whole.checked_mul(p))
                } else {
                    Some(power.map_or(0, |p| whole / p))
                }
            }
        }
    }

    fn factor(self) -> f64 {
        match self {
            Scale::Factor(factor) => factor as f64,
            Scale::Milli => 1e-3,
            Scale::Exponent(exp) => 10f64.powi(exp),
        }
    }
}

fn memory_scale(unit: &str) -> Option<Scale> {
    if unit == "m" {
        return Some(Scale::Milli);
    }

    // `E` alone is exa; `e3`, `E-2` are exponents
    if let Some(exp) = unit.strip_prefix(|c: char| c == 'e' || c == 'E') {
        if let Ok(exp) = exp.parse::<i32>() {
            return Some(Scale::Exponent(exp));
        }
    }

    let suffix = match unit.strip_suffix('B') {
        Some(stripped) if !stripped.is_empty() || unit == "B" => stripped,
        _ => unit,
    };

    let factor = match suffix {
        "" => 1,
        "k" | "K" => 1_000,
        "M" => 1_000_000,
        "G" => 1_000_000_000,
        "T" => 1_000_000_000_000,
        "P" => 1_000_000_000_000_000,
        "E" => 1_000_000_000_000_000_000,
        "Ki" => KIB,
        "Mi" => KIB.pow(2),
        "Gi" => KIB.pow(3),
        "Ti" => KIB.pow(4),
        "Pi" => KIB.pow(5),
        "Ei" => KIB.pow(6),
        _ => return None,
    };
    Some(Scale::Factor(factor))
}
