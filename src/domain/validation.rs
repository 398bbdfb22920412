//! Field value patterns.
//!
//! Every scalar write into the descriptor tree is checked against the pattern of
//! its field kind. Values are stored verbatim once accepted; only argument lists
//! are parsed into numbers.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::{DomainError, DomainResult};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-/]+$").expect("name pattern"));
static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("integer pattern"));
static REAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("real pattern"));
static PROBABILITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0(\.[0-9]+)?|1(\.0+)?)$").expect("probability pattern"));
static ARGUMENTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9]+)?(,[0-9]+(\.[0-9]+)?)*$").expect("argument list pattern")
});

/// Kind of value a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `[A-Za-z0-9_.\-/]+`
    Name,
    /// `[0-9]+`
    Integer,
    /// `[0-9]+(\.[0-9]+)?`
    Real,
    /// A number in `[0, 1]`: `0`, `0.x`, `1`, `1.0...`
    Probability,
    /// Comma-separated reals; one stray leading and trailing comma are tolerated.
    Arguments,
    /// `Thread Pool` / `Thread Queue`
    ServicePatternKind,
    /// `Circuit Breaker` / `Performance Breaker`
    OperationPatternKind,
}

impl FieldKind {
    /// Human readable description used in validation errors.
    pub fn expected(self) -> &'static str {
        match self {
            FieldKind::Name => "a name token [A-Za-z0-9_.-/]+",
            FieldKind::Integer => "a non-negative integer",
            FieldKind::Real => "a non-negative real number",
            FieldKind::Probability => "a probability between 0 and 1",
            FieldKind::Arguments => "comma-separated non-negative real numbers",
            FieldKind::ServicePatternKind => "'Thread Pool' or 'Thread Queue'",
            FieldKind::OperationPatternKind => "'Circuit Breaker' or 'Performance Breaker'",
        }
    }

    /// Test a raw value against this kind's pattern.
    pub fn matches(self, value: &str) -> bool {
        match self {
            FieldKind::Name => NAME_RE.is_match(value),
            FieldKind::Integer => INTEGER_RE.is_match(value),
            FieldKind::Real => REAL_RE.is_match(value),
            FieldKind::Probability => PROBABILITY_RE.is_match(value),
            FieldKind::Arguments => ARGUMENTS_RE.is_match(strip_stray_commas(value)),
            FieldKind::ServicePatternKind => {
                value.parse::<crate::domain::ServicePatternKind>().is_ok()
            }
            FieldKind::OperationPatternKind => {
                value.parse::<crate::domain::OperationPatternKind>().is_ok()
            }
        }
    }

    /// Check `value` for the field named `field`, producing a validation error on mismatch.
    pub fn check(self, field: &str, value: &str) -> DomainResult<()> {
        if self.matches(value) {
            Ok(())
        } else {
            Err(DomainError::validation(field, value, self.expected()))
        }
    }
}

/// Drop one leading and one trailing comma, as left behind by hand-edited lists.
fn strip_stray_commas(value: &str) -> &str {
    let value = value.strip_prefix(',').unwrap_or(value);
    value.strip_suffix(',').unwrap_or(value)
}

/// Validate and parse a numeric argument list such as `",1,2.5,"`.
///
/// Values that overflow to infinity are rejected.
pub fn parse_arguments(field: &str, value: &str) -> DomainResult<Vec<f64>> {
    FieldKind::Arguments.check(field, value)?;
    strip_stray_commas(value)
        .split(',')
        .map(|part| {
            part.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    DomainError::validation(field, value, FieldKind::Arguments.expected())
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rejects_whitespace() {
        assert!(!FieldKind::Name.matches("abc def"));
        assert!(FieldKind::Name.matches("svc-1"));
        assert!(FieldKind::Name.matches("a/b.c_d"));
        assert!(!FieldKind::Name.matches(""));
    }

    #[test]
    fn test_probability_bounds() {
        assert!(FieldKind::Probability.matches("0"));
        assert!(FieldKind::Probability.matches("0.25"));
        assert!(FieldKind::Probability.matches("1"));
        assert!(FieldKind::Probability.matches("1.000"));
        assert!(!FieldKind::Probability.matches("1.5"));
        assert!(!FieldKind::Probability.matches(".5"));
    }

    #[test]
    fn test_parse_arguments_strips_stray_commas() {
        assert_eq!(parse_arguments("a", ",1,2.5,").unwrap(), vec![1.0, 2.5]);
        assert_eq!(parse_arguments("a", "3").unwrap(), vec![3.0]);
    }

    #[test]
    fn test_parse_arguments_rejects_empty_items() {
        assert!(parse_arguments("a", "1,,2").is_err());
        assert!(parse_arguments("a", "").is_err());
        assert!(parse_arguments("a", ",").is_err());
    }
}
