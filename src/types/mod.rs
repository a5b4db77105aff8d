//! Core value type for Shoal tables.
//!
//! Every cell in every table is a [`Value`] — a dynamically-typed scalar in
//! one of four storage classes (NULL, INTEGER, REAL, TEXT). The comparison
//! rules are the ones the clause handlers rely on: cross-type numeric
//! comparison between integers and reals, NULL ordered below everything,
//! text ordered above numbers, and NaN treated as equal to NaN so that
//! grouping and sorting stay total.

use std::cmp::Ordering;
use std::fmt;

/// A dynamically-typed table value.
///
/// # Ordering
///
/// - NULL compares less than any other type.
/// - INTEGER and REAL values are compared numerically (cross-type).
/// - TEXT values compare greater than INTEGER/REAL.
/// - Within the same type, natural ordering applies.
///
/// # Equality
///
/// Two `NaN` values are considered equal. This diverges from IEEE 754 but is
/// necessary for consistent behavior in `GROUP BY` and stable sorts.
#[derive(Debug, Clone)]
pub enum Value {
    /// The SQL NULL value — absence of any value.
    Null,
    /// A signed 64-bit integer.
    Integer(i64),
    /// An IEEE 754 64-bit floating-point number.
    Real(f64),
    /// A UTF-8 encoded text string.
    Text(String),
}

impl Value {
    /// Returns `true` if this value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Attempts to extract an `i64` from this value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract an `f64` from this value.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Attempts to extract a string slice from this value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PartialEq / Eq
// ---------------------------------------------------------------------------

impl PartialEq for Value {
    /// Compares two values for equality.
    ///
    /// Cross-type INTEGER/REAL comparisons are performed numerically, and
    /// two `NaN` values are considered equal.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => {
                if a.is_nan() && b.is_nan() {
                    return true;
                }
                a == b
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Integer(i), Value::Real(r)) | (Value::Real(r), Value::Integer(i)) => {
                *r == (*i as f64)
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

// ---------------------------------------------------------------------------
// PartialOrd / Ord
// ---------------------------------------------------------------------------

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    /// Compares two values with a total ordering: NULL < INTEGER/REAL < TEXT.
    ///
    /// Within the numeric group, INTEGER and REAL are compared numerically
    /// (cross-type). TEXT comparison is lexicographic.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,

            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Real(a), Value::Real(b)) => compare_f64(*a, *b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),

            (Value::Integer(i), Value::Real(r)) => compare_f64(*i as f64, *r),
            (Value::Real(r), Value::Integer(i)) => compare_f64(*r, *i as f64),

            (Value::Integer(_) | Value::Real(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Integer(_) | Value::Real(_)) => Ordering::Greater,
        }
    }
}

/// Compares two `f64` values with a total ordering.
///
/// NaN is treated as equal to NaN and greater than all other values.
fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| {
        // At least one value is NaN.
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => unreachable!(),
        }
    })
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Value {
    /// Formats a value for human-readable output.
    ///
    /// NULL is displayed as `"NULL"`; whole-number reals keep one decimal
    /// place to distinguish them from integers; text is unquoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => {
                if r.fract() == 0.0 && r.is_finite() {
                    write!(f, "{:.1}", r)
                } else {
                    write!(f, "{}", r)
                }
            }
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

// ---------------------------------------------------------------------------
// From trait implementations
// ---------------------------------------------------------------------------

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
