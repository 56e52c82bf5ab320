//! Scalar trait implementations: constructors, predicates, extractors, From traits, PartialEq

use std::sync::Arc;

use super::*;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Scalar {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Scalar::Str(Arc::new(s.into()))
    }

    /// Create a timestamp from nanoseconds since the epoch
    pub fn datetime(nanos: i64) -> Self {
        Scalar::Datetime(nanos)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Check if value is the explicit missing marker
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Check if value counts as missing (null or a NaN float)
    pub fn is_missing(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Check if value is boolean
    pub fn is_bool(&self) -> bool {
        matches!(self, Scalar::Bool(_))
    }

    /// Check if value is an integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Scalar::Int(_))
    }

    /// Check if value is a float
    pub fn is_float(&self) -> bool {
        matches!(self, Scalar::Float(_))
    }

    /// Check if value is numeric (integer or float)
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Check if value is a string
    pub fn is_string(&self) -> bool {
        matches!(self, Scalar::Str(_))
    }

    /// Check if value is a timestamp
    pub fn is_datetime(&self) -> bool {
        matches!(self, Scalar::Datetime(_))
    }

    /// Check if value is a float holding a whole number in `i64` range
    pub fn is_integral(&self) -> bool {
        match self {
            Scalar::Int(_) => true,
            Scalar::Float(f) => is_integral_f64(*f),
            _ => false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as i64 (accepts integral floats)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            Scalar::Float(f) if is_integral_f64(*f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Extract as f64 (converts from integers)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract timestamp nanoseconds
    pub fn as_datetime(&self) -> Option<i64> {
        match self {
            Scalar::Datetime(n) => Some(*n),
            _ => None,
        }
    }
}

pub(crate) fn is_integral_f64(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,

            // IEEE equality: NaN is never equal to itself
            (Scalar::Float(a), Scalar::Float(b)) => a == b,

            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            (Scalar::Datetime(a), Scalar::Datetime(b)) => a == b,

            // Different kinds are never equal
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Int(n as i64)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::string(s)
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(Arc::new(s))
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Scalar::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_detection() {
        assert!(Scalar::Null.is_missing());
        assert!(Scalar::Float(f64::NAN).is_missing());
        assert!(!Scalar::Float(1.0).is_missing());
        assert!(!Scalar::Int(0).is_missing());
    }

    #[test]
    fn test_integral_floats() {
        assert!(Scalar::Float(3.0).is_integral());
        assert!(!Scalar::Float(3.5).is_integral());
        assert!(!Scalar::Float(f64::INFINITY).is_integral());
        assert_eq!(Scalar::Float(3.0).as_i64(), Some(3));
        assert_eq!(Scalar::Float(3.5).as_i64(), None);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Scalar::from(Some(2.5)), Scalar::Float(2.5));
        assert_eq!(Scalar::from(None::<i64>), Scalar::Null);
    }

    #[test]
    fn test_nan_not_equal_to_itself() {
        assert_ne!(Scalar::Float(f64::NAN), Scalar::Float(f64::NAN));
    }
}
