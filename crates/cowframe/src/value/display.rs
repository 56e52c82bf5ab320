//! Display and Debug implementations for Scalar

use std::fmt;

use super::*;

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(n) => write!(f, "{:?}", n),
            Scalar::Str(s) => write!(f, "{:?}", s.as_ref()),
            Scalar::Datetime(n) => write!(f, "ts({})", n),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => write!(f, "{}", s.as_ref()), // No quotes for Display
            Scalar::Null => write!(f, "NaN"),
            _ => fmt::Debug::fmt(self, f),
        }
    }
}
