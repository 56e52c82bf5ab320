//! Shared helpers for integration tests

#![allow(dead_code)]

use cowframe::*;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `{"a": [1.5, NaN], "b": [1, 1]}`
pub fn float_and_int() -> DataFrame {
    DataFrame::from_columns([
        ("a", ArrayValues::float64(vec![1.5, f64::NAN])),
        ("b", ArrayValues::int64(vec![1, 1])),
    ])
    .expect("valid table")
}

/// `{"a": [1, NaN, 2], "b": [1, 1, 1]}`
pub fn gap_and_int() -> DataFrame {
    DataFrame::from_columns([
        ("a", ArrayValues::float64(vec![1.0, f64::NAN, 2.0])),
        ("b", ArrayValues::int64(vec![1, 1, 1])),
    ])
    .expect("valid table")
}

/// Column `a` with one interior gap, in the given kind.
pub fn gap_column(dtype: DType) -> ArrayValues {
    match dtype {
        DType::Float64 => ArrayValues::float64(vec![1.0, f64::NAN, 2.0]),
        DType::MaskedFloat64 => ArrayValues::masked_float64(vec![Some(1.0), None, Some(2.0)]),
        DType::MaskedInt64 => ArrayValues::masked_int64(vec![Some(1), None, Some(3)]),
        DType::Datetime => ArrayValues::datetime(vec![
            Some(timestamp(2019, 12, 31)),
            None,
            Some(timestamp(2020, 12, 31)),
        ]),
        other => panic!("no gap fixture for {other}"),
    }
}

/// Nanoseconds since the epoch at midnight of a date (proleptic Gregorian).
pub fn timestamp(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    let days = era * 146_097 + doe - 719_468;
    days * 86_400_000_000_000
}
