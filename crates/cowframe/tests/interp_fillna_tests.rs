//! Copy-on-write behaviour of fillna, ffill/bfill and interpolate

mod common;

use anyhow::Result;
use common::*;
use cowframe::*;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn shares(a: &DataFrame, b: &DataFrame, column: &str) -> Result<bool> {
    Ok(shares_storage(&a.storage(column)?, &b.storage(column)?))
}

// ═══════════════════════════════════════════════════════════════════════
// No-op Calls Share Storage
// ═══════════════════════════════════════════════════════════════════════

#[rstest]
#[case(InterpolationMethod::Pad)]
#[case(InterpolationMethod::Nearest)]
#[case(InterpolationMethod::Linear)]
fn test_interpolate_no_op(#[case] method: InterpolationMethod) -> Result<()> {
    init_tracing();
    let df = DataFrame::from_columns([("a", ArrayValues::int64(vec![1, 2]))])?;
    let df_orig = df.copy();

    let mut result = df.interpolate_with(&InterpolateOptions::new().with_method(method))?;
    assert!(shares(&result, &df, "a")?);

    result.set_value(0, "a", 100)?;
    assert!(!shares(&result, &df, "a")?);
    assert_eq!(df, df_orig);
    Ok(())
}

#[rstest]
fn test_interp_fill_functions(#[values(true, false)] forward: bool) -> Result<()> {
    init_tracing();
    let df = DataFrame::from_columns([("a", ArrayValues::int64(vec![1, 2]))])?;
    let df_orig = df.copy();

    let mut result = if forward { df.ffill()? } else { df.bfill()? };
    assert!(shares(&result, &df, "a")?);

    result.set_value(0, "a", 100)?;
    assert!(!shares(&result, &df, "a")?);
    assert_eq!(df, df_orig);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Non-trivial Calls
// ═══════════════════════════════════════════════════════════════════════

#[rstest]
fn test_interpolate_triggers_copy(
    #[values(DType::Float64, DType::Datetime)] dtype: DType,
    #[values(true, false)] forward: bool,
) -> Result<()> {
    init_tracing();
    let df = DataFrame::from_columns([("a", gap_column(dtype))])?;
    let result = if forward { df.ffill()? } else { df.bfill()? };

    assert!(!shares(&result, &df, "a")?);
    assert!(result.has_no_reference("a")?);
    assert!(!result.values("a")?.has_missing());
    assert!(df.values("a")?.has_missing());
    Ok(())
}

#[rstest]
#[case(DType::Float64)]
#[case(DType::Datetime)]
fn test_interpolate_inplace_no_reference_no_copy(#[case] dtype: DType) -> Result<()> {
    init_tracing();
    let mut df = DataFrame::from_columns([("a", gap_column(dtype))])?;
    let arr = df.storage("a")?;

    df.interpolate_inplace()?;

    assert!(arr.shares_storage(&df.storage("a")?));
    assert!(df.has_no_reference("a")?);
    assert!(!df.values("a")?.has_missing());
    Ok(())
}

#[rstest]
#[case(DType::Float64)]
#[case(DType::Datetime)]
fn test_interpolate_inplace_with_refs(#[case] dtype: DType) -> Result<()> {
    init_tracing();
    let mut df = DataFrame::from_columns([("a", gap_column(dtype))])?;
    let df_orig = df.copy();
    let arr = df.storage("a")?;
    let view = df.view();

    df.interpolate_inplace()?;

    assert!(!arr.shares_storage(&df.storage("a")?));
    assert_eq!(df_orig, view);
    assert!(df.has_no_reference("a")?);
    assert!(view.has_no_reference("a")?);
    Ok(())
}

#[test]
fn test_interpolate_datetime_midpoint() -> Result<()> {
    init_tracing();
    let df = DataFrame::from_columns([("a", gap_column(DType::Datetime))])?;
    let result = df.interpolate()?;
    let start = timestamp(2019, 12, 31);
    let end = timestamp(2020, 12, 31);
    assert_eq!(
        result.get_value(1, "a")?,
        Scalar::datetime(start + (end - start) / 2)
    );
    Ok(())
}

#[rstest]
fn test_interp_fill_functions_inplace(
    #[values(true, false)] forward: bool,
    #[values(DType::Float64, DType::MaskedFloat64)] dtype: DType,
) -> Result<()> {
    init_tracing();
    let mut df = DataFrame::from_columns([("a", gap_column(dtype))])?;
    let df_orig = df.copy();
    let arr = df.storage("a")?;
    let view = df.view();

    if forward {
        df.ffill_inplace()?;
    } else {
        df.bfill_inplace()?;
    }

    assert!(!arr.shares_storage(&df.storage("a")?));
    assert_eq!(df_orig, view);
    assert!(df.has_no_reference("a")?);
    assert!(view.has_no_reference("a")?);
    assert_eq!(df.dtype("a")?, dtype);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Object Columns
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_interpolate_cleaned_fill_method() -> Result<()> {
    init_tracing();
    let df = DataFrame::from_columns([
        (
            "a",
            ArrayValues::object(vec![Scalar::string("a"), Scalar::Null, Scalar::string("c")]),
        ),
        ("b", ArrayValues::int64(vec![1, 1, 1])),
    ])?;
    let df_orig = df.copy();

    let mut result = df.interpolate()?;
    assert!(shares(&result, &df, "a")?);

    result.set_value(0, "a", Scalar::datetime(timestamp(2021, 12, 31)))?;
    assert!(!shares(&result, &df, "a")?);
    assert_eq!(df, df_orig);
    Ok(())
}

#[test]
fn test_interpolate_object_convert_no_op() -> Result<()> {
    init_tracing();
    let mut df = DataFrame::from_columns([
        (
            "a",
            ArrayValues::object(vec![
                Scalar::string("a"),
                Scalar::string("b"),
                Scalar::string("c"),
            ]),
        ),
        ("b", ArrayValues::int64(vec![1, 1, 1])),
    ])?;
    let arr_a = df.storage("a")?;

    df.interpolate_inplace_with(&InterpolateOptions::new().with_method(InterpolationMethod::Pad))?;

    assert!(df.has_no_reference("a")?);
    assert!(arr_a.shares_storage(&df.storage("a")?));
    Ok(())
}

#[test]
fn test_interpolate_object_convert_copies() -> Result<()> {
    init_tracing();
    let mut df = DataFrame::from_columns([
        ("a", ArrayValues::object(vec![Scalar::Int(1), Scalar::Int(2)])),
        ("b", ArrayValues::int64(vec![1, 1])),
    ])?;
    let arr_a = df.storage("a")?;

    df.interpolate_inplace_with(&InterpolateOptions::new().with_method(InterpolationMethod::Pad))?;

    assert!(df.has_no_reference("a")?);
    assert!(!arr_a.shares_storage(&df.storage("a")?));
    assert_eq!(df.dtype("a")?, DType::Int64);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Downcast
// ═══════════════════════════════════════════════════════════════════════

fn pad_downcast() -> InterpolateOptions {
    InterpolateOptions::new()
        .with_method(InterpolationMethod::Pad)
        .with_downcast(Downcast::Infer)
}

#[test]
fn test_interpolate_downcast() -> Result<()> {
    init_tracing();
    let mut df = DataFrame::from_columns([
        ("a", ArrayValues::float64(vec![1.0, f64::NAN, 2.5])),
        ("b", ArrayValues::int64(vec![1, 1, 1])),
    ])?;
    let arr_a = df.storage("a")?;

    df.interpolate_inplace_with(&pad_downcast())?;

    assert!(df.has_no_reference("a")?);
    assert!(arr_a.shares_storage(&df.storage("a")?));
    assert_eq!(
        df.column_values("a")?,
        vec![Scalar::Float(1.0), Scalar::Float(1.0), Scalar::Float(2.5)]
    );
    Ok(())
}

#[test]
fn test_interpolate_downcast_reference_triggers_copy() -> Result<()> {
    init_tracing();
    let mut df = DataFrame::from_columns([
        ("a", ArrayValues::float64(vec![1.0, f64::NAN, 2.5])),
        ("b", ArrayValues::int64(vec![1, 1, 1])),
    ])?;
    let df_orig = df.copy();
    let arr_a = df.storage("a")?;
    let view = df.view();

    df.interpolate_inplace_with(&pad_downcast())?;

    assert!(df.has_no_reference("a")?);
    assert!(!arr_a.shares_storage(&df.storage("a")?));
    assert_eq!(df_orig, view);
    Ok(())
}

#[test]
fn test_downcast_to_integers_moves_column() -> Result<()> {
    init_tracing();
    let mut df = DataFrame::from_columns([("a", ArrayValues::float64(vec![1.0, f64::NAN, 2.0]))])?;
    let arr_a = df.storage("a")?;

    df.ffill_inplace_with(&FillOptions::new().with_downcast(Downcast::Infer))?;

    assert_eq!(df.dtype("a")?, DType::Int64);
    assert_eq!(
        df.column_values("a")?,
        vec![Scalar::Int(1), Scalar::Int(1), Scalar::Int(2)]
    );
    assert!(!arr_a.shares_storage(&df.storage("a")?));
    assert!(df.has_no_reference("a")?);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// fillna
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_fillna() -> Result<()> {
    init_tracing();
    let df = float_and_int();
    let df_orig = df.copy();

    let mut df2 = df.fillna(5.5)?;
    assert!(shares(&df, &df2, "b")?);

    df2.set_value(0, "b", 100)?;
    assert_eq!(df_orig, df);
    Ok(())
}

#[test]
fn test_fillna_dict() -> Result<()> {
    init_tracing();
    let df = float_and_int();
    let df_orig = df.copy();

    let mut df2 = df.fillna(FillValue::columns([("a", 100.5)]))?;
    assert!(shares(&df, &df2, "b")?);
    assert!(!shares(&df, &df2, "a")?);

    df2.set_value(0, "b", 100)?;
    assert_eq!(df_orig, df);
    Ok(())
}

#[rstest]
fn test_fillna_inplace(
    #[values(Downcast::None, Downcast::Infer)] downcast: Downcast,
) -> Result<()> {
    init_tracing();
    let mut df = float_and_int();
    let arr_a = df.storage("a")?;
    let arr_b = df.storage("b")?;

    df.fillna_inplace_with(5.5.into(), &FillOptions::new().with_downcast(downcast))?;

    assert!(arr_a.shares_storage(&df.storage("a")?));
    assert!(arr_b.shares_storage(&df.storage("b")?));
    assert!(df.has_no_reference("a")?);
    assert!(df.has_no_reference("b")?);
    Ok(())
}

#[test]
fn test_fillna_inplace_reference() -> Result<()> {
    init_tracing();
    let mut df = float_and_int();
    let df_orig = df.copy();
    let arr_a = df.storage("a")?;
    let arr_b = df.storage("b")?;
    let view = df.view();

    df.fillna_inplace(5.5)?;

    assert!(!arr_a.shares_storage(&df.storage("a")?));
    assert!(arr_b.shares_storage(&df.storage("b")?));
    assert!(view.has_no_reference("a")?);
    assert!(df.has_no_reference("a")?);
    assert_eq!(view, df_orig);

    let expected = DataFrame::from_columns([
        ("a", ArrayValues::float64(vec![1.5, 5.5])),
        ("b", ArrayValues::int64(vec![1, 1])),
    ])?;
    assert_eq!(df, expected);
    Ok(())
}

#[test]
fn test_fillna_object_inplace_reference() -> Result<()> {
    init_tracing();
    let mut ser = Series::new(
        "a",
        ArrayValues::object(vec![Scalar::string("(0, 1]"), Scalar::Null, Scalar::string("(2, 3]")]),
    );
    let ser_orig = ser.copy();
    let view = ser.view();

    ser.fillna_inplace(Scalar::string("(0, 5]"))?;

    assert!(!ser.storage().shares_storage(&view.storage()));
    assert_eq!(view, ser_orig);
    assert_eq!(ser.get_value(1)?, Scalar::string("(0, 5]"));
    Ok(())
}

#[test]
fn test_fillna_series_empty_arg() -> Result<()> {
    init_tracing();
    let mut ser = Series::new("s", ArrayValues::float64(vec![1.0, f64::NAN, 2.0]));
    let ser_orig = ser.copy();

    let result = ser.fillna(FillValue::Rows(IndexMap::new()))?;
    assert!(ser.storage().shares_storage(&result.storage()));

    ser.set_value(0, 100.5)?;
    assert_eq!(ser_orig, result);
    Ok(())
}

#[test]
fn test_fillna_series_empty_arg_inplace() -> Result<()> {
    init_tracing();
    let mut ser = Series::new("s", ArrayValues::float64(vec![1.0, f64::NAN, 2.0]));
    let arr = ser.storage();

    ser.fillna_inplace(FillValue::Rows(IndexMap::new()))?;

    assert!(ser.storage().shares_storage(&arr));
    assert!(ser.has_no_reference());
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Nullable Kinds
// ═══════════════════════════════════════════════════════════════════════

fn nullable_pair(dtype: DType) -> DataFrame {
    let (a, b) = match dtype {
        DType::MaskedInt64 => (
            ArrayValues::masked_int64(vec![Some(1), None, Some(3)]),
            ArrayValues::masked_int64(vec![Some(1), Some(1), Some(1)]),
        ),
        _ => (
            ArrayValues::masked_float64(vec![Some(1.0), None, Some(3.0)]),
            ArrayValues::masked_float64(vec![Some(1.0), Some(1.0), Some(1.0)]),
        ),
    };
    DataFrame::from_columns([("a", a), ("b", b)]).expect("valid table")
}

#[rstest]
fn test_fillna_ea_noop_shares_memory(
    #[values(DType::MaskedInt64, DType::MaskedFloat64)] dtype: DType,
) -> Result<()> {
    init_tracing();
    let df = nullable_pair(dtype);
    assert_eq!(df.nblocks(), 1);
    let df_orig = df.copy();

    let mut df2 = df.fillna(100)?;

    assert!(!shares(&df, &df2, "a")?);
    assert!(shares(&df, &df2, "b")?);
    assert!(!df2.has_no_reference("b")?);
    assert_eq!(df_orig, df);

    df2.set_value(0, "b", 100)?;
    assert!(!shares(&df, &df2, "b")?);
    assert!(df2.has_no_reference("b")?);
    assert!(df.has_no_reference("b")?);
    assert_eq!(df_orig, df);
    Ok(())
}

#[rstest]
fn test_fillna_inplace_ea_noop_shares_memory(
    #[values(DType::MaskedInt64, DType::MaskedFloat64)] dtype: DType,
) -> Result<()> {
    init_tracing();
    let mut df = nullable_pair(dtype);
    let df_orig = df.copy();
    let view = df.view();

    df.fillna_inplace(100)?;

    assert!(!shares(&df, &view, "a")?);
    assert!(shares(&df, &view, "b")?);
    assert!(!df.has_no_reference("b")?);
    assert!(!view.has_no_reference("b")?);

    df.set_value(0, "b", 100)?;
    assert_eq!(df_orig, view);
    Ok(())
}
