use dataset_diet::catalog::ConversionTable;
use dataset_diet::reduce::{ReduceOptions, Reducer};
use dataset_diet::types::{Column, ColumnData, DType, DataSet, Numeric};

fn reducer() -> Reducer {
    Reducer::new(ReduceOptions::default()).unwrap()
}

fn kitchen_sink() -> DataSet {
    let tags: Vec<Option<String>> = (0..1000).map(|i| Some(format!("tag{}", i % 10))).collect();
    let ids: Vec<Option<String>> = (0..1000).map(|i| Some(format!("id{}", i % 900))).collect();
    DataSet::new(vec![
        Column::new("small_uint", ColumnData::Int64((0..1000).map(|i| i % 131).collect())),
        Column::new("signed", ColumnData::Int64((0..1000).map(|i| (i % 201) - 100).collect())),
        Column::new(
            "int_with_holes",
            ColumnData::NullableInt64(
                (0..1000)
                    .map(|i| if i % 7 == 0 { None } else { Some(i % 100) })
                    .collect(),
            ),
        ),
        Column::new(
            "float_counts",
            ColumnData::Float64(
                (0..1000)
                    .map(|i| if i % 5 == 0 { f64::NAN } else { (i % 50) as f64 })
                    .collect(),
            ),
        ),
        Column::new(
            "real_floats",
            ColumnData::Float64((0..1000).map(|i| i as f64 * 1.25 + 0.5).collect()),
        ),
        Column::new("tags", ColumnData::Utf8(tags)),
        Column::new("ids", ColumnData::Utf8(ids)),
    ])
    .unwrap()
}

#[test]
fn end_to_end_dtype_decisions() {
    let ds = kitchen_sink();
    let out = reducer().reduce(&ds);

    assert_eq!(out.column("small_uint").unwrap().dtype(), DType::UInt8);
    assert_eq!(out.column("signed").unwrap().dtype(), DType::Int8);
    assert_eq!(
        out.column("int_with_holes").unwrap().dtype(),
        DType::NullableUInt8
    );
    assert_eq!(
        out.column("float_counts").unwrap().dtype(),
        DType::NullableUInt8
    );
    assert_eq!(out.column("real_floats").unwrap().dtype(), DType::Float32);
    assert_eq!(out.column("tags").unwrap().dtype(), DType::Categorical);
    // 900 distinct over 1000 rows is too many to dictionary-encode.
    assert_eq!(out.column("ids").unwrap().dtype(), DType::Utf8);
}

#[test]
fn reduction_is_lossless_for_integer_columns() {
    let ds = kitchen_sink();
    let out = reducer().reduce(&ds);

    let before = ds.column("signed").unwrap();
    let after = out.column("signed").unwrap();
    let widened: Vec<i64> = match &after.data {
        ColumnData::Int8(v) => v.iter().map(|&x| x as i64).collect(),
        other => panic!("expected int8, got {:?}", other.dtype()),
    };
    match &before.data {
        ColumnData::Int64(v) => assert_eq!(&widened, v),
        other => panic!("expected int64, got {:?}", other.dtype()),
    }
}

#[test]
fn reduction_shrinks_and_preserves_shape() {
    let ds = kitchen_sink();
    let out = reducer().reduce(&ds);

    assert!(out.estimated_size() < ds.estimated_size());
    assert_eq!(out.row_count(), ds.row_count());
    assert_eq!(
        out.column_names().collect::<Vec<_>>(),
        ds.column_names().collect::<Vec<_>>()
    );
}

#[test]
fn missing_values_keep_their_count_and_positions() {
    let ds = kitchen_sink();
    let out = reducer().reduce(&ds);

    for (before, after) in ds.columns.iter().zip(&out.columns) {
        assert_eq!(before.null_count(), after.null_count(), "column {}", before.name);
        assert_eq!(before.null_mask(), after.null_mask(), "column {}", before.name);
    }
}

#[test]
fn reduction_is_idempotent() {
    let ds = kitchen_sink();
    let r = reducer();
    let once = r.reduce(&ds);
    let twice = r.reduce(&once);
    assert_eq!(once, twice);
}

#[test]
fn custom_table_can_force_floats_through_float64() {
    let opts = ReduceOptions {
        conversion_table: ConversionTable {
            float: vec![DType::Float64],
            ..ConversionTable::default()
        },
        ..ReduceOptions::default()
    };
    let ds = DataSet::new(vec![Column::new(
        "f",
        ColumnData::Float64(vec![1.1, 2.2, 3.3]),
    )])
    .unwrap();

    let out = Reducer::new(opts).unwrap().reduce(&ds);
    assert_eq!(out.column("f").unwrap().dtype(), DType::Float64);
}

#[test]
fn narrow_custom_table_leaves_wide_columns_unchanged() {
    let opts = ReduceOptions {
        conversion_table: ConversionTable {
            int: vec![DType::Int8],
            uint: vec![DType::UInt8],
            float: vec![DType::Float32],
        },
        ..ReduceOptions::default()
    };
    let ds = DataSet::new(vec![Column::new(
        "wide",
        ColumnData::Int64(vec![0, 70_000]),
    )])
    .unwrap();

    let r = Reducer::new(opts).unwrap();
    let out = r.reduce(&ds);
    assert_eq!(out.column("wide").unwrap().data, ColumnData::Int64(vec![0, 70_000]));
    assert_eq!(r.metrics().snapshot().columns_no_fit, 1);
}

#[test]
fn float64_only_catalog_applies_to_missing_value_columns() {
    let opts = ReduceOptions {
        conversion_table: ConversionTable {
            float: vec![DType::Float64],
            ..ConversionTable::default()
        },
        ..ReduceOptions::default()
    };
    let ds = DataSet::new(vec![Column::new(
        "f",
        ColumnData::Float64(vec![1.5, f64::NAN, 2.5]),
    )])
    .unwrap();

    let r = Reducer::new(opts).unwrap();
    let out = r.reduce(&ds);
    assert_eq!(out.column("f").unwrap().dtype(), DType::Float64);

    // Keeping the input representation is not a conversion.
    let snap = r.metrics().snapshot();
    assert_eq!(snap.columns_converted, 0);
    assert_eq!(snap.columns_unchanged, 1);
}

#[test]
fn disabling_nullable_ints_promotes_holes_to_float() {
    let opts = ReduceOptions {
        use_nullable_ints: false,
        ..ReduceOptions::default()
    };
    let ds = DataSet::new(vec![Column::new(
        "n",
        ColumnData::NullableInt64(vec![Some(10), None, Some(20)]),
    )])
    .unwrap();

    let out = Reducer::new(opts).unwrap().reduce(&ds);
    let col = out.column("n").unwrap();
    assert_eq!(col.dtype(), DType::Float32);
    assert_eq!(col.null_mask(), vec![false, true, false]);
}

#[test]
fn unsigned_grid_is_preferred_for_non_negative_minimum() {
    // 130 fits both int16 and uint8; min >= 0 sends it through the unsigned grid, where
    // uint8 is the narrower pick.
    let ds = DataSet::new(vec![Column::new("n", ColumnData::Int64(vec![0, 130]))]).unwrap();
    let out = reducer().reduce(&ds);
    assert_eq!(out.column("n").unwrap().dtype(), DType::UInt8);
}

#[test]
fn exact_min_max_survives_extreme_unsigned_values() {
    let ds = DataSet::new(vec![Column::new(
        "n",
        ColumnData::UInt64(vec![u64::MAX - 1, u64::MAX]),
    )])
    .unwrap();
    let out = reducer().reduce(&ds);
    let col = out.column("n").unwrap();
    assert_eq!(col.dtype(), DType::UInt64);
    assert_eq!(
        col.min_max(),
        Some((
            Numeric::Int((u64::MAX - 1) as i128),
            Numeric::Int(u64::MAX as i128)
        ))
    );
}
