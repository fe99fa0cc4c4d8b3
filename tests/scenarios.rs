use bintable::{
    io::MemTable, Array, InputTable, Outcome, OutputTable, ReadOptions, Table, TableError,
    TableFormat,
};

fn output(format: TableFormat) -> OutputTable {
    OutputTable::from_io(MemTable::in_memory("scenario"), format).unwrap()
}

#[test]
fn scalars_read_back_exactly() {
    let mut out = output(TableFormat::ColumnOriented);
    out.write_column("count", &5i32).unwrap();
    out.write_column("ratio", &0.2f64).unwrap();
    out.write_column("label", &"toto".to_string()).unwrap();

    let mut input = InputTable::from_io(out.into_inner());
    let mut count = 0i32;
    let mut ratio = 0.0f64;
    let mut label = String::new();
    let outcome = input
        .read_columns(
            &ReadOptions::STRICT,
            (("count", &mut count), ("ratio", &mut ratio), ("label", &mut label)),
        )
        .unwrap();
    assert_eq!(outcome, Outcome::Loaded);
    assert_eq!((count, ratio, label.as_str()), (5, 0.2, "toto"));
}

#[test]
fn row_window_selects_rows() {
    let values = vec![10i64, 11, 12, 13, 14, 15];
    for format in [TableFormat::ColumnOriented, TableFormat::RowOriented] {
        let mut out = output(format);
        out.write_column("v", &values).unwrap();

        let mut input = InputTable::from_io(out.into_inner());
        let mut window = Vec::<i64>::new();
        assert!(input
            .read_column_with(&ReadOptions::rows(2, 4), "v", &mut window)
            .unwrap()
            .is_loaded());
        assert_eq!(window, vec![12, 13], "{format:?}");

        assert!(input
            .read_column_with(&ReadOptions::rows(4, 2), "v", &mut window)
            .unwrap()
            .is_loaded());
        assert_eq!(window, vec![12, 13], "{format:?}");

        assert!(input
            .read_column_with(&ReadOptions::row(5), "v", &mut window)
            .unwrap()
            .is_loaded());
        assert_eq!(window, vec![15], "{format:?}");
    }
}

#[test]
fn row_window_on_matrix_rows() {
    let mut out = output(TableFormat::RowOriented);
    let data: Vec<i32> = (0..12).collect();
    let matrix = Array::from_shape_vec([4, 3], data).unwrap();
    out.write_column("m", &matrix).unwrap();

    let mut input = InputTable::from_io(out.into_inner());
    let mut rows: Array<i32, 2> = Array::default();
    assert!(input
        .read_column_with(&ReadOptions::rows(1, 3), "m", &mut rows)
        .unwrap()
        .is_loaded());
    assert_eq!(rows.dims(), [2, 3]);
    assert_eq!(rows.as_slice(), &[3, 4, 5, 6, 7, 8]);
}

#[test]
fn row_window_on_column_oriented_strings() {
    let mut out = output(TableFormat::ColumnOriented);
    let names: Vec<String> = ["a", "bb", "ccc", "dddd"].map(String::from).to_vec();
    out.write_column("names", &names).unwrap();
    let cells = ["u", "vv", "w", "xx", "y", "zzz"].map(String::from).to_vec();
    let grid = Array::from_shape_vec([3, 2], cells).unwrap();
    out.write_column("grid", &grid).unwrap();

    let mut input = InputTable::from_io(out.into_inner());
    let mut window = Vec::<String>::new();
    assert!(input
        .read_column_with(&ReadOptions::rows(1, 3), "names", &mut window)
        .unwrap()
        .is_loaded());
    assert_eq!(window, vec!["bb", "ccc"]);

    let mut rows: Array<String, 2> = Array::default();
    assert!(input
        .read_column_with(&ReadOptions::rows(1, 3), "grid", &mut rows)
        .unwrap()
        .is_loaded());
    assert_eq!(rows.dims(), [2, 2]);
    assert_eq!(rows.as_slice(), &["w", "xx", "y", "zzz"]);
}

#[test]
fn missing_column_policy() {
    let mut out = output(TableFormat::ColumnOriented);
    out.write_column("present", &1u8).unwrap();
    let mut input = InputTable::from_io(out.into_inner());

    let mut value = 42i32;
    let err = input.read_column("absent", &mut value).unwrap_err();
    assert!(err.is_missing_column());
    let message = err.to_string();
    assert!(message.contains("'ABSENT'"), "{message}");
    assert!(message.contains("scenario"), "{message}");

    let outcome = input
        .read_column_with(&ReadOptions::MISSING, "absent", &mut value)
        .unwrap();
    assert_eq!(outcome, Outcome::Skipped);
    assert_eq!(value, 42);
}

#[test]
fn missing_table_is_missing_column() {
    let mut input = InputTable::from_io(MemTable::in_memory("empty"));
    let mut value = 0.0f32;
    assert!(input.read_column("x", &mut value).unwrap_err().is_missing_column());
    assert_eq!(
        input
            .read_column_with(&ReadOptions::MISSING, "x", &mut value)
            .unwrap(),
        Outcome::Skipped
    );
}

#[test]
fn promotion_pads_leading_axes() {
    let mut out = output(TableFormat::ColumnOriented);
    out.write_column("v", &vec![1.0f32, 2.0, 3.0]).unwrap();
    let mut input = InputTable::from_io(out.into_inner());

    let mut cube: Array<f32, 3> = Array::default();
    let err = input.read_column("v", &mut cube).unwrap_err();
    assert!(matches!(
        err,
        TableError::DimensionMismatch {
            expected: 3,
            found: 1,
            ..
        }
    ));

    assert!(input
        .read_column_with(&ReadOptions::DIM_PROMOTE, "v", &mut cube)
        .unwrap()
        .is_loaded());
    assert_eq!(cube.dims(), [1, 1, 3]);
    assert_eq!(cube.get([0, 0, 2]), Some(&3.0));
}

#[test]
fn flattening_collapses_axes() {
    let mut out = output(TableFormat::ColumnOriented);
    let data: Vec<f64> = (0..24).map(f64::from).collect();
    let cube = Array::from_shape_vec([2, 3, 4], data.clone()).unwrap();
    out.write_column("cube", &cube).unwrap();
    let mut input = InputTable::from_io(out.into_inner());

    let mut flat = Vec::<f64>::new();
    assert!(matches!(
        input.read_column("cube", &mut flat),
        Err(TableError::DimensionMismatch { .. })
    ));
    assert!(input
        .read_column_with(&ReadOptions::FLATTEN, "cube", &mut flat)
        .unwrap()
        .is_loaded());
    assert_eq!(flat, data);

    let mut plane: Array<f64, 2> = Array::default();
    assert!(input
        .read_column_with(&ReadOptions::PERMISSIVE, "cube", &mut plane)
        .is_err());
}

#[test]
fn narrowing_needs_policy() {
    let mut out = output(TableFormat::ColumnOriented);
    out.write_column("wide", &vec![1i64, -2, 3]).unwrap();
    out.write_column("small", &vec![7i16, 8]).unwrap();
    let mut input = InputTable::from_io(out.into_inner());

    let mut narrow = Vec::<i32>::new();
    let err = input.read_column("wide", &mut narrow).unwrap_err();
    assert!(err.to_string().contains("int64"), "{err}");
    assert!(input
        .read_column_with(&ReadOptions::NARROW, "wide", &mut narrow)
        .unwrap()
        .is_loaded());
    assert_eq!(narrow, vec![1, -2, 3]);

    let mut widened = Vec::<f64>::new();
    assert!(input.read_column("small", &mut widened).unwrap().is_loaded());
    assert_eq!(widened, vec![7.0, 8.0]);

    let mut flags = Vec::<bool>::new();
    assert!(input
        .read_column_with(&ReadOptions::PERMISSIVE, "small", &mut flags)
        .is_err());
}

#[test]
fn row_count_conflict_creates_nothing() {
    let mut out = output(TableFormat::RowOriented);
    out.write_column("a", &vec![1i32; 6]).unwrap();
    let err = out.write_column("b", &vec![0.5f64; 5]).unwrap_err();
    assert!(matches!(err, TableError::FormatConflict { .. }));
    assert!(err.to_string().contains("expected 6, got 5"), "{err}");

    out.write_column("c", &vec!["x".to_string(); 6]).unwrap();
    let mut input = InputTable::from_io(out.into_inner());
    let names: Vec<String> = input
        .columns_info()
        .unwrap()
        .into_iter()
        .map(|info| info.name)
        .collect();
    assert_eq!(names, vec!["A".to_string(), "C".to_string()]);
}

#[test]
fn format_is_fixed_after_first_column() {
    let mut out = output(TableFormat::ColumnOriented);
    out.set_format(TableFormat::RowOriented).unwrap();
    out.set_format(TableFormat::ColumnOriented).unwrap();
    out.write_column("a", &1i32).unwrap();
    out.set_format(TableFormat::ColumnOriented).unwrap();
    assert!(matches!(
        out.set_format(TableFormat::RowOriented),
        Err(TableError::FormatConflict { .. })
    ));
    assert_eq!(out.format(), TableFormat::ColumnOriented);
}

#[test]
fn row_range_past_end_is_rejected() {
    let mut out = output(TableFormat::RowOriented);
    out.write_column("v", &vec![1u32, 2, 3]).unwrap();
    let mut table = Table::from_io(out.into_inner(), TableFormat::ColumnOriented).unwrap();
    assert_eq!(table.format(), TableFormat::RowOriented);

    let mut values = Vec::<u32>::new();
    let err = table
        .read_column_with(&ReadOptions::rows(1, 4), "v", &mut values)
        .unwrap_err();
    assert!(matches!(err, TableError::RowRangeInvalid { .. }));
    assert!(err.to_string().contains("rows 1 to 4"), "{err}");

    let err = table
        .read_column_with(&ReadOptions::row(usize::MAX), "v", &mut values)
        .unwrap_err();
    assert!(matches!(err, TableError::RowRangeInvalid { .. }));
}

#[test]
fn update_and_remove() {
    let mut table = Table::from_io(MemTable::in_memory("rw"), TableFormat::ColumnOriented).unwrap();
    table
        .write_columns((("x", &vec![1.0f64, 2.0]), ("y", &vec![3.0f64, 4.0])))
        .unwrap();
    table
        .update_columns((("x", &vec![5.0f64, 6.0, 7.0]),))
        .unwrap();

    let mut x = Vec::<f64>::new();
    assert!(table.read_column("x", &mut x).unwrap().is_loaded());
    assert_eq!(x, vec![5.0, 6.0, 7.0]);

    table.remove_column("y").unwrap();
    table.remove_column("y").unwrap();
    let mut y = Vec::<f64>::new();
    assert!(table.read_column("y", &mut y).unwrap_err().is_missing_column());

    table.remove_columns(&["x"]).unwrap();
    assert!(table.columns_info().unwrap().is_empty());
    table.set_format(TableFormat::RowOriented).unwrap();
}
