use bintable::{
    io::{Extension, MemTable, TableIo},
    InputTable, OutputTable, ReadOptions, ScalarKind, TableError, TableFormat,
};

fn slot(value: &str, width: usize) -> Box<[u8]> {
    let mut slot = vec![b' '; width];
    slot[..value.len()].copy_from_slice(value.as_bytes());
    slot.into_boxed_slice()
}

/// Three-row text table as produced by older archives.
fn legacy_table() -> MemTable {
    let mut io = MemTable::in_memory("legacy.tab");
    io.create_table(Extension::AsciiTable).unwrap();
    io.insert_column(0, "NAME", "A8").unwrap();
    io.insert_column(1, "MAG", "E12.4").unwrap();
    io.insert_column(2, "ID", "I6").unwrap();

    let names = [slot("vega", 8), slot("sirius", 8), slot("deneb", 8)];
    io.write_strings(0, 0, 0, &names).unwrap();
    io.write_elements(1, 0, 0, &[0.03f32, -1.46, 1.25]).unwrap();
    io.write_elements(2, 0, 0, &[172167i32, 48915, 102098]).unwrap();
    io
}

#[test]
fn text_columns_read_at_tform_width() {
    let mut input = InputTable::from_io(legacy_table());

    let mut names = Vec::<String>::new();
    assert!(input.read_column("name", &mut names).unwrap().is_loaded());
    assert_eq!(names, vec!["vega", "sirius", "deneb"]);

    let mut mags = Vec::<f64>::new();
    assert!(input
        .read_column_with(&ReadOptions::rows(1, 3), "mag", &mut mags)
        .unwrap()
        .is_loaded());
    assert_eq!(mags, vec![-1.46f32 as f64, 1.25]);

    let mut ids = Vec::<i64>::new();
    assert!(input.read_column("id", &mut ids).unwrap().is_loaded());
    assert_eq!(ids, vec![172167, 48915, 102098]);
}

#[test]
fn introspection_uses_tform() {
    let mut input = InputTable::from_io(legacy_table());
    let info = input.columns_info().unwrap();
    assert_eq!(info[0].kind, ScalarKind::String);
    assert_eq!(info[0].length, 8);
    assert_eq!(info[1].kind, ScalarKind::Float32);
    assert_eq!(info[2].kind, ScalarKind::Integer);
    assert_eq!(info[2].dims, vec![1]);
}

#[test]
fn legacy_tables_are_read_only() {
    let mut out = OutputTable::from_io(legacy_table(), TableFormat::ColumnOriented).unwrap();
    assert_eq!(out.format(), TableFormat::RowOriented);
    let err = out.write_column("extra", &vec![1i32, 2, 3]).unwrap_err();
    assert!(matches!(err, TableError::FormatConflict { .. }));
}
