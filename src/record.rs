//! Dispatch of values and whole records onto columns.
//!
//! Leaf values go through [`ColumnValue`]. Records, usually implemented with
//! `#[derive(Record)]`, enumerate their fields in declaration order and are stored one column
//! per leaf under dot-qualified, upper-cased names such as `SOURCE.FLUX`.

use crate::{
    error::TableError,
    format::TableFormat,
    io::TableIo,
    observability::log_debug,
    option::ReadOptions,
    reader,
    result::{Outcome, ReadResult},
    value::ColumnValue,
    writer,
};

/// Read access to a table during one column or record read.
pub struct ReadContext<'a, F> {
    pub(crate) io: &'a mut F,
}

impl<'a, F: TableIo> ReadContext<'a, F> {
    pub(crate) fn new(io: &'a mut F) -> Self {
        ReadContext { io }
    }
}

/// Write access to a table during one column or record write.
pub struct WriteContext<'a, F> {
    pub(crate) io: &'a mut F,
    pub(crate) format: TableFormat,
}

impl<'a, F: TableIo> WriteContext<'a, F> {
    pub(crate) fn new(io: &'a mut F, format: TableFormat) -> Self {
        WriteContext { io, format }
    }

    /// Deletes column `name` if it exists.
    pub fn remove_column(&mut self, name: &str) -> Result<(), TableError> {
        if self.io.extension().is_none() {
            return Ok(());
        }
        let column = name.to_uppercase();
        let file = self.io.file_name().to_string();
        let index = self.io.column_index(&column).map_err(|err| {
            TableError::io(format!("could not look up column '{column}'"), &file, err)
        })?;
        if let Some(index) = index {
            self.io.delete_column(index).map_err(|err| {
                TableError::io(format!("could not remove column '{column}'"), &file, err)
            })?;
            log_debug!(
                component = "record",
                event = "column_removed",
                column = %column,
            );
        }
        Ok(())
    }
}

/// Something that can be loaded from the column (or columns) called `name`.
pub trait ReadColumn {
    fn read_column<F>(
        &mut self,
        ctx: &mut ReadContext<'_, F>,
        opts: &ReadOptions,
        name: &str,
    ) -> ReadResult
    where
        F: TableIo;
}

/// Something that can be stored as the column (or columns) called `name`.
pub trait WriteColumn {
    fn write_column<F>(&self, ctx: &mut WriteContext<'_, F>, name: &str) -> Result<(), TableError>
    where
        F: TableIo;

    /// Replaces the column called `name`, creating it if absent.
    fn update_column<F>(&self, ctx: &mut WriteContext<'_, F>, name: &str) -> Result<(), TableError>
    where
        F: TableIo,
    {
        ctx.remove_column(name)?;
        self.write_column(ctx, name)
    }
}

impl<C: ColumnValue> ReadColumn for C {
    fn read_column<F>(
        &mut self,
        ctx: &mut ReadContext<'_, F>,
        opts: &ReadOptions,
        name: &str,
    ) -> ReadResult
    where
        F: TableIo,
    {
        reader::read_value(ctx.io, opts, name, self)
    }
}

impl<C: ColumnValue> WriteColumn for C {
    fn write_column<F>(&self, ctx: &mut WriteContext<'_, F>, name: &str) -> Result<(), TableError>
    where
        F: TableIo,
    {
        writer::write_value(ctx, name, self)
    }
}

/// A composite value whose fields map onto columns.
pub trait Record {
    fn visit_fields<V>(&self, visitor: &mut V) -> Result<(), TableError>
    where
        V: FieldVisitor;

    fn visit_fields_mut<V>(&mut self, visitor: &mut V) -> Result<(), TableError>
    where
        V: FieldVisitorMut;
}

pub trait FieldVisitor {
    fn visit<C>(&mut self, name: &str, value: &C) -> Result<(), TableError>
    where
        C: WriteColumn + ?Sized;
}

pub trait FieldVisitorMut {
    fn visit<C>(&mut self, name: &str, value: &mut C) -> Result<(), TableError>
    where
        C: ReadColumn + ?Sized;
}

/// Prefix of the fields of the record stored as `name`; empty at the top level.
fn field_prefix(name: &str) -> String {
    if name.is_empty() {
        String::new()
    } else {
        format!("{}.", name.to_uppercase())
    }
}

struct ReadFields<'c, 'a, F> {
    ctx: &'c mut ReadContext<'a, F>,
    opts: &'c ReadOptions,
    prefix: String,
    visited: bool,
    loaded: bool,
}

impl<F: TableIo> FieldVisitorMut for ReadFields<'_, '_, F> {
    fn visit<C>(&mut self, name: &str, value: &mut C) -> Result<(), TableError>
    where
        C: ReadColumn + ?Sized,
    {
        let column = format!("{}{}", self.prefix, name.to_uppercase());
        self.visited = true;
        if value.read_column(self.ctx, self.opts, &column)?.is_loaded() {
            self.loaded = true;
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum WriteMode {
    Write,
    Update,
}

struct WriteFields<'c, 'a, F> {
    ctx: &'c mut WriteContext<'a, F>,
    prefix: String,
    mode: WriteMode,
}

impl<F: TableIo> FieldVisitor for WriteFields<'_, '_, F> {
    fn visit<C>(&mut self, name: &str, value: &C) -> Result<(), TableError>
    where
        C: WriteColumn + ?Sized,
    {
        let column = format!("{}{}", self.prefix, name.to_uppercase());
        match self.mode {
            WriteMode::Write => value.write_column(self.ctx, &column),
            WriteMode::Update => value.update_column(self.ctx, &column),
        }
    }
}

/// Reads every field of `record` from the columns under `name`. The record counts as
/// skipped only when every one of its fields was skipped.
pub fn read_record<R, F>(
    record: &mut R,
    ctx: &mut ReadContext<'_, F>,
    opts: &ReadOptions,
    name: &str,
) -> ReadResult
where
    R: Record + ?Sized,
    F: TableIo,
{
    let mut fields = ReadFields {
        ctx,
        opts,
        prefix: field_prefix(name),
        visited: false,
        loaded: false,
    };
    record.visit_fields_mut(&mut fields)?;
    if fields.visited && !fields.loaded {
        Ok(Outcome::Skipped)
    } else {
        Ok(Outcome::Loaded)
    }
}

/// Writes every field of `record` as new columns under `name`.
pub fn write_record<R, F>(
    record: &R,
    ctx: &mut WriteContext<'_, F>,
    name: &str,
) -> Result<(), TableError>
where
    R: Record + ?Sized,
    F: TableIo,
{
    record.visit_fields(&mut WriteFields {
        ctx,
        prefix: field_prefix(name),
        mode: WriteMode::Write,
    })
}

/// Replaces every column of `record` under `name`.
pub fn update_record<R, F>(
    record: &R,
    ctx: &mut WriteContext<'_, F>,
    name: &str,
) -> Result<(), TableError>
where
    R: Record + ?Sized,
    F: TableIo,
{
    record.visit_fields(&mut WriteFields {
        ctx,
        prefix: field_prefix(name),
        mode: WriteMode::Update,
    })
}

/// A sequence of `(name, &mut value)` pairs read one after the other.
pub trait ReadColumns {
    fn read_columns<F>(self, ctx: &mut ReadContext<'_, F>, opts: &ReadOptions) -> ReadResult
    where
        F: TableIo;
}

/// A sequence of `(name, &value)` pairs written one after the other.
pub trait WriteColumns {
    fn write_columns<F>(&self, ctx: &mut WriteContext<'_, F>) -> Result<(), TableError>
    where
        F: TableIo;

    fn update_columns<F>(&self, ctx: &mut WriteContext<'_, F>) -> Result<(), TableError>
    where
        F: TableIo;
}

macro_rules! implement_column_tuples {
    ($($ty:ident $idx:tt),+) => {
        impl<'n, $($ty),+> ReadColumns for ($((&'n str, &'n mut $ty),)+)
        where
            $($ty: ReadColumn + ?Sized,)+
        {
            fn read_columns<F>(self, ctx: &mut ReadContext<'_, F>, opts: &ReadOptions) -> ReadResult
            where
                F: TableIo,
            {
                let mut loaded = false;
                $(
                    loaded |= self.$idx.1.read_column(ctx, opts, self.$idx.0)?.is_loaded();
                )+
                Ok(if loaded { Outcome::Loaded } else { Outcome::Skipped })
            }
        }

        impl<'n, $($ty),+> WriteColumns for ($((&'n str, &'n $ty),)+)
        where
            $($ty: WriteColumn + ?Sized,)+
        {
            fn write_columns<F>(&self, ctx: &mut WriteContext<'_, F>) -> Result<(), TableError>
            where
                F: TableIo,
            {
                $(
                    self.$idx.1.write_column(ctx, self.$idx.0)?;
                )+
                Ok(())
            }

            fn update_columns<F>(&self, ctx: &mut WriteContext<'_, F>) -> Result<(), TableError>
            where
                F: TableIo,
            {
                $(
                    self.$idx.1.update_column(ctx, self.$idx.0)?;
                )+
                Ok(())
            }
        }
    };
}

implement_column_tuples!(A 0);
implement_column_tuples!(A 0, B 1);
implement_column_tuples!(A 0, B 1, C 2);
implement_column_tuples!(A 0, B 1, C 2, D 3);
implement_column_tuples!(A 0, B 1, C 2, D 3, E 4);
implement_column_tuples!(A 0, B 1, C 2, D 3, E 4, G 5);
implement_column_tuples!(A 0, B 1, C 2, D 3, E 4, G 5, H 6);
implement_column_tuples!(A 0, B 1, C 2, D 3, E 4, G 5, H 6, I 7);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{Extension, MemTable};

    struct Point {
        x: f64,
        y: f64,
        tags: Vec<String>,
    }

    impl Record for Point {
        fn visit_fields<V: FieldVisitor>(&self, visitor: &mut V) -> Result<(), TableError> {
            visitor.visit("x", &self.x)?;
            visitor.visit("y", &self.y)?;
            visitor.visit("tags", &self.tags)
        }

        fn visit_fields_mut<V: FieldVisitorMut>(
            &mut self,
            visitor: &mut V,
        ) -> Result<(), TableError> {
            visitor.visit("x", &mut self.x)?;
            visitor.visit("y", &mut self.y)?;
            visitor.visit("tags", &mut self.tags)
        }
    }

    fn table() -> MemTable {
        let mut io = MemTable::in_memory("record");
        io.create_table(Extension::BinTable).unwrap();
        io
    }

    #[test]
    fn fields_get_qualified_names() {
        let mut io = table();
        let point = Point {
            x: 1.0,
            y: -2.0,
            tags: vec!["a".into(), "bc".into()],
        };
        let mut ctx = WriteContext::new(&mut io, TableFormat::ColumnOriented);
        write_record(&point, &mut ctx, "pos").unwrap();

        assert_eq!(io.column_index("POS.X").unwrap(), Some(0));
        assert_eq!(io.column_index("POS.TAGS").unwrap(), Some(2));

        let mut back = Point {
            x: 0.0,
            y: 0.0,
            tags: Vec::new(),
        };
        let mut ctx = ReadContext::new(&mut io);
        let outcome = read_record(&mut back, &mut ctx, &ReadOptions::STRICT, "Pos").unwrap();
        assert_eq!(outcome, Outcome::Loaded);
        assert_eq!((back.x, back.y), (1.0, -2.0));
        assert_eq!(back.tags, vec!["a".to_string(), "bc".to_string()]);
    }

    #[test]
    fn absent_record_is_skipped() {
        let mut io = table();
        let mut point = Point {
            x: 4.0,
            y: 5.0,
            tags: Vec::new(),
        };
        let mut ctx = ReadContext::new(&mut io);
        assert!(read_record(&mut point, &mut ctx, &ReadOptions::STRICT, "").is_err());
        let outcome = read_record(&mut point, &mut ctx, &ReadOptions::MISSING, "").unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert_eq!(point.x, 4.0);
    }

    #[test]
    fn tuples_write_in_order() {
        let mut io = table();
        let mut ctx = WriteContext::new(&mut io, TableFormat::ColumnOriented);
        let ids = vec![1i64, 2, 3];
        (("id", &ids), ("name", &"m31".to_string()))
            .write_columns(&mut ctx)
            .unwrap();
        (("id", &vec![9i64]),).update_columns(&mut ctx).unwrap();

        assert_eq!(io.column_index("NAME").unwrap(), Some(0));
        assert_eq!(io.column_index("ID").unwrap(), Some(1));

        let mut ids = Vec::<i64>::new();
        let mut name = String::new();
        let mut ctx = ReadContext::new(&mut io);
        let outcome = (("id", &mut ids), ("name", &mut name))
            .read_columns(&mut ctx, &ReadOptions::STRICT)
            .unwrap();
        assert!(outcome.is_loaded());
        assert_eq!(ids, vec![9]);
        assert_eq!(name, "m31");
    }
}
