//! In-memory containers that map onto a single column.

use crate::{
    array::Array,
    descriptor::TypeCode,
    dims::TargetShape,
    element::Element,
    error::TableError,
    io::TableIo,
    reader::ColumnReader,
    writer::ColumnWriter,
};

/// A value stored in exactly one column: a scalar, a string, or an array of either.
pub trait ColumnValue {
    /// Shape class used for rank reconciliation and on-disk layout.
    const SHAPE: TargetShape;

    /// Element code of columns created for this value; also the conversion target on read.
    const CODE: TypeCode;

    /// Element name shown in diagnostics.
    const ELEMENT: &'static str;

    /// Row-major extents. Scalars and single strings have none.
    fn extents(&self) -> Vec<usize>;

    /// Longest string, for text values.
    fn text_width(&self) -> usize {
        0
    }

    /// Resizes to the reconciled row-major `shape`.
    fn reshape(&mut self, shape: &[usize]);

    fn load<F: TableIo>(&mut self, reader: &mut ColumnReader<'_, F>) -> Result<(), TableError>;

    fn store<F: TableIo>(&self, writer: &mut ColumnWriter<'_, F>) -> Result<(), TableError>;
}

impl<T: Element> ColumnValue for T {
    const SHAPE: TargetShape = TargetShape::Scalar;
    const CODE: TypeCode = T::CODE;
    const ELEMENT: &'static str = T::NAME;

    fn extents(&self) -> Vec<usize> {
        Vec::new()
    }

    fn reshape(&mut self, _: &[usize]) {}

    fn load<F: TableIo>(&mut self, reader: &mut ColumnReader<'_, F>) -> Result<(), TableError> {
        *self = reader.scalar()?;
        Ok(())
    }

    fn store<F: TableIo>(&self, writer: &mut ColumnWriter<'_, F>) -> Result<(), TableError> {
        writer.scalar(*self)
    }
}

impl<T: Element> ColumnValue for Vec<T> {
    const SHAPE: TargetShape = TargetShape::Array(1);
    const CODE: TypeCode = T::CODE;
    const ELEMENT: &'static str = T::NAME;

    fn extents(&self) -> Vec<usize> {
        vec![self.len()]
    }

    fn reshape(&mut self, shape: &[usize]) {
        self.clear();
        self.resize(shape.iter().product(), T::default());
    }

    fn load<F: TableIo>(&mut self, reader: &mut ColumnReader<'_, F>) -> Result<(), TableError> {
        reader.elements(self)
    }

    fn store<F: TableIo>(&self, writer: &mut ColumnWriter<'_, F>) -> Result<(), TableError> {
        writer.elements(self)
    }
}

fn fixed_dims<const D: usize>(shape: &[usize]) -> [usize; D] {
    let mut dims = [1; D];
    for (dim, extent) in dims.iter_mut().zip(shape) {
        *dim = *extent;
    }
    dims
}

impl<T: Element, const D: usize> ColumnValue for Array<T, D> {
    const SHAPE: TargetShape = TargetShape::Array(D);
    const CODE: TypeCode = T::CODE;
    const ELEMENT: &'static str = T::NAME;

    fn extents(&self) -> Vec<usize> {
        self.dims().to_vec()
    }

    fn reshape(&mut self, shape: &[usize]) {
        *self = Array::new(fixed_dims(shape));
    }

    fn load<F: TableIo>(&mut self, reader: &mut ColumnReader<'_, F>) -> Result<(), TableError> {
        reader.elements(self.as_mut_slice())
    }

    fn store<F: TableIo>(&self, writer: &mut ColumnWriter<'_, F>) -> Result<(), TableError> {
        writer.elements(self.as_slice())
    }
}

impl ColumnValue for String {
    const SHAPE: TargetShape = TargetShape::Text;
    const CODE: TypeCode = TypeCode::Text;
    const ELEMENT: &'static str = "String";

    fn extents(&self) -> Vec<usize> {
        Vec::new()
    }

    fn text_width(&self) -> usize {
        self.len()
    }

    fn reshape(&mut self, _: &[usize]) {}

    fn load<F: TableIo>(&mut self, reader: &mut ColumnReader<'_, F>) -> Result<(), TableError> {
        *self = reader.string()?;
        Ok(())
    }

    fn store<F: TableIo>(&self, writer: &mut ColumnWriter<'_, F>) -> Result<(), TableError> {
        writer.string(self)
    }
}

fn longest(values: &[String]) -> usize {
    values.iter().map(String::len).max().unwrap_or(0)
}

impl ColumnValue for Vec<String> {
    const SHAPE: TargetShape = TargetShape::TextArray(1);
    const CODE: TypeCode = TypeCode::Text;
    const ELEMENT: &'static str = "String";

    fn extents(&self) -> Vec<usize> {
        vec![self.len()]
    }

    fn text_width(&self) -> usize {
        longest(self)
    }

    fn reshape(&mut self, shape: &[usize]) {
        self.clear();
        self.resize(shape.iter().product(), String::new());
    }

    fn load<F: TableIo>(&mut self, reader: &mut ColumnReader<'_, F>) -> Result<(), TableError> {
        reader.strings(self)
    }

    fn store<F: TableIo>(&self, writer: &mut ColumnWriter<'_, F>) -> Result<(), TableError> {
        writer.strings(self)
    }
}

impl<const D: usize> ColumnValue for Array<String, D> {
    const SHAPE: TargetShape = TargetShape::TextArray(D);
    const CODE: TypeCode = TypeCode::Text;
    const ELEMENT: &'static str = "String";

    fn extents(&self) -> Vec<usize> {
        self.dims().to_vec()
    }

    fn text_width(&self) -> usize {
        longest(self.as_slice())
    }

    fn reshape(&mut self, shape: &[usize]) {
        *self = Array::new(fixed_dims(shape));
    }

    fn load<F: TableIo>(&mut self, reader: &mut ColumnReader<'_, F>) -> Result<(), TableError> {
        reader.strings(self.as_mut_slice())
    }

    fn store<F: TableIo>(&self, writer: &mut ColumnWriter<'_, F>) -> Result<(), TableError> {
        writer.strings(self.as_slice())
    }
}
