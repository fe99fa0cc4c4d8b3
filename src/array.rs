//! Minimal row-major N-dimensional container with a rank fixed at compile time.

use std::ops::{Index, IndexMut};

/// Row-major array of rank `D`. The last extent varies fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Array<T, const D: usize> {
    dims: [usize; D],
    data: Vec<T>,
}

pub type Array1<T> = Array<T, 1>;
pub type Array2<T> = Array<T, 2>;
pub type Array3<T> = Array<T, 3>;

impl<T, const D: usize> Default for Array<T, D> {
    fn default() -> Self {
        Self {
            dims: [0; D],
            data: Vec::new(),
        }
    }
}

impl<T, const D: usize> Array<T, D> {
    /// Wraps `data` with the given extents, or hands `data` back when the element count
    /// does not match.
    pub fn from_shape_vec(dims: [usize; D], data: Vec<T>) -> Result<Self, Vec<T>> {
        if dims.iter().product::<usize>() != data.len() {
            return Err(data);
        }
        Ok(Self { dims, data })
    }

    pub fn dims(&self) -> [usize; D] {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn get(&self, index: [usize; D]) -> Option<&T> {
        self.flat_index(index).and_then(|flat| self.data.get(flat))
    }

    pub fn get_mut(&mut self, index: [usize; D]) -> Option<&mut T> {
        self.flat_index(index).and_then(|flat| self.data.get_mut(flat))
    }

    fn flat_index(&self, index: [usize; D]) -> Option<usize> {
        let mut flat = 0;
        for (i, extent) in index.iter().zip(self.dims.iter()) {
            if i >= extent {
                return None;
            }
            flat = flat * extent + i;
        }
        Some(flat)
    }
}

impl<T: Clone + Default, const D: usize> Array<T, D> {
    pub fn new(dims: [usize; D]) -> Self {
        let mut array = Self::default();
        array.resize(dims);
        array
    }

    /// Changes the extents. Existing elements keep their flat positions, new ones are
    /// default-initialized.
    pub fn resize(&mut self, dims: [usize; D]) {
        self.dims = dims;
        self.data.resize(dims.iter().product(), T::default());
    }
}

impl<T> From<Vec<T>> for Array<T, 1> {
    fn from(data: Vec<T>) -> Self {
        Self {
            dims: [data.len()],
            data,
        }
    }
}

impl<T, const D: usize> Index<usize> for Array<T, D> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T, const D: usize> IndexMut<usize> for Array<T, D> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<T, const D: usize> Index<[usize; D]> for Array<T, D> {
    type Output = T;

    fn index(&self, index: [usize; D]) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("index {index:?} out of bounds for dims {:?}", self.dims),
        }
    }
}

impl<T, const D: usize> IndexMut<[usize; D]> for Array<T, D> {
    fn index_mut(&mut self, index: [usize; D]) -> &mut T {
        let dims = self.dims;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("index {index:?} out of bounds for dims {dims:?}"),
        }
    }
}
