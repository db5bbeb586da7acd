use super::*;

/// Describes how a freshly allocated storage gets its values.
#[derive(Clone, Copy, Debug)]
pub enum Initializer<'a, T> {
    /// Fills `start, start + 1, start + 2, ...` in buffer order.
    Sequential(T),
    /// Copies a flat array which must hold exactly `size()` values.
    Values(&'a [T]),
}

/// Fixed-rank, fixed-shape contiguous buffer with row-major multi-index addressing.
///
/// The shape is chosen once at construction and never changes. Strides are precomputed so that
/// a full multi-index maps to a buffer slot with a single dot product.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseStorage<T> {
    data: Vec<T>,
    dims: Shape,
    strides: Shape,
}

impl<T: Element> DenseStorage<T> {
    /// Allocates a zero-filled buffer for the given extents.
    /// Returns an error if no extents are given, any of them is zero or their product does not
    /// fit into `usize`.
    pub fn new(dims: &[usize]) -> Result<Self> {
        if dims.is_empty() || dims.contains(&0) {
            return Err(TensorError::InvalidShape(dims.to_vec()));
        }

        let size = dims
            .iter()
            .try_fold(1usize, |size, dim| size.checked_mul(*dim))
            .ok_or_else(|| TensorError::InvalidShape(dims.to_vec()))?;

        Ok(Self {
            data: vec![T::zero(); size],
            dims: dims.iter().copied().collect(),
            strides: compute_strides(dims),
        })
    }

    /// Fills the buffer, see [`Initializer`].
    /// Nothing is written when the supplied array has the wrong length.
    pub fn initialize(&mut self, init: Initializer<'_, T>) -> Result<()> {
        match init {
            Initializer::Sequential(start) => {
                let mut value = start;
                for (index, slot) in self.data.iter_mut().enumerate() {
                    // the last slot may hold the type's maximum
                    if index > 0 {
                        value = value + T::one();
                    }
                    *slot = value;
                }
            }
            Initializer::Values(values) => {
                if values.len() != self.data.len() {
                    return Err(TensorError::LengthMismatch {
                        expected: self.data.len(),
                        actual: values.len(),
                    });
                }
                self.data.copy_from_slice(values);
            }
        }

        Ok(())
    }

    /// Returns the element at a full multi-index.
    pub fn get(&self, indices: &[usize]) -> Result<T> {
        let offset = self.offset(indices)?;
        Ok(self.data[offset])
    }

    /// Overwrites the element at a full multi-index.
    pub fn set(&mut self, indices: &[usize], value: T) -> Result<()> {
        let offset = self.offset(indices)?;
        self.data[offset] = value;
        Ok(())
    }
}

impl<T> DenseStorage<T> {
    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn offset(&self, indices: &[usize]) -> Result<usize> {
        let in_range = indices.len() == self.dims.len()
            && indices.iter().zip(self.dims.iter()).all(|(idx, dim)| idx < dim);

        if !in_range {
            return Err(TensorError::IndexOutOfRange {
                index: indices.to_vec(),
                shape: self.dims.to_vec(),
            });
        }

        Ok(indices
            .iter()
            .zip(self.strides.iter())
            .map(|(idx, stride)| idx * stride)
            .sum())
    }

    /// Offset of `(leading..., row, col)` without bounds checks; the two trailing dimensions are
    /// always the spatial ones. Callers guarantee that every index is in range.
    #[inline]
    pub(crate) fn spatial_offset(&self, leading: &[usize], row: usize, col: usize) -> usize {
        debug_assert_eq!(leading.len() + 2, self.rank());

        let rank = self.strides.len();
        let leading_offset: usize = leading
            .iter()
            .zip(self.strides.iter())
            .map(|(idx, stride)| idx * stride)
            .sum();

        leading_offset + row * self.strides[rank - 2] + col * self.strides[rank - 1]
    }
}

/// Row-major strides: the last dimension is contiguous.
fn compute_strides(dims: &[usize]) -> Shape {
    let mut strides: Shape = smallvec![1; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1];
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_compute_strides() -> Result<()> {
        let storage = DenseStorage::<i32>::new(&[2, 3, 4])?;
        assert_eq!(storage.strides(), &[12, 4, 1]);
        assert_eq!(storage.size(), 24);
        assert_eq!(storage.rank(), 3);

        let storage = DenseStorage::<i32>::new(&[3, 2, 5, 5])?;
        assert_eq!(storage.strides(), &[50, 25, 5, 1]);

        Ok(())
    }

    #[test]
    fn can_fill_sequentially() -> Result<()> {
        let mut storage = DenseStorage::<i32>::new(&[2, 3])?;
        storage.initialize(Initializer::Sequential(0))?;

        assert_eq!(storage.as_slice(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(storage.get(&[0, 2])?, 2);
        assert_eq!(storage.get(&[1, 0])?, 3);

        storage.initialize(Initializer::Sequential(10))?;
        assert_eq!(storage.get(&[1, 2])?, 15);

        Ok(())
    }

    #[test]
    fn can_copy_values() -> Result<()> {
        let mut storage = DenseStorage::<f64>::new(&[2, 2])?;
        storage.initialize(Initializer::Values(&[1.5, 2.5, 3.5, 4.5]))?;

        assert_eq!(storage.get(&[1, 1])?, 4.5);

        Ok(())
    }

    #[test]
    fn rejects_wrong_initializer_length() -> Result<()> {
        let mut storage = DenseStorage::<i32>::new(&[2, 2])?;
        storage.initialize(Initializer::Sequential(7))?;

        let err = storage.initialize(Initializer::Values(&[1, 2, 3]));
        assert_eq!(
            err,
            Err(TensorError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        );
        // untouched
        assert_eq!(storage.as_slice(), &[7, 8, 9, 10]);

        Ok(())
    }

    #[test]
    fn rejects_out_of_range_index() -> Result<()> {
        let mut storage = DenseStorage::<i32>::new(&[2, 3])?;

        assert!(matches!(
            storage.get(&[2, 0]),
            Err(TensorError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            storage.get(&[0, 3]),
            Err(TensorError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            storage.get(&[0]),
            Err(TensorError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            storage.set(&[0, 0, 0], 1),
            Err(TensorError::IndexOutOfRange { .. })
        ));

        storage.set(&[1, 2], 42)?;
        assert_eq!(storage.get(&[1, 2])?, 42);

        Ok(())
    }

    #[test]
    fn rejects_empty_extents() {
        assert_eq!(
            DenseStorage::<i32>::new(&[3, 0, 2]),
            Err(TensorError::InvalidShape(vec![3, 0, 2]))
        );
        assert_eq!(
            DenseStorage::<i32>::new(&[]),
            Err(TensorError::InvalidShape(vec![]))
        );
    }

    #[test]
    fn rejects_overflowing_extents() {
        assert_eq!(
            DenseStorage::<i32>::new(&[usize::MAX, 2]),
            Err(TensorError::InvalidShape(vec![usize::MAX, 2]))
        );
        assert!(matches!(
            DenseStorage::<u8>::new(&[3, usize::MAX / 2, 1]),
            Err(TensorError::InvalidShape(_))
        ));
    }

    #[test]
    fn can_fill_up_to_type_maximum() -> Result<()> {
        let mut storage = DenseStorage::<u8>::new(&[16, 16])?;
        storage.initialize(Initializer::Sequential(0))?;

        assert_eq!(storage.get(&[0, 0])?, 0);
        assert_eq!(storage.get(&[15, 15])?, u8::MAX);

        let mut single = DenseStorage::<i32>::new(&[1, 1])?;
        single.initialize(Initializer::Sequential(i32::MAX))?;
        assert_eq!(single.as_slice(), &[i32::MAX]);

        Ok(())
    }

    #[test]
    fn spatial_offset_matches_checked_offset() -> Result<()> {
        let mut storage = DenseStorage::<i32>::new(&[2, 3, 4, 5])?;
        storage.initialize(Initializer::Sequential(0))?;

        let offset = storage.spatial_offset(&[1, 2], 3, 4);
        assert_eq!(storage.as_slice()[offset], storage.get(&[1, 2, 3, 4])?);

        Ok(())
    }
}
