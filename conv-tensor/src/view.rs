use super::*;

/// Dense storage paired with the lineage of spatial transforms recorded over its two trailing
/// dimensions. Leading dimensions (channels) are never transformed.
///
/// Image and filter views are thin wrappers which pin the number of leading dimensions and
/// decide which transforms they accept.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LazyView<T> {
    storage: DenseStorage<T>,
    lineage: Lineage,
}

impl<T: Element> LazyView<T> {
    pub fn new(dims: &[usize]) -> Result<Self> {
        let storage = DenseStorage::new(dims)?;

        let rank = storage.rank();
        if rank < 2 {
            return Err(TensorError::InvalidShape(dims.to_vec()));
        }

        let base = Extent::new(dims[rank - 2], dims[rank - 1]);

        Ok(Self {
            storage,
            lineage: Lineage::new(base),
        })
    }

    /// Returns the logical value at `(leading..., row, col)`.
    ///
    /// Leading indices must be in range, any spatial coordinate is accepted.
    #[inline]
    pub fn resolve(&self, leading: &[usize], row: usize, col: usize) -> T {
        match self.lineage.resolve(row, col) {
            Some((row, col)) => {
                self.storage.as_slice()[self.storage.spatial_offset(leading, row, col)]
            }
            None => T::zero(),
        }
    }
}

impl<T> LazyView<T> {
    pub fn storage(&self) -> &DenseStorage<T> {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut DenseStorage<T> {
        &mut self.storage
    }

    pub fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    pub fn lineage_mut(&mut self) -> &mut Lineage {
        &mut self.lineage
    }

    pub fn extent(&self) -> Extent {
        self.lineage.extent()
    }

    /// Records a transform unless the logical element count, leading dimensions included, would
    /// no longer fit into `usize`.
    pub fn apply(&mut self, transform: Transform) -> Result<Extent> {
        // bounded by the storage size
        let leading: usize = self.leading_dims().iter().product();

        let extent = self.lineage.apply(transform)?;
        if extent.area().checked_mul(leading).is_none() {
            self.lineage.undo_last();
            return Err(TensorError::InvalidTransform(format!(
                "{transform:?} overflows {leading} planes of {extent}"
            )));
        }

        Ok(extent)
    }

    /// Extents of the untransformed leading dimensions.
    pub fn leading_dims(&self) -> &[usize] {
        let dims = self.storage.dims();
        &dims[..dims.len() - 2]
    }

    /// Checks leading indices against their extents, reporting the first offending one.
    pub fn check_leading(&self, leading: &[usize]) -> Result<()> {
        match leading
            .iter()
            .zip(self.leading_dims())
            .find(|(idx, dim)| idx >= dim)
        {
            Some((&channel, &channels)) => {
                Err(TensorError::ChannelOutOfRange { channel, channels })
            }
            None => Ok(()),
        }
    }
}
