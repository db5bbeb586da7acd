use super::*;

/// A `(out_channel, in_channel, row, col)` filter bank with a lazily transformed spatial extent.
///
/// Filters accept upsampling (dilation) and downsampling only; padding a filter has no meaning in
/// a convolution and is not offered.
#[derive(Clone)]
pub struct FilterView<T> {
    view: LazyView<T>,
}

impl<T: Element> FilterView<T> {
    /// Allocates a zero-filled filter bank.
    pub fn new(out_channels: usize, in_channels: usize, rows: usize, cols: usize) -> Result<Self> {
        Ok(Self {
            view: LazyView::new(&[out_channels, in_channels, rows, cols])?,
        })
    }

    /// Creates a filter bank from values in row-major `(out, in, row, col)` order.
    pub fn from_values(
        out_channels: usize,
        in_channels: usize,
        rows: usize,
        cols: usize,
        values: &[T],
    ) -> Result<Self> {
        let mut filter = Self::new(out_channels, in_channels, rows, cols)?;
        filter.initialize(Initializer::Values(values))?;
        Ok(filter)
    }

    pub fn initialize(&mut self, init: Initializer<'_, T>) -> Result<()> {
        self.view.storage_mut().initialize(init)
    }

    pub fn upsample(&mut self, scale_x: usize, scale_y: usize) -> Result<()> {
        self.view
            .apply(Transform::Upsample { scale_x, scale_y })
            .map(|_| ())
    }

    pub fn downsample(&mut self, scale_x: usize, scale_y: usize) -> Result<()> {
        self.view
            .apply(Transform::Downsample { scale_x, scale_y })
            .map(|_| ())
    }

    pub fn undo(&mut self) -> Option<Transform> {
        self.view.lineage_mut().undo_last()
    }

    /// Returns the logical value at `(out_channel, in_channel, row, col)`; gaps and coordinates
    /// beyond the current extent resolve to zero.
    pub fn value_at(&self, out_channel: usize, in_channel: usize, row: usize, col: usize) -> Result<T> {
        self.view.check_leading(&[out_channel, in_channel])?;
        Ok(self.resolve(out_channel, in_channel, row, col))
    }

    #[inline]
    pub(crate) fn resolve(&self, out_channel: usize, in_channel: usize, row: usize, col: usize) -> T {
        self.view.resolve(&[out_channel, in_channel], row, col)
    }
}

impl<T> FilterView<T> {
    pub fn out_channels(&self) -> usize {
        self.view.leading_dims()[0]
    }

    pub fn in_channels(&self) -> usize {
        self.view.leading_dims()[1]
    }

    pub fn current_rows(&self) -> usize {
        self.extent().rows
    }

    pub fn current_cols(&self) -> usize {
        self.extent().cols
    }

    pub fn extent(&self) -> Extent {
        self.view.extent()
    }

    pub fn lineage(&self) -> &Lineage {
        self.view.lineage()
    }

    pub fn storage(&self) -> &DenseStorage<T> {
        self.view.storage()
    }

    pub(crate) fn lazy_view(&self) -> &LazyView<T> {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential() -> Result<FilterView<i32>> {
        let mut filter = FilterView::new(3, 2, 3, 3)?;
        filter.initialize(Initializer::Sequential(0))?;
        Ok(filter)
    }

    #[test]
    fn can_read_base_values() -> Result<()> {
        let filter = sequential()?;

        assert_eq!(filter.out_channels(), 3);
        assert_eq!(filter.in_channels(), 2);
        assert_eq!(filter.value_at(0, 0, 0, 0)?, 0);
        assert_eq!(filter.value_at(1, 1, 2, 0)?, 33);
        assert_eq!(filter.value_at(2, 1, 2, 2)?, 53);

        Ok(())
    }

    #[test]
    fn dilates_with_upsample() -> Result<()> {
        let original = sequential()?;
        let mut filter = original.clone();
        filter.upsample(2, 2)?;

        assert_eq!(filter.extent(), Extent::new(6, 6));
        assert_eq!(filter.value_at(1, 0, 2, 4)?, original.value_at(1, 0, 1, 2)?);
        assert_eq!(filter.value_at(1, 0, 1, 4)?, 0);
        assert_eq!(filter.value_at(1, 0, 2, 3)?, 0);

        Ok(())
    }

    #[test]
    fn can_undo_chained_sampling() -> Result<()> {
        let original = sequential()?;
        let mut filter = original.clone();

        filter.upsample(2, 2)?;
        filter.upsample(2, 2)?;
        assert_eq!(filter.extent(), Extent::new(12, 12));

        filter.downsample(4, 4)?;
        assert_eq!(filter.extent(), Extent::new(3, 3));
        assert_eq!(filter, original);

        filter.undo();
        filter.undo();
        filter.undo();
        assert!(filter.lineage().is_empty());
        assert_eq!(filter, original);

        Ok(())
    }

    #[test]
    fn rejects_bad_channels() -> Result<()> {
        let filter = sequential()?;

        assert_eq!(
            filter.value_at(3, 0, 0, 0),
            Err(TensorError::ChannelOutOfRange {
                channel: 3,
                channels: 3
            })
        );
        assert_eq!(
            filter.value_at(0, 2, 0, 0),
            Err(TensorError::ChannelOutOfRange {
                channel: 2,
                channels: 2
            })
        );

        Ok(())
    }

    #[test]
    fn rejects_non_integer_downsample() -> Result<()> {
        let mut filter = sequential()?;

        assert!(matches!(
            filter.downsample(2, 2),
            Err(TensorError::NonIntegerDownsample { .. })
        ));
        assert!(filter.lineage().is_empty());

        Ok(())
    }
}
