use super::*;

/// A `(channel, row, col)` image whose spatial transforms are recorded rather than materialized.
///
/// Logical values are resolved through the lineage on every access, so padding, upsampling and
/// downsampling never copy data. The channel count is fixed for the lifetime of the view.
///
/// # Example
/// ```
/// use conv_tensor::{ImageView, Initializer};
///
/// let mut image = ImageView::<i32>::new(1, 2, 2)?;
/// image.initialize(Initializer::Sequential(1))?;
/// image.pad(1, 1, 1, 1)?;
///
/// assert_eq!((image.current_rows(), image.current_cols()), (4, 4));
/// assert_eq!(image.value_at(0, 0, 0)?, 0);
/// assert_eq!(image.value_at(0, 1, 1)?, 1);
/// # Ok::<(), conv_tensor::TensorError>(())
/// ```
#[derive(Clone)]
pub struct ImageView<T> {
    view: LazyView<T>,
}

impl<T: Element> ImageView<T> {
    /// Allocates a zero-filled image.
    pub fn new(channels: usize, rows: usize, cols: usize) -> Result<Self> {
        Ok(Self {
            view: LazyView::new(&[channels, rows, cols])?,
        })
    }

    /// Creates an image from `channels * rows * cols` values in row-major order.
    pub fn from_values(channels: usize, rows: usize, cols: usize, values: &[T]) -> Result<Self> {
        let mut image = Self::new(channels, rows, cols)?;
        image.initialize(Initializer::Values(values))?;
        Ok(image)
    }

    /// Fills the underlying storage. Transforms already recorded stay in place.
    pub fn initialize(&mut self, init: Initializer<'_, T>) -> Result<()> {
        self.view.storage_mut().initialize(init)
    }

    pub fn pad(&mut self, left: usize, top: usize, right: usize, bottom: usize) -> Result<()> {
        self.apply(Transform::Pad {
            left,
            top,
            right,
            bottom,
        })
    }

    pub fn upsample(&mut self, scale_x: usize, scale_y: usize) -> Result<()> {
        self.apply(Transform::Upsample { scale_x, scale_y })
    }

    pub fn downsample(&mut self, scale_x: usize, scale_y: usize) -> Result<()> {
        self.apply(Transform::Downsample { scale_x, scale_y })
    }

    /// Records any transform on the image lineage.
    pub fn apply(&mut self, transform: Transform) -> Result<()> {
        self.view.apply(transform).map(|_| ())
    }

    /// Removes the most recent transform, if any.
    pub fn undo(&mut self) -> Option<Transform> {
        self.view.lineage_mut().undo_last()
    }

    /// Returns the logical value at `(channel, row, col)`.
    ///
    /// Any row and col are accepted: coordinates on a pad border, in an upsample gap or beyond the
    /// current extent resolve to zero.
    pub fn value_at(&self, channel: usize, row: usize, col: usize) -> Result<T> {
        self.view.check_leading(&[channel])?;
        Ok(self.resolve(channel, row, col))
    }

    #[inline]
    pub(crate) fn resolve(&self, channel: usize, row: usize, col: usize) -> T {
        self.view.resolve(&[channel], row, col)
    }

    /// Copies the current logical image into fresh storage with an empty lineage.
    pub fn materialize(&self) -> Result<Self> {
        let extent = self.extent();
        let values = self.values().collect::<Vec<_>>();

        Self::from_values(self.channels(), extent.rows, extent.cols, &values)
    }
}

impl<T> ImageView<T> {
    pub fn channels(&self) -> usize {
        self.view.leading_dims()[0]
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

    pub(crate) fn storage_mut(&mut self) -> &mut DenseStorage<T> {
        self.view.storage_mut()
    }
}
