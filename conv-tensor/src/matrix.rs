use super::*;

/// Anything which can be read as a dense 2D matrix.
pub trait MatrixSource<T> {
    fn matrix_rows(&self) -> usize;

    fn matrix_cols(&self) -> usize;

    /// Value at `(row, col)`. Both must be within `matrix_rows()` and `matrix_cols()`.
    fn matrix_value_at(&self, row: usize, col: usize) -> T;
}

/// Dimensions derived from an image and a filter when a convolution is laid out as a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvGeometry {
    pub filter_rows: usize,
    pub filter_cols: usize,
    pub in_channels: usize,
    pub out_channels: usize,
    pub output_rows: usize,
    pub output_cols: usize,
}

impl ConvGeometry {
    /// Computes the valid-convolution output extent of the image's current shape.
    /// Returns an error if the filter window does not fit inside the image.
    pub fn new<T>(image: &ImageView<T>, filter: &FilterView<T>) -> Result<Self> {
        let (image_extent, filter_extent) = (image.extent(), filter.extent());

        if filter_extent.rows > image_extent.rows || filter_extent.cols > image_extent.cols {
            return Err(TensorError::DimensionMismatch(format!(
                "filter window {filter_extent} does not fit into image {image_extent}"
            )));
        }

        Ok(Self {
            filter_rows: filter_extent.rows,
            filter_cols: filter_extent.cols,
            in_channels: filter.in_channels(),
            out_channels: filter.out_channels(),
            output_rows: image_extent.rows - filter_extent.rows + 1,
            output_cols: image_extent.cols - filter_extent.cols + 1,
        })
    }

    pub fn window_area(&self) -> usize {
        self.filter_rows * self.filter_cols
    }

    pub fn output_extent(&self) -> Extent {
        Extent::new(self.output_rows, self.output_cols)
    }
}

#[derive(Clone, Copy)]
enum Source<'a, T> {
    Filter(&'a FilterView<T>),
    Toeplitz {
        image: &'a ImageView<T>,
        geometry: ConvGeometry,
    },
    Image(&'a ImageView<T>),
}

/// A read-only 2D interpretation of a borrowed image or filter view.
///
/// The matrix keeps a shared borrow of its view, so the view's lineage cannot change while the
/// matrix is alive; derive a new matrix after recording further transforms.
#[derive(Clone, Copy)]
pub struct MatrixView<'a, T> {
    source: Source<'a, T>,
    rows: usize,
    cols: usize,
}

impl<'a, T: Element> MatrixView<'a, T> {
    /// One row per output channel holding the flattened `(in_channel, row, col)` kernel.
    ///
    /// Views refuse transforms whose element count overflows `usize`, so the column count always
    /// fits.
    pub fn from_filter(filter: &'a FilterView<T>) -> Self {
        let rows = filter.out_channels();
        let cols = filter.in_channels() * filter.extent().area();

        log::debug!("filter matrix {rows}x{cols} over lineage depth {}", filter.lineage().depth());

        Self {
            source: Source::Filter(filter),
            rows,
            cols,
        }
    }

    /// Toeplitz (im2col) matrix: every column is one flattened receptive field window of the
    /// image, ordered by `(channel, window_row, window_col)`.
    ///
    /// The filter is only consulted for its current extent and channel counts. The window fits
    /// inside the image, so the row count is bounded by the image's element count.
    pub fn toeplitz(image: &'a ImageView<T>, filter: &FilterView<T>) -> Result<Self> {
        let geometry = ConvGeometry::new(image, filter)?;
        let rows = geometry.window_area() * image.channels();
        let cols = geometry.output_extent().area();

        log::debug!(
            "toeplitz matrix {rows}x{cols}: window {}x{}, output {}",
            geometry.filter_rows,
            geometry.filter_cols,
            geometry.output_extent()
        );

        Ok(Self {
            source: Source::Toeplitz { image, geometry },
            rows,
            cols,
        })
    }

    /// One row per channel holding the flattened logical `(row, col)` plane.
    pub fn from_image(image: &'a ImageView<T>) -> Self {
        Self {
            source: Source::Image(image),
            rows: image.channels(),
            cols: image.extent().area(),
        }
    }

    /// Mapped value at `(row, col)`.
    ///
    /// # Panics
    /// May panic when `row` or `col` is outside the matrix; see [`MatrixView::get`].
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> T {
        match self.source {
            Source::Filter(filter) => {
                let extent = filter.extent();
                let plane = extent.area();
                let within = col % plane;

                filter.resolve(row, col / plane, within / extent.cols, within % extent.cols)
            }
            Source::Toeplitz { image, geometry } => {
                let window = geometry.window_area();
                let channel = row / window;
                let (offset_row, offset_col) = divmod(row % window, geometry.filter_cols);
                let (origin_row, origin_col) = divmod(col, geometry.output_cols);

                image.resolve(channel, origin_row + offset_row, origin_col + offset_col)
            }
            Source::Image(image) => {
                let (r, c) = divmod(col, image.current_cols());
                image.resolve(row, r, c)
            }
        }
    }

    /// Checked variant of [`MatrixView::at`].
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        check_bounds(row, col, self.rows, self.cols)?;
        Ok(self.at(row, col))
    }

    /// Convolution dimensions, available for Toeplitz matrices only.
    pub fn geometry(&self) -> Option<&ConvGeometry> {
        match &self.source {
            Source::Toeplitz { geometry, .. } => Some(geometry),
            _ => None,
        }
    }
}

impl<T> MatrixView<'_, T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl<T: Element> MatrixSource<T> for MatrixView<'_, T> {
    fn matrix_rows(&self) -> usize {
        self.rows
    }

    fn matrix_cols(&self) -> usize {
        self.cols
    }

    fn matrix_value_at(&self, row: usize, col: usize) -> T {
        self.at(row, col)
    }
}

/// Writable `channels x (rows * cols)` matrix over an image which has not been transformed yet.
///
/// Reads and writes address the physical buffer directly and never pass through a lineage.
pub struct OutputMatrix<'a, T> {
    image: &'a mut ImageView<T>,
    rows: usize,
    cols: usize,
}

impl<'a, T: Element> OutputMatrix<'a, T> {
    /// Returns an error if the image already has recorded transforms.
    pub fn new(image: &'a mut ImageView<T>) -> Result<Self> {
        let depth = image.lineage().depth();
        if depth > 0 {
            return Err(TensorError::LazyOutput { depth });
        }

        let rows = image.channels();
        let cols = image.extent().area();

        Ok(Self { image, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// # Panics
    /// Panics when `row` or `col` is outside the matrix.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> T {
        self.image.storage().as_slice()[row * self.cols + col]
    }

    /// # Panics
    /// Panics when `row` or `col` is outside the matrix.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let cols = self.cols;
        self.image.storage_mut().as_mut_slice()[row * cols + col] = value;
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        check_bounds(row, col, self.rows, self.cols)?;
        Ok(self.at(row, col))
    }
}

impl<T: Element> MatrixSource<T> for OutputMatrix<'_, T> {
    fn matrix_rows(&self) -> usize {
        self.rows
    }

    fn matrix_cols(&self) -> usize {
        self.cols
    }

    fn matrix_value_at(&self, row: usize, col: usize) -> T {
        self.at(row, col)
    }
}

#[inline]
fn divmod(value: usize, divisor: usize) -> (usize, usize) {
    (value / divisor, value % divisor)
}

fn check_bounds(row: usize, col: usize, rows: usize, cols: usize) -> Result<()> {
    if row >= rows || col >= cols {
        return Err(TensorError::IndexOutOfRange {
            index: vec![row, col],
            shape: vec![rows, cols],
        });
    }
    Ok(())
}
