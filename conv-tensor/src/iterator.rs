use super::*;

/// An iterator over the logical values of a view in row-major order of its current shape.
///
/// Leading (channel) dimensions are walked outermost, followed by the transformed rows and cols.
pub struct ValuesIter<'a, T> {
    view: &'a LazyView<T>,
    leading: Shape,
    row: usize,
    col: usize,
    is_done: bool,
}

impl<'a, T: Element> ValuesIter<'a, T> {
    pub(crate) fn new(view: &'a LazyView<T>) -> Self {
        Self {
            view,
            leading: smallvec![0; view.leading_dims().len()],
            row: 0,
            col: 0,
            is_done: false,
        }
    }

    /// Moves to the next coordinate, carrying into more significant dimensions.
    fn advance(&mut self) {
        let extent = self.view.extent();

        self.col += 1;
        if self.col < extent.cols {
            return;
        }
        self.col = 0;

        self.row += 1;
        if self.row < extent.rows {
            return;
        }
        self.row = 0;

        let dims = self.view.leading_dims();
        let mut dim = dims.len();
        loop {
            if dim == 0 {
                self.is_done = true;
                break;
            }
            dim -= 1;

            self.leading[dim] += 1;
            if self.leading[dim] < dims[dim] {
                break;
            }
            self.leading[dim] = 0;
        }
    }
}

impl<T: Element> Iterator for ValuesIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_done {
            return None;
        }

        let item = self.view.resolve(&self.leading, self.row, self.col);
        self.advance();

        Some(item)
    }
}

impl<T: Element> ImageView<T> {
    /// Returns an iterator over logical values in `(channel, row, col)` order.
    pub fn values(&self) -> ValuesIter<'_, T> {
        ValuesIter::new(self.lazy_view())
    }
}

impl<T: Element> FilterView<T> {
    /// Returns an iterator over logical values in `(out_channel, in_channel, row, col)` order.
    pub fn values(&self) -> ValuesIter<'_, T> {
        ValuesIter::new(self.lazy_view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_values() -> Result<()> {
        let mut image = ImageView::<i32>::new(2, 2, 2)?;
        image.initialize(Initializer::Sequential(1))?;

        assert_eq!(image.values().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6, 7, 8]);

        image.pad(0, 0, 1, 0)?;
        assert_eq!(
            image.values().collect::<Vec<_>>(),
            vec![1, 2, 0, 3, 4, 0, 5, 6, 0, 7, 8, 0]
        );

        Ok(())
    }

    #[test]
    fn test_filter_values() -> Result<()> {
        let mut filter = FilterView::<i32>::new(2, 2, 2, 1)?;
        filter.initialize(Initializer::Sequential(0))?;
        filter.downsample(1, 2)?;

        assert_eq!(filter.values().collect::<Vec<_>>(), vec![0, 2, 4, 6]);

        Ok(())
    }
}
