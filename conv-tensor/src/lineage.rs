use super::*;

/// Spatial extent of a view: the two trailing dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent {
    pub rows: usize,
    pub cols: usize,
}

impl Extent {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Number of positions. Extents recorded on a [`Lineage`] never overflow here: a transform
    /// whose extent has no representable area is rejected when it is applied.
    pub fn area(&self) -> usize {
        self.rows * self.cols
    }

    pub fn checked_area(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A recorded spatial transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Inserts a zero-filled border.
    Pad {
        left: usize,
        top: usize,
        right: usize,
        bottom: usize,
    },
    /// Inserts `scale - 1` zero rows/cols after every sample.
    Upsample { scale_x: usize, scale_y: usize },
    /// Keeps every `scale_y`-th row and `scale_x`-th col.
    Downsample { scale_x: usize, scale_y: usize },
}

impl Transform {
    /// Computes the extent produced by applying this transform to `extent`.
    fn apply_to(&self, extent: Extent) -> Result<Extent> {
        let overflow = || TensorError::InvalidTransform(format!("{self:?} overflows extent {extent}"));

        let result = match *self {
            Transform::Pad {
                left,
                top,
                right,
                bottom,
            } => {
                let rows = extent
                    .rows
                    .checked_add(top)
                    .and_then(|rows| rows.checked_add(bottom))
                    .ok_or_else(overflow)?;
                let cols = extent
                    .cols
                    .checked_add(left)
                    .and_then(|cols| cols.checked_add(right))
                    .ok_or_else(overflow)?;

                Extent::new(rows, cols)
            }
            Transform::Upsample { scale_x, scale_y } => {
                self.check_scale(scale_x, scale_y)?;

                let rows = extent.rows.checked_mul(scale_y).ok_or_else(overflow)?;
                let cols = extent.cols.checked_mul(scale_x).ok_or_else(overflow)?;

                Extent::new(rows, cols)
            }
            Transform::Downsample { scale_x, scale_y } => {
                self.check_scale(scale_x, scale_y)?;

                if extent.rows % scale_y != 0 || extent.cols % scale_x != 0 {
                    return Err(TensorError::NonIntegerDownsample {
                        rows: extent.rows,
                        cols: extent.cols,
                        scale_x,
                        scale_y,
                    });
                }

                Extent::new(extent.rows / scale_y, extent.cols / scale_x)
            }
        };

        result.checked_area().ok_or_else(overflow)?;

        Ok(result)
    }

    fn check_scale(&self, scale_x: usize, scale_y: usize) -> Result<()> {
        if scale_x == 0 || scale_y == 0 {
            return Err(TensorError::InvalidTransform(format!(
                "{self:?}: scale factors must be at least 1"
            )));
        }
        Ok(())
    }

    /// Maps a coordinate of the post-transform extent `result` one step back.
    /// Returns `None` when the coordinate lands on an inserted zero.
    #[inline]
    fn unwind(&self, row: usize, col: usize, result: Extent) -> Option<(usize, usize)> {
        match *self {
            Transform::Pad {
                left,
                top,
                right,
                bottom,
            } => {
                let border = row < top
                    || col < left
                    || row >= result.rows - bottom
                    || col >= result.cols - right;

                (!border).then(|| (row - top, col - left))
            }
            Transform::Upsample { scale_x, scale_y } => {
                let gap = row % scale_y != 0 || col % scale_x != 0;

                (!gap).then(|| (row / scale_y, col / scale_x))
            }
            Transform::Downsample { scale_x, scale_y } => Some((row * scale_y, col * scale_x)),
        }
    }
}

/// Ordered stack of applied transforms, each paired with the extent it produced.
///
/// The paired extents are computed once when a transform is pushed: every transform depends only
/// on the extent right before it, so the cached value stays correct however the stack is later
/// unwound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lineage {
    base: Extent,
    steps: Vec<(Transform, Extent)>,
}

impl Lineage {
    pub fn new(base: Extent) -> Self {
        Self {
            base,
            steps: Vec::new(),
        }
    }

    /// Extent of the untransformed storage.
    pub fn base(&self) -> Extent {
        self.base
    }

    /// Current logical extent.
    pub fn extent(&self) -> Extent {
        self.steps.last().map_or(self.base, |(_, extent)| *extent)
    }

    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Transform, Extent)> {
        self.steps.iter()
    }

    /// Validates and records a transform, returning the new logical extent.
    /// The lineage is left untouched when validation fails.
    pub fn apply(&mut self, transform: Transform) -> Result<Extent> {
        let extent = transform.apply_to(self.extent())?;
        self.steps.push((transform, extent));

        log::trace!("lineage push {transform:?} -> {extent} (depth {})", self.steps.len());

        Ok(extent)
    }

    /// Removes the most recent transform. Does nothing on an empty lineage.
    pub fn undo_last(&mut self) -> Option<Transform> {
        let (transform, _) = self.steps.pop()?;

        log::trace!("lineage pop {transform:?} -> {} (depth {})", self.extent(), self.steps.len());

        Some(transform)
    }

    /// Translates a logical coordinate into a physical one by unwinding transforms from the tail.
    ///
    /// Returns `None` for coordinates which resolve to the zero fill: pad borders, upsample gaps
    /// and anything outside the current extent. Costs O(depth) and never fails.
    #[inline]
    pub fn resolve(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        if !self.extent().contains(row, col) {
            return None;
        }

        self.steps
            .iter()
            .rev()
            .try_fold((row, col), |(row, col), (transform, extent)| {
                transform.unwind(row, col, *extent)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_by_five() -> Lineage {
        Lineage::new(Extent::new(5, 5))
    }

    #[test]
    fn can_track_shape_algebra() -> Result<()> {
        let mut lineage = five_by_five();

        let padded = lineage.apply(Transform::Pad {
            left: 1,
            top: 1,
            right: 1,
            bottom: 1,
        })?;
        assert_eq!(padded, Extent::new(7, 7));

        let upsampled = lineage.apply(Transform::Upsample {
            scale_x: 2,
            scale_y: 2,
        })?;
        assert_eq!(upsampled, Extent::new(14, 14));

        let downsampled = lineage.apply(Transform::Downsample {
            scale_x: 2,
            scale_y: 2,
        })?;
        assert_eq!(downsampled, Extent::new(7, 7));
        assert_eq!(lineage.depth(), 3);

        for _ in 0..3 {
            assert!(lineage.undo_last().is_some());
        }
        assert_eq!(lineage.extent(), Extent::new(5, 5));
        assert!(lineage.is_empty());

        Ok(())
    }

    #[test]
    fn uses_asymmetric_margins_and_scales() -> Result<()> {
        let mut lineage = Lineage::new(Extent::new(4, 6));

        let extent = lineage.apply(Transform::Pad {
            left: 2,
            top: 0,
            right: 1,
            bottom: 3,
        })?;
        assert_eq!(extent, Extent::new(7, 9));

        let extent = lineage.apply(Transform::Upsample {
            scale_x: 1,
            scale_y: 3,
        })?;
        assert_eq!(extent, Extent::new(21, 9));

        Ok(())
    }

    #[test]
    fn undo_on_empty_is_noop() {
        let mut lineage = five_by_five();
        assert_eq!(lineage.undo_last(), None);
        assert_eq!(lineage.extent(), Extent::new(5, 5));
    }

    #[test]
    fn rejects_non_integer_downsample() {
        let mut lineage = five_by_five();

        let result = lineage.apply(Transform::Downsample {
            scale_x: 3,
            scale_y: 3,
        });

        assert_eq!(
            result,
            Err(TensorError::NonIntegerDownsample {
                rows: 5,
                cols: 5,
                scale_x: 3,
                scale_y: 3
            })
        );
        assert!(lineage.is_empty());
    }

    #[test]
    fn rejects_zero_scale() {
        let mut lineage = five_by_five();

        assert!(matches!(
            lineage.apply(Transform::Upsample {
                scale_x: 0,
                scale_y: 1
            }),
            Err(TensorError::InvalidTransform(_))
        ));
        assert!(matches!(
            lineage.apply(Transform::Downsample {
                scale_x: 1,
                scale_y: 0
            }),
            Err(TensorError::InvalidTransform(_))
        ));
        assert!(lineage.is_empty());
    }

    #[test]
    fn rejects_overflowing_extent() {
        let mut lineage = five_by_five();

        assert!(matches!(
            lineage.apply(Transform::Upsample {
                scale_x: usize::MAX,
                scale_y: 1
            }),
            Err(TensorError::InvalidTransform(_))
        ));
        assert!(lineage.is_empty());
    }

    #[test]
    fn rejects_overflowing_area() {
        let mut lineage = Lineage::new(Extent::new(2, 2));

        // each side fits, their product does not
        assert!(matches!(
            lineage.apply(Transform::Upsample {
                scale_x: usize::MAX / 2,
                scale_y: 2
            }),
            Err(TensorError::InvalidTransform(_))
        ));
        assert!(lineage.is_empty());
    }

    #[test]
    fn resolves_through_pad() -> Result<()> {
        let mut lineage = five_by_five();
        lineage.apply(Transform::Pad {
            left: 2,
            top: 1,
            right: 0,
            bottom: 1,
        })?;

        assert_eq!(lineage.resolve(0, 3), None);
        assert_eq!(lineage.resolve(1, 1), None);
        assert_eq!(lineage.resolve(6, 3), None);
        assert_eq!(lineage.resolve(1, 2), Some((0, 0)));
        assert_eq!(lineage.resolve(5, 6), Some((4, 4)));

        Ok(())
    }

    #[test]
    fn resolves_through_upsample_and_downsample() -> Result<()> {
        let mut lineage = five_by_five();
        lineage.apply(Transform::Upsample {
            scale_x: 2,
            scale_y: 3,
        })?;

        assert_eq!(lineage.resolve(3, 4), Some((1, 2)));
        assert_eq!(lineage.resolve(1, 4), None);
        assert_eq!(lineage.resolve(3, 3), None);

        lineage.apply(Transform::Downsample {
            scale_x: 2,
            scale_y: 3,
        })?;

        // downsample by the same factors undoes the gaps entirely
        for row in 0..5 {
            for col in 0..5 {
                assert_eq!(lineage.resolve(row, col), Some((row, col)));
            }
        }

        Ok(())
    }

    #[test]
    fn resolves_outside_extent_to_fill() -> Result<()> {
        let mut lineage = five_by_five();
        assert_eq!(lineage.resolve(5, 0), None);
        assert_eq!(lineage.resolve(0, 5), None);

        lineage.apply(Transform::Downsample {
            scale_x: 5,
            scale_y: 5,
        })?;
        assert_eq!(lineage.resolve(0, 0), Some((0, 0)));
        assert_eq!(lineage.resolve(1, 0), None);

        Ok(())
    }
}
