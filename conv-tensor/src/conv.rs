use super::*;

/// Zero border added around the input image before convolving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Padding {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl Padding {
    pub fn uniform(size: usize) -> Self {
        Self {
            left: size,
            top: size,
            right: size,
            bottom: size,
        }
    }

    fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Horizontal and vertical sampling factors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scale {
    pub x: usize,
    pub y: usize,
}

impl Scale {
    pub const ONE: Scale = Scale { x: 1, y: 1 };

    pub fn uniform(factor: usize) -> Self {
        Self {
            x: factor,
            y: factor,
        }
    }

    fn is_one(&self) -> bool {
        *self == Self::ONE
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::ONE
    }
}

/// Spatial transforms wrapped around a single convolution. The default is a plain valid
/// convolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvParams {
    /// Applied to the image first.
    pub input_upsample: Scale,
    /// Applied to the image after upsampling.
    pub padding: Padding,
    /// Dilates the filter.
    pub filter_upsample: Scale,
    /// Recorded lazily on the result.
    pub output_downsample: Scale,
}

/// Convolves `image` with `filter` as a single `filter_matrix x toeplitz_matrix` product.
///
/// Input transforms are recorded on the views for the duration of the call and removed again
/// before returning, whether the call succeeds or not. The returned image owns freshly computed
/// storage with the output downsample, if any, recorded on its lineage.
pub fn conv2d<T: Element>(
    image: &mut ImageView<T>,
    filter: &mut FilterView<T>,
    params: &ConvParams,
) -> Result<ImageView<T>> {
    let mut output = with_conv_operands(image, filter, params, convolve)?;
    if !params.output_downsample.is_one() {
        output.downsample(params.output_downsample.x, params.output_downsample.y)?;
    }

    log::debug!(
        "conv2d produced {} channels of {}",
        output.channels(),
        output.extent()
    );

    Ok(output)
}

/// Runs `body` on the image and filter exactly as [`conv2d`] multiplies them: the image upsampled
/// then padded, the filter dilated. Identity factors are not recorded.
///
/// Both views get their lineage back before this returns, including when a transform or `body`
/// fails.
pub fn with_conv_operands<T: Element, R>(
    image: &mut ImageView<T>,
    filter: &mut FilterView<T>,
    params: &ConvParams,
    body: impl FnOnce(&ImageView<T>, &FilterView<T>) -> Result<R>,
) -> Result<R> {
    if image.channels() != filter.in_channels() {
        return Err(TensorError::DimensionMismatch(format!(
            "image has {} channels, filter expects {}",
            image.channels(),
            filter.in_channels()
        )));
    }

    let mut image_transforms = Vec::new();
    if !params.input_upsample.is_one() {
        image_transforms.push(Transform::Upsample {
            scale_x: params.input_upsample.x,
            scale_y: params.input_upsample.y,
        });
    }
    if !params.padding.is_zero() {
        let Padding {
            left,
            top,
            right,
            bottom,
        } = params.padding;
        image_transforms.push(Transform::Pad {
            left,
            top,
            right,
            bottom,
        });
    }

    let image_applied = apply_all(image, &image_transforms)?;

    let filter_applied = if params.filter_upsample.is_one() {
        Ok(0)
    } else {
        filter
            .upsample(params.filter_upsample.x, params.filter_upsample.y)
            .map(|_| 1)
    };

    let result = filter_applied.and_then(|applied| {
        let output = body(image, filter);
        for _ in 0..applied {
            filter.undo();
        }
        output
    });

    for _ in 0..image_applied {
        image.undo();
    }

    result
}

/// Applies transforms in order, rolling back on the first failure. Returns how many were applied.
fn apply_all<T: Element>(image: &mut ImageView<T>, transforms: &[Transform]) -> Result<usize> {
    for (applied, transform) in transforms.iter().enumerate() {
        if let Err(err) = image.apply(*transform) {
            for _ in 0..applied {
                image.undo();
            }
            return Err(err);
        }
    }
    Ok(transforms.len())
}

fn convolve<T: Element>(image: &ImageView<T>, filter: &FilterView<T>) -> Result<ImageView<T>> {
    let filter_matrix = MatrixView::from_filter(filter);
    let image_matrix = MatrixView::toeplitz(image, filter)?;

    let extent = image_matrix
        .geometry()
        .map(ConvGeometry::output_extent)
        .ok_or_else(|| TensorError::DimensionMismatch("missing convolution geometry".to_string()))?;

    log::debug!(
        "conv2d: image {} x {}, filter {} x {}, output {extent}",
        image.channels(),
        image.extent(),
        filter.out_channels(),
        filter.extent()
    );

    let mut output = ImageView::new(filter.out_channels(), extent.rows, extent.cols)?;
    multiply(
        &filter_matrix,
        &image_matrix,
        &mut OutputMatrix::new(&mut output)?,
    )?;

    Ok(output)
}
