//! Runs one lazily transformed convolution on sequential sample data and prints every stage.

use anyhow::{Context, Result};
use clap::Parser;
use conv_tensor::{
    ConvParams, FilterView, ImageView, Initializer, MatrixView, Padding, Scale, conv2d,
    with_conv_operands,
};

#[derive(Parser, Debug)]
#[command(name = "conv-cli")]
#[command(about = "Convolve sample data through lazily padded and resampled tensor views")]
#[command(version)]
struct Cli {
    /// Input image channels
    #[arg(long, default_value_t = 2)]
    channels: usize,

    /// Input image rows
    #[arg(long, default_value_t = 5)]
    rows: usize,

    /// Input image cols
    #[arg(long, default_value_t = 5)]
    cols: usize,

    /// Output channels of the filter bank
    #[arg(long, default_value_t = 3)]
    out_channels: usize,

    /// Filter rows
    #[arg(long, default_value_t = 3)]
    filter_rows: usize,

    /// Filter cols
    #[arg(long, default_value_t = 3)]
    filter_cols: usize,

    /// Zero padding on every side of the (upsampled) input image
    #[arg(long, default_value_t = 1)]
    pad: usize,

    /// Input image upsampling factor
    #[arg(long, default_value_t = 1)]
    upsample: usize,

    /// Filter upsampling (dilation) factor
    #[arg(long, default_value_t = 1)]
    dilation: usize,

    /// Output downsampling factor
    #[arg(long, default_value_t = 1)]
    downsample: usize,

    /// Also print the filter and Toeplitz matrices
    #[arg(long)]
    show_matrices: bool,
}

impl Cli {
    fn params(&self) -> ConvParams {
        ConvParams {
            input_upsample: Scale::uniform(self.upsample),
            padding: Padding::uniform(self.pad),
            filter_upsample: Scale::uniform(self.dilation),
            output_downsample: Scale::uniform(self.downsample),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    log::debug!("{cli:?}");

    let mut image = ImageView::<i64>::new(cli.channels, cli.rows, cli.cols)
        .context("Failed to allocate input image")?;
    image.initialize(Initializer::Sequential(0))?;

    let mut filter =
        FilterView::<i64>::new(cli.out_channels, cli.channels, cli.filter_rows, cli.filter_cols)
            .context("Failed to allocate filter bank")?;
    filter.initialize(Initializer::Sequential(0))?;

    println!("Input image:\n{image}");
    println!("Filter:\n{filter}");

    let params = cli.params();

    if cli.show_matrices {
        show_matrices(&mut image, &mut filter, &params)?;
    }

    let output = conv2d(&mut image, &mut filter, &params).context("Convolution failed")?;

    println!("Output image:\n{output}");

    Ok(())
}

/// Prints the two operands of the product the convolution is computed with.
fn show_matrices(
    image: &mut ImageView<i64>,
    filter: &mut FilterView<i64>,
    params: &ConvParams,
) -> Result<()> {
    with_conv_operands(image, filter, params, |image, filter| {
        let filter_matrix = MatrixView::from_filter(filter);
        let image_matrix = MatrixView::toeplitz(image, filter)?;

        println!("Filter matrix:\n{filter_matrix}");
        println!("Toeplitz matrix:\n{image_matrix}");

        Ok(())
    })
    .context("Failed to build convolution matrices")
}
