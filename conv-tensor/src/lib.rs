//! Library crate for conv_tensor
//!
//! Views record spatial transforms instead of applying them. An [`ImageView`] or [`FilterView`]
//! keeps its original dense buffer and a [`Lineage`]: a stack of pad, upsample and downsample
//! records, each paired with the extent it produced. Reading a logical coordinate walks that stack
//! from the newest record backwards until it lands either on a physical element or on an inserted
//! zero.
//!
//! A [`MatrixView`] borrows an image or a filter and reinterprets it as a 2D matrix, so that a
//! convolution becomes the single product `filter_matrix x toeplitz_matrix` computed by
//! [`multiply`]. [`conv2d`] wires the whole pipeline together.
//!
//! # Performance
//! Every element read costs O(lineage depth) and nothing is cached: memory stays flat, but the
//! multiply inner loop recomputes coordinates on every access. Use [`ImageView::materialize`] when
//! a heavily transformed view is read many times.

use num_traits::Num;
use smallvec::{SmallVec, smallvec};
use std::fmt;
use std::ops::AddAssign;

mod conv;
mod display;
mod error;
mod filter;
mod image;
mod iterator;
mod lineage;
mod matmul;
mod matrix;
mod misc;
mod storage;
mod view;

pub use crate::conv::{ConvParams, Padding, Scale, conv2d, with_conv_operands};
pub use crate::error::TensorError;
pub use crate::filter::FilterView;
pub use crate::image::ImageView;
pub use crate::iterator::ValuesIter;
pub use crate::lineage::{Extent, Lineage, Transform};
pub use crate::matmul::multiply;
pub use crate::matrix::{ConvGeometry, MatrixSource, MatrixView, OutputMatrix};
pub use crate::storage::{DenseStorage, Initializer};

use crate::view::LazyView;

pub type Result<T> = std::result::Result<T, error::TensorError>;

/// Extents and strides of a dense storage. Views are at most rank 4, so they stay inline.
type Shape = SmallVec<[usize; 4]>;

/// Scalar stored in tensors and views.
///
/// Blanket-implemented for every copyable numeric type with `+=`, so `i32`, `i64`, `f32` and
/// `f64` all qualify.
pub trait Element: Copy + Num + AddAssign + fmt::Debug + fmt::Display {}

impl<T> Element for T where T: Copy + Num + AddAssign + fmt::Debug + fmt::Display {}
