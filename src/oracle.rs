//! Reference RGB8 → Gray8 conversion.
//!
//! This is the definition of a correct kernel. Each output sample is
//!
//! ```text
//! Y = (77·R + 150·G + 29·B) >> 8
//! ```
//!
//! The weights sum to 256 (fixed-point 1.0) and approximate the BT.601
//! luma coefficients 0.299 / 0.587 / 0.114. Only integer arithmetic is
//! used, so the result is bit-exact on every target.

use rgb::Rgb;

use crate::buffer::{BufferError, PlaneMut, PlaneRef, SampleLayout};
use crate::kernel::GrayKernel;

/// Fixed-point weight of the red channel.
pub const WEIGHT_R: u32 = 77;
/// Fixed-point weight of the green channel.
pub const WEIGHT_G: u32 = 150;
/// Fixed-point weight of the blue channel.
pub const WEIGHT_B: u32 = 29;
/// Right shift that renormalizes the weighted sum.
pub const WEIGHT_SHIFT: u32 = 8;

const _: () = assert!(WEIGHT_R + WEIGHT_G + WEIGHT_B == 1 << WEIGHT_SHIFT);

/// Luma of one pixel, `floor((77·R + 150·G + 29·B) / 256)`.
#[inline]
pub const fn luma(px: Rgb<u8>) -> u8 {
    let sum = WEIGHT_R * px.r as u32 + WEIGHT_G * px.g as u32 + WEIGHT_B * px.b as u32;
    (sum >> WEIGHT_SHIFT) as u8
}

/// Convert `src` into `dst`, row by row from the top.
///
/// Only the logical `width × rows` region is read and written; row padding
/// on either side is left alone.
///
/// # Panics
///
/// Panics if `src` is not RGB8, `dst` is not Gray8, or the two planes
/// differ in width or row count.
pub fn rgb_to_gray_ref(dst: &mut PlaneMut<'_>, src: &PlaneRef<'_>) {
    assert_eq!(dst.layout(), SampleLayout::Gray8, "destination is not Gray8");
    assert!(
        dst.width() == src.width() && dst.rows() == src.rows(),
        "shape mismatch: dst {}x{}, src {}x{}",
        dst.width(),
        dst.rows(),
        src.width(),
        src.rows()
    );
    for y in 0..src.rows() {
        let src_row = src.rgb_row(y);
        for (out, px) in dst.row_mut(y).iter_mut().zip(src_row) {
            *out = luma(*px);
        }
    }
}

/// [`rgb_to_gray_ref`] over the raw kernel calling convention.
///
/// # Errors
///
/// Returns a [`BufferError`] if either stride is too small for `width` or
/// either slice is too short for `height` rows.
pub fn rgb_to_gray_ref_raw(
    dst: &mut [u8],
    dst_stride: usize,
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
) -> Result<(), BufferError> {
    let src = PlaneRef::new(src, width, height, src_stride, SampleLayout::Rgb8)?;
    let mut dst = PlaneMut::new(dst, width, height, dst_stride, SampleLayout::Gray8)?;
    rgb_to_gray_ref(&mut dst, &src);
    Ok(())
}

/// The oracle wearing the kernel interface.
///
/// Useful as a known-good kernel when bringing the harness up on a new
/// target, or as the baseline row in a comparison.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceKernel;

impl GrayKernel for ReferenceKernel {
    fn convert(
        &mut self,
        dst: &mut [u8],
        dst_stride: usize,
        src: &[u8],
        src_stride: usize,
        width: usize,
        height: usize,
    ) {
        // The harness validates planes before calling; a bad call here is a
        // caller bug and leaves `dst` untouched.
        let _ = rgb_to_gray_ref_raw(dst, dst_stride, src, src_stride, width, height);
    }
}
