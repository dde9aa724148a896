//! Calling contract of the kernel under test.

/// An RGB8 → Gray8 converter.
///
/// Mirrors the fixed signature of the routines this harness was built to
/// measure: destination base and row stride, source base and row stride,
/// then the logical width and height in pixels. Strides are in bytes.
///
/// An implementation must write exactly `width × height` samples laid out
/// by `dst_stride` and read exactly `width × height` RGB triples laid out
/// by `src_stride`. It returns nothing; the harness judges it only by
/// comparing `dst` against the oracle.
///
/// Closures with the same argument list implement this trait, so a kernel
/// written as a plain function can be passed directly:
///
/// ```
/// use graybench::GrayKernel;
///
/// fn red_only(dst: &mut [u8], ds: usize, src: &[u8], ss: usize, w: usize, h: usize) {
///     for y in 0..h {
///         for x in 0..w {
///             dst[y * ds + x] = src[y * ss + x * 3];
///         }
///     }
/// }
///
/// let mut kernel = red_only;
/// let mut out = [0u8; 2];
/// kernel.convert(&mut out, 2, &[9, 0, 0, 7, 0, 0], 6, 2, 1);
/// assert_eq!(out, [9, 7]);
/// ```
pub trait GrayKernel {
    /// Convert `height` rows of `width` pixels from `src` into `dst`.
    fn convert(
        &mut self,
        dst: &mut [u8],
        dst_stride: usize,
        src: &[u8],
        src_stride: usize,
        width: usize,
        height: usize,
    );
}

impl<F> GrayKernel for F
where
    F: FnMut(&mut [u8], usize, &[u8], usize, usize, usize),
{
    #[inline]
    fn convert(
        &mut self,
        dst: &mut [u8],
        dst_stride: usize,
        src: &[u8],
        src_stride: usize,
        width: usize,
        height: usize,
    ) {
        self(dst, dst_stride, src, src_stride, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_counts_calls() {
        let mut calls = 0;
        let mut kernel = |dst: &mut [u8], _: usize, _: &[u8], _: usize, w: usize, _: usize| {
            calls += 1;
            dst[..w].fill(1);
        };
        let mut dst = [0u8; 3];
        kernel.convert(&mut dst, 3, &[0; 9], 9, 3, 1);
        kernel.convert(&mut dst, 3, &[0; 9], 9, 3, 1);
        assert_eq!(dst, [1, 1, 1]);
        assert_eq!(calls, 2);
    }

    #[test]
    fn dyn_kernel_by_reference() {
        fn invert(dst: &mut [u8], _: usize, src: &[u8], _: usize, w: usize, _: usize) {
            for x in 0..w {
                dst[x] = !src[x * 3];
            }
        }
        let mut f = invert;
        let kernel: &mut dyn GrayKernel = &mut f;
        let mut dst = [0u8; 1];
        kernel.convert(&mut dst, 1, &[0x0F, 0, 0], 3, 1, 1);
        assert_eq!(dst, [0xF0]);
    }
}
