//! Row-strided image views and the fixed-capacity frame store.
//!
//! [`PlaneRef`] and [`PlaneMut`] are validated, borrowed views over byte
//! storage: a base slice, a logical width and row count, and a byte stride
//! that may exceed the logical row width (row padding). [`FrameStore`] owns
//! every buffer the harness touches and hands out views sized for one
//! [`SizeDescriptor`](crate::SizeDescriptor) at a time.

use core::fmt;

use rgb::{ComponentBytes, FromSlice, Rgb};

// ---------------------------------------------------------------------------
// SampleLayout
// ---------------------------------------------------------------------------

/// Samples per pixel of a plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
#[repr(u8)]
pub enum SampleLayout {
    /// Single 8-bit luminance sample.
    Gray8 = 1,
    /// Interleaved 8-bit red, green, blue.
    Rgb8 = 3,
}

impl SampleLayout {
    /// Bytes per pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self as usize
    }

    /// Minimum row stride for `width` pixels, or `None` on overflow.
    #[inline]
    pub const fn min_stride(self, width: usize) -> Option<usize> {
        width.checked_mul(self.bytes_per_pixel())
    }
}

// ---------------------------------------------------------------------------
// BufferError
// ---------------------------------------------------------------------------

/// Errors from plane construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum BufferError {
    /// Data slice is too small for the given dimensions and stride.
    InsufficientData,
    /// Stride is smaller than `width * bytes_per_pixel`.
    StrideTooSmall,
    /// Width, height or stride arithmetic overflows.
    InvalidDimensions,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData => {
                write!(f, "data slice is too small for the given dimensions")
            }
            Self::StrideTooSmall => write!(f, "stride is smaller than width * bytes_per_pixel"),
            Self::InvalidDimensions => write!(f, "width, height or stride causes overflow"),
        }
    }
}

impl core::error::Error for BufferError {}

/// Bytes needed to address `rows` rows: every row but the last spans a
/// full stride, the last only its pixel bytes.
fn required_bytes(rows: usize, stride: usize, min_stride: usize) -> Result<usize, BufferError> {
    if rows == 0 {
        return Ok(0);
    }
    (rows - 1)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(min_stride))
        .ok_or(BufferError::InvalidDimensions)
}

fn validate(
    len: usize,
    width: usize,
    rows: usize,
    stride: usize,
    layout: SampleLayout,
) -> Result<(), BufferError> {
    let min_stride = layout
        .min_stride(width)
        .ok_or(BufferError::InvalidDimensions)?;
    if stride < min_stride {
        return Err(BufferError::StrideTooSmall);
    }
    if len < required_bytes(rows, stride, min_stride)? {
        return Err(BufferError::InsufficientData);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PlaneRef (borrowed, immutable)
// ---------------------------------------------------------------------------

/// Borrowed view of a row-strided image plane.
///
/// Only the first `width * bytes_per_pixel` bytes of each row are pixel
/// data; anything between that and the next row start is padding and is
/// never inspected.
#[derive(Clone, Copy)]
pub struct PlaneRef<'a> {
    data: &'a [u8],
    width: usize,
    rows: usize,
    stride: usize,
    layout: SampleLayout,
}

impl<'a> PlaneRef<'a> {
    /// Create a new plane view with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the stride is smaller than a packed row or the
    /// data does not reach the last pixel of the last row.
    pub fn new(
        data: &'a [u8],
        width: usize,
        rows: usize,
        stride: usize,
        layout: SampleLayout,
    ) -> Result<Self, BufferError> {
        validate(data.len(), width, rows, stride, layout)?;
        Ok(Self {
            data,
            width,
            rows,
            stride,
            layout,
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Sample layout.
    #[inline]
    pub fn layout(&self) -> SampleLayout {
        self.layout
    }

    /// The underlying bytes, starting at the first pixel of row 0.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Pixel bytes for row `y` (no padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        assert!(
            y < self.rows,
            "row index {y} out of bounds (rows: {})",
            self.rows
        );
        let start = y * self.stride;
        let len = self.width * self.layout.bytes_per_pixel();
        &self.data[start..start + len]
    }

    /// Row `y` as RGB pixels.
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows` or the plane is not [`SampleLayout::Rgb8`].
    #[inline]
    pub fn rgb_row(&self, y: usize) -> &'a [Rgb<u8>] {
        assert_eq!(self.layout, SampleLayout::Rgb8, "plane is not RGB8");
        self.row(y).as_rgb()
    }

    /// Whether every logical sample equals the corresponding sample of
    /// `other`. Padding is ignored; planes of different shape never match.
    pub fn same_pixels(&self, other: &PlaneRef<'_>) -> bool {
        if self.width != other.width || self.rows != other.rows || self.layout != other.layout {
            return false;
        }
        (0..self.rows).all(|y| self.row(y) == other.row(y))
    }
}

impl fmt::Debug for PlaneRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlaneRef({}x{}, stride {}, {:?})",
            self.width, self.rows, self.stride, self.layout
        )
    }
}

// ---------------------------------------------------------------------------
// PlaneMut (borrowed, mutable)
// ---------------------------------------------------------------------------

/// Mutable borrowed view of a row-strided image plane.
///
/// Same semantics as [`PlaneRef`] but allows writing to rows.
pub struct PlaneMut<'a> {
    data: &'a mut [u8],
    width: usize,
    rows: usize,
    stride: usize,
    layout: SampleLayout,
}

impl<'a> PlaneMut<'a> {
    /// Create a new mutable plane view with validation.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PlaneRef::new`].
    pub fn new(
        data: &'a mut [u8],
        width: usize,
        rows: usize,
        stride: usize,
        layout: SampleLayout,
    ) -> Result<Self, BufferError> {
        validate(data.len(), width, rows, stride, layout)?;
        Ok(Self {
            data,
            width,
            rows,
            stride,
            layout,
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Sample layout.
    #[inline]
    pub fn layout(&self) -> SampleLayout {
        self.layout
    }

    /// Reborrow as an immutable view.
    #[inline]
    pub fn as_plane(&self) -> PlaneRef<'_> {
        PlaneRef {
            data: &self.data[..],
            width: self.width,
            rows: self.rows,
            stride: self.stride,
            layout: self.layout,
        }
    }

    /// The underlying bytes, starting at the first pixel of row 0.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data[..]
    }

    /// Mutable pixel bytes for row `y` (no padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        assert!(
            y < self.rows,
            "row index {y} out of bounds (rows: {})",
            self.rows
        );
        let start = y * self.stride;
        let len = self.width * self.layout.bytes_per_pixel();
        &mut self.data[start..start + len]
    }

    /// Row `y` as mutable RGB pixels.
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows` or the plane is not [`SampleLayout::Rgb8`].
    #[inline]
    pub fn rgb_row_mut(&mut self, y: usize) -> &mut [Rgb<u8>] {
        assert_eq!(self.layout, SampleLayout::Rgb8, "plane is not RGB8");
        self.row_mut(y).as_rgb_mut()
    }
}

impl fmt::Debug for PlaneMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlaneMut({}x{}, stride {}, {:?})",
            self.width, self.rows, self.stride, self.layout
        )
    }
}

// ---------------------------------------------------------------------------
// ImgRef → PlaneRef (zero-copy From impls)
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "imgref"))]
impl<'a> From<imgref::ImgRef<'a, Rgb<u8>>> for PlaneRef<'a> {
    fn from(img: imgref::ImgRef<'a, Rgb<u8>>) -> Self {
        PlaneRef {
            data: img.buf().as_bytes(),
            width: img.width(),
            rows: img.height(),
            stride: img.stride() * SampleLayout::Rgb8.bytes_per_pixel(),
            layout: SampleLayout::Rgb8,
        }
    }
}

#[cfg(any(test, feature = "imgref"))]
impl<'a> From<imgref::ImgRefMut<'a, u8>> for PlaneMut<'a> {
    fn from(img: imgref::ImgRefMut<'a, u8>) -> Self {
        let width = img.width();
        let rows = img.height();
        let stride = img.stride();
        PlaneMut {
            data: img.into_buf(),
            width,
            rows,
            stride,
            layout: SampleLayout::Gray8,
        }
    }
}

// ---------------------------------------------------------------------------
// FrameStore (owned, fixed capacity)
// ---------------------------------------------------------------------------

/// How row strides are chosen when the frame store lends out planes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RowStride {
    /// Rows are packed back to back: stride equals the logical row width.
    #[default]
    Packed,
    /// Rows start at the capacity width, leaving padding after each row.
    Capacity,
}

/// Planes lent out by [`FrameStore::planes`] for one image size.
#[derive(Debug)]
pub struct Planes<'a> {
    /// RGB8 input shared by the oracle and the kernel under test.
    pub src: PlaneMut<'a>,
    /// Gray8 output written by the kernel under test.
    pub dst: PlaneMut<'a>,
    /// Gray8 output written by the oracle.
    pub reference: PlaneMut<'a>,
}

/// Statically sized storage for every buffer the harness uses.
///
/// Capacity is fixed by `MAX_W` × `MAX_H`; nothing is allocated at
/// runtime, so the store can live in a `static` on a target without a heap.
pub struct FrameStore<const MAX_W: usize, const MAX_H: usize> {
    src: [[Rgb<u8>; MAX_W]; MAX_H],
    dst: [[u8; MAX_W]; MAX_H],
    reference: [[u8; MAX_W]; MAX_H],
}

impl<const MAX_W: usize, const MAX_H: usize> FrameStore<MAX_W, MAX_H> {
    /// Zero-filled store.
    pub const fn new() -> Self {
        Self {
            src: [[Rgb { r: 0, g: 0, b: 0 }; MAX_W]; MAX_H],
            dst: [[0; MAX_W]; MAX_H],
            reference: [[0; MAX_W]; MAX_H],
        }
    }

    /// Maximum supported width in pixels.
    pub const fn max_width(&self) -> usize {
        MAX_W
    }

    /// Maximum supported height in pixels.
    pub const fn max_height(&self) -> usize {
        MAX_H
    }

    /// Lend source, destination and reference planes for a `width` ×
    /// `height` image, all starting at the first byte of their storage.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InsufficientData`] if the image does not fit
    /// the store's capacity.
    pub fn planes(
        &mut self,
        width: usize,
        height: usize,
        stride: RowStride,
    ) -> Result<Planes<'_>, BufferError> {
        let row_pixels = match stride {
            RowStride::Packed => width,
            RowStride::Capacity => MAX_W,
        };
        let src_stride = SampleLayout::Rgb8
            .min_stride(row_pixels)
            .ok_or(BufferError::InvalidDimensions)?;
        let src = PlaneMut::new(
            self.src.as_flattened_mut().as_bytes_mut(),
            width,
            height,
            src_stride,
            SampleLayout::Rgb8,
        )?;
        let dst = PlaneMut::new(
            self.dst.as_flattened_mut(),
            width,
            height,
            row_pixels,
            SampleLayout::Gray8,
        )?;
        let reference = PlaneMut::new(
            self.reference.as_flattened_mut(),
            width,
            height,
            row_pixels,
            SampleLayout::Gray8,
        )?;
        Ok(Planes {
            src,
            dst,
            reference,
        })
    }
}

impl<const MAX_W: usize, const MAX_H: usize> Default for FrameStore<MAX_W, MAX_H> {
    fn default() -> Self {
        Self::new()
    }
}
