//! Deterministic RGB test pattern.
//!
//! Every channel is an independent affine ramp over `(x, y)`, wrapped to
//! 8 bits:
//!
//! | channel | value                      |
//! |---------|----------------------------|
//! | R       | `(37·x + 13·y) mod 256`    |
//! | G       | `(11·x + 71·y) mod 256`    |
//! | B       | `( 5·x +  3·y) mod 256`    |
//!
//! No channel's coefficient pair is a multiple of another's, so the three
//! channels never move in lockstep and the converter sees its full input
//! range instead of flat colors or pure grays.

use rgb::Rgb;

use crate::buffer::PlaneMut;

/// `(x, y)` coefficients for the red channel.
pub const RED_STEP: (u32, u32) = (37, 13);
/// `(x, y)` coefficients for the green channel.
pub const GREEN_STEP: (u32, u32) = (11, 71);
/// `(x, y)` coefficients for the blue channel.
pub const BLUE_STEP: (u32, u32) = (5, 3);

#[inline]
const fn ramp(step: (u32, u32), x: u32, y: u32) -> u8 {
    (x.wrapping_mul(step.0).wrapping_add(y.wrapping_mul(step.1)) & 0xFF) as u8
}

/// Pattern value at pixel `(x, y)`.
#[inline]
pub const fn pattern_pixel(x: u32, y: u32) -> Rgb<u8> {
    Rgb {
        r: ramp(RED_STEP, x, y),
        g: ramp(GREEN_STEP, x, y),
        b: ramp(BLUE_STEP, x, y),
    }
}

/// Fill the logical region of an RGB8 plane with the test pattern.
///
/// Padding bytes between rows are left untouched.
///
/// # Panics
///
/// Panics if `src` is not an RGB8 plane.
pub fn fill_pattern(src: &mut PlaneMut<'_>) {
    for y in 0..src.rows() {
        for (x, px) in src.rgb_row_mut(y).iter_mut().enumerate() {
            *px = pattern_pixel(x as u32, y as u32);
        }
    }
}
