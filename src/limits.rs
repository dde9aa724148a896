//! Capacity limits for the size matrix.
//!
//! [`CapacityLimits`] caps image dimensions at what the frame store can
//! hold. [`LimitExceeded`] is returned when a check fails. Every check is a
//! `const fn`, so a size matrix can be rejected at build time:
//!
//! ```
//! use graybench::CapacityLimits;
//!
//! const LIMITS: CapacityLimits = CapacityLimits::frame(128, 128);
//! const _: () = assert!(LIMITS.check_dimensions(128, 64).is_ok());
//! ```

/// Dimension limits for one harness run: the frame store's capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub struct CapacityLimits {
    /// Maximum image width in pixels.
    pub max_width: u32,
    /// Maximum image height in pixels.
    pub max_height: u32,
}

impl CapacityLimits {
    /// Limits matching a `max_width` × `max_height` frame store.
    ///
    /// Dimensions beyond `u32::MAX` are clamped.
    pub const fn frame(max_width: usize, max_height: usize) -> Self {
        Self {
            max_width: clamp_u32(max_width),
            max_height: clamp_u32(max_height),
        }
    }

    /// Check image dimensions against `max_width` and `max_height`, width
    /// first.
    pub const fn check_dimensions(&self, width: u32, height: u32) -> Result<(), LimitExceeded> {
        if width > self.max_width {
            return Err(LimitExceeded::Width {
                actual: width,
                max: self.max_width,
            });
        }
        if height > self.max_height {
            return Err(LimitExceeded::Height {
                actual: height,
                max: self.max_height,
            });
        }
        Ok(())
    }
}

const fn clamp_u32(v: usize) -> u32 {
    if v > u32::MAX as usize {
        u32::MAX
    } else {
        v as u32
    }
}

/// A capacity limit was exceeded.
///
/// Each variant carries the actual value and the limit that was exceeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LimitExceeded {
    /// Image width exceeded `max_width`.
    Width {
        /// Actual width.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Image height exceeded `max_height`.
    Height {
        /// Actual height.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
}

impl core::fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Width { actual, max } => write!(f, "width {actual} exceeds limit {max}"),
            Self::Height { actual, max } => write!(f, "height {actual} exceeds limit {max}"),
        }
    }
}

impl core::error::Error for LimitExceeded {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn frame_sets_width_and_height() {
        let limits = CapacityLimits::frame(128, 64);
        assert_eq!(limits.max_width, 128);
        assert_eq!(limits.max_height, 64);
    }

    #[test]
    fn frame_clamps_oversized_capacity() {
        let limits = CapacityLimits::frame(usize::MAX, 1);
        assert_eq!(limits.max_width, u32::MAX);
        assert!(limits.check_dimensions(u32::MAX, 1).is_ok());
    }

    #[test]
    fn check_dimensions_at_and_over_limit() {
        let limits = CapacityLimits::frame(128, 128);
        assert!(limits.check_dimensions(128, 128).is_ok());
        assert!(limits.check_dimensions(0, 0).is_ok());
        assert_eq!(
            limits.check_dimensions(129, 1),
            Err(LimitExceeded::Width {
                actual: 129,
                max: 128
            })
        );
        assert_eq!(
            limits.check_dimensions(1, 200),
            Err(LimitExceeded::Height {
                actual: 200,
                max: 128
            })
        );
    }

    #[test]
    fn width_checked_before_height() {
        let limits = CapacityLimits::frame(4, 4);
        assert!(matches!(
            limits.check_dimensions(5, 5),
            Err(LimitExceeded::Width { .. })
        ));
    }

    #[test]
    fn checks_are_const() {
        const LIMITS: CapacityLimits = CapacityLimits::frame(32, 32);
        const OK: bool = LIMITS.check_dimensions(32, 32).is_ok();
        const TOO_TALL: bool = LIMITS.check_dimensions(32, 33).is_err();
        assert!(OK);
        assert!(TOO_TALL);
    }

    #[test]
    fn display_messages() {
        let e = LimitExceeded::Width {
            actual: 200,
            max: 128,
        };
        assert_eq!(e.to_string(), "width 200 exceeds limit 128");
        let e = LimitExceeded::Height { actual: 9, max: 8 };
        assert_eq!(e.to_string(), "height 9 exceeds limit 8");
    }
}
