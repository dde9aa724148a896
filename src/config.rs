//! Compiled-in harness configuration.
//!
//! The default matrix matches the benchmark this crate grew out of: four
//! sizes from 32×32 up to 128×128, ten timed trials each, against a
//! 128×128 frame store. [`HarnessConfig::validate`] is a `const fn`, so a
//! matrix that would overrun the store fails the build:
//!
//! ```compile_fail
//! use graybench::{CapacityLimits, HarnessConfig, SizeDescriptor};
//!
//! const BAD: HarnessConfig<1> = HarnessConfig::new([SizeDescriptor::new(256, 1)], 10);
//! const _: () = assert!(BAD.validate(&CapacityLimits::frame(128, 128)).is_ok());
//! ```

use core::fmt;

use crate::buffer::{BufferError, RowStride};
use crate::limits::{CapacityLimits, LimitExceeded};

/// Frame store capacity: widest supported image.
pub const MAX_WIDTH: usize = 128;
/// Frame store capacity: tallest supported image.
pub const MAX_HEIGHT: usize = 128;
/// Timed trials per size.
pub const TRIALS: u32 = 10;
/// Number of sizes in [`SIZES`].
pub const NSIZES: usize = 4;

/// The default size matrix, run in this order.
pub const SIZES: [SizeDescriptor; NSIZES] = [
    SizeDescriptor::new(32, 32),
    SizeDescriptor::new(64, 64),
    SizeDescriptor::new(128, 64),
    SizeDescriptor::new(128, 128),
];

/// Default configuration: [`SIZES`] × [`TRIALS`], packed rows.
pub const DEFAULT: HarnessConfig<NSIZES> = HarnessConfig::new(SIZES, TRIALS);

/// Capacity limits of the default frame store.
pub const DEFAULT_LIMITS: CapacityLimits = CapacityLimits::frame(MAX_WIDTH, MAX_HEIGHT);

const _: () = assert!(DEFAULT.validate(&DEFAULT_LIMITS).is_ok());

/// Image geometry for one group of trials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SizeDescriptor {
    /// Logical width in pixels.
    pub width: u32,
    /// Logical height in pixels.
    pub height: u32,
}

impl SizeDescriptor {
    /// A `width` × `height` descriptor.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `width × height`, saturating at `u32::MAX`.
    pub const fn pixels(&self) -> u32 {
        self.width.saturating_mul(self.height)
    }
}

/// The fixed parameters of a harness run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HarnessConfig<const N: usize> {
    /// Sizes to run, in order.
    pub sizes: [SizeDescriptor; N],
    /// Timed trials per size.
    pub trials: u32,
    /// Row stride policy for the source and destination planes.
    pub stride: RowStride,
}

impl<const N: usize> HarnessConfig<N> {
    /// `trials` timed trials for each of `sizes`, with packed rows.
    pub const fn new(sizes: [SizeDescriptor; N], trials: u32) -> Self {
        Self {
            sizes,
            trials,
            stride: RowStride::Packed,
        }
    }

    /// Use the given row stride policy.
    pub const fn with_stride(mut self, stride: RowStride) -> Self {
        self.stride = stride;
        self
    }

    /// Check that the run is well formed and every size fits `limits`.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, in size order.
    pub const fn validate(&self, limits: &CapacityLimits) -> Result<(), ConfigError> {
        if N == 0 {
            return Err(ConfigError::NoSizes);
        }
        if self.trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        let mut index = 0;
        while index < N {
            let size = self.sizes[index];
            if let Err(exceeded) = limits.check_dimensions(size.width, size.height) {
                return Err(ConfigError::Capacity { index, exceeded });
            }
            index += 1;
        }
        Ok(())
    }
}

/// A harness configuration that cannot run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum ConfigError {
    /// The size matrix is empty.
    NoSizes,
    /// Trial count is zero, leaving nothing to average.
    ZeroTrials,
    /// A size does not fit the frame store.
    Capacity {
        /// Position of the offending size in the matrix.
        index: usize,
        /// Which limit it broke.
        exceeded: LimitExceeded,
    },
    /// The frame store could not lend planes for a size.
    Buffer {
        /// Position of the offending size in the matrix.
        index: usize,
        /// Why the planes were rejected.
        error: BufferError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSizes => write!(f, "size matrix is empty"),
            Self::ZeroTrials => write!(f, "trial count must be at least 1"),
            Self::Capacity { index, exceeded } => {
                write!(f, "size #{index} does not fit the frame store: {exceeded}")
            }
            Self::Buffer { index, error } => write!(f, "size #{index}: {error}"),
        }
    }
}

impl core::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Capacity { exceeded, .. } => Some(exceeded),
            Self::Buffer { error, .. } => Some(error),
            _ => None,
        }
    }
}
