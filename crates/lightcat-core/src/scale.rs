//! DMX resolution scaling
//!
//! Converts single DMX values and closed DMX ranges between byte resolutions
//! (1 = 8bit, 2 = 16bit, 3 = 24bit, ...).
//!
//! Upscaling a value repeats its least significant byte into every new lower
//! byte, so `[127]` becomes `[127, 127]`. Downscaling truncates to the most
//! significant bytes.
//!
//! Ranges are scaled as sets of values: an upscaled range covers every finer
//! value below its coarse endpoints, and a downscaled range keeps the coarse
//! values whose sub-range starts inside the original range. Adjacent ranges
//! that tile a channel therefore stay adjacent after scaling.

use crate::error::{CoreError, Result};

/// Highest resolution whose value space fits into a `u64`.
pub const MAX_RESOLUTION: u32 = 7;

/// Number of distinct values at the given resolution (`256^resolution`).
pub fn value_count(resolution: u32) -> Result<u64> {
    if resolution == 0 || resolution > MAX_RESOLUTION {
        return Err(CoreError::InvalidResolution(resolution));
    }
    Ok(256u64.pow(resolution))
}

/// Highest DMX value at the given resolution (`256^resolution - 1`).
pub fn max_value(resolution: u32) -> Result<u64> {
    Ok(value_count(resolution)? - 1)
}

fn check_value(value: u64, resolution: u32) -> Result<()> {
    if value > max_value(resolution)? {
        return Err(CoreError::OutOfRange { value, resolution });
    }
    Ok(())
}

/// Scales a DMX value from one resolution to another.
///
/// # Examples
///
/// ```
/// use lightcat_core::scale::scale_dmx_value;
///
/// assert_eq!(scale_dmx_value(127, 1, 2).unwrap(), 32_639);
/// assert_eq!(scale_dmx_value(32_768, 2, 1).unwrap(), 128);
/// ```
pub fn scale_dmx_value(value: u64, from_resolution: u32, to_resolution: u32) -> Result<u64> {
    check_value(value, from_resolution)?;
    max_value(to_resolution)?;

    if to_resolution > from_resolution {
        let factor = value_count(to_resolution - from_resolution)?;
        let least_significant_byte = value % 256;
        Ok(value * factor + least_significant_byte * ((factor - 1) / 255))
    } else if to_resolution < from_resolution {
        Ok(value / value_count(from_resolution - to_resolution)?)
    } else {
        Ok(value)
    }
}

/// Scales the closed DMX range `[start, end]` from one resolution to another.
///
/// A range that lies strictly inside a single coarse value (so that no coarse
/// sub-range starts in it) collapses onto that coarse value.
pub fn scale_dmx_range(
    start: u64,
    end: u64,
    from_resolution: u32,
    to_resolution: u32,
) -> Result<(u64, u64)> {
    check_value(start, from_resolution)?;
    check_value(end, from_resolution)?;
    max_value(to_resolution)?;

    if start > end {
        return Err(CoreError::InvalidRange { start, end });
    }

    if to_resolution > from_resolution {
        let factor = value_count(to_resolution - from_resolution)?;
        Ok((start * factor, end * factor + (factor - 1)))
    } else if to_resolution < from_resolution {
        let bucket = value_count(from_resolution - to_resolution)?;

        // Range boundaries round up to the next bucket boundary. Using the same
        // rule for starts and (end + 1) keeps tiling ranges gapless.
        let scaled_start = start.div_ceil(bucket);
        let scaled_end = end / bucket;

        if scaled_start > scaled_end {
            Ok((scaled_end, scaled_end))
        } else {
            Ok((scaled_start, scaled_end))
        }
    } else {
        Ok((start, end))
    }
}
