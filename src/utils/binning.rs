//! Hierarchical UCSC/BAI binning.
//!
//! The 2^29 coordinate space is split into six nested levels. Level 0 is a
//! single bin spanning everything; each finer level splits every window of
//! the level above into eight, down to 16 KiB windows at level 5. Bins are
//! numbered breadth-first, so level `L` starts at `(8^L - 1) / 7`.
//!
//! | Level | Window    | First bin |
//! |-------|-----------|-----------|
//! | 0     | 512 Mbp   | 0         |
//! | 1     | 64 Mbp    | 1         |
//! | 2     | 8 Mbp     | 9         |
//! | 3     | 1 Mbp     | 73        |
//! | 4     | 128 Kbp   | 585       |
//! | 5     | 16 Kbp    | 4681      |

use crate::utils::validation::INDEX_WORD_BITS;

/// Bits consumed by each step down the bin hierarchy.
pub const NEXT_BIN_SHIFT: u32 = 3;

/// Number of levels in the hierarchy.
pub const LEVELS: usize = 6;

/// Bin assigned to records without a placement (`reg2bin(-1, 0)`).
pub const UNMAPPED_BIN: u16 = 4680;

/// Width, in bits, of a window at `level`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn level_shift(level: usize) -> u32 {
    INDEX_WORD_BITS - NEXT_BIN_SHIFT * level as u32
}

/// First bin number used by `level`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn level_base(level: usize) -> u16 {
    let windows = 1u32 << (NEXT_BIN_SHIFT * level as u32);
    ((windows - 1) / ((1u32 << NEXT_BIN_SHIFT) - 1)) as u16
}

/// Calculate the bin for an alignment covering `[beg, end)`, zero-based.
///
/// Returns the bin of the smallest window that holds both ends of the
/// interval. Inputs are expected to satisfy
/// [`valid_index_pos`](crate::utils::validation::valid_index_pos).
///
/// # Examples
///
/// ```
/// use samstream::utils::binning::reg2bin;
///
/// assert_eq!(reg2bin(100, 200), 4681);
/// assert_eq!(reg2bin(100, 100_000_000), 0);
/// ```
#[must_use]
pub fn reg2bin(beg: i64, end: i64) -> u16 {
    let end = end - 1;
    for level in (1..LEVELS).rev() {
        let shift = level_shift(level);
        if beg >> shift == end >> shift {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let bin = (i64::from(level_base(level)) + (beg >> shift)) as u16;
            return bin;
        }
    }
    level_base(0)
}

/// Level a bin number belongs to, or `None` past the last level.
#[must_use]
pub fn bin_level(bin: u16) -> Option<usize> {
    (0..LEVELS)
        .rev()
        .find(|&level| bin >= level_base(level))
        .filter(|&level| {
            let windows = u32::from(level_base(level + 1) - level_base(level));
            u32::from(bin - level_base(level)) < windows
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_constants() {
        let shifts: Vec<u32> = (0..LEVELS).map(level_shift).collect();
        assert_eq!(shifts, vec![29, 26, 23, 20, 17, 14]);

        let bases: Vec<u16> = (0..LEVELS).map(level_base).collect();
        assert_eq!(bases, vec![0, 1, 9, 73, 585, 4681]);
    }

    #[test]
    fn test_reg2bin_finest_level() {
        assert_eq!(reg2bin(0, 1), 4681);
        assert_eq!(reg2bin(1, 2), 4681);
        assert_eq!(reg2bin(100, 200), 4681);
        assert_eq!(reg2bin(16384, 16385), 4682);
    }

    #[test]
    fn test_reg2bin_straddles_window() {
        // Crosses a 16 Kbp boundary, fits in one 128 Kbp window
        assert_eq!(reg2bin(16383, 16385), 585);
    }

    #[test]
    fn test_reg2bin_coarse() {
        assert_eq!(reg2bin(100, 100_000_000), 0);
        assert_eq!(reg2bin(0, 1 << 26), 1);
        assert_eq!(reg2bin(0, 1 << 29), 0);
    }

    #[test]
    fn test_reg2bin_unmapped() {
        assert_eq!(reg2bin(-1, 0), UNMAPPED_BIN);
    }

    #[test]
    fn test_reg2bin_larger_interval_is_coarser() {
        let narrow = reg2bin(100, 200);
        let wide = reg2bin(100, 100_000_000);
        assert_ne!(narrow, wide);
        let narrow_level = bin_level(narrow).unwrap();
        let wide_level = bin_level(wide).unwrap();
        assert!(level_base(wide_level) <= level_base(narrow_level));
    }

    #[test]
    fn test_nested_intervals_are_finer_or_equal() {
        let outer = [(0, 1_000_000), (5_000_000, 90_000_000), (1 << 20, 1 << 24)];
        for (beg, end) in outer {
            let outer_level = bin_level(reg2bin(beg, end)).unwrap();
            let mut start = beg;
            while start + 1000 <= end {
                let inner_level = bin_level(reg2bin(start, start + 1000)).unwrap();
                assert!(level_base(inner_level) >= level_base(outer_level));
                start += (end - beg) / 7;
            }
        }
    }

    #[test]
    fn test_bin_level() {
        assert_eq!(bin_level(0), Some(0));
        assert_eq!(bin_level(8), Some(1));
        assert_eq!(bin_level(9), Some(2));
        assert_eq!(bin_level(4680), Some(4));
        assert_eq!(bin_level(4681), Some(5));
        assert_eq!(bin_level(37448), Some(5));
        assert_eq!(bin_level(37449), None);
    }
}
