use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a neighborhood filter does with the outer one-pixel ring, where the
/// 3x3 footprint leaves the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderPolicy {
    /// Border pixels are not written; the output keeps whatever it held.
    Untouched,
    /// Border pixels are copied from the input unchanged.
    #[default]
    CopyThrough,
    /// Out-of-range taps read the nearest edge pixel.
    Clamp,
    /// Out-of-range taps mirror around the edge pixel without repeating it.
    Reflect101,
}

impl BorderPolicy {
    /// True when border pixels are computed from an extended neighborhood.
    pub fn extends(self) -> bool {
        matches!(self, Self::Clamp | Self::Reflect101)
    }
}

impl FromStr for BorderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "untouched" | "skip" => Ok(Self::Untouched),
            "copy_through" | "copy" => Ok(Self::CopyThrough),
            "clamp" => Ok(Self::Clamp),
            "reflect101" | "reflect_101" => Ok(Self::Reflect101),
            other => Err(format!(
                "unknown border policy '{other}', expected untouched|copy_through|clamp|reflect101"
            )),
        }
    }
}

/// Maps a possibly out-of-range index onto `[0, len)` for the extending
/// policies. Returns `None` for policies that never read outside the raster.
pub fn map_index(i: isize, len: usize, policy: BorderPolicy) -> Option<usize> {
    if len == 0 {
        return None;
    }

    match policy {
        BorderPolicy::Untouched | BorderPolicy::CopyThrough => None,
        BorderPolicy::Clamp => {
            if i < 0 {
                Some(0)
            } else {
                Some((i as usize).min(len - 1))
            }
        }
        BorderPolicy::Reflect101 => {
            if len == 1 {
                return Some(0);
            }

            let period = (2 * len - 2) as isize;
            let r = i.rem_euclid(period) as usize;
            if r < len {
                Some(r)
            } else {
                Some((2 * len - 2) - r)
            }
        }
    }
}
