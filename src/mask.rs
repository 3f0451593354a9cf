//! Output-selection masks for geodesic solves.
//!
//! A solve computes only the outputs its mask selects; everything else is
//! left as NaN. The bit layout is the engine's own capability encoding, so
//! the mask can travel caller → solver → result record without translation.

use std::ops::{BitAnd, BitOr, BitOrAssign};

use geographiclib_rs::geodesic_capability as caps;

/// Bitmask selecting which optional outputs a geodesic solve computes.
///
/// Constants combine an output bit with the series capabilities the engine
/// needs to produce that output, mirroring the wrapped library. Passed
/// across the managed boundary as a 64-bit integer.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct OutputMask(u64);

impl OutputMask {
    /// No optional outputs.
    pub const NONE: OutputMask = OutputMask(caps::EMPTY);
    /// Latitude of the second point.
    pub const LATITUDE: OutputMask = OutputMask(caps::LATITUDE);
    /// Longitude of the second point.
    pub const LONGITUDE: OutputMask = OutputMask(caps::LONGITUDE);
    /// Azimuths at both points.
    pub const AZIMUTH: OutputMask = OutputMask(caps::AZIMUTH);
    /// Distance `s12` between the points.
    pub const DISTANCE: OutputMask = OutputMask(caps::DISTANCE);
    /// Permit a distance (rather than an arc length) as direct-problem
    /// input.
    pub const DISTANCE_IN: OutputMask = OutputMask(caps::DISTANCE_IN);
    /// Reduced length `m12`.
    pub const REDUCED_LENGTH: OutputMask = OutputMask(caps::REDUCEDLENGTH);
    /// Geodesic scale factors `M12` and `M21`.
    pub const GEODESIC_SCALE: OutputMask = OutputMask(caps::GEODESICSCALE);
    /// Area `S12` between the geodesic and the equator.
    pub const AREA: OutputMask = OutputMask(caps::AREA);
    /// Every output.
    pub const ALL: OutputMask = OutputMask(caps::ALL);

    /// Reinterpret a caller-supplied 64-bit mask value.
    pub const fn from_bits(bits: u64) -> OutputMask {
        OutputMask(bits)
    }

    /// The raw bits handed to the engine and to result constructors.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether every bit of `other` is selected by this mask.
    pub const fn contains(self, other: OutputMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for OutputMask {
    type Output = OutputMask;

    fn bitor(self, rhs: OutputMask) -> OutputMask {
        OutputMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for OutputMask {
    fn bitor_assign(&mut self, rhs: OutputMask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for OutputMask {
    type Output = OutputMask;

    fn bitand(self, rhs: OutputMask) -> OutputMask {
        OutputMask(self.0 & rhs.0)
    }
}
