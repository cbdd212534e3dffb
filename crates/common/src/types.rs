use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Amount the interocular distance changes per key press.
pub const IPD_STEP: f32 = 0.1;

/// How the two eye images are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StereoMode {
    /// Single centered eye, full color.
    #[default]
    None,
    /// Both eyes offset sideways and rotated to aim at the shared look-at point.
    ToeIn,
    /// Parallel eye axes with sheared (off-axis) frustums.
    Asymmetric,
}

impl StereoMode {
    pub const ALL: [StereoMode; 3] = [StereoMode::None, StereoMode::ToeIn, StereoMode::Asymmetric];

    /// The next mode in cycle order, wrapping around after `Asymmetric`.
    pub fn next(self) -> Self {
        match self {
            StereoMode::None => StereoMode::ToeIn,
            StereoMode::ToeIn => StereoMode::Asymmetric,
            StereoMode::Asymmetric => StereoMode::None,
        }
    }

    /// Human-readable name printed on mode change.
    pub fn label(self) -> &'static str {
        match self {
            StereoMode::None => "None",
            StereoMode::ToeIn => "Toe-in",
            StereoMode::Asymmetric => "Asymmetric view frustum",
        }
    }

    pub fn is_stereo(self) -> bool {
        self != StereoMode::None
    }
}

impl fmt::Display for StereoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stereo mode `{0}` (expected none, toe-in or asymmetric)")]
pub struct ParseStereoModeError(pub String);

impl FromStr for StereoMode {
    type Err = ParseStereoModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "mono" => Ok(StereoMode::None),
            "toe-in" | "toein" => Ok(StereoMode::ToeIn),
            "asymmetric" | "off-axis" => Ok(StereoMode::Asymmetric),
            _ => Err(ParseStereoModeError(s.to_owned())),
        }
    }
}

/// Stereo rig settings adjusted from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StereoParameters {
    ipd: f32,
    pub mode: StereoMode,
}

impl Default for StereoParameters {
    fn default() -> Self {
        Self {
            ipd: 20.0,
            mode: StereoMode::None,
        }
    }
}

impl StereoParameters {
    /// Negative distances are clamped to zero.
    pub fn new(ipd: f32, mode: StereoMode) -> Self {
        Self {
            ipd: ipd.max(0.0),
            mode,
        }
    }

    /// Distance between the left and right eye positions.
    pub fn ipd(&self) -> f32 {
        self.ipd
    }

    pub fn half_ipd(&self) -> f32 {
        self.ipd / 2.0
    }

    pub fn increase_ipd(&mut self) -> f32 {
        self.ipd += IPD_STEP;
        self.ipd
    }

    /// Lowers the distance by one step, never going below zero.
    pub fn decrease_ipd(&mut self) -> f32 {
        self.ipd = (self.ipd - IPD_STEP).max(0.0);
        self.ipd
    }

    pub fn cycle_mode(&mut self) -> StereoMode {
        self.mode = self.mode.next();
        self.mode
    }
}

/// One placed copy of the box mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneInstance {
    pub model: Mat4,
}

impl SceneInstance {
    pub fn new(model: Mat4) -> Self {
        Self { model }
    }
}

/// Which color channels a draw is allowed to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColorMask {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    pub alpha: bool,
}

impl ColorMask {
    pub const ALL: ColorMask = ColorMask::new(true, true, true, true);
    /// Left eye channel.
    pub const RED: ColorMask = ColorMask::new(true, false, false, false);
    /// Right eye channels (green + blue).
    pub const CYAN: ColorMask = ColorMask::new(false, true, true, false);
    pub const NONE: ColorMask = ColorMask::new(false, false, false, false);

    pub const fn new(red: bool, green: bool, blue: bool, alpha: bool) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.red || self.green || self.blue || self.alpha)
    }

    /// True if both masks enable at least one common channel.
    pub fn overlaps(&self, other: &ColorMask) -> bool {
        (self.red && other.red)
            || (self.green && other.green)
            || (self.blue && other.blue)
            || (self.alpha && other.alpha)
    }
}

impl Default for ColorMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for ColorMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (enabled, c) in [
            (self.red, 'R'),
            (self.green, 'G'),
            (self.blue, 'B'),
            (self.alpha, 'A'),
        ] {
            if enabled {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}
