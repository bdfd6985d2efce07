//! Angular coordinate newtypes on the planetary sphere.
//!
//! Latitudes, longitudes and colatitudes are all plain degrees or radians at
//! the bottom, and passing one where another is expected is the easiest way to
//! put a vortex on the wrong side of the domain.

use std::fmt;

// =============================================================================
// Latitude
// =============================================================================

/// Geographic latitude in degrees, `-90 ..= 90`.
///
/// # Example
///
/// ```
/// use polar_swe::types::Latitude;
///
/// let lat = Latitude::new(85.0);
/// assert!((lat.colatitude_radians() - 5f64.to_radians()).abs() < 1e-15);
/// assert!(lat.is_valid());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Latitude(f64);

impl Latitude {
    /// The north pole.
    pub const POLE: Self = Self(90.0);

    #[inline]
    pub const fn new(degrees: f64) -> Self {
        Self(degrees)
    }

    /// Latitude from a colatitude in radians.
    #[inline]
    pub fn from_colatitude_radians(theta: f64) -> Self {
        Self(90.0 - theta.to_degrees())
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.0
    }

    /// Angular distance from the pole in radians.
    #[inline]
    pub fn colatitude_radians(self) -> f64 {
        (90.0 - self.0).to_radians()
    }

    /// Finite and within `[-90, 90]`.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && (-90.0..=90.0).contains(&self.0)
    }
}

impl fmt::Display for Latitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°N", self.0)
    }
}

impl From<Latitude> for f64 {
    #[inline]
    fn from(l: Latitude) -> f64 {
        l.0
    }
}

// =============================================================================
// Longitude
// =============================================================================

/// Longitude in degrees, measured counter-clockwise from the projected
/// +x axis when looking down on the north pole.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Longitude(f64);

impl Longitude {
    #[inline]
    pub const fn new(degrees: f64) -> Self {
        Self(degrees)
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }

    /// Equivalent longitude in `[0, 360)`.
    pub fn normalized(self) -> Self {
        Self(self.0.rem_euclid(360.0))
    }
}

impl fmt::Display for Longitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°E", self.0)
    }
}

impl From<Longitude> for f64 {
    #[inline]
    fn from(l: Longitude) -> f64 {
        l.0
    }
}
