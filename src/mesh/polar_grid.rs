//! Staggered polar-cap grid on an azimuthal equidistant projection.
//!
//! A point at colatitude θ (radians) and longitude λ is projected to
//!
//! x = R θ cos λ,  y = R θ sin λ
//!
//! so distance from the origin is arc length from the pole. The domain is the
//! square `[-r_max, r_max]²` with `r_max = R θ(lat_min)`, split into `n × n`
//! uniform cells. Unlike a latitude/longitude mesh nothing degenerates at the
//! pole: the pole is an ordinary interior point.
//!
//! Quantities are staggered on an Arakawa C-grid:
//!
//! ```text
//!   ψ,ζ ─── v ─── ψ,ζ        corner (j, i)   at (x_face[i],   y_face[j])
//!    │             │          u      (j, i)   at (x_face[i],   y_centre[j])
//!    u      h      u          v      (j, i)   at (x_centre[i], y_face[j])
//!    │             │          h      (j, i)   at (x_centre[i], y_centre[j])
//!   ψ,ζ ─── v ─── ψ,ζ
//! ```
//!
//! The projection is equidistant along meridians only; the true area of a
//! projected cell is `k dx dy` with map factor `k = sin θ / θ`.

use ndarray::Array2;
use tracing::debug;

use crate::config::{DomainConfig, MIN_GRID_SIZE, PlanetConfig};
use crate::error::{SolverError, SolverResult};
use crate::types::{Latitude, Longitude};

/// Immutable grid geometry, Coriolis field and sponge weights.
///
/// Built once by [`PolarGrid::build`] and only read afterwards, so it can be
/// shared between concurrent runs behind an `Arc`.
#[derive(Clone, Debug)]
pub struct PolarGrid {
    n: usize,
    dx: f64,
    r_max: f64,
    planet: PlanetConfig,
    domain: DomainConfig,

    x_centres: Vec<f64>,
    x_faces: Vec<f64>,

    lat_centre: Array2<f64>,
    lat_corner: Array2<f64>,
    map_factor: Array2<f64>,

    f_centre: Array2<f64>,
    f_corner: Array2<f64>,
    f_u: Array2<f64>,
    f_v: Array2<f64>,

    sponge_u: Array2<f64>,
    sponge_v: Array2<f64>,
}

impl PolarGrid {
    /// Build an `resolution × resolution` grid covering the cap poleward of
    /// `domain.lat_min`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `resolution < 4`, or if the domain latitudes
    /// or planet constants are unusable.
    pub fn build(
        resolution: usize,
        planet: &PlanetConfig,
        domain: &DomainConfig,
    ) -> SolverResult<Self> {
        if resolution < MIN_GRID_SIZE {
            return Err(SolverError::invalid_config(format!(
                "grid resolution must be at least {MIN_GRID_SIZE}, got {resolution}"
            )));
        }
        domain.validate()?;
        if !(planet.radius.is_finite() && planet.radius > 0.0) {
            return Err(SolverError::invalid_config(format!(
                "planet radius must be positive, got {}",
                planet.radius
            )));
        }
        if !(planet.rotation_period.is_finite() && planet.rotation_period > 0.0) {
            return Err(SolverError::invalid_config(format!(
                "rotation period must be positive, got {}",
                planet.rotation_period
            )));
        }

        let n = resolution;
        let radius = planet.radius;
        let f0 = planet.f0();
        let r_max = radius * Latitude::new(domain.lat_min).colatitude_radians();
        let dx = 2.0 * r_max / n as f64;

        let x_faces: Vec<f64> = (0..=n).map(|i| -r_max + i as f64 * dx).collect();
        let x_centres: Vec<f64> = (0..n).map(|i| -r_max + (i as f64 + 0.5) * dx).collect();

        let colat = |x: f64, y: f64| x.hypot(y) / radius;
        let lat = |x: f64, y: f64| Latitude::from_colatitude_radians(colat(x, y)).degrees();
        let coriolis = |x: f64, y: f64| f0 * colat(x, y).cos();

        let theta_min = Latitude::new(domain.lat_min).colatitude_radians();
        let theta_sponge = Latitude::new(domain.lat_sponge).colatitude_radians();
        let sponge = |x: f64, y: f64| sponge_weight(colat(x, y), theta_sponge, theta_min);

        let lat_centre = Array2::from_shape_fn((n, n), |(j, i)| lat(x_centres[i], x_centres[j]));
        let lat_corner =
            Array2::from_shape_fn((n + 1, n + 1), |(j, i)| lat(x_faces[i], x_faces[j]));
        let map_factor = Array2::from_shape_fn((n, n), |(j, i)| {
            let theta = colat(x_centres[i], x_centres[j]);
            if theta < 1e-12 { 1.0 } else { theta.sin() / theta }
        });

        let f_centre = Array2::from_shape_fn((n, n), |(j, i)| coriolis(x_centres[i], x_centres[j]));
        let f_corner =
            Array2::from_shape_fn((n + 1, n + 1), |(j, i)| coriolis(x_faces[i], x_faces[j]));
        let f_u = Array2::from_shape_fn((n, n + 1), |(j, i)| coriolis(x_faces[i], x_centres[j]));
        let f_v = Array2::from_shape_fn((n + 1, n), |(j, i)| coriolis(x_centres[i], x_faces[j]));

        let sponge_u = Array2::from_shape_fn((n, n + 1), |(j, i)| sponge(x_faces[i], x_centres[j]));
        let sponge_v = Array2::from_shape_fn((n + 1, n), |(j, i)| sponge(x_centres[i], x_faces[j]));

        debug!(
            n,
            dx_km = dx / 1e3,
            r_max_km = r_max / 1e3,
            "built polar grid"
        );

        Ok(Self {
            n,
            dx,
            r_max,
            planet: planet.clone(),
            domain: domain.clone(),
            x_centres,
            x_faces,
            lat_centre,
            lat_corner,
            map_factor,
            f_centre,
            f_corner,
            f_u,
            f_v,
            sponge_u,
            sponge_v,
        })
    }

    /// Cells per side.
    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    /// Uniform projected spacing (m), identical in x and y.
    #[inline]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    #[inline]
    pub fn dy(&self) -> f64 {
        self.dx
    }

    /// Smallest spacing anywhere on the grid; the projection keeps it uniform.
    #[inline]
    pub fn min_spacing(&self) -> f64 {
        self.dx
    }

    /// Half-width of the projected domain (m).
    #[inline]
    pub fn r_max(&self) -> f64 {
        self.r_max
    }

    #[inline]
    pub fn planet(&self) -> &PlanetConfig {
        &self.planet
    }

    #[inline]
    pub fn domain(&self) -> &DomainConfig {
        &self.domain
    }

    /// Polar Coriolis parameter f0 = 4π/T.
    #[inline]
    pub fn f0(&self) -> f64 {
        self.planet.f0()
    }

    /// Shape of the thickness field.
    #[inline]
    pub fn centre_shape(&self) -> (usize, usize) {
        (self.n, self.n)
    }

    /// Shape of the x-velocity field.
    #[inline]
    pub fn u_shape(&self) -> (usize, usize) {
        (self.n, self.n + 1)
    }

    /// Shape of the y-velocity field.
    #[inline]
    pub fn v_shape(&self) -> (usize, usize) {
        (self.n + 1, self.n)
    }

    /// Shape of corner fields (streamfunction, vorticity).
    #[inline]
    pub fn corner_shape(&self) -> (usize, usize) {
        (self.n + 1, self.n + 1)
    }

    /// Cell-centre coordinates along one axis (identical for x and y).
    #[inline]
    pub fn centres(&self) -> &[f64] {
        &self.x_centres
    }

    /// Face coordinates along one axis (identical for x and y).
    #[inline]
    pub fn faces(&self) -> &[f64] {
        &self.x_faces
    }

    /// Projected (x, y) of cell centre `(j, i)`.
    #[inline]
    pub fn centre(&self, j: usize, i: usize) -> (f64, f64) {
        (self.x_centres[i], self.x_centres[j])
    }

    /// Projected (x, y) of corner `(j, i)`.
    #[inline]
    pub fn corner(&self, j: usize, i: usize) -> (f64, f64) {
        (self.x_faces[i], self.x_faces[j])
    }

    pub fn latitude_centres(&self) -> &Array2<f64> {
        &self.lat_centre
    }

    pub fn latitude_corners(&self) -> &Array2<f64> {
        &self.lat_corner
    }

    /// Ratio of true spherical area to projected area, `sin θ / θ`.
    pub fn map_factor(&self) -> &Array2<f64> {
        &self.map_factor
    }

    /// Projected area of every cell, `dx dy`.
    #[inline]
    pub fn projected_cell_area(&self) -> f64 {
        self.dx * self.dx
    }

    /// True area on the sphere of cell `(j, i)`.
    #[inline]
    pub fn cell_area(&self, j: usize, i: usize) -> f64 {
        self.map_factor[(j, i)] * self.projected_cell_area()
    }

    /// True areas of all cells.
    pub fn cell_areas(&self) -> Array2<f64> {
        let area = self.projected_cell_area();
        self.map_factor.mapv(|k| k * area)
    }

    pub fn coriolis_centres(&self) -> &Array2<f64> {
        &self.f_centre
    }

    pub fn coriolis_corners(&self) -> &Array2<f64> {
        &self.f_corner
    }

    pub fn coriolis_u(&self) -> &Array2<f64> {
        &self.f_u
    }

    pub fn coriolis_v(&self) -> &Array2<f64> {
        &self.f_v
    }

    /// Sponge weight in `[0, 1]` at u-points.
    pub fn sponge_u(&self) -> &Array2<f64> {
        &self.sponge_u
    }

    /// Sponge weight in `[0, 1]` at v-points.
    pub fn sponge_v(&self) -> &Array2<f64> {
        &self.sponge_v
    }

    /// Projected position of a geographic point.
    pub fn project(&self, lat: Latitude, lon: Longitude) -> (f64, f64) {
        let r = self.planet.radius * lat.colatitude_radians();
        let lambda = lon.radians();
        (r * lambda.cos(), r * lambda.sin())
    }

    /// Whether a projected point lies inside the domain (edges included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x.abs() <= self.r_max && y.abs() <= self.r_max
    }

}

/// Linear ramp from 0 at `theta_sponge` to 1 at `theta_min` and beyond.
/// A zero-width ramp becomes a step at `theta_min`.
fn sponge_weight(theta: f64, theta_sponge: f64, theta_min: f64) -> f64 {
    let width = theta_min - theta_sponge;
    if width <= 0.0 {
        return if theta >= theta_min { 1.0 } else { 0.0 };
    }
    ((theta - theta_sponge) / width).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldExt;
    use approx::assert_relative_eq;

    fn jupiter_grid(n: usize) -> PolarGrid {
        PolarGrid::build(n, &PlanetConfig::jupiter(), &DomainConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_tiny_resolutions() {
        for n in [0, 1, 3] {
            let err = PolarGrid::build(n, &PlanetConfig::jupiter(), &DomainConfig::default())
                .unwrap_err();
            assert!(err.is_configuration(), "n = {n}");
        }
        assert!(PolarGrid::build(4, &PlanetConfig::jupiter(), &DomainConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_domain() {
        let planet = PlanetConfig::jupiter();
        assert!(PolarGrid::build(8, &planet, &DomainConfig::new(95.0, 96.0)).is_err());
        assert!(PolarGrid::build(8, &planet, &DomainConfig::new(70.0, 65.0)).is_err());
    }

    #[test]
    fn test_shapes() {
        let grid = jupiter_grid(10);
        assert_eq!(grid.centre_shape(), (10, 10));
        assert_eq!(grid.u_shape(), (10, 11));
        assert_eq!(grid.v_shape(), (11, 10));
        assert_eq!(grid.corner_shape(), (11, 11));
        assert_eq!(grid.coriolis_u().dim(), grid.u_shape());
        assert_eq!(grid.sponge_v().dim(), grid.v_shape());
        assert_eq!(grid.faces().len(), 11);
    }

    #[test]
    fn test_domain_extent() {
        let grid = jupiter_grid(50);
        let expected = 66_854e3 * 29f64.to_radians();
        assert_relative_eq!(grid.r_max(), expected, max_relative = 1e-12);
        assert_relative_eq!(grid.dx(), 2.0 * expected / 50.0, max_relative = 1e-12);
        assert_relative_eq!(grid.faces()[0], -expected, max_relative = 1e-12);
        assert_relative_eq!(grid.faces()[50], expected, max_relative = 1e-12);
    }

    #[test]
    fn test_spacing_decreases_with_resolution() {
        let mut previous = f64::INFINITY;
        for n in [4, 8, 16, 50, 128] {
            let dx = jupiter_grid(n).dx();
            assert!(dx < previous);
            previous = dx;
        }
    }

    #[test]
    fn test_areas_positive_and_bounded() {
        for n in [4, 7, 32] {
            let grid = jupiter_grid(n);
            let areas = grid.cell_areas();
            assert!(areas.min() > 0.0);
            assert!(areas.max() <= grid.projected_cell_area() * (1.0 + 1e-12));
        }
    }

    #[test]
    fn test_coriolis_monotonic_in_latitude() {
        for n in [4, 9, 40] {
            let grid = jupiter_grid(n);
            let mut pairs: Vec<(f64, f64)> = grid
                .latitude_corners()
                .iter()
                .zip(grid.coriolis_corners())
                .map(|(&lat, &f)| (lat, f))
                .collect();
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
            for w in pairs.windows(2) {
                assert!(w[1].1 >= w[0].1 - 1e-18);
            }
            assert!(grid.coriolis_corners().min() > 0.0);
            assert!(grid.coriolis_centres().max() <= grid.f0());
        }
    }

    #[test]
    fn test_pole_is_regular() {
        // Even n puts the pole on a corner, odd n on a cell centre.
        let grid = jupiter_grid(8);
        let mid = 4;
        assert_relative_eq!(grid.latitude_corners()[(mid, mid)], 90.0);
        assert_relative_eq!(grid.coriolis_corners()[(mid, mid)], grid.f0());
        let odd = jupiter_grid(9);
        assert_relative_eq!(odd.map_factor()[(4, 4)], 1.0);
    }

    #[test]
    fn test_sponge_weights() {
        let grid = jupiter_grid(40);
        // Pole: no damping
        let (n, _) = grid.u_shape();
        assert_eq!(grid.sponge_u()[(n / 2, n / 2)], 0.0);
        // Domain corner lies far equatorward of lat_min
        assert_eq!(grid.sponge_v()[(0, 0)], 1.0);
        assert!(grid.sponge_u().min() >= 0.0 && grid.sponge_u().max() <= 1.0);

        assert_eq!(sponge_weight(0.3, 0.2, 0.2), 1.0);
        assert_eq!(sponge_weight(0.1, 0.2, 0.2), 0.0);
        assert_relative_eq!(sponge_weight(0.15, 0.1, 0.2), 0.5);
    }

    #[test]
    fn test_project() {
        let grid = jupiter_grid(16);
        let (x, y) = grid.project(Latitude::new(80.0), Longitude::new(90.0));
        assert!(x.abs() < 1.0);
        assert_relative_eq!(y, 66_854e3 * 10f64.to_radians(), max_relative = 1e-12);

        let (x, y) = grid.project(Latitude::new(90.0), Longitude::new(123.0));
        assert_eq!((x, y), (0.0, 0.0));
        assert!(grid.contains(x, y));

        let (x, y) = grid.project(Latitude::new(40.0), Longitude::new(0.0));
        assert!(!grid.contains(x, y));
    }

}
