use itertools::Itertools;
use log::debug;
use nalgebra::{OPoint, Point3};

use crate::{
    curve::{curves_scale, NurbsCurve3D},
    misc::{points_scale, transpose, FloatingPoint},
    surface::{try_unify_surface_knot_vectors, NurbsSurface3D},
};

use super::{error::Result, GordonError, GordonOptions};

/// The Gordon surface of a curve network with the three surfaces it is made of
/// All four surfaces share degrees and knot vectors.
#[derive(Clone, Debug)]
pub struct GordonSurface<T: FloatingPoint> {
    /// `profile_skin + guide_skin - tensor`
    pub gordon: NurbsSurface3D<T>,
    /// Skin through the profiles
    pub profile_skin: NurbsSurface3D<T>,
    /// Skin through the guides with u and v swapped
    pub guide_skin: NurbsSurface3D<T>,
    /// Interpolation of the intersection points
    pub tensor: NurbsSurface3D<T>,
}

/// Builds the Gordon surface of a compatible curve network
/// Profile `i` must meet guide `j` at `u_params[j]` on the profile and `v_params[i]` on the guide.
pub struct GordonSurfaceBuilder<'a, T: FloatingPoint> {
    profiles: &'a [NurbsCurve3D<T>],
    guides: &'a [NurbsCurve3D<T>],
    u_params: &'a [T],
    v_params: &'a [T],
    tolerance: T,
    options: GordonOptions<T>,
}

impl<'a, T: FloatingPoint> GordonSurfaceBuilder<'a, T> {
    /// `tolerance` is relative to the size of the network
    pub fn new(
        profiles: &'a [NurbsCurve3D<T>],
        guides: &'a [NurbsCurve3D<T>],
        u_params: &'a [T],
        v_params: &'a [T],
        tolerance: T,
    ) -> Self {
        Self {
            profiles,
            guides,
            u_params,
            v_params,
            tolerance,
            options: GordonOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GordonOptions<T>) -> Self {
        self.options = options;
        self
    }

    /// Build the Gordon surface and its three auxiliary surfaces
    pub fn try_build(&self) -> Result<GordonSurface<T>> {
        self.validate()?;

        let scale =
            (curves_scale(self.profiles) + curves_scale(self.guides)) * T::from_f64(0.5).unwrap();
        self.check_compatibility(scale)?;

        // intersection points indexed [profile][guide]
        let grid = self
            .profiles
            .iter()
            .map(|p| self.u_params.iter().map(|u| p.point_at(*u)).collect_vec())
            .collect_vec();

        let closed_tolerance = self.options.closed_tolerance * points_scale(&grid);
        let (u_closed, v_closed) = self.closedness(&grid, closed_tolerance);
        debug!(
            "gordon surface of {} profiles and {} guides, u closed: {}, v closed: {}",
            self.profiles.len(),
            self.guides.len(),
            u_closed,
            v_closed
        );

        let profile_skin = NurbsSurface3D::try_skin(self.profiles, self.v_params, v_closed)?;
        let guide_skin =
            NurbsSurface3D::try_skin(self.guides, self.u_params, u_closed)?.transposed();
        let tensor = NurbsSurface3D::try_interpolate_grid(
            &transpose(&grid),
            self.u_params,
            self.v_params,
            u_closed,
            v_closed,
        )?;

        let unified = try_unify_surface_knot_vectors(&[profile_skin, guide_skin, tensor])?;
        let [profile_skin, guide_skin, tensor]: [NurbsSurface3D<T>; 3] = unified
            .try_into()
            .map_err(|_| GordonError::Geometry("surface unification lost surfaces".to_string()))?;
        debug!(
            "unified surfaces: degree ({}, {}), {} x {} control points",
            tensor.u_degree(),
            tensor.v_degree(),
            tensor.control_points().len(),
            tensor.control_points()[0].len()
        );

        let gordon = combine(&profile_skin, &guide_skin, &tensor)?;

        Ok(GordonSurface {
            gordon,
            profile_skin,
            guide_skin,
            tensor,
        })
    }

    fn validate(&self) -> Result<()> {
        let (m, n) = (self.profiles.len(), self.guides.len());
        if m < 2 || n < 2 {
            return Err(GordonError::Validation(format!(
                "at least two profiles and two guides are required, got {} and {}",
                m, n
            )));
        }
        if self.u_params.len() != n || self.v_params.len() != m {
            return Err(GordonError::Validation(format!(
                "expected {} u parameters and {} v parameters, got {} and {}",
                n,
                m,
                self.u_params.len(),
                self.v_params.len()
            )));
        }

        for (family, curves) in [("profiles", self.profiles), ("guides", self.guides)] {
            let (start, end) = curves[0].knots_domain();
            let tolerance = self.options.domain_tolerance;
            if let Some((k, c)) = curves.iter().enumerate().find(|(_, c)| {
                let (s, e) = c.knots_domain();
                (s - start).abs() > tolerance || (e - end).abs() > tolerance
            }) {
                return Err(GordonError::DomainMismatch(format!(
                    "{} {} is defined on {:?}, the first one on {:?}",
                    family,
                    k,
                    c.knots_domain(),
                    (start, end)
                )));
            }
        }

        Ok(())
    }

    /// Every profile must meet every guide at the shared parameters
    fn check_compatibility(&self, scale: T) -> Result<()> {
        let tolerance = self.tolerance * scale;
        for (i, (profile, v)) in self.profiles.iter().zip(self.v_params).enumerate() {
            for (j, (guide, u)) in self.guides.iter().zip(self.u_params).enumerate() {
                let distance = (profile.point_at(*u) - guide.point_at(*v)).norm();
                if distance > tolerance {
                    return Err(GordonError::Incompatible {
                        profile: i,
                        guide: j,
                        distance: distance.to_f64().unwrap_or(f64::NAN),
                    });
                }
            }
        }
        Ok(())
    }

    /// A direction is closed when the grid wraps around and the first and last curves across it coincide
    fn closedness(&self, grid: &[Vec<Point3<T>>], tolerance: T) -> (bool, bool) {
        let (m, n) = (self.profiles.len(), self.guides.len());
        let u_closed = grid
            .iter()
            .all(|row| (row[0] - row[n - 1]).norm() <= tolerance)
            && self.guides[0].is_equal(&self.guides[n - 1], tolerance);
        let v_closed = (0..n).all(|j| (grid[0][j] - grid[m - 1][j]).norm() <= tolerance)
            && self.profiles[0].is_equal(&self.profiles[m - 1], tolerance);
        (u_closed, v_closed)
    }
}

/// Pole-wise `a + b - c` of three surfaces sharing degrees and knot vectors
fn combine<T: FloatingPoint>(
    a: &NurbsSurface3D<T>,
    b: &NurbsSurface3D<T>,
    c: &NurbsSurface3D<T>,
) -> Result<NurbsSurface3D<T>> {
    let same_shape = |s: &NurbsSurface3D<T>| {
        s.u_degree() == a.u_degree()
            && s.v_degree() == a.v_degree()
            && s.control_points().len() == a.control_points().len()
            && s.control_points()
                .iter()
                .zip(a.control_points())
                .all(|(r, ra)| r.len() == ra.len())
    };
    if !same_shape(b) || !same_shape(c) {
        return Err(GordonError::Geometry(
            "surfaces to combine do not share a control point grid".to_string(),
        ));
    }

    let control_points = a
        .control_points()
        .iter()
        .zip(b.control_points())
        .zip(c.control_points())
        .map(|((ra, rb), rc)| {
            ra.iter()
                .zip(rb)
                .zip(rc)
                .map(|((pa, pb), pc)| OPoint::from(&pa.coords + &pb.coords - &pc.coords))
                .collect_vec()
        })
        .collect_vec();

    Ok(NurbsSurface3D::new(
        a.u_degree(),
        a.v_degree(),
        a.u_knots().to_vec(),
        a.v_knots().to_vec(),
        control_points,
    ))
}
