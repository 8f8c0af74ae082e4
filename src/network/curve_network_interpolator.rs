use std::sync::OnceLock;

use argmin::core::ArgminFloat;
use log::info;

use crate::{
    curve::NurbsCurve3D,
    misc::FloatingPoint,
    surface::NurbsSurface3D,
};

use super::{error::Result, GordonOptions, GordonSurfaceBuilder, NetworkCompatibilizer};

/// Everything produced by interpolating a curve network
#[derive(Clone, Debug)]
pub struct CurveNetworkInterpolation<T: FloatingPoint> {
    pub gordon: NurbsSurface3D<T>,
    pub profile_skin: NurbsSurface3D<T>,
    pub guide_skin: NurbsSurface3D<T>,
    pub tensor: NurbsSurface3D<T>,
    /// Parameter of every guide along the profiles
    pub u_params: Vec<T>,
    /// Parameter of every profile along the guides
    pub v_params: Vec<T>,
    pub reparametrized_profiles: Vec<NurbsCurve3D<T>>,
    pub reparametrized_guides: Vec<NurbsCurve3D<T>>,
}

/// Interpolates a curve network on first access and keeps the outcome
/// The accessors never recompute, errors included.
#[derive(Debug)]
pub struct CurveNetworkInterpolator<T: FloatingPoint> {
    profiles: Vec<NurbsCurve3D<T>>,
    guides: Vec<NurbsCurve3D<T>>,
    tolerance: T,
    options: GordonOptions<T>,
    result: OnceLock<Result<CurveNetworkInterpolation<T>>>,
}

impl<T: FloatingPoint + ArgminFloat> CurveNetworkInterpolator<T> {
    /// The curves are copied, `tolerance` is relative to the size of the network
    pub fn new(profiles: &[NurbsCurve3D<T>], guides: &[NurbsCurve3D<T>], tolerance: T) -> Self {
        Self {
            profiles: profiles.to_vec(),
            guides: guides.to_vec(),
            tolerance,
            options: GordonOptions::default(),
            result: OnceLock::new(),
        }
    }

    pub fn with_options(mut self, options: GordonOptions<T>) -> Self {
        self.options = options;
        self.result = OnceLock::new();
        self
    }

    /// The interpolation result, computed on the first call
    pub fn interpolation(&self) -> Result<&CurveNetworkInterpolation<T>> {
        self.result
            .get_or_init(|| self.compute())
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn surface(&self) -> Result<&NurbsSurface3D<T>> {
        self.interpolation().map(|r| &r.gordon)
    }

    pub fn profile_skin(&self) -> Result<&NurbsSurface3D<T>> {
        self.interpolation().map(|r| &r.profile_skin)
    }

    pub fn guide_skin(&self) -> Result<&NurbsSurface3D<T>> {
        self.interpolation().map(|r| &r.guide_skin)
    }

    pub fn tensor(&self) -> Result<&NurbsSurface3D<T>> {
        self.interpolation().map(|r| &r.tensor)
    }

    pub fn u_params(&self) -> Result<&[T]> {
        self.interpolation().map(|r| r.u_params.as_slice())
    }

    pub fn v_params(&self) -> Result<&[T]> {
        self.interpolation().map(|r| r.v_params.as_slice())
    }

    pub fn reparametrized_profiles(&self) -> Result<&[NurbsCurve3D<T>]> {
        self.interpolation()
            .map(|r| r.reparametrized_profiles.as_slice())
    }

    pub fn reparametrized_guides(&self) -> Result<&[NurbsCurve3D<T>]> {
        self.interpolation()
            .map(|r| r.reparametrized_guides.as_slice())
    }

    fn compute(&self) -> Result<CurveNetworkInterpolation<T>> {
        info!(
            "interpolating a network of {} profiles and {} guides",
            self.profiles.len(),
            self.guides.len()
        );
        let network = NetworkCompatibilizer::new(&self.profiles, &self.guides, self.tolerance)
            .with_options(self.options.clone())
            .try_compatibilize()?;
        let surfaces = GordonSurfaceBuilder::new(
            &network.profiles,
            &network.guides,
            &network.u_params,
            &network.v_params,
            self.tolerance,
        )
        .with_options(self.options.clone())
        .try_build()?;

        Ok(CurveNetworkInterpolation {
            gordon: surfaces.gordon,
            profile_skin: surfaces.profile_skin,
            guide_skin: surfaces.guide_skin,
            tensor: surfaces.tensor,
            u_params: network.u_params,
            v_params: network.v_params,
            reparametrized_profiles: network.profiles,
            reparametrized_guides: network.guides,
        })
    }
}

/// Interpolate a network of intersecting profiles and guides with a Gordon surface
/// `tolerance` is relative to the size of the network.
pub fn try_interpolate_curve_network<T: FloatingPoint + ArgminFloat>(
    profiles: &[NurbsCurve3D<T>],
    guides: &[NurbsCurve3D<T>],
    tolerance: T,
) -> Result<CurveNetworkInterpolation<T>> {
    CurveNetworkInterpolator::new(profiles, guides, tolerance)
        .interpolation()
        .cloned()
}

impl<T: FloatingPoint + ArgminFloat> NurbsSurface3D<T> {
    /// Gordon surface through a network of intersecting profiles and guides
    /// The profiles run along u, the guides along v.
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::Point3;
    /// use approx::assert_relative_eq;
    ///
    /// let f = |u: f64, v: f64| Point3::new(u, v, u * v + 0.5 * u * u);
    /// let ts = [0., 1. / 3., 2. / 3., 1.];
    /// let iso = |g: &dyn Fn(f64) -> Point3<f64>| {
    ///     let points: Vec<_> = ts.iter().map(|t| g(*t)).collect();
    ///     NurbsCurve3D::try_interpolate_with_parameters(&points, &ts, 3, false).unwrap()
    /// };
    /// let profiles: Vec<_> = [0., 0.5, 1.].iter().map(|v| iso(&|u| f(u, *v))).collect();
    /// let guides: Vec<_> = [0., 0.4, 1.].iter().map(|u| iso(&|v| f(*u, v))).collect();
    ///
    /// let surface = NurbsSurface3D::try_gordon(&profiles, &guides, 1e-4).unwrap();
    /// assert_relative_eq!(surface.point_at(0.4, 0.5), f(0.4, 0.5), epsilon = 1e-6);
    /// ```
    pub fn try_gordon(
        profiles: &[NurbsCurve3D<T>],
        guides: &[NurbsCurve3D<T>],
        tolerance: T,
    ) -> Result<Self> {
        try_interpolate_curve_network(profiles, guides, tolerance).map(|r| r.gordon)
    }
}
