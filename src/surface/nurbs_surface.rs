use itertools::Itertools;
use nalgebra::allocator::Allocator;
use nalgebra::{Const, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint, U1};

use crate::curve::{dehomogenize, NurbsCurve};
use crate::knot::KnotVector;
use crate::misc::{transpose, FloatingPoint};

/// NURBS surface representation
/// by generics, it can be used for surfaces of any dimension with f32 or f64 scalar types
#[derive(Clone, Debug)]
pub struct NurbsSurface<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    /// control points with homogeneous coordinates, indexed as `[u][v]`
    /// the last element of the vector is the `weight`
    control_points: Vec<Vec<OPoint<T, D>>>,
    u_degree: usize,
    v_degree: usize,
    u_knots: KnotVector<T>,
    v_knots: KnotVector<T>,
}

/// 3D NURBS surface alias
pub type NurbsSurface3D<T> = NurbsSurface<T, Const<4>>;

impl<T: FloatingPoint, D: DimName> NurbsSurface<T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    /// Create a new NURBS surface without validation
    pub fn new(
        u_degree: usize,
        v_degree: usize,
        u_knots: Vec<T>,
        v_knots: Vec<T>,
        control_points: Vec<Vec<OPoint<T, D>>>,
    ) -> Self {
        Self {
            u_degree,
            v_degree,
            u_knots: KnotVector::new(u_knots),
            v_knots: KnotVector::new(v_knots),
            control_points,
        }
    }

    /// Create a new NURBS surface
    /// # Failures
    /// - the control point grid is empty or not rectangular
    /// - the knot counts do not match the control point counts and degrees
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::Point4;
    ///
    /// let control_points = vec![
    ///     vec![Point4::new(0., 0., 0., 1.), Point4::new(0., 1., 0., 1.)],
    ///     vec![Point4::new(1., 0., 0., 1.), Point4::new(1., 1., 1., 1.)],
    /// ];
    /// let knots = vec![0., 0., 1., 1.];
    /// let surface = NurbsSurface3D::try_new(1, 1, knots.clone(), knots, control_points).unwrap();
    /// assert_eq!(surface.point_at(0.5, 0.5), nalgebra::Point3::new(0.5, 0.5, 0.25));
    /// ```
    pub fn try_new(
        u_degree: usize,
        v_degree: usize,
        u_knots: Vec<T>,
        v_knots: Vec<T>,
        control_points: Vec<Vec<OPoint<T, D>>>,
    ) -> anyhow::Result<Self> {
        let nu = control_points.len();
        anyhow::ensure!(nu > u_degree, "Too few control points in u direction");
        let nv = control_points[0].len();
        anyhow::ensure!(nv > v_degree, "Too few control points in v direction");
        anyhow::ensure!(
            control_points.iter().all(|row| row.len() == nv),
            "Control point grid must be rectangular"
        );
        anyhow::ensure!(
            u_knots.len() == nu + u_degree + 1,
            "Invalid number of u knots, got {}, expected {}",
            u_knots.len(),
            nu + u_degree + 1
        );
        anyhow::ensure!(
            v_knots.len() == nv + v_degree + 1,
            "Invalid number of v knots, got {}, expected {}",
            v_knots.len(),
            nv + v_degree + 1
        );
        Ok(Self::new(
            u_degree,
            v_degree,
            u_knots,
            v_knots,
            control_points,
        ))
    }

    pub fn u_degree(&self) -> usize {
        self.u_degree
    }

    pub fn v_degree(&self) -> usize {
        self.v_degree
    }

    pub fn u_knots(&self) -> &KnotVector<T> {
        &self.u_knots
    }

    pub fn v_knots(&self) -> &KnotVector<T> {
        &self.v_knots
    }

    pub fn control_points(&self) -> &Vec<Vec<OPoint<T, D>>> {
        &self.control_points
    }

    /// Get the u domain of the knot vector by degree
    pub fn u_knots_domain(&self) -> (T, T) {
        self.u_knots.domain(self.u_degree)
    }

    /// Get the v domain of the knot vector by degree
    pub fn v_knots_domain(&self) -> (T, T) {
        self.v_knots.domain(self.v_degree)
    }

    /// Evaluate the surface at the given u, v parameters to get a point
    pub fn point_at(&self, u: T, v: T) -> OPoint<T, DimNameDiff<D, U1>> {
        let p = self.point(u, v);
        dehomogenize(&p).unwrap_or_else(OPoint::origin)
    }

    /// Evaluate the surface at the given u, v parameters to get a point in homogeneous coordinates
    pub fn point(&self, u: T, v: T) -> OPoint<T, D> {
        let n = self.u_knots.len() - self.u_degree - 2;
        let m = self.v_knots.len() - self.v_degree - 2;

        let knot_span_index_u = self.u_knots.find_knot_span_index(n, self.u_degree, u);
        let knot_span_index_v = self.v_knots.find_knot_span_index(m, self.v_degree, v);
        let u_basis_vals = self
            .u_knots
            .basis_functions(knot_span_index_u, u, self.u_degree);
        let v_basis_vals = self
            .v_knots
            .basis_functions(knot_span_index_v, v, self.v_degree);
        let uind = knot_span_index_u - self.u_degree;

        let mut position = OPoint::<T, D>::origin();
        for l in 0..=self.v_degree {
            let mut temp = OPoint::<T, D>::origin();
            let vind = knot_span_index_v - self.v_degree + l;

            // sample u isoline
            for k in 0..=self.u_degree {
                temp.coords += &self.control_points[uind + k][vind].coords * u_basis_vals[k];
            }

            // add point from u isoline
            position.coords += temp.coords * v_basis_vals[l];
        }

        position
    }

    /// Swap the u and v directions
    pub fn transposed(&self) -> Self {
        Self {
            control_points: transpose(&self.control_points),
            u_degree: self.v_degree,
            v_degree: self.u_degree,
            u_knots: self.v_knots.clone(),
            v_knots: self.u_knots.clone(),
        }
    }

    /// Control point columns of a constant v index as curves running along u
    fn u_direction_curves(&self) -> Vec<NurbsCurve<T, D>> {
        transpose(&self.control_points)
            .into_iter()
            .map(|column| NurbsCurve::new_unchecked(self.u_degree, column, self.u_knots.clone()))
            .collect()
    }

    /// Control point rows of a constant u index as curves running along v
    fn v_direction_curves(&self) -> Vec<NurbsCurve<T, D>> {
        self.control_points
            .iter()
            .map(|row| NurbsCurve::new_unchecked(self.v_degree, row.clone(), self.v_knots.clone()))
            .collect()
    }

    /// Apply a shape preserving curve operation to every control point column along u
    fn try_map_u_direction<F>(&self, f: F) -> anyhow::Result<Self>
    where
        F: Fn(&NurbsCurve<T, D>) -> anyhow::Result<NurbsCurve<T, D>>,
    {
        let curves = self
            .u_direction_curves()
            .iter()
            .map(&f)
            .collect::<anyhow::Result<Vec<_>>>()?;
        let first = curves
            .first()
            .ok_or(anyhow::anyhow!("Surface has no control points"))?;
        let (u_degree, u_knots) = (first.degree(), first.knots().clone());
        let columns = curves
            .iter()
            .map(|c| c.control_points().clone())
            .collect_vec();
        Ok(Self {
            control_points: transpose(&columns),
            u_degree,
            v_degree: self.v_degree,
            u_knots,
            v_knots: self.v_knots.clone(),
        })
    }

    /// Apply a shape preserving curve operation to every control point row along v
    fn try_map_v_direction<F>(&self, f: F) -> anyhow::Result<Self>
    where
        F: Fn(&NurbsCurve<T, D>) -> anyhow::Result<NurbsCurve<T, D>>,
    {
        let curves = self
            .v_direction_curves()
            .iter()
            .map(&f)
            .collect::<anyhow::Result<Vec<_>>>()?;
        let first = curves
            .first()
            .ok_or(anyhow::anyhow!("Surface has no control points"))?;
        let (v_degree, v_knots) = (first.degree(), first.knots().clone());
        Ok(Self {
            control_points: curves.iter().map(|c| c.control_points().clone()).collect(),
            u_degree: self.u_degree,
            v_degree,
            u_knots: self.u_knots.clone(),
            v_knots,
        })
    }

    /// Elevate the degrees in both directions without changing the shape
    /// Directions already at or above the target are left untouched
    pub fn try_elevate_degree(&self, u_degree: usize, v_degree: usize) -> anyhow::Result<Self> {
        let elevated = if u_degree > self.u_degree {
            self.try_map_u_direction(|c| c.try_elevate_degree(u_degree))?
        } else {
            self.clone()
        };
        if v_degree > elevated.v_degree {
            elevated.try_map_v_direction(|c| c.try_elevate_degree(v_degree))
        } else {
            Ok(elevated)
        }
    }

    /// Insert sorted knots into the u knot vector
    pub fn try_refine_u_knot(&self, knots_to_insert: Vec<T>) -> anyhow::Result<Self> {
        if knots_to_insert.is_empty() {
            return Ok(self.clone());
        }
        self.try_map_u_direction(|c| {
            let mut c = c.clone();
            c.try_refine_knot(knots_to_insert.clone())?;
            Ok(c)
        })
    }

    /// Insert sorted knots into the v knot vector
    pub fn try_refine_v_knot(&self, knots_to_insert: Vec<T>) -> anyhow::Result<Self> {
        if knots_to_insert.is_empty() {
            return Ok(self.clone());
        }
        self.try_map_v_direction(|c| {
            let mut c = c.clone();
            c.try_refine_knot(knots_to_insert.clone())?;
            Ok(c)
        })
    }
}

#[cfg(feature = "serde")]
impl<T, D: DimName> serde::Serialize for NurbsSurface<T, D>
where
    T: FloatingPoint + serde::Serialize,
    DefaultAllocator: Allocator<D>,
    <DefaultAllocator as Allocator<D>>::Buffer<T>: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("NurbsSurface", 5)?;
        state.serialize_field("control_points", &self.control_points)?;
        state.serialize_field("u_degree", &self.u_degree)?;
        state.serialize_field("v_degree", &self.v_degree)?;
        state.serialize_field("u_knots", &self.u_knots)?;
        state.serialize_field("v_knots", &self.v_knots)?;
        state.end()
    }
}
