use argmin::core::{CostFunction, Gradient, Hessian};
use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimName, DimNameDiff, DimNameSub, Matrix2, Vector2, U1,
};

use crate::{curve::NurbsCurve, misc::FloatingPoint};

/// Squared distance between a point on curve `a` and a point on curve `b`
/// The cost is `|A(s) - B(t)|^2 / 2` over the parameter pair `(s, t)`,
/// the hessian is its Gauss-Newton approximation.
pub struct CurveIntersectionProblem<'a, T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    a: &'a NurbsCurve<T, D>,
    b: &'a NurbsCurve<T, D>,
}

impl<'a, T: FloatingPoint, D: DimName> CurveIntersectionProblem<'a, T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    pub fn new(a: &'a NurbsCurve<T, D>, b: &'a NurbsCurve<T, D>) -> Self {
        CurveIntersectionProblem { a, b }
    }

    /// Parameter domains of both curves
    pub fn domain(&self) -> ((T, T), (T, T)) {
        (self.a.knots_domain(), self.b.knots_domain())
    }

    fn constrain(&self, param: &Vector2<T>) -> (T, T) {
        let (da, db) = self.domain();
        (
            param[0].max(da.0).min(da.1),
            param[1].max(db.0).min(db.1),
        )
    }
}

impl<T: FloatingPoint, D: DimName> CostFunction for CurveIntersectionProblem<'_, T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    type Param = Vector2<T>;
    type Output = T;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, anyhow::Error> {
        let (s, t) = self.constrain(param);
        let p0 = self.a.point_at(s);
        let p1 = self.b.point_at(t);
        Ok((p0 - p1).norm_squared() * T::from_f64(0.5).unwrap())
    }
}

impl<T: FloatingPoint, D: DimName> Gradient for CurveIntersectionProblem<'_, T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    type Param = Vector2<T>;
    type Gradient = Vector2<T>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, anyhow::Error> {
        let (s, t) = self.constrain(param);
        let da = self.a.rational_derivatives(s, 1);
        let db = self.b.rational_derivatives(t, 1);
        let r = &da[0] - &db[0];
        Ok(Vector2::new(da[1].dot(&r), -db[1].dot(&r)))
    }
}

impl<T: FloatingPoint, D: DimName> Hessian for CurveIntersectionProblem<'_, T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    type Param = Vector2<T>;
    type Hessian = Matrix2<T>;

    fn hessian(&self, param: &Self::Param) -> Result<Self::Hessian, anyhow::Error> {
        let (s, t) = self.constrain(param);
        let da = self.a.rational_derivatives(s, 1);
        let db = self.b.rational_derivatives(t, 1);
        let aa = da[1].dot(&da[1]);
        let ab = da[1].dot(&db[1]);
        let bb = db[1].dot(&db[1]);
        Ok(Matrix2::new(aa, -ab, -ab, bb))
    }
}
