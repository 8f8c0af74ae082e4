use nalgebra::allocator::Allocator;
use nalgebra::{
    Const, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint, OVector, U1,
};

use crate::knot::KnotVector;
use crate::misc::{point_spread, Binomial, FloatingPoint, Invertible};

/// NURBS curve representation
/// By generics, it can be used for curves of any dimension with f32 or f64 scalar types
#[derive(Clone, Debug)]
pub struct NurbsCurve<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    /// control points with homogeneous coordinates
    /// the last element of the vector is the `weight`
    control_points: Vec<OPoint<T, D>>,
    degree: usize,
    /// knot vector for the NURBS curve
    /// the length of the knot vector is equal to the `# of control points + degree + 1`
    knots: KnotVector<T>,
}

/// 3D NURBS curve alias
pub type NurbsCurve3D<T> = NurbsCurve<T, Const<4>>;

impl<T: FloatingPoint, D: DimName> NurbsCurve<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    /// Create a new NURBS curve
    /// # Failures
    /// - if the number of control points is not greater than the degree
    /// - the number of knots is not equal to the number of control points + the degree + 1
    ///
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::Point4;
    ///
    /// let control_points = vec![
    ///     Point4::new(0., 0., 0., 1.),
    ///     Point4::new(1., 2., 0., 1.),
    ///     Point4::new(3., 2., 1., 1.),
    ///     Point4::new(4., 0., 0., 1.),
    /// ];
    /// let curve = NurbsCurve3D::try_new(3, control_points, vec![0., 0., 0., 0., 1., 1., 1., 1.]);
    /// assert!(curve.is_ok());
    /// let invalid = NurbsCurve3D::<f64>::try_new(3, vec![], vec![0., 1.]);
    /// assert!(invalid.is_err());
    /// ```
    pub fn try_new(
        degree: usize,
        control_points: Vec<OPoint<T, D>>,
        knots: Vec<T>,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(degree > 0, "Degree must be at least 1");
        anyhow::ensure!(
            control_points.len() > degree,
            "Too few control points for curve"
        );
        anyhow::ensure!(
            knots.len() == control_points.len() + degree + 1,
            "Invalid number of knots, got {}, expected {}",
            knots.len(),
            control_points.len() + degree + 1
        );
        anyhow::ensure!(
            knots.iter().all(|k| k.is_finite()),
            "Knot vector contains non-finite values"
        );

        let mut knots = knots;
        knots.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let w = D::dim() - 1;
        anyhow::ensure!(
            control_points.iter().all(|p| p[w] > T::zero()),
            "Control point weights must be positive"
        );

        Ok(Self {
            degree,
            control_points,
            knots: KnotVector::new(knots),
        })
    }

    /// Create a new NURBS curve without validation
    pub(crate) fn new_unchecked(
        degree: usize,
        control_points: Vec<OPoint<T, D>>,
        knots: KnotVector<T>,
    ) -> Self {
        Self {
            degree,
            control_points,
            knots,
        }
    }

    /// Return the dehomogenized control points
    pub fn dehomogenized_control_points(&self) -> Vec<OPoint<T, DimNameDiff<D, U1>>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        self.control_points
            .iter()
            .filter_map(dehomogenize)
            .collect()
    }

    /// Evaluate the curve at a given parameter to get a dehomonogenized point
    pub fn point_at(&self, t: T) -> OPoint<T, DimNameDiff<D, U1>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let p = self.point(t);
        dehomogenize(&p).unwrap_or_else(OPoint::origin)
    }

    #[allow(clippy::type_complexity)]
    /// Sample the curve at a given number of points between the start and end
    /// Return the vector of tuples of parameter and point
    pub fn sample_regular_range_with_parameter(
        &self,
        start: T,
        end: T,
        samples: usize,
    ) -> Vec<(T, OPoint<T, DimNameDiff<D, U1>>)>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let us = T::from_usize(samples.max(2)).unwrap();
        let step = (end - start) / (us - T::one());
        (0..samples.max(2))
            .map(|i| {
                let t = if i + 1 == samples.max(2) {
                    end
                } else {
                    start + T::from_usize(i).unwrap() * step
                };
                (t, self.point_at(t))
            })
            .collect()
    }

    /// Evaluate the curve at a given parameter to get a point in homogeneous coordinates
    pub(crate) fn point(&self, t: T) -> OPoint<T, D> {
        let n = self.knots.len() - self.degree - 2;
        let knot_span_index = self.knots.find_knot_span_index(n, self.degree, t);
        let basis = self.knots.basis_functions(knot_span_index, t, self.degree);
        let mut position = OPoint::<T, D>::origin();
        for i in 0..=self.degree {
            position.coords +=
                &self.control_points[knot_span_index - self.degree + i].coords * basis[i];
        }
        position
    }

    /// Evaluate the rational derivatives at a given parameter
    /// The first element is the point itself
    pub fn rational_derivatives(
        &self,
        u: T,
        derivs: usize,
    ) -> Vec<OVector<T, DimNameDiff<D, U1>>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let ders = self.derivatives(u, derivs);
        let a_ders: Vec<_> = ders
            .iter()
            .map(|d| OVector::<T, DimNameDiff<D, U1>>::from_fn(|i, _| d[i]))
            .collect();
        let w_ders: Vec<_> = ders.iter().map(|d| d[D::dim() - 1]).collect();

        let mut ck: Vec<OVector<T, DimNameDiff<D, U1>>> = vec![];
        let mut binom = Binomial::<T>::new();
        for k in 0..=derivs {
            let mut v = a_ders[k].clone();
            for i in 1..=k {
                let coef = binom.get(k, i) * w_ders[i];
                v -= &ck[k - i] * coef;
            }
            ck.push(v / w_ders[0]);
        }
        ck
    }

    /// Evaluate the derivatives of the homogeneous curve at a given parameter
    fn derivatives(&self, u: T, derivs: usize) -> Vec<OVector<T, D>> {
        let n = self.knots.len() - self.degree - 2;
        let du = derivs.min(self.degree);
        let mut derivatives = vec![OVector::<T, D>::zeros(); derivs + 1];

        let knot_span_index = self.knots.find_knot_span_index(n, self.degree, u);
        let nders = self
            .knots
            .derivative_basis_functions(knot_span_index, u, self.degree, du);
        for k in 0..=du {
            for j in 0..=self.degree {
                let w = &self.control_points[knot_span_index - self.degree + j].coords
                    * nders[k][j];
                derivatives[k] += w;
            }
        }

        derivatives
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &KnotVector<T> {
        &self.knots
    }

    pub fn control_points(&self) -> &Vec<OPoint<T, D>> {
        &self.control_points
    }

    pub fn knots_domain(&self) -> (T, T) {
        self.knots.domain(self.degree)
    }

    pub fn knots_domain_interval(&self) -> T {
        let (d0, d1) = self.knots_domain();
        d1 - d0
    }

    /// Check if the curve is clamped
    pub fn is_clamped(&self) -> bool {
        self.knots.is_clamped(self.degree)
    }

    /// Characteristic size of the curve: the largest distance of a control point from the first one
    pub fn scale(&self) -> T
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        point_spread(&self.dehomogenized_control_points())
    }

    /// Check if the start and end points coincide within `tolerance`
    pub fn is_closed(&self, tolerance: T) -> bool
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let (start, end) = self.knots_domain();
        (self.point_at(start) - self.point_at(end)).norm() <= tolerance
    }

    /// Check if two curves trace the same shape in the same direction within `tolerance`
    /// Both curves are compared at the same relative positions of their domains
    pub fn is_equal(&self, other: &Self, tolerance: T) -> bool
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        const SAMPLES: usize = 32;
        let (a0, a1) = self.knots_domain();
        let (b0, b1) = other.knots_domain();
        let div = T::from_usize(SAMPLES - 1).unwrap();
        (0..SAMPLES).all(|i| {
            let s = T::from_usize(i).unwrap() / div;
            let pa = self.point_at(a0 + (a1 - a0) * s);
            let pb = other.point_at(b0 + (b1 - b0) * s);
            (pa - pb).norm() <= tolerance
        })
    }

    /// Map the parameter domain affinely onto [start, end] without changing the shape
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::Point3;
    /// use approx::assert_relative_eq;
    ///
    /// let points = vec![
    ///     Point3::new(0., 0., 0.),
    ///     Point3::new(1., 1., 0.),
    ///     Point3::new(2., 0., 1.),
    ///     Point3::new(3., 1., 1.),
    /// ];
    /// let curve = NurbsCurve3D::interpolate(&points, 3).unwrap();
    /// let reparametrized = curve.try_reparametrize(2., 5.).unwrap();
    /// assert_eq!(reparametrized.knots_domain(), (2., 5.));
    /// assert_relative_eq!(reparametrized.point_at(3.5), curve.point_at(0.5), epsilon = 1e-12);
    /// ```
    pub fn try_reparametrize(&self, start: T, end: T) -> anyhow::Result<Self> {
        anyhow::ensure!(
            start < end,
            "Invalid parameter range: {} must be less than {}",
            start,
            end
        );
        let domain = self.knots_domain();
        anyhow::ensure!(domain.0 < domain.1, "Curve has a degenerate domain");
        Ok(Self {
            degree: self.degree,
            control_points: self.control_points.clone(),
            knots: self.knots.rescaled(domain, (start, end)),
        })
    }

    /// Try to refine the curve by inserting knots (The NURBS Book A5.4)
    /// `knots_to_insert` must be sorted in ascending order
    pub fn try_refine_knot(&mut self, knots_to_insert: Vec<T>) -> anyhow::Result<()> {
        anyhow::ensure!(self.is_clamped(), "Curve must be clamped to refine knots");

        if knots_to_insert.is_empty() {
            return Ok(());
        }

        let degree = self.degree;
        let control_points = &self.control_points;

        let n = control_points.len() - 1;
        let m = n + degree + 1;
        let r = knots_to_insert.len() - 1;
        let a = self
            .knots
            .find_knot_span_index(n, degree, knots_to_insert[0]);
        let b = self
            .knots
            .find_knot_span_index(n, degree, knots_to_insert[r])
            + 1;

        let mut control_points_post = vec![OPoint::<T, D>::origin(); n + r + 2];
        let mut knots_post = vec![T::zero(); m + r + 2];

        control_points_post[..((a - degree) + 1)]
            .clone_from_slice(&control_points[..((a - degree) + 1)]);
        for i in (b - 1)..=n {
            control_points_post[i + r + 1] = control_points[i].clone();
        }

        for i in 0..=a {
            knots_post[i] = self.knots[i];
        }
        for i in (b + degree)..=m {
            knots_post[i + r + 1] = self.knots[i];
        }

        let mut i = b + degree - 1;
        let mut k = b + degree + r;

        for j in (0..=r).rev() {
            while knots_to_insert[j] <= self.knots[i] && i > a {
                control_points_post[k - degree - 1] = control_points[i - degree - 1].clone();
                knots_post[k] = self.knots[i];
                k -= 1;
                i -= 1;
            }
            control_points_post[k - degree - 1] = control_points_post[k - degree].clone();
            for l in 1..=degree {
                let ind = k - degree + l;
                let alpha = knots_post[k + l] - knots_to_insert[j];
                if alpha.abs() < T::default_epsilon() {
                    control_points_post[ind - 1] = control_points_post[ind].clone();
                } else {
                    let denom = knots_post[k + l] - self.knots[i - degree + l];
                    let weight = if denom != T::zero() {
                        alpha / denom
                    } else {
                        T::zero()
                    };
                    control_points_post[ind - 1] = control_points_post[ind - 1]
                        .lerp(&control_points_post[ind], T::one() - weight);
                }
            }
            knots_post[k] = knots_to_insert[j];
            k -= 1;
        }

        self.knots = KnotVector::new(knots_post);
        self.control_points = control_points_post;

        Ok(())
    }

    /// Elevate the degree of the curve to `target_degree` without changing its shape
    /// (The NURBS Book A5.9)
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::Point3;
    /// use approx::assert_relative_eq;
    ///
    /// let points = vec![
    ///     Point3::new(0., 0., 0.),
    ///     Point3::new(1., 2., 0.),
    ///     Point3::new(2., -1., 1.),
    ///     Point3::new(4., 0., 1.),
    ///     Point3::new(5., 2., 2.),
    /// ];
    /// let curve = NurbsCurve3D::interpolate(&points, 2).unwrap();
    /// let elevated = curve.try_elevate_degree(4).unwrap();
    /// assert_eq!(elevated.degree(), 4);
    /// for i in 0..=10 {
    ///     let t = i as f64 / 10.;
    ///     assert_relative_eq!(curve.point_at(t), elevated.point_at(t), epsilon = 1e-10);
    /// }
    /// ```
    pub fn try_elevate_degree(&self, target_degree: usize) -> anyhow::Result<Self> {
        if target_degree <= self.degree {
            return Ok(self.clone());
        }
        anyhow::ensure!(self.is_clamped(), "Curve must be clamped to elevate degree");

        let p = self.degree;
        let t = target_degree - p;
        let ph = target_degree;
        let ph2 = ph / 2;
        let knots = self.knots.as_slice();
        let pw = &self.control_points;
        let n = pw.len() - 1;
        let m = n + p + 1;

        // coefficients for degree elevating the Bezier segments
        let mut binom = Binomial::<T>::new();
        let mut bezalfs = vec![vec![T::zero(); p + 1]; ph + 1];
        bezalfs[0][0] = T::one();
        bezalfs[ph][p] = T::one();
        for i in 1..=ph2 {
            let inv = T::one() / binom.get(ph, i);
            for j in i.saturating_sub(t)..=p.min(i) {
                bezalfs[i][j] = inv * binom.get(p, j) * binom.get(t, i - j);
            }
        }
        for i in (ph2 + 1)..ph {
            for j in i.saturating_sub(t)..=p.min(i) {
                bezalfs[i][j] = bezalfs[ph - i][p - j];
            }
        }

        let capacity = (n + 1) + t * (m + 1);
        let origin = OPoint::<T, D>::origin();
        let mut qw = vec![origin.clone(); capacity];
        let mut uh = vec![T::zero(); capacity + ph + 1];
        let mut bpts = vec![origin.clone(); p + 1];
        let mut next_bpts = vec![origin.clone(); p.max(2) - 1];
        let mut ebpts = vec![origin.clone(); ph + 1];
        let mut alfs = vec![T::zero(); p.max(2) - 1];

        let mut mh = ph;
        let mut kind = ph + 1;
        let mut r: isize = -1;
        let mut a = p;
        let mut b = p + 1;
        let mut cind = 1;
        let mut ua = knots[0];
        qw[0] = pw[0].clone();
        for v in uh.iter_mut().take(ph + 1) {
            *v = ua;
        }
        bpts[..=p].clone_from_slice(&pw[..=p]);

        while b < m {
            let i = b;
            while b < m && knots[b] == knots[b + 1] {
                b += 1;
            }
            let mul = b - i + 1;
            mh += mul + t;
            let ub = knots[b];
            let oldr = r;
            r = p as isize - mul as isize;

            // insert knot ub r times
            let lbz = if oldr > 0 { ((oldr + 2) / 2) as usize } else { 1 };
            let rbz = if r > 0 {
                ph - ((r + 1) / 2) as usize
            } else {
                ph
            };

            if r > 0 {
                let numer = ub - ua;
                let mut k = p;
                while k > mul {
                    alfs[k - mul - 1] = numer / (knots[a + k] - ua);
                    k -= 1;
                }
                for j in 1..=(r as usize) {
                    let save = r as usize - j;
                    let s = mul + j;
                    let mut k = p;
                    while k >= s {
                        bpts[k] = bpts[k].lerp(&bpts[k - 1], T::one() - alfs[k - s]);
                        k -= 1;
                    }
                    next_bpts[save] = bpts[p].clone();
                }
            }

            // degree elevate the Bezier segment
            for i in lbz..=ph {
                let mut e = OPoint::<T, D>::origin();
                for j in i.saturating_sub(t)..=p.min(i) {
                    e.coords += &bpts[j].coords * bezalfs[i][j];
                }
                ebpts[i] = e;
            }

            // remove knot ua oldr times
            if oldr > 1 {
                let mut first = kind - 2;
                let mut last = kind;
                let den = ub - ua;
                let bet = (ub - uh[kind - 1]) / den;
                for tr in 1..oldr {
                    let mut i = first;
                    let mut j = last;
                    let mut kj = (j - kind + 1) as isize;
                    while (j as isize - i as isize) > tr {
                        if i < cind {
                            let alf = (ub - uh[i]) / (ua - uh[i]);
                            qw[i] = qw[i].lerp(&qw[i - 1], T::one() - alf);
                        }
                        if j >= lbz {
                            let kju = kj as usize;
                            if (j as isize - tr) <= (kind as isize - ph as isize + oldr) {
                                let gam = (ub - uh[(j as isize - tr) as usize]) / den;
                                ebpts[kju] = ebpts[kju].lerp(&ebpts[kju + 1], T::one() - gam);
                            } else {
                                ebpts[kju] = ebpts[kju].lerp(&ebpts[kju + 1], T::one() - bet);
                            }
                        }
                        i += 1;
                        j -= 1;
                        kj -= 1;
                    }
                    first -= 1;
                    last += 1;
                }
            }

            // load the knot ua
            if a != p {
                for _ in 0..(ph as isize - oldr) {
                    uh[kind] = ua;
                    kind += 1;
                }
            }

            // load control points into qw
            for j in lbz..=rbz {
                qw[cind] = ebpts[j].clone();
                cind += 1;
            }

            if b < m {
                let ru = r.max(0) as usize;
                bpts[..ru].clone_from_slice(&next_bpts[..ru]);
                for j in ru..=p {
                    bpts[j] = pw[b - p + j].clone();
                }
                a = b;
                b += 1;
                ua = ub;
            } else {
                for i in 0..=ph {
                    uh[kind + i] = ub;
                }
            }
        }

        let nh = mh - ph - 1;
        qw.truncate(nh + 1);
        uh.truncate(nh + ph + 2);

        Ok(Self {
            degree: target_degree,
            control_points: qw,
            knots: KnotVector::new(uh),
        })
    }
}

impl<T: FloatingPoint, D: DimName> Invertible for NurbsCurve<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    /// Reverse the direction of the curve
    /// # Example
    /// ```
    /// use gordon::prelude::*;
    /// use nalgebra::Point3;
    /// use approx::assert_relative_eq;
    /// let points = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 1.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    ///     Point3::new(0.0, 1.0, 1.0),
    /// ];
    /// let mut curve = NurbsCurve3D::interpolate(&points, 3).unwrap();
    /// curve.invert();
    /// let (start, end) = curve.knots_domain();
    /// assert_relative_eq!(curve.point_at(start), points[points.len() - 1]);
    /// assert_relative_eq!(curve.point_at(end), points[0]);
    /// ```
    fn invert(&mut self) {
        self.control_points.reverse();
        self.knots.invert();
    }
}

/// Largest scale among a set of curves
pub fn curves_scale<T: FloatingPoint, D: DimName>(curves: &[NurbsCurve<T, D>]) -> T
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    curves
        .iter()
        .fold(T::zero(), |acc, c| acc.max(c.scale()))
}

/// Dehomogenize a point
pub fn dehomogenize<T: FloatingPoint, D: DimName>(
    point: &OPoint<T, D>,
) -> Option<OPoint<T, DimNameDiff<D, U1>>>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    let v = &point.coords;
    let idx = D::dim() - 1;
    let w = v[idx];
    if w != T::zero() {
        let coords =
            v.generic_view((0, 0), (<D as DimNameSub<U1>>::Output::name(), Const::<1>)) / w;
        Some(OPoint { coords })
    } else {
        None
    }
}

#[cfg(feature = "serde")]
impl<T, D: DimName> serde::Serialize for NurbsCurve<T, D>
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
        let mut state = serializer.serialize_struct("NurbsCurve", 3)?;
        state.serialize_field("control_points", &self.control_points)?;
        state.serialize_field("degree", &self.degree)?;
        state.serialize_field("knots", &self.knots)?;
        state.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, T, D: DimName> serde::Deserialize<'de> for NurbsCurve<T, D>
where
    T: FloatingPoint + serde::Deserialize<'de>,
    DefaultAllocator: Allocator<D>,
    <DefaultAllocator as Allocator<D>>::Buffer<T>: serde::Deserialize<'de>,
{
    fn deserialize<S>(deserializer: S) -> Result<Self, S::Error>
    where
        S: serde::Deserializer<'de>,
    {
        use serde::de::{self, MapAccess, Visitor};

        #[derive(Debug)]
        enum Field {
            ControlPoints,
            Degree,
            Knots,
        }

        impl<'de> serde::Deserialize<'de> for Field {
            fn deserialize<S>(deserializer: S) -> Result<Self, S::Error>
            where
                S: serde::Deserializer<'de>,
            {
                struct FieldVisitor;

                impl Visitor<'_> for FieldVisitor {
                    type Value = Field;

                    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                        formatter.write_str("`control_points` or `degree` or `knots`")
                    }

                    fn visit_str<E>(self, value: &str) -> Result<Field, E>
                    where
                        E: de::Error,
                    {
                        match value {
                            "control_points" => Ok(Field::ControlPoints),
                            "degree" => Ok(Field::Degree),
                            "knots" => Ok(Field::Knots),
                            _ => Err(de::Error::unknown_field(value, FIELDS)),
                        }
                    }
                }

                deserializer.deserialize_identifier(FieldVisitor)
            }
        }

        struct NurbsCurveVisitor<T, D>(std::marker::PhantomData<(T, D)>);

        impl<'de, T, D: DimName> Visitor<'de> for NurbsCurveVisitor<T, D>
        where
            T: FloatingPoint + serde::Deserialize<'de>,
            DefaultAllocator: Allocator<D>,
            <DefaultAllocator as Allocator<D>>::Buffer<T>: serde::Deserialize<'de>,
        {
            type Value = NurbsCurve<T, D>;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("struct NurbsCurve")
            }

            fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut control_points: Option<Vec<OPoint<T, D>>> = None;
                let mut degree = None;
                let mut knots: Option<KnotVector<T>> = None;
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::ControlPoints => {
                            if control_points.is_some() {
                                return Err(de::Error::duplicate_field("control_points"));
                            }
                            control_points = Some(map.next_value()?);
                        }
                        Field::Degree => {
                            if degree.is_some() {
                                return Err(de::Error::duplicate_field("degree"));
                            }
                            degree = Some(map.next_value()?);
                        }
                        Field::Knots => {
                            if knots.is_some() {
                                return Err(de::Error::duplicate_field("knots"));
                            }
                            knots = Some(map.next_value()?);
                        }
                    }
                }

                let control_points =
                    control_points.ok_or_else(|| de::Error::missing_field("control_points"))?;
                let degree = degree.ok_or_else(|| de::Error::missing_field("degree"))?;
                let knots = knots.ok_or_else(|| de::Error::missing_field("knots"))?;
                NurbsCurve::try_new(degree, control_points, knots.to_vec())
                    .map_err(|e| de::Error::custom(e.to_string()))
            }
        }

        const FIELDS: &[&str] = &["control_points", "degree", "knots"];
        deserializer.deserialize_struct(
            "NurbsCurve",
            FIELDS,
            NurbsCurveVisitor::<T, D>(std::marker::PhantomData),
        )
    }
}
