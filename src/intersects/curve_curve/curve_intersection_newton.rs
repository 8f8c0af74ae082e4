use argmin::{argmin_error, argmin_error_closure, core::*, float};
use nalgebra::{Matrix2, Vector2};

use crate::misc::FloatingPoint;

/// Gauss-Newton solver for the parameters of a curve-curve intersection
/// Steps are clamped to the knot domains and halved while they increase the cost.
#[derive(Clone, Copy)]
pub struct CurveIntersectionNewton<F> {
    knot_domain: ((F, F), (F, F)),
    step_size_tolerance: F,
    cost_tolerance: F,
}

impl<F> CurveIntersectionNewton<F>
where
    F: FloatingPoint + ArgminFloat,
{
    pub fn new(knot_domain: ((F, F), (F, F))) -> Self {
        Self {
            knot_domain,
            step_size_tolerance: F::from_f64(1e-12).unwrap(),
            cost_tolerance: F::from_f64(1e-24).unwrap(),
        }
    }

    pub fn with_step_size_tolerance(mut self, step_size_tolerance: F) -> Self {
        self.step_size_tolerance = step_size_tolerance;
        self
    }

    pub fn with_cost_tolerance(mut self, cost_tolerance: F) -> Self {
        self.cost_tolerance = cost_tolerance;
        self
    }

    fn constrain(&self, param: Vector2<F>) -> Vector2<F> {
        let (a, b) = self.knot_domain;
        Vector2::new(clamp(param[0], a), clamp(param[1], b))
    }
}

fn clamp<F: FloatingPoint>(value: F, domain: (F, F)) -> F {
    if value < domain.0 {
        domain.0
    } else if value > domain.1 {
        domain.1
    } else {
        value
    }
}

impl<O, F> Solver<O, IterState<Vector2<F>, Vector2<F>, (), (), (), F>>
    for CurveIntersectionNewton<F>
where
    O: CostFunction<Param = Vector2<F>, Output = F>
        + Gradient<Param = Vector2<F>, Gradient = Vector2<F>>
        + Hessian<Param = Vector2<F>, Hessian = Matrix2<F>>,
    F: FloatingPoint + ArgminFloat,
{
    const NAME: &'static str = "Curve intersection newton method";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: IterState<Vector2<F>, Vector2<F>, (), (), (), F>,
    ) -> Result<
        (
            IterState<Vector2<F>, Vector2<F>, (), (), (), F>,
            Option<KV>,
        ),
        Error,
    > {
        let param = *state.get_param().ok_or_else(argmin_error_closure!(
            NotInitialized,
            concat!(
                "`CurveIntersectionNewton` requires an initial parameter vector. ",
                "Please provide an initial guess via `Executor`s `configure` method."
            )
        ))?;
        let param = self.constrain(param);
        let cost = problem.cost(&param)?;
        Ok((state.param(param).cost(cost), None))
    }

    fn next_iter(
        &mut self,
        problem: &mut Problem<O>,
        state: IterState<Vector2<F>, Vector2<F>, (), (), (), F>,
    ) -> Result<
        (
            IterState<Vector2<F>, Vector2<F>, (), (), (), F>,
            Option<KV>,
        ),
        Error,
    > {
        let param = *state.get_param().ok_or_else(argmin_error_closure!(
            NotInitialized,
            concat!(
                "`CurveIntersectionNewton` requires an initial parameter vector. ",
                "Please provide an initial guess via `Executor`s `configure` method."
            )
        ))?;
        let cost = state.get_cost();

        let gradient = problem.gradient(&param)?;
        let hessian = problem.hessian(&param)?;
        let Some(delta) = hessian.lu().solve(&-gradient) else {
            return Err(argmin_error!(
                PotentialBug,
                "Curve intersection hessian is singular"
            ));
        };

        let half: F = float!(0.5);
        let mut step = delta;
        for _ in 0..16 {
            let candidate = self.constrain(param + step);
            let candidate_cost = problem.cost(&candidate)?;
            if candidate_cost <= cost {
                return Ok((
                    state
                        .param(candidate)
                        .gradient(gradient)
                        .cost(candidate_cost),
                    None,
                ));
            }
            step *= half;
        }

        // no descent along the newton direction
        Ok((state.param(param).cost(cost), None))
    }

    fn terminate(
        &mut self,
        state: &IterState<Vector2<F>, Vector2<F>, (), (), (), F>,
    ) -> TerminationStatus {
        if state.get_iter() >= state.get_max_iters() {
            return TerminationStatus::Terminated(TerminationReason::MaxItersReached);
        }

        if state.get_cost() < self.cost_tolerance {
            return TerminationStatus::Terminated(TerminationReason::SolverConverged);
        }

        if let (Some(current), Some(prev)) = (state.get_param(), state.get_prev_param()) {
            if state.get_iter() > 0 && (current - prev).norm() < self.step_size_tolerance {
                return TerminationStatus::Terminated(TerminationReason::SolverConverged);
            }
        }

        TerminationStatus::NotTerminated
    }
}
