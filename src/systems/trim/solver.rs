use std::cell::RefCell;

use argmin::{
    core::{CostFunction, Error as ArgminError, Executor, Gradient},
    solver::{linesearch::MoreThuenteLineSearch, quasinewton::LBFGS},
};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::components::{TrimResult, TrimSolverConfig, TrimTermination};
use crate::physics::PhysicsError;

type TrimLineSearch = MoreThuenteLineSearch<Vec<f64>, Vec<f64>, f64>;
type TrimLbfgs = LBFGS<TrimLineSearch, Vec<f64>, Vec<f64>, f64>;

/// Correction pairs kept by L-BFGS
const LBFGS_MEMORY: usize = 7;
/// Residual evaluations allowed per iteration and per Jacobian column,
/// line-search trials included
const EVALUATIONS_PER_ITERATION: usize = 20;

/// A bounded root-finding problem.
pub trait TrimProblem {
    fn dimension(&self) -> usize {
        self.bounds().len()
    }
    /// Inclusive `(lower, upper)` bounds, one pair per parameter
    fn bounds(&self) -> Vec<(f64, f64)>;
    fn initial_guess(&self) -> DVector<f64>;
    /// Residual vector whose norm the solver drives below tolerance
    fn residuals(&mut self, params: &DVector<f64>) -> Result<DVector<f64>, PhysicsError>;
}

/// Reason the search left argmin through an error
#[derive(Debug)]
enum Interruption {
    NonFinite,
    Budget,
    Physics(PhysicsError),
}

/// Bookkeeping that outlives the executor, so an aborted run still reports
/// its best estimate.
#[derive(Debug, Default)]
struct SearchLog {
    best: Option<(DVector<f64>, f64)>,
    last: Option<(DVector<f64>, DVector<f64>)>,
    evaluations: usize,
    jacobians: usize,
    interruption: Option<Interruption>,
}

/// argmin view of a [`TrimProblem`]: the cost is the squared residual norm
/// and the gradient `2 J^T r` uses a forward-difference Jacobian. Parameters
/// are clamped to their bounds before every evaluation.
struct TrimCost<'a, P: ?Sized> {
    problem: RefCell<&'a mut P>,
    bounds: &'a [(f64, f64)],
    perturbation: f64,
    budget: usize,
    log: &'a RefCell<SearchLog>,
}

impl<P: TrimProblem + ?Sized> TrimCost<'_, P> {
    fn clamped(&self, param: &[f64]) -> DVector<f64> {
        DVector::from_iterator(
            param.len(),
            param
                .iter()
                .zip(self.bounds)
                .map(|(&value, &(lower, upper))| value.clamp(lower, upper)),
        )
    }

    fn interrupt(&self, reason: Interruption) -> ArgminError {
        let message = match &reason {
            Interruption::NonFinite => "non-finite trim residual".to_string(),
            Interruption::Budget => format!("trim exceeded {} residual evaluations", self.budget),
            Interruption::Physics(e) => e.to_string(),
        };
        self.log.borrow_mut().interruption = Some(reason);
        ArgminError::msg(message)
    }

    fn residuals(&self, params: &DVector<f64>) -> Result<DVector<f64>, ArgminError> {
        let cached = self
            .log
            .borrow()
            .last
            .as_ref()
            .filter(|(at, _)| at == params)
            .map(|(_, residual)| residual.clone());
        if let Some(residual) = cached {
            return Ok(residual);
        }
        if self.log.borrow().evaluations >= self.budget {
            return Err(self.interrupt(Interruption::Budget));
        }
        self.log.borrow_mut().evaluations += 1;

        let residual = match self.problem.borrow_mut().residuals(params) {
            Ok(residual) => residual,
            Err(e) => return Err(self.interrupt(Interruption::Physics(e))),
        };
        if !residual.iter().all(|x| x.is_finite()) {
            return Err(self.interrupt(Interruption::NonFinite));
        }

        let norm = residual.norm();
        let mut log = self.log.borrow_mut();
        if log.best.as_ref().map_or(true, |(_, best)| norm < *best) {
            log.best = Some((params.clone(), norm));
        }
        log.last = Some((params.clone(), residual.clone()));
        Ok(residual)
    }

    /// Forward-difference Jacobian. Perturbations flip direction at an upper
    /// bound.
    fn jacobian(
        &self,
        params: &DVector<f64>,
        residual: &DVector<f64>,
    ) -> Result<DMatrix<f64>, ArgminError> {
        self.log.borrow_mut().jacobians += 1;
        let n = params.len();
        let m = residual.len();
        let mut jacobian = DMatrix::zeros(m, n);

        for j in 0..n {
            let (lower, upper) = self.bounds[j];
            let mut h = self.perturbation * params[j].abs().max(1.0);
            if params[j] + h > upper && params[j] - h >= lower {
                h = -h;
            }

            let mut perturbed = params.clone();
            perturbed[j] += h;
            let perturbed_residual = self.residuals(&perturbed)?;
            if perturbed_residual.len() != m {
                return Err(self.interrupt(Interruption::Physics(
                    PhysicsError::ComputationError(format!(
                        "residual length changed from {} to {}",
                        m,
                        perturbed_residual.len()
                    )),
                )));
            }
            jacobian.set_column(j, &((perturbed_residual - residual) / h));
        }

        Ok(jacobian)
    }
}

impl<P: TrimProblem + ?Sized> CostFunction for TrimCost<'_, P> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, ArgminError> {
        Ok(self.residuals(&self.clamped(param))?.norm_squared())
    }
}

impl<P: TrimProblem + ?Sized> Gradient for TrimCost<'_, P> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, ArgminError> {
        let params = self.clamped(param);
        let residual = self.residuals(&params)?;
        let jacobian = self.jacobian(&params, &residual)?;
        let mut gradient = jacobian.transpose() * residual * 2.0;

        // Pushing further past a bound does not move the clamped point
        for (j, g) in gradient.iter_mut().enumerate() {
            let (lower, upper) = self.bounds[j];
            if (param[j] >= upper && *g < 0.0) || (param[j] <= lower && *g > 0.0) {
                *g = 0.0;
            }
        }
        Ok(gradient.iter().copied().collect())
    }
}

/// Bounded least-squares trim search.
///
/// Minimises the squared residual norm with argmin's L-BFGS and a More-Thuente
/// line search. Parameters never leave their bounds. The search stops at
/// `max_iterations`, and a hard budget on residual evaluations bounds the line
/// searches inside those iterations. A NaN or infinite residual ends it at
/// once.
#[derive(Debug, Clone)]
pub struct TrimSolver {
    config: TrimSolverConfig,
}

fn solver_error(e: ArgminError) -> PhysicsError {
    PhysicsError::ComputationError(format!("trim solver setup: {}", e))
}

impl TrimSolver {
    pub fn new(config: TrimSolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrimSolverConfig {
        &self.config
    }

    pub fn solve<P: TrimProblem + ?Sized>(&self, problem: &mut P) -> Result<TrimResult, PhysicsError> {
        self.config.validate().map_err(PhysicsError::InvalidParameter)?;

        let bounds = problem.bounds();
        let initial = problem.initial_guess();
        if initial.len() != bounds.len() || initial.len() != problem.dimension() {
            return Err(PhysicsError::InvalidParameter(format!(
                "trim problem has {} parameters but {} bounds",
                initial.len(),
                bounds.len()
            )));
        }
        if let Some((lower, upper)) = bounds.iter().find(|(lower, upper)| !(lower <= upper)) {
            return Err(PhysicsError::InvalidParameter(format!(
                "empty trim bound ({}, {})",
                lower, upper
            )));
        }

        let max_iterations = self.config.max_iterations;
        let tolerance = self.config.tolerance;
        let log = RefCell::new(SearchLog::default());
        let cost = TrimCost {
            problem: RefCell::new(problem),
            bounds: &bounds,
            perturbation: self.config.perturbation,
            budget: max_iterations
                .saturating_mul(EVALUATIONS_PER_ITERATION)
                .saturating_mul(bounds.len() + 1),
            log: &log,
        };
        let start = cost.clamped(initial.as_slice());

        let linesearch: TrimLineSearch = MoreThuenteLineSearch::new()
            .with_c(1e-4, 0.9)
            .map_err(solver_error)?;
        let solver: TrimLbfgs = LBFGS::new(linesearch, LBFGS_MEMORY);

        let outcome = Executor::new(cost, solver)
            .configure(|state| {
                state
                    .param(start.iter().copied().collect())
                    .max_iters(max_iterations as u64)
                    .target_cost(tolerance * tolerance)
            })
            .run()
            .map(|result| result.state.iter);

        let mut log = log.into_inner();
        let (iterations, termination) = match outcome {
            Ok(iter) => {
                let iterations = (iter as usize).min(max_iterations);
                let termination = if iterations >= max_iterations {
                    TrimTermination::IterationLimit
                } else {
                    TrimTermination::Stalled
                };
                (iterations, termination)
            }
            Err(e) => {
                let iterations = log.jacobians.min(max_iterations);
                let termination = match log.interruption.take() {
                    Some(Interruption::Physics(source)) => return Err(source),
                    Some(Interruption::NonFinite) => TrimTermination::NonFinite,
                    Some(Interruption::Budget) => TrimTermination::IterationLimit,
                    None => {
                        debug!(error = %e, "trim line search gave up");
                        TrimTermination::Stalled
                    }
                };
                (iterations, termination)
            }
        };

        let (params, cost) = log.best.unwrap_or((start, f64::NAN));
        let termination = if termination != TrimTermination::NonFinite && cost < tolerance {
            TrimTermination::Converged
        } else {
            termination
        };
        debug!(
            iterations,
            evaluations = log.evaluations,
            cost,
            ?termination,
            "trim search finished"
        );

        Ok(TrimResult {
            params,
            converged: termination == TrimTermination::Converged,
            cost,
            iterations,
            termination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Mildly nonlinear system with a known root
    struct KnownRoot {
        target: DVector<f64>,
        evaluations: usize,
    }

    impl TrimProblem for KnownRoot {
        fn bounds(&self) -> Vec<(f64, f64)> {
            vec![(-10.0, 10.0); 3]
        }

        fn initial_guess(&self) -> DVector<f64> {
            DVector::from_vec(vec![0.0, 0.0, 0.0])
        }

        fn residuals(&mut self, x: &DVector<f64>) -> Result<DVector<f64>, PhysicsError> {
            self.evaluations += 1;
            let c = &self.target;
            Ok(DVector::from_vec(vec![
                (x[0] - c[0]) + 0.1 * (x[1] * x[1] - c[1] * c[1]),
                2.0 * (x[1] - c[1]) + 0.5 * (x[2] - c[2]),
                (x[2] - c[2]) + 0.2 * ((x[0]).sin() - (c[0]).sin()),
            ]))
        }
    }

    struct NoRoot;

    impl TrimProblem for NoRoot {
        fn bounds(&self) -> Vec<(f64, f64)> {
            vec![(-5.0, 5.0)]
        }

        fn initial_guess(&self) -> DVector<f64> {
            DVector::from_vec(vec![3.0])
        }

        fn residuals(&mut self, x: &DVector<f64>) -> Result<DVector<f64>, PhysicsError> {
            Ok(DVector::from_vec(vec![x[0] * x[0] + 1.0]))
        }
    }

    /// Finite only at the initial guess
    struct TurnsNaN {
        calls: usize,
    }

    impl TrimProblem for TurnsNaN {
        fn bounds(&self) -> Vec<(f64, f64)> {
            vec![(-1.0, 1.0); 2]
        }

        fn initial_guess(&self) -> DVector<f64> {
            DVector::from_vec(vec![0.5, 0.5])
        }

        fn residuals(&mut self, x: &DVector<f64>) -> Result<DVector<f64>, PhysicsError> {
            self.calls += 1;
            if self.calls > 1 {
                Ok(DVector::from_vec(vec![f64::NAN, 0.0]))
            } else {
                Ok(x.clone())
            }
        }
    }

    #[test]
    fn test_converges_to_known_root() {
        let config = TrimSolverConfig::default();
        let target = DVector::from_vec(vec![1.5, -0.75, 2.0]);
        let mut problem = KnownRoot {
            target: target.clone(),
            evaluations: 0,
        };

        let result = TrimSolver::new(config).solve(&mut problem).unwrap();

        assert!(result.converged, "termination {:?}", result.termination);
        assert_eq!(result.termination, TrimTermination::Converged);
        assert!(result.iterations < config.max_iterations);
        assert!(result.cost < config.tolerance);
        for i in 0..3 {
            assert_relative_eq!(result.params[i], target[i], epsilon = 1e-5);
        }
    }

    #[test]
    fn test_rootless_problem_terminates_unconverged() {
        let config = TrimSolverConfig::default();
        let result = TrimSolver::new(config).solve(&mut NoRoot).unwrap();

        assert!(!result.converged);
        assert!(result.iterations <= config.max_iterations);
        assert!(matches!(
            result.termination,
            TrimTermination::IterationLimit | TrimTermination::Stalled
        ));
        // Best estimate sits at the minimum of the residual
        assert!(result.params[0].abs() < 0.1);
        assert!(result.cost >= 1.0);
    }

    #[test]
    fn test_nan_residual_aborts_immediately() {
        let mut problem = TurnsNaN { calls: 0 };
        let result = TrimSolver::new(TrimSolverConfig::default())
            .solve(&mut problem)
            .unwrap();

        assert!(!result.converged);
        assert_eq!(result.termination, TrimTermination::NonFinite);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.params, DVector::from_vec(vec![0.5, 0.5]));
    }

    #[test]
    fn test_initial_guess_clamped_into_bounds() {
        struct Shifted;
        impl TrimProblem for Shifted {
            fn bounds(&self) -> Vec<(f64, f64)> {
                vec![(0.0, 1.0)]
            }
            fn initial_guess(&self) -> DVector<f64> {
                DVector::from_vec(vec![7.0])
            }
            fn residuals(&mut self, x: &DVector<f64>) -> Result<DVector<f64>, PhysicsError> {
                Ok(DVector::from_vec(vec![x[0] - 2.0]))
            }
        }

        let result = TrimSolver::new(TrimSolverConfig::default())
            .solve(&mut Shifted)
            .unwrap();
        assert!(!result.converged);
        assert_eq!(result.params[0], 1.0);
        assert_eq!(result.termination, TrimTermination::Stalled);
    }

    #[test]
    fn test_evaluations_stay_within_budget() {
        let config = TrimSolverConfig {
            max_iterations: 2,
            ..Default::default()
        };
        let mut problem = KnownRoot {
            target: DVector::from_vec(vec![4.0, -3.0, 2.5]),
            evaluations: 0,
        };

        let result = TrimSolver::new(config).solve(&mut problem).unwrap();
        assert!(result.iterations <= 2);
        assert!(problem.evaluations <= 2 * EVALUATIONS_PER_ITERATION * 4);
        for (value, (lower, upper)) in result.params.iter().zip(problem.bounds()) {
            assert!(*value >= lower && *value <= upper);
        }
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let broken = [
            TrimSolverConfig {
                tolerance: f64::INFINITY,
                ..Default::default()
            },
            TrimSolverConfig {
                tolerance: f64::NAN,
                ..Default::default()
            },
            TrimSolverConfig {
                perturbation: 0.0,
                ..Default::default()
            },
            TrimSolverConfig {
                perturbation: f64::INFINITY,
                ..Default::default()
            },
            TrimSolverConfig {
                max_iterations: 0,
                ..Default::default()
            },
        ];
        for config in broken {
            let err = TrimSolver::new(config).solve(&mut NoRoot).unwrap_err();
            assert!(matches!(err, PhysicsError::InvalidParameter(_)), "{:?}", config);
        }
    }

    #[test]
    fn test_mismatched_bounds_rejected() {
        struct Broken;
        impl TrimProblem for Broken {
            fn bounds(&self) -> Vec<(f64, f64)> {
                vec![]
            }
            fn initial_guess(&self) -> DVector<f64> {
                DVector::from_vec(vec![0.0])
            }
            fn residuals(&mut self, x: &DVector<f64>) -> Result<DVector<f64>, PhysicsError> {
                Ok(x.clone())
            }
        }

        assert!(TrimSolver::new(TrimSolverConfig::default())
            .solve(&mut Broken)
            .is_err());
    }
}
