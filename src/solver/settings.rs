use crate::algebra::*;
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Which pieces of the final iterate [`save_solution`](crate::io::save_solution)
/// writes next to `out.txt`.
#[allow(non_snake_case)]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WriteSolution {
    pub x: bool,
    pub y: bool,
    pub X: bool,
    pub Y: bool,
}

impl Default for WriteSolution {
    fn default() -> Self {
        Self {
            x: true,
            y: true,
            X: false,
            Y: false,
        }
    }
}

/// Solver configuration.
///
/// Threshold-like options take the scalar type of the run so that they can
/// be tighter than f64 allows at high precision.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct Settings<T: FloatT> {
    /// mantissa size in bits for all scalars of the run
    #[builder(default = "400")]
    pub precision: u32,

    ///maximum number of iterations
    #[builder(default = "500")]
    pub max_iterations: u32,

    ///maximum run time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub max_runtime: f64,

    ///terminate when the complementarity exceeds this bound
    #[builder(default = "(1e100).as_T()")]
    pub max_complementarity: T,

    ///duality gap tolerance for optimality
    #[builder(default = "(1e-30).as_T()")]
    pub duality_gap_threshold: T,

    ///primal feasibility tolerance
    #[builder(default = "(1e-30).as_T()")]
    pub primal_error_threshold: T,

    ///dual feasibility tolerance
    #[builder(default = "(1e-30).as_T()")]
    pub dual_error_threshold: T,

    ///scale of the initial primal matrix X
    #[builder(default = "(1e20).as_T()")]
    pub initial_matrix_scale_primal: T,

    ///scale of the initial dual matrix Y
    #[builder(default = "(1e20).as_T()")]
    pub initial_matrix_scale_dual: T,

    ///centering parameter when the iterate is primal-dual feasible
    #[builder(default = "(0.1).as_T()")]
    pub feasible_centering_parameter: T,

    ///centering parameter while still infeasible
    #[builder(default = "(0.3).as_T()")]
    pub infeasible_centering_parameter: T,

    ///shrink factor applied to the maximal positive-definiteness-preserving
    ///step
    #[builder(default = "(0.7).as_T()")]
    pub step_length_reduction: T,

    ///step lengths below this signal a feasibility jump or stagnation
    #[builder(default = "(1e-10).as_T()")]
    pub min_terminate_step_length: T,

    ///verbose printing
    #[builder(default = "true")]
    pub verbose: bool,

    ///seconds between checkpoints during a checkpointed run
    #[builder(default = "3600")]
    pub checkpoint_interval: u64,

    ///which parts of the final iterate to write with the solution
    #[builder(default)]
    pub write_solution: WriteSolution,
}

impl<T> Default for Settings<T>
where
    T: FloatT,
{
    fn default() -> Settings<T> {
        SettingsBuilder::<T>::default().build().unwrap()
    }
}

/// Automatic pre-build settings validation
impl<T> SettingsBuilder<T>
where
    T: FloatT,
{
    fn validate(&self) -> Result<(), String> {
        if let Some(precision) = self.precision {
            if precision < 64 {
                return Err(format!("precision must be at least 64 bits, got {}", precision));
            }
        }
        if let Some(ref γ) = self.step_length_reduction {
            if !(*γ > T::zero() && *γ < T::one()) {
                return Err("step_length_reduction must lie in (0, 1)".into());
            }
        }
        for (name, value) in [
            ("feasible_centering_parameter", &self.feasible_centering_parameter),
            ("infeasible_centering_parameter", &self.infeasible_centering_parameter),
        ] {
            if let Some(β) = value {
                if !(*β > T::zero() && *β < T::one()) {
                    return Err(format!("{} must lie in (0, 1)", name));
                }
            }
        }
        for (name, value) in [
            ("duality_gap_threshold", &self.duality_gap_threshold),
            ("primal_error_threshold", &self.primal_error_threshold),
            ("dual_error_threshold", &self.dual_error_threshold),
        ] {
            if let Some(ε) = value {
                if !(*ε > T::zero()) {
                    return Err(format!("{} must be positive", name));
                }
            }
        }
        Ok(())
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    SettingsBuilder::<f64>::default().build().unwrap();

    // fail on out-of-range step length reduction
    assert!(SettingsBuilder::<f64>::default()
        .step_length_reduction(1.5)
        .build()
        .is_err());

    // fail on sub-64-bit precision
    assert!(SettingsBuilder::<f64>::default().precision(32).build().is_err());

    // fail on non-positive threshold
    assert!(SettingsBuilder::<f64>::default()
        .duality_gap_threshold(0.0)
        .build()
        .is_err());
}
