//! Simulation parameters.
//!
//! All knobs are plain immutable values passed into the engine entry point,
//! so repeated or concurrent invocations cannot interfere through shared
//! state. Defaults reproduce the Bernhardt & Schmidt (2010) calibration.

use crate::error::{SnowslideError, SnowslideResult};

/// Default convergence threshold on movable excess [depth units].
pub const DEFAULT_EPSILON: f64 = 1e-3;

/// Default iteration budget. Mass may need as many iterations as the
/// longest drainage path, so callers should scale this with grid diameter.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Default retention decay rate per degree of slope.
pub const DEFAULT_RETENTION_A: f64 = -0.14;

/// Default retention capacity on flat ground [depth units].
pub const DEFAULT_RETENTION_C: f64 = 145.0;

/// Default minimum retained depth on near-vertical terrain [depth units].
pub const DEFAULT_RETENTION_MIN: f64 = 0.05;

/// Default MFD partition exponent (1.0 = proportional to descent gradient).
pub const DEFAULT_MFD_EXPONENT: f64 = 1.0;

/// Flow-routing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingMethod {
    /// Steepest descent: all excess goes to the single lowest neighbor.
    D8,
    /// Multiple flow direction: excess splits among all lower neighbors.
    #[default]
    Mfd,
}

impl RoutingMethod {
    /// Parse the conventional lowercase names used by callers ("d8", "mfd").
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "d8" | "single" => Some(Self::D8),
            "mfd" | "multi" => Some(Self::Mfd),
            _ => None,
        }
    }
}

/// Flow-routing configuration.
#[derive(Debug, Clone, Copy)]
pub struct RoutingParams {
    pub method: RoutingMethod,
    /// Fill undrainable depressions in the elevation field before routing.
    pub preprocess: bool,
    /// Allow border cells to export mass past the grid boundary. When
    /// false the boundary acts as a wall and total mass is conserved.
    pub compute_edges: bool,
    /// Exponent applied to descent gradients when splitting MFD weights.
    pub mfd_exponent: f64,
}

impl Default for RoutingParams {
    fn default() -> Self {
        Self {
            method: RoutingMethod::Mfd,
            preprocess: true,
            compute_edges: true,
            mfd_exponent: DEFAULT_MFD_EXPONENT,
        }
    }
}

/// Retention-capacity model parameters: `capacity = c * exp(a * slope)`,
/// clamped below by `min`.
#[derive(Debug, Clone, Copy)]
pub struct RetentionParams {
    pub a: f64,
    pub c: f64,
    pub min: f64,
}

impl Default for RetentionParams {
    fn default() -> Self {
        Self {
            a: DEFAULT_RETENTION_A,
            c: DEFAULT_RETENTION_C,
            min: DEFAULT_RETENTION_MIN,
        }
    }
}

/// Full parameter set for one simulation run.
#[derive(Debug, Clone, Copy)]
pub struct SimulationParams {
    pub routing: RoutingParams,
    pub retention: RetentionParams,
    pub epsilon: f64,
    pub max_iterations: usize,
}

impl SimulationParams {
    pub fn new(routing: RoutingParams, retention: RetentionParams) -> Self {
        Self {
            routing,
            retention,
            epsilon: DEFAULT_EPSILON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Check every numeric parameter before any grid work starts.
    pub fn validate(&self, resx: f64, resy: f64) -> SnowslideResult<()> {
        if !(resx > 0.0) || !(resy > 0.0) {
            return Err(SnowslideError::config(format!(
                "cell resolution must be strictly positive, got ({resx}, {resy})"
            )));
        }
        if !(self.epsilon > 0.0) {
            return Err(SnowslideError::config(format!(
                "epsilon must be strictly positive, got {}",
                self.epsilon
            )));
        }
        if self.max_iterations == 0 {
            return Err(SnowslideError::config("max_iterations must be at least 1"));
        }
        if !(self.retention.c > 0.0) {
            return Err(SnowslideError::config(format!(
                "retention c must be strictly positive, got {}",
                self.retention.c
            )));
        }
        if !(self.retention.min > 0.0) {
            return Err(SnowslideError::config(format!(
                "retention min must be strictly positive, got {}",
                self.retention.min
            )));
        }
        if !self.retention.a.is_finite() {
            return Err(SnowslideError::config("retention a must be finite"));
        }
        if !(self.routing.mfd_exponent > 0.0) {
            return Err(SnowslideError::config(format!(
                "mfd_exponent must be strictly positive, got {}",
                self.routing.mfd_exponent
            )));
        }
        Ok(())
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self::new(RoutingParams::default(), RetentionParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let params = SimulationParams::default();
        assert!(params.validate(30.0, 30.0).is_ok());
    }

    #[test]
    fn default_routing_is_mfd_with_preprocessing() {
        let routing = RoutingParams::default();
        assert_eq!(routing.method, RoutingMethod::Mfd);
        assert!(routing.preprocess);
        assert!(routing.compute_edges);
    }

    #[test]
    fn parse_routing_names() {
        assert_eq!(RoutingMethod::parse("d8"), Some(RoutingMethod::D8));
        assert_eq!(RoutingMethod::parse("single"), Some(RoutingMethod::D8));
        assert_eq!(RoutingMethod::parse("mfd"), Some(RoutingMethod::Mfd));
        assert_eq!(RoutingMethod::parse("multi"), Some(RoutingMethod::Mfd));
        assert_eq!(RoutingMethod::parse("d4"), None);
    }

    #[test]
    fn rejects_non_positive_resolution() {
        let params = SimulationParams::default();
        assert!(params.validate(0.0, 30.0).is_err());
        assert!(params.validate(30.0, -1.0).is_err());
        assert!(params.validate(f64::NAN, 30.0).is_err());
    }

    #[test]
    fn rejects_non_positive_epsilon() {
        let mut params = SimulationParams::default();
        params.epsilon = 0.0;
        assert!(params.validate(30.0, 30.0).is_err());
    }

    #[test]
    fn rejects_zero_iteration_budget() {
        let mut params = SimulationParams::default();
        params.max_iterations = 0;
        assert!(params.validate(30.0, 30.0).is_err());
    }

    #[test]
    fn rejects_bad_retention() {
        let mut params = SimulationParams::default();
        params.retention.min = 0.0;
        assert!(params.validate(30.0, 30.0).is_err());

        let mut params = SimulationParams::default();
        params.retention.c = -145.0;
        assert!(params.validate(30.0, 30.0).is_err());
    }

    #[test]
    fn rejects_bad_mfd_exponent() {
        let mut params = SimulationParams::default();
        params.routing.mfd_exponent = 0.0;
        assert!(params.validate(30.0, 30.0).is_err());
    }
}
