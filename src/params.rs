//! Detector parameters
//!
//! Each tunable detector publishes its knobs as a table of [`ParamMeta`].
//! Configuration code never fills detector fields directly: it hands a
//! name-to-value map to [`ParameterizedDetector::with_params`], which rejects
//! unknown names, checks every value against its bounds, and fills in the
//! defaults for anything left out.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use ictscan::prelude::*;
//!
//! let ob = OrderBlockDetector::with_params(&HashMap::from([("displacement_factor", 2.0)])).unwrap();
//! assert_eq!(ob.displacement_factor.get(), 2.0);
//! assert_eq!(ob.lookback.get(), 5);
//!
//! assert!(OrderBlockDetector::with_params(&HashMap::from([("lookbak", 5.0)])).is_err());
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::{AnalysisError, Multiplier, PatternKind, Period, Result};

/// How a parameter value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Positive finite factor
    Multiplier,
    /// Whole number of bars
    Period,
}

/// Description and bounds of one detector parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamMeta {
    pub name: &'static str,
    pub param_type: ParamType,
    pub default: f64,
    /// Inclusive lower bound
    pub min: f64,
    /// Inclusive upper bound
    pub max: f64,
    pub description: &'static str,
}

impl ParamMeta {
    pub const fn period(
        name: &'static str,
        default: usize,
        min: usize,
        max: usize,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            param_type: ParamType::Period,
            default: default as f64,
            min: min as f64,
            max: max as f64,
            description,
        }
    }

    pub const fn multiplier(
        name: &'static str,
        default: f64,
        min: f64,
        max: f64,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            param_type: ParamType::Multiplier,
            default,
            min,
            max,
            description,
        }
    }

    /// Check `value` against the bounds and the parameter type
    pub fn validate(&self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(AnalysisError::InvalidConfig(format!("{} must be finite", self.name)));
        }
        if value < self.min || value > self.max {
            return Err(AnalysisError::OutOfRange {
                field: self.name,
                value,
                min: self.min,
                max: self.max,
            });
        }
        match self.param_type {
            ParamType::Multiplier => Multiplier::new(value).map(|_| ()),
            ParamType::Period if value.fract() != 0.0 => {
                Err(AnalysisError::InvalidConfig(format!("{} must be a whole number of bars", self.name)))
            },
            ParamType::Period => Period::new(value as usize).map(|_| ()),
        }
    }
}

/// A complete, validated parameter set for one detector
#[derive(Debug, Clone, PartialEq)]
pub struct ParamValues {
    values: Vec<(&'static str, f64)>,
}

impl ParamValues {
    /// Merge `params` over the defaults in `table`.
    ///
    /// Fails on a name the table does not list or on any value
    /// [`ParamMeta::validate`] rejects.
    pub fn resolve(table: &'static [ParamMeta], params: &HashMap<&str, f64>) -> Result<Self> {
        if let Some(unknown) = params.keys().find(|k| !table.iter().any(|m| m.name == **k)) {
            let known: Vec<&str> = table.iter().map(|m| m.name).collect();
            return Err(AnalysisError::InvalidConfig(format!(
                "unknown parameter `{unknown}`, expected one of: {}",
                known.join(", ")
            )));
        }

        let values = table
            .iter()
            .map(|meta| {
                let value = params.get(meta.name).copied().unwrap_or(meta.default);
                meta.validate(value)?;
                Ok((meta.name, value))
            })
            .collect::<Result<_>>()?;

        Ok(Self { values })
    }

    fn get(&self, name: &str) -> Result<f64> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .ok_or_else(|| AnalysisError::InvalidConfig(format!("no parameter named `{name}`")))
    }

    pub fn period(&self, name: &str) -> Result<Period> {
        Period::new(self.get(name)? as usize)
    }

    pub fn multiplier(&self, name: &str) -> Result<Multiplier> {
        Multiplier::new(self.get(name)?)
    }
}

/// Detectors that can be built from a loosely-typed parameter map
pub trait ParameterizedDetector: Sized {
    /// Kind of pattern the detector emits
    const KIND: PatternKind;

    /// Every parameter the detector accepts
    fn param_meta() -> &'static [ParamMeta];

    /// Build from a resolved parameter set
    fn from_values(values: &ParamValues) -> Result<Self>;

    /// Build from `params`; parameters left out take their defaults
    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Self::from_values(&ParamValues::resolve(Self::param_meta(), params)?)
    }
}
