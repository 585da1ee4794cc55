//! JSON field scripts
//!
//! A field script describes the stress, category and error functions of a
//! run in a file next to the model, so runs can be configured without
//! recompiling. Example:
//!
//! ```json
//! {
//!   "stress": {
//!     "components": [
//!       {"kind": "linear", "constant": -100.0, "gradient": [0.0, 0.0, 2.5]},
//!       {"kind": "linear", "constant": 0.0},
//!       {"kind": "previous"},
//!       {"kind": "linear", "constant": 0.0},
//!       {"kind": "linear", "constant": 0.0},
//!       {"kind": "linear", "constant": 0.0}
//!     ]
//!   },
//!   "category": {"kind": "band", "axis": "z", "width": 5.0},
//!   "error": {"kind": "centroid_rms", "target": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0]}
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::callbacks::{Callbacks, CategoryFunction, ErrorFunction, StressFunction};
use crate::elements::StressTensor;
use crate::error::{CallbackError, StressFieldError, StressFieldResult};
use crate::results::ResultFile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldScript {
    pub stress: StressRule,
    #[serde(default)]
    pub category: Option<CategoryRule>,
    #[serde(default)]
    pub error: Option<ErrorRule>,
}

/// Stress components as functions of the element centroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressRule {
    pub components: [ComponentRule; 6],
    /// Overrides for single parts, by part name
    #[serde(default)]
    pub parts: HashMap<String, [ComponentRule; 6]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentRule {
    /// `constant + gradient · (x, y, z)`
    Linear {
        constant: f64,
        #[serde(default)]
        gradient: [f64; 3],
    },
    /// Keep the stored value
    Previous,
}

impl ComponentRule {
    fn evaluate(&self, point: [f64; 3], previous: f64) -> f64 {
        match self {
            ComponentRule::Linear { constant, gradient } => {
                constant + gradient.iter().zip(point).map(|(g, p)| g * p).sum::<f64>()
            }
            ComponentRule::Previous => previous,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn coordinate(self, x: f64, y: f64, z: f64) -> f64 {
        match self {
            Axis::X => x,
            Axis::Y => y,
            Axis::Z => z,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryRule {
    /// Slices of constant `width` along one axis; slice `i` covers
    /// `[i * width, (i + 1) * width)`
    Band { axis: Axis, width: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorRule {
    /// Root mean square difference between every centroid stress of the
    /// last frame and a target tensor
    CentroidRms { target: [f64; 6] },
}

impl FieldScript {
    pub fn from_file(path: &Path) -> StressFieldResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| StressFieldError::Script(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&text).map_err(|e| match e {
            StressFieldError::Script(msg) => StressFieldError::Script(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    pub fn from_json(text: &str) -> StressFieldResult<Self> {
        let script: Self = serde_json::from_str(text).map_err(|e| StressFieldError::Script(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> StressFieldResult<()> {
        if let Some(CategoryRule::Band { width, .. }) = self.category {
            if width <= 0.0 || !width.is_finite() {
                return Err(StressFieldError::Script(format!("band width must be positive, got {}", width)));
            }
        }
        Ok(())
    }

    pub fn into_callbacks(self) -> Callbacks {
        let mut callbacks = Callbacks::new(self.stress);
        if let Some(category) = self.category {
            callbacks = callbacks.with_category(category);
        }
        if let Some(error) = self.error {
            callbacks = callbacks.with_error(error);
        }
        callbacks
    }
}

impl StressFunction for StressRule {
    fn calculate_stress(
        &self,
        part: &str,
        x: f64,
        y: f64,
        z: f64,
        previous: &StressTensor,
    ) -> Result<StressTensor, CallbackError> {
        let rules = self.parts.get(part).unwrap_or(&self.components);
        let previous = previous.components();
        let mut stress = [0.0; 6];
        for (i, rule) in rules.iter().enumerate() {
            stress[i] = rule.evaluate([x, y, z], previous[i]);
        }
        if stress.iter().any(|s| !s.is_finite()) {
            return Err(CallbackError::new(format!("non-finite stress at ({}, {}, {})", x, y, z)));
        }
        Ok(StressTensor::new(stress))
    }
}

impl CategoryFunction for CategoryRule {
    fn category(&self, _part: &str, x: f64, y: f64, z: f64) -> Result<Option<String>, CallbackError> {
        match *self {
            CategoryRule::Band { axis, width } => {
                let band = (axis.coordinate(x, y, z) / width).floor();
                if !band.is_finite() {
                    return Err(CallbackError::new(format!("no band for ({}, {}, {})", x, y, z)));
                }
                let band = band as i64;
                let key = if band < 0 {
                    format!("{}n{}", axis, band.unsigned_abs())
                } else {
                    format!("{}{}", axis, band)
                };
                Ok(Some(key))
            }
        }
    }
}

impl ErrorFunction for ErrorRule {
    fn calculate_error(&self, results: &ResultFile) -> Result<f64, CallbackError> {
        match self {
            ErrorRule::CentroidRms { target } => {
                let values = results.last_frame().map(|f| f.values.as_slice()).unwrap_or_default();
                if values.is_empty() {
                    return Err(CallbackError::new("result has no centroid stresses"));
                }
                let sum: f64 = values
                    .iter()
                    .flat_map(|v| v.stress.components().into_iter().zip(*target))
                    .map(|(s, t)| (s - t).powi(2))
                    .sum();
                Ok((sum / (6 * values.len()) as f64).sqrt())
            }
        }
    }
}
