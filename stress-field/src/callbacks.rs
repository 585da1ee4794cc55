//! User supplied stress, category and error functions
//!
//! Any closure with the matching signature implements the corresponding
//! trait, so callers can pass plain closures or richer types such as a
//! [`FieldScript`](crate::script::FieldScript) rule.

use crate::elements::StressTensor;
use crate::error::CallbackError;
use crate::results::ResultFile;

/// Calculates the stress at a point of a part.
///
/// `previous` is the stress currently stored for the group (zero when it is
/// undefined), which lets substitution runs keep components they do not
/// prescribe.
pub trait StressFunction {
    fn calculate_stress(
        &self,
        part: &str,
        x: f64,
        y: f64,
        z: f64,
        previous: &StressTensor,
    ) -> Result<StressTensor, CallbackError>;
}

impl<F> StressFunction for F
where
    F: Fn(&str, f64, f64, f64, &StressTensor) -> Result<StressTensor, CallbackError>,
{
    fn calculate_stress(
        &self,
        part: &str,
        x: f64,
        y: f64,
        z: f64,
        previous: &StressTensor,
    ) -> Result<StressTensor, CallbackError> {
        self(part, x, y, z, previous)
    }
}

/// Assigns an element centroid to a category. `Ok(None)` leaves the element
/// out of every group.
pub trait CategoryFunction {
    fn category(&self, part: &str, x: f64, y: f64, z: f64) -> Result<Option<String>, CallbackError>;
}

impl<F> CategoryFunction for F
where
    F: Fn(&str, f64, f64, f64) -> Result<Option<String>, CallbackError>,
{
    fn category(&self, part: &str, x: f64, y: f64, z: f64) -> Result<Option<String>, CallbackError> {
        self(part, x, y, z)
    }
}

/// Measures how far a finished job is from the desired state
pub trait ErrorFunction {
    fn calculate_error(&self, results: &ResultFile) -> Result<f64, CallbackError>;
}

impl<F> ErrorFunction for F
where
    F: Fn(&ResultFile) -> Result<f64, CallbackError>,
{
    fn calculate_error(&self, results: &ResultFile) -> Result<f64, CallbackError> {
        self(results)
    }
}

/// The callback slots used by a run
pub struct Callbacks {
    pub stress: Box<dyn StressFunction>,
    pub category: Option<Box<dyn CategoryFunction>>,
    pub error: Option<Box<dyn ErrorFunction>>,
}

impl Callbacks {
    pub fn new(stress: impl StressFunction + 'static) -> Self {
        Self {
            stress: Box::new(stress),
            category: None,
            error: None,
        }
    }

    pub fn with_category(mut self, category: impl CategoryFunction + 'static) -> Self {
        self.category = Some(Box::new(category));
        self
    }

    pub fn with_error(mut self, error: impl ErrorFunction + 'static) -> Self {
        self.error = Some(Box::new(error));
        self
    }
}
