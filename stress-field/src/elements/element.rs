//! Mesh element record

use serde::{Deserialize, Serialize};

use super::StressTensor;

/// Prefix of the element set generated for a single element
pub const ELEMENT_SET_PREFIX: &str = "stress_field_el_";

/// A mesh element of one part instance, located by its centroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshElement {
    instance: String,
    part: String,
    label: u64,
    centroid: [f64; 3],
    /// `None` once a stress calculation has failed for this element
    stress: Option<StressTensor>,
}

impl MeshElement {
    /// Create an element with a zero stress tensor
    pub fn new(instance: &str, part: &str, label: u64, centroid: [f64; 3]) -> Self {
        Self {
            instance: instance.to_string(),
            part: part.to_string(),
            label,
            centroid,
            stress: Some(StressTensor::ZERO),
        }
    }

    pub fn instance_name(&self) -> &str {
        &self.instance
    }

    pub fn part_name(&self) -> &str {
        &self.part
    }

    /// Element label (1-based, as written in the deck)
    pub fn label(&self) -> u64 {
        self.label
    }

    pub fn centroid(&self) -> [f64; 3] {
        self.centroid
    }

    pub fn stress(&self) -> Option<StressTensor> {
        self.stress
    }

    pub fn define_stress(&mut self, stress: Option<StressTensor>) {
        self.stress = stress;
    }

    /// Name of the element set holding only this element
    pub fn set_name(&self) -> String {
        format!("{}{}", ELEMENT_SET_PREFIX, self.label)
    }
}
