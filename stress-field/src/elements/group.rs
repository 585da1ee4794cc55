//! Stress groups - named element sets sharing one injected stress

use serde::{Deserialize, Serialize};

use super::{MeshElement, StressTensor};

/// Prefix of the element set generated for a category
pub const CATEGORY_SET_PREFIX: &str = "stress_field_group_";

/// A named, append-only collection of elements from one part instance.
///
/// The group's stress lives on its first element. In per-element mode that
/// is simply the element's own stress; in categorized mode every element of
/// the group shares it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressGroup {
    name: String,
    elements: Vec<MeshElement>,
}

impl StressGroup {
    /// Group holding a single element, named after its label
    pub fn for_element(element: MeshElement) -> Self {
        Self {
            name: element.set_name(),
            elements: vec![element],
        }
    }

    /// Group for a category, seeded with its first element
    pub fn for_category(category: &str, first: MeshElement) -> Self {
        Self {
            name: format!("{}{}", CATEGORY_SET_PREFIX, category),
            elements: vec![first],
        }
    }

    pub(crate) fn push(&mut self, element: MeshElement) {
        debug_assert_eq!(element.instance_name(), self.instance_name());
        self.elements.push(element);
    }

    /// Element set name used in the deck
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &[MeshElement] {
        &self.elements
    }

    /// The first element added; carries the group's stress and coordinates
    pub fn representative(&self) -> &MeshElement {
        &self.elements[0]
    }

    pub fn part_name(&self) -> &str {
        self.representative().part_name()
    }

    pub fn instance_name(&self) -> &str {
        self.representative().instance_name()
    }

    pub fn centroid(&self) -> [f64; 3] {
        self.representative().centroid()
    }

    pub fn labels(&self) -> impl Iterator<Item = u64> + '_ {
        self.elements.iter().map(MeshElement::label)
    }

    pub fn stress(&self) -> Option<StressTensor> {
        self.representative().stress()
    }

    pub fn define_stress(&mut self, stress: Option<StressTensor>) {
        self.elements[0].define_stress(stress);
    }
}
