//! Mesh characterization and stress definition
//!
//! Turns the element/node data of every part instance into stress groups and
//! fills those groups with stresses from a [`StressFunction`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::callbacks::{CategoryFunction, StressFunction};
use crate::elements::{MeshData, MeshElement, PartMeshData, StressTensor};
use crate::error::{StressFieldError, StressFieldResult};

/// An element given by its label and the coordinates of its nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNodes {
    pub label: u64,
    pub nodes: Vec<[f64; 3]>,
}

impl ElementNodes {
    pub fn new(label: u64, nodes: Vec<[f64; 3]>) -> Self {
        Self { label, nodes }
    }

    /// Arithmetic mean of the node coordinates
    pub fn centroid(&self) -> Option<[f64; 3]> {
        if self.nodes.is_empty() {
            return None;
        }
        let n = self.nodes.len() as f64;
        let sum = self.nodes.iter().fold([0.0; 3], |acc, p| [acc[0] + p[0], acc[1] + p[1], acc[2] + p[2]]);
        Some([sum[0] / n, sum[1] / n, sum[2] / n])
    }
}

/// Mesh of one part instance as reported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceMesh {
    pub name: String,
    pub part: String,
    pub elements: Vec<ElementNodes>,
}

impl InstanceMesh {
    pub fn new(name: &str, part: &str, elements: Vec<ElementNodes>) -> Self {
        Self {
            name: name.to_string(),
            part: part.to_string(),
            elements,
        }
    }
}

/// Build stress groups for every instance.
///
/// With a categorizer every part gets one group per category, otherwise one
/// group per element. A failing categorizer aborts the whole
/// characterization.
pub fn characterize_mesh(
    instances: &[InstanceMesh],
    categorizer: Option<&dyn CategoryFunction>,
) -> StressFieldResult<MeshData> {
    info!("Characterizing mesh");
    if categorizer.is_some() {
        info!("Category function detected, grouping elements by category");
    }

    let mut parts = Vec::with_capacity(instances.len());
    for instance in instances {
        if instance.elements.is_empty() {
            debug!("Instance {} has no elements", instance.name);
            parts.push(None);
            continue;
        }

        let mut part_data = match categorizer {
            Some(_) => PartMeshData::categorized(),
            None => PartMeshData::by_element(),
        };

        let count = instance.elements.len();
        let mut progress = 0;
        for (i, element_nodes) in instance.elements.iter().enumerate() {
            if 10 * i / count >= progress {
                debug!("{}: {}%", instance.name, 10 * progress);
                progress += 1;
            }

            let Some([x, y, z]) = element_nodes.centroid() else {
                warn!("Element {}.{} has no nodes, skipping", instance.name, element_nodes.label);
                continue;
            };
            let element = MeshElement::new(&instance.name, &instance.part, element_nodes.label, [x, y, z]);

            let category = match categorizer {
                Some(f) => f.category(&instance.part, x, y, z).map_err(|e| {
                    warn!(
                        "Category function failed for element {}.{}, aborting",
                        instance.name, element_nodes.label
                    );
                    StressFieldError::Callback(e)
                })?,
                None => None,
            };
            part_data.add_element(element, category.as_deref());
        }

        info!(
            "Instance {} (part {}): {} elements in {} groups",
            instance.name,
            instance.part,
            count,
            part_data.group_count()
        );
        parts.push(Some(part_data));
    }

    let mesh = MeshData::new(parts);
    if mesh.is_empty() {
        warn!("No mesh present, aborting");
        return Err(StressFieldError::NoMesh);
    }
    Ok(mesh)
}

/// Calculate the stress of every group.
///
/// A failing calculation leaves that group's stress undefined and moves on to
/// the next group. Returns the number of failed groups.
pub fn define_stresses(mesh: &mut MeshData, stress_function: &dyn StressFunction) -> usize {
    let mut failures = 0;
    for group in mesh.groups_mut() {
        let [x, y, z] = group.centroid();
        let previous = group.stress().unwrap_or(StressTensor::ZERO);
        let stress = match stress_function.calculate_stress(group.part_name(), x, y, z, &previous) {
            Ok(stress) => Some(stress),
            Err(e) => {
                warn!(
                    "Stress function failed for {}.{} at ({}, {}, {}): {}",
                    group.instance_name(),
                    group.name(),
                    x,
                    y,
                    z,
                    e
                );
                failures += 1;
                None
            }
        };
        group.define_stress(stress);
    }
    failures
}
