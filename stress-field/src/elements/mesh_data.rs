//! Per-instance stress groups

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{MeshElement, StressGroup};

/// Stress groups of one part instance.
///
/// The grouping strategy is picked once at characterization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartMeshData {
    /// One group per element, ordered by element label
    ByElement { groups: Vec<StressGroup> },
    /// One group per category, in order of first appearance
    Categorized {
        groups: Vec<StressGroup>,
        index: HashMap<String, usize>,
    },
}

impl PartMeshData {
    pub fn by_element() -> Self {
        PartMeshData::ByElement { groups: Vec::new() }
    }

    pub fn categorized() -> Self {
        PartMeshData::Categorized {
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add an element. In categorized mode an element without a category
    /// is dropped; in per-element mode the category is ignored.
    pub fn add_element(&mut self, element: MeshElement, category: Option<&str>) {
        match self {
            PartMeshData::ByElement { groups } => {
                let position = groups.partition_point(|g| g.representative().label() < element.label());
                groups.insert(position, StressGroup::for_element(element));
            }
            PartMeshData::Categorized { groups, index } => {
                let Some(category) = category else {
                    return;
                };
                match index.get(category) {
                    Some(&i) => groups[i].push(element),
                    None => {
                        index.insert(category.to_string(), groups.len());
                        groups.push(StressGroup::for_category(category, element));
                    }
                }
            }
        }
    }

    pub fn groups(&self) -> &[StressGroup] {
        match self {
            PartMeshData::ByElement { groups } | PartMeshData::Categorized { groups, .. } => groups,
        }
    }

    pub fn groups_mut(&mut self) -> &mut [StressGroup] {
        match self {
            PartMeshData::ByElement { groups } | PartMeshData::Categorized { groups, .. } => groups,
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups().len()
    }

    pub fn is_categorized(&self) -> bool {
        matches!(self, PartMeshData::Categorized { .. })
    }

    /// Part name shared by every group, `None` when there are no groups
    pub fn part_name(&self) -> Option<&str> {
        self.groups().first().map(StressGroup::part_name)
    }
}

/// Stress groups for every part instance of a model, in assembly order.
/// Instances without elements hold `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    parts: Vec<Option<PartMeshData>>,
}

impl MeshData {
    pub fn new(parts: Vec<Option<PartMeshData>>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[Option<PartMeshData>] {
        &self.parts
    }

    pub fn part(&self, index: usize) -> Option<&PartMeshData> {
        self.parts.get(index).and_then(Option::as_ref)
    }

    pub fn groups(&self) -> impl Iterator<Item = &StressGroup> + '_ {
        self.parts.iter().flatten().flat_map(PartMeshData::groups)
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut StressGroup> + '_ {
        self.parts.iter_mut().flatten().flat_map(PartMeshData::groups_mut)
    }

    pub fn group_count(&self) -> usize {
        self.groups().count()
    }

    /// True when no instance produced any element
    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(Option::is_none)
    }
}
