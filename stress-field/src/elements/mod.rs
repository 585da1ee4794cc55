//! Element and stress group model

mod element;
mod group;
mod mesh_data;
mod tensor;

pub use element::{MeshElement, ELEMENT_SET_PREFIX};
pub use group::{StressGroup, CATEGORY_SET_PREFIX};
pub use mesh_data::{MeshData, PartMeshData};
pub use tensor::{StressTensor, COMPONENT_LABELS};
