//! Stress Field - initial stress injection for solver input decks
//!
//! This library patches a solver input deck with a spatially varying
//! initial stress field and calibrates that field over solver runs:
//! - Mesh characterization into per-element or per-category stress groups
//! - Element set and `*Initial Conditions, type=STRESS` injection
//! - Scale sweeps and minimum-error iteration over a stress scale factor
//! - Substitution of stresses by the results of the previous run
//!
//! ## Example
//! ```rust
//! use std::path::Path;
//! use stress_field::prelude::*;
//!
//! let deck = "*Part, name=Beam\n*Node\n      1, 0., 0., 0.\n      2, 2., 0., 0.\n\
//!             *Element, type=T3D2\n1, 1, 2\n*End Part\n*Assembly, name=Assembly\n\
//!             *Instance, name=Beam-1, part=Beam\n*End Instance\n*End Assembly\n\
//!             ** \n** BOUNDARY CONDITIONS\n** \n\
//!             ** ----------------------------------------------------------------\n\
//!             *Step, name=Step-1\n*End Step\n";
//!
//! // One stress group per element
//! let instances = parse_instances(deck)?;
//! let mut mesh = characterize_mesh(&instances, None)?;
//!
//! // Axial stress proportional to the centroid position
//! let stress = |_part: &str, x: f64, _y: f64, _z: f64, _prev: &StressTensor| -> Result<StressTensor, CallbackError> {
//!     Ok(StressTensor::new([-x, 0.0, 0.0, 0.0, 0.0, 0.0]))
//! };
//! define_stresses(&mut mesh, &stress);
//!
//! // Inject at twice the calculated stress
//! let builder = JobBuilder::from_deck_text("Job-1", deck, mesh, Path::new("work"))?;
//! let patched = builder.render(2.0);
//! assert!(patched.lines().iter().any(|l| l == "Beam-1.stress_field_el_1,-2.0,0.0,0.0,0.0,0.0,0.0,"));
//! # Ok::<(), StressFieldError>(())
//! ```

pub mod callbacks;
pub mod deck;
pub mod driver;
pub mod elements;
pub mod error;
pub mod host;
pub mod job;
pub mod mesh;
pub mod results;
pub mod script;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export common types
pub mod prelude {
    pub use crate::callbacks::{Callbacks, CategoryFunction, ErrorFunction, StressFunction};
    pub use crate::deck::{DeckBuffer, InjectionPoints};
    pub use crate::driver::{
        run_scaling, run_substitution, Convergence, ScalingOptions, ScalingOutcome, SubstitutionOptions,
        SubstitutionOutcome,
    };
    pub use crate::elements::{MeshData, MeshElement, PartMeshData, StressGroup, StressTensor};
    pub use crate::error::{CallbackError, DeckError, HostError, StressFieldError, StressFieldResult};
    pub use crate::host::{parse_instances, InpFileHost, JobHandle, SolverCommand, SolverHost};
    pub use crate::job::{JobBuilder, ReadBack};
    pub use crate::mesh::{characterize_mesh, define_stresses, ElementNodes, InstanceMesh};
    pub use crate::results::{CentroidStress, ResultFile, ResultFrame, ResultStep};
    pub use crate::script::FieldScript;
}
