//! Deck and mesh fixtures for unit tests

use crate::callbacks::CategoryFunction;
use crate::elements::MeshData;
use crate::error::CallbackError;
use crate::mesh::{characterize_mesh, ElementNodes, InstanceMesh};

const CORNERS: [(f64, f64); 4] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

/// Node coordinates of a strip of `count` unit hex elements along X
fn strip_nodes(count: usize) -> Vec<[f64; 3]> {
    (0..=count)
        .flat_map(|i| CORNERS.iter().map(move |&(y, z)| [i as f64, y, z]))
        .collect()
}

fn strip_connectivity(label: usize) -> [usize; 8] {
    let a = 4 * (label - 1) + 1;
    let b = a + 4;
    [a, a + 1, a + 2, a + 3, b, b + 1, b + 2, b + 3]
}

/// Instance name used for a fixture part
pub(crate) fn instance_name(part: &str) -> String {
    format!("{}-1", part)
}

/// An Abaqus/CAE style deck with one hex strip per part
pub(crate) fn hex_strip_deck(parts: &[(&str, usize)], predefined: bool) -> String {
    let mut inp = String::new();
    inp.push_str("*Heading\n");
    inp.push_str("** Job name: Job-1 Model name: Model-1\n");
    inp.push_str("*Preprint, echo=NO, model=NO, history=NO, contact=NO\n");
    inp.push_str("**\n** PARTS\n**\n");
    for &(part, count) in parts {
        inp.push_str(&format!("*Part, name={}\n", part));
        inp.push_str("*Node\n");
        for (i, [x, y, z]) in strip_nodes(count).iter().enumerate() {
            inp.push_str(&format!("{:>7}, {:>12.1}, {:>12.1}, {:>12.1}\n", i + 1, x, y, z));
        }
        inp.push_str("*Element, type=C3D8R\n");
        for label in 1..=count {
            let nodes = strip_connectivity(label);
            let joined: Vec<String> = nodes.iter().map(|n| n.to_string()).collect();
            inp.push_str(&format!("{}, {}\n", label, joined.join(", ")));
        }
        inp.push_str("*Nset, nset=Set-All, generate\n");
        inp.push_str(&format!(" 1, {}, 1\n", 4 * (count + 1)));
        inp.push_str("*Elset, elset=Set-All, generate\n");
        inp.push_str(&format!(" 1, {}, 1\n", count));
        inp.push_str("** Section: Section-1\n");
        inp.push_str("*Solid Section, elset=Set-All, material=Steel\n");
        inp.push_str(",\n");
        inp.push_str("*End Part\n");
        inp.push_str("**\n");
    }
    inp.push_str("**\n** ASSEMBLY\n**\n*Assembly, name=Assembly\n**\n");
    for &(part, _) in parts {
        inp.push_str(&format!("*Instance, name={}, part={}\n", instance_name(part), part));
        inp.push_str("*End Instance\n**\n");
    }
    inp.push_str("*End Assembly\n");
    inp.push_str("**\n** MATERIALS\n**\n*Material, name=Steel\n*Elastic\n200000., 0.3\n");
    inp.push_str("** \n** BOUNDARY CONDITIONS\n** \n");
    inp.push_str("** Name: BC-1 Type: Symmetry/Antisymmetry/Encastre\n*Boundary\n");
    if let Some(&(part, _)) = parts.first() {
        inp.push_str(&format!("{}.Set-All, ENCASTRE\n", instance_name(part)));
    }
    if predefined {
        inp.push_str("** \n** PREDEFINED FIELDS\n** \n");
        inp.push_str("** Name: Predefined Field-1   Type: Temperature\n");
        inp.push_str("*Initial Conditions, type=TEMPERATURE\n");
        if let Some(&(part, _)) = parts.first() {
            inp.push_str(&format!("{}.Set-All, 20.\n", instance_name(part)));
        }
    }
    inp.push_str("** ----------------------------------------------------------------\n");
    inp.push_str("** \n** STEP: Step-1\n** \n*Step, name=Step-1, nlgeom=NO\n*Static\n1., 1., 1e-05, 1.\n");
    inp.push_str("** \n** OUTPUT REQUESTS\n** \n*Restart, write, frequency=0\n");
    inp.push_str("** ----------------------------------------------------------------\n");
    inp.push_str("*End Step\n");
    inp
}

/// Instance meshes matching [`hex_strip_deck`]
pub(crate) fn hex_strip_instances(parts: &[(&str, usize)]) -> Vec<InstanceMesh> {
    parts
        .iter()
        .map(|&(part, count)| {
            let nodes = strip_nodes(count);
            let elements = (1..=count)
                .map(|label| {
                    let coords = strip_connectivity(label).iter().map(|&n| nodes[n - 1]).collect();
                    ElementNodes::new(label as u64, coords)
                })
                .collect();
            InstanceMesh::new(&instance_name(part), part, elements)
        })
        .collect()
}

/// Mesh data for [`hex_strip_deck`]; with a category every element of
/// every part lands in that one category
pub(crate) fn hex_strip_mesh(parts: &[(&str, usize)], category: Option<&str>) -> MeshData {
    let instances = hex_strip_instances(parts);
    match category {
        Some(name) => {
            let name = name.to_string();
            let categorize = move |_part: &str, _x: f64, _y: f64, _z: f64| -> Result<Option<String>, CallbackError> {
                Ok(Some(name.clone()))
            };
            let categorizer: &dyn CategoryFunction = &categorize;
            characterize_mesh(&instances, Some(categorizer)).unwrap()
        }
        None => characterize_mesh(&instances, None).unwrap(),
    }
}
