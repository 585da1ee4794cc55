//! Instance meshes read back from an Abaqus/CAE style deck
//!
//! Only what characterization needs is read: node coordinates and element
//! connectivity inside `*Part` blocks, and the `*Instance` lines of the
//! assembly. Instance placement (translation/rotation) is not applied.

use std::collections::HashMap;

use regex::Regex;

use crate::error::HostError;
use crate::mesh::{ElementNodes, InstanceMesh};

#[derive(Default)]
struct PartGeometry {
    nodes: HashMap<u64, [f64; 3]>,
    elements: Vec<(u64, Vec<u64>)>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Nodes,
    Elements,
}

/// Parse the part instances of a deck
pub fn parse_instances(text: &str) -> Result<Vec<InstanceMesh>, HostError> {
    let name_param = keyword_parameter("name")?;
    let part_param = keyword_parameter("part")?;

    let mut parts: HashMap<String, PartGeometry> = HashMap::new();
    let mut instances: Vec<(String, String)> = Vec::new();
    let mut current_part: Option<String> = None;
    let mut section = Section::None;
    let mut continues_element = false;

    for (line_num, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("**") {
            continue;
        }

        if line.starts_with('*') {
            continues_element = false;
            let keyword = line.to_uppercase();
            section = Section::None;

            if keyword.starts_with("*PART") {
                let name = capture(&name_param, line)
                    .ok_or_else(|| HostError::ParsingError(format!("line {}: part without name", line_num + 1)))?;
                parts.entry(name.clone()).or_default();
                current_part = Some(name);
            } else if keyword.starts_with("*END PART") {
                current_part = None;
            } else if keyword.starts_with("*NODE") && !keyword.starts_with("*NODE ") && current_part.is_some() {
                section = Section::Nodes;
            } else if keyword.starts_with("*ELEMENT") && current_part.is_some() {
                section = Section::Elements;
            } else if keyword.starts_with("*INSTANCE") {
                let name = capture(&name_param, line);
                let part = capture(&part_param, line);
                match (name, part) {
                    (Some(name), Some(part)) => instances.push((name, part)),
                    _ => {
                        return Err(HostError::ParsingError(format!(
                            "line {}: instance needs name and part",
                            line_num + 1
                        )))
                    }
                }
            }
            continue;
        }

        let Some(part) = current_part.as_ref().and_then(|p| parts.get_mut(p)) else {
            continue;
        };
        let values: Vec<&str> = line.split(',').map(str::trim).filter(|v| !v.is_empty()).collect();

        match section {
            Section::Nodes => {
                if values.len() < 4 {
                    return Err(HostError::ParsingError(format!("line {}: expected node id, x, y, z", line_num + 1)));
                }
                let id = parse_label(values[0], line_num)?;
                let mut coords = [0.0; 3];
                for (slot, text) in coords.iter_mut().zip(&values[1..4]) {
                    *slot = text
                        .parse::<f64>()
                        .map_err(|e| HostError::ParsingError(format!("line {}: {}", line_num + 1, e)))?;
                }
                part.nodes.insert(id, coords);
            }
            Section::Elements => {
                let labels = values
                    .iter()
                    .map(|v| parse_label(v, line_num))
                    .collect::<Result<Vec<_>, _>>()?;
                match (continues_element, part.elements.last_mut()) {
                    (true, Some((_, nodes))) => nodes.extend(labels),
                    _ => {
                        let Some((&label, nodes)) = labels.split_first() else {
                            continue;
                        };
                        part.elements.push((label, nodes.to_vec()));
                    }
                }
                continues_element = line.ends_with(',');
            }
            Section::None => {}
        }
    }

    let mut meshes = Vec::with_capacity(instances.len());
    for (name, part_name) in instances {
        let part = parts
            .get(&part_name)
            .ok_or_else(|| HostError::ParsingError(format!("instance {} refers to unknown part {}", name, part_name)))?;
        let mut elements = Vec::with_capacity(part.elements.len());
        for (label, node_labels) in &part.elements {
            let nodes = node_labels
                .iter()
                .map(|n| {
                    part.nodes.get(n).copied().ok_or_else(|| {
                        HostError::ParsingError(format!("element {} of part {} uses unknown node {}", label, part_name, n))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            elements.push(ElementNodes::new(*label, nodes));
        }
        tracing::debug!("Instance {} of part {}: {} elements", name, part_name, elements.len());
        meshes.push(InstanceMesh::new(&name, &part_name, elements));
    }
    Ok(meshes)
}

fn keyword_parameter(key: &str) -> Result<Regex, HostError> {
    Regex::new(&format!(r"(?i),\s*{}\s*=\s*([^,]+)", key)).map_err(|e| HostError::ParsingError(e.to_string()))
}

fn capture(pattern: &Regex, line: &str) -> Option<String> {
    pattern.captures(line).map(|c| c[1].trim().to_string())
}

fn parse_label(text: &str, line_num: usize) -> Result<u64, HostError> {
    text.parse::<u64>()
        .map_err(|e| HostError::ParsingError(format!("line {}: bad label '{}': {}", line_num + 1, text, e)))
}
