//! Single pass marker scanner
//!
//! The scan runs in two phases over one cursor. The first phase walks the
//! part definitions and inserts the `*Elset` declarations of every part that
//! has stress groups, directly after that part's element definitions. The
//! second phase continues from there to find where the initial stress block
//! belongs: right before the separator that closes the boundary condition
//! section.

use tracing::{debug, info, warn};

use super::{
    DeckBuffer, BOUNDARY_CONDITIONS_MARKER, ELEMENT_MARKER, ELSET_KEYWORD, LABELS_PER_LINE,
    NODE_MARKER, PART_MARKER, PREDEFINED_FIELDS_MARKER, SECTION_SEPARATOR_PREFIX,
};
use crate::elements::{MeshData, StressGroup};
use crate::error::DeckError;

/// Where element sets of one part were inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetInjection {
    pub part: String,
    /// Index of the first inserted line
    pub line: usize,
    /// Number of inserted lines
    pub count: usize,
}

/// Result of scanning a deck
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionPoints {
    pub element_sets: Vec<SetInjection>,
    /// Line index at which the stress block is inserted
    pub stress_index: usize,
    /// Whether the deck already has a `** PREDEFINED FIELDS` section
    pub predefined_exists: bool,
}

/// Inject the element sets of `mesh` into `deck` and locate the stress
/// injection line.
///
/// The scan is bounded by the deck length: a deck missing one of the
/// expected markers yields [`DeckError::MarkerNotFound`].
pub fn scan(deck: &mut DeckBuffer, mesh: &MeshData) -> Result<InjectionPoints, DeckError> {
    let mut cursor = ScanCursor::new(mesh);
    cursor.inject_element_sets(deck, mesh)?;
    let stress_index = cursor.find_stress_injection_line(deck)?;
    Ok(InjectionPoints {
        element_sets: cursor.set_injections,
        stress_index,
        predefined_exists: cursor.predefined,
    })
}

struct ScanCursor {
    /// Part name of every mesh data entry, `None` for instances without groups
    names: Vec<Option<String>>,
    line: usize,
    current: Option<usize>,
    pending: Vec<usize>,
    predefined: bool,
    set_injections: Vec<SetInjection>,
}

impl ScanCursor {
    fn new(mesh: &MeshData) -> Self {
        // Parts without groups have nothing to inject and never become current
        let pending = mesh
            .parts()
            .iter()
            .enumerate()
            .filter_map(|(i, part)| match part {
                Some(p) if p.group_count() > 0 => Some(i),
                _ => {
                    debug!("Instance {} has no element groups to inject", i);
                    None
                }
            })
            .collect();

        let names = mesh
            .parts()
            .iter()
            .map(|p| p.as_ref().and_then(|p| p.part_name()).map(str::to_string))
            .collect();

        Self {
            names,
            line: 0,
            current: None,
            pending,
            predefined: false,
            set_injections: Vec::new(),
        }
    }

    fn part_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).and_then(|n| n.as_deref())
    }

    fn pending_parts(&self) -> Vec<String> {
        self.current
            .iter()
            .chain(self.pending.iter())
            .filter_map(|&i| self.part_name(i))
            .map(str::to_string)
            .collect()
    }

    fn next_line<'d>(&mut self, deck: &'d DeckBuffer, marker: &'static str) -> Result<&'d str, DeckError> {
        let line = deck.line(self.line).ok_or_else(|| DeckError::MarkerNotFound {
            marker,
            line: self.line,
            pending: self.pending_parts(),
        })?;
        self.line += 1;
        Ok(line)
    }

    fn inject_element_sets(&mut self, deck: &mut DeckBuffer, mesh: &MeshData) -> Result<(), DeckError> {
        while !self.pending.is_empty() || self.current.is_some() {
            match self.current {
                None => {
                    let line = self.next_line(deck, PART_MARKER)?;
                    let Some(part_name) = line.strip_prefix(PART_MARKER) else {
                        continue;
                    };
                    info!("Found input file part definition for {}", part_name);

                    let found = self.pending.iter().position(|&i| self.part_name(i) == Some(part_name));
                    match found {
                        Some(position) => {
                            info!("Injecting sets for part {}", part_name);
                            self.current = Some(self.pending.remove(position));
                            if !deck.line(self.line).is_some_and(|l| l.starts_with(NODE_MARKER)) {
                                warn!("Part {} is not followed by a {} section", part_name, NODE_MARKER);
                            }
                            self.line += 1;
                        }
                        None => info!("Skipping {}", part_name),
                    }
                }
                Some(index) => {
                    let line = self.next_line(deck, "end of element definitions")?;
                    if line.starts_with(' ') || !line.starts_with('*') || line.starts_with(ELEMENT_MARKER) {
                        continue;
                    }

                    self.line -= 1;
                    debug!("Element set injection starts at line {}", self.line + 1);
                    let Some(part) = mesh.part(index) else {
                        self.current = None;
                        continue;
                    };
                    let block = element_set_lines(part.groups());
                    let count = deck.insert_all(self.line, block);
                    self.set_injections.push(SetInjection {
                        part: self.part_name(index).unwrap_or_default().to_string(),
                        line: self.line,
                        count,
                    });
                    // Past the injected block and the section line that ended the elements
                    self.line += count + 1;
                    self.current = None;
                }
            }
        }
        Ok(())
    }

    fn find_stress_injection_line(&mut self, deck: &DeckBuffer) -> Result<usize, DeckError> {
        let mut in_boundary_section = false;
        loop {
            let marker = if in_boundary_section {
                SECTION_SEPARATOR_PREFIX
            } else {
                BOUNDARY_CONDITIONS_MARKER
            };
            let line = self.next_line(deck, marker)?;

            if !in_boundary_section {
                if line == BOUNDARY_CONDITIONS_MARKER {
                    debug!("Boundary condition section found at line {}", self.line);
                    in_boundary_section = true;
                }
                continue;
            }

            if line == PREDEFINED_FIELDS_MARKER {
                self.predefined = true;
                continue;
            }
            if line.starts_with(SECTION_SEPARATOR_PREFIX) {
                let index = self.line - 1;
                info!("Stress field injection starts at line {}", index + 1);
                self.line = index;
                return Ok(index);
            }
        }
    }
}

/// `*Elset` declarations for a run of groups
pub fn element_set_lines(groups: &[StressGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(format!("{}{}", ELSET_KEYWORD, group.name()));
        lines.extend(label_lines(&group.labels().collect::<Vec<_>>()));
    }
    lines
}

/// Element label data lines: at most [`LABELS_PER_LINE`] labels per line,
/// separated by `, ` and terminated by `,`
pub fn label_lines(labels: &[u64]) -> Vec<String> {
    labels
        .chunks(LABELS_PER_LINE)
        .map(|chunk| {
            let mut line = chunk.iter().map(u64::to_string).collect::<Vec<_>>().join(", ");
            line.push(',');
            line
        })
        .collect()
}
