//! Injection engine
//!
//! A [`JobBuilder`] scans the default deck once, keeping the deck with the
//! element sets already injected as a read-only template. Every job then
//! renders its own copy of that template with an initial stress block at the
//! cached injection line.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::deck::{scan, DeckBuffer, InjectionPoints, INITIAL_STRESS_KEYWORD, PREDEFINED_FIELDS_MARKER};
use crate::elements::{MeshData, StressGroup, StressTensor};
use crate::error::StressFieldResult;
use crate::host::{JobHandle, SolverHost};
use crate::results::ResultFile;

/// Environment variable naming a directory that receives a copy of every
/// generated deck
pub const DEBUG_EXPORT_ENV: &str = "STRESS_FIELD_DEBUG_EXPORT";

/// Outcome of reading stresses back from a finished job
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReadBack {
    /// Largest deviation between old and new stress over the updated groups
    pub deviation: f64,
    /// Number of groups whose stress was replaced
    pub updated: usize,
}

pub struct JobBuilder {
    default_job: String,
    work_dir: PathBuf,
    mesh: MeshData,
    template: DeckBuffer,
    injection: InjectionPoints,
}

impl JobBuilder {
    /// Ask the host for the default deck and prepare the template from it
    pub fn new(
        host: &mut dyn SolverHost,
        default_job: &str,
        mesh: MeshData,
        work_dir: &Path,
    ) -> StressFieldResult<Self> {
        let text = host.write_default_input(default_job)?;
        Self::from_deck_text(default_job, &text, mesh, work_dir)
    }

    pub fn from_deck_text(default_job: &str, text: &str, mesh: MeshData, work_dir: &Path) -> StressFieldResult<Self> {
        let mut template = DeckBuffer::from_text(text);
        let injection = scan(&mut template, &mesh)?;
        info!(
            "Template for {} ready: {} lines, stress block at line {}",
            default_job,
            template.len(),
            injection.stress_index + 1
        );
        Ok(Self {
            default_job: default_job.to_string(),
            work_dir: work_dir.to_path_buf(),
            mesh,
            template,
            injection,
        })
    }

    pub fn default_job(&self) -> &str {
        &self.default_job
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn mesh_data(&self) -> &MeshData {
        &self.mesh
    }

    pub fn mesh_data_mut(&mut self) -> &mut MeshData {
        &mut self.mesh
    }

    /// The deck with element sets injected
    pub fn template(&self) -> &DeckBuffer {
        &self.template
    }

    pub fn injection_points(&self) -> &InjectionPoints {
        &self.injection
    }

    pub fn job_name(&self, scale_index: usize) -> String {
        format!("{}_Stress_Input_Scale_{}", self.default_job, scale_index)
    }

    /// A copy of the template with the stress block for `scale` injected
    pub fn render(&self, scale: f64) -> DeckBuffer {
        let mut deck = self.template.clone();
        let mut block = Vec::new();
        if !self.injection.predefined_exists {
            block.push("** ".to_string());
            block.push(PREDEFINED_FIELDS_MARKER.to_string());
            block.push("** ".to_string());
        }
        block.push(INITIAL_STRESS_KEYWORD.to_string());
        for group in self.mesh.groups() {
            match group.stress() {
                Some(stress) => block.push(stress_line(group, &stress.scaled(scale))),
                None => debug!("{}.{} has no stress, omitted", group.instance_name(), group.name()),
            }
        }
        deck.insert_all(self.injection.stress_index, block);
        deck
    }

    /// Write the deck for one scale factor and create its job
    pub fn create_job(&self, host: &mut dyn SolverHost, scale_index: usize, scale: f64) -> StressFieldResult<JobHandle> {
        let name = self.job_name(scale_index);
        info!("Creating job {} with stress scale {}", name, scale);

        let deck = self.render(scale);
        fs::create_dir_all(&self.work_dir)?;
        let path = self.work_dir.join(format!("{}.inp", name));
        fs::write(&path, deck.to_text())?;
        maybe_export_debug_file(&path);

        Ok(host.create_job_from_input_file(&name, &path)?)
    }

    /// Replace group stresses with the centroid stresses of a finished job.
    ///
    /// Groups without exactly one value in the results keep their stress.
    pub fn update_stress_from_results(&mut self, results: &ResultFile) -> ReadBack {
        let mut read_back = ReadBack::default();
        let mut skipped = 0;
        for group in self.mesh.groups_mut() {
            let element = group.representative();
            let values = results.centroid_stress(element.instance_name(), element.label());
            let [new] = values.as_slice() else {
                debug!(
                    "Expected one stress value for {}.{}, found {}; skipping",
                    element.instance_name(),
                    element.label(),
                    values.len()
                );
                skipped += 1;
                continue;
            };
            let old = group.stress().unwrap_or(StressTensor::ZERO);
            read_back.deviation = read_back.deviation.max(old.deviation(new));
            read_back.updated += 1;
            group.define_stress(Some(*new));
        }
        if skipped > 0 {
            warn!("{} stress groups had no single result value and were skipped", skipped);
        }
        info!(
            "Updated {} stress groups, maximum stress deviation {}",
            read_back.updated, read_back.deviation
        );
        read_back
    }
}

fn stress_line(group: &StressGroup, stress: &StressTensor) -> String {
    let mut line = format!("{}.{},", group.instance_name(), group.name());
    for component in stress.components() {
        line.push_str(&format!("{:?},", component));
    }
    line
}

fn maybe_export_debug_file(path: &Path) {
    let Ok(dest_dir) = std::env::var(DEBUG_EXPORT_ENV) else {
        return;
    };
    let dest_path = PathBuf::from(dest_dir);
    if let Err(err) = fs::create_dir_all(&dest_path) {
        warn!("Failed to create debug export directory {:?}: {}", dest_path, err);
        return;
    }
    let Some(file_name) = path.file_name() else {
        return;
    };
    let dest_file = dest_path.join(file_name);
    match fs::copy(path, &dest_file) {
        Ok(_) => info!("Exported debug file to {:?}", dest_file),
        Err(err) => warn!("Failed to export debug file {:?}: {}", dest_file, err),
    }
}
