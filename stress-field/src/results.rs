//! Solver result data used for stress read-back and error functions

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::elements::{StressTensor, COMPONENT_LABELS};
use crate::error::HostError;

/// Stress sampled at the centroid of one element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentroidStress {
    /// Instance the element belongs to; `None` for flat models without instances
    pub instance: Option<String>,
    pub label: u64,
    pub stress: StressTensor,
}

/// One output frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultFrame {
    /// Frame time (or label) as written by the solver
    pub time: Option<f64>,
    pub values: Vec<CentroidStress>,
}

/// One analysis step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultStep {
    pub name: String,
    pub frames: Vec<ResultFrame>,
}

/// Opened result of a finished job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    pub steps: Vec<ResultStep>,
}

impl ResultFile {
    /// Last frame of the last step
    pub fn last_frame(&self) -> Option<&ResultFrame> {
        self.steps.last().and_then(|step| step.frames.last())
    }

    /// Centroid stresses of an element in the last frame.
    ///
    /// Instance names are compared ignoring case, as result files store them
    /// upper case. Values without an instance match any instance.
    pub fn centroid_stress(&self, instance: &str, label: u64) -> Vec<StressTensor> {
        let Some(frame) = self.last_frame() else {
            return Vec::new();
        };
        frame
            .values
            .iter()
            .filter(|v| v.label == label)
            .filter(|v| v.instance.as_deref().map_or(true, |i| i.eq_ignore_ascii_case(instance)))
            .map(|v| v.stress)
            .collect()
    }

    pub fn from_dat_file(path: &Path) -> Result<Self, HostError> {
        if !path.exists() {
            return Err(HostError::AnalysisFailed(format!("No .dat file at {}", path.display())));
        }
        let content = fs::read_to_string(path)
            .map_err(|e| HostError::IoError(format!("Failed to read .dat file: {}", e)))?;
        Self::parse_dat(&content)
    }

    /// Parse element stress tables from a `.dat` file.
    ///
    /// Abaqus files are recognized by their `E L E M E N T   O U T P U T`
    /// banner, anything else is read as CalculiX output.
    pub fn parse_dat(content: &str) -> Result<Self, HostError> {
        let frames = if content.contains(ABAQUS_ELEMENT_OUTPUT) {
            Self::parse_abaqus_tables(content)?
        } else {
            Self::parse_calculix_tables(content)?
        };

        let values: usize = frames.iter().map(|f| f.values.len()).sum();
        if values == 0 {
            tracing::warn!("No element stresses found in .dat file");
        }
        tracing::info!("Parsed {} stress frames from .dat file", frames.len());
        Ok(Self {
            steps: vec![ResultStep {
                name: "Step-1".to_string(),
                frames,
            }],
        })
    }

    /// CalculiX tables: every `stresses (...)` header opens a new frame and
    /// rows hold `elem int.pnt. sxx syy szz sxy sxz syz`
    fn parse_calculix_tables(content: &str) -> Result<Vec<ResultFrame>, HostError> {
        let header = Regex::new(r"(?i)^\s*stresses\b.*?(?:\btime\s+(\S+))?\s*$")
            .map_err(|e| HostError::ParsingError(e.to_string()))?;

        let mut frames = Vec::new();
        let mut current: Option<FrameSums> = None;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(caps) = header.captures(line) {
                if let Some(sums) = current.take() {
                    frames.push(sums.averaged());
                }
                let time = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
                tracing::debug!("Found stresses section: {}", trimmed);
                current = Some(FrameSums::new(time));
                continue;
            }

            // Any other text header ends the stress table
            if trimmed.chars().next().map_or(false, |c| !c.is_ascii_digit() && c != '-') {
                if let Some(sums) = current.take() {
                    frames.push(sums.averaged());
                }
                continue;
            }

            let Some(sums) = current.as_mut() else {
                continue;
            };
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() < 8 {
                continue;
            }
            let label = parts[0]
                .parse::<u64>()
                .map_err(|e| HostError::ParsingError(format!("bad element label '{}': {}", parts[0], e)))?;
            let mut values = [0.0; 6];
            for (slot, text) in values.iter_mut().zip(&parts[2..8]) {
                *slot = parse_value(text)?;
            }
            sums.add(None, label, values);
        }
        if let Some(sums) = current.take() {
            frames.push(sums.averaged());
        }
        Ok(frames)
    }

    /// Abaqus tables: every element output banner opens a new frame. Each
    /// table names its stress columns in an `ELEMENT ... S11 ...` header;
    /// rows start with the element label, written `INSTANCE.label` for
    /// assembly models, and end with one value per named column.
    fn parse_abaqus_tables(content: &str) -> Result<Vec<ResultFrame>, HostError> {
        let total_time = Regex::new(r"(?i)total\s+time\s+completed\s+([-+0-9.eE]+)")
            .map_err(|e| HostError::ParsingError(e.to_string()))?;

        let mut frames = Vec::new();
        let mut current: Option<FrameSums> = None;
        let mut columns: Option<Vec<(usize, usize)>> = None;
        let mut time = None;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed == "NOTE" {
                continue;
            }

            if trimmed.contains(ABAQUS_ELEMENT_OUTPUT) {
                if let Some(sums) = current.take() {
                    frames.push(sums.averaged());
                }
                tracing::debug!("Found element output section");
                current = Some(FrameSums::new(time));
                columns = None;
                continue;
            }
            if let Some(caps) = total_time.captures(trimmed) {
                time = caps[1].parse::<f64>().ok();
                continue;
            }

            let Some(sums) = current.as_mut() else {
                continue;
            };
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts[0] == "ELEMENT" && parts.iter().any(|p| COMPONENT_LABELS.contains(p)) {
                // Component slot and column position counted from the end of the row
                let table: Vec<(usize, usize)> = parts
                    .iter()
                    .enumerate()
                    .filter_map(|(i, p)| {
                        let slot = COMPONENT_LABELS.iter().position(|c| c == p)?;
                        Some((slot, parts.len() - i))
                    })
                    .collect();
                tracing::debug!("Stress table with {} components", table.len());
                columns = Some(table);
                continue;
            }

            // Summary lines such as MAXIMUM or MINIMUM end the table
            let Some((instance, label)) = element_label(parts[0]) else {
                columns = None;
                continue;
            };
            let Some(table) = columns.as_ref() else {
                continue;
            };
            let width = table.iter().map(|&(_, from_end)| from_end).max().unwrap_or(0);
            if parts.len() <= width {
                continue;
            }
            let mut values = [0.0; 6];
            for &(slot, from_end) in table {
                values[slot] = parse_value(parts[parts.len() - from_end])?;
            }
            sums.add(instance, label, values);
        }
        if let Some(sums) = current.take() {
            frames.push(sums.averaged());
        }
        Ok(frames)
    }
}

/// Banner of an Abaqus element output section
const ABAQUS_ELEMENT_OUTPUT: &str = "E L E M E N T   O U T P U T";

/// Per element sums of one frame, averaged into centroid values
struct FrameSums {
    time: Option<f64>,
    sums: BTreeMap<(Option<String>, u64), ([f64; 6], usize)>,
}

impl FrameSums {
    fn new(time: Option<f64>) -> Self {
        Self {
            time,
            sums: BTreeMap::new(),
        }
    }

    fn add(&mut self, instance: Option<String>, label: u64, values: [f64; 6]) {
        let entry = self.sums.entry((instance, label)).or_insert(([0.0; 6], 0));
        for (sum, value) in entry.0.iter_mut().zip(values) {
            *sum += value;
        }
        entry.1 += 1;
    }

    fn averaged(self) -> ResultFrame {
        let values = self
            .sums
            .into_iter()
            .map(|((instance, label), (sum, count))| CentroidStress {
                instance,
                label,
                stress: StressTensor::new(sum.map(|s| s / count as f64)),
            })
            .collect();
        ResultFrame { time: self.time, values }
    }
}

/// `12` or `PART-1-1.12`
fn element_label(text: &str) -> Option<(Option<String>, u64)> {
    match text.rsplit_once('.') {
        Some((instance, label)) if !instance.is_empty() => {
            label.parse().ok().map(|label| (Some(instance.to_string()), label))
        }
        _ => text.parse().ok().map(|label| (None, label)),
    }
}

fn parse_value(text: &str) -> Result<f64, HostError> {
    text.parse::<f64>()
        .map_err(|e| HostError::ParsingError(format!("bad stress value '{}': {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DAT: &str = "
                        S T E P       1

                                INCREMENT     1

 stresses (elem, integ.pnt.,sxx,syy,szz,sxy,sxz,syz) for set EALL and time  0.5000000E+00

         1   1  1.000000E+02  2.000000E+00  0.000000E+00  0.000000E+00  0.000000E+00  0.000000E+00
         1   2  3.000000E+02  4.000000E+00  0.000000E+00  0.000000E+00  0.000000E+00  0.000000E+00

 displacements (vx,vy,vz) for set NALL and time  0.5000000E+00

         1  1.000000E-03  0.000000E+00  0.000000E+00

 stresses (elem, integ.pnt.,sxx,syy,szz,sxy,sxz,syz) for set EALL and time  0.1000000E+01

         1   1 -1.000000E+01  0.000000E+00  0.000000E+00  5.000000E+00  0.000000E+00  0.000000E+00
         2   1  7.000000E+00  0.000000E+00  0.000000E+00  0.000000E+00  0.000000E+00 -1.500000E+00
";

    #[test]
    fn test_parse_dat_frames() {
        let result = ResultFile::parse_dat(DAT).unwrap();
        assert_eq!(result.steps.len(), 1);
        let frames = &result.steps[0].frames;
        assert_eq!(frames.len(), 2);
        assert_relative_eq!(frames[0].time.unwrap(), 0.5);

        // Integration points are averaged
        let first = &frames[0].values[0];
        assert_eq!(first.label, 1);
        assert_relative_eq!(first.stress.0[0], 200.0);
        assert_relative_eq!(first.stress.0[1], 3.0);
    }

    #[test]
    fn test_lookup_uses_last_frame() {
        let result = ResultFile::parse_dat(DAT).unwrap();
        let values = result.centroid_stress("ANY-INSTANCE", 1);
        assert_eq!(values.len(), 1);
        assert_relative_eq!(values[0].0[0], -10.0);
        assert_relative_eq!(values[0].0[3], 5.0);
        assert!(result.centroid_stress("ANY", 3).is_empty());
    }

    const ABAQUS_DAT: &str = "
                              S T E P       1     S T A T I C   A N A L Y S I S

 INCREMENT     1 SUMMARY

 TIME INCREMENT COMPLETED   0.500    ,  FRACTION OF STEP COMPLETED   0.500
 STEP TIME COMPLETED        0.500    ,  TOTAL TIME COMPLETED         0.500

                                   E L E M E N T   O U T P U T

 THE FOLLOWING TABLE IS PRINTED AT THE CENTROID OF THE ELEMENT FOR ELEMENT TYPE C3D8R AND ELEMENT SET ASSEMBLY__PICKEDSET5

    ELEMENT  FOOT-       S11         S22         S33         S12         S13         S23
             NOTE

  BLOCK-1.1         -1.000E+02   2.000E+00   0.000E+00   0.000E+00   0.000E+00   0.000E+00

 MAXIMUM            -1.000E+02   2.000E+00   0.000E+00   0.000E+00   0.000E+00   0.000E+00
 ELEMENT             BLOCK-1.1   BLOCK-1.1   BLOCK-1.1   BLOCK-1.1   BLOCK-1.1   BLOCK-1.1

 INCREMENT     2 SUMMARY

 STEP TIME COMPLETED         1.00    ,  TOTAL TIME COMPLETED          1.00

                                   E L E M E N T   O U T P U T

 THE FOLLOWING TABLE IS PRINTED AT THE INTEGRATION POINTS FOR ELEMENT TYPE C3D8 AND ELEMENT SET ASSEMBLY__PICKEDSET5

    ELEMENT  PT FOOT-       S11         S22         S33         S12         S13         S23       MISES
                NOTE

  BLOCK-1.1   1        -2.000E+02   0.000E+00   0.000E+00   5.000E+00   0.000E+00   0.000E+00   2.000E+02
  BLOCK-1.1   2        -4.000E+02   0.000E+00   0.000E+00   5.000E+00   0.000E+00   0.000E+00   4.000E+02
  BLOCK-1.2   1         7.000E+00   0.000E+00   0.000E+00   0.000E+00   0.000E+00  -1.500E+00   7.000E+00

 THE FOLLOWING TABLE IS PRINTED AT THE CENTROID OF THE ELEMENT FOR ELEMENT TYPE CPS4R AND ELEMENT SET PLATE

    ELEMENT  FOOT-       S11         S22         S12
             NOTE

         3           1.000E+01   2.000E+01   3.000E+01

                                       N O D E   O U T P U T

    NODE FOOT-  U1             U2             U3
        NOTE

      1      1.000E-03   0.000E+00   0.000E+00
";

    #[test]
    fn test_parse_abaqus_element_output() {
        let result = ResultFile::parse_dat(ABAQUS_DAT).unwrap();
        let frames = &result.steps[0].frames;
        assert_eq!(frames.len(), 2);
        assert_relative_eq!(frames[0].time.unwrap(), 0.5);
        assert_relative_eq!(frames[1].time.unwrap(), 1.0);
        assert_eq!(frames[0].values.len(), 1);
        assert_eq!(frames[1].values.len(), 3);

        // Integration points are averaged and trailing columns ignored
        let values = result.centroid_stress("Block-1", 1);
        assert_eq!(values, vec![StressTensor::new([-300.0, 0.0, 0.0, 5.0, 0.0, 0.0])]);
        assert_eq!(
            result.centroid_stress("Block-1", 2),
            vec![StressTensor::new([7.0, 0.0, 0.0, 0.0, 0.0, -1.5])]
        );
        assert!(result.centroid_stress("Other-1", 1).is_empty());

        // Plane stress tables fill the components they name
        assert_eq!(
            result.centroid_stress("Plate-1", 3),
            vec![StressTensor::new([10.0, 20.0, 0.0, 30.0, 0.0, 0.0])]
        );
    }

    #[test]
    fn test_abaqus_file_without_stress_tables() {
        let content = "
                                   E L E M E N T   O U T P U T

 THE FOLLOWING TABLE IS PRINTED AT THE CENTROID OF THE ELEMENT FOR ELEMENT TYPE C3D8R AND ELEMENT SET EALL

    ELEMENT  FOOT-       E11         E22
             NOTE

         1           1.000E-03   2.000E-03
";
        let result = ResultFile::parse_dat(content).unwrap();
        assert_eq!(result.steps[0].frames.len(), 1);
        assert!(result.centroid_stress("Part-1-1", 1).is_empty());
    }

    #[test]
    fn test_lookup_ignores_instance_case() {
        let result = ResultFile {
            steps: vec![ResultStep {
                name: "Step-1".into(),
                frames: vec![ResultFrame {
                    time: None,
                    values: vec![
                        CentroidStress {
                            instance: Some("PART-1-1".into()),
                            label: 4,
                            stress: StressTensor::new([1.0; 6]),
                        },
                        CentroidStress {
                            instance: Some("OTHER-1".into()),
                            label: 4,
                            stress: StressTensor::new([2.0; 6]),
                        },
                    ],
                }],
            }],
        };
        assert_eq!(result.centroid_stress("Part-1-1", 4), vec![StressTensor::new([1.0; 6])]);
        assert!(ResultFile::default().centroid_stress("Part-1-1", 4).is_empty());
    }
}
