/* Copyright (C) 2022 Antmicro
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

/* Per speed grade cell and interconnect timing from the Trellis database.
 *
 * The first speed grade fixes the set of pip classes: its interconnect file
 * registers every class it names. Later grades only overwrite the bounds of
 * classes that are already known. */

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use serde::Deserialize;

use crate::config::ImportConfig;
use crate::error::{Error, Result};
use crate::pip_class::PipClassRegistry;
use crate::strings::ConstIds;
#[allow(unused)]
use crate::log::*;


/// Margin applied to interconnect delays.
pub const PIP_DELAY_MARGIN: f64 = 1.1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Delay {
    pub from_pin: u32,
    pub to_pin: u32,
    pub min_delay: i32,
    pub max_delay: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SetupHold {
    pub pin: u32,
    pub clock: u32,
    pub min_setup: i32,
    pub max_setup: i32,
    pub min_hold: i32,
    pub max_hold: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellTiming {
    /// Cell type name after punctuation normalization.
    pub name: String,
    pub celltype: u32,
    pub delays: Vec<Delay>,
    pub setupholds: Vec<SetupHold>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PipClassDelay {
    pub min_delay: i32,
    pub max_delay: i32,
    pub min_fanout: i32,
    pub max_fanout: i32,
}

impl Default for PipClassDelay {
    fn default() -> Self {
        Self { min_delay: 50, max_delay: 50, min_fanout: 0, max_fanout: 0 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedGradeTiming {
    pub grade: String,
    pub cells: Vec<CellTiming>,
    /// Indexed by pip class index.
    pub pip_classes: Vec<PipClassDelay>,
}

impl SpeedGradeTiming {
    pub fn empty(grade: &str) -> Self {
        Self { grade: grade.to_string(), cells: Vec::new(), pip_classes: Vec::new() }
    }
}

/// A pin given either by name or as an `[edge, name]` pair.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum PinRef {
    Name(String),
    Edge(Vec<String>),
}

impl PinRef {
    fn pin(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name.as_str()),
            Self::Edge(pair) => pair.get(1).map(|s| s.as_str()),
        }
    }
}

#[derive(Deserialize, Debug)]
struct IoPathEntry {
    from_pin: PinRef,
    to_pin: PinRef,
    rising: [i32; 3],
    falling: [i32; 3],
}

#[derive(Deserialize, Debug)]
struct SetupHoldEntry {
    pin: PinRef,
    clock: PinRef,
    setup: [i32; 3],
    hold: [i32; 3],
}

#[derive(Deserialize, Debug)]
struct InterconnectEntry {
    delay: [i32; 3],
    fanout: [i32; 3],
}

/// `TRELLIS_SLICE:REG0_SD=0` -> `TRELLIS_SLICE_REG0_SD_0`
pub fn normalize_cell_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ':' | '=' | ',' => '_',
            c => c,
        })
        .collect()
}

fn scale_delay(delay: i32) -> i32 {
    (delay as f64 * PIP_DELAY_MARGIN) as i32
}

struct CellParser<'c> {
    grade: &'c str,
    cell: &'c str,
    constids: &'c ConstIds,
    config: &'c ImportConfig,
}

impl<'c> CellParser<'c> {
    fn malformed<E: ToString>(&self, reason: E) -> Error {
        Error::MalformedTimingEntry {
            grade: self.grade.to_string(),
            cell: self.cell.to_string(),
            reason: reason.to_string(),
        }
    }

    fn pin(&self, pin: &PinRef, xform: bool) -> Result<u32> {
        let name = pin.pin().ok_or_else(|| self.malformed("pin pair without a pin name"))?;
        let name = if xform { self.config.xform_port(name) } else { name };
        Ok(self.constids.get_or_null(name))
    }

    fn parse_entry(&self, entry: serde_json::Value, cell: &mut CellTiming) -> Result<()> {
        let kind = entry.get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| self.malformed("entry without a type"))?
            .to_string();

        match kind.as_str() {
            "Width" => (),
            "IOPath" => {
                let e: IoPathEntry = serde_json::from_value(entry)
                    .map_err(|e| self.malformed(e))?;
                cell.delays.push(Delay {
                    from_pin: self.pin(&e.from_pin, true)?,
                    to_pin: self.pin(&e.to_pin, true)?,
                    min_delay: e.rising[0].min(e.falling[0]),
                    max_delay: e.rising[2].max(e.falling[2]),
                });
            },
            "SetupHold" => {
                let e: SetupHoldEntry = serde_json::from_value(entry)
                    .map_err(|e| self.malformed(e))?;
                cell.setupholds.push(SetupHold {
                    pin: self.pin(&e.pin, false)?,
                    clock: self.pin(&e.clock, false)?,
                    min_setup: e.setup[0],
                    max_setup: e.setup[2],
                    min_hold: e.hold[0],
                    max_hold: e.hold[2],
                });
            },
            _ => return Err(Error::UnknownTimingEntry {
                grade: self.grade.to_string(),
                cell: self.cell.to_string(),
                kind,
            }),
        }

        Ok(())
    }
}

/// Parses a `cells.json` document. Cells come out in name order.
pub fn parse_cells(
    json: &str,
    origin: &Path,
    grade: &str,
    constids: &ConstIds,
    config: &ImportConfig
) -> Result<Vec<CellTiming>> {
    let doc: BTreeMap<String, Vec<serde_json::Value>> = serde_json::from_str(json)
        .map_err(|e| Error::json(origin, e))?;

    let mut cells = Vec::with_capacity(doc.len());
    for (raw_name, entries) in doc {
        let name = normalize_cell_name(&raw_name);
        let parser = CellParser { grade, cell: &name, constids, config };
        let mut cell = CellTiming {
            celltype: constids.get_or_null(&name),
            name: name.clone(),
            delays: Vec::new(),
            setupholds: Vec::new(),
        };

        for entry in entries {
            parser.parse_entry(entry, &mut cell)?;
        }
        cells.push(cell);
    }

    Ok(cells)
}

/// Applies an `interconnect.json` document to `table`. When `is_base` is set,
/// unknown classes are registered; otherwise they are dropped.
pub fn apply_interconnect(
    json: &str,
    origin: &Path,
    grade: &str,
    is_base: bool,
    registry: &mut PipClassRegistry,
    table: &mut Vec<PipClassDelay>
) -> Result<()> {
    let doc: BTreeMap<String, InterconnectEntry> = serde_json::from_str(json)
        .map_err(|e| Error::json(origin, e))?;

    for (class, entry) in doc {
        let bounds = PipClassDelay {
            min_delay: scale_delay(entry.delay[0]),
            max_delay: scale_delay(entry.delay[2]),
            min_fanout: entry.fanout[0],
            max_fanout: entry.fanout[2],
        };

        let idx = if is_base {
            Some(registry.register(&class))
        } else {
            registry.get(&class)
        };

        match idx {
            Some(idx) => {
                if table.len() <= idx {
                    table.resize(idx + 1, PipClassDelay::default());
                }
                table[idx] = bounds;
            },
            None => {
                dbg_log!(
                    DBG_WARN,
                    "Pip class {} of speed grade {} is not in the base grade, dropping it",
                    class, grade
                );
            },
        }
    }

    Ok(())
}

fn grade_dir(database: &Path, grade: &str) -> PathBuf {
    database.join("ECP5").join("timing").join(format!("speed_{}", grade))
}

/// Loads cell and interconnect timing of every configured speed grade, in
/// configuration order. A grade whose files cannot be read is kept with
/// empty tables.
pub fn load_speed_grades(
    database: &Path,
    config: &ImportConfig,
    constids: &ConstIds,
    registry: &mut PipClassRegistry
) -> Result<Vec<SpeedGradeTiming>> {
    let mut grades = Vec::with_capacity(config.speed_grades.len());

    for grade in &config.speed_grades {
        let dir = grade_dir(database, grade);

        let cells_path = dir.join("cells.json");
        let cells_json = match std::fs::read_to_string(&cells_path) {
            Ok(json) => json,
            Err(e) => {
                dbg_log!(DBG_WARN, "Failed to open cells file for grade {}: {}", grade, e);
                grades.push(SpeedGradeTiming::empty(grade));
                continue;
            }
        };

        dbg_log!(DBG_INFO, "Processing cell types of speed grade {}...", grade);
        let cells = parse_cells(&cells_json, &cells_path, grade, constids, config)?;

        let interconnect_path = dir.join("interconnect.json");
        let interconnect_json = match std::fs::read_to_string(&interconnect_path) {
            Ok(json) => json,
            Err(e) => {
                dbg_log!(DBG_WARN, "Failed to open interconnect file for grade {}: {}", grade, e);
                grades.push(SpeedGradeTiming::empty(grade));
                continue;
            }
        };

        dbg_log!(DBG_INFO, "Processing interconnect of speed grade {}...", grade);
        let mut pip_classes = vec![PipClassDelay::default(); registry.len()];
        apply_interconnect(
            &interconnect_json,
            &interconnect_path,
            grade,
            config.base_grade() == Some(grade.as_str()),
            registry,
            &mut pip_classes
        )?;

        grades.push(SpeedGradeTiming { grade: grade.clone(), cells, pip_classes });
    }

    Ok(grades)
}
