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

use std::collections::BTreeMap;
use std::path::Path;
use serde::Deserialize;

use crate::chipdb::{ArchDatabase, Location, LocTypeDirectory};
use crate::error::{Error, Result};
#[allow(unused)]
use crate::log::*;

#[derive(Deserialize, Debug)]
struct PinLoc {
    col: i16,
    row: i16,
    pio: String,
}

#[derive(Deserialize, Debug)]
struct PioMetadata {
    col: i16,
    row: i16,
    pio: String,
    bank: i32,
    #[serde(default)]
    function: Option<String>,
}

#[derive(Deserialize, Debug)]
struct IoDbJson {
    packages: BTreeMap<String, BTreeMap<String, PinLoc>>,
    #[serde(default)]
    pio_metadata: Vec<PioMetadata>,
}

/// A package pin bound to a PIO bel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pin {
    pub name: String,
    pub location: Location,
    pub bel_index: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinData {
    pub location: Location,
    pub bel_index: u32,
    pub bank: u16,
    pub function: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IoDb {
    /// Package name to its pins, both in name order.
    pub packages: BTreeMap<String, Vec<Pin>>,
    pub pios: Vec<PinData>,
}

impl IoDb {
    pub fn parse<D>(json: &str, origin: &Path, db: &D, dir: &LocTypeDirectory) -> Result<Self>
    where
        D: ArchDatabase
    {
        let doc: IoDbJson = serde_json::from_str(json).map_err(|e| Error::json(origin, e))?;
        let bel_index = |col: i16, row: i16, pio: &str| {
            let loc = Location::new(col, row);
            let name = format!("PIO{}", pio);
            match dir.bel_index(db, loc, &name) {
                Some(idx) => Some((loc, idx as u32)),
                None => {
                    dbg_log!(DBG_INFO, "No bel {} at R{}C{}", name, row, col);
                    None
                }
            }
        };

        let mut iodb = IoDb::default();

        for (package, pins) in doc.packages {
            let pins = pins.into_iter()
                .filter_map(|(name, p)| {
                    let (location, bel_index) = bel_index(p.col, p.row, &p.pio)?;
                    Some(Pin { name, location, bel_index })
                })
                .collect();
            iodb.packages.insert(package, pins);
        }

        for meta in doc.pio_metadata {
            if let Some((location, bel_index)) = bel_index(meta.col, meta.row, &meta.pio) {
                iodb.pios.push(PinData {
                    location,
                    bel_index,
                    bank: meta.bank as u16,
                    function: meta.function.filter(|f| !f.is_empty()),
                });
            }
        }

        Ok(iodb)
    }

    /// Loads `<database>/ECP5/<part>/iodb.json`. A missing file yields an
    /// empty database.
    pub fn load<D>(database: &Path, part: &str, db: &D, dir: &LocTypeDirectory) -> Result<Self>
    where
        D: ArchDatabase
    {
        let path = database.join("ECP5").join(part).join("iodb.json");
        match std::fs::read_to_string(&path) {
            Ok(json) => {
                dbg_log!(DBG_INFO, "Parsing IODB {:?}...", path);
                Self::parse(&json, &path, db, dir)
            },
            Err(e) => {
                dbg_log!(DBG_WARN, "Failed to open IODB file for device {}: {}", part, e);
                Ok(Self::default())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chipdb::fixtures::two_by_two;

    #[test]
    fn test_parse_iodb() {
        let dump = two_by_two();
        let dir = LocTypeDirectory::build(&dump).unwrap();
        let json = r#"{
            "packages": {
                "CABGA381": {
                    "B3": {"col": 1, "row": 0, "pio": "A"},
                    "A2": {"col": 0, "row": 1, "pio": "A"},
                    "C1": {"col": 0, "row": 1, "pio": "B"}
                },
                "CSFBGA285": {}
            },
            "pio_metadata": [
                {"col": 1, "row": 0, "pio": "A", "bank": 7, "function": "PCLKT7_0"},
                {"col": 0, "row": 1, "pio": "A", "bank": 6},
                {"col": 9, "row": 9, "pio": "A", "bank": 0}
            ]
        }"#;

        let iodb = IoDb::parse(json, Path::new("iodb.json"), &dump, &dir).unwrap();
        assert_eq!(iodb.packages.len(), 2);

        let pins = &iodb.packages["CABGA381"];
        assert_eq!(pins, &vec![
            Pin { name: "A2".into(), location: Location::new(0, 1), bel_index: 0 },
            Pin { name: "B3".into(), location: Location::new(1, 0), bel_index: 0 },
        ]);
        assert!(iodb.packages["CSFBGA285"].is_empty());

        assert_eq!(iodb.pios.len(), 2);
        assert_eq!(iodb.pios[0].function.as_deref(), Some("PCLKT7_0"));
        assert_eq!(iodb.pios[0].bank, 7);
        assert_eq!(iodb.pios[1].function, None);
    }

    #[test]
    fn test_missing_iodb_is_empty() {
        let dump = two_by_two();
        let dir = LocTypeDirectory::build(&dump).unwrap();
        let iodb = IoDb::load(Path::new("/nonexistent"), "LFE5UM5G-25F", &dump, &dir).unwrap();
        assert_eq!(iodb, IoDb::default());
    }
}
