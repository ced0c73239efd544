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

use crate::error::{Error, Result};

/// Family-level tables of the import. Defaults describe ECP5; a YAML file can
/// replace any of the tables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Device short-name to full part number.
    pub devices: BTreeMap<String, String>,
    /// Speed grades in emission order. The first one is the base grade.
    pub speed_grades: Vec<String>,
    /// Renames applied to pin names of `IOPath` timing entries.
    pub timing_port_xform: BTreeMap<String, String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        let devices = [
            ("25k", "LFE5UM5G-25F"),
            ("45k", "LFE5UM5G-45F"),
            ("85k", "LFE5UM5G-85F"),
        ];
        let xform = [("RAD0", "D0"), ("RAD1", "B0"), ("RAD2", "C0"), ("RAD3", "A0")];

        Self {
            devices: devices.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            speed_grades: ["6", "7", "8", "8_5G"].iter().map(|s| s.to_string()).collect(),
            timing_port_xform: xform.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl ImportConfig {
    pub fn from_yaml_str(yaml: &str, origin: &Path) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|source| Error::Yaml {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml_str(&yaml, path)
    }

    pub fn part_name(&self, device: &str) -> Result<&str> {
        self.devices.get(device)
            .map(|s| s.as_str())
            .ok_or_else(|| Error::UnknownDevice(device.to_string()))
    }

    pub fn base_grade(&self) -> Option<&str> {
        self.speed_grades.first().map(|s| s.as_str())
    }

    pub fn xform_port<'s>(&'s self, port: &'s str) -> &'s str {
        self.timing_port_xform.get(port).map(|s| s.as_str()).unwrap_or(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_devices() {
        let cfg = ImportConfig::default();
        assert_eq!(cfg.part_name("45k").unwrap(), "LFE5UM5G-45F");
        assert!(matches!(cfg.part_name("12k"), Err(Error::UnknownDevice(_))));
        assert_eq!(cfg.base_grade(), Some("6"));
    }

    #[test]
    fn test_yaml_overrides_only_given_tables() {
        let yaml = "speed_grades: [\"8\", \"6\"]\n";
        let cfg = ImportConfig::from_yaml_str(yaml, Path::new("test.yaml")).unwrap();
        assert_eq!(cfg.speed_grades, vec!["8".to_string(), "6".to_string()]);
        assert_eq!(cfg.devices, ImportConfig::default().devices);
    }

    #[test]
    fn test_yaml_rejects_unknown_keys() {
        let yaml = "speedgrades: [\"8\"]\n";
        assert!(matches!(
            ImportConfig::from_yaml_str(yaml, Path::new("test.yaml")),
            Err(Error::Yaml { .. })
        ));
    }

    #[test]
    fn test_port_xform() {
        let cfg = ImportConfig::default();
        assert_eq!(cfg.xform_port("RAD2"), "C0");
        assert_eq!(cfg.xform_port("A0"), "A0");
    }
}
