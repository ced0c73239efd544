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

use std::collections::HashMap;
use std::borrow::Borrow;
use std::path::Path;

use crate::error::{Error, Result};
#[allow(unused)]
use crate::log::*;

/// Insertion-ordered string interner. Indices start at `first_index` and are
/// never reassigned.
#[derive(Debug, Clone)]
pub struct StringTable {
    strings: Vec<String>,
    revmap: HashMap<String, u32>,
    first_index: u32,
}

impl StringTable {
    pub fn new(first_index: u32) -> Self {
        Self { strings: Vec::new(), revmap: HashMap::new(), first_index }
    }

    /// Get an identifier for a provided string. Creates a new identifier if the
    /// string was not registered. Returns an existing identifier if the string has been
    /// already registered.
    pub fn intern<S>(&mut self, s: S) -> u32 where
        S: ToString + Borrow<str>
    {
        if let Some(id) = self.revmap.get(s.borrow()) {
            return *id;
        }

        let id = self.first_index + self.strings.len() as u32;
        let s = s.to_string();
        self.revmap.insert(s.clone(), id);
        self.strings.push(s);

        id
    }

    pub fn get(&self, s: &str) -> Option<u32> {
        self.revmap.get(s).copied()
    }

    /// Makes `alias` resolve to the same index as `target`. Does not consume
    /// an index and does not appear in `iter`.
    pub fn alias(&mut self, alias: &str, target: &str) -> bool {
        match self.revmap.get(target).copied() {
            Some(id) => {
                self.revmap.insert(alias.to_string(), id);
                true
            },
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Registered strings in index order.
    pub fn iter<'s>(&'s self) -> impl Iterator<Item = (u32, &'s str)> + 's {
        self.strings.iter()
            .enumerate()
            .map(move |(idx, s)| (self.first_index + idx as u32, s.as_str()))
    }
}

/// Tile-type names, indexed from 0 in order of first use.
#[derive(Debug, Clone)]
pub struct TileTypeNames(StringTable);

impl Default for TileTypeNames {
    fn default() -> Self {
        Self(StringTable::new(0))
    }
}

impl TileTypeNames {
    pub fn index_of(&mut self, name: &str) -> u16 {
        self.0.intern(name) as u16
    }

    pub fn table(&self) -> &StringTable {
        &self.0
    }
}

/// Identifiers shared with the place-and-route engine ("constids"), indexed
/// from 1 in the order of the identifier table.
#[derive(Debug, Clone)]
pub struct ConstIds(StringTable);

impl Default for ConstIds {
    fn default() -> Self {
        Self(StringTable::new(1))
    }
}

impl ConstIds {
    /// Parses the `X(NAME)` lines of a constids include file.
    pub fn parse(text: &str) -> Self {
        let mut ids = Self::default();

        for line in text.lines() {
            if line.len() < 4 || !line.starts_with('X') {
                continue;
            }
            let name = line.find('(')
                .zip(line.find(')'))
                .filter(|(start, end)| start < end)
                .map(|(start, end)| &line[start + 1 .. end]);
            match name {
                Some(name) => { ids.0.intern(name); },
                None => {
                    dbg_log!(DBG_WARN, "Failed to parse constids line: {}", line);
                },
            }
        }

        ids.0.alias("SLICE", "TRELLIS_SLICE");
        ids.0.alias("PIO", "TRELLIS_IO");

        ids
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|_| Error::ConstIds(path.to_path_buf()))?;
        let ids = Self::parse(&text);
        dbg_log!(DBG_INFO, "Loaded {} constids from {:?}", ids.0.len(), path);
        Ok(ids)
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.0.get(name)
    }

    /// Index of `name`, or 0 (the null identifier) if the table lacks it.
    pub fn get_or_null(&self, name: &str) -> u32 {
        match self.0.get(name) {
            Some(id) => id,
            None => {
                dbg_log!(DBG_WARN, "Identifier {} is not a known constid", name);
                0
            }
        }
    }

    pub fn intern(&mut self, name: &str) -> u32 {
        self.0.intern(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
