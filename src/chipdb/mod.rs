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

/* In-memory model of a deduplicated chip database: location types keyed by a
 * structural checksum, and a grid mapping every coordinate to one of them.
 * All wire/bel/pip references inside a location type are relative to the
 * coordinate the type is instantiated at. */

use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

pub mod loader;
pub mod directory;
#[cfg(test)]
pub(crate) mod fixtures;

pub use self::directory::LocTypeDirectory;
pub use self::loader::OpenOpts;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
pub struct Location {
    pub x: i16,
    pub y: i16,
}

impl Location {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// `self` moved by `rel`, or `None` if a coordinate leaves the `i16` range.
    pub fn checked_offset(self, rel: Location) -> Option<Location> {
        Some(Location {
            x: self.x.checked_add(rel.x)?,
            y: self.y.checked_add(rel.y)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(pub String);

/// An object of a (possibly neighbouring) location type: `rel` is the offset
/// of its coordinate, `id` its index within that coordinate's location type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelId {
    pub rel: Location,
    pub id: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDir {
    Input,
    Output,
    Inout,
}

impl PinDir {
    pub fn value(self) -> u32 {
        match self {
            Self::Input => 0,
            Self::Output => 1,
            Self::Inout => 2,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcClass {
    Standard,
    Fixed,
}

impl ArcClass {
    pub fn value(self) -> u8 {
        match self {
            Self::Standard => 0,
            Self::Fixed => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BelWire {
    pub wire: RelId,
    pub pin: String,
    pub dir: PinDir,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BelPort {
    pub bel: RelId,
    pub pin: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BelData {
    pub name: String,
    #[serde(rename = "type")]
    pub bel_type: String,
    pub z: i32,
    #[serde(default)]
    pub wires: Vec<BelWire>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireData {
    pub name: String,
    #[serde(default)]
    pub arcs_uphill: Vec<RelId>,
    #[serde(default)]
    pub arcs_downhill: Vec<RelId>,
    #[serde(default)]
    pub bel_pins: Vec<BelPort>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArcData {
    pub src_wire: RelId,
    pub sink_wire: RelId,
    pub cls: ArcClass,
    pub tiletype: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationType {
    pub checksum: Checksum,
    #[serde(default)]
    pub bels: Vec<BelData>,
    #[serde(default)]
    pub wires: Vec<WireData>,
    #[serde(default)]
    pub arcs: Vec<ArcData>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub tile_type: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    UL,
    UR,
    LL,
    LR,
}

impl Quadrant {
    pub fn value(self) -> u8 {
        match self {
            Self::UL => 0,
            Self::UR => 1,
            Self::LL => 2,
            Self::LR => 3,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapDirection {
    Left,
    Right,
}

impl TapDirection {
    pub fn value(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TapDriver {
    pub col: i32,
    pub dir: TapDirection,
}

/// Inclusive row/column ranges of one clock quadrant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuadrantRegion {
    pub quadrant: Quadrant,
    pub y0: i32,
    pub y1: i32,
    pub x0: i32,
    pub x1: i32,
}

impl QuadrantRegion {
    fn matches(&self, row: i32, col: i32) -> bool {
        row >= self.y0 && row <= self.y1 && col >= self.x0 && col <= self.x1
    }
}

/// Columns `lx0..=lx1` are driven leftwards and `rx0..=rx1` rightwards from
/// the TAP at `tap_col`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TapSegment {
    pub tap_col: i32,
    pub lx0: i32,
    pub lx1: i32,
    pub rx0: i32,
    pub rx1: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpineSegment {
    pub quadrant: Quadrant,
    pub tap_col: i32,
    pub spine_row: i32,
    pub spine_col: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalsData {
    #[serde(default)]
    pub quadrants: Vec<QuadrantRegion>,
    #[serde(default)]
    pub tap_segments: Vec<TapSegment>,
    #[serde(default)]
    pub spine_segments: Vec<SpineSegment>,
}

impl GlobalsData {
    pub fn quadrant(&self, row: i32, col: i32) -> Result<Quadrant> {
        self.quadrants.iter()
            .find(|q| q.matches(row, col))
            .map(|q| q.quadrant)
            .ok_or(Error::NoGlobalRegion { what: "quadrant", row, col })
    }

    pub fn tap_driver(&self, row: i32, col: i32) -> Result<TapDriver> {
        for seg in &self.tap_segments {
            if col >= seg.lx0 && col <= seg.lx1 {
                return Ok(TapDriver { col: seg.tap_col, dir: TapDirection::Left });
            }
            if col >= seg.rx0 && col <= seg.rx1 {
                return Ok(TapDriver { col: seg.tap_col, dir: TapDirection::Right });
            }
        }
        Err(Error::NoGlobalRegion { what: "tap", row, col })
    }

    pub fn spine_driver(&self, quadrant: Quadrant, col: i32) -> Result<(i32, i32)> {
        self.spine_segments.iter()
            .find(|s| s.quadrant == quadrant && s.tap_col == col)
            .map(|s| (s.spine_row, s.spine_col))
            .ok_or(Error::NoGlobalRegion { what: "spine", row: -1, col })
    }
}

/// One grid coordinate: the checksum of its location type and the tiles
/// that make it up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub location_type: Checksum,
    #[serde(default)]
    pub tiles: Vec<TileInfo>,
}

/// Read-only view of the architecture database the serializer walks.
pub trait ArchDatabase {
    fn max_row(&self) -> i32;
    fn max_col(&self) -> i32;

    /// Deduplicated location types in their canonical order.
    fn location_types(&self) -> &[LocationType];

    fn type_at(&self, loc: Location) -> Option<&Checksum>;

    fn tiles_at(&self, row: i32, col: i32) -> &[TileInfo];

    fn quadrant(&self, row: i32, col: i32) -> Result<Quadrant>;
    fn tap_driver(&self, row: i32, col: i32) -> Result<TapDriver>;
    /// Returns `(row, col)` of the spine driven by the TAP at `col`.
    fn spine_driver(&self, quadrant: Quadrant, col: i32) -> Result<(i32, i32)>;

    fn width(&self) -> i32 {
        self.max_col() + 1
    }

    fn height(&self) -> i32 {
        self.max_row() + 1
    }
}

/// Serialized form of a deduplicated chip database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChipDump {
    pub part: String,
    pub location_types: Vec<LocationType>,
    /// Row-major grid, `grid[row][col]`.
    pub grid: Vec<Vec<GridCell>>,
    #[serde(default)]
    pub globals: GlobalsData,
}

impl ChipDump {
    /// Rejects grids that are empty or not rectangular.
    pub fn validate(&self) -> Result<()> {
        let width = self.grid.first().map(|row| row.len()).unwrap_or(0);
        if width == 0 {
            return Err(Error::Chipdb(format!("{}: empty grid", self.part)));
        }
        if let Some(row) = self.grid.iter().position(|r| r.len() != width) {
            return Err(Error::Chipdb(format!(
                "{}: row {} has {} columns, expected {}",
                self.part, row, self.grid[row].len(), width
            )));
        }
        Ok(())
    }

    fn cell(&self, row: i32, col: i32) -> Option<&GridCell> {
        if row < 0 || col < 0 {
            return None;
        }
        self.grid.get(row as usize)?.get(col as usize)
    }
}

impl ArchDatabase for ChipDump {
    fn max_row(&self) -> i32 {
        self.grid.len() as i32 - 1
    }

    fn max_col(&self) -> i32 {
        self.grid.first().map(|r| r.len() as i32).unwrap_or(0) - 1
    }

    fn location_types(&self) -> &[LocationType] {
        &self.location_types
    }

    fn type_at(&self, loc: Location) -> Option<&Checksum> {
        self.cell(loc.y as i32, loc.x as i32).map(|c| &c.location_type)
    }

    fn tiles_at(&self, row: i32, col: i32) -> &[TileInfo] {
        self.cell(row, col).map(|c| c.tiles.as_slice()).unwrap_or(&[])
    }

    fn quadrant(&self, row: i32, col: i32) -> Result<Quadrant> {
        self.globals.quadrant(row, col)
    }

    fn tap_driver(&self, row: i32, col: i32) -> Result<TapDriver> {
        self.globals.tap_driver(row, col)
    }

    fn spine_driver(&self, quadrant: Quadrant, col: i32) -> Result<(i32, i32)> {
        self.globals.spine_driver(quadrant, col)
    }
}
