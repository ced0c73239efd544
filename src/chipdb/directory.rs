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

use super::*;
#[allow(unused)]
use crate::log::*;

/// Dense index of the deduplicated location types, and the index used at
/// every grid coordinate.
#[derive(Debug, Clone)]
pub struct LocTypeDirectory {
    width: i32,
    height: i32,
    /* Row-major, one entry per coordinate */
    per_coord: Vec<usize>,
    /* Last coordinate (row-major) instantiating each type */
    representative: Vec<Option<Location>>,
}

impl LocTypeDirectory {
    pub fn build<D>(db: &D) -> Result<Self> where D: ArchDatabase {
        let mut index: HashMap<&Checksum, usize> = HashMap::new();
        for (idx, lt) in db.location_types().iter().enumerate() {
            if index.insert(&lt.checksum, idx).is_some() {
                return Err(Error::Chipdb(format!("duplicate location type checksum {}", lt.checksum.0)));
            }
        }

        let (width, height) = (db.width(), db.height());
        let mut per_coord = Vec::with_capacity((width * height).max(0) as usize);
        let mut representative = vec![None; db.location_types().len()];

        for y in 0 .. height {
            for x in 0 .. width {
                let loc = Location::new(x as i16, y as i16);
                let idx = db.type_at(loc)
                    .and_then(|checksum| index.get(checksum))
                    .copied()
                    .ok_or(Error::UnknownLocationType { x, y })?;
                per_coord.push(idx);
                representative[idx] = Some(loc);
            }
        }

        dbg_log!(
            DBG_INFO,
            "{} location types over {}x{} grid",
            representative.len(), width, height
        );

        Ok(Self { width, height, per_coord, representative })
    }

    pub fn len(&self) -> usize {
        self.representative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.representative.is_empty()
    }

    /// Location-type indices in row-major coordinate order.
    pub fn per_coord(&self) -> &[usize] {
        &self.per_coord
    }

    pub fn index_at(&self, loc: Location) -> Option<usize> {
        let (x, y) = (loc.x as i32, loc.y as i32);
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.per_coord.get((y * self.width + x) as usize).copied()
    }

    pub fn representative(&self, idx: usize) -> Option<Location> {
        self.representative.get(idx).copied().flatten()
    }

    pub fn location_type_at<'d, D>(&self, db: &'d D, loc: Location) -> Option<&'d LocationType>
    where
        D: ArchDatabase
    {
        self.index_at(loc).and_then(|idx| db.location_types().get(idx))
    }

    /// Absolute name `R<row>C<col>_<wire>` of the wire `wire` seen from a
    /// location type instantiated at `base`.
    pub fn wire_name<D>(&self, db: &D, base: Location, wire: RelId) -> Result<String>
    where
        D: ArchDatabase
    {
        let abs = base.checked_offset(wire.rel).ok_or(Error::UnresolvedWire {
            x: base.x as i32 + wire.rel.x as i32,
            y: base.y as i32 + wire.rel.y as i32,
            idx: wire.id,
        })?;
        let unresolved = || Error::UnresolvedWire { x: abs.x as i32, y: abs.y as i32, idx: wire.id };

        let lt = self.location_type_at(db, abs).ok_or_else(unresolved)?;
        let data = usize::try_from(wire.id).ok()
            .and_then(|idx| lt.wires.get(idx))
            .ok_or_else(unresolved)?;

        Ok(format!("R{}C{}_{}", abs.y, abs.x, data.name))
    }

    /// Wire name as seen from the representative coordinate of location type
    /// `loctype`.
    pub fn loctype_wire_name<D>(&self, db: &D, loctype: usize, wire: RelId) -> Result<String>
    where
        D: ArchDatabase
    {
        let base = self.representative(loctype)
            .ok_or_else(|| Error::Chipdb(format!("location type {} is not used on the grid", loctype)))?;
        self.wire_name(db, base, wire)
    }

    /// Index of the bel called `name` in the location type at `loc`.
    pub fn bel_index<D>(&self, db: &D, loc: Location, name: &str) -> Option<usize>
    where
        D: ArchDatabase
    {
        self.location_type_at(db, loc)?
            .bels.iter()
            .position(|bel| bel.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chipdb::fixtures::*;

    #[test]
    fn test_directory_completeness() {
        let mut dump = two_by_two();
        dump.location_types.push(plc_type("cib"));
        dump.grid[1][0].location_type = Checksum("cib".into());

        let dir = LocTypeDirectory::build(&dump).unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.per_coord(), &[0, 0, 1, 0]);
        assert!(dir.per_coord().iter().all(|idx| *idx < dir.len()));
        assert_eq!(dir.representative(0), Some(Location::new(1, 1)));
        assert_eq!(dir.representative(1), Some(Location::new(0, 1)));
    }

    #[test]
    fn test_unknown_checksum_is_fatal() {
        let mut dump = two_by_two();
        dump.grid[0][1].location_type = Checksum("missing".into());
        assert!(matches!(
            LocTypeDirectory::build(&dump),
            Err(Error::UnknownLocationType { x: 1, y: 0 })
        ));
    }

    #[test]
    fn test_duplicate_checksum_rejected() {
        let mut dump = two_by_two();
        dump.location_types.push(plc_type("plc"));
        assert!(matches!(LocTypeDirectory::build(&dump), Err(Error::Chipdb(_))));
    }

    #[test]
    fn test_wire_name_resolution() {
        let dump = two_by_two();
        let dir = LocTypeDirectory::build(&dump).unwrap();

        assert_eq!(dir.wire_name(&dump, Location::new(1, 0), rel(0, 0, 1)).unwrap(), "R0C1_A0");
        assert_eq!(dir.wire_name(&dump, Location::new(1, 1), rel(-1, -1, 0)).unwrap(), "R0C0_F0");
        assert!(matches!(
            dir.wire_name(&dump, Location::new(1, 1), rel(1, 0, 0)),
            Err(Error::UnresolvedWire { x: 2, y: 1, idx: 0 })
        ));
        assert!(dir.wire_name(&dump, Location::new(0, 0), rel(0, 0, 9)).is_err());
        assert!(matches!(
            dir.wire_name(&dump, Location::new(1, 1), rel(i16::MAX, 0, 0)),
            Err(Error::UnresolvedWire { x: 32768, y: 1, idx: 0 })
        ));
        assert!(matches!(
            dir.wire_name(&dump, Location::new(0, 0), rel(0, i16::MIN, 0)),
            Err(Error::UnresolvedWire { x: 0, y: -32768, idx: 0 })
        ));
        assert_eq!(dir.loctype_wire_name(&dump, 0, rel(0, 0, 2)).unwrap(), "R1C1_PADDO");
    }

    #[test]
    fn test_bel_index() {
        let dump = two_by_two();
        let dir = LocTypeDirectory::build(&dump).unwrap();
        assert_eq!(dir.bel_index(&dump, Location::new(0, 1), "PIOA"), Some(0));
        assert_eq!(dir.bel_index(&dump, Location::new(0, 1), "PIOB"), None);
        assert_eq!(dir.bel_index(&dump, Location::new(5, 1), "PIOA"), None);
    }
}
