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

use crate::chipdb::{ArchDatabase, Quadrant, TapDirection};
use crate::error::Result;
#[allow(unused)]
use crate::log::*;

/// Clock distribution of one tile. `spine_row`/`spine_col` are -1 unless the
/// tile is a TAP driving a spine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlobalInfo {
    pub quad: Quadrant,
    pub tap_dir: TapDirection,
    pub tap_col: i16,
    pub spine_row: i16,
    pub spine_col: i16,
}

/// Dense per-tile table, row-major.
#[derive(Clone, Debug)]
pub struct GlobalInfoTable {
    width: usize,
    infos: Vec<GlobalInfo>,
}

impl GlobalInfoTable {
    pub fn compute<D>(db: &D) -> Result<Self> where D: ArchDatabase {
        let width = db.width().max(0) as usize;
        let mut infos = Vec::with_capacity(width * db.height().max(0) as usize);

        for row in 0 .. db.height() {
            for col in 0 .. db.width() {
                let quad = db.quadrant(row, col)?;
                let tapdrv = db.tap_driver(row, col)?;
                let (spine_row, spine_col) = if tapdrv.col == col {
                    db.spine_driver(quad, col)?
                } else {
                    (-1, -1)
                };

                infos.push(GlobalInfo {
                    quad,
                    tap_dir: tapdrv.dir,
                    tap_col: tapdrv.col as i16,
                    spine_row: spine_row as i16,
                    spine_col: spine_col as i16,
                });
            }
        }

        dbg_log!(DBG_INFO, "Computed global info for {} tiles", infos.len());

        Ok(Self { width, infos })
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&GlobalInfo> {
        if col >= self.width {
            return None;
        }
        self.infos.get(row * self.width + col)
    }

    /// All entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &GlobalInfo> {
        self.infos.iter()
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chipdb::fixtures::two_by_two;
    use crate::chipdb::TapSegment;
    use crate::error::Error;

    #[test]
    fn test_tap_columns_get_spines() {
        let dump = two_by_two();
        let table = GlobalInfoTable::compute(&dump).unwrap();
        assert_eq!(table.len(), 4);

        let left = table.get(1, 0).unwrap();
        assert_eq!(left.quad, Quadrant::UL);
        assert_eq!(left.tap_dir, TapDirection::Left);
        assert_eq!(left.tap_col, 1);
        assert_eq!((left.spine_row, left.spine_col), (-1, -1));

        let tap = table.get(1, 1).unwrap();
        assert_eq!(tap.tap_dir, TapDirection::Right);
        assert_eq!((tap.spine_row, tap.spine_col), (0, 1));

        assert!(table.get(0, 2).is_none());
        assert!(table.get(2, 0).is_none());
    }

    #[test]
    fn test_missing_spine_is_fatal() {
        let mut dump = two_by_two();
        dump.globals.spine_segments.clear();
        assert!(matches!(
            GlobalInfoTable::compute(&dump),
            Err(Error::NoGlobalRegion { what: "spine", .. })
        ));
    }

    #[test]
    fn test_missing_tap_is_fatal() {
        let mut dump = two_by_two();
        dump.globals.tap_segments = vec![TapSegment { tap_col: 0, lx0: 0, lx1: 0, rx0: 5, rx1: 5 }];
        dump.globals.spine_segments[0].tap_col = 0;
        assert!(matches!(
            GlobalInfoTable::compute(&dump),
            Err(Error::NoGlobalRegion { what: "tap", row: 0, col: 1 })
        ));
    }
}
