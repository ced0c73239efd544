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

/* Emits the chip database of one device as a .bba stream.
 *
 * Traversal order is fixed so that identical inputs give identical output:
 * location types in directory order, their pips/wires/bels in stored order,
 * grid coordinates row by row, packages by name, speed grades in
 * configuration order. */

use std::io::Write;

use crate::bba::{BbaWriter, NULL_REF};
use crate::chipdb::{ArchDatabase, Location, LocationType, LocTypeDirectory};
use crate::error::Result;
use crate::globals::GlobalInfoTable;
use crate::iodb::IoDb;
use crate::pip_class::{reclassify_arc, GridSize, PipClassRegistry};
use crate::strings::{ConstIds, TileTypeNames};
use crate::timing::SpeedGradeTiming;
#[allow(unused)]
use crate::log::*;


/// Name tables of one import run.
#[derive(Debug, Clone)]
pub struct ImportContext {
    pub constids: ConstIds,
    pub tiletypes: TileTypeNames,
    pub pip_classes: PipClassRegistry,
}

impl ImportContext {
    pub fn new(constids: ConstIds) -> Self {
        Self {
            constids,
            tiletypes: TileTypeNames::default(),
            pip_classes: PipClassRegistry::default(),
        }
    }
}

/// Everything the serializer reads. All of it must be fully computed before
/// serialization starts.
pub struct ChipInputs<'a, D> where D: ArchDatabase {
    pub device: &'a str,
    pub db: &'a D,
    pub directory: &'a LocTypeDirectory,
    pub globals: &'a GlobalInfoTable,
    pub iodb: &'a IoDb,
    pub timing: &'a [SpeedGradeTiming],
}

pub struct ChipSerializer<'a, 'w, D, W> where
    D: ArchDatabase,
    W: Write
{
    inputs: ChipInputs<'a, D>,
    ctx: &'a mut ImportContext,
    bba: &'w mut BbaWriter<W>,
    grid: GridSize,
}

fn loc_label(idx: usize, what: &str) -> String {
    format!("loc{}_{}", idx, what)
}

fn wire_label(idx: usize, wire: usize, what: &str) -> String {
    format!("loc{}_wire{}_{}", idx, wire, what)
}

fn bel_label(idx: usize, bel: usize) -> String {
    format!("loc{}_bel{}_wires", idx, bel)
}

impl<'a, 'w, D, W> ChipSerializer<'a, 'w, D, W> where
    D: ArchDatabase,
    W: Write
{
    pub fn new(
        inputs: ChipInputs<'a, D>,
        ctx: &'a mut ImportContext,
        bba: &'w mut BbaWriter<W>
    ) -> Self {
        let grid = GridSize { max_row: inputs.db.max_row(), max_col: inputs.db.max_col() };
        Self { inputs, ctx, bba, grid }
    }

    /// Writes the whole database: prologue, every table, the chip summary.
    pub fn write(mut self) -> Result<()> {
        let (device, db) = (self.inputs.device, self.inputs.db);

        self.bba.pre("#include \"nextpnr.h\"")?;
        self.bba.pre("NEXTPNR_NAMESPACE_BEGIN")?;
        self.bba.post("NEXTPNR_NAMESPACE_END")?;
        self.bba.push(&format!("chipdb_blob_{}", device))?;
        self.bba.reference("chip_info", "chip_info")?;

        dbg_log!(DBG_INFO, "Writing location types...");
        for (idx, lt) in db.location_types().iter().enumerate() {
            self.write_pips(idx, lt)?;
            self.write_wires(idx, lt)?;
            self.write_bels(idx, lt)?;
        }
        self.write_location_directory()?;

        dbg_log!(DBG_INFO, "Writing tile info...");
        self.write_tiles()?;
        self.write_location_types()?;

        dbg_log!(DBG_INFO, "Writing global info...");
        self.write_global_info()?;

        dbg_log!(DBG_INFO, "Writing package info...");
        self.write_packages()?;
        self.write_pios()?;
        self.write_tiletype_names()?;

        dbg_log!(DBG_INFO, "Writing speed grades...");
        self.write_speed_grades()?;

        dbg_log!(DBG_INFO, "Writing chip info...");
        self.write_chip_info()?;

        self.bba.pop()
    }

    fn write_loc(&mut self, loc: Location, sym_name: &str) -> Result<()> {
        self.bba.u16(loc.x as u16, &format!("{}.x", sym_name))?;
        self.bba.u16(loc.y as u16, &format!("{}.y", sym_name))
    }

    fn write_pips(&mut self, idx: usize, lt: &LocationType) -> Result<()> {
        if lt.arcs.is_empty() {
            return Ok(());
        }

        let (db, dir) = (self.inputs.db, self.inputs.directory);

        self.bba.label(&loc_label(idx, "pips"), Some("PipInfoPOD"))?;
        for arc in &lt.arcs {
            self.write_loc(arc.src_wire.rel, "src")?;
            self.write_loc(arc.sink_wire.rel, "dst")?;
            self.bba.u32(arc.src_wire.id as u32, "src_idx")?;
            self.bba.u32(arc.sink_wire.id as u32, "dst_idx")?;

            let src_name = dir.loctype_wire_name(db, idx, arc.src_wire)?;
            let snk_name = dir.loctype_wire_name(db, idx, arc.sink_wire)?;
            let class = self.ctx.pip_classes.classify(&src_name, &snk_name, self.grid);
            self.bba.u32(class, "timing_class")?;

            let tile_type = self.ctx.tiletypes.index_of(&arc.tiletype);
            self.bba.u16(tile_type, "tile_type")?;

            let cls = reclassify_arc(arc.cls, &src_name, &snk_name);
            self.bba.u8(cls.value(), "pip_type")?;
            self.bba.u8(0, "padding")?;
        }

        Ok(())
    }

    fn write_wires(&mut self, idx: usize, lt: &LocationType) -> Result<()> {
        if lt.wires.is_empty() {
            return Ok(());
        }

        for (wire_idx, wire) in lt.wires.iter().enumerate() {
            if !wire.arcs_downhill.is_empty() {
                self.bba.label(&wire_label(idx, wire_idx, "downpips"), Some("PipLocatorPOD"))?;
                for dp in &wire.arcs_downhill {
                    self.write_loc(dp.rel, "rel_loc")?;
                    self.bba.u32(dp.id as u32, "index")?;
                }
            }

            if !wire.arcs_uphill.is_empty() {
                self.bba.label(&wire_label(idx, wire_idx, "uppips"), Some("PipLocatorPOD"))?;
                for up in &wire.arcs_uphill {
                    self.write_loc(up.rel, "rel_loc")?;
                    self.bba.u32(up.id as u32, "index")?;
                }
            }

            if !wire.bel_pins.is_empty() {
                self.bba.label(&wire_label(idx, wire_idx, "belpins"), Some("BelPortPOD"))?;
                for bp in &wire.bel_pins {
                    self.write_loc(bp.bel.rel, "rel_bel_loc")?;
                    self.bba.u32(bp.bel.id as u32, "bel_index")?;
                    self.bba.u32(self.ctx.constids.get_or_null(&bp.pin), "port")?;
                }
            }
        }

        self.bba.label(&loc_label(idx, "wires"), Some("WireInfoPOD"))?;
        for (wire_idx, wire) in lt.wires.iter().enumerate() {
            self.bba.string(&wire.name, "name")?;
            self.bba.u32(wire.arcs_uphill.len() as u32, "num_uphill")?;
            self.bba.u32(wire.arcs_downhill.len() as u32, "num_downhill")?;
            self.bba.reference_if(
                wire.arcs_uphill.len(),
                &wire_label(idx, wire_idx, "uppips"),
                "pips_uphill"
            )?;
            self.bba.reference_if(
                wire.arcs_downhill.len(),
                &wire_label(idx, wire_idx, "downpips"),
                "pips_downhill"
            )?;
            self.bba.u32(wire.bel_pins.len() as u32, "num_bel_pins")?;
            self.bba.reference_if(
                wire.bel_pins.len(),
                &wire_label(idx, wire_idx, "belpins"),
                "bel_pins"
            )?;
        }

        Ok(())
    }

    fn write_bels(&mut self, idx: usize, lt: &LocationType) -> Result<()> {
        if lt.bels.is_empty() {
            return Ok(());
        }

        for (bel_idx, bel) in lt.bels.iter().enumerate() {
            if bel.wires.is_empty() {
                continue;
            }
            self.bba.label(&bel_label(idx, bel_idx), Some("BelWirePOD"))?;
            for pin in &bel.wires {
                self.write_loc(pin.wire.rel, "rel_wire_loc")?;
                self.bba.u32(pin.wire.id as u32, "wire_index")?;
                self.bba.u32(self.ctx.constids.get_or_null(&pin.pin), "port")?;
                self.bba.u32(pin.dir.value(), "dir")?;
            }
        }

        self.bba.label(&loc_label(idx, "bels"), Some("BelInfoPOD"))?;
        for (bel_idx, bel) in lt.bels.iter().enumerate() {
            self.bba.string(&bel.name, "name")?;
            self.bba.u32(self.ctx.constids.get_or_null(&bel.bel_type), "type")?;
            self.bba.u32(bel.z as u32, "z")?;
            self.bba.u32(bel.wires.len() as u32, "num_bel_wires")?;
            self.bba.reference_if(bel.wires.len(), &bel_label(idx, bel_idx), "bel_wires")?;
        }

        Ok(())
    }

    fn write_location_directory(&mut self) -> Result<()> {
        let db = self.inputs.db;

        self.bba.label("locations", Some("LocationTypePOD"))?;
        for (idx, lt) in db.location_types().iter().enumerate() {
            self.bba.u32(lt.bels.len() as u32, "num_bels")?;
            self.bba.u32(lt.wires.len() as u32, "num_wires")?;
            self.bba.u32(lt.arcs.len() as u32, "num_pips")?;
            self.bba.reference_if(lt.bels.len(), &loc_label(idx, "bels"), "bel_data")?;
            self.bba.reference_if(lt.wires.len(), &loc_label(idx, "wires"), "wire_data")?;
            self.bba.reference_if(lt.arcs.len(), &loc_label(idx, "pips"), "pips_data")?;
        }
        Ok(())
    }

    fn write_tiles(&mut self) -> Result<()> {
        let db = self.inputs.db;

        for y in 0 .. db.height() {
            for x in 0 .. db.width() {
                let tiles = db.tiles_at(y, x);
                if tiles.is_empty() {
                    continue;
                }
                self.bba.label(&format!("tile_info_{}_{}", x, y), Some("TileNamePOD"))?;
                for tile in tiles {
                    self.bba.string(&tile.name, "name")?;
                    let type_idx = self.ctx.tiletypes.index_of(&tile.tile_type);
                    self.bba.u16(type_idx, "type_idx")?;
                    self.bba.u16(0, "padding")?;
                }
            }
        }

        self.bba.label("tiles_info", Some("TileInfoPOD"))?;
        for y in 0 .. db.height() {
            for x in 0 .. db.width() {
                let num_tiles = db.tiles_at(y, x).len();
                self.bba.u32(num_tiles as u32, "num_tiles")?;
                self.bba.reference_if(num_tiles, &format!("tile_info_{}_{}", x, y), "tile_names")?;
            }
        }

        Ok(())
    }

    fn write_location_types(&mut self) -> Result<()> {
        self.bba.label("location_types", Some("int32_t"))?;
        for idx in self.inputs.directory.per_coord() {
            self.bba.u32(*idx as u32, "loctype")?;
        }
        Ok(())
    }

    fn write_global_info(&mut self) -> Result<()> {
        self.bba.label("location_glbinfo", Some("GlobalInfoPOD"))?;
        for gi in self.inputs.globals.iter() {
            self.bba.u16(gi.tap_col as u16, "tap_col")?;
            self.bba.u8(gi.tap_dir.value(), "tap_dir")?;
            self.bba.u8(gi.quad.value(), "quad")?;
            self.bba.u16(gi.spine_row as u16, "spine_row")?;
            self.bba.u16(gi.spine_col as u16, "spine_col")?;
        }
        Ok(())
    }

    fn write_packages(&mut self) -> Result<()> {
        let iodb = self.inputs.iodb;
        let packages = &iodb.packages;

        for (package, pins) in packages {
            if pins.is_empty() {
                continue;
            }
            self.bba.label(&format!("package_data_{}", package), Some("PackagePinPOD"))?;
            for pin in pins {
                self.bba.string(&pin.name, "name")?;
                self.write_loc(pin.location, "abs_loc")?;
                self.bba.u32(pin.bel_index, "bel_index")?;
            }
        }

        self.bba.label("package_data", Some("PackageInfoPOD"))?;
        for (package, pins) in packages {
            self.bba.string(package, "name")?;
            self.bba.u32(pins.len() as u32, "num_pins")?;
            self.bba.reference_if(pins.len(), &format!("package_data_{}", package), "pin_data")?;
        }

        Ok(())
    }

    fn write_pios(&mut self) -> Result<()> {
        let iodb = self.inputs.iodb;

        self.bba.label("pio_info", Some("PIOInfoPOD"))?;
        for pio in &iodb.pios {
            self.write_loc(pio.location, "abs_loc")?;
            self.bba.u32(pio.bel_index, "bel_index")?;
            match &pio.function {
                Some(function) => self.bba.string(function, "function_name")?,
                None => self.bba.reference(NULL_REF, "function_name")?,
            }
            self.bba.u16(pio.bank, "bank")?;
            self.bba.u16(0, "padding")?;
        }
        Ok(())
    }

    fn write_tiletype_names(&mut self) -> Result<()> {
        self.bba.label("tiletype_names", Some("RelPtr<char>"))?;
        for (_, name) in self.ctx.tiletypes.table().iter() {
            self.bba.string(name, "name")?;
        }
        Ok(())
    }

    fn write_speed_grades(&mut self) -> Result<()> {
        for timing in self.inputs.timing {
            let grade = &timing.grade;

            for (cell_idx, cell) in timing.cells.iter().enumerate() {
                if !cell.delays.is_empty() {
                    self.bba.label(&format!("cell_{}_delays_{}", cell_idx, grade), None)?;
                    for delay in &cell.delays {
                        self.bba.u32(delay.from_pin, "from_pin")?;
                        self.bba.u32(delay.to_pin, "to_pin")?;
                        self.bba.u32(delay.min_delay as u32, "min_delay")?;
                        self.bba.u32(delay.max_delay as u32, "max_delay")?;
                    }
                }

                if !cell.setupholds.is_empty() {
                    self.bba.label(&format!("cell_{}_setupholds_{}", cell_idx, grade), None)?;
                    for sh in &cell.setupholds {
                        self.bba.u32(sh.pin, "sig_port")?;
                        self.bba.u32(sh.clock, "clock_port")?;
                        self.bba.u32(sh.min_setup as u32, "min_setup")?;
                        self.bba.u32(sh.max_setup as u32, "max_setup")?;
                        self.bba.u32(sh.min_hold as u32, "min_hold")?;
                        self.bba.u32(sh.max_hold as u32, "max_hold")?;
                    }
                }
            }

            self.bba.label(&format!("cell_timing_data_{}", grade), None)?;
            for (cell_idx, cell) in timing.cells.iter().enumerate() {
                self.bba.u32(cell.celltype, "cell_type")?;
                self.bba.u32(cell.delays.len() as u32, "num_delays")?;
                self.bba.u32(cell.setupholds.len() as u32, "num_setup_hold")?;
                self.bba.reference_if(
                    cell.delays.len(),
                    &format!("cell_{}_delays_{}", cell_idx, grade),
                    "delays"
                )?;
                self.bba.reference_if(
                    cell.setupholds.len(),
                    &format!("cell_{}_setupholds_{}", cell_idx, grade),
                    "setupholds"
                )?;
            }

            self.bba.label(&format!("pip_timing_data_{}", grade), None)?;
            for pc in &timing.pip_classes {
                self.bba.u32(pc.min_delay as u32, "min_delay")?;
                self.bba.u32(pc.max_delay as u32, "max_delay")?;
                self.bba.u32(pc.min_fanout as u32, "min_fanout")?;
                self.bba.u32(pc.max_fanout as u32, "max_fanout")?;
            }
        }

        self.bba.label("speed_grade_data", None)?;
        for timing in self.inputs.timing {
            let grade = &timing.grade;
            self.bba.u32(timing.cells.len() as u32, "num_cell_timings")?;
            self.bba.u32(timing.pip_classes.len() as u32, "num_pip_classes")?;
            self.bba.reference_if(
                timing.cells.len(),
                &format!("cell_timing_data_{}", grade),
                "cell_timings"
            )?;
            self.bba.reference_if(
                timing.pip_classes.len(),
                &format!("pip_timing_data_{}", grade),
                "pip_classes"
            )?;
        }

        Ok(())
    }

    fn write_chip_info(&mut self) -> Result<()> {
        let db = self.inputs.db;
        let (width, height) = (db.width() as u32, db.height() as u32);
        let num_packages = self.inputs.iodb.packages.len();
        let num_pios = self.inputs.iodb.pios.len();

        self.bba.label("chip_info", None)?;
        self.bba.u32(width, "width")?;
        self.bba.u32(height, "height")?;
        self.bba.u32(width * height, "num_tiles")?;
        self.bba.u32(self.inputs.directory.len() as u32, "num_location_types")?;
        self.bba.u32(num_packages as u32, "num_packages")?;
        self.bba.u32(num_pios as u32, "num_pios")?;

        self.bba.reference("locations", "locations")?;
        self.bba.reference("location_types", "location_type")?;
        self.bba.reference("location_glbinfo", "location_glbinfo")?;
        self.bba.reference("tiletype_names", "tiletype_names")?;
        self.bba.reference_if(num_packages, "package_data", "package_info")?;
        self.bba.reference_if(num_pios, "pio_info", "pio_info")?;
        self.bba.reference("tiles_info", "tile_info")?;
        self.bba.reference("speed_grade_data", "speed_grades")
    }
}
