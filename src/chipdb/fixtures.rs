/* Small hand-made chip databases shared by the unit tests. */

use super::*;

pub fn rel(x: i16, y: i16, id: i32) -> RelId {
    RelId { rel: Location::new(x, y), id }
}

pub fn wire(name: &str) -> WireData {
    WireData {
        name: name.into(),
        arcs_uphill: Vec::new(),
        arcs_downhill: Vec::new(),
        bel_pins: Vec::new(),
    }
}

pub fn arc(src: RelId, sink: RelId, tiletype: &str) -> ArcData {
    ArcData { src_wire: src, sink_wire: sink, cls: ArcClass::Standard, tiletype: tiletype.into() }
}

/// A logic-like location type with one F0 -> A0 pip and one PIO bel.
pub fn plc_type(checksum: &str) -> LocationType {
    let mut f0 = wire("F0");
    f0.arcs_downhill.push(rel(0, 0, 0));
    let mut a0 = wire("A0");
    a0.arcs_uphill.push(rel(0, 0, 0));
    let mut paddo = wire("PADDO");
    paddo.bel_pins.push(BelPort { bel: rel(0, 0, 0), pin: "PADDO".into() });

    LocationType {
        checksum: Checksum(checksum.into()),
        bels: vec![BelData {
            name: "PIOA".into(),
            bel_type: "TRELLIS_IO".into(),
            z: 0,
            wires: vec![BelWire { wire: rel(0, 0, 2), pin: "PADDO".into(), dir: PinDir::Input }],
        }],
        wires: vec![f0, a0, paddo],
        arcs: vec![arc(rel(0, 0, 0), rel(0, 0, 1), "PLC2")],
    }
}

pub fn globals_2x2() -> GlobalsData {
    GlobalsData {
        quadrants: vec![QuadrantRegion { quadrant: Quadrant::UL, y0: 0, y1: 1, x0: 0, x1: 1 }],
        tap_segments: vec![TapSegment { tap_col: 1, lx0: 0, lx1: 0, rx0: 1, rx1: 1 }],
        spine_segments: vec![
            SpineSegment { quadrant: Quadrant::UL, tap_col: 1, spine_row: 0, spine_col: 1 },
        ],
    }
}

/// 2x2 grid where every coordinate shares one location type.
pub fn two_by_two() -> ChipDump {
    let grid = (0 .. 2)
        .map(|y| (0 .. 2)
            .map(|x| GridCell {
                location_type: Checksum("plc".into()),
                tiles: vec![TileInfo { name: format!("R{}C{}:PLC2", y, x), tile_type: "PLC2".into() }],
            })
            .collect())
        .collect();

    ChipDump {
        part: "TEST-2X2".into(),
        location_types: vec![plc_type("plc")],
        grid,
        globals: globals_2x2(),
    }
}
