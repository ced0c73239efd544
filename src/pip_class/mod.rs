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

/* Timing classes of pips, derived from the names of the wires they connect.
 *
 * A wire name is `<location>_<base>`, e.g. `R12C7_H06E0103`. The class is
 * decided by the first rule of `RULES` that applies to the pair of base
 * names; a pair no rule applies to is left without a class and uses the
 * default timing. */

use regex::Regex;

use crate::chipdb::ArcClass;
use crate::strings::StringTable;
#[allow(unused)]
use crate::log::*;

#[cfg(test)]
mod tests;

lazy_static! {
    static ref LC_INPUT_RE: Regex = Regex::new(r"^(J?[ABCDM]|CLK|LSR|CE)[0-9]$").unwrap();
    static ref LC_OUTPUT_RE: Regex = Regex::new(r"^J?[FQ][0-9]$").unwrap();
    static ref RC_RE: Regex = Regex::new(r"R([0-9]+)C([0-9]+)").unwrap();
}

pub const DEFAULT_CLASS: &str = "default";

/// Largest row and column of the device grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub max_row: i32,
    pub max_col: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WireName<'a> {
    pub loc: &'a str,
    pub base: &'a str,
}

impl<'a> WireName<'a> {
    pub fn split(name: &'a str) -> Option<Self> {
        let (loc, base) = name.split_once('_')?;
        Some(Self { loc, base })
    }
}

pub struct PipEnds<'a> {
    pub src: WireName<'a>,
    pub snk: WireName<'a>,
    pub grid: GridSize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Class(String),
    Unclassified,
}

/// A classification rule. `apply` returns `None` when the rule does not
/// apply and evaluation moves on to the next rule.
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&PipEnds) -> Option<Verdict>,
}

pub static RULES: &[Rule] = &[
    Rule { name: "denormalized", apply: rule_denormalized },
    Rule { name: "slice_internal", apply: rule_slice_internal },
    Rule { name: "ebr_internal", apply: rule_ebr_internal },
    Rule { name: "test", apply: rule_test },
    Rule { name: "dsp_internal", apply: rule_dsp_internal },
    Rule { name: "to_lc_input", apply: rule_to_lc_input },
    Rule { name: "to_span", apply: rule_to_span },
    Rule { name: "lsr_to_muxlsr", apply: rule_lsr_to_muxlsr },
];

/// Long wires not at their canonical (driving) end.
pub fn is_denorm(wire: &str) -> bool {
    if (wire.starts_with("H06") || wire.starts_with("V06")) && !wire.ends_with("03") {
        return true;
    }
    if (wire.starts_with("H02") || wire.starts_with("V02")) && !wire.ends_with("01") {
        return true;
    }
    false
}

/// `H06E0103` -> `span6he`
pub fn get_span(wire: &str) -> Option<String> {
    let b = wire.as_bytes();
    if b.len() < 4 || !(b[0] == b'H' || b[0] == b'V') {
        return None;
    }
    if !b[1].is_ascii_digit() || !b[2].is_ascii_digit() || !b[3].is_ascii_alphabetic() {
        return None;
    }
    Some(format!(
        "span{}{}{}",
        b[2] as char,
        b[0].to_ascii_lowercase() as char,
        b[3].to_ascii_lowercase() as char
    ))
}

/// (row, column) of a location token such as `R12C7`. Corner tiles are
/// recognized by their `TL`/`TR`/`BL`/`BR` prefix.
pub fn pos_from_name(name: &str, grid: GridSize) -> Option<(i32, i32)> {
    if let Some(caps) = RC_RE.captures(name) {
        let row = caps[1].parse().ok()?;
        let col = caps[2].parse().ok()?;
        return Some((row, col));
    }
    match name.get(.. 2)? {
        "TL" => Some((0, 0)),
        "TR" => Some((0, grid.max_col)),
        "BL" => Some((grid.max_row, 0)),
        "BR" => Some((grid.max_row, grid.max_col)),
        _ => None,
    }
}

/// `_n1e2`-style suffix describing where `b` sits relative to `a`.
pub fn format_rel(a: &str, b: &str, grid: GridSize) -> Option<String> {
    let (ra, ca) = pos_from_name(a, grid)?;
    let (rb, cb) = pos_from_name(b, grid)?;

    let mut rel = String::new();
    if rb < ra {
        rel += &format!("n{}", ra - rb);
    } else if rb > ra {
        rel += &format!("s{}", rb - ra);
    }
    if cb < ca {
        rel += &format!("w{}", ca - cb);
    } else if cb > ca {
        rel += &format!("e{}", cb - ca);
    }

    if rel.is_empty() {
        Some(rel)
    } else {
        Some(format!("_{}", rel))
    }
}

/* Base name without its trailing index digit, lowercased */
fn lc_pin(base: &str) -> String {
    let mut chars = base.chars();
    chars.next_back();
    chars.as_str().to_ascii_lowercase()
}

fn class(name: String) -> Option<Verdict> {
    Some(Verdict::Class(name))
}

fn either<F>(ends: &PipEnds, pred: F) -> bool where F: Fn(&str) -> bool {
    pred(ends.src.base) || pred(ends.snk.base)
}

fn rule_denormalized(ends: &PipEnds) -> Option<Verdict> {
    either(ends, is_denorm).then(|| Verdict::Unclassified)
}

fn rule_slice_internal(ends: &PipEnds) -> Option<Verdict> {
    let (src, snk) = (ends.src.base, ends.snk.base);
    if src.ends_with("_SLICE") || src.starts_with("MUX") || snk.ends_with("_SLICE") {
        return class("slice_internal".into());
    }
    None
}

fn rule_ebr_internal(ends: &PipEnds) -> Option<Verdict> {
    either(ends, |w| w.ends_with("_EBR")).then(|| Verdict::Class("ebr_internal".into()))
}

fn rule_test(ends: &PipEnds) -> Option<Verdict> {
    either(ends, |w| w.contains("TEST")).then(|| Verdict::Unclassified)
}

fn rule_dsp_internal(ends: &PipEnds) -> Option<Verdict> {
    either(ends, |w| w.contains("ALU") || w.contains("MULT") || w.contains("PRADD"))
        .then(|| Verdict::Class("dsp_internal".into()))
}

fn rule_to_lc_input(ends: &PipEnds) -> Option<Verdict> {
    let (src, snk) = (ends.src.base, ends.snk.base);
    if !LC_INPUT_RE.is_match(snk) {
        return None;
    }

    if LC_OUTPUT_RE.is_match(src) {
        return class(format!("{}_to_{}", lc_pin(src), lc_pin(snk)));
    }
    if let Some(span) = get_span(src) {
        return match format_rel(ends.src.loc, ends.snk.loc, ends.grid) {
            Some(rel) => class(format!("{}_to_{}{}", span, lc_pin(snk), rel)),
            None => Some(Verdict::Unclassified),
        };
    }
    if src.contains("HPBX") {
        return class(format!("global_to_{}", lc_pin(snk)));
    }
    Some(Verdict::Unclassified)
}

fn rule_to_span(ends: &PipEnds) -> Option<Verdict> {
    let (src, snk) = (ends.src.base, ends.snk.base);
    let snk_span = get_span(snk)?;
    let rel = || format_rel(ends.src.loc, ends.snk.loc, ends.grid);

    if LC_OUTPUT_RE.is_match(src) {
        return match rel() {
            Some(rel) => class(format!("{}_to_{}{}", lc_pin(src), snk_span, rel)),
            None => Some(Verdict::Unclassified),
        };
    }
    if let Some(src_span) = get_span(src) {
        return match rel() {
            Some(rel) => class(format!("{}_to_{}{}", src_span, snk_span, rel)),
            None => Some(Verdict::Unclassified),
        };
    }
    if src.contains("HPBX") {
        return class(format!("global_to_{}", snk_span));
    }
    if !src.contains("BOUNCE") {
        dbg_log!(DBG_EXTRA, "No pip class for span sink: {} -> {}", src, snk);
    }
    Some(Verdict::Unclassified)
}

fn rule_lsr_to_muxlsr(ends: &PipEnds) -> Option<Verdict> {
    (ends.src.base.starts_with("LSR") && ends.snk.base.starts_with("MUXLSR"))
        .then(|| Verdict::Class("lsr_to_muxlsr".into()))
}

/// Timing class name of the pip `source -> sink`, if it has one.
pub fn get_pip_class_name(source: &str, sink: &str, grid: GridSize) -> Option<String> {
    let ends = PipEnds {
        src: WireName::split(source)?,
        snk: WireName::split(sink)?,
        grid,
    };

    RULES.iter()
        .find_map(|rule| (rule.apply)(&ends))
        .and_then(|verdict| match verdict {
            Verdict::Class(name) => Some(name),
            Verdict::Unclassified => None,
        })
}

/// Pips touching the SERDES (DCU) or PCS are not timed.
pub fn reclassify_arc(cls: ArcClass, src_name: &str, snk_name: &str) -> ArcClass {
    let serdes = snk_name.contains("PCS") || snk_name.contains("DCU") || src_name.contains("DCU");
    match cls {
        ArcClass::Standard if serdes => ArcClass::Fixed,
        cls => cls,
    }
}

/// Pip timing class names and their indices. Index 0 is always the default
/// class.
#[derive(Debug, Clone)]
pub struct PipClassRegistry(StringTable);

impl Default for PipClassRegistry {
    fn default() -> Self {
        let mut table = StringTable::new(0);
        table.intern(DEFAULT_CLASS);
        Self(table)
    }
}

impl PipClassRegistry {
    pub fn register(&mut self, name: &str) -> usize {
        self.0.intern(name) as usize
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.0.get(name).map(|idx| idx as usize)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names<'s>(&'s self) -> impl Iterator<Item = &'s str> + 's {
        self.0.iter().map(|(_, name)| name)
    }

    /// Index of `class`, falling back to the default class for pips without
    /// a class or with a class no speed grade provides timing for.
    pub fn index_for(&self, class: Option<&str>) -> u32 {
        class.and_then(|name| self.get(name)).unwrap_or(0) as u32
    }

    /// Classifies the pip `source -> sink` and returns its class index.
    pub fn classify(&self, source: &str, sink: &str, grid: GridSize) -> u32 {
        let name = get_pip_class_name(source, sink, grid);
        self.index_for(name.as_deref())
    }
}
