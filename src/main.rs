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

use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[macro_use]
extern crate ecp5_bba;

use ecp5_bba::bba::BbaWriter;
use ecp5_bba::chipdb::{self, LocTypeDirectory, OpenOpts};
use ecp5_bba::config::ImportConfig;
use ecp5_bba::error::{Error, Result};
use ecp5_bba::globals::GlobalInfoTable;
use ecp5_bba::iodb::IoDb;
use ecp5_bba::serializer::{ChipInputs, ChipSerializer, ImportContext};
use ecp5_bba::strings::ConstIds;
use ecp5_bba::timing;
#[allow(unused)]
use ecp5_bba::log::*;

#[derive(Parser, Debug)]
#[clap(
    author = "Antmicro",
    version = "0.1.0",
    about = "ECP5 chip database exporter for nextpnr's bbasm",
    long_about = None
)]
struct Args {
    #[clap(help = "Device name (25k, 45k, 85k)")]
    device: String,
    #[clap(short = 'p', long, help = "Path to the constids include file")]
    constids: PathBuf,
    #[clap(
        long,
        default_value = "../../trellis/database",
        help = "Trellis database root"
    )]
    database: PathBuf,
    #[clap(
        long,
        help = "Chip database dump (defaults to <database>/ECP5/<part>/chipdb.json.gz)"
    )]
    chipdb: Option<PathBuf>,
    #[clap(long, help = "Use raw (uncompressed) chip database dump")]
    raw: bool,
    #[clap(long, help = "YAML file overriding devices, speed grades and port renames")]
    config: Option<PathBuf>,
    #[clap(
        short = 'o',
        long,
        help = "BBA output file (defaults to ../chipdbs/chipdb-<device>.bba)"
    )]
    output: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let constids = ConstIds::load(&args.constids)?;

    let config = match &args.config {
        Some(path) => ImportConfig::from_yaml_file(path)?,
        None => ImportConfig::default(),
    };
    let part = config.part_name(&args.device)?;

    let chipdb_path = args.chipdb.clone().unwrap_or_else(|| {
        args.database.join("ECP5").join(part).join("chipdb.json.gz")
    });
    dbg_log!(DBG_INFO, "Loading chip database {:?}...", chipdb_path);
    let db = chipdb::loader::open(&chipdb_path, OpenOpts { raw: args.raw })?;
    let directory = LocTypeDirectory::build(&db)?;

    let mut ctx = ImportContext::new(constids);

    dbg_log!(DBG_INFO, "Processing timing data...");
    let timing = timing::load_speed_grades(
        &args.database,
        &config,
        &ctx.constids,
        &mut ctx.pip_classes
    )?;

    let iodb = IoDb::load(&args.database, part, &db, &directory)?;
    let globals = GlobalInfoTable::compute(&db)?;

    let output = args.output.clone().unwrap_or_else(|| {
        Path::new("../chipdbs").join(format!("chipdb-{}.bba", args.device))
    });
    let file = File::create(&output).map_err(|e| Error::io(&output, e))?;
    let mut bba = BbaWriter::new(BufWriter::new(file));

    let inputs = ChipInputs {
        device: &args.device,
        db: &db,
        directory: &directory,
        globals: &globals,
        iodb: &iodb,
        timing: &timing,
    };
    ChipSerializer::new(inputs, &mut ctx, &mut bba).write()?;
    bba.finish()?;

    dbg_log!(DBG_INFO, "Wrote {:?}", output);

    Ok(())
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        },
        Err(e) => e.exit(),
    };

    if let Err(e) = run(args) {
        dbg_log!(DBG_CRITICAL, "{}", e);
        std::process::exit(1);
    }
}
