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

use std::path::Path;
use std::fs::File;
use std::io::BufReader;
use memmap2::Mmap;
use flate2::read::GzDecoder;

use super::ChipDump;
use crate::error::{Error, Result};
#[allow(unused)]
use crate::log::*;

pub struct OpenOpts {
    pub raw: bool,
}

impl Default for OpenOpts {
    fn default() -> Self {
        Self {
            raw: false
        }
    }
}

pub fn open<P>(path: P, opts: OpenOpts) -> Result<ChipDump> where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let dump_file = File::open(path).map_err(|e| Error::io(path, e))?;

    /* RAW mode memory-maps the file and parses it in place, which is much
     * faster to load for debug builds.
     *
     * IMPORTANT: In order to use RAW mode, you must decompress the chip
     * database dump using gzip.
     */
    let dump: ChipDump = if opts.raw {
        /* UNSAFE DUE TO A POTENTIAL UB WHEN A FILE IS CHANGED! */
        let mmapped = unsafe { Mmap::map(&dump_file) }
            .map_err(|e| Error::io(path, e))?;
        serde_json::from_slice(&mmapped).map_err(|e| Error::json(path, e))?
    } else {
        let d = BufReader::new(GzDecoder::new(dump_file));
        serde_json::from_reader(d).map_err(|e| Error::json(path, e))?
    };

    dump.validate()?;
    dbg_log!(
        DBG_INFO,
        "Loaded chip database for {}: {} location types",
        dump.part, dump.location_types.len()
    );

    Ok(dump)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use crate::chipdb::fixtures::two_by_two;

    #[test]
    fn test_open_gzip_and_raw() {
        let dump = two_by_two();
        let json = serde_json::to_vec(&dump).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let gz_path = dir.path().join("chipdb.json.gz");
        let mut enc = GzEncoder::new(File::create(&gz_path).unwrap(), Compression::default());
        enc.write_all(&json).unwrap();
        enc.finish().unwrap();
        assert_eq!(open(&gz_path, OpenOpts::default()).unwrap(), dump);

        let raw_path = dir.path().join("chipdb.json");
        std::fs::write(&raw_path, &json).unwrap();
        assert_eq!(open(&raw_path, OpenOpts { raw: true }).unwrap(), dump);
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            open("/nonexistent/chipdb.json.gz", OpenOpts::default()),
            Err(Error::Io { .. })
        ));
    }
}
