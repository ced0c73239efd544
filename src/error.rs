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

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write chip database: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to parse JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse YAML in {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to open constids file {0:?}")]
    ConstIds(PathBuf),

    #[error("unknown device '{0}'")]
    UnknownDevice(String),

    #[error("invalid cell data type '{kind}' for cell {cell} (speed grade {grade})")]
    UnknownTimingEntry {
        grade: String,
        cell: String,
        kind: String,
    },

    #[error("malformed timing entry for cell {cell} (speed grade {grade}): {reason}")]
    MalformedTimingEntry {
        grade: String,
        cell: String,
        reason: String,
    },

    #[error("inconsistent chip database: {0}")]
    Chipdb(String),

    #[error("no location type found for checksum at R{y}C{x}")]
    UnknownLocationType { x: i32, y: i32 },

    #[error("cannot resolve wire {idx} at R{y}C{x}")]
    UnresolvedWire { x: i32, y: i32, idx: i32 },

    #[error("no {what} region covers R{row}C{col}")]
    NoGlobalRegion { what: &'static str, row: i32, col: i32 },

    #[error("assembler misuse: {0}")]
    Bba(String),
}

impl Error {
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn json<P: Into<PathBuf>>(path: P, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(), source }
    }
}
