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

#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod log;
pub mod error;
pub mod config;
pub mod strings;
pub mod bba;
pub mod chipdb;
pub mod pip_class;
pub mod globals;
pub mod timing;
pub mod iodb;
pub mod serializer;

pub use error::{Error, Result};
