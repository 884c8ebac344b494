// Copyright (c) 2025 Spawn
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// https://www.eclipse.org/legal/epl-2.0/
// SPDX-License-Identifier: EPL-2.0

pub mod toml_parser;
pub mod manifest_parser;

pub use toml_parser::{AidGroup, HceConfig, SAMPLE_AIDS};
pub use manifest_parser::parse_manifest;

use std::path::Path;

use crate::error::Result;

pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<HceConfig> {
    toml_parser::load_configs(paths)
}
