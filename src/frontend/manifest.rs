// Copyright (c) 2025 Spawn
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// https://www.eclipse.org/legal/epl-2.0/
// SPDX-License-Identifier: EPL-2.0

use std::fs;
use std::path::Path;

use colored::Colorize;

use crate::error::{Error, Result};
use crate::frontend::{with_nfc_hce, PatchReport};
use crate::parser::{self, HceConfig};
use crate::resource::write_replace;

/// Читает AndroidManifest.xml проекта, включает в нём HCE и записывает обратно.
/// Если после патча текст манифеста не изменился, то файл не перезаписывается.
/// Первый запуск на рукописном манифесте перепишет его даже без новых узлов,
/// это видно по `manifest_written`
pub fn prepare_project(project_root: &Path, config: &HceConfig) -> Result<PatchReport> {
    let manifest_path = project_root.join(&config.manifest_path);

    if !manifest_path.exists() {
        return Err(Error::ManifestNotFound(manifest_path));
    }

    let original = fs::read_to_string(&manifest_path)
        .map_err(|e| Error::io(&manifest_path, e))?;

    let mut document = parser::parse_manifest(&original)?;
    let mut report = with_nfc_hce(&mut document, project_root, config)?;

    let patched = document.to_xml()?;

    if patched == original {
        info!("{} AndroidManifest.xml is up-to-date", "CACHED:".green());
    } else {
        write_replace(&manifest_path, &patched)?;
        report.manifest_written = true;
        note!("AndroidManifest.xml updated {:?}", manifest_path);
    }

    Ok(report)
}
