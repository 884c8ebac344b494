// Copyright (c) 2025 Spawn
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// https://www.eclipse.org/legal/epl-2.0/
// SPDX-License-Identifier: EPL-2.0

pub mod hce;
pub mod manifest;

pub use manifest::prepare_project;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::parser::HceConfig;
use crate::patcher::{Patched, StructureMissing};
use crate::resource;
use crate::tree::Document;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Inserted,
    AlreadyPresent,
    Skipped(StructureMissing),
}

impl From<std::result::Result<Patched, StructureMissing>> for PatchOutcome {
    fn from(result: std::result::Result<Patched, StructureMissing>) -> Self {
        match result {
            Ok(Patched::Inserted) => PatchOutcome::Inserted,
            Ok(Patched::AlreadyPresent) => PatchOutcome::AlreadyPresent,
            Err(missing) => PatchOutcome::Skipped(missing),
        }
    }
}

/// Итог одного запуска: что стало с каждым из трёх узлов и куда записан
/// список AID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub permission: PatchOutcome,
    pub feature: PatchOutcome,
    pub service: PatchOutcome,
    pub resource_file: PathBuf,

    // Был ли перезаписан файл манифеста. Выставляет только `prepare_project`:
    // файл может переписаться и без новых узлов, если его форматирование
    // отличалось от нашего
    pub manifest_written: bool,
}

impl PatchReport {
    /// Добавлен ли в дерево хотя бы один узел
    pub fn changed(&self) -> bool {
        self.outcomes().any(|o| *o == PatchOutcome::Inserted)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &StructureMissing> {
        self.outcomes().filter_map(|o| match o {
            PatchOutcome::Skipped(missing) => Some(missing),
            _ => None,
        })
    }

    fn outcomes(&self) -> impl Iterator<Item = &PatchOutcome> {
        [&self.permission, &self.feature, &self.service].into_iter()
    }
}

/// Включает NFC HCE в проекте. Документ патчится на месте: разрешение NFC,
/// фича hce и сервис. Если какого-то родителя нет, то патч пропускается с
/// предупреждением, а остальные всё равно применяются. Потом в
/// `project_root/res_dir/xml` пишется список AID. Ошибкой считается
/// невалидное имя файла ресурса (тогда документ не трогается) и
/// невозможность записать этот файл
pub fn with_nfc_hce(document: &mut Document, project_root: &Path, config: &HceConfig) -> Result<PatchReport> {
    let resource_ref = config.resource_ref()?;

    task!("Enable NFC host card emulation in <{}>", document.name);

    let permission = report("uses-permission", hce::ensure_nfc_permission(&mut document.root));
    let feature = report("uses-feature", hce::ensure_hce_feature(&mut document.root));
    let service = report(
        "service",
        hce::ensure_hce_service(&mut document.root, &config.service_name, &resource_ref),
    );

    task!("Write {} ({} AID)", config.resource_file, config.app_ids.len());

    let resource_file = resource::emit(
        &project_root.join(config.resource_dir()),
        &config.resource_file,
        &config.app_ids,
        &config.aid_group,
    )?;

    Ok(PatchReport {
        permission,
        feature,
        service,
        resource_file,
        manifest_written: false,
    })
}

fn report(tag: &str, result: std::result::Result<Patched, StructureMissing>) -> PatchOutcome {
    match &result {
        Ok(Patched::Inserted) => info!(" Added <{}>", tag),
        Ok(Patched::AlreadyPresent) => info!(" <{}> already present", tag),
        Err(missing) => warn!("<{}>: {}", tag, missing),
    }

    result.into()
}
