// Copyright (c) 2025 Spawn
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// https://www.eclipse.org/legal/epl-2.0/
// SPDX-License-Identifier: EPL-2.0

use std::path::PathBuf;

use thiserror::Error;

/// Ошибки после которых продолжать нельзя. Отсутствие нужного узла в манифесте
/// сюда не входит, это `patcher::StructureMissing`, оно только предупреждение
#[derive(Debug, Error)]
pub enum Error {
    /// Не удалось создать папку, прочитать или записать файл
    #[error("I/O error {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Xml error: {0}")]
    Xml(String),

    /// Ошибка чтения, синтаксиса или структуры toml конфига
    #[error("Config error: {0}")]
    Config(String),

    #[error("AndroidManifest.xml not found {0:?}")]
    ManifestNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
