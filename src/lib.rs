// Copyright (c) 2025 Spawn
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// https://www.eclipse.org/legal/epl-2.0/
// SPDX-License-Identifier: EPL-2.0

//! Патчер AndroidManifest.xml, который включает NFC host card emulation:
//! добавляет разрешение, фичу, сервис и генерирует `res/xml/aid_list.xml`.
//! Все патчи идемпотентны, поэтому запускать его можно на каждой сборке

#[macro_use]
pub mod logger;

pub mod error;
pub mod tree;
pub mod patcher;
pub mod resource;
pub mod parser;
pub mod frontend;

pub use error::{Error, Result};
pub use frontend::{prepare_project, with_nfc_hce, PatchOutcome, PatchReport};
pub use parser::HceConfig;
pub use patcher::{ensure_child, has_attr, Patched, StructureMissing};
pub use tree::{Document, Element};
