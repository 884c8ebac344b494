// Copyright (c) 2025 Spawn
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// https://www.eclipse.org/legal/epl-2.0/
// SPDX-License-Identifier: EPL-2.0

use crate::patcher::{ensure_child, has_attr, Patched, StructureMissing};
use crate::tree::Element;

pub const ANDROID_NAME: &str = "android:name";

pub const NFC_PERMISSION: &str = "android.permission.NFC";
pub const HCE_FEATURE: &str = "android.hardware.nfc.hce";
pub const BIND_NFC_SERVICE: &str = "android.permission.BIND_NFC_SERVICE";
pub const HOST_APDU_ACTION: &str = "android.nfc.cardemulation.action.HOST_APDU_SERVICE";
pub const DEFAULT_CATEGORY: &str = "android.intent.category.DEFAULT";
pub const HOST_APDU_META: &str = "android.nfc.cardemulation.host_apdu_service";

/// `<uses-permission android:name="android.permission.NFC" />` в корне манифеста
pub fn ensure_nfc_permission(manifest: &mut Element) -> Result<Patched, StructureMissing> {
    ensure_child(
        manifest,
        &[],
        "uses-permission",
        has_attr(ANDROID_NAME, NFC_PERMISSION),
        || Element::new().with_attr(ANDROID_NAME, NFC_PERMISSION),
    )
}

/// `<uses-feature android:name="android.hardware.nfc.hce" android:required="true" />`.
/// Если фича уже объявлена (даже с required="false"), то она не трогается
pub fn ensure_hce_feature(manifest: &mut Element) -> Result<Patched, StructureMissing> {
    ensure_child(
        manifest,
        &[],
        "uses-feature",
        has_attr(ANDROID_NAME, HCE_FEATURE),
        || {
            Element::new()
                .with_attr(ANDROID_NAME, HCE_FEATURE)
                .with_attr("android:required", "true")
        },
    )
}

/// Регистрирует сервис эмуляции карты внутри единственного `<application>`
pub fn ensure_hce_service(
    manifest: &mut Element,
    service_name: &str,
    resource_ref: &str,
) -> Result<Patched, StructureMissing> {
    ensure_child(
        manifest,
        &["application"],
        "service",
        has_attr(ANDROID_NAME, service_name),
        || service_element(service_name, resource_ref),
    )
}

/// Узел сервиса: intent-filter на HOST_APDU_SERVICE и meta-data со ссылкой
/// на список AID
pub fn service_element(service_name: &str, resource_ref: &str) -> Element {
    let intent_filter = Element::new()
        .with_child("action", Element::new().with_attr(ANDROID_NAME, HOST_APDU_ACTION))
        .with_child("category", Element::new().with_attr(ANDROID_NAME, DEFAULT_CATEGORY));

    let meta_data = Element::new()
        .with_attr(ANDROID_NAME, HOST_APDU_META)
        .with_attr("android:resource", resource_ref);

    Element::new()
        .with_attr(ANDROID_NAME, service_name)
        .with_attr("android:exported", "true")
        .with_attr("android:permission", BIND_NFC_SERVICE)
        .with_child("intent-filter", intent_filter)
        .with_child("meta-data", meta_data)
}
