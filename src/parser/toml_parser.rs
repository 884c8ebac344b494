// Copyright (c) 2025 Spawn
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// https://www.eclipse.org/legal/epl-2.0/
// SPDX-License-Identifier: EPL-2.0

use serde::Deserialize;
use toml::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// AID из примера: Visa, Mastercard и NDEF. Используются если в конфиге
/// не задан свой список
pub const SAMPLE_AIDS: [&str; 3] = ["A0000000031010", "A0000000041010", "D2760000850101"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HceConfig {
    // Идентификаторы приложений, попадают в aid_list.xml в том же порядке
    pub app_ids: Vec<String>,

    // Полное имя класса сервиса который обрабатывает APDU
    pub service_name: String,

    // Пути относительно корня проекта. Список AID всегда лежит в
    // `res_dir/xml`, иначе ссылка `@xml/...` из манифеста не найдёт его
    pub manifest_path: PathBuf,
    pub res_dir: PathBuf,
    pub resource_file: String,

    pub aid_group: AidGroup,
}

impl Default for HceConfig {
    fn default() -> Self {
        Self {
            app_ids: SAMPLE_AIDS.iter().map(|aid| aid.to_string()).collect(),
            service_name: "com.itsecrnd.rtnhceandroid.HCEService".to_string(),
            manifest_path: PathBuf::from("android/app/src/main/AndroidManifest.xml"),
            res_dir: PathBuf::from("android/app/src/main/res"),
            resource_file: "aid_list.xml".to_string(),
            aid_group: AidGroup::default(),
        }
    }
}

impl HceConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let value: Value = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Toml syntax error: {}", e)))?;

        let config: HceConfig = value.try_into()
            .map_err(|e| Error::Config(format!("Config structure error: {}", e)))?;

        config.resource_ref()?;
        Ok(config)
    }

    /// Папка куда пишется список AID
    pub fn resource_dir(&self) -> PathBuf {
        self.res_dir.join("xml")
    }

    /// Ссылка на ресурс для meta-data сервиса, `aid_list.xml` превращается
    /// в `@xml/aid_list`. aapt2 принимает только имена из `[a-z0-9_]` и
    /// расширение `.xml`, поэтому остальное сразу ошибка конфига
    pub fn resource_ref(&self) -> Result<String> {
        let file = Path::new(&self.resource_file);

        let stem = file.file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty() && s.bytes().all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_')));

        match (stem, file.extension().and_then(|e| e.to_str())) {
            (Some(stem), Some("xml")) if file.parent() == Some(Path::new("")) => Ok(format!("@xml/{}", stem)),
            _ => Err(Error::Config(format!(
                "Invalid resource-file {:?}: expected <[a-z0-9_]+>.xml",
                self.resource_file
            ))),
        }
    }
}

/// Атрибуты обёртки host-apdu-service и группы aid-group
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AidGroup {
    pub category: String,
    pub description: String,
    pub require_device_unlock: bool,
}

impl Default for AidGroup {
    fn default() -> Self {
        Self {
            category: "other".to_string(),
            description: "@string/app_name".to_string(),
            require_device_unlock: false,
        }
    }
}

/// Функция для парсинга toml конфига. Файлов может быть несколько, они
/// сливаются по порядку и более поздние перекрывают значения ранних. Если
/// путей нет, то возвращается конфиг по умолчанию
pub fn load_configs<P: AsRef<Path>>(paths: &[P]) -> Result<HceConfig> {
    if paths.is_empty() {
        return Ok(HceConfig::default());
    }

    let mut merged_value = Value::Table(toml::map::Map::new());

    for path in paths {
        let path_ref = path.as_ref();
        let content = fs::read_to_string(path_ref)
            .map_err(|e| Error::io(path_ref, e))?;

        let value: Value = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Toml syntax error {:?}: {}", path_ref, e)))?;

        merge_toml_values(&mut merged_value, value);
    }

    let config: HceConfig = merged_value.try_into()
        .map_err(|e| Error::Config(format!("Config structure error: {}", e)))?;

    config.resource_ref()?;
    Ok(config)
}

/// Таблицы сливаются рекурсивно, всё остальное (включая массивы) заменяется
fn merge_toml_values(base: &mut Value, append: Value) {
    match (base, append) {
        (Value::Table(base_map), Value::Table(append_map)) => {
            for (k, v) in append_map {
                match base_map.get_mut(&k) {
                    Some(base_entry) => merge_toml_values(base_entry, v),
                    None => {
                        base_map.insert(k, v);
                    }
                }
            }
        }
        (base_val, append_val) => *base_val = append_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let config = HceConfig::from_toml_str("").unwrap();

        assert_eq!(config, HceConfig::default());
        assert_eq!(config.app_ids, vec!["A0000000031010", "A0000000041010", "D2760000850101"]);
        assert_eq!(config.resource_ref().unwrap(), "@xml/aid_list");
        assert_eq!(config.resource_dir(), PathBuf::from("android/app/src/main/res/xml"));
    }

    #[test]
    fn reads_kebab_case_keys() {
        let config = HceConfig::from_toml_str(
            r#"
            app-ids = ["F0010203040506"]
            service-name = "com.example.PayService"
            resource-file = "payment_aids.xml"

            [aid-group]
            category = "payment"
            require-device-unlock = true
            "#,
        )
        .unwrap();

        assert_eq!(config.app_ids, vec!["F0010203040506"]);
        assert_eq!(config.service_name, "com.example.PayService");
        assert_eq!(config.resource_ref().unwrap(), "@xml/payment_aids");
        assert_eq!(config.aid_group.category, "payment");
        assert_eq!(config.aid_group.description, "@string/app_name");
        assert!(config.aid_group.require_device_unlock);
    }

    #[test]
    fn wrong_type_is_config_error() {
        let err = HceConfig::from_toml_str("app-ids = 5").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_resource_names_aapt2_cannot_compile() {
        for name in ["Aid-List.xml", "aid list.xml", "aid_list.json", "aid_list", ".xml", "raw/aid_list.xml"] {
            let content = format!("resource-file = {:?}", name);
            let err = HceConfig::from_toml_str(&content).unwrap_err();

            assert!(matches!(err, Error::Config(_)), "{} accepted", name);
        }
    }

    #[test]
    fn resource_dir_is_always_xml_under_res() {
        let config = HceConfig::from_toml_str("res-dir = \"app/res\"\nresource-file = \"nfc_aids.xml\"").unwrap();

        assert_eq!(config.resource_dir(), PathBuf::from("app/res/xml"));
        assert_eq!(config.resource_ref().unwrap(), "@xml/nfc_aids");
    }

    #[test]
    fn later_tables_override_scalars_only() {
        let mut base: Value = toml::from_str("[aid-group]\ncategory = \"other\"\ndescription = \"a\"").unwrap();
        let append: Value = toml::from_str("[aid-group]\ncategory = \"payment\"").unwrap();

        merge_toml_values(&mut base, append);

        let group = base.get("aid-group").unwrap();
        assert_eq!(group.get("category").unwrap().as_str(), Some("payment"));
        assert_eq!(group.get("description").unwrap().as_str(), Some("a"));
    }
}
