// Copyright (c) 2025 Spawn
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// https://www.eclipse.org/legal/epl-2.0/
// SPDX-License-Identifier: EPL-2.0

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::parser::AidGroup;
use crate::tree::escape_attr;

/// Генерирует xml ресурс host-apdu-service. На каждый идентификатор одна
/// строка aid-filter в том же порядке, дубликаты не убираются. Сами
/// идентификаторы не проверяются, только экранируются
pub fn render<S: AsRef<str>>(identifiers: &[S], group: &AidGroup) -> String {
    let description = escape_attr(&group.description);
    let category = escape_attr(&group.category);

    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str("<host-apdu-service xmlns:android=\"http://schemas.android.com/apk/res/android\"\n");
    xml.push_str(&format!("    android:description=\"{}\"\n", description));
    xml.push_str(&format!("    android:requireDeviceUnlock=\"{}\">\n", group.require_device_unlock));
    xml.push_str(&format!(
        "    <aid-group android:category=\"{}\" android:description=\"{}\">\n",
        category, description
    ));

    for aid in identifiers {
        xml.push_str(&format!("        <aid-filter android:name=\"{}\" />\n", escape_attr(aid.as_ref())));
    }

    xml.push_str("    </aid-group>\n");
    xml.push_str("</host-apdu-service>\n");

    xml
}

/// Создаёт `output_dir` (если её нет) и записывает туда `file_name`.
/// Старый файл всегда заменяется целиком, список идентификаторов это
/// единственный источник содержимого
pub fn emit<S: AsRef<str>>(
    output_dir: &Path,
    file_name: &str,
    identifiers: &[S],
    group: &AidGroup,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;

    let path = output_dir.join(file_name);
    write_replace(&path, &render(identifiers, group))?;

    Ok(path)
}

/// Запись через временный файл рядом и rename, чтобы при ошибке на диске не
/// остался наполовину записанный файл. Временный файл при любой ошибке
/// удаляется, иначе aapt2 попробует скомпилировать его из `res/xml`
pub(crate) fn write_replace(path: &Path, content: &str) -> Result<()> {
    let tmp_path = path.with_extension("partial");

    let written = fs::write(&tmp_path, content)
        .and_then(|_| fs::rename(&tmp_path, path));

    if let Err(e) = written {
        fs::remove_file(&tmp_path).ok();
        return Err(Error::io(path, e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_lines(xml: &str) -> Vec<&str> {
        xml.lines()
            .filter(|l| l.trim_start().starts_with("<aid-filter"))
            .collect()
    }

    #[test]
    fn renders_one_line_per_identifier_in_order() {
        let ids = ["A2", "A1", "A2"];
        let xml = render(&ids, &AidGroup::default());

        assert_eq!(
            filter_lines(&xml),
            vec![
                "        <aid-filter android:name=\"A2\" />",
                "        <aid-filter android:name=\"A1\" />",
                "        <aid-filter android:name=\"A2\" />",
            ]
        );
    }

    #[test]
    fn renders_default_template() {
        let xml = render(&["A0000000031010"], &AidGroup::default());

        let expected = "\
<?xml version=\"1.0\" encoding=\"utf-8\"?>
<host-apdu-service xmlns:android=\"http://schemas.android.com/apk/res/android\"
    android:description=\"@string/app_name\"
    android:requireDeviceUnlock=\"false\">
    <aid-group android:category=\"other\" android:description=\"@string/app_name\">
        <aid-filter android:name=\"A0000000031010\" />
    </aid-group>
</host-apdu-service>
";
        assert_eq!(xml, expected);
    }

    #[test]
    fn empty_list_renders_empty_group() {
        let ids: [&str; 0] = [];
        let xml = render(&ids, &AidGroup::default());

        assert!(filter_lines(&xml).is_empty());
        assert!(xml.contains("<aid-group android:category=\"other\" android:description=\"@string/app_name\">\n    </aid-group>"));
    }

    #[test]
    fn escapes_unsafe_identifiers() {
        let xml = render(&["A1\" /><evil x=\"&"], &AidGroup::default());

        assert_eq!(
            filter_lines(&xml),
            vec!["        <aid-filter android:name=\"A1&quot; /&gt;&lt;evil x=&quot;&amp;\" />"]
        );
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // rename файла поверх непустой папки невозможен
        let target = dir.path().join("aid_list.xml");
        fs::create_dir_all(target.join("inner")).unwrap();

        let err = write_replace(&target, "<x/>").unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        assert!(!dir.path().join("aid_list.partial").exists());
        assert!(target.is_dir());
    }

    #[test]
    fn control_characters_become_character_references() {
        let xml = render(&["A1\nA2\t"], &AidGroup::default());

        assert_eq!(filter_lines(&xml), vec!["        <aid-filter android:name=\"A1&#10;A2&#9;\" />"]);
    }

    #[test]
    fn rendered_resource_is_well_formed() {
        let xml = render(&["A1", "A<2>"], &AidGroup::default());
        let doc = crate::parser::parse_manifest(&xml).unwrap();

        let group = doc.root.single("aid-group").unwrap();
        let names: Vec<_> = group
            .children("aid-filter")
            .iter()
            .filter_map(|f| f.attr("android:name"))
            .collect();
        assert_eq!(names, vec!["A1", "A<2>"]);
    }
}
