// Copyright (c) 2025 Spawn
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// https://www.eclipse.org/legal/epl-2.0/
// SPDX-License-Identifier: EPL-2.0

use std::borrow::Cow;
use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

use crate::error::{Error, Result};

/// Узел манифеста. Имя узла хранится не в нём самом, а в родителе как ключ
/// группы детей, поэтому все `<service>` одного `<application>` лежат в одной
/// последовательности. Атрибуты и группы хранят порядок, в котором они
/// появились в исходном xml либо были добавлены
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    attrs: Vec<(String, String)>,
    children: Vec<(String, Vec<Element>)>,
    text: Option<String>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет атрибут, используется для сборки узлов цепочкой вызовов
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Добавляет ребёнка в конец группы `tag`
    pub fn with_child(mut self, tag: &str, child: Element) -> Self {
        self.children_entry(tag).push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Заменяет значение существующего атрибута на месте либо добавляет
    /// новый в конец
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Дети с тегом `tag`. Если группы нет, то пустой срез
    pub fn children(&self, tag: &str) -> &[Element] {
        self.children
            .iter()
            .find(|(k, _)| k == tag)
            .map(|(_, group)| group.as_slice())
            .unwrap_or(&[])
    }

    /// Группа детей с тегом `tag`. Если её нет, то создаётся пустая в конце
    pub fn children_entry(&mut self, tag: &str) -> &mut Vec<Element> {
        let index = match self.children.iter().position(|(k, _)| k == tag) {
            Some(index) => index,
            None => {
                self.children.push((tag.to_string(), Vec::new()));
                self.children.len() - 1
            }
        };

        &mut self.children[index].1
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[Element])> {
        self.children.iter().map(|(k, g)| (k.as_str(), g.as_slice()))
    }

    /// Единственный ребёнок с тегом `tag`. Если таких нет или их больше
    /// одного, то None. Манифест допускает ровно один `<application>`, и
    /// молча брать первый из нескольких нельзя
    pub fn single(&self, tag: &str) -> Option<&Element> {
        match self.children(tag) {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn single_mut(&mut self, tag: &str) -> Option<&mut Element> {
        let group = self
            .children
            .iter_mut()
            .find(|(k, _)| k == tag)
            .map(|(_, group)| group)?;

        match group.as_mut_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Текст склеивается, потому что между кусками текста может быть
    /// комментарий или CDATA
    pub fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    fn is_leaf(&self) -> bool {
        self.text.is_none() && self.children.iter().all(|(_, g)| g.is_empty())
    }
}

/// Весь xml документ: имя корневого тега (для манифеста это `manifest`) и
/// сам корневой узел
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub root: Element,
}

impl Document {
    pub fn new(name: &str, root: Element) -> Self {
        Self {
            name: name.to_string(),
            root,
        }
    }

    /// Сериализует документ обратно в xml с декларацией и отступом в 4 пробела.
    /// Узлы без детей и текста пишутся как самозакрывающиеся теги
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| Error::Xml(e.to_string()))?;

        write_element(&mut writer, &self.name, &self.root)
            .map_err(|e| Error::Xml(e.to_string()))?;

        let mut xml = String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| Error::Xml(e.to_string()))?;
        xml.push('\n');

        Ok(xml)
    }
}

/// Экранирование значения атрибута. Кроме `&<>"'` переводы строк и табы
/// пишутся как ссылки на символы, иначе парсер при чтении заменит их на
/// пробелы
pub(crate) fn escape_attr(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);

    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }

    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}

fn write_element<W: Write>(writer: &mut Writer<W>, name: &str, element: &Element) -> quick_xml::Result<()> {
    let mut start = BytesStart::new(name);
    for (k, v) in element.attrs() {
        let value = escape_attr(v);
        start.push_attribute((k.as_bytes(), value.as_bytes()));
    }

    if element.is_leaf() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;

    if let Some(text) = element.text() {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }

    for (tag, group) in element.groups() {
        for child in group {
            write_element(writer, tag, child)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_attr_replaces_in_place() {
        let mut el = Element::new()
            .with_attr("android:name", "a")
            .with_attr("android:exported", "false");

        el.set_attr("android:name", "b");

        let attrs: Vec<_> = el.attrs().collect();
        assert_eq!(attrs, vec![("android:name", "b"), ("android:exported", "false")]);
    }

    #[test]
    fn single_requires_exactly_one() {
        let mut root = Element::new();
        assert!(root.single("application").is_none());

        root.children_entry("application");
        assert!(root.single("application").is_none());

        root.children_entry("application").push(Element::new());
        assert!(root.single("application").is_some());

        root.children_entry("application").push(Element::new());
        assert!(root.single_mut("application").is_none());
    }

    #[test]
    fn writes_leaf_nodes_self_closing() {
        let doc = Document::new(
            "manifest",
            Element::new()
                .with_attr("package", "com.example")
                .with_child(
                    "uses-permission",
                    Element::new().with_attr("android:name", "android.permission.NFC"),
                ),
        );

        let xml = doc.to_xml().unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<manifest package=\"com.example\">"));
        assert!(xml.contains("    <uses-permission android:name=\"android.permission.NFC\"/>"));
        assert!(xml.ends_with("</manifest>\n"));
    }

    #[test]
    fn line_breaks_in_attributes_survive_writing() {
        let doc = crate::parser::parse_manifest("<a v=\"x&#10;y&#9;z\"/>").unwrap();
        assert_eq!(doc.root.attr("v"), Some("x\ny\tz"));

        let xml = doc.to_xml().unwrap();

        assert!(xml.contains("<a v=\"x&#10;y&#9;z\"/>"));
        assert_eq!(crate::parser::parse_manifest(&xml).unwrap(), doc);
    }

    #[test]
    fn escapes_attribute_values() {
        let doc = Document::new("a", Element::new().with_attr("v", "x\"<&>"));
        let xml = doc.to_xml().unwrap();

        assert!(!xml.contains("x\"<&>"));
        assert!(xml.contains("&amp;"));
    }
}
