// Copyright (c) 2025 Spawn
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// https://www.eclipse.org/legal/epl-2.0/
// SPDX-License-Identifier: EPL-2.0

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{Error, Result};
use crate::tree::{Document, Element};

/// Эта функция читает xml манифеста в дерево `Element`. Дети группируются по
/// тегу в порядке первого появления, текст из одних пробелов, комментарии и
/// инструкции обработки отбрасываются. Корневой элемент должен быть ровно один
pub fn parse_manifest(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();

    // Открытые, но ещё не закрытые теги
    let mut stack: Vec<(String, Element)> = Vec::new();
    let mut root: Option<(String, Element)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(open_element(&e)?);
            }

            Ok(Event::Empty(e)) => {
                let node = open_element(&e)?;
                close_element(&mut stack, &mut root, node)?;
            }

            Ok(Event::End(_)) => {
                let node = stack.pop()
                    .ok_or_else(|| Error::Xml("Unexpected closing tag".to_string()))?;
                close_element(&mut stack, &mut root, node)?;
            }

            Ok(Event::Text(e)) => {
                let text = e.unescape()
                    .map_err(|err| Error::Xml(err.to_string()))?;
                push_text(&mut stack, text);
            }

            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                push_text(&mut stack, Cow::Owned(text));
            }

            Ok(Event::Eof) => break,

            // Декларация, комментарии, doctype
            Ok(_) => (),

            Err(e) => {
                return Err(Error::Xml(format!(
                    "Error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }

        buf.clear();
    }

    if let Some((name, _)) = stack.last() {
        return Err(Error::Xml(format!("Unclosed element <{}>", name)));
    }

    root.map(|(name, root)| Document { name, root })
        .ok_or_else(|| Error::Xml("No root element".to_string()))
}

fn open_element(e: &BytesStart) -> Result<(String, Element)> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut element = Element::new();

    for attr in e.attributes() {
        let attr = attr
            .map_err(|err| Error::Xml(format!("Bad attribute in <{}>: {}", name, err)))?;

        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()
            .map_err(|err| Error::Xml(format!("Bad attribute value in <{}>: {}", name, err)))?;

        element.set_attr(&key, &value);
    }

    Ok((name, element))
}

/// Закрытый узел уходит в группу своего родителя, а если родителя нет, то
/// это корень документа
fn close_element(
    stack: &mut Vec<(String, Element)>,
    root: &mut Option<(String, Element)>,
    (name, element): (String, Element),
) -> Result<()> {
    match stack.last_mut() {
        Some((_, parent)) => {
            parent.children_entry(&name).push(element);
            Ok(())
        }

        None if root.is_none() => {
            *root = Some((name, element));
            Ok(())
        }

        None => Err(Error::Xml(format!("Second root element <{}>", name))),
    }
}

fn push_text(stack: &mut [(String, Element)], text: Cow<'_, str>) {
    if let Some((_, element)) = stack.last_mut() {
        element.push_text(&text);
    }
}
