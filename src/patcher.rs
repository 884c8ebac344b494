// Copyright (c) 2025 Spawn
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// https://www.eclipse.org/legal/epl-2.0/
// SPDX-License-Identifier: EPL-2.0

use thiserror::Error;

use crate::tree::Element;

/// Родительский узел не найден либо их несколько. Это не фатально: проект
/// может быть сгенерирован не полностью, поэтому патч пропускается, а сборка
/// идёт дальше
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("element `{path}` is missing or not unique, patch skipped")]
pub struct StructureMissing {
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patched {
    Inserted,
    AlreadyPresent,
}

/// Гарантирует что под узлом `parent_path` есть ребёнок `tag`, для которого
/// `is_same` вернёт true. Если такого нет, то в конец группы добавляется узел
/// из `make`. Существующие узлы никогда не меняются, не удаляются и не
/// переставляются, поэтому повторный вызов ничего не сломает
///
/// `parent_path` это путь из тегов начиная под корнем, пустой путь значит сам
/// корень. Каждый шаг должен давать ровно один узел, недостающих предков эта
/// функция не создаёт
pub fn ensure_child<P, F>(
    root: &mut Element,
    parent_path: &[&str],
    tag: &str,
    is_same: P,
    make: F,
) -> Result<Patched, StructureMissing>
where
    P: Fn(&Element) -> bool,
    F: FnOnce() -> Element,
{
    let parent = resolve_mut(root, parent_path)?;
    let group = parent.children_entry(tag);

    if group.iter().any(|child| is_same(child)) {
        return Ok(Patched::AlreadyPresent);
    }

    group.push(make());
    Ok(Patched::Inserted)
}

/// Предикат для самого частого случая: узел считается тем же самым, если у
/// него совпадает значение одного атрибута, обычно `android:name`
pub fn has_attr<'a>(name: &'a str, value: &'a str) -> impl Fn(&Element) -> bool + 'a {
    move |element| element.attr(name) == Some(value)
}

fn resolve_mut<'a>(root: &'a mut Element, path: &[&str]) -> Result<&'a mut Element, StructureMissing> {
    let mut node = root;

    for (depth, tag) in path.iter().enumerate() {
        node = node.single_mut(tag).ok_or_else(|| StructureMissing {
            path: path[..=depth].join("/"),
        })?;
    }

    Ok(node)
}
