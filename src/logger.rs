// Copyright (c) 2025 Spawn
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// https://www.eclipse.org/legal/epl-2.0/
// SPDX-License-Identifier: EPL-2.0

use std::sync::atomic::{AtomicBool, Ordering};

#[doc(hidden)]
pub use colored::Colorize;

static QUIET: AtomicBool = AtomicBool::new(false);

/// Тихий режим глушит task, info и note. Предупреждения и ошибки всё равно
/// выводятся
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Макрос для вывода информации о текущем этапе патчинга
/// Выводит "TASK: Сообщение" где TASK зелёным и жирным
#[macro_export]
macro_rules! task {
    ($($arg:tt)*) => {{
        if !$crate::logger::is_quiet() {
            use $crate::logger::Colorize;
            println!("{} {}", "TASK:".green().bold(), format!($($arg)*));
        }
    }};
}

/// Макрос для вывода обычной информации без префиксов
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        if !$crate::logger::is_quiet() {
            println!("{}", format!($($arg)*));
        }
    }};
}

/// Макрос для вывода важных заметок. Префикс "NOTE:", цвет синий и шрифт жирный
#[macro_export]
macro_rules! note {
    ($($arg:tt)*) => {{
        if !$crate::logger::is_quiet() {
            use $crate::logger::Colorize;
            println!("{} {}", "NOTE:".blue().bold(), format!($($arg)*));
        }
    }};
}

/// Макрос для вывода предупреждений. Выводит в stderr "WARN: Сообщение" где
/// префикс WARN: жёлтым цветом и жирным шрифтом
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        use $crate::logger::Colorize;
        eprintln!("{} {}", "WARN:".yellow().bold(), format!($($arg)*));
    }};
}
