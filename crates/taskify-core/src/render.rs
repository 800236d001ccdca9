use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::task::TaskItem;
use crate::theme::Theme;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn print_task_table(
        &mut self,
        tasks: &[(usize, &TaskItem)],
        counts: (usize, usize),
        theme: Theme,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "ID".to_string(),
            "Done".to_string(),
            "Category".to_string(),
            "Description".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());
        for (position, task) in tasks {
            let id = self.paint(&position.to_string(), "33");
            let done = if task.completed { "x" } else { "" }.to_string();
            let badge = self.paint_badge(task);
            rows.push(vec![id, done, badge, task.text.clone()]);
        }

        write_table(&mut out, headers, rows)?;

        let (completed, total) = counts;
        writeln!(out, "\n{completed}/{total} completed ({} theme)", theme.as_str())?;
        Ok(())
    }

    fn paint_badge(&self, task: &TaskItem) -> String {
        let Some(category) = task.category.as_deref() else {
            return String::new();
        };

        // Same idea as the colored badges on the original page: a stable
        // color per well-known category, plain for the rest.
        let code = match category {
            "work" => "34",
            "personal" => "35",
            "other" => "36",
            _ => "39",
        };
        self.paint(category, code)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }
        if ch == '\x1b' {
            escaped = true;
            continue;
        }
        out.push(ch);
    }

    out
}
