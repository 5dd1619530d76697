use std::io::Write;

use crate::model::{Icon, ItemKind};

/// One visible list row handed to the render surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    pub label: &'a str,
    pub kind: ItemKind,
    pub icon: Option<&'a Icon>,
}

/// Drawing and window capabilities supplied by the UI toolkit. The engine
/// never draws anything itself; it only tells the surface what to show.
pub trait RenderSurface {
    fn show_window(&mut self);
    fn hide_window(&mut self);
    fn raise_window(&mut self);
    fn focus_input(&mut self);
    fn set_query_text(&mut self, text: &str, select_all: bool);
    fn draw_list(&mut self, title: &str, rows: &[Row<'_>], cursor: Option<usize>);
    fn draw_panel(&mut self, title: &str, lines: &[String]);
}

/// Surface that remembers the last state it was given.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingSurface {
    pub visible: bool,
    pub focused: bool,
    pub raise_count: usize,
    pub query: String,
    pub query_selected: bool,
    pub title: String,
    pub rows: Vec<String>,
    pub cursor: Option<usize>,
    pub panel_lines: Vec<String>,
}

impl RecordingSurface {
    pub fn selected_label(&self) -> Option<&str> {
        self.cursor
            .and_then(|index| self.rows.get(index))
            .map(String::as_str)
    }
}

impl RenderSurface for RecordingSurface {
    fn show_window(&mut self) {
        self.visible = true;
    }

    fn hide_window(&mut self) {
        self.visible = false;
        self.focused = false;
    }

    fn raise_window(&mut self) {
        self.raise_count += 1;
    }

    fn focus_input(&mut self) {
        self.focused = true;
    }

    fn set_query_text(&mut self, text: &str, select_all: bool) {
        self.query = text.to_string();
        self.query_selected = select_all;
    }

    fn draw_list(&mut self, title: &str, rows: &[Row<'_>], cursor: Option<usize>) {
        self.title = title.to_string();
        self.rows = rows.iter().map(|row| row.label.to_string()).collect();
        self.cursor = cursor;
        self.panel_lines.clear();
    }

    fn draw_panel(&mut self, title: &str, lines: &[String]) {
        self.title = title.to_string();
        self.rows.clear();
        self.cursor = None;
        self.panel_lines = lines.to_vec();
    }
}

/// Plain-text surface used by the headless shell.
pub struct TerminalSurface<W: Write> {
    out: W,
    visible: bool,
    max_rows: usize,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, max_rows: usize) -> Self {
        Self {
            out,
            visible: false,
            max_rows,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        // Terminal output is best effort; a closed stdout must not stop the engine.
        let _ = writeln!(self.out, "{text}");
    }
}

impl<W: Write> RenderSurface for TerminalSurface<W> {
    fn show_window(&mut self) {
        self.visible = true;
        self.line("[window shown]");
    }

    fn hide_window(&mut self) {
        self.visible = false;
        self.line("[window hidden]");
    }

    fn raise_window(&mut self) {}

    fn focus_input(&mut self) {}

    fn set_query_text(&mut self, text: &str, select_all: bool) {
        if !self.visible {
            return;
        }
        let marker = if select_all { " (selected)" } else { "" };
        self.line(&format!("query: \"{text}\"{marker}"));
    }

    fn draw_list(&mut self, title: &str, rows: &[Row<'_>], cursor: Option<usize>) {
        if !self.visible {
            return;
        }
        self.line(&format!("== {title} ({} items)", rows.len()));
        let start = cursor
            .map(|c| c.saturating_sub(self.max_rows.saturating_sub(1)))
            .unwrap_or(0);
        let visible: Vec<String> = rows
            .iter()
            .enumerate()
            .skip(start)
            .take(self.max_rows)
            .map(|(index, row)| {
                let marker = if Some(index) == cursor { '>' } else { ' ' };
                format!("{marker} {}", row.label)
            })
            .collect();
        for text in visible {
            self.line(&text);
        }
        if rows.is_empty() {
            self.line("  (no matches)");
        }
    }

    fn draw_panel(&mut self, title: &str, lines: &[String]) {
        if !self.visible {
            return;
        }
        self.line(&format!("== {title}"));
        for text in lines {
            self.line(&format!("  {text}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RenderSurface, Row, TerminalSurface};
    use crate::model::ItemKind;

    #[test]
    fn terminal_surface_marks_cursor_row() {
        let mut surface = TerminalSurface::new(Vec::new(), 10);
        surface.show_window();
        let rows = [
            Row {
                label: "Safari",
                kind: ItemKind::Application,
                icon: None,
            },
            Row {
                label: "Slack",
                kind: ItemKind::Application,
                icon: None,
            },
        ];
        surface.draw_list("Home", &rows, Some(1));

        let text = String::from_utf8(surface.into_inner()).unwrap();
        assert!(text.contains("  Safari"));
        assert!(text.contains("> Slack"));
    }

    #[test]
    fn terminal_surface_stays_quiet_while_hidden() {
        let mut surface = TerminalSurface::new(Vec::new(), 10);
        surface.draw_panel("About", &["hello".to_string()]);
        assert!(surface.into_inner().is_empty());
    }
}
