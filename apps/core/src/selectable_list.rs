use crate::keys::{Key, KeyEvent};
use crate::model::{normalize_for_search, ActionError, Icon, Item};
use crate::surface::{RenderSurface, Row};
use crate::view::{Followup, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Filterable list with a clamped selection cursor.
///
/// The filtered view is kept as indices into the catalogue, so it is always
/// an order-preserving subsequence of it and is rebuilt from scratch on every
/// query change.
pub struct SelectableList {
    title: String,
    catalogue: Vec<Item>,
    query: String,
    filtered: Vec<usize>,
    cursor: Option<usize>,
}

impl SelectableList {
    pub fn new(title: impl Into<String>, items: Vec<Item>) -> Self {
        let mut list = Self {
            title: title.into(),
            catalogue: Vec::new(),
            query: String::new(),
            filtered: Vec::new(),
            cursor: None,
        };
        list.set_catalogue(items);
        list
    }

    pub fn set_catalogue(&mut self, items: Vec<Item>) {
        self.catalogue = items;
        self.query.clear();
        self.filtered = (0..self.catalogue.len()).collect();
        self.reset_cursor();
    }

    pub fn set_query(&mut self, text: &str) {
        let normalized = normalize_for_search(text);
        self.filtered = self
            .catalogue
            .iter()
            .enumerate()
            .filter(|(_, item)| item.matches(&normalized))
            .map(|(index, _)| index)
            .collect();
        self.query = text.to_string();
        self.reset_cursor();
    }

    pub fn move_selection(&mut self, direction: Direction) {
        let Some(cursor) = self.cursor else {
            return;
        };
        let last = self.filtered.len().saturating_sub(1);
        self.cursor = Some(match direction {
            Direction::Up => cursor.saturating_sub(1),
            Direction::Down => (cursor + 1).min(last),
        });
    }

    /// Runs the selected item's action. An empty view or an item without an
    /// action is a no-op that reports `Followup::Stay`.
    pub fn activate_selected(&self) -> Result<Followup, ActionError> {
        match self.selected().and_then(Item::action) {
            Some(action) => action(),
            None => Ok(Followup::Stay),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn catalogue(&self) -> &[Item] {
        &self.catalogue
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Item> + '_ {
        self.filtered.iter().map(|&index| &self.catalogue[index])
    }

    pub fn filtered_labels(&self) -> Vec<&str> {
        self.filtered().map(Item::label).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn selected(&self) -> Option<&Item> {
        self.cursor
            .and_then(|cursor| self.filtered.get(cursor))
            .map(|&index| &self.catalogue[index])
    }

    /// Attaches an icon to the catalogue item at `index`; out-of-range
    /// indices are ignored.
    pub fn set_icon(&mut self, index: usize, icon: Option<Icon>) {
        if let Some(item) = self.catalogue.get_mut(index) {
            item.set_icon(icon);
        }
    }

    fn reset_cursor(&mut self) {
        self.cursor = if self.filtered.is_empty() { None } else { Some(0) };
    }
}

impl View for SelectableList {
    fn title(&self) -> &str {
        &self.title
    }

    fn supports_filter_text(&self) -> bool {
        true
    }

    fn set_filter_text(&mut self, query: &str) {
        self.set_query(query);
    }

    fn supports_key_event(&self) -> bool {
        true
    }

    fn handle_key(&mut self, event: &KeyEvent) -> bool {
        match event.key {
            Key::Up => self.move_selection(Direction::Up),
            Key::Down => self.move_selection(Direction::Down),
            _ => return false,
        }
        true
    }

    fn supports_activation(&self) -> bool {
        true
    }

    fn activate(&mut self) -> Result<Followup, ActionError> {
        self.activate_selected()
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        let rows: Vec<Row<'_>> = self
            .filtered()
            .map(|item| Row {
                label: item.label(),
                kind: item.kind(),
                icon: item.icon(),
            })
            .collect();
        surface.draw_list(&self.title, &rows, self.cursor);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::{Direction, SelectableList};
    use crate::keys::{Key, KeyEvent};
    use crate::model::{Item, ItemKind};
    use crate::view::{Followup, View};

    fn apps(labels: &[&str]) -> Vec<Item> {
        labels
            .iter()
            .map(|label| Item::new(*label, ItemKind::Application))
            .collect()
    }

    #[test]
    fn query_matches_substring_case_insensitively() {
        let mut list = SelectableList::new("Home", apps(&["Safari", "Terminal", "Slack"]));

        list.set_query("a");
        assert_eq!(list.filtered_labels(), vec!["Safari", "Terminal", "Slack"]);
        assert_eq!(list.cursor(), Some(0));

        list.set_query("SA");
        assert_eq!(list.filtered_labels(), vec!["Safari"]);
    }

    #[test]
    fn set_query_is_idempotent() {
        let mut list = SelectableList::new("Home", apps(&["Safari", "Terminal", "Slack"]));
        list.set_query("l");
        let first = (list.filtered_labels().join(","), list.cursor());
        list.set_query("l");
        let second = (list.filtered_labels().join(","), list.cursor());
        assert_eq!(first, second);
        assert_eq!(first.0, "Terminal,Slack");
    }

    #[test]
    fn query_change_resets_cursor_to_top() {
        let mut list = SelectableList::new("Home", apps(&["Safari", "Terminal", "Slack"]));
        list.move_selection(Direction::Down);
        list.move_selection(Direction::Down);
        assert_eq!(list.cursor(), Some(2));

        list.set_query("");
        assert_eq!(list.cursor(), Some(0));
    }

    #[test]
    fn empty_result_clears_cursor_and_ignores_moves() {
        let mut list = SelectableList::new("Home", apps(&["Safari"]));
        list.set_query("zzz");
        assert_eq!(list.cursor(), None);
        list.move_selection(Direction::Down);
        list.move_selection(Direction::Up);
        assert_eq!(list.cursor(), None);
        assert!(list.selected().is_none());
    }

    #[test]
    fn cursor_clamps_at_both_ends() {
        let mut list = SelectableList::new("Home", apps(&["A", "B", "C"]));
        list.move_selection(Direction::Up);
        assert_eq!(list.cursor(), Some(0));

        for _ in 0..5 {
            list.move_selection(Direction::Down);
        }
        assert_eq!(list.cursor(), Some(2));
    }

    #[test]
    fn set_catalogue_resets_query() {
        let mut list = SelectableList::new("Home", apps(&["Safari", "Slack"]));
        list.set_query("saf");
        list.set_catalogue(apps(&["Notes", "Mail"]));
        assert_eq!(list.query(), "");
        assert_eq!(list.filtered_labels(), vec!["Notes", "Mail"]);
        assert_eq!(list.cursor(), Some(0));

        list.set_catalogue(Vec::new());
        assert_eq!(list.cursor(), None);
    }

    #[test]
    fn activate_runs_selected_action_only() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let items = vec![
            Item::new("Plain", ItemKind::Command),
            Item::new("Counted", ItemKind::Command).with_action(move || {
                counter.set(counter.get() + 1);
                Ok(Followup::Dismiss)
            }),
        ];
        let mut list = SelectableList::new("Home", items);

        assert!(matches!(list.activate(), Ok(Followup::Stay)));
        assert_eq!(hits.get(), 0);

        list.move_selection(Direction::Down);
        assert!(matches!(list.activate(), Ok(Followup::Dismiss)));
        assert_eq!(hits.get(), 1);
        assert_eq!(list.cursor(), Some(1));

        list.set_query("nothing");
        assert!(matches!(list.activate(), Ok(Followup::Stay)));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn handles_only_vertical_navigation_keys() {
        let mut list = SelectableList::new("Home", apps(&["A", "B"]));
        assert!(list.handle_key(&KeyEvent::new(Key::Down)));
        assert_eq!(list.cursor(), Some(1));
        assert!(!list.handle_key(&KeyEvent::new(Key::Tab)));
    }
}
