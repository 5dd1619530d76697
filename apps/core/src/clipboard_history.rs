use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::keys::KeyEvent;
use crate::model::{ActionError, Item, ItemKind};
use crate::selectable_list::SelectableList;
use crate::surface::RenderSurface;
use crate::view::{Followup, View};

pub const CLIPBOARD_TITLE: &str = "Clipboard History";
const PREVIEW_CHARS: usize = 96;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard access is unsupported on this platform")]
    Unsupported,
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Read/write access to the system clipboard.
pub trait ClipboardAccess {
    fn read_text(&self) -> Result<Option<String>, ClipboardError>;
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardEntry {
    pub text: String,
    pub captured_epoch_secs: i64,
}

/// Captured clipboard texts, newest first. Owned by the UI thread and shared
/// with the views that display it.
#[derive(Debug, Clone)]
pub struct ClipboardHistory {
    entries: Vec<ClipboardEntry>,
    max_entries: usize,
    sensitive_patterns: Vec<String>,
}

pub type SharedClipboardHistory = Rc<RefCell<ClipboardHistory>>;

impl ClipboardHistory {
    pub fn new(max_entries: usize, sensitive_patterns: Vec<String>) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
            sensitive_patterns: sensitive_patterns
                .into_iter()
                .map(|pattern| pattern.trim().to_lowercase())
                .filter(|pattern| !pattern.is_empty())
                .collect(),
        }
    }

    pub fn shared(self) -> SharedClipboardHistory {
        Rc::new(RefCell::new(self))
    }

    /// Records a new clipboard text. Empty text, sensitive text and a repeat
    /// of the newest entry are skipped. Returns true when an entry was added.
    pub fn record(&mut self, raw: &str) -> bool {
        let text = normalize_clipboard_text(raw);
        if text.is_empty() || self.is_sensitive(&text) {
            return false;
        }
        if self.entries.first().is_some_and(|entry| entry.text == text) {
            return false;
        }

        self.entries.insert(
            0,
            ClipboardEntry {
                text,
                captured_epoch_secs: now_epoch_secs(),
            },
        );
        self.entries.truncate(self.max_entries);
        true
    }

    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn is_sensitive(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.sensitive_patterns
            .iter()
            .any(|pattern| lowered.contains(pattern.as_str()))
    }
}

/// New clipboard text observed by the poller thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardChange(pub String);

/// Polls the clipboard on its own thread and sends each change over
/// `events`. The thread ends when the receiver goes away or the platform has
/// no clipboard support.
pub fn spawn_clipboard_poller<C, E>(
    access: C,
    interval: Duration,
    events: Sender<E>,
) -> std::io::Result<JoinHandle<()>>
where
    C: ClipboardAccess + Send + 'static,
    E: From<ClipboardChange> + Send + 'static,
{
    std::thread::Builder::new()
        .name("clipboard-poller".to_string())
        .spawn(move || {
            let mut last: Option<String> = None;
            loop {
                match access.read_text() {
                    Ok(Some(text)) if last.as_deref() != Some(text.as_str()) => {
                        last = Some(text.clone());
                        if events.send(E::from(ClipboardChange(text))).is_err() {
                            debug!("clipboard receiver closed; poller exiting");
                            return;
                        }
                    }
                    Ok(_) => {}
                    Err(ClipboardError::Unsupported) => {
                        warn!("clipboard polling unsupported on this platform; history disabled");
                        return;
                    }
                    Err(error) => debug!(%error, "clipboard read failed"),
                }
                std::thread::sleep(interval);
            }
        })
}

/// List of captured clipboard entries. Reloaded from the shared history each
/// time it is shown; activating an entry copies it back and hides the window.
pub struct ClipboardView {
    list: SelectableList,
    history: SharedClipboardHistory,
    clipboard: Rc<dyn ClipboardAccess>,
}

impl ClipboardView {
    pub fn new(history: SharedClipboardHistory, clipboard: Rc<dyn ClipboardAccess>) -> Self {
        let mut view = Self {
            list: SelectableList::new(CLIPBOARD_TITLE, Vec::new()),
            history,
            clipboard,
        };
        view.reload();
        view
    }

    pub fn list(&self) -> &SelectableList {
        &self.list
    }

    fn reload(&mut self) {
        let items = self
            .history
            .borrow()
            .entries()
            .iter()
            .map(|entry| {
                let text = entry.text.clone();
                let clipboard = Rc::clone(&self.clipboard);
                Item::new(preview_text(&entry.text, PREVIEW_CHARS), ItemKind::Clipboard)
                    .with_action(move || {
                        clipboard
                            .write_text(&text)
                            .map_err(|error| ActionError::Clipboard(error.to_string()))?;
                        info!(chars = text.chars().count(), "clipboard entry restored");
                        Ok(Followup::Dismiss)
                    })
            })
            .collect();
        self.list.set_catalogue(items);
    }
}

impl View for ClipboardView {
    fn title(&self) -> &str {
        self.list.title()
    }

    fn supports_filter_text(&self) -> bool {
        true
    }

    fn set_filter_text(&mut self, query: &str) {
        self.list.set_query(query);
    }

    fn supports_key_event(&self) -> bool {
        true
    }

    fn handle_key(&mut self, event: &KeyEvent) -> bool {
        self.list.handle_key(event)
    }

    fn supports_activation(&self) -> bool {
        true
    }

    fn activate(&mut self) -> Result<Followup, ActionError> {
        self.list.activate_selected()
    }

    fn on_shown(&mut self) {
        self.reload();
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        self.list.render(surface);
    }
}

/// Platform clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardAccess for SystemClipboard {
    fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        read_system_clipboard_text()
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        write_system_clipboard_text(text)
    }
}

fn normalize_clipboard_text(input: &str) -> String {
    input
        .replace('\u{0000}', "")
        .replace('\r', "")
        .trim()
        .to_string()
}

fn preview_text(value: &str, max_chars: usize) -> String {
    let single_line = value.replace('\n', " ");
    single_line.trim().chars().take(max_chars).collect()
}

fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(target_os = "windows")]
fn read_system_clipboard_text() -> Result<Option<String>, ClipboardError> {
    use windows_sys::Win32::System::DataExchange::{
        CloseClipboard, GetClipboardData, IsClipboardFormatAvailable, OpenClipboard,
    };
    use windows_sys::Win32::System::Memory::{GlobalLock, GlobalUnlock};

    const CF_UNICODETEXT: u32 = 13;

    unsafe {
        if OpenClipboard(std::ptr::null_mut()) == 0 {
            return Err(ClipboardError::Unavailable("OpenClipboard failed".to_string()));
        }

        if IsClipboardFormatAvailable(CF_UNICODETEXT) == 0 {
            CloseClipboard();
            return Ok(None);
        }

        let handle = GetClipboardData(CF_UNICODETEXT);
        if handle.is_null() {
            CloseClipboard();
            return Ok(None);
        }

        let ptr = GlobalLock(handle) as *const u16;
        if ptr.is_null() {
            CloseClipboard();
            return Ok(None);
        }

        let mut len = 0usize;
        while *ptr.add(len) != 0 {
            len += 1;
        }
        let text = String::from_utf16_lossy(std::slice::from_raw_parts(ptr, len));

        GlobalUnlock(handle);
        CloseClipboard();
        Ok(Some(text))
    }
}

#[cfg(not(target_os = "windows"))]
fn read_system_clipboard_text() -> Result<Option<String>, ClipboardError> {
    Err(ClipboardError::Unsupported)
}

#[cfg(target_os = "windows")]
fn write_system_clipboard_text(value: &str) -> Result<(), ClipboardError> {
    use windows_sys::Win32::System::DataExchange::{
        CloseClipboard, EmptyClipboard, OpenClipboard, SetClipboardData,
    };
    use windows_sys::Win32::System::Memory::{
        GlobalAlloc, GlobalFree, GlobalLock, GlobalUnlock, GMEM_MOVEABLE,
    };

    const CF_UNICODETEXT: u32 = 13;

    let fail = |message: &str| Err(ClipboardError::Unavailable(message.to_string()));
    let wide: Vec<u16> = value.encode_utf16().chain(std::iter::once(0)).collect();
    let bytes = wide.len() * std::mem::size_of::<u16>();
    unsafe {
        if OpenClipboard(std::ptr::null_mut()) == 0 {
            return fail("failed to open clipboard");
        }
        if EmptyClipboard() == 0 {
            CloseClipboard();
            return fail("failed to clear clipboard");
        }

        let mem = GlobalAlloc(GMEM_MOVEABLE, bytes);
        if mem.is_null() {
            CloseClipboard();
            return fail("failed to allocate clipboard memory");
        }

        let ptr = GlobalLock(mem) as *mut u16;
        if ptr.is_null() {
            GlobalFree(mem);
            CloseClipboard();
            return fail("failed to lock clipboard memory");
        }
        std::ptr::copy_nonoverlapping(wide.as_ptr(), ptr, wide.len());
        GlobalUnlock(mem);

        if SetClipboardData(CF_UNICODETEXT, mem).is_null() {
            GlobalFree(mem);
            CloseClipboard();
            return fail("failed to set clipboard data");
        }

        CloseClipboard();
    }
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn write_system_clipboard_text(_value: &str) -> Result<(), ClipboardError> {
    Err(ClipboardError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::{preview_text, ClipboardHistory};

    #[test]
    fn skips_consecutive_duplicates_and_blank_text() {
        let mut history = ClipboardHistory::new(10, Vec::new());
        assert!(history.record("hello"));
        assert!(!history.record("  hello\r\n"));
        assert!(!history.record("   "));
        assert!(history.record("world"));
        assert!(history.record("hello"));
        let texts: Vec<&str> = history.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "world", "hello"]);
    }

    #[test]
    fn caps_history_length_dropping_oldest() {
        let mut history = ClipboardHistory::new(2, Vec::new());
        history.record("one");
        history.record("two");
        history.record("three");
        let texts: Vec<&str> = history.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["three", "two"]);
    }

    #[test]
    fn sensitive_filter_detects_keywords() {
        let mut history = ClipboardHistory::new(10, vec!["Password".to_string()]);
        assert!(!history.record("my PASSWORD is hidden"));
        assert!(history.record("regular clipboard text"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn preview_is_single_line_and_trimmed() {
        assert_eq!(preview_text("a\nb\nc", 10), "a b c");
        assert_eq!(preview_text("abcdef", 3), "abc");
    }
}
