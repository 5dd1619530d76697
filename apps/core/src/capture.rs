use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use tracing::{debug, info, warn};

use crate::chord::ChordMatcher;
use crate::hotkey::HotkeyAction;
use crate::keys::{Key, RawKeyEvent};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("global key capture is not supported on this platform")]
    UnsupportedPlatform,
    #[error("failed to install keyboard hook: {0}")]
    HookInstall(String),
    #[error("key event loop failed: {0}")]
    EventLoop(String),
}

/// What the capture thread tells the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSignal {
    Chord(HotkeyAction),
    /// Capture stopped and will not resume.
    Unavailable(String),
}

pub type KeySink = Box<dyn FnMut(RawKeyEvent) + Send>;

/// Delivers every global key press and release to `sink` until the source
/// stops. Runs on the capture thread and blocks it.
pub trait RawKeySource: Send {
    fn run(self: Box<Self>, sink: KeySink) -> Result<(), CaptureError>;
}

/// Replays a fixed event sequence, then optionally fails.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeySource {
    events: Vec<RawKeyEvent>,
    failure: Option<CaptureError>,
}

impl ScriptedKeySource {
    pub fn new(events: Vec<RawKeyEvent>) -> Self {
        Self {
            events,
            failure: None,
        }
    }

    pub fn failing_after(events: Vec<RawKeyEvent>, error: CaptureError) -> Self {
        Self {
            events,
            failure: Some(error),
        }
    }
}

impl RawKeySource for ScriptedKeySource {
    fn run(self: Box<Self>, mut sink: KeySink) -> Result<(), CaptureError> {
        for event in self.events {
            sink(event);
        }
        match self.failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Source for platforms without a global keyboard hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableKeySource;

impl RawKeySource for UnavailableKeySource {
    fn run(self: Box<Self>, _sink: KeySink) -> Result<(), CaptureError> {
        Err(CaptureError::UnsupportedPlatform)
    }
}

pub fn default_key_source() -> Box<dyn RawKeySource> {
    #[cfg(target_os = "windows")]
    {
        Box::new(windows_hook::LowLevelHookSource)
    }

    #[cfg(not(target_os = "windows"))]
    {
        Box::new(UnavailableKeySource)
    }
}

/// Runs `source` on a dedicated thread that owns `matcher`. Each matched
/// chord is sent as `CaptureSignal::Chord`; when the source ends, for any
/// reason, a single `CaptureSignal::Unavailable` follows.
pub fn spawn_capture<E>(
    source: Box<dyn RawKeySource>,
    mut matcher: ChordMatcher<HotkeyAction>,
    events: Sender<E>,
) -> std::io::Result<JoinHandle<()>>
where
    E: From<CaptureSignal> + Send + 'static,
{
    std::thread::Builder::new()
        .name("hotkey-capture".to_string())
        .spawn(move || {
            info!(chords = matcher.chord_count(), "hotkey capture started");
            let chord_events = events.clone();
            let sink: KeySink = Box::new(move |event| {
                for action in matcher.observe(&event) {
                    debug!(?action, "chord matched");
                    let _ = chord_events.send(E::from(CaptureSignal::Chord(action)));
                }
            });

            let reason = match source.run(sink) {
                Ok(()) => "key source stopped".to_string(),
                Err(error) => error.to_string(),
            };
            warn!(%reason, "hotkey capture ended");
            let _ = events.send(E::from(CaptureSignal::Unavailable(reason)));
        })
}

/// Maps a Windows virtual-key code. Left and right modifier variants share
/// one key.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn key_from_virtual_key(vk: u32) -> Key {
    match vk {
        0x08 => Key::Backspace,
        0x09 => Key::Tab,
        0x0D => Key::Enter,
        0x10 | 0xA0 | 0xA1 => Key::Shift,
        0x11 | 0xA2 | 0xA3 => Key::Ctrl,
        0x12 | 0xA4 | 0xA5 => Key::Alt,
        0x1B => Key::Escape,
        0x20 => Key::Space,
        0x21 => Key::PageUp,
        0x22 => Key::PageDown,
        0x23 => Key::End,
        0x24 => Key::Home,
        0x25 => Key::Left,
        0x26 => Key::Up,
        0x27 => Key::Right,
        0x28 => Key::Down,
        0x2E => Key::Delete,
        0x30..=0x39 | 0x41..=0x5A => match char::from_u32(vk) {
            Some(c) => Key::character(c),
            None => Key::Other(format!("vk{vk:#04x}")),
        },
        0x5B | 0x5C => Key::Meta,
        0x70..=0x87 => Key::Function((vk - 0x70 + 1) as u8),
        _ => Key::Other(format!("vk{vk:#04x}")),
    }
}

#[cfg(target_os = "windows")]
mod windows_hook {
    use std::cell::RefCell;

    use windows_sys::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
    use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        CallNextHookEx, DispatchMessageW, GetMessageW, SetWindowsHookExW, TranslateMessage,
        UnhookWindowsHookEx, KBDLLHOOKSTRUCT, MSG, WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP,
        WM_SYSKEYDOWN, WM_SYSKEYUP,
    };

    use super::{key_from_virtual_key, CaptureError, KeySink, RawKeySource};
    use crate::keys::{KeyState, RawKeyEvent};

    thread_local! {
        static SINK: RefCell<Option<KeySink>> = RefCell::new(None);
    }

    /// `WH_KEYBOARD_LL` hook observing every key without consuming it.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LowLevelHookSource;

    impl RawKeySource for LowLevelHookSource {
        fn run(self: Box<Self>, sink: KeySink) -> Result<(), CaptureError> {
            SINK.with(|slot| *slot.borrow_mut() = Some(sink));

            let module = unsafe { GetModuleHandleW(std::ptr::null()) };
            let hook = unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(hook_proc), module, 0) };
            if hook.is_null() {
                SINK.with(|slot| slot.borrow_mut().take());
                return Err(CaptureError::HookInstall(
                    "SetWindowsHookExW returned null".to_string(),
                ));
            }

            let result = pump_messages();
            unsafe {
                UnhookWindowsHookEx(hook);
            }
            SINK.with(|slot| slot.borrow_mut().take());
            result
        }
    }

    fn pump_messages() -> Result<(), CaptureError> {
        let mut msg: MSG = unsafe { std::mem::zeroed() };
        loop {
            let status = unsafe { GetMessageW(&mut msg, std::ptr::null_mut(), 0, 0) };
            if status == -1 {
                return Err(CaptureError::EventLoop("GetMessageW returned -1".to_string()));
            }
            if status == 0 {
                return Ok(());
            }
            unsafe {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    unsafe extern "system" fn hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
        if code >= 0 {
            let state = match wparam as u32 {
                WM_KEYDOWN | WM_SYSKEYDOWN => Some(KeyState::Down),
                WM_KEYUP | WM_SYSKEYUP => Some(KeyState::Up),
                _ => None,
            };
            if let Some(state) = state {
                let info = &*(lparam as *const KBDLLHOOKSTRUCT);
                let event = RawKeyEvent {
                    key: key_from_virtual_key(info.vkCode),
                    state,
                };
                SINK.with(|slot| {
                    if let Ok(mut slot) = slot.try_borrow_mut() {
                        if let Some(sink) = slot.as_mut() {
                            sink(event);
                        }
                    }
                });
            }
        }
        CallNextHookEx(std::ptr::null_mut(), code, wparam, lparam)
    }
}

#[cfg(test)]
mod tests {
    use super::key_from_virtual_key;
    use crate::keys::Key;

    #[test]
    fn virtual_keys_map_to_portable_keys() {
        assert_eq!(key_from_virtual_key(0x41), Key::Char('a'));
        assert_eq!(key_from_virtual_key(0x35), Key::Char('5'));
        assert_eq!(key_from_virtual_key(0x20), Key::Space);
        assert_eq!(key_from_virtual_key(0xA2), Key::Ctrl);
        assert_eq!(key_from_virtual_key(0xA5), Key::Alt);
        assert_eq!(key_from_virtual_key(0x5C), Key::Meta);
        assert_eq!(key_from_virtual_key(0x70), Key::Function(1));
        assert_eq!(key_from_virtual_key(0x87), Key::Function(24));
        assert!(matches!(key_from_virtual_key(0xFF), Key::Other(_)));
    }
}
