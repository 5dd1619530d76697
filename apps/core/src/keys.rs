use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Logical key symbol shared by the global chord matcher and the search field
/// router. Letters are stored lowercase so `Char('a')` and `Char('A')` name
/// the same physical key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Char(char),
    Space,
    Enter,
    Escape,
    Backspace,
    Tab,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Function(u8),
    Ctrl,
    Alt,
    Shift,
    Meta,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key name: {0}")]
pub struct UnknownKey(pub String);

impl Key {
    pub fn character(c: char) -> Self {
        if c == ' ' {
            return Self::Space;
        }
        Self::Char(c.to_lowercase().next().unwrap_or(c))
    }

    /// Lenient lookup used for raw input: names that do not map to a known
    /// key become `Key::Other` instead of failing.
    pub fn from_name(name: &str) -> Self {
        name.parse()
            .unwrap_or_else(|_| Self::Other(name.trim().to_string()))
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Ctrl | Self::Alt | Self::Shift | Self::Meta)
    }
}

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let raw = input.trim();
        let mut chars = raw.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if !c.is_control() {
                return Ok(Self::character(c));
            }
        }

        let lowered = raw.to_ascii_lowercase();
        let key = match lowered.as_str() {
            "space" => Self::Space,
            "enter" | "return" => Self::Enter,
            "escape" | "esc" => Self::Escape,
            "backspace" => Self::Backspace,
            "tab" => Self::Tab,
            "delete" | "del" => Self::Delete,
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "home" => Self::Home,
            "end" => Self::End,
            "pageup" | "pgup" => Self::PageUp,
            "pagedown" | "pgdn" => Self::PageDown,
            "ctrl" | "control" => Self::Ctrl,
            "alt" | "option" | "opt" => Self::Alt,
            "shift" => Self::Shift,
            "meta" | "cmd" | "command" | "super" | "win" | "windows" => Self::Meta,
            other => {
                let number = other
                    .strip_prefix('f')
                    .and_then(|n| n.parse::<u8>().ok())
                    .filter(|n| (1..=24).contains(n));
                match number {
                    Some(n) => Self::Function(n),
                    None => return Err(UnknownKey(raw.to_string())),
                }
            }
        };
        Ok(key)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{}", c.to_uppercase()),
            Self::Space => write!(f, "Space"),
            Self::Enter => write!(f, "Enter"),
            Self::Escape => write!(f, "Escape"),
            Self::Backspace => write!(f, "Backspace"),
            Self::Tab => write!(f, "Tab"),
            Self::Delete => write!(f, "Delete"),
            Self::Up => write!(f, "Up"),
            Self::Down => write!(f, "Down"),
            Self::Left => write!(f, "Left"),
            Self::Right => write!(f, "Right"),
            Self::Home => write!(f, "Home"),
            Self::End => write!(f, "End"),
            Self::PageUp => write!(f, "PageUp"),
            Self::PageDown => write!(f, "PageDown"),
            Self::Function(n) => write!(f, "F{n}"),
            Self::Ctrl => write!(f, "Ctrl"),
            Self::Alt => write!(f, "Alt"),
            Self::Shift => write!(f, "Shift"),
            Self::Meta => write!(f, "Meta"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// A key press delivered by the toolkit while the search field has focus.
/// `text` carries whatever characters the toolkit would insert for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub text: Option<String>,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self { key, text: None }
    }

    pub fn typed(c: char) -> Self {
        Self {
            key: Key::character(c),
            text: Some(c.to_string()),
        }
    }

    pub fn is_printable(&self) -> bool {
        self.text
            .as_deref()
            .is_some_and(|text| !text.is_empty() && text.chars().all(|c| !c.is_control()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Down,
    Up,
}

/// OS-level key transition observed by the capture thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub key: Key,
    pub state: KeyState,
}

impl RawKeyEvent {
    pub fn down(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Down,
        }
    }

    pub fn up(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Up,
        }
    }
}
