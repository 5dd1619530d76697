use std::rc::Rc;

use quicklaunch_core::capture::CaptureSignal;
use quicklaunch_core::clipboard_history::{
    ClipboardAccess, ClipboardChange, ClipboardError, ClipboardHistory, ClipboardView,
    SharedClipboardHistory,
};
use quicklaunch_core::hotkey::HotkeyAction;
use quicklaunch_core::input_router::{EngineFailure, InputRouter};
use quicklaunch_core::keys::Key;
use quicklaunch_core::model::{Item, ItemKind};
use quicklaunch_core::runtime::{handle_event, parse_shell_command, ShellCommand, UiEvent};
use quicklaunch_core::selectable_list::SelectableList;
use quicklaunch_core::surface::RecordingSurface;
use quicklaunch_core::view::Followup;
use quicklaunch_core::visibility::VisibilityController;

type TestRouter = InputRouter<RecordingSurface, Vec<EngineFailure>>;

struct NullClipboard;

impl ClipboardAccess for NullClipboard {
    fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        Ok(None)
    }

    fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Ok(())
    }
}

fn router_with_clipboard_entry(history: &SharedClipboardHistory) -> TestRouter {
    let view_history = Rc::clone(history);
    let home = SelectableList::new(
        "Home",
        vec![Item::new("Clipboard History", ItemKind::Command).with_action(move || {
            Ok(Followup::Push(Box::new(ClipboardView::new(
                Rc::clone(&view_history),
                Rc::new(NullClipboard),
            ))))
        })],
    );
    InputRouter::new(
        Box::new(home),
        VisibilityController::default(),
        RecordingSurface::default(),
        Vec::new(),
    )
}

fn shell(router: &mut TestRouter, history: &SharedClipboardHistory, line: &str) -> bool {
    let command = parse_shell_command(line).unwrap();
    handle_event(router, history, UiEvent::Shell(command))
}

#[test]
fn hotkey_signal_toggles_the_window() {
    let history = ClipboardHistory::new(10, Vec::new()).shared();
    let mut router = router_with_clipboard_entry(&history);

    assert!(handle_event(
        &mut router,
        &history,
        CaptureSignal::Chord(HotkeyAction::ToggleWindow).into()
    ));
    assert!(router.surface().visible);
    assert!(handle_event(
        &mut router,
        &history,
        CaptureSignal::Chord(HotkeyAction::ToggleWindow).into()
    ));
    assert!(!router.surface().visible);
}

#[test]
fn lost_capture_is_reported_and_loop_continues() {
    let history = ClipboardHistory::new(10, Vec::new()).shared();
    let mut router = router_with_clipboard_entry(&history);

    let event: UiEvent = CaptureSignal::Unavailable("hook removed".to_string()).into();
    assert!(handle_event(&mut router, &history, event));
    assert_eq!(router.failures().len(), 1);
}

#[test]
fn clipboard_changes_refresh_the_open_clipboard_view() {
    let history = ClipboardHistory::new(10, Vec::new()).shared();
    let mut router = router_with_clipboard_entry(&history);

    handle_event(&mut router, &history, ClipboardChange("one".into()).into());
    assert!(shell(&mut router, &history, "toggle"));
    assert!(shell(&mut router, &history, "enter"));
    assert_eq!(router.surface().title, "Clipboard History");
    assert_eq!(router.surface().rows, vec!["one"]);

    handle_event(&mut router, &history, ClipboardChange("two".into()).into());
    assert_eq!(router.surface().rows, vec!["two", "one"]);

    assert!(shell(&mut router, &history, "type tw"));
    assert_eq!(router.surface().rows, vec!["two"]);
    handle_event(&mut router, &history, ClipboardChange("three".into()).into());
    assert_eq!(router.query().text(), "tw");
    assert_eq!(router.surface().rows, vec!["two"]);
    assert_eq!(history.borrow().len(), 3);
}

#[test]
fn shell_commands_drive_keys_and_quit() {
    let history = ClipboardHistory::new(10, Vec::new()).shared();
    let mut router = router_with_clipboard_entry(&history);

    assert!(shell(&mut router, &history, "toggle"));
    assert!(shell(&mut router, &history, "type clip"));
    assert_eq!(router.query().text(), "clip");
    assert!(shell(&mut router, &history, "esc"));
    assert_eq!(router.query().text(), "");
    assert!(shell(&mut router, &history, "blur"));
    assert!(!router.surface().visible);
    assert!(shell(&mut router, &history, "no-such-command"));
    assert_eq!(
        parse_shell_command("key f5"),
        Some(ShellCommand::Key(Key::Function(5)))
    );

    assert!(!shell(&mut router, &history, "quit"));
    assert!(!handle_event(&mut router, &history, UiEvent::InputClosed));
}
