use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyEventState;
use crossterm::event::KeyModifiers;

use super::key_to_event;
use crate::domain::models::Event;

fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    return KeyEvent::new(code, modifiers);
}

#[test]
fn it_maps_typing_keys() {
    assert_eq!(
        key_to_event(key(KeyCode::Char('o'), KeyModifiers::NONE)),
        Some(Event::KeyboardChar('o'))
    );
    assert_eq!(
        key_to_event(key(KeyCode::Char('O'), KeyModifiers::SHIFT)),
        Some(Event::KeyboardChar('O'))
    );
    assert_eq!(
        key_to_event(key(KeyCode::Backspace, KeyModifiers::NONE)),
        Some(Event::KeyboardBackspace())
    );
    assert_eq!(
        key_to_event(key(KeyCode::Enter, KeyModifiers::NONE)),
        Some(Event::KeyboardEnter())
    );
}

#[test]
fn it_maps_control_keys() {
    assert_eq!(
        key_to_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        Some(Event::KeyboardCTRLC())
    );
    assert_eq!(
        key_to_event(key(KeyCode::Char('u'), KeyModifiers::CONTROL)),
        Some(Event::UIScrollUp())
    );
    assert_eq!(
        key_to_event(key(KeyCode::Char('x'), KeyModifiers::CONTROL)),
        None
    );
}

#[test]
fn it_ignores_key_releases() {
    let release = KeyEvent {
        code: KeyCode::Enter,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Release,
        state: KeyEventState::NONE,
    };
    assert_eq!(key_to_event(release), None);
}
