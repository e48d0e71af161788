#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseEventKind;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;

use crate::domain::models::Event;

pub struct EventsService {
    crossterm_events: EventStream,
    events: mpsc::UnboundedReceiver<Event>,
}

pub fn key_to_event(key: KeyEvent) -> Option<Event> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(Event::KeyboardCTRLC()),
            KeyCode::Char('d') => return Some(Event::UIScrollDown()),
            KeyCode::Char('u') => return Some(Event::UIScrollUp()),
            _ => return None,
        }
    }

    match key.code {
        KeyCode::Backspace => return Some(Event::KeyboardBackspace()),
        KeyCode::Char(c) => return Some(Event::KeyboardChar(c)),
        KeyCode::Down => return Some(Event::KeyboardDown()),
        KeyCode::Enter => return Some(Event::KeyboardEnter()),
        KeyCode::Esc => return Some(Event::KeyboardEsc()),
        KeyCode::PageDown => return Some(Event::UIScrollDown()),
        KeyCode::PageUp => return Some(Event::UIScrollUp()),
        KeyCode::Tab => return Some(Event::KeyboardTab()),
        KeyCode::Up => return Some(Event::KeyboardUp()),
        _ => return None,
    }
}

impl EventsService {
    pub fn new(events: mpsc::UnboundedReceiver<Event>) -> EventsService {
        return EventsService {
            crossterm_events: EventStream::new(),
            events,
        };
    }

    fn handle_crossterm(&self, event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Key(keyevent) => {
                return key_to_event(keyevent);
            }
            CrosstermEvent::Mouse(mouseevent) => match mouseevent.kind {
                MouseEventKind::ScrollUp => return Some(Event::UIScrollUp()),
                MouseEventKind::ScrollDown => return Some(Event::UIScrollDown()),
                _ => return None,
            },
            CrosstermEvent::Resize(_, _) => {
                return Some(Event::UIResize());
            }
            _ => return None,
        }
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            let evt = tokio::select! {
                event = self.events.recv() => event,
                event = self.crossterm_events.next() => match event {
                    Some(Ok(input)) => self.handle_crossterm(input),
                    Some(Err(_)) => None,
                    None => None
                },
                _ = time::sleep(time::Duration::from_millis(500)) => Some(Event::UITick())
            };

            if let Some(event) = evt {
                return Ok(event);
            }
        }
    }
}
