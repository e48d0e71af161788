#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;

use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::Backend;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::ListState;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::ConstellationDetails;
use crate::domain::models::Event;
use crate::domain::models::LoadingPhase;
use crate::domain::models::Role;
use crate::domain::models::POPULAR_CONSTELLATIONS;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;

const TITLE: &str = "✨ Star Buddy ✨";
const FOOTER: &str = "↑/↓ pick  Enter visit  Tab chat  Esc close  CTRL+C quit";

/// Screen regions for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Panes {
    pub header: Rect,
    pub picker: Rect,
    pub content: Rect,
    pub transcript: Option<Rect>,
    pub input: Option<Rect>,
    pub footer: Rect,
}

pub fn panes(area: Rect, chat_open: bool) -> Panes {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let mut body_constraints = vec![Constraint::Length(20), Constraint::Min(1)];
    if chat_open {
        body_constraints.push(Constraint::Percentage(45));
    }
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(body_constraints)
        .split(rows[1]);

    let mut transcript = None;
    let mut input = None;
    if chat_open {
        let chat = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Min(1), Constraint::Length(3)])
            .split(body[2]);
        transcript = Some(chat[0]);
        input = Some(chat[1]);
    }

    return Panes {
        header: rows[0],
        picker: body[0],
        content: body[1],
        transcript,
        input,
        footer: rows[2],
    };
}

fn render_picker(frame: &mut Frame, area: Rect, app_state: &AppState) {
    let items = POPULAR_CONSTELLATIONS
        .iter()
        .map(|name| return ListItem::new(name.to_string()))
        .collect::<Vec<ListItem>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Popular Constellations"),
        )
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .highlight_symbol("★ ");

    let mut state = ListState::default();
    state.select(Some(app_state.picker_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_card(frame: &mut Frame, area: Rect, details: &ConstellationDetails) {
    let mut lines: Vec<Line> = vec![];
    for (label, value) in details.card_fields() {
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(value));
        lines.push(Line::from(""));
    }

    let card = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(details.name.to_string()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(card, area);
}

fn render_content(frame: &mut Frame, area: Rect, app_state: &AppState) {
    if app_state.loading {
        let mut label = app_state.loading_phase.to_string();
        if label.is_empty() {
            label = LoadingPhase::placeholder().to_string();
        }

        let vertical_pad = area.height.saturating_sub(3) / 2;
        let mut lines = vec![Line::from(""); usize::from(vertical_pad)];
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(Color::Yellow),
        )));

        let overlay = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(overlay, area);
        return;
    }

    if let Some(details) = &app_state.selected_constellation {
        render_card(frame, area, details);
        return;
    }

    let hint = Paragraph::new("Pick a constellation and press Enter to travel there!")
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(hint, area);
}

fn render_transcript(frame: &mut Frame, area: Rect, app_state: &AppState) {
    let lines = app_state
        .transcript_lines()
        .into_iter()
        .skip(app_state.scroll.position)
        .take(usize::from(area.height.saturating_sub(2)))
        .map(|(role, text)| {
            let mut style = Style::default();
            if text == role.display_name() {
                style = style.add_modifier(Modifier::BOLD);
            }
            if role == Role::Model {
                style = style.fg(Color::Cyan);
            }
            return Line::from(Span::styled(text, style));
        })
        .collect::<Vec<Line>>();

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Chat with Star Buddy"),
        ),
        area,
    );

    let mut scrollbar_state = app_state.scroll.scrollbar_state.clone();
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        area.inner(&Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scrollbar_state,
    );
}

fn render_input(frame: &mut Frame, area: Rect, app_state: &AppState) {
    let mut title = "Ask Star Buddy";
    if app_state.waiting_for_reply {
        title = "Star Buddy is thinking...";
    }

    frame.render_widget(
        Paragraph::new(format!("{}▏", app_state.pending_input))
            .block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

/// Draws the whole screen from `app_state`. Reads state only.
pub fn render(frame: &mut Frame, app_state: &AppState) {
    let panes = panes(frame.size(), app_state.chat_open);

    frame.render_widget(
        Paragraph::new(TITLE)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL)),
        panes.header,
    );

    render_picker(frame, panes.picker, app_state);
    render_content(frame, panes.content, app_state);

    if let Some(transcript) = panes.transcript {
        render_transcript(frame, transcript, app_state);
    }
    if let Some(input) = panes.input {
        render_input(frame, input, app_state);
    }

    frame.render_widget(
        Paragraph::new(FOOTER).style(Style::default().fg(Color::DarkGray)),
        panes.footer,
    );
}

/// Applies one event to `app_state`. Returns the action to dispatch, if any,
/// and whether the loop should exit.
pub fn handle_event(app_state: &mut AppState, event: Event) -> (Option<Action>, bool) {
    let mut action = None;

    match event {
        Event::KeyboardCTRLC() => {
            return (None, true);
        }
        Event::KeyboardTab() => {
            app_state.toggle_chat_panel();
        }
        Event::KeyboardEsc() => {
            if app_state.chat_open {
                app_state.toggle_chat_panel();
            } else {
                app_state.dismiss_constellation();
            }
        }
        Event::KeyboardEnter() => {
            if app_state.chat_open {
                action = app_state.send_chat_message();
            } else {
                action = app_state.select_highlighted();
            }
        }
        Event::KeyboardChar(c) => {
            if app_state.chat_open {
                app_state.input_char(c);
            }
        }
        Event::KeyboardBackspace() => {
            if app_state.chat_open {
                app_state.input_backspace();
            }
        }
        Event::KeyboardUp() => {
            if app_state.chat_open {
                app_state.scroll.up();
            } else {
                app_state.picker_prev();
            }
        }
        Event::KeyboardDown() => {
            if app_state.chat_open {
                app_state.scroll.down();
            } else {
                app_state.picker_next();
            }
        }
        Event::UIScrollUp() => {
            app_state.scroll.up();
        }
        Event::UIScrollDown() => {
            app_state.scroll.down();
        }
        Event::LoadingPhaseElapsed(seq) => {
            app_state.handle_loading_phase_elapsed(seq);
        }
        Event::ConstellationResolved(seq, details) => {
            app_state.handle_constellation_response(seq, details);
        }
        Event::ConstellationFailed(seq) => {
            app_state.handle_constellation_failure(seq);
        }
        Event::ChatReplyResolved(seq, reply) => {
            app_state.handle_chat_reply(seq, reply);
        }
        Event::ChatReplyFailed(seq) => {
            app_state.handle_chat_failure(seq);
        }
        Event::UIResize() | Event::UITick() => (),
    }

    return (action, false);
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(rx);

    loop {
        let panes = panes(terminal.size()?, app_state.chat_open);
        if let Some(transcript) = panes.transcript {
            let inner = transcript.inner(&Margin {
                vertical: 1,
                horizontal: 1,
            });
            if inner.width != app_state.last_known_width
                || inner.height != app_state.last_known_height
            {
                app_state.set_rect(inner);
            }
        }

        terminal.draw(|frame| {
            render(frame, app_state);
        })?;

        let event = events.next().await?;
        let (action, exit) = handle_event(app_state, event);
        if exit {
            break;
        }

        if let Some(action) = action {
            tx.send(action)?;
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;
    let mut app_state = AppState::default();

    start_loop(&mut terminal, &mut app_state, tx, rx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
