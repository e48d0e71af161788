#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use ratatui::prelude::Rect;

use super::Scroll;
use crate::domain::models::Action;
use crate::domain::models::ChatMessage;
use crate::domain::models::ConstellationDetails;
use crate::domain::models::LoadingPhase;
use crate::domain::models::Role;
use crate::domain::models::POPULAR_CONSTELLATIONS;

/// Everything the screen shows. Owned by the UI loop; each transition either
/// settles locally or hands back the `Action` the caller has to dispatch.
pub struct AppState {
    pub selected_constellation: Option<ConstellationDetails>,
    pub loading: bool,
    pub loading_phase: String,
    pub chat_open: bool,
    pub messages: Vec<ChatMessage>,
    pub pending_input: String,
    pub waiting_for_reply: bool,
    pub picker_index: usize,
    pub scroll: Scroll,
    pub last_known_width: u16,
    pub last_known_height: u16,
    select_seq: u64,
    chat_seq: u64,
}

impl Default for AppState {
    fn default() -> AppState {
        return AppState {
            selected_constellation: None,
            loading: false,
            loading_phase: "".to_string(),
            chat_open: false,
            messages: vec![ChatMessage::welcome()],
            pending_input: "".to_string(),
            waiting_for_reply: false,
            picker_index: 0,
            scroll: Scroll::default(),
            last_known_width: 0,
            last_known_height: 0,
            select_seq: 0,
            chat_seq: 0,
        };
    }
}

impl AppState {
    pub fn select_constellation(&mut self, name: &str) -> Option<Action> {
        if self.loading || name.trim().is_empty() {
            return None;
        }

        self.loading = true;
        self.loading_phase = LoadingPhase::Charting.label().to_string();
        self.select_seq += 1;

        tracing::debug!(seq = self.select_seq, name = name, "selecting constellation");
        return Some(Action::DescribeConstellation(
            self.select_seq,
            name.to_string(),
        ));
    }

    pub fn select_highlighted(&mut self) -> Option<Action> {
        return self.select_constellation(POPULAR_CONSTELLATIONS[self.picker_index]);
    }

    pub fn handle_loading_phase_elapsed(&mut self, seq: u64) {
        if !self.loading || seq != self.select_seq {
            return;
        }

        self.loading_phase = LoadingPhase::Painting.label().to_string();
    }

    pub fn handle_constellation_response(
        &mut self,
        seq: u64,
        details: Option<ConstellationDetails>,
    ) {
        if seq != self.select_seq {
            tracing::debug!(seq = seq, latest = self.select_seq, "discarding stale constellation");
            return;
        }

        if let Some(details) = details {
            self.selected_constellation = Some(details);
        }

        self.loading = false;
        self.loading_phase = "".to_string();
    }

    pub fn handle_constellation_failure(&mut self, seq: u64) {
        tracing::error!(seq = seq, "constellation request failed");
        self.handle_constellation_response(seq, None);
    }

    pub fn dismiss_constellation(&mut self) {
        self.selected_constellation = None;
    }

    pub fn picker_next(&mut self) {
        self.picker_index = (self.picker_index + 1) % POPULAR_CONSTELLATIONS.len();
    }

    pub fn picker_prev(&mut self) {
        self.picker_index = self
            .picker_index
            .checked_sub(1)
            .unwrap_or(POPULAR_CONSTELLATIONS.len() - 1);
    }

    pub fn toggle_chat_panel(&mut self) {
        self.chat_open = !self.chat_open;
        self.sync_dependants();
    }

    pub fn open_chat_panel(&mut self) {
        self.chat_open = true;
        self.sync_dependants();
    }

    pub fn input_char(&mut self, c: char) {
        self.pending_input.push(c);
    }

    pub fn input_backspace(&mut self) {
        self.pending_input.pop();
    }

    pub fn send_chat_message(&mut self) -> Option<Action> {
        if self.waiting_for_reply || self.pending_input.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.pending_input);
        let history = self.messages.clone();
        self.add_message(ChatMessage::new(Role::User, &text));

        self.waiting_for_reply = true;
        self.chat_seq += 1;

        return Some(Action::ContinueChat(self.chat_seq, history, text));
    }

    pub fn handle_chat_reply(&mut self, seq: u64, reply: Option<String>) {
        if seq != self.chat_seq {
            tracing::debug!(seq = seq, latest = self.chat_seq, "discarding stale chat reply");
            return;
        }

        self.add_message(ChatMessage::reply_or_fallback(reply));
        self.waiting_for_reply = false;
    }

    pub fn handle_chat_failure(&mut self, seq: u64) {
        tracing::error!(seq = seq, "chat request failed");
        if seq == self.chat_seq {
            self.waiting_for_reply = false;
        }
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.sync_dependants();
    }

    /// Transcript rendered as display lines for the last known panel width.
    pub fn transcript_lines(&self) -> Vec<(Role, String)> {
        let width = usize::from(self.last_known_width).max(1);
        let mut lines: Vec<(Role, String)> = vec![];

        for message in self.messages.iter() {
            lines.push((message.role, message.role.display_name().to_string()));
            for line in message.as_string_lines(width) {
                lines.push((message.role, line));
            }
            lines.push((message.role, "".to_string()));
        }

        return lines;
    }

    /// Keeps scroll bounds in step with the transcript and pins the view to the
    /// newest message.
    fn sync_dependants(&mut self) {
        self.scroll.set_state(
            self.transcript_lines().len(),
            usize::from(self.last_known_height),
        );
        self.scroll.last();
    }
}
