use anyhow::Result;
use test_utils::constellation_fixture;

use super::AppState;
use crate::domain::models::Action;
use crate::domain::models::ChatMessage;
use crate::domain::models::ConstellationDetails;
use crate::domain::models::LoadingPhase;
use crate::domain::models::Role;
use crate::domain::models::FALLBACK_REPLY;

fn orion() -> ConstellationDetails {
    return serde_json::from_value(constellation_fixture()).unwrap();
}

mod select_constellation {
    use super::*;

    #[test]
    fn it_enters_the_first_loading_phase() {
        let mut app_state = AppState::default();
        let action = app_state.select_constellation("Orion");

        assert_eq!(
            action,
            Some(Action::DescribeConstellation(1, "Orion".to_string()))
        );
        assert!(app_state.loading);
        assert_eq!(app_state.loading_phase, "Consulting the star charts...");
    }

    #[test]
    fn it_rejects_selection_while_loading() {
        let mut app_state = AppState::default();
        app_state.select_constellation("Orion");
        let action = app_state.select_constellation("Leo");

        assert_eq!(action, None);
        assert_eq!(app_state.select_seq, 1);
    }

    #[test]
    fn it_rejects_blank_names() {
        let mut app_state = AppState::default();
        assert_eq!(app_state.select_constellation("   "), None);
        assert!(!app_state.loading);
    }

    #[test]
    fn it_selects_the_highlighted_constellation() {
        let mut app_state = AppState::default();
        app_state.picker_next();
        app_state.picker_next();

        assert_eq!(
            app_state.select_highlighted(),
            Some(Action::DescribeConstellation(1, "Cassiopeia".to_string()))
        );
    }

    #[test]
    fn it_wraps_the_picker() {
        let mut app_state = AppState::default();
        app_state.picker_prev();
        assert_eq!(app_state.picker_index, 5);

        app_state.picker_next();
        assert_eq!(app_state.picker_index, 0);
    }

    #[test]
    fn it_switches_to_the_painting_label() {
        let mut app_state = AppState::default();
        app_state.select_constellation("Orion");
        app_state.handle_loading_phase_elapsed(1);

        assert!(app_state.loading);
        assert_eq!(app_state.loading_phase, LoadingPhase::Painting.label());
    }

    #[test]
    fn it_ignores_the_timer_after_resolution() {
        let mut app_state = AppState::default();
        app_state.select_constellation("Orion");
        app_state.handle_constellation_response(1, Some(orion()));
        app_state.handle_loading_phase_elapsed(1);

        assert!(!app_state.loading);
        assert_eq!(app_state.loading_phase, "");
    }

    #[test]
    fn it_ignores_timers_from_earlier_selections() {
        let mut app_state = AppState::default();
        app_state.select_constellation("Orion");
        app_state.handle_constellation_response(1, None);
        app_state.select_constellation("Leo");
        app_state.handle_loading_phase_elapsed(1);

        assert_eq!(app_state.loading_phase, LoadingPhase::Charting.label());
    }

    #[test]
    fn it_shows_the_resolved_constellation() {
        let mut app_state = AppState::default();
        app_state.select_constellation("Orion");
        app_state.handle_constellation_response(1, Some(orion()));

        assert!(!app_state.loading);
        assert_eq!(app_state.loading_phase, "");
        assert_eq!(app_state.selected_constellation, Some(orion()));
    }

    #[test]
    fn it_returns_to_idle_without_a_card_when_absent() {
        let mut app_state = AppState::default();
        app_state.select_constellation("Orion");
        app_state.handle_constellation_response(1, None);

        assert!(!app_state.loading);
        assert_eq!(app_state.loading_phase, "");
        assert_eq!(app_state.selected_constellation, None);
        assert_eq!(app_state.messages.len(), 1);
    }

    #[test]
    fn it_keeps_the_previous_card_when_absent() {
        let mut app_state = AppState::default();
        app_state.select_constellation("Orion");
        app_state.handle_constellation_response(1, Some(orion()));
        app_state.select_constellation("Leo");
        app_state.handle_constellation_response(2, None);

        assert_eq!(app_state.selected_constellation, Some(orion()));
    }

    #[test]
    fn it_discards_stale_responses() -> Result<()> {
        let mut app_state = AppState::default();
        app_state.select_constellation("Orion");
        app_state.handle_constellation_response(1, None);
        app_state.select_constellation("Leo");

        app_state.handle_constellation_response(1, Some(orion()));
        assert!(app_state.loading);
        assert_eq!(app_state.selected_constellation, None);

        let leo: ConstellationDetails = serde_json::from_str(
            r#"{"name":"Leo","myth":"A lion.","funFact":"Regulus!","bestSeen":"Spring","starCount":9}"#,
        )?;
        app_state.handle_constellation_response(2, Some(leo.clone()));
        assert!(!app_state.loading);
        assert_eq!(app_state.selected_constellation, Some(leo));

        return Ok(());
    }

    #[test]
    fn it_resets_loading_on_failure() {
        let mut app_state = AppState::default();
        app_state.select_constellation("Orion");
        app_state.handle_constellation_failure(1);

        assert!(!app_state.loading);
        assert_eq!(app_state.loading_phase, "");
        assert!(app_state.select_constellation("Orion").is_some());
    }

    #[test]
    fn it_dismisses_the_card() {
        let mut app_state = AppState::default();
        app_state.select_constellation("Orion");
        app_state.handle_constellation_response(1, Some(orion()));
        app_state.dismiss_constellation();

        assert_eq!(app_state.selected_constellation, None);
    }
}

mod chat {
    use super::*;

    fn type_text(app_state: &mut AppState, text: &str) {
        for c in text.chars() {
            app_state.input_char(c);
        }
    }

    #[test]
    fn it_seeds_the_welcome_message() {
        let app_state = AppState::default();
        assert_eq!(app_state.messages, vec![ChatMessage::welcome()]);
    }

    #[test]
    fn it_edits_the_input_buffer() {
        let mut app_state = AppState::default();
        type_text(&mut app_state, "Leoo");
        app_state.input_backspace();

        assert_eq!(app_state.pending_input, "Leo");
    }

    #[test]
    fn it_rejects_blank_input() {
        let mut app_state = AppState::default();
        type_text(&mut app_state, "   ");
        let action = app_state.send_chat_message();

        assert_eq!(action, None);
        assert_eq!(app_state.pending_input, "   ");
        assert_eq!(app_state.messages.len(), 1);
        assert!(!app_state.waiting_for_reply);
    }

    #[test]
    fn it_resends_messages_exactly_as_typed() {
        let mut app_state = AppState::default();
        type_text(&mut app_state, "Is\tOrion big?");
        let first = app_state.send_chat_message();
        assert_eq!(
            first,
            Some(Action::ContinueChat(
                1,
                vec![ChatMessage::welcome()],
                "Is\tOrion big?".to_string()
            ))
        );
        app_state.handle_chat_reply(1, Some("Very big!".to_string()));
        type_text(&mut app_state, "Thanks");
        let Some(Action::ContinueChat(_, history, _)) = app_state.send_chat_message() else {
            panic!("expected a chat action");
        };

        assert_eq!(history[1].text, "Is\tOrion big?");
    }

    #[test]
    fn it_sends_prior_history_separately() {
        let mut app_state = AppState::default();
        app_state.messages = vec![ChatMessage::new(Role::Model, "Hi!")];
        type_text(&mut app_state, "What is Orion?");

        let action = app_state.send_chat_message();

        assert_eq!(
            action,
            Some(Action::ContinueChat(
                1,
                vec![ChatMessage::new(Role::Model, "Hi!")],
                "What is Orion?".to_string()
            ))
        );
        assert_eq!(app_state.pending_input, "");
        assert!(app_state.waiting_for_reply);
        assert_eq!(
            app_state.messages.last(),
            Some(&ChatMessage::new(Role::User, "What is Orion?"))
        );
    }

    #[test]
    fn it_appends_the_reply() {
        let mut app_state = AppState::default();
        app_state.messages = vec![ChatMessage::new(Role::Model, "Hi!")];
        type_text(&mut app_state, "What is Orion?");
        app_state.send_chat_message();
        app_state.handle_chat_reply(1, Some("A hunter in the sky!".to_string()));

        assert_eq!(
            app_state.messages,
            vec![
                ChatMessage::new(Role::Model, "Hi!"),
                ChatMessage::new(Role::User, "What is Orion?"),
                ChatMessage::new(Role::Model, "A hunter in the sky!"),
            ]
        );
        assert_eq!(app_state.pending_input, "");
        assert!(!app_state.waiting_for_reply);
    }

    #[test]
    fn it_appends_the_fallback_when_absent() {
        let mut app_state = AppState::default();
        type_text(&mut app_state, "What is Orion?");
        app_state.send_chat_message();
        app_state.handle_chat_reply(1, None);

        assert_eq!(app_state.messages.len(), 3);
        assert_eq!(
            app_state.messages.last(),
            Some(&ChatMessage::new(Role::Model, FALLBACK_REPLY))
        );
    }

    #[test]
    fn it_rejects_sending_while_awaiting_a_reply() {
        let mut app_state = AppState::default();
        type_text(&mut app_state, "First");
        app_state.send_chat_message();
        type_text(&mut app_state, "Second");

        assert_eq!(app_state.send_chat_message(), None);
        assert_eq!(app_state.pending_input, "Second");
        assert_eq!(app_state.messages.len(), 2);
    }

    #[test]
    fn it_appends_nothing_on_failure() {
        let mut app_state = AppState::default();
        type_text(&mut app_state, "What is Orion?");
        app_state.send_chat_message();
        app_state.handle_chat_failure(1);

        assert_eq!(app_state.messages.len(), 2);
        assert!(!app_state.waiting_for_reply);
    }

    #[test]
    fn it_discards_stale_replies() {
        let mut app_state = AppState::default();
        type_text(&mut app_state, "What is Orion?");
        app_state.send_chat_message();
        app_state.handle_chat_reply(7, Some("Late!".to_string()));

        assert_eq!(app_state.messages.len(), 2);
        assert!(app_state.waiting_for_reply);
    }

    #[test]
    fn it_grows_the_transcript_by_two_per_message() {
        let mut app_state = AppState::default();
        for (idx, text) in ["Hi", "What is Leo?", "Thanks!"].iter().enumerate() {
            let before = app_state.messages.len();
            type_text(&mut app_state, text);
            app_state.send_chat_message();
            app_state.handle_chat_reply(idx as u64 + 1, None);

            assert_eq!(app_state.messages.len(), before + 2);
        }
    }
}

mod scrolling {
    use ratatui::prelude::Rect;

    use super::*;

    #[test]
    fn it_scrolls_to_the_newest_message() {
        let mut app_state = AppState::default();
        app_state.set_rect(Rect::new(0, 0, 20, 4));
        app_state.add_message(ChatMessage::new(Role::User, "Tell me about the stars"));

        let lines = app_state.transcript_lines().len();
        assert_eq!(app_state.scroll.position, lines - 4);
    }

    #[test]
    fn it_scrolls_to_the_newest_message_when_the_panel_toggles() {
        let mut app_state = AppState::default();
        app_state.set_rect(Rect::new(0, 0, 20, 4));
        app_state.add_message(ChatMessage::new(Role::User, "Tell me about the stars"));
        app_state.scroll.up();
        app_state.scroll.up();

        app_state.toggle_chat_panel();

        assert!(app_state.chat_open);
        let lines = app_state.transcript_lines().len();
        assert_eq!(app_state.scroll.position, lines - 4);
    }

    #[test]
    fn it_labels_transcript_lines() {
        let mut app_state = AppState::default();
        app_state.set_rect(Rect::new(0, 0, 80, 10));

        let lines = app_state.transcript_lines();
        assert_eq!(lines[0].1, "Star Buddy");
        assert_eq!(lines[1].0, Role::Model);
    }
}
