//! Keyboard input handling.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::client::TripAction;

use super::app::{App, Control};

pub fn handle_input(app: &mut App, key: KeyEvent, now: Instant) {
    // Global quit
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
        }
        KeyCode::Char('r') => {
            // Manual reload, same action the error card offers
            app.press_control(Control::Reload, now);
            app.reload_requested = true;
        }
        KeyCode::Char('s') => {
            app.submit_trip(TripAction::Start, now);
        }
        KeyCode::Char('x') => {
            app.submit_trip(TripAction::Stop, now);
        }
        _ => {}
    }
}
