//! Tests for key handling and text rendering, without a terminal

use crate::app::{action_for_key, App, AppAction, ScreenState};
use crate::render::{kind_code, segment_text, text_map};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use variety_core::{Action, Direction, FactoryKind, Puzzle, PuzzleConfig, PuzzleId, PuzzleSerial, Seeds};

fn app() -> App {
    App::new(PuzzleConfig::default(), Seeds::new(1, 2024), PuzzleId(1)).unwrap()
}

fn press(app: &mut App, code: KeyCode) -> AppAction {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
}

#[test]
fn test_app_new() {
    let app = app();
    assert_eq!(app.screen_state, ScreenState::Playing);
    assert_eq!(app.cursor, 0);
    assert!(!app.show_solution);
    assert!(app.message.is_none());
    assert_eq!(app.puzzle.strikes(), 0);
}

#[test]
fn test_quit_key() {
    let mut app = app();
    assert!(matches!(press(&mut app, KeyCode::Char('q')), AppAction::Quit));
}

#[test]
fn test_cursor_stays_on_grid() {
    let mut app = app();
    press(&mut app, KeyCode::Up);
    press(&mut app, KeyCode::Left);
    assert_eq!(app.cursor, 0);

    for _ in 0..40 {
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('j'));
    }
    let grid = app.puzzle.grid();
    assert_eq!(app.cursor, grid.cell(grid.width - 1, grid.height - 1));
}

#[test]
fn test_cursor_selects_component_under_it() {
    let mut app = app();
    for _ in 0..5 {
        press(&mut app, KeyCode::Char('l'));
    }
    assert_eq!(app.selected, app.puzzle.component_at(app.cursor));
}

#[test]
fn test_tab_cycles_every_component() {
    let mut app = app();
    let count = app.puzzle.components().len();
    let mut seen = Vec::new();
    for _ in 0..count {
        press(&mut app, KeyCode::Tab);
        let position = app.selected.unwrap();
        assert_eq!(app.puzzle.component_at(app.cursor), Some(position));
        seen.push(position);
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), count);

    let before = app.selected;
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.selected, before);
}

#[test]
fn test_tab_order_hides_solve_order() {
    let app = app();
    let order = app.browse_order();
    let anchors: Vec<usize> = order
        .iter()
        .map(|&p| app.puzzle.components()[p].footprint().anchor())
        .collect();
    let mut sorted = anchors.clone();
    sorted.sort();
    assert_eq!(anchors, sorted);
}

#[test]
fn test_toggle_solution_overlay() {
    let mut app = app();
    press(&mut app, KeyCode::Char('?'));
    assert!(app.show_solution);
    press(&mut app, KeyCode::Char('?'));
    assert!(!app.show_solution);
}

#[test]
fn test_new_puzzle_bumps_id_and_keeps_rules() {
    let mut app = app();
    let order = app.puzzle.flavor_order().clone();
    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.puzzle.id(), PuzzleId(2));
    assert_eq!(app.puzzle.flavor_order(), &order);
    assert_eq!(app.message.as_deref(), Some("New puzzle #2"));
}

#[test]
fn test_theme_toggle() {
    let mut app = app();
    assert!(app.theme.is_dark());
    press(&mut app, KeyCode::Char('t'));
    assert!(!app.theme.is_dark());
    press(&mut app, KeyCode::Char('t'));
    assert!(app.theme.is_dark());
}

#[test]
fn test_message_expires() {
    let mut app = app();
    app.show_message("hello");
    for _ in 0..50 {
        app.tick();
    }
    assert!(app.message.is_none());
}

#[test]
fn test_unsupported_gesture_reports_message() {
    let mut app = app();
    let position = 0;
    let action = match app.puzzle.components()[position].kind() {
        FactoryKind::Wire => Action::Increment,
        _ => Action::Cut,
    };
    app.perform(position, action);
    assert!(app.message.is_some());
    assert_eq!(app.puzzle.strikes(), 0);
}

#[test]
fn test_key_mapping() {
    assert_eq!(action_for_key(FactoryKind::Wire, KeyCode::Char(' '), 0), Some(Action::Cut));
    assert_eq!(
        action_for_key(FactoryKind::Key, KeyCode::Enter, 7),
        Some(Action::TurnKey { timer_digit: 7 })
    );
    assert_eq!(action_for_key(FactoryKind::Knob, KeyCode::Char(' '), 0), Some(Action::Press));
    assert_eq!(action_for_key(FactoryKind::Keypad, KeyCode::Char('3'), 0), Some(Action::PressKey(2)));
    assert_eq!(
        action_for_key(FactoryKind::LetterDisplay, KeyCode::Char('1'), 0),
        Some(Action::PressSlot(0))
    );
    assert_eq!(action_for_key(FactoryKind::LetterDisplay, KeyCode::Char('4'), 0), None);
    assert_eq!(
        action_for_key(FactoryKind::DigitDisplay, KeyCode::Char('-'), 0),
        Some(Action::Decrement)
    );
    assert_eq!(
        action_for_key(FactoryKind::Maze, KeyCode::Char('a'), 0),
        Some(Action::Move(Direction::Left))
    );
    assert_eq!(action_for_key(FactoryKind::Maze, KeyCode::Char(' '), 0), None);
    assert_eq!(
        action_for_key(FactoryKind::Die, KeyCode::Char('s'), 0),
        Some(Action::Move(Direction::Down))
    );
    assert_eq!(action_for_key(FactoryKind::Timer, KeyCode::Enter, 0), Some(Action::Press));
    assert_eq!(action_for_key(FactoryKind::ColoredKnob, KeyCode::Char(' '), 0), Some(Action::Press));
    assert_eq!(
        action_for_key(FactoryKind::ColoredKeypad, KeyCode::Char('6'), 0),
        Some(Action::PressKey(5))
    );
    assert_eq!(action_for_key(FactoryKind::Dummy, KeyCode::Char(' '), 0), None);
}

#[test]
fn test_segment_text_blanks_leading_positions() {
    let strip = PuzzleSerial::new(18).digit_strip(3);
    let rows = segment_text(&strip);
    assert_eq!(rows[0], "         _");
    assert_eq!(rows[1], "      | |_|");
    assert_eq!(rows[2], "      | |_|");
}

#[test]
fn test_text_map_dimensions() {
    let puzzle = Puzzle::generate(PuzzleId(3), &PuzzleConfig::default(), Seeds::new(1, 5)).unwrap();
    let map = text_map(&puzzle);
    let grid = puzzle.grid();
    assert_eq!(map.len(), grid.height + 1);
    assert!(map[0].trim_start().starts_with('A'));
    assert!(map[1].starts_with(" 1 "));
}

#[test]
fn test_kind_codes_are_distinct() {
    let mut codes: Vec<&str> = FactoryKind::ALL.iter().map(|&k| kind_code(k)).collect();
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), FactoryKind::ALL.len());
}

#[test]
fn test_logger_setup_errors_are_returned() {
    let missing = std::env::temp_dir().join("variety-no-such-dir").join("variety.log");
    assert!(crate::init_logging(Some(&missing), true).is_err());

    let _ = crate::init_logging(None, false);
    assert!(crate::init_logging(None, false).is_err());
}
