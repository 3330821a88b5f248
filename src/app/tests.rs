use std::fs;
use std::time::Instant;

use tempfile::tempdir;

use super::*;
use crate::config::Settings;
use crate::error::IntakeError;

fn cue_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    for n in names {
        fs::write(dir.path().join(n), b"not real audio").unwrap();
    }
    dir
}

fn names(app: &App) -> Vec<String> {
    app.deck
        .playlist()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[test]
fn load_paths_orders_folder_by_leading_number() {
    let dir = cue_dir(&["10-b.mp3", "2-a.mp3", "intro.mp3", "1-c.wav", "cover.png"]);
    let mut app = App::new(&Settings::default());

    let n = app.load_paths(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(n, 4);
    assert_eq!(names(&app), vec!["1-c.wav", "2-a.mp3", "10-b.mp3", "intro.mp3"]);
    assert!(matches!(app.notice, Some(Notice::Info(_))));
}

#[test]
fn failed_selection_keeps_current_playlist() {
    let good = cue_dir(&["1-a.mp3"]);
    let bad = cue_dir(&["photo.png", "doc.txt"]);
    let mut app = App::new(&Settings::default());
    app.load_paths(&[good.path().to_path_buf()]).unwrap();
    let generation = app.deck.generation();

    let err = app.load_paths(&[bad.path().to_path_buf()]).unwrap_err();
    assert_eq!(err, IntakeError::NoAudioFilesFound { considered: 2 });
    assert_eq!(names(&app), vec!["1-a.mp3"]);
    assert_eq!(app.deck.generation(), generation);
    assert!(matches!(app.notice, Some(Notice::Warning(_))));
}

#[test]
fn reselection_replaces_instead_of_merging() {
    let first = cue_dir(&["1-a.mp3", "2-b.mp3"]);
    let second = cue_dir(&["7-z.ogg"]);
    let mut app = App::new(&Settings::default());
    app.load_paths(&[first.path().to_path_buf()]).unwrap();
    app.set_selected(1);

    app.load_paths(&[second.path().join("7-z.ogg")]).unwrap();
    assert_eq!(names(&app), vec!["7-z.ogg"]);
    assert_eq!(app.selected, 0);
}

#[test]
fn open_prompt_accepts_quoted_paths() {
    let dir = cue_dir(&["3 three.mp3"]);
    let mut app = App::new(&Settings::default());

    app.enter_open_mode();
    assert_eq!(app.mode, InputMode::Open);
    let typed = format!("'{}'", dir.path().join("3 three.mp3").display());
    for c in typed.chars() {
        app.push_input_char(c);
    }
    app.push_input_char('x');
    app.pop_input_char();

    assert_eq!(app.submit_open().unwrap(), 1);
    assert_eq!(app.mode, InputMode::Normal);
    assert!(app.path_input.is_empty());
    assert_eq!(names(&app), vec!["3 three.mp3"]);
}

#[test]
fn paste_into_open_prompt_edits_instead_of_loading() {
    let dir = cue_dir(&["1-a.mp3", "2-b.mp3"]);
    let mut app = App::new(&Settings::default());
    app.load_paths(&[dir.path().join("1-a.mp3")]).unwrap();
    let generation = app.deck.generation();

    app.enter_open_mode();
    let pasted = format!("'{}'", dir.path().join("2-b.mp3").display());
    app.paste(&pasted);
    assert_eq!(app.path_input, pasted);
    assert_eq!(app.deck.generation(), generation);
    assert_eq!(names(&app), vec!["1-a.mp3"]);

    assert_eq!(app.submit_open().unwrap(), 1);
    assert_eq!(names(&app), vec!["2-b.mp3"]);
}

#[test]
fn paste_outside_prompt_loads_immediately() {
    let dir = cue_dir(&["4-d.ogg"]);
    let mut app = App::new(&Settings::default());
    app.paste(&dir.path().display().to_string());
    assert_eq!(names(&app), vec!["4-d.ogg"]);
    assert_eq!(app.mode, InputMode::Normal);
}

#[test]
fn empty_drop_is_a_warning() {
    let mut app = App::new(&Settings::default());
    assert!(app.load_dropped("  \n").is_err());
    assert!(matches!(app.notice, Some(Notice::Warning(_))));
}

#[test]
fn selection_wraps_both_ways() {
    let dir = cue_dir(&["1.mp3", "2.mp3", "3.mp3"]);
    let mut app = App::new(&Settings::default());
    app.load_paths(&[dir.path().to_path_buf()]).unwrap();

    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.last();
    assert_eq!(app.selected, 2);
    app.set_selected(99);
    assert_eq!(app.selected, 2);
}

#[test]
fn follow_moves_cursor_to_new_active_item() {
    let dir = cue_dir(&["1.mp3", "2.mp3", "3.mp3"]);
    let mut app = App::new(&Settings::default());
    app.load_paths(&[dir.path().to_path_buf()]).unwrap();

    app.deck.request_play(2, Instant::now());
    app.follow();
    assert_eq!(app.selected, 2);

    // Moving the cursor by hand sticks until the active item changes again.
    app.first();
    app.follow();
    assert_eq!(app.selected, 0);
}

#[test]
fn clear_all_empties_the_deck() {
    let dir = cue_dir(&["1.mp3"]);
    let mut app = App::new(&Settings::default());
    app.load_paths(&[dir.path().to_path_buf()]).unwrap();

    app.clear_all();
    assert!(!app.has_items());
    assert!(app.selected_item().is_none());
    assert!(app.source_label.is_none());
}
