use std::path::PathBuf;
use std::time::{Duration, Instant};

use proptest::prelude::*;

use super::*;
use crate::config::PlaybackSettings;
use crate::error::MediaError;
use crate::library::{AudioFilter, Playlist, RawFile, select_files};

const DURATION: f64 = 60.0;

fn playlist(n: usize) -> Playlist {
    let files = (1..=n).map(|i| RawFile::from_path(PathBuf::from(format!("/cues/{i}-cue.mp3")), 0));
    select_files(files, &AudioFilter::default()).unwrap()
}

fn settings(settle_ms: u64) -> PlaybackSettings {
    PlaybackSettings {
        settle_ms,
        ..PlaybackSettings::default()
    }
}

/// Answer every queued command the way a healthy engine would, immediately.
fn respond(deck: &mut Deck) {
    loop {
        let cmds = deck.take_commands();
        if cmds.is_empty() {
            break;
        }
        for Outgoing { key, command } in cmds {
            let events = match command {
                MediaCommand::Load { .. } => vec![
                    MediaEvent::LoadStart,
                    MediaEvent::MetadataLoaded {
                        duration_seconds: Some(DURATION),
                    },
                    MediaEvent::CanPlay,
                ],
                MediaCommand::Play => vec![MediaEvent::PlayStarted],
                MediaCommand::Seek(s) => vec![MediaEvent::TimeUpdate {
                    position_seconds: s,
                }],
                _ => Vec::new(),
            };
            for event in events {
                deck.handle_event(EngineEvent { key, event });
            }
        }
    }
}

fn ready_deck(n: usize, settle_ms: u64) -> Deck {
    let mut deck = Deck::new(&settings(settle_ms));
    deck.install(playlist(n));
    respond(&mut deck);
    deck
}

fn send(deck: &mut Deck, index: usize, event: MediaEvent) {
    let key = VoiceKey {
        generation: deck.generation(),
        index,
    };
    deck.handle_event(EngineEvent { key, event });
}

fn commands_for(cmds: &[Outgoing], index: usize) -> Vec<MediaCommand> {
    cmds.iter()
        .filter(|o| o.key.index == index)
        .map(|o| o.command.clone())
        .collect()
}

#[test]
fn install_loads_every_item_and_reaches_ready() {
    let mut deck = Deck::new(&settings(0));
    deck.install(playlist(3));
    let cmds = deck.take_commands();
    assert_eq!(cmds.len(), 3);
    assert!(
        cmds.iter()
            .all(|o| matches!(o.command, MediaCommand::Load { volume, .. } if volume == 1.0))
    );
    assert!(deck.items().iter().all(|i| i.state().is_loading));

    for o in cmds {
        for event in [
            MediaEvent::LoadStart,
            MediaEvent::MetadataLoaded {
                duration_seconds: Some(DURATION),
            },
            MediaEvent::CanPlay,
        ] {
            deck.handle_event(EngineEvent { key: o.key, event });
        }
    }
    for item in deck.items() {
        assert_eq!(item.phase(), &Phase::Ready);
        assert!(!item.state().is_loading);
        assert_eq!(item.state().duration_seconds, DURATION);
    }
}

#[test]
fn play_hands_off_between_items() {
    let mut deck = ready_deck(3, 0);
    let now = Instant::now();

    deck.request_play(0, now);
    respond(&mut deck);
    assert_eq!(deck.active(), Some(0));
    assert!(deck.item(0).unwrap().is_playing());

    deck.request_play(2, now);
    respond(&mut deck);
    assert_eq!(deck.active(), Some(2));
    assert!(!deck.item(0).unwrap().is_playing());
    assert_eq!(deck.item(0).unwrap().phase(), &Phase::Paused);
    assert!(deck.item(2).unwrap().is_playing());
    assert_eq!(deck.playing_count(), 1);
}

#[test]
fn settle_delay_pauses_first_and_starts_later() {
    let mut deck = ready_deck(2, 50);
    let t0 = Instant::now();

    deck.request_play(0, t0);
    assert!(deck.take_commands().is_empty());
    deck.tick(t0 + Duration::from_millis(50));
    respond(&mut deck);
    assert!(deck.item(0).unwrap().is_playing());

    let t1 = t0 + Duration::from_millis(100);
    deck.request_play(1, t1);
    let cmds = deck.take_commands();
    assert_eq!(commands_for(&cmds, 0), vec![MediaCommand::Pause]);
    assert!(commands_for(&cmds, 1).is_empty());
    assert_eq!(deck.next_deadline(), Some(t1 + Duration::from_millis(50)));

    deck.tick(t1 + Duration::from_millis(10));
    assert!(deck.take_commands().is_empty());

    deck.tick(t1 + Duration::from_millis(50));
    assert_eq!(
        commands_for(&deck.take_commands(), 1),
        vec![MediaCommand::Play]
    );
}

#[test]
fn superseded_start_never_plays() {
    let mut deck = ready_deck(3, 50);
    let t0 = Instant::now();

    deck.request_play(1, t0);
    deck.request_play(2, t0 + Duration::from_millis(10));
    deck.tick(t0 + Duration::from_millis(100));

    let cmds = deck.take_commands();
    assert!(!commands_for(&cmds, 1).contains(&MediaCommand::Play));
    assert_eq!(commands_for(&cmds, 2), vec![MediaCommand::Play]);
}

#[test]
fn late_play_start_does_not_revive_a_replaced_item() {
    let mut deck = ready_deck(2, 0);
    let now = Instant::now();

    deck.request_play(0, now);
    // The Play for item 0 is in flight and not answered yet.
    assert_eq!(
        commands_for(&deck.take_commands(), 0),
        vec![MediaCommand::Play]
    );

    deck.request_play(1, now);
    let cmds = deck.take_commands();
    assert_eq!(commands_for(&cmds, 0), vec![MediaCommand::Pause]);

    send(&mut deck, 0, MediaEvent::PlayStarted);
    assert!(!deck.item(0).unwrap().is_playing());
    assert_eq!(deck.active(), Some(1));
    assert_eq!(
        commands_for(&deck.take_commands(), 0),
        vec![MediaCommand::Pause]
    );
}

#[test]
fn end_of_media_loops_while_active() {
    let mut deck = ready_deck(1, 0);
    deck.request_play(0, Instant::now());
    respond(&mut deck);
    send(
        &mut deck,
        0,
        MediaEvent::TimeUpdate {
            position_seconds: 59.9,
        },
    );

    send(&mut deck, 0, MediaEvent::Ended);
    let item = deck.item(0).unwrap();
    assert_eq!(item.phase(), &Phase::Playing);
    assert!(item.is_playing());
    assert_eq!(item.state().current_time_seconds, 0.0);
    assert_eq!(
        commands_for(&deck.take_commands(), 0),
        vec![MediaCommand::Seek(0.0), MediaCommand::Play]
    );
}

#[test]
fn end_of_media_after_stop_settles_in_ready() {
    let mut deck = ready_deck(1, 0);
    deck.request_play(0, Instant::now());
    respond(&mut deck);
    deck.stop_all();
    respond(&mut deck);

    send(&mut deck, 0, MediaEvent::Ended);
    assert_eq!(deck.item(0).unwrap().phase(), &Phase::Ready);
    assert!(deck.take_commands().is_empty());
}

#[test]
fn losing_active_keeps_position() {
    let mut deck = ready_deck(2, 0);
    let now = Instant::now();
    deck.request_play(0, now);
    respond(&mut deck);
    send(
        &mut deck,
        0,
        MediaEvent::TimeUpdate {
            position_seconds: 12.5,
        },
    );

    deck.request_play(1, now);
    let cmds = deck.take_commands();
    assert_eq!(commands_for(&cmds, 0), vec![MediaCommand::Pause]);
    let item = deck.item(0).unwrap();
    assert_eq!(item.phase(), &Phase::Paused);
    assert_eq!(item.state().current_time_seconds, 12.5);
}

#[test]
fn seek_uses_clamped_fraction_of_duration() {
    let mut deck = ready_deck(1, 0);

    deck.seek_normalized(0, 0.25);
    deck.seek_normalized(0, 1.7);
    deck.seek_normalized(0, -0.3);
    assert_eq!(
        commands_for(&deck.take_commands(), 0),
        vec![
            MediaCommand::Seek(15.0),
            MediaCommand::Seek(60.0),
            MediaCommand::Seek(0.0)
        ]
    );

    deck.seek_by(0, 10.0);
    assert_eq!(deck.item(0).unwrap().state().current_time_seconds, 10.0);
    deck.seek_by(0, -30.0);
    assert_eq!(deck.item(0).unwrap().state().current_time_seconds, 0.0);
}

#[test]
fn seek_is_ignored_until_duration_is_known() {
    let mut deck = Deck::new(&settings(0));
    deck.install(playlist(1));
    deck.take_commands();
    send(&mut deck, 0, MediaEvent::LoadStart);
    send(
        &mut deck,
        0,
        MediaEvent::MetadataLoaded {
            duration_seconds: None,
        },
    );
    send(&mut deck, 0, MediaEvent::CanPlay);

    deck.seek_normalized(0, 0.5);
    assert!(deck.take_commands().is_empty());
    assert!(deck.item(0).unwrap().state().duration_seconds.is_nan());
}

#[test]
fn volume_is_per_item_and_survives_handoff() {
    let mut deck = ready_deck(2, 0);
    let now = Instant::now();

    deck.set_volume(0, 0.4);
    deck.adjust_volume(1, -0.25);
    deck.adjust_volume(1, 5.0);
    deck.request_play(0, now);
    respond(&mut deck);
    deck.request_play(1, now);
    respond(&mut deck);

    assert_eq!(deck.item(0).unwrap().state().volume, 0.4);
    assert_eq!(deck.item(1).unwrap().state().volume, 1.0);
}

#[test]
fn mute_toggle_restores_prior_volume() {
    let mut deck = ready_deck(1, 0);
    deck.set_volume(0, 0.6);
    deck.toggle_mute(0);
    assert_eq!(deck.item(0).unwrap().state().volume, 0.0);
    assert!(deck.item(0).unwrap().is_muted());

    deck.toggle_mute(0);
    assert_eq!(deck.item(0).unwrap().state().volume, 0.6);
    assert!(!deck.item(0).unwrap().is_muted());
    assert_eq!(
        commands_for(&deck.take_commands(), 0),
        vec![
            MediaCommand::SetVolume(0.6),
            MediaCommand::SetVolume(0.0),
            MediaCommand::SetVolume(0.6)
        ]
    );
}

#[test]
fn error_on_active_item_clears_active_only_for_that_item() {
    let mut deck = ready_deck(2, 0);
    deck.request_play(0, Instant::now());
    respond(&mut deck);

    send(
        &mut deck,
        1,
        MediaEvent::Error(MediaError::Load("bad header".into())),
    );
    assert_eq!(deck.active(), Some(0));
    assert!(deck.item(0).unwrap().is_playing());
    assert!(deck.item(1).unwrap().state().has_error);

    send(
        &mut deck,
        0,
        MediaEvent::Error(MediaError::Load("device gone".into())),
    );
    assert_eq!(deck.active(), None);
    assert!(!deck.item(0).unwrap().is_playing());
}

#[test]
fn retry_reloads_from_the_same_source() {
    let mut deck = ready_deck(1, 0);
    send(
        &mut deck,
        0,
        MediaEvent::Error(MediaError::Load("truncated".into())),
    );
    assert!(matches!(deck.item(0).unwrap().phase(), Phase::Error(_)));

    deck.retry(0);
    let cmds = deck.take_commands();
    assert_eq!(
        cmds[0].command,
        MediaCommand::Load {
            path: PathBuf::from("/cues/1-cue.mp3"),
            volume: 1.0
        }
    );
    assert_eq!(deck.item(0).unwrap().phase(), &Phase::Loading);
    assert!(!deck.item(0).unwrap().state().has_error);
}

#[test]
fn rejected_play_reloads_once_then_fails() {
    let mut deck = ready_deck(1, 0);
    deck.request_play(0, Instant::now());
    deck.take_commands();

    send(&mut deck, 0, MediaEvent::PlayRejected("busy".into()));
    let cmds = deck.take_commands();
    assert!(matches!(cmds[0].command, MediaCommand::Load { .. }));

    send(&mut deck, 0, MediaEvent::LoadStart);
    send(&mut deck, 0, MediaEvent::CanPlay);
    assert_eq!(
        commands_for(&deck.take_commands(), 0),
        vec![MediaCommand::Play]
    );

    send(&mut deck, 0, MediaEvent::PlayRejected("still busy".into()));
    assert_eq!(
        deck.item(0).unwrap().phase(),
        &Phase::Error(MediaError::PlaybackStart("still busy".into()))
    );
    assert_eq!(deck.active(), None);
}

#[test]
fn playing_on_errored_item_waits_for_retry() {
    let mut deck = ready_deck(1, 0);
    send(
        &mut deck,
        0,
        MediaEvent::Error(MediaError::Load("nope".into())),
    );
    deck.request_play(0, Instant::now());
    assert!(deck.take_commands().is_empty());
    assert!(!deck.item(0).unwrap().is_playing());
}

#[test]
fn restart_rewinds_and_plays() {
    let mut deck = ready_deck(2, 0);
    let now = Instant::now();
    deck.seek_normalized(1, 0.5);
    respond(&mut deck);

    deck.restart(1, now);
    let cmds = deck.take_commands();
    assert_eq!(
        commands_for(&cmds, 1),
        vec![MediaCommand::Seek(0.0), MediaCommand::Play]
    );
    assert_eq!(deck.active(), Some(1));
}

#[test]
fn restart_of_failed_item_leaves_playing_item_alone() {
    let mut deck = ready_deck(2, 0);
    let now = Instant::now();
    deck.request_play(0, now);
    respond(&mut deck);
    send(
        &mut deck,
        1,
        MediaEvent::Error(MediaError::Load("bad header".into())),
    );

    deck.restart(1, now);
    assert!(deck.take_commands().is_empty());
    assert_eq!(deck.active(), Some(0));
    assert!(deck.item(0).unwrap().is_playing());
}

#[test]
fn toggle_pauses_and_clears_active() {
    let mut deck = ready_deck(1, 0);
    let now = Instant::now();
    deck.toggle(0, now);
    respond(&mut deck);
    assert!(deck.item(0).unwrap().is_playing());

    deck.toggle(0, now);
    respond(&mut deck);
    assert!(!deck.item(0).unwrap().is_playing());
    assert_eq!(deck.active(), None);
}

#[test]
fn replacing_playlist_releases_old_items_and_ignores_their_events() {
    let mut deck = ready_deck(2, 0);
    deck.request_play(0, Instant::now());
    respond(&mut deck);
    let old_generation = deck.generation();

    deck.install(playlist(3));
    let cmds = deck.take_commands();
    let released: Vec<usize> = cmds
        .iter()
        .filter(|o| o.command == MediaCommand::Release)
        .map(|o| {
            assert_eq!(o.key.generation, old_generation);
            o.key.index
        })
        .collect();
    assert_eq!(released, vec![0, 1]);
    assert_eq!(
        cmds.iter()
            .filter(|o| matches!(o.command, MediaCommand::Load { .. }))
            .count(),
        3
    );
    assert_eq!(deck.active(), None);

    deck.handle_event(EngineEvent {
        key: VoiceKey {
            generation: old_generation,
            index: 0,
        },
        event: MediaEvent::PlayStarted,
    });
    assert_eq!(deck.playing_count(), 0);
}

#[test]
fn clear_all_leaves_nothing_behind() {
    let mut deck = ready_deck(2, 0);
    deck.clear_all();
    let cmds = deck.take_commands();
    assert_eq!(cmds.len(), 2);
    assert!(cmds.iter().all(|o| o.command == MediaCommand::Release));
    assert!(deck.is_empty());
    assert!(deck.playlist().is_empty());
}

#[test]
fn format_time_renders_minutes_and_padded_seconds() {
    assert_eq!(format_time(65.0), "1:05");
    assert_eq!(format_time(f64::NAN), "0:00");
    assert_eq!(format_time(5.0), "0:05");
    assert_eq!(format_time(5.9), "0:05");
    assert_eq!(format_time(3600.0), "60:00");
    assert_eq!(format_time(f64::INFINITY), "0:00");
    assert_eq!(format_time(-3.0), "0:00");
}

#[test]
fn volume_icon_buckets() {
    assert_eq!(VolumeIcon::for_volume(0.0), VolumeIcon::Muted);
    assert_eq!(VolumeIcon::for_volume(0.2), VolumeIcon::Low);
    assert_eq!(VolumeIcon::for_volume(0.5), VolumeIcon::High);
    assert_eq!(VolumeIcon::for_volume(1.0), VolumeIcon::High);
}

#[derive(Debug, Clone)]
enum Op {
    Play(usize),
    Toggle(usize),
    Pause(usize),
    StopAll,
    Fail(usize),
    Retry(usize),
    Ended(usize),
    LateStart(usize),
    Tick,
    Respond,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize).prop_map(Op::Play),
        (0..4usize).prop_map(Op::Toggle),
        (0..4usize).prop_map(Op::Pause),
        Just(Op::StopAll),
        (0..4usize).prop_map(Op::Fail),
        (0..4usize).prop_map(Op::Retry),
        (0..4usize).prop_map(Op::Ended),
        (0..4usize).prop_map(Op::LateStart),
        Just(Op::Tick),
        Just(Op::Respond),
    ]
}

proptest! {
    #[test]
    fn at_most_one_item_is_ever_playing(ops in prop::collection::vec(op(), 1..60)) {
        let mut deck = ready_deck(4, 20);
        let mut now = Instant::now();

        for op in ops {
            now += Duration::from_millis(7);
            match op {
                Op::Play(i) => deck.request_play(i, now),
                Op::Toggle(i) => deck.toggle(i, now),
                Op::Pause(i) => deck.pause(i),
                Op::StopAll => deck.stop_all(),
                Op::Fail(i) => send(&mut deck, i, MediaEvent::Error(MediaError::Load("x".into()))),
                Op::Retry(i) => deck.retry(i),
                Op::Ended(i) => send(&mut deck, i, MediaEvent::Ended),
                Op::LateStart(i) => send(&mut deck, i, MediaEvent::PlayStarted),
                Op::Tick => deck.tick(now),
                Op::Respond => respond(&mut deck),
            }

            prop_assert!(deck.playing_count() <= 1);
            for item in deck.items() {
                if item.is_playing() {
                    prop_assert_eq!(deck.active(), Some(item.index()));
                }
            }
        }
    }
}
