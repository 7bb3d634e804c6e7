use super::*;
use crate::error::PlayerError;
use crate::media::{Generation, MediaEvent, MediaEventKind, MediaResource};
use crate::persistence::{MemoryStore, QUEUE_KEY, SETTINGS_KEY};
use crate::queue::RepeatMode;
use crate::track::Track;

#[derive(Debug, Clone, PartialEq)]
enum MediaCall {
    Load(String, Generation),
    Play,
    Pause,
    Seek(f64),
    Volume(f32),
    Release,
}

#[derive(Debug, Default)]
struct RecordingMedia {
    calls: Vec<MediaCall>,
}

impl MediaResource for RecordingMedia {
    fn load(&mut self, url: &str, generation: Generation) {
        self.calls.push(MediaCall::Load(url.to_string(), generation));
    }
    fn play(&mut self) {
        self.calls.push(MediaCall::Play);
    }
    fn pause(&mut self) {
        self.calls.push(MediaCall::Pause);
    }
    fn seek_to(&mut self, sec: f64) {
        self.calls.push(MediaCall::Seek(sec));
    }
    fn set_volume(&mut self, volume: f32) {
        self.calls.push(MediaCall::Volume(volume));
    }
    fn release(&mut self) {
        self.calls.push(MediaCall::Release);
    }
}

type TestEngine = PlaybackEngine<RecordingMedia, MemoryStore>;

fn track(id: &str) -> Track {
    Track::new(id, id.to_uppercase()).with_file_url(format!("file:///music/{id}.mp3"))
}

fn engine_with(store: MemoryStore) -> TestEngine {
    let options = EngineOptions {
        seed: Some(7),
        ..EngineOptions::default()
    };
    let mut engine = PlaybackEngine::new(RecordingMedia::default(), store, options);
    engine.init();
    engine
}

fn engine() -> TestEngine {
    engine_with(MemoryStore::new())
}

fn engine_with_queue(ids: &[&str]) -> TestEngine {
    let mut engine = engine();
    engine.enqueue(ids.iter().map(|id| track(id)));
    engine
}

fn current_id(engine: &TestEngine) -> Option<String> {
    engine.snapshot().current_track.as_ref().map(|t| t.id.clone())
}

fn queue_ids(engine: &TestEngine) -> Vec<String> {
    engine.snapshot().queue.iter().map(|t| t.id.clone()).collect()
}

fn send(engine: &mut TestEngine, kind: MediaEventKind) {
    let generation = engine.generation();
    engine.handle_media_event(MediaEvent::new(generation, kind));
}

fn loads(engine: &TestEngine) -> Vec<String> {
    engine
        .media()
        .calls
        .iter()
        .filter_map(|c| match c {
            MediaCall::Load(url, _) => Some(url.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn fresh_engine_is_idle_with_defaults() {
    let engine = engine();
    let s = engine.snapshot();
    assert_eq!(s.transport, TransportState::Idle);
    assert!(s.current_track.is_none());
    assert!(!s.is_playing);
    assert_eq!(s.volume, 0.8);
    assert_eq!(s.repeat_mode, RepeatMode::None);
    assert!(s.queue.is_empty());
    assert_eq!(s.cursor, None);
}

#[test]
fn play_without_media_url_is_rejected_without_state_change() {
    let mut engine = engine_with_queue(&["a", "b"]);
    let before = engine.snapshot().clone();
    let before_debug = format!("{before:?}");
    let calls_before = engine.media().calls.len();

    let err = engine.play(Some(&Track::new("x", "No file"))).unwrap_err();
    assert_eq!(
        err,
        PlayerError::MissingMedia {
            track_id: "x".to_string()
        }
    );
    assert_eq!(engine.snapshot(), &before);
    assert_eq!(format!("{:?}", engine.snapshot()), before_debug);
    assert_eq!(engine.media().calls.len(), calls_before);
}

#[test]
fn play_unknown_track_appends_it_and_starts_loading() {
    let mut engine = engine_with_queue(&["a"]);
    engine.play(Some(&track("b"))).unwrap();

    assert_eq!(queue_ids(&engine), vec!["a", "b"]);
    assert_eq!(engine.snapshot().cursor, Some(1));
    assert_eq!(engine.snapshot().transport, TransportState::Loading);
    assert!(engine.snapshot().is_playing);
    assert_eq!(current_id(&engine).as_deref(), Some("b"));
    assert_eq!(loads(&engine), vec!["file:///music/b.mp3"]);
    assert!(engine.store().get(QUEUE_KEY).unwrap().contains("\"b\""));
}

#[test]
fn play_known_track_jumps_to_it() {
    let mut engine = engine_with_queue(&["a", "b", "c"]);
    engine.play(Some(&track("c"))).unwrap();
    assert_eq!(queue_ids(&engine), vec!["a", "b", "c"]);
    assert_eq!(engine.snapshot().cursor, Some(2));
}

#[test]
fn time_update_moves_loading_to_playing() {
    let mut engine = engine_with_queue(&["a"]);
    engine.play(None).unwrap();
    assert_eq!(engine.snapshot().transport, TransportState::Loading);

    send(&mut engine, MediaEventKind::Metadata { duration_sec: 200.0 });
    send(&mut engine, MediaEventKind::TimeUpdate { current_sec: 50.0 });

    let s = engine.snapshot();
    assert_eq!(s.transport, TransportState::Playing);
    assert_eq!(s.current_time_sec, 50.0);
    assert_eq!(s.duration_sec, 200.0);
    assert_eq!(s.progress_pct, 25.0);
}

#[test]
fn stale_metadata_from_previous_load_is_ignored() {
    let mut engine = engine_with_queue(&["a", "b"]);
    engine.play(None).unwrap();
    let old = engine.generation();

    engine.next();
    assert_ne!(engine.generation(), old);
    let before = engine.snapshot().clone();

    engine.handle_media_event(MediaEvent::new(
        old,
        MediaEventKind::Metadata { duration_sec: 999.0 },
    ));
    engine.handle_media_event(MediaEvent::new(old, MediaEventKind::Ended));

    assert_eq!(engine.snapshot(), &before);
    assert_eq!(current_id(&engine).as_deref(), Some("b"));
}

#[test]
fn events_while_idle_are_ignored() {
    let mut engine = engine_with_queue(&["a"]);
    engine.play(None).unwrap();
    engine.stop();
    let before = engine.snapshot().clone();

    send(&mut engine, MediaEventKind::TimeUpdate { current_sec: 12.0 });
    assert_eq!(engine.snapshot(), &before);
}

#[test]
fn ended_with_repeat_one_restarts_same_track() {
    let mut engine = engine_with_queue(&["a", "b"]);
    engine.set_repeat(RepeatMode::One);
    engine.play(None).unwrap();
    send(&mut engine, MediaEventKind::TimeUpdate { current_sec: 180.0 });

    send(&mut engine, MediaEventKind::Ended);

    let s = engine.snapshot();
    assert_eq!(current_id(&engine).as_deref(), Some("a"));
    assert_eq!(s.current_time_sec, 0.0);
    assert_eq!(s.transport, TransportState::Playing);
    let tail = &engine.media().calls[engine.media().calls.len() - 2..];
    assert_eq!(tail, &[MediaCall::Seek(0.0), MediaCall::Play]);
}

#[test]
fn ended_advances_then_stops_when_exhausted() {
    let mut engine = engine_with_queue(&["a", "b"]);
    engine.play(None).unwrap();

    send(&mut engine, MediaEventKind::Ended);
    assert_eq!(current_id(&engine).as_deref(), Some("b"));
    assert_eq!(engine.snapshot().transport, TransportState::Loading);

    send(&mut engine, MediaEventKind::Ended);
    let s = engine.snapshot();
    assert_eq!(s.transport, TransportState::Idle);
    assert!(s.current_track.is_none());
    assert_eq!(s.cursor, Some(1));
    assert_eq!(engine.media().calls.last(), Some(&MediaCall::Release));
}

#[test]
fn next_at_end_without_repeat_stops() {
    let mut engine = engine_with_queue(&["a", "b", "c"]);
    engine.play(Some(&track("c"))).unwrap();
    engine.next();

    let s = engine.snapshot();
    assert_eq!(s.transport, TransportState::Idle);
    assert_eq!(s.current_time_sec, 0.0);
    assert_eq!(s.progress_pct, 0.0);
    assert_eq!(s.queue.len(), 3);
}

#[test]
fn next_with_repeat_all_wraps() {
    let mut engine = engine_with_queue(&["a", "b", "c"]);
    engine.set_repeat(RepeatMode::All);
    engine.play(Some(&track("c"))).unwrap();
    engine.next();
    assert_eq!(current_id(&engine).as_deref(), Some("a"));
    assert_eq!(engine.snapshot().cursor, Some(0));
}

#[test]
fn previous_at_start_stays_and_repeat_one_wraps() {
    let mut engine = engine_with_queue(&["a", "b", "c"]);
    engine.play(None).unwrap();
    engine.previous();
    assert_eq!(engine.snapshot().cursor, Some(0));
    assert_eq!(current_id(&engine).as_deref(), Some("a"));

    engine.set_repeat(RepeatMode::One);
    engine.previous();
    assert_eq!(current_id(&engine).as_deref(), Some("c"));
}

#[test]
fn next_with_repeat_one_restarts_current() {
    let mut engine = engine_with_queue(&["a", "b"]);
    engine.set_repeat(RepeatMode::One);
    engine.play(None).unwrap();
    send(&mut engine, MediaEventKind::TimeUpdate { current_sec: 30.0 });

    engine.next();
    assert_eq!(current_id(&engine).as_deref(), Some("a"));
    assert_eq!(engine.snapshot().current_time_sec, 0.0);
}

#[test]
fn set_volume_clamps_and_persists() {
    let mut engine = engine();
    engine.set_volume(1.5);
    assert_eq!(engine.snapshot().volume, 1.0);
    assert_eq!(engine.media().calls.last(), Some(&MediaCall::Volume(1.0)));
    assert!(engine.store().get(SETTINGS_KEY).unwrap().contains("\"volume\":1.0"));

    engine.set_volume(-0.2);
    assert_eq!(engine.snapshot().volume, 0.0);
    assert_eq!(engine.media().calls.last(), Some(&MediaCall::Volume(0.0)));

    engine.set_volume(f32::NAN);
    assert_eq!(engine.snapshot().volume, 0.0);
}

#[test]
fn seek_while_idle_is_invalid_state() {
    let mut engine = engine_with_queue(&["a"]);
    let err = engine.seek(10.0).unwrap_err();
    assert_eq!(
        err,
        PlayerError::InvalidState {
            command: "seek",
            state: "idle"
        }
    );
    assert!(!engine.media().calls.iter().any(|c| matches!(c, MediaCall::Seek(_))));
}

#[test]
fn seek_clamps_to_duration() {
    let mut engine = engine_with_queue(&["a"]);
    engine.play(None).unwrap();
    send(&mut engine, MediaEventKind::Metadata { duration_sec: 100.0 });

    engine.seek(250.0).unwrap();
    assert_eq!(engine.snapshot().current_time_sec, 100.0);
    assert_eq!(engine.media().calls.last(), Some(&MediaCall::Seek(100.0)));

    engine.seek(-5.0).unwrap();
    assert_eq!(engine.snapshot().current_time_sec, 0.0);
}

#[test]
fn seek_with_unknown_duration_only_clamps_lower_bound() {
    let mut engine = engine_with_queue(&["a"]);
    engine.play(None).unwrap();
    engine.seek(42.0).unwrap();
    assert_eq!(engine.snapshot().current_time_sec, 42.0);
    engine.seek(f64::NAN).unwrap();
    assert_eq!(engine.snapshot().current_time_sec, 0.0);
}

#[test]
fn pause_while_idle_is_a_no_op() {
    let mut engine = engine_with_queue(&["a"]);
    let before = engine.snapshot().clone();
    engine.pause();
    engine.stop();
    assert_eq!(engine.snapshot(), &before);
    assert!(!engine.media().calls.contains(&MediaCall::Pause));
}

#[test]
fn pause_and_resume() {
    let mut engine = engine_with_queue(&["a"]);
    engine.play(None).unwrap();
    send(&mut engine, MediaEventKind::TimeUpdate { current_sec: 3.0 });

    engine.pause();
    assert_eq!(engine.snapshot().transport, TransportState::Paused);
    assert!(!engine.snapshot().is_playing);

    engine.play(None).unwrap();
    assert_eq!(engine.snapshot().transport, TransportState::Playing);
    assert_eq!(engine.snapshot().current_time_sec, 3.0);
    assert_eq!(loads(&engine).len(), 1);
}

#[test]
fn media_error_pauses_and_notifies() {
    let mut engine = engine_with_queue(&["a"]);
    let rx = engine.subscribe();
    engine.play(None).unwrap();

    send(
        &mut engine,
        MediaEventKind::Error {
            reason: "codec".to_string(),
        },
    );
    assert_eq!(engine.snapshot().transport, TransportState::Paused);

    let notices: Vec<Notice> = rx
        .try_iter()
        .filter_map(|e| match e {
            EngineEvent::Notice(n) => Some(n),
            _ => None,
        })
        .collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Playback failed: codec");
    assert_eq!(notices[0].track_id.as_deref(), Some("a"));
}

#[test]
fn resume_after_error_reloads_the_track() {
    let mut engine = engine_with_queue(&["a"]);
    engine.play(None).unwrap();
    let failed = engine.generation();
    send(
        &mut engine,
        MediaEventKind::Error {
            reason: "network".to_string(),
        },
    );

    engine.play(None).unwrap();
    assert_eq!(engine.snapshot().transport, TransportState::Loading);
    assert!(engine.generation() > failed);
    assert_eq!(loads(&engine).len(), 2);
}

#[test]
fn removing_earlier_entry_keeps_current_track() {
    let mut engine = engine_with_queue(&["a", "b", "c"]);
    engine.play(Some(&track("b"))).unwrap();
    let calls = engine.media().calls.len();

    engine.remove_from_queue(0);
    assert_eq!(queue_ids(&engine), vec!["b", "c"]);
    assert_eq!(engine.snapshot().cursor, Some(0));
    assert_eq!(current_id(&engine).as_deref(), Some("b"));
    assert_eq!(engine.media().calls.len(), calls);
}

#[test]
fn removing_current_while_playing_plays_successor() {
    let mut engine = engine_with_queue(&["a", "b", "c"]);
    engine.play(Some(&track("b"))).unwrap();

    engine.remove_from_queue(1);
    assert_eq!(queue_ids(&engine), vec!["a", "c"]);
    assert_eq!(current_id(&engine).as_deref(), Some("c"));
    assert_eq!(engine.snapshot().transport, TransportState::Loading);
}

#[test]
fn removing_current_while_paused_goes_idle() {
    let mut engine = engine_with_queue(&["a", "b"]);
    engine.play(None).unwrap();
    engine.pause();

    engine.remove_from_queue(0);
    assert_eq!(engine.snapshot().transport, TransportState::Idle);
    assert_eq!(engine.snapshot().cursor, Some(0));
}

#[test]
fn removing_last_entry_empties_queue_and_stops() {
    let mut engine = engine_with_queue(&["a"]);
    engine.play(None).unwrap();

    engine.remove_from_queue(0);
    let s = engine.snapshot();
    assert!(s.queue.is_empty());
    assert_eq!(s.cursor, None);
    assert_eq!(s.transport, TransportState::Idle);
}

#[test]
fn removing_out_of_range_is_a_no_op() {
    let mut engine = engine_with_queue(&["a"]);
    let before = engine.snapshot().clone();
    engine.remove_from_queue(5);
    assert_eq!(engine.snapshot(), &before);
}

#[test]
fn clear_queue_stops_playback() {
    let mut engine = engine_with_queue(&["a", "b"]);
    engine.play(None).unwrap();
    engine.clear_queue();

    let s = engine.snapshot();
    assert!(s.queue.is_empty());
    assert_eq!(s.cursor, None);
    assert_eq!(s.transport, TransportState::Idle);
    assert_eq!(engine.media().calls.last(), Some(&MediaCall::Release));
}

#[test]
fn enqueue_skips_duplicates_and_tracks_without_media() {
    let mut engine = engine_with_queue(&["a"]);
    engine.enqueue(vec![track("a"), Track::new("nofile", "x"), track("b")]);
    assert_eq!(queue_ids(&engine), vec!["a", "b"]);
    assert_eq!(engine.snapshot().cursor, Some(0));
}

#[test]
fn toggling_shuffle_twice_restores_order() {
    let ids: Vec<String> = (0..12).map(|i| format!("t{i}")).collect();
    let mut engine = engine();
    engine.enqueue(ids.iter().map(|id| track(id)));
    engine.play(Some(&track("t4"))).unwrap();

    engine.toggle_shuffle();
    assert!(engine.snapshot().shuffle_enabled);
    assert_eq!(engine.snapshot().cursor, Some(4));
    assert_eq!(current_id(&engine).as_deref(), Some("t4"));
    assert!(engine.store().get(QUEUE_KEY).unwrap().contains("savedOrder"));

    engine.toggle_shuffle();
    assert!(!engine.snapshot().shuffle_enabled);
    assert_eq!(queue_ids(&engine), ids);
    assert_eq!(current_id(&engine).as_deref(), Some("t4"));
}

#[test]
fn toggle_repeat_cycles_and_persists() {
    let mut engine = engine();
    engine.toggle_repeat();
    assert_eq!(engine.snapshot().repeat_mode, RepeatMode::All);
    engine.toggle_repeat();
    assert_eq!(engine.snapshot().repeat_mode, RepeatMode::One);
    assert!(engine.store().get(SETTINGS_KEY).unwrap().contains("\"one\""));
    engine.toggle_repeat();
    assert_eq!(engine.snapshot().repeat_mode, RepeatMode::None);
}

#[test]
fn init_restores_persisted_queue_and_settings() {
    let store = MemoryStore::new()
        .with_entry(
            QUEUE_KEY,
            r#"{"items":[
                {"id":"a","title":"A","artistName":"","fileUrl":"file:///a.mp3"},
                {"id":"gone","title":"G","artistName":""},
                {"id":"b","title":"B","artistName":"","fileUrl":"file:///b.mp3"}
            ]}"#,
        )
        .with_entry(
            SETTINGS_KEY,
            r#"{"volume":0.25,"shuffleEnabled":false,"repeatMode":"all"}"#,
        );
    let options = EngineOptions {
        volume: 0.9,
        repeat: RepeatMode::One,
        seed: Some(1),
        ..EngineOptions::default()
    };
    let mut engine = PlaybackEngine::new(RecordingMedia::default(), store, options);
    engine.init();

    let s = engine.snapshot();
    assert_eq!(queue_ids(&engine), vec!["a", "b"]);
    assert_eq!(s.cursor, Some(0));
    assert_eq!(s.transport, TransportState::Idle);
    assert_eq!(s.volume, 0.25);
    assert_eq!(s.repeat_mode, RepeatMode::All);
    assert_eq!(
        engine.media().calls,
        vec![MediaCall::Volume(0.9), MediaCall::Volume(0.25)]
    );
}

#[test]
fn new_forwards_configured_volume_before_init() {
    let options = EngineOptions {
        volume: 0.3,
        seed: Some(3),
        ..EngineOptions::default()
    };
    let engine = PlaybackEngine::new(RecordingMedia::default(), MemoryStore::new(), options);
    assert_eq!(engine.snapshot().volume, 0.3);
    assert_eq!(engine.media().calls, vec![MediaCall::Volume(0.3)]);
}

#[test]
fn init_with_malformed_records_uses_defaults() {
    let store = MemoryStore::new()
        .with_entry(QUEUE_KEY, "{not json")
        .with_entry(SETTINGS_KEY, r#"{"volume":"loud"}"#);
    let engine = engine_with(store);

    let s = engine.snapshot();
    assert!(s.queue.is_empty());
    assert_eq!(s.volume, 0.8);
    assert_eq!(s.repeat_mode, RepeatMode::None);
}

#[test]
fn subscribers_receive_state_changes_and_closed_ones_are_dropped() {
    let mut engine = engine();
    let dropped = engine.subscribe();
    let rx = engine.subscribe();
    drop(dropped);

    engine.enqueue(vec![track("a")]);
    engine.set_volume(0.5);

    let states: Vec<PlaybackState> = rx
        .try_iter()
        .filter_map(|e| match e {
            EngineEvent::StateChanged(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].queue.len(), 1);
    assert_eq!(states[1].volume, 0.5);
}

#[test]
fn unchanged_state_is_not_republished() {
    let mut engine = engine_with_queue(&["a"]);
    let rx = engine.subscribe();
    engine.pause();
    engine.set_repeat(RepeatMode::None);
    assert!(rx.try_recv().is_err());
}

#[test]
fn dispose_releases_media_and_goes_idle() {
    let mut engine = engine_with_queue(&["a"]);
    engine.play(None).unwrap();
    engine.dispose();
    assert_eq!(engine.snapshot().transport, TransportState::Idle);
    assert_eq!(engine.media().calls.last(), Some(&MediaCall::Release));
}
