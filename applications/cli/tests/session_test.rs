/// Session tests
/// Drive a session end to end on tokio's paused clock
use cassette_cli::{ClockEngine, CliError, Command, Outcome, PollTimer, Session};
use cassette_playback::{PlayMode, PlayerConfig, PlayerStatus};
use std::path::Path;
use std::time::Duration;

/// Session whose tracks last `secs` each, whatever the file
fn session_with(config: PlayerConfig, secs: u64) -> Session {
    let engine =
        ClockEngine::with_probe(Box::new(move |_: &Path| Ok(Duration::from_secs(secs))));
    Session::new(config, Box::new(engine))
}

fn session(secs: u64) -> Session {
    session_with(PlayerConfig::default(), secs)
}

fn run(session: &mut Session, line: &str) -> Outcome {
    session.execute(Command::parse(line).unwrap()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn position_follows_clock_through_ticks() {
    let mut session = session(120);
    session.add_paths(&["/music/a.mp3", "/music/b.mp3"]).unwrap();

    tokio::time::advance(Duration::from_secs(3)).await;
    session.tick();

    let state = session.player().state();
    assert!(state.is_playing());
    assert_eq!(state.current_time(), 3.0);
    assert_eq!(state.duration(), 120.0);
}

#[tokio::test(start_paused = true)]
async fn skip_commands_clamp_to_track() {
    let mut session = session(120);
    session.add_paths(&["/music/a.mp3"]).unwrap();

    run(&mut session, "seek 1:55");
    session.tick();
    run(&mut session, "ff");
    assert_eq!(session.player().state().current_time(), 120.0);

    run(&mut session, "seek 5");
    run(&mut session, "rw");
    assert_eq!(session.player().state().current_time(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn rate_speeds_up_reconciled_position() {
    let mut session = session(120);
    session.add_paths(&["/music/a.mp3"]).unwrap();

    run(&mut session, "rate 2");
    tokio::time::advance(Duration::from_secs(5)).await;
    session.tick();
    assert_eq!(session.player().state().current_time(), 10.0);

    let err = session.execute(Command::Rate(0.75)).unwrap_err();
    assert!(matches!(err, CliError::Playback(_)));
}

#[tokio::test(start_paused = true)]
async fn end_of_track_advances_and_wraps() {
    let mut session = session(10);
    session
        .add_paths(&["/music/a.mp3", "/music/b.mp3"])
        .unwrap();
    session.drain_events();

    tokio::time::advance(Duration::from_secs(11)).await;
    session.tick();
    assert_eq!(session.player().state().current_index(), Some(1));
    assert!(session
        .drain_events()
        .iter()
        .any(|line| line.contains("b.mp3")));

    tokio::time::advance(Duration::from_secs(11)).await;
    session.tick();
    assert_eq!(session.player().state().current_index(), Some(0));
    assert!(session.player().state().is_playing());
}

#[tokio::test(start_paused = true)]
async fn single_mode_stops_at_end() {
    let config = PlayerConfig {
        mode: PlayMode::Single,
        ..Default::default()
    };
    let mut session = session_with(config, 10);
    session.add_paths(&["/music/a.mp3"]).unwrap();
    session.add_paths(&["/music/b.mp3"]).unwrap();
    assert_eq!(session.player().state().tracks().len(), 1);

    tokio::time::advance(Duration::from_secs(11)).await;
    session.tick();
    assert_eq!(session.player().state().status(), PlayerStatus::Ended);

    // Toggle replays from the top
    run(&mut session, "toggle");
    assert!(session.player().state().is_playing());
    assert_eq!(session.player().state().current_time(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn timer_runs_only_while_playing() {
    let mut session = session(60);
    let mut timer = PollTimer::new();
    let sync = |session: &Session, timer: &mut PollTimer| {
        let player = session.player();
        timer.sync(player.should_poll(), player.poll_interval());
    };

    sync(&session, &mut timer);
    assert!(!timer.is_running());

    session.add_paths(&["/music/a.mp3"]).unwrap();
    sync(&session, &mut timer);
    assert!(timer.is_running());

    timer.tick().await;
    session.tick();
    assert_eq!(session.player().state().current_time(), 1.0);

    run(&mut session, "pause");
    sync(&session, &mut timer);
    assert!(!timer.is_running());
}

#[tokio::test(start_paused = true)]
async fn unsupported_files_are_skipped() {
    let mut session = session(60);

    let added = session
        .add_paths(&["/music/notes.txt", "/music/a.mp3"])
        .unwrap();
    assert_eq!(added, 1);

    let err = session
        .execute(Command::parse("add /music/cover.jpg").unwrap())
        .unwrap_err();
    assert!(matches!(err, CliError::Unsupported(_)));
    assert_eq!(session.player().state().tracks().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_load_is_reported_and_recoverable() {
    let engine = ClockEngine::with_probe(Box::new(|path: &Path| {
        if path.ends_with("broken.mp3") {
            Err("no audio frames".to_string())
        } else {
            Ok(Duration::from_secs(30))
        }
    }));
    let mut session = Session::new(PlayerConfig::default(), Box::new(engine));

    session
        .add_paths(&["/music/broken.mp3", "/music/good.mp3"])
        .unwrap();
    assert_eq!(session.player().state().status(), PlayerStatus::Idle);
    assert!(session
        .drain_events()
        .iter()
        .any(|line| line.contains("no audio frames")));
    assert!(session.status_text().contains("no audio frames"));

    run(&mut session, "next");
    assert!(session.player().state().is_playing());
}

#[tokio::test(start_paused = true)]
async fn listing_and_removal() {
    let mut session = session(60);
    session
        .add_paths(&["/music/a.mp3", "/music/b.mp3", "/music/c.mp3"])
        .unwrap();

    run(&mut session, "select 2");
    match run(&mut session, "list") {
        Outcome::Continue(Some(text)) => {
            assert!(text.contains(">   2. b.mp3"));
            assert!(text.contains("    1. a.mp3"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    run(&mut session, "remove 1");
    assert_eq!(session.player().state().current_index(), Some(0));
    assert_eq!(
        session
            .player()
            .state()
            .current_track()
            .map(|t| t.display_name.as_str()),
        Some("b.mp3")
    );
    assert_eq!(session.player().live_sources(), 2);

    assert_eq!(run(&mut session, "quit"), Outcome::Quit);
}

#[tokio::test(start_paused = true)]
async fn volume_and_mute() {
    let mut session = session(60);
    session.add_paths(&["/music/a.mp3"]).unwrap();

    run(&mut session, "vol 0.4");
    run(&mut session, "mute");
    let state = session.player().state();
    assert_eq!(state.volume(), 0.4);
    assert_eq!(state.effective_volume(), 0.0);
    let status = session.status_text();
    assert!(status.contains("[muted]"));
    assert!(status.contains("vol 40%"));

    assert!(session.execute(Command::parse("vol loud").unwrap()).is_err());
}
