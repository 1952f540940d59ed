//! Integration tests for the embedded player and its overlay
//!
//! These tests verify the player against recorded surfaces, including:
//! - Circular navigation and per-selection resets
//! - Stale callbacks from earlier selections
//! - The overlay running beside the embedded player
//! - Playlists built from content sources
//! - The async session loop

use anyhow::Result;
use showreel::content::{ContentSource, FallbackSource, ItemId, PlayableItem};
use showreel::media::MediaResolver;
use showreel::player::{
    spawn_session, EndOfMediaPolicy, MediaEvent, ModalOverlay, PlaybackController, PlaybackPhase,
    PlayerCommand, PlayerConfig, PlayerEvent, PlayerSession, SessionInput,
};
use showreel_integration_tests::mock_content::UnreachableSource;
use showreel_integration_tests::mock_media::{EventLog, FakeFullscreen, RecordingSurface, SurfaceCall};
use showreel_integration_tests::{playlist, TestFixture};
use std::time::{Duration, Instant};

fn controller(ids: &[&str]) -> (PlaybackController, RecordingSurface) {
    let surface = RecordingSurface::default();
    let controller = PlaybackController::new(playlist(ids), Box::new(surface.clone()), PlayerConfig::default());
    surface.take();
    (controller, surface)
}

fn overlay() -> (ModalOverlay, RecordingSurface) {
    let surface = RecordingSurface::default();
    let overlay = ModalOverlay::new(
        Box::new(surface.clone()),
        Box::new(FakeFullscreen::default()),
        Duration::from_secs(3),
    );
    (overlay, surface)
}

fn id(value: &str) -> ItemId {
    ItemId::from(value)
}

#[test]
fn test_next_wraps_back_to_start() {
    let (mut controller, _) = controller(&["a", "b", "c"]);
    controller.select_next();
    assert_eq!(controller.state().selected_index, Some(1));

    for _ in 0..3 {
        controller.select_next();
    }
    assert_eq!(controller.state().selected_index, Some(1));

    controller.select_next();
    controller.select_previous();
    assert_eq!(controller.state().selected_index, Some(1));
}

#[test]
fn test_selecting_mid_playback_resets() {
    let (mut controller, surface) = controller(&["a", "b", "c"]);

    controller.on_metadata_loaded(&id("a"), Duration::from_secs(90));
    controller.toggle_play_pause();
    controller.on_playing(&id("a"));
    controller.on_progress_tick(&id("a"), Duration::from_secs(45), Duration::from_secs(90));
    controller.toggle_description();
    assert_eq!(controller.state().progress_fraction, 0.5);
    surface.take();

    controller.select_index(1).unwrap();

    let state = controller.state();
    assert_eq!(state.phase, PlaybackPhase::Loading);
    assert!(!state.is_playing);
    assert_eq!(state.progress_fraction, 0.0);
    assert!(!state.has_error);
    assert!(!state.is_description_expanded);
    assert_eq!(surface.take(), vec![SurfaceCall::Reset, SurfaceCall::Load(id("b"))]);
}

#[test]
fn test_late_error_from_previous_item_is_ignored() {
    let (mut controller, _) = controller(&["a", "b", "c"]);
    controller.select_index(2).unwrap();
    controller.select_index(0).unwrap();

    controller.on_media_error(&id("c"), "MEDIA_ERR_SRC_NOT_SUPPORTED");
    controller.on_progress_tick(&id("c"), Duration::from_secs(10), Duration::from_secs(20));

    assert!(!controller.state().has_error);
    assert_eq!(controller.state().progress_fraction, 0.0);
}

#[test]
fn test_overlay_leaves_controller_untouched() {
    let (mut controller, player_surface) = controller(&["a", "b"]);
    controller.toggle_mute();
    player_surface.take();
    let before = controller.state().clone();

    let (mut overlay, overlay_surface) = overlay();
    let now = Instant::now();
    overlay.open(controller.current_item().unwrap(), now);
    overlay.on_key("m", now);
    overlay.on_key(" ", now);
    overlay.on_key("Escape", now);

    assert!(!overlay.is_open());
    assert_eq!(controller.state(), &before);
    assert!(player_surface.take().is_empty());
    assert_eq!(overlay_surface.take().last(), Some(&SurfaceCall::Reset));
}

#[test]
fn test_overlay_and_player_load_same_cdn_url() {
    let resolver = MediaResolver::new(Some("https://pub-1.r2.dev".to_string()));
    let items = vec![PlayableItem::new("a", "Reel").with_media("reels/a.mp4")];

    let player_surface = RecordingSurface::default();
    let controller = PlaybackController::new(items, Box::new(player_surface.clone()), PlayerConfig::default())
        .with_resolver(resolver.clone());

    let overlay_surface = RecordingSurface::default();
    let mut overlay = ModalOverlay::new(
        Box::new(overlay_surface.clone()),
        Box::new(FakeFullscreen::default()),
        Duration::from_secs(3),
    )
    .with_resolver(resolver);
    overlay.open(controller.current_item().unwrap(), Instant::now());

    assert_eq!(player_surface.loaded_urls(), vec!["https://pub-1.r2.dev/reels/a.mp4".to_string()]);
    assert_eq!(overlay_surface.loaded_urls(), player_surface.loaded_urls());
    assert!(overlay.error_message().is_none());
}

#[test]
fn test_failure_then_retry() {
    let (mut controller, surface) = controller(&["a", "b"]);
    let events = EventLog::default();
    controller.add_event_handler(Box::new(events.clone()));

    controller.on_media_error(&id("a"), "network");
    controller.toggle_play_pause();
    controller.retry();
    controller.on_metadata_loaded(&id("a"), Duration::from_secs(30));
    controller.toggle_play_pause();
    controller.on_playing(&id("a"));

    assert!(controller.state().is_playing);
    assert_eq!(
        events.events(),
        vec![
            PlayerEvent::MediaFailed {
                item: id("a"),
                message: "network".to_string()
            },
            PlayerEvent::PlaybackStarted { item: id("a") },
        ]
    );
    assert_eq!(
        surface.take(),
        vec![
            SurfaceCall::Pause,
            SurfaceCall::Reset,
            SurfaceCall::Load(id("a")),
            SurfaceCall::Play
        ]
    );
}

#[test]
fn test_advance_policy_plays_through() {
    let config = PlayerConfig {
        end_of_media: EndOfMediaPolicy::Advance,
        ..PlayerConfig::default()
    };
    let mut controller = PlaybackController::new(playlist(&["a", "b"]), Box::new(RecordingSurface::default()), config);

    controller.toggle_play_pause();
    controller.on_playing(&id("a"));
    controller.on_media_ended(&id("a"));
    controller.on_playing(&id("b"));
    controller.on_media_ended(&id("b"));

    assert_eq!(controller.state().selected_index, Some(0));
    assert!(controller.state().play_pending);
}

#[tokio::test]
async fn test_playlist_from_fallback_content() -> Result<()> {
    let fixture = TestFixture::new()?;
    let source = FallbackSource::new(Box::new(UnreachableSource), fixture.static_source()?);

    let items = source.list().await?;
    assert_eq!(items.len(), 2);

    let controller = PlaybackController::new(items, Box::new(RecordingSurface::default()), PlayerConfig::default())
        .with_resolver(MediaResolver::new(Some("https://pub-9.r2.dev".to_string())));

    assert_eq!(controller.state().phase, PlaybackPhase::Loading);
    assert_eq!(
        controller.poster_for(1)?.as_deref(),
        Some("https://pub-9.r2.dev/thumbs/stills.jpg?width=640&format=webp")
    );
    assert!(!controller.state().playlist[1].is_playable());

    Ok(())
}

#[tokio::test]
async fn test_session_drives_player_and_overlay() -> Result<()> {
    let (controller, player_surface) = controller(&["a", "b"]);
    let (overlay, overlay_surface) = overlay();
    let (handle, task) = spawn_session(PlayerSession::new(controller, overlay), Duration::from_millis(10));

    handle.command(PlayerCommand::Next)?;
    handle.send(SessionInput::OpenOverlay)?;
    handle.send(SessionInput::OverlayMedia(MediaEvent::Error {
        item: id("b"),
        message: "404".to_string(),
    }))?;
    handle.shutdown()?;

    let session = task.await?;
    assert_eq!(session.controller.state().selected_index, Some(1));
    assert!(!session.controller.state().has_error);
    assert!(session.overlay.error_message().is_some());

    assert_eq!(player_surface.take(), vec![SurfaceCall::Reset, SurfaceCall::Load(id("b"))]);
    assert_eq!(
        overlay_surface.take(),
        vec![SurfaceCall::Load(id("b")), SurfaceCall::Muted(false), SurfaceCall::Play]
    );

    Ok(())
}
