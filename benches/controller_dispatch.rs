use criterion::{black_box, criterion_group, criterion_main, Criterion};
use showreel::content::{ItemId, PlayableItem};
use showreel::media::{MediaResolver, DEFAULT_WIDTHS};
use showreel::player::{
    HeadlessSurface, MediaEvent, PlaybackController, PlayerCommand, PlayerConfig, PlayerInput,
};
use std::time::Duration;

fn playlist(len: usize) -> Vec<PlayableItem> {
    (0..len)
        .map(|i| {
            PlayableItem::new(format!("item{}", i), format!("Project {}", i))
                .with_media(format!("https://cdn.example.com/{}.mp4", i))
        })
        .collect()
}

fn benchmark_navigation(c: &mut Criterion) {
    c.bench_function("select_next_100", |b| {
        let mut controller = PlaybackController::new(playlist(100), Box::new(HeadlessSurface::default()), PlayerConfig::default());

        b.iter(|| {
            controller
                .dispatch(PlayerInput::Command(PlayerCommand::Next))
                .unwrap();
            black_box(controller.state().selected_index)
        });
    });
}

fn benchmark_progress_ticks(c: &mut Criterion) {
    c.bench_function("progress_tick", |b| {
        let mut controller = PlaybackController::new(playlist(10), Box::new(HeadlessSurface::default()), PlayerConfig::default());
        let item = ItemId::from("item0");
        let mut second = 0u64;

        b.iter(|| {
            second = (second + 1) % 120;
            controller
                .dispatch(PlayerInput::Media(MediaEvent::TimeUpdate {
                    item: item.clone(),
                    current: Duration::from_secs(second),
                    duration: Duration::from_secs(120),
                }))
                .unwrap();
            black_box(controller.state().progress_fraction)
        });
    });
}

fn benchmark_picture_sources(c: &mut Criterion) {
    let resolver = MediaResolver::new(Some("https://pub-123.r2.dev".to_string()));

    c.bench_function("picture_sources", |b| {
        b.iter(|| black_box(resolver.picture_sources("stills/urban-1.jpg", &DEFAULT_WIDTHS).unwrap()));
    });
}

criterion_group!(benches, benchmark_navigation, benchmark_progress_ticks, benchmark_picture_sources);

criterion_main!(benches);
