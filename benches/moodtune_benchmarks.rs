//! # Moodtune Performance Benchmarks
//!
//! Benchmarks for the playlist ranker and track parsing.
//!
//! ```bash
//! cargo bench
//! cargo bench playlist
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use moodtune::playlist::generate_playlist;
use moodtune::track::{parse_tracks, Track};
use serde_json::json;
use std::hint::black_box;

const MOODS: [&str; 5] = ["Happy", "Sad", "Calm", "Angry", "Neutral"];

/// Helper function to create a JSON track list with mixed tags and ties
fn create_track_json(count: usize) -> String {
    let tracks: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "name": format!("Song {i:05}"),
                "artist": format!("Artist {}", i / 20),
                "tags": [MOODS[i % MOODS.len()], MOODS[(i / 7) % MOODS.len()]],
                "popularity": (i * 37) % 101,
            })
        })
        .collect();
    serde_json::Value::from(tracks).to_string()
}

fn create_tracks(count: usize) -> Vec<Track> {
    parse_tracks(&create_track_json(count)).expect("benchmark tracks are valid")
}

/// Benchmark ranking over growing libraries
fn benchmark_playlist_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("playlist_ranking");

    for size in [10, 100, 1000, 10_000] {
        let tracks = create_tracks(size);

        group.bench_with_input(BenchmarkId::new("generate_playlist", size), &tracks, |b, tracks| {
            b.iter(|| generate_playlist(black_box("Happy"), black_box(tracks)))
        });
    }

    let tracks = create_tracks(1000);
    group.bench_function("no_matches_1000", |b| {
        b.iter(|| generate_playlist(black_box("Euphoric"), black_box(&tracks)))
    });

    group.finish();
}

/// Benchmark input validation
fn benchmark_track_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("track_parsing");

    for size in [100, 1000] {
        let json = create_track_json(size);
        group.bench_with_input(BenchmarkId::new("parse_tracks", size), &json, |b, json| {
            b.iter(|| parse_tracks(black_box(json)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_playlist_ranking, benchmark_track_parsing);
criterion_main!(benches);
