//! Demo: Envelope Trace
//!
//! Plays one note of each preset offline at 60 frames per second and prints
//! the sampled values, with playback lifecycle logging enabled.
//!
//! Run with: cargo run --example envelope_trace

use adsr_editor::prelude::*;
use tracing::Level;

fn main() {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let library = PresetLibrary::new();
    let config = PlaybackConfig::default().with_sustain_hold(300.0);
    let frame_ms = 1000.0 / 60.0;

    for preset in library.list() {
        println!("=== {} ({:?}) ===", preset.name, preset.category);
        println!("  {}", preset.description);

        let samples = render_playback(&preset.params, &config, frame_ms, None);
        for sample in samples.iter().step_by(6) {
            let bar = "#".repeat((sample.value * 40.0).round() as usize);
            println!("  {:>7.1}ms  {:.3}  {}", sample.time_ms, sample.value, bar);
        }

        let last = samples.last().map(|s| s.time_ms).unwrap_or(0.0);
        println!("  {} frames, finished at {:.1}ms\n", samples.len(), last);
    }

    // Releasing early decays from wherever the attack had reached
    let pad = library.params("Pad").unwrap_or_default();
    let samples = render_playback(&pad, &config, frame_ms, Some(200.0));
    let at_release = samples
        .iter()
        .find(|s| s.time_ms >= 200.0)
        .map(|s| s.value)
        .unwrap_or(0.0);
    println!("Pad released at 200ms from {:.3}", at_release);
}
