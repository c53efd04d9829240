//! Demo: ASCII Canvas
//!
//! Implements a `RenderSink` that rasterizes the envelope outline, trace and
//! playhead into a character grid, then plays a note through it.
//!
//! Run with: cargo run --example ascii_canvas

use adsr_editor::prelude::*;

const WIDTH: usize = 72;
const HEIGHT: usize = 16;

struct AsciiCanvas {
    frames: usize,
    snapshot_every: usize,
}

impl AsciiCanvas {
    fn plot(grid: &mut [[char; WIDTH + 1]], p: Point, c: char) {
        let x = (p.x.round() as usize).min(WIDTH);
        let y = (p.y.round() as usize).min(HEIGHT - 1);
        grid[y][x] = c;
    }
}

impl RenderSink for AsciiCanvas {
    fn redraw(&mut self, frame: &RenderFrame<'_>) {
        self.frames += 1;
        let Some(playhead) = frame.playhead else {
            return;
        };
        if self.frames % self.snapshot_every != 0 {
            return;
        }

        let mut grid = [[' '; WIDTH + 1]; HEIGHT];
        for p in &frame.path.outline {
            Self::plot(&mut grid, *p, '.');
        }
        for p in frame.trace {
            Self::plot(&mut grid, *p, '*');
        }
        let x = (playhead.x.round() as usize).min(WIDTH);
        for row in grid.iter_mut() {
            if row[x] == ' ' {
                row[x] = '|';
            }
        }
        Self::plot(&mut grid, playhead.dot, '@');

        for row in &grid {
            println!("{}", row.iter().collect::<String>());
        }
        println!("{}", "-".repeat(WIDTH + 1));
    }
}

fn main() {
    let params = EnvelopeParams::new(120.0, 200.0, 0.6, 400.0).with_curves(-0.5, 0.6, 0.4);
    let config = PlaybackConfig::default().with_sustain_hold(300.0);
    let path = EnvelopePath::compute(
        &params,
        Viewport::new(WIDTH as f64, (HEIGHT - 1) as f64),
        config.sustain_hold_ms,
    );

    println!(
        "Phase boundaries: attack={:.1} decay={:.1} sustain={:.1}",
        path.boundaries.attack, path.boundaries.decay, path.boundaries.sustain
    );

    let canvas = AsciiCanvas {
        frames: 0,
        snapshot_every: 15,
    };
    let observer = Fanout::new(RenderObserver::new(canvas, path), EventBuffer::new());
    let mut player = EnvelopePlayer::with_config(ManualScheduler::new(), observer, config);

    player.start(0.0);
    let mut now = 0.0;
    while player.advance_frame(now, &params) {
        now += 1000.0 / 60.0;
    }

    let events = player.observer_mut().b.drain_events();
    println!("{} events, final value {:?}", events.len(), events.iter().rev().find_map(|e| e.sample()));
}
