// Copyright (c) 2026 rezky_nightky

use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::KeyCode;

use crate::cache::{GlyphCache, Shade};
use crate::config::Settings;
use crate::error::Result;
use crate::font::Font;
use crate::frame::Frame;
use crate::geometry::Geometry;
use crate::pacer::{FramePacer, PerfStats};
use crate::palette::background;
use crate::rain::Rain;
use crate::render::render_frame;
use crate::runtime::LoopState;
use crate::terminal::{InputEvent, Screen, Terminal};

pub fn next_state(
    state: LoopState,
    events: &[InputEvent],
    now: Instant,
    deadline: Option<Instant>,
) -> LoopState {
    if state == LoopState::Stopped {
        return LoopState::Stopped;
    }
    let quit = events
        .iter()
        .any(|e| matches!(e, InputEvent::Quit | InputEvent::KeyDown(KeyCode::Esc)));
    if quit || deadline.is_some_and(|end| now >= end) {
        LoopState::Stopped
    } else {
        LoopState::Running
    }
}

pub struct Session {
    pub geometry: Geometry,
    pub rain: Rain,
    pub cache: GlyphCache,
    pub frame: Frame,
    pub pacer: FramePacer,
}

impl Session {
    pub fn prepare(settings: &Settings, font: &Font, width: u32, height: u32) -> Self {
        let geometry = Geometry::resolve(width, height, settings.glyph_size, settings.trail_len);
        tracing::info!(
            width,
            height,
            cols = geometry.cols,
            rows = geometry.rows,
            area = geometry.area,
            "geometry resolved"
        );

        let rain = Rain::new(&geometry, settings.rain_params(), settings.seed);
        let bg = background(settings.color_mode, settings.default_background);
        let cache = GlyphCache::build(
            font,
            &Shade {
                head: settings.head,
                trail: settings.trail,
                trail_len: settings.trail_len,
                alpha_unit: geometry.alpha_unit,
                shading: settings.shading,
                color_mode: settings.color_mode,
                bg,
            },
        );
        tracing::debug!(
            drops = rain.drops().iter().map(|&n| n as usize).sum::<usize>(),
            cached = cache.len(),
            "session ready"
        );

        let frame = Frame::new(
            geometry.cols,
            geometry.rows,
            (geometry.cell_width, geometry.cell_height),
            bg,
        );

        Self {
            geometry,
            rain,
            cache,
            frame,
            pacer: FramePacer::new(settings.frame_interval),
        }
    }

    /// poll → render → simulate → pace, until stopped. Returns the number of
    /// frames rendered.
    pub fn run_loop<S: Screen>(
        &mut self,
        screen: &mut S,
        deadline: Option<Instant>,
        mut stats: Option<&mut PerfStats>,
    ) -> io::Result<u64> {
        let mut state = LoopState::Running;
        let mut frames = 0u64;

        loop {
            let events = screen.poll_events()?;
            state = next_state(state, &events, Instant::now(), deadline);
            if state == LoopState::Stopped {
                break;
            }

            let started = Instant::now();
            render_frame(
                screen,
                &mut self.rain,
                &self.cache,
                &self.geometry,
                &mut self.frame,
            )?;
            let work = self.pacer.pace(started);
            frames += 1;
            if let Some(s) = stats.as_deref_mut() {
                s.record(work);
            }
        }

        tracing::info!(frames, sim_frame = self.rain.frame(), "rain stopped");
        Ok(frames)
    }
}

/// Acquires the terminal, the glyph face and the run state in order, then
/// rains until stopped. Each guard is released on every exit path; the
/// terminal is restored before this returns.
pub fn run(settings: &Settings, quit: Arc<AtomicBool>) -> Result<Option<PerfStats>> {
    let mut term = Terminal::new(quit)?;
    let font = Font::open(&settings.font, settings.glyph_size, settings.default_to_ascii)?;
    let (width, height) = term.pixel_size(settings.glyph_size)?;

    let mut session = Session::prepare(settings, &font, width, height);
    let deadline = settings.duration.map(|d| Instant::now() + d);
    let mut stats = settings
        .perf_stats
        .then(|| PerfStats::new(settings.frame_interval));

    session.run_loop(&mut term, deadline, stats.as_mut())?;
    drop(session);
    drop(term);
    Ok(stats)
}
