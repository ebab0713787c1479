// Copyright (c) 2026 rezky_nightky

use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug)]
pub struct FramePacer {
    interval: Duration,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.interval.saturating_sub(elapsed)
    }

    /// Sleeps out the frame that began at `started`; returns the work time.
    pub fn pace(&self, started: Instant) -> Duration {
        let work = started.elapsed();
        let rest = self.remaining(work);
        if !rest.is_zero() {
            thread::sleep(rest);
        }
        work
    }
}

#[derive(Clone, Debug)]
pub struct PerfStats {
    started: Instant,
    target: Duration,
    frames: u64,
    work_sum_s: f64,
    work_max_s: f32,
    overshoot_frames: u64,
}

impl PerfStats {
    pub fn new(target: Duration) -> Self {
        Self {
            started: Instant::now(),
            target,
            frames: 0,
            work_sum_s: 0.0,
            work_max_s: 0.0,
            overshoot_frames: 0,
        }
    }

    pub fn record(&mut self, work: Duration) {
        let work_s = work.as_secs_f32();
        self.frames = self.frames.saturating_add(1);
        self.work_sum_s += work_s as f64;
        self.work_max_s = self.work_max_s.max(work_s);
        if work > self.target {
            self.overshoot_frames = self.overshoot_frames.saturating_add(1);
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn overshoot_frames(&self) -> u64 {
        self.overshoot_frames
    }

    pub fn avg_work_ms(&self) -> f64 {
        (self.work_sum_s / self.frames.max(1) as f64) * 1000.0
    }

    pub fn print(&self) {
        let elapsed_s = self.started.elapsed().as_secs_f64().max(0.000_001);
        let frames = self.frames().max(1) as f64;
        let target_fps = 1.0 / self.target.as_secs_f64().max(0.000_001);

        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_frame_ms: {:.3}", self.target.as_secs_f64() * 1000.0);
        println!("  target_fps: {:.3}", target_fps);
        println!("  avg_fps: {:.3}", self.frames as f64 / elapsed_s);
        println!("  frames: {}", self.frames);
        println!("  avg_work_ms: {:.3}", self.avg_work_ms());
        println!("  max_work_ms: {:.3}", self.work_max_s as f64 * 1000.0);
        println!(
            "  overshoot_frames: {} ({:.1}%)",
            self.overshoot_frames(),
            self.overshoot_frames() as f64 / frames * 100.0
        );
    }
}
