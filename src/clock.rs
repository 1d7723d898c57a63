// Copyright (c) 2026 rezky_nightky

//! Per-layer animation clocks and the host's frame pacing.

use std::time::{Duration, Instant};

/// Proof of a particular `start`. Only the newest handle can stop a clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockHandle {
    epoch: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTick {
    /// Frames fired since the matching `start`, starting at 0.
    pub index: u64,
    /// Time since the previous fire, or since `start` for the first one.
    pub dt: Duration,
    pub now: Instant,
}

#[derive(Clone, Debug, Default)]
pub struct Clock {
    epoch: u64,
    running: bool,
    last: Option<Instant>,
    frames: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Instant) -> ClockHandle {
        self.epoch = self.epoch.wrapping_add(1);
        self.running = true;
        self.last = Some(now);
        self.frames = 0;
        ClockHandle { epoch: self.epoch }
    }

    /// Returns whether this call stopped the clock. Repeated stops and
    /// handles from an earlier `start` do nothing.
    pub fn stop(&mut self, handle: ClockHandle) -> bool {
        if !self.running || handle.epoch != self.epoch {
            return false;
        }
        self.running = false;
        true
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs `f` once for this frame if the clock is live.
    pub fn fire<F>(&mut self, now: Instant, f: F) -> bool
    where
        F: FnOnce(FrameTick),
    {
        if !self.running {
            return false;
        }
        let dt = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        let tick = FrameTick {
            index: self.frames,
            dt,
            now,
        };
        self.last = Some(now);
        self.frames += 1;
        f(tick);
        true
    }
}

/// Fixed-period frame deadlines that never try to catch up after a stall.
#[derive(Clone, Copy, Debug)]
pub struct FramePacer {
    period: Duration,
    next: Instant,
}

impl FramePacer {
    pub fn new(fps: f64, now: Instant) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 60.0 };
        Self {
            period: Duration::from_secs_f64(1.0 / fps),
            next: now,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    #[cfg(test)]
    pub fn next_frame(&self) -> Instant {
        self.next
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    pub fn timeout(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    pub fn mark(&mut self, now: Instant) {
        self.next += self.period;
        if now > self.next {
            self.next = now;
        }
    }
}

/// Work-time accounting for `--perf-stats`.
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub frames: u64,
    pub drawn_frames: u64,
    pub overshoot_frames: u64,
    work_sum_s: f64,
    work_max_s: f64,
}

impl PerfStats {
    pub fn record(&mut self, work: Duration, drawn: bool, period: Duration) {
        let work_s = work.as_secs_f64();
        self.frames = self.frames.saturating_add(1);
        if drawn {
            self.drawn_frames = self.drawn_frames.saturating_add(1);
        }
        if work > period {
            self.overshoot_frames = self.overshoot_frames.saturating_add(1);
        }
        self.work_sum_s += work_s;
        self.work_max_s = self.work_max_s.max(work_s);
    }

    pub fn summary(&self, elapsed: Duration, target_fps: f64) -> String {
        let elapsed_s = elapsed.as_secs_f64().max(0.000_001);
        let frames = self.frames.max(1) as f64;
        let pct = |n: u64| n as f64 / frames * 100.0;
        let mut out = String::from("PERF STATS:\n");
        out.push_str(&format!("  elapsed_s: {:.3}\n", elapsed_s));
        out.push_str(&format!("  target_fps: {:.3}\n", target_fps));
        out.push_str(&format!("  avg_fps: {:.3}\n", self.frames as f64 / elapsed_s));
        out.push_str(&format!("  frames: {}\n", self.frames));
        out.push_str(&format!(
            "  drawn_frames: {} ({:.1}%)\n",
            self.drawn_frames,
            pct(self.drawn_frames)
        ));
        out.push_str(&format!(
            "  avg_work_ms: {:.3}\n",
            self.work_sum_s / frames * 1000.0
        ));
        out.push_str(&format!("  max_work_ms: {:.3}\n", self.work_max_s * 1000.0));
        out.push_str(&format!(
            "  overshoot_frames: {} ({:.1}%)",
            self.overshoot_frames,
            pct(self.overshoot_frames)
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_only_runs_while_started() {
        let t0 = Instant::now();
        let mut clock = Clock::new();
        assert!(!clock.fire(t0, |_| panic!("not started")));

        let h = clock.start(t0);
        let mut seen = Vec::new();
        assert!(clock.fire(t0 + Duration::from_millis(16), |t| seen.push(t)));
        assert!(clock.fire(t0 + Duration::from_millis(40), |t| seen.push(t)));
        assert_eq!(seen[0].index, 0);
        assert_eq!(seen[0].dt, Duration::from_millis(16));
        assert_eq!(seen[1].dt, Duration::from_millis(24));

        assert!(clock.stop(h));
        assert!(!clock.fire(t0 + Duration::from_millis(60), |_| panic!("stopped")));
    }

    #[test]
    fn stop_is_idempotent_and_ignores_stale_handles() {
        let t0 = Instant::now();
        let mut clock = Clock::new();
        let old = clock.start(t0);
        assert!(clock.stop(old));
        assert!(!clock.stop(old));

        let new = clock.start(t0);
        assert!(!clock.stop(old));
        assert!(clock.is_running());
        assert!(clock.stop(new));
        assert!(!clock.is_running());
    }

    #[test]
    fn independent_clocks_share_nothing() {
        let t0 = Instant::now();
        let mut a = Clock::new();
        let mut b = Clock::new();
        let ha = a.start(t0);
        b.start(t0);
        a.stop(ha);
        assert!(b.fire(t0, |_| {}));
        assert_eq!(b.frames(), 1);
        assert_eq!(a.frames(), 0);
    }

    #[test]
    fn pacer_skips_missed_frames_instead_of_bursting() {
        let t0 = Instant::now();
        let mut p = FramePacer::new(50.0, t0);
        assert!(p.is_due(t0));
        p.mark(t0);
        assert_eq!(p.next_frame(), t0 + Duration::from_millis(20));
        assert_eq!(p.timeout(t0 + Duration::from_millis(5)), Duration::from_millis(15));

        let late = t0 + Duration::from_millis(500);
        p.mark(late);
        assert_eq!(p.next_frame(), late);
    }

    #[test]
    fn perf_stats_count_overshoots() {
        let mut s = PerfStats::default();
        let period = Duration::from_millis(16);
        s.record(Duration::from_millis(4), true, period);
        s.record(Duration::from_millis(30), false, period);
        assert_eq!(s.frames, 2);
        assert_eq!(s.drawn_frames, 1);
        assert_eq!(s.overshoot_frames, 1);
        assert!(s.summary(Duration::from_secs(1), 60.0).contains("frames: 2"));
    }

    #[test]
    fn idle_ticks_are_not_counted_as_drawn() {
        let mut s = PerfStats::default();
        let period = Duration::from_millis(16);
        for ran in [3usize, 0, 0, 2] {
            s.record(Duration::from_millis(1), ran > 0, period);
        }
        assert_eq!(s.frames, 4);
        assert_eq!(s.drawn_frames, 2);
        assert!(s.summary(Duration::from_secs(1), 60.0).contains("drawn_frames: 2 (50.0%)"));
    }
}
