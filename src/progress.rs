// Copyright (c) 2026 rezky_nightky

//! Host-side progress signal and the labels derived from it.

use std::time::{Duration, Instant};

use crate::corpus::PROGRESS_PHASES;
use crate::rng::RandomSource;

pub const SLOW_STEP: Duration = Duration::from_millis(200);
pub const FAST_STEP: Duration = Duration::from_millis(150);
pub const STALL_CHANCE: f32 = 0.2;
pub const SLOW_GAIN: (f32, f32) = (0.5, 2.5);
pub const FAST_GAIN: (f32, f32) = (1.0, 4.0);
pub const STATUS_STEP: Duration = Duration::from_millis(300);
pub const STATUS_GAIN: (f32, f32) = (2.0, 7.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProgressMode {
    /// Two overlapping random walks, one of which occasionally stalls.
    Stochastic,
    /// Straight line from 0 to 100 over the given time.
    Linear(Duration),
}

#[derive(Clone, Debug)]
pub struct ProgressDriver {
    mode: ProgressMode,
    value: f32,
    started: Option<Instant>,
    slow_next: Option<Instant>,
    fast_next: Option<Instant>,
}

impl ProgressDriver {
    pub fn new(mode: ProgressMode) -> Self {
        Self {
            mode,
            value: 0.0,
            started: None,
            slow_next: None,
            fast_next: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
        self.slow_next = Some(now + SLOW_STEP);
        self.fast_next = Some(now + FAST_STEP);
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_complete(&self) -> bool {
        self.value >= 100.0
    }

    /// Advances to `now` and returns the new value.
    pub fn poll(&mut self, now: Instant, rng: &mut dyn RandomSource) -> f32 {
        let Some(started) = self.started else {
            return self.value;
        };
        if self.is_complete() {
            return self.value;
        }

        match self.mode {
            ProgressMode::Linear(total) => {
                let total = total.as_secs_f32().max(0.001);
                let elapsed = now.saturating_duration_since(started).as_secs_f32();
                self.value = (elapsed / total * 100.0).min(100.0);
            }
            ProgressMode::Stochastic => {
                while let (Some(slow), Some(fast)) = (self.slow_next, self.fast_next) {
                    let at = slow.min(fast);
                    if at > now || self.is_complete() {
                        break;
                    }
                    if slow <= fast {
                        if !rng.chance(STALL_CHANCE) {
                            self.value += rng.range(SLOW_GAIN.0, SLOW_GAIN.1);
                        }
                        self.slow_next = Some(slow + SLOW_STEP);
                    } else {
                        self.value += rng.range(FAST_GAIN.0, FAST_GAIN.1);
                        self.fast_next = Some(fast + FAST_STEP);
                    }
                    self.value = self.value.min(100.0);
                }
            }
        }

        if self.is_complete() {
            log::info!("progress complete");
        }
        self.value
    }

    #[cfg(test)]
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.is_complete() {
            return None;
        }
        match self.mode {
            ProgressMode::Linear(_) => None,
            ProgressMode::Stochastic => match (self.slow_next, self.fast_next) {
                (Some(a), Some(b)) => Some(a.min(b)),
                _ => None,
            },
        }
    }

    pub fn phase(&self) -> &'static str {
        phase_for(self.value)
    }

    pub fn eta_secs(&self) -> u32 {
        ((100.0 - self.value).max(0.0) * 0.1).round() as u32
    }

    /// Alert level that escalates at fixed times after start: 0..=4.
    pub fn alert_level(&self, now: Instant) -> u8 {
        let Some(started) = self.started else {
            return 0;
        };
        let ms = now.saturating_duration_since(started).as_millis();
        match ms {
            0..=999 => 0,
            1000..=2999 => 1,
            3000..=4999 => 2,
            5000..=6999 => 3,
            _ => 4,
        }
    }
}

pub fn phase_for(progress: f32) -> &'static str {
    let n = PROGRESS_PHASES.len();
    let idx = ((progress.max(0.0) / 100.0) * n as f32).floor() as usize;
    PROGRESS_PHASES[idx.min(n - 1)]
}

pub fn banner_for(progress: f32) -> &'static str {
    if progress < 25.0 {
        "INITIALIZING QUANTUM SYSTEMS"
    } else if progress < 50.0 {
        "BYPASSING SECURITY PROTOCOLS"
    } else if progress < 75.0 {
        "ESTABLISHING NEURAL CONNECTIONS"
    } else if progress < 100.0 {
        "PREPARING DIMENSIONAL JOURNEY"
    } else {
        "TRANSCENDENCE ACHIEVED"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Initializing,
    Loading,
    Standby,
    Connecting,
    Bypassing,
    Awakening,
    Active,
    Online,
    Ready,
}

impl StatusLevel {
    pub fn label(self) -> &'static str {
        match self {
            StatusLevel::Initializing => "[INITIALIZING]",
            StatusLevel::Loading => "[LOADING]",
            StatusLevel::Standby => "[STANDBY]",
            StatusLevel::Connecting => "[CONNECTING]",
            StatusLevel::Bypassing => "[BYPASSING]",
            StatusLevel::Awakening => "[AWAKENING]",
            StatusLevel::Active => "[ACTIVE]",
            StatusLevel::Online => "[ONLINE]",
            StatusLevel::Ready => "[READY]",
        }
    }

    fn next(self, progress: f32) -> Self {
        if progress >= 100.0 {
            return StatusLevel::Ready;
        }
        match self {
            StatusLevel::Initializing if progress > 25.0 => StatusLevel::Loading,
            StatusLevel::Loading if progress > 50.0 => StatusLevel::Active,
            StatusLevel::Active if progress > 75.0 => StatusLevel::Online,
            other => other,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusEntry {
    pub name: &'static str,
    pub level: StatusLevel,
    pub progress: f32,
}

/// Subsystem rows that fill independently of the main progress.
#[derive(Clone, Debug)]
pub struct StatusBoard {
    entries: Vec<StatusEntry>,
    next_at: Option<Instant>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        let entry = |name, level| StatusEntry {
            name,
            level,
            progress: 0.0,
        };
        Self {
            entries: vec![
                entry("CPU: Neural Processing Unit", StatusLevel::Initializing),
                entry("RAM: Consciousness Buffer", StatusLevel::Loading),
                entry("GPU: Reality Renderer", StatusLevel::Standby),
                entry("NET: Quantum Entanglement", StatusLevel::Connecting),
                entry("SEC: Firewall Matrix", StatusLevel::Bypassing),
                entry("SYS: Digital Consciousness", StatusLevel::Awakening),
            ],
            next_at: None,
        }
    }
}

impl StatusBoard {
    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    pub fn start(&mut self, now: Instant) {
        self.next_at = Some(now + STATUS_STEP);
    }

    pub fn poll(&mut self, now: Instant, rng: &mut dyn RandomSource) {
        while let Some(at) = self.next_at {
            if at > now {
                break;
            }
            for e in &mut self.entries {
                e.progress = (e.progress + rng.range(STATUS_GAIN.0, STATUS_GAIN.1)).min(100.0);
                e.level = e.level.next(e.progress);
            }
            self.next_at = if self.entries.iter().all(|e| e.level == StatusLevel::Ready) {
                None
            } else {
                Some(at + STATUS_STEP)
            };
        }
    }
}
