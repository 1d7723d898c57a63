// Copyright (c) 2026 rezky_nightky

//! Scripted log playback and the random command feed.
//!
//! Both schedulers are polled with the current instant and never sleep.
//! A poll that lands after several deadlines have passed replays every
//! missed step in order, so results depend only on the timeline and the
//! random source.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::rng::{pick, RandomSource};
use crate::runtime::MsRange;

pub const PROGRESS_DONE: f32 = 100.0;

/// Bounded FIFO; pushing past capacity drops the oldest entry.
#[derive(Clone, Debug)]
pub struct RollingHistory<T> {
    items: VecDeque<T>,
    cap: usize,
}

impl<T> RollingHistory<T> {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            items: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.cap {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Info,
    Ok,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    pub sequence_id: u64,
    pub text: String,
    pub tone: Tone,
    pub display_number: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Import,
    Function,
    Curl,
    Echo,
    Git,
    Sudo,
    Network,
    Exploit,
    Decrypt,
    System,
}

impl CommandKind {
    pub const COUNT: usize = 10;

    /// First matching rule wins, so the order here is significant.
    pub fn classify(cmd: &str) -> Self {
        let has = |needles: &[&str]| needles.iter().any(|n| cmd.contains(n));
        if has(&["import", "from"]) {
            CommandKind::Import
        } else if has(&["def ", "function"]) {
            CommandKind::Function
        } else if has(&["curl", "wget"]) {
            CommandKind::Curl
        } else if has(&["echo", "cat"]) {
            CommandKind::Echo
        } else if has(&["git", "commit"]) {
            CommandKind::Git
        } else if has(&["sudo", "rm"]) {
            CommandKind::Sudo
        } else if has(&["ssh", "nmap", "nc"]) {
            CommandKind::Network
        } else if has(&["hydra", "john", "hashcat"]) {
            CommandKind::Exploit
        } else if has(&["openssl", "gpg"]) {
            CommandKind::Decrypt
        } else {
            CommandKind::System
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRecord {
    pub sequence_id: u64,
    pub line_number: u32,
    pub text: String,
    pub kind: CommandKind,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TypingTiming {
    /// Delay from `start` to the first line.
    pub start_delay: Duration,
    /// Extra wait before the first character of every line.
    pub line_lead: Duration,
    pub char_delay: MsRange,
    pub pause: MsRange,
}

impl TypingTiming {
    pub const fn loading() -> Self {
        Self {
            start_delay: Duration::from_millis(500),
            line_lead: Duration::ZERO,
            char_delay: MsRange::new(20, 60),
            pause: MsRange::new(500, 1500),
        }
    }

    pub const fn boot_steps() -> Self {
        Self {
            start_delay: Duration::ZERO,
            line_lead: Duration::from_millis(50),
            char_delay: MsRange::fixed(50),
            pause: MsRange::fixed(300),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypingEvent {
    Reveal { line: usize, shown: usize },
    LineComplete { line: usize },
    Drained,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TyperState {
    Idle,
    Typing {
        line: usize,
        revealed: usize,
        next_at: Instant,
    },
    Pausing {
        line: usize,
        until: Instant,
    },
    Drained,
}

/// Types an ordered script one character at a time into a rolling history.
#[derive(Clone, Debug)]
pub struct ScriptedTyper {
    script: Vec<String>,
    timing: TypingTiming,
    tone: Tone,
    number_base: u32,
    history: RollingHistory<LogLine>,
    state: TyperState,
    next_sequence: u64,
    halted: bool,
}

impl ScriptedTyper {
    pub fn new(script: Vec<String>, timing: TypingTiming, tone: Tone, history_cap: usize) -> Self {
        Self {
            script,
            timing,
            tone,
            number_base: 0,
            history: RollingHistory::new(history_cap),
            state: TyperState::Idle,
            next_sequence: 0,
            halted: false,
        }
    }

    pub fn with_number_base(mut self, base: u32) -> Self {
        self.number_base = base;
        self
    }

    pub fn start(&mut self, now: Instant) {
        if self.state != TyperState::Idle {
            return;
        }
        self.state = if self.script.is_empty() {
            TyperState::Drained
        } else {
            TyperState::Typing {
                line: 0,
                revealed: 0,
                next_at: now + self.timing.start_delay + self.timing.line_lead,
            }
        };
    }

    /// Cooperative cancellation: at 100 the typer freezes for good, mid-line
    /// if a line is being revealed, rather than at the next line boundary.
    pub fn set_progress(&mut self, progress: f32) {
        if progress >= PROGRESS_DONE && !self.halted {
            self.halted = true;
            log::debug!("typer halted at line {:?}", self.current_line());
        }
    }

    #[cfg(test)]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    #[cfg(test)]
    pub fn is_drained(&self) -> bool {
        self.state == TyperState::Drained
    }

    pub fn history(&self) -> &RollingHistory<LogLine> {
        &self.history
    }

    /// Display number the line being typed will get once it completes.
    pub fn next_number(&self) -> u32 {
        self.number_base
            .saturating_add(self.next_sequence.min(u32::MAX as u64) as u32)
    }

    #[cfg(test)]
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.halted {
            return None;
        }
        match self.state {
            TyperState::Typing { next_at, .. } => Some(next_at),
            TyperState::Pausing { until, .. } => Some(until),
            TyperState::Idle | TyperState::Drained => None,
        }
    }

    pub fn current_line(&self) -> Option<usize> {
        match self.state {
            TyperState::Typing { line, .. } => Some(line),
            _ => None,
        }
    }

    /// The partially revealed line, while one is being typed.
    pub fn current_text(&self) -> Option<&str> {
        let TyperState::Typing { line, revealed, .. } = self.state else {
            return None;
        };
        let text = self.script.get(line)?;
        let end = text
            .char_indices()
            .nth(revealed)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        Some(&text[..end])
    }

    pub fn poll(&mut self, now: Instant, rng: &mut dyn RandomSource) -> Vec<TypingEvent> {
        let mut events = Vec::new();
        while !self.halted {
            match self.state {
                TyperState::Idle | TyperState::Drained => break,
                TyperState::Typing {
                    line,
                    revealed,
                    next_at,
                } => {
                    if now < next_at {
                        break;
                    }
                    let len = self.script[line].chars().count();
                    if revealed < len {
                        self.state = TyperState::Typing {
                            line,
                            revealed: revealed + 1,
                            next_at: next_at + self.timing.char_delay.sample(rng),
                        };
                        events.push(TypingEvent::Reveal {
                            line,
                            shown: revealed + 1,
                        });
                    } else {
                        self.complete_line(line);
                        events.push(TypingEvent::LineComplete { line });
                        self.state = TyperState::Pausing {
                            line,
                            until: next_at + self.timing.pause.sample(rng),
                        };
                    }
                }
                TyperState::Pausing { line, until } => {
                    if now < until {
                        break;
                    }
                    let next = line + 1;
                    if next < self.script.len() {
                        self.state = TyperState::Typing {
                            line: next,
                            revealed: 0,
                            next_at: until + self.timing.line_lead,
                        };
                    } else {
                        self.state = TyperState::Drained;
                        log::info!("script drained after {} lines", self.script.len());
                        events.push(TypingEvent::Drained);
                    }
                }
            }
        }
        events
    }

    fn complete_line(&mut self, line: usize) {
        let sequence_id = self.next_sequence;
        self.next_sequence += 1;
        let display_number = self
            .number_base
            .saturating_add(sequence_id.min(u32::MAX as u64) as u32);
        self.history.push(LogLine {
            sequence_id,
            text: self.script[line].clone(),
            tone: self.tone,
            display_number,
        });
    }
}

pub const FIRST_COMMAND_LINE: u32 = 2473;
pub const COMMAND_PREFILL: usize = 20;
pub const COMMAND_HISTORY_CAP: usize = 26;
pub const LOADING_HISTORY_CAP: usize = 7;
pub const LOADING_NUMBER_BASE: u32 = 89;

/// Appends random corpus lines on its own randomized timer.
#[derive(Clone, Debug)]
pub struct CommandInjector {
    corpus: Vec<String>,
    interval: MsRange,
    history: RollingHistory<CommandRecord>,
    next_line: u32,
    next_sequence: u64,
    next_at: Option<Instant>,
    halted: bool,
}

impl CommandInjector {
    pub fn new(corpus: Vec<String>, interval: MsRange, history_cap: usize) -> Self {
        Self {
            corpus,
            interval,
            history: RollingHistory::new(history_cap),
            next_line: FIRST_COMMAND_LINE,
            next_sequence: 0,
            next_at: None,
            halted: false,
        }
    }

    pub fn history(&self) -> &RollingHistory<CommandRecord> {
        &self.history
    }

    /// Line number the next injected record will carry.
    pub fn next_line(&self) -> u32 {
        self.next_line
    }

    pub fn prefill(&mut self, count: usize, rng: &mut dyn RandomSource) {
        for _ in 0..count {
            self.inject(rng);
        }
    }

    pub fn start(&mut self, now: Instant, rng: &mut dyn RandomSource) {
        if self.corpus.is_empty() || self.next_at.is_some() {
            return;
        }
        self.next_at = Some(now + self.interval.sample(rng));
    }

    pub fn set_progress(&mut self, progress: f32) {
        if progress >= PROGRESS_DONE && !self.halted {
            self.halted = true;
            log::debug!("command feed halted at line {}", self.next_line);
        }
    }

    #[cfg(test)]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    #[cfg(test)]
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.halted {
            None
        } else {
            self.next_at
        }
    }

    /// Returns how many records were appended.
    pub fn poll(&mut self, now: Instant, rng: &mut dyn RandomSource) -> usize {
        let mut appended = 0;
        while !self.halted {
            let Some(at) = self.next_at else { break };
            if now < at {
                break;
            }
            if self.inject(rng) {
                appended += 1;
            }
            self.next_at = Some(at + self.interval.sample(rng).max(Duration::from_millis(1)));
        }
        appended
    }

    fn inject(&mut self, rng: &mut dyn RandomSource) -> bool {
        let Some(text) = pick(rng, &self.corpus).cloned() else {
            return false;
        };
        let record = CommandRecord {
            sequence_id: self.next_sequence,
            line_number: self.next_line,
            kind: CommandKind::classify(&text),
            text,
        };
        self.next_sequence += 1;
        self.next_line = self.next_line.saturating_add(1);
        self.history.push(record);
        true
    }
}
