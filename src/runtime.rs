// Copyright (c) 2026 rezky_nightky

use std::str::FromStr;
use std::time::Duration;

use crate::rng::RandomSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Galaxy,
    Rain,
    Sparks,
}

impl LayerKind {
    pub fn label(self) -> &'static str {
        match self {
            LayerKind::Galaxy => "galaxy",
            LayerKind::Rain => "rain",
            LayerKind::Sparks => "sparks",
        }
    }
}

/// Half-open millisecond range `[low, high)`; `low == high` is a fixed delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MsRange {
    pub low: u32,
    pub high: u32,
}

impl MsRange {
    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    pub const fn fixed(ms: u32) -> Self {
        Self { low: ms, high: ms }
    }

    pub fn sample(&self, rng: &mut dyn RandomSource) -> Duration {
        rng.millis(self.low, self.high)
    }
}

impl FromStr for MsRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |v: &str, what: &str| -> Result<u32, String> {
            v.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid {} value", what))
        };
        match s.split_once(',') {
            Some((a, b)) => {
                let low = parse(a, "low")?;
                let high = parse(b, "high")?;
                if low > high {
                    return Err("range must have low <= high".to_string());
                }
                Ok(Self { low, high })
            }
            None => Ok(Self::fixed(parse(s, "fixed")?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ms_range_parses_pairs_and_single_values() {
        assert_eq!("20,60".parse::<MsRange>().unwrap(), MsRange::new(20, 60));
        assert_eq!(" 50 ".parse::<MsRange>().unwrap(), MsRange::fixed(50));
        assert!("60,20".parse::<MsRange>().is_err());
        assert!("a,b".parse::<MsRange>().is_err());
    }
}
