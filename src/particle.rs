// Copyright (c) 2026 rezky_nightky

use std::collections::VecDeque;

/// Shared record for stars, arm points and sparks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Depth. Stars use `[0, 1000)`, arm points `[0, 100)`.
    pub z: f32,
    pub size: f32,
    pub brightness: f32,
    /// Drift speed for stars, phase rate for arm points.
    pub speed: f32,
    pub vx: f32,
    pub vy: f32,
    /// Index into the palette slot the owning layer draws from.
    pub tint: u8,
    pub life: f32,
}

/// Particles in insertion order, which is also draw order. A non-zero
/// capacity evicts the oldest record on overflow.
#[derive(Clone, Debug, Default)]
pub struct ParticlePool {
    items: VecDeque<Particle>,
    cap: usize,
}

impl ParticlePool {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn unbounded() -> Self {
        Self::with_capacity(0)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends `p`, returning the evicted oldest record if the cap was hit.
    pub fn push(&mut self, p: Particle) -> Option<Particle> {
        let evicted = if self.cap > 0 && self.items.len() >= self.cap {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(p);
        evicted
    }

    /// Runs `f` on every particle in order; those for which it returns
    /// `false` are retired. Returns how many were retired.
    pub fn tick<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&mut Particle) -> bool,
    {
        let before = self.items.len();
        self.items.retain_mut(|p| f(p));
        before - self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.items.iter()
    }
}

impl Extend<Particle> for ParticlePool {
    fn extend<I: IntoIterator<Item = Particle>>(&mut self, iter: I) {
        for p in iter {
            self.push(p);
        }
    }
}

impl FromIterator<Particle> for ParticlePool {
    fn from_iter<I: IntoIterator<Item = Particle>>(iter: I) -> Self {
        let mut pool = Self::unbounded();
        pool.extend(iter);
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> Particle {
        Particle {
            x,
            life: 1.0,
            ..Particle::default()
        }
    }

    #[test]
    fn capped_pool_evicts_oldest_first() {
        let mut pool = ParticlePool::with_capacity(3);
        for i in 0..3 {
            assert!(pool.push(at(i as f32)).is_none());
        }
        let evicted = pool.push(at(3.0)).expect("over cap");
        assert_eq!(evicted.x, 0.0);
        let xs: Vec<f32> = pool.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn tick_mutates_in_place_and_retires() {
        let mut pool: ParticlePool = (0..5).map(|i| at(i as f32)).collect();
        let retired = pool.tick(|p| {
            p.life -= 0.5 * p.x;
            p.life > 0.0
        });
        assert_eq!(retired, 3);
        assert_eq!(pool.len(), 2);
        assert!(pool.iter().all(|p| p.life > 0.0));
    }

    #[test]
    fn unbounded_pool_never_evicts() {
        let mut pool = ParticlePool::unbounded();
        for i in 0..1_000 {
            assert!(pool.push(at(i as f32)).is_none());
        }
        assert_eq!(pool.len(), 1_000);
    }
}
