use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic randomness for the whole simulation. A master ChaCha8
/// generator derives one independent stream per consumer (seeding, movement,
/// infection, ...), so adding draws to one system never perturbs another.
pub struct RngManager {
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: HashMap::new(),
        }
    }

    /// Borrow the named stream, deriving it from the master generator on
    /// first use. Streams are derived in first-request order, which is fixed
    /// by the engine's system order, so runs with equal seeds replay exactly.
    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let entry = self.streams.entry(name.to_string()).or_insert_with(|| {
            let mut seed_bytes = [0u8; 8];
            self.master.fill_bytes(&mut seed_bytes);
            ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed_bytes))
        });
        SystemRng { inner: entry }
    }
}

pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for SystemRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn equal_seeds_replay_equal_streams() {
        let mut a = RngManager::new(7);
        let mut b = RngManager::new(7);
        let xs: Vec<u32> = (0..8).map(|_| a.stream("movement").gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.stream("movement").gen()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn streams_are_independent() {
        let mut a = RngManager::new(7);
        let _: u32 = a.stream("movement").gen();
        let infection_first: u32 = a.stream("infection").gen();

        // Same derivation order, but many more movement draws. The extra
        // consumption must not shift the infection stream.
        let mut b = RngManager::new(7);
        for _ in 0..100 {
            let _: u32 = b.stream("movement").gen();
        }
        let infection_after: u32 = b.stream("infection").gen();
        assert_eq!(infection_first, infection_after);
    }
}
