use std::fmt;

use rand_core::{impls, Error, RngCore, SeedableRng};
use tracing::{debug, trace};

use crate::seed;

const W: u32 = 32;
pub const N: usize = 624;
pub const M: usize = 397;
const R: u32 = 31;
const A: u32 = 0x9908B0DF;
const U: u32 = 11;
const S: u32 = 7;
const B: u32 = 0x9D2C5680;
const T: u32 = 15;
const C: u32 = 0xEFC60000;
const L: u32 = 18;
const F: u32 = 1812433253;
const LOWER_MASK: u32 = (1 << R) - 1;
const UPPER_MASK: u32 = !LOWER_MASK;

/// 2^32, the divisor turning a u32 output into a unit double.
const U32_RANGE: f64 = 4294967296.0;

/// MT19937 Mersenne Twister.
///
/// A generator starts unseeded. It is seeded either explicitly with [`Generator::seed`]
/// or, on the first extraction, from [`Generator::seed_from_system`].
#[derive(Clone)]
pub struct Generator {
    state: [u32; N],
    // Index of the next word of `state` to emit
    next: usize,
    // Words left in `state` before a refresh is needed; always N - next once seeded
    remaining: usize,
    seeded: bool,
    static_system_seed: bool,
}

impl Generator {
    pub fn new() -> Generator {
        Generator {
            state: [0; N],
            next: 0,
            remaining: 0,
            seeded: false,
            static_system_seed: false,
        }
    }

    pub fn with_seed(key: u32) -> Generator {
        let mut rng = Generator::new();
        rng.seed(key);
        rng
    }

    /// Rewrites the whole state from `key`. Every 32-bit key, including 0, is valid.
    ///
    /// The first extraction after seeding refreshes the state.
    pub fn seed(&mut self, key: u32) {
        trace!(key, "Seeding generator");
        self.state[0] = key;
        for i in 1..N {
            let prev = self.state[i - 1];
            // xi = f * (xi-1 ^ (xi-1 >> (w-2))) + i
            self.state[i] = F
                .wrapping_mul(prev ^ (prev >> (W - 2)))
                .wrapping_add(i as u32);
        }

        self.next = N;
        self.remaining = 0;
        self.seeded = true;
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// When set, [`Generator::seed_from_system`] always returns [`seed::STATIC_SYSTEM_SEED`].
    pub fn set_static_system_seed(&mut self, enabled: bool) {
        self.static_system_seed = enabled;
    }

    pub fn static_system_seed(&self) -> bool {
        self.static_system_seed
    }

    /// Builds a seed from the process clock, wall-clock seconds and the process id.
    ///
    /// This is not an entropy source. Use [`SeedableRng::from_entropy`] when the
    /// stream must be unpredictable.
    pub fn seed_from_system(&self) -> u32 {
        if self.static_system_seed {
            debug!(seed = seed::STATIC_SYSTEM_SEED, "Using static system seed");
            return seed::STATIC_SYSTEM_SEED;
        }
        seed::system_seed()
    }

    /// Returns the next tempered 32-bit output, seeding from the system first if needed.
    pub fn next_u32(&mut self) -> u32 {
        if !self.seeded {
            let key = self.seed_from_system();
            trace!(key, "Generator used before seeding, seeding from system");
            self.seed(key);
        }

        if self.remaining == 0 {
            self.refresh();
        }

        let y = self.state[self.next];
        self.next += 1;
        self.remaining -= 1;

        temper(y)
    }

    /// Returns a double in [0, 1) carrying the 32 bits of the next output.
    pub fn next_unit_double(&mut self) -> f64 {
        f64::from(self.next_u32()) / U32_RANGE
    }

    // Regenerates all N words in place. The three loops avoid the modulo on
    // `k + M` and `k + 1`: state[k + M] is always read before it is rewritten.
    fn refresh(&mut self) {
        let state = &mut self.state;

        for k in 0..N - M {
            state[k] = state[k + M] ^ twist(state[k], state[k + 1]);
        }
        for k in N - M..N - 1 {
            state[k] = state[k + M - N] ^ twist(state[k], state[k + 1]);
        }
        state[N - 1] = state[M - 1] ^ twist(state[N - 1], state[0]);

        self.next = 0;
        self.remaining = N;
        trace!("Refreshed generator state");
    }
}

impl Default for Generator {
    fn default() -> Self {
        Generator::new()
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("next", &self.next)
            .field("remaining", &self.remaining)
            .field("seeded", &self.seeded)
            .field("static_system_seed", &self.static_system_seed)
            .finish_non_exhaustive()
    }
}

fn twist(u: u32, v: u32) -> u32 {
    let mixed = (u & UPPER_MASK) | (v & LOWER_MASK);
    let mag = if v & 1 != 0 { A } else { 0 };
    (mixed >> 1) ^ mag
}

fn temper(mut y: u32) -> u32 {
    y ^= y >> U;
    y ^= (y << S) & B;
    y ^= (y << T) & C;
    y ^= y >> L;
    y
}

impl RngCore for Generator {
    fn next_u32(&mut self) -> u32 {
        Generator::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Generator {
    /// Little-endian 32-bit key
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Generator::with_seed(u32::from_le_bytes(seed))
    }
}
