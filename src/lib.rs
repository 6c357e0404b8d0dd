//! MT19937 Mersenne Twister producing a reproducible stream of 32-bit values and
//! unit doubles in [0, 1) from a 32-bit seed.
//!
//! Not suitable for cryptography: the full state can be recovered from 624 outputs.
//!
//! ```
//! use mtwist::Generator;
//!
//! let mut rng = Generator::with_seed(54321);
//! assert_eq!(3915467345, rng.next_u32());
//! assert!(rng.next_unit_double() < 1.0);
//! ```

pub mod prng;
pub mod seed;
pub mod vectors;

pub use prng::Generator;
pub use seed::{mix, SystemSources, STATIC_SYSTEM_SEED};
