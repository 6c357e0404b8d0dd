use std::time::{SystemTime, UNIX_EPOCH};

use tracing::trace;

/// Seed returned by the system mixer when a generator forces a static system seed.
pub const STATIC_SYSTEM_SEED: u32 = 5489;

/// The three weak sources combined into a system seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemSources {
    /// Processor clock ticks used by the process
    pub clock: u32,
    /// Seconds since the UNIX epoch
    pub time: u32,
    pub pid: u32,
}

impl SystemSources {
    pub fn sample() -> SystemSources {
        SystemSources {
            clock: processor_ticks(),
            time: epoch_seconds(),
            pid: process_id(),
        }
    }
}

/// Samples the system sources and mixes them into a 32-bit seed.
pub fn system_seed() -> u32 {
    let sources = SystemSources::sample();
    let seed = mix(sources);
    trace!(?sources, seed, "Mixed system seed");
    seed
}

/// Bob Jenkins' lookup3 `mix()` over (clock, time, pid), stopping once `c` is final.
///
/// The trailing `a += c` and `b += a` of the full mix are skipped, they cannot
/// change `c`.
pub fn mix(sources: SystemSources) -> u32 {
    let SystemSources {
        clock: mut a,
        time: mut b,
        pid: mut c,
    } = sources;

    a = a.wrapping_sub(c);
    a ^= c.rotate_left(4);
    c = c.wrapping_add(b);

    b = b.wrapping_sub(a);
    b ^= a.rotate_left(6);
    a = a.wrapping_add(c);

    c = c.wrapping_sub(b);
    c ^= b.rotate_left(8);
    b = b.wrapping_add(a);

    a = a.wrapping_sub(c);
    a ^= c.rotate_left(16);
    c = c.wrapping_add(b);

    b = b.wrapping_sub(a);
    b ^= a.rotate_left(19);

    c = c.wrapping_sub(b);
    c ^= b.rotate_left(4);

    c
}

#[cfg(unix)]
extern "C" {
    // ISO C clock(), which the libc crate only binds on non-Unix targets
    fn clock() -> libc::clock_t;
}

#[cfg(unix)]
fn processor_ticks() -> u32 {
    // clock_t is wider than 32 bits on most targets, only the low word is mixed
    unsafe { clock() as u32 }
}

#[cfg(not(unix))]
fn processor_ticks() -> u32 {
    use lazy_static::lazy_static;
    use std::time::Instant;

    // Matches the CLOCKS_PER_SEC of POSIX clock()
    const TICKS_PER_SEC: u128 = 1_000_000;

    lazy_static! {
        static ref FIRST_SAMPLE: Instant = Instant::now();
    }
    (FIRST_SAMPLE.elapsed().as_nanos() * TICKS_PER_SEC / 1_000_000_000) as u32
}

#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
fn process_id() -> u32 {
    std::process::id()
}

// No process ids on bare wasm, std::process::id() panics there
#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
fn process_id() -> u32 {
    0
}

fn epoch_seconds() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Generator;

    #[test]
    fn mix_vectors() {
        let vectors = [
            ((0u32, 0u32, 0u32), 0u32),
            ((1, 2, 3), 3824966690),
            ((12345, 1700000000, 4242), 3705625915),
            ((0xffffffff, 0xffffffff, 0xffffffff), 4277141500),
        ];

        for ((clock, time, pid), expected) in vectors.iter() {
            let sources = SystemSources {
                clock: *clock,
                time: *time,
                pid: *pid,
            };
            assert_eq!(*expected, mix(sources), "{:?}", sources);
        }
    }

    #[test]
    fn mix_reproducible() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let sources = SystemSources {
                clock: rand::Rng::gen(&mut rng),
                time: rand::Rng::gen(&mut rng),
                pid: rand::Rng::gen(&mut rng),
            };
            assert_eq!(mix(sources), mix(sources));
        }
    }

    #[test]
    fn mix_uses_every_source() {
        let base = SystemSources {
            clock: 100,
            time: 1_700_000_000,
            pid: 4242,
        };
        let seed = mix(base);
        assert_ne!(seed, mix(SystemSources { clock: 101, ..base }));
        assert_ne!(seed, mix(SystemSources { time: 1_700_000_001, ..base }));
        assert_ne!(seed, mix(SystemSources { pid: 4243, ..base }));
    }

    #[test]
    fn sample_reads_process() {
        let sources = SystemSources::sample();
        assert_eq!(process_id(), sources.pid);
        assert_eq!(std::process::id(), process_id());
        assert_ne!(0, sources.time);
    }

    #[test]
    fn processor_ticks_advance() {
        let start = processor_ticks();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while processor_ticks() == start {
            assert!(std::time::Instant::now() < deadline, "clock never advanced");
        }
    }

    #[test]
    fn static_seed() {
        let mut rng = Generator::new();
        rng.set_static_system_seed(true);
        assert_eq!(STATIC_SYSTEM_SEED, rng.seed_from_system());
        assert_eq!(5489, rng.seed_from_system());
        rng.set_static_system_seed(false);
        assert!(!rng.static_system_seed());
    }
}
