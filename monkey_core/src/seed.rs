use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::process;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

// Adapted from Bob Jenkins' 96-bit integer mix, widened to 64-bit words.

static PROCESS_EPOCH: OnceLock<Instant> = OnceLock::new();
static CALL_SERIAL: AtomicU64 = AtomicU64::new(0);

/// Derives a fresh 64-bit seed from volatile runtime signals.
///
/// Combines wall-clock time, a monotonic clock reading, and the process
/// and thread identity through [`mix`], so workers launched within the
/// same millisecond still start from divergent seeds. A per-call serial is
/// folded into the monotonic word: two calls landing inside one clock tick
/// must not collide either.
pub fn derive_seed() -> u64 {
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0);
    let ticks = PROCESS_EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64;
    let serial = CALL_SERIAL.fetch_add(1, Ordering::Relaxed);
    mix(
        wall,
        ticks ^ serial.rotate_right(16),
        u64::from(process::id()) ^ thread_ident(),
    )
}

/// Jenkins-style non-linear mix of three words down to one.
///
/// Deterministic: identical inputs always yield the identical seed.
pub fn mix(mut a: u64, mut b: u64, mut c: u64) -> u64 {
    a = a.wrapping_sub(b).wrapping_sub(c);
    a ^= c >> 13;
    b = b.wrapping_sub(c).wrapping_sub(a);
    b ^= a << 8;
    c = c.wrapping_sub(a).wrapping_sub(b);
    c ^= b >> 13;
    a = a.wrapping_sub(b).wrapping_sub(c);
    a ^= c >> 12;
    b = b.wrapping_sub(c).wrapping_sub(a);
    b ^= a << 16;
    c = c.wrapping_sub(a).wrapping_sub(b);
    c ^= b >> 5;
    a = a.wrapping_sub(b).wrapping_sub(c);
    a ^= c >> 3;
    b = b.wrapping_sub(c).wrapping_sub(a);
    b ^= a << 10;
    c = c.wrapping_sub(a).wrapping_sub(b);
    c ^= b >> 15;
    c
}

fn thread_ident() -> u64 {
    let mut hasher = DefaultHasher::new();
    thread::current().id().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn mix_is_deterministic() {
        assert_eq!(mix(1, 2, 3), mix(1, 2, 3));
        assert_eq!(
            mix(u64::MAX, 0, 0x5DEECE66D),
            mix(u64::MAX, 0, 0x5DEECE66D)
        );
    }

    #[test]
    fn mix_diverges_when_any_input_changes() {
        let base = mix(1000, 2000, 1);
        assert_ne!(base, mix(1001, 2000, 1));
        assert_ne!(base, mix(1000, 2001, 1));
        assert_ne!(base, mix(1000, 2000, 2));
    }

    #[test]
    fn sequential_identifiers_spread_over_the_seed_space() {
        // Workers launched in the same instant differ only in identity.
        let seeds: HashSet<u64> = (1..=64).map(|id| mix(123_456_789, 987_654_321, id)).collect();
        assert_eq!(seeds.len(), 64);
    }

    #[test]
    fn derive_seed_diverges_across_threads() {
        let first = thread::spawn(derive_seed).join().unwrap();
        let second = thread::spawn(derive_seed).join().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn derive_seed_diverges_between_calls_on_one_thread() {
        assert_ne!(derive_seed(), derive_seed());
    }
}
