use rand::Rng;

/// Produces one random candidate per call, driven by the owning worker's
/// random generator.
///
/// # Type Parameters
/// * `R`: The type of random number generator sampling bytes and lengths.
pub trait CandidateGenerator<R: Rng + ?Sized> {
    /// Generates a candidate of random length in the closed interval
    /// `[0, max_size]`. A `max_size` of 0 yields a valid empty candidate.
    fn generate(&mut self, max_size: usize, rng: &mut R) -> Vec<u8>;
}

/// Generates candidates made of printable ASCII and newlines, the byte
/// range a text-consuming oracle can be fed without control-byte noise.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintableTextGenerator;

impl<R> CandidateGenerator<R> for PrintableTextGenerator
where
    R: Rng + ?Sized,
{
    fn generate(&mut self, max_size: usize, rng: &mut R) -> Vec<u8> {
        let size = rng.random_range(0..=max_size);
        let mut text = Vec::with_capacity(size);
        for _ in 0..size {
            text.push(random_text_byte(rng));
        }
        text
    }
}

/// Masks a random byte to 7 bits and resamples until it lands on printable
/// ASCII or a newline. 96 of the 128 masked values are accepted, so the
/// loop takes about 1.3 draws per byte and always terminates.
fn random_text_byte<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    loop {
        let byte = rng.random::<u8>() & 0x7F;
        if byte == b'\n' || byte == b' ' || byte.is_ascii_graphic() {
            return byte;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;
    use std::collections::HashSet;

    fn assert_all_text_bytes(candidate: &[u8]) {
        for &byte in candidate {
            assert!(
                byte == b'\n' || byte == b' ' || byte.is_ascii_graphic(),
                "byte {byte:#04x} is neither printable ASCII nor newline"
            );
        }
    }

    #[test]
    fn zero_max_size_yields_an_empty_candidate() {
        let mut generator = PrintableTextGenerator;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..32 {
            assert!(generator.generate(0, &mut rng).is_empty());
        }
    }

    #[test]
    fn candidates_stay_within_bounds_and_byte_range() {
        let mut generator = PrintableTextGenerator;
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for max_size in [1usize, 1024] {
            for _ in 0..100 {
                let candidate = generator.generate(max_size, &mut rng);
                assert!(
                    candidate.len() <= max_size,
                    "candidate of {} bytes exceeds max_size {}",
                    candidate.len(),
                    max_size
                );
                assert_all_text_bytes(&candidate);
            }
        }
    }

    #[test]
    fn lengths_cover_the_full_inclusive_range() {
        let mut generator = PrintableTextGenerator;
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let lengths: HashSet<usize> = (0..200)
            .map(|_| generator.generate(1, &mut rng).len())
            .collect();
        assert!(lengths.contains(&0), "length 0 never drawn for max_size 1");
        assert!(lengths.contains(&1), "length 1 never drawn for max_size 1");
    }
}
