use rand::rngs::StdRng;
use rand::SeedableRng;

/// RNG for a game: seeded for reproducible deals and CPU tie-breaks,
/// entropy-backed otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Remove and return the first item matching the predicate.
pub fn remove_first_match<T>(items: &mut Vec<T>, matcher: impl Fn(&T) -> bool) -> Option<T> {
    let index = items.iter().position(matcher)?;
    Some(items.remove(index))
}
