use rand::Rng;
use rand::seq::SliceRandom;

/// Uniform in-place permutation (Fisher-Yates).
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

/// Removes the element at `from` and splices it back at a position drawn
/// uniformly from `0..=len` of the shortened sequence, so the very front and
/// the very end are both possible. Returns the new position.
pub fn reinsert<T, R: Rng + ?Sized>(items: &mut Vec<T>, from: usize, rng: &mut R) -> usize {
    let item = items.remove(from);
    let position = rng.gen_range(0..=items.len());
    items.insert(position, item);
    position
}
