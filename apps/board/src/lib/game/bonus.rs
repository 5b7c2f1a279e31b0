use rand::Rng;

/// Source of the bonus clue position. Swapped for a fixed picker in tests.
pub trait IndexPicker: Send {
    /// Returns an index in `0..len`. Never called with `len == 0`.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform choice from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngPicker;

impl IndexPicker for ThreadRngPicker {
    fn pick(&mut self, len: usize) -> usize {
        let mut rng = rand::rng();
        rng.random_range(0..len)
    }
}

/// Always picks the same position, wrapped into range.
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl IndexPicker for FixedPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.0 % len
    }
}
