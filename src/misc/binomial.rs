use std::collections::HashMap;

use nalgebra::RealField;

/// Binomial coefficients with a memo keyed by `(n, k)`.
#[derive(Debug, Default)]
pub struct Binomial<T> {
    memo: HashMap<(usize, usize), T>,
}

impl<T: RealField + Copy> Binomial<T> {
    pub fn new() -> Self {
        Self {
            memo: HashMap::new(),
        }
    }

    /// Returns the binomial coefficient of `n` and `k`, zero when `k > n`.
    pub fn get(&mut self, n: usize, k: usize) -> T {
        if k > n {
            return T::zero();
        }
        if k == 0 || k == n {
            return T::one();
        }

        let k = k.min(n - k);
        if let Some(v) = self.memo.get(&(n, k)) {
            return *v;
        }

        let r = self.get(n - 1, k) + self.get(n - 1, k - 1);
        self.memo.insert((n, k), r);
        r
    }
}
