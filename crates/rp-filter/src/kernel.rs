/// Channel values of a 3x3 neighborhood, `nb[dy + 1][dx + 1]`.
pub type Neighborhood = [[f32; 3]; 3];

/// Immutable 3x3 weight matrix, indexed `weights[dy + 1][dx + 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel3x3 {
    weights: [[f32; 3]; 3],
}

impl Kernel3x3 {
    pub const fn new(weights: [[f32; 3]; 3]) -> Self {
        Self { weights }
    }

    pub const fn weights(&self) -> &[[f32; 3]; 3] {
        &self.weights
    }

    pub fn sum(&self) -> f32 {
        self.weights.iter().flatten().sum()
    }

    /// Weighted sum of `nb` (correlation, no kernel flip).
    #[inline]
    pub fn apply(&self, nb: &Neighborhood) -> f32 {
        let mut acc = 0.0f32;
        for (w_row, n_row) in self.weights.iter().zip(nb) {
            for (w, v) in w_row.iter().zip(n_row) {
                acc += w * v;
            }
        }
        acc
    }
}

/// Binomial blur `[[1, 2, 1], [2, 4, 2], [1, 2, 1]] / 16`.
pub const BLUR: Kernel3x3 = Kernel3x3::new([
    [0.0625, 0.125, 0.0625],
    [0.125, 0.25, 0.125],
    [0.0625, 0.125, 0.0625],
]);

pub const SHARPEN: Kernel3x3 =
    Kernel3x3::new([[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]]);

pub const SOBEL_X: Kernel3x3 =
    Kernel3x3::new([[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]]);

pub const SOBEL_Y: Kernel3x3 =
    Kernel3x3::new([[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]]);

#[cfg(test)]
mod tests {
    use super::{BLUR, SHARPEN, SOBEL_X, SOBEL_Y};

    #[test]
    fn smoothing_kernels_preserve_mean() {
        assert_eq!(BLUR.sum(), 1.0);
        assert_eq!(SHARPEN.sum(), 1.0);
    }

    #[test]
    fn gradient_kernels_cancel_on_flat_input() {
        let flat = [[37.0f32; 3]; 3];
        assert_eq!(SOBEL_X.apply(&flat), 0.0);
        assert_eq!(SOBEL_Y.apply(&flat), 0.0);
        assert_eq!(BLUR.apply(&flat), 37.0);
    }

    #[test]
    fn sobel_pair_is_orthogonal() {
        let ramp_x = [[0.0, 1.0, 2.0], [0.0, 1.0, 2.0], [0.0, 1.0, 2.0]];
        assert_eq!(SOBEL_X.apply(&ramp_x), 8.0);
        assert_eq!(SOBEL_Y.apply(&ramp_x), 0.0);
    }
}
