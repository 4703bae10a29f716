use ndarray::Array2;

/// Precompute a normalized 1D Gaussian kernel for `sigma`.
///
/// The kernel spans `±ceil(3σ)` taps. Sigma at or below zero yields the
/// identity kernel.
pub fn gaussian_kernel_1d(sigma: f64) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let half = (3.0 * sigma).ceil() as i64;
    let mut kernel: Vec<f64> = (-half..=half)
        .map(|i| {
            let x = i as f64;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel.iter().map(|&v| v as f32).collect()
}

/// Separable Gaussian blur of a single-channel image with edge clamping.
pub fn gaussian_blur(image: &Array2<f32>, sigma: f64) -> Array2<f32> {
    let kernel = gaussian_kernel_1d(sigma);
    if kernel.len() <= 1 || image.is_empty() {
        return image.clone();
    }
    let (height, width) = image.dim();
    let half = (kernel.len() / 2) as isize;

    // Horizontal pass
    let temp = Array2::from_shape_fn((height, width), |(y, x)| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, &w)| {
                let sx = (x as isize + k as isize - half).clamp(0, width as isize - 1) as usize;
                image[[y, sx]] * w
            })
            .sum::<f32>()
    });

    // Vertical pass
    Array2::from_shape_fn((height, width), |(y, x)| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, &w)| {
                let sy = (y as isize + k as isize - half).clamp(0, height as isize - 1) as usize;
                temp[[sy, x]] * w
            })
            .sum::<f32>()
    })
}
