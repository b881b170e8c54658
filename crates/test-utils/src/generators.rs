//! Synthetic forecast data.
//!
//! These generators create predictable, verifiable cloud-cover patterns
//! that can be used across the test suite.

use eclipse_common::WeatherSample;

/// Creates a row-major grid of predictable cloud-cover values.
///
/// Each cell is `(col * 10 + row) % 101`, so every value stays inside the
/// 0-100 percent range and neighbouring cells differ.
///
/// # Example
///
/// ```
/// use test_utils::create_tcc_grid;
///
/// let grid = create_tcc_grid(4, 3);
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid[0], 0.0);  // col=0, row=0
/// assert_eq!(grid[1], 10.0); // col=1, row=0
/// assert_eq!(grid[4], 1.0);  // col=0, row=1
/// ```
pub fn create_tcc_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(((col * 10 + row) % 101) as f32);
        }
    }
    data
}

/// Creates a grid with NaN at the given `(col, row)` positions.
///
/// Used to exercise missing-value handling in the loader and renderer.
pub fn create_grid_with_missing(
    width: usize,
    height: usize,
    missing: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = create_tcc_grid(width, height);
    for &(col, row) in missing {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// Samples on a regular lon/lat lattice, in grid order (rows south to
/// north, columns west to east).
///
/// `value` receives `(col, row)` and returns the cloud cover for that cell.
pub fn regular_sample_grid<F>(
    lon0: f64,
    lat0: f64,
    step: f64,
    width: usize,
    height: usize,
    mut value: F,
) -> Vec<WeatherSample>
where
    F: FnMut(usize, usize) -> f32,
{
    let mut samples = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            samples.push(WeatherSample::new(
                lat0 + row as f64 * step,
                lon0 + col as f64 * step,
                value(col, row),
            ));
        }
    }
    samples
}

/// The 3x3 scenario grid: lon/lat 0, 1, 2 with tcc `10 * (row * 3 + col)`.
///
/// The centre sample `(1, 1)` carries 40.
pub fn three_by_three_grid() -> Vec<WeatherSample> {
    regular_sample_grid(0.0, 0.0, 1.0, 3, 3, |col, row| (10 * (row * 3 + col)) as f32)
}
