//! One dimensional density estimation and peak detection.

use std::f64::consts::PI;

use crate::stats;

/// A density evaluated on an evenly spaced grid.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct DensityCurve {
    pub grid: Vec<f64>,
    pub density: Vec<f64>,
}

impl DensityCurve {
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Grid positions and density values of the given indices.
    pub fn points<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = (f64, f64)> + 'a {
        indices
            .iter()
            .map(|&ix| (self.grid[ix], self.density[ix]))
    }
}

/// Fits a smooth density to a set of samples.
///
/// Implementations evaluate the density on `grid_len` evenly spaced points
/// spanning the range of the samples. Samples that do not support a density
/// (too few, or all equal) produce `None`.
pub trait DensityEstimator {
    fn estimate(&self, samples: &[f64], bandwidth: f64, grid_len: usize) -> Option<DensityCurve>;
}

/// Gaussian kernel density estimate with a scalar bandwidth factor.
///
/// The kernel standard deviation is the sample standard deviation scaled by
/// the bandwidth factor.
#[derive(Copy, Clone, Default, Debug)]
pub struct GaussianKde;

impl DensityEstimator for GaussianKde {
    fn estimate(&self, samples: &[f64], bandwidth: f64, grid_len: usize) -> Option<DensityCurve> {
        let sigma = stats::std_dev(samples)? * bandwidth;
        if !(sigma > 0.0 && sigma.is_finite()) || grid_len == 0 {
            return None;
        }
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let grid = linspace(min, max, grid_len);
        let norm = 1.0 / (samples.len() as f64 * sigma * (2.0 * PI).sqrt());
        let density = grid
            .iter()
            .map(|x| {
                let sum: f64 = samples
                    .iter()
                    .map(|s| {
                        let z = (x - s) / sigma;
                        (-0.5 * z * z).exp()
                    })
                    .sum();
                sum * norm
            })
            .collect();
        Some(DensityCurve { grid, density })
    }
}

/// `len` evenly spaced values from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (len - 1) as f64;
            let mut values: Vec<_> = (0..len).map(|i| start + i as f64 * step).collect();
            values[len - 1] = stop;
            values
        }
    }
}

/// Finds the indices of the peaks of `values`.
///
/// A peak is a local maximum; the middle sample of a flat top counts as the
/// peak and the two ends of the slice never do. Peaks closer than
/// `min_distance` samples to a higher peak are removed, visiting the highest
/// peaks first. Finally peaks whose prominence is below `min_prominence` are
/// removed.
///
/// The prominence of a peak is its height above the higher of the two
/// lowest points reached on either side before climbing above the peak or
/// running off the end of the data.
pub fn find_peaks(values: &[f64], min_prominence: f64, min_distance: usize) -> Vec<usize> {
    let mut peaks = local_maxima(values);
    if min_distance > 1 {
        peaks = select_by_distance(values, &peaks, min_distance);
    }
    peaks.retain(|&peak| prominence(values, peak) >= min_prominence);
    peaks
}

fn local_maxima(values: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    let Some(last) = values.len().checked_sub(1) else {
        return peaks;
    };
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

fn select_by_distance(values: &[f64], peaks: &[usize], min_distance: usize) -> Vec<usize> {
    let mut keep = vec![true; peaks.len()];
    let mut by_height: Vec<_> = (0..peaks.len()).collect();
    // stable, so among equal peaks the rightmost is visited first
    by_height.sort_by(|&a, &b| values[peaks[a]].total_cmp(&values[peaks[b]]));
    for &j in by_height.iter().rev() {
        if !keep[j] {
            continue;
        }
        for k in (0..j).rev() {
            if peaks[j] - peaks[k] >= min_distance {
                break;
            }
            keep[k] = false;
        }
        for k in j + 1..peaks.len() {
            if peaks[k] - peaks[j] >= min_distance {
                break;
            }
            keep[k] = false;
        }
    }
    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&peak, keep)| keep.then_some(peak))
        .collect()
}

/// Prominence of the sample at `peak`.
pub fn prominence(values: &[f64], peak: usize) -> f64 {
    let height = values[peak];
    let base = |range: &mut dyn Iterator<Item = usize>| {
        range
            .map(|ix| values[ix])
            .take_while(|&v| v <= height)
            .fold(height, f64::min)
    };
    let left = base(&mut (0..=peak).rev());
    let right = base(&mut (peak..values.len()));
    height - left.max(right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plateau_reports_its_middle() {
        let values = [0.0, 1.0, 2.0, 2.0, 2.0, 2.0, 1.0, 0.0];
        assert_eq!(local_maxima(&values), [3]);
        // a plateau running into the end is not a peak
        assert!(local_maxima(&[0.0, 1.0, 1.0]).is_empty());
    }

    #[test]
    fn endpoints_are_never_peaks() {
        let values = [5.0, 1.0, 2.0, 1.0, 5.0];
        assert_eq!(find_peaks(&values, 0.0, 1), [2]);
        assert!(find_peaks(&[], 0.0, 1).is_empty());
        assert!(find_peaks(&[1.0], 0.0, 1).is_empty());
    }

    #[test]
    fn higher_peak_suppresses_close_neighbors() {
        let values = [0.0, 3.0, 0.0, 5.0, 0.0, 4.0, 0.0, 0.0, 0.0, 2.0, 0.0];
        assert_eq!(find_peaks(&values, 0.0, 1), [1, 3, 5, 9]);
        // the peak at 3 removes 1 and 5 but not 9
        assert_eq!(find_peaks(&values, 0.0, 3), [3, 9]);
    }

    #[test]
    fn prominence_measured_to_higher_base() {
        let values = [0.0, 4.0, 1.0, 3.0, 2.0, 6.0, 0.0];
        // the peak at 3 must descend to 1 on the left before climbing
        // above it, and only reaches 2 on the right before the 6
        assert_eq!(prominence(&values, 3), 1.0);
        assert_eq!(prominence(&values, 5), 6.0);
        assert_eq!(find_peaks(&values, 1.5, 1), [1, 5]);
    }

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace(0.0, 1.0, 5), [0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 9.0, 1), [3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn degenerate_samples_have_no_density() {
        assert!(GaussianKde.estimate(&[4.0, 4.0, 4.0, 4.0], 0.25, 100).is_none());
        assert!(GaussianKde.estimate(&[4.0], 0.25, 100).is_none());
        assert!(GaussianKde.estimate(&[], 0.25, 100).is_none());
    }

    #[test]
    fn density_integrates_to_about_one() {
        let samples = [1.0, 2.0, 2.5, 3.0, 7.0, 8.0];
        let curve = GaussianKde.estimate(&samples, 1.0, 400).unwrap();
        assert_eq!(curve.len(), 400);
        assert_eq!(curve.grid[0], 1.0);
        assert_eq!(curve.grid[399], 8.0);
        // the grid spans only the samples, so most but not all of the mass
        // is covered
        let step = curve.grid[1] - curve.grid[0];
        let mass: f64 = curve.density.iter().sum::<f64>() * step;
        assert!(mass > 0.5 && mass < 1.0, "{mass}");
    }

    #[test]
    fn bimodal_samples_have_two_peaks() {
        let samples = glyphsheet_test_data::bimodal_toplines();
        let curve = GaussianKde.estimate(&samples, 0.25, 100).unwrap();
        let peaks = find_peaks(&curve.density, 0.001, 30);
        assert_eq!(peaks.len(), 2);
        let heights: Vec<_> = curve.points(&peaks).map(|(x, _)| x).collect();
        assert!((heights[0] - 500.0).abs() < 5.0, "{heights:?}");
        assert!((heights[1] - 800.0).abs() < 5.0, "{heights:?}");
    }
}
