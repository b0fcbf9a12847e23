use serde::Serialize;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Quantile `q` (0.0–1.0) of an already sorted slice, linearly interpolated
/// between the two nearest ranks. Returns 0.0 for empty input.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

/// One fixed-width histogram bucket covering `[lower, upper)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Upper bound on the number of bins [`histogram`] will allocate.
pub const MAX_HISTOGRAM_BINS: usize = 1_000;

/// Buckets `values` into bins of `bin_width`, aligned to multiples of the width.
/// Empty or non-finite input, or a width that is not finite and positive,
/// yields no bins. The width is doubled until at most [`MAX_HISTOGRAM_BINS`]
/// bins cover the data.
pub fn histogram(values: &[f64], bin_width: f64) -> Vec<HistogramBin> {
    if values.is_empty() || !bin_width.is_finite() || bin_width <= 0.0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }

    let span = |width: f64| (max / width).floor() - (min / width).floor() + 1.0;
    let mut bin_width = bin_width;
    while span(bin_width) > MAX_HISTOGRAM_BINS as f64 {
        bin_width *= 2.0;
    }

    let first = (min / bin_width).floor();
    let bins = span(bin_width) as usize;

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = ((v / bin_width).floor() - first) as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = (first + i as f64) * bin_width;
            HistogramBin {
                lower,
                upper: lower + bin_width,
                count,
            }
        })
        .collect()
}

/// Ordinary least-squares fit of `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits a line through `points`. Returns `None` with fewer than two points
/// or when every `x` is the same.
pub fn linear_fit(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }

    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let x_mean = mean(&xs);
    let y_mean = mean(&ys);

    let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = points
        .iter()
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let ss_tot: f64 = ys.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = points
        .iter()
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}
