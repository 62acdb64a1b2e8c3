//! Small statistical helpers shared by the trend analyzer and radar.

/// Slope of the least-squares regression line through `(x, y)` points.
///
/// Returns 0.0 for fewer than 2 points or zero x-variance.
#[must_use]
pub fn regression_slope(points: &[(f64, f64)]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let denom: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if denom == 0.0 {
        return 0.0;
    }

    let numer: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    numer / denom
}

/// Mean-normalized velocity of a count series sampled at sequential indices.
///
/// Regression slope of count vs. index, divided by the series mean, so the
/// result is a fractional rate per snapshot rather than an absolute slope.
/// A series with mean 0 has velocity 0. Known sensitivity: a very small
/// nonzero mean produces extreme velocities.
#[must_use]
pub fn velocity(counts: &[f64]) -> f64 {
    if counts.len() < 2 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = counts.iter().sum::<f64>() / counts.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let points: Vec<(f64, f64)> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| (i as f64, *c))
        .collect();

    regression_slope(&points) / mean
}

/// Velocity over real elapsed time: points are `(elapsed_hours, count)`.
///
/// 0.0 when there are fewer than 2 points, elapsed time is 0, or the mean
/// count is 0.
#[must_use]
pub fn velocity_over_hours(points: &[(f64, f64)]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let elapsed = points[points.len() - 1].0 - points[0].0;
    if elapsed <= 0.0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = points.iter().map(|(_, y)| y).sum::<f64>() / points.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }

    regression_slope(points) / mean
}

/// Logistic sigmoid with the input clamped to [-20, 20] so the exponential
/// never overflows.
#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    let x = x.clamp(-20.0, 20.0);
    1.0 / (1.0 + (-x).exp())
}

/// Percentile rank of `value` among `values`, in [0, 100].
///
/// Midpoint convention: equal values count half, so a lone value ranks at
/// the 50th percentile. Empty input ranks 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentile_rank(values: &[f64], value: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let below = values.iter().filter(|v| **v < value).count() as f64;
    let equal = values.iter().filter(|v| (**v - value).abs() < f64::EPSILON).count() as f64;
    (below + 0.5 * equal) / values.len() as f64 * 100.0
}
