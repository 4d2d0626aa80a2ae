//! Sample moments over pixel values, ignoring blanked (NaN) pixels

/// Central moments of a set of pixel values.
///
/// All moments are population moments (divided by `n`), matching the
/// dispersion statistic used for tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub count: usize,
    pub mean: f64,
    /// Second central moment
    pub m2: f64,
    /// Third central moment
    pub m3: f64,
}

impl Moments {
    /// Two-pass moments over the non-NaN values
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let finite: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        let count = finite.len();
        if count == 0 {
            return Self {
                count,
                mean: f64::NAN,
                m2: f64::NAN,
                m3: f64::NAN,
            };
        }

        let n = count as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let (s2, s3) = finite.iter().fold((0.0, 0.0), |(s2, s3), v| {
            let d = v - mean;
            (s2 + d * d, s3 + d * d * d)
        });

        Self {
            count,
            mean,
            m2: s2 / n,
            m3: s3 / n,
        }
    }

    /// Population standard deviation (NaN when empty)
    pub fn std_dev(&self) -> f64 {
        self.m2.sqrt()
    }

    /// Fisher-Pearson coefficient of skewness `m3 / m2^1.5`.
    ///
    /// Positive values mean a tail towards high pixel values. Zero for a
    /// constant set, NaN when empty.
    pub fn skewness(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        if self.m2 <= 0.0 {
            return 0.0;
        }
        self.m3 / self.m2.powf(1.5)
    }
}

/// Ratio of summed positive flux to the magnitude of summed negative flux.
///
/// Infinite when there is positive but no negative flux, NaN when there is
/// no flux of either sign.
pub fn flux_ratio<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (pos, neg) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0.0), |(pos, neg), v| {
            if v > 0.0 { (pos + v, neg) } else { (pos, neg - v) }
        });

    if neg == 0.0 {
        return if pos > 0.0 { f64::INFINITY } else { f64::NAN };
    }
    pos / neg
}
