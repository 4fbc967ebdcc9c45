//! 集計用の統計ヘルパー
//!
//! 中央値・分位点（線形補間）・箱ひげの要約・ガウスカーネル密度推定。

/// 昇順ソート済みの配列に対する分位点（隣接2点の線形補間）
pub fn quantile_sorted(v: &[f64], q: f64) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let pos = (v.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(v[lo] + (v[hi] - v[lo]) * frac)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

/// 中央値（偶数個なら中央2点の平均）
pub fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted(values), 0.5)
}

/// 箱ひげ図の要約
#[derive(Clone, Debug, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// 下ひげ: q1 - 1.5 IQR 以上で最小のデータ点
    pub whisker_lo: f64,
    /// 上ひげ: q3 + 1.5 IQR 以下で最大のデータ点
    pub whisker_hi: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<BoxStats> {
        let v = sorted(values);
        let q1 = quantile_sorted(&v, 0.25)?;
        let median = quantile_sorted(&v, 0.5)?;
        let q3 = quantile_sorted(&v, 0.75)?;
        let iqr = q3 - q1;
        let lo_fence = q1 - 1.5 * iqr;
        let hi_fence = q3 + 1.5 * iqr;

        let inside = v.iter().copied().filter(|x| *x >= lo_fence && *x <= hi_fence);
        let whisker_lo = inside.clone().fold(f64::INFINITY, f64::min).min(q1);
        let whisker_hi = inside.fold(f64::NEG_INFINITY, f64::max).max(q3);
        let outliers = v.iter().copied().filter(|x| *x < lo_fence || *x > hi_fence).collect();

        Some(BoxStats {
            q1,
            median,
            q3,
            whisker_lo,
            whisker_hi,
            outliers,
        })
    }
}

/// 標本標準偏差（n - 1 で割る）
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

/// ガウスカーネル密度推定の結果
#[derive(Clone, Debug)]
pub struct Density {
    /// (値, 密度) の組。値は昇順。
    pub points: Vec<(f64, f64)>,
    pub bandwidth: f64,
}

impl Density {
    pub fn max_density(&self) -> f64 {
        self.points.iter().map(|p| p.1).fold(0.0, f64::max)
    }
}

/// Scott 則のバンド幅でカーネル密度を推定する
///
/// 評価範囲は [min - cut·bw, max + cut·bw] を `gridsize` 点で等分。
/// データが2点未満、または分散が0なら `None`。
pub fn gaussian_kde(values: &[f64], gridsize: usize, cut: f64) -> Option<Density> {
    let std = sample_std(values)?;
    if std <= 0.0 || !std.is_finite() || gridsize < 2 {
        return None;
    }
    let n = values.len() as f64;
    let bw = std * n.powf(-0.2);
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min) - cut * bw;
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + cut * bw;
    let norm = 1.0 / (n * bw * (2.0 * std::f64::consts::PI).sqrt());

    let step = (hi - lo) / (gridsize - 1) as f64;
    let points = (0..gridsize)
        .map(|i| {
            let x = lo + step * i as f64;
            let d: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bw;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (x, d * norm)
        })
        .collect();
    Some(Density {
        points,
        bandwidth: bw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[1.0, 2.0, 9.0]), Some(2.0));
        assert_eq!(median(&[9.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&v, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&v, 0.75), Some(3.25));
        assert_eq!(quantile_sorted(&v, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&v, 1.0), Some(4.0));
    }

    #[test]
    fn test_box_stats_whiskers_and_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let b = BoxStats::from_values(&values).unwrap();
        assert_eq!(b.median, 3.5);
        assert_eq!(b.q1, 2.25);
        assert_eq!(b.q3, 4.75);
        assert_eq!(b.whisker_lo, 1.0);
        assert_eq!(b.whisker_hi, 5.0);
        assert_eq!(b.outliers, vec![100.0]);
    }

    #[test]
    fn test_kde_integrates_to_one() {
        let values = [0.0, 1.0, 1.5, 2.0, 4.0, 4.5];
        let d = gaussian_kde(&values, 200, 3.0).unwrap();
        let area: f64 = d.points.windows(2).map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0).sum();
        assert!((area - 1.0).abs() < 0.01, "area = {area}");
        assert!(d.max_density() > 0.0);
    }

    #[test]
    fn test_kde_degenerate_inputs() {
        assert!(gaussian_kde(&[1.0], 100, 2.0).is_none());
        assert!(gaussian_kde(&[2.0, 2.0, 2.0], 100, 2.0).is_none());
    }
}
