//! Chart datasets derived from a filtered view.
use serde::Serialize;

use crate::corpus::models::{
    BODY, EnrichedRow, PARTY_ORIENTATION, PARTY_STATUS, SPEAKER_MINISTER, SPEAKER_NAME,
    SPEAKER_PARTY,
};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const INSUFFICIENT_DATA: &str = "Not enough data points to compute correlation.";
pub const WAR_ONSET_LABEL: &str = "Beginning Of the War in Ukraine";
/// Category index of February on the month axis.
pub const WAR_ONSET_INDEX: usize = 1;
pub const TOP_SPEAKERS: usize = 10;

/// Name of a month numbered 1–12.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Correlation {
    Value { r: f64 },
    /// Fewer than two usable points.
    Insufficient { message: String },
    /// One of the variables is constant.
    Undefined,
}

impl Correlation {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value { r } => Some(*r),
            _ => None,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pearson correlation of paired samples.
pub fn pearson(points: &[(f64, f64)]) -> Correlation {
    if points.len() < 2 {
        return Correlation::Insufficient {
            message: INSUFFICIENT_DATA.to_string(),
        };
    }
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (mx, my) = (mean(&xs), mean(&ys));

    let mut cov = 0.0_f64;
    let mut vx = 0.0_f64;
    let mut vy = 0.0_f64;
    for (x, y) in points {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }
    if vx == 0.0 || vy == 0.0 {
        return Correlation::Undefined;
    }
    Correlation::Value {
        r: (cov / (vx.sqrt() * vy.sqrt())).clamp(-1.0, 1.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

/// Ordinary least squares fit `y = slope * x + intercept`.
pub fn ols(points: &[(f64, f64)]) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (mx, my) = (mean(&xs), mean(&ys));
    let sxx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = points.iter().map(|(x, y)| (x - mx) * (y - my)).sum();
    let slope = sxy / sxx;
    Some(TrendLine {
        slope,
        intercept: my - slope * mx,
    })
}

/// Linear-interpolation quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub label: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxStats {
    pub fn from_values(label: &str, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            label: label.to_string(),
            count: sorted.len(),
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub points: Vec<(f64, f64)>,
    pub trend: Option<TrendLine>,
    pub correlation: Correlation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxChart {
    pub groups: Vec<BoxStats>,
    pub correlation: Correlation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: u32,
    pub name: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub index: usize,
    pub month: &'static str,
    pub label: &'static str,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            index: WAR_ONSET_INDEX,
            month: MONTH_NAMES[WAR_ONSET_INDEX],
            label: WAR_ONSET_LABEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub points: Vec<MonthlyPoint>,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub label: String,
    pub count: usize,
}

/// Frequency of each distinct value, most frequent first; ties keep
/// first-seen order. Missing values are not counted.
pub fn value_counts<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<Count> {
    let mut counts: Vec<Count> = Vec::new();
    for value in values.flatten() {
        match counts.iter_mut().find(|c| c.label == value) {
            Some(c) => c.count += 1,
            None => counts.push(Count {
                label: value.to_string(),
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

fn counts_of(view: &[&EnrichedRow], column: &str) -> Vec<Count> {
    value_counts(view.iter().map(|r| r.attr(column)))
}

fn gender_label(is_female: bool) -> &'static str {
    if is_female { "Female" } else { "Male" }
}

/// Age against compound sentiment, with trend line and correlation.
pub fn age_vs_compound(view: &[&EnrichedRow]) -> ScatterChart {
    let points: Vec<(f64, f64)> = view
        .iter()
        .filter_map(|r| Some((r.age?, r.compound()?)))
        .collect();
    ScatterChart {
        trend: ols(&points),
        correlation: pearson(&points),
        points,
    }
}

/// Compound sentiment grouped by gender, with the point-biserial correlation.
pub fn gender_vs_compound(view: &[&EnrichedRow]) -> BoxChart {
    let scored: Vec<(bool, f64)> = view
        .iter()
        .filter_map(|r| Some((r.is_female, r.compound()?)))
        .collect();
    let groups = [false, true]
        .into_iter()
        .filter_map(|female| {
            let values: Vec<f64> = scored
                .iter()
                .filter(|(f, _)| *f == female)
                .map(|(_, c)| *c)
                .collect();
            BoxStats::from_values(gender_label(female), &values)
        })
        .collect();
    let points: Vec<(f64, f64)> = scored
        .iter()
        .map(|(f, c)| (if *f { 1.0 } else { 0.0 }, *c))
        .collect();
    BoxChart {
        groups,
        correlation: pearson(&points),
    }
}

/// Months present in the view, ascending, each with its rows.
fn by_month<'a>(view: &[&'a EnrichedRow]) -> Vec<(u32, Vec<&'a EnrichedRow>)> {
    let mut groups: Vec<(u32, Vec<&'a EnrichedRow>)> = Vec::new();
    for &row in view {
        let Some(month) = row.month else { continue };
        match groups.iter_mut().find(|(m, _)| *m == month) {
            Some((_, rows)) => rows.push(row),
            None => groups.push((month, vec![row])),
        }
    }
    groups.sort_by_key(|(m, _)| *m);
    groups
}

fn monthly_series<F>(view: &[&EnrichedRow], value: F) -> TimeSeries
where
    F: Fn(&[&EnrichedRow]) -> Option<f64>,
{
    let points = by_month(view)
        .into_iter()
        .filter_map(|(month, rows)| {
            Some(MonthlyPoint {
                month,
                name: month_name(month)?,
                value: value(rows.as_slice())?,
            })
        })
        .collect();
    TimeSeries {
        points,
        marker: Marker::default(),
    }
}

/// Number of topic mentions per month.
pub fn monthly_frequency(view: &[&EnrichedRow]) -> TimeSeries {
    monthly_series(view, |rows| Some(rows.len() as f64))
}

/// Mean compound sentiment per month.
pub fn monthly_mean_compound(view: &[&EnrichedRow]) -> TimeSeries {
    monthly_series(view, |rows| {
        let values: Vec<f64> = rows.iter().filter_map(|r| r.compound()).collect();
        (!values.is_empty()).then(|| mean(&values))
    })
}

/// Every chart dataset for one filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub rows: usize,
    pub age_vs_compound: ScatterChart,
    pub gender_vs_compound: BoxChart,
    pub monthly_frequency: TimeSeries,
    pub monthly_compound: TimeSeries,
    pub party_frequency: Vec<Count>,
    pub gender_frequency: Vec<Count>,
    pub minister_status: Vec<Count>,
    pub party_status: Vec<Count>,
    pub party_orientation: Vec<Count>,
    pub chambers: Vec<Count>,
    pub top_speakers: Vec<Count>,
}

impl Dashboard {
    pub fn from_view(view: &[&EnrichedRow]) -> Self {
        let mut top_speakers = counts_of(view, SPEAKER_NAME);
        top_speakers.truncate(TOP_SPEAKERS);
        Self {
            rows: view.len(),
            age_vs_compound: age_vs_compound(view),
            gender_vs_compound: gender_vs_compound(view),
            monthly_frequency: monthly_frequency(view),
            monthly_compound: monthly_mean_compound(view),
            party_frequency: counts_of(view, SPEAKER_PARTY),
            gender_frequency: value_counts(view.iter().map(|r| Some(gender_label(r.is_female)))),
            minister_status: counts_of(view, SPEAKER_MINISTER),
            party_status: counts_of(view, PARTY_STATUS),
            party_orientation: counts_of(view, PARTY_ORIENTATION),
            chambers: counts_of(view, BODY),
            top_speakers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_rows::row;
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn test_pearson_perfect_and_guarded() {
        let r = pearson(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]);
        assert!(close(r.value().unwrap(), 1.0));
        let r = pearson(&[(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]);
        assert!(close(r.value().unwrap(), -1.0));

        assert_eq!(
            pearson(&[(1.0, 1.0)]),
            Correlation::Insufficient {
                message: INSUFFICIENT_DATA.to_string()
            }
        );
        assert_eq!(pearson(&[(1.0, 1.0), (1.0, 2.0)]), Correlation::Undefined);
    }

    #[test]
    fn test_ols() {
        let t = ols(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
        assert!(close(t.slope, 2.0));
        assert!(close(t.intercept, 1.0));
        assert!(ols(&[(1.0, 1.0)]).is_none());
    }

    #[test]
    fn test_box_stats_quartiles() {
        let b = BoxStats::from_values("x", &[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(b.count, 4);
        assert!(close(b.min, 1.0));
        assert!(close(b.q1, 1.75));
        assert!(close(b.median, 2.5));
        assert!(close(b.q3, 3.25));
        assert!(close(b.max, 4.0));
        assert!(BoxStats::from_values("x", &[]).is_none());
    }

    #[test]
    fn test_value_counts_order() {
        let counts = value_counts(
            [Some("b"), Some("a"), None, Some("a"), Some("c"), Some("b"), Some("a")].into_iter(),
        );
        let pairs: Vec<(&str, usize)> = counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("a", 3), ("b", 2), ("c", 1)]);
    }

    #[test]
    fn test_monthly_series() {
        let rows = vec![
            row("1", 0.2, None, false, 3, &[]),
            row("2", 0.4, None, false, 3, &[]),
            row("3", -0.5, None, true, 2, &[]),
        ];
        let view: Vec<&EnrichedRow> = rows.iter().collect();

        let freq = monthly_frequency(&view);
        let got: Vec<(&str, f64)> = freq.points.iter().map(|p| (p.name, p.value)).collect();
        assert_eq!(got, vec![("February", 1.0), ("March", 2.0)]);
        assert_eq!(freq.marker.index, 1);
        assert_eq!(freq.marker.month, "February");

        let mean = monthly_mean_compound(&view);
        assert!(close(mean.points[0].value, -0.5));
        assert!(close(mean.points[1].value, 0.3));
    }

    #[test]
    fn test_dashboard_from_view() {
        let mut rows = Vec::new();
        for i in 0..12 {
            let name = format!("Speaker {}", i % 11);
            rows.push(row(
                &i.to_string(),
                0.1 * f64::from(i % 3),
                Some(30.0 + f64::from(i)),
                i % 2 == 0,
                1 + (i % 4),
                &[
                    ("Speaker_name", name.as_str()),
                    ("Speaker_party", if i < 8 { "VVD" } else { "CDA" }),
                    ("Body", "Lower house"),
                    ("Speaker_minister", "notMinister"),
                ],
            ));
        }
        let view: Vec<&EnrichedRow> = rows.iter().collect();
        let dash = Dashboard::from_view(&view);

        assert_eq!(dash.rows, 12);
        assert_eq!(dash.age_vs_compound.points.len(), 12);
        assert!(dash.age_vs_compound.trend.is_some());
        assert!(dash.age_vs_compound.correlation.value().is_some());
        assert_eq!(dash.gender_vs_compound.groups.len(), 2);
        assert_eq!(dash.gender_vs_compound.groups[0].label, "Male");
        assert_eq!(dash.party_frequency[0], Count { label: "VVD".into(), count: 8 });
        assert_eq!(dash.chambers, vec![Count { label: "Lower house".into(), count: 12 }]);
        assert_eq!(dash.top_speakers.len(), 10);
        assert_eq!(dash.top_speakers[0].label, "Speaker 0");
        assert_eq!(dash.top_speakers[0].count, 2);
        assert!(dash.party_status.is_empty());
        assert_eq!(dash.monthly_frequency.points.len(), 4);
    }

    #[test]
    fn test_single_row_correlation_guard() {
        let rows = vec![row("1", 0.3, Some(44.0), true, 6, &[])];
        let view: Vec<&EnrichedRow> = rows.iter().collect();
        let dash = Dashboard::from_view(&view);
        assert!(matches!(
            dash.age_vs_compound.correlation,
            Correlation::Insufficient { .. }
        ));
        assert!(dash.age_vs_compound.trend.is_none());
        assert!(matches!(
            dash.gender_vs_compound.correlation,
            Correlation::Insufficient { .. }
        ));
    }
}
