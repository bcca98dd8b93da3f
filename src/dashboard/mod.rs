/// Dashboard over the enriched snapshot.
///
/// Filters narrow the table to a view; every chart dataset in [`charts`] is a
/// pure function of that view and is recomputed on each interaction.
pub mod charts;
pub mod server;

use serde::Serialize;

use crate::corpus::models::{BODY, EnrichedRow, SPEAKER_PARTY};

/// Label of the chamber choice that keeps every chamber.
pub const BOTH_BODIES: &str = "Both";

/// Chamber filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BodyChoice {
    #[default]
    Both,
    Only(String),
}

impl BodyChoice {
    /// Parse a radio selection; `"Both"` or an empty value keeps every chamber.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "" | BOTH_BODIES => Self::Both,
            other => Self::Only(other.to_string()),
        }
    }

    fn admits(&self, row: &EnrichedRow) -> bool {
        match self {
            Self::Both => true,
            Self::Only(body) => row.attr(BODY) == Some(body.as_str()),
        }
    }
}

/// User selections, applied in order: party, chamber, month range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Selected parties; `None` keeps every row.
    pub parties: Option<Vec<String>>,
    pub body: BodyChoice,
    /// Inclusive month range.
    pub months: Option<(u32, u32)>,
}

impl Filters {
    fn admits_party(&self, row: &EnrichedRow) -> bool {
        match &self.parties {
            None => true,
            Some(parties) => row
                .attr(SPEAKER_PARTY)
                .is_some_and(|p| parties.iter().any(|s| s == p)),
        }
    }

    /// Rows passing the party and chamber filters.
    pub fn apply_sidebar<'a>(&self, rows: &'a [EnrichedRow]) -> Vec<&'a EnrichedRow> {
        rows.iter()
            .filter(|r| self.admits_party(r) && self.body.admits(r))
            .collect()
    }

    /// Rows passing every filter, month range included.
    pub fn apply<'a>(&self, rows: &'a [EnrichedRow]) -> Vec<&'a EnrichedRow> {
        let view = self.apply_sidebar(rows);
        match self.months {
            None => view,
            Some((from, to)) => view
                .into_iter()
                .filter(|r| r.month.is_some_and(|m| (from..=to).contains(&m)))
                .collect(),
        }
    }
}

/// Choices offered by the sidebar and the month slider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Distinct parties in first-seen order; also the default selection.
    pub parties: Vec<String>,
    /// `"Both"` followed by the distinct chambers.
    pub bodies: Vec<String>,
    /// Month bounds of the party/chamber-filtered view.
    pub month_bounds: Option<(u32, u32)>,
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.iter().any(|o| o == v) {
            out.push(v.to_string());
        }
    }
    out
}

/// Min and max month of a view, or `None` when no row has a month.
pub fn month_bounds(view: &[&EnrichedRow]) -> Option<(u32, u32)> {
    let months = view.iter().filter_map(|r| r.month);
    let min = months.clone().min()?;
    let max = months.max()?;
    Some((min, max))
}

impl FilterOptions {
    pub fn compute(rows: &[EnrichedRow], filters: &Filters) -> Self {
        let parties = distinct(rows.iter().filter_map(|r| r.attr(SPEAKER_PARTY)));
        let mut bodies = vec![BOTH_BODIES.to_string()];
        bodies.extend(distinct(rows.iter().filter_map(|r| r.attr(BODY))));
        let sidebar = filters.apply_sidebar(rows);
        Self {
            parties,
            bodies,
            month_bounds: month_bounds(&sidebar),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_rows::row;
    use super::*;

    fn rows() -> Vec<EnrichedRow> {
        vec![
            row("1", 0.5, Some(40.0), true, 2, &[("Speaker_party", "VVD"), ("Body", "Lower house")]),
            row("2", -0.2, Some(60.0), false, 3, &[("Speaker_party", "D66"), ("Body", "Upper house")]),
            row("3", 0.1, Some(50.0), false, 5, &[("Speaker_party", "VVD"), ("Body", "Upper house")]),
            row("4", 0.0, None, true, 9, &[("Body", "Lower house")]),
        ]
    }

    fn ids(view: &[&EnrichedRow]) -> Vec<String> {
        view.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_default_filters_keep_everything() {
        let rows = rows();
        assert_eq!(Filters::default().apply(&rows).len(), 4);
    }

    #[test]
    fn test_party_filter() {
        let rows = rows();
        let filters = Filters {
            parties: Some(vec!["VVD".into()]),
            ..Default::default()
        };
        assert_eq!(ids(&filters.apply(&rows)), vec!["1", "3"]);
    }

    #[test]
    fn test_body_filter_after_party() {
        let rows = rows();
        let filters = Filters {
            parties: Some(vec!["VVD".into(), "D66".into()]),
            body: BodyChoice::from_label("Upper house"),
            months: None,
        };
        assert_eq!(ids(&filters.apply(&rows)), vec!["2", "3"]);
    }

    #[test]
    fn test_month_range_inclusive() {
        let rows = rows();
        let filters = Filters {
            months: Some((3, 5)),
            ..Default::default()
        };
        assert_eq!(ids(&filters.apply(&rows)), vec!["2", "3"]);
    }

    #[test]
    fn test_body_choice_labels() {
        assert_eq!(BodyChoice::from_label("Both"), BodyChoice::Both);
        assert_eq!(BodyChoice::from_label(""), BodyChoice::Both);
        assert_eq!(
            BodyChoice::from_label("Lower house"),
            BodyChoice::Only("Lower house".into())
        );
    }

    #[test]
    fn test_options_follow_current_view() {
        let rows = rows();
        let all = FilterOptions::compute(&rows, &Filters::default());
        assert_eq!(all.parties, vec!["VVD", "D66"]);
        assert_eq!(all.bodies, vec!["Both", "Lower house", "Upper house"]);
        assert_eq!(all.month_bounds, Some((2, 9)));

        let upper = Filters {
            body: BodyChoice::Only("Upper house".into()),
            ..Default::default()
        };
        let options = FilterOptions::compute(&rows, &upper);
        assert_eq!(options.month_bounds, Some((3, 5)));
        assert_eq!(options.parties, vec!["VVD", "D66"]);
    }

    #[test]
    fn test_month_bounds_empty_view() {
        assert_eq!(month_bounds(&[]), None);
    }
}
