//! Resolution of abstract ruleset criteria into concrete date bounds.

use super::models::RulesetCriteria;

/// Concrete release-year window, resolved for one generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

impl DateWindow {
    pub fn is_unbounded(&self) -> bool {
        self.min_year.is_none() && self.max_year.is_none()
    }

    /// Whether a release year satisfies both bounds.
    pub fn contains(&self, year: i32) -> bool {
        if let Some(min) = self.min_year {
            if year < min {
                return false;
            }
        }
        if let Some(max) = self.max_year {
            if year > max {
                return false;
            }
        }
        true
    }
}

/// Resolve criteria against the current calendar year.
///
/// `max_year` and `min_year` are taken verbatim; `years_back` overrides
/// `min_year` with `current_year - years_back`. The effective window of a
/// `years_back` ruleset therefore shifts as calendar years pass.
pub fn resolve_window(criteria: &RulesetCriteria, current_year: i32) -> DateWindow {
    let mut window = DateWindow {
        min_year: criteria.min_year,
        max_year: criteria.max_year,
    };

    if let Some(years_back) = criteria.years_back {
        window.min_year = Some(current_year - years_back);
    }

    window
}
