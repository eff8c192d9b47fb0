use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Athlete profile valid from `since` until the next period starts.
/// The period without `since` covers everything before the first dated one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicAthleteSettings {
    pub since: Option<NaiveDate>,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AthleteSettings {
    pub periods: Vec<PeriodicAthleteSettings>,
}

impl AthleteSettings {
    pub fn with_weight(weight_kg: f64) -> Self {
        Self {
            periods: vec![PeriodicAthleteSettings {
                since: None,
                weight_kg,
            }],
        }
    }

    /// Settings in effect on `date`.
    pub fn resolve(&self, date: NaiveDate) -> Option<&PeriodicAthleteSettings> {
        let dated = self
            .periods
            .iter()
            .filter(|period| period.since.is_some_and(|since| since <= date))
            .max_by_key(|period| period.since);

        dated.or_else(|| self.periods.iter().find(|period| period.since.is_none()))
    }

    pub fn weight_on(&self, date: NaiveDate) -> Option<f64> {
        self.resolve(date).map(|period| period.weight_kg)
    }
}
