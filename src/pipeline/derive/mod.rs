mod grade;
mod power;

pub use grade::{adjusted_speed, compute_grade, compute_grade_adjusted_speed};
pub use power::{estimate_cycling_power, estimate_power, PowerParams};

use crate::types::activity::{CanonicalActivity, StreamSet};

/// Adds grade, grade adjusted speed and estimated power to `streams` where they apply.
///
/// A derived stream that cannot be computed is left absent and the reason logged; the
/// rest of the activity is unaffected.
pub fn append_derived_streams(
    activity: &CanonicalActivity,
    streams: &mut StreamSet,
    rider_weight_kg: Option<f64>,
) {
    if let (Some(distance), Some(altitude)) = (&streams.distance, &streams.altitude) {
        match compute_grade(distance, altitude) {
            Ok(grade) => streams.grade_smooth = Some(grade),
            Err(err) => tracing::info!("Skipping grade for {}: {}", activity.id, err),
        }
    }

    let Some(grade) = streams.grade_smooth.as_deref() else {
        return;
    };
    let velocity = streams.velocity_smooth.as_deref().unwrap_or_default();
    let sport = activity.sport_type;

    if !activity.has_power_meter && sport.is_cycling() {
        match estimate_cycling_power(sport, velocity, grade, rider_weight_kg.unwrap_or(0.0)) {
            Ok(watts) => streams.watts_calc = Some(watts),
            Err(err) => tracing::info!("Skipping estimated power for {}: {}", activity.id, err),
        }
    }

    if sport.is_running() {
        match compute_grade_adjusted_speed(sport, velocity, grade) {
            Ok(speed) => streams.grade_adjusted_speed = Some(speed),
            Err(err) => tracing::info!("Skipping grade adjusted speed for {}: {}", activity.id, err),
        }
    }
}
