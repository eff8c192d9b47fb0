use crate::error::MetricsError;
use crate::types::sport::Sport;

const SMOOTH_WINDOW: usize = 3;
/// Steeper values are treated as altimeter noise.
const MAX_GRADE_PERCENT: f64 = 45.0;
/// Segments shorter than this keep the previous slope.
const MIN_SEGMENT_METERS: f64 = 0.5;

/// Slope in percent for each sample, smoothed over neighbouring segments.
///
/// # Panics
/// When `distance` and `altitude` differ in length.
pub fn compute_grade(distance: &[f64], altitude: &[f64]) -> Result<Vec<f64>, MetricsError> {
    const METRIC: &str = "grade stream";

    if distance.is_empty() {
        return Err(MetricsError::EmptyStream { stream: "Distance", metric: METRIC });
    }
    if altitude.is_empty() {
        return Err(MetricsError::EmptyStream { stream: "Altitude", metric: METRIC });
    }
    assert_eq!(
        distance.len(),
        altitude.len(),
        "distance and altitude streams must be index-aligned"
    );

    let len = distance.len();

    // Slope of the segment ending at each sample
    let mut raw_grades = vec![0.0_f64; len];
    for i in 1..len {
        let run = distance[i] - distance[i - 1];
        raw_grades[i] = if run > MIN_SEGMENT_METERS {
            (altitude[i] - altitude[i - 1]) / run * 100.0
        } else {
            raw_grades[i - 1]
        };
    }
    if len > 1 {
        raw_grades[0] = raw_grades[1];
    }

    let grades = (0..len)
        .map(|i| {
            let start = i.saturating_sub(SMOOTH_WINDOW);
            let end = (i + SMOOTH_WINDOW + 1).min(len);
            let avg = raw_grades[start..end].iter().sum::<f64>() / (end - start) as f64;
            avg.clamp(-MAX_GRADE_PERCENT, MAX_GRADE_PERCENT)
        })
        .collect();

    Ok(grades)
}

/// # Panics
/// When `velocity` and `grade` differ in length.
pub fn compute_grade_adjusted_speed(
    sport: Sport,
    velocity: &[f64],
    grade: &[f64],
) -> Result<Vec<f64>, MetricsError> {
    const METRIC: &str = "grade adjusted speed stream";

    if velocity.is_empty() {
        return Err(MetricsError::EmptyStream { stream: "Velocity", metric: METRIC });
    }
    if grade.is_empty() {
        return Err(MetricsError::EmptyStream { stream: "Grade", metric: METRIC });
    }
    if !sport.is_running() {
        return Err(MetricsError::UnsupportedSport {
            metric: "grade adjusted speed data",
            sport,
            requirement: "Must be running like.",
        });
    }
    assert_eq!(velocity.len(), grade.len(), "velocity and grade streams must be index-aligned");

    Ok(velocity
        .iter()
        .zip(grade)
        .map(|(&speed, &grade)| adjusted_speed(speed, grade))
        .collect())
}

/// Scales `speed` by the metabolic cost of running at `grade_percent` relative to flat
/// ground (Minetti et al. 2002).
pub fn adjusted_speed(speed: f64, grade_percent: f64) -> f64 {
    speed * running_cost(grade_percent / 100.0) / running_cost(0.0)
}

/// J/kg/m; the polynomial is fitted on slopes between -45% and +45%.
fn running_cost(grade: f64) -> f64 {
    let g = grade.clamp(-0.45, 0.45);
    155.4 * g.powi(5) - 30.4 * g.powi(4) - 43.3 * g.powi(3) + 46.3 * g.powi(2) + 19.5 * g + 3.6
}
