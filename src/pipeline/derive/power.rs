use crate::error::MetricsError;
use crate::types::sport::Sport;

#[derive(Debug, Clone, PartialEq)]
pub struct PowerParams {
    pub rider_weight_kg: f64,
    pub bike_weight_kg: f64,
    pub grade_percent: f64,
    /// Frontal area times drag coefficient, riding on the hoods.
    pub drag_area_m2: f64,
    pub rolling_resistance: f64,
    pub air_density: f64,
    pub drivetrain_loss: f64,
    pub gravity: f64,
}

impl Default for PowerParams {
    fn default() -> Self {
        Self {
            rider_weight_kg: 75.0,
            bike_weight_kg: 10.0,
            grade_percent: 0.0,
            drag_area_m2: 0.324,
            rolling_resistance: 0.005,
            air_density: 1.226,
            drivetrain_loss: 0.03,
            gravity: 9.8067,
        }
    }
}

/// Watts needed to hold `kph` under `params`, ignoring wind and acceleration.
pub fn estimate_power(kph: f64, params: &PowerParams) -> f64 {
    let mps = kph / 3.6;
    let mass = params.rider_weight_kg + params.bike_weight_kg;
    let slope = (params.grade_percent / 100.0).atan();

    let gravity_force = params.gravity * slope.sin() * mass;
    let rolling_force = params.gravity * slope.cos() * mass * params.rolling_resistance;
    let drag_force = 0.5 * params.drag_area_m2 * params.air_density * mps * mps;

    let wheel_power = (gravity_force + rolling_force + drag_force) * mps;
    (wheel_power / (1.0 - params.drivetrain_loss)).max(0.0)
}

/// # Panics
/// When `velocity` and `grade` differ in length.
pub fn estimate_cycling_power(
    sport: Sport,
    velocity: &[f64],
    grade: &[f64],
    rider_weight_kg: f64,
) -> Result<Vec<f64>, MetricsError> {
    const METRIC: &str = "estimated cycling power stream";

    if velocity.is_empty() {
        return Err(MetricsError::EmptyStream { stream: "Velocity", metric: METRIC });
    }
    if grade.is_empty() {
        return Err(MetricsError::EmptyStream { stream: "Grade", metric: METRIC });
    }
    if !sport.is_cycling() {
        return Err(MetricsError::UnsupportedSport {
            metric: "estimated cycling power data",
            sport,
            requirement: "Must be done with a bike.",
        });
    }
    if rider_weight_kg.is_nan() || rider_weight_kg <= 0.0 {
        return Err(MetricsError::InvalidRiderWeight(rider_weight_kg));
    }
    assert_eq!(velocity.len(), grade.len(), "velocity and grade streams must be index-aligned");

    let mut params = PowerParams {
        rider_weight_kg,
        ..PowerParams::default()
    };

    Ok(velocity
        .iter()
        .zip(grade)
        .map(|(&mps, &grade_percent)| {
            params.grade_percent = grade_percent;
            estimate_power(mps * 3.6, &params)
        })
        .collect())
}
