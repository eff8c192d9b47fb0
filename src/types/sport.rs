use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Internal sport taxonomy. Every external label resolves to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    AlpineSki,
    AmericanFootball,
    Aquathlon,
    BackcountrySki,
    Badminton,
    Baseball,
    Basketball,
    Boxe,
    Canoeing,
    Cardio,
    Climbing,
    Combat,
    Cricket,
    Crossfit,
    Dance,
    Diving,
    Drive,
    Duathlon,
    EBikeRide,
    Elliptical,
    Fishing,
    Flying,
    Football,
    Frisbee,
    Golf,
    Gymnastics,
    Handball,
    Handcycle,
    HangGliding,
    Hike,
    HorsebackRiding,
    IceHockey,
    IceSkate,
    InlineSkate,
    Kayaking,
    Kitesurf,
    MotorSports,
    Mountaineering,
    NordicSki,
    Orienteering,
    Other,
    Paragliding,
    Ride,
    RockClimbing,
    RollerSki,
    Rowing,
    Rugby,
    Run,
    Sailing,
    Skating,
    SkiTouring,
    SkyDiving,
    Snorkeling,
    Snowboard,
    Snowmobiling,
    Snowshoe,
    Softball,
    Squash,
    StairStepper,
    StandUpPaddling,
    Stretching,
    Surfing,
    Swim,
    TableTennis,
    Tactical,
    TelemarkSki,
    Tennis,
    TrackAndField,
    Triathlon,
    Velomobile,
    VirtualRide,
    VirtualRun,
    Volleyball,
    Wakeboarding,
    Walk,
    WaterSkiing,
    WeightTraining,
    Wheelchair,
    Windsurf,
    Workout,
    Yoga,
}

impl Sport {
    /// Foot-based sports, on road or virtual.
    pub fn is_running(self) -> bool {
        matches!(self, Sport::Run | Sport::VirtualRun)
    }

    /// Bike sports eligible for power estimation.
    pub fn is_cycling(self) -> bool {
        matches!(self, Sport::Ride | Sport::VirtualRide)
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// External activity-type vocabulary shared by the format parsers, and the sport each
/// label maps to. Append-only.
pub const SPORT_LABELS: &[(&str, Sport)] = &[
    ("Aerobics", Sport::Cardio),
    ("Alpine Skiing", Sport::AlpineSki),
    ("American Football", Sport::AmericanFootball),
    ("Aquathlon", Sport::Aquathlon),
    ("Backcountry Skiing", Sport::BackcountrySki),
    ("Badminton", Sport::Badminton),
    ("Baseball", Sport::Baseball),
    ("Basketball", Sport::Basketball),
    ("Boxing", Sport::Boxe),
    ("Canoeing", Sport::Canoeing),
    ("Cardio Training", Sport::Cardio),
    ("Climbing", Sport::Climbing),
    ("Combat", Sport::Combat),
    ("Cricket", Sport::Cricket),
    ("Crossfit", Sport::Crossfit),
    ("Cross Country Skiing", Sport::NordicSki),
    ("Crosstrainer", Sport::Elliptical),
    ("Cycling", Sport::Ride),
    ("Dancing", Sport::Dance),
    ("Diving", Sport::Diving),
    ("Downhill Skiing", Sport::AlpineSki),
    ("Driving", Sport::Drive),
    ("Duathlon", Sport::Duathlon),
    ("E-Bike Ride", Sport::EBikeRide),
    ("Elliptical Trainer", Sport::Elliptical),
    ("Fishing", Sport::Fishing),
    ("Fitness Equipment", Sport::Workout),
    ("Flexibility Training", Sport::Workout),
    ("Floor Climbing", Sport::Workout),
    ("Floorball", Sport::Workout),
    ("Flying", Sport::Flying),
    ("Football", Sport::Football),
    ("Free Diving", Sport::Diving),
    ("Frisbee", Sport::Frisbee),
    ("Generic", Sport::Workout),
    ("Golf", Sport::Golf),
    ("Gymnastics", Sport::Gymnastics),
    ("Handcycle", Sport::Handcycle),
    ("Handball", Sport::Handball),
    ("Hang Gliding", Sport::HangGliding),
    ("Hiking", Sport::Hike),
    ("Horseback Riding", Sport::HorsebackRiding),
    ("Ice Hockey", Sport::IceHockey),
    ("Ice Skating", Sport::IceSkate),
    ("Indoor Cycling", Sport::Ride),
    ("Indoor Rowing", Sport::Rowing),
    ("Indoor Running", Sport::Run),
    ("Indoor Training", Sport::Workout),
    ("Inline Skating", Sport::InlineSkate),
    ("Kayaking", Sport::Kayaking),
    ("Kettlebell", Sport::WeightTraining),
    ("Kitesurfing", Sport::Kitesurf),
    ("Motorcycling", Sport::MotorSports),
    ("Motorsports", Sport::MotorSports),
    ("Mountain Biking", Sport::Ride),
    ("Mountaineering", Sport::Mountaineering),
    ("Nordic Walking", Sport::Walk),
    ("Open Water Swimming", Sport::Swim),
    ("Orienteering", Sport::Orienteering),
    ("Paddling", Sport::Canoeing),
    ("Paragliding", Sport::Paragliding),
    ("Rafting", Sport::Canoeing),
    ("Rock Climbing", Sport::RockClimbing),
    ("Roller Ski", Sport::RollerSki),
    ("Rowing", Sport::Rowing),
    ("Rugby", Sport::Rugby),
    ("Running", Sport::Run),
    ("Sailing", Sport::Sailing),
    ("Scuba Diving", Sport::Diving),
    ("Skating", Sport::Skating),
    ("Ski Touring", Sport::SkiTouring),
    ("Sky Diving", Sport::SkyDiving),
    ("Snorkeling", Sport::Snorkeling),
    ("Snowboarding", Sport::Snowboard),
    ("Snowmobiling", Sport::Snowmobiling),
    ("Snowshoeing", Sport::Snowshoe),
    ("Soccer", Sport::Football),
    ("Softball", Sport::Softball),
    ("Squash", Sport::Squash),
    ("Stair Stepper", Sport::StairStepper),
    ("Stand Up Paddling", Sport::StandUpPaddling),
    ("Strength Training", Sport::WeightTraining),
    ("Stretching", Sport::Stretching),
    ("Surfing", Sport::Surfing),
    ("Swimming", Sport::Swim),
    ("Swimrun", Sport::Workout),
    ("Table Tennis", Sport::TableTennis),
    ("Tactical", Sport::Tactical),
    ("Telemark Skiing", Sport::TelemarkSki),
    ("Tennis", Sport::Tennis),
    ("Track and Field", Sport::TrackAndField),
    ("Trail Running", Sport::Run),
    ("Training", Sport::Workout),
    ("Treadmill", Sport::Run),
    ("Trekking", Sport::Hike),
    ("Triathlon", Sport::Triathlon),
    ("Unknown Sport", Sport::Other),
    ("Velomobile", Sport::Velomobile),
    ("Virtual Cycling", Sport::VirtualRide),
    ("Virtual Running", Sport::VirtualRun),
    ("Volleyball", Sport::Volleyball),
    ("Wakeboarding", Sport::Wakeboarding),
    ("Walking", Sport::Walk),
    ("Water Skiing", Sport::WaterSkiing),
    ("Weight Training", Sport::WeightTraining),
    ("Wheelchair", Sport::Wheelchair),
    ("Windsurfing", Sport::Windsurf),
    ("Workout", Sport::Workout),
    ("Yoga", Sport::Yoga),
    ("Yoga Pilates", Sport::Yoga),
];

static SPORT_TABLE: Lazy<HashMap<&'static str, Sport>> =
    Lazy::new(|| SPORT_LABELS.iter().copied().collect());

/// Maps an external activity-type label to the internal taxonomy.
/// Labels absent from [`SPORT_LABELS`] resolve to [`Sport::Other`].
pub fn map_sport(label: &str) -> Sport {
    SPORT_TABLE.get(label).copied().unwrap_or(Sport::Other)
}
