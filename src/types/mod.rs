pub mod activity;
pub mod athlete;
pub mod sport;
pub mod sync;
