//! Dice-roll demo service: emits one instrumented roll per tick through the
//! trace, metric and log pipelines, and shuts down / restarts the telemetry
//! subsystem at scripted points in the tick schedule.

pub mod config;
pub mod driver;
pub mod roll;
