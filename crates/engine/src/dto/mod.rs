pub mod matches;
pub mod schedule;
