pub mod appointments;
pub mod availability;
pub mod barbershops;
pub mod calendar;
pub mod calendar_rules;
pub mod catalog;
pub mod holidays;
pub mod roster;
pub mod units;
pub mod users;
pub mod validation;
