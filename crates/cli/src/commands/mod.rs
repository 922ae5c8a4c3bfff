pub mod attack;
pub mod dashboard;
pub mod nodes;
pub mod ping;
pub mod profile;
