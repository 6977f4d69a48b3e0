pub mod analysis;
pub mod schedule;
pub mod status_poller;
pub mod upstream;
