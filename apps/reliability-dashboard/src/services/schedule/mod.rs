//! Schedule status grid and worker liveness.

pub mod matrix;
pub mod types;
pub mod uptime;
