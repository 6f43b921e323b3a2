pub mod backup;
pub mod core;
