pub mod events;
pub mod health;
pub mod sessions;
pub mod signal;
pub mod trace;
