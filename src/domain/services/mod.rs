pub mod actions;
mod app_state;
pub mod events;
pub mod offline_cache;
mod scroll;

pub use app_state::*;
pub use scroll::*;
