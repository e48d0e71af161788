mod action;
mod cache;
mod constellation;
mod event;
mod gateway;
mod loading;
mod message;

pub use action::*;
pub use cache::*;
pub use constellation::*;
pub use event::*;
pub use gateway::*;
pub use loading::*;
pub use message::*;
