//! Terminal front-end for Weathercards.
//!
//! Turns input lines into commands, drives the data store and renders
//! suggestion lists, weather cards and notices as text.

pub mod app;
pub mod command;
pub mod error_mapping;
pub mod render;
pub mod session;

pub use app::{App, SessionChannels};
pub use command::Command;
pub use render::Palette;
pub use session::{Notice, NoticeLevel, Session, View};
