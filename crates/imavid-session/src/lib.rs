//! ImaVid Session - edit sessions for still images and video clips
//!
//! This crate provides:
//! - `History`: snapshot undo stack with a protected base
//! - `ImageSession` / `VideoSession`: apply effect, record, preview
//! - `Command` / `Editor`: the textual command surface over both sessions

pub mod command;
pub mod history;
pub mod image;
pub mod video;

pub use command::{parse_script, Command, Editor};
pub use history::History;
pub use image::ImageSession;
pub use video::VideoSession;
