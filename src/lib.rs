//! tocbar - responsive table of contents for rendered blog pages.
//!
//! The [`toc`] module is the component itself: heading extraction, the
//! sidebar and drawer presentations, scroll tracking and the drawer
//! controller. [`inject`] applies it to a rendered site and [`trace`]
//! replays scroll scripts against it.

pub mod cli;
pub mod config;
pub mod inject;
pub mod logger;
pub mod toc;
pub mod trace;
