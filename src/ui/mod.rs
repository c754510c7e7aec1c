//! Terminal user interface
//!
//! Rendering is a pure function of [`crate::app::App`] state: the layout
//! module carves the screen into panels, the render module draws them,
//! and the theme module owns every color and modifier.

pub mod layout;
pub mod render;
pub mod theme;

pub use render::render;
pub use theme::Theme;
