//! Finished features and how they, and the sketch being drawn, are rendered.

mod renderer;
mod source;
mod style;
mod tessellate;

pub use renderer::*;
pub use source::*;
pub use style::*;
pub use tessellate::*;
