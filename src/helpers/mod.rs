//! Helper functions shared by the generator, templates and commands

mod date;
mod text;
mod url;

pub use date::*;
pub use text::*;
pub use url::*;
