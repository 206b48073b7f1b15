// Blog Console Models
// Data structures for the application

mod settings;
mod content;

pub use settings::*;
pub use content::*;
