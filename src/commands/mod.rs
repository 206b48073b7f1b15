// Blog Console Commands
// Operations invoked by the console binary

mod settings;
mod content;

pub use settings::*;
pub use content::*;
