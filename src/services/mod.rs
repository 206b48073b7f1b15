// Blog Console Services
// Business logic layer

mod storage;
mod events;
mod settings_store;
mod token_store;
mod navigation;
mod api_client;

pub use storage::*;
pub use events::*;
pub use settings_store::*;
pub use token_store::*;
pub use navigation::*;
pub use api_client::*;
