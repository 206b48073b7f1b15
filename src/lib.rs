// Blog Console Library
// Settings store, session handling, navigation and API access for the blog front end

pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;
