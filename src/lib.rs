pub mod catalog;
pub mod client;
pub mod config;
pub mod console;
pub mod controller;
pub mod query;
pub mod selection;


pub use console::Console;
pub use controller::SelectionController;
