// Library root: re-exports the terminal front end so integration tests and
// the binary share one API.

pub mod app;
pub mod input;
pub mod layout;
pub mod terminal;
pub mod widgets;

pub use app::{App, Command, Mode};
pub use terminal::run;
