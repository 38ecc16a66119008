// TUI widget modules for each screen zone.

pub mod dialog;
pub mod help_bar;
pub mod scoring;
pub mod status_bar;
pub mod submission;
