mod app;
mod cli;
mod flow;
mod logging;
mod render;

pub use app::run_app;
