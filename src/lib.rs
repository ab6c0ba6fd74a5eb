pub mod cli;
pub mod config;
pub mod dispatch;
pub mod git;
pub mod locate;
pub mod model;
pub mod render;
pub mod shell_exec;
pub mod status;
pub mod styling;
