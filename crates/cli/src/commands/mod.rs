pub mod actions;
pub mod agent;
pub mod clean;
pub mod profile;

use crate::formatter::OutputFormat;

/// How results are printed to stdout
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub format: OutputFormat,
    pub colorize: bool,
}
