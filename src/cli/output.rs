//! Terminal output for host programs: colored error reports, plain usage text
//!
//! Colors honor NO_COLOR, CLICOLOR and CLICOLOR_FORCE.

use std::error::Error;

use colored::Colorize;

/// Print an error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print an error followed by its chain of causes, one per line
pub fn error_chain(err: &(dyn Error + 'static)) {
    error(err);
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  {} {}", "caused by:".yellow(), cause);
        source = cause.source();
    }
}

/// Print plain output (no color, for usage text and traces)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}
