//! Terminal output for the `beacon` commands.
//!
//! Results go to stdout through these helpers; tracing goes to stderr.

use colored::Colorize;

/// `[ok]` line for something that worked.
pub fn success(msg: &str) {
    println!("{} {msg}", "[ok]".green().bold());
}

/// `[error]` line, on stderr.
pub fn error(msg: &str) {
    eprintln!("{} {}", "[error]".red().bold(), msg.red());
}

/// Error followed by an indented suggestion.
pub fn error_with_fix(msg: &str, fix: &str) {
    error(msg);
    eprintln!("        {} {fix}", "try".yellow());
}

/// Bold heading with an underline sized to the title.
pub fn section(title: &str) {
    println!("{}", title.bold());
    println!("{}", "-".repeat(title.chars().count()).dimmed());
}

/// Aligned `label  value` row under a section.
pub fn kv(label: &str, value: &str) {
    println!("{}  {value}", format!("{label:>12}").cyan());
}

/// Dimmed aside.
pub fn hint(msg: &str) {
    println!("{}", format!("({msg})").dimmed());
}

pub fn blank() {
    println!();
}

/// Report `msg` and exit with status 1.
pub fn fail(msg: &str) -> ! {
    error(msg);
    std::process::exit(1);
}
