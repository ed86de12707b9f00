use std::io::Write;

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};

/// Map `-v`/`--quiet` to a level filter. A CI run shows progress by default.
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Info,  // default: progress
        1 => LevelFilter::Debug, // -v: requests, state transitions
        _ => LevelFilter::Trace, // -vv: prompts and raw bodies
    }
}

pub fn init_logger(verbosity: u8, quiet: bool) {
    let mut builder = Builder::new();
    builder.filter_level(level_for(verbosity, quiet));

    builder.format(|buf, record| {
        let level = record.level();

        let level_label = match level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".white().bold(),
            Level::Debug => "DEBUG".bright_black(),
            Level::Trace => "TRACE".bright_black(),
        };

        writeln!(buf, "{} {}", level_label, record.args())
    });

    builder.init();
}
