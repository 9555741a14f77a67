use std::{
    fs,
    io::{self, BufRead},
    path::Path,
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::{
    journal::{Journal, Level},
    timer::{
        engine::{TimerConfig, DEFAULT_SHIFT_HOURS, DEFAULT_UPDATE_INTERVAL},
        start_timer,
    },
    utils::{
        dir::{create_journal_default_dir, journal_file_name},
        logging::enable_diagnostics,
        time::TimeOfDay,
    },
};

#[derive(Parser, Debug)]
#[command(name = "clockout", version)]
#[command(about = "Console countdown timer for the end of a workday", long_about = None)]
struct Args {
    #[arg(
        short,
        long,
        help = "Start time of the workday as \"HH:MM\" or bare minutes. Defaults to the current time"
    )]
    time: Option<TimeOfDay>,
    #[arg(
        short,
        long,
        default_value = "0:45",
        help = "Total break length added to the timer"
    )]
    breaktime: TimeOfDay,
    #[arg(
        short,
        long,
        default_value = "0:00",
        help = "Overtime length added to the timer"
    )]
    overtime: TimeOfDay,
    #[arg(
        short,
        long,
        default_value = "0:00",
        help = "Freetime length subtracted from the timer"
    )]
    freetime: TimeOfDay,
    #[arg(
        short = 'l',
        long = "no-log",
        help = "Skip writing to the journal file for this run"
    )]
    no_log: bool,
    #[arg(
        long = "log-filter",
        default_value = "info",
        help = "Minimum level of entries written to the journal"
    )]
    log_filter: Level,
    #[arg(
        short,
        long = "clear-log",
        help = "Delete and recreate the journal file of the current year, then exit"
    )]
    clear_log: bool,
    #[arg(
        short,
        long,
        help = "Print the configuration on start and a per-second countdown while sleeping"
    )]
    verbose: bool,
    #[arg(short, long, help = "Reserved: play a sound when the timer runs out")]
    sound: bool,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let diagnostics_level = if args.verbose {
        Some(LevelFilter::DEBUG)
    } else {
        None
    };
    enable_diagnostics(diagnostics_level);

    let journal_path =
        create_journal_default_dir()?.join(journal_file_name(Local::now().year()));

    if args.clear_log {
        return clear_journal(&journal_path);
    }

    let journal = if args.no_log {
        Journal::disabled()
    } else {
        match Journal::open(&journal_path, args.log_filter) {
            Ok((journal, is_new)) => {
                if is_new {
                    println!("Created new journal file at {}.", journal_path.display());
                    println!();
                }
                journal
            }
            Err(e) => {
                println!("Got an error while opening the journal: {e:#}.");
                println!("Should the timer continue without logging? (y/n)");
                if !read_confirmation()? {
                    return Ok(());
                }
                Journal::disabled()
            }
        }
    };
    let journal = Arc::new(journal);

    let config = TimerConfig {
        start: args
            .time
            .unwrap_or_else(|| TimeOfDay::from_datetime(Local::now())),
        breaktime: args.breaktime,
        overtime: args.overtime,
        freetime: args.freetime,
        verbose: args.verbose,
    };

    if args.sound {
        println!("Sound is not implemented yet, the flag is ignored.");
    }

    if args.verbose {
        journal.info("Setting console output to verbose.");
        print_configuration(&config, &journal_path);
    }

    start_timer(config, journal).await;
    Ok(())
}

/// Deletes the yearly journal file and recreates it empty, with console
/// progress messages.
fn clear_journal(path: &Path) -> Result<()> {
    print!("Deleting journal at \"{}\"... ", path.display());
    match fs::remove_file(path) {
        Ok(()) => println!("Done."),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            println!("No journal file available to be deleted.");
        }
        Err(e) => {
            println!("Failed!");
            return Err(e).with_context(|| format!("deleting journal at {}", path.display()));
        }
    }

    print!("Creating new empty journal at \"{}\"... ", path.display());
    fs::File::create(path)
        .with_context(|| format!("creating journal at {}", path.display()))?;
    println!("Done.");
    Ok(())
}

fn read_confirmation() -> Result<bool> {
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "yep" | "yeah" | "yea"
    ))
}

fn print_configuration(config: &TimerConfig, journal_path: &Path) {
    println!("Starting timer with configuration:");
    println!("----------------------------------");
    println!("time      = {}", config.start);
    println!("breaktime = {}", config.breaktime);
    println!("overtime  = {}", config.overtime);
    println!("freetime  = {}", config.freetime);
    println!();
    println!("Program defaults are set to:");
    println!("----------------------------");
    println!(
        "update interval      = {} ms",
        DEFAULT_UPDATE_INTERVAL.as_millis()
    );
    println!("default timer length = {DEFAULT_SHIFT_HOURS} hours");
    println!("journal path         = {}", journal_path.display());
    println!();
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use clap::Parser;
    use tempfile::tempdir;

    use crate::{journal::Level, utils::time::TimeOfDay};

    use super::{clear_journal, Args};

    fn time(hour: u8, minute: u8) -> TimeOfDay {
        TimeOfDay::new(hour, minute).unwrap()
    }

    #[test]
    fn arguments_parse_into_times() {
        let args = Args::try_parse_from([
            "clockout", "-t", "8:00", "-b", "30", "-o", "1:15", "-f", "45",
        ])
        .unwrap();

        assert_eq!(args.time, Some(time(8, 0)));
        assert_eq!(args.breaktime, time(0, 30));
        assert_eq!(args.overtime, time(1, 15));
        assert_eq!(args.freetime, time(0, 45));
        assert!(!args.no_log);
        assert!(!args.verbose);
    }

    #[test]
    fn defaults_match_the_help_screen() {
        let args = Args::try_parse_from(["clockout"]).unwrap();

        assert_eq!(args.time, None);
        assert_eq!(args.breaktime, time(0, 45));
        assert_eq!(args.overtime, time(0, 0));
        assert_eq!(args.freetime, time(0, 0));
        assert_eq!(args.log_filter, Level::Info);
    }

    #[test]
    fn malformed_times_abort_parsing() {
        assert!(Args::try_parse_from(["clockout", "-t", "25:00"]).is_err());
        assert!(Args::try_parse_from(["clockout", "-b", "1:2:3"]).is_err());
        assert!(Args::try_parse_from(["clockout", "-o", "123456"]).is_err());
    }

    #[test]
    fn log_filter_accepts_level_names() {
        let args = Args::try_parse_from(["clockout", "--log-filter", "warning"]).unwrap();
        assert_eq!(args.log_filter, Level::Warning);

        assert!(Args::try_parse_from(["clockout", "--log-filter", "loud"]).is_err());
    }

    #[test]
    fn clear_journal_replaces_the_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("clockout_2026.log");
        fs::write(&path, "old entries\n")?;

        clear_journal(&path)?;

        assert_eq!(fs::read_to_string(&path)?, "");
        Ok(())
    }

    #[test]
    fn clear_journal_tolerates_a_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("clockout_2026.log");

        clear_journal(&path)?;

        assert!(path.exists());
        Ok(())
    }
}
