//! wkr - command-line front end to the file helpers.
//!
//! Reads anything the transparent opener understands: plain, `.gz` and `.xz`
//! files, `archive.zip:member` references and `-` for stdin.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use wkr::fs::write_atomic_with;
use wkr::io::load_counter;
use wkr::{count_lines, humanise_bytes, open, AccessMode, AtomicWriteOptions, Encoding};

fn main() -> Result<()> {
    env_logger::init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("cat", sub)) => cat(sub),
        Some(("count-lines", sub)) => count(sub),
        Some(("tally", sub)) => tally(sub),
        Some(("write", sub)) => write(sub),
        Some(("humanise", sub)) => humanise(sub),
        _ => unreachable!("subcommand is required"),
    }
}

fn cli() -> Command {
    let files = Arg::new("files")
        .help("Files, zip members (archive.zip:member) or - for stdin")
        .num_args(1..)
        .default_value("-");

    Command::new("wkr")
        .version(wkr::VERSION)
        .about("Transparent file access and atomic writes for data scripts")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("cat")
                .about("Decompress and concatenate files to stdout")
                .arg(files.clone()),
        )
        .subcommand(
            Command::new("count-lines")
                .about("Count lines in each file")
                .arg(files.clone()),
        )
        .subcommand(
            Command::new("tally")
                .about("Sum tab-separated count files and print totals, largest first")
                .arg(files)
                .arg(
                    Arg::new("encoding")
                        .long("encoding")
                        .short('e')
                        .help("Text encoding: utf-8, ascii, latin-1, utf-16, utf-16le or utf-16be")
                        .default_value("utf-8"),
                ),
        )
        .subcommand(
            Command::new("write")
                .about("Atomically replace a file with stdin")
                .arg(
                    Arg::new("destination")
                        .help("File to replace; .gz and .xz are compressed")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("no-backup")
                        .long("no-backup")
                        .help("Do not keep the previous version as <destination>~")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("fsync")
                        .long("fsync")
                        .help("Sync the new contents to disk before replacing")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("humanise")
                .about("Format byte counts")
                .arg(
                    Arg::new("bytes")
                        .help("Byte counts")
                        .num_args(1..)
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    Arg::new("si")
                        .long("si")
                        .help("Use powers of 1000 (kB, MB) instead of 1024 (KiB, MiB)")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn file_args(matches: &ArgMatches) -> Vec<&String> {
    matches
        .get_many::<String>("files")
        .map(|files| files.collect())
        .unwrap_or_default()
}

fn cat(matches: &ArgMatches) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for file in file_args(matches) {
        let mut stream = open(file.as_str(), AccessMode::READ)?;
        io::copy(&mut stream, &mut out).with_context(|| format!("Failed to read {}", file))?;
    }
    out.flush()?;
    Ok(())
}

fn count(matches: &ArgMatches) -> Result<()> {
    let files = file_args(matches);
    let mut total = 0;
    for file in &files {
        let n = count_lines(file.as_str())?;
        total += n;
        println!("{:>10} {}", n, file);
    }
    if files.len() > 1 {
        println!("{:>10} total", total);
    }
    Ok(())
}

fn tally(matches: &ArgMatches) -> Result<()> {
    let encoding: Encoding = matches
        .get_one::<String>("encoding")
        .map_or("utf-8", String::as_str)
        .parse()?;

    let mut combined = wkr::io::Tally::new();
    for file in file_args(matches) {
        let tally = load_counter(file.as_str(), encoding)?;
        for (key, count) in &tally {
            combined.add(key.clone(), *count);
        }
    }
    for (key, count) in combined.most_common() {
        println!("{}\t{}", count, key);
    }
    Ok(())
}

fn write(matches: &ArgMatches) -> Result<()> {
    let destination = matches
        .get_one::<String>("destination")
        .map(PathBuf::from)
        .context("destination argument is required")?;
    let options = AtomicWriteOptions::default()
        .with_backup(!matches.get_flag("no-backup"))
        .with_fsync(matches.get_flag("fsync"));

    let mut data = Vec::new();
    open("-", AccessMode::READ)?
        .read_to_end(&mut data)
        .context("Failed to read stdin")?;
    write_atomic_with([data], &destination, options)?;
    Ok(())
}

fn humanise(matches: &ArgMatches) -> Result<()> {
    let si = matches.get_flag("si");
    if let Some(values) = matches.get_many::<i64>("bytes") {
        for &bytes in values {
            println!("{}", humanise_bytes(bytes, si));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!wkr::VERSION.is_empty());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn test_write_flags() {
        let matches = cli()
            .try_get_matches_from(["wkr", "write", "out.txt.gz", "--no-backup", "--fsync"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "write");
        assert!(sub.get_flag("no-backup"));
        assert!(sub.get_flag("fsync"));
    }

    #[test]
    fn test_files_default_to_stdin() {
        let matches = cli().try_get_matches_from(["wkr", "count-lines"]).unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(file_args(sub), vec!["-"]);
    }

    #[test]
    fn test_humanise_accepts_negative_counts() {
        let matches = cli()
            .try_get_matches_from(["wkr", "humanise", "--si", "-5", "1000"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let values: Vec<i64> = sub.get_many::<i64>("bytes").unwrap().copied().collect();
        assert_eq!(values, vec![-5, 1000]);
    }
}
