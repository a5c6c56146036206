use std::process::ExitCode;

use clap::Parser;
use slot_table::Error;
use slot_table::SlotTable;

/// Builds a slot table from `key=value` pairs, then removes and looks up keys.
#[derive(Parser, Debug)]
struct Args {
    /// Number of slots. Defaults to ten per pair.
    #[arg(short = 'c', long = "capacity")]
    capacity: Option<usize>,

    /// Keys to remove after the pairs are inserted.
    #[arg(short = 'r', long = "remove")]
    remove: Vec<String>,

    /// Keys to look up once removals are done.
    #[arg(short = 'l', long = "lookup")]
    lookup: Vec<String>,

    /// Pairs to insert, in order, written as `key=value`.
    #[arg(value_parser = parse_pair)]
    pairs: Vec<(String, String)>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

fn run(args: Args) -> Result<(), Error> {
    let mut table = SlotTable::from_mapping(args.pairs, args.capacity)?;

    println!("Built {:?}", table);
    println!("Length {} of {} slots", table.len(), table.capacity());

    for key in &args.remove {
        match table.remove(key.as_str()) {
            Ok(value) => println!("Removed {key:?} (was {value:?})"),
            Err(err) => println!("Could not remove {key:?}: {err}"),
        }
    }

    for key in &args.lookup {
        match table.lookup(key.as_str()) {
            Ok(value) => println!("{key:?} -> {value:?}"),
            Err(err) => println!("{key:?}: {err}"),
        }
    }

    println!("Final {}", table);
    table.debug_stats().print();
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
