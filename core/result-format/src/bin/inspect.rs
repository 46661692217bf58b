//! Inspect a persisted benchmark result

use result_format::BenchmarkResult;
use std::env;
use std::error::Error;
use std::io;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: inspect <result_file> [--csv]");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    let as_csv = args.iter().skip(2).any(|a| a == "--csv");

    let result = BenchmarkResult::load(path)?;

    if as_csv {
        result.write_csv(io::stdout().lock())?;
        return Ok(());
    }

    println!("=== {} ===", path.display());
    println!("Entries: {}", result.len());
    println!("{:<12} {:>16}", "Parameter", "Mean");
    println!("{:-<29}", "");
    for (parameter, mean) in result.entries() {
        println!("{:<12} {:>16.6}", parameter, mean);
    }

    Ok(())
}
