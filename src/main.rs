use std::{env, process::exit};

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mtwist::{vectors, Generator};

/// Exit status for usage errors. Failure counts are clamped below it.
const USAGE_STATUS: i32 = 255;

fn main() {
    setup_logging();

    let args: Vec<String> = env::args().collect();
    let result = run(&args);
    if let Err(e) = &result {
        eprintln!("{:#}", e);
    }
    exit(exit_status(&result));
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn exit_status(result: &Result<usize>) -> i32 {
    match result {
        Ok(failures) => (*failures).min(USAGE_STATUS as usize - 1) as i32,
        Err(_) => USAGE_STATUS,
    }
}

/// Replays the seed 54321 known-answer test and returns the number of failures.
///
/// Each mismatch is logged at error level by [`vectors::verify`].
fn run(args: &[String]) -> Result<usize> {
    let program = args.first().context("missing program name")?;
    if args.len() != 1 {
        bail!("usage: {} (takes no arguments)", program);
    }

    let mut rng = Generator::new();
    rng.seed(vectors::TEST_SEED);
    info!(
        seed = vectors::TEST_SEED,
        count = vectors::TEST_COUNT,
        "Running known-answer test"
    );

    let failures = vectors::verify(&mut rng).len();
    println!("{}: Returned {} failures", program, failures);
    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn passes_known_answers() -> Result<()> {
        let failures = run(&args(&["mtwist"]))?;
        assert_eq!(0, failures);
        assert_eq!(0, exit_status(&Ok(failures)));
        Ok(())
    }

    #[test]
    fn rejects_arguments() {
        let result = run(&args(&["mtwist", "extra"]));
        let message = format!("{:#}", result.as_ref().unwrap_err());
        assert!(message.starts_with("usage: mtwist"), "{}", message);
        assert_eq!(USAGE_STATUS, exit_status(&result));
    }

    #[test]
    fn missing_program_name() {
        let result = run(&[]);
        let message = format!("{:#}", result.as_ref().unwrap_err());
        assert_eq!("missing program name", message);
        assert_eq!(USAGE_STATUS, exit_status(&result));
    }

    #[test]
    fn failure_counts_stay_below_usage_status() {
        assert_eq!(1, exit_status(&Ok(1)));
        assert_eq!(38, exit_status(&Ok(vectors::checked_positions().count())));
        assert_eq!(USAGE_STATUS - 1, exit_status(&Ok(1000)));
    }
}
