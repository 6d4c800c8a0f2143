use std::io;
use std::process;
#[macro_use]
extern crate log;

mod features;
use anyhow::Context;
use clap::Parser;
use features::{Console, Session, Store};
use rand::{rngs::StdRng, SeedableRng};

/// Terminal banking simulator. Accounts live only as long as the process.
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// Seed for the investment draws, for a reproducible session
    #[clap(long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{e:#}");
        process::exit(1);
    }
}

/// Seeded draws repeat across runs; otherwise the OS supplies the entropy.
fn investment_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let units = investment_rng(args.seed);

    let stdin = io::stdin();
    let console = Console::new(stdin.lock(), io::stdout());
    let mut session = Session::new(console, Store::new(), units);
    session.run().context("Terminal session aborted")?;

    let store = session.store();
    if store.is_empty() {
        info!("Session finished without any accounts");
    } else {
        info!("Session finished with {} account(s) open", store.len());
    }
    Ok(())
}
