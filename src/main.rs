//! Solana Vanity Address Generator CLI
//!
//! Usage:
//!   sol_vanity SoL                                # Find address starting with "SoL"
//!   sol_vanity SoL https://discord.com/api/webhooks/...  # ... and announce it
//!   sol_vanity Ab --mode direct --entropy direct  # Raw-seed keys, no prefetch pool

use std::io::Write;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sol_vanity::notify::notify_found;
use sol_vanity::worker::{SearchContext, ThroughputSample};
use sol_vanity::{Config, FoundWallet, PrefixMatcher, WorkerPool};

fn main() {
    let config = Config::parse();
    init_logging();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    let settings = config.search_settings();

    let mut pool = match WorkerPool::new(settings, PrefixMatcher::new(config.prefix.clone())) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to start search: {}", e);
            process::exit(1);
        }
    };

    // Print startup info
    println!("Solana Vanity Address Generator");
    println!("===============================");
    println!("Prefix:     {}", pool.matcher().prefix());
    println!("Difficulty: {}", pool.matcher().difficulty_description());
    println!("Mode:       {}", settings.mode);
    println!("Entropy:    {}", settings.entropy);
    println!("Workers:    {}", pool.num_workers());
    println!(
        "Webhook:    {}",
        if config.webhook_url.is_some() { "configured" } else { "not configured" }
    );
    println!();

    ctrlc_handler(pool.context());

    let prefix = pool.matcher().prefix().to_string();
    if let Err(e) = pool.spawn_reporter(config.report_interval(), move |sample| {
        print_progress(&prefix, sample)
    }) {
        eprintln!("Failed to start reporter: {}", e);
    }

    println!("Searching... (Press Ctrl+C to stop)\n");

    let outcome = pool.wait();
    let total = pool.total_candidates();
    let elapsed = pool.elapsed();
    let rate = pool.candidates_per_second();
    pool.join();

    match outcome {
        Ok(Some(wallet)) => {
            print_result(&wallet);
            if let Some(url) = config.webhook_url.as_deref() {
                println!("Sending webhook notification...");
                if !notify_found(url, &wallet) {
                    println!("Webhook notification failed (see log).");
                }
            }
        }
        Ok(None) => {
            println!("\n\nStopped by user.");
            println!("Candidates checked: {}", format_number(total));
            println!("Time elapsed:       {:.2}s", elapsed.as_secs_f64());
            println!("Average speed:      {}/s", format_number(rate as u64));
        }
        Err(e) => {
            eprintln!("\nSearch failed: {}", e);
            process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_result(wallet: &FoundWallet) {
    println!("\n\n=== Wallet found in {:.3}s ===", wallet.elapsed.as_secs_f64());
    println!("Address:     {}", wallet.address);
    println!("Private Key: {}", wallet.private_key_base58().as_str());
    match wallet.mnemonic() {
        Some(phrase) => println!("Mnemonic:    {}", phrase),
        None => println!("Mnemonic:    unavailable"),
    }
    println!("Derivation:  {}", wallet.mode);
    println!("Worker:      {}", wallet.worker_id);
    println!("Candidates:  {}", format_number(wallet.candidates));
    println!(
        "Avg speed:   {}/s",
        format_number(wallet.candidates_per_second() as u64)
    );
    println!();
}

fn print_progress(prefix: &str, sample: &ThroughputSample) {
    print!(
        "\r[{:>5}s] prefix '{}' | {}/s | total {}        ",
        sample.elapsed.as_secs(),
        prefix,
        format_number(sample.rate as u64),
        format_number(sample.total)
    );
    let _ = std::io::stdout().flush();
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(context: Arc<SearchContext>) {
    if let Err(e) = ctrlc::set_handler(move || {
        context.signal.cancel();
    }) {
        eprintln!("Warning: could not install Ctrl-C handler: {}", e);
    }
}
