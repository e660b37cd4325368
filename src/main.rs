use clap::Parser;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::error;
use rust_jionet_auth::auth::Negotiator;
use rust_jionet_auth::cli::Args;
use rust_jionet_auth::config::{Credentials, PortalConfig};
use rust_jionet_auth::error::PortalError;
use std::fs::File;
use std::io::Write;
use std::time::Duration;
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    println!("{}", r#"
  JioNet AutoConnect: Captive Portal Negotiator
    "#.cyan().bold());

    let args = Args::parse();

    // ==========================================================================
    // PRECONDITIONS: CREDENTIALS & PORTAL CONFIG
    // ==========================================================================
    // Credentials are checked before any network traffic; a missing key is
    // fatal and names itself.

    let credentials = match Credentials::resolve(args.jio_id, args.password, args.account) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
            std::process::exit(1);
        }
    };

    let mut config = PortalConfig::default();
    if let Some(url_str) = &args.url {
        match Url::parse(url_str) {
            Ok(u) => config.endpoint = u,
            Err(e) => {
                eprintln!("{} Invalid portal URL {}: {}", "✗".red().bold(), url_str, e);
                std::process::exit(1);
            }
        }
    }
    if let Some(cookie) = args.cookie {
        config.cookie = cookie;
    }
    config.timeout = Duration::from_secs(args.timeout);

    println!("Portal endpoint: {}", config.endpoint.as_str().green());

    let negotiator = match Negotiator::new(config, credentials) {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to initialize negotiator: {}", e);
            eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
            std::process::exit(1);
        }
    };

    // ==========================================================================
    // THREE-STEP HANDSHAKE
    // ==========================================================================
    // Strictly sequential: each step's payload carries the token extracted
    // from the previous step's response.

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}").unwrap());
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Step 1/3: fetching portal token...");
    let fetch_token = match negotiator.fetch_token().await {
        Ok(t) => t,
        Err(e) => abort(pb, e),
    };
    pb.println(format!("   {} Fetch token located ({} chars)", "✓".green().bold(), fetch_token.len()));

    pb.set_message("Step 2/3: posting login credentials...");
    let login_token = match negotiator.login(&fetch_token).await {
        Ok(t) => t,
        Err(e) => abort(pb, e),
    };
    pb.println(format!("   {} Login token located ({} chars)", "✓".green().bold(), login_token.len()));

    pb.set_message("Step 3/3: activating session...");
    let document = match negotiator.connect(&login_token).await {
        Ok(d) => d,
        Err(e) => abort(pb, e),
    };
    pb.finish_and_clear();

    println!("\n{}", "Handshake Summary".bold().underline());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Step", "Action", "Outcome"]);
    table.add_row(vec![
        "1".to_string(),
        "fetch".to_string(),
        format!("token located ({} chars)", fetch_token.len()),
    ]);
    table.add_row(vec![
        "2".to_string(),
        "login".to_string(),
        format!("token located ({} chars)", login_token.len()),
    ]);
    table.add_row(vec![
        "3".to_string(),
        "connect".to_string(),
        "session response received".to_string(),
    ]);

    println!("{table}");

    println!("\n{} Authentication completed successfully!", "✓".green().bold());
    println!("{}", serde_json::to_string_pretty(&document).unwrap_or_default());

    // --- OUTPUT LOGIC ---
    if let Some(output_path) = args.output {
        println!("Saving connect response to {}...", output_path);
        match File::create(output_path) {
            Ok(mut file) => {
                let json_output = serde_json::to_string_pretty(&document).unwrap_or_default();
                if let Err(e) = file.write_all(json_output.as_bytes()) {
                    error!("Failed to write output file: {}", e);
                } else {
                    println!("{}", "Success!".green());
                }
            },
            Err(e) => error!("Failed to create output file: {}", e),
        }
    }

    Ok(())
}

/// Print a classified failure and terminate the run. Token-not-found
/// failures dump the offending response so the portal's shape can be
/// inspected.
fn abort(pb: ProgressBar, err: PortalError) -> ! {
    pb.finish_and_clear();

    eprintln!("{} {} failure: {}", "✗".red().bold(), err.kind(), err);

    if let PortalError::TokenNotFound { response, .. } = &err {
        eprintln!("Full response structure for debugging:");
        eprintln!("{}", serde_json::to_string_pretty(response).unwrap_or_default());
    }

    eprintln!("\n{} Authentication failed!", "✗".red().bold());
    std::process::exit(1);
}
