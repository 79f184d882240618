//! FactMiner — harvest social-network reviews and extract ontology facts.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;

use factminer_core::FactMinerConfig;
use factminer_extract::FileEngine;
use factminer_harvest::{TimeWindow, VkClient};
use factminer_ontology::OntologySnapshot;

fn resolve_data_dir() -> PathBuf {
    std::env::var("FACTMINER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn print_help() {
    println!("FactMiner — review harvester and fact extractor");
    println!();
    println!("Usage: factminer <command>");
    println!();
    println!("Commands:");
    println!("  harvest <start> <finish> [terms...]              Harvest reviews (dates as YYYY-MM-DD)");
    println!("  extract <reviews.json> <ontology.json> <category> [--clean]");
    println!("                                                   Extract facts and print them as JSON");
    println!("  score <reviews.json> <keywords...>               Rank reviews by keyword matches");
    println!("  help                                             Show this help message");
    println!();
    println!("Environment:");
    println!("  FACTMINER_DATA_DIR   data directory (default: data)");
    println!("  FACTMINER_ENGINE     pattern engine executable (default: tomita-parser)");
    println!("  VK_ACCESS_TOKEN      access token for the VK API (harvest)");
    println!("  RUST_LOG             log filter (default: info)");
}

fn usage_error(usage: &str) -> ! {
    eprintln!("Usage: factminer {}", usage);
    std::process::exit(1);
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        print_help();
        return Ok(());
    };

    match command.as_str() {
        "harvest" => {
            if args.len() < 4 {
                usage_error("harvest <start> <finish> [terms...]");
            }
            let config = load_config()?;
            let window = TimeWindow::parse(&args[2], &args[3])?;
            let token = std::env::var("VK_ACCESS_TOKEN")
                .context("VK_ACCESS_TOKEN is not set")?;
            let client = VkClient::from_config(token, &config.harvest);

            let (path, stats) = commands::harvest(&config, client, &window, &args[4..])?;
            commands::print_harvest_report(&path, &stats);
        }
        "extract" => {
            let positional: Vec<&String> = args[2..].iter().filter(|a| *a != "--clean").collect();
            if positional.len() != 3 {
                usage_error("extract <reviews.json> <ontology.json> <category> [--clean]");
            }
            let clean = args[2..].iter().any(|a| a == "--clean");
            let config = load_config()?;

            let mut reviews = commands::read_reviews(Path::new(positional[0]))?;
            let ontology = OntologySnapshot::load(Path::new(positional[1]))?;
            let options = commands::extract_options(&config, clean)?;
            let engine = FileEngine::new(config.engine.clone());

            commands::extract(&mut reviews, &ontology, positional[2], &engine, &options)?;
            println!("{}", serde_json::to_string_pretty(&reviews)?);
        }
        "score" => {
            if args.len() < 4 {
                usage_error("score <reviews.json> <keywords...>");
            }
            let mut reviews = commands::read_reviews(Path::new(&args[2]))?;
            commands::print_scores(&mut reviews, &args[3..]);
        }
        "--help" | "-h" | "help" => print_help(),
        _ => {
            eprintln!("Unknown command: {}. Use 'factminer help' for usage.", command);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn load_config() -> anyhow::Result<FactMinerConfig> {
    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());
    let config = FactMinerConfig::from_env(&data_dir)?;
    Ok(config)
}
