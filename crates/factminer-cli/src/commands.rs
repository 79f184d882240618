//! Subcommand implementations. Each one works on a review file so the
//! harvest, extract and score steps can run separately.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use factminer_core::FactMinerConfig;
use factminer_extract::{
    load_stop_words, rank_by_keywords, ExtractOptions, PatternEngine, Review,
};
use factminer_harvest::{HarvestStats, Harvester, SocialNetwork, TimeWindow};
use factminer_ontology::OntologyGraph;
use tracing::info;

pub fn read_reviews(path: &Path) -> anyhow::Result<Vec<Review>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read reviews from {}", path.display()))?;
    let reviews = serde_json::from_str(&data)
        .with_context(|| format!("Invalid reviews file {}", path.display()))?;
    Ok(reviews)
}

pub fn write_reviews(path: &Path, reviews: &[Review]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(reviews)?)?;
    Ok(())
}

/// Where a harvest over `window` is stored.
pub fn reviews_file(config: &FactMinerConfig, window: &TimeWindow) -> PathBuf {
    config
        .data_paths
        .reviews
        .join(format!("{}_{}.json", window.start(), window.finish()))
}

/// Harvest `window` with the configured terms plus `extra_terms`, and save
/// the reviews under the data directory.
pub fn harvest<C: SocialNetwork>(
    config: &FactMinerConfig,
    client: C,
    window: &TimeWindow,
    extra_terms: &[String],
) -> anyhow::Result<(PathBuf, HarvestStats)> {
    let mut harvester = Harvester::new(client, config.harvest.clone())?;
    for term in extra_terms {
        harvester.add_request(term.as_str());
    }
    if harvester.requests().is_empty() {
        return Err(anyhow!(
            "No search terms: pass them on the command line or list them in {}",
            config.data_paths.harvest_file.display()
        ));
    }

    let (reviews, stats) = harvester.harvest_with_stats(window)?;
    let path = reviews_file(config, window);
    write_reviews(&path, &reviews)?;
    info!("Saved {} reviews to {}", reviews.len(), path.display());
    Ok((path, stats))
}

/// Extraction options for the CLI flags; `--clean` uses the data
/// directory's stop-word list.
pub fn extract_options(config: &FactMinerConfig, clean: bool) -> anyhow::Result<ExtractOptions> {
    if !clean {
        return Ok(ExtractOptions::raw());
    }
    let stop_words = load_stop_words(&config.data_paths.stop_words_file)?;
    Ok(ExtractOptions::cleaned(stop_words))
}

/// Extract facts of `category` for every review.
pub fn extract<E: PatternEngine + ?Sized>(
    reviews: &mut [Review],
    ontology: &OntologyGraph,
    category: &str,
    engine: &E,
    options: &ExtractOptions,
) -> anyhow::Result<()> {
    let category_id = ontology.category(category).ok_or_else(|| {
        anyhow!(
            "Unknown category {:?}; known: {}",
            category,
            ontology.category_names().join(", ")
        )
    })?;

    let mut extracted = 0;
    for review in reviews.iter_mut() {
        if review.extract_facts(ontology, category_id, engine, options) {
            extracted += 1;
        }
    }
    info!(
        "Extracted facts for {} of {} reviews ({} already done)",
        extracted,
        reviews.len(),
        reviews.len() - extracted
    );
    Ok(())
}

pub fn print_harvest_report(path: &Path, stats: &HarvestStats) {
    println!("=== FactMiner Harvest Report ===");
    println!();
    println!("Groups seen:        {}", stats.groups_seen);
    println!("Closed skipped:     {}", stats.closed_groups_skipped);
    println!("Topics in window:   {} of {}", stats.topics_kept, stats.topics_seen);
    println!("Reviews:            {}", stats.comments_kept);
    println!("Page requests:      {}", stats.page_requests);
    println!();
    println!("Saved to {}", path.display());
}

pub fn print_scores(reviews: &mut [Review], keywords: &[String]) {
    rank_by_keywords(reviews, keywords);
    for review in reviews.iter() {
        println!("{:>3}  {}", review.keyword_count().unwrap_or(0), review);
    }
}
