use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use devrank_core::modules::{config as core_config, scoring};
use devrank_core::{
    BestDevicesAggregator, DataCollector, FpsSampler, HttpDocumentStore, JsonFileKvStore,
    JsonFileLeaderboardStore, LeaderboardStore, ReadinessGate, StaticMetricSource, SystemClock,
    UploadOutcome, UploadScheduler, UploadTrigger,
};
use devrank_types::{
    BestDeviceEntry, Category, CategoryScore, DeviceContext, LeaderboardConfig, LeaderboardEntry,
    MetricSnapshot,
};

const ENTRIES_FILE: &str = "entries.json";

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Where entries are read from and appended to.
enum Backend {
    /// JSON array file, rewritten on each append
    Local(Arc<JsonFileLeaderboardStore>),
    Remote(Arc<HttpDocumentStore>),
}

impl Backend {
    async fn open(
        config: &LeaderboardConfig,
        data_dir: &Path,
        entries: Option<PathBuf>,
    ) -> Result<Self> {
        if entries.is_none() {
            if let Some(remote) = HttpDocumentStore::from_config(&config.store)
                .context("Invalid remote store configuration")?
            {
                return Ok(Self::Remote(Arc::new(remote)));
            }
        }

        let path = entries.unwrap_or_else(|| data_dir.join(ENTRIES_FILE));
        let store = JsonFileLeaderboardStore::open(&path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        tracing::debug!("Using local entries file {}", store.path().display());
        Ok(Self::Local(Arc::new(store)))
    }

    fn store(&self) -> Arc<dyn LeaderboardStore> {
        match self {
            Self::Local(store) => store.clone(),
            Self::Remote(store) => store.clone(),
        }
    }
}

pub fn normalize_device(
    model: &str,
    brand: &str,
    manufacturer: &str,
    fingerprint: &str,
    json: bool,
) -> Result<()> {
    let device = devrank_core::normalize(model, brand, manufacturer, fingerprint);

    if json {
        println!("{}", serde_json::to_string_pretty(&device)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Original model", device.original_model.as_str()]);
    table.add_row(vec!["Model", device.normalized_model.as_str()]);
    table.add_row(vec!["Brand", device.normalized_brand.as_str()]);
    table.add_row(vec!["Device id", device.normalized_id.as_str()]);
    table.add_row(vec!["Hardware id", device.hardware_id.as_str()]);
    table.add_row(vec!["Display name", device.display_name.as_str()]);
    println!("{table}");
    Ok(())
}

pub fn score_snapshot(snapshot_path: &Path, json: bool) -> Result<()> {
    let snapshot: MetricSnapshot = read_json(snapshot_path)?;
    let scores = scoring::score_all(&snapshot);
    let quality = scoring::data_quality(&snapshot);

    if json {
        let output = serde_json::json!({
            "scores": scores,
            "dataQuality": quality,
            "measurementCount": snapshot.measurement_count(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Category", "Score"]);
    for (category, score) in &scores {
        let cell = match score {
            CategoryScore::Present { score, .. } => Cell::new(format!("{:.1}", score)),
            CategoryScore::Absent => Cell::new("no data").fg(Color::DarkGrey),
        };
        table.add_row(vec![Cell::new(category.label()), cell]);
    }
    println!("{table}");
    println!(
        "\nData quality {}/5 from {} measurements",
        quality,
        snapshot.measurement_count()
    );
    Ok(())
}

pub async fn run_upload(
    config: &LeaderboardConfig,
    data_dir: &Path,
    snapshot_path: &Path,
    device_path: &Path,
    trigger: UploadTrigger,
    entries: Option<PathBuf>,
) -> Result<()> {
    let snapshot: MetricSnapshot = read_json(snapshot_path)?;
    let ctx: DeviceContext = read_json(device_path)?;
    let backend = Backend::open(config, data_dir, entries).await?;

    let clock = Arc::new(SystemClock);
    let kv = Arc::new(JsonFileKvStore::in_dir(data_dir));
    let fps = FpsSampler::new(kv.clone(), clock.clone(), config.fps.clone());
    if let Some(sample) = &snapshot.fps {
        fps.record(sample).await;
    }
    let collector =
        DataCollector::new(Arc::new(StaticMetricSource::new(snapshot)), fps, clock.clone());
    let gate = ReadinessGate::new(config.readiness.clone(), clock.clone());
    let scheduler = UploadScheduler::new(
        ctx,
        collector,
        gate,
        backend.store(),
        kv,
        clock,
        config.upload.clone(),
    );

    let outcome = scheduler.spawn(trigger).await;

    match &outcome {
        UploadOutcome::Uploaded { document_id, entry } => {
            println!(
                "{} {} as {} ({} categories, quality {})",
                "Uploaded".green(),
                entry.display_name,
                document_id,
                entry.scores.len(),
                entry.data_quality
            );
        },
        UploadOutcome::Failed { .. } => println!("{} {}", "Upload".red(), outcome),
        _ => println!("{} {}", "Skipped:".yellow(), outcome),
    }
    Ok(())
}

fn rank_table(entries: &[BestDeviceEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Device", "Avg", "Top", "Users", "Quality"]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.rank),
            Cell::new(&entry.display_name),
            Cell::new(format!("{:.1}", entry.avg_score)),
            Cell::new(format!("{:.1}", entry.top_score)),
            Cell::new(entry.user_count),
            Cell::new(entry.avg_data_quality),
        ]);
    }
    table
}

pub async fn rank(
    config: &LeaderboardConfig,
    data_dir: &Path,
    entries: Option<PathBuf>,
    category: Option<&str>,
    top: Option<usize>,
    json: bool,
) -> Result<()> {
    let backend = Backend::open(config, data_dir, entries).await?;
    let aggregator = BestDevicesAggregator::new(backend.store(), config.query.clone());
    let top_n = top.unwrap_or_else(|| aggregator.default_top_n());

    let rankings: BTreeMap<Category, Vec<BestDeviceEntry>> = match category {
        Some(raw) => {
            let category: Category = raw.parse()?;
            // Single-category output keeps the map shape of the full listing
            [(category, aggregator.best_devices(category, top_n).await)].into_iter().collect()
        },
        None => aggregator.best_devices_all_categories(top_n).await,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rankings)?);
        return Ok(());
    }

    for (category, entries) in &rankings {
        println!("\n{}", category.label().bold());
        if entries.is_empty() {
            println!("{}", "  No devices ranked.".dimmed());
            continue;
        }
        println!("{}", rank_table(entries));
    }
    Ok(())
}

pub async fn insight(
    config: &LeaderboardConfig,
    data_dir: &Path,
    device_id: &str,
    entries: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let backend = Backend::open(config, data_dir, entries).await?;
    let aggregator = BestDevicesAggregator::new(backend.store(), config.query.clone());

    let Some(insight) = aggregator.device_insight(device_id).await else {
        println!("{}", format!("No entries for {}.", device_id).yellow());
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&insight)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Category", "Average"]);
    for (category, average) in &insight.category_averages {
        let mut cell = Cell::new(format!("{:.1}", average));
        if Some(*category) == insight.strongest {
            cell = cell.fg(Color::Green);
        } else if Some(*category) == insight.weakest {
            cell = cell.fg(Color::Red);
        }
        table.add_row(vec![Cell::new(category.label()), cell]);
    }

    println!("{} ({} entries)", insight.display_name.bold(), insight.entry_count);
    println!("{table}");
    println!("Overall {:.1}", insight.overall_score);
    Ok(())
}

pub fn show_config(config: &LeaderboardConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![
        "upload.throttle_interval_secs".to_string(),
        config.upload.throttle_interval_secs.to_string(),
    ]);
    table.add_row(vec!["upload.single_flight".to_string(), config.upload.single_flight.to_string()]);
    table.add_row(vec!["readiness.max_wait_ms".to_string(), config.readiness.max_wait_ms.to_string()]);
    table.add_row(vec![
        "readiness.poll_interval_ms".to_string(),
        config.readiness.poll_interval_ms.to_string(),
    ]);
    table.add_row(vec![
        "readiness.max_entry_age_secs".to_string(),
        config.readiness.max_entry_age_secs.to_string(),
    ]);
    table.add_row(vec!["fps.render_timeout_ms".to_string(), config.fps.render_timeout_ms.to_string()]);
    table.add_row(vec!["fps.cache_ttl_secs".to_string(), config.fps.cache_ttl_secs.to_string()]);
    table.add_row(vec!["query.fetch_limit".to_string(), config.query.fetch_limit.to_string()]);
    table.add_row(vec!["query.top_n".to_string(), config.query.top_n.to_string()]);
    table.add_row(vec![
        "store.base_url".to_string(),
        config.store.base_url.clone().unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec!["store.collection".to_string(), config.store.collection.clone()]);
    println!("{table}");
    Ok(())
}

pub fn init_config(data_dir: &Path) -> Result<()> {
    let path = core_config::config_path(data_dir);
    if path.exists() {
        println!("{} {}", "Config already exists:".yellow(), path.display());
        return Ok(());
    }
    core_config::save_config_to(&LeaderboardConfig::default(), &path)
        .context("Failed to write default config")?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}
