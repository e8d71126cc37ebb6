//! Ranks devices per category from the rows in the leaderboard store.
//!
//! Rankings are computed per query and never stored. Rows of the same
//! normalized device are merged, so regional variants of one model rank as
//! a single device.

use devrank_types::models::QueryConfig;
use devrank_types::{BestDeviceEntry, Category, DeviceInsight, DeviceScoreRecord};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::modules::repository::LeaderboardStore;

pub struct BestDevicesAggregator {
    store: Arc<dyn LeaderboardStore>,
    config: QueryConfig,
}

impl BestDevicesAggregator {
    pub fn new(store: Arc<dyn LeaderboardStore>, config: QueryConfig) -> Self {
        Self { store, config }
    }

    pub fn default_top_n(&self) -> usize {
        self.config.top_n
    }

    /// Top `top_n` devices for one category. Store failures yield an empty list.
    pub async fn best_devices(&self, category: Category, top_n: usize) -> Vec<BestDeviceEntry> {
        match self.store.fetch_category(category, self.config.fetch_limit).await {
            Ok(records) => {
                let ranked = rank_records(category, &records, top_n);
                tracing::debug!(
                    "[Aggregator] {}: {} rows -> {} ranked devices",
                    category,
                    records.len(),
                    ranked.len()
                );
                ranked
            },
            Err(e) => {
                tracing::warn!("[Aggregator] Failed to fetch {} rows: {}", category, e);
                Vec::new()
            },
        }
    }

    pub async fn best_devices_all_categories(
        &self,
        top_n: usize,
    ) -> BTreeMap<Category, Vec<BestDeviceEntry>> {
        let lists = futures::future::join_all(
            Category::ALL.iter().map(|category| self.best_devices(*category, top_n)),
        )
        .await;
        Category::ALL.iter().copied().zip(lists).collect()
    }

    /// Cross-category summary of one device; `None` when it has no entries.
    pub async fn device_insight(&self, normalized_device_id: &str) -> Option<DeviceInsight> {
        let entries = match self
            .store
            .fetch_device_entries(normalized_device_id, self.config.fetch_limit)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("[Aggregator] Failed to fetch entries of {}: {}", normalized_device_id, e);
                return None;
            },
        };
        let first = entries.first()?;

        let mut sums: BTreeMap<Category, (f64, u32)> = BTreeMap::new();
        for entry in &entries {
            for (category, score) in &entry.scores {
                let slot = sums.entry(*category).or_insert((0.0, 0));
                slot.0 += score;
                slot.1 += 1;
            }
        }
        let category_averages: BTreeMap<Category, f64> =
            sums.into_iter().map(|(c, (sum, n))| (c, sum / f64::from(n))).collect();

        let by_score = |a: &(&Category, &f64), b: &(&Category, &f64)| a.1.total_cmp(b.1);
        let strongest = category_averages.iter().max_by(by_score).map(|(c, _)| *c);
        let weakest = category_averages.iter().min_by(by_score).map(|(c, _)| *c);
        let overall_score = if category_averages.is_empty() {
            0.0
        } else {
            category_averages.values().sum::<f64>() / category_averages.len() as f64
        };

        Some(DeviceInsight {
            normalized_device_id: normalized_device_id.to_string(),
            display_name: first.display_name.clone(),
            entry_count: entries.len(),
            category_averages,
            strongest,
            weakest,
            overall_score,
        })
    }
}

struct DeviceGroup<'a> {
    first: &'a DeviceScoreRecord,
    score_sum: f64,
    rows: u32,
    user_count: u32,
    top_score: f64,
    quality_sum: u32,
}

/// Group rows by device, average them, and rank the top `top_n`.
///
/// Ordering: average score descending, then user count descending, then
/// device id ascending.
pub fn rank_records(
    category: Category,
    records: &[DeviceScoreRecord],
    top_n: usize,
) -> Vec<BestDeviceEntry> {
    let mut groups: HashMap<&str, DeviceGroup<'_>> = HashMap::new();
    for record in records.iter().filter(|r| r.score.is_finite()) {
        let group = groups.entry(record.normalized_device_id.as_str()).or_insert(DeviceGroup {
            first: record,
            score_sum: 0.0,
            rows: 0,
            user_count: 0,
            top_score: f64::MIN,
            quality_sum: 0,
        });
        group.score_sum += record.score;
        group.rows += 1;
        group.user_count = group.user_count.saturating_add(record.user_count);
        group.top_score = group.top_score.max(record.top_score).max(record.score);
        group.quality_sum += u32::from(record.data_quality);
    }

    let mut ranked: Vec<BestDeviceEntry> = groups
        .into_iter()
        .map(|(id, g)| BestDeviceEntry {
            rank: 0,
            normalized_device_id: id.to_string(),
            display_name: g.first.display_name.clone(),
            brand: g.first.brand.clone(),
            model: g.first.model.clone(),
            category,
            avg_score: g.score_sum / f64::from(g.rows),
            user_count: g.user_count,
            top_score: g.top_score,
            avg_data_quality: (g.quality_sum / g.rows) as u8,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.avg_score
            .total_cmp(&a.avg_score)
            .then_with(|| b.user_count.cmp(&a.user_count))
            .then_with(|| a.normalized_device_id.cmp(&b.normalized_device_id))
    });
    ranked.truncate(top_n);
    for (i, entry) in ranked.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    ranked
}
