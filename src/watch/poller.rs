//! Interval fallback for change detection.
//!
//! A tick first compares the repository listing against the index. When the
//! two agree it samples a bounded, evenly strided slice of the files (newest
//! first) and checks metadata, then a prefix hash of source and mirror copy.
//! The stride offset advances every tick, so files skipped on one tick are
//! covered on a later one while the per-tick cost stays fixed.
use super::fingerprint::partial_digest;
use crate::{modified_millis, pipeline::SyncContext};
use log::debug;
use serde::Serialize;
use std::sync::atomic::Ordering;
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollReport {
    pub changes_detected: bool,
    pub repository_files: usize,
    pub mirrored_files: usize,
    pub sampled: usize,
    /// Sampled files whose metadata or content no longer matches the mirror.
    pub flagged: Vec<String>,
}
struct SourceStat {
    filename: String,
    size: u64,
    modified_ms: u64,
}
/// At most `take` indices spread evenly across `len`, shifted by `round`.
/// Consecutive rounds walk every offset within the stride, so each index
/// is visited once every `len.div_ceil(take)` rounds.
pub fn sample_indices(len: usize, take: usize, round: usize) -> Vec<usize> {
    if len == 0 || take == 0 {
        return Vec::new();
    }
    let stride = len.div_ceil(take);
    (round % stride..len).step_by(stride).take(take).collect()
}
impl SyncContext {
    pub async fn poll_tick(&self) -> PollReport {
        let names = match self.list_repository().await {
            Ok(names) => names,
            Err(e) => {
                debug!("poll skipped: {}", e);
                return PollReport::default();
            }
        };
        let mut report = PollReport {
            repository_files: names.len(),
            mirrored_files: self.index().len(),
            ..PollReport::default()
        };
        if report.repository_files != report.mirrored_files {
            self.log
                .info(
                    &format!(
                        "Repository has {} file(s), mirror has {}; changes detected",
                        report.repository_files, report.mirrored_files
                    ),
                );
            report.changes_detected = true;
            return report;
        }
        let unknown = {
            let index = self.index();
            names.iter().any(|name| !index.has(name))
        };
        if unknown {
            self.log.info("Repository contains files missing from the mirror");
            report.changes_detected = true;
            return report;
        }
        let mut stats = self.stat_sources(&names).await;
        stats.sort_by(|a, b| b.modified_ms.cmp(&a.modified_ms));
        let round = self.poll_round.fetch_add(1, Ordering::Relaxed);
        let sample = sample_indices(stats.len(), self.settings.poll_sample_size, round);
        report.sampled = sample.len();
        for (n, i) in sample.into_iter().enumerate() {
            if n > 0 && n % self.settings.discovery_batch_size.max(1) == 0 {
                tokio::task::yield_now().await;
            }
            let stat = &stats[i];
            if self.sample_differs(stat).await {
                self.force.insert(&stat.filename);
                report.flagged.push(stat.filename.clone());
            }
        }
        if !report.flagged.is_empty() {
            self.log
                .info(
                    &format!(
                        "Poll detected {} changed file(s): {}",
                        report.flagged.len(), report.flagged.join(", ")
                    ),
                );
            report.changes_detected = true;
        }
        report
    }
    async fn stat_sources(&self, names: &[String]) -> Vec<SourceStat> {
        let mut stats = Vec::with_capacity(names.len());
        for batch in names.chunks(self.settings.discovery_batch_size.max(1)) {
            for filename in batch {
                if let Ok(meta) = tokio::fs::metadata(self.repository.join(filename)).await {
                    stats
                        .push(SourceStat {
                            filename: filename.clone(),
                            size: meta.len(),
                            modified_ms: modified_millis(&meta),
                        });
                }
            }
            tokio::task::yield_now().await;
        }
        stats
    }
    async fn sample_differs(&self, stat: &SourceStat) -> bool {
        let entry = match self.index().get(&stat.filename) {
            Some(entry) => entry.clone(),
            None => return true,
        };
        if entry.size != stat.size || entry.modified_ms != stat.modified_ms {
            return true;
        }
        let limit = self.settings.hash_prefix_bytes;
        let source = partial_digest(&self.repository.join(&stat.filename), limit).await;
        let mirrored = partial_digest(&self.mirror.join(&entry.filename), limit).await;
        match (source, mirrored) {
            (Ok(a), Ok(b)) => a != b,
            (Err(e), _) | (_, Err(e)) => {
                self.log
                    .warning(
                        &format!("Could not hash {}: {}; assuming unchanged", stat.filename, e),
                    );
                false
            }
        }
    }
}
