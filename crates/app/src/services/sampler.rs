use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};
use upkeep_core::{Latencies, LogCounts, MetricsSample, PopulationCounts, format_db_timestamp};
use upkeep_db::Db;

use crate::config::Environment;
use crate::error::Result;
use crate::probes::{LatencyProbe, ProcessStats, elapsed_millis};
use crate::services::SharedConfig;
use crate::util::time::{RunClock, retention_cutoff};

/// Measurement sources the sampler reads besides the database.
pub struct Probes<'a> {
    pub processes: &'a dyn ProcessStats,
    pub latency: &'a dyn LatencyProbe,
}

/// The row written by one sampler run and how it was assembled.
#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    pub sample: MetricsSample,
    pub degraded: bool,
    pub carried_forward: bool,
    pub pruned: usize,
}

#[derive(Clone)]
pub struct SamplerService {
    config: SharedConfig,
}

impl SamplerService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Writes exactly one graph row. Measurements that fail degrade to zero;
    /// only a failed graph insert is returned as an error.
    pub fn run(&self, db: &mut Db, probes: &Probes<'_>, clock: RunClock) -> Result<SampleReport> {
        let settings = &self.config.sampler;
        let pattern = settings.process_regex()?;

        let cpu = probes.processes.cpu_percent(&pattern).unwrap_or_else(|err| {
            warn!(error = %err, "cpu measurement unavailable");
            0.0
        });

        let degraded = match db.shard_summary() {
            Ok(summary) => {
                let degraded = summary.is_degraded(settings.shard_count);
                if degraded {
                    warn!(
                        expected = settings.shard_count,
                        online = summary.online,
                        connected = summary.connected,
                        "shards degraded"
                    );
                }
                degraded
            }
            Err(err) => {
                warn!(error = %err, "shard status unavailable");
                false
            }
        };
        let (counts, carried_forward) = self.population_counts(db, degraded);

        let latencies = match settings.environment {
            Environment::Local => Latencies::default(),
            Environment::Live => measure_latencies(db, probes.latency),
        };

        let window = logscan::ScanWindow::ending_at(clock.local, settings.log_window_minutes);
        let log = logscan::scan_log_files(&settings.log_files, &window);

        let question_count = db.question_bank_size().unwrap_or_else(|err| {
            warn!(error = %err, "question bank size unavailable");
            0
        });

        let sample = MetricsSample {
            entry_date: format_db_timestamp(clock.utc),
            cpu,
            counts,
            latencies,
            log,
            questions_asked: 0,
            question_count,
        };
        let sample = db.record_graph_sample(sample)?;

        let cutoff = retention_cutoff(clock.utc, settings.retention_hours);
        let pruned = db.prune_graph_samples(cutoff).unwrap_or_else(|err| {
            warn!(error = %err, "graph retention prune failed");
            0
        });

        log_sample(&sample, degraded, carried_forward, pruned);
        Ok(SampleReport {
            sample,
            degraded,
            carried_forward,
            pruned,
        })
    }

    /// Fresh aggregate, or the previous row's counts while shards are degraded
    /// so a reconnect storm does not show up as a population drop.
    fn population_counts(&self, db: &Db, degraded: bool) -> (PopulationCounts, bool) {
        if degraded {
            match db.latest_graph_sample() {
                Ok(Some(previous)) => return (previous.counts, true),
                Ok(None) => info!("no previous sample to carry forward"),
                Err(err) => warn!(error = %err, "previous sample unavailable"),
            }
        }
        let counts = db.aggregate_counts().unwrap_or_else(|err| {
            warn!(error = %err, "population counts unavailable");
            PopulationCounts::default()
        });
        (counts, false)
    }
}

fn measure_latencies(db: &Db, probe: &dyn LatencyProbe) -> Latencies {
    let discord_ping = probe.platform_ping().unwrap_or_else(|err| {
        warn!(error = %err, "platform api ping failed");
        0
    });
    let trivia_api_ping = match probe.internal_ping() {
        Ok(value) => value.unwrap_or(0),
        Err(err) => {
            warn!(error = %err, "internal api ping failed");
            0
        }
    };
    let started = Instant::now();
    let db_ping = match db.ping() {
        Ok(()) => elapsed_millis(started),
        Err(err) => {
            warn!(error = %err, "database ping failed");
            0
        }
    };
    Latencies {
        discord_ping,
        trivia_api_ping,
        db_ping,
    }
}

fn log_sample(sample: &MetricsSample, degraded: bool, carried_forward: bool, pruned: usize) {
    let LogCounts { kicks, commands } = sample.log;
    info!(
        entry_date = %sample.entry_date,
        cpu = sample.cpu,
        users = sample.counts.user_count,
        servers = sample.counts.server_count,
        channels = sample.counts.channel_count,
        memory = sample.counts.memory_usage,
        games = sample.counts.games,
        discord_ping = sample.latencies.discord_ping,
        trivia_api_ping = sample.latencies.trivia_api_ping,
        db_ping = sample.latencies.db_ping,
        kicks,
        commands,
        questions_asked = sample.questions_asked,
        question_count = sample.question_count,
        degraded,
        carried_forward,
        pruned,
        "graph sample written"
    );
}
