use crate::{
    ChannelExchanger, Config, GlobalReducer, Partition, Ring, RunReport, Worker, RUNTIME_THREADS,
};
use anyhow::{anyhow, Context, Result};
use log::info;
use std::{
    sync::{atomic::Ordering, Arc},
    time::Instant,
};
use tokio::sync::Barrier;

/// Runs the simulation with one tokio task per worker.
///
/// The tasks share no grid data: boundary rows travel between ring
/// neighbors as messages and local populations travel to the coordinator.
/// Timing starts once every worker has seeded its strip.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the runtime cannot be
/// started, a strip cannot be allocated, or any worker fails.
pub fn run_cluster(config: &Config) -> Result<RunReport> {
    let partition = config.validate()?;
    let threads = RUNTIME_THREADS.load(Ordering::Relaxed);
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if threads > 0 {
        builder.worker_threads(threads as usize);
    }
    let runtime = builder
        .build()
        .context("Failed to bootstrap the worker runtime")?;
    info!(
        "running {} generations of a {}x{} torus on {} workers",
        config.generations,
        config.height,
        config.width,
        partition.workers()
    );
    runtime.block_on(run_workers(config, partition))
}

async fn run_workers(config: &Config, partition: Partition) -> Result<RunReport> {
    let workers = partition.workers();
    let mut ring = Vec::with_capacity(workers);
    for (rank, (exchanger, reducer)) in ChannelExchanger::ring(workers)
        .into_iter()
        .zip(GlobalReducer::group(workers))
        .enumerate()
    {
        ring.push(Worker::new(
            Ring::new(rank, workers),
            &partition,
            config,
            exchanger,
            reducer,
        )?);
    }

    let start = Arc::new(Barrier::new(workers));
    let handles: Vec<_> = ring
        .into_iter()
        .map(|mut worker| {
            let start = Arc::clone(&start);
            tokio::spawn(async move {
                start.wait().await;
                let timer = Instant::now();
                let counts = worker.run().await?;
                Ok::<_, anyhow::Error>(counts.map(|counts| RunReport {
                    counts,
                    elapsed: timer.elapsed(),
                }))
            })
        })
        .collect();

    let mut report = None;
    let mut first_error = None;
    for (rank, handle) in handles.into_iter().enumerate() {
        let result = handle
            .await
            .with_context(|| format!("Worker {} panicked", rank))
            .and_then(|result| result.with_context(|| format!("Worker {} failed", rank)));
        match result {
            Ok(Some(coordinator_report)) => report = Some(coordinator_report),
            Ok(None) => (),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }
    let report = report.ok_or_else(|| anyhow!("The coordinator returned no report"))?;
    info!(
        "finished in {:.3} secs, final population {:?}",
        report.elapsed.as_secs_f64(),
        report.final_population()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pattern;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_blinker_on_many_workers() {
        let config = Config::default()
            .with_size(12)
            .with_workers(4)
            .with_generations(6)
            .with_pattern(Pattern::blinker().translated(2, 5));
        let report = run_cluster(&config).unwrap();
        assert_eq!(report.counts, vec![3; 6]);
    }

    #[test]
    #[serial]
    fn test_limited_runtime_threads() {
        // more workers than runtime threads must not deadlock
        RUNTIME_THREADS.store(1, Ordering::Relaxed);
        let config = Config::default()
            .with_size(16)
            .with_workers(8)
            .with_generations(20)
            .with_pattern(Pattern::glider());
        let report = run_cluster(&config);
        RUNTIME_THREADS.store(0, Ordering::Relaxed);
        assert_eq!(report.unwrap().counts, vec![5; 20]);
    }

    #[test]
    #[serial]
    fn test_invalid_config_is_rejected() {
        let config = Config::default().with_size(4).with_workers(5);
        assert!(run_cluster(&config).is_err());
    }
}
