//! Layer-barrier worker pool: each layer is dispatched to a bounded set
//! of workers and must fully drain before the next layer starts.

use crate::error::InstallError;
use crate::types::{CmdResult, InstallRequest};
use pkgr_core::AHashMap;
use pkgr_resolver::InstallLayers;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Resolve the worker count: `threads` if given and `> 0`, capped at
/// `cpus - 1` when the host reports more than 2 logical processors;
/// with no `threads` given, `cpus - 1` under that same condition, else
/// `cpus`.
#[must_use]
pub fn resolve_worker_count(threads: i64, cpus: usize) -> usize {
    if threads > 0 {
        return if cpus > 2 { threads.min(cpus as i64 - 1).max(1) as usize } else { threads as usize };
    }
    if cpus > 2 {
        cpus - 1
    } else {
        cpus.max(1)
    }
}

/// Run every layer in `layers` in order, barrier-synchronized between
/// layers; a failure anywhere in a layer lets the rest of that layer
/// finish, then halts before the next layer and returns a composite
/// error naming every package that failed.
pub async fn run(
    layers: &InstallLayers,
    requests: &AHashMap<String, InstallRequest>,
    workers: usize,
) -> Result<AHashMap<String, CmdResult>, InstallError> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut results = AHashMap::new();

    for layer in layers.iter() {
        info!(layer_size = layer.len(), "starting install layer");

        let outcomes = futures::future::join_all(layer.iter().map(|name| {
            let semaphore = Arc::clone(&semaphore);
            let request = requests.get(name).cloned();
            let name = name.clone();
            async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
                let Some(request) = request else {
                    warn!(%name, "no install request for package in layer, skipping");
                    return (name, None);
                };
                let outcome = invoke(&request).await;
                (name, Some(outcome))
            }
        }))
        .await;

        let mut failed = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                None => {}
                Some(Ok(result)) => {
                    if !result.success {
                        failed.push(name.clone());
                    }
                    results.insert(name, result);
                }
                Some(Err(err)) => {
                    error!(%name, error = %err, "installer failed to spawn");
                    failed.push(name);
                }
            }
        }

        if !failed.is_empty() {
            failed.sort_unstable();
            let failed_count = failed.len();
            return Err(InstallError::Composite { failed: failed_count, total: layer.len(), names: failed });
        }
    }

    Ok(results)
}

async fn invoke(request: &InstallRequest) -> Result<CmdResult, InstallError> {
    let mut flags = request.args.to_flags();
    flags.push(request.artifact_path.to_string_lossy().into_owned());

    let output = Command::new(&request.executable)
        .arg("CMD")
        .arg("INSTALL")
        .args(&flags)
        .envs(&request.env)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| InstallError::Spawn { name: request.name.clone(), source })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let exit_code = output.status.code().unwrap_or(-1);
    let success = output.status.success();

    if !success {
        warn!(name = %request.name, exit_code, "installer exited with failure");
    }

    Ok(CmdResult { stdout, stderr, exit_code, success })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_configured_threads_when_positive() {
        assert_eq!(resolve_worker_count(4, 16), 4);
    }

    #[test]
    fn explicit_threads_are_capped_at_cpus_minus_one() {
        assert_eq!(resolve_worker_count(16, 4), 3);
    }

    #[test]
    fn explicit_threads_are_not_capped_at_or_below_two_cores() {
        assert_eq!(resolve_worker_count(16, 2), 16);
    }

    #[test]
    fn defaults_to_cpus_minus_one_above_two_cores() {
        assert_eq!(resolve_worker_count(0, 8), 7);
    }

    #[test]
    fn defaults_to_cpus_at_or_below_two_cores() {
        assert_eq!(resolve_worker_count(0, 2), 2);
        assert_eq!(resolve_worker_count(0, 1), 1);
    }

    #[tokio::test]
    async fn empty_layers_produce_no_results() {
        let layers = InstallLayers::default();
        let requests = AHashMap::new();
        let results = run(&layers, &requests, 4).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn missing_request_for_a_layer_entry_is_skipped_not_fatal() {
        let layers = InstallLayers(vec![vec!["ghost".to_string()]]);
        let requests = AHashMap::new();
        let results = run(&layers, &requests, 4).await.unwrap();
        assert!(results.is_empty());
    }
}
