//! Liveness check: which proxies can actually complete a request

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::{Client, Proxy};
use tracing::{debug, warn};

/// Probe parameters shared by every worker
#[derive(Debug, Clone)]
pub struct Probe {
    pub url: String,
    pub timeout: Duration,
}

impl Probe {
    /// GET the probe URL through `proxy`.
    ///
    /// Any completed HTTP exchange counts as alive, whatever the status.
    pub async fn run(&self, proxy: Proxy) -> Result<(), reqwest::Error> {
        let client = Client::builder()
            .proxy(proxy)
            .timeout(self.timeout)
            .build()?;
        client.get(&self.url).send().await?;
        Ok(())
    }
}

/// Non-empty trimmed lines of `input`
pub fn proxy_lines(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Probe every proxy with at most `workers` in flight, calling `on_alive`
/// for each one that works as soon as it does.
///
/// Lines that are not a usable proxy URI are logged and skipped unprobed.
/// Returns how many were alive.
pub async fn check_all<F>(proxies: Vec<String>, probe: &Probe, workers: usize, mut on_alive: F) -> usize
where
    F: FnMut(&str),
{
    let candidates = proxies
        .into_iter()
        .filter_map(|line| match Proxy::all(line.as_str()) {
            Ok(proxy) => Some((line, proxy)),
            Err(e) => {
                warn!("skipping unparseable proxy {:?}: {}", line, e);
                None
            }
        });

    let mut results = stream::iter(candidates)
        .map(|(line, proxy)| async move {
            let outcome = probe.run(proxy).await;
            (line, outcome)
        })
        .buffer_unordered(workers.max(1));

    let mut alive = 0;
    while let Some((proxy, outcome)) = results.next().await {
        match outcome {
            Ok(()) => {
                alive += 1;
                on_alive(&proxy);
            }
            Err(e) => debug!("{} is dead: {}", proxy, e),
        }
    }
    alive
}
