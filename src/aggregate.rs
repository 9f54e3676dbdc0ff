//! Run every source, merge, deduplicate, render

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::ScrapeError;
use crate::fetch::Fetch;
use crate::proxy::ProxyAddr;
use crate::sources::Source;

/// Run `sources` with at most `concurrency` in flight and merge the results.
///
/// A failing source is logged and contributes nothing; it never stops the
/// others.
pub async fn run<F: Fetch>(sources: &[Source], fetcher: &F, concurrency: usize) -> BTreeSet<ProxyAddr> {
    let outcomes: Vec<(Source, Result<Vec<ProxyAddr>, ScrapeError>)> = stream::iter(sources.iter().copied())
        .map(|source| async move { (source, source.collect(fetcher).await) })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    merge(outcomes.into_iter().map(|(source, result)| (source.name(), result)))
}

/// Fold per-source outcomes into one set deduplicated by `(host, port)`
pub fn merge<'a, I>(outcomes: I) -> BTreeSet<ProxyAddr>
where
    I: IntoIterator<Item = (&'a str, Result<Vec<ProxyAddr>, ScrapeError>)>,
{
    let mut proxies = BTreeSet::new();

    for (name, result) in outcomes {
        match result {
            Ok(found) => {
                info!("{} yielded {} proxies", name, found.len());
                proxies.extend(found);
            }
            Err(e) => warn!("{} failed: {}", name, e),
        }
    }

    proxies
}

/// One `socks5://host:port` per line, no trailing newline
pub fn serialize(proxies: &BTreeSet<ProxyAddr>) -> String {
    proxies
        .iter()
        .map(ProxyAddr::to_uri)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Overwrite `path` with the serialized set
pub fn write_output(path: &Path, proxies: &BTreeSet<ProxyAddr>) -> io::Result<()> {
    fs::write(path, serialize(proxies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticPages;
    use crate::sources::{proxynova, socks_proxy_net};

    fn addr(host: &str, port: u64) -> ProxyAddr {
        ProxyAddr::new(host, port).unwrap()
    }

    fn socks_proxy_net_page(rows: &[&str]) -> String {
        format!(
            r#"<html><body><table id="proxylisttable"><tbody>{}</tbody></table></body></html>"#,
            rows.concat()
        )
    }

    fn full_row(host: &str, port: &str) -> String {
        format!(
            "<tr><td>{}</td><td>{}</td><td>DE</td><td>Germany</td><td>Socks5</td><td>Anonymous</td><td>Yes</td><td>5 secs ago</td></tr>",
            host, port
        )
    }

    #[test]
    fn test_merge_deduplicates() {
        let proxies = merge(vec![
            ("a", Ok(vec![addr("1.2.3.4", 1080)])),
            ("b", Ok(vec![addr("1.2.3.4", 1080)])),
        ]);
        assert_eq!(proxies.len(), 1);
        assert!(proxies.contains(&addr("1.2.3.4", 1080)));
    }

    #[test]
    fn test_merge_isolates_failures() {
        let proxies = merge(vec![
            ("down", Err(ScrapeError::page_shape("gone"))),
            ("up", Ok(vec![addr("5.6.7.8", 4145), addr("1.2.3.4", 1080)])),
        ]);
        assert_eq!(serialize(&proxies), "socks5://1.2.3.4:1080\nsocks5://5.6.7.8:4145");
    }

    #[test]
    fn test_serialize_empty() {
        assert_eq!(serialize(&BTreeSet::new()), "");
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let good_a = full_row("1.2.3.4", "1080");
        let good_b = full_row("5.6.7.8", "4145");
        let good_c = full_row("proxy.example.net", "9050");
        let page = socks_proxy_net_page(&[
            good_a.as_str(),
            "<tr><td>9.9.9.9</td><td>1080</td></tr>",
            good_b.as_str(),
            good_c.as_str(),
        ]);
        // proxynova repeats one address and the other sources are unreachable
        let nova = r#"<table><tr><th>ip</th></tr>
            <tr><td><abbr title="1.2.3.4"></abbr></td><td>1080</td></tr></table>"#;
        let pages = StaticPages::new()
            .with(socks_proxy_net::URL, &page)
            .with(proxynova::URL, nova);

        let proxies = run(&Source::ALL, &pages, 2).await;
        let text = serialize(&proxies);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        for line in &lines {
            let parsed: ProxyAddr = line.parse().unwrap();
            assert_eq!(parsed.to_uri(), *line);
        }
        assert!(lines.contains(&"socks5://proxy.example.net:9050"));
    }

    #[test]
    fn test_write_output_overwrites() {
        let path = std::env::temp_dir().join(format!("proxy_harvest_{}.txt", std::process::id()));
        fs::write(&path, "stale\nstale\nstale\nstale").unwrap();

        let proxies: BTreeSet<_> = [addr("1.2.3.4", 1080)].into_iter().collect();
        write_output(&path, &proxies).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "socks5://1.2.3.4:1080");

        fs::remove_file(&path).unwrap();
    }
}
