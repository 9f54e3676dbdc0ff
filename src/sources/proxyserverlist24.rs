//! proxyserverlist24: a blog whose posts each carry a `<pre>` proxy dump.
//!
//! The index page is only a list of posts. Posts whose summary or body
//! mention HTTP proxies are skipped; the rest are fetched and their `<pre>`
//! block read line by line as `host:port`.

use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ScrapeError;
use crate::fetch::Fetch;
use crate::html;
use crate::proxy::ProxyAddr;

pub const URL: &str = "http://www.proxyserverlist24.top";

const NON_SOCKS_MARKER: &str = "http prox";

fn mentions_http_proxies(text: &str) -> bool {
    text.to_lowercase().contains(NON_SOCKS_MARKER)
}

/// Links to posts whose summary does not mark them as HTTP proxy lists
pub fn extract_posts(document: &Html, base: &Url) -> Result<Vec<Url>, ScrapeError> {
    let links = html::selector("h3 a")?;
    let post_body = html::selector("div.post-body")?;
    let mut posts = Vec::new();

    for link in document.select(&links) {
        // h3 > a: the post container is the link's grandparent
        let summary = link
            .parent()
            .and_then(|h3| h3.parent())
            .and_then(ElementRef::wrap)
            .and_then(|post| post.select(&post_body).next())
            .map(html::text);
        let Some(summary) = summary else {
            warn!("proxyserverlist24: skipping post link without a post body");
            continue;
        };
        if mentions_http_proxies(&summary) {
            debug!("proxyserverlist24: skipping http proxy post");
            continue;
        }

        match link.value().attr("href").and_then(|href| html::resolve_link(base, href)) {
            Some(url) => posts.push(url),
            None => warn!("proxyserverlist24: skipping post without a usable link"),
        }
    }

    Ok(posts)
}

/// `host:port` lines of a post's first `<pre>` block; invalid lines are dropped
pub fn extract_listing(document: &Html) -> Result<Vec<ProxyAddr>, ScrapeError> {
    let Some(pre) = html::first(document, &html::selector("pre")?) else {
        debug!("proxyserverlist24: post has no <pre> block");
        return Ok(Vec::new());
    };

    Ok(pre
        .text()
        .collect::<String>()
        .lines()
        .filter_map(|line| {
            let (host, port) = line.trim().split_once(':')?;
            ProxyAddr::from_text(host, port).ok()
        })
        .collect())
}

/// Walk the index, then every surviving post in turn.
///
/// A post that fails to fetch is skipped; only the index fetch failing
/// fails the source.
pub async fn collect<F: Fetch>(fetcher: &F, index_url: &str) -> Result<Vec<ProxyAddr>, ScrapeError> {
    let base = Url::parse(index_url).map_err(|source| ScrapeError::InvalidUrl {
        url: index_url.to_string(),
        source,
    })?;

    let index = fetcher.fetch(index_url).await?;
    let posts = extract_posts(&Html::parse_document(&index), &base)?;
    info!("proxyserverlist24: {} candidate posts", posts.len());

    let mut proxies = Vec::new();
    for post in posts {
        let body = match fetcher.fetch(post.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                warn!("proxyserverlist24: skipping post {}: {}", post, e);
                continue;
            }
        };
        if mentions_http_proxies(&body) {
            debug!("proxyserverlist24: {} lists http proxies", post);
            continue;
        }

        let found = extract_listing(&Html::parse_document(&body))?;
        debug!("proxyserverlist24: {} listed {} proxies", post, found.len());
        proxies.extend(found);
    }

    Ok(proxies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticPages;

    const INDEX: &str = r#"<html><body>
        <div class="post">
          <h3 class="post-title"><a href="/2024/01/socks5-list.html">Fresh SOCKS5</a></h3>
          <div class="post-body">Socks5 proxy list updated</div>
        </div>
        <div class="post">
          <h3 class="post-title"><a href="/2024/01/http-list.html">Fresh HTTP</a></h3>
          <div class="post-body">Fast HTTP Proxies for you</div>
        </div>
        <div class="post">
          <h3 class="post-title"><a href="http://www.proxyserverlist24.top/2024/01/mixed.html">Mixed</a></h3>
          <div class="post-body">More socks</div>
        </div>
        <div class="post">
          <h3 class="post-title"><a href="/2024/01/gone.html">Gone</a></h3>
          <div class="post-body">Socks, removed since</div>
        </div>
    </body></html>"#;

    const SOCKS_POST: &str = "<html><body><pre>1.2.3.4:1080\n  5.6.7.8:4145  \nnot a proxy\n9.9.9.9:\n</pre></body></html>";

    // the body, not the summary, gives this one away
    const MIXED_POST: &str =
        "<html><body><p>Elite HTTP Proxy servers</p><pre>7.7.7.7:8080</pre></body></html>";

    #[test]
    fn test_extract_posts_filters_http_summaries() {
        let base = Url::parse(URL).unwrap();
        let posts = extract_posts(&Html::parse_document(INDEX), &base).unwrap();
        let posts: Vec<&str> = posts.iter().map(Url::as_str).collect();
        assert_eq!(
            posts,
            vec![
                "http://www.proxyserverlist24.top/2024/01/socks5-list.html",
                "http://www.proxyserverlist24.top/2024/01/mixed.html",
                "http://www.proxyserverlist24.top/2024/01/gone.html",
            ]
        );
    }

    #[test]
    fn test_extract_listing() {
        let proxies = extract_listing(&Html::parse_document(SOCKS_POST)).unwrap();
        let uris: Vec<String> = proxies.iter().map(ProxyAddr::to_uri).collect();
        assert_eq!(uris, vec!["socks5://1.2.3.4:1080", "socks5://5.6.7.8:4145"]);

        let empty = extract_listing(&Html::parse_document("<p>no listing</p>")).unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_collect_follows_posts() {
        let pages = StaticPages::new()
            .with(URL, INDEX)
            .with("http://www.proxyserverlist24.top/2024/01/socks5-list.html", SOCKS_POST)
            .with("http://www.proxyserverlist24.top/2024/01/mixed.html", MIXED_POST);

        let proxies = collect(&pages, URL).await.unwrap();
        let uris: Vec<String> = proxies.iter().map(ProxyAddr::to_uri).collect();
        assert_eq!(uris, vec!["socks5://1.2.3.4:1080", "socks5://5.6.7.8:4145"]);
    }

    #[tokio::test]
    async fn test_collect_fails_without_index() {
        let pages = StaticPages::new();
        assert!(collect(&pages, URL).await.is_err());
    }
}
