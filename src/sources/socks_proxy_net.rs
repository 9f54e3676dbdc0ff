//! socks-proxy.net: one plain table, host and port in the first two cells

use scraper::Html;
use tracing::{debug, warn};

use crate::error::ScrapeError;
use crate::html;
use crate::proxy::ProxyAddr;

pub const URL: &str = "https://socks-proxy.net";

const COLUMNS: usize = 8;

pub fn extract(document: &Html) -> Result<Vec<ProxyAddr>, ScrapeError> {
    let table = html::first(document, &html::selector("#proxylisttable")?)
        .ok_or_else(|| ScrapeError::page_shape("no #proxylisttable table"))?;
    let tbody = table
        .select(&html::selector("tbody")?)
        .next()
        .ok_or_else(|| ScrapeError::page_shape("#proxylisttable has no tbody"))?;

    let tr = html::selector("tr")?;
    let td = html::selector("td")?;
    let mut proxies = Vec::new();

    for row in tbody.select(&tr) {
        let cols = html::cells(row, &td);
        if cols.len() != COLUMNS {
            warn!(
                "socks-proxy.net: skipping row with {} columns, expected {}",
                cols.len(),
                COLUMNS
            );
            continue;
        }

        match ProxyAddr::from_text(&html::text(cols[0]), &html::text(cols[1])) {
            Ok(proxy) => proxies.push(proxy),
            Err(e) => debug!("socks-proxy.net: dropping row: {}", e),
        }
    }

    Ok(proxies)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(host: &str, port: &str) -> String {
        format!(
            "<tr><td>{}</td><td>{}</td><td>US</td><td>United States</td>\
             <td>Socks5</td><td>Anonymous</td><td>Yes</td><td>1 minute ago</td></tr>",
            host, port
        )
    }

    #[test]
    fn test_skips_malformed_rows() {
        let html = format!(
            r#"<html><body>
            <table id="proxylisttable">
              <thead><tr><th>IP Address</th><th>Port</th></tr></thead>
              <tbody>
                {}
                <tr><td>9.9.9.9</td><td>1080</td><td>short row</td></tr>
                {}
                {}
                {}
              </tbody>
            </table></body></html>"#,
            row("1.2.3.4", "1080"),
            row(" 5.6.7.8 ", "4145"),
            row("10.0.0.1", "not-a-port"),
            row("proxy.example.org", "9050"),
        );

        let proxies = extract(&Html::parse_document(&html)).unwrap();
        let uris: Vec<String> = proxies.iter().map(ProxyAddr::to_uri).collect();
        assert_eq!(
            uris,
            vec![
                "socks5://1.2.3.4:1080",
                "socks5://5.6.7.8:4145",
                "socks5://proxy.example.org:9050",
            ]
        );
    }

    #[test]
    fn test_missing_table_is_page_shape_error() {
        let document = Html::parse_document("<html><body><p>maintenance</p></body></html>");
        assert!(matches!(
            extract(&document),
            Err(ScrapeError::UnexpectedPageShape(_))
        ));
    }
}
