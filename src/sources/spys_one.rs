//! spys.one: ports are obfuscated behind page script
//!
//! The page's first `text/javascript` block assigns a run of variables
//! (`k7=3;m2=9^k7;...`). Every row's host cell then carries a
//! `document.write("<markup>"+(m2^k7)+...)` whose rendered terms spell the
//! port. See [`crate::script`] for the evaluator.

use scraper::Html;
use tracing::{debug, warn};

use crate::error::ScrapeError;
use crate::html;
use crate::proxy::ProxyAddr;
use crate::script::{self, SymbolTable};

pub const URL: &str = "http://spys.one/en/socks-proxy-list/";

const COLUMNS: usize = 10;

pub fn extract(document: &Html) -> Result<Vec<ProxyAddr>, ScrapeError> {
    let setup = html::first(document, &html::selector(r#"script[type="text/javascript"]"#)?)
        .ok_or_else(|| ScrapeError::page_shape("no text/javascript setup script"))?;
    let symbols = SymbolTable::from_setup(&setup.text().collect::<String>());
    debug!("spys.one: setup script defined {} variables", symbols.len());

    let rows = html::selector(".spy1x, .spy1xx")?;
    let td = html::selector("td")?;
    let script_tag = html::selector("script")?;
    let mut proxies = Vec::new();

    for row in document.select(&rows) {
        let cols = html::cells(row, &td);
        if cols.len() != COLUMNS {
            warn!(
                "spys.one: skipping row with {} columns, expected {}",
                cols.len(),
                COLUMNS
            );
            continue;
        }

        let kind = html::text(cols[1]);
        if !kind.eq_ignore_ascii_case("socks5") {
            debug!("spys.one: skipping {} row", kind);
            continue;
        }

        let Some(port_script) = cols[0].select(&script_tag).next() else {
            warn!("spys.one: skipping row without a port script");
            continue;
        };
        let port = match script::port_from_write_call(
            &port_script.text().collect::<String>(),
            &symbols,
        ) {
            Ok(port) => port,
            Err(e) => {
                warn!("spys.one: skipping row: {}", e);
                continue;
            }
        };

        match ProxyAddr::new(&html::text_without_scripts(cols[0]), port) {
            Ok(proxy) => proxies.push(proxy),
            Err(e) => debug!("spys.one: dropping row: {}", e),
        }
    }

    Ok(proxies)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(class: &str, host: &str, port_expr: &str, kind: &str) -> String {
        let mut cells = format!(
            r#"<td><font class="spy14">{}<script type="text/javascript">document.write("<font class=spy2>:<\/font>"+{})</script></font></td><td>{}</td>"#,
            host, port_expr, kind
        );
        for _ in 0..8 {
            cells.push_str("<td>-</td>");
        }
        format!(r#"<tr class="{}">{}</tr>"#, class, cells)
    }

    fn page(rows: &[String]) -> String {
        format!(
            r#"<html><head></head><body>
            <script type="text/javascript">k7=3;m2=9^k7;r4=0;z1=1^r4;w0=8;bad=(;</script>
            <table>{}</table>
            </body></html>"#,
            rows.join("\n")
        )
    }

    #[test]
    fn test_extracts_obfuscated_ports() {
        let html = page(&[
            row("spy1x", "1.2.3.4", "(z1^r4)+(r4^r4)+(w0^r4)+(r4^r4)", "SOCKS5"),
            row("spy1xx", "5.6.7.8", "(m2^k7)+(z1^r4)+(r4^r4)+(k7^r4)", "socks5"),
        ]);

        let proxies = extract(&Html::parse_document(&html)).unwrap();
        let uris: Vec<String> = proxies.iter().map(ProxyAddr::to_uri).collect();
        assert_eq!(uris, vec!["socks5://1.2.3.4:1080", "socks5://5.6.7.8:9103"]);
    }

    #[test]
    fn test_bad_rows_do_not_block_good_ones() {
        let html = page(&[
            // missing a term after the last +
            row("spy1x", "1.1.1.1", "(z1^r4)+", "SOCKS5"),
            // undefined variable
            row("spy1x", "2.2.2.2", "(nope^r4)", "SOCKS5"),
            // not a socks5 proxy
            row("spy1xx", "3.3.3.3", "(w0^r4)+(w0^r4)", "HTTP"),
            // wrong column count
            r#"<tr class="spy1x"><td>4.4.4.4</td><td>SOCKS5</td></tr>"#.to_string(),
            row("spy1xx", "5.5.5.5", "(w0^r4)+(w0^r4)", "SOCKS5"),
        ]);

        let proxies = extract(&Html::parse_document(&html)).unwrap();
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0].to_uri(), "socks5://5.5.5.5:88");
    }

    #[test]
    fn test_missing_setup_script() {
        let document = Html::parse_document("<html><body><table></table></body></html>");
        assert!(matches!(
            extract(&document),
            Err(ScrapeError::UnexpectedPageShape(_))
        ));
    }
}
