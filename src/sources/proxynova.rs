//! proxynova.com: the host hides in an `<abbr title>`, the port is plain text

use scraper::Html;
use tracing::{debug, warn};

use crate::error::ScrapeError;
use crate::html;
use crate::proxy::ProxyAddr;

pub const URL: &str = "https://www.proxynova.com/proxy-server-list/elite-proxies/";

pub fn extract(document: &Html) -> Result<Vec<ProxyAddr>, ScrapeError> {
    let tr = html::selector("tr")?;
    let td = html::selector("td")?;
    let abbr = html::selector("abbr")?;
    let mut proxies = Vec::new();

    // first row is the header
    for row in document.select(&tr).skip(1) {
        let cols = html::cells(row, &td);
        let (Some(host_cell), Some(port_cell)) = (cols.first(), cols.get(1)) else {
            warn!("proxynova: skipping row with {} columns, expected at least 2", cols.len());
            continue;
        };
        let Some(host) = host_cell
            .select(&abbr)
            .next()
            .and_then(|el| el.value().attr("title"))
        else {
            debug!("proxynova: skipping row without an address");
            continue;
        };

        match ProxyAddr::from_text(host, &html::text(*port_cell)) {
            Ok(proxy) => proxies.push(proxy),
            Err(e) => debug!("proxynova: dropping row: {}", e),
        }
    }

    Ok(proxies)
}
