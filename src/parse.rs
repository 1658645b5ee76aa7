use scraper::{ElementRef, Html, Selector};
use tokio::task::spawn_blocking;

use crate::table::{Row, Table};
use crate::{Error, Result};

/// Parses the page off the async runtime and extracts the first table matching `selector`.
pub(crate) async fn parse_table(html: String, selector: String) -> Result<Table> {
    spawn_blocking(move || extract_table(&html, &selector)).await?
}

/// Parses the page off the async runtime and collects its candidate document links.
pub(crate) async fn parse_links(html: String, markers: Vec<String>) -> Result<Vec<String>> {
    spawn_blocking(move || extract_links(&html, &markers)).await?
}

/// Extracts the first element matching `selector` as a [`Table`].
///
/// The header is the `<th>` cells of the first row without the leading
/// index column. Every row with `<td>` cells becomes a data row; rows made of
/// `<th>` only (the header itself, sub-headers) are left out.
/// Continuation rows are returned as they are, see [`Table::merged`].
pub fn extract_table(html: &str, selector: &str) -> Result<Table> {
    let doc = Html::parse_document(html);

    let table_selector = create_selector(selector)?;
    let row_selector = create_selector("tr")?;
    let th_selector = create_selector("th")?;
    let td_selector = create_selector("td")?;

    let table = doc
        .select(&table_selector)
        .next()
        .ok_or_else(|| Error::TableNotFound(selector.into()))?;

    let mut header = Row::new();
    let mut rows = Vec::new();
    for (i, tr) in table.select(&row_selector).enumerate() {
        if i == 0 {
            header = tr.select(&th_selector).skip(1).map(cell_text).collect();
        }
        let cells: Row = tr.select(&td_selector).map(cell_text).collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    Ok(Table::new(header, rows))
}

/// Returns every `href` containing one of `markers`, in document order.
///
/// This is a plain substring match: an href matching two markers is listed
/// twice, and duplicates across anchors are kept.
pub fn extract_links(html: &str, markers: &[String]) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let anchor_selector = create_selector("a[href]")?;

    let mut links = Vec::new();
    for anchor in doc.select(&anchor_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        for marker in markers.iter().filter(|m| !m.is_empty()) {
            if href.contains(marker.as_str()) {
                links.push(href.to_string());
            }
        }
    }
    Ok(links)
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}

#[inline]
fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPISODES: &str = r#"
        <html><body>
        <table class="infobox"><tr><th>Not</th><th>this</th></tr></table>
        <table class="wikitable plainrowheaders">
          <tr><th>No.</th><th>Title</th><th>Directed by</th></tr>
          <tr><th>1</th><td>eps1.0_hellofriend.mov</td><td> Niels Arden Oplev </td></tr>
          <tr><td colspan="2">Elliot meets Mr. Robot.</td></tr>
          <tr><th>2</th><td>eps1.1_ones-and-zer0es.mpeg</td><td>Sam Esmail</td></tr>
        </table>
        </body></html>
    "#;

    fn markers() -> Vec<String> {
        vec!["pdf".into(), "files".into()]
    }

    #[test]
    fn table_header_drops_index_column() {
        let table = extract_table(EPISODES, ".wikitable").unwrap();
        assert_eq!(table.header, ["Title", "Directed by"]);
    }

    #[test]
    fn table_rows_keep_continuations_unmerged() {
        let table = extract_table(EPISODES, ".wikitable").unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0], ["eps1.0_hellofriend.mov", "Niels Arden Oplev"]);
        assert_eq!(table.rows[1], ["Elliot meets Mr. Robot."]);
    }

    #[test]
    fn missing_table_is_an_error() {
        let err = extract_table("<p>nothing here</p>", ".wikitable").unwrap_err();
        assert!(matches!(err, Error::TableNotFound(_)));
    }

    #[test]
    fn invalid_selector_is_an_error() {
        let err = extract_table(EPISODES, "table[").unwrap_err();
        assert!(matches!(err, Error::ParseMissingSelector(_)));
    }

    #[test]
    fn links_filtered_by_substring_in_order() {
        let html = r#"
            <a href="papers/credit.pdf">Credit</a>
            <a href="/about.html">About</a>
            <a>no href</a>
            <a href="http://example.com/files/draft">Draft</a>
        "#;
        assert_eq!(
            extract_links(html, &markers()).unwrap(),
            ["papers/credit.pdf", "http://example.com/files/draft"]
        );
    }

    #[test]
    fn links_matching_both_markers_are_listed_twice() {
        let html = r#"<a href="/files/paper.pdf">p</a><a href="/files/paper.pdf">again</a>"#;
        assert_eq!(extract_links(html, &markers()).unwrap().len(), 4);
    }

    #[test]
    fn no_qualifying_links() {
        let html = r#"<a href="/cv.html">CV</a>"#;
        assert!(extract_links(html, &markers()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn parse_table_runs_off_runtime() {
        let table = parse_table(EPISODES.into(), ".wikitable".into()).await.unwrap();
        assert_eq!(table.merged().rows.len(), 2);
    }

    #[tokio::test]
    async fn parse_links_runs_off_runtime() {
        let html = r#"<a href="a.pdf">a</a><a href="b.html">b</a>"#;
        let links = parse_links(html.into(), markers()).await.unwrap();
        assert_eq!(links, ["a.pdf"]);
    }
}
