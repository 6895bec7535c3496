//! Extraction of company and peer pages.
//!
//! Every table is converted to a [`Grid`] (header from `thead`, rows from
//! `tbody`) and passed through the [`SectionExtractor`], so scraped sections
//! and uploaded sheets share one code path.

use scorecard_core::{
    CanonicalRecord, CompanyDocument, PeerRecord, PeerSet, Result, ScoreError, SectionKind,
    ShareholdingRow,
};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use crate::{grid::Grid, section::SectionExtractor};

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScoreError::Parse(format!("invalid selector {css}: {e:?}")))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(scope: ElementRef<'_>, css: &Selector) -> String {
    scope.select(css).next().map(text_of).unwrap_or_default()
}

/// Removes whitespace, currency and unit markers from a top-ratio value.
fn clean_ratio_value(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '₹' && *c != '%')
        .collect::<String>()
        .replace("Cr.", "")
}

/// Converts an HTML table into a grid.
///
/// The header is the first `thead` row's cells; body rows are the `td`
/// cells of each `tbody` row.
pub fn table_to_grid(table: ElementRef<'_>) -> Result<Grid> {
    let head_row = selector("thead tr")?;
    let head_cell = selector("th, td")?;
    let body_row = selector("tbody tr")?;
    let body_cell = selector("td")?;

    let header: Vec<String> = table
        .select(&head_row)
        .next()
        .map(|tr| tr.select(&head_cell).map(text_of).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = table
        .select(&body_row)
        .map(|tr| tr.select(&body_cell).map(text_of).collect())
        .collect();

    Ok(Grid::new(rows).with_header(header))
}

/// Reads the top-ratio list into the record's scalar fields and returns how
/// many known ratios were found.
fn read_top_ratios(page: &Html, record: &mut CanonicalRecord) -> Result<usize> {
    let item = selector(r#"li[data-source="default"]"#)?;
    let name = selector("span.name")?;
    let value = selector("span.value")?;

    let mut found = 0;
    for li in page.select(&item) {
        let key = first_text(li, &name);
        let raw = clean_ratio_value(&first_text(li, &value));
        let slot = match key.as_str() {
            "Market Cap" => &mut record.market_cap,
            "Current Price" => &mut record.current_price,
            "High / Low" => &mut record.high_low,
            "Stock P/E" => &mut record.stock_pe,
            "Book Value" => &mut record.book_value,
            "Dividend Yield" => &mut record.dividend_yield,
            "ROCE" => &mut record.roce,
            "ROE" => &mut record.roe,
            "Face Value" => &mut record.face_value,
            _ => {
                trace!(ratio = %key, "Ignoring ratio");
                continue;
            }
        };
        *slot = raw;
        found += 1;
    }
    Ok(found)
}

fn read_list(page: &Html, css: &str) -> Result<Vec<String>> {
    let items = selector(css)?;
    Ok(page.select(&items).map(text_of).filter(|t| !t.is_empty()).collect())
}

/// Key given to the shareholding category column, whose header cell is blank.
const CATEGORY_KEY: &str = "category";

fn read_shareholding(section: ElementRef<'_>, css: &str) -> Result<Vec<ShareholdingRow>> {
    let table = selector(css)?;
    let Some(table) = section.select(&table).next() else {
        return Ok(Vec::new());
    };
    let grid = table_to_grid(table)?;
    let mut header = grid.header().to_vec();
    let Some(first) = header.first_mut() else {
        return Ok(Vec::new());
    };
    CATEGORY_KEY.clone_into(first);
    let grid = grid.with_header(header);

    Ok(SectionExtractor::statement()
        .extract_records(&grid)
        .into_iter()
        .filter_map(|mut values| {
            let category = values.remove(CATEGORY_KEY)?.trim().to_string();
            (!category.is_empty()).then_some(ShareholdingRow { category, values })
        })
        .collect())
}

/// Extracts a company page.
///
/// Missing sections are left empty. The page's `data-warehouse-id`
/// attribute, when present, is returned for the peer fetch.
///
/// # Errors
/// Returns [`ScoreError::Parse`] when the page has neither top ratios nor
/// statement tables, i.e. it is not a company page.
pub fn parse_company_page(html: &str) -> Result<CompanyDocument> {
    let page = Html::parse_document(html);
    let mut record = CanonicalRecord::default();
    let statement = SectionExtractor::statement();

    let ratios = read_top_ratios(&page, &mut record)?;
    let mut tables = 0;
    record.pros = read_list(&page, "div.pros ul li")?;
    record.cons = read_list(&page, "div.cons ul li")?;

    let quarters = selector("section#quarters table.data-table")?;
    let any_table = selector("table.data-table")?;
    if let Some(table) = page
        .select(&quarters)
        .next()
        .or_else(|| page.select(&any_table).next())
    {
        record.quarterly_results = statement.extract_series(&table_to_grid(table)?);
        tables += 1;
    }

    for (kind, css) in [
        (SectionKind::ProfitLoss, "section#profit-loss div[data-result-table] table"),
        (SectionKind::BalanceSheet, "section#balance-sheet div[data-result-table] table"),
        (SectionKind::CashFlows, "section#cash-flow div[data-result-table] table"),
        (SectionKind::Ratios, "section#ratios div[data-result-table] table"),
    ] {
        let table = selector(css)?;
        if let Some(table) = page.select(&table).next() {
            *record.section_mut(kind) = statement.extract_series(&table_to_grid(table)?);
            tables += 1;
        }
    }

    if ratios == 0 && tables == 0 {
        return Err(ScoreError::Parse(
            "no top ratios or statement tables, not a company page".to_string(),
        ));
    }

    let shareholding = selector("section#shareholding")?;
    if let Some(section) = page.select(&shareholding).next() {
        record.shareholding.quarterly = read_shareholding(section, "div#quarterly-shp table")?;
        record.shareholding.yearly = read_shareholding(section, "div#yearly-shp table")?;
    }

    let warehouse = selector("[data-warehouse-id]")?;
    let warehouse_id = page
        .select(&warehouse)
        .find_map(|el| el.value().attr("data-warehouse-id"))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    debug!(
        market_cap = %record.market_cap,
        quarters = record.quarterly_results.len(),
        warehouse_id = ?warehouse_id,
        "Parsed company page"
    );
    Ok(CompanyDocument { record, warehouse_id })
}

fn peer_from_cells(cells: &[String]) -> PeerRecord {
    let at = |i: usize| cells.get(i).cloned().unwrap_or_default();
    PeerRecord {
        current_price: at(2),
        pe: at(3),
        market_cap: at(4),
        div_yield: at(5),
        np_qtr: at(6),
        qtr_profit_var: at(7),
        sales_qtr: at(8),
        qtr_sales_var: at(9),
        roce: at(10),
        ..Default::default()
    }
}

/// Extracts a peers page into a peer set whose last record is the median.
///
/// A page without a footer row gets an empty median appended.
pub fn parse_peers_page(html: &str) -> Result<PeerSet> {
    let page = Html::parse_document(html);
    let peer_row = selector("tr[data-row-company-id]")?;
    let footer_row = selector("tfoot tr")?;
    let cell = selector("td")?;
    let name_link = selector("td.text a")?;

    let peers = page
        .select(&peer_row)
        .map(|tr| {
            let cells: Vec<String> = tr.select(&cell).map(text_of).collect();
            PeerRecord {
                name: first_text(tr, &name_link),
                ..peer_from_cells(&cells)
            }
        })
        .collect::<Vec<_>>();

    let median = page
        .select(&footer_row)
        .last()
        .map(|tr| {
            let cells: Vec<String> = tr.select(&cell).map(text_of).collect();
            PeerRecord {
                company_count: cells.get(1).cloned(),
                ..peer_from_cells(&cells)
            }
        })
        .unwrap_or_default();

    debug!(peers = peers.len(), "Parsed peers page");
    Ok(PeerSet::from_parts(peers, median))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorecard_core::{MarketCapCategory, parse::NBSP};

    const COMPANY_PAGE: &str = r#"
<html><body>
<div id="company-info" data-warehouse-id="6598251"></div>
<ul id="top-ratios">
  <li class="flex flex-space-between" data-source="default">
    <span class="name">Market Cap</span>
    <span class="nowrap value">₹ <span class="number">6,33,542</span> Cr.</span>
  </li>
  <li class="flex flex-space-between" data-source="default">
    <span class="name">Stock P/E</span>
    <span class="nowrap value"><span class="number">24.5</span></span>
  </li>
  <li class="flex flex-space-between" data-source="default">
    <span class="name">Dividend Yield</span>
    <span class="nowrap value"><span class="number">2.71</span> %</span>
  </li>
  <li class="flex flex-space-between" data-source="default">
    <span class="name">ROCE</span>
    <span class="nowrap value"><span class="number">39.9</span> %</span>
  </li>
  <li class="flex flex-space-between" data-source="user">
    <span class="name">Debt</span>
    <span class="nowrap value">0</span>
  </li>
</ul>
<div class="pros"><ul><li>Company is almost debt free.</li><li>Healthy dividend payout</li></ul></div>
<div class="cons"><ul><li>Stock is trading at 7 times its book value</li></ul></div>
<section id="quarters">
  <table class="data-table">
    <thead><tr><th></th><th>Mar 2024</th><th>Jun 2024</th></tr></thead>
    <tbody>
      <tr><td class="text"><button>Sales&nbsp;+</button></td><td>37,923</td><td>39,315</td></tr>
      <tr><td class="text"><button>Net Profit&nbsp;+</button></td><td>7,975</td><td>6,374</td></tr>
      <tr><td class="text">OPM %</td><td>29%</td><td>24%</td></tr>
    </tbody>
  </table>
</section>
<section id="balance-sheet">
  <div data-result-table>
    <table class="data-table">
      <thead><tr><th></th><th>Mar 2023</th><th>Mar 2024</th></tr></thead>
      <tbody>
        <tr><td class="text">Equity Capital</td><td>1,020</td><td>1,020</td></tr>
        <tr><td class="text">Total Assets</td><td>1,20,000</td><td>1,30,000</td></tr>
      </tbody>
    </table>
  </div>
</section>
<section id="shareholding">
  <div id="quarterly-shp">
    <table>
      <thead><tr><th></th><th>Mar 2024</th><th>Jun 2024</th></tr></thead>
      <tbody>
        <tr><td class="text">Promoters +</td><td>72.41%</td><td>71.77%</td></tr>
        <tr><td class="text">FIIs +</td><td>12.68%</td><td>12.35%</td></tr>
      </tbody>
    </table>
  </div>
</section>
</body></html>
"#;

    const PEERS_PAGE: &str = r#"
<table>
  <tbody>
    <tr data-row-company-id="1"><td>1.</td><td class="text"><a href="/company/TCS/">TCS</a></td>
      <td>3850</td><td>29.5</td><td>1393000</td><td>1.45</td><td>12040</td><td>8.7</td><td>62613</td><td>5.4</td><td>64.3</td></tr>
    <tr data-row-company-id="2"><td>2.</td><td class="text"><a href="/company/INFY/">Infosys</a></td>
      <td>1500</td><td>24.5</td><td>633542</td><td>2.71</td><td>6374</td><td>7.1</td><td>39315</td><td>3.6</td><td>39.9</td></tr>
  </tbody>
  <tfoot>
    <tr><td></td><td>Median: 2 Co.</td><td>2675</td><td>27.0</td><td>1013271</td><td>2.08</td><td>9207</td><td>7.9</td><td>50964</td><td>4.5</td><td>52.1</td></tr>
  </tfoot>
</table>
"#;

    #[test]
    fn test_parse_company_page() {
        let doc = parse_company_page(COMPANY_PAGE).unwrap();
        let record = &doc.record;

        assert_eq!(doc.warehouse_id.as_deref(), Some("6598251"));
        assert_eq!(record.market_cap, "6,33,542");
        assert_eq!(record.market_cap_category(), MarketCapCategory::LargeCap);
        assert_eq!(record.stock_pe, "24.5");
        assert_eq!(record.dividend_yield, "2.71");
        assert_eq!(record.roce, "39.9");
        assert_eq!(record.pros.len(), 2);
        assert_eq!(record.cons, ["Stock is trading at 7 times its book value"]);

        let sales = format!("Sales{NBSP}+");
        assert_eq!(record.quarterly_results.get(&sales), ["37,923", "39,315"]);
        assert_eq!(record.quarterly_results.periods(), ["Mar 2024", "Jun 2024"]);
        assert_eq!(record.balance_sheet.get("Total Assets"), ["1,20,000", "1,30,000"]);
        assert!(record.profit_loss.is_empty());

        let quarterly = &record.shareholding.quarterly;
        assert_eq!(quarterly.len(), 2);
        assert_eq!(quarterly[0].category, "Promoters +");
        assert_eq!(quarterly[0].values["Jun 2024"], "71.77%");
        assert_eq!(quarterly[0].values.len(), 2);
        assert!(record.shareholding.yearly.is_empty());
    }

    #[test]
    fn test_shareholding_records() {
        let page = Html::parse_document(
            r#"<section id="shareholding"><div id="yearly-shp"><table>
            <thead><tr><th></th><th>Mar  2023</th><th>Mar 2024</th></tr></thead>
            <tbody>
              <tr><td>Public +</td><td>14.9%</td></tr>
              <tr><td></td><td>1</td><td>2</td></tr>
              <tr><td> DIIs + </td><td>9.1%</td><td>9.8%</td></tr>
            </tbody></table></div></section>"#,
        );
        let section = page.select(&selector("section#shareholding").unwrap()).next().unwrap();
        let rows = read_shareholding(section, "div#yearly-shp table").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Public +");
        assert_eq!(rows[0].values["Mar 2023"], "14.9%");
        assert_eq!(rows[0].values["Mar 2024"], "");
        assert_eq!(rows[1].category, "DIIs +");
        assert!(!rows[1].values.contains_key(CATEGORY_KEY));

        assert!(read_shareholding(section, "div#quarterly-shp table").unwrap().is_empty());
    }

    #[test]
    fn test_parse_peers_page() {
        let peers = parse_peers_page(PEERS_PAGE).unwrap();
        assert_eq!(peers.len(), 3);

        let (rows, median) = peers.split().unwrap();
        assert_eq!(rows[0].name, "TCS");
        assert_eq!(rows[1].pe, "24.5");
        assert_eq!(rows[1].roce, "39.9");
        assert_eq!(median.company_count.as_deref(), Some("Median: 2 Co."));
        assert_eq!(median.market_cap, "1013271");
        assert!(median.name.is_empty());
    }

    #[test]
    fn test_peers_page_without_footer() {
        let peers = parse_peers_page(
            r#"<table><tr data-row-company-id="9"><td>1.</td><td class="text"><a>Solo</a></td></tr></table>"#,
        )
        .unwrap();
        let (rows, median) = peers.split().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(*median, PeerRecord::default());
    }

    #[test]
    fn test_non_company_page_fails() {
        let err = parse_company_page("<html></html>").unwrap_err();
        assert!(matches!(err, ScoreError::Parse(_)));

        let search_page = r#"<html><body><h1>Search results</h1>
            <ul><li data-source="default"><span class="name">Debt</span></li></ul>
            <div data-warehouse-id="1"></div></body></html>"#;
        assert!(matches!(parse_company_page(search_page), Err(ScoreError::Parse(_))));
    }

    #[test]
    fn test_ratios_only_page() {
        let page = r#"<ul><li data-source="default"><span class="name">Market Cap</span>
            <span class="value">₹ 950 Cr.</span></li></ul>"#;
        let doc = parse_company_page(page).unwrap();
        assert!(doc.warehouse_id.is_none());
        assert_eq!(doc.record.market_cap, "950");
        assert!(doc.record.quarterly_results.is_empty());
        assert!(doc.record.shareholding.is_empty());
    }
}
