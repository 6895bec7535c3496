#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/scorecard/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Rectangular grids of cell text.
pub mod grid;
/// Pattern-based header matching.
pub mod header;
/// Holdings sheet extraction.
pub mod holdings;
/// Company and peer page extraction.
pub mod html;
/// Section extraction from grids.
pub mod section;

pub use grid::Grid;
pub use header::{ColumnMap, HoldingField, PatternSet, classify_header, map_columns, match_header};
pub use holdings::{HoldingRow, HoldingSheet};
pub use html::{parse_company_page, parse_peers_page, table_to_grid};
pub use section::{DEFAULT_STOP_MARKERS, Scan, SectionExtractor};
