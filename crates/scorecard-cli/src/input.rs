//! CSV sheets.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use scorecard::{Grid, Sheet};

/// Reads one CSV file as a sheet named after the file.
pub(crate) fn read_sheet(path: &Path) -> Result<Sheet> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let grid = read_grid(file).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
    Ok(Sheet::new(name, grid))
}

/// Reads CSV rows into a grid. Rows may differ in length; the header row is
/// located later, so nothing is treated as a header here.
pub(crate) fn read_grid<R: Read>(reader: R) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut grid = Grid::default();
    for record in reader.records() {
        let record = record?;
        grid.push_row(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}
