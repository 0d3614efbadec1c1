//! CSV export of an import's observations.

use std::io::Write;

use crate::error::ImportResult;
use crate::types::Observation;

/// Fixed header of every export.
pub const EXPORT_HEADER: [&str; 10] = [
    "date",
    "series",
    "value_num",
    "value_text",
    "frequency",
    "units",
    "country",
    "source",
    "vintage_date",
    "notes",
];

/// Lazily renders a snapshot of observations as CSV lines, header first.
///
/// Each item is one complete record including its line terminator.
pub struct ExportRows {
    header_done: bool,
    rows: std::vec::IntoIter<Observation>,
}

impl ExportRows {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self {
            header_done: false,
            rows: observations.into_iter(),
        }
    }

    /// Write every remaining line to `out`.
    pub fn write_to<W: Write>(self, mut out: W) -> ImportResult<()> {
        for line in self {
            out.write_all(line?.as_bytes()).map_err(csv::Error::from)?;
        }
        out.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

impl Iterator for ExportRows {
    type Item = ImportResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.header_done {
            self.header_done = true;
            return Some(render(EXPORT_HEADER));
        }
        let obs = self.rows.next()?;
        Some(render(export_record(&obs)))
    }
}

fn render<I, T>(record: I) -> ImportResult<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(record)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn export_record(obs: &Observation) -> [String; 10] {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    [
        obs.date.clone(),
        obs.series.clone(),
        obs.value_num().map(|n| format!("{n:?}")).unwrap_or_default(),
        obs.value_text().unwrap_or_default().to_string(),
        opt(&obs.frequency),
        opt(&obs.units),
        opt(&obs.country),
        opt(&obs.source),
        opt(&obs.vintage_date),
        opt(&obs.notes),
    ]
}
