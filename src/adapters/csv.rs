//! Tabular input and output.
//!
//! The input columns are kept untouched; results are written as
//! additional columns next to them.

use addrgeo_core::{
    entities::*,
    usecases::{AddressInput, UnresolvedEntry},
};
use serde::Serialize;
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const STREET_COLUMN: &str = "street";
pub const HOUSE_NUMBER_COLUMN: &str = "hs_nr";
pub const HOUSE_NUMBER_SUFFIX_COLUMN: &str = "hs_nr_x";
pub const POSTAL_CODE_COLUMN: &str = "plz";
pub const CITY_COLUMN: &str = "ort";
pub const STATE_COLUMN: &str = "state";
pub const COUNTRY_COLUMN: &str = "country";

pub const ADDRESS_COLUMN: &str = "address";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";

const STRUCTURED_COLUMNS: [&str; 7] = [
    STREET_COLUMN,
    HOUSE_NUMBER_COLUMN,
    HOUSE_NUMBER_SUFFIX_COLUMN,
    POSTAL_CODE_COLUMN,
    CITY_COLUMN,
    STATE_COLUMN,
    COUNTRY_COLUMN,
];

const BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Csv(#[from] ::csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Neither address columns ({}) nor an 'address' column found", STRUCTURED_COLUMNS.join(", "))]
    MissingAddressColumns,
}

pub type Result<T> = std::result::Result<T, Error>;

/// A table of text cells. Every row has exactly one cell per header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Header lookup ignores ASCII case.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    fn cell(row: &[String], column: Option<usize>) -> Option<String> {
        column
            .and_then(|i| row.get(i))
            .map(|x| x.trim())
            .filter(|x| !x.is_empty())
            .map(ToString::to_string)
    }

    /// Reads one address per row, preferring the structured columns over
    /// a merged `address` column.
    pub fn address_inputs(&self) -> Result<Vec<AddressInput>> {
        let [street, house_number, house_number_suffix, postal_code, city, state, country] =
            STRUCTURED_COLUMNS.map(|name| self.column(name));
        let structured = [
            street,
            house_number,
            house_number_suffix,
            postal_code,
            city,
            state,
            country,
        ]
        .iter()
        .any(Option::is_some);
        if structured {
            let inputs = self
                .rows
                .iter()
                .map(|row| {
                    AddressInput::Structured(AddressRecord {
                        street: Self::cell(row, street),
                        house_number: Self::cell(row, house_number),
                        house_number_suffix: Self::cell(row, house_number_suffix),
                        postal_code: Self::cell(row, postal_code),
                        city: Self::cell(row, city),
                        state: Self::cell(row, state),
                        country: Self::cell(row, country),
                    })
                })
                .collect();
            return Ok(inputs);
        }
        let address = self
            .column(ADDRESS_COLUMN)
            .ok_or(Error::MissingAddressColumns)?;
        Ok(self
            .rows
            .iter()
            .map(|row| AddressInput::Merged(Self::cell(row, Some(address)).unwrap_or_default()))
            .collect())
    }

    /// Replaces the values of an existing column or appends a new one.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(self.rows.len(), values.len());
        let index = match self.column(name) {
            Some(index) => index,
            None => {
                self.headers.push(name.to_string());
                for row in &mut self.rows {
                    row.push(String::new());
                }
                self.headers.len() - 1
            }
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[index] = value;
        }
    }

    /// Adds the canonical address (unless the input already has one) and
    /// the coordinate columns.
    pub fn annotate(
        &mut self,
        addresses: &[Option<CanonicalAddress>],
        positions: &[Option<Coordinate>],
    ) {
        if self.column(ADDRESS_COLUMN).is_none() {
            let values = addresses
                .iter()
                .map(|x| x.as_ref().map(ToString::to_string).unwrap_or_default())
                .collect();
            self.set_column(ADDRESS_COLUMN, values);
        }
        let (lat, lng) = positions
            .iter()
            .map(|pos| match pos {
                Some(pos) => (pos.lat.to_string(), pos.lng.to_string()),
                None => Default::default(),
            })
            .unzip();
        self.set_column(LATITUDE_COLUMN, lat);
        self.set_column(LONGITUDE_COLUMN, lng);
    }
}

pub fn read_table<R: io::Read>(rdr: R, delimiter: u8) -> Result<Table> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(::csv::Trim::Headers)
        .from_reader(rdr);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches(BOM).trim().to_string())
        .collect();
    let mut rows = vec![];
    for (index, record) in rdr.records().enumerate() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(ToString::to_string).collect();
        if row.len() > headers.len() {
            let dropped = &row[headers.len()..];
            if dropped.iter().any(|x| !x.trim().is_empty()) {
                log::warn!(
                    "Row {} has {} cells but only {} columns, ignoring {:?}",
                    index + 1,
                    row.len(),
                    headers.len(),
                    dropped
                );
            }
        }
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    log::debug!("Read {} rows with columns {:?}", rows.len(), headers);
    Ok(Table { headers, rows })
}

pub fn write_table<W: io::Write>(wtr: W, delimiter: u8, table: &Table) -> Result<()> {
    let mut wtr = ::csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(wtr);
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct MissedRecord<'a> {
    missed_addresses: &'a str,
}

pub fn write_unresolved<W: io::Write>(
    wtr: W,
    delimiter: u8,
    entries: &[UnresolvedEntry],
) -> Result<()> {
    let mut wtr = ::csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(wtr);
    for entry in entries {
        wtr.serialize(MissedRecord {
            missed_addresses: &entry.address,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// `out/result.csv` → `out/result_missed.csv`
pub fn missed_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = output
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    output.with_file_name(format!("{stem}_missed.{ext}"))
}
