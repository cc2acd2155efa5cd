//! Generic CSV parser for catalog listings.
//!
//! Provides a streaming parser for comma-separated code listings whose
//! columns are located by header name.

use std::fs::File;
use std::io::{BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::types::{CodepickError, CodepickResult};

/// Trait for catalog entries that can be parsed from CSV rows.
///
/// Columns are matched against the header row ignoring case and order.
pub trait CatalogRecord: Sized {
    /// Columns that must be present in the header.
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Columns read when present; missing ones parse as empty strings.
    const OPTIONAL_COLUMNS: &'static [&'static str] = &[];

    /// Builds a record from field values ordered as `REQUIRED_COLUMNS`
    /// followed by `OPTIONAL_COLUMNS`.
    fn from_fields(fields: &[&str]) -> Self;
}

/// Finds a column by name in a header row, ignoring case, surrounding
/// whitespace and a leading UTF-8 BOM.
pub fn locate_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|header| {
        header
            .trim_start_matches('\u{feff}')
            .trim()
            .eq_ignore_ascii_case(name)
    })
}

/// A streaming parser for catalog CSV files.
pub struct CatalogParser<R: Read, T: CatalogRecord> {
    reader: Reader<R>,
    positions: Vec<Option<usize>>,
    records_read: usize,
    _marker: PhantomData<T>,
}

impl<T: CatalogRecord> CatalogParser<BufReader<File>, T> {
    /// Creates a new parser from a file path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or lacks a required column.
    pub fn from_path<P: AsRef<Path>>(path: P) -> CodepickResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CodepickError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read, T: CatalogRecord> CatalogParser<R, T> {
    /// Creates a new parser from a reader.
    pub fn from_reader(reader: R) -> CodepickResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let positions = Self::map_headers(&mut csv_reader)?;

        Ok(Self {
            reader: csv_reader,
            positions,
            records_read: 0,
            _marker: PhantomData,
        })
    }

    /// Locates every known column, failing on a missing required one.
    fn map_headers(reader: &mut Reader<R>) -> CodepickResult<Vec<Option<usize>>> {
        let headers = reader.headers()?;
        let mut positions =
            Vec::with_capacity(T::REQUIRED_COLUMNS.len() + T::OPTIONAL_COLUMNS.len());

        for column in T::REQUIRED_COLUMNS {
            match locate_column(headers, column) {
                Some(idx) => positions.push(Some(idx)),
                None => {
                    return Err(CodepickError::MissingColumn {
                        column: column.to_string(),
                    })
                }
            }
        }
        for column in T::OPTIONAL_COLUMNS {
            positions.push(locate_column(headers, column));
        }

        Ok(positions)
    }

    /// Returns the number of records read so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Parses all records into a Vec, stopping at the first error.
    pub fn parse_all(self) -> CodepickResult<Vec<T>> {
        self.collect()
    }
}

impl<R: Read, T: CatalogRecord> Iterator for CatalogParser<R, T> {
    type Item = CodepickResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    self.records_read += 1;

                    // Skip empty records
                    if record.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }

                    let fields: Vec<&str> = self
                        .positions
                        .iter()
                        .map(|pos| pos.and_then(|i| record.get(i)).unwrap_or(""))
                        .collect();
                    return Some(Ok(T::from_fields(&fields)));
                }
                Ok(false) => return None, // End of file
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
