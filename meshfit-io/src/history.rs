//! Loss history export as CSV
//!
//! One header row with `iteration` followed by the column names, then one row
//! per iteration. Columns must all have the same length.

use crate::error::{open, IoError};
use meshfit_core::Result;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Named columns of per-iteration values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
    pub columns: Vec<(String, Vec<f32>)>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, values: &[f32]) -> Self {
        self.columns.push((name.into(), values.to_vec()));
        self
    }

    /// Number of rows, or 0 for a table without columns.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |(_, v)| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, name: &str) -> Option<&[f32]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        let rows = self.len();
        if let Some((name, values)) = self.columns.iter().find(|(_, v)| v.len() != rows) {
            return Err(IoError::WriteError {
                message: format!("column '{}' has {} rows, expected {}", name, values.len(), rows),
            }
            .into());
        }

        write!(out, "iteration")?;
        for (name, _) in &self.columns {
            write!(out, ",{}", name)?;
        }
        writeln!(out)?;
        for row in 0..rows {
            write!(out, "{}", row)?;
            for (_, values) in &self.columns {
                write!(out, ",{}", values[row])?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_from<R: BufRead>(input: R, origin: &str) -> Result<Self> {
        let parse_error = |line: usize, message: String| IoError::ParseError {
            path: origin.to_string(),
            message: format!("line {}: {}", line, message),
        };

        let mut lines = input.lines();
        let header = match lines.next() {
            Some(line) => line?,
            None => return Ok(Self::default()),
        };
        let mut columns: Vec<(String, Vec<f32>)> = header
            .split(',')
            .skip(1)
            .map(|name| (name.trim().to_string(), Vec::new()))
            .collect();

        for (i, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').skip(1).collect();
            if fields.len() != columns.len() {
                return Err(parse_error(i + 2, format!("expected {} values, found {}", columns.len(), fields.len())).into());
            }
            for ((_, values), field) in columns.iter_mut().zip(fields) {
                let value = field
                    .trim()
                    .parse::<f32>()
                    .map_err(|e| parse_error(i + 2, format!("'{}': {}", field, e)))?;
                values.push(value);
            }
        }
        Ok(Self { columns })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::read_from(BufReader::new(open(path)?), &path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_layout() {
        let table = HistoryTable::new()
            .with_column("chamfer", &[0.5, 0.25])
            .with_column("edge", &[1.0, 0.75]);
        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "iteration,chamfer,edge\n0,0.5,1\n1,0.25,0.75\n"
        );
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let table = HistoryTable::new()
            .with_column("a", &[1.0, 2.0])
            .with_column("b", &[1.0]);
        assert!(table.write_to(&mut Vec::new()).is_err());
    }

    #[test]
    fn test_read_back() {
        let src = "iteration,chamfer,edge\n0,0.5,1\n1,0.25,0.75\n";
        let table = HistoryTable::read_from(src.as_bytes(), "mem").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("edge"), Some(&[1.0, 0.75][..]));
        assert_eq!(table.column("normal"), None);
    }

    #[test]
    fn test_malformed_row() {
        let src = "iteration,chamfer\n0,abc\n";
        assert!(HistoryTable::read_from(src.as_bytes(), "mem").is_err());
        let src = "iteration,chamfer\n0,1,2\n";
        assert!(HistoryTable::read_from(src.as_bytes(), "mem").is_err());
    }
}
