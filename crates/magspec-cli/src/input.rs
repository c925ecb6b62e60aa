//! CSV readers for measurement series and filter taps.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use lib_types::{Seconds, Series};
use std::path::Path;

/// Open `path` as a headerless CSV with `#` comments and trimmed fields.
///
/// A leading non-numeric record is treated as a header by the callers.
fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .flexible(false)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

/// Read an `index,value` CSV into a series.
///
/// A non-numeric first row is treated as a header. Blank lines and lines
/// starting with `#` are skipped. When `sample_period` is given it replaces
/// the period inferred from the index column.
pub fn read_series(path: &Path, sample_period: Option<f64>) -> Result<Series> {
    let mut rdr = open_reader(path)?;

    let mut labels = Vec::new();
    let mut samples = Vec::new();

    for result in rdr.records() {
        let row = result.with_context(|| format!("Malformed CSV in {:?}", path))?;
        if row.len() < 2 {
            anyhow::bail!("{:?} line {}: expected `index,value`", path, line_of(&row));
        }
        let parsed = row[0].parse::<f64>().and_then(|i| Ok((i, row[1].parse::<f64>()?)));
        match parsed {
            Ok((index, value)) => {
                labels.push(index);
                samples.push(value);
            }
            Err(_) if labels.is_empty() => {
                tracing::debug!("Skipping header row in {:?}: {:?}", path, row);
            }
            Err(e) => anyhow::bail!("{:?} line {}: {}", path, line_of(&row), e),
        }
    }

    if samples.is_empty() {
        anyhow::bail!("No samples found in {:?}", path);
    }

    let series = match sample_period {
        Some(period) => Series::new(samples, Seconds(period), Seconds(labels[0]))?,
        None => Series::from_labeled(&labels, samples)
            .with_context(|| format!("Index column of {:?} is not uniformly spaced", path))?,
    };

    tracing::info!(
        "Read {} samples from {:?} (dt = {})",
        series.len(),
        path,
        series.dt.0
    );
    Ok(series)
}

/// Read FIR taps, one per row (the last column is used).
pub fn read_taps(path: &Path) -> Result<Vec<f64>> {
    let mut rdr = open_reader(path)?;

    let mut taps = Vec::new();
    for result in rdr.records() {
        let row = result.with_context(|| format!("Malformed CSV in {:?}", path))?;
        let field = match row.iter().last() {
            Some(field) => field,
            None => continue,
        };
        match field.parse::<f64>() {
            Ok(tap) => taps.push(tap),
            Err(_) if taps.is_empty() => {
                tracing::debug!("Skipping header row in {:?}: {:?}", path, row);
            }
            Err(e) => anyhow::bail!("{:?} line {}: {}", path, line_of(&row), e),
        }
    }

    if taps.is_empty() {
        anyhow::bail!("No filter taps found in {:?}", path);
    }
    Ok(taps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_csv(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_read_series_with_header() {
        let f = temp_csv("time,value\n-0.5,1\n0.0,2\n0.5,3\n");
        let series = read_series(f.path(), None).unwrap();
        assert_eq!(series.samples, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.dt, Seconds(0.5));
        assert_eq!(series.t_start, Seconds(-0.5));
    }

    #[test]
    fn test_read_series_period_override() {
        let f = temp_csv("# comment\n0,1\n1,2\n\n2,3\n");
        let series = read_series(f.path(), Some(0.1)).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.dt, Seconds(0.1));
    }

    #[test]
    fn test_read_series_trims_fields() {
        let f = temp_csv("index , value\n 0 , 4\n1,  5 \n");
        let series = read_series(f.path(), None).unwrap();
        assert_eq!(series.samples, vec![4.0, 5.0]);
    }

    #[test]
    fn test_read_series_rejects_bad_rows() {
        let f = temp_csv("0,1\n1,abc\n");
        assert!(read_series(f.path(), None).is_err());

        // Non-uniform index
        let f = temp_csv("0,1\n1,2\n3,3\n");
        assert!(read_series(f.path(), None).is_err());

        // Ragged rows
        let f = temp_csv("0,1\n1,2,7\n");
        assert!(read_series(f.path(), None).is_err());

        let f = temp_csv("index,value\n");
        assert!(read_series(f.path(), None).is_err());
    }

    #[test]
    fn test_read_taps() {
        let f = temp_csv("tap\n0.25\n0.5\n0.25\n");
        assert_eq!(read_taps(f.path()).unwrap(), vec![0.25, 0.5, 0.25]);

        let f = temp_csv("0,1.0\n1,-1.0\n");
        assert_eq!(read_taps(f.path()).unwrap(), vec![1.0, -1.0]);
    }
}
