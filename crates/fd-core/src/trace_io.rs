//! Loading arrival traces from recorded CSV files.
//!
//! Trace files carry a header row naming at least a `timestamp_receive`
//! column; multi-peer recordings also carry a `site` column identifying the
//! heartbeat sender, which the loader can filter on.

use std::path::Path;

use fd_common::{ArrivalTrace, Error, Result};

/// Loads the arrival timestamps from a CSV trace file, keeping only rows
/// whose `site` matches the given filter (all rows when `None`).
pub fn load_trace_csv(path: &Path, site: Option<u64>) -> Result<ArrivalTrace> {
    let contents = std::fs::read_to_string(path)?;
    let trace = parse_trace_csv(&contents, site)?;
    tracing::debug!(
        path = %path.display(),
        rows = trace.len(),
        site = ?site,
        "loaded arrival trace"
    );
    Ok(trace)
}

fn parse_trace_csv(contents: &str, site: Option<u64>) -> Result<ArrivalTrace> {
    let mut lines = contents.lines().enumerate();
    let (_, header) = lines
        .next()
        .ok_or_else(|| Error::Trace("trace file has no header row".into()))?;

    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let timestamp_col = columns
        .iter()
        .position(|&c| c == "timestamp_receive")
        .ok_or_else(|| {
            Error::Trace(format!(
                "no `timestamp_receive` column in header [{}]",
                columns.join(", ")
            ))
        })?;
    let site_col = match site {
        Some(_) => Some(
            columns
                .iter()
                .position(|&c| c == "site")
                .ok_or_else(|| Error::Trace("site filter given but no `site` column".into()))?,
        ),
        None => None,
    };

    let mut samples = Vec::new();
    for (line_no, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        if let (Some(col), Some(wanted)) = (site_col, site) {
            let field = fields.get(col).copied().unwrap_or_default();
            let row_site: u64 = field.parse().map_err(|_| {
                Error::Trace(format!("line {}: bad site value `{field}`", line_no + 1))
            })?;
            if row_site != wanted {
                continue;
            }
        }

        let field = fields.get(timestamp_col).copied().unwrap_or_default();
        let timestamp: f64 = field.parse().map_err(|_| {
            Error::Trace(format!(
                "line {}: bad timestamp value `{field}`",
                line_no + 1
            ))
        })?;
        samples.push(timestamp);
    }

    ArrivalTrace::from_samples(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_timestamps_filtered_by_site() {
        let file = write_temp(
            "site,timestamp_receive\n\
             8,100.0\n\
             3,105.0\n\
             8,200.5\n\
             8,301.0\n",
        );
        let trace = load_trace_csv(file.path(), Some(8)).unwrap();
        assert_eq!(trace.as_slice(), &[100.0, 200.5, 301.0]);
    }

    #[test]
    fn loads_all_rows_without_a_filter() {
        let file = write_temp("timestamp_receive\n1.0\n2.0\n\n3.0\n");
        let trace = load_trace_csv(file.path(), None).unwrap();
        assert_eq!(trace.len(), 3);
    }

    #[test]
    fn header_order_does_not_matter() {
        let file = write_temp("timestamp_receive,site\n10.0,1\n20.0,2\n30.0,1\n");
        let trace = load_trace_csv(file.path(), Some(1)).unwrap();
        assert_eq!(trace.as_slice(), &[10.0, 30.0]);
    }

    #[test]
    fn missing_timestamp_column_is_a_trace_error() {
        let file = write_temp("site,value\n1,2\n");
        let err = load_trace_csv(file.path(), None).unwrap_err();
        assert!(matches!(err, Error::Trace(_)));
        assert!(err.to_string().contains("timestamp_receive"));
    }

    #[test]
    fn malformed_rows_name_their_line() {
        let file = write_temp("timestamp_receive\n1.0\nnot-a-number\n");
        let err = load_trace_csv(file.path(), None).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn out_of_order_timestamps_are_rejected() {
        let file = write_temp("timestamp_receive\n5.0\n3.0\n");
        assert!(load_trace_csv(file.path(), None).is_err());
    }
}
