use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::LoadsumError;
use crate::runs::RunRecord;

/// Column order of the combined run table.
pub const CSV_HEADER: &str =
    "label,total,http_reqs,p95_ms,p99_ms,avg_ms,rps,error_rate_percent,2xx,3xx,4xx,5xx";

/// On-disk shape of one run row. Field names are the CSV column names.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    label: String,
    total: Option<u64>,
    http_reqs: u64,
    p95_ms: f64,
    p99_ms: f64,
    avg_ms: f64,
    rps: f64,
    error_rate_percent: f64,
    #[serde(rename = "2xx")]
    c2xx: u64,
    #[serde(rename = "3xx")]
    c3xx: u64,
    #[serde(rename = "4xx")]
    c4xx: u64,
    #[serde(rename = "5xx")]
    c5xx: u64,
}

impl From<&RunRecord> for CsvRow {
    fn from(r: &RunRecord) -> Self {
        Self {
            label: r.label.clone(),
            total: r.total,
            http_reqs: r.request_count,
            p95_ms: r.p95_ms,
            p99_ms: r.p99_ms,
            avg_ms: r.avg_ms,
            rps: r.requests_per_second,
            error_rate_percent: r.error_rate_percent,
            c2xx: r.status_2xx,
            c3xx: r.status_3xx,
            c4xx: r.status_4xx,
            c5xx: r.status_5xx,
        }
    }
}

impl From<CsvRow> for RunRecord {
    fn from(r: CsvRow) -> Self {
        Self {
            label: r.label,
            total: r.total,
            request_count: r.http_reqs,
            p95_ms: r.p95_ms,
            p99_ms: r.p99_ms,
            avg_ms: r.avg_ms,
            requests_per_second: r.rps,
            error_rate_percent: r.error_rate_percent,
            status_2xx: r.c2xx,
            status_3xx: r.c3xx,
            status_4xx: r.c4xx,
            status_5xx: r.c5xx,
        }
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Write records as CSV, header first, in the order given.
///
/// An empty `total` is written as an empty field. Floats use their shortest
/// round-trip form, so `5.0` stays `5.0`.
pub fn write_csv<W: Write>(records: &[RunRecord], writer: W) -> Result<(), LoadsumError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(CSV_HEADER.split(','))?;
    for record in records {
        wtr.serialize(CsvRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV import
// ---------------------------------------------------------------------------

/// Re-read a combined run table.
///
/// Rows with missing columns or non-numeric values where numbers are expected
/// are dropped. Only a failure to read the header row is an error.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RunRecord>, LoadsumError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.headers()?;

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for (idx, row) in rdr.deserialize::<CsvRow>().enumerate() {
        match row {
            Ok(row) => records.push(RunRecord::from(row)),
            Err(e) => {
                dropped += 1;
                tracing::debug!(row = idx + 1, error = %e, "dropping unparseable run row");
            }
        }
    }
    if dropped > 0 {
        tracing::debug!(dropped, kept = records.len(), "run table re-read");
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runs::filename::RunTag;
    use serde_json::json;

    fn make_record(label: &str, total: Option<u64>) -> RunRecord {
        let summary = json!({
            "metrics": {
                "http_reqs": { "count": 1500 },
                "http_req_duration": {
                    "avg": 10.5,
                    "percentiles": { "p(95)": 20.25, "p(99)": 31.0 }
                },
                "http_req_failed": { "rate": 0.02 },
                "code_2xx": { "count": 1470 },
                "code_5xx": { "count": 30 }
            }
        });
        RunRecord::from_summary(
            &summary,
            &RunTag {
                label: label.to_string(),
                total,
                started_at: None,
            },
        )
    }

    fn to_csv_string(records: &[RunRecord]) -> String {
        let mut buf = Vec::new();
        write_csv(records, &mut buf).expect("write_csv should succeed");
        String::from_utf8(buf).expect("CSV output should be UTF-8")
    }

    #[test]
    fn write_csv_header_and_row_format() {
        let csv = to_csv_string(&[make_record("direct", Some(1500))]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "direct,1500,1500,20.25,31.0,10.5,5.0,2.0,1470,0,0,30");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn write_csv_empty_total_is_empty_field() {
        let csv = to_csv_string(&[make_record("unknown", None)]);
        let row = csv.lines().nth(1).expect("data row");
        assert!(row.starts_with("unknown,,1500,"));
    }

    #[test]
    fn write_csv_no_records_is_header_only() {
        let csv = to_csv_string(&[]);
        assert_eq!(csv, format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn write_csv_quotes_labels_with_commas() {
        let mut rec = make_record("direct", Some(1));
        rec.label = "a,b".to_string();
        let csv = to_csv_string(&[rec]);
        assert!(csv.lines().nth(1).expect("data row").starts_with("\"a,b\",1,"));
    }

    #[test]
    fn csv_round_trip_preserves_numeric_fields() {
        let original = vec![make_record("direct", Some(1500)), make_record("unknown", None)];
        let csv = to_csv_string(&original);
        let parsed = read_csv(csv.as_bytes()).expect("read should succeed");
        assert_eq!(parsed, original);
    }

    #[test]
    fn read_csv_drops_unparseable_rows() {
        let input = format!(
            "{CSV_HEADER}\n\
             direct,100,300,1.5,2.5,1.0,1.0,0.0,300,0,0,0\n\
             direct,200,abc,1.5,2.5,1.0,1.0,0.0,300,0,0,0\n\
             traefik,100,300,1.5\n\
             traefik,100,300,1.5,2.5,1.0,1.0,0.0,300,0,0,0\n"
        );
        let records = read_csv(input.as_bytes()).expect("read should succeed");
        let keys: Vec<_> = records.iter().map(|r| (r.label.as_str(), r.total)).collect();
        assert_eq!(keys, vec![("direct", Some(100)), ("traefik", Some(100))]);
    }

    #[test]
    fn read_csv_non_numeric_total_is_dropped() {
        let input = format!("{CSV_HEADER}\ndirect,lots,300,1.5,2.5,1.0,1.0,0.0,300,0,0,0\n");
        let records = read_csv(input.as_bytes()).expect("read should succeed");
        assert!(records.is_empty());
    }

    #[test]
    fn read_csv_empty_input_has_no_rows() {
        let records = read_csv("".as_bytes()).expect("read should succeed");
        assert!(records.is_empty());
    }
}
