//! CSV serialization of the recommendation report.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use super::ReportRow;
use crate::error::Result;

/// Written to the working directory, replacing any previous report.
pub const RESULTS_FILE: &str = "results.csv";

pub const HEADER: [&str; 11] = [
    "namespace",
    "resourceType",
    "resourceName",
    "containerName",
    "targetCPU",
    "targetMemory",
    "currentCPU",
    "currentMemory",
    "cpuDiff",
    "memDiff",
    "hpaEnabled",
];

/// Writes the header and one record per row.
pub fn write_rows<W: Write>(out: W, rows: &[ReportRow]) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record(row.record())?;
    }
    writer.flush()?;
    Ok(())
}

/// Truncates `path` and writes the report to it.
pub fn write_report(path: impl AsRef<Path>, rows: &[ReportRow]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_rows(file, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ResourceDrift;

    fn row(name: &str) -> ReportRow {
        ReportRow {
            namespace: "shop".to_string(),
            resource_type: "Deployment".to_string(),
            resource_name: name.to_string(),
            container_name: "app".to_string(),
            vpa_name: format!("{}-vpa-8dn39", name),
            target_cpu: "500m".to_string(),
            target_memory: "2048Mi".to_string(),
            drift: ResourceDrift {
                current_cpu_milli: 250,
                cpu_diff: 250,
                cpu_set: true,
                ..Default::default()
            },
            hpa_enabled: true,
        }
    }

    #[test]
    fn test_header_and_rows() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &[row("web")]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("namespace,resourceType,resourceName,containerName,targetCPU,targetMemory,currentCPU,currentMemory,cpuDiff,memDiff,hpaEnabled")
        );
        assert_eq!(
            lines.next(),
            Some("shop,Deployment,web,app,500m,2048Mi,250m,NOT_SET,250,0,true")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_report_file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RESULTS_FILE);

        write_report(&path, &[row("web"), row("api"), row("worker")]).unwrap();
        write_report(&path, &[row("web")]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(!text.contains("worker"));
    }

    #[test]
    fn test_unwritable_destination_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join(RESULTS_FILE);

        let err = write_report(&path, &[]).unwrap_err();
        assert!(matches!(err, crate::error::Error::OutputWriteError(_)));
    }
}
