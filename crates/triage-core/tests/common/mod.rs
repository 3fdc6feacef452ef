//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use chrono::{TimeZone, Utc};
use triage_core::{RunStatus, WorkflowRun};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Zip with one deflated entry per `(name, body)`, in order.
pub fn log_zip(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, body) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Failed run `id` created `minute` minutes past noon.
pub fn failed_run(id: u64, minute: u32) -> WorkflowRun {
    WorkflowRun::new(
        id,
        format!("https://github.com/acme/widgets/actions/runs/{id}"),
        Utc.with_ymd_and_hms(2024, 5, 2, 12, minute, 0).unwrap(),
        RunStatus::Failure,
    )
    .with_name("CI")
    .with_branch("main")
}

/// `count` numbered filler lines, each ending in `\n`.
pub fn filler(prefix: &str, count: usize) -> String {
    (0..count).map(|i| format!("{prefix} {i}\n")).collect()
}
