//! Append-only HTML processing log.
//!
//! The log is the single source of truth for post-hoc audit: every
//! significant decision elsewhere (skip, failure, fallback) emits exactly
//! one entry here. Each append opens, writes, and closes the file so that a
//! run aborting midway still leaves a readable partial log. Write failures
//! are reported on the operator channel and never abort the job.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

/// File name of the processing log at the archive root.
pub const LOG_FILE_NAME: &str = "_ExtractData_ProcessingLog.html";

/// Message severity; controls the HTML markup around the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Plain progress line
    Info,
    /// Bold section-opening line
    Section,
    /// Red bold line; processing continues
    Warning,
    /// Red bold line; the layer or step failed
    Error,
    /// Blue bold run-level notice (start/complete)
    Notice,
}

/// Job-owned handle onto the HTML processing log.
#[derive(Debug, Clone)]
pub struct ProcessingLog {
    path: PathBuf,
}

impl ProcessingLog {
    /// Create (or truncate) the log with the fixed HTML header, the
    /// software version, and the run start timestamp. A log that cannot be
    /// created is reported to the operator channel; the job carries on and
    /// later appends fail the same quiet way.
    pub fn init(path: PathBuf) -> Self {
        let log = Self { path };
        if let Err(err) = std::fs::write(&log.path, header()) {
            tracing::error!(
                path = %log.path.display(),
                %err,
                "a problem was encountered while initializing the processing log"
            );
        }
        log
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line-break-delimited entry.
    pub fn append(&self, message: &str, severity: Severity) {
        let fragment = format!("<br>{}<br>\n", markup(message, severity));
        let result = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(fragment.as_bytes()));
        if let Err(err) = result {
            tracing::error!(
                path = %self.path.display(),
                message,
                %err,
                "a problem was encountered while writing to the processing log"
            );
        }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.append(message.as_ref(), Severity::Info);
    }

    pub fn section(&self, message: impl AsRef<str>) {
        self.append(message.as_ref(), Severity::Section);
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.append(message.as_ref(), Severity::Warning);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.append(message.as_ref(), Severity::Error);
    }

    /// Append the completion notice and the run end timestamp.
    pub fn finish(&self) {
        self.append("Data extract processing complete!", Severity::Notice);
        self.info(format!("Processing End Time: {}", timestamp()));
    }
}

fn markup(message: &str, severity: Severity) -> String {
    match severity {
        Severity::Info => message.to_string(),
        Severity::Section => format!("<strong>{message}</strong>"),
        Severity::Warning | Severity::Error => {
            format!("<strong><font color='red'>{message}</font></strong>")
        }
        Severity::Notice => format!("<strong><font color='blue'>{message}</font></strong>"),
    }
}

fn timestamp() -> String {
    Local::now().format("%m/%d/%Y %H:%M:%S").to_string()
}

fn header() -> String {
    let mut header = String::from(
        "<!DOCTYPE HTML PUBLIC '-//W3C//DTD HTML 4.01 Transitional//EN' \
         'http://www.w3.org/TR/html4/loose.dtd'>\n\
         <html>\n\
         <head><meta http-equiv='Content-Type' content='text/html; charset=iso-8859-1'>\
         <title>Data Extract Processing Log</title></head>\n\
         <body>\n\
         <hr>\n\
         <font face='Arial, Helvetica, sans-serif' size='-1'>\
         <strong><div align='center'><h3>Data Extract Processing Log</h3></div></strong>\n\
         <hr>\n\
         <p>\n\
         <div align='center'><a href=\"javascript:if (window.print != null) { window.print(); } \
         else { alert('Your browser does not support this shortcut. Please select Print from the \
         File menu.'); }\"><strong><h4>Click to Print</h4></strong></a></div>\n",
    );
    header.push_str(&format!(
        "<br>Version of software: {}<br>\n",
        env!("CARGO_PKG_VERSION")
    ));
    header.push_str(&format!("<br>Processing Start Time: {}<br>\n", timestamp()));
    header.push_str(&format!(
        "<br>{}<br>\n",
        markup("Initiating data extract geoprocessing routine...", Severity::Notice)
    ));
    header
}
