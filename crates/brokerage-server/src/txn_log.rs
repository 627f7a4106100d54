//! Error log and mix log.
//!
//! Both are plain append-only text files shared by every worker, one
//! line per entry: `timestamp pid status ...`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use brokerage_core::{TxnOutput, TxnType};
use chrono::Local;
use tracing::warn;

pub struct TxnLog {
    error: Mutex<File>,
    mix: Mutex<File>,
    error_path: PathBuf,
    verbose: bool,
    pid: u32,
}

impl TxnLog {
    pub fn open(error_path: &Path, mix_path: &Path, verbose: bool) -> io::Result<Self> {
        Ok(TxnLog {
            error: Mutex::new(append(error_path)?),
            mix: Mutex::new(append(mix_path)?),
            error_path: error_path.to_path_buf(),
            verbose,
            pid: std::process::id(),
        })
    }

    pub fn error_path(&self) -> &Path {
        &self.error_path
    }

    /// A transaction finished with a non-success status. `record` is
    /// its full input, starting with the transaction name.
    pub fn txn_error(&self, status: i32, record: &str) {
        let line = format!("{} {} {} {}", stamp(), self.pid, status, record);
        write_line(&self.error, &line);
    }

    /// A worker-level fault outside any transaction.
    pub fn fault(&self, what: &str, detail: &dyn std::fmt::Display) {
        let line = format!("{} {} - {}: {}", stamp(), self.pid, what, detail);
        write_line(&self.error, &line);
    }

    /// One line per executed transaction.
    pub fn mix(&self, ty: TxnType, status: i32, elapsed: Duration, output: Option<&TxnOutput>) {
        let ms = elapsed.as_secs_f64() * 1000.0;
        let mut line = format!("{} {} {} {} {:.3}", stamp(), self.pid, status, ty, ms);
        if self.verbose {
            if let Some(out) = output {
                line.push_str(&format!(" {:?}", out));
            }
        }
        write_line(&self.mix, &line);
    }
}

fn append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

fn write_line(file: &Mutex<File>, line: &str) {
    let mut file = file.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = writeln!(file, "{}", line) {
        warn!(error = %e, "log write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokerage_core::TradeCleanupOutput;

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn entries_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let err = dir.path().join("error.log");
        let mix = dir.path().join("mix.log");

        let log = TxnLog::open(&err, &mix, false).unwrap();
        log.mix(TxnType::TradeStatus, 0, Duration::from_millis(3), None);
        log.txn_error(-711, "TRADE_ORDER acct_id=1");
        drop(log);

        let log = TxnLog::open(&err, &mix, false).unwrap();
        log.mix(TxnType::TradeOrder, -711, Duration::from_millis(1), None);

        let mix_lines = lines(&mix);
        assert_eq!(mix_lines.len(), 2);
        let fields: Vec<&str> = mix_lines[0].split(' ').collect();
        assert_eq!(fields[2], std::process::id().to_string());
        assert_eq!(fields[3], "0");
        assert_eq!(fields[4], TxnType::TradeStatus.to_string());
        assert_eq!(fields[5], "3.000");

        let err_lines = lines(&err);
        assert_eq!(err_lines.len(), 1);
        assert!(err_lines[0].ends_with(" -711 TRADE_ORDER acct_id=1"));
    }

    #[test]
    fn verbose_appends_the_output() {
        let dir = tempfile::tempdir().unwrap();
        let mix = dir.path().join("mix.log");
        let log = TxnLog::open(&dir.path().join("error.log"), &mix, true).unwrap();

        let out = TxnOutput::TradeCleanup(TradeCleanupOutput { canceled: 4 });
        log.mix(TxnType::TradeCleanup, 0, Duration::ZERO, Some(&out));

        assert!(lines(&mix)[0].contains("canceled: 4"));
    }
}
