//! CSV bar source.
//!
//! Layout: one header line (discarded), then
//! `symbol,time,open,high,low,close,volume` per line, `time` in epoch
//! milliseconds. LF and CRLF endings are both accepted.
//!
//! Lenient mode streams the file and skips rows that fail to parse, violate
//! the bar invariants or go back in time. Strict mode reads and validates the
//! whole file on the first `next_bar` and fails with `SourceCorrupt` on the
//! first bad row, so a corrupt file never yields a partial run.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::domain::bar::Bar;
use crate::domain::error::ReplayError;
use crate::ports::bar_source::BarSource;

const FIELDS: usize = 7;

enum State {
    Pending,
    Streaming(csv::Reader<File>),
    Loaded(std::vec::IntoIter<Bar>),
    Done,
}

pub struct CsvBarSource {
    path: PathBuf,
    strict: bool,
    state: State,
    last_time: Option<i64>,
    skipped: u64,
}

impl CsvBarSource {
    /// The file is not opened until the first `next_bar`.
    pub fn new<P: AsRef<Path>>(path: P, strict: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            strict,
            state: State::Pending,
            last_time: None,
            skipped: 0,
        }
    }

    pub fn lenient<P: AsRef<Path>>(path: P) -> Self {
        Self::new(path, false)
    }

    pub fn strict<P: AsRef<Path>>(path: P) -> Self {
        Self::new(path, true)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the file ahead of the first `next_bar`. In strict mode this also
    /// reads and validates every row. A no-op once the source has started.
    pub fn prepare(&mut self) -> Result<(), ReplayError> {
        if !matches!(self.state, State::Pending) {
            return Ok(());
        }
        let reader = self.open()?;
        if self.strict {
            let bars = self.load_all(reader)?;
            debug!(path = %self.path.display(), bars = bars.len(), "csv loaded");
            self.state = State::Loaded(bars.into_iter());
        } else {
            self.state = State::Streaming(reader);
        }
        Ok(())
    }

    /// Rows dropped so far in lenient mode.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn open(&self) -> Result<csv::Reader<File>, ReplayError> {
        let file = File::open(&self.path).map_err(|e| ReplayError::SourceUnavailable {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file))
    }

    fn load_all(&mut self, mut reader: csv::Reader<File>) -> Result<Vec<Bar>, ReplayError> {
        let mut bars = Vec::new();
        let mut record = StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    let line = line_of(&record);
                    let bar = parse_row(&record)
                        .map_err(|reason| ReplayError::SourceCorrupt { line, reason })?;
                    self.check_order(&bar)
                        .map_err(|reason| ReplayError::SourceCorrupt { line, reason })?;
                    bars.push(bar);
                }
                Err(err) if err.is_io_error() => return Err(ReplayError::Io(err.into())),
                Err(err) => {
                    return Err(ReplayError::SourceCorrupt {
                        line: err.position().map(|p| p.line()).unwrap_or(0),
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(bars)
    }

    fn next_streamed(&mut self, reader: &mut csv::Reader<File>) -> Result<Option<Bar>, ReplayError> {
        let mut record = StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(false) => return Ok(None),
                Ok(true) => {
                    let line = line_of(&record);
                    match parse_row(&record).and_then(|bar| self.check_order(&bar).map(|_| bar)) {
                        Ok(bar) => return Ok(Some(bar)),
                        Err(reason) => {
                            self.skipped += 1;
                            debug!(line, %reason, "skipping csv row");
                        }
                    }
                }
                Err(err) if err.is_io_error() => return Err(ReplayError::Io(err.into())),
                Err(err) => {
                    self.skipped += 1;
                    debug!(error = %err, "skipping unreadable csv row");
                }
            }
        }
    }

    fn check_order(&mut self, bar: &Bar) -> Result<(), String> {
        if let Some(last) = self.last_time {
            if bar.time() < last {
                return Err(format!(
                    "time {} precedes previous bar time {}",
                    bar.time(),
                    last
                ));
            }
        }
        self.last_time = Some(bar.time());
        Ok(())
    }
}

impl BarSource for CsvBarSource {
    fn next_bar(&mut self) -> Result<Option<Bar>, ReplayError> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Pending => {
                    self.state = State::Pending;
                    self.prepare()?;
                }
                State::Streaming(mut reader) => {
                    let next = self.next_streamed(&mut reader)?;
                    if next.is_some() {
                        self.state = State::Streaming(reader);
                    } else if self.skipped > 0 {
                        debug!(path = %self.path.display(), skipped = self.skipped, "csv exhausted");
                    }
                    return Ok(next);
                }
                State::Loaded(mut bars) => {
                    let next = bars.next();
                    if next.is_some() {
                        self.state = State::Loaded(bars);
                    }
                    return Ok(next);
                }
                State::Done => return Ok(None),
            }
        }
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn parse_row(record: &StringRecord) -> Result<Bar, String> {
    if record.len() != FIELDS {
        return Err(format!("expected {FIELDS} fields, found {}", record.len()));
    }
    let time: i64 = record[1]
        .parse()
        .map_err(|e| format!("invalid time '{}': {e}", &record[1]))?;
    let number = |idx: usize, name: &str| -> Result<f64, String> {
        record[idx]
            .parse::<f64>()
            .map_err(|e| format!("invalid {name} '{}': {e}", &record[idx]))
    };
    Bar::new(
        &record[0],
        time,
        number(2, "open")?,
        number(3, "high")?,
        number(4, "low")?,
        number(5, "close")?,
        number(6, "volume")?,
    )
    .map_err(|e| e.to_string())
}
