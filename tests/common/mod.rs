#![allow(dead_code)]

use replaytrader::adapters::vec_bar_source::VecBarSource;
use replaytrader::domain::bar::Bar;
use replaytrader::domain::strategy::{Strategy, StrategyAction};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

pub const SYMBOL: &str = "BHP";

/// Flat bar at `time` with every price equal to `close`.
pub fn make_bar(time: i64, close: f64) -> Bar {
    Bar::flat(SYMBOL, time, close).unwrap()
}

/// Bars at times 1, 2, 3, ... with the given closes.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i as i64 + 1, c))
        .collect()
}

pub fn source_from_closes(closes: &[f64]) -> VecBarSource {
    VecBarSource::new(bars_from_closes(closes))
}

/// Deterministic zig-zag series around `base`.
pub fn generate_closes(n: usize, base: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let wave = ((i as f64) * 0.7).sin() * base * 0.1;
            let trend = (i as f64) * 0.05;
            base + wave + trend
        })
        .collect()
}

/// Replays a fixed action per bar, then `None` forever.
pub struct ScriptedStrategy {
    pub actions: Vec<StrategyAction>,
    cursor: usize,
}

impl ScriptedStrategy {
    pub fn new(actions: Vec<StrategyAction>) -> Self {
        Self { actions, cursor: 0 }
    }
}

impl Strategy for ScriptedStrategy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn on_start(&mut self) {
        self.cursor = 0;
    }

    fn on_bar(&mut self, _bar: &Bar) -> StrategyAction {
        let action = self
            .actions
            .get(self.cursor)
            .copied()
            .unwrap_or(StrategyAction::None);
        self.cursor += 1;
        action
    }
}

pub const BAR_HEADER: &str = "symbol,time,open,high,low,close,volume\n";

/// CSV body rows for flat bars at times 1, 2, 3, ...
pub fn csv_rows(closes: &[f64]) -> String {
    closes
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{SYMBOL},{},{c},{c},{c},{c},100\n", i + 1))
        .collect()
}

pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
