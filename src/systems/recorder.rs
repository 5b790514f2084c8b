use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::components::{Binding, RecorderError, RecorderMode, SampleValue, Variable};
use crate::utils::TIME_EPSILON;

const SEPARATOR: char = ';';
const TIME_COLUMN: &str = "time";

/// One parsed row: timestamp and a value per registered variable
#[derive(Debug, Clone)]
struct Sample {
    time: f64,
    values: Vec<SampleValue>,
}

/// Column layout of an open replay file
#[derive(Debug)]
struct ReplaySource {
    lines: Lines<BufReader<File>>,
    line: usize,
    width: usize,
    time_column: usize,
    columns: Vec<usize>,
}

/// Periodic capture of bound variables to a `;`-separated file, and
/// interpolated playback of such a file into the same bindings.
///
/// Variables are registered before a session starts and stay fixed until the
/// session is finalized.
#[derive(Debug, Default)]
pub struct Recorder {
    mode: RecorderMode,
    path: Option<PathBuf>,
    variables: Vec<Variable>,
    writer: Option<BufWriter<File>>,
    source: Option<ReplaySource>,
    interval: f64,
    time: f64,
    elapsed: f64,
    records: usize,
    prev: Option<Sample>,
    next: Option<Sample>,
    active: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        binding: Binding,
        precision: usize,
    ) -> Result<(), RecorderError> {
        let name = name.into();
        if self.is_open() {
            return Err(RecorderError::SessionActive(name));
        }
        if name.is_empty()
            || name == TIME_COLUMN
            || name.contains(|c| c == SEPARATOR || c == '"' || c == '\n' || c == '\r')
        {
            return Err(RecorderError::InvalidName(name));
        }
        if self.variables.iter().any(|v| v.name() == name) {
            return Err(RecorderError::DuplicateVariable(name));
        }

        self.variables.push(Variable::new(name, binding, precision));
        Ok(())
    }

    /// Open a session, closing any previous one first.
    pub fn initialize(
        &mut self,
        mode: RecorderMode,
        path: &Path,
        interval: f64,
    ) -> Result<(), RecorderError> {
        self.close()?;
        self.mode = mode;
        self.time = 0.0;
        self.elapsed = 0.0;
        self.records = 0;

        match mode {
            RecorderMode::Disabled => Ok(()),
            RecorderMode::Record => {
                if !(interval.is_finite() && interval > 0.0) {
                    return Err(RecorderError::InvalidInterval(interval));
                }
                let file = File::create(path).map_err(|source| RecorderError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
                let mut writer = BufWriter::new(file);
                writeln!(writer, "{}", self.header())?;

                self.writer = Some(writer);
                self.path = Some(path.to_path_buf());
                self.interval = interval;
                self.active = true;
                info!(
                    path = %path.display(),
                    interval,
                    variables = self.variables.len(),
                    "recording started"
                );
                Ok(())
            }
            RecorderMode::Replay => {
                let file = File::open(path).map_err(|source| RecorderError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
                self.source = Some(self.open_source(path, file)?);
                self.path = Some(path.to_path_buf());
                self.interval = interval;

                match self.read_sample() {
                    Ok(Some(sample)) => {
                        for (var, value) in self.variables.iter().zip(&sample.values) {
                            var.init(*value);
                        }
                        self.time = sample.time;
                        self.prev = Some(sample.clone());
                        self.next = Some(sample);
                        self.active = true;
                        info!(path = %path.display(), "replay started");
                    }
                    Ok(None) => {
                        warn!(path = %path.display(), "replay file holds no samples");
                    }
                    Err(RecorderError::MalformedRow { line, reason }) => {
                        warn!(path = %path.display(), line, %reason, "replay file starts with a malformed row");
                    }
                    Err(e) => return Err(e),
                }
                Ok(())
            }
        }
    }

    /// Advance the session clock by `dt` seconds.
    pub fn step(&mut self, dt: f64) -> Result<(), RecorderError> {
        if !self.active {
            return Ok(());
        }
        match self.mode {
            RecorderMode::Record => self.step_record(dt),
            RecorderMode::Replay => self.step_replay(dt),
            RecorderMode::Disabled => Ok(()),
        }
    }

    /// Flush and close the session. Registered variables are kept.
    pub fn finalize(&mut self) -> Result<(), RecorderError> {
        if self.is_open() {
            info!(
                mode = ?self.mode,
                records = self.records,
                time = self.time,
                "recorder session closed"
            );
        }
        self.close()
    }

    pub fn mode(&self) -> RecorderMode {
        self.mode
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True while rows are being written or read
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_replaying(&self) -> bool {
        self.active && self.mode == RecorderMode::Replay
    }

    /// True from `initialize` until `finalize`, even after a replay ran out
    pub fn is_open(&self) -> bool {
        self.writer.is_some() || self.source.is_some()
    }

    /// Rows written in record mode or consumed in replay mode. Kept after the
    /// session closes, until the next `initialize`.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn close(&mut self) -> Result<(), RecorderError> {
        self.active = false;
        self.source = None;
        self.prev = None;
        self.next = None;
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn header(&self) -> String {
        let mut header = format!("\"{}\"", TIME_COLUMN);
        for var in &self.variables {
            header.push(SEPARATOR);
            header.push('"');
            header.push_str(var.name());
            header.push('"');
        }
        header
    }

    fn open_source(&self, path: &Path, file: File) -> Result<ReplaySource, RecorderError> {
        let mut lines = BufReader::new(file).lines();
        let header = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(RecorderError::MissingHeader {
                    path: path.to_path_buf(),
                })
            }
        };
        let names: Vec<&str> = header
            .split(SEPARATOR)
            .map(|field| field.trim().trim_matches('"'))
            .collect();

        let find = |name: &str| {
            names
                .iter()
                .position(|column| *column == name)
                .ok_or_else(|| RecorderError::MissingColumn {
                    path: path.to_path_buf(),
                    name: name.to_string(),
                })
        };

        let time_column = find(TIME_COLUMN)?;
        let columns = self
            .variables
            .iter()
            .map(|var| find(var.name()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReplaySource {
            lines,
            line: 1,
            width: names.len(),
            time_column,
            columns,
        })
    }

    fn read_sample(&mut self) -> Result<Option<Sample>, RecorderError> {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };

        let line = loop {
            match source.lines.next() {
                None => return Ok(None),
                Some(line) => {
                    source.line += 1;
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
            }
        };

        let fields: Vec<&str> = line.split(SEPARATOR).collect();
        if fields.len() != source.width {
            return Err(RecorderError::MalformedRow {
                line: source.line,
                reason: format!("expected {} fields, found {}", source.width, fields.len()),
            });
        }

        let time = fields[source.time_column]
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite())
            .ok_or_else(|| RecorderError::MalformedRow {
                line: source.line,
                reason: format!("invalid timestamp '{}'", fields[source.time_column]),
            })?;

        let mut values = Vec::with_capacity(self.variables.len());
        for (var, &column) in self.variables.iter().zip(&source.columns) {
            let value = var.read(fields[column]).ok_or_else(|| RecorderError::MalformedRow {
                line: source.line,
                reason: format!("invalid value '{}' for {}", fields[column], var.describe()),
            })?;
            values.push(value);
        }

        self.records += 1;
        Ok(Some(Sample { time, values }))
    }

    fn step_record(&mut self, dt: f64) -> Result<(), RecorderError> {
        if self.records == 0 {
            self.write_row()?;
        }

        self.time += dt;
        self.elapsed += dt;
        if self.elapsed >= self.interval - TIME_EPSILON {
            self.write_row()?;
            self.elapsed -= self.interval;
            if self.elapsed >= self.interval {
                self.elapsed %= self.interval;
            }
        }
        Ok(())
    }

    fn write_row(&mut self) -> Result<(), RecorderError> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        let mut row = format!("{:.6}", self.time);
        for var in &self.variables {
            row.push(SEPARATOR);
            var.write(&mut row);
        }
        writeln!(writer, "{}", row)?;
        self.records += 1;
        Ok(())
    }

    fn step_replay(&mut self, dt: f64) -> Result<(), RecorderError> {
        self.time += dt;

        loop {
            let next_time = match &self.next {
                Some(next) => next.time,
                None => return Ok(()),
            };
            if next_time > self.time {
                break;
            }

            match self.read_sample() {
                Ok(Some(sample)) => {
                    if sample.time < next_time {
                        let line = self.source.as_ref().map_or(0, |s| s.line);
                        self.end_replay();
                        return Err(RecorderError::NonMonotonic {
                            line,
                            previous: next_time,
                            time: sample.time,
                        });
                    }
                    self.prev = self.next.replace(sample);
                }
                Ok(None) => {
                    self.end_replay();
                    info!(records = self.records, time = self.time, "replay reached end of file");
                    return Ok(());
                }
                Err(RecorderError::MalformedRow { line, reason }) => {
                    self.end_replay();
                    warn!(line, %reason, "replay stopped at malformed row");
                    return Ok(());
                }
                Err(e) => {
                    self.end_replay();
                    return Err(e);
                }
            }
        }

        if let (Some(prev), Some(next)) = (&self.prev, &self.next) {
            let span = next.time - prev.time;
            let fraction = if span > 0.0 {
                ((self.time - prev.time) / span).clamp(0.0, 1.0)
            } else {
                1.0
            };
            for (i, var) in self.variables.iter().enumerate() {
                var.interpolate(prev.values[i], next.values[i], fraction);
            }
            debug!(time = self.time, fraction, "replay interpolated");
        }
        Ok(())
    }

    /// Leave the bindings on the last good sample and stop replaying
    fn end_replay(&mut self) {
        if let Some(last) = &self.next {
            for (var, value) in self.variables.iter().zip(&last.values) {
                var.init(*value);
            }
        }
        self.active = false;
    }
}
