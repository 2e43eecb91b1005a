//! Trajectory log.
//!
//! A fixed set of series, one entry per stored sample, appended in time
//! order. Nothing is ever removed.

use crate::{ResultsError, ResultsResult};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

/// A logged quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogField {
    /// Time (s)
    Time,
    /// Depth (m, negative downward)
    Depth,
    /// Vertical velocity (m/s)
    Velocity,
    /// Added volume (m³)
    Volume,
    /// Net force per unit mass (m/s²)
    Acceleration,
}

impl LogField {
    pub const ALL: [LogField; 5] = [
        LogField::Time,
        LogField::Depth,
        LogField::Velocity,
        LogField::Volume,
        LogField::Acceleration,
    ];

    /// Short series name, also used as the CSV column header.
    pub fn name(self) -> &'static str {
        match self {
            LogField::Time => "t",
            LogField::Depth => "z",
            LogField::Velocity => "w",
            LogField::Volume => "v",
            LogField::Acceleration => "dwdt",
        }
    }
}

impl FromStr for LogField {
    type Err = ResultsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "t" | "time" => Ok(LogField::Time),
            "z" | "depth" => Ok(LogField::Depth),
            "w" | "velocity" => Ok(LogField::Velocity),
            "v" | "volume" => Ok(LogField::Volume),
            "dwdt" | "acceleration" => Ok(LogField::Acceleration),
            _ => Err(ResultsError::UnknownField {
                name: s.to_string(),
            }),
        }
    }
}

/// One stored sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub t: f64,
    pub z: f64,
    pub w: f64,
    pub v: f64,
    pub dwdt: f64,
}

impl TrajectorySample {
    pub fn get(&self, field: LogField) -> f64 {
        match field {
            LogField::Time => self.t,
            LogField::Depth => self.z,
            LogField::Velocity => self.w,
            LogField::Volume => self.v,
            LogField::Acceleration => self.dwdt,
        }
    }
}

/// Column-oriented log of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrajectoryLog {
    t: Vec<f64>,
    z: Vec<f64>,
    w: Vec<f64>,
    v: Vec<f64>,
    dwdt: Vec<f64>,
}

impl TrajectoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample.
    pub fn store(&mut self, sample: TrajectorySample) {
        self.t.push(sample.t);
        self.z.push(sample.z);
        self.w.push(sample.w);
        self.v.push(sample.v);
        self.dwdt.push(sample.dwdt);
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// All stored values of `field`, oldest first.
    pub fn series(&self, field: LogField) -> &[f64] {
        match field {
            LogField::Time => &self.t,
            LogField::Depth => &self.z,
            LogField::Velocity => &self.w,
            LogField::Volume => &self.v,
            LogField::Acceleration => &self.dwdt,
        }
    }

    /// Series lookup by short or long name.
    pub fn series_by_name(&self, name: &str) -> ResultsResult<&[f64]> {
        Ok(self.series(name.parse()?))
    }

    pub fn sample(&self, i: usize) -> Option<TrajectorySample> {
        (i < self.len()).then(|| TrajectorySample {
            t: self.t[i],
            z: self.z[i],
            w: self.w[i],
            v: self.v[i],
            dwdt: self.dwdt[i],
        })
    }

    pub fn last(&self) -> Option<TrajectorySample> {
        self.len().checked_sub(1).and_then(|i| self.sample(i))
    }

    /// Samples in time order.
    pub fn samples(&self) -> impl Iterator<Item = TrajectorySample> + '_ {
        (0..self.len()).filter_map(|i| self.sample(i))
    }

    /// Write the log as CSV with a header row.
    pub fn write_csv<W: Write>(&self, mut out: W) -> ResultsResult<()> {
        let header: Vec<&str> = LogField::ALL.iter().map(|f| f.name()).collect();
        writeln!(out, "{}", header.join(","))?;
        for sample in self.samples() {
            let row: Vec<String> = LogField::ALL
                .iter()
                .map(|&f| sample.get(f).to_string())
                .collect();
            writeln!(out, "{}", row.join(","))?;
        }
        out.flush()?;
        Ok(())
    }

    /// Write one JSON object per sample.
    pub fn write_jsonl<W: Write>(&self, mut out: W) -> ResultsResult<()> {
        for sample in self.samples() {
            serde_json::to_writer(&mut out, &sample)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64) -> TrajectorySample {
        TrajectorySample {
            t,
            z: -t / 10.0,
            w: -0.1,
            v: 1e-5,
            dwdt: 0.0,
        }
    }

    #[test]
    fn field_names_parse() {
        for field in LogField::ALL {
            assert_eq!(field.name().parse::<LogField>().unwrap(), field);
        }
        assert_eq!("depth".parse::<LogField>().unwrap(), LogField::Depth);
        assert!(matches!(
            "rho".parse::<LogField>(),
            Err(ResultsError::UnknownField { .. })
        ));
    }

    #[test]
    fn series_stay_aligned() {
        let mut log = TrajectoryLog::new();
        for t in [0.0, 60.0, 120.0] {
            log.store(sample(t));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.series(LogField::Time), &[0.0, 60.0, 120.0]);
        assert_eq!(log.series_by_name("z").unwrap(), &[0.0, -6.0, -12.0]);
        assert_eq!(log.last(), Some(sample(120.0)));
        assert!(log.sample(3).is_none());
    }

    #[test]
    fn empty_log() {
        let log = TrajectoryLog::new();
        assert!(log.is_empty());
        assert!(log.last().is_none());
        assert_eq!(log.samples().count(), 0);
    }

    #[test]
    fn csv_output() {
        let mut log = TrajectoryLog::new();
        log.store(sample(0.0));
        log.store(sample(60.0));
        let mut buf = Vec::new();
        log.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "t,z,w,v,dwdt");
        assert_eq!(lines[2], "60,-6,-0.1,0.00001,0");
        assert_eq!(lines.len(), 3);
    }
}
