//! Benchmark Result Format
//!
//! JSON object mapping each swept parameter value to the mean of its
//! samples, e.g. `{"2":0.031,"4":0.045}`.
//! Keys keep sweep order. The file is always rewritten wholesale.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File extension of a persisted result
pub const EXTENSION: &str = "json";

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl FormatError {
    fn io(path: &Path, source: io::Error) -> Self {
        FormatError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Ordered mapping parameter value -> mean
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkResult {
    entries: Vec<(u64, f64)>,
}

impl BenchmarkResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mean, overwriting an existing entry in place
    pub fn insert(&mut self, parameter: u64, mean: f64) {
        match self.entries.iter_mut().find(|(p, _)| *p == parameter) {
            Some(entry) => entry.1 = mean,
            None => self.entries.push((parameter, mean)),
        }
    }

    pub fn get(&self, parameter: u64) -> Option<f64> {
        self.entries
            .iter()
            .find(|(p, _)| *p == parameter)
            .map(|(_, mean)| *mean)
    }

    pub fn entries(&self) -> &[(u64, f64)] {
        &self.entries
    }

    pub fn parameters(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().map(|(p, _)| *p)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, FormatError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Rewrite `path` with the full mapping.
    ///
    /// Written to a sibling temp file first and renamed over the target, so
    /// readers see either the previous snapshot or this one.
    pub fn write_snapshot(&self, path: &Path) -> Result<(), FormatError> {
        let bytes = self.to_json_bytes()?;
        let tmp_path = temp_path_for(path);

        let mut file = fs::File::create(&tmp_path).map_err(|e| FormatError::io(&tmp_path, e))?;
        file.write_all(&bytes)
            .and_then(|_| file.sync_all())
            .map_err(|e| FormatError::io(&tmp_path, e))?;
        drop(file);

        fs::rename(&tmp_path, path).map_err(|e| FormatError::io(path, e))
    }

    /// Load a persisted snapshot
    pub fn load(path: &Path) -> Result<Self, FormatError> {
        let bytes = fs::read(path).map_err(|e| FormatError::io(path, e))?;
        Self::from_json_bytes(&bytes)
    }

    /// Write `parameter,mean` rows with a header
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), FormatError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["parameter", "mean"])?;
        for (parameter, mean) in &self.entries {
            wtr.serialize((parameter, mean))?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

impl Serialize for BenchmarkResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (parameter, mean) in &self.entries {
            map.serialize_entry(&parameter.to_string(), mean)?;
        }
        map.end()
    }
}

struct ResultVisitor;

impl<'de> Visitor<'de> for ResultVisitor {
    type Value = BenchmarkResult;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of integer keys to numeric means")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut result = BenchmarkResult::new();
        while let Some((key, mean)) = access.next_entry::<String, f64>()? {
            let parameter: u64 = key
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid parameter key: {key:?}")))?;
            result.insert(parameter, mean);
        }
        Ok(result)
    }
}

impl<'de> Deserialize<'de> for BenchmarkResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ResultVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> BenchmarkResult {
        let mut r = BenchmarkResult::new();
        r.insert(2, 0.031);
        r.insert(4, 0.045);
        r.insert(16, 0.5);
        r
    }

    #[test]
    fn test_json_keeps_sweep_order() {
        let json = String::from_utf8(sample_result().to_json_bytes().unwrap()).unwrap();
        assert_eq!(json, r#"{"2":0.031,"4":0.045,"16":0.5}"#);
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut r = sample_result();
        r.insert(4, 1.0);
        assert_eq!(r.len(), 3);
        assert_eq!(r.get(4), Some(1.0));
        assert_eq!(r.parameters().collect::<Vec<_>>(), vec![2, 4, 16]);
    }

    #[test]
    fn test_parse_external_file() {
        let r = BenchmarkResult::from_json_bytes(br#"{"2": 0.031, "4": 0.045}"#).unwrap();
        assert_eq!(r.entries(), &[(2, 0.031), (4, 0.045)]);
    }

    #[test]
    fn test_rejects_non_integer_key() {
        assert!(BenchmarkResult::from_json_bytes(br#"{"two": 1.0}"#).is_err());
        assert!(BenchmarkResult::from_json_bytes(br#"[1.0]"#).is_err());
    }

    #[test]
    fn test_snapshot_overwrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("time-benchmark.json");

        let mut r = BenchmarkResult::new();
        r.insert(2, 1.5);
        r.write_snapshot(&path).unwrap();
        assert_eq!(BenchmarkResult::load(&path).unwrap().len(), 1);

        r.insert(4, 2.5);
        r.write_snapshot(&path).unwrap();
        let loaded = BenchmarkResult::load(&path).unwrap();
        assert_eq!(loaded, r);

        // no temp file left behind
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BenchmarkResult::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, FormatError::Io { .. }));
    }

    #[test]
    fn test_csv_export() {
        let mut out = Vec::new();
        sample_result().write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "parameter,mean\n2,0.031\n4,0.045\n16,0.5\n");
    }
}
