//! Sweep catalog
//!
//! The three benchmark sweeps run against the LRA simulator.

use crate::command::CommandTemplate;
use sim_output::LineIndex;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Rule deciding whether a parsed sample counts toward the quota
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    AcceptAny,
    /// Exactly 0.0 is a sensor artifact, not a measurement
    RejectZero,
}

impl Validity {
    pub fn accepts(self, sample: f64) -> bool {
        match self {
            Validity::AcceptAny => true,
            Validity::RejectZero => sample != 0.0,
        }
    }
}

/// One benchmark sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepDefinition {
    pub label: String,
    pub template: CommandTemplate,
    pub domain: Vec<u64>,
    pub line_index: LineIndex,
    pub validity: Validity,
    pub output_file: String, // stem, persisted as `<stem>.json`
}

impl SweepDefinition {
    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.{}", self.output_file, result_format::EXTENSION))
    }

    /// Expanded command for every sweep point, in order
    pub fn commands(&self) -> impl Iterator<Item = (u64, String)> + '_ {
        self.domain.iter().map(|&v| (v, self.template.expand(v)))
    }
}

/// Built-in sweeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepKind {
    Time,
    FailureRateSpeed,
    FailureRateNodes,
}

impl SweepKind {
    pub const ALL: [SweepKind; 3] = [
        SweepKind::Time,
        SweepKind::FailureRateSpeed,
        SweepKind::FailureRateNodes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SweepKind::Time => "time",
            SweepKind::FailureRateSpeed => "failure_rate_speed",
            SweepKind::FailureRateNodes => "failure_rate_nodes",
        }
    }

    pub fn definition(self) -> SweepDefinition {
        match self {
            // Delivery time of a single packet vs. network size
            SweepKind::Time => SweepDefinition {
                label: "Nodes".to_string(),
                template: CommandTemplate::new(
                    "lra-simulator --benchmark --duration=1500 --packets=1 --nodes={value}",
                ),
                domain: powers_of_two(1..=11),
                line_index: LineIndex(5),
                validity: Validity::RejectZero,
                output_file: "time-benchmark".to_string(),
            },
            SweepKind::FailureRateSpeed => SweepDefinition {
                label: "Speed".to_string(),
                template: CommandTemplate::new("lra-simulator --range=30 --nodes=30 --speed={value}"),
                domain: powers_of_two(0..=11),
                line_index: LineIndex::LAST,
                validity: Validity::AcceptAny,
                output_file: "speed-benchmark".to_string(),
            },
            SweepKind::FailureRateNodes => SweepDefinition {
                label: "Nodes".to_string(),
                template: CommandTemplate::new("lra-simulator --range=30 --speed=1.5 --nodes={value}"),
                domain: powers_of_two(1..=9),
                line_index: LineIndex::LAST,
                validity: Validity::AcceptAny,
                output_file: "nodes-benchmark".to_string(),
            },
        }
    }
}

impl fmt::Display for SweepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SweepKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SweepKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown sweep: {s}"))
    }
}

fn powers_of_two(exponents: RangeInclusive<u32>) -> Vec<u64> {
    exponents.map(|e| 1u64 << e).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(!Validity::RejectZero.accepts(0.0));
        assert!(!Validity::RejectZero.accepts(-0.0));
        assert!(Validity::RejectZero.accepts(0.001));
        assert!(Validity::AcceptAny.accepts(0.0));
    }

    #[test]
    fn test_time_sweep() {
        let def = SweepKind::Time.definition();
        assert_eq!(def.domain.first(), Some(&2));
        assert_eq!(def.domain.last(), Some(&2048));
        assert_eq!(def.domain.len(), 11);
        assert_eq!(def.line_index, LineIndex(5));
        assert_eq!(def.validity, Validity::RejectZero);
        assert_eq!(
            def.output_path(Path::new("out")),
            PathBuf::from("out/time-benchmark.json")
        );
    }

    #[test]
    fn test_failure_rate_sweeps_read_last_line() {
        let speed = SweepKind::FailureRateSpeed.definition();
        assert_eq!(speed.domain, powers_of_two(0..=11));
        assert_eq!(speed.domain[0], 1);
        assert_eq!(speed.line_index, LineIndex::LAST);
        assert_eq!(speed.validity, Validity::AcceptAny);

        let nodes = SweepKind::FailureRateNodes.definition();
        assert_eq!(nodes.domain, vec![2, 4, 8, 16, 32, 64, 128, 256, 512]);
        assert_eq!(nodes.output_file, "nodes-benchmark");
    }

    #[test]
    fn test_commands_follow_domain() {
        let def = SweepKind::FailureRateNodes.definition();
        let commands: Vec<_> = def.commands().take(2).collect();
        assert_eq!(
            commands,
            vec![
                (2, "lra-simulator --range=30 --speed=1.5 --nodes=2".to_string()),
                (4, "lra-simulator --range=30 --speed=1.5 --nodes=4".to_string()),
            ]
        );
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in SweepKind::ALL {
            assert_eq!(kind.name().parse::<SweepKind>(), Ok(kind));
        }
        assert!("throughput".parse::<SweepKind>().is_err());
    }
}
