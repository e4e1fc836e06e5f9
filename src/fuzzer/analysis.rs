//! Divergence classification.
//!
//! The checks run cheapest-and-most-conclusive first: a timeout makes
//! output comparison meaningless, and backend self-nondeterminism has to be
//! ruled out before any architecture-level inference can be trusted - a
//! nondeterministic backend can coincidentally look architecture-correlated.

use crate::executors::Architecture;

/// What the analyzer needs to know about one backend's run.
#[derive(Clone, Debug)]
pub struct ExecRecord {
    pub name: String,
    pub architecture: Architecture,
    pub output: String,
    pub timed_out: bool,
}

/// One distinct output and the backends that produced it.
#[derive(Clone, Debug)]
pub struct OutputBucket {
    pub output: String,
    pub backends: Vec<(String, Architecture)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    /// All backends completed with identical output.
    Consistent,
    /// At least one backend hit the timeout; no output comparison was done.
    Timeout {
        timed_out: Vec<String>,
        completed: Vec<String>,
    },
    /// The golden executor disagreed with itself on re-runs: timing,
    /// threading or randomness, not a correctness bug.
    SelfDivergent,
    /// Exactly two buckets, each architecture-homogeneous, architectures
    /// differing. Still a real divergence, but a useful triage signal.
    ArchSplit,
    /// Divergence with no recognized shape.
    Divergent,
}

/// Re-runs the golden backend for the self-divergence check. The
/// implementation resets the backend between runs.
pub trait GoldenRerun {
    fn rerun(&mut self) -> String;
}

/// Group completed results by exact output, preserving first-seen order.
pub fn bucket_outputs(records: &[ExecRecord]) -> Vec<OutputBucket> {
    let mut buckets: Vec<OutputBucket> = Vec::new();
    for record in records {
        match buckets.iter_mut().find(|b| b.output == record.output) {
            Some(bucket) => bucket
                .backends
                .push((record.name.clone(), record.architecture)),
            None => buckets.push(OutputBucket {
                output: record.output.clone(),
                backends: vec![(record.name.clone(), record.architecture)],
            }),
        }
    }
    buckets
}

/// Golden executor output differs across re-runs?
pub fn is_self_divergent(golden: &mut dyn GoldenRerun, retries: usize) -> bool {
    let mut seen: Option<String> = None;
    for _ in 0..retries + 1 {
        let output = golden.rerun();
        match &seen {
            None => seen = Some(output),
            Some(first) if *first != output => return true,
            _ => {}
        }
    }
    false
}

/// A two-way split that aligns exactly with a two-way architecture split?
pub fn is_architecture_split(buckets: &[OutputBucket]) -> bool {
    if buckets.len() != 2 {
        return false;
    }
    let mut architectures = [Architecture::Arm; 2];
    for (i, bucket) in buckets.iter().enumerate() {
        let arch = bucket.backends[0].1;
        if bucket.backends.iter().any(|(_, a)| *a != arch) {
            return false;
        }
        architectures[i] = arch;
    }
    architectures[0] != architectures[1]
}

/// Classify one iteration's results. `buckets` is filled for the caller's
/// reporting whenever a divergence was observed.
pub fn classify(
    records: &[ExecRecord],
    divergence_retry: usize,
    golden: &mut dyn GoldenRerun,
    buckets_out: &mut Vec<OutputBucket>,
) -> Classification {
    let timed_out: Vec<String> = records
        .iter()
        .filter(|r| r.timed_out)
        .map(|r| r.name.clone())
        .collect();
    if !timed_out.is_empty() {
        let completed = records
            .iter()
            .filter(|r| !r.timed_out)
            .map(|r| r.name.clone())
            .collect();
        return Classification::Timeout {
            timed_out,
            completed,
        };
    }

    let buckets = bucket_outputs(records);
    if buckets.len() <= 1 {
        return Classification::Consistent;
    }
    *buckets_out = buckets;

    if is_self_divergent(golden, divergence_retry) {
        return Classification::SelfDivergent;
    }
    if is_architecture_split(buckets_out) {
        return Classification::ArchSplit;
    }
    Classification::Divergent
}
