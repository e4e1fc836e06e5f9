//! Reporting hooks.
//!
//! Every classified outcome is handed to a [`Listener`]; the pipeline never
//! decides what is worth printing. Hooks default to no-ops so a listener
//! only implements what it cares about.

use comfy_table::Table;
use log::{info, warn};

use crate::fuzzer::analysis::{ExecRecord, OutputBucket};

pub trait Listener {
    fn iteration_started(&mut self, _iteration: usize) {}

    fn mutation_failed(&mut self) {}

    fn host_verification_failed(&mut self) {}

    fn target_verification_failed(&mut self, _backend: &str) {}

    /// Raw divergence, reported before the self-divergence and
    /// architecture-split checks refine it.
    fn divergence(&mut self, _buckets: &[OutputBucket]) {}

    fn timeouts(&mut self, _timed_out: &[String], _completed: &[String]) {}

    fn self_divergence(&mut self) {}

    fn architecture_split(&mut self, _buckets: &[OutputBucket]) {}

    fn unclassified_divergence(&mut self, _buckets: &[OutputBucket]) {}

    fn success(&mut self) {}

    fn dump_output(&mut self, _records: &[ExecRecord]) {}

    /// Called once after the last iteration.
    fn finished(&mut self) {}
}

/// Default listener: everything goes through the `log` facade.
#[derive(Default)]
pub struct LogListener;

fn log_buckets(buckets: &[OutputBucket]) {
    for (i, bucket) in buckets.iter().enumerate() {
        let backends: Vec<&str> = bucket.backends.iter().map(|(n, _)| n.as_str()).collect();
        info!("  bucket {}: [{}] => {:?}", i, backends.join(", "), bucket.output);
    }
}

impl Listener for LogListener {
    fn iteration_started(&mut self, iteration: usize) {
        info!("--- iteration {} ---", iteration);
    }

    fn mutation_failed(&mut self) {
        warn!("mutation could not be committed, skipping iteration");
    }

    fn host_verification_failed(&mut self) {
        info!("host pre-verification failed, skipping target execution");
    }

    fn target_verification_failed(&mut self, backend: &str) {
        info!("{} rejected the program in bytecode verification", backend);
    }

    fn divergence(&mut self, buckets: &[OutputBucket]) {
        warn!("divergence across {} output buckets:", buckets.len());
        log_buckets(buckets);
    }

    fn timeouts(&mut self, timed_out: &[String], completed: &[String]) {
        warn!(
            "timed out: [{}]; completed: [{}]",
            timed_out.join(", "),
            completed.join(", ")
        );
    }

    fn self_divergence(&mut self) {
        warn!("golden backend disagreed with itself - nondeterminism, not a bug");
    }

    fn architecture_split(&mut self, buckets: &[OutputBucket]) {
        warn!("divergence splits exactly along architecture lines:");
        log_buckets(buckets);
    }

    fn unclassified_divergence(&mut self, buckets: &[OutputBucket]) {
        warn!("unclassified divergence:");
        log_buckets(buckets);
    }

    fn success(&mut self) {
        info!("all backends agreed");
    }

    fn dump_output(&mut self, records: &[ExecRecord]) {
        for record in records {
            info!("{} output: {:?}", record.name, record.output);
        }
    }
}

/// Append-only counters, printed as a table at shutdown.
#[derive(Default)]
pub struct StatsListener {
    pub iterations: u64,
    pub mutation_failures: u64,
    pub host_verification_failures: u64,
    pub target_verification_failures: u64,
    pub timeouts: u64,
    pub self_divergences: u64,
    pub architecture_splits: u64,
    pub unclassified_divergences: u64,
    pub successes: u64,
}

impl StatsListener {
    pub fn summary_table(&self) -> Table {
        let mut table = Table::new();
        table.set_header(["Outcome", "Count"]);
        for (name, count) in [
            ("iterations", self.iterations),
            ("successes", self.successes),
            ("mutation failures", self.mutation_failures),
            ("host verification failures", self.host_verification_failures),
            ("target verification failures", self.target_verification_failures),
            ("timeouts", self.timeouts),
            ("self-divergences", self.self_divergences),
            ("architecture splits", self.architecture_splits),
            ("unclassified divergences", self.unclassified_divergences),
        ] {
            table.add_row([name.to_string(), count.to_string()]);
        }
        table
    }
}

impl Listener for StatsListener {
    fn iteration_started(&mut self, _iteration: usize) {
        self.iterations += 1;
    }

    fn mutation_failed(&mut self) {
        self.mutation_failures += 1;
    }

    fn host_verification_failed(&mut self) {
        self.host_verification_failures += 1;
    }

    fn target_verification_failed(&mut self, _backend: &str) {
        self.target_verification_failures += 1;
    }

    fn timeouts(&mut self, _timed_out: &[String], _completed: &[String]) {
        self.timeouts += 1;
    }

    fn self_divergence(&mut self) {
        self.self_divergences += 1;
    }

    fn architecture_split(&mut self, _buckets: &[OutputBucket]) {
        self.architecture_splits += 1;
    }

    fn unclassified_divergence(&mut self, _buckets: &[OutputBucket]) {
        self.unclassified_divergences += 1;
    }

    fn success(&mut self) {
        self.successes += 1;
    }

    fn finished(&mut self) {
        println!("{}", self.summary_table());
    }
}

/// Fans every hook out to a list of listeners in order.
#[derive(Default)]
pub struct MultiListener {
    listeners: Vec<Box<dyn Listener>>,
}

impl MultiListener {
    pub fn new(listeners: Vec<Box<dyn Listener>>) -> MultiListener {
        MultiListener { listeners }
    }

    pub fn push(&mut self, listener: Box<dyn Listener>) {
        self.listeners.push(listener);
    }
}

macro_rules! fan_out {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        for listener in &mut $self.listeners {
            listener.$method($($arg),*);
        }
    };
}

impl Listener for MultiListener {
    fn iteration_started(&mut self, iteration: usize) {
        fan_out!(self, iteration_started, iteration);
    }

    fn mutation_failed(&mut self) {
        fan_out!(self, mutation_failed);
    }

    fn host_verification_failed(&mut self) {
        fan_out!(self, host_verification_failed);
    }

    fn target_verification_failed(&mut self, backend: &str) {
        fan_out!(self, target_verification_failed, backend);
    }

    fn divergence(&mut self, buckets: &[OutputBucket]) {
        fan_out!(self, divergence, buckets);
    }

    fn timeouts(&mut self, timed_out: &[String], completed: &[String]) {
        fan_out!(self, timeouts, timed_out, completed);
    }

    fn self_divergence(&mut self) {
        fan_out!(self, self_divergence);
    }

    fn architecture_split(&mut self, buckets: &[OutputBucket]) {
        fan_out!(self, architecture_split, buckets);
    }

    fn unclassified_divergence(&mut self, buckets: &[OutputBucket]) {
        fan_out!(self, unclassified_divergence, buckets);
    }

    fn success(&mut self) {
        fan_out!(self, success);
    }

    fn dump_output(&mut self, records: &[ExecRecord]) {
        fan_out!(self, dump_output, records);
    }

    fn finished(&mut self) {
        fan_out!(self, finished);
    }
}
