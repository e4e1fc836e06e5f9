//! The differential-fuzzing pipeline.
//!
//! One iteration walks load -> mutate -> save -> host pre-verification ->
//! execute-per-backend -> analyze -> cleanup, strictly in order: later steps
//! depend on artifacts the earlier ones produce. Iterations are independent
//! of each other; an outer driver may run several pipelines in parallel as
//! long as each gets its own `Fuzzer` (executors carry per-run state).

pub mod analysis;
pub mod listener;

use std::path::Path;
use std::time::{Duration, Instant};

use comfy_table::Table;

use crate::executors::{create_executor, Executor, ExecutorConfig};
use crate::fuzz_err;
use crate::mutation::Mutator;
use crate::options::Options;
use crate::rawdex::{save_program, ProgramFile};
use crate::{error::FuzzError, Result};

use self::analysis::{bucket_outputs, classify, Classification, ExecRecord, GoldenRerun};
use self::listener::Listener;

/// Where one iteration ended up. Everything except a fatal error is a normal
/// reportable outcome; the pipeline moves on to the next iteration.
#[derive(Clone, Debug, PartialEq)]
pub enum IterationOutcome {
    MutationFailed,
    HostVerificationFailed,
    TargetVerificationFailed(String),
    Classified(Classification),
}

/// Per-stage wall-clock accumulators. Append-only across iterations.
#[derive(Default)]
pub struct Timers {
    pub total: Duration,
    pub load: Duration,
    pub mutation: Duration,
    pub save: Duration,
    pub host_verification: Duration,
    pub execution: Duration,
    pub analysis: Duration,
}

impl Timers {
    pub fn summary_table(&self) -> Table {
        let mut table = Table::new();
        table.set_header(["Stage", "Time"]);
        for (name, duration) in [
            ("total", self.total),
            ("load", self.load),
            ("mutation", self.mutation),
            ("save", self.save),
            ("host verification", self.host_verification),
            ("execution", self.execution),
            ("analysis", self.analysis),
        ] {
            table.add_row([name.to_string(), format!("{:.3}s", duration.as_secs_f64())]);
        }
        table
    }
}

// Re-runs the golden backend against the saved program for the
// self-divergence check.
struct GoldenRerunner<'a> {
    executor: &'a mut dyn Executor,
    program: &'a Path,
}

impl GoldenRerun for GoldenRerunner<'_> {
    fn rerun(&mut self) -> String {
        self.executor.reset();
        self.executor.execute(self.program);
        self.executor.result().flattened_output()
    }
}

/// Sequential single-threaded driver for one stream of fuzzing iterations.
///
/// The first configured backend is the golden executor: it runs the host
/// pre-verification and the self-divergence re-runs.
pub struct Fuzzer {
    options: Options,
    executors: Vec<Box<dyn Executor>>,
    mutator: Box<dyn Mutator>,
    listener: Box<dyn Listener>,
    timers: Timers,
}

impl Fuzzer {
    /// Build a fuzzer with backends constructed from the options' registry
    /// pairings. A pairing with no registered constructor is fatal.
    pub fn new(
        options: Options,
        mutator: Box<dyn Mutator>,
        listener: Box<dyn Listener>,
    ) -> Result<Fuzzer> {
        options.validate()?;
        let config = ExecutorConfig {
            timeout: options.timeout(),
            execute_on_host: options.execute_on_host,
            device_name: options.device_name.clone(),
        };
        let mut executors = Vec::new();
        for (architecture, mode) in options.backend_pairings() {
            executors.push(create_executor(architecture, mode, &config)?);
        }
        Fuzzer::with_executors(options, executors, mutator, listener)
    }

    /// Build a fuzzer around pre-constructed backends.
    pub fn with_executors(
        options: Options,
        executors: Vec<Box<dyn Executor>>,
        mutator: Box<dyn Mutator>,
        listener: Box<dyn Listener>,
    ) -> Result<Fuzzer> {
        if executors.is_empty() {
            return fuzz_err!(NoBackends);
        }
        Ok(Fuzzer {
            options,
            executors,
            mutator,
            listener,
            timers: Timers::default(),
        })
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Run every configured iteration. Fatal errors abort the whole run;
    /// everything else is reported and the next iteration starts.
    pub fn run(&mut self) -> Result<()> {
        let start = Instant::now();
        for iteration in 0..self.options.iterations {
            self.listener.iteration_started(iteration);
            let outcome = self.fuzz_iteration();
            // Cleanup is unconditional: it runs on early aborts and ahead of
            // fatal-error propagation alike.
            for executor in &mut self.executors {
                executor.finished_with_program();
            }
            outcome?;
        }
        self.timers.total += start.elapsed();
        self.listener.finished();
        Ok(())
    }

    fn fuzz_iteration(&mut self) -> Result<IterationOutcome> {
        // Load. A missing or malformed input is fatal.
        let start = Instant::now();
        let mut program = ProgramFile::open(&self.options.input)?.load()?;
        self.timers.load += start.elapsed();

        // Mutate. A mutation that cannot be committed abandons the
        // iteration before anything executes.
        if !self.options.skip_mutation {
            let start = Instant::now();
            self.mutator.mutate(&mut program);
            let committed = self.mutator.update_binary(&mut program);
            self.timers.mutation += start.elapsed();
            if !committed {
                self.listener.mutation_failed();
                return Ok(IterationOutcome::MutationFailed);
            }
        }

        // Save, recomputing the container checksum. I/O failure is fatal.
        let start = Instant::now();
        save_program(&program, &self.options.output)?;
        self.timers.save += start.elapsed();

        let output_path = self.options.output.clone();

        // Host pre-verification on the golden backend: a malformed mutation
        // is usually caught here, before any target execution is paid for.
        if !self.options.skip_host_verify {
            let start = Instant::now();
            let verified = self.executors[0].verify_on_host(&output_path);
            self.timers.host_verification += start.elapsed();
            if !verified {
                self.listener.host_verification_failed();
                return Ok(IterationOutcome::HostVerificationFailed);
            }
        }

        // Execute sequentially across every backend. A target-verification
        // failure makes the remaining runs ill-defined, so they are skipped.
        let start = Instant::now();
        let mut records = Vec::with_capacity(self.executors.len());
        for executor in &mut self.executors {
            executor.reset();
            executor.prepare(&output_path)?;
            executor.execute(&output_path);
            if !executor.did_target_verify() {
                let name = executor.name();
                self.timers.execution += start.elapsed();
                self.listener.target_verification_failed(&name);
                return Ok(IterationOutcome::TargetVerificationFailed(name));
            }
            let result = executor.result();
            records.push(ExecRecord {
                name: executor.name(),
                architecture: executor.architecture(),
                output: result.flattened_output(),
                timed_out: result.timed_out,
            });
        }
        self.timers.execution += start.elapsed();

        if self.options.dump_output {
            self.listener.dump_output(&records);
        }

        // Analyze. Raw divergences are reported before the classification
        // checks refine them.
        let start = Instant::now();
        if !records.iter().any(|r| r.timed_out) {
            let raw = bucket_outputs(&records);
            if raw.len() > 1 {
                self.listener.divergence(&raw);
            }
        }

        let mut buckets = Vec::new();
        let classification = {
            let mut golden = GoldenRerunner {
                executor: self.executors[0].as_mut(),
                program: &output_path,
            };
            classify(
                &records,
                self.options.divergence_retry,
                &mut golden,
                &mut buckets,
            )
        };
        self.timers.analysis += start.elapsed();

        match &classification {
            Classification::Consistent => self.listener.success(),
            Classification::Timeout {
                timed_out,
                completed,
            } => self.listener.timeouts(timed_out, completed),
            Classification::SelfDivergent => self.listener.self_divergence(),
            Classification::ArchSplit => self.listener.architecture_split(&buckets),
            Classification::Divergent => self.listener.unclassified_divergence(&buckets),
        }
        Ok(IterationOutcome::Classified(classification))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use super::*;
    use crate::executors::{Architecture, ExecMode, ExecutionResult};
    use crate::mutation::{ConstTweaker, Mutator};
    use crate::rawdex::Program;

    #[derive(Default)]
    struct StubState {
        executions: usize,
        resets: usize,
        finished: usize,
    }

    struct StubExecutor {
        name: String,
        architecture: Architecture,
        // Output of the n-th execution; the last entry repeats.
        outputs: Vec<&'static str>,
        timed_out: bool,
        verifies: bool,
        host_verifies: bool,
        state: Rc<RefCell<StubState>>,
        result: ExecutionResult,
    }

    impl StubExecutor {
        fn new(name: &str, architecture: Architecture, outputs: Vec<&'static str>) -> StubExecutor {
            StubExecutor {
                name: name.to_string(),
                architecture,
                outputs,
                timed_out: false,
                verifies: true,
                host_verifies: true,
                state: Rc::default(),
                result: ExecutionResult::default(),
            }
        }

        fn state(&self) -> Rc<RefCell<StubState>> {
            Rc::clone(&self.state)
        }
    }

    impl Executor for StubExecutor {
        fn name(&self) -> String {
            self.name.clone()
        }

        fn architecture(&self) -> Architecture {
            self.architecture
        }

        fn mode(&self) -> ExecMode {
            ExecMode::Optimizing
        }

        fn reset(&mut self) {
            self.state.borrow_mut().resets += 1;
            self.result = ExecutionResult::default();
        }

        fn prepare(&mut self, _program: &Path) -> Result<()> {
            Ok(())
        }

        fn execute(&mut self, _program: &Path) {
            let mut state = self.state.borrow_mut();
            let output = self.outputs[state.executions.min(self.outputs.len() - 1)];
            state.executions += 1;
            self.result = ExecutionResult {
                output: vec![output.to_string()],
                timed_out: self.timed_out,
                return_code: Some(0),
            };
        }

        fn did_target_verify(&self) -> bool {
            self.verifies
        }

        fn result(&self) -> &ExecutionResult {
            &self.result
        }

        fn verify_on_host(&mut self, _program: &Path) -> bool {
            self.host_verifies
        }

        fn finished_with_program(&mut self) {
            self.state.borrow_mut().finished += 1;
        }
    }

    type Events = Rc<RefCell<Vec<String>>>;

    struct RecordingListener {
        events: Events,
    }

    impl RecordingListener {
        fn log(&mut self, event: impl Into<String>) {
            self.events.borrow_mut().push(event.into());
        }
    }

    impl Listener for RecordingListener {
        fn mutation_failed(&mut self) {
            self.log("mutation_failed");
        }

        fn host_verification_failed(&mut self) {
            self.log("host_verification_failed");
        }

        fn target_verification_failed(&mut self, backend: &str) {
            self.log(format!("target_verification_failed({})", backend));
        }

        fn divergence(&mut self, buckets: &[analysis::OutputBucket]) {
            self.log(format!("divergence({})", buckets.len()));
        }

        fn timeouts(&mut self, timed_out: &[String], _completed: &[String]) {
            self.log(format!("timeouts({})", timed_out.join(",")));
        }

        fn self_divergence(&mut self) {
            self.log("self_divergence");
        }

        fn architecture_split(&mut self, _buckets: &[analysis::OutputBucket]) {
            self.log("architecture_split");
        }

        fn unclassified_divergence(&mut self, _buckets: &[analysis::OutputBucket]) {
            self.log("unclassified_divergence");
        }

        fn success(&mut self) {
            self.log("success");
        }
    }

    struct FailingMutator;

    impl Mutator for FailingMutator {
        fn mutate(&mut self, _program: &mut Program) {}

        fn update_binary(&mut self, _program: &mut Program) -> bool {
            false
        }
    }

    struct Fixture {
        input: PathBuf,
        output: PathBuf,
    }

    impl Fixture {
        fn new(name: &str) -> Fixture {
            let dir = std::env::temp_dir();
            let tag = format!("dexfuzz-pipeline-{}-{}", std::process::id(), name);
            let input = dir.join(format!("{}.seed", tag));
            let output = dir.join(format!("{}.out", tag));
            // const/4 v1, #0; const/16 v0, #0; return-void
            let program =
                Program::decode(&[0x12, 0x01, 0x13, 0x00, 0x00, 0x00, 0x0e, 0x00]).unwrap();
            save_program(&program, &input).unwrap();
            Fixture { input, output }
        }

        fn options(&self, iterations: usize) -> Options {
            Options {
                input: self.input.clone(),
                output: self.output.clone(),
                iterations,
                skip_host_verify: false,
                divergence_retry: 3,
                ..Options::default()
            }
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            std::fs::remove_file(&self.input).ok();
            std::fs::remove_file(&self.output).ok();
        }
    }

    fn run_pipeline(
        fixture: &Fixture,
        executors: Vec<Box<dyn Executor>>,
        mutator: Box<dyn Mutator>,
    ) -> Events {
        let events: Events = Rc::default();
        let listener = RecordingListener {
            events: Rc::clone(&events),
        };
        let mut fuzzer = Fuzzer::with_executors(
            fixture.options(1),
            executors,
            mutator,
            Box::new(listener),
        )
        .unwrap();
        fuzzer.run().unwrap();
        events
    }

    #[test]
    fn test_consistent_iteration() {
        let fixture = Fixture::new("consistent");
        let a = StubExecutor::new("arm opt", Architecture::Arm, vec!["ok"]);
        let b = StubExecutor::new("arm64 opt", Architecture::Arm64, vec!["ok"]);
        let (sa, sb) = (a.state(), b.state());

        let events = run_pipeline(
            &fixture,
            vec![Box::new(a), Box::new(b)],
            Box::new(ConstTweaker::new(7)),
        );
        assert_eq!(*events.borrow(), vec!["success".to_string()]);
        // Both backends ran once and were cleaned up.
        assert_eq!(sa.borrow().executions, 1);
        assert_eq!(sb.borrow().executions, 1);
        assert_eq!(sa.borrow().finished, 1);
        assert_eq!(sb.borrow().finished, 1);
    }

    #[test]
    fn test_mutation_failure_abandons_before_execution() {
        let fixture = Fixture::new("mutation-fail");
        let a = StubExecutor::new("arm opt", Architecture::Arm, vec!["ok"]);
        let state = a.state();

        let events = run_pipeline(&fixture, vec![Box::new(a)], Box::new(FailingMutator));
        assert_eq!(*events.borrow(), vec!["mutation_failed".to_string()]);
        assert_eq!(state.borrow().executions, 0);
        // Cleanup still ran.
        assert_eq!(state.borrow().finished, 1);
    }

    #[test]
    fn test_host_verification_failure_skips_targets() {
        let fixture = Fixture::new("host-fail");
        let mut golden = StubExecutor::new("arm opt", Architecture::Arm, vec!["ok"]);
        golden.host_verifies = false;
        let other = StubExecutor::new("arm64 opt", Architecture::Arm64, vec!["ok"]);
        let (sg, so) = (golden.state(), other.state());

        let events = run_pipeline(
            &fixture,
            vec![Box::new(golden), Box::new(other)],
            Box::new(ConstTweaker::new(7)),
        );
        assert_eq!(*events.borrow(), vec!["host_verification_failed".to_string()]);
        assert_eq!(sg.borrow().executions, 0);
        assert_eq!(so.borrow().executions, 0);
    }

    #[test]
    fn test_target_verification_failure_aborts_remaining_backends() {
        let fixture = Fixture::new("target-fail");
        let a = StubExecutor::new("arm opt", Architecture::Arm, vec!["ok"]);
        let mut b = StubExecutor::new("arm int", Architecture::Arm, vec!["ok"]);
        b.verifies = false;
        let c = StubExecutor::new("arm64 opt", Architecture::Arm64, vec!["ok"]);
        let (sb, sc) = (b.state(), c.state());

        let events = run_pipeline(
            &fixture,
            vec![Box::new(a), Box::new(b), Box::new(c)],
            Box::new(ConstTweaker::new(7)),
        );
        assert_eq!(
            *events.borrow(),
            vec!["target_verification_failed(arm int)".to_string()]
        );
        assert_eq!(sb.borrow().executions, 1);
        assert_eq!(sc.borrow().executions, 0);
        assert_eq!(sc.borrow().finished, 1);
    }

    #[test]
    fn test_timeout_skips_divergence_analysis() {
        let fixture = Fixture::new("timeout");
        let golden = StubExecutor::new("arm opt", Architecture::Arm, vec!["X"]);
        let mut slow = StubExecutor::new("arm64 opt", Architecture::Arm64, vec!["Y"]);
        slow.timed_out = true;
        let sg = golden.state();

        let events = run_pipeline(
            &fixture,
            vec![Box::new(golden), Box::new(slow)],
            Box::new(ConstTweaker::new(7)),
        );
        assert_eq!(*events.borrow(), vec!["timeouts(arm64 opt)".to_string()]);
        // The golden backend was never re-run for a self-divergence check.
        assert_eq!(sg.borrow().executions, 1);
    }

    #[test]
    fn test_self_divergence_reported_after_raw_divergence() {
        let fixture = Fixture::new("self-divergent");
        // First run X, then X on the first re-run, then flips to Y.
        let golden = StubExecutor::new("arm opt", Architecture::Arm, vec!["X", "X", "Y"]);
        let other = StubExecutor::new("arm64 opt", Architecture::Arm64, vec!["Z"]);

        let events = run_pipeline(
            &fixture,
            vec![Box::new(golden), Box::new(other)],
            Box::new(ConstTweaker::new(7)),
        );
        assert_eq!(
            *events.borrow(),
            vec!["divergence(2)".to_string(), "self_divergence".to_string()]
        );
    }

    #[test]
    fn test_architecture_split_with_stable_golden() {
        let fixture = Fixture::new("arch-split");
        let golden = StubExecutor::new("arm opt", Architecture::Arm, vec!["X"]);
        let other = StubExecutor::new("arm64 opt", Architecture::Arm64, vec!["Y"]);

        let events = run_pipeline(
            &fixture,
            vec![Box::new(golden), Box::new(other)],
            Box::new(ConstTweaker::new(7)),
        );
        assert_eq!(
            *events.borrow(),
            vec!["divergence(2)".to_string(), "architecture_split".to_string()]
        );
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let fixture = Fixture::new("missing-input");
        let mut options = fixture.options(1);
        options.input = PathBuf::from("/nonexistent/seed.prog");
        let executor = StubExecutor::new("arm opt", Architecture::Arm, vec!["ok"]);
        let state = executor.state();

        let mut fuzzer = Fuzzer::with_executors(
            options,
            vec![Box::new(executor)],
            Box::new(ConstTweaker::new(7)),
            Box::new(listener::LogListener),
        )
        .unwrap();
        assert!(matches!(fuzzer.run(), Err(FuzzError::Io(_))));
        // Cleanup ran even though the iteration died in load.
        assert_eq!(state.borrow().finished, 1);
    }

    #[test]
    fn test_no_backends_is_fatal() {
        let fixture = Fixture::new("no-backends");
        assert!(matches!(
            Fuzzer::with_executors(
                fixture.options(1),
                Vec::new(),
                Box::new(ConstTweaker::new(7)),
                Box::new(listener::LogListener),
            ),
            Err(FuzzError::NoBackends)
        ));
    }

    #[test]
    fn test_skip_mutation_passthrough() {
        let fixture = Fixture::new("skip-mutation");
        let mut options = fixture.options(1);
        options.skip_mutation = true;
        let executor = StubExecutor::new("arm opt", Architecture::Arm, vec!["ok"]);

        let events: Events = Rc::default();
        let listener = RecordingListener {
            events: Rc::clone(&events),
        };
        let mut fuzzer = Fuzzer::with_executors(
            options,
            vec![Box::new(executor)],
            // Would abandon the iteration if mutation ran.
            Box::new(FailingMutator),
            Box::new(listener),
        )
        .unwrap();
        fuzzer.run().unwrap();
        assert_eq!(*events.borrow(), vec!["success".to_string()]);

        // The saved file is a faithful copy of the seed stream.
        let reloaded = ProgramFile::open(&fixture.output).unwrap().load().unwrap();
        assert_eq!(
            reloaded.encode(),
            ProgramFile::open(&fixture.input).unwrap().load().unwrap().encode()
        );
    }
}
