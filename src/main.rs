use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use dexfuzz::executors::Architecture;
use dexfuzz::fuzzer::listener::{Listener, LogListener, MultiListener, StatsListener};
use dexfuzz::fuzzer::Fuzzer;
use dexfuzz::mutation::ConstTweaker;
use dexfuzz::options::Options;

#[derive(Parser, Debug)]
#[command(
    name = "dexfuzz",
    about = "Differential fuzzing of DEX bytecode across VM backends",
    version
)]
struct Cli {
    /// JSON options file; command-line flags override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed program consumed at the start of every iteration.
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Where the mutated program is written before execution.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Number of fuzzing iterations.
    #[arg(short = 'n', long)]
    iterations: Option<usize>,

    /// Per-backend execution timeout in seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Extra golden-executor runs in the self-divergence check.
    #[arg(long, value_name = "N")]
    divergence_retry: Option<usize>,

    /// Target architectures to fuzz.
    #[arg(long, value_enum, value_delimiter = ',')]
    arch: Vec<Architecture>,

    /// RNG seed for the mutation operator.
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the host pre-verification step.
    #[arg(long)]
    skip_host_verify: bool,

    /// Run the seed program unmodified (mutation passthrough).
    #[arg(long)]
    skip_mutation: bool,

    /// Log every backend's output for every iteration.
    #[arg(long)]
    dump_output: bool,

    /// Execute on a device through the bridge instead of on the host.
    #[arg(long, value_name = "DEVICE")]
    device: Option<String>,
}

impl Cli {
    fn into_options(self) -> Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::from_json_file(path)
                .with_context(|| format!("reading options from {}", path.display()))?,
            None => Options::default(),
        };
        if let Some(input) = self.input {
            options.input = input;
        }
        if let Some(output) = self.output {
            options.output = output;
        }
        if let Some(iterations) = self.iterations {
            options.iterations = iterations;
        }
        if let Some(timeout) = self.timeout {
            options.timeout_secs = timeout;
        }
        if let Some(retry) = self.divergence_retry {
            options.divergence_retry = retry;
        }
        if !self.arch.is_empty() {
            options.architectures = self.arch;
        }
        if let Some(seed) = self.seed {
            options.seed = seed;
        }
        if self.skip_host_verify {
            options.skip_host_verify = true;
        }
        if self.skip_mutation {
            options.skip_mutation = true;
        }
        if self.dump_output {
            options.dump_output = true;
        }
        if let Some(device) = self.device {
            options.execute_on_host = false;
            options.device_name = Some(device);
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Cli::parse().into_options()?;
    let mutator = Box::new(ConstTweaker::new(options.seed));
    let listener: Box<dyn Listener> = Box::new(MultiListener::new(vec![
        Box::new(LogListener),
        Box::<StatsListener>::default(),
    ]));

    let mut fuzzer = Fuzzer::new(options, mutator, listener).context("starting fuzzer")?;
    fuzzer.run().context("fuzzing run failed")?;
    println!("{}", fuzzer.timers().summary_table());
    Ok(())
}
