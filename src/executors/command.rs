//! Command-driven backend execution.
//!
//! Each backend invocation is a separate out-of-process run with an
//! enforced wall-clock timeout. Stdout and stderr are drained by reader
//! threads so a chatty child can never fill its pipe and stall.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::{Architecture, ExecMode, ExecutionResult, Executor, ExecutorConfig};
use crate::Result;

// Markers the VM prints when the mutated bytecode fails its verifier.
const VERIFY_FAILURE_MARKERS: &[&str] = &["VerifyError", "Verification failed", "VFY:"];

const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct CommandExecutor {
    architecture: Architecture,
    mode: ExecMode,
    timeout: Duration,
    execute_on_host: bool,
    device_name: Option<String>,
    result: ExecutionResult,
}

impl CommandExecutor {
    pub fn new(architecture: Architecture, mode: ExecMode, config: &ExecutorConfig) -> Self {
        CommandExecutor {
            architecture,
            mode,
            timeout: config.timeout,
            execute_on_host: config.execute_on_host,
            device_name: config.device_name.clone(),
            result: ExecutionResult::default(),
        }
    }

    fn vm_binary(&self) -> &'static str {
        if self.architecture.is_64bit() {
            "dalvikvm64"
        } else {
            "dalvikvm32"
        }
    }

    fn vm_command(&self, program: &Path) -> Command {
        let mut command = if self.execute_on_host {
            Command::new(self.vm_binary())
        } else {
            // Remote execution goes through the device bridge; the bridge
            // binary and device selection stay outside this crate's scope.
            let mut c = Command::new("adb");
            if let Some(device) = &self.device_name {
                c.arg("-s").arg(device);
            }
            c.arg("shell").arg(self.vm_binary());
            c
        };
        match self.mode {
            ExecMode::Optimizing => {
                command
                    .arg("-Xcompiler-option")
                    .arg("--compiler-backend=Optimizing");
            }
            ExecMode::Interpreter => {
                command.arg("-Xint");
            }
        }
        command
            .arg("-Xcompiler-option")
            .arg(format!("--instruction-set={}", self.architecture.isa_name()))
            .arg("-cp")
            .arg(program)
            .arg("Main");
        command
    }

    fn run_with_timeout(&self, command: &mut Command) -> ExecutionResult {
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        debug!("{}: running {:?}", self.name(), command);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("{}: failed to spawn backend: {}", self.name(), e);
                return ExecutionResult {
                    output: vec![format!("spawn failure: {}", e)],
                    timed_out: false,
                    return_code: None,
                };
            }
        };

        let stdout = consume_stream(child.stdout.take());
        let stderr = consume_stream(child.stderr.take());

        let (status, timed_out) = wait_with_timeout(&mut child, self.timeout);

        let mut output = stdout.join().unwrap_or_default();
        output.extend(stderr.join().unwrap_or_default());
        ExecutionResult {
            output,
            timed_out,
            return_code: status,
        }
    }
}

fn consume_stream<R: Read + Send + 'static>(
    stream: Option<R>,
) -> thread::JoinHandle<Vec<String>> {
    thread::spawn(move || match stream {
        Some(stream) => BufReader::new(stream)
            .lines()
            .map_while(|line| line.ok())
            .collect(),
        None => Vec::new(),
    })
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> (Option<i32>, bool) {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return (status.code(), false),
            Ok(None) => {
                if Instant::now() >= deadline {
                    child.kill().ok();
                    child.wait().ok();
                    return (None, true);
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                warn!("wait on backend failed: {}", e);
                return (None, false);
            }
        }
    }
}

impl Executor for CommandExecutor {
    fn name(&self) -> String {
        format!("{:?} {:?}", self.architecture, self.mode)
    }

    fn architecture(&self) -> Architecture {
        self.architecture
    }

    fn mode(&self) -> ExecMode {
        self.mode
    }

    fn reset(&mut self) {
        self.result = ExecutionResult::default();
    }

    fn prepare(&mut self, program: &Path) -> Result<()> {
        // Host runs read the file in place; device pushes happen through
        // the bridge at execution time.
        if !program.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("program file {} missing", program.display()),
            )
            .into());
        }
        Ok(())
    }

    fn execute(&mut self, program: &Path) {
        let mut command = self.vm_command(program);
        self.result = self.run_with_timeout(&mut command);
    }

    fn did_target_verify(&self) -> bool {
        !self
            .result
            .output
            .iter()
            .any(|line| VERIFY_FAILURE_MARKERS.iter().any(|m| line.contains(m)))
    }

    fn result(&self) -> &ExecutionResult {
        &self.result
    }

    fn verify_on_host(&mut self, program: &Path) -> bool {
        let mut command = Command::new("dex2oat");
        command
            .arg(format!("--dex-file={}", program.display()))
            .arg(format!(
                "--instruction-set={}",
                self.architecture.isa_name()
            ))
            .arg("--oat-file=/dev/null");
        let result = self.run_with_timeout(&mut command);
        result.return_code == Some(0)
            && !result
                .output
                .iter()
                .any(|line| VERIFY_FAILURE_MARKERS.iter().any(|m| line.contains(m)))
    }

    fn finished_with_program(&mut self) {
        // Host artifacts are per-iteration temp files cleaned by the
        // pipeline; nothing stays resident on the backend side.
        debug!("{}: finished with program", self.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_executor(arch: Architecture, mode: ExecMode) -> CommandExecutor {
        CommandExecutor::new(arch, mode, &ExecutorConfig::default())
    }

    #[test]
    fn test_verify_failure_markers() {
        let mut executor = host_executor(Architecture::X86_64, ExecMode::Optimizing);
        executor.result = ExecutionResult {
            output: vec!["ok".to_string()],
            timed_out: false,
            return_code: Some(0),
        };
        assert!(executor.did_target_verify());

        executor.result.output.push("VFY: register mismatch".to_string());
        assert!(!executor.did_target_verify());
    }

    #[test]
    fn test_timeout_is_recorded_not_fatal() {
        let executor = host_executor(Architecture::X86, ExecMode::Interpreter);
        let mut command = Command::new("sleep");
        command.arg("5");
        let executor = CommandExecutor {
            timeout: Duration::from_millis(50),
            ..executor
        };
        let result = executor.run_with_timeout(&mut command);
        assert!(result.timed_out);
        assert_eq!(result.return_code, None);
    }

    #[test]
    fn test_output_collection() {
        let executor = host_executor(Architecture::X86_64, ExecMode::Interpreter);
        let mut command = Command::new("echo");
        command.arg("hello fuzzer");
        let result = executor.run_with_timeout(&mut command);
        assert!(!result.timed_out);
        assert_eq!(result.flattened_output(), "hello fuzzer");
    }
}
