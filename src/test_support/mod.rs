//! Test utilities and mocks for py2win unit tests.
//!
//! The pipeline talks to the outside world through two seams: the
//! [`CommandRunner`] trait for child processes and the [`Fetch`] trait for
//! HTTP. This module provides scripted implementations of both, plus
//! fixtures that build archives shaped like the CPython release artifacts.
//!
//! # Example
//!
//! ```rust,ignore
//! use py2win::test_support::{MockExecutor, MockProcessOutput};
//!
//! let mut exec = MockExecutor::new();
//! exec.expect_contains("-m pip install", MockProcessOutput::success(""));
//! exec.expect_pattern(
//!     CommandExpectation::new(CommandPattern::StartsWith("link".into()), MockProcessOutput::success(""))
//!         .creates("dist/sample-1.0/sample.exe"),
//! );
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Result};
use url::Url;

use crate::core::errors::BuildError;
use crate::sources::download::Fetch;
use crate::util::process::{CommandRunner, ProcessBuilder, ProcessOutput};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

impl From<MockProcessOutput> for ProcessOutput {
    fn from(output: MockProcessOutput) -> Self {
        ProcessOutput {
            code: Some(output.status),
            stdout: output.stdout.into_bytes(),
            stderr: output.stderr.into_bytes(),
        }
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Any => true,
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    /// Pattern to match against commands.
    pub pattern: CommandPattern,
    /// Output to return when matched.
    pub output: MockProcessOutput,
    /// Files written when matched, standing in for the command's outputs.
    pub creates: Vec<PathBuf>,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    /// Number of times this expectation has been used.
    pub used: usize,
}

impl CommandExpectation {
    /// Create a new expectation.
    pub fn new(pattern: CommandPattern, output: MockProcessOutput) -> Self {
        CommandExpectation {
            pattern,
            output,
            creates: Vec::new(),
            times: None,
            used: 0,
        }
    }

    /// Write an empty file at `path` whenever this expectation matches.
    pub fn creates(mut self, path: impl Into<PathBuf>) -> Self {
        self.creates.push(path.into());
        self
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    /// Check if this expectation can still be used.
    pub fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

/// Scripted [`CommandRunner`].
///
/// Commands are matched on [`ProcessBuilder::display_command`] against the
/// expectations in registration order; the first available match wins.
#[derive(Debug, Default)]
pub struct MockExecutor {
    expectations: Vec<CommandExpectation>,
    calls: Vec<String>,
    commands: Vec<ProcessBuilder>,
    default_output: Option<MockProcessOutput>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&mut self, cmd: &str, output: MockProcessOutput) -> &mut Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::Exact(cmd.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&mut self, prefix: &str, output: MockProcessOutput) -> &mut Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::StartsWith(prefix.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&mut self, substring: &str, output: MockProcessOutput) -> &mut Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::Contains(substring.to_string()),
            output,
        ))
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&mut self, expectation: CommandExpectation) -> &mut Self {
        self.expectations.push(expectation);
        self
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&mut self, output: MockProcessOutput) -> &mut Self {
        self.default_output = Some(output);
        self
    }

    /// Command lines of every call, in order.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Every executed command, for inspecting environment and cwd.
    pub fn commands(&self) -> &[ProcessBuilder] {
        &self.commands
    }

    /// Number of calls whose command line contains `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.calls.iter().filter(|c| c.contains(needle)).count()
    }

    /// Clear all recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
        self.commands.clear();
    }

    /// Verify that all expectations with a specific count were satisfied.
    pub fn verify(&self) -> Result<()> {
        for (i, exp) in self.expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    bail!(
                        "expectation {} was used {} times, expected {}",
                        i,
                        exp.used,
                        expected
                    );
                }
            }
        }
        Ok(())
    }
}

impl CommandRunner for MockExecutor {
    fn exec(&mut self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let full_cmd = cmd.display_command();
        self.calls.push(full_cmd.clone());
        self.commands.push(cmd.clone());

        for exp in &mut self.expectations {
            if exp.pattern.matches(&full_cmd) && exp.available() {
                exp.used += 1;
                for path in &exp.creates {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(path, b"")?;
                }
                return Ok(exp.output.clone().into());
            }
        }

        if let Some(ref default) = self.default_output {
            return Ok(default.clone().into());
        }

        bail!("unexpected command: {}", full_cmd)
    }
}

/// Mock HTTP response for testing downloads.
#[derive(Debug, Clone)]
pub struct MockHttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockHttpResponse {
    /// Create a successful response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        MockHttpResponse {
            status: 200,
            body: body.into(),
        }
    }

    /// Create a not found response.
    pub fn not_found() -> Self {
        MockHttpResponse {
            status: 404,
            body: b"Not Found".to_vec(),
        }
    }

    /// Create a server error response.
    pub fn server_error(message: &str) -> Self {
        MockHttpResponse {
            status: 500,
            body: message.as_bytes().to_vec(),
        }
    }

    /// Check if this is a successful response.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Scripted [`Fetch`] keyed by URL.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    responses: HashMap<String, MockHttpResponse>,
    default_response: Option<MockHttpResponse>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        MockHttpClient::default()
    }

    /// Add a response for a URL.
    pub fn mock_url(&mut self, url: &str, response: MockHttpResponse) -> &mut Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    /// Set a default response for unmatched URLs.
    pub fn set_default(&mut self, response: MockHttpResponse) -> &mut Self {
        self.default_response = Some(response);
        self
    }

    /// Make a GET request.
    pub fn get(&self, url: &str) -> Result<MockHttpResponse> {
        if let Some(response) = self.responses.get(url) {
            return Ok(response.clone());
        }

        if let Some(ref default) = self.default_response {
            return Ok(default.clone());
        }

        bail!("no mock response for URL: {}", url)
    }
}

impl Fetch for MockHttpClient {
    fn fetch(&mut self, url: &Url) -> Result<Vec<u8>> {
        let response = self.get(url.as_str())?;
        if !response.is_success() {
            return Err(BuildError::DownloadFailed {
                url: url.to_string(),
                status: response.status,
            }
            .into());
        }
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_basic() {
        let mut exec = MockExecutor::new();

        exec.expect("gcc --version", MockProcessOutput::success("gcc 13.2.0"));
        exec.expect_prefix("python.exe -m pip", MockProcessOutput::success("ok"));

        let output = exec
            .exec(&ProcessBuilder::new("gcc").arg("--version"))
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout_lossy(), "gcc 13.2.0");

        let output = exec
            .exec(&ProcessBuilder::new("python.exe").args(["-m", "pip", "--version"]))
            .unwrap();
        assert!(output.success());
        assert_eq!(exec.calls().len(), 2);
    }

    #[test]
    fn test_mock_executor_unexpected() {
        let mut exec = MockExecutor::new();
        assert!(exec.exec(&ProcessBuilder::new("unknown")).is_err());
    }

    #[test]
    fn test_mock_executor_creates_outputs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let exe = tmp.path().join("out").join("sample.exe");

        let mut exec = MockExecutor::new();
        exec.expect_pattern(
            CommandExpectation::new(
                CommandPattern::StartsWith("link".into()),
                MockProcessOutput::success(""),
            )
            .creates(&exe)
            .times(1),
        );

        exec.exec(&ProcessBuilder::new("link").arg("/nologo")).unwrap();
        assert!(exe.exists());
        exec.verify().unwrap();
    }

    #[test]
    fn test_mock_http_client_status_mapping() {
        let mut client = MockHttpClient::new();
        client.mock_url("https://example.com/ok", MockHttpResponse::ok("body"));
        client.mock_url("https://example.com/gone", MockHttpResponse::not_found());

        let ok = Url::parse("https://example.com/ok").unwrap();
        assert_eq!(client.fetch(&ok).unwrap(), b"body");

        let gone = Url::parse("https://example.com/gone").unwrap();
        let err = client.fetch(&gone).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::DownloadFailed { status: 404, .. })
        ));
    }
}
