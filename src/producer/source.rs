//! Text sources and analyzers
//!
//! Both traits are blocking: screen capture, OCR and remote inference are slow
//! and run on the blocking pool, never on a delivery task.

use std::io::Write;
use std::process::{Command, Stdio};

use super::error::ProduceError;

/// Role text handed to analyzers that take a separate system prompt
pub const SYSTEM_PROMPT: &str =
    "You are an expert technical interviewer, fluent in common interview questions.";

/// Captures the current screen and returns its recognized text
pub trait TextSource: Send + Sync {
    fn capture_text(&self) -> Result<String, ProduceError>;
}

/// Turns a request into the text shown to viewers
pub trait Analyzer: Send + Sync {
    fn analyze(&self, request: &AnalysisRequest) -> Result<String, ProduceError>;
}

/// What the analyzer is asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    /// Solve the question found in freshly captured text
    Analyze { text: String },
    /// Improve on a previous answer
    Optimize { previous: String },
}

impl AnalysisRequest {
    /// Short mode name, exported to analyzer commands as `PUSHVIEW_MODE`
    pub fn mode(&self) -> &'static str {
        match self {
            AnalysisRequest::Analyze { .. } => "analyze",
            AnalysisRequest::Optimize { .. } => "optimize",
        }
    }

    /// Full user prompt for a language model
    pub fn prompt(&self) -> String {
        match self {
            AnalysisRequest::Analyze { text } => format!(
                "The following text was recognized from a screenshot:\n{}\n\n\
                 The capture is noisy and may contain unrelated content. Extract the \
                 programming question it contains and give the approach, a straightforward \
                 solution in code (brute force is fine, leave room for improvement) and the \
                 key points. Reply with the approach, the code and the explanation only.",
                text
            ),
            AnalysisRequest::Optimize { previous } => format!(
                "Suggest a better optimized solution to the following, with code and \
                 reasoning:\n{}",
                previous
            ),
        }
    }
}

/// Analyzer that publishes its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Analyzer for PassThrough {
    fn analyze(&self, request: &AnalysisRequest) -> Result<String, ProduceError> {
        Ok(match request {
            AnalysisRequest::Analyze { text } => text.clone(),
            AnalysisRequest::Optimize { previous } => previous.clone(),
        })
    }
}

/// Text source that runs a shell command and reads its standard output
///
/// e.g. `screencapture -x /tmp/s.png && tesseract /tmp/s.png -`
#[derive(Debug, Clone)]
pub struct CommandSource {
    command: String,
}

impl CommandSource {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl TextSource for CommandSource {
    fn capture_text(&self) -> Result<String, ProduceError> {
        run_shell(&self.command, None, &[])
    }
}

/// Analyzer that runs a shell command with the prompt on standard input
///
/// The command sees `PUSHVIEW_MODE` (`analyze` or `optimize`) and
/// `PUSHVIEW_SYSTEM_PROMPT` in its environment; its standard output is the
/// published result.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    command: String,
}

impl CommandAnalyzer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Analyzer for CommandAnalyzer {
    fn analyze(&self, request: &AnalysisRequest) -> Result<String, ProduceError> {
        let prompt = request.prompt();
        run_shell(
            &self.command,
            Some(prompt),
            &[
                ("PUSHVIEW_MODE", request.mode()),
                ("PUSHVIEW_SYSTEM_PROMPT", SYSTEM_PROMPT),
            ],
        )
    }
}

fn shell(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

fn run_shell(
    command: &str,
    input: Option<String>,
    envs: &[(&str, &str)],
) -> Result<String, ProduceError> {
    let mut cmd = shell(command);
    cmd.envs(envs.iter().copied())
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    tracing::debug!(command = command, "Running external command");
    let mut child = cmd.spawn()?;

    // Feed stdin from its own thread so a chatty child cannot fill stdout and
    // deadlock against us
    let writer = match (input, child.stdin.take()) {
        (Some(input), Some(mut stdin)) => Some(std::thread::spawn(move || {
            stdin.write_all(input.as_bytes())
        })),
        _ => None,
    };

    let output = child.wait_with_output()?;

    if let Some(writer) = writer {
        match writer.join() {
            Ok(Ok(())) => {}
            // Child exited without reading everything; its status decides
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(ProduceError::Panicked("stdin writer".into())),
        }
    }

    if !output.status.success() {
        return Err(ProduceError::Command {
            command: command.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_through() {
        let analyzer = PassThrough;
        let request = AnalysisRequest::Analyze {
            text: "two sum".into(),
        };
        assert_eq!(analyzer.analyze(&request).unwrap(), "two sum");

        let request = AnalysisRequest::Optimize {
            previous: "O(n^2)".into(),
        };
        assert_eq!(analyzer.analyze(&request).unwrap(), "O(n^2)");
    }

    #[test]
    fn test_prompt_embeds_input() {
        let analyze = AnalysisRequest::Analyze {
            text: "reverse a linked list".into(),
        };
        assert_eq!(analyze.mode(), "analyze");
        assert!(analyze.prompt().contains("reverse a linked list"));

        let optimize = AnalysisRequest::Optimize {
            previous: "use a stack".into(),
        };
        assert_eq!(optimize.mode(), "optimize");
        assert!(optimize.prompt().ends_with("use a stack"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_source_reads_stdout() {
        let source = CommandSource::new("printf 'hello\\nworld'");
        assert_eq!(source.capture_text().unwrap(), "hello\nworld");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_source_failure() {
        let source = CommandSource::new("echo oops >&2; exit 3");
        match source.capture_text() {
            Err(ProduceError::Command { code, stderr, .. }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "oops");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_command_analyzer_gets_prompt_and_mode() {
        let analyzer = CommandAnalyzer::new("printf '%s:' \"$PUSHVIEW_MODE\"; cat");
        let request = AnalysisRequest::Optimize {
            previous: "abc".into(),
        };

        let output = analyzer.analyze(&request).unwrap();
        assert!(output.starts_with("optimize:"));
        assert!(output.ends_with("abc"));
    }
}
