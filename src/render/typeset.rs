//! Math Typesetting
//!
//! The typesetting pass runs after markdown rendering and is the only
//! asynchronous step of the pipeline.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Errors reported by a typesetting pass
#[derive(Debug, Error)]
pub enum TypesetError {
    #[error("failed to start typesetter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("typesetter I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("typesetter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("typesetter produced invalid UTF-8: {0}")]
    InvalidOutput(#[from] std::string::FromUtf8Error),

    #[error("typesetter timed out after {0:?}")]
    TimedOut(Duration),

    #[error("typesetting rejected: {0}")]
    Rejected(String),
}

/// Formats math in already-rendered HTML and returns the result
pub trait Typesetter {
    fn typeset(&self, html: String) -> impl Future<Output = Result<String, TypesetError>> + Send;
}

/// Typesetter that leaves the HTML untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTypesetter;

impl Typesetter for NoopTypesetter {
    fn typeset(&self, html: String) -> impl Future<Output = Result<String, TypesetError>> + Send {
        async move { Ok(html) }
    }
}

/// Pipes HTML through an external program (stdin in, stdout out)
#[derive(Debug, Clone)]
pub struct CommandTypesetter {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandTypesetter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Parse a whitespace separated command line such as `"katex-filter --inline"`.
    /// Returns `None` for a blank command.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, html: String) -> Result<String, TypesetError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TypesetError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TypesetError::Rejected("typesetter stdin unavailable".to_string()))?;

        // Feed stdin while collecting stdout so large documents cannot deadlock
        let write = async move {
            stdin.write_all(html.as_bytes()).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            return Err(TypesetError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        Ok(String::from_utf8(output.stdout)?)
    }
}

impl Typesetter for CommandTypesetter {
    fn typeset(&self, html: String) -> impl Future<Output = Result<String, TypesetError>> + Send {
        async move {
            log::debug!("Typesetting {} bytes with '{}'", html.len(), self.program);
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, self.run(html))
                    .await
                    .map_err(|_| TypesetError::TimedOut(limit))?,
                None => self.run(html).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_returns_input() {
        let html = NoopTypesetter.typeset("<p>x</p>".to_string()).await.unwrap();
        assert_eq!(html, "<p>x</p>");
    }

    #[test]
    fn test_parse_command_line() {
        let typesetter = CommandTypesetter::from_command_line("  katex-filter --inline  ").unwrap();
        assert_eq!(typesetter.program(), "katex-filter");
        assert_eq!(typesetter.args, vec!["--inline".to_string()]);
        assert!(CommandTypesetter::from_command_line("   ").is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_pipes_html() {
        let typesetter = CommandTypesetter::new("cat", vec![]);
        let html = typesetter.typeset("<p>\\(x\\)</p>".to_string()).await.unwrap();
        assert_eq!(html, "<p>\\(x\\)</p>");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_failure() {
        let typesetter = CommandTypesetter::new("false", vec![]);
        let err = typesetter.typeset("<p></p>".to_string()).await.unwrap_err();
        assert!(matches!(err, TypesetError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let typesetter = CommandTypesetter::new("mdtabs-no-such-typesetter", vec![]);
        let err = typesetter.typeset(String::new()).await.unwrap_err();
        assert!(matches!(err, TypesetError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_timeout() {
        let typesetter = CommandTypesetter::new("sleep", vec!["5".to_string()])
            .with_timeout(Some(Duration::from_millis(50)));
        let err = typesetter.typeset(String::new()).await.unwrap_err();
        assert!(matches!(err, TypesetError::TimedOut(_)));
    }
}
