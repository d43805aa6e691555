use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::{ConversionEngine, EngineError, EngineOutput, InitGuard};

/// Runs a converter program (pandoc by default) once per conversion.
///
/// The option string is split on whitespace and passed as arguments, the
/// document goes to stdin, Markdown comes back on stdout and stderr is kept
/// as the conversion log.
pub struct ProcessEngine {
    program: String,
    ready: InitGuard<String>,
}

impl ProcessEngine {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            ready: InitGuard::new(),
        }
    }

    /// First line of `<program> --version`, once initialized.
    pub fn version(&self) -> Option<&str> {
        self.ready.get().map(String::as_str)
    }

    async fn probe(&self) -> Result<String, EngineError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::Exit {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = stdout.lines().next().unwrap_or_default().trim().to_string();
        info!(program = %self.program, version = %version, "conversion program ready");
        Ok(version)
    }
}

#[async_trait]
impl ConversionEngine for ProcessEngine {
    fn name(&self) -> &str {
        "process"
    }

    async fn init(&self) -> Result<(), EngineError> {
        self.ready.get_or_init(|| self.probe()).await?;
        Ok(())
    }

    async fn convert(&self, args: &str, input: &str) -> Result<EngineOutput, EngineError> {
        self.init().await?;

        let mut child = Command::new(&self.program)
            .args(args.split_whitespace())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin concurrently so a chatty child cannot fill its stdout
        // pipe while we are still writing.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Init("child stdin was not captured".into()))?;
        let document = input.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&document).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // A child that exits without reading all of stdin closes the pipe
        // early; its exit status is what matters.
        if let Ok(Err(e)) = writer.await {
            debug!(program = %self.program, "stdin write ended early: {e}");
        }

        let log = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(EngineError::Exit {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: log.trim().to_string(),
            });
        }

        Ok(EngineOutput {
            out: String::from_utf8_lossy(&output.stdout).into_owned(),
            log,
        })
    }
}
