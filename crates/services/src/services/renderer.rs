//! Out-of-process HTML→PDF rendering via headless Chromium.
//!
//! The render call is bounded by a timeout and the child is killed on the
//! way out; the scratch directory holding the HTML/PDF pair is removed on
//! every exit path through `TempDir`.

use std::{path::PathBuf, process::Stdio, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("no chromium binary found; set CHROMIUM_PATH")]
    BinaryNotFound,
    #[error("renderer io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("pdf render timed out after {0:?}")]
    Timeout(Duration),
    #[error("renderer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("renderer produced no output")]
    MissingOutput,
}

/// Seam for PDF generation so report logic can be exercised without a
/// browser on the machine.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>, RendererError>;
}

/// Candidate binary names probed on `PATH`, in order.
const CHROMIUM_BINARIES: [&str; 5] = [
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

pub struct ChromiumRenderer {
    binary: PathBuf,
    timeout: Duration,
}

impl ChromiumRenderer {
    pub fn new(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    /// Uses the explicit override when given, otherwise probes `PATH`.
    pub fn discover(
        override_path: Option<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, RendererError> {
        if let Some(path) = override_path {
            return Ok(Self::new(path, timeout));
        }
        let binary = CHROMIUM_BINARIES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or(RendererError::BinaryNotFound)?;
        debug!(binary = %binary.display(), "chromium renderer ready");
        Ok(Self::new(binary, timeout))
    }
}

#[async_trait]
impl PdfRenderer for ChromiumRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, RendererError> {
        let scratch = tempfile::tempdir()?;
        let input = scratch.path().join("report.html");
        let output = scratch.path().join("report.pdf");
        tokio::fs::write(&input, html).await?;

        let child = Command::new(&self.binary)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the in-flight future on timeout drops the child, and
        // kill_on_drop reaps it.
        let rendered = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(timeout = ?self.timeout, "killed stalled chromium renderer");
                return Err(RendererError::Timeout(self.timeout));
            }
        };

        if !rendered.status.success() {
            return Err(RendererError::Failed {
                status: rendered.status.to_string(),
                stderr: String::from_utf8_lossy(&rendered.stderr).trim().to_string(),
            });
        }

        match tokio::fs::read(&output).await {
            Ok(bytes) => Ok(bytes),
            Err(_) => Err(RendererError::MissingOutput),
        }
    }
}
