// src/pipeline/compiler.rs
//! Typst compilation of rendered document sources

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;
use tracing::{info, warn};

/// Compiles a rendered document source into a PDF artifact via the `typst`
/// binary. Returns `None` when the toolchain is not installed.
pub struct DocumentCompiler {
    output_dir: PathBuf,
}

impl DocumentCompiler {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn compile(&self, source: &str, stem: &str) -> Result<Option<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.output_dir.display()
            )
        })?;

        let source_path = self.output_dir.join(format!("{}.typ", stem));
        std::fs::write(&source_path, source)
            .with_context(|| format!("Failed to write document source: {}", source_path.display()))?;

        let output_path = self.output_dir.join(format!("{}.pdf", stem));

        let status = match Command::new("typst")
            .arg("compile")
            .arg(&source_path)
            .arg(&output_path)
            .status()
        {
            Ok(status) => status,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "typst binary not found, keeping source only: {}",
                    source_path.display()
                );
                return Ok(None);
            }
            Err(err) => {
                return Err(err).context("Failed to execute typst compile");
            }
        };

        if !status.success() {
            anyhow::bail!("Typst compilation failed for {}", source_path.display());
        }

        info!("Compiled document: {}", output_path.display());
        Ok(Some(output_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_writes_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = DocumentCompiler::new(dir.path().to_path_buf());

        // the typst binary may be absent; the source must be written either way
        let _ = compiler.compile("= Resume", "jane_doe");
        assert!(dir.path().join("jane_doe.typ").exists());
    }
}
