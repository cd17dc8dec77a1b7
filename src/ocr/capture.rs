use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

/// Variables that pin the software renderer so captures are identical
/// across machines. Applied on top of the inherited environment.
pub const RENDER_ENV_OVERRIDES: [(&str, &str); 3] = [
    ("MESA_GL_VERSION_OVERRIDE", "3.2"),
    ("MESA_GLSL_VERSION_OVERRIDE", "150"),
    ("DYLD_LIBRARY_PATH", "/opt/llvm/lib"),
];

pub fn default_env_overrides() -> Vec<(String, String)> {
    RENDER_ENV_OVERRIDES
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Runs a test binary inside the headless capture tool and saves either the
/// rendered frame as an image or the tool's own run document.
#[derive(Debug, Clone)]
pub struct CaptureTool {
    program: PathBuf,
    env: Vec<(String, String)>,
}

impl CaptureTool {
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            env: default_env_overrides(),
        }
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn capture_image(&self, test_binary: &Path, image_path: &Path) -> Result<()> {
        self.run("-o", image_path, test_binary)
    }

    pub fn capture_sbox(&self, test_binary: &Path, sbox_path: &Path) -> Result<()> {
        self.run("-s", sbox_path, test_binary)
    }

    fn run(&self, output_flag: &str, output: &Path, test_binary: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut command = Command::new(&self.program);
        command
            .arg(output_flag)
            .arg(output)
            .arg("-x")
            .arg(test_binary)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        debug!(?command, "invoking capture tool");

        let status = command.status().with_context(|| {
            format!(
                "failed to invoke capture tool {}",
                self.program.display()
            )
        })?;

        if !status.success() {
            anyhow::bail!(
                "capture tool failed on {} with status: {status}",
                test_binary.display()
            );
        }
        Ok(())
    }
}
