//! Turns generated assembly into an executable with an external assembler
//! and linker.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{bail, Context};
use tracing::info;

#[derive(Clone, Debug)]
pub struct Toolchain {
    pub assembler: String,
    pub linker: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            assembler: "nasm".to_string(),
            linker: "ld".to_string(),
        }
    }
}

/// `<output>.asm`, next to the executable.
pub fn asm_path(output: &Path) -> PathBuf {
    output.with_extension("asm")
}

pub fn write_asm(asm: &str, output: &Path) -> anyhow::Result<PathBuf> {
    let path = asm_path(output);
    fs::write(&path, asm).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote assembly");
    Ok(path)
}

fn run(command: &mut Command) -> anyhow::Result<()> {
    info!(?command, "running");
    let status = command
        .status()
        .with_context(|| format!("failed to spawn {:?}", command.get_program()))?;
    if !status.success() {
        bail!("{:?} exited with {}", command.get_program(), status);
    }
    Ok(())
}

impl Toolchain {
    /// Assembles `asm_path` and links it into `output`.
    pub fn build(&self, asm_path: &Path, output: &Path) -> anyhow::Result<()> {
        let object = output.with_extension("o");

        run(Command::new(&self.assembler)
            .arg("-felf64")
            .arg(asm_path)
            .arg("-o")
            .arg(&object))?;
        run(Command::new(&self.linker)
            .arg("-o")
            .arg(output)
            .arg(&object))?;

        info!(path = %output.display(), "linked executable");
        Ok(())
    }
}
