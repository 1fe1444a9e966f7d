//! Hand a saved audio file to the host's default media player

use std::path::Path;
use std::process::Command;

use crate::{Error, Result};

/// Command that opens a file with the default application on this platform
#[must_use]
pub fn opener_command(path: &Path) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg("start").arg("").arg(path);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Open `path` with the default media player
///
/// # Errors
///
/// Returns [`Error::SynthesisUnavailable`] if no launcher is installed or it
/// exits with a failure status
pub fn open_with_default_player(path: &Path) -> Result<()> {
    let mut cmd = opener_command(path);
    let program = cmd.get_program().to_os_string();

    if which::which(&program).is_err() {
        return Err(Error::SynthesisUnavailable(format!(
            "no media launcher found ({})",
            program.to_string_lossy()
        )));
    }

    let status = cmd
        .status()
        .map_err(|e| Error::SynthesisUnavailable(format!("failed to launch player: {e}")))?;

    if !status.success() {
        return Err(Error::SynthesisUnavailable(format!(
            "media launcher exited with {status}"
        )));
    }

    tracing::debug!(path = %path.display(), "opened audio with default player");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opener_targets_file() {
        let cmd = opener_command(Path::new("speech_output.mp3"));
        let args: Vec<_> = cmd.get_args().collect();
        let last = args.last().map(|a| a.to_string_lossy().into_owned());
        assert_eq!(last.as_deref(), Some("speech_output.mp3"));
    }
}
