//! Utility functions for running external programs
use crate::Result;
use std::{
    os::unix::process::CommandExt,
    process::{Command, Stdio},
};
use tracing::info;

fn detached(cmd: &str, args: &[&str]) -> Command {
    let mut command = Command::new(cmd);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        // Children live in their own session so they survive the
        // window manager and never share its controlling terminal. The
        // X connection itself is opened close-on-exec and is not
        // inherited.
        .process_group(0);

    command
}

/// Run an external command, whitespace-split.
///
/// The child is fully detached: stdio is redirected to /dev/null and it
/// runs in its own process group.
pub fn spawn<S: Into<String>>(cmd: S) -> Result<()> {
    let s = cmd.into();
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.is_empty() {
        return Ok(());
    }

    info!(cmd = %s, "spawning subprocess");
    detached(parts[0], &parts[1..]).spawn()?;

    Ok(())
}

/// Run an external command from an argv-style list.
pub fn spawn_argv(argv: &[String]) -> Result<()> {
    let Some((cmd, args)) = argv.split_first() else {
        return Ok(());
    };
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    info!(%cmd, ?args, "spawning subprocess");
    detached(cmd, &args).spawn()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_commands_are_a_noop() {
        assert!(spawn("").is_ok());
        assert!(spawn_argv(&[]).is_ok());
    }
}
