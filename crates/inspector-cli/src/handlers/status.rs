use crate::config::Config;
use anyhow::Result;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

pub fn handle(config: &Config) -> Result<()> {
    let colorize = std::io::stdout().is_terminal();
    let lock_state = probe_lock_state(&config.traces_dir)?;

    print_field("port", &config.port.to_string(), colorize);
    print_field("bind address", &config.bind_address.to_string(), colorize);
    print_field("traces dir", &config.traces_dir.display().to_string(), colorize);
    print_field(
        "external workflow url",
        config.external_workflow_url.as_deref().unwrap_or("(none)"),
        colorize,
    );
    match lock_state {
        LockState::Available => print_field("advisory lock", "not held", colorize),
        LockState::HeldByPeer { pid } => print_field("advisory lock", &format!("held by pid {pid}"), colorize),
    }
    Ok(())
}

enum LockState {
    Available,
    HeldByPeer { pid: u32 },
}

/// Acquire-then-immediately-release: a non-destructive way to learn
/// whether a live peer holds the lock, without leaving it held for the
/// lifetime of this one-shot command.
fn probe_lock_state(traces_dir: &std::path::Path) -> Result<LockState> {
    if !traces_dir.exists() {
        return Ok(LockState::Available);
    }
    match inspector_export::lock::acquire(traces_dir)? {
        inspector_export::lock::LockOutcome::Acquired(lock) => {
            lock.release();
            Ok(LockState::Available)
        }
        inspector_export::lock::LockOutcome::HeldByPeer { pid } => Ok(LockState::HeldByPeer { pid }),
    }
}

fn print_field(label: &str, value: &str, colorize: bool) {
    if colorize {
        println!("{:>22}: {}", label.bold(), value.cyan());
    } else {
        println!("{label:>22}: {value}");
    }
}
