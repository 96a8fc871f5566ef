//! Speech through a command-line TTS program.
//!
//! Supported programs, in discovery order: `espeak-ng`, `espeak`, `spd-say`,
//! `say` (macOS). Each utterance runs as one child process; cancelling aborts
//! the task that owns the child, and `kill_on_drop` takes the process down
//! with it. `spd-say` only hands text to the speech-dispatcher daemon, so
//! cancelling it also runs `spd-say -C` to silence the daemon.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use tokio::process::Command;
use tokio::task::AbortHandle;

use crate::speech::{SpeechError, SpeechSynthesis, Utterance, UtteranceId, UtteranceRequest};

/// Called with the utterance id once its process exits on its own.
pub type CompletionCallback = Arc<dyn Fn(UtteranceId) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    EspeakNg,
    Espeak,
    SpdSay,
    Say,
}

const DISCOVERY_ORDER: [EngineKind; 4] = [
    EngineKind::EspeakNg,
    EngineKind::Espeak,
    EngineKind::SpdSay,
    EngineKind::Say,
];

impl EngineKind {
    pub fn binary(self) -> &'static str {
        match self {
            EngineKind::EspeakNg => "espeak-ng",
            EngineKind::Espeak => "espeak",
            EngineKind::SpdSay => "spd-say",
            EngineKind::Say => "say",
        }
    }

    /// Guess the engine from a program path. Unknown programs are driven with
    /// espeak-style arguments.
    pub fn from_program(program: &Path) -> Self {
        let name = program
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        DISCOVERY_ORDER
            .into_iter()
            .find(|kind| kind.binary() == name)
            .unwrap_or(EngineKind::EspeakNg)
    }

    /// Arguments that stop whatever the engine is still saying, for engines
    /// whose audio outlives the client process.
    pub fn cancel_args(self) -> Option<&'static [&'static str]> {
        match self {
            EngineKind::SpdSay => Some(&["-C"]),
            EngineKind::EspeakNg | EngineKind::Espeak | EngineKind::Say => None,
        }
    }

    /// Command-line arguments for `request`, text last.
    pub fn args(self, request: &UtteranceRequest) -> Vec<String> {
        let lang = request.lang.to_lowercase();
        let mut args = match self {
            EngineKind::EspeakNg | EngineKind::Espeak => vec![
                "-v".to_string(),
                lang,
                "-a".to_string(),
                ((request.volume * 100.0).round() as u32).to_string(),
                "-s".to_string(),
                ((request.rate * 175.0).round() as u32).to_string(),
                "-p".to_string(),
                ((request.pitch * 50.0).round().min(99.0) as u32).to_string(),
            ],
            EngineKind::SpdSay => vec![
                "-w".to_string(),
                "-l".to_string(),
                lang,
                "-i".to_string(),
                to_percent_offset(request.volume, 1.0).to_string(),
                "-r".to_string(),
                to_percent_offset(request.rate, 1.0).to_string(),
                "-p".to_string(),
                to_percent_offset(request.pitch, 1.0).to_string(),
            ],
            EngineKind::Say => vec![
                "-r".to_string(),
                ((request.rate * 175.0).round() as u32).to_string(),
            ],
        };
        args.push(request.text.clone());
        args
    }
}

/// Maps a multiplier around `neutral` onto spd-say's -100..=100 scale.
fn to_percent_offset(value: f32, neutral: f32) -> i32 {
    (((value - neutral) / neutral) * 100.0).round().clamp(-100.0, 100.0) as i32
}

/// Look `binary` up on `PATH`. Only executable files count; a name with a
/// path separator is checked as given.
pub fn find_in_path(binary: &str) -> Option<PathBuf> {
    which::which(binary).ok()
}

struct ActiveUtterance {
    id: UtteranceId,
    task: AbortHandle,
    pid: Option<u32>,
}

pub struct CommandSynthesizer {
    kind: EngineKind,
    program: PathBuf,
    name: String,
    active: Arc<Mutex<Option<ActiveUtterance>>>,
    on_finished: Option<CompletionCallback>,
}

impl CommandSynthesizer {
    pub fn new(kind: EngineKind, program: PathBuf) -> Self {
        Self {
            kind,
            name: kind.binary().to_string(),
            program,
            active: Arc::new(Mutex::new(None)),
            on_finished: None,
        }
    }

    /// Find a usable engine. `preferred` (a program name or path) wins over
    /// discovery; `None` means the host has no speech capability.
    pub fn detect(preferred: Option<&str>) -> Option<Self> {
        Self::detect_with(preferred, find_in_path)
    }

    fn detect_with(
        preferred: Option<&str>,
        find: impl Fn(&str) -> Option<PathBuf>,
    ) -> Option<Self> {
        if let Some(program) = preferred {
            match find(program) {
                Some(path) => {
                    let kind = EngineKind::from_program(&path);
                    info!("Using configured speech command {}", path.display());
                    return Some(Self::new(kind, path));
                }
                None => warn!("Configured speech command '{}' not found", program),
            }
        }

        for kind in DISCOVERY_ORDER {
            if let Some(path) = find(kind.binary()) {
                info!("Detected speech engine {} at {}", kind.binary(), path.display());
                return Some(Self::new(kind, path));
            }
        }
        info!("No speech engine found on PATH");
        None
    }

    /// Register the completion notification.
    pub fn on_finished(mut self, callback: impl Fn(UtteranceId) + Send + Sync + 'static) -> Self {
        self.on_finished = Some(Arc::new(callback));
        self
    }

    pub fn is_speaking(&self) -> bool {
        self.active
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|a| !a.task.is_finished()))
            .unwrap_or(false)
    }

    /// Pid of the utterance process while it is still running. Cleared once
    /// the process has been reaped, so it is never a recycled pid.
    #[cfg(unix)]
    fn live_pid(&self) -> Option<u32> {
        let slot = self.active.lock().ok()?;
        slot.as_ref()
            .filter(|a| !a.task.is_finished())
            .and_then(|a| a.pid)
    }

    /// The command that silences the engine's daemon, if it has one.
    fn cancel_command(&self) -> Option<std::process::Command> {
        let args = self.kind.cancel_args()?;
        let mut command = std::process::Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        Some(command)
    }

    #[cfg(unix)]
    fn signal(&self, signal: libc::c_int) {
        if let Some(pid) = self.live_pid() {
            // SAFETY: kill(2) with a pid we spawned; a stale pid only yields ESRCH
            let rc = unsafe { libc::kill(pid as libc::pid_t, signal) };
            if rc != 0 {
                debug!("Signal {} to speech process {} failed", signal, pid);
            }
        }
    }
}

impl SpeechSynthesis for CommandSynthesizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeechError::Spawn(format!("no async runtime: {e}")))?;

        // Spawning registers the child with the runtime's reactor
        let _guard = runtime.enter();
        let mut child = Command::new(&self.program)
            .args(self.kind.args(&utterance.request))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::Spawn(format!("{}: {e}", self.program.display())))?;

        let id = utterance.id;
        let pid = child.id();
        let on_finished = self.on_finished.clone();
        let active = Arc::clone(&self.active);

        // Held until the slot is filled, so the task can't clear it first
        let mut slot = self
            .active
            .lock()
            .map_err(|_| SpeechError::Spawn("speech engine state poisoned".to_string()))?;
        let task = runtime.spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => debug!("Utterance {} completed", id),
                Ok(status) => warn!("Speech process for {} exited with {}", id, status),
                Err(e) => warn!("Failed waiting on speech process for {}: {}", id, e),
            }
            // Reaped: the pid may be reused from here on
            if let Ok(mut slot) = active.lock()
                && let Some(current) = slot.as_mut()
                && current.id == id
            {
                current.pid = None;
            }
            if let Some(callback) = on_finished {
                callback(id);
            }
        });
        *slot = Some(ActiveUtterance {
            id,
            task: task.abort_handle(),
            pid,
        });
        Ok(())
    }

    fn cancel(&self) {
        let Ok(mut slot) = self.active.lock() else {
            return;
        };
        if let Some(active) = slot.take()
            && !active.task.is_finished()
        {
            active.task.abort();
            debug!("Aborted speech process for {}", active.id);

            if let Some(mut command) = self.cancel_command() {
                match command.status() {
                    Ok(status) if status.success() => {
                        debug!("Cancelled daemon speech for {}", active.id)
                    }
                    Ok(status) => warn!("Speech cancel command exited with {}", status),
                    Err(e) => warn!("Failed to run speech cancel command: {}", e),
                }
            }
        }
    }

    fn pause(&self) {
        #[cfg(unix)]
        self.signal(libc::SIGSTOP);
    }

    fn resume(&self) {
        #[cfg(unix)]
        self.signal(libc::SIGCONT);
    }
}
