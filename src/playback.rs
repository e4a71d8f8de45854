//! Playback hand-off.
//!
//! The library's job ends at producing container bytes. A [`Player`] takes
//! them together with a [`Platform`] and plays them fire-and-forget: failures
//! are logged, never returned.
//!
//! [`CommandPlayer`] only knows command-line players. Windows has none it can
//! rely on, so playback there (and on unknown platforms) is skipped with a
//! debug log; supply your own [`Player`] to cover it.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::thread;

use tempfile::TempPath;

use crate::error::PaudError;

/// Where audio is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    /// Termux on Android.
    Termux,
    Other,
}

impl Platform {
    /// Platform of the running process.
    pub fn detect() -> Platform {
        if cfg!(target_os = "android") || running_in_termux() {
            Platform::Termux
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Other
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Termux => "termux",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = PaudError;

    fn from_str(s: &str) -> Result<Self, PaudError> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "macos" | "darwin" => Ok(Platform::MacOs),
            "windows" => Ok(Platform::Windows),
            "termux" | "android" => Ok(Platform::Termux),
            "other" => Ok(Platform::Other),
            _ => Err(PaudError::Parse(format!("unknown platform {s:?}"))),
        }
    }
}

fn running_in_termux() -> bool {
    std::env::var_os("TERMUX_VERSION").is_some()
        || std::env::var("PREFIX").is_ok_and(|prefix| prefix.contains("com.termux"))
}

/// Something that can play a finished container.
pub trait Player {
    fn play(&self, container: &[u8], platform: Platform);
}

const TERMUX_ARGS: &[&str] = &["play"];
const APLAY_ARGS: &[&str] = &["-q"];
const NO_ARGS: &[&str] = &[];

/// Plays through the platform's command-line player.
///
/// The container is written to a temporary `.wav` file and the player process
/// is spawned without blocking the caller. A background thread reaps the
/// process and removes the file once it exits. On Termux the file is kept,
/// since the media service reads it after the command returns.
#[derive(Debug, Clone, Default)]
pub struct CommandPlayer {
    staging_dir: Option<PathBuf>,
}

impl CommandPlayer {
    /// Stage files in the system temp directory.
    pub fn new() -> Self {
        CommandPlayer::default()
    }

    /// Stage files in `dir` instead of the system temp directory.
    pub fn staging_in(dir: impl Into<PathBuf>) -> Self {
        CommandPlayer {
            staging_dir: Some(dir.into()),
        }
    }

    /// Program and leading arguments for `platform`, if it has one.
    pub fn command_for(platform: Platform) -> Option<(&'static str, &'static [&'static str])> {
        match platform {
            Platform::Termux => Some(("termux-media-player", TERMUX_ARGS)),
            Platform::Linux => Some(("aplay", APLAY_ARGS)),
            Platform::MacOs => Some(("afplay", NO_ARGS)),
            Platform::Windows | Platform::Other => None,
        }
    }
}

impl Player for CommandPlayer {
    fn play(&self, container: &[u8], platform: Platform) {
        let Some((program, args)) = CommandPlayer::command_for(platform) else {
            log::debug!("no command player for {platform}, skipping playback");
            return;
        };

        let path = match write_temp_wav(container, self.staging_dir.as_deref()) {
            Ok(path) => path,
            Err(e) => {
                log::warn!("could not stage audio for playback: {e}");
                return;
            }
        };

        let spawned = Command::new(program)
            .args(args)
            .arg(&*path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                log::warn!("could not start {program}: {e}");
                return;
            }
        };
        log::debug!("started {program} (pid {}) on {}", child.id(), path.display());

        // termux-media-player returns once the media service has the path,
        // so the file has to outlive the command.
        let path = if platform == Platform::Termux {
            match path.keep() {
                Ok(kept) => log::debug!("leaving {} for the media service", kept.display()),
                Err(e) => log::warn!("could not keep playback file: {e}"),
            }
            None
        } else {
            Some(path)
        };

        let reaper = thread::Builder::new()
            .name("paud-playback".into())
            .spawn(move || {
                match child.wait() {
                    Ok(status) if !status.success() => log::warn!("{program} exited with {status}"),
                    Ok(_) => {}
                    Err(e) => log::warn!("could not wait for {program}: {e}"),
                }
                if let Some(Err(e)) = path.map(TempPath::close) {
                    log::debug!("could not remove playback file: {e}");
                }
            });
        if let Err(e) = reaper {
            log::warn!("could not start playback cleanup thread: {e}");
        }
    }
}

/// Stage `container` as a `.wav` file that is deleted when the returned
/// path is closed or dropped.
fn write_temp_wav(container: &[u8], dir: Option<&Path>) -> std::io::Result<TempPath> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("paud-").suffix(".wav");
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(container)?;
    file.flush()?;
    Ok(file.into_temp_path())
}
