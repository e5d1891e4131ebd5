// Microphone capture
// Delegates recording to an external ALSA `arecord` process writing a temporary WAV file


use std::path::Path;
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{RagError, Result};

pub const SAMPLE_RATE_HZ: u32 = 16_000;
pub const CHANNELS: u32 = 1;
pub const SAMPLE_FORMAT: &str = "S16_LE";

/// A captured WAV file, deleted when this value is dropped
#[derive(Debug)]
pub struct Recording {
    file: NamedTempFile,
    seconds: u32,
}

impl Recording {
    #[inline]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    #[inline]
    pub fn seconds(&self) -> u32 {
        self.seconds
    }
}

/// Arguments passed to the capture program for a `seconds`-long recording into `dest`
#[inline]
pub fn capture_args(seconds: u32, dest: &Path) -> Vec<String> {
    vec![
        "-q".to_string(),
        "-f".to_string(),
        SAMPLE_FORMAT.to_string(),
        "-r".to_string(),
        SAMPLE_RATE_HZ.to_string(),
        "-c".to_string(),
        CHANNELS.to_string(),
        "-d".to_string(),
        seconds.to_string(),
        dest.display().to_string(),
    ]
}

/// Record `seconds` of mono 16-bit 16 kHz audio into `dest` with `program`.
///
/// The child is killed if the returned future is dropped before it finishes.
#[inline]
pub async fn record_wav(program: &str, seconds: u32, dest: &Path) -> Result<()> {
    if seconds == 0 {
        return Err(RagError::Validation(
            "recording length must be at least 1 second".to_string(),
        ));
    }

    let args = capture_args(seconds, dest);
    debug!("Running {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            RagError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to start {}: {}", program, e),
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RagError::Io(std::io::Error::other(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        ))));
    }

    Ok(())
}

/// Record into a fresh temporary file owned by the returned [`Recording`]
#[inline]
pub async fn record(program: &str, seconds: u32) -> Result<Recording> {
    let file = tempfile::Builder::new()
        .prefix("asr-rag-recording-")
        .suffix(".wav")
        .tempfile()?;

    info!("Recording {} seconds of audio", seconds);
    record_wav(program, seconds, file.path()).await?;
    info!("Recording finished");

    Ok(Recording { file, seconds })
}
