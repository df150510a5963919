use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use crate::audio::{AudioBackend, CancelCheck, FeedbackKind, PlaybackError, PronunciationSource};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Plays audio by running external programs, one argument vector per kind of
/// sound. `{text}` and `{url}` inside an argument are replaced with the word
/// or the recording location; no shell is involved.
#[derive(Clone, Debug)]
pub struct CommandAudio {
    pub tts_command: Vec<String>,
    pub player_command: Vec<String>,
    pub correct_sound: Option<String>,
    pub incorrect_sound: Option<String>,
}

impl CommandAudio {
    pub fn new(tts_command: &str, player_command: &str) -> Self {
        Self {
            tts_command: split_command(tts_command),
            player_command: split_command(player_command),
            correct_sound: None,
            incorrect_sound: None,
        }
    }

    pub fn with_feedback_sounds(
        mut self,
        correct: Option<String>,
        incorrect: Option<String>,
    ) -> Self {
        self.correct_sound = correct;
        self.incorrect_sound = incorrect;
        self
    }

    fn play_url(&self, url: &str, cancel: &dyn CancelCheck) -> Result<(), PlaybackError> {
        if self.player_command.is_empty() {
            return Err(PlaybackError::NotConfigured("recordings"));
        }
        run_to_completion(&build_args(&self.player_command, "{url}", url), cancel)
    }
}

impl AudioBackend for CommandAudio {
    fn play_feedback(
        &mut self,
        kind: FeedbackKind,
        cancel: &dyn CancelCheck,
    ) -> Result<(), PlaybackError> {
        let sound = match kind {
            FeedbackKind::Correct => self.correct_sound.as_deref(),
            FeedbackKind::Incorrect => self.incorrect_sound.as_deref(),
        };
        match sound {
            Some(path) => self.play_url(path, cancel),
            None => Ok(()),
        }
    }

    fn play_pronunciation(
        &mut self,
        source: &PronunciationSource,
        cancel: &dyn CancelCheck,
    ) -> Result<(), PlaybackError> {
        match source {
            PronunciationSource::Recording(url) => self.play_url(url, cancel),
            PronunciationSource::Synthesized(text) => {
                if self.tts_command.is_empty() {
                    return Err(PlaybackError::NotConfigured("speech synthesis"));
                }
                run_to_completion(&build_args(&self.tts_command, "{text}", text), cancel)
            }
        }
    }
}

pub fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

/// Substitutes `value` for `placeholder`. When no argument mentions the
/// placeholder, the value is appended as the final argument.
pub fn build_args(template: &[String], placeholder: &str, value: &str) -> Vec<String> {
    let mut substituted = false;
    let mut args: Vec<String> = template
        .iter()
        .map(|arg| {
            if arg.contains(placeholder) {
                substituted = true;
                arg.replace(placeholder, value)
            } else {
                arg.clone()
            }
        })
        .collect();
    if !substituted {
        args.push(value.to_string());
    }
    args
}

fn run_to_completion(args: &[String], cancel: &dyn CancelCheck) -> Result<(), PlaybackError> {
    let Some((program, rest)) = args.split_first() else {
        return Err(PlaybackError::NotConfigured("audio"));
    };
    let command_line = args.join(" ");
    let mut child = Command::new(program)
        .args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| PlaybackError::Spawn {
            command: command_line.clone(),
            source,
        })?;

    wait_or_kill(&mut child, &command_line, cancel)
}

fn wait_or_kill(
    child: &mut Child,
    command_line: &str,
    cancel: &dyn CancelCheck,
) -> Result<(), PlaybackError> {
    loop {
        if cancel.is_cancelled() {
            let _ = child.kill();
            let _ = child.wait();
            return Err(PlaybackError::Cancelled);
        }
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return Ok(()),
            Ok(Some(status)) => {
                return Err(PlaybackError::Failed {
                    command: command_line.to_string(),
                    status: status.to_string(),
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                return Err(PlaybackError::Spawn {
                    command: command_line.to_string(),
                    source,
                });
            }
        }
    }
}
