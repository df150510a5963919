use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::practice::{MAX_SPEED, MIN_SPEED, PracticeConfig, PracticeMode};
use crate::vocab::AccentKind;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_ignore_accents")]
    pub ignore_accents: bool,
    #[serde(default = "default_audio_enabled")]
    pub audio_enabled: bool,
    #[serde(default = "default_speed")]
    pub speed: u32,
    #[serde(default = "default_show_translation_hint")]
    pub show_translation_hint: bool,
    #[serde(default)]
    pub accent: AccentKind,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub backend_url: Option<String>,
    #[serde(default = "default_tts_command")]
    pub tts_command: String,
    #[serde(default = "default_player_command")]
    pub player_command: String,
    #[serde(default)]
    pub correct_sound: Option<String>,
    #[serde(default)]
    pub incorrect_sound: Option<String>,
}

fn default_ignore_accents() -> bool {
    false
}
fn default_audio_enabled() -> bool {
    true
}
fn default_speed() -> u32 {
    5
}
fn default_show_translation_hint() -> bool {
    true
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_locale() -> String {
    "en".to_string()
}
fn default_tts_command() -> String {
    "espeak-ng -v fr {text}".to_string()
}
fn default_player_command() -> String {
    "mpv --really-quiet --no-video {url}".to_string()
}

pub const LOCALES: &[&str] = &["en", "fr"];

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_accents: default_ignore_accents(),
            audio_enabled: default_audio_enabled(),
            speed: default_speed(),
            show_translation_hint: default_show_translation_hint(),
            accent: AccentKind::default(),
            theme: default_theme(),
            locale: default_locale(),
            backend_url: None,
            tts_command: default_tts_command(),
            player_command: default_player_command(),
            correct_sound: None,
            incorrect_sound: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocabdr")
            .join("config.toml")
    }

    /// Clamp out-of-range values from hand-edited files or CLI overrides.
    pub fn validate(&mut self) {
        self.speed = self.speed.clamp(MIN_SPEED, MAX_SPEED);
        if !LOCALES.contains(&self.locale.as_str()) {
            self.locale = default_locale();
        }
        if self
            .backend_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            self.backend_url = None;
        }
    }

    pub fn practice(&self, mode: PracticeMode) -> PracticeConfig {
        PracticeConfig {
            mode,
            ignore_accents: self.ignore_accents,
            audio_enabled: self.audio_enabled,
            speed: self.speed,
            show_translation_hint: self.show_translation_hint,
            accent: self.accent,
        }
    }
}
