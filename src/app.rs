use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use rust_i18n::t;

use crate::audio::{AudioCue, PronunciationSource};
use crate::audio::worker::AudioWorker;
use crate::config::{Config, LOCALES};
use crate::session::driver::PracticeDriver;
use crate::session::practice::{
    MAX_SPEED, MIN_SPEED, PracticeMode, PracticeSession, SessionError, SessionUpdate,
};
use crate::session::result::SessionResult;
use crate::store::json_store::JsonStore;
use crate::store::schema::{HistoryData, ProfileData};
use crate::ui::components::deck_list::deck_entries;
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;
use crate::vocab::{self, FilterCriteria, VocabSource, VocabularyItem};

/// A feedback chain that never reports back (dead player, hung process) must
/// not lock the session forever.
const FEEDBACK_TIMEOUT: Duration = Duration::from_secs(20);

pub const SETTINGS_COUNT: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    DeckSelect,
    WordList,
    Ready,
    Practice,
    Result,
    Settings,
}

/// One-off command line settings. They apply to this run only and never reach
/// the saved config file.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub speed: Option<u32>,
    pub ignore_accents: bool,
    pub no_audio: bool,
    pub theme: Option<String>,
}

pub struct App {
    pub screen: AppScreen,
    pub mode: PracticeMode,
    pub criteria: FilterCriteria,
    pub deck_entries: Vec<FilterCriteria>,
    pub deck_selected: usize,
    pub items: Vec<VocabularyItem>,
    pub word_selected: Vec<bool>,
    pub word_cursor: usize,
    pub driver: Option<PracticeDriver>,
    pub last_result: Option<SessionResult>,
    pub history: HistoryData,
    pub profile: ProfileData,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub status: Option<String>,
    pub should_quit: bool,
    pub settings_selected: usize,
    saved_config: Config,
    items_loaded: bool,
    store: Option<JsonStore>,
    source: Box<dyn VocabSource>,
    audio: Option<AudioWorker>,
    pending_chain: Option<(u64, Instant)>,
}

impl App {
    pub fn new(
        config: Config,
        source: Box<dyn VocabSource>,
        audio: Option<AudioWorker>,
        store: Option<JsonStore>,
    ) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let criteria = FilterCriteria::default();
        let menu = Menu::new(theme, &deck_label(&criteria));

        let (history, profile) = match store {
            Some(ref s) => (s.load_history(), s.load_profile()),
            None => (HistoryData::default(), ProfileData::default()),
        };
        log::info!("vocabulary source: {}", source.describe());

        Self {
            screen: AppScreen::Menu,
            mode: PracticeMode::default(),
            criteria,
            deck_entries: Vec::new(),
            deck_selected: 0,
            items: Vec::new(),
            word_selected: Vec::new(),
            word_cursor: 0,
            driver: None,
            last_result: None,
            history,
            profile,
            menu,
            theme,
            saved_config: config.clone(),
            config,
            status: None,
            should_quit: false,
            settings_selected: 0,
            items_loaded: false,
            store,
            source,
            audio,
            pending_chain: None,
        }
    }

    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(speed) = overrides.speed {
            self.config.speed = speed;
        }
        if overrides.ignore_accents {
            self.config.ignore_accents = true;
        }
        if overrides.no_audio {
            self.config.audio_enabled = false;
        }
        if let Some(ref name) = overrides.theme {
            match Theme::load(name) {
                Some(theme) => {
                    self.config.theme = name.clone();
                    let theme: &'static Theme = Box::leak(Box::new(theme));
                    self.theme = theme;
                    self.menu.theme = theme;
                }
                None => log::warn!("unknown theme {name}, keeping {}", self.config.theme),
            }
        }
        self.config.validate();
    }

    /// The settings as they will be written by `save_settings`.
    pub fn saved_config(&self) -> &Config {
        &self.saved_config
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    pub fn deck_label(&self) -> String {
        deck_label(&self.criteria)
    }

    pub fn session(&self) -> Option<&PracticeSession> {
        self.driver.as_ref().map(|d| &d.session)
    }

    pub fn go_to_menu(&mut self) {
        self.stop_audio();
        if let Some(driver) = self.driver.as_mut() {
            driver.cancel();
        }
        self.driver = None;
        self.menu.refresh(&deck_label(&self.criteria));
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_deck_select(&mut self) {
        match self.source.list_classes() {
            Ok(classes) => {
                self.deck_entries = deck_entries(&classes);
                self.deck_selected = self
                    .deck_entries
                    .iter()
                    .position(|c| *c == self.criteria)
                    .unwrap_or(0);
                self.status = None;
                self.screen = AppScreen::DeckSelect;
            }
            Err(e) => {
                log::warn!("could not list decks: {e}");
                self.status = Some(t!("error.source", error = e.to_string()).to_string());
            }
        }
    }

    pub fn deck_next(&mut self) {
        if !self.deck_entries.is_empty() {
            self.deck_selected = (self.deck_selected + 1).min(self.deck_entries.len() - 1);
        }
    }

    pub fn deck_prev(&mut self) {
        self.deck_selected = self.deck_selected.saturating_sub(1);
    }

    /// Switches to the highlighted deck and opens its word list.
    pub fn select_deck(&mut self) {
        if let Some(entry) = self.deck_entries.get(self.deck_selected) {
            self.criteria = entry.clone();
            self.items.clear();
            self.word_selected.clear();
            self.items_loaded = false;
        }
        self.menu.refresh(&deck_label(&self.criteria));
        self.go_to_word_list();
        if self.screen != AppScreen::WordList {
            self.screen = AppScreen::Menu;
        }
    }

    pub fn go_to_word_list(&mut self) {
        if self.ensure_items() {
            self.word_cursor = self.word_cursor.min(self.items.len().saturating_sub(1));
            self.screen = AppScreen::WordList;
        }
    }

    /// Loads the words for the chosen deck and shows the start prompt.
    pub fn go_to_ready(&mut self, mode: PracticeMode) {
        self.mode = mode;
        if self.ensure_items() {
            self.screen = AppScreen::Ready;
        }
    }

    /// Fetches the deck once per selection, keeping the word choices made since.
    fn ensure_items(&mut self) -> bool {
        if self.items_loaded {
            self.status = None;
            return true;
        }
        match self.load_items() {
            Ok(()) => {
                self.status = None;
                true
            }
            Err(e) => {
                log::warn!("could not load deck {}: {e:#}", self.criteria.label());
                self.status = Some(t!("error.source", error = e.to_string()).to_string());
                false
            }
        }
    }

    fn load_items(&mut self) -> Result<()> {
        let fetched = self.source.fetch(&self.criteria)?;
        self.items = vocab::validate(fetched);
        self.word_selected = vec![true; self.items.len()];
        self.word_cursor = 0;
        self.items_loaded = true;
        Ok(())
    }

    pub fn word_next(&mut self) {
        if !self.items.is_empty() {
            self.word_cursor = (self.word_cursor + 1).min(self.items.len() - 1);
        }
    }

    pub fn word_prev(&mut self) {
        self.word_cursor = self.word_cursor.saturating_sub(1);
    }

    pub fn toggle_word(&mut self) {
        if let Some(checked) = self.word_selected.get_mut(self.word_cursor) {
            *checked = !*checked;
        }
    }

    /// Checks every word, or clears them all when all are already checked.
    pub fn toggle_all_words(&mut self) {
        let all = self.word_selected.iter().all(|&c| c);
        self.word_selected.iter_mut().for_each(|c| *c = !all);
    }

    /// Pronounces the highlighted word with the preferred accent.
    pub fn preview_word(&mut self) {
        let Some(item) = self.items.get(self.word_cursor) else {
            return;
        };
        let cue = AudioCue::Pronounce(PronunciationSource::resolve(item, self.config.accent));
        self.play_untracked(vec![cue]);
    }

    pub fn selected_count(&self) -> usize {
        self.word_selected.iter().filter(|&&c| c).count()
    }

    pub fn selected_items(&self) -> Vec<VocabularyItem> {
        self.items
            .iter()
            .zip(&self.word_selected)
            .filter(|(_, checked)| **checked)
            .map(|(item, _)| item.clone())
            .collect()
    }

    pub fn toggle_hint(&mut self) {
        self.config.show_translation_hint = !self.config.show_translation_hint;
    }

    /// Starts a session over the checked words. Refuses an empty selection and
    /// stays on the current screen with the reason in `status`.
    pub fn start_session(&mut self, now: Instant) -> Result<()> {
        let practice = self.config.practice(self.mode);
        let session = match PracticeSession::new(self.selected_items(), practice) {
            Ok(session) => session,
            Err(SessionError::EmptyItemList) => {
                let reason = if self.items.is_empty() {
                    t!("error.empty_deck").to_string()
                } else {
                    t!("error.none_selected").to_string()
                };
                self.status = Some(t!("error.cannot_start", reason = reason).to_string());
                bail!("cannot start: {}", SessionError::EmptyItemList);
            }
        };
        log::info!(
            "starting {} session on {} with {} words",
            self.mode.as_str(),
            self.criteria.label(),
            session.total_count()
        );

        let mut driver = PracticeDriver::new(session);
        let opening = driver.start(now);
        self.driver = Some(driver);
        self.last_result = None;
        self.status = None;
        self.screen = AppScreen::Practice;
        self.play_untracked(opening);
        Ok(())
    }

    pub fn retry_session(&mut self, now: Instant) {
        if self.start_session(now).is_err() {
            self.screen = AppScreen::Ready;
        }
    }

    pub fn type_char(&mut self, ch: char) {
        if let Some(driver) = self.driver.as_mut() {
            driver.type_char(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(driver) = self.driver.as_mut() {
            driver.backspace();
        }
    }

    pub fn clear_input(&mut self) {
        if let Some(driver) = self.driver.as_mut() {
            driver.clear_input();
        }
    }

    pub fn submit(&mut self, now: Instant) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };
        let update = driver.submit(now);
        self.apply_update(update, now);
    }

    /// Pronounces the current word again, unless feedback is still playing.
    pub fn replay(&mut self) {
        let cues = match self.session() {
            Some(session) if !session.feedback_pending() => session.replay_cues(),
            _ => return,
        };
        self.play_untracked(cues);
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some((id, started)) = self.pending_chain
            && now.saturating_duration_since(started) > FEEDBACK_TIMEOUT
        {
            log::warn!("audio chain {id} never finished; releasing the session");
            self.on_audio_done(id, now);
        }

        let update = self.driver.as_mut().and_then(|driver| driver.tick(now));
        if let Some(update) = update {
            self.apply_update(update, now);
        }
    }

    /// Completion of an audio chain. Only the chain of the latest submission
    /// releases the session; stale ids from replays or cancelled chains are
    /// ignored.
    pub fn on_audio_done(&mut self, id: u64, now: Instant) {
        if self.pending_chain.map(|(pending, _)| pending) != Some(id) {
            return;
        }
        self.pending_chain = None;
        if let Some(driver) = self.driver.as_mut() {
            driver.feedback_finished(now);
        }
    }

    /// Esc during practice. Sessions with progress are scored as abandoned.
    pub fn end_session(&mut self) {
        let has_progress = self.session().is_some_and(|s| s.attempts() > 0);
        if has_progress {
            self.stop_audio();
            self.finish_session();
        } else {
            self.go_to_menu();
        }
    }

    fn apply_update(&mut self, update: SessionUpdate, now: Instant) {
        if update.is_ignored() {
            return;
        }
        if !update.cues.is_empty() {
            self.play_feedback(update.cues, now);
        }
        if self.session().is_some_and(|s| s.is_finished()) {
            self.finish_session();
        }
    }

    fn play_feedback(&mut self, cues: Vec<AudioCue>, now: Instant) {
        match self.audio.as_mut() {
            Some(audio) => {
                audio.cancel_all();
                let id = audio.play(cues);
                self.pending_chain = Some((id, now));
            }
            None => {
                // Nothing will report back, so the feedback is over right away
                if let Some(driver) = self.driver.as_mut() {
                    driver.feedback_finished(now);
                }
            }
        }
    }

    fn play_untracked(&mut self, cues: Vec<AudioCue>) {
        if cues.is_empty() {
            return;
        }
        if let Some(audio) = self.audio.as_mut() {
            audio.cancel_all();
            audio.play(cues);
        }
    }

    fn stop_audio(&mut self) {
        if let Some(audio) = self.audio.as_ref() {
            audio.cancel_all();
        }
        self.pending_chain = None;
    }

    fn finish_session(&mut self) {
        let Some(mut driver) = self.driver.take() else {
            return;
        };
        driver.cancel();
        self.pending_chain = None;

        let result = SessionResult::from_session(&driver.session, &deck_label(&self.criteria));
        log::info!(
            "session over: {}/{} words, {:.1}% accuracy",
            result.solved,
            result.total,
            result.accuracy
        );
        match self.store {
            Some(ref store) => {
                if let Err(e) = store.record(&mut self.history, &mut self.profile, result.clone()) {
                    log::error!("could not save session: {e:#}");
                }
            }
            None => {
                self.profile.record_session(&result);
                self.history.sessions.push(result.clone());
            }
        }
        self.last_result = Some(result);
        self.screen = AppScreen::Result;
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    pub fn settings_next(&mut self) {
        self.settings_selected = (self.settings_selected + 1).min(SETTINGS_COUNT - 1);
    }

    pub fn settings_prev(&mut self) {
        self.settings_selected = self.settings_selected.saturating_sub(1);
    }

    pub fn settings_cycle_forward(&mut self) {
        self.settings_cycle(true);
    }

    pub fn settings_cycle_backward(&mut self) {
        self.settings_cycle(false);
    }

    fn settings_cycle(&mut self, forward: bool) {
        match self.settings_selected {
            0 => self.config.ignore_accents = !self.config.ignore_accents,
            1 => self.config.audio_enabled = !self.config.audio_enabled,
            2 => {
                self.config.speed = if forward {
                    (self.config.speed + 1).min(MAX_SPEED)
                } else {
                    self.config.speed.saturating_sub(1).max(MIN_SPEED)
                };
            }
            3 => self.toggle_hint(),
            4 => {
                self.config.accent = if forward {
                    self.config.accent.next()
                } else {
                    self.config.accent.prev()
                };
            }
            5 => {
                let themes = Theme::available_themes();
                if let Some(name) = cycle(&themes, &self.config.theme, forward) {
                    self.config.theme = name;
                }
                if let Some(new_theme) = Theme::load(&self.config.theme) {
                    let theme: &'static Theme = Box::leak(Box::new(new_theme));
                    self.theme = theme;
                    self.menu.theme = theme;
                }
            }
            6 => {
                let locales: Vec<String> = LOCALES.iter().map(|l| l.to_string()).collect();
                if let Some(locale) = cycle(&locales, &self.config.locale, forward) {
                    self.config.locale = locale;
                }
                rust_i18n::set_locale(&self.config.locale);
                self.menu.refresh(&deck_label(&self.criteria));
            }
            _ => return,
        }
        self.keep_setting(self.settings_selected);
    }

    /// Copies a setting the user changed on the settings screen into the config
    /// that gets saved. Anything else overridden on the command line stays out.
    fn keep_setting(&mut self, index: usize) {
        let (saved, live) = (&mut self.saved_config, &self.config);
        match index {
            0 => saved.ignore_accents = live.ignore_accents,
            1 => saved.audio_enabled = live.audio_enabled,
            2 => saved.speed = live.speed,
            3 => saved.show_translation_hint = live.show_translation_hint,
            4 => saved.accent = live.accent,
            5 => saved.theme = live.theme.clone(),
            6 => saved.locale = live.locale.clone(),
            _ => {}
        }
    }

    pub fn save_settings(&mut self) {
        self.config.validate();
        self.saved_config.validate();
        if let Err(e) = self.saved_config.save() {
            log::error!("could not save config: {e:#}");
        }
    }
}

fn cycle(options: &[String], current: &str, forward: bool) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let next = match options.iter().position(|o| o == current) {
        Some(idx) if forward => (idx + 1) % options.len(),
        Some(idx) => (idx + options.len() - 1) % options.len(),
        None => 0,
    };
    Some(options[next].clone())
}

fn deck_label(criteria: &FilterCriteria) -> String {
    if criteria.class.is_none() && criteria.unit.is_none() {
        t!("deck.all").to_string()
    } else {
        criteria.label()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use super::*;
    use crate::audio::{AudioBackend, CancelCheck, FeedbackKind, PlaybackError};
    use crate::vocab::{SourceError, UnitClass, group_units};

    struct MemorySource(Vec<VocabularyItem>);

    impl VocabSource for MemorySource {
        fn describe(&self) -> String {
            "memory".into()
        }

        fn list_classes(&self) -> Result<Vec<UnitClass>, SourceError> {
            Ok(group_units(
                self.0.iter().map(|i| (i.class.as_str(), i.unit.as_str())),
            ))
        }

        fn fetch(&self, criteria: &FilterCriteria) -> Result<Vec<VocabularyItem>, SourceError> {
            Ok(self
                .0
                .iter()
                .filter(|i| criteria.matches(&i.class, &i.unit))
                .cloned()
                .collect())
        }
    }

    fn words() -> Vec<VocabularyItem> {
        vec![
            VocabularyItem::new("1", "chat", "cat").in_unit("beginner", "animals"),
            VocabularyItem::new("2", "chien", "dog").in_unit("beginner", "animals"),
            VocabularyItem::new("3", "pain", "bread").in_unit("beginner", "food"),
        ]
    }

    fn make_app(items: Vec<VocabularyItem>) -> App {
        App::new(Config::default(), Box::new(MemorySource(items)), None, None)
    }

    fn type_word(app: &mut App, word: &str) {
        for ch in word.chars() {
            app.type_char(ch);
        }
    }

    fn current_french(app: &App) -> String {
        app.session()
            .and_then(|s| s.target())
            .map(|t| t.french.clone())
            .unwrap()
    }

    #[test]
    fn empty_deck_cannot_start() {
        let mut app = make_app(Vec::new());
        app.go_to_ready(PracticeMode::Dictation);
        assert_eq!(app.screen, AppScreen::Ready);
        assert!(app.start_session(Instant::now()).is_err());
        assert_eq!(app.screen, AppScreen::Ready);
        assert!(app.status.is_some());
        assert!(app.driver.is_none());
    }

    #[test]
    fn full_dictation_session_reaches_result() {
        let mut app = make_app(words());
        app.go_to_ready(PracticeMode::Dictation);
        app.start_session(Instant::now()).unwrap();
        assert_eq!(app.screen, AppScreen::Practice);

        for _ in 0..3 {
            let answer = current_french(&app);
            type_word(&mut app, &answer);
            app.submit(Instant::now());
        }

        assert_eq!(app.screen, AppScreen::Result);
        let result = app.last_result.as_ref().unwrap();
        assert!(result.completed);
        assert_eq!(result.solved, 3);
        assert_eq!(result.misses, 0);
        assert_eq!(app.history.sessions.len(), 1);
        assert_eq!(app.profile.total_sessions, 1);
    }

    #[test]
    fn miss_then_continue_keeps_word_in_play() {
        let mut app = make_app(words());
        app.go_to_ready(PracticeMode::Dictation);
        app.start_session(Instant::now()).unwrap();

        let missed = current_french(&app);
        type_word(&mut app, "zzz");
        app.submit(Instant::now());
        assert!(app.session().unwrap().is_revealed());

        app.submit(Instant::now());
        let session = app.session().unwrap();
        assert!(!session.is_revealed());
        assert_eq!(session.remaining().len(), 3);
        assert!(session.remaining().iter().any(|i| i.french == missed));
    }

    #[test]
    fn translation_timeout_reveals_answer() {
        let mut app = make_app(words());
        app.config.speed = 1;
        app.go_to_ready(PracticeMode::Translation);
        let start = Instant::now();
        app.start_session(start).unwrap();

        app.tick(start + Duration::from_millis(500));
        assert!(!app.session().unwrap().is_revealed());

        app.tick(start + Duration::from_millis(1100));
        let session = app.session().unwrap();
        assert!(session.is_revealed());
        assert_eq!(session.attempts(), 1);
    }

    #[test]
    fn stale_audio_done_is_ignored() {
        let mut app = make_app(words());
        app.on_audio_done(42, Instant::now());
        assert!(app.driver.is_none());
        assert!(app.pending_chain.is_none());
    }

    #[test]
    fn deck_selection_narrows_the_words() {
        let mut app = make_app(words());
        app.go_to_deck_select();
        assert_eq!(app.screen, AppScreen::DeckSelect);
        // all, beginner, animals, food
        assert_eq!(app.deck_entries.len(), 4);
        app.deck_next();
        app.deck_next();
        app.select_deck();
        assert_eq!(app.criteria.unit.as_deref(), Some("animals"));

        app.go_to_ready(PracticeMode::Dictation);
        assert_eq!(app.items.len(), 2);
    }

    #[test]
    fn abandoning_with_progress_records_incomplete_result() {
        let mut app = make_app(words());
        app.go_to_ready(PracticeMode::Dictation);
        app.start_session(Instant::now()).unwrap();
        let answer = current_french(&app);
        type_word(&mut app, &answer);
        app.submit(Instant::now());

        app.end_session();
        assert_eq!(app.screen, AppScreen::Result);
        let result = app.last_result.as_ref().unwrap();
        assert!(!result.completed);
        assert_eq!(result.solved, 1);
    }

    #[test]
    fn unchecked_words_never_enter_the_session() {
        let mut app = make_app(words());
        app.go_to_word_list();
        assert_eq!(app.screen, AppScreen::WordList);
        assert_eq!(app.selected_count(), 3);

        app.word_next();
        app.toggle_word();
        let dropped = app.items[1].id.clone();
        assert_eq!(app.selected_count(), 2);

        app.go_to_ready(PracticeMode::Dictation);
        app.start_session(Instant::now()).unwrap();
        assert_eq!(app.session().unwrap().total_count(), 2);

        for _ in 0..6 {
            let Some(session) = app.session() else {
                break;
            };
            assert!(session.remaining().iter().all(|i| i.id != dropped));
            if session.is_revealed() {
                app.submit(Instant::now());
                continue;
            }
            // miss once to force a reinsertion, then answer
            if session.attempts() == 0 {
                type_word(&mut app, "zzz");
            } else {
                let answer = current_french(&app);
                type_word(&mut app, &answer);
            }
            app.submit(Instant::now());
        }
        assert_eq!(app.screen, AppScreen::Result);
        assert_eq!(app.last_result.as_ref().unwrap().total, 2);
    }

    #[test]
    fn selection_survives_returning_to_the_menu() {
        let mut app = make_app(words());
        app.go_to_word_list();
        app.toggle_word();
        app.go_to_menu();
        app.go_to_ready(PracticeMode::Translation);
        assert_eq!(app.selected_count(), 2);
        assert_eq!(app.items.len(), 3);
    }

    #[test]
    fn toggle_all_clears_then_restores() {
        let mut app = make_app(words());
        app.go_to_word_list();
        app.toggle_all_words();
        assert_eq!(app.selected_count(), 0);

        app.go_to_ready(PracticeMode::Dictation);
        assert!(app.start_session(Instant::now()).is_err());
        assert!(app.driver.is_none());
        assert!(app.status.is_some());

        app.toggle_all_words();
        assert_eq!(app.selected_count(), 3);
        app.toggle_word();
        app.toggle_all_words();
        assert_eq!(app.selected_count(), 3);
    }

    #[test]
    fn new_deck_resets_the_word_choice() {
        let mut app = make_app(words());
        app.go_to_word_list();
        app.toggle_all_words();

        app.go_to_deck_select();
        // all, beginner, animals, food
        app.deck_selected = 3;
        app.select_deck();
        assert_eq!(app.screen, AppScreen::WordList);
        assert_eq!(app.items.len(), 1);
        assert_eq!(app.selected_count(), 1);
    }

    #[test]
    fn command_line_overrides_are_not_saved() {
        let mut app = make_app(words());
        app.apply_overrides(&CliOverrides {
            speed: Some(12),
            ignore_accents: true,
            no_audio: true,
            theme: None,
        });
        assert_eq!(app.config.speed, 12);
        assert!(!app.config.audio_enabled);
        assert!(app.config.practice(PracticeMode::Dictation).ignore_accents);

        // change only the English hint on the settings screen
        app.go_to_settings();
        for _ in 0..3 {
            app.settings_next();
        }
        app.settings_cycle_forward();

        let saved = app.saved_config();
        let defaults = Config::default();
        assert_eq!(saved.speed, defaults.speed);
        assert_eq!(saved.audio_enabled, defaults.audio_enabled);
        assert_eq!(saved.ignore_accents, defaults.ignore_accents);
        assert_eq!(saved.show_translation_hint, !defaults.show_translation_hint);
        assert_eq!(app.config.speed, 12);
    }

    #[test]
    fn setting_changed_in_app_is_saved_over_override() {
        let mut app = make_app(words());
        app.apply_overrides(&CliOverrides {
            speed: Some(12),
            ..CliOverrides::default()
        });
        app.go_to_settings();
        app.settings_next();
        app.settings_next();
        app.settings_cycle_forward();
        assert_eq!(app.config.speed, 13);
        assert_eq!(app.saved_config().speed, 13);
    }

    /// Holds every cue until the chain is cancelled, reporting starts and
    /// cancellations so tests can see what the worker is doing.
    struct HeldAudio {
        started: mpsc::Sender<AudioCue>,
        cancelled: mpsc::Sender<AudioCue>,
    }

    impl HeldAudio {
        fn hold(&self, cue: AudioCue, cancel: &dyn CancelCheck) -> Result<(), PlaybackError> {
            let _ = self.started.send(cue.clone());
            while !cancel.is_cancelled() {
                thread::sleep(Duration::from_millis(5));
            }
            let _ = self.cancelled.send(cue);
            Err(PlaybackError::Cancelled)
        }
    }

    impl AudioBackend for HeldAudio {
        fn play_feedback(
            &mut self,
            kind: FeedbackKind,
            cancel: &dyn CancelCheck,
        ) -> Result<(), PlaybackError> {
            self.hold(AudioCue::Feedback(kind), cancel)
        }

        fn play_pronunciation(
            &mut self,
            source: &PronunciationSource,
            cancel: &dyn CancelCheck,
        ) -> Result<(), PlaybackError> {
            self.hold(AudioCue::Pronounce(source.clone()), cancel)
        }
    }

    fn wait_for(rx: &mpsc::Receiver<AudioCue>, wanted: &AudioCue) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while let Some(left) = deadline.checked_duration_since(Instant::now()) {
            match rx.recv_timeout(left) {
                Ok(cue) if cue == *wanted => return true,
                Ok(_) => continue,
                Err(_) => return false,
            }
        }
        false
    }

    #[test]
    fn abandoning_a_session_stops_its_audio() {
        let (started_tx, started_rx) = mpsc::channel();
        let (cancelled_tx, cancelled_rx) = mpsc::channel();
        let worker = AudioWorker::spawn(
            Box::new(HeldAudio {
                started: started_tx,
                cancelled: cancelled_tx,
            }),
            |_| {},
        );
        let mut app = App::new(
            Config::default(),
            Box::new(MemorySource(words())),
            Some(worker),
            None,
        );
        app.go_to_ready(PracticeMode::Dictation);
        app.start_session(Instant::now()).unwrap();

        type_word(&mut app, "z");
        app.submit(Instant::now());
        let incorrect = AudioCue::Feedback(FeedbackKind::Incorrect);
        assert!(wait_for(&started_rx, &incorrect), "feedback never started");

        app.end_session();
        assert_eq!(app.screen, AppScreen::Result);
        assert!(
            wait_for(&cancelled_rx, &incorrect),
            "feedback kept playing after the session ended"
        );
    }

    #[test]
    fn settings_clamp_speed() {
        let mut app = make_app(words());
        app.go_to_settings();
        app.settings_next();
        app.settings_next();
        for _ in 0..40 {
            app.settings_cycle_forward();
        }
        assert_eq!(app.config.speed, MAX_SPEED);
        for _ in 0..40 {
            app.settings_cycle_backward();
        }
        assert_eq!(app.config.speed, MIN_SPEED);
    }
}
