use crate::error::{EngineResult, SessionError};
use crate::models::ModelOverride;
use crate::questionnaire::{AnswerSequence, Questionnaire};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PORTFOLIO_VALUE: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "stage", content = "question")]
pub enum Stage {
    #[default]
    Intro,
    Quiz(usize),
    Results,
}

/// The interactive session: everything the UI restores on startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub theme: Theme,
    pub stage: Stage,
    pub answers: AnswerSequence,
    pub model_override: ModelOverride,
    pub portfolio_value: f64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new(questionnaire: &Questionnaire) -> Self {
        Self {
            theme: Theme::default(),
            stage: Stage::default(),
            answers: AnswerSequence::for_questionnaire(questionnaire),
            model_override: ModelOverride::Auto,
            portfolio_value: DEFAULT_PORTFOLIO_VALUE,
            updated_at: None,
        }
    }

    /// Record an answer and move to the next unanswered question, or to results.
    pub fn answer(
        &mut self,
        questionnaire: &Questionnaire,
        question: usize,
        option: usize,
    ) -> EngineResult<i32> {
        let score = self.answers.select(questionnaire, question, option)?;
        self.stage = match self.answers.first_unanswered() {
            Some(next) => Stage::Quiz(next),
            None => Stage::Results,
        };
        Ok(score)
    }

    /// Restart the quiz. Theme, override and portfolio value survive.
    pub fn reset(&mut self) {
        self.answers.reset();
        self.stage = Stage::Intro;
    }
}

/// JSON-file backed session persistence. Overwritten wholesale on every save.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved session. Missing or invalid state falls back to defaults.
    pub fn load(&self, questionnaire: &Questionnaire) -> SessionState {
        let contents = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no saved session, starting fresh");
                return SessionState::new(questionnaire);
            }
        };

        match serde_json::from_str::<SessionState>(&contents) {
            Ok(state) if state.answers.len() == questionnaire.len() => state,
            Ok(state) => {
                tracing::warn!(
                    path = %self.path.display(),
                    saved = state.answers.len(),
                    expected = questionnaire.len(),
                    "saved answers do not match questionnaire, starting fresh"
                );
                SessionState::new(questionnaire)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not parse saved session, starting fresh");
                SessionState::new(questionnaire)
            }
        }
    }

    pub fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        let mut state = state.clone();
        state.updated_at = Some(Utc::now());

        let json = serde_json::to_string_pretty(&state)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }
}

static AMOUNT_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,$_]|AUD|A\$").expect("valid regex"));

/// Parse user-entered money such as `"$250,000"`. Anything unparseable is 0.
pub fn parse_portfolio_value(input: &str) -> f64 {
    let cleaned = AMOUNT_NOISE.replace_all(input.trim(), "");
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Negative amounts are not meaningful projections; clamp before calling the engine.
pub fn clamp_portfolio_value(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelName;

    fn temp_store(name: &str) -> SessionStore {
        let path = std::env::temp_dir().join(format!(
            "wealth_engine_{}_{}.json",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        SessionStore::new(path)
    }

    #[test]
    fn missing_file_loads_defaults() {
        let q = Questionnaire::builtin();
        let state = temp_store("missing").load(q);
        assert_eq!(state, SessionState::new(q));
        assert_eq!(state.portfolio_value, DEFAULT_PORTFOLIO_VALUE);
    }

    #[test]
    fn save_then_load_restores_state() {
        let q = Questionnaire::builtin();
        let store = temp_store("roundtrip");

        let mut state = SessionState::new(q);
        state.theme = Theme::Light;
        state.answer(q, 0, 3).unwrap();
        state.model_override = ModelOverride::Fixed(ModelName::Balanced);
        state.portfolio_value = 42_000.0;
        store.save(&state).unwrap();

        let loaded = store.load(q);
        assert_eq!(loaded.theme, Theme::Light);
        assert_eq!(loaded.stage, Stage::Quiz(1));
        assert_eq!(loaded.answers, state.answers);
        assert_eq!(loaded.model_override, ModelOverride::Fixed(ModelName::Balanced));
        assert_eq!(loaded.portfolio_value, 42_000.0);
        assert!(loaded.updated_at.is_some());

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let q = Questionnaire::builtin();
        let store = temp_store("corrupt");
        fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load(q), SessionState::new(q));
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn unknown_override_in_file_loads_defaults() {
        let q = Questionnaire::builtin();
        let store = temp_store("bad_override");
        let mut value = serde_json::to_value(SessionState::new(q)).unwrap();
        value["model_override"] = serde_json::json!("Speculative");
        fs::write(store.path(), value.to_string()).unwrap();

        assert_eq!(store.load(q).model_override, ModelOverride::Auto);
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn wrong_answer_length_loads_defaults() {
        let q = Questionnaire::builtin();
        let store = temp_store("short");
        let mut state = SessionState::new(q);
        state.answers = AnswerSequence::unanswered(2);
        state.theme = Theme::Light;
        store.save(&state).unwrap();

        assert_eq!(store.load(q).theme, Theme::Dark);
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn answering_last_question_moves_to_results() {
        let q = Questionnaire::builtin();
        let mut state = SessionState::new(q);
        for i in 0..q.len() {
            state.answer(q, i, 1).unwrap();
        }
        assert_eq!(state.stage, Stage::Results);

        state.reset();
        assert_eq!(state.stage, Stage::Intro);
        assert_eq!(state.answers.answered_count(), 0);
    }

    #[test]
    fn parses_currency_text() {
        assert_eq!(parse_portfolio_value("$250,000"), 250_000.0);
        assert_eq!(parse_portfolio_value(" 1 000 000.50 "), 1_000_000.5);
        assert_eq!(parse_portfolio_value("A$12,500"), 12_500.0);
        assert_eq!(parse_portfolio_value("-500"), -500.0);
        assert_eq!(parse_portfolio_value(""), 0.0);
        assert_eq!(parse_portfolio_value("lots"), 0.0);
        assert_eq!(parse_portfolio_value("inf"), 0.0);
    }

    #[test]
    fn clamps_negative_values() {
        assert_eq!(clamp_portfolio_value(-1.0), 0.0);
        assert_eq!(clamp_portfolio_value(f64::NAN), 0.0);
        assert_eq!(clamp_portfolio_value(10.0), 10.0);
    }
}
