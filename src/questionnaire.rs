use crate::error::{EngineError, EngineResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOption {
    pub label: String,
    /// Signed contribution added to the baseline score.
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<AnswerOption>,
}

#[derive(Debug, Clone)]
pub struct Questionnaire {
    questions: Vec<Question>,
}

// (prompt, [(label, contribution)])
const QUESTIONS: &[(&str, &[(&str, i32)])] = &[
    (
        "When will you need most of this money?",
        &[
            ("Within 2 years", -15),
            ("In 2 to 5 years", -5),
            ("In 5 to 10 years", 5),
            ("More than 10 years away", 15),
        ],
    ),
    (
        "Your portfolio falls 20% in a month. What do you do?",
        &[
            ("Sell everything", -15),
            ("Sell some to limit losses", -8),
            ("Hold and wait", 5),
            ("Buy more while it's cheap", 12),
        ],
    ),
    (
        "What is your main goal for this money?",
        &[
            ("Protect what I have", -12),
            ("Steady income", -4),
            ("A mix of income and growth", 4),
            ("Maximum long-term growth", 12),
        ],
    ),
    (
        "How much investing experience do you have?",
        &[
            ("None", -8),
            ("Some, mostly managed funds or super", 0),
            ("I pick my own shares or ETFs", 8),
        ],
    ),
    (
        "How many months of expenses do you hold as an emergency fund?",
        &[
            ("None", -10),
            ("Less than 3 months", -4),
            ("3 to 6 months", 3),
            ("More than 6 months", 8),
        ],
    ),
    (
        "How secure is your income?",
        &[
            ("Irregular or at risk", -8),
            ("Fairly stable", 0),
            ("Very secure", 6),
        ],
    ),
    (
        "How do you feel about crypto and thematic funds?",
        &[
            ("Keep them out entirely", -10),
            ("A small slice is fine", 3),
            ("Happy to ride large swings", 10),
        ],
    ),
];

static BUILTIN: Lazy<Questionnaire> = Lazy::new(|| Questionnaire {
    questions: QUESTIONS
        .iter()
        .map(|(prompt, options)| Question {
            prompt: prompt.to_string(),
            options: options
                .iter()
                .map(|(label, score)| AnswerOption {
                    label: label.to_string(),
                    score: *score,
                })
                .collect(),
        })
        .collect(),
});

impl Questionnaire {
    pub fn builtin() -> &'static Questionnaire {
        &BUILTIN
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn option(&self, question: usize, option: usize) -> EngineResult<&AnswerOption> {
        let q = self.questions.get(question).ok_or(EngineError::InvalidQuestion {
            index: question,
            len: self.questions.len(),
        })?;
        q.options.get(option).ok_or(EngineError::InvalidOption {
            question,
            option,
            len: q.options.len(),
        })
    }
}

/// One slot per question; `None` means unanswered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSequence(Vec<Option<i32>>);

impl AnswerSequence {
    pub fn unanswered(len: usize) -> Self {
        Self(vec![None; len])
    }

    pub fn for_questionnaire(questionnaire: &Questionnaire) -> Self {
        Self::unanswered(questionnaire.len())
    }

    /// Record the chosen option's contribution in slot `question`. Other slots are untouched.
    pub fn select(
        &mut self,
        questionnaire: &Questionnaire,
        question: usize,
        option: usize,
    ) -> EngineResult<i32> {
        let score = questionnaire.option(question, option)?.score;
        let slot = self.0.get_mut(question).ok_or(EngineError::InvalidQuestion {
            index: question,
            len: questionnaire.len(),
        })?;
        *slot = Some(score);
        Ok(score)
    }

    pub fn clear(&mut self, question: usize) -> EngineResult<()> {
        let len = self.0.len();
        let slot = self
            .0
            .get_mut(question)
            .ok_or(EngineError::InvalidQuestion { index: question, len })?;
        *slot = None;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.0.iter_mut().for_each(|slot| *slot = None);
    }

    pub fn slots(&self) -> &[Option<i32>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn answered_count(&self) -> usize {
        self.0.iter().filter(|s| s.is_some()).count()
    }

    pub fn first_unanswered(&self) -> Option<usize> {
        self.0.iter().position(|s| s.is_none())
    }

    pub fn is_complete(&self) -> bool {
        self.first_unanswered().is_none()
    }
}
