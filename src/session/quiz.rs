use std::collections::BTreeMap;

use crate::content::Mcq;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionStatus {
    Unanswered,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    KeepPracticing,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            ScoreBand::Excellent
        } else if score >= 60 {
            ScoreBand::Good
        } else {
            ScoreBand::KeepPracticing
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent!",
            ScoreBand::Good => "Good job!",
            ScoreBand::KeepPracticing => "Keep practicing!",
        }
    }
}

/// Percentage of `mcqs` whose recorded answer matches, rounded half up.
/// `None` when there are no questions to grade.
pub fn grade(mcqs: &[Mcq], answers: &BTreeMap<usize, usize>) -> Option<u8> {
    if mcqs.is_empty() {
        return None;
    }
    let correct = mcqs
        .iter()
        .enumerate()
        .filter(|(i, mcq)| answers.get(i) == Some(&mcq.answer))
        .count();
    // Integer form of round(100 * correct / total) with .5 going up.
    let total = mcqs.len();
    let score = (200 * correct + total) / (2 * total);
    Some(score as u8)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuizState {
    /// Question index to selected option index.
    pub answers: BTreeMap<usize, usize>,
    pub submitted: bool,
    pub score: u8,
}

impl QuizState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a choice. Ignored once the quiz has been submitted.
    pub fn select(&mut self, question: usize, option: usize) -> bool {
        if self.submitted {
            return false;
        }
        self.answers.insert(question, option);
        true
    }

    pub fn answered_all(&self, total_questions: usize) -> bool {
        total_questions > 0 && (0..total_questions).all(|i| self.answers.contains_key(&i))
    }

    /// Grades against `mcqs` and freezes the answers. No-op without questions.
    pub fn submit(&mut self, mcqs: &[Mcq]) -> Option<u8> {
        let score = grade(mcqs, &self.answers)?;
        self.score = score;
        self.submitted = true;
        Some(score)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn status(&self, index: usize, mcq: &Mcq) -> QuestionStatus {
        if !self.submitted {
            return QuestionStatus::Unanswered;
        }
        match self.answers.get(&index) {
            Some(&chosen) if chosen == mcq.answer => QuestionStatus::Correct,
            _ => QuestionStatus::Incorrect,
        }
    }

    pub fn band(&self) -> Option<ScoreBand> {
        self.submitted.then(|| ScoreBand::from_score(self.score))
    }
}
