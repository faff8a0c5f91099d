pub mod attempt_log;
pub mod deck;
pub mod session;

use serde_json::Value;

use crate::content::{first_field, scalar_to_string};

/// One multiple-choice question from the quiz bank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizQuestion {
    pub id: Option<String>,
    pub question: String,
    pub choices: Vec<String>,
    pub answer_index: usize,
    pub explanation: String,
    pub tags: Vec<String>,
}

impl QuizQuestion {
    /// Reads a feed record, rejecting questions whose answer is not one of the choices.
    pub fn from_record(record: &Value) -> Option<Self> {
        let question = first_field(record, &["question"]);
        let choices: Vec<String> = record
            .get("choices")
            .and_then(Value::as_array)
            .map(|choices| choices.iter().map(scalar_to_string).collect())
            .unwrap_or_default();
        let answer_index = match record.get("answerIndex") {
            Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };

        let answer_index = match answer_index {
            Some(index) if index < choices.len() && !question.is_empty() => index,
            _ => {
                log::warn!("Dropping invalid quiz question: {}", record);
                return None;
            }
        };

        let id = first_field(record, &["id"]);
        Some(Self {
            id: if id.is_empty() { None } else { Some(id) },
            question,
            choices,
            answer_index,
            explanation: first_field(record, &["explanation"]),
            tags: record
                .get("tags")
                .and_then(Value::as_array)
                .map(|tags| tags.iter().map(scalar_to_string).collect())
                .unwrap_or_default(),
        })
    }
}

pub fn normalize_bank(records: &[Value]) -> Vec<QuizQuestion> {
    records.iter().filter_map(QuizQuestion::from_record).collect()
}

/// Stable id of `bank[index]`, or a positional id when the feed has none.
pub fn question_id(bank: &[QuizQuestion], index: usize) -> String {
    bank.get(index)
        .and_then(|q| q.id.clone())
        .unwrap_or_else(|| format!("idx-{}", index))
}

/// The answer given to one question, frozen at the time of the pick.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AttemptRecord {
    pub question_id: String,
    pub question: String,
    pub choices: Vec<String>,
    pub picked_index: usize,
    pub correct_index: usize,
    pub correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    Presenting,
    Revealed { picked: usize },
    Finished,
}

/// A single pass through a deck.
///
/// `Presenting → pick → Revealed → advance → Presenting | Finished`; any other
/// call is ignored.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuizAttempt {
    deck: Vec<usize>,
    position: usize,
    phase: Phase,
    records: Vec<AttemptRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as usize
    }
}

impl QuizAttempt {
    pub fn new(deck: Vec<usize>) -> Self {
        let phase = if deck.is_empty() {
            Phase::Finished
        } else {
            Phase::Presenting
        };
        Self {
            deck,
            position: 0,
            phase,
            records: Vec::new(),
        }
    }

    pub fn deck(&self) -> &[usize] {
        &self.deck
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn is_last(&self) -> bool {
        self.position + 1 >= self.deck.len()
    }

    pub fn current<'a>(&self, bank: &'a [QuizQuestion]) -> Option<&'a QuizQuestion> {
        if self.is_finished() {
            return None;
        }
        self.deck.get(self.position).and_then(|&index| bank.get(index))
    }

    /// True when the deck points past the end of `bank`, e.g. a stored attempt
    /// that outlived a reload with fewer questions.
    pub fn is_stale(&self, bank: &[QuizQuestion]) -> bool {
        !self.is_finished() && self.deck.iter().any(|&index| index >= bank.len())
    }

    /// Records the first pick for the current question. Returns `None` when the
    /// pick is not allowed (already revealed, finished, or choice out of range).
    pub fn pick(&mut self, bank: &[QuizQuestion], choice: usize) -> Option<&AttemptRecord> {
        if self.phase != Phase::Presenting {
            return None;
        }
        let question = self.current(bank)?;
        if choice >= question.choices.len() {
            return None;
        }

        self.records.push(AttemptRecord {
            question_id: question
                .id
                .clone()
                .unwrap_or_else(|| format!("pos-{}", self.position)),
            question: question.question.clone(),
            choices: question.choices.clone(),
            picked_index: choice,
            correct_index: question.answer_index,
            correct: choice == question.answer_index,
            explanation: question.explanation.clone(),
        });
        self.phase = Phase::Revealed { picked: choice };
        self.records.last()
    }

    /// Moves past a revealed question. Returns `false` if nothing changed.
    pub fn advance(&mut self) -> bool {
        if !matches!(self.phase, Phase::Revealed { .. }) {
            return false;
        }
        if self.is_last() {
            self.phase = Phase::Finished;
        } else {
            self.position += 1;
            self.phase = Phase::Presenting;
        }
        true
    }

    pub fn score(&self) -> Score {
        Score {
            correct: self.records.iter().filter(|r| r.correct).count(),
            total: self.records.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bank() -> Vec<QuizQuestion> {
        normalize_bank(&[
            json!({ "id": "q1", "question": "One?", "choices": ["a", "b"], "answerIndex": 1, "explanation": "b it is" }),
            json!({ "question": "Two?", "choices": ["x", "y", "z"], "answerIndex": "0" }),
        ])
    }

    #[test]
    fn invalid_questions_are_dropped() {
        let bank = normalize_bank(&[
            json!({ "id": "ok", "question": "Q", "choices": ["a"], "answerIndex": 0 }),
            json!({ "id": "oob", "question": "Q", "choices": ["a"], "answerIndex": 1 }),
            json!({ "id": "neg", "question": "Q", "choices": ["a"], "answerIndex": -1 }),
            json!({ "id": "none", "question": "Q", "choices": [] }),
        ]);
        assert_eq!(bank.len(), 1);
        assert_eq!(bank[0].id.as_deref(), Some("ok"));
    }

    #[test]
    fn attempt_over_a_shrunken_bank_is_stale() {
        let bank = bank();
        let attempt = QuizAttempt::new(vec![1, 0]);
        assert!(!attempt.is_stale(&bank));
        assert!(attempt.is_stale(&bank[..1]));
        assert!(attempt.is_stale(&[]));

        let finished = QuizAttempt::new(Vec::new());
        assert!(!finished.is_stale(&[]));
    }

    #[test]
    fn positional_ids_fill_missing_ones() {
        let bank = bank();
        assert_eq!(question_id(&bank, 0), "q1");
        assert_eq!(question_id(&bank, 1), "idx-1");
    }

    #[test]
    fn only_the_first_pick_counts() {
        let bank = bank();
        let mut attempt = QuizAttempt::new(vec![0, 1]);

        let record = attempt.pick(&bank, 0).cloned().unwrap();
        assert!(!record.correct);
        assert_eq!(record.correct_index, 1);
        assert_eq!(record.explanation, "b it is");

        assert!(attempt.pick(&bank, 1).is_none());
        assert_eq!(attempt.records().len(), 1);
        assert_eq!(attempt.phase(), &Phase::Revealed { picked: 0 });
    }

    #[test]
    fn advancing_requires_a_pick() {
        let bank = bank();
        let mut attempt = QuizAttempt::new(vec![1, 0]);

        assert!(!attempt.advance());
        assert_eq!(attempt.position(), 0);

        attempt.pick(&bank, 0);
        assert!(attempt.advance());
        assert_eq!(attempt.position(), 1);
        assert_eq!(attempt.current(&bank).unwrap().question, "One?");

        attempt.pick(&bank, 1);
        assert!(attempt.advance());
        assert!(attempt.is_finished());
        assert!(attempt.current(&bank).is_none());
        assert!(!attempt.advance());

        let score = attempt.score();
        assert_eq!(score, Score { correct: 2, total: 2 });
        assert_eq!(score.percent(), 100);
        assert_eq!(attempt.records()[0].question_id, "pos-0");
    }

    #[test]
    fn out_of_range_pick_is_ignored() {
        let bank = bank();
        let mut attempt = QuizAttempt::new(vec![0]);
        assert!(attempt.pick(&bank, 5).is_none());
        assert_eq!(attempt.phase(), &Phase::Presenting);
    }

    #[test]
    fn empty_deck_starts_finished() {
        let attempt = QuizAttempt::new(Vec::new());
        assert!(attempt.is_finished());
        assert_eq!(attempt.score().percent(), 0);
    }

    #[test]
    fn attempt_survives_dialogue_serialization() {
        let bank = bank();
        let mut attempt = QuizAttempt::new(vec![0, 1]);
        attempt.pick(&bank, 1);

        let stored = serde_json::to_string(&attempt).unwrap();
        let restored: QuizAttempt = serde_json::from_str(&stored).unwrap();
        assert_eq!(restored, attempt);
    }

    #[test]
    fn score_rounds_percentages() {
        assert_eq!(Score { correct: 2, total: 3 }.percent(), 67);
        assert_eq!(Score { correct: 1, total: 3 }.percent(), 33);
    }
}
