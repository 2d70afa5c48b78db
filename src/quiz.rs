use tracing::{debug, info};

use crate::content::Question;
use crate::util::percent;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizScore {
    pub correct: u32,
    pub total: u32,
    /// Canonical score: whole-number percentage of correct answers.
    pub percent: f64,
    /// Sum of `points` over correctly answered questions.
    pub points: u32,
}

impl QuizScore {
    pub fn grade(&self) -> Grade {
        Grade::from_percent(self.percent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Grade {
    #[strum(serialize = "Excellence Award")]
    Excellence,
    #[strum(serialize = "Well Done")]
    WellDone,
    #[strum(serialize = "Keep Learning")]
    KeepLearning,
}

impl Grade {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 80.0 {
            Grade::Excellence
        } else if percent >= 60.0 {
            Grade::WellDone
        } else {
            Grade::KeepLearning
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Grade::Excellence => "Excellent! You're well-prepared for emergencies.",
            Grade::WellDone => "Good job! Consider reviewing some topics.",
            Grade::KeepLearning => "Keep learning! Practice makes perfect.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuizPhase {
    NotStarted,
    /// `furthest` is the first question not yet advanced past; earlier
    /// answers are locked.
    InProgress { current: usize, furthest: usize },
    Completed(QuizScore),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Next(usize),
    Finished(QuizScore),
    /// Not in progress, or the current question has no answer yet.
    Blocked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewItem<'a> {
    pub question: &'a Question,
    pub chosen: Option<&'a str>,
    pub correct: bool,
}

/// One pass through a fixed list of questions.
#[derive(Debug, Clone)]
pub struct QuizRun {
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    phase: QuizPhase,
}

impl QuizRun {
    pub fn new(questions: Vec<Question>) -> Self {
        let answers = vec![None; questions.len()];
        Self {
            questions,
            answers,
            phase: QuizPhase::NotStarted,
        }
    }

    pub fn start(&mut self) {
        self.answers = vec![None; self.questions.len()];
        if self.questions.is_empty() {
            self.phase = QuizPhase::Completed(self.calc_score());
            return;
        }
        self.phase = QuizPhase::InProgress {
            current: 0,
            furthest: 0,
        };
        info!(questions = self.questions.len(), "quiz started");
    }

    /// Returns false when the selection was ignored.
    pub fn select_answer(&mut self, index: usize) -> bool {
        let QuizPhase::InProgress { current, furthest } = self.phase else {
            return false;
        };
        if current != furthest || index >= self.questions[current].options.len() {
            return false;
        }
        self.answers[current] = Some(index);
        debug!(question = current, answer = index, "answer selected");
        true
    }

    pub fn advance(&mut self) -> Advance {
        let QuizPhase::InProgress { current, furthest } = self.phase else {
            return Advance::Blocked;
        };

        if current < furthest {
            self.phase = QuizPhase::InProgress {
                current: current + 1,
                furthest,
            };
            return Advance::Next(current + 1);
        }

        if self.answers[current].is_none() {
            return Advance::Blocked;
        }

        if current + 1 == self.questions.len() {
            let score = self.calc_score();
            self.phase = QuizPhase::Completed(score);
            info!(
                correct = score.correct,
                total = score.total,
                percent = score.percent,
                "quiz completed"
            );
            Advance::Finished(score)
        } else {
            self.phase = QuizPhase::InProgress {
                current: current + 1,
                furthest: current + 1,
            };
            Advance::Next(current + 1)
        }
    }

    /// Step back to an earlier question. Its answer stays locked.
    pub fn previous(&mut self) -> bool {
        match self.phase {
            QuizPhase::InProgress { current, furthest } if current > 0 => {
                self.phase = QuizPhase::InProgress {
                    current: current - 1,
                    furthest,
                };
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.answers = vec![None; self.questions.len()];
        self.phase = QuizPhase::NotStarted;
    }

    fn calc_score(&self) -> QuizScore {
        let (correct, points) = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| **a == Some(q.correct_index))
            .fold((0u32, 0u32), |(n, pts), (q, _)| (n + 1, pts + q.points));
        let total = self.questions.len() as u32;

        QuizScore {
            correct,
            total,
            percent: percent(correct, total),
            points,
        }
    }

    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            QuizPhase::InProgress { current, .. } => Some(current),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().map(|i| &self.questions[i])
    }

    pub fn current_answer(&self) -> Option<usize> {
        self.current_index().and_then(|i| self.answers[i])
    }

    /// Whether the current question can still be answered.
    pub fn is_current_open(&self) -> bool {
        matches!(self.phase, QuizPhase::InProgress { current, furthest } if current == furthest)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index()
            .is_some_and(|i| i + 1 == self.questions.len())
    }

    pub fn score(&self) -> Option<QuizScore> {
        match self.phase {
            QuizPhase::Completed(score) => Some(score),
            _ => None,
        }
    }

    /// Fraction of questions already advanced past, as a percentage.
    pub fn progress_percent(&self) -> f64 {
        match self.phase {
            QuizPhase::NotStarted => 0.0,
            QuizPhase::InProgress { furthest, .. } => {
                percent(furthest as u32, self.questions.len() as u32)
            }
            QuizPhase::Completed(_) => 100.0,
        }
    }

    pub fn estimated_minutes(&self) -> u32 {
        (self.questions.len() as f64 * 1.5).ceil() as u32
    }

    pub fn review(&self) -> Vec<ReviewItem<'_>> {
        self.questions
            .iter()
            .zip(&self.answers)
            .map(|(question, answer)| ReviewItem {
                question,
                chosen: answer.map(|i| question.options[i].as_str()),
                correct: *answer == Some(question.correct_index),
            })
            .collect()
    }
}
