//! Toast notifications.
//!
//! The core raises [`Notice`]s through the [`Notifier`] trait; the terminal
//! shell collects them in a [`ToastQueue`] that drops entries once they have
//! been on screen for their time to live.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::drill::DrillEvent;
use crate::quiz::{Grade, QuizScore};

pub const TOAST_TTL: Duration = Duration::from_secs(4);
pub const TOAST_CAPACITY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
    pub raised_at: Instant,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            raised_at: Instant::now(),
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, title, description)
    }

    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, title, description)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, title, description)
    }
}

pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

#[derive(Debug)]
pub struct ToastQueue {
    toasts: VecDeque<Notice>,
    capacity: usize,
    ttl: Duration,
}

impl ToastQueue {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            toasts: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Drop toasts older than the time to live, measured at `now`.
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.raised_at) < ttl);
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.toasts.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(TOAST_CAPACITY, TOAST_TTL)
    }
}

impl Notifier for ToastQueue {
    fn notify(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => warn!(title = %notice.title, "{}", notice.description),
            _ => info!(kind = %notice.kind, title = %notice.title, "{}", notice.description),
        }
        if self.toasts.len() == self.capacity {
            self.toasts.pop_front();
        }
        self.toasts.push_back(notice);
    }
}

pub fn quiz_notice(score: &QuizScore) -> Notice {
    let description = format!(
        "You scored {:.0}% ({}/{} correct, {} points). {}",
        score.percent,
        score.correct,
        score.total,
        score.points,
        score.grade().message()
    );
    match score.grade() {
        Grade::KeepLearning => Notice::warning("Quiz Completed", description),
        _ => Notice::success("Quiz Completed!", description),
    }
}

/// Notice worth raising for a drill event, if any.
pub fn drill_notice(event: &DrillEvent) -> Option<Notice> {
    match event {
        DrillEvent::Started { steps } => Some(Notice::success(
            "Drill Started",
            format!("{steps} steps. Follow the instructions carefully."),
        )),
        DrillEvent::StepTimedOut { .. } => Some(Notice::warning(
            "Time's Up!",
            "Moving to the next step.",
        )),
        DrillEvent::StepAnswered { correct: true, points, .. } => Some(Notice::success(
            "Correct!",
            format!("+{points} points"),
        )),
        DrillEvent::StepAnswered { correct: false, .. } => Some(Notice::warning(
            "Incorrect",
            "Review the explanation after the drill.",
        )),
        DrillEvent::Completed(summary) => Some(Notice::success(
            "Drill Completed!",
            format!(
                "You scored {} of {} points ({:.0}%).",
                summary.score, summary.max_score, summary.percent
            ),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill::DrillSummary;

    #[test]
    fn test_queue_is_bounded() {
        let mut queue = ToastQueue::new(2, TOAST_TTL);

        queue.notify(Notice::success("one", ""));
        queue.notify(Notice::success("two", ""));
        queue.notify(Notice::error("three", ""));

        assert_eq!(queue.len(), 2);
        let titles: Vec<_> = queue.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["two", "three"]);
        assert_eq!(queue.latest().map(|t| t.kind), Some(NoticeKind::Error));
    }

    #[test]
    fn test_expire_drops_old_toasts() {
        let mut queue = ToastQueue::new(3, Duration::from_secs(4));
        queue.notify(Notice::warning("old", ""));
        let raised = queue.latest().unwrap().raised_at;

        queue.expire(raised + Duration::from_secs(3));
        assert_eq!(queue.len(), 1);

        queue.expire(raised + Duration::from_secs(5));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_quiz_notice_follows_grade() {
        let passing = QuizScore {
            correct: 8,
            total: 10,
            percent: 80.0,
            points: 80,
        };
        let failing = QuizScore {
            correct: 2,
            total: 10,
            percent: 20.0,
            points: 20,
        };

        assert_eq!(quiz_notice(&passing).kind, NoticeKind::Success);
        assert!(quiz_notice(&passing).description.contains("80%"));
        assert_eq!(quiz_notice(&failing).kind, NoticeKind::Warning);
    }

    #[test]
    fn test_drill_notices() {
        assert!(drill_notice(&DrillEvent::Ticked { secs_left: 3 }).is_none());
        assert_eq!(
            drill_notice(&DrillEvent::StepTimedOut { step: 0 }).map(|n| n.kind),
            Some(NoticeKind::Warning)
        );

        let summary = DrillSummary {
            scenario_id: 1,
            score: 30,
            max_score: 45,
            percent: 67.0,
            steps_correct: 2,
            timeouts: 1,
            avg_response_secs: None,
        };
        let done = drill_notice(&DrillEvent::Completed(summary)).unwrap();
        assert_eq!(done.description, "You scored 30 of 45 points (67%).");
    }
}
