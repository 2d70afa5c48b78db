use include_dir::{include_dir, Dir};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ContentError;

static CONTENT_DIR: Dir = include_dir!("src/content/data");

pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizCategory {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
}

/// A multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub points: u32,
}

impl Question {
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Action,
    Decision,
    Evacuation,
}

impl StepKind {
    /// Action and evacuation steps are confirmed rather than answered.
    pub fn is_confirmable(&self) -> bool {
        matches!(self, StepKind::Action | StepKind::Evacuation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillStep {
    pub id: u32,
    pub instruction: String,
    pub time_limit_secs: u32,
    pub kind: StepKind,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_option: Option<usize>,
    pub points: u32,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Active,
    Scheduled,
    Available,
    #[strum(serialize = "Coming Soon")]
    ComingSoon,
}

impl ScenarioStatus {
    pub fn is_startable(&self) -> bool {
        matches!(self, ScenarioStatus::Active | ScenarioStatus::Available)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillScenario {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub hazard: String,
    pub difficulty: Difficulty,
    pub status: ScenarioStatus,
    pub objectives: Vec<String>,
    pub steps: Vec<DrillStep>,
}

impl DrillScenario {
    pub fn max_points(&self) -> u32 {
        self.steps.iter().map(|s| s.points).sum()
    }

    pub fn total_secs(&self) -> u32 {
        self.steps.iter().map(|s| s.time_limit_secs).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningModule {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub lessons: u32,
    /// Completion percentage, 0..=100.
    pub progress: u8,
    pub topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct QuizFile {
    categories: Vec<QuizCategory>,
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct DrillFile {
    scenarios: Vec<DrillScenario>,
}

#[derive(Deserialize)]
struct ModuleFile {
    modules: Vec<LearningModule>,
}

/// All static content, validated once at load.
#[derive(Debug, Clone)]
pub struct ContentRegistry {
    pub categories: Vec<QuizCategory>,
    pub questions: Vec<Question>,
    pub scenarios: Vec<DrillScenario>,
    pub modules: Vec<LearningModule>,
}

impl ContentRegistry {
    /// Load the content compiled into the binary.
    pub fn load() -> Result<Self, ContentError> {
        let quiz: QuizFile = read_embedded("quiz.json")?;
        let drills: DrillFile = read_embedded("drills.json")?;
        let modules: ModuleFile = read_embedded("modules.json")?;

        Self::new(
            quiz.categories,
            quiz.questions,
            drills.scenarios,
            modules.modules,
        )
    }

    pub fn new(
        categories: Vec<QuizCategory>,
        questions: Vec<Question>,
        scenarios: Vec<DrillScenario>,
        modules: Vec<LearningModule>,
    ) -> Result<Self, ContentError> {
        let registry = Self {
            categories,
            questions,
            scenarios,
            modules,
        };
        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> Result<(), ContentError> {
        unique_ids("category", self.categories.iter().map(|c| c.id.clone()))?;
        unique_ids("question", self.questions.iter().map(|q| q.id.to_string()))?;
        unique_ids("scenario", self.scenarios.iter().map(|s| s.id.to_string()))?;
        unique_ids("module", self.modules.iter().map(|m| m.id.to_string()))?;

        for q in &self.questions {
            validate_question(q)?;
        }
        for scenario in &self.scenarios {
            unique_ids(
                "step",
                scenario
                    .steps
                    .iter()
                    .map(|s| format!("{}.{}", scenario.id, s.id)),
            )?;
            for step in &scenario.steps {
                validate_step(scenario.id, step)?;
            }
        }
        for m in &self.modules {
            if m.progress > 100 {
                return Err(ContentError::InvalidModule {
                    id: m.id,
                    reason: format!("progress {} exceeds 100", m.progress),
                });
            }
        }
        Ok(())
    }

    pub fn category(&self, id: &str) -> Option<&QuizCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Questions in registry order, optionally restricted to one category.
    pub fn questions_in(&self, category: Option<&str>) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| category.map_or(true, |c| q.category == c))
            .cloned()
            .collect()
    }

    pub fn scenario(&self, id: u32) -> Option<&DrillScenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn startable_scenarios(&self) -> impl Iterator<Item = &DrillScenario> {
        self.scenarios.iter().filter(|s| s.status.is_startable())
    }
}

fn read_embedded<T: DeserializeOwned>(file_name: &str) -> Result<T, ContentError> {
    let file = CONTENT_DIR
        .get_file(file_name)
        .ok_or_else(|| ContentError::Missing(file_name.to_string()))?;

    let contents = file.contents_utf8().ok_or_else(|| ContentError::Encoding {
        file: file_name.to_string(),
    })?;

    serde_json::from_str(contents).map_err(|source| ContentError::Parse {
        file: file_name.to_string(),
        source,
    })
}

fn unique_ids(
    kind: &'static str,
    ids: impl Iterator<Item = String>,
) -> Result<(), ContentError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            return Err(ContentError::DuplicateId { kind, id });
        }
    }
    Ok(())
}

fn validate_question(q: &Question) -> Result<(), ContentError> {
    let invalid = |reason: String| ContentError::InvalidQuestion { id: q.id, reason };

    if q.options.len() != OPTIONS_PER_QUESTION {
        return Err(invalid(format!(
            "expected {OPTIONS_PER_QUESTION} options, found {}",
            q.options.len()
        )));
    }
    if q.correct_index >= q.options.len() {
        return Err(invalid(format!(
            "correct index {} out of range",
            q.correct_index
        )));
    }
    Ok(())
}

fn validate_step(scenario: u32, step: &DrillStep) -> Result<(), ContentError> {
    let invalid = |reason: &str| ContentError::InvalidStep {
        scenario,
        step: step.id,
        reason: reason.to_string(),
    };

    if step.time_limit_secs == 0 {
        return Err(invalid("time limit must be positive"));
    }
    match step.kind {
        StepKind::Decision => {
            if step.options.len() < 2 {
                return Err(invalid("decision step needs at least two options"));
            }
            match step.correct_option {
                Some(idx) if idx < step.options.len() => Ok(()),
                Some(_) => Err(invalid("correct option out of range")),
                None => Err(invalid("decision step has no correct option")),
            }
        }
        StepKind::Action | StepKind::Evacuation => {
            if step.correct_option.is_some() {
                return Err(invalid("only decision steps carry a correct option"));
            }
            Ok(())
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_embedded_content_loads() {
        let registry = ContentRegistry::load().unwrap();

        assert_eq!(registry.categories.len(), 4);
        assert_eq!(registry.questions.len(), 10);
        assert_eq!(registry.scenarios.len(), 6);
        assert_eq!(registry.modules.len(), 6);
    }

    #[test]
    fn test_every_category_has_questions() {
        let registry = ContentRegistry::load().unwrap();

        for category in &registry.categories {
            assert!(
                !registry.questions_in(Some(&category.id)).is_empty(),
                "category {} has no questions",
                category.id
            );
        }
    }

    #[test]
    fn test_questions_in_filters_by_category() {
        let registry = ContentRegistry::load().unwrap();

        let fire = registry.questions_in(Some("fire"));
        assert!(fire.iter().all(|q| q.category == "fire"));
        assert_eq!(registry.questions_in(None).len(), registry.questions.len());
        assert!(registry.questions_in(Some("volcano")).is_empty());
    }

    #[test]
    fn test_scheduled_and_coming_soon_are_not_startable() {
        let registry = ContentRegistry::load().unwrap();

        assert!(!registry.scenario(2).unwrap().status.is_startable());
        assert!(!registry.scenario(6).unwrap().status.is_startable());
        assert!(registry.scenario(1).unwrap().status.is_startable());
        assert_eq!(registry.startable_scenarios().count(), 4);
    }

    #[test]
    fn test_scenario_totals() {
        let s = scenario(vec![decision(1, 10, 0, 20), action(2, 15, 5)]);
        assert_eq!(s.max_points(), 25);
        assert_eq!(s.total_secs(), 25);
    }

    #[test]
    fn test_question_needs_four_options() {
        let mut q = question(1, 0);
        q.options.pop();

        let err = ContentRegistry::new(vec![], vec![q], vec![], vec![]).unwrap_err();
        assert_matches!(err, ContentError::InvalidQuestion { id: 1, .. });
    }

    #[test]
    fn test_question_correct_index_in_range() {
        let q = question(1, 4);

        let err = ContentRegistry::new(vec![], vec![q], vec![], vec![]).unwrap_err();
        assert_matches!(err, ContentError::InvalidQuestion { id: 1, .. });
    }

    #[test]
    fn test_duplicate_question_ids_rejected() {
        let err = ContentRegistry::new(vec![], vec![question(7, 0), question(7, 1)], vec![], vec![])
            .unwrap_err();
        assert_matches!(err, ContentError::DuplicateId { kind: "question", .. });
    }

    #[test]
    fn test_decision_step_without_answer_rejected() {
        let mut step = decision(1, 10, 0, 10);
        step.correct_option = None;

        let err = ContentRegistry::new(vec![], vec![], vec![scenario(vec![step])], vec![])
            .unwrap_err();
        assert_matches!(err, ContentError::InvalidStep { scenario: 99, step: 1, .. });
    }

    #[test]
    fn test_zero_time_limit_rejected() {
        let err = ContentRegistry::new(
            vec![],
            vec![],
            vec![scenario(vec![action(1, 0, 5)])],
            vec![],
        )
        .unwrap_err();
        assert_matches!(err, ContentError::InvalidStep { .. });
    }

    #[test]
    fn test_step_kind_deserializes_snake_case() {
        let step: DrillStep = serde_json::from_str(
            r#"{"id": 1, "instruction": "go", "time_limit_secs": 30, "kind": "evacuation", "points": 5}"#,
        )
        .unwrap();

        assert_eq!(step.kind, StepKind::Evacuation);
        assert!(step.kind.is_confirmable());
        assert!(step.options.is_empty());
        assert_eq!(step.correct_option, None);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ScenarioStatus::ComingSoon.to_string(), "Coming Soon");
        assert_eq!(ScenarioStatus::Active.to_string(), "Active");
        assert_eq!(Difficulty::Intermediate.to_string(), "Intermediate");
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_embedded::<QuizFile>("nonexistent.json");
        assert_matches!(result, Err(ContentError::Missing(_)));
    }
}
