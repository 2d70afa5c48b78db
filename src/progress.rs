use itertools::Itertools;

use crate::content::LearningModule;
use crate::util::mean;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSummary {
    pub module_count: usize,
    /// Mean of per-module progress; 0 when there are no modules.
    pub average_progress: f64,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub total_lessons: u32,
    pub total_minutes: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub category: String,
    pub modules: usize,
    pub average_progress: f64,
}

pub fn summarize(modules: &[LearningModule]) -> ProgressSummary {
    let progress: Vec<f64> = modules.iter().map(|m| m.progress as f64).collect();

    ProgressSummary {
        module_count: modules.len(),
        average_progress: mean(&progress).unwrap_or(0.0),
        completed: modules.iter().filter(|m| m.progress >= 100).count(),
        in_progress: modules
            .iter()
            .filter(|m| (1..100).contains(&m.progress))
            .count(),
        not_started: modules.iter().filter(|m| m.progress == 0).count(),
        total_lessons: modules.iter().map(|m| m.lessons).sum(),
        total_minutes: modules.iter().map(|m| m.duration_minutes).sum(),
    }
}

/// Module count and average progress per category, sorted by category name.
pub fn by_category(modules: &[LearningModule]) -> Vec<CategoryCount> {
    let grouped = modules
        .iter()
        .sorted_by(|a, b| a.category.cmp(&b.category))
        .chunk_by(|m| m.category.clone());

    let counts = grouped
        .into_iter()
        .map(|(category, group)| {
            let progress: Vec<f64> = group.map(|m| m.progress as f64).collect();
            CategoryCount {
                category,
                modules: progress.len(),
                average_progress: mean(&progress).unwrap_or(0.0),
            }
        })
        .collect();
    counts
}

/// Distinct categories in first-seen order.
pub fn categories(modules: &[LearningModule]) -> Vec<&str> {
    modules.iter().map(|m| m.category.as_str()).unique().collect()
}

pub fn filter_by_category<'a>(
    modules: &'a [LearningModule],
    category: Option<&str>,
) -> Vec<&'a LearningModule> {
    modules
        .iter()
        .filter(|m| category.map_or(true, |c| m.category == c))
        .collect()
}
