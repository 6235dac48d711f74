use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::ROADMAP_TITLE_MAX;
use crate::text::shorten;

/// Total time shown when neither the caller nor the model gave one.
pub const UNSPECIFIED_TIME: &str = "Not specified";

/// One ordered step of a curriculum outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumStep {
    pub title: String,
    pub estimated_time: String,
}

/// Overview and steps as produced by generation or modification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumOutline {
    pub title: String,
    pub overview: String,
    pub total_time: String,
    pub steps: Vec<CurriculumStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LearningResource {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub description: String,
    /// `essential` or `supplementary`.
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PracticeExercise {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepConnections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Expanded learning content for one step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepDetail {
    pub step_title: String,
    pub estimated_time: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default)]
    pub core_concepts: String,
    #[serde(default)]
    pub learning_resources: Vec<LearningResource>,
    #[serde(default)]
    pub practice_exercises: Vec<PracticeExercise>,
    #[serde(default)]
    pub assessment_methods: String,
    #[serde(default)]
    pub advanced_topics: Vec<String>,
    #[serde(default)]
    pub connections: StepConnections,
}

/// Lifecycle position derived from steps and stored details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurriculumState {
    Draft,
    Outlined,
    PartiallyDetailed,
    FullyDetailed,
}

impl CurriculumState {
    /// State for `steps` steps of which `detailed` have a stored detail.
    #[must_use]
    pub const fn from_counts(steps: usize, detailed: usize) -> Self {
        if steps == 0 {
            Self::Draft
        } else if detailed == 0 {
            Self::Outlined
        } else if detailed >= steps {
            Self::FullyDetailed
        } else {
            Self::PartiallyDetailed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curriculum {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub overview: String,
    pub total_time: String,
    pub steps: Vec<CurriculumStep>,
    /// Details keyed by step index, all generated against `revision`.
    pub detailed_steps: BTreeMap<usize, StepDetail>,
    /// Bumped by every modification.
    pub revision: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllabus_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_constraint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing entry for a curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumSummary {
    pub id: String,
    pub title: String,
    pub state: CurriculumState,
    pub updated_at: DateTime<Utc>,
}

impl Curriculum {
    #[must_use]
    pub fn state(&self) -> CurriculumState {
        let detailed = self.detailed_steps.keys().filter(|i| **i < self.steps.len()).count();
        CurriculumState::from_counts(self.steps.len(), detailed)
    }

    /// Step indices that have no stored detail yet.
    #[must_use]
    pub fn missing_detail_indices(&self) -> Vec<usize> {
        (0..self.steps.len()).filter(|i| !self.detailed_steps.contains_key(i)).collect()
    }

    /// Markdown rendering of the overview and step list.
    #[must_use]
    pub fn formatted_text(&self) -> String {
        let mut text = format!("# {}\n\n## Overview\n{}\n\n", self.title, self.overview);
        let _ = write!(text, "**Total Time: {}**\n\n## Learning Steps\n\n", self.total_time);
        for (i, step) in self.steps.iter().enumerate() {
            let _ = write!(
                text,
                "### {}. {}\n**Estimated Time:** {}\n\n",
                i + 1,
                step.title,
                step.estimated_time
            );
        }
        text
    }

    /// Mermaid flowchart from start through every step to completion.
    #[must_use]
    pub fn roadmap(&self) -> String {
        let mut chart = String::from("flowchart LR\n");
        if self.steps.is_empty() {
            chart.push_str("    Start([Start]) --> Finish([Complete])\n");
            return chart;
        }
        chart.push_str("    Start([Start]) --> Step1\n");
        for (i, step) in self.steps.iter().enumerate() {
            let n = i + 1;
            let title = shorten(&step.title, ROADMAP_TITLE_MAX).replace('"', "'");
            let time = step.estimated_time.replace('"', "'");
            let _ = writeln!(chart, "    Step{n}[\"{title}<br><small>{time}</small>\"]");
            if n < self.steps.len() {
                let _ = writeln!(chart, "    Step{n} --> Step{}", n + 1);
            }
        }
        let _ = writeln!(chart, "    Step{} --> Finish([Complete])", self.steps.len());
        chart
    }
}

impl StepDetail {
    /// Markdown rendering of the detail.
    #[must_use]
    pub fn formatted_text(&self) -> String {
        let mut text = format!("# {}\n\n**Estimated Time:** {}\n\n", self.step_title, self.estimated_time);

        text.push_str("## Learning Objectives\n\n");
        for (i, objective) in self.learning_objectives.iter().enumerate() {
            let _ = writeln!(text, "{}. {objective}", i + 1);
        }
        text.push_str("\n## Subtopics\n\n");
        for subtopic in &self.subtopics {
            let _ = writeln!(text, "- {subtopic}");
        }
        let _ = write!(text, "\n## Overview of Core Concepts\n\n{}\n\n", self.core_concepts);

        text.push_str("## Learning Resources\n\n");
        for (i, resource) in self.learning_resources.iter().enumerate() {
            let url = resource.url.as_deref().unwrap_or("#");
            let label = if resource.kind.is_empty() { String::new() } else { format!(" ({})", resource.kind) };
            let _ = write!(text, "{}. [{}]({url}){label}\n   {}\n\n", i + 1, resource.title, resource.description);
        }

        text.push_str("## Practice Exercises\n\n");
        for (i, exercise) in self.practice_exercises.iter().enumerate() {
            let level =
                if exercise.difficulty.is_empty() { String::new() } else { format!(" ({})", exercise.difficulty) };
            let _ = write!(text, "### Exercise {}: {}{level}\n{}\n\n", i + 1, exercise.title, exercise.description);
        }

        let _ = write!(text, "## Assessment Methods\n\n{}\n\n", self.assessment_methods);

        text.push_str("## Advanced Topics\n\n");
        for topic in &self.advanced_topics {
            let _ = writeln!(text, "- {topic}");
        }

        if self.connections.previous.is_some() || self.connections.next.is_some() {
            text.push_str("\n## Connections\n\n");
            if let Some(previous) = &self.connections.previous {
                let _ = writeln!(text, "**Previous:** {previous}");
            }
            if let Some(next) = &self.connections.next {
                let _ = writeln!(text, "**Next:** {next}");
            }
        }
        text
    }
}
