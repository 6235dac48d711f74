use std::fmt::Write as _;

use edumate_core::{Curriculum, CurriculumOutline, CurriculumStep, StepDetail, UNSPECIFIED_TIME};

use crate::ai_types::{Message, OutlineJson, StepDetailJson};
use crate::assistant::Assistant;
use crate::client::truncate;
use crate::error::LlmError;
use crate::search::SearchHit;

const MAX_SYLLABUS_BYTES: usize = 20_000;

const DESIGNER_PROMPT: &str = "You are an expert educational curriculum designer.";

const OUTLINE_FORMAT: &str = "Format your response as JSON with this structure:
{\"title\": \"Curriculum Title\", \"overview\": \"Brief overview paragraph\",
 \"steps\": [{\"title\": \"Step Title\", \"estimated_time\": \"X hours/weeks\"}]}";

const DETAIL_FORMAT: &str = "Return JSON with this structure:
{\"learning_objectives\": [\"...\"], \"subtopics\": [\"...\"], \"core_concepts\": \"...\",
 \"learning_resources\": [{\"title\": \"...\", \"url\": \"...\", \"description\": \"...\", \"type\": \"essential/supplementary\"}],
 \"practice_exercises\": [{\"title\": \"...\", \"description\": \"...\", \"difficulty\": \"beginner/intermediate/advanced\"}],
 \"assessment_methods\": \"...\", \"advanced_topics\": [\"...\"],
 \"connections\": {\"previous\": \"how this builds on earlier steps\", \"next\": \"how this prepares for later steps\"}}";

fn outline_from_json(json: OutlineJson, subject: &str, total_time: &str) -> CurriculumOutline {
    let steps = json
        .steps
        .into_iter()
        .map(|s| CurriculumStep {
            title: if s.title.trim().is_empty() { "Untitled Step".to_owned() } else { s.title.trim().to_owned() },
            estimated_time: if s.estimated_time.trim().is_empty() {
                UNSPECIFIED_TIME.to_owned()
            } else {
                s.estimated_time.trim().to_owned()
            },
        })
        .collect();
    CurriculumOutline {
        title: if json.title.trim().is_empty() { format!("Curriculum for {subject}") } else { json.title },
        overview: json.overview,
        total_time: total_time.to_owned(),
        steps,
    }
}

/// Outline used when the model reply cannot be read. It has no steps, so the
/// curriculum starts as a draft.
fn fallback_outline(subject: &str, total_time: &str) -> CurriculumOutline {
    CurriculumOutline {
        title: format!("Curriculum for {subject}"),
        overview: format!(
            "This curriculum covers the fundamentals of {subject}, progressing from basic concepts to advanced applications."
        ),
        total_time: total_time.to_owned(),
        steps: Vec::new(),
    }
}

fn render_steps(steps: &[CurriculumStep]) -> String {
    let mut out = String::new();
    for (i, step) in steps.iter().enumerate() {
        let _ = writeln!(out, "{}. {} ({})", i + 1, step.title, step.estimated_time);
    }
    out
}

impl Assistant {
    /// Draft a curriculum outline for a subject.
    ///
    /// An unreadable reply yields a step-less fallback outline; transport
    /// failures are returned as errors.
    pub async fn outline_curriculum(
        &self,
        subject: &str,
        time_constraint: Option<&str>,
        syllabus: Option<&str>,
    ) -> Result<CurriculumOutline, LlmError> {
        let total_time = time_constraint.unwrap_or(UNSPECIFIED_TIME);
        let mut prompt = format!(
            "Create a curriculum overview for the subject: {subject}\nTime constraint: {total_time}\n\n"
        );
        if let Some(syllabus) = syllabus.filter(|s| !s.trim().is_empty()) {
            let _ = write!(prompt, "Base the curriculum on this syllabus:\n{}\n\n", truncate(syllabus, MAX_SYLLABUS_BYTES));
        }
        prompt.push_str(
            "Generate a concise title, an overview paragraph of 3-5 sentences, and 5-10 logical \
             learning steps progressing from beginner to advanced. Give each step a clear title \
             and an estimated time to complete.\n\n",
        );
        prompt.push_str(OUTLINE_FORMAT);

        match self
            .ask_json::<OutlineJson>("curriculum outline", vec![Message::system(DESIGNER_PROMPT), Message::user(prompt)])
            .await
        {
            Ok(json) => Ok(outline_from_json(json, subject, total_time)),
            Err(err @ (LlmError::JsonParse { .. } | LlmError::MissingField(_))) => {
                tracing::warn!(subject, error = %err, "Unreadable outline reply, using fallback");
                Ok(fallback_outline(subject, total_time))
            },
            Err(err) => Err(err),
        }
    }

    /// Rewrite an outline according to a teacher's instructions.
    pub async fn modify_outline(
        &self,
        current: &Curriculum,
        instructions: &str,
    ) -> Result<CurriculumOutline, LlmError> {
        let prompt = format!(
            "Here is an existing curriculum for {subject}.\nTitle: {title}\nOverview: {overview}\n\
             Total time: {total}\nSteps:\n{steps}\n\
             Modify it according to these instructions:\n{instructions}\n\n\
             Keep everything the instructions do not ask to change.\n\n{OUTLINE_FORMAT}",
            subject = current.subject,
            title = current.title,
            overview = current.overview,
            total = current.total_time,
            steps = render_steps(&current.steps),
        );
        let json: OutlineJson = self
            .ask_json("curriculum modification", vec![Message::system(DESIGNER_PROMPT), Message::user(prompt)])
            .await?;
        let mut outline = outline_from_json(json, &current.subject, &current.total_time);
        if outline.overview.trim().is_empty() {
            outline.overview.clone_from(&current.overview);
        }
        Ok(outline)
    }

    /// Expand one outline step into detailed learning content.
    ///
    /// `neighbours` are the previous and next steps, if any. `resources` are
    /// web results the model should prefer for its resource list.
    pub async fn step_detail(
        &self,
        subject: &str,
        step: &CurriculumStep,
        neighbours: (Option<&CurriculumStep>, Option<&CurriculumStep>),
        resources: &[SearchHit],
    ) -> Result<StepDetail, LlmError> {
        let mut prompt = format!(
            "Expand this curriculum step into detailed learning content.\n\
             Subject: {subject}\nStep title: {}\nEstimated time: {}\n",
            step.title, step.estimated_time
        );
        if let Some(previous) = neighbours.0 {
            let _ = writeln!(prompt, "Previous step: {}", previous.title);
        }
        if let Some(next) = neighbours.1 {
            let _ = writeln!(prompt, "Next step: {}", next.title);
        }
        if !resources.is_empty() {
            prompt.push_str("\nSearch results for resources:\n");
            for hit in resources {
                let _ = writeln!(prompt, "- {} ({}): {}", hit.title, hit.url, hit.snippet);
            }
        }
        prompt.push_str(
            "\nGive 3-5 learning objectives, the subtopics to learn, a short overview of core \
             concepts, 3-5 learning resources (prefer the search results, mixing articles, videos \
             and tutorials), 3-5 practice exercises of varying difficulty, assessment methods and \
             advanced topics for further study.\n\n",
        );
        prompt.push_str(DETAIL_FORMAT);

        let json: StepDetailJson = self
            .ask_json("step detail", vec![Message::system(DESIGNER_PROMPT), Message::user(prompt)])
            .await?;
        let mut learning_resources = json.learning_resources;
        for resource in &mut learning_resources {
            if resource.url.as_deref().is_some_and(|u| u.trim().is_empty()) {
                resource.url = None;
            }
        }
        Ok(StepDetail {
            step_title: step.title.clone(),
            estimated_time: step.estimated_time.clone(),
            learning_objectives: json.learning_objectives,
            subtopics: json.subtopics,
            core_concepts: json.core_concepts,
            learning_resources,
            practice_exercises: json.practice_exercises,
            assessment_methods: json.assessment_methods,
            advanced_topics: json.advanced_topics,
            connections: json.connections,
        })
    }
}
