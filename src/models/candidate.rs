//! Swap candidate model: a teacher able to substitute for a session.

use serde::Serialize;
use serde_json::Value;

use crate::lookup::{first_f64, first_i64, first_match, first_string};
use crate::{AppError, Result};

const TEACHER_ID: &[&str] = &["teacherId", "id", "teacher.id"];
const DISPLAY_NAME: &[&str] = &["fullName", "teacherName", "displayName", "name", "teacher.fullName"];
const SKILLS: &[&str] = &["skills", "teacherSkills", "specializations"];
const MATCH_SCORE: &[&str] = &["matchScore", "score", "matchPercentage"];

const SKILL_NAME: &[&str] = &["skill", "name", "specialization"];
const SKILL_LEVEL: &[&str] = &["level", "levelCode"];
const SKILL_PROFICIENCY: &[&str] = &["proficiency", "proficiencyLevel"];

/// A skill tag carried by a candidate.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SkillTag {
    /// Skill name (`IELTS`, `SPEAKING`, ...).
    pub skill: String,
    /// Level the teacher is cleared for.
    pub level: Option<String>,
    /// Proficiency rating as reported upstream.
    pub proficiency: Option<String>,
}

/// A teacher eligible to take over a swap request's session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SwapCandidate {
    /// Teacher identifier.
    pub teacher_id: i64,
    /// Display name.
    pub display_name: String,
    /// Skill tags with proficiency.
    pub skills: Vec<SkillTag>,
    /// Fitness ranking, 0 to 100.
    pub match_score: u8,
}

impl SwapCandidate {
    /// Decode a candidate record. Scores outside 0..=100 are clamped.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Decode` if the record has no teacher id.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let teacher_id = first_i64(raw, TEACHER_ID)
            .ok_or_else(|| AppError::Decode("swap candidate has no teacher id".into()))?;
        let skills = first_match(raw, SKILLS)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(decode_skill).collect())
            .unwrap_or_default();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0..=100
        let match_score = first_f64(raw, MATCH_SCORE)
            .map_or(0, |score| score.round().clamp(0.0, 100.0) as u8);

        Ok(Self {
            teacher_id,
            display_name: first_string(raw, DISPLAY_NAME)
                .unwrap_or_else(|| format!("Teacher #{teacher_id}")),
            skills,
            match_score,
        })
    }
}

fn decode_skill(raw: &Value) -> Option<SkillTag> {
    if let Some(name) = raw.as_str() {
        return Some(SkillTag {
            skill: name.to_owned(),
            level: None,
            proficiency: None,
        });
    }
    Some(SkillTag {
        skill: first_string(raw, SKILL_NAME)?,
        level: first_string(raw, SKILL_LEVEL),
        proficiency: first_string(raw, SKILL_PROFICIENCY),
    })
}

/// Order candidates best match first, ties broken by name.
pub fn rank(candidates: &mut [SwapCandidate]) {
    candidates.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
}
