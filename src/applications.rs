// src/applications.rs
//! Application drafts for the jobs a candidate selected: a cover letter and
//! screening answers written by the model, and a CV summary tailored to the
//! posting.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::llm::{parse_structured_list, ChatRequest, LlmError, LlmProvider};
use crate::matching::text::truncate_chars;
use crate::types::{CandidateProfile, JobRecommendation};

const COVER_LETTER_SYSTEM: &str =
    "Tu es un expert en lettres de motivation qui génère des candidatures qui se démarquent vraiment.";
const SCREENING_SYSTEM: &str =
    "Tu réponds aux questions de pré-qualification de manière concise et professionnelle.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdaptedCv {
    pub name: Option<String>,
    pub location: Option<String>,
    pub experience_years: Option<f64>,
    pub summary: String,
    pub skills_highlighted: Vec<String>,
    pub soft_skills: Vec<String>,
    pub education: Option<String>,
    pub current_position: Option<String>,
    pub match_explanation: String,
}

/// One draft per selected job. A failed draft keeps the job identity and
/// carries `error` instead of the generated material.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDraft {
    pub job_id: Option<String>,
    pub company: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapted_cv: Option<AdaptedCv>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screening_answers: Option<Vec<ScreeningAnswer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_url: Option<String>,
    pub ready_to_send: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub generated: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationBatch {
    pub applications: Vec<ApplicationDraft>,
    pub summary: BatchSummary,
}

impl ApplicationBatch {
    pub fn message(&self) -> String {
        format!("{} candidatures générées avec succès", self.summary.generated)
    }
}

fn or_unspecified(items: &[String]) -> String {
    if items.is_empty() {
        "Non spécifié".to_string()
    } else {
        items.join(", ")
    }
}

fn years_label(profile: &CandidateProfile) -> String {
    let years = profile.years();
    if years.fract() == 0.0 {
        format!("{:.0}", years)
    } else {
        years.to_string()
    }
}

fn cover_letter_prompt(profile: &CandidateProfile, job: &JobRecommendation) -> String {
    let top_skills: Vec<String> = profile.technical_skills.iter().take(5).cloned().collect();
    let qualities: Vec<String> = profile.soft_skills.iter().take(3).cloned().collect();
    let description = if job.description.trim().is_empty() {
        "Non disponible".to_string()
    } else {
        truncate_chars(&job.description, 400)
    };

    format!(
        "Tu es un expert en lettres de motivation. Tu dois créer une lettre PERSONNALISÉE et CONVAINCANTE.

PROFIL CANDIDAT :
- Nom: {name}
- Expérience: {years} ans
- Poste actuel: {position}
- Compétences clés: {skills}
- Qualités: {qualities}
- Formation: {education}
- Localisation: {location}

POSTE VISÉ :
- Titre: {title}
- Entreprise: {company}
- Lieu: {job_location}
- Type contrat: {contract}
- Description: {description}
- Compétences requises: {required}

RÈGLES STRICTES :
- 200-250 mots maximum
- Ton professionnel mais humain
- Mentionner 2-3 compétences CONCRÈTES du candidat qui correspondent au poste
- Expliquer POURQUOI cette entreprise et ce poste
- Terminer par une proposition d'entretien concrète
- PAS de clichés ni de phrases vides

Structure :
1. Accroche percutante
2. Pourquoi moi ? (compétences et expérience concrètes)
3. Pourquoi vous ? (ce qui attire dans l'entreprise ou le poste)
4. Proposition d'entretien

Génère UNIQUEMENT la lettre, sans formules d'introduction.",
        name = profile.name.as_deref().unwrap_or("Non spécifié"),
        years = years_label(profile),
        position = profile.current_position.as_deref().unwrap_or("Non spécifié"),
        skills = or_unspecified(&top_skills),
        qualities = or_unspecified(&qualities),
        education = profile.education_level.as_deref().unwrap_or("Non spécifié"),
        location = profile.location.as_deref().unwrap_or("Non spécifié"),
        title = job.job_title,
        company = job.company,
        job_location = job.location,
        contract = job.contract_type,
        description = description,
        required = or_unspecified(&job.required_skills),
    )
}

fn screening_prompt(profile: &CandidateProfile, questions: &[String]) -> String {
    let numbered: Vec<String> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {}", i + 1, q))
        .collect();

    format!(
        "Tu réponds aux questions de pré-qualification pour une candidature.

PROFIL : {}, {} ans d'expérience en {}
Compétences: {}

QUESTIONS :
{}

Réponds de manière CONCISE, PROFESSIONNELLE et HONNÊTE.
Format JSON : [{{\"question\": \"...\", \"answer\": \"...\"}}]",
        profile.name.as_deref().unwrap_or("Candidat"),
        years_label(profile),
        profile.current_position.as_deref().unwrap_or("Non spécifié"),
        profile.technical_skills.join(", "),
        numbered.join("\n")
    )
}

pub async fn cover_letter(
    llm: &dyn LlmProvider,
    profile: &CandidateProfile,
    job: &JobRecommendation,
) -> Result<String, LlmError> {
    let request = ChatRequest::new(COVER_LETTER_SYSTEM, cover_letter_prompt(profile, job))
        .max_tokens(600)
        .temperature(0.7);
    Ok(llm.complete(request).await?.content)
}

/// Answers to the posting's screening questions. Never fails: no questions,
/// a model error or an unreadable reply all give an empty list.
pub async fn screening_answers(
    llm: &dyn LlmProvider,
    profile: &CandidateProfile,
    job: &JobRecommendation,
) -> Vec<ScreeningAnswer> {
    if job.screening_questions.is_empty() {
        return Vec::new();
    }

    let request = ChatRequest::new(SCREENING_SYSTEM, screening_prompt(profile, &job.screening_questions))
        .max_tokens(400)
        .temperature(0.3);

    match llm.complete(request).await {
        Ok(completion) => parse_structured_list(&completion.content).unwrap_or_else(|e| {
            warn!("Unreadable screening answers for {}: {}", job.job_title, e);
            Vec::new()
        }),
        Err(e) => {
            warn!("Screening answers failed for {}: {}", job.job_title, e);
            Vec::new()
        }
    }
}

/// Candidate skills overlapping the job's required skills, either way round.
pub fn relevant_skills(profile: &CandidateProfile, job: &JobRecommendation) -> Vec<String> {
    let required: Vec<String> = job
        .required_skills
        .iter()
        .map(|r| r.trim().to_lowercase())
        .filter(|r| !r.is_empty())
        .collect();
    profile
        .technical_skills
        .iter()
        .filter(|skill| {
            let skill = skill.trim().to_lowercase();
            !skill.is_empty()
                && required
                    .iter()
                    .any(|req| skill.contains(req.as_str()) || req.contains(skill.as_str()))
        })
        .cloned()
        .collect()
}

pub fn adapt_cv(profile: &CandidateProfile, job: &JobRecommendation) -> AdaptedCv {
    let relevant = relevant_skills(profile, job);
    let position = profile.current_position.as_deref().unwrap_or("Candidat");

    let summary = if relevant.is_empty() {
        format!("{} avec {} ans d'expérience", position, years_label(profile))
    } else {
        format!(
            "{} avec {} ans d'expérience, spécialisé(e) en {}",
            position,
            years_label(profile),
            relevant.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
        )
    };

    let skills_highlighted = if relevant.is_empty() {
        profile.technical_skills.iter().take(5).cloned().collect()
    } else {
        relevant
    };

    AdaptedCv {
        name: profile.name.clone(),
        location: profile.location.clone(),
        experience_years: profile.total_experience_years,
        summary,
        skills_highlighted,
        soft_skills: profile.soft_skills.iter().take(3).cloned().collect(),
        education: profile.education_level.clone(),
        current_position: profile.current_position.clone(),
        match_explanation: format!("Profil adapté pour {} chez {}", job.job_title, job.company),
    }
}

async fn draft_one(llm: &dyn LlmProvider, profile: &CandidateProfile, job: &JobRecommendation) -> ApplicationDraft {
    let letter = match cover_letter(llm, profile, job).await {
        Ok(letter) => letter,
        Err(e) => {
            error!("Draft failed for {}: {}", job.job_title, e);
            return ApplicationDraft {
                job_id: job.id.clone(),
                company: job.company.clone(),
                position: job.job_title.clone(),
                location: None,
                cover_letter: None,
                adapted_cv: None,
                screening_answers: None,
                application_url: None,
                ready_to_send: false,
                generated_at: None,
                status: None,
                error: Some(e.to_string()),
            };
        }
    };

    ApplicationDraft {
        job_id: job.id.clone(),
        company: job.company.clone(),
        position: job.job_title.clone(),
        location: Some(job.location.clone()),
        cover_letter: Some(letter),
        adapted_cv: Some(adapt_cv(profile, job)),
        screening_answers: Some(screening_answers(llm, profile, job).await),
        application_url: Some(job.france_travail_url.clone().unwrap_or_else(|| "#".to_string())),
        ready_to_send: true,
        generated_at: Some(chrono::Utc::now().to_rfc3339()),
        status: Some("draft".to_string()),
        error: None,
    }
}

/// Draft every selected job concurrently.
pub async fn draft_applications(
    llm: &dyn LlmProvider,
    profile: &CandidateProfile,
    jobs: &[JobRecommendation],
) -> ApplicationBatch {
    info!("Drafting {} applications", jobs.len());

    let applications = join_all(jobs.iter().map(|job| draft_one(llm, profile, job))).await;

    let generated = applications.iter().filter(|a| a.ready_to_send).count();
    ApplicationBatch {
        summary: BatchSummary {
            total: jobs.len(),
            generated,
            failed: jobs.len() - generated,
        },
        applications,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedProvider;

    fn profile() -> CandidateProfile {
        CandidateProfile {
            name: Some("Amina K.".into()),
            current_position: Some("Assistante comptable".into()),
            total_experience_years: Some(6.0),
            technical_skills: vec![
                "Excel avancé".into(),
                "SAP".into(),
                "Comptabilité fournisseurs".into(),
                "Anglais".into(),
            ],
            soft_skills: vec!["Rigueur".into(), "Discrétion".into(), "Organisation".into(), "Calme".into()],
            ..Default::default()
        }
    }

    fn job(id: &str, title: &str, skills: &[&str]) -> JobRecommendation {
        JobRecommendation {
            id: Some(id.to_string()),
            job_title: title.to_string(),
            company: "ACME".to_string(),
            location: "Lyon".to_string(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_relevant_skills_match_both_ways() {
        let skills = relevant_skills(&profile(), &job("1", "Comptable", &["Excel", "Sap", "Comptabilité fournisseurs clients"]));
        assert_eq!(skills, vec!["Excel avancé", "SAP", "Comptabilité fournisseurs"]);
    }

    #[test]
    fn test_blank_required_skills_match_nothing() {
        assert!(relevant_skills(&profile(), &job("2", "Comptable", &["", "   "])).is_empty());

        let skills = relevant_skills(&profile(), &job("3", "Comptable", &[" ", "sap"]));
        assert_eq!(skills, vec!["SAP"]);

        let mut with_blank = profile();
        with_blank.technical_skills.push("  ".into());
        assert_eq!(relevant_skills(&with_blank, &job("4", "Comptable", &["Anglais courant"])), vec!["Anglais"]);
    }

    #[test]
    fn test_adapt_cv() {
        let adapted = adapt_cv(&profile(), &job("1", "Comptable", &["Excel", "Sap"]));
        assert_eq!(
            adapted.summary,
            "Assistante comptable avec 6 ans d'expérience, spécialisé(e) en Excel avancé, SAP"
        );
        assert_eq!(adapted.skills_highlighted, vec!["Excel avancé", "SAP"]);
        assert_eq!(adapted.soft_skills.len(), 3);
        assert_eq!(adapted.match_explanation, "Profil adapté pour Comptable chez ACME");

        let adapted = adapt_cv(&profile(), &job("2", "Cariste", &["Caces"]));
        assert_eq!(adapted.summary, "Assistante comptable avec 6 ans d'expérience");
        assert_eq!(adapted.skills_highlighted.len(), 4);
    }

    #[tokio::test]
    async fn test_screening_answers_are_best_effort() {
        let mut with_questions = job("1", "Comptable", &[]);
        with_questions.screening_questions = vec!["Disponible immédiatement ?".into()];

        let llm = ScriptedProvider::replying(r#"[{"question": "Disponible immédiatement ?", "answer": "Oui"}]"#);
        let answers = screening_answers(llm.as_ref(), &profile(), &with_questions).await;
        assert_eq!(answers[0].answer, "Oui");

        let llm = ScriptedProvider::replying("Je suis disponible.");
        assert!(screening_answers(llm.as_ref(), &profile(), &with_questions).await.is_empty());

        let llm = ScriptedProvider::failing();
        assert!(screening_answers(llm.as_ref(), &profile(), &with_questions).await.is_empty());

        let llm = ScriptedProvider::replying("[]");
        assert!(screening_answers(llm.as_ref(), &profile(), &job("2", "Cariste", &[])).await.is_empty());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_sink_the_batch() {
        let llm = ScriptedProvider::new(|request| {
            if request.messages[1].content.contains("Titre: Cariste") {
                Err(LlmError::Connection("timeout".into()))
            } else {
                Ok("Madame, Monsieur,".to_string())
            }
        });
        let jobs = vec![job("1", "Comptable", &["Excel"]), job("2", "Cariste", &[])];

        let batch = draft_applications(llm.as_ref(), &profile(), &jobs).await;

        assert_eq!(batch.summary, BatchSummary { total: 2, generated: 1, failed: 1 });
        assert_eq!(batch.message(), "1 candidatures générées avec succès");

        let ok = &batch.applications[0];
        assert!(ok.ready_to_send);
        assert_eq!(ok.status.as_deref(), Some("draft"));
        assert_eq!(ok.application_url.as_deref(), Some("#"));
        assert_eq!(ok.screening_answers.as_deref(), Some(&[][..]));

        let failed = &batch.applications[1];
        assert!(!failed.ready_to_send);
        assert_eq!(failed.job_id.as_deref(), Some("2"));
        assert!(failed.error.as_deref().unwrap().contains("timeout"));
    }
}
