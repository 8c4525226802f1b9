//! Terminal rendering of workflow states plus the display lookups (area
//! catalogue, urgency and diagnosis descriptors) that belong to presentation.

use serde::Serialize;
use shared::{
    domain::{DiagnosisCode, Gender, LesionSite, UrgencyTier},
    error::ErrorNotice,
    protocol::Report,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LesionAreaOption {
    pub key: &'static str,
    pub label: &'static str,
    pub site: LesionSite,
}

const fn area(key: &'static str, label: &'static str, site: LesionSite) -> LesionAreaOption {
    LesionAreaOption { key, label, site }
}

pub const LESION_AREAS: &[LesionAreaOption] = &[
    area("face", "Face", LesionSite::Face),
    area("neck", "Neck", LesionSite::Neck),
    area("chest", "Chest", LesionSite::Chest),
    area("back", "Back", LesionSite::Back),
    area("right-arm", "Right arm", LesionSite::UpperExtremity),
    area("left-arm", "Left arm", LesionSite::UpperExtremity),
    area("right-hand", "Right hand", LesionSite::Hand),
    area("left-hand", "Left hand", LesionSite::Hand),
    area("abdomen", "Abdomen", LesionSite::Abdomen),
    area("right-leg", "Right leg", LesionSite::LowerExtremity),
    area("left-leg", "Left leg", LesionSite::LowerExtremity),
    area("right-foot", "Right foot", LesionSite::Foot),
    area("left-foot", "Left foot", LesionSite::Foot),
    area("scalp", "Scalp", LesionSite::Scalp),
    area("other", "Other area", LesionSite::Unknown),
];

pub fn parse_lesion_area(key: &str) -> Result<LesionAreaOption, String> {
    let wanted = key.trim().to_ascii_lowercase();
    LESION_AREAS
        .iter()
        .copied()
        .find(|area| area.key == wanted)
        .ok_or_else(|| {
            let keys: Vec<&str> = LESION_AREAS.iter().map(|area| area.key).collect();
            format!("unknown lesion area '{key}'; expected one of: {}", keys.join(", "))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Critical,
    Warning,
    Caution,
    Benign,
    Neutral,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Critical => "critical",
            Tone::Warning => "warning",
            Tone::Caution => "caution",
            Tone::Benign => "benign",
            Tone::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrgencyDescriptor {
    pub label: &'static str,
    pub marker: &'static str,
    pub tone: Tone,
}

pub fn urgency_descriptor(urgency: UrgencyTier) -> UrgencyDescriptor {
    match urgency {
        UrgencyTier::Immediate => UrgencyDescriptor {
            label: "Immediate attention",
            marker: "[!!]",
            tone: Tone::Critical,
        },
        UrgencyTier::Urgent => UrgencyDescriptor {
            label: "Urgent attention",
            marker: "[!]",
            tone: Tone::Warning,
        },
        UrgencyTier::Soon => UrgencyDescriptor {
            label: "Attention soon",
            marker: "[i]",
            tone: Tone::Caution,
        },
        UrgencyTier::Routine => UrgencyDescriptor {
            label: "Routine attention",
            marker: "[ok]",
            tone: Tone::Benign,
        },
    }
}

pub fn diagnosis_tone(diagnosis: DiagnosisCode) -> Tone {
    match diagnosis {
        DiagnosisCode::Mel => Tone::Critical,
        DiagnosisCode::Bcc | DiagnosisCode::Akiec => Tone::Warning,
        DiagnosisCode::Nv | DiagnosisCode::Bkl => Tone::Benign,
        DiagnosisCode::Vasc | DiagnosisCode::Df => Tone::Neutral,
    }
}

pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

fn gender_label(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "Male",
        Gender::Female => "Female",
    }
}

#[derive(Debug, Serialize)]
pub struct PatientSummary<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub age: u32,
    pub gender: Gender,
    pub lesion_area: LesionSite,
    pub lesion_label: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub patient: PatientSummary<'a>,
    pub report: &'a Report,
}

pub fn render_submitting(summary: &PatientSummary<'_>) -> String {
    format!(
        "Analysing lesion for {} {} ({} years, {}, area: {})...",
        summary.first_name,
        summary.last_name,
        summary.age,
        gender_label(summary.gender),
        summary.lesion_label
    )
}

pub fn render_report(document: &ReportDocument<'_>) -> String {
    let patient = &document.patient;
    let report = document.report;
    let urgency = urgency_descriptor(report.urgency);

    let mut out = String::new();
    out.push_str(&format!(
        "{} {} | {} years | {} | {}\n\n",
        patient.first_name,
        patient.last_name,
        patient.age,
        gender_label(patient.gender),
        patient.lesion_label
    ));
    out.push_str(&format!(
        "Diagnosis: {} ({}, {})\n",
        report.diagnosis_name,
        report.diagnosis,
        diagnosis_tone(report.diagnosis).as_str()
    ));
    out.push_str(&format!("Confidence: {}\n", format_confidence(report.confidence)));
    out.push_str(&format!(
        "{} {} ({})\n\n",
        urgency.marker,
        urgency.label,
        urgency.tone.as_str()
    ));
    out.push_str(&format!("{}\n\n", report.description));
    out.push_str(&format!("Findings:\n  {}\n\n", report.findings));
    out.push_str("Recommendations:\n");
    for item in &report.recommendations {
        out.push_str(&format!("  - {item}\n"));
    }
    out.push_str("\nNext steps:\n");
    for (idx, item) in report.next_steps.iter().enumerate() {
        out.push_str(&format!("  {}. {item}\n", idx + 1));
    }
    out.push_str(
        "\nThis analysis is a screening aid and does not replace a professional medical diagnosis.\n",
    );
    out
}

pub fn render_notice(notice: &ErrorNotice) -> String {
    format!("Analysis failed: {}\nPlease review the data and submit again.", notice.message)
}
