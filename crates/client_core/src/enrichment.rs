//! Static enrichment table: diagnosis code to its fixed descriptive bundle.

use shared::{
    domain::{DiagnosisCode, UrgencyTier},
    protocol::{RawClassification, Report},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichmentError {
    #[error("unknown diagnosis code '{0}' (classifier and enrichment table disagree)")]
    UnknownDiagnosisCode(String),
}

/// Fixed guidance for one diagnosis code. The prose is an English rendering of
/// the clinical guidance the service was built around; urgency tiers and the
/// count and order of list items are part of the contract.
#[derive(Debug, PartialEq, Eq)]
pub struct EnrichmentBundle {
    pub name: &'static str,
    pub description: &'static str,
    pub urgency: UrgencyTier,
    pub findings: &'static str,
    pub recommendations: &'static [&'static str],
    pub next_steps: &'static [&'static str],
}

static NV: EnrichmentBundle = EnrichmentBundle {
    name: "Melanocytic Nevus",
    description: "Common benign pigmented lesion, also known as a mole.",
    urgency: UrgencyTier::Routine,
    findings: "Features are compatible with a benign melanocytic nevus. The lesion shows \
               regular pigmentation patterns and well-defined borders, consistent with a \
               benign lesion.",
    recommendations: &[
        "Monthly skin self-examination",
        "Daily sun protection with SPF 30+",
        "Routine annual dermatology review",
        "Watch for changes in size, colour or shape",
        "Photograph the lesion for long-term follow-up",
    ],
    next_steps: &[
        "Routine dermatology visit in 12 months",
        "Regular self-examination of the whole body surface",
        "Learn the warning signs (ABCDE rule)",
    ],
};

static MEL: EnrichmentBundle = EnrichmentBundle {
    name: "Melanoma",
    description: "Malignant tumour of melanocytes that requires immediate medical attention.",
    urgency: UrgencyTier::Immediate,
    findings: "Features highly suggestive of malignant melanoma were detected. The lesion \
               shows asymmetry, irregular borders, colour variation and/or increased \
               diameter, patterns that require urgent medical evaluation.",
    recommendations: &[
        "IMMEDIATE DERMATOLOGY CONSULTATION",
        "Do not manipulate or injure the lesion",
        "Avoid direct sun exposure",
        "Document changes with photographs",
        "Prepare a complete medical history",
        "Consider a second oncology opinion",
    ],
    next_steps: &[
        "URGENT DERMATOLOGY CONSULTATION (24-48 hours)",
        "Biopsy for histological confirmation",
        "Extent assessment and staging",
        "Referral to dermato-oncology",
    ],
};

static BKL: EnrichmentBundle = EnrichmentBundle {
    name: "Seborrheic Keratosis",
    description: "Common benign lesion related to skin ageing.",
    urgency: UrgencyTier::Routine,
    findings: "Observed features are consistent with seborrheic keratosis, a common benign \
               lesion associated with ageing. It shows a warty surface and characteristic \
               pigmentation.",
    recommendations: &[
        "Annual dermatology review",
        "Sun protection to prevent new lesions",
        "Watch for significant changes",
        "Consider removal if frequently irritated",
        "Keep the skin moisturised",
    ],
    next_steps: &[
        "Routine dermatology visit",
        "Assessment for possible cosmetic removal",
        "Annual follow-up of similar lesions",
    ],
};

static BCC: EnrichmentBundle = EnrichmentBundle {
    name: "Basal Cell Carcinoma",
    description: "Non-melanoma skin cancer, locally invasive but rarely metastatic.",
    urgency: UrgencyTier::Urgent,
    findings: "Features compatible with basal cell carcinoma were identified. Although it \
               grows slowly and rarely metastasises, it needs timely treatment to prevent \
               local invasion.",
    recommendations: &[
        "Urgent dermatology consultation within 1-2 weeks",
        "Avoid sun exposure on the affected area",
        "Do not apply irritating products",
        "Protect the lesion from trauma",
        "Document any change",
        "Check other sun-exposed areas",
    ],
    next_steps: &[
        "Dermatology visit in 1-2 weeks",
        "Biopsy for diagnostic confirmation",
        "Treatment planning (surgery or other)",
        "Risk factor assessment",
    ],
};

static AKIEC: EnrichmentBundle = EnrichmentBundle {
    name: "Actinic Keratosis / Squamous Cell Carcinoma in situ",
    description: "Precancerous lesion or early cancer related to sun damage.",
    urgency: UrgencyTier::Urgent,
    findings: "Features suggest actinic keratosis or squamous cell carcinoma in situ. These \
               lesions reflect cumulative sun damage and may progress to malignancy.",
    recommendations: &[
        "Urgent dermatology consultation",
        "Strict sun protection (SPF 50+)",
        "Avoid sun exposure between 10 AM and 4 PM",
        "Wear protective clothing and hats",
        "Check the whole body surface",
        "Consider preventive treatment",
    ],
    next_steps: &[
        "Dermatology visit in 1-2 weeks",
        "Biopsy for accurate staging",
        "Treatment according to extent (cryosurgery, topical)",
        "Close post-treatment follow-up",
    ],
};

static VASC: EnrichmentBundle = EnrichmentBundle {
    name: "Vascular Lesion",
    description: "Lesion of vascular origin, usually benign.",
    urgency: UrgencyTier::Routine,
    findings: "Features are compatible with a benign vascular lesion. These include \
               angiomas, haemangiomas and minor vascular malformations.",
    recommendations: &[
        "Routine dermatology visit",
        "Watch for changes in size or colour",
        "Protect against trauma",
        "Consider cosmetic treatment if needed",
        "Keep a photographic record",
    ],
    next_steps: &[
        "Dermatology visit in 3-6 months",
        "Assessment for cosmetic treatment",
        "Follow-up according to evolution",
    ],
};

static DF: EnrichmentBundle = EnrichmentBundle {
    name: "Dermatofibroma",
    description: "Common benign fibrous nodule, usually on the limbs.",
    urgency: UrgencyTier::Routine,
    findings: "Features are consistent with dermatofibroma, a common benign fibrous lesion. \
               It typically presents as a firm, well-circumscribed nodule.",
    recommendations: &[
        "Routine dermatology visit",
        "Watch for significant changes",
        "Avoid repeated trauma",
        "Consider removal if it causes discomfort",
        "General sun protection",
    ],
    next_steps: &[
        "Dermatology visit in 6-12 months",
        "Assessment for removal if symptomatic",
        "Follow-up according to patient preference",
    ],
};

pub fn bundle(code: DiagnosisCode) -> &'static EnrichmentBundle {
    match code {
        DiagnosisCode::Nv => &NV,
        DiagnosisCode::Mel => &MEL,
        DiagnosisCode::Bkl => &BKL,
        DiagnosisCode::Bcc => &BCC,
        DiagnosisCode::Akiec => &AKIEC,
        DiagnosisCode::Vasc => &VASC,
        DiagnosisCode::Df => &DF,
    }
}

pub fn lookup(code: &str) -> Result<&'static EnrichmentBundle, EnrichmentError> {
    let code = code
        .parse::<DiagnosisCode>()
        .map_err(EnrichmentError::UnknownDiagnosisCode)?;
    Ok(bundle(code))
}

/// Joins a raw classification with its bundle. Lists are copied in table order.
pub fn enrich(raw: &RawClassification) -> Result<Report, EnrichmentError> {
    let diagnosis = raw
        .diagnosis
        .parse::<DiagnosisCode>()
        .map_err(EnrichmentError::UnknownDiagnosisCode)?;
    let entry = bundle(diagnosis);

    Ok(Report {
        diagnosis,
        confidence: raw.confidence,
        diagnosis_name: entry.name.to_string(),
        description: entry.description.to_string(),
        urgency: entry.urgency,
        findings: entry.findings.to_string(),
        recommendations: entry.recommendations.iter().map(|s| s.to_string()).collect(),
        next_steps: entry.next_steps.iter().map(|s| s.to_string()).collect(),
    })
}

#[cfg(test)]
#[path = "tests/enrichment_tests.rs"]
mod tests;
