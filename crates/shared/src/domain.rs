use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(RunId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Anatomical location tag sent to the classifier as `lesionArea`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LesionSite {
    #[serde(rename = "face")]
    Face,
    #[serde(rename = "neck")]
    Neck,
    #[serde(rename = "chest")]
    Chest,
    #[serde(rename = "back")]
    Back,
    #[serde(rename = "upper extremity")]
    UpperExtremity,
    #[serde(rename = "hand")]
    Hand,
    #[serde(rename = "abdomen")]
    Abdomen,
    #[serde(rename = "lower extremity")]
    LowerExtremity,
    #[serde(rename = "foot")]
    Foot,
    #[serde(rename = "scalp")]
    Scalp,
    #[serde(rename = "unknown")]
    Unknown,
}

impl LesionSite {
    pub fn as_str(self) -> &'static str {
        match self {
            LesionSite::Face => "face",
            LesionSite::Neck => "neck",
            LesionSite::Chest => "chest",
            LesionSite::Back => "back",
            LesionSite::UpperExtremity => "upper extremity",
            LesionSite::Hand => "hand",
            LesionSite::Abdomen => "abdomen",
            LesionSite::LowerExtremity => "lower extremity",
            LesionSite::Foot => "foot",
            LesionSite::Scalp => "scalp",
            LesionSite::Unknown => "unknown",
        }
    }
}

/// Closed set of lesion classes the classifier may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisCode {
    Nv,
    Mel,
    Bkl,
    Bcc,
    Akiec,
    Vasc,
    Df,
}

impl DiagnosisCode {
    pub const ALL: [DiagnosisCode; 7] = [
        DiagnosisCode::Nv,
        DiagnosisCode::Mel,
        DiagnosisCode::Bkl,
        DiagnosisCode::Bcc,
        DiagnosisCode::Akiec,
        DiagnosisCode::Vasc,
        DiagnosisCode::Df,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosisCode::Nv => "nv",
            DiagnosisCode::Mel => "mel",
            DiagnosisCode::Bkl => "bkl",
            DiagnosisCode::Bcc => "bcc",
            DiagnosisCode::Akiec => "akiec",
            DiagnosisCode::Vasc => "vasc",
            DiagnosisCode::Df => "df",
        }
    }
}

impl fmt::Display for DiagnosisCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagnosisCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiagnosisCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Severity attached to a diagnosis. Variant order is the severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    Routine,
    Soon,
    Urgent,
    Immediate,
}

impl UrgencyTier {
    pub const ALL: [UrgencyTier; 4] = [
        UrgencyTier::Routine,
        UrgencyTier::Soon,
        UrgencyTier::Urgent,
        UrgencyTier::Immediate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyTier::Routine => "routine",
            UrgencyTier::Soon => "soon",
            UrgencyTier::Urgent => "urgent",
            UrgencyTier::Immediate => "immediate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: Gender,
    pub lesion_site: LesionSite,
    pub lesion_label: String,
    pub image: ImagePayload,
}

impl PatientRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::MissingField("first name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::MissingField("last name"));
        }
        if self.age == 0 {
            return Err(ValidationError::NonPositiveAge);
        }
        if self.lesion_label.trim().is_empty() {
            return Err(ValidationError::MissingField("lesion area"));
        }
        if self.image.bytes.is_empty() {
            return Err(ValidationError::MissingImage);
        }
        Ok(())
    }
}
