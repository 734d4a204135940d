use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResumeCategory {
    #[serde(rename = "IT")]
    It,
    #[serde(rename = "NON_IT_GENERAL")]
    General,
    #[serde(rename = "HEALTHCARE")]
    Healthcare,
    #[serde(rename = "FINANCE")]
    Finance,
    #[serde(rename = "LEGAL")]
    Legal,
    #[serde(rename = "EDUCATION")]
    Education,
    #[serde(rename = "ENGINEERING")]
    Engineering,
    #[serde(rename = "CREATIVE")]
    Creative,
    #[serde(rename = "MANAGEMENT")]
    Management,
    #[serde(rename = "OTHER_CUSTOM")]
    Other,
}

impl ResumeCategory {
    pub const ALL: [ResumeCategory; 10] = [
        ResumeCategory::It,
        ResumeCategory::General,
        ResumeCategory::Healthcare,
        ResumeCategory::Finance,
        ResumeCategory::Legal,
        ResumeCategory::Education,
        ResumeCategory::Engineering,
        ResumeCategory::Creative,
        ResumeCategory::Management,
        ResumeCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeCategory::It => "IT",
            ResumeCategory::General => "NON_IT_GENERAL",
            ResumeCategory::Healthcare => "HEALTHCARE",
            ResumeCategory::Finance => "FINANCE",
            ResumeCategory::Legal => "LEGAL",
            ResumeCategory::Education => "EDUCATION",
            ResumeCategory::Engineering => "ENGINEERING",
            ResumeCategory::Creative => "CREATIVE",
            ResumeCategory::Management => "MANAGEMENT",
            ResumeCategory::Other => "OTHER_CUSTOM",
        }
    }
}

impl FromStr for ResumeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResumeCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Catalog entry: display name, the professions it covers and its price in
/// whole rupees.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryInfo {
    pub id: ResumeCategory,
    pub name: &'static str,
    pub subcategories: &'static [&'static str],
    pub price: i64,
}
