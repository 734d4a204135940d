use serde::{Deserialize, Serialize};

use crate::errors::FieldError;
use crate::models::form::ResumeFormData;

/// The intake wizard, in the order the client walks through it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    PersonalInfo,
    Education,
    Experience,
    Skills,
    Projects,
    AdditionalInfo,
    Payment,
}

impl FormStep {
    pub const ALL: [FormStep; 7] = [
        FormStep::PersonalInfo,
        FormStep::Education,
        FormStep::Experience,
        FormStep::Skills,
        FormStep::Projects,
        FormStep::AdditionalInfo,
        FormStep::Payment,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(i: usize) -> Option<FormStep> {
        FormStep::ALL.get(i).copied()
    }

    pub fn title(&self) -> &'static str {
        match self {
            FormStep::PersonalInfo => "Personal Info",
            FormStep::Education => "Education",
            FormStep::Experience => "Experience",
            FormStep::Skills => "Skills",
            FormStep::Projects => "Projects",
            FormStep::AdditionalInfo => "Additional Info",
            FormStep::Payment => "Payment",
        }
    }

    pub fn next(&self) -> Option<FormStep> {
        FormStep::from_index(self.index() + 1)
    }

    /// Going back from the first step stays on the first step.
    pub fn back(&self) -> FormStep {
        FormStep::from_index(self.index().saturating_sub(1)).unwrap_or(FormStep::PersonalInfo)
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn require(errors: &mut Vec<FieldError>, field: String, value: &str, message: &str) {
    if blank(value) {
        errors.push(FieldError::new(field, message));
    }
}

/// Loose shape check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn validate_personal_info(form: &ResumeFormData, errors: &mut Vec<FieldError>) {
    let p = &form.personal_info;
    require(
        errors,
        "personal_info.full_name".into(),
        &p.full_name,
        "Full name is required",
    );
    if blank(&p.email) {
        errors.push(FieldError::new("personal_info.email", "Email is required"));
    } else if !is_valid_email(&p.email) {
        errors.push(FieldError::new("personal_info.email", "Invalid email"));
    }
    require(
        errors,
        "personal_info.phone".into(),
        &p.phone,
        "Phone number is required",
    );
    require(
        errors,
        "objective".into(),
        &form.objective,
        "Career objective is required",
    );
}

fn validate_education(form: &ResumeFormData, errors: &mut Vec<FieldError>) {
    if form.education.is_empty() {
        errors.push(FieldError::new(
            "education",
            "At least one education entry is required",
        ));
    }
    for (i, e) in form.education.iter().enumerate() {
        let f = |name: &str| format!("education[{i}].{name}");
        require(errors, f("institution"), &e.institution, "Institution name is required");
        require(errors, f("degree"), &e.degree, "Degree is required");
        require(errors, f("field_of_study"), &e.field_of_study, "Field of study is required");
        require(errors, f("start_date"), &e.start_date, "Start date is required");
    }
}

fn validate_experience(form: &ResumeFormData, errors: &mut Vec<FieldError>) {
    // Freshers may skip the section entirely; entries that exist must be filled.
    for (i, e) in form.experience.iter().enumerate() {
        let f = |name: &str| format!("experience[{i}].{name}");
        require(errors, f("company"), &e.company, "Company name is required");
        require(errors, f("position"), &e.position, "Position is required");
        require(errors, f("start_date"), &e.start_date, "Start date is required");
        require(errors, f("description"), &e.description, "Description is required");
    }
}

fn validate_skills(form: &ResumeFormData, errors: &mut Vec<FieldError>) {
    if form.skills.is_empty() {
        errors.push(FieldError::new("skills", "At least one skill is required"));
    }
    for (i, s) in form.skills.iter().enumerate() {
        require(
            errors,
            format!("skills[{i}].name"),
            &s.name,
            "Skill name is required",
        );
    }
}

/// Field errors for one step of the form. Projects and additional info have
/// no required fields; payment is checked separately against the payment
/// details, so it yields nothing here.
pub fn validate_step(step: FormStep, form: &ResumeFormData) -> Vec<FieldError> {
    let mut errors = Vec::new();
    match step {
        FormStep::PersonalInfo => validate_personal_info(form, &mut errors),
        FormStep::Education => validate_education(form, &mut errors),
        FormStep::Experience => validate_experience(form, &mut errors),
        FormStep::Skills => validate_skills(form, &mut errors),
        FormStep::Projects | FormStep::AdditionalInfo | FormStep::Payment => {}
    }
    errors
}

/// Every form step, in order. Used on final submission.
pub fn validate_form(form: &ResumeFormData) -> Vec<FieldError> {
    FormStep::ALL
        .iter()
        .flat_map(|step| validate_step(*step, form))
        .collect()
}

/// Step transition: the next step when the current one validates, `None`
/// after the last step.
pub fn advance(step: FormStep, form: &ResumeFormData) -> Result<Option<FormStep>, Vec<FieldError>> {
    let errors = validate_step(step, form);
    if errors.is_empty() {
        Ok(step.next())
    } else {
        Err(errors)
    }
}
