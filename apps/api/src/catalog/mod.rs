pub mod handlers;

use crate::models::category::{CategoryInfo, ResumeCategory};

const CATEGORIES: &[CategoryInfo] = &[
    CategoryInfo {
        id: ResumeCategory::It,
        name: "IT",
        subcategories: &[
            "Software Developer",
            "Data Analyst",
            "UI/UX Designer",
            "DevOps Engineer",
            "QA Engineer",
        ],
        price: 599,
    },
    CategoryInfo {
        id: ResumeCategory::General,
        name: "Non-IT/General",
        subcategories: &[
            "Sales",
            "Marketing",
            "Customer Support",
            "Administrative",
            "Operations",
        ],
        price: 499,
    },
    CategoryInfo {
        id: ResumeCategory::Healthcare,
        name: "Healthcare",
        subcategories: &[
            "Doctor",
            "Nurse",
            "Lab Technician",
            "Medical Assistant",
            "Healthcare Administrator",
        ],
        price: 699,
    },
    CategoryInfo {
        id: ResumeCategory::Finance,
        name: "Finance",
        subcategories: &[
            "CA",
            "Accountant",
            "Financial Analyst",
            "Investment Banking",
            "Financial Advisor",
        ],
        price: 649,
    },
    CategoryInfo {
        id: ResumeCategory::Legal,
        name: "Legal",
        subcategories: &[
            "Lawyer",
            "Legal Advisor",
            "Paralegal",
            "Legal Researcher",
            "Compliance Officer",
        ],
        price: 749,
    },
    CategoryInfo {
        id: ResumeCategory::Education,
        name: "Education",
        subcategories: &[
            "Teacher",
            "Lecturer",
            "Educational Consultant",
            "School Administrator",
            "Curriculum Developer",
        ],
        price: 549,
    },
    CategoryInfo {
        id: ResumeCategory::Engineering,
        name: "Engineering",
        subcategories: &[
            "Civil Engineer",
            "Mechanical Engineer",
            "Electrical Engineer",
            "Chemical Engineer",
            "Aerospace Engineer",
        ],
        price: 649,
    },
    CategoryInfo {
        id: ResumeCategory::Creative,
        name: "Creative",
        subcategories: &[
            "Graphic Designer",
            "Content Writer",
            "Photographer",
            "Video Editor",
            "Animator",
        ],
        price: 599,
    },
    CategoryInfo {
        id: ResumeCategory::Management,
        name: "Management",
        subcategories: &[
            "HR Manager",
            "Project Manager",
            "Product Manager",
            "Operations Manager",
            "General Manager",
        ],
        price: 699,
    },
    CategoryInfo {
        id: ResumeCategory::Other,
        name: "Other / Custom",
        subcategories: &[
            "Freelancer",
            "Fresh Graduate",
            "Career Change",
            "Internship",
            "Other",
        ],
        price: 499,
    },
];

pub fn all() -> &'static [CategoryInfo] {
    CATEGORIES
}

pub fn by_id(id: ResumeCategory) -> &'static CategoryInfo {
    // Every variant has a row; the table is checked by `test_every_category_has_a_row`.
    CATEGORIES
        .iter()
        .find(|c| c.id == id)
        .unwrap_or(&CATEGORIES[CATEGORIES.len() - 1])
}

pub fn by_name(name: &str) -> Option<&'static CategoryInfo> {
    CATEGORIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
}

pub fn all_subcategories() -> Vec<&'static str> {
    CATEGORIES
        .iter()
        .flat_map(|c| c.subcategories.iter().copied())
        .collect()
}

pub fn from_subcategory(subcategory: &str) -> Option<&'static CategoryInfo> {
    let wanted = subcategory.trim();
    CATEGORIES.iter().find(|c| {
        c.subcategories
            .iter()
            .any(|s| s.eq_ignore_ascii_case(wanted))
    })
}

/// Checks that `subcategory` belongs to `category` and returns the category
/// together with the canonical spelling of the subcategory.
pub fn resolve(
    category: ResumeCategory,
    subcategory: &str,
) -> Result<(&'static CategoryInfo, &'static str), String> {
    let info = by_id(category);
    let wanted = subcategory.trim();
    info.subcategories
        .iter()
        .find(|s| s.eq_ignore_ascii_case(wanted))
        .map(|s| (info, *s))
        .ok_or_else(|| format!("'{wanted}' is not a subcategory of {}", info.name))
}
