//! Questionnaire pages: which filters and charts each cohort shows.
//!
//! Every widget names the columns it reads, so a dataset missing a column
//! loses that widget instead of failing.

pub mod layout;
pub mod students;
pub mod teachers;

use layout::PageLayout;

/// One of the two surveyed populations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cohort {
    Teachers,
    Students,
}

impl Cohort {
    pub const ALL: [Cohort; 2] = [Cohort::Teachers, Cohort::Students];

    pub fn label(self) -> &'static str {
        match self {
            Cohort::Teachers => "Données Professeurs",
            Cohort::Students => "Données Élèves",
        }
    }

    pub fn layout(self) -> PageLayout {
        match self {
            Cohort::Teachers => teachers::page(),
            Cohort::Students => students::page(),
        }
    }
}
