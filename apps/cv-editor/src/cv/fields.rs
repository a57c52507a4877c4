use std::fmt;

use serde::{Deserialize, Serialize};

use super::list::{find_by_id, find_by_id_mut};
use super::model::CvData;

/// A rich-text HTML field inside the CV that an editing surface can bind to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RichTextField {
    Summary,
    ExperienceDescription(String),
    CustomSectionDescription(String),
}

impl fmt::Display for RichTextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RichTextField::Summary => write!(f, "summary"),
            RichTextField::ExperienceDescription(id) => write!(f, "experience/{id}/description"),
            RichTextField::CustomSectionDescription(id) => {
                write!(f, "custom-sections/{id}/description")
            }
        }
    }
}

impl RichTextField {
    /// Current HTML of the field, `None` when the addressed entry does not exist.
    pub fn get<'a>(&self, data: &'a CvData) -> Option<&'a str> {
        match self {
            RichTextField::Summary => Some(&data.summary),
            RichTextField::ExperienceDescription(id) => {
                find_by_id(&data.experience, id).map(|entry| entry.description.as_str())
            }
            RichTextField::CustomSectionDescription(id) => {
                find_by_id(&data.custom_sections, id).map(|entry| entry.description.as_str())
            }
        }
    }

    /// Overwrites the field. Returns `false` when the addressed entry does not exist.
    pub fn set(&self, data: &mut CvData, html: String) -> bool {
        let slot = match self {
            RichTextField::Summary => Some(&mut data.summary),
            RichTextField::ExperienceDescription(id) => {
                find_by_id_mut(&mut data.experience, id).map(|entry| &mut entry.description)
            }
            RichTextField::CustomSectionDescription(id) => {
                find_by_id_mut(&mut data.custom_sections, id).map(|entry| &mut entry.description)
            }
        };
        match slot {
            Some(slot) => {
                *slot = html;
                true
            }
            None => false,
        }
    }
}
