use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    Classic,
    #[default]
    Modern,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub text: String,
    pub url: String,
}

impl Link {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }

    /// Link appended by the "add link" action.
    pub fn placeholder() -> Self {
        Self::new("New Link", "")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    pub name: String,
    pub role: String,
    pub address: String,
    pub links: Vec<Link>,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub id: String,
    pub title: String,
    pub company: String,
    pub years: String,
    /// Rich-text HTML.
    pub description: String,
    #[serde(rename = "items")]
    pub achievements: Vec<String>,
}

impl ExperienceEntry {
    /// A new entry with the placeholder content shown after "add".
    pub fn placeholder(id: String) -> Self {
        Self {
            id,
            title: "New Role".to_string(),
            company: "Company Name".to_string(),
            years: "2024 - Present".to_string(),
            description: "<p>Describe your achievements...</p>".to_string(),
            achievements: vec!["Key achievement...".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomSectionEntry {
    pub id: String,
    pub title: String,
    pub year: String,
    /// Rich-text HTML.
    pub description: String,
}

impl CustomSectionEntry {
    pub fn placeholder(id: String) -> Self {
        Self {
            id,
            title: "New Section".to_string(),
            year: "2024".to_string(),
            description: "<p>Details about this achievement...</p>".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub font_family: FontFamily,
}

/// The whole persisted CV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvData {
    pub header: Header,
    /// Rich-text HTML.
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub custom_sections: Vec<CustomSectionEntry>,
    #[serde(default)]
    pub settings: Settings,
}

impl CvData {
    /// The content shown on first run.
    pub fn seed() -> Self {
        Self {
            header: Header {
                name: "John Doe".to_string(),
                role: "Senior Software Engineer".to_string(),
                address: "San Francisco, CA".to_string(),
                links: vec![
                    Link::new("linkedin.com/in/johndoe", "https://linkedin.com/in/johndoe"),
                    Link::new("github.com/johndoe", "https://github.com/johndoe"),
                ],
                alignment: Alignment::Center,
            },
            summary: "<p>Experienced software engineer with a passion for building scalable web \
                      applications. Proficient in React, Next.js, and TypeScript.</p>"
                .to_string(),
            experience: vec![ExperienceEntry {
                id: "exp-1".to_string(),
                title: "Senior Developer".to_string(),
                company: "Tech Corp".to_string(),
                years: "2020 - Present".to_string(),
                description: "<p>Led the development of a high-traffic e-commerce platform.</p>"
                    .to_string(),
                achievements: vec![
                    "Optimized performance by 40%".to_string(),
                    "Mentored junior developers".to_string(),
                ],
            }],
            custom_sections: vec![CustomSectionEntry {
                id: "custom-1".to_string(),
                title: "Projects".to_string(),
                year: "2022".to_string(),
                description: "<p>Developed an open-source library for data visualization.</p>"
                    .to_string(),
            }],
            settings: Settings {
                font_family: FontFamily::Modern,
            },
        }
    }
}

impl Default for CvData {
    fn default() -> Self {
        Self::seed()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Partial updates. `None` leaves the current value in place.
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub address: Option<String>,
    pub links: Option<Vec<Link>>,
    pub alignment: Option<Alignment>,
}

impl HeaderPatch {
    pub fn apply(self, header: &mut Header) {
        merge(&mut header.name, self.name);
        merge(&mut header.role, self.role);
        merge(&mut header.address, self.address);
        merge(&mut header.links, self.links);
        merge(&mut header.alignment, self.alignment);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub font_family: Option<FontFamily>,
}

impl SettingsPatch {
    pub fn apply(self, settings: &mut Settings) {
        merge(&mut settings.font_family, self.font_family);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkPatch {
    pub text: Option<String>,
    pub url: Option<String>,
}

impl LinkPatch {
    pub fn apply(self, link: &mut Link) {
        merge(&mut link.text, self.text);
        merge(&mut link.url, self.url);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperiencePatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub years: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "items")]
    pub achievements: Option<Vec<String>>,
}

impl ExperiencePatch {
    pub fn apply(self, entry: &mut ExperienceEntry) {
        merge(&mut entry.title, self.title);
        merge(&mut entry.company, self.company);
        merge(&mut entry.years, self.years);
        merge(&mut entry.description, self.description);
        merge(&mut entry.achievements, self.achievements);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomSectionPatch {
    pub title: Option<String>,
    pub year: Option<String>,
    pub description: Option<String>,
}

impl CustomSectionPatch {
    pub fn apply(self, entry: &mut CustomSectionEntry) {
        merge(&mut entry.title, self.title);
        merge(&mut entry.year, self.year);
        merge(&mut entry.description, self.description);
    }
}

/// A CV-shaped partial document, as produced by an import.
///
/// Entry lists replace the current lists wholesale; header and settings are
/// merged field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CvPatch {
    pub header: Option<HeaderPatch>,
    pub summary: Option<String>,
    pub experience: Option<Vec<ExperienceEntry>>,
    pub custom_sections: Option<Vec<CustomSectionEntry>>,
    pub settings: Option<SettingsPatch>,
}

impl CvPatch {
    pub fn apply(self, data: &mut CvData) {
        if let Some(header) = self.header {
            header.apply(&mut data.header);
        }
        merge(&mut data.summary, self.summary);
        merge(&mut data.experience, self.experience);
        merge(&mut data.custom_sections, self.custom_sections);
        if let Some(settings) = self.settings {
            settings.apply(&mut data.settings);
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
