//! The CV data store: one `CvData` kept in memory and written through to a
//! key/value backend after every mutation.
//!
//! Invalid arguments (unknown ids, out-of-range indices) are no-ops that
//! return `false`. Persistence failures are logged and never roll back the
//! in-memory change.

use tracing::{info, warn};
use uuid::Uuid;

use super::fields::RichTextField;
use super::list::{find_by_id_mut, move_item, remove_by_id};
use super::model::{
    CustomSectionEntry, CustomSectionPatch, CvData, CvPatch, ExperienceEntry, ExperiencePatch,
    HeaderPatch, Link, LinkPatch, SettingsPatch,
};
use crate::storage::{KeyValueStore, CV_DATA_KEY};

pub struct CvStore<S> {
    data: CvData,
    storage: S,
}

impl<S: KeyValueStore> CvStore<S> {
    /// Loads the persisted CV, falling back to the seed document when nothing
    /// is stored or the stored value cannot be read or decoded.
    pub fn open(storage: S) -> Self {
        let data = match storage.get(CV_DATA_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<CvData>(&raw) {
                Ok(data) => {
                    info!(
                        experience = data.experience.len(),
                        custom_sections = data.custom_sections.len(),
                        "loaded saved CV data"
                    );
                    data
                }
                Err(e) => {
                    warn!("Failed to parse saved CV data, using defaults: {e}");
                    CvData::seed()
                }
            },
            Ok(None) => {
                info!("no saved CV data, starting from defaults");
                CvData::seed()
            }
            Err(e) => {
                warn!("Failed to read saved CV data, using defaults: {e}");
                CvData::seed()
            }
        };
        Self { data, storage }
    }

    pub fn data(&self) -> &CvData {
        &self.data
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    // ────────────────────────────────────────────────────────────────────────
    // Field-level updates
    // ────────────────────────────────────────────────────────────────────────

    pub fn update_header(&mut self, patch: HeaderPatch) {
        patch.apply(&mut self.data.header);
        self.persist();
    }

    pub fn update_summary(&mut self, summary: String) {
        self.data.summary = summary;
        self.persist();
    }

    pub fn update_experience(&mut self, experience: Vec<ExperienceEntry>) {
        self.data.experience = experience;
        self.persist();
    }

    pub fn update_custom_sections(&mut self, sections: Vec<CustomSectionEntry>) {
        self.data.custom_sections = sections;
        self.persist();
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        patch.apply(&mut self.data.settings);
        self.persist();
    }

    /// Merges an imported partial document in one step.
    pub fn update_data(&mut self, patch: CvPatch) {
        patch.apply(&mut self.data);
        self.persist();
    }

    pub fn rich_text(&self, field: &RichTextField) -> Option<&str> {
        field.get(&self.data)
    }

    pub fn set_rich_text(&mut self, field: &RichTextField, html: String) -> bool {
        if field.get(&self.data) == Some(html.as_str()) {
            return true;
        }
        if !field.set(&mut self.data, html) {
            return false;
        }
        self.persist();
        true
    }

    // ────────────────────────────────────────────────────────────────────────
    // Experience
    // ────────────────────────────────────────────────────────────────────────

    pub fn add_experience(&mut self) -> String {
        let id = fresh_id("exp");
        self.data
            .experience
            .push(ExperienceEntry::placeholder(id.clone()));
        self.persist();
        id
    }

    pub fn remove_experience(&mut self, id: &str) -> bool {
        self.changed(|data| remove_by_id(&mut data.experience, id))
    }

    pub fn update_experience_entry(&mut self, id: &str, patch: ExperiencePatch) -> bool {
        self.changed(|data| match find_by_id_mut(&mut data.experience, id) {
            Some(entry) => {
                patch.apply(entry);
                true
            }
            None => false,
        })
    }

    pub fn reorder_experience(&mut self, from: usize, to: usize) -> bool {
        self.changed(|data| move_item(&mut data.experience, from, to))
    }

    // ────────────────────────────────────────────────────────────────────────
    // Custom sections
    // ────────────────────────────────────────────────────────────────────────

    pub fn add_custom_section(&mut self) -> String {
        let id = fresh_id("custom");
        self.data
            .custom_sections
            .push(CustomSectionEntry::placeholder(id.clone()));
        self.persist();
        id
    }

    pub fn remove_custom_section(&mut self, id: &str) -> bool {
        self.changed(|data| remove_by_id(&mut data.custom_sections, id))
    }

    pub fn update_custom_section(&mut self, id: &str, patch: CustomSectionPatch) -> bool {
        self.changed(|data| match find_by_id_mut(&mut data.custom_sections, id) {
            Some(entry) => {
                patch.apply(entry);
                true
            }
            None => false,
        })
    }

    pub fn reorder_custom_sections(&mut self, from: usize, to: usize) -> bool {
        self.changed(|data| move_item(&mut data.custom_sections, from, to))
    }

    // ────────────────────────────────────────────────────────────────────────
    // Header links (addressed by index)
    // ────────────────────────────────────────────────────────────────────────

    /// Appends a placeholder link and returns its index.
    pub fn add_link(&mut self) -> usize {
        self.data.header.links.push(Link::placeholder());
        self.persist();
        self.data.header.links.len() - 1
    }

    pub fn remove_link(&mut self, index: usize) -> bool {
        self.changed(|data| {
            if index < data.header.links.len() {
                data.header.links.remove(index);
                true
            } else {
                false
            }
        })
    }

    pub fn update_link(&mut self, index: usize, patch: LinkPatch) -> bool {
        self.changed(|data| match data.header.links.get_mut(index) {
            Some(link) => {
                patch.apply(link);
                true
            }
            None => false,
        })
    }

    pub fn reorder_links(&mut self, from: usize, to: usize) -> bool {
        self.changed(|data| move_item(&mut data.header.links, from, to))
    }

    // ────────────────────────────────────────────────────────────────────────

    /// Runs a mutation and persists when it reports a change.
    fn changed(&mut self, mutate: impl FnOnce(&mut CvData) -> bool) -> bool {
        let changed = mutate(&mut self.data);
        if changed {
            self.persist();
        }
        changed
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.data) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize CV data: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(CV_DATA_KEY, &json) {
            warn!("Failed to persist CV data: {e}");
        }
    }
}

fn fresh_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> CvStore<MemoryStore> {
        CvStore::open(MemoryStore::new())
    }

    fn saved(store: &CvStore<MemoryStore>) -> CvData {
        let raw = store.storage().get(CV_DATA_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_open_without_saved_data_uses_seed() {
        let store = store();
        assert_eq!(store.data(), &CvData::seed());
    }

    #[test]
    fn test_open_with_corrupt_data_falls_back_to_seed() {
        let mut backend = MemoryStore::new();
        backend.set(CV_DATA_KEY, "{not json").unwrap();
        let store = CvStore::open(backend);
        assert_eq!(store.data(), &CvData::seed());
    }

    #[test]
    fn test_mutations_are_persisted_and_reloaded() {
        let mut store = store();
        store.update_summary("<p>Short</p>".into());
        store.update_header(HeaderPatch {
            name: Some("Ada".into()),
            ..Default::default()
        });
        assert_eq!(saved(&store).summary, "<p>Short</p>");

        let reopened = CvStore::open(store.storage().clone());
        assert_eq!(reopened.data().header.name, "Ada");
        assert_eq!(reopened.data().header.role, "Senior Software Engineer");
    }

    #[test]
    fn test_added_entries_have_unique_stable_ids() {
        let mut store = store();
        store.update_experience(Vec::new());
        let ids: Vec<String> = (0..3).map(|_| store.add_experience()).collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
        assert!(ids.iter().all(|id| id.starts_with("exp-")));

        assert!(store.remove_experience(&ids[1]));
        let remaining: Vec<&str> = store.data().experience.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(remaining, vec![ids[0].as_str(), ids[2].as_str()]);
        assert_eq!(store.data().experience[0].title, "New Role");
    }

    #[test]
    fn test_reorder_keeps_ids() {
        let mut store = store();
        let added = store.add_custom_section();
        assert!(store.reorder_custom_sections(1, 0));
        assert_eq!(store.data().custom_sections[0].id, added);
        assert_eq!(store.data().custom_sections[1].id, "custom-1");
        assert!(!store.reorder_custom_sections(0, 5));
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut store = store();
        assert!(!store.remove_experience("missing"));
        assert!(!store.update_custom_section("missing", CustomSectionPatch::default()));
        assert!(!store.remove_link(9));
        assert_eq!(store.data(), &CvData::seed());
    }

    #[test]
    fn test_update_entry_merges_fields() {
        let mut store = store();
        assert!(store.update_experience_entry(
            "exp-1",
            ExperiencePatch {
                years: Some("2019 - 2024".into()),
                ..Default::default()
            }
        ));
        let entry = &store.data().experience[0];
        assert_eq!(entry.years, "2019 - 2024");
        assert_eq!(entry.company, "Tech Corp");
    }

    #[test]
    fn test_link_operations_by_index() {
        let mut store = store();
        let index = store.add_link();
        assert_eq!(index, 2);
        assert_eq!(store.data().header.links[2], Link::placeholder());
        assert!(store.update_link(
            2,
            LinkPatch {
                url: Some("https://x.dev".into()),
                ..Default::default()
            }
        ));
        assert!(store.reorder_links(2, 0));
        assert_eq!(store.data().header.links[0].url, "https://x.dev");
        assert!(store.remove_link(0));
        assert_eq!(store.data().header.links.len(), 2);
    }

    #[test]
    fn test_set_rich_text_for_entry() {
        let mut store = store();
        let field = RichTextField::CustomSectionDescription("custom-1".into());
        assert!(store.set_rich_text(&field, "<p>Updated</p>".into()));
        assert_eq!(store.rich_text(&field), Some("<p>Updated</p>"));
        assert_eq!(saved(&store).custom_sections[0].description, "<p>Updated</p>");
    }
}
