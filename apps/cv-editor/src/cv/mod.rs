pub mod fields;
pub mod list;
pub mod model;
pub mod store;

pub use fields::RichTextField;
pub use model::{
    Alignment, CustomSectionEntry, CustomSectionPatch, CvData, CvPatch, ExperienceEntry,
    ExperiencePatch, FontFamily, Header, HeaderPatch, Link, LinkPatch, Settings, SettingsPatch,
};
pub use store::CvStore;
