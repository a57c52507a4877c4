//! Core of a browser-based CV editor: an HTML to document converter, a
//! rich-text editing model, the CV data store and AI-assisted import, plus
//! the HTTP host that exposes them.

pub mod config;
pub mod cv;
pub mod errors;
pub mod import;
pub mod richtext;
pub mod routes;
pub mod state;
pub mod storage;
