//! Template loading and game setup
//!
//! Parsers for the key:value template format (.txt) and the catalog built
//! from them

pub mod catalog;
pub mod game_init;
pub mod template;

pub use catalog::{Catalog, STANDARD_TEMPLATES};
pub use game_init::GameInitializer;
pub use template::TemplateLoader;
