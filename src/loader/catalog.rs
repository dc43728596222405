//! Template catalog
//!
//! Immutable after loading. Templates get dense ids in load order, so a
//! directory of numbered files loads in a stable, predictable order.

use crate::core::{normalize_name, Template, TemplateId};
use crate::loader::TemplateLoader;
use crate::{GameError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Shipped template files (name, content), embedded in the binary
pub const STANDARD_TEMPLATES: [(&str, &str); 9] = [
    ("01_pass.txt", include_str!("../../templates/01_pass.txt")),
    ("02_quick_shot.txt", include_str!("../../templates/02_quick_shot.txt")),
    ("03_heavy_blast.txt", include_str!("../../templates/03_heavy_blast.txt")),
    ("04_exploit_opening.txt", include_str!("../../templates/04_exploit_opening.txt")),
    ("05_deflection_shield.txt", include_str!("../../templates/05_deflection_shield.txt")),
    ("06_sacrificial_blow.txt", include_str!("../../templates/06_sacrificial_blow.txt")),
    ("07_timing_shift.txt", include_str!("../../templates/07_timing_shift.txt")),
    ("08_retort.txt", include_str!("../../templates/08_retort.txt")),
    ("09_emergency_return.txt", include_str!("../../templates/09_emergency_return.txt")),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    templates: Vec<Template>,
    by_name: FxHashMap<String, TemplateId>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Build a catalog from parsed templates, assigning ids in order
    pub fn from_templates(templates: impl IntoIterator<Item = Template>) -> Result<Self> {
        let mut catalog = Catalog::new();
        for template in templates {
            catalog.add(template)?;
        }
        Ok(catalog)
    }

    /// Add a template; names must be unique (ignoring case and accents)
    pub fn add(&mut self, mut template: Template) -> Result<TemplateId> {
        let key = template.name.lookup_key();
        if self.by_name.contains_key(&key) {
            return Err(GameError::InvalidTemplateFormat(format!(
                "duplicate template name '{}'",
                template.name
            )));
        }
        let id = TemplateId::new(self.templates.len() as u32);
        template.id = id;
        self.by_name.insert(key, id);
        self.templates.push(template);
        Ok(id)
    }

    /// The nine shipped templates
    pub fn standard() -> Result<Self> {
        Self::from_templates(
            STANDARD_TEMPLATES
                .iter()
                .map(|(_, content)| TemplateLoader::parse(content))
                .collect::<Result<Vec<_>>>()?,
        )
    }

    /// Load every `.txt` file of a directory, in file-name order
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let paths = template_paths(dir)?;
        let templates = paths
            .iter()
            .map(|path| TemplateLoader::load_from_file(path))
            .collect::<Result<Vec<_>>>()?;
        Self::from_templates(templates)
    }

    /// Async variant of [`Catalog::load_from_dir`]; files are read in parallel
    pub async fn load_from_dir_async(dir: &Path) -> Result<Self> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_template_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let tasks: Vec<_> = paths
            .into_iter()
            .map(|path| tokio::spawn(async move { tokio::fs::read_to_string(path).await }))
            .collect();

        let mut templates = Vec::with_capacity(tasks.len());
        for task in tasks {
            let content = task.await??;
            templates.push(TemplateLoader::parse(&content)?);
        }
        Self::from_templates(templates)
    }

    pub fn find_template(&self, id: TemplateId) -> Result<&Template> {
        self.templates
            .get(id.index())
            .ok_or(GameError::EntityNotFound(id.as_u32()))
    }

    /// Case- and accent-insensitive name lookup
    pub fn find_by_name(&self, name: &str) -> Option<&Template> {
        self.by_name
            .get(&normalize_name(name))
            .and_then(|id| self.templates.get(id.index()))
    }

    pub fn all_templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn is_template_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("txt")
}

fn template_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(GameError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Template directory not found: {dir:?}"),
        )));
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if is_template_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
