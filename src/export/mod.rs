//! Rendering and writing of export documents.
//!
//! Two encodings: a JSON document preserving every item field, and a
//! narrative Markdown document meant to be read by people and language
//! models. Filenames are `<prefix>.json` / `<prefix>.md` under the output
//! directory, which is created on demand.
//!
//! The encodings are independent: each one is attempted even if the other
//! fails, and the first failure is reported after both attempts.

pub mod context;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::domain::{LibraryItem, LiteratureCategory};

pub use context::{render_context, ContextType};

/// Which encodings to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Markdown,
    Both,
}

impl ExportFormat {
    fn wants_json(&self) -> bool {
        matches!(self, ExportFormat::Json | ExportFormat::Both)
    }

    fn wants_markdown(&self) -> bool {
        matches!(self, ExportFormat::Markdown | ExportFormat::Both)
    }
}

/// Paths of the files an export produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportedFiles {
    pub json: Option<PathBuf>,
    pub markdown: Option<PathBuf>,
}

/// Writes export documents into one output directory.
pub struct ContentExporter {
    output_dir: PathBuf,
}

impl ContentExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Export a flat item list as `<prefix>.json` / `<prefix>.md`.
    pub async fn export_items(
        &self,
        items: &[LibraryItem],
        format: ExportFormat,
        prefix: &str,
    ) -> Result<ExportedFiles> {
        let json = serde_json::to_string_pretty(items)?;
        let markdown = render_items_markdown(items);
        self.write_encodings(format, prefix, &json, &markdown).await
    }

    /// Export categorized items, grouped by category.
    pub async fn export_categorized(
        &self,
        categories: &[LiteratureCategory],
        format: ExportFormat,
        prefix: &str,
    ) -> Result<ExportedFiles> {
        let json = serde_json::to_string_pretty(categories)?;
        let markdown = render_categorized_markdown(categories);
        self.write_encodings(format, prefix, &json, &markdown).await
    }

    /// Write the LLM context document for the given context type. The file
    /// name is fixed per context type so repeated exports stay deterministic.
    pub async fn export_llm_context(
        &self,
        categories: &[LiteratureCategory],
        context_type: ContextType,
    ) -> Result<PathBuf> {
        self.ensure_output_dir().await?;

        let content = render_context(categories, context_type);
        let path = self
            .output_dir
            .join(format!("{}.md", context_type.as_str()));
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write LLM context: {}", path.display()))?;

        info!(path = %path.display(), "Wrote LLM context");
        Ok(path)
    }

    async fn write_encodings(
        &self,
        format: ExportFormat,
        prefix: &str,
        json: &str,
        markdown: &str,
    ) -> Result<ExportedFiles> {
        self.ensure_output_dir().await?;

        let mut files = ExportedFiles::default();
        let mut first_err: Option<anyhow::Error> = None;

        if format.wants_json() {
            let path = self.output_dir.join(format!("{}.json", prefix));
            match write_file(&path, json).await {
                Ok(()) => files.json = Some(path),
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }

        if format.wants_markdown() {
            let path = self.output_dir.join(format!("{}.md", prefix));
            match write_file(&path, markdown).await {
                Ok(()) => files.markdown = Some(path),
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }

        match first_err {
            None => Ok(files),
            Some(e) => Err(e),
        }
    }

    async fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create output directory: {}",
                    self.output_dir.display()
                )
            })
    }
}

async fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write export: {}", path.display()))?;
    info!(path = %path.display(), "Wrote export");
    Ok(())
}

/// Markdown for a flat item list.
fn render_items_markdown(items: &[LibraryItem]) -> String {
    let mut out = String::new();
    writeln!(out, "# Literature Export").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "Generated: {}", Utc::now().to_rfc3339()).unwrap();
    writeln!(out, "Items: {}", items.len()).unwrap();

    for item in items {
        writeln!(out).unwrap();
        render_item_markdown(&mut out, item);
    }

    out
}

/// Markdown grouped by category.
fn render_categorized_markdown(categories: &[LiteratureCategory]) -> String {
    let total: usize = categories.iter().map(|c| c.len()).sum();

    let mut out = String::new();
    writeln!(out, "# Categorized Literature").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "Generated: {}", Utc::now().to_rfc3339()).unwrap();
    writeln!(out, "Categories: {}", categories.len()).unwrap();
    writeln!(out, "Items: {}", total).unwrap();

    for category in categories {
        writeln!(out).unwrap();
        writeln!(out, "## {} ({} items)", category.name, category.len()).unwrap();
        if let Some(description) = &category.description {
            writeln!(out).unwrap();
            writeln!(out, "{}", description).unwrap();
        }
        if !category.keywords.is_empty() {
            writeln!(out).unwrap();
            writeln!(out, "Keywords: {}", category.keywords.join(", ")).unwrap();
        }

        for item in &category.items {
            writeln!(out).unwrap();
            render_item_markdown(&mut out, item);
        }
    }

    out
}

fn render_item_markdown(out: &mut String, item: &LibraryItem) {
    let title = if item.title.is_empty() {
        "(untitled)"
    } else {
        &item.title
    };
    writeln!(out, "### {}", title).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "- Key: {}", item.key).unwrap();
    if !item.authors.is_empty() {
        writeln!(out, "- Authors: {}", item.authors.join(", ")).unwrap();
    }
    if let Some(year) = item.year {
        writeln!(out, "- Year: {}", year).unwrap();
    }
    if let Some(journal) = &item.journal {
        writeln!(out, "- Venue: {}", journal).unwrap();
    }
    if !item.item_type.is_empty() {
        writeln!(out, "- Type: {}", item.item_type).unwrap();
    }
    if let Some(doi) = &item.doi {
        writeln!(out, "- DOI: {}", doi).unwrap();
    }
    if let Some(url) = &item.url {
        writeln!(out, "- URL: {}", url).unwrap();
    }
    if !item.tags.is_empty() {
        writeln!(out, "- Tags: {}", item.tags.join(", ")).unwrap();
    }
    if !item.collections.is_empty() {
        writeln!(out, "- Collections: {}", item.collections.join(", ")).unwrap();
    }
    writeln!(out, "- Citation: {}", item.citation()).unwrap();

    if let Some(abstract_text) = &item.abstract_text {
        writeln!(out).unwrap();
        writeln!(out, "{}", abstract_text).unwrap();
    }

    if let Some(bibtex) = &item.bibtex {
        writeln!(out).unwrap();
        writeln!(out, "```bibtex").unwrap();
        writeln!(out, "{}", bibtex.trim_end()).unwrap();
        writeln!(out, "```").unwrap();
    }
}
