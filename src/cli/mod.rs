//! Command-line interface for zotlit.
//!
//! Commands for fetching and exporting literature, searching, listing
//! collections and tags, validating category files, and running the MCP
//! server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::adapters::{LibraryType, ZoteroClient};
use crate::config::Settings;
use crate::core::{categorize_items, Analyzer};
use crate::domain::{FilterCriteria, ItemType, LiteratureCategory};
use crate::export::{ContentExporter, ContextType, ExportFormat, ExportedFiles};
use crate::mcp::McpServer;

/// zotlit - fetch, filter, and categorize Zotero libraries
#[derive(Parser, Debug)]
#[command(name = "zotlit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that talks to the API.
#[derive(Args, Debug)]
pub struct LibraryOpts {
    /// Zotero library ID (or set ZOTERO_LIBRARY_ID)
    #[arg(long)]
    pub library_id: Option<String>,

    /// Library type
    #[arg(long, value_enum)]
    pub library_type: Option<LibraryTypeArg>,

    /// Zotero API key (or set ZOTERO_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and export literature from the library
    Fetch {
        #[command(flatten)]
        library: LibraryOpts,

        /// Filter by tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,

        /// Filter by collections (comma-separated)
        #[arg(long)]
        collections: Option<String>,

        /// Filter by author substrings (comma-separated)
        #[arg(long)]
        authors: Option<String>,

        /// Filter by keywords in title/abstract (comma-separated)
        #[arg(long)]
        keywords: Option<String>,

        /// Filter by year range (e.g. 2020-2023)
        #[arg(long)]
        year_range: Option<String>,

        /// Filter by item type (canonical or source spelling)
        #[arg(long)]
        item_type: Option<String>,

        /// Filter by title substring
        #[arg(long)]
        title_contains: Option<String>,

        /// Maximum number of items to fetch
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output directory (default from config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Export format
        #[arg(short, long, value_enum, default_value = "both")]
        format: FormatArg,

        /// JSON file with literature categories; enables categorization
        #[arg(long)]
        categories_file: Option<PathBuf>,

        /// LLM context variant written alongside categorized exports
        #[arg(long, value_enum, default_value = "related-works")]
        context_type: ContextTypeArg,

        /// Fetch BibTeX for each exported item (one API call per item)
        #[arg(long)]
        bibtex: bool,
    },

    /// Search items in the library
    Search {
        #[command(flatten)]
        library: LibraryOpts,

        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output directory (default from config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Export format
        #[arg(short, long, value_enum, default_value = "both")]
        format: FormatArg,
    },

    /// List all collections in the library
    Collections {
        #[command(flatten)]
        library: LibraryOpts,
    },

    /// List tags in the library
    Tags {
        #[command(flatten)]
        library: LibraryOpts,

        /// Maximum number of tags to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Validate a categories JSON file
    ValidateCategories {
        /// Path to the categories file
        categories_file: PathBuf,
    },

    /// Run the MCP stdio server
    Serve,
}

/// Library type for the CLI (maps to LibraryType)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LibraryTypeArg {
    User,
    Group,
}

impl From<LibraryTypeArg> for LibraryType {
    fn from(t: LibraryTypeArg) -> Self {
        match t {
            LibraryTypeArg::User => LibraryType::User,
            LibraryTypeArg::Group => LibraryType::Group,
        }
    }
}

/// Export format for the CLI (maps to ExportFormat)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Json,
    Markdown,
    Both,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Markdown => ExportFormat::Markdown,
            FormatArg::Both => ExportFormat::Both,
        }
    }
}

/// LLM context type for the CLI (maps to ContextType)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ContextTypeArg {
    RelatedWorks,
    LiteratureReview,
}

impl From<ContextTypeArg> for ContextType {
    fn from(c: ContextTypeArg) -> Self {
        match c {
            ContextTypeArg::RelatedWorks => ContextType::RelatedWorks,
            ContextTypeArg::LiteratureReview => ContextType::LiteratureReview,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load()?;

        match self.command {
            Commands::Fetch {
                library,
                tags,
                collections,
                authors,
                keywords,
                year_range,
                item_type,
                title_contains,
                limit,
                output_dir,
                format,
                categories_file,
                context_type,
                bibtex,
            } => {
                let criteria = build_criteria(
                    tags,
                    collections,
                    authors,
                    keywords,
                    year_range,
                    item_type,
                    title_contains,
                )?;
                let output_dir = output_dir.unwrap_or_else(|| settings.output_dir.clone());
                let mut analyzer = Analyzer::new(build_client(&settings, library)?);

                fetch(
                    &mut analyzer,
                    criteria,
                    limit,
                    output_dir,
                    format.into(),
                    categories_file,
                    context_type.into(),
                    bibtex,
                )
                .await
            }
            Commands::Search {
                library,
                query,
                limit,
                output_dir,
                format,
            } => {
                let output_dir = output_dir.unwrap_or_else(|| settings.output_dir.clone());
                let analyzer = Analyzer::new(build_client(&settings, library)?);
                search(&analyzer, &query, limit, output_dir, format.into()).await
            }
            Commands::Collections { library } => {
                let mut analyzer = Analyzer::new(build_client(&settings, library)?);
                list_collections(&mut analyzer).await
            }
            Commands::Tags { library, limit } => {
                let mut analyzer = Analyzer::new(build_client(&settings, library)?);
                list_tags(&mut analyzer, limit).await
            }
            Commands::ValidateCategories { categories_file } => {
                validate_categories(&categories_file)
            }
            Commands::Serve => {
                let mut server = McpServer::new(settings);
                server.run().await.context("MCP server failed")
            }
        }
    }
}

/// Resolve credentials (flags beat config) and build a client.
fn build_client(settings: &Settings, opts: LibraryOpts) -> Result<ZoteroClient> {
    let mut resolved = settings.clone();
    if opts.library_id.is_some() {
        resolved.library_id = opts.library_id;
    }
    if let Some(library_type) = opts.library_type {
        resolved.library_type = library_type.into();
    }
    if opts.api_key.is_some() {
        resolved.api_key = opts.api_key;
    }

    let (library_id, library_type, api_key) = resolved.credentials()?;
    Ok(ZoteroClient::new(library_id, library_type, api_key))
}

/// Build filter criteria from comma-separated CLI flags.
fn build_criteria(
    tags: Option<String>,
    collections: Option<String>,
    authors: Option<String>,
    keywords: Option<String>,
    year_range: Option<String>,
    item_type: Option<String>,
    title_contains: Option<String>,
) -> Result<Option<FilterCriteria>> {
    let mut criteria = FilterCriteria {
        tags: tags.as_deref().map(split_list),
        collections: collections.as_deref().map(split_list),
        authors: authors.as_deref().map(split_list),
        keywords: keywords.as_deref().map(split_list),
        title_contains,
        ..Default::default()
    };

    if let Some(range) = year_range {
        let (start, end) = range
            .split_once('-')
            .with_context(|| format!("Invalid year range '{}' (expected START-END)", range))?;
        let start: i32 = start.trim().parse().context("Invalid start year")?;
        let end: i32 = end.trim().parse().context("Invalid end year")?;
        criteria.date_range = Some((start, end));
    }

    if let Some(name) = item_type {
        let item_type = ItemType::from_source_name(&name)
            .with_context(|| format!("Unknown item type: {}", name))?;
        criteria.item_types = Some(vec![item_type]);
    }

    Ok((!criteria.is_empty()).then_some(criteria))
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

#[allow(clippy::too_many_arguments)]
async fn fetch(
    analyzer: &mut Analyzer,
    criteria: Option<FilterCriteria>,
    limit: Option<usize>,
    output_dir: PathBuf,
    format: ExportFormat,
    categories_file: Option<PathBuf>,
    context_type: ContextType,
    with_bibtex: bool,
) -> Result<()> {
    let mut items = analyzer.fetch_items(criteria.as_ref(), limit).await;
    println!("Fetched {} items", items.len());

    if with_bibtex {
        let keys: Vec<String> = items.iter().map(|i| i.key.clone()).collect();
        let bibtex = analyzer.get_bibtex(&keys).await;
        for item in &mut items {
            if let Some(entry) = bibtex.get(&item.key).filter(|e| !e.is_empty()) {
                item.bibtex = Some(entry.clone());
            }
        }
    }

    let exporter = ContentExporter::new(output_dir);

    if let Some(path) = categories_file {
        let categories = load_categories(&path)?;
        let categorized = categorize_items(&items, &categories)?;

        let exported = exporter
            .export_categorized(&categorized, format, "categorized")
            .await?;
        let context_file = exporter.export_llm_context(&categorized, context_type).await?;

        println!("\n{:<30} {:>6}  DESCRIPTION", "CATEGORY", "ITEMS");
        println!("{}", "-".repeat(70));
        for category in &categorized {
            println!(
                "{:<30} {:>6}  {}",
                category.name,
                category.len(),
                category.description.as_deref().unwrap_or("-")
            );
        }

        print_exported(&exported);
        println!("  context: {}", context_file.display());
    } else {
        let exported = exporter.export_items(&items, format, "literature").await?;
        print_exported(&exported);
    }

    Ok(())
}

async fn search(
    analyzer: &Analyzer,
    query: &str,
    limit: usize,
    output_dir: PathBuf,
    format: ExportFormat,
) -> Result<()> {
    let items = analyzer.search_items(query, Some(limit)).await;

    if items.is_empty() {
        println!("No items found matching '{}'", query);
        return Ok(());
    }

    println!("Found {} items matching '{}'\n", items.len(), query);
    println!("{:<50} {:<25} {:>6}", "TITLE", "AUTHORS", "YEAR");
    println!("{}", "-".repeat(83));
    for item in items.iter().take(10) {
        let mut authors = item.authors.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
        if item.authors.len() > 2 {
            authors.push_str(" et al.");
        }
        println!(
            "{:<50} {:<25} {:>6}",
            truncate(&item.title, 50),
            truncate(&authors, 25),
            item.year.map_or("N/A".to_string(), |y| y.to_string())
        );
    }

    let prefix = format!("search_{}", query.replace(' ', "_"));
    let exporter = ContentExporter::new(output_dir);
    let exported = exporter.export_items(&items, format, &prefix).await?;
    print_exported(&exported);

    Ok(())
}

async fn list_collections(analyzer: &mut Analyzer) -> Result<()> {
    let collections = analyzer.get_collections(false).await;

    if collections.is_empty() {
        println!("No collections found");
        return Ok(());
    }

    let mut names: Vec<_> = collections.iter().collect();
    names.sort();

    println!("{:<40} KEY", "COLLECTION");
    println!("{}", "-".repeat(50));
    for (name, key) in names {
        println!("{:<40} {}", name, key);
    }

    Ok(())
}

async fn list_tags(analyzer: &mut Analyzer, limit: usize) -> Result<()> {
    let tags = analyzer.get_tags(false).await;

    if tags.is_empty() {
        println!("No tags found");
        return Ok(());
    }

    let mut sorted = tags.clone();
    sorted.sort();
    sorted.truncate(limit);

    println!("Found {} tags (showing first {}):", tags.len(), sorted.len());
    for tag in sorted {
        println!("  {}", tag);
    }

    Ok(())
}

fn validate_categories(path: &PathBuf) -> Result<()> {
    let categories = load_categories(path)?;

    println!("Categories file is valid with {} categories:\n", categories.len());
    println!("{:<25} {:<35} DESCRIPTION", "NAME", "KEYWORDS");
    println!("{}", "-".repeat(75));
    for category in &categories {
        println!(
            "{:<25} {:<35} {}",
            category.name,
            truncate(&category.keywords.join(", "), 35),
            category.description.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

/// Load a categories JSON file (array of {name, description?, keywords}).
fn load_categories(path: &PathBuf) -> Result<Vec<LiteratureCategory>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read categories file: {}", path.display()))?;

    let categories: Vec<LiteratureCategory> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse categories file: {}", path.display()))?;

    Ok(categories)
}

fn print_exported(files: &ExportedFiles) {
    println!("\nExported files:");
    if let Some(path) = &files.json {
        println!("  json: {}", path.display());
    }
    if let Some(path) = &files.markdown {
        println!("  markdown: {}", path.display());
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("a,,b"), vec!["a", "b"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_build_criteria_year_range() {
        let criteria = build_criteria(
            None,
            None,
            None,
            None,
            Some("2020-2023".to_string()),
            None,
            None,
        )
        .unwrap()
        .unwrap();
        assert_eq!(criteria.date_range, Some((2020, 2023)));

        assert!(build_criteria(
            None,
            None,
            None,
            None,
            Some("recent".to_string()),
            None,
            None
        )
        .is_err());
    }

    #[test]
    fn test_build_criteria_empty_is_none() {
        let criteria = build_criteria(None, None, None, None, None, None, None).unwrap();
        assert!(criteria.is_none());
    }

    #[test]
    fn test_build_criteria_item_type_alias() {
        let criteria = build_criteria(
            None,
            None,
            None,
            None,
            None,
            Some("dissertation".to_string()),
            None,
        )
        .unwrap()
        .unwrap();
        assert_eq!(criteria.item_types, Some(vec![ItemType::Thesis]));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long title indeed", 10), "a very ...");
    }
}
