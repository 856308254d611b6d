//! zotlit - fetch, filter, and categorize Zotero libraries for literature
//! review composition.
//!
//! # Architecture
//!
//! One pipeline, two entry points:
//! - Zotero API -> paginated fetch -> filter -> categorize -> export to files
//! - The same pipeline exposed to LLM agents over MCP (JSON-RPC on stdio)
//!
//! # Modules
//!
//! - `adapters`: Zotero Web API client and the page-source seam
//! - `core`: pagination, filtering, categorization, and the analyzer
//! - `domain`: data structures (LibraryItem, ItemType, FilterCriteria,
//!   LiteratureCategory)
//! - `export`: JSON/Markdown/LLM-context rendering and file writing
//! - `mcp`: stdio JSON-RPC server
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Fetch and export a library
//! zotlit fetch --library-id 12345 --tags "machine learning" --limit 200
//!
//! # Categorize against a categories file
//! zotlit fetch --categories-file categories.json
//!
//! # Run as an MCP server
//! zotlit serve
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod export;
pub mod mcp;

// Re-export main types at crate root for convenience
pub use adapters::{LibraryType, PageSource, RawItem, ZoteroClient};
pub use core::{categorize_items, fetch_all, Analyzer, PAGE_SIZE, UNCATEGORIZED};
pub use domain::{FilterCriteria, ItemType, LibraryItem, LiteratureCategory};
pub use export::{ContentExporter, ContextType, ExportFormat};
