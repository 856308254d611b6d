//! MCP (Model Context Protocol) stdio server.
//!
//! Exposes the fetch/filter/categorize/export pipeline to LLM agents as
//! JSON-RPC 2.0 over stdin/stdout, one line per message:
//! - `initialize` - handshake and server metadata
//! - `tools/list` - tool catalog with JSON-Schema parameters
//! - `tools/call` - execute one tool
//!
//! Requests are processed strictly one at a time; analyzers (and their
//! collection/tag caches) are kept per `library_id_library_type`. A fault in
//! a tool becomes a structured JSON-RPC error; the read loop stays alive.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::adapters::{LibraryType, ZoteroClient};
use crate::config::Settings;
use crate::core::{categorize_items, Analyzer};
use crate::domain::{FilterCriteria, ItemType, LiteratureCategory};
use crate::export::{ContentExporter, ContextType, ExportFormat};

const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "zotlit";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(default)]
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl JsonRpcError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
            data: None,
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }
}

/// The stdio MCP server.
pub struct McpServer {
    default_library_id: Option<String>,
    default_library_type: LibraryType,
    default_api_key: Option<String>,
    /// Analyzers cached per "library-id_library-type".
    analyzers: HashMap<String, Analyzer>,
    exporter: ContentExporter,
}

impl McpServer {
    pub fn new(settings: Settings) -> Self {
        let exporter = ContentExporter::new(settings.output_dir.clone());
        Self {
            default_library_id: settings.library_id,
            default_library_type: settings.library_type,
            default_api_key: settings.api_key,
            analyzers: HashMap::new(),
            exporter,
        }
    }

    /// Run the server: read requests from stdin, write one response per line.
    pub async fn run(&mut self) -> io::Result<()> {
        info!("Starting MCP stdio server");

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    error!(?e, "Error reading from stdin");
                    break;
                }
            };

            if line.is_empty() {
                continue;
            }

            debug!(request = %line, "Received request");

            let response = self.handle_message(&line).await;

            if let Some(resp) = response {
                let json = match serde_json::to_string(&resp) {
                    Ok(j) => j,
                    Err(e) => {
                        error!(?e, "Error serializing response");
                        continue;
                    }
                };

                writeln!(stdout, "{}", json)?;
                stdout.flush()?;
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Handle a single JSON-RPC message.
    async fn handle_message(&mut self, message: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(r) => r,
            Err(e) => {
                warn!(?e, "Invalid JSON-RPC request");
                // The request id is unknowable here; the response carries an
                // explicit null id as JSON-RPC 2.0 requires.
                return Some(JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    id: Some(Value::Null),
                    result: None,
                    error: Some(JsonRpcError {
                        code: -32700,
                        message: "Parse error".to_string(),
                        data: Some(json!({ "details": e.to_string() })),
                    }),
                });
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: request.id,
                result: None,
                error: Some(JsonRpcError {
                    code: -32600,
                    message: "Invalid Request: jsonrpc must be \"2.0\"".to_string(),
                    data: None,
                }),
            });
        }

        // Notifications carry no id and expect no response.
        if request.id.is_none() {
            debug!(method = %request.method, "Notification");
            return None;
        }

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(&request.params),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(&request.params).await,
            _ => Err(JsonRpcError {
                code: -32601,
                message: format!("Method not found: {}", request.method),
                data: None,
            }),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: request.id,
                result: Some(value),
                error: None,
            },
            Err(error) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: request.id,
                result: None,
                error: Some(error),
            },
        })
    }

    fn handle_initialize(&self, params: &Value) -> Result<Value, JsonRpcError> {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        info!(protocol_version, "Initializing MCP session");

        Ok(json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            },
            "capabilities": {
                "tools": {}
            }
        }))
    }

    fn handle_tools_list(&self) -> Value {
        json!({ "tools": tool_catalog() })
    }

    async fn handle_tools_call(&mut self, params: &Value) -> Result<Value, JsonRpcError> {
        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| JsonRpcError::invalid_params("Missing 'name' parameter"))?;

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        info!(tool = name, "Calling tool");

        let result = match name {
            "fetch_literature" => self.fetch_literature(&arguments).await,
            "categorize_literature" => self.categorize_literature(&arguments).await,
            "search_literature" => self.search_literature(&arguments).await,
            "get_collections" => self.get_collections(&arguments).await,
            "get_tags" => self.get_tags(&arguments).await,
            "export_for_llm" => self.export_for_llm(&arguments).await,
            _ => {
                return Err(JsonRpcError::invalid_params(format!(
                    "Unknown tool: {}",
                    name
                )))
            }
        };

        let result = result.map_err(|e| {
            error!(tool = name, error = %e, "Tool failed");
            JsonRpcError::internal(e.to_string())
        })?;

        // MCP tool results are wrapped as text content.
        let text = serde_json::to_string_pretty(&result)
            .map_err(|e| JsonRpcError::internal(e.to_string()))?;
        Ok(json!({ "content": [{ "type": "text", "text": text }] }))
    }

    /// Get or create the analyzer for the requested (or default) library.
    fn get_analyzer(&mut self, args: &Value) -> Result<&mut Analyzer> {
        let library_id = args
            .get("library_id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| self.default_library_id.clone())
            .ok_or_else(|| anyhow::anyhow!("Library ID must be provided"))?;

        let library_type = match args.get("library_type").and_then(|v| v.as_str()) {
            Some(s) => LibraryType::parse(s)?,
            None => self.default_library_type,
        };

        let api_key = args
            .get("api_key")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| self.default_api_key.clone())
            .ok_or_else(|| anyhow::anyhow!("API key must be provided"))?;

        let cache_key = format!("{}_{}", library_id, library_type.as_str());

        Ok(self.analyzers.entry(cache_key).or_insert_with(|| {
            Analyzer::new(ZoteroClient::new(library_id, library_type, api_key))
        }))
    }

    async fn fetch_literature(&mut self, args: &Value) -> Result<Value> {
        let criteria = parse_criteria(args)?;
        let limit = args.get("limit").and_then(|v| v.as_u64()).map(|l| l as usize);

        let analyzer = self.get_analyzer(args)?;
        let items = analyzer.fetch_items(criteria.as_ref(), limit).await;

        Ok(json!({
            "success": true,
            "count": items.len(),
            "items": items,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }

    async fn categorize_literature(&mut self, args: &Value) -> Result<Value> {
        let categories = parse_categories(
            args.get("categories")
                .ok_or_else(|| anyhow::anyhow!("Missing 'categories' argument"))?,
        )?;

        let criteria = match args.get("filter_criteria") {
            Some(fc) => parse_criteria(fc)?,
            None => None,
        };

        let export_format = match args.get("export_format").and_then(|v| v.as_str()) {
            Some("json") => ExportFormat::Json,
            Some("both") => ExportFormat::Both,
            _ => ExportFormat::Markdown,
        };
        let context_type = match args.get("context_type").and_then(|v| v.as_str()) {
            Some(s) => ContextType::parse(s)?,
            None => ContextType::RelatedWorks,
        };

        let analyzer = self.get_analyzer(args)?;
        let items = analyzer.fetch_items(criteria.as_ref(), None).await;
        let categorized = categorize_items(&items, &categories)?;

        let exported = self
            .exporter
            .export_categorized(&categorized, export_format, "categorized")
            .await?;
        let context_file = self
            .exporter
            .export_llm_context(&categorized, context_type)
            .await?;

        let total_items: usize = categorized.iter().map(|c| c.len()).sum();

        Ok(json!({
            "success": true,
            "categories": categorized,
            "total_items": total_items,
            "exported_files": exported,
            "llm_context_file": context_file,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }

    async fn search_literature(&mut self, args: &Value) -> Result<Value> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?
            .to_string();
        let limit = args
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|l| l as usize)
            .unwrap_or(20);

        let analyzer = self.get_analyzer(args)?;
        let items = analyzer.search_items(&query, Some(limit)).await;

        Ok(json!({
            "success": true,
            "query": query,
            "count": items.len(),
            "items": items,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }

    async fn get_collections(&mut self, args: &Value) -> Result<Value> {
        let analyzer = self.get_analyzer(args)?;
        let collections = analyzer.get_collections(false).await;

        Ok(json!({
            "success": true,
            "count": collections.len(),
            "collections": collections,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }

    async fn get_tags(&mut self, args: &Value) -> Result<Value> {
        let limit = args
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|l| l as usize)
            .unwrap_or(100);

        let analyzer = self.get_analyzer(args)?;
        let tags = analyzer.get_tags(false).await;
        let returned: Vec<&String> = tags.iter().take(limit).collect();

        Ok(json!({
            "success": true,
            "tags": returned,
            "total_count": tags.len(),
            "returned_count": returned.len(),
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }

    async fn export_for_llm(&mut self, args: &Value) -> Result<Value> {
        let categorized: Vec<LiteratureCategory> = serde_json::from_value(
            args.get("categorized_data")
                .ok_or_else(|| anyhow::anyhow!("Missing 'categorized_data' argument"))?
                .clone(),
        )?;

        let context_type = match args.get("context_type").and_then(|v| v.as_str()) {
            Some(s) => ContextType::parse(s)?,
            None => ContextType::RelatedWorks,
        };
        let format = args
            .get("format")
            .and_then(|v| v.as_str())
            .unwrap_or("markdown");

        match format {
            "json" => Ok(json!({
                "success": true,
                "format": "json",
                "content": {
                    "context_type": context_type.as_str(),
                    "generated_at": Utc::now().to_rfc3339(),
                    "categories": categorized,
                },
                "timestamp": Utc::now().to_rfc3339(),
            })),
            _ => {
                let path = self
                    .exporter
                    .export_llm_context(&categorized, context_type)
                    .await?;
                let content = tokio::fs::read_to_string(&path).await?;

                Ok(json!({
                    "success": true,
                    "format": "markdown",
                    "content": content,
                    "file_path": path,
                    "timestamp": Utc::now().to_rfc3339(),
                }))
            }
        }
    }
}

/// Parse filter fields from a JSON object into `FilterCriteria`.
///
/// Returns `None` when no filter field is present.
fn parse_criteria(args: &Value) -> Result<Option<FilterCriteria>> {
    let mut criteria = FilterCriteria {
        tags: string_list(args, "tags"),
        collections: string_list(args, "collections"),
        authors: string_list(args, "authors"),
        keywords: string_list(args, "keywords"),
        title_contains: args
            .get("title_contains")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        ..FilterCriteria::default()
    };

    if let Some(range) = args.get("year_range").and_then(|v| v.as_array()) {
        let start = range.first().and_then(|v| v.as_i64());
        let end = range.get(1).and_then(|v| v.as_i64());
        match (start, end) {
            (Some(start), Some(end)) => {
                criteria.date_range = Some((start as i32, end as i32));
            }
            _ => anyhow::bail!("year_range must be [start, end]"),
        }
    }

    if let Some(name) = args.get("item_type").and_then(|v| v.as_str()) {
        let item_type = ItemType::from_source_name(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown item type: {}", name))?;
        criteria.item_types = Some(vec![item_type]);
    }

    if criteria.is_empty() {
        Ok(None)
    } else {
        Ok(Some(criteria))
    }
}

fn string_list(args: &Value, key: &str) -> Option<Vec<String>> {
    args.get(key).and_then(|v| v.as_array()).map(|arr| {
        arr.iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect()
    })
}

fn parse_categories(value: &Value) -> Result<Vec<LiteratureCategory>> {
    let specs = value
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("'categories' must be an array"))?;

    specs
        .iter()
        .map(|entry| {
            let name = entry
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("Category missing 'name'"))?;
            let keywords = string_list(entry, "keywords")
                .ok_or_else(|| anyhow::anyhow!("Category '{}' missing 'keywords'", name))?;

            let mut category = LiteratureCategory::new(name).with_keywords(keywords);
            category.description = entry
                .get("description")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            Ok(category)
        })
        .collect()
}

/// The tool catalog for `tools/list`.
fn tool_catalog() -> Vec<Value> {
    let library_props = json!({
        "library_id": {"type": "string", "description": "Zotero library ID"},
        "library_type": {"type": "string", "enum": ["user", "group"], "default": "user"},
        "api_key": {"type": "string", "description": "Zotero API key"}
    });
    let filter_props = json!({
        "tags": {"type": "array", "items": {"type": "string"}, "description": "Filter by tags"},
        "collections": {"type": "array", "items": {"type": "string"}, "description": "Filter by collections"},
        "authors": {"type": "array", "items": {"type": "string"}, "description": "Filter by authors"},
        "keywords": {"type": "array", "items": {"type": "string"}, "description": "Filter by keywords in title/abstract"},
        "year_range": {"type": "array", "items": {"type": "integer"}, "minItems": 2, "maxItems": 2, "description": "Year range [start, end]"},
        "item_type": {"type": "string", "enum": ItemType::CANONICAL_NAMES, "description": "Filter by item type"},
        "title_contains": {"type": "string", "description": "Substring match on the title"}
    });

    let mut fetch_props = library_props.as_object().unwrap().clone();
    fetch_props.extend(filter_props.as_object().unwrap().clone());
    fetch_props.insert(
        "limit".to_string(),
        json!({"type": "integer", "description": "Maximum number of items to fetch"}),
    );

    let mut categorize_props = library_props.as_object().unwrap().clone();
    categorize_props.insert(
        "categories".to_string(),
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "description": {"type": "string"},
                    "keywords": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["name", "keywords"]
            },
            "description": "Literature categories with keywords for classification"
        }),
    );
    categorize_props.insert(
        "filter_criteria".to_string(),
        json!({"type": "object", "properties": filter_props, "description": "Optional filter criteria"}),
    );
    categorize_props.insert(
        "export_format".to_string(),
        json!({"type": "string", "enum": ["json", "markdown", "both"], "default": "markdown"}),
    );
    categorize_props.insert(
        "context_type".to_string(),
        json!({"type": "string", "enum": ["related_works", "literature_review"], "default": "related_works"}),
    );

    let mut search_props = library_props.as_object().unwrap().clone();
    search_props.insert(
        "query".to_string(),
        json!({"type": "string", "description": "Search query"}),
    );
    search_props.insert(
        "limit".to_string(),
        json!({"type": "integer", "description": "Maximum number of results", "default": 20}),
    );

    let mut tags_props = library_props.as_object().unwrap().clone();
    tags_props.insert(
        "limit".to_string(),
        json!({"type": "integer", "description": "Maximum number of tags to return", "default": 100}),
    );

    vec![
        json!({
            "name": "fetch_literature",
            "description": "Fetch literature items from a Zotero library with filtering options",
            "inputSchema": {"type": "object", "properties": fetch_props}
        }),
        json!({
            "name": "categorize_literature",
            "description": "Fetch and categorize literature items based on keyword categories",
            "inputSchema": {"type": "object", "properties": categorize_props, "required": ["categories"]}
        }),
        json!({
            "name": "search_literature",
            "description": "Search literature items in a Zotero library",
            "inputSchema": {"type": "object", "properties": search_props, "required": ["query"]}
        }),
        json!({
            "name": "get_collections",
            "description": "Get all collections from a Zotero library",
            "inputSchema": {"type": "object", "properties": library_props}
        }),
        json!({
            "name": "get_tags",
            "description": "Get all tags from a Zotero library",
            "inputSchema": {"type": "object", "properties": tags_props}
        }),
        json!({
            "name": "export_for_llm",
            "description": "Export categorized literature in an LLM-optimized context format",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "categorized_data": {
                        "type": "array",
                        "description": "Categorized literature from categorize_literature"
                    },
                    "context_type": {"type": "string", "enum": ["related_works", "literature_review"], "default": "related_works"},
                    "format": {"type": "string", "enum": ["markdown", "json"], "default": "markdown"}
                },
                "required": ["categorized_data"]
            }
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_criteria_empty() {
        assert!(parse_criteria(&json!({})).unwrap().is_none());
        assert!(parse_criteria(&json!({"library_id": "1"})).unwrap().is_none());
    }

    #[test]
    fn test_parse_criteria_fields() {
        let criteria = parse_criteria(&json!({
            "tags": ["ml"],
            "year_range": [2019, 2023],
            "item_type": "dissertation",
        }))
        .unwrap()
        .unwrap();

        assert_eq!(criteria.tags, Some(vec!["ml".to_string()]));
        assert_eq!(criteria.date_range, Some((2019, 2023)));
        assert_eq!(criteria.item_types, Some(vec![ItemType::Thesis]));
    }

    #[test]
    fn test_parse_criteria_bad_year_range() {
        assert!(parse_criteria(&json!({"year_range": [2019]})).is_err());
    }

    #[test]
    fn test_parse_criteria_unknown_item_type() {
        assert!(parse_criteria(&json!({"item_type": "mixtape"})).is_err());
    }

    #[test]
    fn test_parse_categories() {
        let cats = parse_categories(&json!([
            {"name": "A", "keywords": ["x"], "description": "d"},
            {"name": "B", "keywords": []},
        ]))
        .unwrap();

        assert_eq!(cats.len(), 2);
        assert_eq!(cats[0].name, "A");
        assert_eq!(cats[0].description.as_deref(), Some("d"));
        assert!(cats[1].keywords.is_empty());
    }

    #[test]
    fn test_parse_categories_missing_name() {
        assert!(parse_categories(&json!([{"keywords": ["x"]}])).is_err());
    }

    fn server() -> McpServer {
        McpServer::new(Settings {
            library_id: Some("12345".to_string()),
            library_type: LibraryType::User,
            api_key: Some("KEY".to_string()),
            output_dir: std::env::temp_dir(),
            config_file: None,
        })
    }

    #[tokio::test]
    async fn test_malformed_line_yields_parse_error_with_null_id() {
        let mut server = server();

        let response = server.handle_message("this is not json").await.unwrap();
        assert_eq!(response.id, Some(Value::Null));
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, -32700);

        // The loop survives a malformed line; the next request still works.
        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
            .await
            .unwrap();
        assert!(response.error.is_none());
        assert!(response.result.is_some());
    }

    #[tokio::test]
    async fn test_unknown_method_echoes_id() {
        let mut server = server();
        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","id":7,"method":"resources/list"}"#)
            .await
            .unwrap();

        assert_eq!(response.id, Some(json!(7)));
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let mut server = server();
        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_wrong_protocol_version_rejected() {
        let mut server = server();
        let response = server
            .handle_message(r#"{"jsonrpc":"1.0","id":2,"method":"initialize"}"#)
            .await
            .unwrap();

        assert_eq!(response.id, Some(json!(2)));
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let mut server = server();
        let response = server
            .handle_message(
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"frobnicate"}}"#,
            )
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_initialize_reports_server_info() {
        let mut server = server();
        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","id":4,"method":"initialize","params":{}}"#)
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
    }

    #[test]
    fn test_tool_catalog_names() {
        let names: Vec<String> = tool_catalog()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "fetch_literature",
                "categorize_literature",
                "search_literature",
                "get_collections",
                "get_tags",
                "export_for_llm"
            ]
        );
    }
}
