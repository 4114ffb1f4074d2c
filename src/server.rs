//! MCP server implementation with tool routing.

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, InitializeResult,
    ListToolsResult, PaginatedRequestParams, ServerCapabilities, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, ServerHandler};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::state::ServerState;
use crate::tools;

/// PDF Navigator MCP Server.
///
/// Reads and searches PDFs and opens them in an external viewer.
pub struct NavigatorServer {
    state: ServerState,
}

impl NavigatorServer {
    /// Create a server with the given configuration.
    pub fn new(config: Config) -> Self {
        Self::with_state(ServerState::new(config))
    }

    /// Create a server around prepared state.
    pub fn with_state(state: ServerState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    fn make_tool(name: &str, description: &str, schema: Value) -> Tool {
        Tool {
            name: Cow::Owned(name.to_string()),
            title: None,
            description: Some(Cow::Owned(description.to_string())),
            input_schema: Arc::new(serde_json::from_value(schema).unwrap_or_default()),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        }
    }

    /// Tool declarations advertised to clients.
    pub fn tools() -> Vec<Tool> {
        let file_path = serde_json::json!({
            "type": "string",
            "description": "Path to the PDF file"
        });

        vec![
            Self::make_tool(
                "read_pdf_text",
                "Read text content from a range of PDF pages. Returns one entry per page, including pages without text.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "file_path": file_path,
                        "start_page": { "type": "integer", "minimum": 1, "default": 1, "description": "First page (1-indexed)" },
                        "end_page": { "type": "integer", "minimum": 1, "description": "Last page (1-indexed, inclusive). Defaults to the last page." }
                    },
                    "required": ["file_path"]
                }),
            ),
            Self::make_tool(
                "read_pdf_page",
                "Read text content from a single PDF page.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "file_path": file_path,
                        "page_number": { "type": "integer", "minimum": 1, "description": "Page number (1-indexed)" }
                    },
                    "required": ["file_path", "page_number"]
                }),
            ),
            Self::make_tool(
                "get_pdf_structure",
                "Get the table of contents (with nesting level and target page) and a short summary of each page.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "file_path": file_path
                    },
                    "required": ["file_path"]
                }),
            ),
            Self::make_tool(
                "get_pdf_info",
                "Get PDF metadata (title, author, subject, keywords, creator, producer, dates) and page count.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "file_path": file_path
                    },
                    "required": ["file_path"]
                }),
            ),
            Self::make_tool(
                "search_pdf_text",
                "Search for text in a PDF. Returns matches ordered by page, then position, each with page number, character offset and surrounding context.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "file_path": file_path,
                        "query": { "type": "string", "description": "Text to search for" },
                        "case_sensitive": { "type": "boolean", "default": false }
                    },
                    "required": ["file_path", "query"]
                }),
            ),
            Self::make_tool(
                "open_pdf_page",
                "Open a PDF in the configured external viewer at a specific page.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "file_path": file_path,
                        "page_number": { "type": "integer", "minimum": 1, "description": "Page to open (1-indexed)" }
                    },
                    "required": ["file_path", "page_number"]
                }),
            ),
            Self::make_tool(
                "search_and_open",
                "Search for text in a PDF and open the external viewer at the page of the chosen match.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "file_path": file_path,
                        "query": { "type": "string", "description": "Text to search for" },
                        "result_index": { "type": "integer", "minimum": 1, "default": 1, "description": "Which match to open (1-indexed, as listed by search_pdf_text)" },
                        "case_sensitive": { "type": "boolean", "default": false }
                    },
                    "required": ["file_path", "query"]
                }),
            ),
        ]
    }

    /// Run a tool by name and serialize its result.
    ///
    /// `Err` means the request itself was malformed; tool failures are
    /// reported inside the returned `Result`.
    pub fn dispatch(
        &self,
        name: &str,
        args: Map<String, Value>,
    ) -> std::result::Result<Result<String>, McpError> {
        let state = &self.state;
        let result = match name {
            "read_pdf_text" => to_json(tools::read_pdf_text(parse(args)?)),
            "read_pdf_page" => to_json(tools::read_pdf_page(parse(args)?)),
            "get_pdf_structure" => to_json(tools::get_pdf_structure(parse(args)?)),
            "get_pdf_info" => to_json(tools::get_pdf_info(parse(args)?)),
            "search_pdf_text" => to_json(tools::search_pdf_text(state, parse(args)?)),
            "open_pdf_page" => to_json(tools::open_pdf_page(state, parse(args)?)),
            "search_and_open" => to_json(tools::search_and_open(state, parse(args)?)),
            _ => return Err(McpError::invalid_params(format!("Unknown tool: {}", name), None)),
        };
        Ok(result)
    }
}

fn parse<T: DeserializeOwned>(args: Map<String, Value>) -> std::result::Result<T, McpError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| McpError::invalid_params(e.to_string(), None))
}

fn to_json<T: Serialize>(result: Result<T>) -> Result<String> {
    Ok(serde_json::to_string(&result?)?)
}

impl Default for NavigatorServer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ServerHandler for NavigatorServer {
    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: Default::default(),
            server_info: Implementation {
                name: "pdf-navigator-mcp".to_string(),
                title: Some("PDF Navigator MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "PDF reading, search and navigation server. \
                 All page numbers are 1-indexed. \
                 Use search_pdf_text to find passages, read_pdf_text or read_pdf_page to read them, \
                 and get_pdf_structure for the table of contents. \
                 open_pdf_page and search_and_open show a page to the user in their PDF viewer; \
                 search_and_open's result_index refers to the numbering of search_pdf_text matches, starting at 1."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = std::result::Result<ListToolsResult, McpError>> + Send + '_
    {
        async move {
            Ok(ListToolsResult {
                tools: Self::tools(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = std::result::Result<CallToolResult, McpError>> + Send + '_
    {
        let name = request.name.clone();
        let args = request.arguments.clone().unwrap_or_default();

        async move {
            tracing::debug!(tool = %name, "Tool call");

            match self.dispatch(&name, args)? {
                Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
                Err(e) => {
                    tracing::warn!(tool = %name, error = %e, "Tool call failed");
                    Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
                }
            }
        }
    }
}
