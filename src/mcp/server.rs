use super::protocol::{error_response, success_response, Protocol};
use super::types::*;
use crate::extractor::dart_extractor::DartExtractor;
use crate::handlers::tool_handlers::ToolHandlers;
use anyhow::Result;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "unit-test-prompt-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const GENERATE_UNIT_TEST: &str = "generateUnitTest";

/// Main MCP Server
pub struct McpServer {
    tool_handlers: ToolHandlers,
}

impl McpServer {
    pub fn new() -> Result<Self> {
        // Relative tool paths fall back to this root when they do not resolve from the working directory
        let workspace_root = std::env::var("WORKSPACE_ROOT")
            .map(PathBuf::from)
            .or_else(|_| std::env::current_dir())?;

        tracing::debug!("Workspace root: {}", workspace_root.display());

        Ok(Self::with_handlers(ToolHandlers::new(
            Arc::new(DartExtractor::new()?),
            workspace_root,
        )))
    }

    pub fn with_handlers(tool_handlers: ToolHandlers) -> Self {
        Self { tool_handlers }
    }

    pub async fn start(&self) -> Result<()> {
        let mut protocol = Protocol::stdio();
        self.serve(&mut protocol).await
    }

    /// Answer requests until the reader reaches EOF
    pub async fn serve<R, W>(&self, protocol: &mut Protocol<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("MCP server started, waiting for requests...");

        loop {
            let response = match protocol.read_request().await? {
                Some(Ok(request)) => self.handle_request(request).await,
                Some(Err(malformed)) => {
                    tracing::error!("Failed to parse request {:?}: {}", malformed.line, malformed.error);
                    let error = malformed.to_error();
                    Some(error_response(malformed.id, error))
                }
                None => {
                    tracing::info!("Client disconnected");
                    break;
                }
            };

            if let Some(response) = response {
                if let Err(e) = protocol.send_response(response).await {
                    tracing::error!("Failed to send response: {}", e);
                }
            }
        }

        Ok(())
    }

    /// Dispatch one request. Notifications never get a response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!("Received request: method={}, id={:?}", request.method, request.id);

        let Some(id) = request.id else {
            tracing::debug!("Notification: {}", request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => success_response(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => error_response(id, JsonRpcError::method_not_found()),
        };

        Some(response)
    }

    fn handle_initialize(&self, id: Value, params: Value) -> JsonRpcResponse {
        match serde_json::from_value::<InitializeRequest>(params) {
            Ok(req) => {
                tracing::info!("Client connected: {} v{}", req.clientInfo.name, req.clientInfo.version);
            }
            Err(e) => {
                // Some clients send minimal initialize params
                tracing::warn!("Could not read client info from initialize request: {}", e);
            }
        }

        let response = InitializeResponse {
            protocolVersion: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    listChanged: Some(false),
                },
            },
            serverInfo: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };

        success_response(id, response)
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools = vec![Tool {
            name: GENERATE_UNIT_TEST.to_string(),
            description: r#"Build a prompt for writing Flutter unit tests for one Dart source file.

The file is scanned for its class name, public methods, accessors, operators, constructors, imports and package dependencies.

✨ **Usage Guidance**:
- Pass `path` to read the file from disk; relative paths are resolved against the working directory, then the workspace root.
- Pass `content` to supply the source directly; `path` is then only used for the file name."#
                .to_string(),
            inputSchema: json!({
                "type": "object",
                "required": [],
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the Dart source file."
                    },
                    "content": {
                        "type": "string",
                        "description": "Source code of the file. When provided, the path is not read."
                    }
                }
            }),
        }];

        success_response(id, ListToolsResponse { tools })
    }

    async fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let call_request: CallToolRequest = match serde_json::from_value(params) {
            Ok(req) => req,
            Err(e) => {
                return error_response(id, JsonRpcError::invalid_params(format!("Invalid params: {}", e)));
            }
        };

        let result = match call_request.name.as_str() {
            GENERATE_UNIT_TEST => {
                self.tool_handlers
                    .handle_generate_unit_test(&call_request.arguments)
                    .await
            }
            _ => {
                return error_response(
                    id,
                    JsonRpcError::invalid_params(format!("Unknown tool: {}", call_request.name)),
                );
            }
        };

        let response = match result {
            Ok(content) => CallToolResponse {
                content,
                isError: None,
            },
            Err(e) => {
                tracing::warn!("{} failed: {}", call_request.name, e);
                CallToolResponse {
                    content: vec![Content::text(format!("Error generating unit test: {}", e))],
                    isError: Some(true),
                }
            }
        };

        success_response(id, response)
    }
}
