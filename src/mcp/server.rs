//! MCP server implementation.
//!
//! Routes JSON-RPC requests to the bake layer and the operation catalog.
use super::types::*;
use crate::bake::{self, MagicArgs};
use crate::catalog::OperationCatalog;
use crate::recipe::RecipeOperation;
use crate::transport::{into_payload, Transport};
use anyhow::{anyhow, Context, Result};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{BufRead, Write};

pub const CATEGORIES_URI: &str = "data://cyberchef-operations-categories";
pub const OPERATIONS_URI_PREFIX: &str = "data://cyberchef-operations-by-category/";
const JSON_MIME: &str = "application/json";

#[derive(Debug, Deserialize)]
struct BakeParams {
    input_data: String,
    recipe: Vec<RecipeOperation>,
}

#[derive(Debug, Deserialize)]
struct BatchBakeParams {
    batch_input_data: Vec<String>,
    recipe: Vec<RecipeOperation>,
}

#[derive(Debug, Deserialize)]
struct MagicParams {
    input_data: String,
    #[serde(default = "default_depth")]
    depth: u32,
    #[serde(default)]
    intensive_mode: bool,
    #[serde(default)]
    extensive_language_support: bool,
    #[serde(default)]
    crib_str: String,
}

fn default_depth() -> u32 {
    MagicArgs::default().depth
}

impl From<MagicParams> for MagicArgs {
    fn from(params: MagicParams) -> Self {
        Self {
            depth: params.depth,
            intensive_mode: params.intensive_mode,
            extensive_language_support: params.extensive_language_support,
            crib: params.crib_str,
        }
    }
}

/// MCP server over an engine transport and an operation catalog.
pub struct McpServer<T: Transport> {
    transport: T,
    catalog: OperationCatalog,
}

impl<T: Transport> McpServer<T> {
    pub fn new(transport: T, catalog: OperationCatalog) -> Self {
        Self { transport, catalog }
    }

    /// Handle one request; notifications yield no response.
    pub fn handle_request(&self, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %request.method, "handling request");
        if request.is_notification() {
            return None;
        }
        let id = request.id.clone();
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, initialize_result()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => JsonRpcResponse::success(id, self.call_tool(&request.params)),
            "resources/list" => {
                JsonRpcResponse::success(id, json!({ "resources": resource_definitions() }))
            }
            "resources/templates/list" => JsonRpcResponse::success(
                id,
                json!({ "resourceTemplates": resource_templates() }),
            ),
            "resources/read" => match self.read_resource(&request.params) {
                Ok(contents) => JsonRpcResponse::success(id, json!({ "contents": [contents] })),
                Err(err) => JsonRpcResponse::error(id, INVALID_PARAMS, format!("{err:#}")),
            },
            other => {
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))
            }
        };
        Some(response)
    }

    fn call_tool(&self, params: &Value) -> Value {
        let name = params.get("name").and_then(Value::as_str);
        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
        let result = match name {
            Some(name) => {
                tracing::info!(tool = name, "tool call");
                match self.run_tool(name, arguments) {
                    Ok(payload) => ToolCallResult::json(&payload),
                    Err(err) => ToolCallResult::error(format!("{err:#}")),
                }
            }
            None => ToolCallResult::error("Missing tool name"),
        };
        serde_json::to_value(result).unwrap_or_else(|_| json!({}))
    }

    /// Run a tool; `Err` only for unknown tools and invalid arguments.
    fn run_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        let exchange = match name {
            "bake_recipe" => {
                let params: BakeParams = parse_arguments(name, arguments)?;
                check_recipe(&params.recipe)?;
                bake::bake(&self.transport, &params.input_data, &params.recipe)
            }
            "batch_bake_recipe" => {
                let params: BatchBakeParams = parse_arguments(name, arguments)?;
                check_recipe(&params.recipe)?;
                bake::batch_bake(&self.transport, &params.batch_input_data, &params.recipe)
            }
            "perform_magic_operation" => {
                let params: MagicParams = parse_arguments(name, arguments)?;
                let input = params.input_data.clone();
                bake::magic(&self.transport, &input, &MagicArgs::from(params))
            }
            other => return Err(anyhow!("Unknown tool: {other}")),
        };
        Ok(into_payload(exchange))
    }

    fn read_resource(&self, params: &Value) -> Result<ResourceContents> {
        let uri = params
            .get("uri")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Missing required parameter: uri"))?;
        let payload = if uri == CATEGORIES_URI {
            serde_json::to_value(self.catalog.categories()).context("serialize categories")?
        } else if let Some(category) = uri.strip_prefix(OPERATIONS_URI_PREFIX) {
            let operations = self.catalog.operations_by_category(&percent_decode(category)?)?;
            serde_json::to_value(operations).context("serialize operations")?
        } else {
            return Err(anyhow!("Unknown resource: {uri}"));
        };
        Ok(ResourceContents {
            uri: uri.to_string(),
            mime_type: JSON_MIME.to_string(),
            text: format!("{payload:#}"),
        })
    }

    /// Handle one parsed line; JSON that is not a request gets `-32600`.
    fn handle_message(&self, message: Value) -> Option<JsonRpcResponse> {
        let id = message.get("id").cloned();
        match serde_json::from_value::<JsonRpcRequest>(message) {
            Ok(request) => self.handle_request(&request),
            Err(err) => {
                tracing::warn!(error = %err, "invalid request");
                Some(JsonRpcResponse::error(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid Request: {err}"),
                ))
            }
        }
    }

    /// Serve newline-delimited JSON-RPC until the reader is exhausted.
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        for line in reader.lines() {
            let line = line.context("read request line")?;
            if line.trim().is_empty() {
                continue;
            }
            let response = match serde_json::from_str::<Value>(&line) {
                Ok(message) => self.handle_message(message),
                Err(err) => {
                    tracing::warn!(error = %err, "unparseable request");
                    Some(JsonRpcResponse::error(
                        None,
                        PARSE_ERROR,
                        format!("Parse error: {err}"),
                    ))
                }
            };
            if let Some(response) = response {
                let json = serde_json::to_string(&response).context("serialize response")?;
                writeln!(writer, "{json}").context("write response")?;
                writer.flush().context("flush response")?;
            }
        }
        Ok(())
    }
}

fn parse_arguments<P: DeserializeOwned>(tool: &str, arguments: Value) -> Result<P> {
    serde_json::from_value(arguments).with_context(|| format!("Invalid arguments for {tool}"))
}

fn check_recipe(recipe: &[RecipeOperation]) -> Result<()> {
    match recipe.iter().position(|step| step.op.trim().is_empty()) {
        Some(index) => Err(anyhow!("recipe[{index}].op must be a non-empty operation name")),
        None => Ok(()),
    }
}

/// Decode `%XX` escapes in a resource URI segment.
fn percent_decode(segment: &str) -> Result<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .with_context(|| format!("category segment is not valid UTF-8 once decoded: {segment}"))
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": { "subscribe": false, "listChanged": false }
        },
        "serverInfo": {
            "name": "CyberChef API MCP Server",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn recipe_schema() -> PropertySchema {
    PropertySchema::new(
        "array",
        "Ordered list of operations; each has an operation name and optional positional arguments",
    )
    .with_items(json!({
        "type": "object",
        "properties": {
            "op": { "type": "string", "description": "Operation name, e.g. \"From Hex\"" },
            "args": { "type": "array", "description": "Positional operation arguments" }
        },
        "required": ["op"]
    }))
}

fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "bake_recipe".to_string(),
            description: "Bake (execute) a recipe (a list of operations) in order to derive an outcome from the input data".to_string(),
            input_schema: InputSchema::object(
                vec![
                    (
                        "input_data",
                        PropertySchema::new("string", "The data to run the recipe operation(s) on"),
                    ),
                    ("recipe", recipe_schema()),
                ],
                &["input_data", "recipe"],
            ),
        },
        ToolDefinition {
            name: "batch_bake_recipe".to_string(),
            description: "Bake (execute) a recipe (a list of operations) in order to derive an outcome from a batch of input data".to_string(),
            input_schema: InputSchema::object(
                vec![
                    (
                        "batch_input_data",
                        PropertySchema::new("array", "The batch of inputs to run the recipe on")
                            .with_items(json!({ "type": "string" })),
                    ),
                    ("recipe", recipe_schema()),
                ],
                &["batch_input_data", "recipe"],
            ),
        },
        ToolDefinition {
            name: "perform_magic_operation".to_string(),
            description: "Automatically detect how the data is encoded and which operations can be used to decode it".to_string(),
            input_schema: InputSchema::object(
                vec![
                    (
                        "input_data",
                        PropertySchema::new("string", "The data to run the magic operation on"),
                    ),
                    (
                        "depth",
                        PropertySchema::new(
                            "integer",
                            "Levels of recursion for pattern matching and speculative execution",
                        )
                        .with_default(json!(3)),
                    ),
                    (
                        "intensive_mode",
                        PropertySchema::new(
                            "boolean",
                            "Run additional operations; takes considerably longer",
                        )
                        .with_default(json!(false)),
                    ),
                    (
                        "extensive_language_support",
                        PropertySchema::new(
                            "boolean",
                            "Support all languages instead of the most common ones",
                        )
                        .with_default(json!(false)),
                    ),
                    (
                        "crib_str",
                        PropertySchema::new("string", "Known plaintext string or regex")
                            .with_default(json!("")),
                    ),
                ],
                &["input_data"],
            ),
        },
    ]
}

fn resource_definitions() -> Vec<ResourceDefinition> {
    vec![ResourceDefinition {
        uri: CATEGORIES_URI.to_string(),
        name: "cyberchef-operations-categories".to_string(),
        description: "CyberChef operation categories, for selecting the right operations".to_string(),
        mime_type: JSON_MIME.to_string(),
    }]
}

fn resource_templates() -> Vec<ResourceTemplate> {
    vec![ResourceTemplate {
        uri_template: format!("{OPERATIONS_URI_PREFIX}{{category}}"),
        name: "cyberchef-operations-by-category".to_string(),
        description: "CyberChef operations in the selected category".to_string(),
        mime_type: JSON_MIME.to_string(),
    }]
}
