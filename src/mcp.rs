//! MCP JSON-RPC protocol bridge.
//!
//! Exposes the [`AbilityRegistry`] as MCP tools over Streamable HTTP
//! (mounted at `/mcp` by the server). Tool names are the full ability
//! names. The caller is resolved from the `Authorization` header of the
//! HTTP request that carried the JSON-RPC message.

use std::borrow::Cow;
use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, request::Parts};
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler};

use crate::auth::{bearer_token, resolve_caller, Caller};
use crate::config::AuthConfig;
use crate::context::InsightsContext;
use crate::error::AbilityError;
use crate::traits::{AbilityRegistry, Registration};

/// Each MCP session receives a clone; everything is behind `Arc`.
#[derive(Clone)]
pub struct McpBridge {
    ctx: Arc<InsightsContext>,
    abilities: Arc<AbilityRegistry>,
    auth: Arc<AuthConfig>,
}

impl McpBridge {
    pub fn new(
        ctx: Arc<InsightsContext>,
        abilities: Arc<AbilityRegistry>,
        auth: Arc<AuthConfig>,
    ) -> Self {
        Self {
            ctx,
            abilities,
            auth,
        }
    }

    fn to_mcp_tool(registration: &Registration) -> Tool {
        let ability = registration.ability();
        let input_schema: Arc<serde_json::Map<String, serde_json::Value>> =
            match ability.input_schema() {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

        Tool {
            name: Cow::Owned(ability.name().to_string()),
            title: Some(ability.label().to_string()),
            description: Some(Cow::Owned(ability.description().to_string())),
            input_schema,
            // MCP output schemas must be objects; ours are arrays.
            output_schema: None,
            annotations: Some(ToolAnnotations::new().read_only(true)),
            execution: None,
            icons: None,
            meta: None,
        }
    }

    fn caller_from(&self, parts: Option<&Parts>) -> Caller {
        let token = parts
            .and_then(|p| p.headers.get(AUTHORIZATION))
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token);
        resolve_caller(&self.auth, token)
    }
}

impl ServerHandler for McpBridge {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "editorial-insights".to_string(),
                title: Some("Editorial Insights".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only content analytics for this site. Use get-top-posts and \
                 get-search-terms to see what readers engage with, get-stale-drafts to \
                 find abandoned drafts, and get-underperforming-posts to find older \
                 posts worth refreshing."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools: Vec<Tool> = self
            .abilities
            .registrations()
            .iter()
            .map(Self::to_mcp_tool)
            .collect();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.abilities.find(name).map(Self::to_mcp_tool)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.caller_from(context.extensions.get::<Parts>());
        let input = request.arguments.map(serde_json::Value::Object);

        match self
            .abilities
            .invoke(&request.name, input.as_ref(), &caller, &self.ctx)
            .await
        {
            Ok(result) => {
                let text = serde_json::to_string_pretty(&result).unwrap_or_default();
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(AbilityError::NotFound(name)) => Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("no ability registered with name: {}", name),
                None,
            )),
            Err(e @ AbilityError::Forbidden(_)) => Err(McpError::new(
                ErrorCode::INVALID_REQUEST,
                e.to_string(),
                Some(serde_json::json!({ "code": e.code() })),
            )),
            Err(e @ AbilityError::InvalidInput(_)) => Err(McpError::new(
                ErrorCode::INVALID_PARAMS,
                e.to_string(),
                None,
            )),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "{}: {}",
                e.code(),
                e
            ))])),
        }
    }
}
