use std::sync::Arc;

use rmcp::{
    ServerHandler,
    ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult,
        Content,
        Implementation,
        ServerCapabilities,
        ServerInfo,
    },
    tool,
    tool_handler,
    tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    citation::{Citation, citations},
    error,
    retriever::Retriever,
    search::{DEFAULT_TOP_K, SearchResult},
};

#[derive(Clone)]
pub struct HelpdeskMcpServer {
    retriever: Arc<Retriever>,
    tool_router: ToolRouter<Self>,
}

impl HelpdeskMcpServer {
    pub fn new(retriever: Arc<Retriever>) -> Self {
        Self {
            retriever,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router(router = tool_router)]
impl HelpdeskMcpServer {
    /// Rank knowledge-base passages against a question.
    #[tool(
        name = "helpdesk_search",
        description = "Search the support knowledge base. Results scored exactly 0.01 are fallback passages, not matches."
    )]
    pub async fn helpdesk_search(
        &self,
        params: Parameters<SearchParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;
        let limit = params.limit.unwrap_or(DEFAULT_TOP_K);
        let results = self.retriever.search(&params.query, limit);

        let summary = format_search_summary(&results, &params.query);
        let structured = serde_json::to_value(SearchResponse {
            result_count: results.len(),
            citations: citations(&results),
            results: results.iter().map(SearchResultItem::from).collect(),
            query: params.query,
        })
        .map_err(|e| mcp_error("failed to serialize search results", e))?;

        Ok(with_structured(summary, structured))
    }

    /// Reload the knowledge base from its source directory.
    #[tool(
        name = "helpdesk_reindex",
        description = "Re-read every knowledge-base file and replace the search index."
    )]
    pub async fn helpdesk_reindex(
        &self,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let retriever = Arc::clone(&self.retriever);
        let summary = tokio::task::spawn_blocking(move || retriever.reindex())
            .await
            .map_err(|e| mcp_error("reindex task failed", e))?;

        let errors: Vec<_> = summary
            .errors
            .iter()
            .map(|e| json!({ "name": e.name, "error": e.error.to_string() }))
            .collect();
        let text = format!(
            "Re-indexed {} documents ({} passages, {} errors)",
            summary.document_count,
            summary.passage_count,
            errors.len()
        );

        Ok(with_structured(
            text,
            json!({
                "documentCount": summary.document_count,
                "passageCount": summary.passage_count,
                "errors": errors,
            }),
        ))
    }

    /// List indexed documents.
    #[tool(
        name = "helpdesk_documents",
        description = "List the knowledge-base documents with their passage counts."
    )]
    pub async fn helpdesk_documents(
        &self,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let documents: Vec<_> = self
            .retriever
            .documents()
            .iter()
            .map(|d| json!({ "filename": d.filename, "passages": d.passages.len() }))
            .collect();
        let text = self.retriever.filenames().join("\n");

        Ok(with_structured(
            text,
            json!({
                "documentCount": documents.len(),
                "documents": documents,
            }),
        ))
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for HelpdeskMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_server_info(
                Implementation::new("helpdesk", env!("CARGO_PKG_VERSION"))
                    .with_title("helpdesk MCP"),
            )
            .with_instructions(
                "Use helpdesk_search to find knowledge-base passages and cite them by filename and passage index.",
            )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// The customer's question.
    pub query: String,
    /// Maximum number of passages (default: 3).
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    query: String,
    result_count: usize,
    results: Vec<SearchResultItem>,
    citations: Vec<Citation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultItem {
    filename: String,
    passage_index: usize,
    score: f64,
    fallback: bool,
    passage: String,
}

impl From<&SearchResult> for SearchResultItem {
    fn from(r: &SearchResult) -> Self {
        Self {
            filename: r.document.filename.clone(),
            passage_index: r.passage_index,
            score: r.score,
            fallback: r.is_fallback(),
            passage: r.passage.clone(),
        }
    }
}

fn format_search_summary(results: &[SearchResult], query: &str) -> String {
    if results.is_empty() {
        return format!("No results found for \"{query}\"");
    }

    let mut lines = Vec::with_capacity(results.len() + 1);
    let suffix = if results.len() == 1 { "" } else { "s" };
    if results.iter().all(SearchResult::is_fallback) {
        lines.push(format!(
            "No passage matched \"{query}\"; {} fallback passage{suffix}:",
            results.len()
        ));
    } else {
        lines.push(format!(
            "Found {} result{suffix} for \"{query}\":",
            results.len()
        ));
    }

    for r in results {
        lines.push(format!(
            "{:.3} {}#{}",
            r.score, r.document.filename, r.passage_index
        ));
    }

    lines.join("\n")
}

/// A successful result carrying a text summary and a JSON payload.
fn with_structured(text: String, structured: serde_json::Value) -> CallToolResult {
    let mut result = CallToolResult::success(vec![Content::text(text)]);
    result.structured_content = Some(structured);
    result
}

fn mcp_error(message: &str, error: impl std::fmt::Display) -> rmcp::ErrorData {
    rmcp::ErrorData::internal_error(
        message.to_string(),
        Some(json!({ "error": error.to_string() })),
    )
}

pub fn run_mcp(retriever: Arc<Retriever>) -> error::Result<()> {
    let server = HelpdeskMcpServer::new(retriever);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            error::Error::Config(format!("failed to start tokio runtime: {e}"))
        })?;

    runtime.block_on(async move {
        let transport = rmcp::transport::stdio();
        let running = server.serve(transport).await.map_err(|e| {
            error::Error::Config(format!(
                "MCP server initialization failed: {e}"
            ))
        })?;
        running.waiting().await.map_err(|e| {
            error::Error::Config(format!("MCP server error: {e}"))
        })?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn server() -> (HelpdeskMcpServer, Arc<MemorySource>) {
        let source = Arc::new(MemorySource::from_entries([
            (
                "pricing.md",
                "# Pricing Plans\n\n## Free Tier\n- Cost: $0/month\n- Features: Basic support",
            ),
            (
                "refunds.md",
                "# Refund Policy\n\n## 30-Day Guarantee\nWe offer refunds within 30 days",
            ),
        ]));
        let retriever = Arc::new(Retriever::open(source.clone()));
        (HelpdeskMcpServer::new(retriever), source)
    }

    fn structured(result: &CallToolResult) -> &serde_json::Value {
        result.structured_content.as_ref().expect("structured")
    }

    #[tokio::test]
    async fn search_tool_returns_results_and_citations() {
        let (server, _source) = server();
        let params = SearchParams {
            query: "refund policy".to_string(),
            limit: Some(2),
        };

        let result = server.helpdesk_search(Parameters(params)).await.unwrap();
        let value = structured(&result);

        let results = value["results"].as_array().expect("results array");
        assert!(!results.is_empty());
        assert!(results.len() <= 2);
        assert_eq!(results[0]["filename"], "refunds.md");
        assert_eq!(results[0]["fallback"], false);

        let cites = value["citations"].as_array().expect("citations array");
        assert_eq!(cites.len(), results.len());
        assert_eq!(cites[0]["passageIndex"], results[0]["passageIndex"]);
        assert!(cites[0]["text"].as_str().unwrap().ends_with("..."));

        let summary = result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .unwrap_or_default();
        assert!(summary.starts_with("Found "));
    }

    #[tokio::test]
    async fn search_tool_marks_fallback_results() {
        let (server, _source) = server();
        let params = SearchParams {
            query: "completely unrelated topic".to_string(),
            limit: None,
        };

        let result = server.helpdesk_search(Parameters(params)).await.unwrap();
        let value = structured(&result);
        let results = value["results"].as_array().unwrap();

        assert_eq!(value["resultCount"], DEFAULT_TOP_K);
        assert!(results.iter().all(|r| r["fallback"] == true));
        assert!(results.iter().all(|r| r["score"] == 0.01));
    }

    #[tokio::test]
    async fn reindex_tool_publishes_new_documents() {
        let (server, source) = server();
        source.insert("new-doc.md", "# New Document\n\nThis is a new document");

        let result = server.helpdesk_reindex().await.unwrap();
        assert_eq!(structured(&result)["documentCount"], 3);

        let listed = server.helpdesk_documents().await.unwrap();
        let docs = structured(&listed)["documents"].as_array().unwrap().clone();
        assert!(docs.iter().any(|d| d["filename"] == "new-doc.md"));
    }
}
