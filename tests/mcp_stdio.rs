use std::path::{Path, PathBuf};

use rmcp::{
    ServiceExt,
    model::CallToolRequestParams,
    transport::{ConfigureCommandExt, TokioChildProcess},
};
use serde_json::json;

fn setup_fixture(kb_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(
        kb_dir.join("pricing.md"),
        "# Pricing Plans\n\n## Free Tier\n- Cost: $0/month\n- Features: Basic support\n",
    )?;
    std::fs::write(
        kb_dir.join("refunds.md"),
        "# Refund Policy\n\n## 30-Day Guarantee\nWe offer refunds within 30 days\n",
    )?;
    Ok(())
}

#[tokio::test]
async fn mcp_stdio_search_roundtrip() -> Result<(), Box<dyn std::error::Error>>
{
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let bin = helpdesk_bin()?;
    let transport = TokioChildProcess::new(
        tokio::process::Command::new(bin).configure(|cmd| {
            cmd.arg("mcp")
                .env("HELPDESK_KB_DIR", tempdir.path())
                .env("HELPDESK_LOG", "warn");
        }),
    )?;

    let client = ().serve(transport).await?;

    let args = json!({
        "query": "refund policy 30 days",
        "limit": 2
    });

    let result = client
        .peer()
        .call_tool(
            CallToolRequestParams::new("helpdesk_search")
                .with_arguments(args.as_object().unwrap().clone()),
        )
        .await?;

    let structured = result.structured_content.expect("structured content");
    let results = structured
        .get("results")
        .and_then(|v| v.as_array())
        .expect("results array");

    assert!(!results.is_empty());
    assert!(results.len() <= 2);
    assert_eq!(
        results[0].get("filename").and_then(|v| v.as_str()),
        Some("refunds.md")
    );

    // A new file only becomes visible after an explicit reindex.
    std::fs::write(
        tempdir.path().join("new-doc.md"),
        "# New Document\n\nThis is a new document\n",
    )?;
    let reindex = client
        .peer()
        .call_tool(
            CallToolRequestParams::new("helpdesk_reindex")
                .with_arguments(serde_json::Map::new()),
        )
        .await?;
    let reindexed = reindex.structured_content.expect("structured content");
    assert_eq!(
        reindexed.get("documentCount").and_then(|v| v.as_u64()),
        Some(3)
    );

    client.cancel().await?;
    Ok(())
}

fn helpdesk_bin() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(bin) = std::env::var("CARGO_BIN_EXE_helpdesk") {
        return Ok(PathBuf::from(bin));
    }

    let mut path = std::env::current_exe()?;
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("helpdesk");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    Ok(path)
}
