use super::ToolError;
use crate::extractor::dart_extractor::DartExtractor;
use crate::mcp::types::Content;
use crate::prompt;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Tool handlers for MCP server
pub struct ToolHandlers {
    extractor: Arc<DartExtractor>,
    workspace_root: PathBuf,
}

impl ToolHandlers {
    pub fn new(extractor: Arc<DartExtractor>, workspace_root: PathBuf) -> Self {
        Self {
            extractor,
            workspace_root,
        }
    }

    /// Handle generateUnitTest tool
    pub async fn handle_generate_unit_test(&self, args: &Value) -> Result<Vec<Content>, ToolError> {
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or("");
        let content = args.get("content").and_then(|v| v.as_str());

        let source = match content {
            Some(content) => content.to_string(),
            None if path.is_empty() => return Err(ToolError::MissingArgument),
            None => {
                let resolved = self.resolve_path(path)?;
                tracing::debug!("Reading source from {}", resolved.display());
                fs::read_to_string(&resolved)
                    .await
                    .map_err(|source| ToolError::Io { path: resolved, source })?
            }
        };

        let facts = self.extractor.extract(&source);
        let file_name = file_name(path);
        if facts.is_empty() {
            tracing::warn!("No declarations or imports found in {:?}", path);
        } else if let Ok(json) = serde_json::to_string(&facts) {
            tracing::trace!("Extracted facts: {}", json);
        }

        tracing::info!(
            "Generated unit test prompt for {} (class {:?}, {} methods)",
            if file_name.is_empty() { "<inline content>" } else { file_name },
            facts.class_name,
            facts.methods.len()
        );

        Ok(vec![Content::text(prompt::render(file_name, &facts))])
    }

    /// Resolve `path` as given (absolute or against the working directory),
    /// then against the workspace root.
    fn resolve_path(&self, path: &str) -> Result<PathBuf, ToolError> {
        let requested = Path::new(path);
        let direct = std::path::absolute(requested).unwrap_or_else(|_| requested.to_path_buf());
        if direct.is_file() {
            return Ok(direct);
        }

        let in_workspace = self.workspace_root.join(requested);
        if in_workspace.is_file() {
            return Ok(in_workspace);
        }

        Err(ToolError::FileNotFound(path.to_string()))
    }
}

/// Last component of the requested path, empty when there is none
fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn handlers(root: &Path) -> ToolHandlers {
        ToolHandlers::new(Arc::new(DartExtractor::new().unwrap()), root.to_path_buf())
    }

    fn text_of(content: &[Content]) -> &str {
        match &content[0] {
            Content::Text { text } => text,
        }
    }

    const SOURCE: &str = "import 'package:http/http.dart';\n\nclass ApiClient {\n  Future<String> fetch(String url) async {\n    return '';\n  }\n}\n";

    #[tokio::test]
    async fn test_inline_content_takes_priority() {
        let handlers = handlers(Path::new("/nonexistent"));
        let args = json!({"path": "lib/api/api_client.dart", "content": SOURCE});

        let content = handlers.handle_generate_unit_test(&args).await.unwrap();
        let text = text_of(&content);

        assert!(text.contains("File name: api_client.dart"));
        assert!(text.contains("Class name: ApiClient"));
        assert!(text.contains("Dependencies: http\n"));
        assert!(text.contains("Methods: fetch\n"));
    }

    #[tokio::test]
    async fn test_content_without_path() {
        let handlers = handlers(Path::new("/nonexistent"));
        let content = handlers
            .handle_generate_unit_test(&json!({"content": "void main() {}"}))
            .await
            .unwrap();

        assert!(text_of(&content).contains("File name: \n"));
    }

    #[tokio::test]
    async fn test_reads_file_from_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("api_client.dart");
        std::fs::write(&file, SOURCE).unwrap();

        let handlers = handlers(Path::new("/nonexistent"));
        let args = json!({"path": file.to_string_lossy()});
        let content = handlers.handle_generate_unit_test(&args).await.unwrap();

        assert!(text_of(&content).contains("Class name: ApiClient"));
    }

    #[tokio::test]
    async fn test_resolves_relative_path_against_workspace_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("lib/api")).unwrap();
        std::fs::write(dir.path().join("lib/api/api_client.dart"), SOURCE).unwrap();

        let handlers = handlers(dir.path());
        let args = json!({"path": "lib/api/api_client.dart"});
        let content = handlers.handle_generate_unit_test(&args).await.unwrap();

        assert!(text_of(&content).contains("`api_client_test.dart`"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let handlers = handlers(dir.path());

        let err = handlers
            .handle_generate_unit_test(&json!({"path": "lib/missing_widget.dart"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::FileNotFound(ref p) if p == "lib/missing_widget.dart"));
        assert_eq!(err.to_string(), "File not found: lib/missing_widget.dart");
    }

    #[tokio::test]
    async fn test_missing_arguments() {
        let handlers = handlers(Path::new("/nonexistent"));

        for args in [json!({}), json!({"path": ""}), Value::Null] {
            let err = handlers.handle_generate_unit_test(&args).await.unwrap_err();
            assert!(matches!(err, ToolError::MissingArgument));
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/a/b/widget.dart"), "widget.dart");
        assert_eq!(file_name("widget.dart"), "widget.dart");
        assert_eq!(file_name(""), "");
    }
}
