//! The pipeline entry point.
//!
//! A [`GrammarEngine`] is built once by the caller and passed by reference.
//! It holds only immutable configuration, so one engine can serve any number
//! of concurrent `parse`/`analyze`/`transform` calls; every call returns fresh
//! values.

use std::path::Path;

use miette::Report;
use tracing::debug;

use crate::algebra::{self, StatementBuilder};
use crate::analysis;
use crate::ast::QueryStatement;
use crate::config::AnalyzerConfig;
use crate::diagnostics::MdxError;
use crate::syntax::{self, Cst};

#[derive(Debug, Clone, Default)]
pub struct GrammarEngine {
    config: AnalyzerConfig,
}

impl GrammarEngine {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    // ========================================================================
    // PIPELINE
    // ========================================================================

    /// Parse query text into a CST, labelled with the configured source name.
    pub fn parse(&self, text: &str) -> Result<Cst, MdxError> {
        syntax::parse(text, &self.config.source_name)
    }

    /// Parse text labelled with `name` in diagnostics (usually a file path).
    pub fn parse_named(&self, text: &str, name: &str) -> Result<Cst, MdxError> {
        syntax::parse(text, name)
    }

    /// Text → [`QueryStatement`].
    pub fn analyze(&self, text: &str) -> Result<QueryStatement, MdxError> {
        let cst = self.parse(text)?;
        self.analyze_cst(&cst)
    }

    pub fn analyze_cst(&self, cst: &Cst) -> Result<QueryStatement, MdxError> {
        analysis::analyze_statement(cst, &self.config)
    }

    /// Text → [`StatementBuilder`].
    pub fn transform(&self, text: &str) -> Result<StatementBuilder, MdxError> {
        let cst = self.parse(text)?;
        self.transform_cst(&cst)
    }

    pub fn transform_cst(&self, cst: &Cst) -> Result<StatementBuilder, MdxError> {
        algebra::transform(cst, &self.config)
    }

    // ========================================================================
    // FILE BOUNDARY
    // ========================================================================

    /// Reads a query file and parses it under its path name.
    pub fn parse_file(&self, path: &Path) -> Result<Cst, MdxError> {
        let text = read_file(path)?;
        debug!(path = %path.display(), bytes = text.len(), "read query file");
        self.parse_named(&text, &path.display().to_string())
    }
}

/// Reads a file with standardized error handling.
pub fn read_file(path: &Path) -> Result<String, MdxError> {
    std::fs::read_to_string(path)
        .map_err(|e| MdxError::io(format!("failed to read '{}'", path.display()), e))
}

/// Prints an error with full miette diagnostics.
pub fn print_error(error: MdxError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaLevel;
    use crate::diagnostics::ErrorType;
    use tracing_test::traced_test;

    const QUERY: &str = "SELECT NON EMPTY {[A].[A].Members} ON COLUMNS FROM [Cube]";

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_is_shareable() {
        assert_send_sync::<GrammarEngine>();
    }

    #[test]
    fn analyze_and_transform_share_the_parse() {
        let engine = GrammarEngine::default();
        let cst = engine.parse(QUERY).unwrap();
        let statement = engine.analyze_cst(&cst).unwrap();
        let builder = engine.transform_cst(&cst).unwrap();
        assert_eq!(statement.cube, builder.cube);
        assert!(statement.columns.non_empty);
    }

    #[test]
    fn configured_schema_applies() {
        let engine = GrammarEngine::new(AnalyzerConfig::default().with_schema(SchemaLevel::Minimal));
        let err = engine
            .analyze("SELECT {([A].[B])} ON 0 FROM [Cube]")
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::UnknownSetExpression);
    }

    #[test]
    #[traced_test]
    fn pipeline_logs_each_stage() {
        let engine = GrammarEngine::default();
        engine.analyze(QUERY).unwrap();
        engine.transform(QUERY).unwrap();
        assert!(logs_contain("parsed MDX statement"));
        assert!(logs_contain("analyzed statement"));
        assert!(logs_contain("transformed statement"));
    }

    #[test]
    fn missing_file_is_io() {
        let err = GrammarEngine::default()
            .parse_file(Path::new("no/such/query.mdx"))
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Io);
    }
}
