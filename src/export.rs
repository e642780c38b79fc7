//! JSON serialisation of [`QueryStatement`] and the file export wrapper.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::debug;

use crate::ast::QueryStatement;
use crate::diagnostics::MdxError;

const INDENT: &[u8] = b"    ";

pub fn to_json_value(statement: &QueryStatement) -> Result<Value, MdxError> {
    serde_json::to_value(statement)
        .map_err(|e| MdxError::io(format!("failed to serialize statement: {e}"), e.into()))
}

/// Pretty JSON with a four-space indent.
pub fn to_json_string(statement: &QueryStatement) -> Result<String, MdxError> {
    to_pretty_string(statement)
}

/// Any serialisable value in the export layout.
pub fn to_pretty_string<T: Serialize + ?Sized>(value: &T) -> Result<String, MdxError> {
    let mut buffer = Vec::new();
    write_pretty(value, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| {
        MdxError::io(
            "serializer produced invalid UTF-8",
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })
}

/// Write `statement` to `path` as pretty JSON. The statement is only read.
pub fn export_to_file(path: &Path, statement: &QueryStatement) -> Result<(), MdxError> {
    let file = File::create(path)
        .map_err(|e| MdxError::io(format!("failed to create '{}'", path.display()), e))?;
    let mut writer = BufWriter::new(file);
    write_pretty(statement, &mut writer)?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| MdxError::io(format!("failed to write '{}'", path.display()), e))?;
    debug!(path = %path.display(), "exported statement");
    Ok(())
}

fn write_pretty<T: Serialize + ?Sized, W: Write>(value: &T, writer: W) -> Result<(), MdxError> {
    let mut serializer =
        serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
    value
        .serialize(&mut serializer)
        .map_err(|e| MdxError::io(format!("failed to serialize value: {e}"), e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Axis, AxisStatement, Member, WhereStatement};

    fn statement() -> QueryStatement {
        QueryStatement {
            cube: "Cube".into(),
            rows: AxisStatement::empty(Axis::Rows),
            columns: AxisStatement::empty(Axis::Columns),
            where_clause: WhereStatement {
                members: vec![Member::new("X", "X", "1")],
            },
        }
    }

    #[test]
    fn uses_four_space_indent() {
        let json = to_json_string(&statement()).unwrap();
        assert!(json.contains("\n    \"cube\": \"Cube\""));
    }

    #[test]
    fn where_field_is_named_where() {
        let value = to_json_value(&statement()).unwrap();
        assert_eq!(value["where"]["members"][0]["element"], "1");
        assert_eq!(value["rows"]["axis"], "rows");
    }

    #[test]
    fn export_round_trips_through_file() {
        let path = std::env::temp_dir().join(format!("mdxalchemy-export-{}.json", std::process::id()));
        let original = statement();
        export_to_file(&path, &original).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let back: QueryStatement = serde_json::from_str(&text).unwrap();
        assert_eq!(back, original);
    }
}
