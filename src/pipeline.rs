//! Response pipeline
//!
//! Runs one ISS payload through schema extraction, row building, the
//! endpoint's shape transform and rendering:
//!
//! ```text
//! Received → SchemaParsed → RowsBuilt → (ShapeTransformed | unchanged) → Rendered
//! ```
//!
//! Every call is independent. Modes arrive through [`PipelineConfig`] and
//! nothing is shared between calls.

use crate::decode::XmlDocument;
use crate::error::Result;
use crate::output::{render, Rendered};
use crate::schema::read_schema;
use crate::table::{build_table, TypedTable};
use crate::transform::apply_transform;
use crate::types::{OutputMode, TransformMode};
use tracing::debug;

/// Stage reached by a pipeline call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    SchemaParsed,
    RowsBuilt,
    ShapeTransformed,
    Rendered,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::SchemaParsed => "schema_parsed",
            PipelineStage::RowsBuilt => "rows_built",
            PipelineStage::ShapeTransformed => "shape_transformed",
            PipelineStage::Rendered => "rendered",
        };
        f.write_str(name)
    }
}

/// Per-call pipeline settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Reshape applied after rows are built
    pub transform: TransformMode,
    /// Representation of the result
    pub output: OutputMode,
    /// Data block to decode; the first block when unset
    pub block: Option<String>,
}

impl PipelineConfig {
    /// Create a config for the given modes
    pub fn new(transform: TransformMode, output: OutputMode) -> Self {
        Self {
            transform,
            output,
            block: None,
        }
    }

    /// Decode the data block with the given id
    #[must_use]
    pub fn with_block(mut self, id: impl Into<String>) -> Self {
        self.block = Some(id.into());
        self
    }
}

/// Decode a payload into a typed table without transforming it
pub fn decode_table(payload: &str, block: Option<&str>) -> Result<TypedTable> {
    debug!(stage = %PipelineStage::Received, bytes = payload.len(), "decoding payload");
    let document = XmlDocument::parse(payload)?;
    let block = document.block(block)?;

    let schema = read_schema(block)?;
    debug!(stage = %PipelineStage::SchemaParsed, columns = schema.len(), "read schema");

    let table = build_table(schema, block)?;
    debug!(stage = %PipelineStage::RowsBuilt, rows = table.num_rows(), "built table");
    Ok(table)
}

/// Run a payload through the whole pipeline
pub fn process(payload: &str, config: &PipelineConfig) -> Result<Rendered> {
    let table = decode_table(payload, config.block.as_deref())?;

    let table = match config.transform {
        TransformMode::Default => table,
        mode => {
            let table = apply_transform(table, mode)?;
            debug!(
                stage = %PipelineStage::ShapeTransformed,
                columns = table.num_columns(),
                "transformed table"
            );
            table
        }
    };

    let rendered = render(table, config.output)?;
    debug!(stage = %PipelineStage::Rendered, output = %config.output, "rendered table");
    Ok(rendered)
}

/// Run a payload through the pipeline with explicit modes
pub fn transform_result(
    payload: &str,
    transform: TransformMode,
    output: OutputMode,
) -> Result<Rendered> {
    process(payload, &PipelineConfig::new(transform, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Cell;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    const SCENARIO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<document>
<data id="securities">
  <metadata>
    <columns>
      <column name="ID" type="int64"/>
      <column name="NAME" type="string"/>
    </columns>
  </metadata>
  <rows>
    <row ID="1" NAME="Sber"/>
    <row ID="2" NAME=""/>
  </rows>
</data>
</document>"#;

    const DESCRIPTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<document>
<data id="description">
  <metadata>
    <columns>
      <column name="name" type="string"/>
      <column name="title" type="string"/>
      <column name="value" type="string"/>
      <column name="type" type="string"/>
      <column name="sort_order" type="int32"/>
      <column name="is_hidden" type="int32"/>
      <column name="precision" type="int32"/>
    </columns>
  </metadata>
  <rows>
    <row name="SECID" title="Код ценной бумаги" value="SBER" type="string" sort_order="1" is_hidden="0" precision=""/>
    <row name="NAME" title="Полное наименование" value="Сбербанк России ПАО ао" type="string" sort_order="3" is_hidden="0" precision=""/>
    <row name="ISIN" title="ISIN код" value="RU0009029540" type="string" sort_order="5" is_hidden="0" precision=""/>
  </rows>
</data>
<data id="boards">
  <metadata>
    <columns>
      <column name="secid" type="string"/>
      <column name="boardid" type="string"/>
    </columns>
  </metadata>
  <rows>
    <row secid="SBER" boardid="TQBR"/>
  </rows>
</data>
</document>"#;

    #[test]
    fn test_scenario_record_json() {
        let rendered =
            transform_result(SCENARIO, TransformMode::Default, OutputMode::RecordJson).unwrap();
        assert_eq!(
            rendered.as_json(),
            Some(r#"[{"id":1,"name":"Sber"},{"id":2,"name":""}]"#)
        );
    }

    #[test]
    fn test_default_mode_keeps_row_count() {
        let rendered =
            transform_result(SCENARIO, TransformMode::Default, OutputMode::Tabular).unwrap();
        let table = rendered.into_table().unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column_names(), vec!["id", "name"]);
    }

    #[test]
    fn test_entity_pivot_description() {
        let rendered =
            transform_result(DESCRIPTION, TransformMode::EntityPivot, OutputMode::Tabular)
                .unwrap();
        let table = rendered.into_table().unwrap();

        assert_eq!(table.column_names(), vec!["secid", "name", "isin"]);
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.value(0, "isin"), Some(&Cell::Text("RU0009029540".into())));
    }

    #[test]
    fn test_entity_pivot_record_json() {
        let rendered = transform_result(
            DESCRIPTION,
            TransformMode::EntityPivot,
            OutputMode::RecordJson,
        )
        .unwrap();
        assert_eq!(
            rendered.as_json(),
            Some(
                r#"[{"secid":"SBER","name":"Сбербанк России ПАО ао","isin":"RU0009029540"}]"#
            )
        );
    }

    #[test]
    fn test_selected_block() {
        let config = PipelineConfig::new(TransformMode::Default, OutputMode::RecordJson)
            .with_block("boards");
        let rendered = process(DESCRIPTION, &config).unwrap();
        assert_eq!(
            rendered.as_json(),
            Some(r#"[{"secid":"SBER","boardid":"TQBR"}]"#)
        );
    }

    #[test]
    fn test_pivot_on_wrong_shape() {
        let err = transform_result(SCENARIO, TransformMode::EntityPivot, OutputMode::Tabular)
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_unknown_type_before_rows() {
        // The row section is broken too; the type error must win
        let payload = r#"<document><data><metadata><columns>
            <column name="ID" type="int64"/>
            <column name="DATA" type="blob"/>
        </columns></metadata></data></document>"#;

        let err = transform_result(payload, TransformMode::Default, OutputMode::RecordJson)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownDeclaredType { .. }), "got {err}");
    }

    #[test]
    fn test_malformed_payload() {
        let err = transform_result(
            "<html>502 Bad Gateway</html>",
            TransformMode::Default,
            OutputMode::RecordJson,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { .. }));
    }

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.transform, TransformMode::Default);
        assert_eq!(config.output, OutputMode::RecordJson);
        assert!(config.block.is_none());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(PipelineStage::SchemaParsed.to_string(), "schema_parsed");
        assert_eq!(PipelineStage::Rendered.to_string(), "rendered");
    }
}
