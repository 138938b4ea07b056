//! End-to-end tests: pipeline file, audit file, JSON-lines stream

use fieldguard_audit::{build_composite_sink, AuditConfig, DatabaseSink, MessageTemplate};
use fieldguard_cli::{apply_stream, PipelineFile};
use fieldguard_policy::ActionRegistry;
use std::sync::Arc;

#[test]
fn test_pipeline_file_with_database_audit() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline_path = dir.path().join("pipeline.yaml");
    let db_path = dir.path().join("audit.db");

    std::fs::write(
        &pipeline_path,
        r##"
steps:
  - action: mask
    audit: true
    config: { field: name, strategy: partial, prefix: 2, suffix: 2 }
  - action: mask
    config: { field: phone, strategy: char_class, classes: [digit], mask_char: "#" }
"##,
    )
    .unwrap();

    let audit = AuditConfig::from_yaml_str(&format!(
        "channels: [database]\ndatabase:\n  path: {}\n",
        db_path.display()
    ))
    .unwrap();

    let file = PipelineFile::from_file(&pipeline_path).unwrap();
    let pipeline = file
        .build(&ActionRegistry::with_builtins(), Arc::new(build_composite_sink(&audit)))
        .unwrap();

    let input = "{\"name\":\"maskingUser\",\"phone\":\"010-1234\"}\n{\"phone\":null}\n";
    let mut output = Vec::new();
    let count = apply_stream(&pipeline, input.as_bytes(), &mut output).unwrap();
    drop(pipeline);

    assert_eq!(count, 2);
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "{\"name\":\"ma*******er\",\"phone\":\"###-####\"}\n{\"phone\":null}\n"
    );

    // One audited step per record, including the record without the field
    let reader = DatabaseSink::open(&db_path, MessageTemplate::default()).unwrap();
    let rows = reader.recent(10).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].message, "field=name, before=null, after=null");
    assert_eq!(rows[1].after.as_deref(), Some("ma*******er"));
}
