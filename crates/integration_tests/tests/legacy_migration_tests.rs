//! Legacy (v1) document migration scenarios.

use anyhow::Result;
use integration_tests::fixtures::{self, documents, legacy};
use integration_tests::init_test_logging;
use pipeline_config::{validate_config, ConfigVersion, PipelineConfig, SinkColumnType};
use serde_json::json;

/// Verify that an unversioned v1 document is recognized and migrated.
#[test]
fn test_unversioned_legacy_document_migrates() -> Result<()> {
    init_test_logging();

    let config = PipelineConfig::from_value(legacy::unversioned_join())?;

    assert_eq!(config.version(), ConfigVersion::V2);
    assert_eq!(config.schema().fields.len(), 5);
    assert_eq!(config.schema().source_ids(), vec!["clicks", "users"]);

    let plan = config
        .schema()
        .field("plan", Some("users"))
        .expect("plan is declared on users");
    assert_eq!(plan.column_type, Some(SinkColumnType::LowCardinalityString));

    let user_id = config
        .schema()
        .field("user_id", Some("clicks"))
        .expect("user_id is declared on clicks");
    assert!(!user_id.is_mapped());

    let clicks = &config.source().topics[0];
    assert!(clicks.deduplication.id_field.is_none());
    assert!(config.source().connection_params.mechanism.is_none());

    Ok(())
}

/// Verify that restating a current configuration in v1 and migrating it back
/// is lossless.
#[test]
fn test_v2_restated_as_v1_round_trips() -> Result<()> {
    for document in [documents::single_topic(), documents::joined_topics()] {
        let config = fixtures::parse(document);

        let restated = serde_json::to_value(config.to_legacy())?;
        assert_eq!(restated["version"], json!("v1"));
        assert!(restated.get("schema").is_none());

        assert_eq!(PipelineConfig::from_value(restated)?, config);
    }
    Ok(())
}

/// Verify that migrating twice gives the same result as migrating once.
#[test]
fn test_migration_is_idempotent() -> Result<()> {
    let once = PipelineConfig::from_value(legacy::unversioned_join())?;
    let twice = PipelineConfig::from_value(serde_json::to_value(once.to_legacy())?)?;

    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn test_legacy_join_key_checked_after_migration() {
    let mut document = legacy::unversioned_join();
    document["join"]["sources"][1]["join_key"] = json!("plan_id");

    let err = validate_config(&document).unwrap_err();
    assert!(err
        .to_string()
        .contains("Join key 'plan_id' does not exist in source 'users' schema"));
}

#[test]
fn test_explicit_v2_version_is_not_migrated() {
    let mut document = legacy::unversioned_join();
    document["version"] = json!("v2");

    // A v2 document must carry a top-level schema.
    assert!(PipelineConfig::from_value(document).is_err());
}
