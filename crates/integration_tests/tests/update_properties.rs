//! Property tests for the update engine and the wire format.

use integration_tests::fixtures::{self, documents};
use pipeline_config::{
    is_compatible, Patchable, PipelineConfig, PipelineConfigPatch, SinkColumnType,
    SinkConfigPatch, SourceFieldType,
};
use proptest::prelude::*;

fn base_configs() -> impl Strategy<Value = PipelineConfig> {
    prop_oneof![
        Just(fixtures::parse(documents::single_topic())),
        Just(fixtures::parse(documents::joined_topics())),
    ]
}

fn sink_patches() -> impl Strategy<Value = SinkConfigPatch> {
    (
        proptest::option::of("[a-z][a-z0-9-]{0,20}"),
        proptest::option::of(1u16..),
        proptest::option::of(1u32..100_000),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(host, port, max_batch_size, secure)| SinkConfigPatch {
            host,
            port,
            max_batch_size,
            secure,
            ..Default::default()
        })
}

fn source_field_types() -> impl Strategy<Value = SourceFieldType> {
    proptest::sample::select(SourceFieldType::ALL)
}

fn sink_column_types() -> impl Strategy<Value = SinkColumnType> {
    proptest::sample::select(SinkColumnType::ALL)
}

proptest! {
    /// An empty patch yields an equal configuration.
    #[test]
    fn empty_patch_is_identity(config in base_configs()) {
        let updated = config.update(&PipelineConfigPatch::default()).unwrap();
        prop_assert_eq!(updated, config);
    }

    /// A sink-only patch changes nothing outside the sink, and never the receiver.
    #[test]
    fn sink_patch_touches_only_sink(config in base_configs(), sink in sink_patches()) {
        let before = config.clone();
        let patch = PipelineConfigPatch { sink: Some(sink.clone()), ..Default::default() };

        let updated = config.update(&patch).unwrap();

        prop_assert_eq!(&config, &before);
        prop_assert_eq!(updated.name(), config.name());
        prop_assert_eq!(updated.source(), config.source());
        prop_assert_eq!(updated.join(), config.join());
        prop_assert_eq!(updated.filter(), config.filter());
        prop_assert_eq!(updated.metadata(), config.metadata());
        prop_assert_eq!(updated.resources(), config.resources());
        prop_assert_eq!(updated.schema(), config.schema());
        if let Some(host) = &sink.host {
            prop_assert_eq!(&updated.sink().host, host);
        } else {
            prop_assert_eq!(&updated.sink().host, &config.sink().host);
        }
    }

    /// Serializing and re-reading a configuration is lossless.
    #[test]
    fn wire_round_trip(config in base_configs(), sink in sink_patches()) {
        let patch = PipelineConfigPatch { sink: Some(sink), ..Default::default() };
        let config = config.update(&patch).unwrap();

        let value = config.to_value().unwrap();
        prop_assert_eq!(PipelineConfig::from_value(value).unwrap(), config.clone());

        let yaml = config.to_yaml_string().unwrap();
        prop_assert_eq!(PipelineConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    /// Enumerations parse regardless of case.
    #[test]
    fn enum_parsing_ignores_case(
        source in source_field_types(),
        column in sink_column_types(),
        upper in any::<bool>(),
    ) {
        let recase = |text: &str| {
            if upper {
                text.to_ascii_uppercase()
            } else {
                text.to_ascii_lowercase()
            }
        };
        prop_assert_eq!(recase(source.as_str()).parse::<SourceFieldType>().unwrap(), source);
        prop_assert_eq!(recase(column.as_str()).parse::<SinkColumnType>().unwrap(), column);
    }
}

/// Expected compatibility, written out in wire spellings.
const EXPECTED_COMPATIBILITY: &[(&str, &[&str])] = &[
    (
        "string",
        &[
            "String",
            "FixedString",
            "DateTime",
            "DateTime64",
            "UUID",
            "Enum8",
            "Enum16",
            "LowCardinality(String)",
            "LowCardinality(FixedString)",
            "LowCardinality(DateTime)",
        ],
    ),
    ("bool", &["Bool"]),
    ("bytes", &["String", "FixedString"]),
    ("int", &["Int8", "Int16", "Int32", "Int64"]),
    ("int8", &["Int8"]),
    ("int16", &["Int16"]),
    ("int32", &["Int32", "LowCardinality(Int32)"]),
    ("int64", &["Int64", "LowCardinality(Int64)", "DateTime", "DateTime64"]),
    ("uint", &["UInt8", "UInt16", "UInt32", "UInt64"]),
    ("uint8", &["UInt8"]),
    ("uint16", &["UInt16"]),
    ("uint32", &["UInt32", "LowCardinality(UInt32)"]),
    ("uint64", &["UInt64", "LowCardinality(UInt64)"]),
    ("float", &["Float32", "Float64"]),
    ("float32", &["Float32"]),
    ("float64", &["Float64", "DateTime64"]),
    (
        "array",
        &[
            "String",
            "Array(String)",
            "Array(Bool)",
            "Array(Int8)",
            "Array(Int16)",
            "Array(Int32)",
            "Array(Int64)",
            "Array(UInt8)",
            "Array(UInt16)",
            "Array(UInt32)",
            "Array(UInt64)",
            "Array(Float32)",
            "Array(Float64)",
        ],
    ),
];

/// Every (source, column) pair answers as the expected table says.
#[test]
fn compatibility_matches_expected_table() {
    assert_eq!(EXPECTED_COMPATIBILITY.len(), SourceFieldType::ALL.len());

    let mut compatible_pairs = 0;
    for (source, columns) in EXPECTED_COMPATIBILITY {
        let source: SourceFieldType = source.parse().unwrap();
        let expected: Vec<SinkColumnType> = columns.iter().map(|c| c.parse().unwrap()).collect();

        for column in SinkColumnType::ALL {
            assert_eq!(
                is_compatible(source, *column),
                expected.contains(column),
                "{} -> {}",
                source,
                column
            );
        }
        compatible_pairs += expected.len();
    }

    assert_eq!(compatible_pairs, 53);
}

#[test]
fn compatibility_is_directional() {
    assert!(is_compatible(SourceFieldType::String, SinkColumnType::DateTime));
    assert!(!is_compatible(SourceFieldType::Bool, SinkColumnType::String));
    assert!(is_compatible(SourceFieldType::Bool, SinkColumnType::Bool));
    assert!(is_compatible(SourceFieldType::Array, SinkColumnType::ArrayInt64));
}
