//! Closed, case-insensitive string enumerations.
//!
//! Every enumeration in the configuration model is a fixed set of tags that
//! arrive as strings on the wire. Input is matched against the canonical
//! spellings ignoring ASCII case; anything else is rejected with
//! `PipelineConfigError::UnknownEnumValue`. Output always uses the canonical
//! spelling.

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($type_name:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $text:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical wire spelling.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::errors::PipelineConfigError;

            fn from_str(value: &str) -> ::std::result::Result<Self, Self::Err> {
                let candidate = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|known| known.as_str().eq_ignore_ascii_case(candidate))
                    .ok_or_else(|| $crate::errors::PipelineConfigError::UnknownEnumValue {
                        type_name: $type_name.to_string(),
                        value: value.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|known| known.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.parse()
                    .map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }

        impl ::schemars::JsonSchema for $name {
            fn schema_name() -> ::std::borrow::Cow<'static, str> {
                stringify!($name).into()
            }

            fn json_schema(_generator: &mut ::schemars::SchemaGenerator) -> ::schemars::Schema {
                let values: Vec<&'static str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                ::schemars::json_schema!({
                    "type": "string",
                    "enum": values
                })
            }
        }
    };
}

/// Deserialize an optional enumeration tag, treating a blank string like a
/// missing value.
pub(crate) fn optional_tag<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(<D::Error as serde::de::Error>::custom),
    }
}

/// Patch flavour of [`optional_tag`]: a present key becomes `Some(..)`, so a
/// blank or `null` tag clears the target.
pub(crate) fn patch_tag<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    D: serde::Deserializer<'de>,
{
    optional_tag(deserializer).map(Some)
}
