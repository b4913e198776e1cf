//! Serde helpers for ranked count lists.
//!
//! Top-N rankings are kept as vectors so their order survives into the
//! serialized report (JSON objects emit in insertion order under
//! serde_json's default map), while consumers still see a plain
//! `name -> count` object.

use serde::de::Visitor;
use serde::ser::SerializeMap;
use serde::{Deserializer, Serializer};
use std::fmt;

pub fn serialize_counts_as_map<S>(
    counts: &[(String, u64)],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(counts.len()))?;
    for (key, count) in counts {
        map.serialize_entry(key, count)?;
    }
    map.end()
}

pub fn deserialize_counts_from_map<'de, D>(deserializer: D) -> Result<Vec<(String, u64)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct MapVisitor;

    impl<'de> Visitor<'de> for MapVisitor {
        type Value = Vec<(String, u64)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a JSON object of counts")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut counts = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, count)) = map.next_entry::<String, u64>()? {
                counts.push((key, count));
            }
            Ok(counts)
        }
    }

    deserializer.deserialize_map(MapVisitor)
}
