// Serde helpers for collections that travel as JSON objects but must keep
// their document order in memory.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// An entity that is stored under a natural key when serialized as a map.
pub trait Keyed {
    fn key(&self) -> String;
}

/// Writes the items as a JSON object keyed by `Keyed::key`, in slice order.
#[allow(clippy::ptr_arg)]
pub fn serialize<S, T>(items: &Vec<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Keyed + Serialize,
{
    let mut map = serializer.serialize_map(Some(items.len()))?;
    for item in items.iter() {
        map.serialize_entry(&item.key(), item)?;
    }
    map.end()
}

pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    ordered_values(deserializer)
}

/// Reads either an array or an object into a vector, keeping document order.
/// Object keys are dropped: every value carries its own natural key.
/// A null reads as an empty vector.
pub fn ordered_values<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct OrderedVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedVisitor<T> {
        type Value = Vec<T>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object or an array")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<T>, A::Error> {
            let mut res: Vec<T> = Vec::new();
            while let Some(x) = seq.next_element()? {
                res.push(x);
            }
            Ok(res)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Vec<T>, A::Error> {
            let mut res: Vec<T> = Vec::new();
            while let Some((_, x)) = map.next_entry::<de::IgnoredAny, T>()? {
                res.push(x);
            }
            Ok(res)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Vec<T>, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(OrderedVisitor(PhantomData))
}
