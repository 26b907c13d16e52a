//! Custom serde helpers for backend wire formats.

/// Decimal amounts and rates.
///
/// The backend returns SQL `decimal` columns as strings (`"60.50"`) on some
/// endpoints and as JSON numbers on others. Both are accepted. Outbound values
/// are written as JSON numbers, which is what the request validators expect.
///
/// Outbound numbers go through `f64`, so only about 15 significant digits
/// survive. Amounts and rates on this market are far inside that; a value
/// with more digits is rounded to the nearest `f64` on the way out.
pub mod decimal {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;
    use std::str::FromStr;

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Every `Decimal` is within `f64` range; only precision is lost.
        match value.to_f64() {
            Some(f) => serializer.serialize_f64(f),
            None => serializer.serialize_str(&value.to_string()),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LenientDecimal)
    }

    struct LenientDecimal;

    fn parse(s: &str) -> Result<Decimal, rust_decimal::Error> {
        let s = s.trim();
        Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s))
    }

    impl<'de> Visitor<'de> for LenientDecimal {
        type Value = Decimal;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a decimal number or numeric string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
            parse(v).map_err(|e| E::custom(format!("Invalid decimal {:?}: {}", v, e)))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
            if !v.is_finite() {
                return Err(E::custom(format!("Invalid decimal: {}", v)));
            }
            parse(&v.to_string()).map_err(|e| E::custom(format!("Invalid decimal {}: {}", v, e)))
        }
    }
}

/// Same as [`decimal`], for optional fields. `null` and a missing field both
/// decode to `None` (pair with `#[serde(default)]`).
pub mod decimal_opt {
    use rust_decimal::Decimal;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => super::decimal::serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(OptionalDecimal)
    }

    struct OptionalDecimal;

    impl<'de> Visitor<'de> for OptionalDecimal {
        type Value = Option<Decimal>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an optional decimal")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            super::decimal::deserialize(deserializer).map(Some)
        }
    }
}
