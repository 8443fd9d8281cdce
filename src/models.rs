use serde::{Deserialize, Serialize};

/// Inclusive year range used in API queries (`date=FROM:TO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    /// Build a range from two bounds in any order.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn single(year: i32) -> Self {
        Self {
            start: year,
            end: year,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    pub fn to_query_param(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }
}

/// Metadata section returned by the API (position 0).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, deserialize_with = "de_u32_from_string_or_number")]
    pub page: u32,
    #[serde(default, deserialize_with = "de_u32_from_string_or_number")]
    pub pages: u32,
    /// Some responses encode `per_page` as a string, others as a number.
    /// Accept both and normalize to `u32`.
    #[serde(default, deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    #[serde(default, deserialize_with = "de_u32_from_string_or_number")]
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as u32)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("negative value for u32"));
            }
            Ok(v as u32)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

/// Serde helper: accept a number, a numeric string or null as `Option<f64>`.
/// Strings that do not parse become `None` instead of failing the record.
fn de_opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Serde helper: accept a string or a number as `Option<String>`.
fn de_opt_string_lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// `{id, value}` pair nested in API records. Either half may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdValue {
    #[serde(default, deserialize_with = "de_opt_string_lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string_lenient")]
    pub value: Option<String>,
}

/// Raw observation record from the indicator endpoint (position 1 array).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub country: Option<IdValue>,
    #[serde(default, deserialize_with = "de_opt_string_lenient")]
    pub countryiso3code: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string_lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub value: Option<f64>,
}

/// Flat row used by this crate (one row = one country/year observation).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    /// `country.id` of the source record (ISO2 for countries, aggregate code otherwise).
    pub code: String,
    /// `countryiso3code`; empty for some aggregates.
    pub iso3: String,
    pub name: String,
    pub population: Option<f64>,
    /// Parsed from the date string; `0` when the date is missing or unparseable.
    pub year: i32,
}

impl From<RawObservation> for Observation {
    fn from(r: RawObservation) -> Self {
        let country = r.country.unwrap_or_default();
        let year = r
            .date
            .as_deref()
            .and_then(|d| d.trim().parse::<i32>().ok())
            .unwrap_or(0);
        Self {
            code: country.id.unwrap_or_default(),
            iso3: r.countryiso3code.unwrap_or_default(),
            name: country.value.unwrap_or_default(),
            population: r.value,
            year,
        }
    }
}

/// Raw record from the country metadata endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryRecord {
    #[serde(default, deserialize_with = "de_opt_string_lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string_lenient")]
    pub name: Option<String>,
    #[serde(default)]
    pub region: Option<IdValue>,
    #[serde(default, rename = "incomeLevel")]
    pub income_level: Option<IdValue>,
}

/// Country or region aggregate from the metadata endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Country {
    /// ISO3 id (e.g. `DEU`, or `WLD` for aggregates).
    pub id: String,
    pub name: String,
    pub region_id: Option<String>,
    pub income_level_id: Option<String>,
}

impl Country {
    /// Region aggregates carry income level `Aggregates` and region `NA`.
    pub fn is_aggregate(&self) -> bool {
        self.income_level_id.as_deref() == Some("Aggregates")
            || self.region_id.as_deref() == Some("NA")
    }
}

impl From<CountryRecord> for Country {
    fn from(r: CountryRecord) -> Self {
        Self {
            id: r.id.unwrap_or_default(),
            name: r.name.unwrap_or_default(),
            region_id: r.region.and_then(|x| x.id),
            income_level_id: r.income_level.and_then(|x| x.id),
        }
    }
}
