use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a column's values. Serialized with the tag names the
/// reporting host expects (`YEAR_MONTH_DAY_HOUR`, `COUNTRY_CODE`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemanticType {
    Number,
    Percent,
    Text,
    Boolean,
    Url,
    Image,
    Imagelink,
    Year,
    YearQuarter,
    YearMonth,
    YearWeek,
    YearMonthDay,
    YearMonthDayHour,
    YearMonthDaySecond,
    Quarter,
    Month,
    Week,
    MonthDay,
    DayOfWeek,
    Day,
    Hour,
    Minute,
    Duration,
    Country,
    CountryCode,
    Continent,
    ContinentCode,
    SubContinent,
    SubContinentCode,
    Region,
    RegionCode,
    City,
    CityCode,
    Metro,
    MetroCode,
    LatitudeLongitude,
}

impl SemanticType {
    /// Maps a declared type tag. `HYPERLINK` is an alias of `URL`; anything
    /// unrecognised is `TEXT`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "NUMBER" => Self::Number,
            "PERCENT" => Self::Percent,
            "TEXT" => Self::Text,
            "BOOLEAN" => Self::Boolean,
            "URL" | "HYPERLINK" => Self::Url,
            "IMAGE" => Self::Image,
            "IMAGELINK" => Self::Imagelink,
            "YEAR" => Self::Year,
            "YEAR_QUARTER" => Self::YearQuarter,
            "YEAR_MONTH" => Self::YearMonth,
            "YEAR_WEEK" => Self::YearWeek,
            "YEAR_MONTH_DAY" => Self::YearMonthDay,
            "YEAR_MONTH_DAY_HOUR" => Self::YearMonthDayHour,
            "YEAR_MONTH_DAY_SECOND" => Self::YearMonthDaySecond,
            "QUARTER" => Self::Quarter,
            "MONTH" => Self::Month,
            "WEEK" => Self::Week,
            "MONTH_DAY" => Self::MonthDay,
            "DAY_OF_WEEK" => Self::DayOfWeek,
            "DAY" => Self::Day,
            "HOUR" => Self::Hour,
            "MINUTE" => Self::Minute,
            "DURATION" => Self::Duration,
            "COUNTRY" => Self::Country,
            "COUNTRY_CODE" => Self::CountryCode,
            "CONTINENT" => Self::Continent,
            "CONTINENT_CODE" => Self::ContinentCode,
            "SUB_CONTINENT" => Self::SubContinent,
            "SUB_CONTINENT_CODE" => Self::SubContinentCode,
            "REGION" => Self::Region,
            "REGION_CODE" => Self::RegionCode,
            "CITY" => Self::City,
            "CITY_CODE" => Self::CityCode,
            "METRO" => Self::Metro,
            "METRO_CODE" => Self::MetroCode,
            "LATITUDE_LONGITUDE" => Self::LatitudeLongitude,
            _ => Self::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "NUMBER",
            Self::Percent => "PERCENT",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::Url => "URL",
            Self::Image => "IMAGE",
            Self::Imagelink => "IMAGELINK",
            Self::Year => "YEAR",
            Self::YearQuarter => "YEAR_QUARTER",
            Self::YearMonth => "YEAR_MONTH",
            Self::YearWeek => "YEAR_WEEK",
            Self::YearMonthDay => "YEAR_MONTH_DAY",
            Self::YearMonthDayHour => "YEAR_MONTH_DAY_HOUR",
            Self::YearMonthDaySecond => "YEAR_MONTH_DAY_SECOND",
            Self::Quarter => "QUARTER",
            Self::Month => "MONTH",
            Self::Week => "WEEK",
            Self::MonthDay => "MONTH_DAY",
            Self::DayOfWeek => "DAY_OF_WEEK",
            Self::Day => "DAY",
            Self::Hour => "HOUR",
            Self::Minute => "MINUTE",
            Self::Duration => "DURATION",
            Self::Country => "COUNTRY",
            Self::CountryCode => "COUNTRY_CODE",
            Self::Continent => "CONTINENT",
            Self::ContinentCode => "CONTINENT_CODE",
            Self::SubContinent => "SUB_CONTINENT",
            Self::SubContinentCode => "SUB_CONTINENT_CODE",
            Self::Region => "REGION",
            Self::RegionCode => "REGION_CODE",
            Self::City => "CITY",
            Self::CityCode => "CITY_CODE",
            Self::Metro => "METRO",
            Self::MetroCode => "METRO_CODE",
            Self::LatitudeLongitude => "LATITUDE_LONGITUDE",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    CountDistinct,
    Max,
    Min,
    Auto,
}

impl Aggregation {
    /// Resolves the aggregation of a metric. `NONE`, a missing declaration
    /// and unknown tags all fall back to `SUM`.
    pub fn from_declared(declared: Option<&str>) -> Self {
        let Some(tag) = declared else {
            return Self::Sum;
        };
        match tag.trim().to_ascii_uppercase().as_str() {
            "AVG" | "AVERAGE" => Self::Avg,
            "COUNT" => Self::Count,
            "COUNT_DISTINCT" => Self::CountDistinct,
            "MAX" => Self::Max,
            "MIN" => Self::Min,
            "AUTO" => Self::Auto,
            _ => Self::Sum,
        }
    }
}

/// One output column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub semantic_type: SemanticType,
    pub aggregation: Option<Aggregation>,
    pub is_metric: bool,
}

impl FieldDescriptor {
    /// Numbers become metrics with an aggregation; everything else is a
    /// dimension without one.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        semantic_type: SemanticType,
        declared_aggregation: Option<&str>,
    ) -> Self {
        let is_metric = semantic_type == SemanticType::Number;
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            semantic_type,
            aggregation: is_metric.then(|| Aggregation::from_declared(declared_aggregation)),
            is_metric,
        }
    }
}

/// Declared metadata for one field of an annotated record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnotatedFieldSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub aggregation: Option<String>,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaMode {
    #[default]
    Heuristic,
    Annotated,
}

impl SchemaMode {
    pub fn from_annotated_flag(annotated: bool) -> Self {
        if annotated {
            Self::Annotated
        } else {
            Self::Heuristic
        }
    }
}

impl fmt::Display for SchemaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heuristic => f.write_str("heuristic"),
            Self::Annotated => f.write_str("annotated"),
        }
    }
}

/// Ordered field set tagged with the mode it was derived under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub mode: SchemaMode,
    pub fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn new(mode: SchemaMode) -> Self {
        Self {
            mode,
            fields: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.id.as_str()).collect()
    }

    /// Inserts a field. A field with an id already present replaces the
    /// earlier one at its original position.
    pub fn insert(&mut self, field: FieldDescriptor) {
        if let Some(existing) = self.fields.iter_mut().find(|f| f.id == field.id) {
            tracing::warn!(
                "Field id '{}' produced twice; '{}' replaces '{}'",
                field.id,
                field.name,
                existing.name
            );
            *existing = field;
        } else {
            self.fields.push(field);
        }
    }
}

/// A projected cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl RowValue {
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Cell text as written to delimited output.
    pub fn to_cell(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for RowValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for RowValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for RowValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<RowValue>,
}

/// Rows aligned to the requested fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projection {
    pub fields: Vec<FieldDescriptor>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub schema: Schema,
    pub projection: Projection,
    pub csv_output: String,
}
