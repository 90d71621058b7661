//! Program metadata records
//!
//! Records are sparsely populated; every field is optional except the id.
//! Unknown fields are ignored.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramRecord {
    #[serde(rename = "programID")]
    pub program_id: String,
    #[serde(default)]
    pub titles: Vec<ProgramTitle>,
    #[serde(rename = "episodeTitle150", default)]
    pub episode_title: Option<String>,
    #[serde(default)]
    pub descriptions: Option<Descriptions>,
    #[serde(rename = "originalAirDate", default)]
    pub original_air_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub metadata: Vec<ProgramMetadata>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
    #[serde(rename = "contentRating", default)]
    pub content_rating: Vec<ContentRating>,
    /// Seconds
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub movie: Option<MovieInfo>,
    #[serde(rename = "videoProperties", default)]
    pub video_properties: Vec<String>,
    #[serde(rename = "audioProperties", default)]
    pub audio_properties: Vec<String>,
    #[serde(rename = "isPremiereOrFinale", default)]
    pub premiere_or_finale: Option<String>,
    #[serde(default)]
    pub new: Option<bool>,
    #[serde(rename = "officialURL", default)]
    pub official_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramTitle {
    #[serde(rename = "title120", default)]
    pub title120: Option<String>,
}

/// Description tiers, highest precision first when rendering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Descriptions {
    #[serde(rename = "description1000", default)]
    pub description1000: Vec<Description>,
    #[serde(rename = "description100", default)]
    pub description100: Vec<Description>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Description {
    #[serde(rename = "descriptionLanguage", default)]
    pub language: Option<String>,
    pub description: String,
}

/// One entry of the `metadata` array; only the Gracenote block is used
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramMetadata {
    #[serde(rename = "Gracenote", default)]
    pub gracenote: Option<GracenoteNumbering>,
}

/// 1-based season/episode/part numbering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GracenoteNumbering {
    #[serde(default)]
    pub season: Option<i64>,
    #[serde(default)]
    pub total_seasons: Option<i64>,
    #[serde(default)]
    pub episode: Option<i64>,
    #[serde(default)]
    pub total_episodes: Option<i64>,
    #[serde(default)]
    pub part: Option<i64>,
    #[serde(default)]
    pub total_parts: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CastMember {
    #[serde(default)]
    pub role: String,
    pub name: String,
    #[serde(rename = "characterName", default)]
    pub character_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrewMember {
    #[serde(default)]
    pub role: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentRating {
    pub body: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieInfo {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub year: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(rename = "qualityRating", default)]
    pub quality_rating: Vec<QualityRating>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityRating {
    #[serde(deserialize_with = "string_or_number")]
    pub rating: String,
    #[serde(rename = "maxRating", deserialize_with = "string_or_number")]
    pub max_rating: String,
}

impl ProgramRecord {
    /// Gracenote numbering from the first metadata entry that carries one
    pub fn gracenote(&self) -> Option<&GracenoteNumbering> {
        self.metadata.iter().find_map(|entry| entry.gracenote.as_ref())
    }
}

/// Values the provider sends either quoted or bare (`"2001"` / `2001`, `"3.5"` / `3.5`)
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|value| value.map(String::from))
}
