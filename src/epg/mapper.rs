//! Field mapping from program records into `<programme>` elements
//!
//! Every optional source field maps to an optional output field; nothing
//! absent upstream is defaulted. Output child order follows the XMLTV DTD.

use chrono::TimeDelta;

use super::episode::{SYSTEM_DD_PROGID, SYSTEM_XMLTV_NS, xmltv_ns};
use super::roles::{CreditRole, classify_role};
use crate::errors::MappingError;
use crate::models::program::Description;
use crate::models::{ProgramRecord, ScheduleSlot, Station};
use crate::utils::time::{OutputZone, parse_air_date_time, parse_original_air_date};
use crate::utils::XMLTV_DATE_FORMAT;
use crate::xmltv::XmlElement;

/// `previously-shown start` format: the air date at midnight, no zone
const PREVIOUSLY_SHOWN_FORMAT: &str = "%Y%m%d%H%M%S";

/// The attributes rewritten when a cached programme is reused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammeTiming {
    pub start: String,
    pub stop: String,
    pub channel: String,
}

impl ProgrammeTiming {
    /// Start and stop in `zone`, stop being start plus the slot duration
    pub fn for_slot(slot: &ScheduleSlot, station: &Station, zone: &OutputZone) -> Result<Self, MappingError> {
        let malformed = |message: String| MappingError::MalformedTimestamp {
            hash: slot.content_hash.clone(),
            value: slot.air_start.clone(),
            message,
        };

        let start = parse_air_date_time(&slot.air_start).map_err(|e| malformed(e.to_string()))?;
        let stop = TimeDelta::try_seconds(slot.duration_seconds)
            .and_then(|duration| start.checked_add_signed(duration))
            .ok_or_else(|| malformed(format!("duration {}s out of range", slot.duration_seconds)))?;

        Ok(Self {
            start: zone.format_xmltv(&start),
            stop: zone.format_xmltv(&stop),
            channel: station.channel_id.clone(),
        })
    }

    /// Overwrite start, stop and channel on an existing element in place
    pub fn rebase(&self, element: &mut XmlElement) {
        element.set_attr("start", self.start.as_str());
        element.set_attr("stop", self.stop.as_str());
        element.set_attr("channel", self.channel.as_str());
    }
}

/// Text with an optional `lang` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangText {
    pub lang: Option<String>,
    pub text: String,
}

impl LangText {
    fn to_element(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .with_optional_attr("lang", self.lang.as_deref())
            .with_text(self.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub role: CreditRole,
    pub name: String,
    /// Character played; only ever set for actors
    pub character: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFlag {
    Mono,
    Stereo,
    DolbyDigital,
}

impl AudioFlag {
    /// Matching token prefixes in priority order
    const PRIORITY: [(AudioFlag, &'static str); 3] = [
        (AudioFlag::Mono, "mono"),
        (AudioFlag::Stereo, "stereo"),
        (AudioFlag::DolbyDigital, "dd"),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFlag::Mono => "mono",
            AudioFlag::Stereo => "stereo",
            AudioFlag::DolbyDigital => "dolby digital",
        }
    }

    /// Highest priority flag matched by any token, at most one
    pub fn detect(tokens: &[String]) -> Option<Self> {
        Self::PRIORITY
            .iter()
            .find(|(_, prefix)| any_token_starts_with(tokens, prefix))
            .map(|(flag, _)| *flag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    pub system: String,
    pub value: String,
}

/// A rendered programme prior to serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Programme {
    pub timing: ProgrammeTiming,
    pub titles: Vec<LangText>,
    pub sub_title: Option<LangText>,
    pub desc: Option<LangText>,
    pub credits: Vec<Credit>,
    pub date: Option<String>,
    pub categories: Vec<LangText>,
    /// Cache keyword, `<prefix><content hash>`
    pub keyword: String,
    pub length_seconds: Option<i64>,
    pub url: Option<String>,
    pub episode_num: Option<String>,
    pub dd_progid: String,
    pub hdtv: bool,
    pub audio: Option<AudioFlag>,
    pub previously_shown: Option<String>,
    pub premiere: Option<String>,
    pub new: bool,
    pub teletext_subtitles: bool,
    pub ratings: Vec<Rating>,
    pub star_ratings: Vec<String>,
}

impl Programme {
    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("programme")
            .with_attr("start", self.timing.start.as_str())
            .with_attr("stop", self.timing.stop.as_str())
            .with_attr("channel", self.timing.channel.as_str());

        for title in &self.titles {
            element.push(title.to_element("title"));
        }
        if let Some(sub_title) = &self.sub_title {
            element.push(sub_title.to_element("sub-title"));
        }
        if let Some(desc) = &self.desc {
            element.push(desc.to_element("desc"));
        }
        if !self.credits.is_empty() {
            let mut credits = XmlElement::new("credits");
            for credit in &self.credits {
                credits.push(
                    XmlElement::new(credit.role.as_str())
                        .with_optional_attr("role", credit.character.as_deref())
                        .with_text(credit.name.as_str()),
                );
            }
            element.push(credits);
        }
        if let Some(date) = &self.date {
            element.push(XmlElement::new("date").with_text(date.as_str()));
        }
        for category in &self.categories {
            element.push(category.to_element("category"));
        }
        element.push(XmlElement::new("keyword").with_text(self.keyword.as_str()));
        if let Some(length) = self.length_seconds {
            element.push(
                XmlElement::new("length")
                    .with_attr("units", "seconds")
                    .with_text(length.to_string()),
            );
        }
        if let Some(url) = &self.url {
            element.push(XmlElement::new("url").with_text(url.as_str()));
        }
        if let Some(episode_num) = &self.episode_num {
            element.push(
                XmlElement::new("episode-num")
                    .with_attr("system", SYSTEM_XMLTV_NS)
                    .with_text(episode_num.as_str()),
            );
        }
        element.push(
            XmlElement::new("episode-num")
                .with_attr("system", SYSTEM_DD_PROGID)
                .with_text(self.dd_progid.as_str()),
        );
        if self.hdtv {
            element.push(XmlElement::new("video").with_child(XmlElement::new("quality").with_text("HDTV")));
        }
        if let Some(audio) = self.audio {
            element.push(XmlElement::new("audio").with_child(XmlElement::new("stereo").with_text(audio.as_str())));
        }
        if let Some(start) = &self.previously_shown {
            element.push(XmlElement::new("previously-shown").with_attr("start", start.as_str()));
        }
        if let Some(premiere) = &self.premiere {
            element.push(XmlElement::new("premiere").with_text(premiere.as_str()));
        }
        if self.new {
            element.push(XmlElement::new("new"));
        }
        if self.teletext_subtitles {
            element.push(XmlElement::new("subtitles").with_attr("type", "teletext"));
        }
        for rating in &self.ratings {
            element.push(
                XmlElement::new("rating")
                    .with_attr("system", rating.system.as_str())
                    .with_child(XmlElement::new("value").with_text(rating.value.as_str())),
            );
        }
        for star_rating in &self.star_ratings {
            element.push(XmlElement::new("star-rating").with_child(XmlElement::new("value").with_text(star_rating.as_str())));
        }
        element
    }
}

/// Maps one program record in its slot context to a [`Programme`]
#[derive(Debug, Clone)]
pub struct FieldMapper {
    keyword_prefix: String,
}

impl FieldMapper {
    pub fn new<S: Into<String>>(keyword_prefix: S) -> Self {
        Self {
            keyword_prefix: keyword_prefix.into(),
        }
    }

    /// Cache keyword text for a content hash
    pub fn keyword(&self, content_hash: &str) -> String {
        format!("{}{}", self.keyword_prefix, content_hash)
    }

    pub fn map(
        &self,
        slot: &ScheduleSlot,
        record: &ProgramRecord,
        station: &Station,
        timing: ProgrammeTiming,
        dd_progid: String,
    ) -> Result<Programme, MappingError> {
        let lang = station.language.as_deref();
        let with_lang = |text: &str| LangText {
            lang: lang.map(str::to_string),
            text: text.to_string(),
        };

        let original_air_date = record
            .original_air_date
            .as_deref()
            .map(|value| {
                parse_original_air_date(value).map_err(|e| MappingError::MalformedDate {
                    program_id: record.program_id.clone(),
                    value: value.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        let movie = record.movie.as_ref();
        let date = movie
            .and_then(|m| m.year.clone())
            .or_else(|| original_air_date.map(|d| d.format(XMLTV_DATE_FORMAT).to_string()));
        let previously_shown = original_air_date.map(|d| {
            d.and_hms_opt(0, 0, 0)
                .unwrap_or_default()
                .format(PREVIOUSLY_SHOWN_FORMAT)
                .to_string()
        });

        Ok(Programme {
            timing,
            titles: record
                .titles
                .iter()
                .filter_map(|t| t.title120.as_deref())
                .map(with_lang)
                .collect(),
            sub_title: record.episode_title.as_deref().map(with_lang),
            desc: self.description(record, lang),
            credits: credits(record),
            date,
            categories: record.genres.iter().map(|g| with_lang(g)).collect(),
            keyword: self.keyword(&slot.content_hash),
            length_seconds: record.duration.or_else(|| movie.and_then(|m| m.duration)),
            url: record.official_url.clone(),
            episode_num: record.gracenote().map(xmltv_ns),
            dd_progid,
            hdtv: any_token_starts_with(&record.video_properties, "hdtv"),
            audio: AudioFlag::detect(&record.audio_properties),
            previously_shown,
            premiere: record
                .premiere_or_finale
                .as_ref()
                .filter(|value| value.to_lowercase().starts_with("premiere"))
                .cloned(),
            new: record.new.is_some(),
            teletext_subtitles: any_token_starts_with(&record.audio_properties, "cc"),
            ratings: record
                .content_rating
                .iter()
                .map(|r| Rating {
                    system: r.body.clone(),
                    value: r.code.clone(),
                })
                .collect(),
            star_ratings: movie
                .map(|m| {
                    m.quality_rating
                        .iter()
                        .map(|q| format!("{}/{}", q.rating, q.max_rating))
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Highest precision tier present; its own language wins over the station's
    fn description(&self, record: &ProgramRecord, station_lang: Option<&str>) -> Option<LangText> {
        let descriptions = record.descriptions.as_ref()?;
        let best: &Description = descriptions
            .description1000
            .first()
            .or_else(|| descriptions.description100.first())?;
        Some(LangText {
            lang: best.language.as_deref().or(station_lang).map(str::to_string),
            text: best.description.clone(),
        })
    }
}

/// Cast then crew, classified and grouped in DTD role order.
///
/// The sort is stable so upstream billing order is kept within a role.
fn credits(record: &ProgramRecord) -> Vec<Credit> {
    let cast = record.cast.iter().filter_map(|member| {
        let role = classify_role(&member.role)?;
        Some(Credit {
            role,
            name: member.name.clone(),
            character: if role == CreditRole::Actor {
                member.character_name.clone()
            } else {
                None
            },
        })
    });
    let crew = record.crew.iter().filter_map(|member| {
        Some(Credit {
            role: classify_role(&member.role)?,
            name: member.name.clone(),
            character: None,
        })
    });

    let mut credits: Vec<Credit> = cast.chain(crew).collect();
    credits.sort_by_key(|credit| credit.role.dtd_rank());
    credits
}

/// Case-insensitive prefix match against any property token
fn any_token_starts_with(tokens: &[String], prefix: &str) -> bool {
    tokens.iter().any(|token| {
        token
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}
