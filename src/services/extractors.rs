//! LLM-backed extraction of catalog filters from a free-text query.
//!
//! Each [`FilterField`] asks the LLM one narrow question about the query and
//! turns the answer into at most one filter value. All fields run at once and
//! are joined before compilation; a field that fails, times out or answers
//! `null` simply contributes nothing.

use crate::services::{
    fuzzy::find_closest,
    llm::LlmClient,
    vocabulary::{GENRES, MEDIA_FORMATS, MEDIA_SEASONS, MEDIA_SOURCES, MEDIA_STATUSES, MEDIA_TYPES},
};
use chrono::{Datelike, NaiveDate};
use futures::future::join_all;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// GraphQL argument types of the filterable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    MediaType,
    MediaSeason,
    Int,
    FuzzyDateInt,
    MediaFormat,
    MediaStatus,
    MediaSource,
    StringList,
    Boolean,
    String,
}

impl FieldType {
    pub fn graphql_type(self) -> &'static str {
        match self {
            FieldType::MediaType => "MediaType",
            FieldType::MediaSeason => "MediaSeason",
            FieldType::Int => "Int",
            FieldType::FuzzyDateInt => "FuzzyDateInt",
            FieldType::MediaFormat => "MediaFormat",
            FieldType::MediaStatus => "MediaStatus",
            FieldType::MediaSource => "MediaSource",
            FieldType::StringList => "[String]",
            FieldType::Boolean => "Boolean",
            FieldType::String => "String",
        }
    }
}

/// Values that vary per request and are spliced into prompts.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext {
    pub today: NaiveDate,
}

impl PromptContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Today as an 8-digit `YYYYMMDD` integer.
    pub fn today_int(&self) -> i64 {
        fuzzy_date_int(self.today)
    }
}

pub fn fuzzy_date_int(date: NaiveDate) -> i64 {
    date.year() as i64 * 10000 + date.month() as i64 * 100 + date.day() as i64
}

pub enum Prompt {
    Static(&'static str),
    Built(fn(&PromptContext) -> String),
}

impl Prompt {
    pub fn render(&self, context: &PromptContext) -> String {
        match self {
            Prompt::Static(text) => (*text).to_string(),
            Prompt::Built(build) => build(context),
        }
    }
}

/// How a raw LLM answer becomes a filter value.
pub enum PostProcess {
    /// Parse the answer according to the field type.
    Raw,
    /// Snap the answer onto one entry of the vocabulary.
    OneOf(&'static [&'static str]),
    /// Snap each comma-separated element onto the vocabulary, dropping
    /// elements that match nothing.
    SubsetOf(&'static [&'static str]),
}

pub struct FilterField {
    pub key: &'static str,
    pub field_type: FieldType,
    pub prompt: Prompt,
    pub post_process: PostProcess,
}

/// A surviving filter value. Never `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub key: &'static str,
    pub field_type: FieldType,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Found(ExtractionResult),
    NoSignal,
}

impl Extraction {
    pub fn into_result(self) -> Option<ExtractionResult> {
        match self {
            Extraction::Found(result) => Some(result),
            Extraction::NoSignal => None,
        }
    }
}

const SCORE_SCALE: &str = r#"
Top-tier/Best/Perfect => 85
Great/Excellent => 80
Good/Decent/Average => 70
Mid/Okay/So-so => 60
Bad/Poor => 0
"#;

fn season_year_prompt(context: &PromptContext) -> String {
    format!(
        "The year is {}. Answer an unsigned integer representing a calendar year if the query asks for a **specific** (not range) year. \
If the query does not specify a specific year, answer \"null\". If the query has any duration (e.g. 1 year ago, 1 month ago), answer \"null\". \
If the query names a time frame within a year without a start or end, answer with that calendar year. \
Do not answer anything else besides the specified values.",
        context.today.year()
    )
}

fn start_date_greater_prompt(context: &PromptContext) -> String {
    format!(
        "Today is {}. Answer an 8-digit date integer (YYYYMMDD) if the query wants all media that will start (or have started) after a specified date or time \
(e.g. \"all mangas that will start / have started in 2023\"). If the query does not ask for this, answer \"null\". \
Do not answer anything else besides the specified values.",
        context.today_int()
    )
}

fn start_date_lesser_prompt(context: &PromptContext) -> String {
    format!(
        "Today is {}. Answer an 8-digit date integer (YYYYMMDD) if the query wants all media that have not started or will not start until a specified date \
(e.g. \"all mangas that have not started / will not start in 2024 and onwards\"). If the query does not include this, answer \"null\". \
Do not answer anything else besides the specified values.",
        context.today_int()
    )
}

fn end_date_greater_prompt(context: &PromptContext) -> String {
    format!(
        "Today is {}. Answer an 8-digit date integer (YYYYMMDD) if the query wants all media whose end date is after a specified date \
(e.g. \"all anime that will end after 2021\"). If the query does not include this, answer \"null\". \
Do not answer anything else besides the specified values.",
        context.today_int()
    )
}

fn genre_in_prompt(_context: &PromptContext) -> String {
    format!(
        "{}\n\nGiven the list of genres above, answer \"null\" if the query does not specify any genres to **include**. \
Otherwise answer a comma-separated list of the genres the query specifies to **include**. \
If a list of genres is given with some genres to exclude, assume the genres that are not excluded are included \
(e.g. \"Romance but not Adult nor Ecchi\" should be just \"Romance\"). \
Do not answer anything else besides the specified values. Do not make any presumptions and guess.",
        GENRES.join(", ")
    )
}

fn genre_not_in_prompt(_context: &PromptContext) -> String {
    format!(
        "{}\n\nGiven the list of genres above, answer \"null\" if the query does not specify any genres to **exclude**. \
Otherwise answer a comma-separated list of the genres the query specifies to **exclude**. \
Do not answer anything else besides the specified values. Do not make any presumptions and guess.",
        GENRES.join(", ")
    )
}

fn average_score_greater_prompt(_context: &PromptContext) -> String {
    format!(
        "Answer an integer from 1 to 100 or \"null\" depending on whether the query specifies a **minimum** rating for a media. \
If the query uses subjective words such as \"good\" or \"great\", use the mapping below if and only if the media *must* meet \
the minimum requirement or at least meet the criteria (this is not asking for a maximum rating):\n{}",
        SCORE_SCALE
    )
}

fn average_score_lesser_prompt(_context: &PromptContext) -> String {
    format!(
        "Answer an integer from 1 to 100 or \"null\" depending on whether the query specifies a **maximum** rating for a media. \
If the query uses subjective words such as \"good\" or \"great\", use the mapping below if and only if the media's rating *must* \
be below the requirement or within the criteria (this is not asking for a minimum rating, but for all media not above the rating):\n{}",
        SCORE_SCALE
    )
}

const TITLE_PROMPT: &str = r#"Extract a specific media title (or fragment) from the query if present. Follow these rules:

EXTRACT THE TITLE WHEN:
- The query is an exact media title (e.g., "That time I got reincarnated as a slime" -> "That time I got reincarnated as a slime")
- The query clearly asks about a specific title (e.g., "Tell me about Sword Art Online" -> "Sword Art Online")
- The query searches for a partial title (e.g., "anime with 'sword' in the title" -> "sword")
- The query asks for a title with specific identifying characteristics (e.g., "What's the title of the anime that begins with 'One'?" -> "One")

DO NOT EXTRACT AND RETURN "null" WHEN:
- The query contains subjective descriptors like "best", "peak", "good", "top" (e.g., "peak light novel" -> "null")
- The query asks for recommendations similar to a title (e.g., "Anime similar to Sword Art Online" -> "null")
- The query describes general media types, genres, or concepts (e.g., "light novel", "romance anime" -> "null")
- The query uses a title only as a reference point (e.g., "Is there anything better than One Piece?" -> "null")
- The query contains general qualifiers or adjectives with media formats (e.g., "popular anime", "trending manga" -> "null")
- The query is ambiguous or could be read as either a title search or a descriptive search
- You are uncertain whether the query contains a specific title

A single word or short phrase is a title only if it is distinctive and unlikely to be a general descriptor (e.g., "Naruto" is a title, "romance" is not).

Always prioritize precision over recall. If in doubt, return "null"."#;

/// Every filter the compiler knows how to extract, in GraphQL argument order.
pub static FILTER_FIELDS: &[FilterField] = &[
    FilterField {
        key: "type",
        field_type: FieldType::MediaType,
        prompt: Prompt::Static(
            "Answer \"MANGA\" or \"ANIME\" or \"null\" depending on whether the query asks for a manga or an anime. \
If the query asks for both, answer \"null\". Do not answer anything else besides the specified values. \
Do not make any inferences and guess based on the query.",
        ),
        post_process: PostProcess::OneOf(MEDIA_TYPES),
    },
    FilterField {
        key: "season",
        field_type: FieldType::MediaSeason,
        prompt: Prompt::Static(
            "Answer \"WINTER\" or \"SPRING\" or \"SUMMER\" or \"FALL\" or \"null\" depending on whether the query asks for a specific season. \
If the query does not specify a season, answer \"null\". Do not answer anything else besides the specified values. \
Do not make any inferences and guess.",
        ),
        post_process: PostProcess::OneOf(MEDIA_SEASONS),
    },
    FilterField {
        key: "seasonYear",
        field_type: FieldType::Int,
        prompt: Prompt::Built(season_year_prompt),
        post_process: PostProcess::Raw,
    },
    FilterField {
        key: "startDate_greater",
        field_type: FieldType::FuzzyDateInt,
        prompt: Prompt::Built(start_date_greater_prompt),
        post_process: PostProcess::Raw,
    },
    FilterField {
        key: "startDate_lesser",
        field_type: FieldType::FuzzyDateInt,
        prompt: Prompt::Built(start_date_lesser_prompt),
        post_process: PostProcess::Raw,
    },
    FilterField {
        key: "endDate_greater",
        field_type: FieldType::FuzzyDateInt,
        prompt: Prompt::Built(end_date_greater_prompt),
        post_process: PostProcess::Raw,
    },
    FilterField {
        key: "format",
        field_type: FieldType::MediaFormat,
        prompt: Prompt::Static(
            "Answer \"TV\" or \"TV_SHORT\" or \"MOVIE\" or \"SPECIAL\" or \"OVA\" or \"ONA\" or \"MUSIC\" or \"MANGA\" or \"NOVEL\" or \"ONE_SHOT\" \
depending on whether the query asks for a specific media format. If the query does not specify a media format, or specifies more than one, answer \"null\". \
Do not answer anything else besides the specified values. Do not make any inferences and guess based on the query.",
        ),
        post_process: PostProcess::OneOf(MEDIA_FORMATS),
    },
    FilterField {
        key: "status",
        field_type: FieldType::MediaStatus,
        prompt: Prompt::Static(
            "Answer \"FINISHED\" or \"RELEASING\" or \"NOT_YET_RELEASED\" or \"CANCELLED\" or \"HIATUS\" depending on whether the query asks for a specific media status. \
Do not infer the media status from other information (e.g. time). If the query does not specify a media status, answer \"null\". \
Do not answer anything else besides the specified values. Do not make any inferences and guess.",
        ),
        post_process: PostProcess::OneOf(MEDIA_STATUSES),
    },
    FilterField {
        key: "source",
        field_type: FieldType::MediaSource,
        prompt: Prompt::Static(
            "Answer \"ORIGINAL\" or \"MANGA\" or \"LIGHT_NOVEL\" or \"VISUAL_NOVEL\" or \"VIDEO_GAME\" or \"OTHER\" or \"NOVEL\" or \"DOUJINSHI\" or \"ANIME\" \
or \"WEB_NOVEL\" or \"LIVE_ACTION\" or \"GAME\" or \"COMIC\" or \"MULTIMEDIA_PROJECT\" or \"PICTURE_BOOK\" depending on whether the query explicitly states \
the source the media was adapted from (e.g. \"manga from anime series\" or \"anime from light novel\"). Unless the query **explicitly** mentions this, answer \"null\".",
        ),
        post_process: PostProcess::OneOf(MEDIA_SOURCES),
    },
    FilterField {
        key: "genre_in",
        field_type: FieldType::StringList,
        prompt: Prompt::Built(genre_in_prompt),
        post_process: PostProcess::SubsetOf(GENRES),
    },
    FilterField {
        key: "genre_not_in",
        field_type: FieldType::StringList,
        prompt: Prompt::Built(genre_not_in_prompt),
        post_process: PostProcess::SubsetOf(GENRES),
    },
    FilterField {
        key: "isAdult",
        field_type: FieldType::Boolean,
        prompt: Prompt::Static(
            "Answer \"true\" or \"false\" or \"null\" depending on whether the query specifies that the media is 18+. \
If the query does not mention 18+ or is vague or unsure (e.g. \"it's adult but not adult\"), answer \"null\"; \
if it states a concern about or a want for 18+ content, answer with the matching boolean. \
18+ here means sexual intercourse or plain hentai. Do not answer anything else besides the specified values.",
        ),
        post_process: PostProcess::Raw,
    },
    FilterField {
        key: "averageScore_greater",
        field_type: FieldType::Int,
        prompt: Prompt::Built(average_score_greater_prompt),
        post_process: PostProcess::Raw,
    },
    FilterField {
        key: "averageScore_lesser",
        field_type: FieldType::Int,
        prompt: Prompt::Built(average_score_lesser_prompt),
        post_process: PostProcess::Raw,
    },
    FilterField {
        key: "search",
        field_type: FieldType::String,
        prompt: Prompt::Static(TITLE_PROMPT),
        post_process: PostProcess::Raw,
    },
];

/// Strip whitespace and the quoting LLMs like to wrap single-token answers in.
fn clean_answer(answer: &str) -> &str {
    answer.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == '`')
}

impl FilterField {
    /// Turn one raw LLM answer into a filter value.
    pub fn interpret(&self, answer: Option<&str>) -> Extraction {
        let Some(answer) = answer.map(clean_answer) else {
            return Extraction::NoSignal;
        };

        // "null" is the designated no-answer token of every prompt
        if answer.is_empty() || answer.eq_ignore_ascii_case("null") {
            return Extraction::NoSignal;
        }

        let value = match &self.post_process {
            PostProcess::OneOf(vocabulary) => {
                find_closest(vocabulary, answer).map(|entry| Value::String(entry.to_string()))
            }
            PostProcess::SubsetOf(vocabulary) => {
                let matched: Vec<&str> = answer
                    .split(',')
                    .filter_map(|element| find_closest(vocabulary, element.trim()))
                    .collect();
                (!matched.is_empty()).then(|| Value::String(matched.join(", ")))
            }
            PostProcess::Raw => self.parse_raw(answer),
        };

        match value {
            Some(value) => Extraction::Found(ExtractionResult {
                key: self.key,
                field_type: self.field_type,
                value,
            }),
            None => {
                debug!("Discarding answer {:?} for field {}", answer, self.key);
                Extraction::NoSignal
            }
        }
    }

    /// JSON-parse the answer, fall back to the raw text, and keep the
    /// result only when it fits the declared GraphQL type.
    fn parse_raw(&self, answer: &str) -> Option<Value> {
        let parsed = serde_json::from_str::<Value>(answer)
            .unwrap_or_else(|_| Value::String(answer.to_string()));

        match (self.field_type, parsed) {
            (_, Value::Null) => None,
            (FieldType::Int | FieldType::FuzzyDateInt, Value::Number(number)) => {
                number.as_i64().map(Value::from)
            }
            (FieldType::Boolean, Value::Bool(flag)) => Some(Value::Bool(flag)),
            (FieldType::String | FieldType::StringList, _) => {
                Some(Value::String(answer.to_string()))
            }
            _ => None,
        }
    }

    /// Ask the LLM about `query` and interpret the answer.
    pub async fn extract(
        &self,
        llm: &dyn LlmClient,
        query: &str,
        model: &str,
        context: &PromptContext,
    ) -> Extraction {
        let prompt = self.prompt.render(context);
        match llm.complete(&prompt, query, model, None).await {
            Ok(answer) => {
                debug!("Field {} answered {:?}", self.key, answer);
                self.interpret(answer.as_deref())
            }
            Err(e) => {
                warn!("Extraction of {} failed: {}", self.key, e);
                Extraction::NoSignal
            }
        }
    }
}

/// Run every field against `query` at once and return the surviving values
/// in field order. Each field is bounded by `timeout`.
pub async fn extract_all(
    fields: &[FilterField],
    llm: &dyn LlmClient,
    query: &str,
    model: &str,
    context: &PromptContext,
    timeout: Duration,
) -> Vec<ExtractionResult> {
    let tasks = fields.iter().map(|field| async move {
        match tokio::time::timeout(timeout, field.extract(llm, query, model, context)).await {
            Ok(extraction) => extraction,
            Err(_) => {
                warn!(
                    "Extraction of {} timed out after {:?}, ignoring the field",
                    field.key, timeout
                );
                Extraction::NoSignal
            }
        }
    });

    join_all(tasks)
        .await
        .into_iter()
        .filter_map(Extraction::into_result)
        .collect()
}
