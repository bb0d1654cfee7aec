//! Compiles a free-text search into a parameterized AniList `Page.media`
//! query.

use crate::services::{
    anilist::MEDIA_SEARCH_SELECTION,
    extractors::{extract_all, ExtractionResult, FieldType, FilterField, PromptContext, FILTER_FIELDS},
    llm::LlmClient,
};
use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};
use std::{sync::Arc, time::Duration};
use tracing::info;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 50;

/// One year in `YYYYMMDD` arithmetic.
const ONE_YEAR: i64 = 10000;
/// Roughly one season (three months) in `YYYYMMDD` arithmetic.
const ONE_SEASON: i64 = 300;
/// Earliest month-day a lower bound can move back one season without
/// leaving its year.
const LOWER_BOUND_PIVOT: i64 = 401;
/// "September 32": month-days past it cannot move forward one season
/// without leaving their year.
const UPPER_BOUND_PIVOT: i64 = 932;

/// A GraphQL document and the variables to run it with.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub document: String,
    pub variables: Map<String, Value>,
}

impl CompiledQuery {
    /// Names of the filter variables, pagination excluded.
    pub fn filter_keys(&self) -> Vec<&str> {
        self.variables
            .keys()
            .map(String::as_str)
            .filter(|key| *key != "page" && *key != "perPage")
            .collect()
    }
}

/// Move a date bound outward by about one season when a season filter is
/// set, so titles dated just outside a literal boundary still match.
pub fn widen_date_bound(key: &str, date: i64) -> i64 {
    let month_day = date % 10000;
    if key == "startDate_greater" {
        if month_day < LOWER_BOUND_PIVOT {
            date - ONE_YEAR
        } else {
            date - ONE_SEASON
        }
    } else if month_day < UPPER_BOUND_PIVOT {
        date + ONE_SEASON
    } else {
        date + ONE_YEAR
    }
}

fn is_list_key(key: &str) -> bool {
    key.contains("_in")
}

fn split_list(value: &str) -> Value {
    Value::Array(
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| Value::String(item.to_string()))
            .collect(),
    )
}

/// Fold extraction results into query variables, seeded with pagination.
pub fn build_variables(results: &[ExtractionResult]) -> Map<String, Value> {
    let mut variables = Map::new();
    variables.insert("page".to_string(), Value::from(DEFAULT_PAGE));
    variables.insert("perPage".to_string(), Value::from(DEFAULT_PER_PAGE));

    for result in results {
        let value = match (&result.value, result.field_type) {
            (Value::String(list), _) if is_list_key(result.key) => split_list(list),
            (Value::Number(date), FieldType::FuzzyDateInt) if variables.contains_key("season") => {
                match date.as_i64() {
                    Some(date) => Value::from(widen_date_bound(result.key, date)),
                    None => result.value.clone(),
                }
            }
            _ => result.value.clone(),
        };
        variables.insert(result.key.to_string(), value);
    }

    // Manga has no per-season release semantics in the catalog
    if variables.get("format").and_then(Value::as_str) == Some("MANGA") {
        variables.remove("seasonYear");
    }

    variables
}

/// Build the `Page.media` document declaring exactly the given filters.
pub fn build_document(filters: &[&ExtractionResult]) -> String {
    let params: String = filters
        .iter()
        .map(|f| format!(", ${}: {}", f.key, f.field_type.graphql_type()))
        .collect();

    let arguments = if filters.is_empty() {
        String::new()
    } else {
        format!(
            "({})",
            filters
                .iter()
                .map(|f| format!("{}: ${}", f.key, f.key))
                .collect::<Vec<_>>()
                .join(", ")
        )
    };

    format!(
        "query($page: Int, $perPage: Int{params}) {{\n    Page(page: $page, perPage: $perPage) {{\n        media{arguments} {{{MEDIA_SEARCH_SELECTION}        }}\n    }}\n}}\n"
    )
}

/// Assemble the final query from surviving extraction results.
pub fn assemble(results: &[ExtractionResult]) -> CompiledQuery {
    let variables = build_variables(results);
    let declared: Vec<&ExtractionResult> = results
        .iter()
        .filter(|result| variables.contains_key(result.key))
        .collect();

    CompiledQuery {
        document: build_document(&declared),
        variables,
    }
}

/// Turns user sentences into catalog queries with one LLM question per
/// filterable field.
#[derive(Clone)]
pub struct QueryCompiler {
    llm: Arc<dyn LlmClient>,
    fields: &'static [FilterField],
    extractor_timeout: Duration,
}

impl QueryCompiler {
    pub fn new(llm: Arc<dyn LlmClient>, extractor_timeout: Duration) -> Self {
        Self {
            llm,
            fields: FILTER_FIELDS,
            extractor_timeout,
        }
    }

    pub async fn compile(&self, user_query: &str, model: &str) -> CompiledQuery {
        self.compile_on(user_query, model, Local::now().date_naive())
            .await
    }

    /// Compile as if today were `today`; relative dates in the query resolve
    /// against it.
    pub async fn compile_on(&self, user_query: &str, model: &str, today: NaiveDate) -> CompiledQuery {
        let user_query = user_query.trim();
        if user_query.is_empty() {
            return assemble(&[]);
        }

        let context = PromptContext::new(today);
        let results = extract_all(
            self.fields,
            self.llm.as_ref(),
            user_query,
            model,
            &context,
            self.extractor_timeout,
        )
        .await;

        let compiled = assemble(&results);
        info!(
            "Compiled search '{}' with filters {:?}",
            user_query,
            compiled.filter_keys()
        );
        compiled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::services::llm::ResponseSchema;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn result(key: &'static str, field_type: FieldType, value: Value) -> ExtractionResult {
        ExtractionResult {
            key,
            field_type,
            value,
        }
    }

    fn season(value: &str) -> ExtractionResult {
        result("season", FieldType::MediaSeason, json!(value))
    }

    #[test]
    fn test_empty_results_compile_to_plain_listing() {
        let compiled = assemble(&[]);

        assert_eq!(
            Value::Object(compiled.variables.clone()),
            json!({ "page": 1, "perPage": 50 })
        );
        assert!(compiled.document.contains("query($page: Int, $perPage: Int) {"));
        assert!(compiled.document.contains("media {"));
        assert!(compiled.filter_keys().is_empty());
    }

    #[test]
    fn test_manga_strips_season_year() {
        let compiled = assemble(&[
            result("seasonYear", FieldType::Int, json!(2021)),
            result("format", FieldType::MediaFormat, json!("MANGA")),
        ]);

        assert!(!compiled.variables.contains_key("seasonYear"));
        assert_eq!(compiled.variables["format"], json!("MANGA"));
        assert!(!compiled.document.contains("$seasonYear"));
        assert!(!compiled.document.contains("seasonYear: $seasonYear"));
        assert!(compiled.document.contains("$format: MediaFormat"));
        assert!(compiled.document.contains("media(format: $format)"));
    }

    #[test]
    fn test_season_year_kept_for_anime_formats() {
        let compiled = assemble(&[
            result("seasonYear", FieldType::Int, json!(2021)),
            result("format", FieldType::MediaFormat, json!("TV")),
        ]);
        assert_eq!(compiled.variables["seasonYear"], json!(2021));
    }

    #[test]
    fn test_lower_bound_widens_by_year_before_april() {
        let compiled = assemble(&[
            season("WINTER"),
            result("startDate_greater", FieldType::FuzzyDateInt, json!(20210215)),
        ]);
        assert_eq!(compiled.variables["startDate_greater"], json!(20200215));
    }

    #[test]
    fn test_lower_bound_widens_by_season_from_april() {
        let compiled = assemble(&[
            season("SUMMER"),
            result("startDate_greater", FieldType::FuzzyDateInt, json!(20210615)),
        ]);
        assert_eq!(compiled.variables["startDate_greater"], json!(20210315));
    }

    #[test]
    fn test_upper_bounds_widen_forward() {
        assert_eq!(widen_date_bound("startDate_lesser", 20210615), 20210915);
        assert_eq!(widen_date_bound("endDate_greater", 20210931), 20211231);
        assert_eq!(widen_date_bound("startDate_lesser", 20211015), 20221015);
        assert_eq!(widen_date_bound("endDate_greater", 20211201), 20221201);
    }

    #[test]
    fn test_late_year_lower_bound_moves_one_season() {
        assert_eq!(widen_date_bound("startDate_greater", 20211201), 20210901);
        assert_eq!(widen_date_bound("startDate_greater", 20210401), 20210101);
        assert_eq!(widen_date_bound("startDate_greater", 20210331), 20200331);
    }

    #[test]
    fn test_dates_untouched_without_season() {
        let compiled = assemble(&[result(
            "startDate_greater",
            FieldType::FuzzyDateInt,
            json!(20210215),
        )]);
        assert_eq!(compiled.variables["startDate_greater"], json!(20210215));
    }

    #[test]
    fn test_genre_lists_are_split_and_trimmed() {
        let compiled = assemble(&[
            result("genre_in", FieldType::StringList, json!("Romance, Action")),
            result("genre_not_in", FieldType::StringList, json!("Ecchi ,Hentai,")),
        ]);

        assert_eq!(compiled.variables["genre_in"], json!(["Romance", "Action"]));
        assert_eq!(compiled.variables["genre_not_in"], json!(["Ecchi", "Hentai"]));
        assert!(compiled.document.contains("$genre_in: [String]"));
    }

    #[test]
    fn test_variables_match_declared_parameters() {
        let compiled = assemble(&[
            result("type", FieldType::MediaType, json!("ANIME")),
            season("FALL"),
            result("seasonYear", FieldType::Int, json!(2021)),
            result("isAdult", FieldType::Boolean, json!(false)),
            result("search", FieldType::String, json!("Frieren")),
        ]);

        for key in compiled.variables.keys() {
            assert!(
                compiled.document.contains(&format!("${}:", key)),
                "{} is not declared",
                key
            );
        }
        assert!(compiled.document.contains(
            "media(type: $type, season: $season, seasonYear: $seasonYear, isAdult: $isAdult, search: $search)"
        ));
    }

    struct CountingLlm {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmClient for CountingLlm {
        async fn complete(
            &self,
            system_prompt: &str,
            _user_content: &str,
            _model: &str,
            _response_schema: Option<&ResponseSchema>,
        ) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if system_prompt.starts_with("Answer \"MANGA\" or \"ANIME\"") {
                Ok(Some("MANGA".to_string()))
            } else if system_prompt.starts_with("Answer \"TV\"") {
                Ok(Some("MANGA".to_string()))
            } else if system_prompt.starts_with("The year is") {
                Ok(Some("2021".to_string()))
            } else {
                Ok(Some("null".to_string()))
            }
        }

        async fn list_models(&self) -> Result<Vec<Value>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_empty_query_skips_extraction() {
        let llm = Arc::new(CountingLlm {
            calls: AtomicUsize::new(0),
        });
        let compiler = QueryCompiler::new(llm.clone(), Duration::from_secs(1));

        let compiled = compiler.compile("   ", "model").await;

        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
        assert!(compiled.filter_keys().is_empty());
    }

    #[tokio::test]
    async fn test_compile_runs_every_field() {
        let llm = Arc::new(CountingLlm {
            calls: AtomicUsize::new(0),
        });
        let compiler = QueryCompiler::new(llm.clone(), Duration::from_secs(1));

        let compiled = compiler
            .compile_on(
                "manga from 2021",
                "model",
                NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            )
            .await;

        assert_eq!(llm.calls.load(Ordering::SeqCst), FILTER_FIELDS.len());
        assert_eq!(compiled.filter_keys(), vec!["type", "format"]);
    }
}
