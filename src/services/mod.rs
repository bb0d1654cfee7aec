pub mod anilist;
pub mod auth;
pub mod extractors;
pub mod fuzzy;
pub mod llm;
pub mod query_compiler;
pub mod recommendation;
pub mod supabase;
pub mod vocabulary;

// Re-export public types
pub use anilist::{AniListClient, CatalogClient};
pub use auth::TokenVerifier;
pub use llm::{LlmClient, OpenAiCompatibleClient};
pub use query_compiler::{CompiledQuery, QueryCompiler};
pub use recommendation::RecommendationService;
pub use supabase::{SupabaseClient, UserStore};
