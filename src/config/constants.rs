pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_NARRATIVE_MODEL: &str = "gpt-4.1";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-12-01-preview";
pub const DEFAULT_PROXYCURL_BASE_URL: &str = "https://nubela.co";
pub const DEFAULT_LINKEDIN_BASE_URL: &str = "https://www.linkedin.com";
pub const DEFAULT_ANALYSIS_START: (i32, u32, u32) = (2025, 1, 1);
pub const DEFAULT_ANALYSIS_END: (i32, u32, u32) = (2026, 1, 1);
