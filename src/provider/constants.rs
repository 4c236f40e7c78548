pub mod groq {
    pub const API_BASE: &str = "https://api.groq.com/openai/v1";
    pub const CHAT_COMPLETIONS_ENDPOINT: &str = "/chat/completions";
    pub const MODELS_ENDPOINT: &str = "/models";
    pub const API_KEY_ENV_VAR: &str = "GROQ_API_KEY";
}
