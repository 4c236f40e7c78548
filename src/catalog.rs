/// Ordered mapping from the names shown to users to provider model ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    entries: Vec<(String, String)>,
}

const GROQ_MODELS: &[(&str, &str)] = &[
    ("LLaMA 8B", "llama3-8b-8192"),
    ("LLaMA 8B Instant", "llama-3.1-8b-instant"),
    ("LLaMA 70B", "llama3-70b-8192"),
    ("LLaMA 70B Versatile", "llama-3.1-70b-versatile"),
    ("Mixtral 8x7B", "mixtral-8x7b-32768"),
    ("Gemma 7B IT", "gemma-7b-it"),
    ("Gemma 2 9B IT", "gemma2-9b-it"),
    ("Llama Guard 8B", "llama-guard-3-8b"),
    ("Llava v1.5 7b Preview", "llava-v1.5-7b-4096-preview"),
];

impl ModelCatalog {
    pub fn new<I, D, M>(entries: I) -> Self
    where
        I: IntoIterator<Item = (D, M)>,
        D: Into<String>,
        M: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(display, id)| (display.into(), id.into()))
                .collect(),
        }
    }

    /// Models offered by Groq at the time of writing.
    pub fn groq() -> Self {
        Self::new(GROQ_MODELS.iter().copied())
    }

    pub fn model_id(&self, display_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(display, _)| display == display_name)
            .map(|(_, id)| id.as_str())
    }

    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(display, _)| display.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(display, id)| (display.as_str(), id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::groq()
    }
}
