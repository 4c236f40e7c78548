//! Side-by-side comparison of two models, optionally judged by a third.

use serde_json::Value;
use tracing::{info, warn};

use crate::catalog::ModelCatalog;
use crate::core::{CompletionProvider, CompletionResult, LlmError, ModelParameters};
use crate::prompt::{
    COMPARATOR_SYSTEM_TEMPLATE, DEFAULT_SYSTEM_PROMPT, LabeledResponse, build_comparison_prompt,
    comparator_system_prompt, escape_braces,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChoice {
    pub label: String,
    pub model_id: String,
}

impl ModelChoice {
    pub fn new(label: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            model_id: model_id.into(),
        }
    }

    pub fn from_catalog(catalog: &ModelCatalog, display_name: &str) -> Option<Self> {
        catalog
            .model_id(display_name)
            .map(|id| Self::new(display_name, id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            temperature: 0.5,
            top_p: 0.9,
            max_tokens: 512,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparatorSettings {
    pub model: ModelChoice,
    /// Template with a `{user_prompt}` slot
    pub system_template: String,
    pub sampling: SamplingSettings,
}

impl ComparatorSettings {
    pub fn new(model: ModelChoice) -> Self {
        Self {
            model,
            system_template: COMPARATOR_SYSTEM_TEMPLATE.to_string(),
            sampling: SamplingSettings {
                temperature: 0.2,
                top_p: 0.95,
                max_tokens: 1024,
            },
        }
    }

    pub fn with_system_template(mut self, template: impl Into<String>) -> Self {
        self.system_template = template.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRequest {
    pub first: ModelChoice,
    pub second: ModelChoice,
    /// Raw user text; braces are escaped before it reaches a template.
    pub prompt: String,
    /// Raw system text shared by both compared models.
    pub system_prompt: String,
    pub sampling: SamplingSettings,
    pub comparator: Option<ComparatorSettings>,
}

impl ComparisonRequest {
    pub fn new(first: ModelChoice, second: ModelChoice, prompt: impl Into<String>) -> Self {
        Self {
            first,
            second,
            prompt: prompt.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            sampling: SamplingSettings::default(),
            comparator: None,
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingSettings) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_comparator(mut self, comparator: ComparatorSettings) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Label of the action that starts this comparison.
    pub fn compare_label(&self) -> String {
        match &self.comparator {
            Some(comparator) => format!(
                "Compare {} and {} using {}",
                self.first.label, self.second.label, comparator.model.label
            ),
            None => format!("Compare {} and {}", self.first.label, self.second.label),
        }
    }
}

#[derive(Debug)]
pub enum PanelOutcome {
    Completed(CompletionResult),
    Failed(LlmError),
    Skipped(String),
    NotRun,
}

#[derive(Debug)]
pub struct Panel {
    pub title: String,
    pub outcome: PanelOutcome,
}

impl Panel {
    fn new(title: String, outcome: PanelOutcome) -> Self {
        Self { title, outcome }
    }

    pub fn result(&self) -> Option<&CompletionResult> {
        match &self.outcome {
            PanelOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }

    /// Markdown for this panel. `compare_label` names the action shown in the retry hint.
    pub fn render(&self, compare_label: &str) -> String {
        let body = match &self.outcome {
            PanelOutcome::Completed(result) => {
                let metadata = Value::Object(result.response_metadata.clone());
                let metadata = serde_json::to_string_pretty(&metadata)
                    .unwrap_or_else(|_| metadata.to_string());
                format!(
                    "{}\n\n#### Response Metadata\n\n```json\n{metadata}\n```\n",
                    result.content
                )
            }
            PanelOutcome::Failed(e) => format!("> Request failed: {e}\n"),
            PanelOutcome::Skipped(reason) => format!("> Skipped: {reason}\n"),
            PanelOutcome::NotRun => {
                format!("> Click on the {compare_label} button to compare the models.\n")
            }
        };

        let mut out = format!("### {}\n\n", self.title);
        out.push_str(&body);
        out
    }
}

#[derive(Debug)]
pub struct ComparisonOutcome {
    pub compare_label: String,
    pub first: Panel,
    pub second: Panel,
    /// `None` when no comparator was requested.
    pub comparator: Option<Panel>,
}

impl ComparisonOutcome {
    /// Panels for a comparison that has not been run yet.
    pub fn pending(request: &ComparisonRequest) -> Self {
        Self {
            compare_label: request.compare_label(),
            first: Panel::new(first_title(request), PanelOutcome::NotRun),
            second: Panel::new(second_title(request), PanelOutcome::NotRun),
            comparator: request
                .comparator
                .as_ref()
                .map(|c| Panel::new(comparator_title(c), PanelOutcome::NotRun)),
        }
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        [Some(&self.first), Some(&self.second), self.comparator.as_ref()]
            .into_iter()
            .flatten()
    }

    pub fn render(&self) -> String {
        self.panels()
            .map(|panel| panel.render(&self.compare_label))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn first_title(request: &ComparisonRequest) -> String {
    format!("Model1: {} Response", request.first.label)
}

fn second_title(request: &ComparisonRequest) -> String {
    format!("Model2: {} Response", request.second.label)
}

fn comparator_title(settings: &ComparatorSettings) -> String {
    format!("Comparator Model: {} Response", settings.model.label)
}

/// Run both models, then the comparator if one is configured.
///
/// Calls are issued one after another. A failing call is recorded in its
/// panel and does not discard the others; the comparator only runs when both
/// responses are available.
#[tracing::instrument(
    name = "run_comparison",
    skip_all,
    fields(first = %request.first.model_id, second = %request.second.model_id)
)]
pub async fn run_comparison<P>(provider: &P, request: &ComparisonRequest) -> ComparisonOutcome
where
    P: CompletionProvider + ?Sized,
{
    let system = escape_braces(&request.system_prompt);
    let user = escape_braces(&request.prompt);

    let first = complete_panel(
        provider,
        first_title(request),
        ModelParameters::builder(&request.first.model_id)
            .temperature(request.sampling.temperature)
            .top_p(request.sampling.top_p)
            .max_tokens(request.sampling.max_tokens)
            .system_prompt(&system)
            .user_prompt(&user)
            .build(),
    )
    .await;

    let second = complete_panel(
        provider,
        second_title(request),
        ModelParameters::builder(&request.second.model_id)
            .temperature(request.sampling.temperature)
            .top_p(request.sampling.top_p)
            .max_tokens(request.sampling.max_tokens)
            .system_prompt(&system)
            .user_prompt(&user)
            .build(),
    )
    .await;

    let comparator = match &request.comparator {
        None => None,
        Some(settings) => Some(run_comparator(provider, request, settings, &first, &second).await),
    };

    ComparisonOutcome {
        compare_label: request.compare_label(),
        first,
        second,
        comparator,
    }
}

async fn run_comparator<P>(
    provider: &P,
    request: &ComparisonRequest,
    settings: &ComparatorSettings,
    first: &Panel,
    second: &Panel,
) -> Panel
where
    P: CompletionProvider + ?Sized,
{
    let title = comparator_title(settings);
    let (Some(first_result), Some(second_result)) = (first.result(), second.result()) else {
        warn!("Skipping comparator: at least one model produced no response");
        return Panel::new(
            title,
            PanelOutcome::Skipped("both model responses are required for a comparison".into()),
        );
    };

    let user_prompt = build_comparison_prompt(
        &LabeledResponse {
            position: 1,
            label: &request.first.label,
            result: first_result,
        },
        &LabeledResponse {
            position: 2,
            label: &request.second.label,
            result: second_result,
        },
    );

    let params = comparator_system_prompt(&settings.system_template, &request.prompt).and_then(
        |system_prompt| {
            ModelParameters::builder(&settings.model.model_id)
                .temperature(settings.sampling.temperature)
                .top_p(settings.sampling.top_p)
                .max_tokens(settings.sampling.max_tokens)
                .system_prompt(system_prompt)
                .user_prompt(user_prompt)
                .build()
        },
    );

    complete_panel(provider, title, params).await
}

async fn complete_panel<P>(
    provider: &P,
    title: String,
    params: Result<ModelParameters, LlmError>,
) -> Panel
where
    P: CompletionProvider + ?Sized,
{
    let outcome = match params {
        Ok(params) => match provider.complete(&params).await {
            Ok(result) => {
                info!(model = params.model(), "Completion received");
                PanelOutcome::Completed(result)
            }
            Err(e) => {
                warn!(model = params.model(), error = %e, "Completion failed");
                PanelOutcome::Failed(e)
            }
        },
        Err(e) => {
            warn!(error = %e, "Could not build request parameters");
            PanelOutcome::Failed(e)
        }
    };
    Panel::new(title, outcome)
}
