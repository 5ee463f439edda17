//! Free-text project Q&A.
//!
//! Questions go to Anthropic or OpenAI when an API key is available, with the
//! headline figures of an analysis folded into the prompt. Without a key, or
//! when the remote call fails, a keyword-routed template answers instead.

use crate::analyzer::report::{format_carbon, format_currency, AnalysisReport};
use crate::config::AssistantSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssistantProvider {
    Anthropic,
    OpenAI,
    Template,
}

impl AssistantProvider {
    fn default_model(&self) -> &'static str {
        match self {
            AssistantProvider::Anthropic => "claude-sonnet-4-20250514",
            AssistantProvider::OpenAI => "gpt-4o",
            AssistantProvider::Template => "template",
        }
    }

    fn api_key_var(&self) -> Option<&'static str> {
        match self {
            AssistantProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            AssistantProvider::OpenAI => Some("OPENAI_API_KEY"),
            AssistantProvider::Template => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub provider: AssistantProvider,
    pub model: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub generated_text: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// What a question is about, by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Risk,
    Budget,
    Schedule,
    Environmental,
    Resources,
    General,
}

const TOPIC_KEYWORDS: &[(&[&str], Topic)] = &[
    (&["risk"], Topic::Risk),
    (&["budget", "cost"], Topic::Budget),
    (&["schedule", "timeline"], Topic::Schedule),
    (&["environmental", "sustainability"], Topic::Environmental),
    (&["resource", "labor", "equipment"], Topic::Resources),
];

impl Topic {
    /// First matching keyword group wins.
    pub fn detect(query: &str) -> Self {
        let query = query.to_lowercase();
        TOPIC_KEYWORDS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| query.contains(k)))
            .map(|(_, topic)| *topic)
            .unwrap_or(Topic::General)
    }
}

pub struct Assistant {
    config: AssistantConfig,
}

impl Assistant {
    pub fn new(config: AssistantConfig) -> Self {
        Self { config }
    }

    /// Anthropic if `ANTHROPIC_API_KEY` is set, else OpenAI if
    /// `OPENAI_API_KEY` is set, else the template.
    pub fn from_env() -> Self {
        for provider in [AssistantProvider::Anthropic, AssistantProvider::OpenAI] {
            if let Some(key) = provider.api_key_var().and_then(|v| std::env::var(v).ok()) {
                return Self::new(AssistantConfig {
                    provider,
                    model: provider.default_model().to_string(),
                    api_key: key,
                });
            }
        }
        Self::template()
    }

    /// Build from config. A remote provider without its API key degrades to the template.
    pub fn from_settings(settings: &AssistantSettings) -> Self {
        let Some(provider) = settings.provider else {
            let mut assistant = Self::from_env();
            if let Some(model) = &settings.model {
                if assistant.config.provider != AssistantProvider::Template {
                    assistant.config.model = model.clone();
                }
            }
            return assistant;
        };

        let api_key = provider
            .api_key_var()
            .and_then(|v| std::env::var(v).ok())
            .unwrap_or_default();
        if provider != AssistantProvider::Template && api_key.is_empty() {
            tracing::warn!(?provider, "no API key for assistant provider, using template answers");
            return Self::template();
        }

        Self::new(AssistantConfig {
            provider,
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| provider.default_model().to_string()),
            api_key,
        })
    }

    pub fn template() -> Self {
        Self::new(AssistantConfig {
            provider: AssistantProvider::Template,
            model: AssistantProvider::Template.default_model().to_string(),
            api_key: String::new(),
        })
    }

    pub fn provider(&self) -> AssistantProvider {
        self.config.provider
    }

    pub async fn answer(&self, query: &str, report: Option<&AnalysisReport>) -> AssistantReply {
        let prompt = build_prompt(query, report);
        let remote = match self.config.provider {
            AssistantProvider::Anthropic => Some(self.ask_anthropic(&prompt).await),
            AssistantProvider::OpenAI => Some(self.ask_openai(&prompt).await),
            AssistantProvider::Template => None,
        };

        match remote {
            Some(Ok(reply)) => reply,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "assistant provider failed, falling back to template");
                template_reply(query, &prompt, report)
            }
            None => template_reply(query, &prompt, report),
        }
    }

    async fn ask_anthropic(&self, prompt: &str) -> Result<AssistantReply> {
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": 800,
            "messages": [{
                "role": "user",
                "content": prompt
            }]
        });

        let client = reqwest::Client::new();
        let resp = client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to call Anthropic API")?
            .error_for_status()
            .context("Anthropic API returned an error status")?;

        let json: serde_json::Value = resp.json().await.context("Failed to parse response")?;

        let text = json["content"][0]["text"]
            .as_str()
            .context("Anthropic response had no text content")?
            .to_string();
        let usage = TokenUsage::new(
            json["usage"]["input_tokens"].as_u64().unwrap_or(0),
            json["usage"]["output_tokens"].as_u64().unwrap_or(0),
        );

        Ok(AssistantReply {
            generated_text: text,
            model: self.config.model.clone(),
            usage: Some(usage),
        })
    }

    async fn ask_openai(&self, prompt: &str) -> Result<AssistantReply> {
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": 800,
            "messages": [{
                "role": "user",
                "content": prompt
            }]
        });

        let client = reqwest::Client::new();
        let resp = client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to call OpenAI API")?
            .error_for_status()
            .context("OpenAI API returned an error status")?;

        let json: serde_json::Value = resp.json().await.context("Failed to parse response")?;

        let text = json["choices"][0]["message"]["content"]
            .as_str()
            .context("OpenAI response had no message content")?
            .to_string();
        let usage = TokenUsage::new(
            json["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
            json["usage"]["completion_tokens"].as_u64().unwrap_or(0),
        );

        Ok(AssistantReply {
            generated_text: text,
            model: self.config.model.clone(),
            usage: Some(usage),
        })
    }
}

/// Prompt for remote providers, with report figures when available.
pub fn build_prompt(query: &str, report: Option<&AnalysisReport>) -> String {
    let mut prompt = String::from(
        "You are an assistant specialized in construction project analysis.\n\
         Answer the question below with concrete, actionable recommendations.\n",
    );

    if let Some(report) = report {
        let m = &report.project_metrics;
        let footprint = &report.environmental_impact.current_footprint;
        prompt.push_str(&format!(
            "\nProject figures:\n\
             - Type: {}\n\
             - Budget: {} (current spend {}, variance {})\n\
             - Material / labor / equipment cost: {} / {} / {}\n\
             - Duration: {} days, {}% complete\n\
             - Risk level: {} (average score {:.2}, {} risks assessed)\n\
             - Carbon footprint: {}\n",
            m.project_type,
            format_currency(m.total_budget),
            format_currency(report.budget_analysis.current_spend),
            format_currency(report.budget_analysis.variance),
            format_currency(m.total_material_cost),
            format_currency(m.total_labor_cost),
            format_currency(m.total_equipment_cost),
            m.project_duration,
            m.completion_percentage,
            m.risk_level.label(),
            m.average_risk_score,
            report.risk_assessment.len(),
            format_carbon(footprint.carbon),
        ));
    }

    prompt.push_str(&format!("\nQuestion: {}\n", query.trim()));
    prompt
}

fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

fn template_reply(query: &str, prompt: &str, report: Option<&AnalysisReport>) -> AssistantReply {
    let text = template_answer(Topic::detect(query), report);
    let usage = TokenUsage::new(word_count(prompt), word_count(&text));
    AssistantReply {
        generated_text: text,
        model: AssistantProvider::Template.default_model().to_string(),
        usage: Some(usage),
    }
}

/// Offline answer for a topic, quoting report figures when one is supplied.
pub fn template_answer(topic: Topic, report: Option<&AnalysisReport>) -> String {
    let Some(report) = report else {
        return generic_answer(topic).to_string();
    };

    let m = &report.project_metrics;
    match topic {
        Topic::Risk => {
            let mut out = format!(
                "Overall risk level is {} with an average risk score of {:.2}. \
                 {} risks were assessed: {} critical and {} high.\n",
                m.risk_level.label(),
                m.average_risk_score,
                report.risk_assessment.len(),
                report.critical_risk_count(),
                report.high_risk_count(),
            );
            for rec in &report.risk_mitigation {
                out.push_str(&format!(
                    "\n- {} ({}): {}",
                    rec.title,
                    rec.severity.symbol(),
                    rec.mitigation_strategy
                ));
            }
            out
        }
        Topic::Budget => {
            let b = &report.budget_analysis;
            let mut out = format!(
                "Current spend is {} against a budget of {} ({:.1}% utilized), \
                 leaving a variance of {}. The forecast with contingency is {}.\n",
                format_currency(b.current_spend),
                format_currency(b.total_budget),
                b.utilization_rate,
                format_currency(b.variance),
                format_currency(b.forecast),
            );
            for rec in &b.recommendations {
                out.push_str(&format!(
                    "\n- {}: {}",
                    rec.title,
                    rec.savings_estimate.as_deref().unwrap_or("savings vary")
                ));
            }
            out
        }
        Topic::Schedule => {
            let s = &report.schedule_optimization;
            let path: Vec<&str> = s.critical_path.iter().map(|p| p.phase.as_str()).collect();
            let path = if path.is_empty() {
                "no phases".to_string()
            } else {
                path.join(", ")
            };
            format!(
                "The project runs {} days and is {}% complete. \
                 Optimization could save {}, moving completion from {} to {}. \
                 The critical path runs through {}.",
                m.project_duration,
                m.completion_percentage,
                s.timeline_reduction,
                s.current_completion,
                s.optimized_completion,
                path,
            )
        }
        Topic::Environmental => {
            let env = &report.environmental_impact;
            let f = &env.current_footprint;
            format!(
                "The carbon footprint is {} against a target of {}. \
                 Water usage is {} units. Waste recycling is at {}% (target {}%) \
                 and renewable energy at {}% (target {}%).",
                format_carbon(f.carbon),
                format_carbon(env.targets.carbon),
                f.water,
                f.waste,
                env.targets.waste,
                f.renewable,
                env.targets.renewable,
            )
        }
        Topic::Resources => {
            let bottlenecks: Vec<String> = report
                .bottlenecks()
                .map(|b| format!("{} ({})", b.name, b.reason.label()))
                .collect();
            let mut out = format!(
                "Monthly costs: labor {}, materials {}, equipment {}.",
                format_currency(m.total_labor_cost),
                format_currency(m.total_material_cost),
                format_currency(m.total_equipment_cost),
            );
            if !bottlenecks.is_empty() {
                out.push_str(&format!(" Bottlenecks: {}.", bottlenecks.join(", ")));
            }
            out
        }
        Topic::General => format!(
            "This {} project spends {} against a {} budget, runs {} days and carries \
             {} overall risk. {} recommendations are available across resources, \
             environment and budget.",
            m.project_type,
            format_currency(report.total_cost()),
            format_currency(m.total_budget),
            m.project_duration,
            m.risk_level.label().to_lowercase(),
            report.recommendation_count(),
        ),
    }
}

fn generic_answer(topic: Topic) -> &'static str {
    match topic {
        Topic::Risk => {
            "Typical construction risks are weather delays, supply chain disruption and \
             shortages of specialized labor. Build buffer time into the schedule, qualify \
             alternative suppliers and start recruiting specialized trades early."
        }
        Topic::Budget => {
            "Material price volatility and overtime are the usual sources of overruns. \
             Lock in bulk purchases early, schedule labor to avoid overtime and share \
             rented equipment between phases."
        }
        Topic::Schedule => {
            "Focus on the longest dependent phases. Parallelize trades that do not share \
             work areas and resequence activities off the critical path."
        }
        Topic::Environmental => {
            "Low-carbon concrete mixes, on-site waste sorting and reduced equipment idle \
             time give the largest sustainability gains for most projects."
        }
        Topic::Resources => {
            "Level labor across phases to raise utilization, share equipment between \
             phases and time material deliveries to reduce on-site storage."
        }
        Topic::General => {
            "Upload project data to get figures for resource allocation, schedule, risk, \
             environmental impact and budget. Common wins are just-in-time deliveries, \
             balanced labor allocation and sustainable material selection."
        }
    }
}
