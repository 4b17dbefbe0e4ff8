use genai::chat::{ChatMessage, ChatOptions, ChatRequest, JsonSpec};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ClientConfig};
use genai::{ModelIden, ServiceTarget, adapter::AdapterKind};

use async_trait::async_trait;
use codeguardian_core::{SecurityAnalysis, analysis_json_schema};
use log::{debug, error};

use super::{ModelClient, ModelError};
use crate::prompts::AuditPayload;

/// Client for the hosted Gemini model.
///
/// Requests structured JSON output against the fixed analysis schema and a
/// low sampling temperature to bias toward deterministic, literal output.
pub struct GeminiClient {
    model: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(model: String, temperature: f64, api_base_url: Option<&str>) -> Self {
        let client_config = ClientConfig::default().with_chat_options(
            ChatOptions::default()
                .with_temperature(temperature)
                .with_response_format(JsonSpec::new("json_object", analysis_json_schema())),
        );

        let mut client_builder = Client::builder().with_config(client_config);

        // Add custom service target resolver if base URL is provided
        if let Some(base_url) = api_base_url {
            let target_resolver = create_target_resolver(base_url);
            client_builder = client_builder.with_service_target_resolver(target_resolver);
        }

        Self {
            model,
            client: client_builder.build(),
        }
    }
}

fn create_target_resolver(base_url: &str) -> ServiceTargetResolver {
    let base_url_owned = base_url.to_string();

    ServiceTargetResolver::from_resolver_fn(
        move |service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let ServiceTarget { model, .. } = service_target;

            // Use the custom base URL and force OpenAI adapter for compatibility
            let endpoint = Endpoint::from_owned(base_url_owned.clone());

            // When using custom base URL, assume OpenAI-compatible API
            let model = ModelIden::new(AdapterKind::OpenAI, model.model_name);

            // Use the OPENAI_API_KEY environment variable as the new key when using custom URL
            let auth = AuthData::from_env("OPENAI_API_KEY");
            Ok(ServiceTarget {
                endpoint,
                auth,
                model,
            })
        },
    )
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn analyze(&self, payload: &AuditPayload) -> Result<SecurityAnalysis, ModelError> {
        let prompt = payload.render_prompt();
        debug!("sending audit request to model {}", self.model);

        let chat_req = ChatRequest::new(vec![ChatMessage::user(&prompt)]);
        let chat_res = self.client.exec_chat(&self.model, chat_req, None).await?;

        let content = chat_res.first_text().ok_or(ModelError::EmptyCompletion)?;

        SecurityAnalysis::from_model_text(content).map_err(|e| {
            error!("failed to parse model response: {e}. Content: {content}");
            ModelError::Parse(e)
        })
    }
}
