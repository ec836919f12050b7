use pila_types::response::{ApiResponse, ResponseStatus};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

pub(crate) struct BaseClient {
    api_url: String,
}

impl BaseClient {
    pub fn new(api_url: impl ToString) -> Self {
        let mut api_url = api_url.to_string();
        while api_url.ends_with('/') {
            api_url.pop();
        }
        Self { api_url }
    }

    async fn send<T: DeserializeOwned>(rb: RequestBuilder) -> Result<T, String> {
        let resp = rb
            .send()
            .await
            .map_err(|e| format!("{e:#?}"))?
            .json::<ApiResponse>()
            .await
            .map_err(|e| format!("{e:#?}"))?;

        match resp.status {
            ResponseStatus::Ok => {
                serde_json::from_value(resp.message).map_err(|e| format!("{e:#?}"))
            }
            ResponseStatus::Error => Err(resp
                .message
                .as_str()
                .map_or_else(|| resp.message.to_string(), ToString::to_string)),
        }
    }

    /// POST form-encoded fields to an enveloped endpoint.
    pub async fn form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, String)],
    ) -> Result<T, String> {
        let client = reqwest::Client::new();
        let request_builder = client.post(format!("{}{path}", self.api_url)).form(fields);
        Self::send(request_builder).await
    }

    /// GET an endpoint that replies without the status envelope.
    pub async fn get_raw<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let client = reqwest::Client::new();
        client
            .get(format!("{}{path}", self.api_url))
            .send()
            .await
            .map_err(|e| format!("{e:#?}"))?
            .json::<T>()
            .await
            .map_err(|e| format!("{e:#?}"))
    }
}
