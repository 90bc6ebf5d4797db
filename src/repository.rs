//! Template persistence over the backend's REST API.
//!
//! The builder core only sees the [`TemplateRepository`] trait; the
//! blocking HTTP implementation lives behind it so every screen and
//! test can swap in its own collaborator.

use std::sync::OnceLock;
use std::time::Duration;

use serde_json::Value;

use crate::error::RepositoryError;
use crate::schema::{Template, TemplatePayload, TemplateSummary};

/// Create/list/show/update/delete of persisted templates.
///
/// The list call intentionally returns summaries without fields;
/// screens that need a template's schema fetch it with [`show`]
/// explicitly.
///
/// [`show`]: TemplateRepository::show
pub trait TemplateRepository {
    /// Persist a new template; returns the server-assigned id.
    fn create(&self, payload: &TemplatePayload) -> Result<String, RepositoryError>;

    fn update(&self, id: &str, payload: &TemplatePayload) -> Result<(), RepositoryError>;

    fn list(&self) -> Result<Vec<TemplateSummary>, RepositoryError>;

    /// Fetch one template in full, fields included.
    fn show(&self, id: &str) -> Result<Template, RepositoryError>;

    fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    /// Post one filled-out submission against a template.
    fn submit(&self, id: &str, body: &Value) -> Result<(), RepositoryError>;
}

// Shared client for connection pooling across repository instances.
static SHARED_CLIENT: OnceLock<reqwest::blocking::Client> = OnceLock::new();

fn get_shared_client() -> &'static reqwest::blocking::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(300))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client")
    })
}

pub struct HttpTemplateRepository {
    base_url: String,
    api_key: Option<String>,
    client: &'static reqwest::blocking::Client,
}

impl HttpTemplateRepository {
    pub fn connect(host: &str) -> Self {
        // Add http:// scheme if missing
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", host.trim_end_matches('/'))
        };

        Self {
            base_url,
            api_key: None,
            client: get_shared_client(),
        }
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, RepositoryError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);

        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key);
        }

        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request
            .send()
            .map_err(|e| RepositoryError::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RepositoryError::status(status.as_u16(), path, error_text));
        }

        let text = response
            .text()
            .map_err(|e| RepositoryError::transport(format!("Failed to read response: {}", e)))?;

        // DELETE and submission endpoints answer with empty bodies.
        if text.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| RepositoryError::Json(format!("{} - Text: {}", e, text)))
    }

    /// The backend answers creates with `{"id": ...}`, as a string or a
    /// number depending on its storage.
    fn extract_id(response: &Value) -> Result<String, RepositoryError> {
        match response.get("id") {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(RepositoryError::missing_key("id")),
        }
    }
}

impl TemplateRepository for HttpTemplateRepository {
    fn create(&self, payload: &TemplatePayload) -> Result<String, RepositoryError> {
        let body = serde_json::to_value(payload)?;
        let response = self.request(reqwest::Method::POST, "/api/form_templates", Some(&body))?;
        if response.is_null() {
            return Err(RepositoryError::empty_response("POST", "/api/form_templates"));
        }
        Self::extract_id(&response)
    }

    fn update(&self, id: &str, payload: &TemplatePayload) -> Result<(), RepositoryError> {
        let body = serde_json::to_value(payload)?;
        let path = format!("/api/form_templates/{}", id);
        self.request(reqwest::Method::PUT, &path, Some(&body))?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<TemplateSummary>, RepositoryError> {
        let response = self.request(reqwest::Method::GET, "/api/form_templates", None)?;
        // Either a bare array or wrapped as {"templates": [...]}.
        let rows = match response.get("templates") {
            Some(templates) => templates.clone(),
            None => response,
        };
        Ok(serde_json::from_value(rows)?)
    }

    fn show(&self, id: &str) -> Result<Template, RepositoryError> {
        let path = format!("/api/form_templates/{}", id);
        let response = self.request(reqwest::Method::GET, &path, None)?;
        Ok(serde_json::from_value(response)?)
    }

    fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let path = format!("/api/form_templates/{}", id);
        self.request(reqwest::Method::DELETE, &path, None)?;
        Ok(())
    }

    fn submit(&self, id: &str, body: &Value) -> Result<(), RepositoryError> {
        let path = format!("/api/form_templates/{}/submissions", id);
        self.request(reqwest::Method::POST, &path, Some(body))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_normalizes_the_base_url() {
        let repo = HttpTemplateRepository::connect("api.example.com/");
        assert_eq!(repo.base_url, "http://api.example.com");
        let repo = HttpTemplateRepository::connect("https://api.example.com");
        assert_eq!(repo.base_url, "https://api.example.com");
    }

    #[test]
    fn extract_id_accepts_string_and_number() {
        let json = serde_json::json!({"id": "abc"});
        assert_eq!(HttpTemplateRepository::extract_id(&json).unwrap(), "abc");
        let json = serde_json::json!({"id": 42});
        assert_eq!(HttpTemplateRepository::extract_id(&json).unwrap(), "42");
        let json = serde_json::json!({"ok": true});
        assert!(HttpTemplateRepository::extract_id(&json).is_err());
    }

    #[test]
    fn template_deserializes_without_fields() {
        let template: Template = serde_json::from_str(r#"{"id": "1", "title": "T"}"#).unwrap();
        assert!(template.fields.is_empty());
    }
}
