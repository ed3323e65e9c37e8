//! # Backend Firestore
//! src/jobs/firestore.rs
//!
//! Guarda cada job como un documento de Cloud Firestore usando la API REST:
//!
//! ```text
//! GET   {base}/projects/{project}/databases/(default)/documents/{collection}/{id}
//! PATCH {base}/projects/{project}/databases/(default)/documents/{collection}/{id}
//! ```
//!
//! El token de acceso se envía tal cual como `Bearer`. Los campos del job se
//! codifican como valores tipados de Firestore (`stringValue`,
//! `integerValue`, `arrayValue`, `mapValue`, ...).

use crate::jobs::storage::{JobStore, StoreError};
use crate::jobs::types::Job;
use reqwest::blocking::Client;
use serde_json::{json, Map, Number, Value};
use tracing::debug;

/// Store remoto en Cloud Firestore
pub struct FirestoreStore {
    http: Client,
    base_url: String,
    project_id: String,
    collection: String,
    access_token: String,
}

impl FirestoreStore {
    pub fn new(
        base_url: &str,
        project_id: &str,
        collection: &str,
        access_token: &str,
    ) -> Result<Self, StoreError> {
        let http = Client::builder().build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            collection: collection.to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn document_url(&self, job_id: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}/{}",
            self.base_url, self.project_id, self.collection, job_id
        )
    }

    fn remote_error(response: reqwest::blocking::Response) -> StoreError {
        let status = response.status().as_u16();
        let message = response.text().unwrap_or_default();
        StoreError::Remote { status, message }
    }
}

impl JobStore for FirestoreStore {
    fn save(&self, job: &Job) -> Result<(), StoreError> {
        // Firestore no ofrece una precondición sobre el contenido: se lee antes de escribir
        if let Some(existing) = self.get(&job.id)? {
            if existing.is_terminal() {
                return Err(StoreError::Finalized(job.id.clone()));
            }
        }

        let url = self.document_url(&job.id);
        debug!(%url, status = job.status.as_str(), "FirestoreStore::save");

        let body = json!({ "fields": encode_fields(&serde_json::to_value(job)?) });
        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response));
        }

        Ok(())
    }

    fn get(&self, job_id: &str) -> Result<Option<Job>, StoreError> {
        let url = self.document_url(job_id);
        debug!(%url, "FirestoreStore::get");

        let response = self.http.get(&url).bearer_auth(&self.access_token).send()?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::remote_error(response));
        }

        let document: Value = response.json()?;
        let fields = document.get("fields").cloned().unwrap_or_else(|| json!({}));
        let job = serde_json::from_value(decode_fields(&fields))?;
        Ok(Some(job))
    }
}

/// Codifica un objeto JSON como el mapa `fields` de un documento
pub fn encode_fields(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), encode_value(value)))
                .collect(),
        ),
        _ => json!({}),
    }
}

/// Codifica un valor JSON como valor tipado de Firestore
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // integerValue viaja como string en la API REST
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(_) => json!({ "mapValue": { "fields": encode_fields(value) } }),
    }
}

/// Decodifica el mapa `fields` de un documento a un objeto JSON plano
pub fn decode_fields(fields: &Value) -> Value {
    match fields {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), decode_value(value)))
                .collect::<Map<String, Value>>(),
        ),
        _ => Value::Object(Map::new()),
    }
}

/// Decodifica un valor tipado de Firestore
pub fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|map| map.iter().next()) else {
        return Value::Null;
    };

    match kind.as_str() {
        "booleanValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| inner.as_i64())
            .map(|i| Value::Number(i.into()))
            .unwrap_or(Value::Null),
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "stringValue" | "timestampValue" | "referenceValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => decode_fields(inner.get("fields").unwrap_or(&Value::Null)),
        _ => Value::Null,
    }
}
