use std::time::Duration;

use api_types::{
    category::CategoryOption,
    expense::{Expense, ExpenseListResponse, ExpenseNew, ExpenseQuery, ExpenseTotal, FieldErrors},
    health::Health,
};
use async_trait::async_trait;
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";
pub const IDEMPOTENCY_REPLAY_HEADER: &str = "X-Idempotency";

/// A successful create, possibly replayed by the backend for a reused key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub expense: Expense,
    pub replayed: bool,
}

/// The backend contract the tracker consumes.
#[async_trait]
pub trait ExpenseApi: Send + Sync + 'static {
    async fn categories(&self) -> Result<Vec<CategoryOption>, ApiError>;

    async fn list_expenses(&self, query: ExpenseQuery) -> Result<Vec<Expense>, ApiError>;

    async fn expense_total(&self, query: ExpenseQuery) -> Result<ExpenseTotal, ApiError>;

    async fn create_expense(
        &self,
        payload: &ExpenseNew,
        idempotency_key: &str,
    ) -> Result<Created, ApiError>;

    async fn health(&self) -> Result<Health, ApiError>;
}

/// [`ExpenseApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpApi {
    /// `base_url` points at the API prefix, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base_url =
            Url::parse(base_url).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        // Url::join drops the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::transport)?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::InvalidUrl(format!("{path}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&ExpenseQuery>,
    ) -> Result<T, ApiError> {
        let mut req = self.http.get(self.endpoint(path)?);
        if let Some(query) = query {
            req = req.query(query);
        }

        let res = req.send().await.map_err(ApiError::transport)?;
        if res.status().is_success() {
            return res.json::<T>().await.map_err(ApiError::transport);
        }
        Err(error_from_response(res).await)
    }
}

#[async_trait]
impl ExpenseApi for HttpApi {
    async fn categories(&self) -> Result<Vec<CategoryOption>, ApiError> {
        self.get_json("expenses/categories/", None).await
    }

    async fn list_expenses(&self, query: ExpenseQuery) -> Result<Vec<Expense>, ApiError> {
        self.get_json::<ExpenseListResponse>("expenses/", Some(&query))
            .await
            .map(ExpenseListResponse::into_expenses)
    }

    async fn expense_total(&self, query: ExpenseQuery) -> Result<ExpenseTotal, ApiError> {
        self.get_json("expenses/total/", Some(&query)).await
    }

    async fn create_expense(
        &self,
        payload: &ExpenseNew,
        idempotency_key: &str,
    ) -> Result<Created, ApiError> {
        let res = self
            .http
            .post(self.endpoint("expenses/")?)
            .header(IDEMPOTENCY_HEADER, idempotency_key)
            .json(payload)
            .send()
            .await
            .map_err(ApiError::transport)?;

        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }

        let replayed = res
            .headers()
            .get(IDEMPOTENCY_REPLAY_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));
        let expense = res.json::<Expense>().await.map_err(ApiError::transport)?;
        Ok(Created { expense, replayed })
    }

    async fn health(&self) -> Result<Health, ApiError> {
        let endpoint = self
            .base_url
            .join("/")
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        let res = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(ApiError::transport)?;

        if res.status().is_success() {
            return res.json::<Health>().await.map_err(ApiError::transport);
        }
        Err(error_from_response(res).await)
    }
}

async fn error_from_response(res: Response) -> ApiError {
    let status = res.status();
    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => return ApiError::transport(err),
    };

    // Only JSON objects count as field errors; arrays and HTML pages do not.
    let errors = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .filter(serde_json::Value::is_object)
        .and_then(|value| serde_json::from_value::<FieldErrors>(value).ok());

    match errors {
        Some(errors) if errors != FieldErrors::default() => ApiError::Rejected { status, errors },
        _ => ApiError::Server {
            status,
            message: status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        },
    }
}
