//! Pagination wrapper and list filter for the job history endpoint.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::job::JobStatus;
use crate::types::DbId;

/// Largest page size the backend accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used when the caller does not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One page of results as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub records: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub size: u64,
    /// 1-based index of this page.
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub pages: u64,
}

impl<T> Page<T> {
    /// Whether a page after this one exists.
    pub fn has_next(&self) -> bool {
        self.current < self.pages
    }
}

/// Filter for `GET /jobs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    /// 1-based page number.
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<DbId>,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
            status: None,
            job_type: None,
            project_id: None,
        }
    }
}

impl JobQuery {
    /// Check the bounds the backend enforces before sending the request.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.page < 1 {
            return Err(CoreError::Validation(
                "page must be greater than 0".to_string(),
            ));
        }
        if self.size < 1 || self.size > MAX_PAGE_SIZE {
            return Err(CoreError::Validation(format!(
                "size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_query_is_valid() {
        assert!(JobQuery::default().validate().is_ok());
    }

    #[test]
    fn page_zero_is_rejected() {
        let query = JobQuery {
            page: 0,
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn size_above_max_is_rejected() {
        let query = JobQuery {
            size: MAX_PAGE_SIZE + 1,
            ..Default::default()
        };
        let err = query.validate().unwrap_err();
        assert!(err.to_string().contains("size must be between"));
    }

    #[test]
    fn query_serializes_only_set_filters() {
        let query = JobQuery {
            status: Some(JobStatus::Running),
            project_id: Some(9),
            ..Default::default()
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            json!({"page": 1, "size": 20, "status": "RUNNING", "projectId": 9})
        );
    }

    #[test]
    fn page_deserializes_backend_shape() {
        let page: Page<serde_json::Value> = serde_json::from_value(json!({
            "records": [{"id": 1}],
            "total": 41,
            "size": 20,
            "current": 1,
            "pages": 3,
            "orders": []
        }))
        .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.total, 41);
        assert!(page.has_next());
    }
}
