//! GitLab project variables API.
//!
//! [`VariableStore`] is the four-call contract the reconciliation commands
//! run against; [`GitLabClient`] implements it over the REST API:
//! - `GET    /projects/:id/variables`
//! - `POST   /projects/:id/variables`
//! - `PUT    /projects/:id/variables/:key`
//! - `DELETE /projects/:id/variables/:key`
//!
//! Every call logs its intent and outcome. Nothing is retried.

use crate::config::GitLabConfig;
use crate::models::{Variable, VariableType};
use crate::tls;
use serde::Serialize;
use thiserror::Error;

/// Header carrying the access token.
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// User-Agent sent with every request
const USER_AGENT: &str = concat!("gitlab-env-mgr/", env!("CARGO_PKG_VERSION"));

/// Errors from a single API call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Token is invalid or expired (401 Unauthorized)
    #[error("Invalid or expired token: GitLab returned 401 Unauthorized")]
    Unauthorized,

    /// Token lacks required permissions (403 Forbidden)
    #[error("Token lacks required permissions: GitLab returned 403 Forbidden")]
    Forbidden,

    /// Project or variable does not exist (404 Not Found)
    #[error("Not found: GitLab returned 404 for {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// Connection, DNS or TLS failure
    #[error("HTTP request failed: {0}")]
    Network(String),

    /// Failed to parse response
    #[error("Failed to parse GitLab response: {0}")]
    Parse(String),
}

/// Remote access to one project's variables.
pub trait VariableStore {
    /// Fetch every variable in one call.
    fn list(&self) -> Result<Vec<Variable>, TransportError>;

    /// Create a new variable.
    fn create(&self, variable: &Variable) -> Result<(), TransportError>;

    /// Replace an existing variable, addressed by its key.
    fn update(&self, variable: &Variable) -> Result<(), TransportError>;

    /// Delete a variable by key.
    fn delete(&self, key: &str) -> Result<(), TransportError>;
}

/// Body for `POST /variables`.
#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    key: &'a str,
    value: &'a str,
    protected: bool,
    masked: bool,
    variable_type: VariableType,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a Variable> for CreateRequest<'a> {
    fn from(v: &'a Variable) -> Self {
        Self {
            key: &v.key,
            value: &v.value,
            protected: v.protected,
            masked: v.masked,
            variable_type: v.variable_type,
            description: v.description.as_deref().filter(|d| !d.is_empty()),
        }
    }
}

/// Body for `PUT /variables/:key`.
#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    value: &'a str,
    protected: bool,
    masked: bool,
    variable_type: VariableType,
}

impl<'a> From<&'a Variable> for UpdateRequest<'a> {
    fn from(v: &'a Variable) -> Self {
        Self {
            value: &v.value,
            protected: v.protected,
            masked: v.masked,
            variable_type: v.variable_type,
        }
    }
}

/// Blocking HTTP client for the project variables API.
pub struct GitLabClient {
    agent: ureq::Agent,
    variables_url: String,
    project_id: String,
    token: String,
}

impl GitLabClient {
    /// Build a client for the configured project.
    ///
    /// Fails with a config error if the TLS settings cannot be applied
    /// (for example an unreadable CA bundle).
    pub fn new(config: &GitLabConfig) -> crate::Result<Self> {
        let agent = ureq::AgentBuilder::new()
            .tls_config(tls::client_config(&config.tls)?)
            .user_agent(USER_AGENT)
            .build();

        tracing::debug!(
            "Using {} with token {}",
            config.variables_url(),
            config.masked_token()
        );

        Ok(Self {
            agent,
            variables_url: config.variables_url(),
            project_id: config.project_id.clone(),
            token: config.token.clone(),
        })
    }

    fn variable_url(&self, key: &str) -> String {
        format!("{}/{}", self.variables_url, urlencoding::encode(key))
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set(TOKEN_HEADER, &self.token)
            .set("Accept", "application/json")
    }
}

impl VariableStore for GitLabClient {
    fn list(&self) -> Result<Vec<Variable>, TransportError> {
        tracing::info!("Fetching variables from project {}", self.project_id);

        let result = self
            .request("GET", &self.variables_url)
            .call()
            .map_err(|e| classify(e, &self.variables_url))
            .and_then(|resp| {
                resp.into_json::<Vec<Variable>>()
                    .map_err(|e| TransportError::Parse(e.to_string()))
            });

        match result {
            Ok(variables) => {
                tracing::info!("Retrieved {} variables", variables.len());
                Ok(variables)
            }
            Err(e) => {
                tracing::error!("Failed to fetch variables: {}", e);
                Err(e)
            }
        }
    }

    fn create(&self, variable: &Variable) -> Result<(), TransportError> {
        tracing::info!("Creating variable: {}", variable.key);

        let result = self
            .request("POST", &self.variables_url)
            .send_json(CreateRequest::from(variable))
            .map_err(|e| classify(e, &self.variables_url));

        match result {
            Ok(_) => {
                tracing::info!("Successfully created variable: {}", variable.key);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to create variable {}: {}", variable.key, e);
                Err(e)
            }
        }
    }

    fn update(&self, variable: &Variable) -> Result<(), TransportError> {
        tracing::info!("Updating variable: {}", variable.key);

        let url = self.variable_url(&variable.key);
        let result = self
            .request("PUT", &url)
            .send_json(UpdateRequest::from(variable))
            .map_err(|e| classify(e, &url));

        match result {
            Ok(_) => {
                tracing::info!("Successfully updated variable: {}", variable.key);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to update variable {}: {}", variable.key, e);
                Err(e)
            }
        }
    }

    fn delete(&self, key: &str) -> Result<(), TransportError> {
        tracing::info!("Deleting variable: {}", key);

        let url = self.variable_url(key);
        let result = self.request("DELETE", &url).call().map_err(|e| classify(e, &url));

        match result {
            Ok(_) => {
                tracing::info!("Successfully deleted variable: {}", key);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to delete variable {}: {}", key, e);
                Err(e)
            }
        }
    }
}

/// Map a ureq error onto the transport taxonomy.
fn classify(err: ureq::Error, url: &str) -> TransportError {
    match err {
        ureq::Error::Status(401, _) => TransportError::Unauthorized,
        ureq::Error::Status(403, _) => TransportError::Forbidden,
        ureq::Error::Status(404, _) => TransportError::NotFound(url.to_string()),
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            TransportError::Status { code, body }
        }
        ureq::Error::Transport(t) => TransportError::Network(t.to_string()),
    }
}
