use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{FerryError, Result};
use crate::tracker::{IssuePage, IssueTracker, ParentUpdate};

pub const DEFAULT_ENDPOINT: &str = "https://api.linear.app/graphql";

const ISSUE_PAGE_QUERY: &str = r#"
query IssuePage($filter: IssueFilter, $after: String) {
  issues(filter: $filter, first: 100, after: $after) {
    nodes {
      id
      identifier
      title
      description
      parent { id identifier }
    }
    pageInfo { hasNextPage endCursor }
  }
}
"#;

const UPDATE_PARENT_MUTATION: &str = r#"
mutation UpdateIssueParent($issueId: String!, $parentId: String!) {
  issueUpdate(id: $issueId, input: { parentId: $parentId }) {
    success
    issue {
      id
      identifier
      parent { id identifier }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct IssuesData {
    issues: IssuePage,
}

#[derive(Debug, Deserialize)]
struct IssueUpdateData {
    #[serde(rename = "issueUpdate")]
    issue_update: ParentUpdate,
}

/// Blocking GraphQL client for Linear.
pub struct LinearClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl LinearClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("ferry/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()?;

        let status = response.status();
        let body = response.text()?;

        let envelope: GraphQlResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(FerryError::Protocol(format!("HTTP {status}")));
            }
            Err(err) => return Err(err.into()),
        };

        if !envelope.errors.is_empty() {
            let messages: Vec<&str> = envelope
                .errors
                .iter()
                .map(|err| err.message.as_str())
                .collect();
            return Err(FerryError::GraphQl(messages.join("; ")));
        }
        if !status.is_success() {
            return Err(FerryError::Protocol(format!("HTTP {status}")));
        }

        envelope
            .data
            .ok_or_else(|| FerryError::Protocol("response carried no data".into()))
    }
}

impl IssueTracker for LinearClient {
    fn fetch_issue_page(&self, team_key: Option<&str>, after: Option<&str>) -> Result<IssuePage> {
        let filter = team_key.map(|key| json!({ "team": { "key": { "eq": key } } }));
        let data: IssuesData =
            self.execute(ISSUE_PAGE_QUERY, json!({ "filter": filter, "after": after }))?;
        Ok(data.issues)
    }

    fn update_parent(&self, issue_id: &str, parent_id: &str) -> Result<ParentUpdate> {
        let data: IssueUpdateData = self.execute(
            UPDATE_PARENT_MUTATION,
            json!({ "issueId": issue_id, "parentId": parent_id }),
        )?;
        Ok(data.issue_update)
    }
}
