use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{FetchHandler, HarvestContext};
use crate::github::ContentEntry;
use crate::store::AggregationStore;

const FUNDING_FILE: &str = "funding.yml";

/// Looks for a funding file in the owner's `.github` meta-repository
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerFunding {
    pub owner: String,
}

impl OwnerFunding {
    pub fn new(owner: impl Into<String>) -> Self {
        OwnerFunding {
            owner: owner.into(),
        }
    }
}

impl FetchHandler for OwnerFunding {
    /// URL of the funding file, if the listing has one
    type Output = Option<String>;

    fn name(&self) -> &'static str {
        "owner-funding"
    }

    fn request_url(&self, ctx: &HarvestContext) -> String {
        ctx.repos_url(&format!("{}/.github/contents/", self.owner))
    }

    fn interpret(&self, body: &str) -> Result<Self::Output> {
        let entries: Vec<ContentEntry> =
            serde_json::from_str(body).context("Failed to parse contents listing")?;

        Ok(entries
            .into_iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(FUNDING_FILE))
            .and_then(|entry| entry.html_url))
    }

    fn merge(&self, output: &Self::Output, _ctx: &HarvestContext, store: &mut AggregationStore) {
        let Some(url) = output else {
            return;
        };

        store.update_owner(&self.owner, |mut owner| {
            match &owner.funding_url {
                None => {
                    info!("Found funding for {}: {}", self.owner, url);
                    owner.funding_url = Some(url.clone());
                }
                Some(existing) if existing != url => {
                    warn!(
                        "Keeping funding URL {} for {}, ignoring {}",
                        existing, self.owner, url
                    );
                }
                Some(_) => {}
            }
            owner
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_context;

    #[test]
    fn test_request_url() {
        let handler = OwnerFunding::new("acme");
        assert_eq!(
            handler.request_url(&test_context()),
            "https://api.github.com/repos/acme/.github/contents/"
        );
    }

    #[test]
    fn test_interpret_is_case_insensitive() {
        let handler = OwnerFunding::new("acme");
        let body = r#"[
            {"name":"README.md","html_url":"https://x/README.md"},
            {"name":"FUNDING.yml","html_url":"https://x/FUNDING.yml"}
        ]"#;

        assert_eq!(
            handler.interpret(body).unwrap().as_deref(),
            Some("https://x/FUNDING.yml")
        );
    }

    #[test]
    fn test_interpret_without_funding_file() {
        let handler = OwnerFunding::new("acme");
        let body = r#"[{"name":"profile","html_url":"https://x/profile"}]"#;
        assert_eq!(handler.interpret(body).unwrap(), None);
    }

    #[test]
    fn test_interpret_rejects_object() {
        let handler = OwnerFunding::new("acme");
        assert!(handler.interpret(r#"{"name":"FUNDING.yml"}"#).is_err());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let handler = OwnerFunding::new("acme");
        let ctx = test_context();
        let output = Some("https://x/FUNDING.yml".to_string());

        let mut store = AggregationStore::new();
        handler.merge(&output, &ctx, &mut store);
        let once = store.owner("acme").cloned();
        handler.merge(&output, &ctx, &mut store);

        assert_eq!(store.owner("acme").cloned(), once);
        assert_eq!(
            store.owner("acme").unwrap().funding_url.as_deref(),
            Some("https://x/FUNDING.yml")
        );
    }

    #[test]
    fn test_merge_keeps_first_funding_url() {
        let handler = OwnerFunding::new("acme");
        let ctx = test_context();
        let mut store = AggregationStore::new();

        handler.merge(&Some("https://x/FUNDING.yml".to_string()), &ctx, &mut store);
        handler.merge(&Some("https://y/funding.yml".to_string()), &ctx, &mut store);
        handler.merge(&None, &ctx, &mut store);

        assert_eq!(
            store.owner("acme").unwrap().funding_url.as_deref(),
            Some("https://x/FUNDING.yml")
        );
    }
}
