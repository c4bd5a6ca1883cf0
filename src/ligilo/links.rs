//! Hypermedia links for encoded URL resources.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Resource-lifecycle verbs that drive link generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Create,
    List,
    Get,
    Delete,
}

/// A single hypermedia link: relation plus target.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// Build the links for `resource` under `action`.
///
/// Every action except `Delete` yields exactly two links, "view" before
/// "delete"; `Delete` yields only the "delete" link. Callers rely on the
/// order as well as the relation names, so it is part of the contract.
#[must_use]
pub fn generate_links(
    action: LinkAction,
    resource: &str,
    api_base: &str,
    download_url: &str,
) -> Vec<Link> {
    let mut links = Vec::with_capacity(2);

    if action != LinkAction::Delete {
        links.push(Link {
            rel: "view".to_string(),
            href: download_url.to_string(),
        });
    }

    links.push(Link {
        rel: "delete".to_string(),
        href: format!("{}/url/{resource}", api_base.trim_end_matches('/')),
    });

    links
}
