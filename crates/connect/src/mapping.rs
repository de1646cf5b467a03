//! Mapping between the remote wire records and domain quotes.
//!
//! The remote exposes generic posts `{id, title, body, userId}`. A post
//! becomes a quote whose text is the title (the body when the title is
//! blank) and whose category is derived from the owning user.

use log::debug;
use serde::{Deserialize, Serialize};

use quotesync_core::Quote;

/// Prefix of categories assigned to quotes that originate on the server.
pub const SERVER_CATEGORY_PREFIX: &str = "ServerCategory-";

/// A post as returned by `GET <endpoint>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPost {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Request body for `POST <endpoint>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNewPost {
    pub title: String,
    pub body: String,
    pub user_id: i64,
}

/// Response of `POST <endpoint>`; only the assigned id is used.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCreatedPost {
    pub id: i64,
}

/// Category for a quote owned by `user_id` on the server.
pub fn server_category(user_id: Option<i64>) -> String {
    match user_id {
        Some(id) => format!("{}{}", SERVER_CATEGORY_PREFIX, id),
        None => format!("{}unknown", SERVER_CATEGORY_PREFIX),
    }
}

/// Convert a remote post to a quote. Posts without an id or any text are
/// dropped.
pub fn quote_from_post(post: ApiPost) -> Option<Quote> {
    let Some(id) = post.id else {
        debug!("Dropping remote post without id");
        return None;
    };

    let text = [post.title.as_deref(), post.body.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty());

    let Some(text) = text else {
        debug!("Dropping remote post {} without title or body", id);
        return None;
    };

    Some(Quote::with_id(id, text, server_category(post.user_id)))
}

/// Build the create request for an unsynced quote.
pub fn post_from_quote(quote: &Quote, user_id: i64) -> ApiNewPost {
    ApiNewPost {
        title: quote.text.clone(),
        body: quote.text.clone(),
        user_id,
    }
}
