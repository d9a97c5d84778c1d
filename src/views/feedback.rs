//! Feedback board: rated comments with lazily loaded reply threads.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use super::ValidationError;
use crate::api::models::{FeedbackSubmission, ReplySubmission};
use crate::api::{ApiClient, Feedback};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Default)]
pub struct FeedbackForm {
    pub text: String,
    pub rating: Option<u8>,
}

impl FeedbackForm {
    pub fn validate(&self) -> Result<FeedbackSubmission, ValidationError> {
        let rating = self.rating.ok_or(ValidationError::MissingField("Rating"))?;
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ValidationError::RatingOutOfRange(rating));
        }
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ValidationError::MissingField("Comment"));
        }
        Ok(FeedbackSubmission {
            feedback_text: text.to_string(),
            rating,
        })
    }
}

#[derive(Debug, Default)]
pub struct FeedbackBoard {
    pub items: Vec<Feedback>,
    pub form: FeedbackForm,
    pub error: Option<String>,
    pub notice: Option<String>,
    expanded: HashSet<String>,
    reply_target: Option<String>,
    drafts: HashMap<String, String>,
}

impl FeedbackBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, id: &str) -> Option<&Feedback> {
        self.items.iter().find(|f| f.id == id)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn reply_target(&self) -> Option<&str> {
        self.reply_target.as_deref()
    }

    /// Loads the public list. Threads are not included, only their counts.
    pub async fn load(&mut self, api: &ApiClient) -> bool {
        self.error = None;
        match api.all_feedback().await {
            Ok(items) => {
                debug!("Loaded {} feedback items", items.len());
                self.items = items;
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    /// Replaces the list with the signed-in user's own feedback.
    pub async fn load_mine(&mut self, api: &ApiClient) -> bool {
        self.error = None;
        match api.my_feedback().await {
            Ok(items) => {
                self.items = items;
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    pub async fn submit(&mut self, api: &ApiClient) -> bool {
        self.error = None;
        self.notice = None;
        let submission = match self.form.validate() {
            Ok(submission) => submission,
            Err(err) => {
                self.error = Some(err.to_string());
                return false;
            }
        };

        match api.submit_feedback(&submission).await {
            Ok(created) => {
                info!("Submitted feedback {}", created.id);
                self.form = FeedbackForm::default();
                self.notice = Some("Thank you for your feedback!".to_string());
                self.load(api).await
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    /// Expands or collapses an item. Expanding fetches the thread only when
    /// the item has replies that are not cached yet.
    pub async fn toggle_expand(&mut self, api: &ApiClient, id: &str) -> bool {
        self.error = None;
        if self.expanded.remove(id) {
            return false;
        }
        let Some(item) = self.find(id) else {
            self.error = Some(format!("No feedback with id {}.", id));
            return false;
        };

        let needs_fetch = item.response_count > 0 && !item.thread_loaded();
        if needs_fetch {
            self.refresh_item(api, id).await;
        }
        self.expanded.insert(id.to_string());
        true
    }

    /// Opens the reply box on `id`, closing any other one.
    pub fn open_reply(&mut self, id: &str) {
        self.reply_target = Some(id.to_string());
    }

    pub fn cancel_reply(&mut self) {
        if let Some(id) = self.reply_target.take() {
            self.drafts.remove(&id);
        }
    }

    pub fn set_draft(&mut self, id: &str, text: &str) {
        self.drafts.insert(id.to_string(), text.to_string());
    }

    pub fn draft(&self, id: &str) -> Option<&str> {
        self.drafts.get(id).map(String::as_str)
    }

    /// Sends the draft for the open reply box and refreshes that item.
    pub async fn submit_reply(&mut self, api: &ApiClient) -> bool {
        self.error = None;
        let Some(id) = self.reply_target.clone() else {
            self.error = Some(ValidationError::Refused("No reply box is open.".to_string()).to_string());
            return false;
        };
        let text = self.drafts.get(&id).map(|t| t.trim()).unwrap_or_default();
        if text.is_empty() {
            self.error = Some(ValidationError::MissingField("Reply").to_string());
            return false;
        }

        let reply = ReplySubmission {
            response_text: text.to_string(),
            feedback_id: id.clone(),
        };
        match api.respond_to_feedback(&reply).await {
            Ok(_) => {
                self.drafts.remove(&id);
                self.reply_target = None;
                self.refresh_item(api, &id).await;
                self.expanded.insert(id);
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    async fn refresh_item(&mut self, api: &ApiClient, id: &str) {
        match api.feedback_detail(id).await {
            Ok(detail) => {
                if let Some(slot) = self.items.iter_mut().find(|f| f.id == id) {
                    *slot = detail;
                }
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }
}
