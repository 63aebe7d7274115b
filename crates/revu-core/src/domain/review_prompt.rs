use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const MAX_HIGHLIGHTS: usize = 10;

/// What a customer tells us before asking for a drafted review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPrompt {
    pub outlet_name: String,
    pub rating: u8,
    pub highlights: Vec<String>,
    pub language: String,
}

impl ReviewPrompt {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.outlet_name.trim().is_empty() {
            return Err(DomainError::validation("outletName is required"));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(DomainError::validation("rating must be between 1 and 5"));
        }
        if self.highlights.len() > MAX_HIGHLIGHTS {
            return Err(DomainError::validation(format!(
                "at most {MAX_HIGHLIGHTS} highlights are allowed"
            )));
        }
        if self.language.trim().is_empty() {
            return Err(DomainError::validation("language is required"));
        }
        Ok(())
    }

    /// Instruction text handed to the language model.
    pub fn instructions(&self) -> String {
        let mut text = format!(
            "Write a short, genuine customer review for \"{}\" in language \"{}\". \
             The customer rated their visit {} out of 5.",
            self.outlet_name.trim(),
            self.language.trim(),
            self.rating
        );

        let highlights: Vec<&str> = self
            .highlights
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .collect();
        if !highlights.is_empty() {
            text.push_str(" Mention: ");
            text.push_str(&highlights.join(", "));
            text.push('.');
        }

        text.push_str(" Keep it under 80 words, first person, no hashtags or emojis.");
        text
    }
}
