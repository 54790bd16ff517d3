//! Custom cupcake quote requests.
//!
//! A quote request is never stored. It is validated here and forwarded to the business
//! by email.

use serde::{Deserialize, Serialize};

use crate::error::{CommerceError, Result};

/// Smallest number of servings a quote can ask for.
pub const MIN_SERVINGS: i64 = 1;

/// Largest number of servings a quote can ask for.
pub const MAX_SERVINGS: i64 = 500;

/// Shortest accepted description, in characters after trimming.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// A customer's request for a custom cupcake quote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Occasion slug, e.g. `baby-shower`.
    #[serde(default)]
    pub occasion: String,
    /// Number of servings.
    #[serde(default)]
    pub servings: Option<i64>,
    /// Dietary restrictions.
    #[serde(default)]
    pub allergies: Vec<String>,
    /// What the customer wants.
    #[serde(default)]
    pub description: String,
    /// How to reach the customer.
    #[serde(default)]
    pub contact: String,
}

impl QuoteRequest {
    /// Check required fields, the servings range and the description length.
    ///
    /// # Errors
    ///
    /// - `CommerceError::MissingQuoteFields` if occasion, servings or description is absent.
    /// - `CommerceError::InvalidServings` if servings is outside `1..=500`.
    /// - `CommerceError::DescriptionTooShort` if the description is under ten characters.
    pub fn validate(&self) -> Result<()> {
        let servings = match self.servings {
            Some(n) if n != 0 => n,
            _ => return Err(CommerceError::MissingQuoteFields),
        };
        if self.occasion.trim().is_empty() || self.description.is_empty() {
            return Err(CommerceError::MissingQuoteFields);
        }
        if !(MIN_SERVINGS..=MAX_SERVINGS).contains(&servings) {
            return Err(CommerceError::InvalidServings { servings });
        }
        if self.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(CommerceError::DescriptionTooShort {
                min: MIN_DESCRIPTION_CHARS,
            });
        }
        Ok(())
    }

    /// Display name for the occasion.
    #[must_use]
    pub fn occasion_label(&self) -> &str {
        occasion_label(&self.occasion)
    }
}

/// Display name for an occasion slug. Unknown slugs are returned as given.
#[must_use]
pub fn occasion_label(occasion: &str) -> &str {
    match occasion {
        "birthday" => "Birthday",
        "wedding" => "Wedding",
        "anniversary" => "Anniversary",
        "graduation" => "Graduation",
        "baby-shower" => "Baby Shower",
        "bridal-shower" => "Bridal Shower",
        "corporate" => "Corporate Event",
        "celebration" => "Celebration",
        "other" => "Other",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote() -> QuoteRequest {
        QuoteRequest {
            occasion: "baby-shower".into(),
            servings: Some(24),
            allergies: vec!["nuts".into()],
            description: "Pastel blue cupcakes with little bears".into(),
            contact: "07700 900123".into(),
        }
    }

    #[test]
    fn accepts_complete_request() {
        assert_eq!(quote().validate(), Ok(()));
        assert_eq!(quote().occasion_label(), "Baby Shower");
    }

    #[test]
    fn requires_occasion_servings_and_description() {
        let missing = [
            QuoteRequest {
                occasion: "  ".into(),
                ..quote()
            },
            QuoteRequest {
                servings: None,
                ..quote()
            },
            QuoteRequest {
                servings: Some(0),
                ..quote()
            },
            QuoteRequest {
                description: String::new(),
                ..quote()
            },
        ];
        for request in missing {
            assert_eq!(request.validate(), Err(CommerceError::MissingQuoteFields));
        }
    }

    #[test]
    fn servings_bounds() {
        for servings in [1, 500] {
            let request = QuoteRequest {
                servings: Some(servings),
                ..quote()
            };
            assert!(request.validate().is_ok());
        }
        for servings in [-3, 501] {
            let request = QuoteRequest {
                servings: Some(servings),
                ..quote()
            };
            assert_eq!(
                request.validate(),
                Err(CommerceError::InvalidServings { servings })
            );
        }
    }

    #[test]
    fn description_is_measured_after_trimming() {
        let request = QuoteRequest {
            description: "   lemon and lime   ".into(),
            ..quote()
        };
        assert!(request.validate().is_ok());

        let request = QuoteRequest {
            description: "  short   ".into(),
            ..quote()
        };
        assert_eq!(
            request.validate(),
            Err(CommerceError::DescriptionTooShort { min: 10 })
        );
    }

    #[test]
    fn unknown_occasions_pass_through() {
        assert_eq!(occasion_label("corporate"), "Corporate Event");
        assert_eq!(occasion_label("housewarming"), "housewarming");
    }
}
