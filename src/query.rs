//! Turns user input into the single query string sent to retrieval.

use serde::{Deserialize, Serialize};

/// A normalized query. Callers must check `submitted` before using `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    pub text: String,
    pub submitted: bool,
}

impl Query {
    pub fn not_submitted() -> Self {
        Self {
            text: String::new(),
            submitted: false,
        }
    }

    /// Free text passes through unchanged; blank input is not a submission.
    pub fn free_text(input: &str) -> Self {
        if input.trim().is_empty() {
            return Self::not_submitted();
        }
        Self {
            text: input.to_string(),
            submitted: true,
        }
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn clamp_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Structured profile used by the meal-plan variant. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub age: Option<String>,
    pub gender: Option<String>,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub activity_level: Option<String>,
    pub dietary_preference: Option<String>,
    pub health_goal: Option<String>,
}

impl ProfileForm {
    fn fields(&self) -> [&Option<String>; 7] {
        [
            &self.age,
            &self.gender,
            &self.weight,
            &self.height,
            &self.activity_level,
            &self.dietary_preference,
            &self.health_goal,
        ]
    }

    /// Join the field values with single spaces in form order. A missing or
    /// blank field yields an unsubmitted query; partial forms are never sent.
    pub fn normalize(&self) -> Query {
        let mut parts = Vec::with_capacity(7);
        for field in self.fields() {
            match field.as_deref().map(str::trim) {
                Some(value) if !value.is_empty() => parts.push(value),
                _ => return Query::not_submitted(),
            }
        }
        Query {
            text: parts.join(" "),
            submitted: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_form() -> ProfileForm {
        ProfileForm {
            age: Some("29".into()),
            gender: Some("Female".into()),
            weight: Some("62".into()),
            height: Some("168".into()),
            activity_level: Some("Moderately active".into()),
            dietary_preference: Some("Vegetarian".into()),
            health_goal: Some("Weight loss".into()),
        }
    }

    #[test]
    fn test_free_text_is_identity() {
        for input in ["Veg Indian Dishes", "  spicy ramen ", "甘い"] {
            let q = Query::free_text(input);
            assert!(q.submitted);
            assert_eq!(q.text, input);
        }
    }

    #[test]
    fn test_free_text_blank_is_not_submitted() {
        assert_eq!(Query::free_text(""), Query::not_submitted());
        assert_eq!(Query::free_text("   \n"), Query::not_submitted());
    }

    #[test]
    fn test_form_joins_fields_in_order() {
        let q = full_form().normalize();
        assert!(q.submitted);
        assert_eq!(
            q.text,
            "29 Female 62 168 Moderately active Vegetarian Weight loss"
        );
    }

    #[test]
    fn test_form_missing_field_is_not_submitted() {
        let mut form = full_form();
        form.height = None;
        let q = form.normalize();
        assert!(!q.submitted);
        assert_eq!(q.text, "");
    }

    #[test]
    fn test_form_blank_field_is_not_submitted() {
        let mut form = full_form();
        form.health_goal = Some("  ".into());
        assert_eq!(form.normalize(), Query::not_submitted());
    }

    #[test]
    fn test_clamp_chars_counts_characters() {
        assert_eq!(clamp_chars("ramen", 10), "ramen");
        assert_eq!(clamp_chars("ramen", 3), "ram");
        assert_eq!(clamp_chars("抹茶パフェ", 2), "抹茶");
    }

    #[test]
    fn test_empty_form_is_not_submitted() {
        assert_eq!(ProfileForm::default().normalize(), Query::not_submitted());
    }
}
