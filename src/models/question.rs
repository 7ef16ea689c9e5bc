use serde::{Deserialize, Serialize};

/// Stable question identifier; survives reordering.
pub type QuestionId = u32;

/// Option identifier, unique within its question.
pub type OptionId = u32;

const DEFAULT_MIN_RATING: i64 = 1;
const DEFAULT_MAX_RATING: i64 = 5;

/// Most values a rating scale may offer (0..=10).
pub const MAX_RATING_VALUES: usize = 11;

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Exactly one option id.
    Single,
    /// A set of option ids.
    Multiple,
    /// One integer inside the rating bounds.
    Rating,
    /// Free text.
    Text,
    /// Yes / no.
    Boolean,
}

impl QuestionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Single => "single choice",
            Self::Multiple => "multiple choice",
            Self::Rating => "rating",
            Self::Text => "free text",
            Self::Boolean => "yes / no",
        }
    }

    /// Whether the question carries a list of options.
    pub fn has_options(self) -> bool {
        matches!(self, Self::Single | Self::Multiple)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: OptionId,
    #[serde(rename = "text")]
    pub label: String,
}

impl QuestionOption {
    pub fn new(id: OptionId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Inclusive bounds of a rating question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingBounds {
    pub min: i64,
    pub max: i64,
}

impl RatingBounds {
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn values(&self) -> impl Iterator<Item = i64> {
        self.min..=self.max
    }

    pub fn len(&self) -> usize {
        self.span().unwrap_or(0)
    }

    /// Number of values, or `None` when the range does not fit a `usize`.
    pub fn span(&self) -> Option<usize> {
        if self.is_empty() {
            return Some(0);
        }
        let width = self.max.checked_sub(self.min)?.checked_add(1)?;
        usize::try_from(width).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.max < self.min
    }
}

/// A single question as delivered by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    /// Help text shown under the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<i64>,
    /// Not read at runtime. Reserved for adaptive selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Question {
    pub fn new(id: QuestionId, text: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id,
            text: text.into(),
            description: None,
            kind,
            required: false,
            options: Vec::new(),
            min_rating: None,
            max_rating: None,
            difficulty: None,
            category: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_options<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (OptionId, S)>,
        S: Into<String>,
    {
        self.options = labels
            .into_iter()
            .map(|(id, label)| QuestionOption::new(id, label))
            .collect();
        self
    }

    pub fn with_rating(mut self, min: i64, max: i64) -> Self {
        self.min_rating = Some(min);
        self.max_rating = Some(max);
        self
    }

    /// Rating bounds, defaulting to 1..=5 when the source omits them.
    pub fn rating_bounds(&self) -> RatingBounds {
        RatingBounds {
            min: self.min_rating.unwrap_or(DEFAULT_MIN_RATING),
            max: self.max_rating.unwrap_or(DEFAULT_MAX_RATING),
        }
    }

    pub fn option(&self, id: OptionId) -> Option<&QuestionOption> {
        self.options.iter().find(|option| option.id == id)
    }
}
