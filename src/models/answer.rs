use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::question::{OptionId, Question, QuestionId, QuestionKind};

/// A recorded answer. The JSON shape follows the question kind:
/// a number for single choice and rating, an array for multiple choice,
/// a string for free text and a boolean for yes / no.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Number(i64),
    Choices(Vec<OptionId>),
    Text(String),
}

impl AnswerValue {
    pub fn choice(id: OptionId) -> Self {
        Self::Number(i64::from(id))
    }

    pub fn rating(value: i64) -> Self {
        Self::Number(value)
    }

    /// Empty text and empty selections count as unanswered.
    pub fn is_answered(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Choices(ids) => !ids.is_empty(),
            Self::Flag(_) | Self::Number(_) => true,
        }
    }

    /// Whether this value has the shape the question expects.
    pub fn fits(&self, question: &Question) -> bool {
        match (question.kind, self) {
            (QuestionKind::Single, Self::Number(id)) => OptionId::try_from(*id)
                .ok()
                .and_then(|id| question.option(id))
                .is_some(),
            (QuestionKind::Multiple, Self::Choices(ids)) => {
                let mut seen = HashSet::new();
                ids.iter()
                    .all(|id| question.option(*id).is_some() && seen.insert(*id))
            }
            (QuestionKind::Rating, Self::Number(value)) => {
                question.rating_bounds().contains(*value)
            }
            (QuestionKind::Text, Self::Text(_)) => true,
            (QuestionKind::Boolean, Self::Flag(_)) => true,
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_choices(&self) -> &[OptionId] {
        match self {
            Self::Choices(ids) => ids,
            _ => &[],
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            _ => None,
        }
    }
}

/// Wire form of one answer: `{"questionId": 3, "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub value: Option<AnswerValue>,
}

/// The response set: at most one answer per question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<AnswerRecord>", into = "Vec<AnswerRecord>")]
pub struct Answers(BTreeMap<QuestionId, AnswerValue>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: QuestionId) -> Option<&AnswerValue> {
        self.0.get(&question_id)
    }

    /// Writes or overwrites the answer; `None` clears it.
    pub fn set(&mut self, question_id: QuestionId, value: Option<AnswerValue>) {
        match value {
            Some(value) => {
                self.0.insert(question_id, value);
            }
            None => {
                self.0.remove(&question_id);
            }
        }
    }

    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.get(question_id).is_some_and(AnswerValue::is_answered)
    }

    pub fn answered_count(&self) -> usize {
        self.0.values().filter(|value| value.is_answered()).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &AnswerValue)> {
        self.0.iter().map(|(id, value)| (*id, value))
    }

    /// Drops answers whose question no longer exists.
    pub fn retain_questions(&mut self, keep: impl Fn(QuestionId) -> bool) {
        self.0.retain(|id, _| keep(*id));
    }
}

impl From<Vec<AnswerRecord>> for Answers {
    fn from(records: Vec<AnswerRecord>) -> Self {
        let mut answers = Answers::new();
        for record in records {
            answers.set(record.question_id, record.value);
        }
        answers
    }
}

impl From<Answers> for Vec<AnswerRecord> {
    fn from(answers: Answers) -> Self {
        answers
            .0
            .into_iter()
            .map(|(question_id, value)| AnswerRecord {
                question_id,
                value: Some(value),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_choice() -> Question {
        Question::new(1, "Pick one", QuestionKind::Single)
            .with_options([(1, "A"), (2, "B"), (3, "C")])
    }

    #[test]
    fn test_values_use_plain_json_shapes() {
        let answers: Answers = serde_json::from_str(
            r#"[
                {"questionId": 1, "value": 2},
                {"questionId": 2, "value": [1, 3]},
                {"questionId": 3, "value": "because"},
                {"questionId": 4, "value": true},
                {"questionId": 5, "value": null}
            ]"#,
        )
        .unwrap();

        assert_eq!(answers.get(1), Some(&AnswerValue::Number(2)));
        assert_eq!(answers.get(2), Some(&AnswerValue::Choices(vec![1, 3])));
        assert_eq!(answers.get(3), Some(&AnswerValue::Text("because".into())));
        assert_eq!(answers.get(4), Some(&AnswerValue::Flag(true)));
        assert_eq!(answers.get(5), None);
        assert_eq!(answers.len(), 4);
    }

    #[test]
    fn test_later_record_overwrites_earlier_one() {
        let records = vec![
            AnswerRecord {
                question_id: 9,
                value: Some(AnswerValue::Number(1)),
            },
            AnswerRecord {
                question_id: 9,
                value: Some(AnswerValue::Number(4)),
            },
        ];
        let answers = Answers::from(records);
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get(9), Some(&AnswerValue::Number(4)));
    }

    #[test]
    fn test_empty_text_and_selection_are_unanswered() {
        let mut answers = Answers::new();
        answers.set(1, Some(AnswerValue::Text(String::new())));
        answers.set(2, Some(AnswerValue::Choices(Vec::new())));
        answers.set(3, Some(AnswerValue::Flag(false)));

        assert!(!answers.is_answered(1));
        assert!(!answers.is_answered(2));
        assert!(answers.is_answered(3));
        assert_eq!(answers.answered_count(), 1);
    }

    #[test]
    fn test_fits_checks_option_ids() {
        let question = single_choice();
        assert!(AnswerValue::choice(2).fits(&question));
        assert!(!AnswerValue::choice(9).fits(&question));
        assert!(!AnswerValue::Number(-1).fits(&question));
        assert!(!AnswerValue::Text("2".into()).fits(&question));
    }

    #[test]
    fn test_fits_rejects_duplicate_multi_choice_ids() {
        let question = Question::new(2, "Pick many", QuestionKind::Multiple)
            .with_options([(1, "A"), (2, "B")]);
        assert!(AnswerValue::Choices(vec![2, 1]).fits(&question));
        assert!(!AnswerValue::Choices(vec![1, 1]).fits(&question));
        assert!(!AnswerValue::Choices(vec![5]).fits(&question));
    }

    #[test]
    fn test_fits_checks_rating_bounds() {
        let question = Question::new(3, "Rate", QuestionKind::Rating).with_rating(1, 5);
        assert!(AnswerValue::rating(5).fits(&question));
        assert!(!AnswerValue::rating(0).fits(&question));
        assert!(!AnswerValue::Flag(true).fits(&question));
    }
}
