use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::{AnswerValue, Answers, Assessment, Question, QuestionId};

/// Uniformly shuffled copy of `items` (Fisher-Yates).
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut items = items.to_vec();
    items.shuffle(rng);
    items
}

/// A fresh random presentation order for the assessment's questions.
pub fn presentation_order<R: Rng + ?Sized>(assessment: &Assessment, rng: &mut R) -> Vec<QuestionId> {
    shuffled(&assessment.question_ids(), rng)
}

/// True when `order` holds exactly the ids in `ids`, each once.
pub fn is_permutation_of(order: &[QuestionId], ids: &[QuestionId]) -> bool {
    if order.len() != ids.len() {
        return false;
    }
    let expected: HashSet<_> = ids.iter().collect();
    let mut seen = HashSet::with_capacity(order.len());
    order
        .iter()
        .all(|id| expected.contains(id) && seen.insert(*id))
}

/// What a selector sees when the user asks for the next question.
pub struct SelectionContext<'a> {
    pub assessment: &'a Assessment,
    pub order: &'a [QuestionId],
    pub index: usize,
    pub question: &'a Question,
    pub answer: Option<&'a AnswerValue>,
    pub answers: &'a Answers,
}

/// Chooses the position that follows the current one.
///
/// Returning `None` means the attempt is ready to submit. Adaptive selection
/// plugs in here; whether an adaptive mode should also forbid going back is
/// decided through [`NextQuestionSelector::allows_retreat`].
pub trait NextQuestionSelector: Send + Sync {
    fn next_index(&self, context: &SelectionContext<'_>) -> Option<usize>;

    fn allows_retreat(&self) -> bool {
        true
    }
}

/// Walks the presentation order front to back.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSelector;

impl NextQuestionSelector for LinearSelector {
    fn next_index(&self, context: &SelectionContext<'_>) -> Option<usize> {
        let next = context.index + 1;
        (next < context.order.len()).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::data::generate_questions;

    fn assessment(count: u32) -> Assessment {
        Assessment {
            id: 1,
            title: "Order".into(),
            description: String::new(),
            estimated_time: String::new(),
            questions: generate_questions(count),
        }
    }

    #[test]
    fn test_presentation_order_is_a_permutation() {
        let assessment = assessment(145);
        let mut rng = StdRng::seed_from_u64(7);
        let order = presentation_order(&assessment, &mut rng);
        assert!(is_permutation_of(&order, &assessment.question_ids()));
    }

    #[test]
    fn test_shuffle_actually_reorders_large_inputs() {
        let assessment = assessment(145);
        let mut rng = StdRng::seed_from_u64(11);
        let order = presentation_order(&assessment, &mut rng);
        assert_ne!(order, assessment.question_ids());
    }

    #[test]
    fn test_permutation_check_rejects_duplicates_and_gaps() {
        assert!(is_permutation_of(&[3, 1, 2], &[1, 2, 3]));
        assert!(!is_permutation_of(&[1, 1, 2], &[1, 2, 3]));
        assert!(!is_permutation_of(&[1, 2], &[1, 2, 3]));
        assert!(!is_permutation_of(&[1, 2, 4], &[1, 2, 3]));
        assert!(is_permutation_of(&[], &[]));
    }

    #[test]
    fn test_linear_selector_stops_at_last_position() {
        let assessment = assessment(3);
        let order = assessment.question_ids();
        let answers = Answers::new();
        let context = |index: usize| SelectionContext {
            assessment: &assessment,
            order: &order,
            index,
            question: &assessment.questions[index],
            answer: None,
            answers: &answers,
        };

        assert_eq!(LinearSelector.next_index(&context(0)), Some(1));
        assert_eq!(LinearSelector.next_index(&context(1)), Some(2));
        assert_eq!(LinearSelector.next_index(&context(2)), None);
        assert!(LinearSelector.allows_retreat());
    }
}
