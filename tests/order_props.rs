mod common;

use std::collections::HashSet;

use assessment_tui::session::{is_permutation_of, presentation_order};
use assessment_tui::{Assessment, Attempt, Question, QuestionKind, SessionState};
use common::scenario_assessment;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn assessment_with(ids: &HashSet<u32>) -> Assessment {
    Assessment {
        id: 1,
        title: "Generated".to_string(),
        description: String::new(),
        estimated_time: String::new(),
        questions: ids
            .iter()
            .map(|id| Question::new(*id, format!("Question {id}"), QuestionKind::Boolean))
            .collect(),
    }
}

proptest! {
    #[test]
    fn presentation_order_is_a_permutation(
        ids in prop::collection::hash_set(1u32..10_000, 1..80),
        seed in any::<u64>(),
    ) {
        let assessment = assessment_with(&ids);
        let mut rng = StdRng::seed_from_u64(seed);
        let order = presentation_order(&assessment, &mut rng);

        prop_assert_eq!(order.len(), ids.len());
        prop_assert!(is_permutation_of(&order, &assessment.question_ids()));
    }

    #[test]
    fn resume_keeps_stored_order(seed in any::<u64>(), index in 0usize..3, elapsed in 0u64..100_000) {
        let assessment = scenario_assessment();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut stored = SessionState::fresh(&assessment, &mut rng);
        stored.current_question_index = index;
        stored.elapsed_time = elapsed;

        let attempt = Attempt::restore(assessment, Some(stored.clone()), &mut rng);
        prop_assert_eq!(&attempt.state().question_order, &stored.question_order);
        prop_assert_eq!(attempt.state().current_question_index, index);
        prop_assert_eq!(attempt.state().elapsed_time, elapsed);
    }

    #[test]
    fn ticks_count_one_second_each(ticks in 0u64..500) {
        let mut rng = StdRng::seed_from_u64(ticks);
        let mut attempt = Attempt::restore(scenario_assessment(), None, &mut rng);
        for _ in 0..ticks {
            attempt.tick();
        }
        prop_assert_eq!(attempt.state().elapsed_time, ticks);
    }
}
