//! Domain types shared by the session manager, the data sources and the UI.

mod answer;
mod assessment;
mod question;
mod result;
mod survey;

pub use answer::{AnswerRecord, AnswerValue, Answers};
pub use assessment::{Assessment, AssessmentId, InvalidAssessment};
pub use question::{
    MAX_RATING_VALUES, OptionId, Question, QuestionId, QuestionKind, QuestionOption, RatingBounds,
};
pub use result::{AssessmentResult, CategoryScore, Recommendation};
pub use survey::{
    Comparisons, DistributionEntry, PeriodScores, QuestionResult, SurveyId, SurveyReport,
    SurveySummary,
};
