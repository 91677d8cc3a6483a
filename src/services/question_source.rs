//! Producers of the questions played in a round.

use std::{collections::VecDeque, sync::Mutex};

use futures::{FutureExt, future::BoxFuture};
use rand::Rng;
use thiserror::Error;

use crate::state::question::{Operator, Question};

/// Errors raised while producing questions. Callers recover with
/// [`fallback_questions`].
#[derive(Debug, Error)]
pub enum QuestionSourceError {
    /// The service could not be reached or answered with an error status.
    #[error("question service unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The service answered with something that is not a question list.
    #[error("invalid question payload: {0}")]
    InvalidResponse(String),
    /// Required configuration is missing from the environment.
    #[error("missing environment variable {var}")]
    MissingEnvVar { var: &'static str },
}

impl QuestionSourceError {
    /// Wrap a transport failure.
    pub fn unavailable(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

/// Anything able to produce the questions of a round.
pub trait QuestionSource: Send + Sync {
    /// Produce `count` questions whose operands stay within `[1, max_operand]`.
    fn generate(
        &self,
        count: usize,
        max_operand: u32,
    ) -> BoxFuture<'static, Result<Vec<Question>, QuestionSourceError>>;
}

/// Questions played when the configured source fails.
pub fn fallback_questions() -> Vec<Question> {
    vec![
        Question::arithmetic(5, Operator::Add, 5),
        Question::arithmetic(12, Operator::Multiply, 4),
        Question::situation(
            "John has 10 apples. He gives 3 to Mary.",
            "How many apples does John have left?",
            7.0,
        ),
    ]
}

/// Offline generator of random arithmetic questions.
///
/// Subtractions never go negative and divisions always have an integral
/// result, so every answer compares exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticQuestionSource;

impl ArithmeticQuestionSource {
    /// New generator.
    pub fn new() -> Self {
        Self
    }

    fn question<R: Rng + ?Sized>(rng: &mut R, max_operand: i64) -> Question {
        let operator = Operator::ALL[rng.random_range(0..Operator::ALL.len())];
        match operator {
            Operator::Add | Operator::Multiply => {
                let lhs = rng.random_range(1..=max_operand);
                let rhs = rng.random_range(1..=max_operand);
                Question::arithmetic(lhs, operator, rhs)
            }
            Operator::Subtract => {
                let a = rng.random_range(1..=max_operand);
                let b = rng.random_range(1..=max_operand);
                Question::arithmetic(a.max(b), operator, a.min(b))
            }
            Operator::Divide => {
                // pick the quotient first so the dividend stays in range
                let divisor = rng.random_range(1..=max_operand);
                let quotient = rng.random_range(1..=(max_operand / divisor).max(1));
                Question::arithmetic(divisor * quotient, operator, divisor)
            }
        }
    }
}

impl QuestionSource for ArithmeticQuestionSource {
    fn generate(
        &self,
        count: usize,
        max_operand: u32,
    ) -> BoxFuture<'static, Result<Vec<Question>, QuestionSourceError>> {
        let max_operand = i64::from(max_operand.max(1));
        let mut rng = rand::rng();
        let questions = (0..count)
            .map(|_| Self::question(&mut rng, max_operand))
            .collect();
        futures::future::ready(Ok(questions)).boxed()
    }
}

/// Source replaying scripted batches, one per call.
///
/// Once the script runs out every call answers with an empty list.
#[derive(Debug, Default)]
pub struct ScriptedQuestionSource {
    batches: Mutex<VecDeque<Result<Vec<Question>, String>>>,
}

impl ScriptedQuestionSource {
    /// Source with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful batch.
    pub fn with_batch(self, questions: Vec<Question>) -> Self {
        self.push(Ok(questions));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    fn push(&self, entry: Result<Vec<Question>, String>) {
        self.batches
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(entry);
    }
}

impl QuestionSource for ScriptedQuestionSource {
    fn generate(
        &self,
        _count: usize,
        _max_operand: u32,
    ) -> BoxFuture<'static, Result<Vec<Question>, QuestionSourceError>> {
        let next = self
            .batches
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        let result = next.map_err(QuestionSourceError::InvalidResponse);
        futures::future::ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::question::QuestionKind;

    #[test]
    fn fallback_list_has_three_known_questions() {
        let questions = fallback_questions();
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].question_text, "5 + 5 = ?");
        assert_eq!(questions[0].answer, 10.0);
        assert_eq!(questions[1].question_text, "12 * 4 = ?");
        assert_eq!(questions[1].answer, 48.0);
        assert_eq!(questions[2].answer, 7.0);
    }

    #[tokio::test]
    async fn generated_questions_stay_in_bounds() {
        let questions = ArithmeticQuestionSource::new()
            .generate(200, 12)
            .await
            .unwrap();
        assert_eq!(questions.len(), 200);

        for question in questions {
            let QuestionKind::Arithmetic { lhs, rhs, operator } = question.kind else {
                panic!("expected an arithmetic question");
            };
            assert!((1..=12).contains(&lhs), "{}", question.question_text);
            assert!((1..=12).contains(&rhs), "{}", question.question_text);
            assert!(question.has_integral_answer(), "{}", question.question_text);
            assert!(question.answer >= 0.0, "{}", question.question_text);
            assert_eq!(question.answer, operator.apply(lhs, rhs));
        }
    }

    #[tokio::test]
    async fn scripted_source_replays_in_order() {
        let source = ScriptedQuestionSource::new()
            .with_failure("offline")
            .with_batch(fallback_questions());

        assert!(matches!(
            source.generate(15, 50).await,
            Err(QuestionSourceError::InvalidResponse(_))
        ));
        assert_eq!(source.generate(15, 50).await.unwrap().len(), 3);
        assert!(source.generate(15, 50).await.unwrap().is_empty());
    }
}
