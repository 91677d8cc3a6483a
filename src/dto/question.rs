//! Wire format of question lists produced by text-generation services.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    services::question_source::QuestionSourceError,
    state::question::{Operator, Question, QuestionKind},
};

/// Top-level payload: `{"questions": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPayload {
    /// Generated entries in play order.
    pub questions: Vec<QuestionDto>,
}

/// Discriminator of a [`QuestionDto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Arithmetic,
    Situation,
}

/// One generated question as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub num1: Option<f64>,
    #[serde(default)]
    pub num2: Option<f64>,
    /// Operator symbol; kept as text so an unknown symbol does not fail the batch.
    #[serde(default)]
    pub operation: Option<String>,
    /// Expected numeric answer.
    pub answer: f64,
    /// Text shown to the player.
    pub question_text: String,
    #[serde(default)]
    pub situation_text: Option<String>,
}

impl QuestionPayload {
    /// Convert every entry, failing on the first one that cannot be played.
    pub fn into_questions(self) -> Result<Vec<Question>, QuestionSourceError> {
        self.questions.into_iter().map(Question::try_from).collect()
    }
}

impl TryFrom<QuestionDto> for Question {
    type Error = QuestionSourceError;

    fn try_from(dto: QuestionDto) -> Result<Self, Self::Error> {
        if dto.question_text.trim().is_empty() {
            return Err(QuestionSourceError::InvalidResponse(
                "question text must not be empty".into(),
            ));
        }
        if !dto.answer.is_finite() {
            return Err(QuestionSourceError::InvalidResponse(format!(
                "answer of `{}` is not a finite number",
                dto.question_text
            )));
        }

        let operands = match dto.kind {
            QuestionType::Arithmetic => arithmetic_operands(&dto),
            QuestionType::Situation => None,
        };
        let kind = match operands {
            Some((lhs, operator, rhs)) => QuestionKind::Arithmetic { lhs, rhs, operator },
            None => {
                if dto.kind == QuestionType::Arithmetic {
                    warn!(
                        question = %dto.question_text,
                        "malformed arithmetic operands; playing it as a word problem"
                    );
                }
                QuestionKind::Situation {
                    narrative: dto.situation_text.unwrap_or_default(),
                }
            }
        };

        Ok(Question {
            kind,
            question_text: dto.question_text,
            answer: dto.answer,
        })
    }
}

/// Operands and operator of an arithmetic entry, when all of them are usable.
fn arithmetic_operands(dto: &QuestionDto) -> Option<(i64, Operator, i64)> {
    let operator = Operator::from_symbol(dto.operation.as_deref()?)?;
    Some((
        integral_operand(dto.num1?)?,
        operator,
        integral_operand(dto.num2?)?,
    ))
}

fn integral_operand(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() <= i64::MAX as f64)
        .then_some(value as i64)
}
