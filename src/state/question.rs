use std::fmt;

use serde::{Deserialize, Serialize};

/// Arithmetic operator of a generated question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    /// Every supported operator.
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    /// Operator written as `symbol`, if supported.
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Operator::ALL
            .into_iter()
            .find(|operator| symbol.trim().chars().eq([operator.symbol()]))
    }

    /// Symbol used in the question text.
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// Evaluate `lhs <op> rhs`.
    pub fn apply(self, lhs: i64, rhs: i64) -> f64 {
        let (lhs, rhs) = (lhs as f64, rhs as f64);
        match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide => lhs / rhs,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// What the question is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    /// Two operands joined by an operator.
    Arithmetic {
        lhs: i64,
        rhs: i64,
        operator: Operator,
    },
    /// Word problem; the narrative sets up the scenario the question asks about.
    Situation { narrative: String },
}

/// A single question of a round. Immutable once generated.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// Operands or narrative.
    pub kind: QuestionKind,
    /// Text shown to the player.
    pub question_text: String,
    /// Expected numeric answer.
    pub answer: f64,
}

impl Question {
    /// Build an arithmetic question, computing its answer and text.
    pub fn arithmetic(lhs: i64, operator: Operator, rhs: i64) -> Self {
        Self {
            kind: QuestionKind::Arithmetic { lhs, rhs, operator },
            question_text: format!("{lhs} {operator} {rhs} = ?"),
            answer: operator.apply(lhs, rhs),
        }
    }

    /// Build a word problem.
    pub fn situation(
        narrative: impl Into<String>,
        question_text: impl Into<String>,
        answer: f64,
    ) -> Self {
        Self {
            kind: QuestionKind::Situation {
                narrative: narrative.into(),
            },
            question_text: question_text.into(),
            answer,
        }
    }

    /// Exact comparison against the expected answer; no tolerance is applied.
    pub fn is_correct(&self, value: f64) -> bool {
        value == self.answer
    }

    /// Whether exact comparison is reliable for this question.
    pub fn has_integral_answer(&self) -> bool {
        self.answer.is_finite() && self.answer.fract() == 0.0
    }
}
