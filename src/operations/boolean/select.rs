use super::classify::PieceClassification;
use super::split::Operand;

/// The type of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Intersect,
    /// `A - B`.
    Difference,
}

impl BooleanOp {
    /// Whether the result covers the plane far away from every boundary,
    /// given the same property of both operands.
    #[must_use]
    pub fn unbounded_result(self, a: bool, b: bool) -> bool {
        match self {
            Self::Union => a || b,
            Self::Intersect => a && b,
            Self::Difference => a && !b,
        }
    }
}

/// Decision about whether to keep a boundary piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepDecision {
    Keep,
    KeepReversed,
    Discard,
}

/// Determines whether a boundary piece survives into the result, based on
/// its classification relative to the other operand's region.
///
/// Operand boundaries are oriented with their interior on the left.
///
/// | Piece  | vs other region | Union   | Intersect | Difference (A-B) |
/// |--------|-----------------|---------|-----------|------------------|
/// | from A | outside B       | keep    | discard   | keep             |
/// | from A | inside B        | discard | keep      | discard          |
/// | from A | on, same sense  | keep    | keep      | discard          |
/// | from A | on, opposite    | discard | discard   | keep             |
/// | from B | outside A       | keep    | discard   | discard          |
/// | from B | inside A        | discard | keep      | keep (reversed)  |
/// | from B | on              | discard | discard   | discard          |
#[allow(clippy::match_same_arms)]
#[must_use]
pub fn should_keep_piece(
    operand: Operand,
    classification: PieceClassification,
    op: BooleanOp,
) -> KeepDecision {
    use PieceClassification::{Inside, OnOppositeSense, OnSameSense, Outside};

    match (operand, classification, op) {
        // Piece from A, classified against B
        (Operand::A, Outside, BooleanOp::Union) => KeepDecision::Keep,
        (Operand::A, Outside, BooleanOp::Intersect) => KeepDecision::Discard,
        (Operand::A, Outside, BooleanOp::Difference) => KeepDecision::Keep,

        (Operand::A, Inside, BooleanOp::Union) => KeepDecision::Discard,
        (Operand::A, Inside, BooleanOp::Intersect) => KeepDecision::Keep,
        (Operand::A, Inside, BooleanOp::Difference) => KeepDecision::Discard,

        // Shared boundary: A's copy stands for both operands.
        (Operand::A, OnSameSense, BooleanOp::Union) => KeepDecision::Keep,
        (Operand::A, OnSameSense, BooleanOp::Intersect) => KeepDecision::Keep,
        (Operand::A, OnSameSense, BooleanOp::Difference) => KeepDecision::Discard,

        (Operand::A, OnOppositeSense, BooleanOp::Union) => KeepDecision::Discard,
        (Operand::A, OnOppositeSense, BooleanOp::Intersect) => KeepDecision::Discard,
        (Operand::A, OnOppositeSense, BooleanOp::Difference) => KeepDecision::Keep,

        // Piece from B, classified against A
        (Operand::B, Outside, BooleanOp::Union) => KeepDecision::Keep,
        (Operand::B, Outside, BooleanOp::Intersect) => KeepDecision::Discard,
        (Operand::B, Outside, BooleanOp::Difference) => KeepDecision::Discard,

        (Operand::B, Inside, BooleanOp::Union) => KeepDecision::Discard,
        (Operand::B, Inside, BooleanOp::Intersect) => KeepDecision::Keep,
        (Operand::B, Inside, BooleanOp::Difference) => KeepDecision::KeepReversed,

        (Operand::B, OnSameSense | OnOppositeSense, _) => KeepDecision::Discard,
    }
}
