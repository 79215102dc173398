//! Operator definitions for arithmetic and concatenation.

/// Operators handled by [`Operation`](crate::expression::Operation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    /// String concatenation as in `'Hello' || 'World'`
    Concat,
    /// Addition as in `1 + 2`
    Plus,
    /// Subtraction as in `2 - 1`
    Minus,
    /// Multiplication as in `2 * 3`
    Multiply,
    /// Division as in `4 / 2`
    Divide,
    /// Negation as in `- ID`
    Negate,
    /// Modulus as in `5 % 2`
    Modulus,
}

impl OpType {
    pub fn is_unary(&self) -> bool {
        *self == OpType::Negate
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            OpType::Concat => "||",
            OpType::Plus => "+",
            OpType::Minus | OpType::Negate => "-",
            OpType::Multiply => "*",
            OpType::Divide => "/",
            OpType::Modulus => "%",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_display() {
        assert_eq!(OpType::Concat.as_str(), "||");
        assert_eq!(OpType::Plus.as_str(), "+");
        assert_eq!(OpType::Minus.as_str(), "-");
        assert_eq!(OpType::Negate.as_str(), "-");
        assert_eq!(OpType::Multiply.as_str(), "*");
        assert_eq!(OpType::Divide.as_str(), "/");
        assert_eq!(OpType::Modulus.as_str(), "%");
    }

    #[test]
    fn test_arity() {
        assert!(OpType::Negate.is_unary());
        assert!(!OpType::Plus.is_unary());
        assert!(!OpType::Concat.is_unary());
    }
}
