#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Destination capacity is smaller than the result, or a value does not fit the requested width.
    OutOfRange,
    DivideByZero,
    /// Subtraction would produce a negative number.
    Underflow,
    EvenModulus,
    ZeroModulus,
    /// Operand is not reduced modulo the context's modulus.
    NotReduced,
    NotOnCurve,
    PointAtInfinity,
    NotInvertible,
    /// A bounded random draw did not produce an acceptable value.
    RandMaxIter,
    InvalidEncoding,
    InvalidSignature,
}
