/// An inline ternary.  Rust's `if` is already an expression, but once a
/// couple of these nest inside a coordinate calculation the braces
/// swallow the logic; this keeps the decision table flat enough to read
/// in one line.
#[macro_export]
macro_rules! cq {
    ($condition: expr, $_true: expr, $_false: expr) => {
        if $condition {
            $_true
        } else {
            $_false
        }
    };
}

