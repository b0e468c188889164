/// Returns an [`InvalidParameter`](crate::error::PlanError::InvalidParameter) error
/// from the enclosing function unless a numerical parameter satisfies a condition
///
/// ### Example
/// ```ignore
/// ensure_param!(gamma = config.gamma, gamma > 0.0 && gamma <= 1.0, "(0, 1]");
/// ```
/// This returns the error "invalid value for \`gamma\`: 1.5. Must be in (0, 1]." when `config.gamma` is `1.5`.
macro_rules! ensure_param {
    ($name:ident = $value:expr, $ok:expr, $expected:literal) => {{
        let $name: f64 = $value;
        if !($ok) {
            return Err($crate::error::PlanError::InvalidParameter {
                name: stringify!($name),
                value: $name,
                expected: $expected,
            });
        }
    }};
}
