//! Macros for ergonomic variable construction.

/// Build a [`Variables`](crate::core::Variables) map for conditional
/// resolution.
///
/// Each value is a single token tree handed to `serde_json::json!`: a
/// literal, an object `{ .. }`, an array `[ .. ]`, or a parenthesised
/// expression.
///
/// # Example
///
/// ```
/// use simple_state_machine::variables;
///
/// let total = 1500;
/// let vars = variables! {
///     "order" => { "totalAmount": total, "items": ["book"] },
///     "express" => true,
///     "discount" => (-5),
/// };
///
/// assert_eq!(vars["order"]["totalAmount"], 1500);
/// assert_eq!(vars.len(), 3);
/// ```
#[macro_export]
macro_rules! variables {
    () => {
        $crate::core::Variables::new()
    };
    ($($key:expr => $value:tt),+ $(,)?) => {{
        let mut variables = $crate::core::Variables::new();
        $(
            variables.insert(
                ::std::string::String::from($key),
                $crate::__serde_json::json!($value),
            );
        )+
        variables
    }};
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn empty_invocation_yields_empty_map() {
        let vars = variables! {};
        assert!(vars.is_empty());
    }

    #[test]
    fn nested_values_become_json() {
        let vars = variables! {
            "order" => { "totalAmount": 1500, "lines": [1, 2] },
            "flag" => false,
        };

        assert_eq!(vars["order"], json!({ "totalAmount": 1500, "lines": [1, 2] }));
        assert_eq!(vars["flag"], json!(false));
    }

    #[test]
    fn later_keys_overwrite_earlier_ones() {
        let vars = variables! { "x" => 1, "x" => 2 };
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["x"], json!(2));
    }
}
