/// Quote a single SQL identifier, doubling embedded double quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render `"schema"."table"`.
///
/// Schema and table are quoted separately, so a table name containing a dot
/// stays one identifier.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("Order Items"), "\"Order Items\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_qualified_table_keeps_dotted_names_whole() {
        assert_eq!(qualified_table("public", "users"), "\"public\".\"users\"");
        assert_eq!(
            qualified_table("sales", "orders.2024"),
            "\"sales\".\"orders.2024\""
        );
    }
}
