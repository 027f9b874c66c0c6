#[cfg(test)]
mod tests {
    fn tool(name: &str) -> serde_json::Value {
        let tools = crate::mcp::build_tools_array();
        tools
            .as_array()
            .expect("tools array")
            .iter()
            .find(|t| t.get("name").and_then(|n| n.as_str()) == Some(name))
            .cloned()
            .unwrap_or_else(|| panic!("{} tool present", name))
    }

    fn required(schema: &serde_json::Value) -> Vec<String> {
        schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|r| r.iter().filter_map(|f| f.as_str().map(String::from)).collect())
            .unwrap_or_default()
    }

    #[test]
    fn search_schema_requires_only_query() {
        let search = tool("search");
        let schema = search.get("inputSchema").expect("search schema");
        assert_eq!(required(schema), vec!["query".to_string()]);

        let properties = schema.get("properties").expect("properties object");
        for field in ["query", "sort", "time_window", "limit"] {
            assert!(properties.get(field).is_some(), "{} should be a property", field);
        }
    }

    #[test]
    fn numeric_parameters_are_string_typed() {
        let search = tool("search");
        let limit = &search["inputSchema"]["properties"]["limit"];
        assert_eq!(limit["type"], "string");

        let comments = tool("get_top_comments");
        let num = &comments["inputSchema"]["properties"]["num_comments"];
        assert_eq!(num["type"], "string");
    }

    #[test]
    fn comments_schema_requires_post_url() {
        let comments = tool("get_top_comments");
        let schema = comments.get("inputSchema").expect("comments schema");
        assert_eq!(required(schema), vec!["post_url".to_string()]);
    }

    #[test]
    fn descriptions_distinguish_empty_from_failure() {
        let search = tool("search");
        let description = search["description"].as_str().expect("description");
        assert!(description.to_lowercase().contains("empty array"));
    }
}
