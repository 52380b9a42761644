//! Search-engine queries for a handle. Pure; nothing here touches the
//! network.

pub fn search_queries(handle: &str) -> Vec<String> {
    vec![
        format!("\"{handle}\""),
        format!("\"{handle}\" site:pastebin.com"),
        format!("\"{handle}\" site:github.com"),
        format!("\"{handle}\" site:reddit.com"),
        format!("\"{handle}\" filetype:pdf"),
        format!("\"{handle}\" \"email\" OR \"contact\""),
        format!("\"{handle}\" \"phone\" OR \"mobile\""),
        format!("\"{handle}\" inurl:resume OR inurl:cv"),
        format!("intitle:\"{handle}\""),
        format!("\"{handle}\" site:linkedin.com"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_shape_quoting_the_handle() {
        let queries = search_queries("dev");
        assert_eq!(queries.len(), 10);
        assert_eq!(queries[0], "\"dev\"");
        assert_eq!(queries[8], "intitle:\"dev\"");
        assert!(queries.iter().all(|q| q.contains("\"dev\"")));
    }
}
