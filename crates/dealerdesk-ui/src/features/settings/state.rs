//! Embeddable virtual office button snippet.

use uuid::Uuid;

/// Toast after a successful copy.
pub const COPY_SUCCESS_MESSAGE: &str = "Code copied to clipboard!";

/// Toast when the clipboard rejects the write.
pub const COPY_FAILURE_MESSAGE: &str = "Something went wrong while copying.";

/// Script tag a dealer pastes before `</body>` to show the virtual office button.
#[must_use]
pub fn widget_snippet(script_url: &str, company_id: Uuid) -> String {
    format!(r#"<script src="{script_url}" autohouse-id="{company_id}"></script>"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DEFAULT_WIDGET_URL;

    #[test]
    fn snippet_embeds_company_id() {
        let company_id = Uuid::parse_str("6f1c2d3e-4a5b-4c6d-8e9f-0a1b2c3d4e5f").expect("uuid");
        assert_eq!(
            widget_snippet(DEFAULT_WIDGET_URL, company_id),
            "<script src=\"http://dev.myautohouse.eu/virtual-office-button/widget.js\" \
             autohouse-id=\"6f1c2d3e-4a5b-4c6d-8e9f-0a1b2c3d4e5f\"></script>"
        );
    }
}
