//! Dismissible success and error messages swapped into `#alert-container`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A message for the user, rendered as an HTML fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    SuccessSimple { message: String },
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

impl Alert {
    fn is_error(&self) -> bool {
        matches!(self, Alert::Error { .. } | Alert::ErrorSimple { .. })
    }

    fn parts(&self) -> (&str, &str) {
        match self {
            Alert::Error { message, details } => (message, details),
            Alert::SuccessSimple { message } | Alert::ErrorSimple { message } => (message, ""),
        }
    }

    pub fn into_html(self) -> Markup {
        let (message, details) = self.parts();
        let (role, style) = if self.is_error() {
            (
                "alert",
                "p-4 mb-4 rounded-lg border text-red-800 border-red-300 bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
            )
        } else {
            (
                "status",
                "p-4 mb-4 rounded-lg border text-green-800 border-green-300 bg-green-50 \
                dark:bg-gray-800 dark:text-green-400 dark:border-green-800",
            )
        };

        html! {
            div
                class=(style)
                role=(role)
            {
                div class="flex items-center justify-between gap-4"
                {
                    h3 class="text-lg font-medium" { (message) }

                    button
                        type="button"
                        class="text-sm underline"
                        onclick="this.closest('[role]').remove()"
                    {
                        "Dismiss"
                    }
                }

                @if !details.is_empty() {
                    p class="mt-2 text-sm" { (details) }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}

#[cfg(test)]
mod alert_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::Html;

    use crate::{
        alert::Alert,
        test_utils::{assert_html_content_type, assert_valid_html, parse_html_fragment, select_text},
    };

    #[tokio::test]
    async fn renders_message_and_details() {
        let alert = Alert::Error {
            message: "Category in use".to_owned(),
            details: "Move the transactions first.".to_owned(),
        };

        let response = alert.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_html_content_type(&response);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_eq!(select_text(&html, "[role=alert] h3"), ["Category in use"]);
        assert_eq!(
            select_text(&html, "[role=alert] p"),
            ["Move the transactions first."]
        );
    }

    #[test]
    fn simple_success_has_no_details() {
        let markup = Alert::SuccessSimple {
            message: "Account deleted".to_owned(),
        }
        .into_html();

        let html = Html::parse_fragment(&markup.into_string());
        assert_eq!(select_text(&html, "[role=status] h3"), ["Account deleted"]);
        assert!(select_text(&html, "p").is_empty());
    }
}
