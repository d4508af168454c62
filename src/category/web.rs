//! Category pages and the HTMX endpoints behind their forms.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    alert::Alert,
    category::{
        Category, CategoryForm, CategoryType, DEFAULT_CATEGORY_COLOR, api::CategoryState,
        create_category, delete_category, get_all_categories, get_category, parse_category_id,
        update_category,
    },
    db::lock_connection,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE,
        base, edit_delete_action_links, hx_redirect, page_header, select_input,
    },
    navigation::NavBar,
};

/// Render the categories page, income first.
pub async fn get_categories_page(State(state): State<CategoryState>) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let categories = get_all_categories(&connection)?;

    let content = html!(
        (NavBar::new(endpoints::CATEGORIES_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                (page_header("Categories", endpoints::NEW_CATEGORY_VIEW, "Create Category"))
                (categories_table(&categories))
            }
        }
    );

    Ok(base("Categories", &content).into_response())
}

/// Render just the categories table.
pub async fn get_categories_partial(State(state): State<CategoryState>) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let categories = get_all_categories(&connection)?;

    Ok(categories_table(&categories).into_response())
}

/// Render the category creation page.
pub async fn get_new_category_page() -> Response {
    form_page("Create Category", endpoints::NEW_CATEGORY_VIEW, None).into_response()
}

/// Render the category edit page.
pub async fn get_edit_category_page(
    State(state): State<CategoryState>,
    Path(category_id): Path<String>,
) -> Result<Response, Error> {
    let category_id = parse_category_id(&category_id)?;
    let connection = lock_connection(&state.db_connection)?;
    let category = get_category(category_id, &connection)?;

    Ok(form_page("Edit Category", endpoints::CATEGORIES_VIEW, Some(&category)).into_response())
}

/// Handle the category creation form.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let result = lock_connection(&state.db_connection)
        .and_then(|connection| create_category(form, &connection));

    match result {
        Ok(category) => {
            tracing::info!("created category {}", category.id);
            hx_redirect(endpoints::CATEGORIES_VIEW)
        }
        Err(error) => error.into_alert_response(),
    }
}

/// Handle the category edit form.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<String>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let result = parse_category_id(&category_id).and_then(|category_id| {
        let connection = lock_connection(&state.db_connection)?;
        update_category(category_id, form, &connection)
    });

    match result {
        Ok(_) => hx_redirect(endpoints::CATEGORIES_VIEW),
        Err(error) => error.into_alert_response(),
    }
}

/// Delete a category that no transaction uses.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<String>,
) -> Response {
    let result = parse_category_id(&category_id).and_then(|category_id| {
        let connection = lock_connection(&state.db_connection)?;
        delete_category(category_id, &connection)
    });

    match result {
        Ok(()) => Alert::SuccessSimple {
            message: "Category deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

fn category_badge(category: &Category) -> Markup {
    html!(
        span
            class="inline-flex items-center gap-2 px-2.5 py-0.5 text-xs font-semibold
                rounded-full bg-gray-100 text-gray-800 dark:bg-gray-700 dark:text-gray-200"
        {
            span
                class="inline-block w-2.5 h-2.5 rounded-full"
                style={ "background-color: " (category.color) }
            {}
            (category.name)
        }
    )
}

fn categories_table(categories: &[Category]) -> Markup {
    let table_row = |category: &Category| {
        let edit_url = format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id);
        let delete_url = format_endpoint(endpoints::DELETE_CATEGORY, category.id);
        let confirm_message = format!("Are you sure you want to delete '{}'?", category.name);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (category_badge(category)) }
                td class="px-6 py-4 capitalize" { (category.category_type) }
                td class=(TABLE_CELL_STYLE) { (category.description) }
                td class=(TABLE_CELL_STYLE)
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &confirm_message,
                        "closest tr",
                    ))
                }
            }
        )
    };

    html!(
        div id="categories-table" class="overflow-x-auto w-full dark:bg-gray-800"
        {
            table class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for category in categories {
                        (table_row(category))
                    }

                    @if categories.is_empty() {
                        tr
                        {
                            td colspan="4" class="px-6 py-4 text-center"
                            {
                                "No categories yet."
                            }
                        }
                    }
                }
            }
        }
    )
}

fn form_page(title: &str, active_endpoint: &str, category: Option<&Category>) -> Markup {
    let content = html!(
        (NavBar::new(active_endpoint).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { (title) }
            (category_form(category))
        }
    );

    base(title, &content)
}

fn category_form(category: Option<&Category>) -> Markup {
    let name = category.map_or("", |category| category.name.as_str());
    let description = category.map_or("", |category| category.description.as_str());
    let color = category.map_or(DEFAULT_CATEGORY_COLOR, |category| category.color.as_str());
    let selected_type = category.map_or(CategoryType::Expense, |category| category.category_type);
    let type_options = CategoryType::ALL
        .iter()
        .map(|category_type| (category_type.as_str(), category_type.as_str()));

    html! {
        form
            hx-post=[category.is_none().then_some(endpoints::POST_CATEGORY)]
            hx-put=[category.map(|category| format_endpoint(endpoints::PUT_CATEGORY, category.id))]
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Groceries"
                    value=(name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (select_input("type", "Type", type_options, selected_type.as_str()))

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    value=(description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="color" class=(FORM_LABEL_STYLE) { "Color" }

                input
                    id="color"
                    type="color"
                    name="color"
                    value=(color)
                    class="h-10 w-20 rounded border border-gray-300 dark:border-gray-600";
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                @if category.is_some() { "Save Category" } @else { "Create Category" }
            }
        }
    }
}


#[cfg(test)]
mod category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        category::{
            CategoryForm, CategoryType, api::CategoryState, create_category_endpoint,
            delete_category_endpoint, get_all_categories,
        },
        db::get_test_connection,
        endpoints,
        test_utils::{
            assert_hx_redirect, create_test_account, create_test_category, create_test_transaction,
            parse_html_fragment, select_text,
        },
        transaction::TransactionStatus,
    };

    fn get_state() -> CategoryState {
        CategoryState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    fn form(name: &str) -> CategoryForm {
        CategoryForm {
            name: name.to_owned(),
            category_type: "expense".to_owned(),
            description: String::new(),
            color: "#10B981".to_owned(),
        }
    }

    #[tokio::test]
    async fn create_redirects_to_categories() {
        let state = get_state();

        let response = create_category_endpoint(State(state.clone()), Form(form("Food"))).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        let categories = get_all_categories(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(categories[0].color, "#10B981");
    }

    #[tokio::test]
    async fn duplicate_returns_conflict_alert() {
        let state = get_state();
        create_category_endpoint(State(state.clone()), Form(form("Food"))).await;

        let response = create_category_endpoint(State(state), Form(form("Food"))).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let html = parse_html_fragment(response).await;
        assert_eq!(
            select_text(&html, "[role=alert] h3"),
            ["Duplicate category"]
        );
    }

    #[tokio::test]
    async fn delete_category_in_use_returns_conflict_alert() {
        let state = get_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            let account = create_test_account(&connection, "checking", "USD");
            let category = create_test_category(&connection, "Rent", CategoryType::Expense);
            create_test_transaction(
                &connection,
                &account,
                &category,
                -100,
                TransactionStatus::Cleared,
            );
            category
        };

        let response = delete_category_endpoint(State(state), Path(category.id.to_string())).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let html = parse_html_fragment(response).await;
        assert_eq!(select_text(&html, "[role=alert] h3"), ["Category in use"]);
    }
}
