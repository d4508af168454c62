//! Account pages and the HTMX endpoints behind their forms.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    account::{
        Account, AccountForm, AccountType, api::AccountState, create_account, delete_account,
        get_account, get_all_accounts, parse_account_id, update_account,
    },
    alert::Alert,
    db::lock_connection,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE,
        base, edit_delete_action_links, hx_redirect, page_header, select_input,
    },
    money::Asset,
    navigation::NavBar,
};

/// Render the accounts page.
pub async fn get_accounts_page(State(state): State<AccountState>) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let accounts = get_all_accounts(&connection)?;

    let content = html!(
        (NavBar::new(endpoints::ACCOUNTS_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                (page_header("Accounts", endpoints::NEW_ACCOUNT_VIEW, "Create Account"))
                (accounts_table(&accounts))
            }
        }
    );

    Ok(base("Accounts", &content).into_response())
}

/// Render just the accounts table.
pub async fn get_accounts_partial(State(state): State<AccountState>) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let accounts = get_all_accounts(&connection)?;

    Ok(accounts_table(&accounts).into_response())
}

/// Render the account creation page.
pub async fn get_new_account_page() -> Response {
    form_page("Create Account", endpoints::NEW_ACCOUNT_VIEW, None).into_response()
}

/// Render the account edit page.
pub async fn get_edit_account_page(
    State(state): State<AccountState>,
    Path(account_id): Path<String>,
) -> Result<Response, Error> {
    let account_id = parse_account_id(&account_id)?;
    let connection = lock_connection(&state.db_connection)?;
    let account = get_account(account_id, &connection)?;

    Ok(form_page("Edit Account", endpoints::ACCOUNTS_VIEW, Some(&account)).into_response())
}

/// Handle the account creation form.
pub async fn create_account_endpoint(
    State(state): State<AccountState>,
    Form(form): Form<AccountForm>,
) -> Response {
    let result = lock_connection(&state.db_connection)
        .and_then(|connection| create_account(form, &connection));

    match result {
        Ok(account) => {
            tracing::info!("created account {}", account.id);
            hx_redirect(endpoints::ACCOUNTS_VIEW)
        }
        Err(error) => error.into_alert_response(),
    }
}

/// Handle the account edit form.
pub async fn update_account_endpoint(
    State(state): State<AccountState>,
    Path(account_id): Path<String>,
    Form(form): Form<AccountForm>,
) -> Response {
    let result = parse_account_id(&account_id).and_then(|account_id| {
        let connection = lock_connection(&state.db_connection)?;
        update_account(account_id, form, &connection)
    });

    match result {
        Ok(_) => hx_redirect(endpoints::ACCOUNTS_VIEW),
        Err(error) => error.into_alert_response(),
    }
}

/// Delete an account along with its transactions.
pub async fn delete_account_endpoint(
    State(state): State<AccountState>,
    Path(account_id): Path<String>,
) -> Response {
    let result = parse_account_id(&account_id).and_then(|account_id| {
        let connection = lock_connection(&state.db_connection)?;
        delete_account(account_id, &connection)
    });

    match result {
        Ok(()) => Alert::SuccessSimple {
            message: "Account deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

fn accounts_table(accounts: &[Account]) -> Markup {
    let table_row = |account: &Account| {
        let edit_url = format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, account.id);
        let delete_url = format_endpoint(endpoints::DELETE_ACCOUNT, account.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? All of its transactions will be deleted too.",
            account.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (account.name) }
                td class="px-6 py-4 capitalize" { (account.account_type) }
                td class=(TABLE_CELL_STYLE) { (account.asset) }
                td class=(TABLE_CELL_STYLE) { (account.description) }
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
        div id="accounts-table" class="overflow-x-auto w-full dark:bg-gray-800"
        {
            table class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Asset" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for account in accounts {
                        (table_row(account))
                    }

                    @if accounts.is_empty() {
                        tr
                        {
                            td colspan="5" class="px-6 py-4 text-center"
                            {
                                "No accounts yet."
                            }
                        }
                    }
                }
            }
        }
    )
}

fn form_page(title: &str, active_endpoint: &str, account: Option<&Account>) -> Markup {
    let content = html!(
        (NavBar::new(active_endpoint).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { (title) }
            (account_form(account))
        }
    );

    base(title, &content)
}

fn account_form(account: Option<&Account>) -> Markup {
    let name = account.map_or("", |account| account.name.as_str());
    let description = account.map_or("", |account| account.description.as_str());
    let selected_type = account.map_or(AccountType::Checking, |account| account.account_type);
    let selected_asset = account.map_or(Asset::USD, |account| account.asset);

    let type_options = AccountType::ALL
        .iter()
        .map(|account_type| (account_type.as_str(), account_type.as_str()));
    let asset_labels: Vec<(&str, String)> = Asset::ALL
        .iter()
        .map(|asset| (asset.code(), format!("{} ({})", asset.code(), asset.symbol())))
        .collect();

    html! {
        form
            hx-post=[account.is_none().then_some(endpoints::POST_ACCOUNT)]
            hx-put=[account.map(|account| format_endpoint(endpoints::PUT_ACCOUNT, account.id))]
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
                    placeholder="Everyday"
                    value=(name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (select_input("type", "Type", type_options, selected_type.as_str()))

            (select_input(
                "asset",
                "Asset",
                asset_labels.iter().map(|(code, label)| (*code, label.as_str())),
                selected_asset.code(),
            ))

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

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                @if account.is_some() { "Save Account" } @else { "Create Account" }
            }
        }
    }
}
