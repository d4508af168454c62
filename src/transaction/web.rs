//! Transaction pages, the filterable transactions table and the HTMX
//! endpoints behind the transaction form.

use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    account::{Account, get_all_accounts},
    alert::Alert,
    category::{Category, get_all_categories},
    db::lock_connection,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_STYLE, base, edit_delete_action_links, hx_redirect, money_span, page_header,
        select_input,
    },
    money::Asset,
    navigation::NavBar,
    transaction::{
        TransactionDetails, TransactionInput, TransactionQuery, TransactionStatus,
        api::{TransactionListParams, TransactionState, parse_transaction_id},
        create_transaction, delete_transaction, get_transaction_details, list_transactions,
        update_transaction,
    },
};

/// The fields of the transaction form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFormData {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl TryFrom<TransactionFormData> for TransactionInput {
    type Error = Error;

    fn try_from(form: TransactionFormData) -> Result<Self, Self::Error> {
        TransactionInput::parse(
            form.account_id,
            form.category_id,
            &form.amount,
            form.description,
            &form.date,
            form.status,
        )
    }
}

/// Render the transactions page with the filter form.
pub async fn get_transactions_page(
    State(state): State<TransactionState>,
    Query(params): Query<TransactionListParams>,
) -> Result<Response, Error> {
    let query = TransactionQuery::try_from(params)?;
    let connection = lock_connection(&state.db_connection)?;
    let transactions = list_transactions(&query, &connection)?;
    let accounts = get_all_accounts(&connection)?;
    let categories = get_all_categories(&connection)?;

    let content = html!(
        (NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                (page_header("Transactions", endpoints::NEW_TRANSACTION_VIEW, "Create Transaction"))
                (filter_form(&accounts, &categories))
                (transactions_table(&transactions))
            }
        }
    );

    Ok(base("Transactions", &content).into_response())
}

/// Render just the transactions table for the filters in the query string.
pub async fn get_transactions_partial(
    State(state): State<TransactionState>,
    Query(params): Query<TransactionListParams>,
) -> Result<Response, Error> {
    let query = TransactionQuery::try_from(params)?;
    let connection = lock_connection(&state.db_connection)?;
    let transactions = list_transactions(&query, &connection)?;

    Ok(transactions_table(&transactions).into_response())
}

/// Render the transaction creation page.
pub async fn get_new_transaction_page(
    State(state): State<TransactionState>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let page = form_page(
        "Create Transaction",
        endpoints::NEW_TRANSACTION_VIEW,
        None,
        &connection,
    )?;

    Ok(page.into_response())
}

/// Render the transaction edit page.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
) -> Result<Response, Error> {
    let transaction_id = parse_transaction_id(&transaction_id)?;
    let connection = lock_connection(&state.db_connection)?;
    let details = get_transaction_details(transaction_id, &connection)?;
    let page = form_page(
        "Edit Transaction",
        endpoints::TRANSACTIONS_VIEW,
        Some(&details),
        &connection,
    )?;

    Ok(page.into_response())
}

/// Handle the transaction creation form.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let result = TransactionInput::try_from(form).and_then(|input| {
        let connection = lock_connection(&state.db_connection)?;
        create_transaction(input, &connection)
    });

    match result {
        Ok(transaction) => {
            tracing::info!("created transaction {}", transaction.id);
            hx_redirect(endpoints::TRANSACTIONS_VIEW)
        }
        Err(error) => error.into_alert_response(),
    }
}

/// Handle the transaction edit form.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let result = TransactionInput::try_from(form).and_then(|input| {
        let transaction_id = parse_transaction_id(&transaction_id)?;
        let connection = lock_connection(&state.db_connection)?;
        update_transaction(transaction_id, input, &connection)
    });

    match result {
        Ok(_) => hx_redirect(endpoints::TRANSACTIONS_VIEW),
        Err(error) => error.into_alert_response(),
    }
}

/// Delete a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
) -> Response {
    let result = parse_transaction_id(&transaction_id).and_then(|transaction_id| {
        let connection = lock_connection(&state.db_connection)?;
        delete_transaction(transaction_id, &connection)
    });

    match result {
        Ok(()) => Alert::SuccessSimple {
            message: "Transaction deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

fn filter_form(accounts: &[Account], categories: &[Category]) -> Markup {
    html!(
        form
            hx-get=(endpoints::TRANSACTIONS_PARTIAL)
            hx-trigger="change"
            hx-target="#transactions-table"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="grid grid-cols-2 lg:grid-cols-4 gap-4 w-full"
        {
            div
            {
                label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }

                select id="account_id" name="account_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All accounts" }
                    @for account in accounts {
                        option value=(account.id) { (account.name) }
                    }
                }
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category_id" name="category_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All categories" }
                    @for category in categories {
                        option value=(category.id) {
                            (category.name) " (" (category.category_type) ")"
                        }
                    }
                }
            }

            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "From" }
                input id="start_date" type="date" name="start_date" class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "To" }
                input id="end_date" type="date" name="end_date" class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    )
}

/// The transactions table shared by the transactions page and the dashboard.
pub(crate) fn transactions_table(transactions: &[TransactionDetails]) -> Markup {
    let table_row = |details: &TransactionDetails| {
        let transaction = &details.transaction;
        let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
        let delete_url = format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'?",
            transaction.description
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (transaction.date.date()) }
                td class=(TABLE_CELL_STYLE) { (transaction.description) }
                td class=(TABLE_CELL_STYLE) { (details.account.name) }
                td class=(TABLE_CELL_STYLE) { (details.category.name) }
                td class="px-6 py-4 text-right" { (money_span(transaction.amount)) }
                td class="px-6 py-4 capitalize" { (transaction.status) }
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
        div id="transactions-table" class="overflow-x-auto w-full dark:bg-gray-800"
        {
            table class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-4 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for details in transactions {
                        (table_row(details))
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td colspan="7" class="px-6 py-4 text-center"
                            {
                                "No transactions found."
                            }
                        }
                    }
                }
            }
        }
    )
}

fn form_page(
    title: &str,
    active_endpoint: &str,
    details: Option<&TransactionDetails>,
    connection: &Connection,
) -> Result<Markup, Error> {
    let accounts = get_all_accounts(connection)?;
    let categories = get_all_categories(connection)?;

    let form = if accounts.is_empty() || categories.is_empty() {
        html!(
            p
            {
                "Transactions need an account and a category. Create an "
                a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE) { "account" }
                " and a "
                a href=(endpoints::NEW_CATEGORY_VIEW) class=(LINK_STYLE) { "category" }
                " first."
            }
        )
    } else {
        transaction_form(details, &accounts, &categories)
    };

    let content = html!(
        (NavBar::new(active_endpoint).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { (title) }
            (form)
        }
    );

    Ok(base(title, &content))
}

fn transaction_form(
    details: Option<&TransactionDetails>,
    accounts: &[Account],
    categories: &[Category],
) -> Markup {
    let transaction = details.map(|details| &details.transaction);
    // Submitted amounts are read at US dollar scale, so the stored minor
    // units are shown at that scale too.
    let amount = transaction
        .map(|transaction| {
            transaction
                .amount
                .abs()
                .with_asset(Asset::USD)
                .to_decimal_string()
        })
        .unwrap_or_default();
    let description = transaction.map_or("", |transaction| transaction.description.as_str());
    let date = transaction
        .map(|transaction| transaction.date.date().to_string())
        .unwrap_or_default();
    let selected_status = transaction.map_or(TransactionStatus::Cleared, |transaction| {
        transaction.status
    });
    let selected_account = transaction
        .map(|transaction| transaction.account_id.to_string())
        .unwrap_or_default();
    let selected_category = transaction
        .map(|transaction| transaction.category_id.to_string())
        .unwrap_or_default();

    let account_options: Vec<(String, String)> = accounts
        .iter()
        .map(|account| {
            (
                account.id.to_string(),
                format!("{} ({})", account.name, account.asset),
            )
        })
        .collect();
    let mut other_scale_assets: Vec<&str> = accounts
        .iter()
        .filter(|account| account.asset.decimals() != Asset::USD.decimals())
        .map(|account| account.asset.code())
        .collect();
    other_scale_assets.sort_unstable();
    other_scale_assets.dedup();
    let category_options: Vec<(String, String)> = categories
        .iter()
        .map(|category| {
            (
                category.id.to_string(),
                format!("{} ({})", category.name, category.category_type),
            )
        })
        .collect();
    let put_endpoint = transaction
        .map(|transaction| format_endpoint(endpoints::PUT_TRANSACTION, transaction.id));
    let status_options = TransactionStatus::ALL
        .iter()
        .map(|status| (status.as_str(), status.as_str()));

    html! {
        form
            hx-post=[transaction.is_none().then_some(endpoints::POST_TRANSACTION)]
            hx-put=[put_endpoint]
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (select_input(
                "account_id",
                "Account",
                account_options.iter().map(|(value, label)| (value.as_str(), label.as_str())),
                &selected_account,
            ))

            (select_input(
                "category_id",
                "Category",
                category_options.iter().map(|(value, label)| (value.as_str(), label.as_str())),
                &selected_category,
            ))

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    id="amount"
                    type="text"
                    inputmode="decimal"
                    name="amount"
                    placeholder="0.00"
                    value=(amount)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                {
                    "The sign follows the category: expenses are stored as negative amounts."
                }

                @if !other_scale_assets.is_empty() {
                    p id="amount-scale-hint" class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                    {
                        "Amounts are read with two decimals and kept as the smallest units of "
                        "the account's asset. For " (other_scale_assets.join(", "))
                        " accounts, enter 15.00 to record 1500 units."
                    }
                }
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    value=(description)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    id="date"
                    type="date"
                    name="date"
                    value=(date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (select_input("status", "Status", status_options, selected_status.as_str()))

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                @if transaction.is_some() { "Save Transaction" } @else { "Create Transaction" }
            }
        }
    }
}
