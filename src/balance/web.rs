//! The balances page, the summary cards and the refresh endpoints.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::{OffsetDateTime, macros::format_description};

use crate::{
    Error,
    account::parse_account_id,
    balance::{
        BalanceSummary, BalanceWithAccount, api::BalanceState, get_all_balances,
        get_balance_summary, refresh_account_balance, refresh_all_balances,
    },
    db::lock_connection,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, base, hx_redirect, money_span,
    },
    navigation::NavBar,
};

/// Render the balances page.
pub async fn get_balances_page(State(state): State<BalanceState>) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let summary = get_balance_summary(state.summary_asset, &connection)?;
    let balances = get_all_balances(&connection)?;

    let content = html!(
        (NavBar::new(endpoints::BALANCES_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end w-full"
                {
                    h1 class="text-xl font-bold" { "Balances" }

                    button
                        hx-post=(endpoints::REFRESH_ALL_BALANCES)
                        hx-target-error="#alert-container"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Refresh All"
                    }
                }

                (summary_cards(&summary))
                (balances_table(&balances, true))
            }
        }
    );

    Ok(base("Balances", &content).into_response())
}

/// Render just the summary cards.
pub async fn get_balance_summary_partial(
    State(state): State<BalanceState>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let summary = get_balance_summary(state.summary_asset, &connection)?;

    Ok(summary_cards(&summary).into_response())
}

/// Recalculate one account's balance and reload the balances page.
pub async fn refresh_balance_endpoint(
    State(state): State<BalanceState>,
    Path(account_id): Path<String>,
) -> Response {
    let result = parse_account_id(&account_id).and_then(|account_id| {
        let connection = lock_connection(&state.db_connection)?;
        refresh_account_balance(account_id, &connection)
    });

    match result {
        Ok(()) => hx_redirect(endpoints::BALANCES_VIEW),
        Err(error) => error.into_alert_response(),
    }
}

/// Recalculate every balance and reload the balances page.
pub async fn refresh_all_balances_endpoint(State(state): State<BalanceState>) -> Response {
    let result = lock_connection(&state.db_connection)
        .and_then(|connection| refresh_all_balances(&connection));

    match result {
        Ok(()) => hx_redirect(endpoints::BALANCES_VIEW),
        Err(error) => error.into_alert_response(),
    }
}

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(format_description!("[year]-[month]-[day] [hour]:[minute] UTC"))
        .unwrap_or_default()
}

/// Total assets, total liabilities and net worth as three cards.
pub(crate) fn summary_cards(summary: &BalanceSummary) -> Markup {
    let card = |label: &str, value: Markup| {
        html!(
            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                p class="text-2xl font-semibold" { (value) }
            }
        )
    };

    html!(
        div
            id="balance-summary"
            class="grid grid-cols-1 md:grid-cols-3 gap-4 w-full"
        {
            (card("Total Assets", money_span(summary.total_assets)))
            (card("Total Liabilities", money_span(summary.total_liabilities)))
            (card("Net Worth", money_span(summary.net_worth)))

            p class="md:col-span-3 text-xs text-gray-500 dark:text-gray-400"
            {
                "Totals are shown in " (summary.net_worth.asset()) " without currency conversion. "
                "Last calculated " (format_timestamp(summary.last_calculated)) "."
            }
        }
    )
}

/// The per-account balances table, optionally with a refresh button per row.
pub(crate) fn balances_table(balances: &[BalanceWithAccount], with_actions: bool) -> Markup {
    let column_count = if with_actions { 6 } else { 5 };

    html!(
        div id="balances-table" class="overflow-x-auto w-full dark:bg-gray-800"
        {
            table class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class="px-6 py-4 text-right" { "Current" }
                        th scope="col" class="px-6 py-4 text-right" { "Pending" }
                        th scope="col" class="px-6 py-4 text-right" { "Available" }
                        @if with_actions {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }
                }

                tbody
                {
                    @for BalanceWithAccount { account, balance } in balances {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (account.name) }
                            td class="px-6 py-4 capitalize" { (account.account_type) }
                            td class="px-6 py-4 text-right" { (money_span(balance.current)) }
                            td class="px-6 py-4 text-right" { (money_span(balance.pending)) }
                            td class="px-6 py-4 text-right" { (money_span(balance.available)) }
                            @if with_actions {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    button
                                        hx-post=(format_endpoint(endpoints::REFRESH_BALANCE, account.id))
                                        hx-target-error="#alert-container"
                                        class=(BUTTON_SECONDARY_STYLE)
                                    {
                                        "Refresh"
                                    }
                                }
                            }
                        }
                    }

                    @if balances.is_empty() {
                        tr
                        {
                            td colspan=(column_count) class="px-6 py-4 text-center"
                            {
                                "No balances calculated yet."
                            }
                        }
                    }
                }
            }
        }
    )
}
