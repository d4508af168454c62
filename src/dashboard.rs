//! The dashboard: balance totals, per-account balances and recent activity.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    Error,
    balance::{BalanceState, balances_table, get_all_balances, get_balance_summary, summary_cards},
    db::lock_connection,
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    transaction::{TransactionQuery, list_transactions, transactions_table},
};

/// How many transactions the recent activity table shows.
const RECENT_TRANSACTION_COUNT: u32 = 10;

/// Render the dashboard page.
pub async fn get_dashboard_page(State(state): State<BalanceState>) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let summary = get_balance_summary(state.summary_asset, &connection)?;
    let balances = get_all_balances(&connection)?;
    let recent_transactions = list_transactions(
        &TransactionQuery {
            limit: RECENT_TRANSACTION_COUNT,
            ..Default::default()
        },
        &connection,
    )?;

    let content = html!(
        (NavBar::new(endpoints::DASHBOARD_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-6xl"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                (summary_cards(&summary))

                div class="space-y-2"
                {
                    header class="flex justify-between items-end"
                    {
                        h2 class="text-lg font-semibold" { "Balances" }
                        a href=(endpoints::BALANCES_VIEW) class=(LINK_STYLE) { "Manage balances" }
                    }

                    (balances_table(&balances, false))
                }

                div class="space-y-2"
                {
                    header class="flex justify-between items-end"
                    {
                        h2 class="text-lg font-semibold" { "Recent Transactions" }
                        a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
                    }

                    (transactions_table(&recent_transactions))
                }
            }
        }
    );

    Ok(base("Dashboard", &content).into_response())
}
