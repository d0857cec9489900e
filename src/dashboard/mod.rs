//! Dashboard module
//!
//! Provides an overview page with this month's totals, budget usage and charts.
//! The aggregation and chart builders are shared with the reports page.

mod aggregation;
mod cards;
mod charts;
mod handlers;

pub(crate) use aggregation::{breakdown_percentages, expense_breakdown, income_expense_trend};
pub(crate) use charts::{
    DashboardChart, chart_container, chart_head_elements, income_expense_chart,
    spending_pie_chart,
};
pub use handlers::get_dashboard_page;
