use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    category::{Category, CategoryKind},
    database_id::{CategoryId, WalletId},
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::{Transaction, TransactionBuilder, TransactionType, core::MAX_DESCRIPTION_LENGTH},
    wallet::Wallet,
};

/// The form data for creating or editing a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    pub type_: TransactionType,
    pub wallet_id: WalletId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// The value of the transaction, always positive.
    pub amount: f64,
    /// The date when the transaction ocurred.
    pub date: Date,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
}

impl TransactionForm {
    pub fn into_builder(self) -> TransactionBuilder {
        Transaction::build(self.wallet_id, self.type_, self.amount, self.date)
            .category_id(self.category_id)
            .description(self.description.as_deref().unwrap_or_default())
    }
}

pub struct TransactionFormDefaults<'a> {
    pub transaction_type: TransactionType,
    pub wallet_id: Option<WalletId>,
    pub category_id: Option<CategoryId>,
    pub amount: Option<f64>,
    pub date: Date,
    pub description: Option<&'a str>,
    pub max_date: Date,
    pub autofocus_amount: bool,
}

pub fn transaction_form_fields(
    defaults: &TransactionFormDefaults<'_>,
    wallets: &[Wallet],
    categories: &[Category],
) -> Markup {
    let is_expense = matches!(defaults.transaction_type, TransactionType::Expense);
    let amount_str = defaults.amount.map(|amount| format!("{:.2}", amount.abs()));

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="type_"
                        id="transaction-type-expense"
                        type="radio"
                        value="expense"
                        checked[is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="type_"
                        id="transaction-type-income"
                        type="radio"
                        value="income"
                        checked[!is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
                    }
                }
            }
        }

        div
        {
            label for="wallet_id" class=(FORM_LABEL_STYLE) { "Wallet" }

            select name="wallet_id" id="wallet_id" required class=(FORM_TEXT_INPUT_STYLE)
            {
                @for wallet in wallets {
                    option value=(wallet.id) selected[Some(wallet.id) == defaults.wallet_id]
                    {
                        (wallet.name)
                    }
                }
            }
        }

        div
        {
            label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

            select name="category_id" id="category_id" required class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Select a category" }

                @for kind in [CategoryKind::Expense, CategoryKind::Income] {
                    optgroup label=(kind.label())
                    {
                        @for category in categories.iter().filter(|category| category.kind == kind) {
                            option
                                value=(category.id)
                                selected[Some(category.id) == defaults.category_id]
                            {
                                (category.label())
                            }
                        }
                    }
                }
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder="0"
                    min="0.01"
                    required
                    value=[amount_str.as_deref()]
                    autofocus[defaults.autofocus_amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                max=(defaults.max_date)
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                maxlength=(MAX_DESCRIPTION_LENGTH)
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}
