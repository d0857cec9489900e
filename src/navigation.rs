//! The navigation bar: a header on large screens and a bottom tab bar on small ones.

use maud::{Markup, html};

use crate::endpoints;

/// A page section reachable from the navigation bar.
#[derive(Debug, Clone, Copy)]
struct Section {
    url: &'static str,
    title: &'static str,
    icon: &'static str,
}

const SECTIONS: [Section; 6] = [
    Section {
        url: endpoints::DASHBOARD_VIEW,
        title: "Dashboard",
        icon: "🏠",
    },
    Section {
        url: endpoints::TRANSACTIONS_VIEW,
        title: "Transactions",
        icon: "🧾",
    },
    Section {
        url: endpoints::WALLETS_VIEW,
        title: "Wallets",
        icon: "👛",
    },
    Section {
        url: endpoints::BUDGETS_VIEW,
        title: "Budgets",
        icon: "🎯",
    },
    Section {
        url: endpoints::REPORTS_VIEW,
        title: "Reports",
        icon: "📊",
    },
    Section {
        url: endpoints::CATEGORIES_VIEW,
        title: "Categories",
        icon: "🏷️",
    },
];

impl Section {
    /// Whether `endpoint` is this section's page or one of its sub-pages,
    /// e.g. "/wallets/new" belongs to "/wallets".
    fn contains(&self, endpoint: &str) -> bool {
        endpoint
            .strip_prefix(self.url)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

/// The navigation bar with the section for the current page highlighted.
pub struct NavBar<'a> {
    active_endpoint: &'a str,
}

impl NavBar<'_> {
    /// Get the navigation bar for the page at `active_endpoint`.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        NavBar { active_endpoint }
    }

    /// The section that should be highlighted, if any.
    fn active_section(&self) -> Option<&'static str> {
        SECTIONS
            .iter()
            .find(|section| section.contains(self.active_endpoint))
            .map(|section| section.url)
    }

    pub fn into_html(self) -> Markup {
        let active = self.active_section();
        let is_active = |section: &Section| active == Some(section.url);

        // Layout adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::ROOT)
                        class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        span class="text-2xl" aria-hidden="true" { "👛" }
                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Dompet"
                        }
                    }

                    ul class="hidden lg:flex font-medium space-x-8 rtl:space-x-reverse"
                    {
                        @for section in &SECTIONS {
                            li
                            {
                                a
                                    href=(section.url)
                                    class=(desktop_link_style(is_active(section)))
                                    aria-current=[is_active(section).then_some("page")]
                                {
                                    (section.title)
                                }
                            }
                        }
                    }
                }
            }

            nav
                class="fixed inset-x-0 bottom-0 z-40 lg:hidden border-t border-gray-200
                bg-white/95 backdrop-blur dark:border-gray-700 dark:bg-gray-900/95"
                aria-label="Sections"
            {
                ul class="grid grid-cols-6 pb-[env(safe-area-inset-bottom)]"
                {
                    @for section in &SECTIONS {
                        li class="min-w-0"
                        {
                            a
                                href=(section.url)
                                class=(mobile_link_style(is_active(section)))
                                aria-current=[is_active(section).then_some("page")]
                            {
                                span aria-hidden="true" { (section.icon) }
                                span class="truncate" { (section.title) }
                            }
                        }
                    }
                }
            }
        )
    }
}

fn desktop_link_style(is_active: bool) -> &'static str {
    if is_active {
        "text-blue-700 dark:text-blue-500"
    } else {
        "text-gray-900 hover:text-blue-700 dark:text-white dark:hover:text-blue-500"
    }
}

fn mobile_link_style(is_active: bool) -> &'static str {
    if is_active {
        "flex flex-col items-center gap-0.5 py-2 text-[0.65rem] font-semibold \
        text-blue-700 dark:text-blue-300"
    } else {
        "flex flex-col items-center gap-0.5 py-2 text-[0.65rem] font-semibold \
        text-gray-500 hover:text-blue-700 dark:text-gray-400 dark:hover:text-blue-300"
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::{endpoints, navigation::NavBar};

    #[test]
    fn highlights_section_of_current_page() {
        let cases = [
            (endpoints::DASHBOARD_VIEW, Some(endpoints::DASHBOARD_VIEW)),
            (endpoints::TRANSACTIONS_VIEW, Some(endpoints::TRANSACTIONS_VIEW)),
            (endpoints::NEW_TRANSACTION_VIEW, Some(endpoints::TRANSACTIONS_VIEW)),
            (endpoints::EDIT_TRANSACTION_VIEW, Some(endpoints::TRANSACTIONS_VIEW)),
            (endpoints::NEW_WALLET_VIEW, Some(endpoints::WALLETS_VIEW)),
            (endpoints::BUDGETS_VIEW, Some(endpoints::BUDGETS_VIEW)),
            (endpoints::REPORTS_VIEW, Some(endpoints::REPORTS_VIEW)),
            (endpoints::EDIT_CATEGORY_VIEW, Some(endpoints::CATEGORIES_VIEW)),
            (endpoints::ROOT, None),
            (endpoints::POST_BUDGET, None),
        ];

        for (endpoint, want) in cases {
            assert_eq!(NavBar::new(endpoint).active_section(), want, "{endpoint}");
        }
    }

    #[test]
    fn prefix_must_end_at_path_segment() {
        assert_eq!(NavBar::new("/walletsxyz").active_section(), None);
    }

    #[test]
    fn marks_current_links_for_both_layouts() {
        let html = Html::parse_fragment(&NavBar::new(endpoints::BUDGETS_VIEW).into_html().into_string());

        let current: Vec<_> = html
            .select(&Selector::parse("a[aria-current=page]").unwrap())
            .map(|link| link.value().attr("href").unwrap().to_owned())
            .collect();

        assert_eq!(current, vec![endpoints::BUDGETS_VIEW, endpoints::BUDGETS_VIEW]);
    }
}
